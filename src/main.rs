//! a per-core cpu load sampler.

use {
    std::io,
    tally::{App, config::Config},
    tracing::{Level, error},
};

type Error = Box<dyn std::error::Error>;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::WARN)
        .init();

    App::new(Config::default())
        .and_then(App::run)
        .inspect_err(|error| error!(%error, "exiting"))
        .map_err(Error::from)
}
