//! a per-core cpu load sampler.
//!
//! each cycle, every thread in `/proc` is inspected. the cpu time a thread consumed since the
//! previous cycle is attributed to the core it last ran on, and each core's share of the elapsed
//! time is reported.

use {
    self::{
        config::Config,
        cores::online_cores,
        sentinel::{Recording, SampleError, Sentinel},
        source::{ProcFs, SystemClock},
    },
    std::io,
    tracing::{debug, info},
};

pub use self::{
    sentinel::Load,
    stat::{CpuId, StatParseError, TaskId, TaskStat, UserHz},
};

pub mod config;
pub mod cores;
pub mod registry;
pub mod render;
pub mod sentinel;
pub mod source;
pub mod threads;

/// kernel statistics facilities.
///
/// this provides tools to parse `/proc/<pid>/task/<tid>/stat` records.
mod stat;

pub struct App {
    sentinel: Sentinel,
    config: Config,
}

// === impl App ===

impl App {
    /// initializes a new application.
    ///
    /// this fails if the process table cannot be listed.
    pub fn new(config: Config) -> Result<Self, SampleError> {
        let cores = online_cores(config.max_cores);
        let sentinel = Sentinel::new(SystemClock, ProcFs::default(), config.hz, cores)?;
        info!(cores = %sentinel.cores(), "sampling");

        Ok(Self { sentinel, config })
    }

    /// runs the application.
    ///
    /// this only returns if the process table becomes unavailable.
    pub fn run(self) -> Result<(), SampleError> {
        let Self {
            mut sentinel,
            config: Config { interval, .. },
        } = self;

        loop {
            if let Some(Recording { loads, .. }) = sentinel.observe()? {
                if let Err(error) = render::render(&mut io::stdout().lock(), &loads) {
                    debug!(%error, "could not render");
                }
            }
            std::thread::sleep(interval);
        }
    }
}
