use {crate::stat::UserHz, std::time::Duration};

/// sampler settings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// the kernel's clock tick rate, in ticks per second.
    ///
    /// this must match the host's `USER_HZ`, or loads will be misreported.
    pub hz: UserHz,
    /// how long to sleep between cycles.
    pub interval: Duration,
    /// the most cores that will be reported.
    pub max_cores: usize,
}

// === impl Config ===

impl Config {
    pub const MAX_CORES: usize = 64;
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hz: UserHz::FREQ,
            interval: Duration::from_secs(1),
            max_cores: Self::MAX_CORES,
        }
    }
}
