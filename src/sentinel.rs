use {
    crate::{
        cores::CoreTicks,
        registry::Registry,
        source::{Clock, ProcFs, SystemClock, TaskSource},
        stat::UserHz,
        threads::{Observation, Threads},
    },
    std::{io, time::Instant},
    tracing::debug,
};

/// observes the threads running on each core.
pub struct Sentinel<C = SystemClock, S = ProcFs> {
    /// the clock being used to measure time.
    clock: C,
    /// the underlying source of kernel statistics.
    source: S,
    /// the last observed cpu time of every thread.
    registry: Registry,
    /// the kernel's clock tick rate.
    hz: UserHz,
    /// the number of cores being reported.
    cores: usize,
    /// when the previous cycle ended.
    boundary: Instant,
}

/// a recording of each core's load over a single cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct Recording {
    /// when the recording began.
    pub start: Instant,
    /// when the recording ended.
    pub end: Instant,
    /// the load of each core, in ascending order.
    pub loads: Vec<Load>,
}

/// the fraction of a cycle that a core spent running threads, as a percentage.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Load(f64);

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("could not list the process table: {0}")]
    Io(#[from] io::Error),
}

// === impl Sentinel ===

impl<C, S> Sentinel<C, S>
where
    C: Clock,
    S: TaskSource,
{
    /// creates a new [`Sentinel`], reporting on `cores` cores.
    ///
    /// this fails if the process table cannot be listed.
    pub fn new(clock: C, source: S, hz: UserHz, cores: usize) -> Result<Self, SampleError> {
        source.probe()?;
        let boundary = clock.now();

        Ok(Self {
            clock,
            source,
            registry: Registry::new(),
            hz,
            cores,
            boundary,
        })
    }

    /// runs a single cycle, returning a [`Recording`] of the time since the last cycle.
    ///
    /// NB: this returns `Ok(None)` if no time has elapsed since the last cycle.
    pub fn observe(&mut self) -> Result<Option<Recording>, SampleError> {
        let ticks = self.collect()?;
        Ok(self.report(ticks))
    }

    /// returns the number of cores being reported.
    pub fn cores(&self) -> usize {
        self.cores
    }

    /// returns the number of distinct threads observed so far.
    pub fn tracked(&self) -> usize {
        self.registry.len()
    }

    /// attributes the cpu time each thread consumed since the last cycle to its core.
    fn collect(&mut self) -> Result<CoreTicks, SampleError> {
        let Self {
            source,
            registry,
            cores,
            ..
        } = self;

        let mut ticks = CoreTicks::new(*cores);
        for Observation { task, ticks: t, cpu } in Threads::new(source)? {
            let delta = registry.observe(task, t);
            ticks.accumulate(cpu, delta);
        }

        Ok(ticks)
    }

    /// converts accumulated ticks into loads, and advances the cycle boundary.
    fn report(&mut self, ticks: CoreTicks) -> Option<Recording> {
        let Self {
            clock,
            registry,
            hz,
            boundary,
            ..
        } = self;

        let end = clock.now();
        let start = std::mem::replace(boundary, end);
        let elapsed = end.saturating_duration_since(start).as_secs_f64() * hz.get() as f64;

        if elapsed <= 0.0 {
            debug!("no time elapsed, skipping cycle");
            return None;
        }

        let loads = ticks
            .as_slice()
            .iter()
            .map(|&t| Load::new(t as f64 / elapsed * 100.0))
            .collect::<Vec<_>>();
        debug!(?loads, tracked = %registry.len(), "cycle complete");

        Some(Recording { start, end, loads })
    }
}

// === impl Load ===

impl Load {
    /// returns a load of `percent`, clamped to `[0, 100]`.
    pub fn new(percent: f64) -> Self {
        Self(percent.clamp(0.0, 100.0))
    }

    pub fn get(self) -> f64 {
        let Self(percent) = self;
        percent
    }

    /// returns the load, rounded to the nearest percentage point.
    ///
    /// halves round to even, as `printf("%.0f")` does.
    pub fn percentage(self) -> u8 {
        let rounded = self.get().round_ties_even() as u8;
        assert!(rounded <= 100);
        rounded
    }
}
