use {
    crate::stat::CpuId,
    std::{fs, num::ParseIntError},
    tracing::{debug, warn},
};

/// the ticks attributed to each core during a single cycle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoreTicks {
    ticks: Vec<u64>,
}

// === impl CoreTicks ===

impl CoreTicks {
    /// returns an empty accumulator for `cores` cores.
    pub fn new(cores: usize) -> Self {
        Self {
            ticks: vec![0; cores],
        }
    }

    /// attributes `delta` ticks to the given core.
    ///
    /// non-positive deltas, and cores outside of the accumulator's range, are ignored.
    pub fn accumulate(&mut self, cpu: CpuId, delta: i64) {
        let Self { ticks } = self;

        let Ok(delta @ 1..) = u64::try_from(delta) else {
            return;
        };
        if let Some(total) = cpu.index(ticks.len()).map(|i| &mut ticks[i]) {
            *total = total.saturating_add(delta);
        }
    }

    /// returns the ticks accumulated for each core, in ascending order.
    pub fn as_slice(&self) -> &[u64] {
        &self.ticks
    }
}

/// returns the number of online cores, clamped to `[1, max]`.
///
/// this is read once at startup; cores brought online later are not observed.
pub fn online_cores(max: usize) -> usize {
    const ONLINE: &str = "/sys/devices/system/cpu/online";

    // SAFETY: `sysconf` has no preconditions.
    let count = match unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) } {
        n if n > 0 => n as usize,
        _ => match fs::read_to_string(ONLINE).map(|list| parse_cpu_list(&list)) {
            Ok(Ok(n)) if n > 0 => n,
            _ => {
                warn!("could not determine the number of online cores, assuming one");
                1
            }
        },
    };

    debug!(%count, %max, "detected online cores");
    count.clamp(1, max.max(1))
}

/// counts the cpus in a kernel cpu list, such as `0-3,5,7-8`.
///
/// see `cpuset(7)` for more information.
pub fn parse_cpu_list(list: &str) -> Result<usize, ParseIntError> {
    list.trim()
        .split(',')
        .filter(|range| !range.is_empty())
        .map(|range| -> Result<usize, ParseIntError> {
            match range.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (start.parse::<usize>()?, end.parse::<usize>()?);
                    Ok(end.saturating_add(1).saturating_sub(start))
                }
                None => range.parse::<usize>().map(|_| 1),
            }
        })
        .sum()
}
