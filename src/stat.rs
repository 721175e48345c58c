use std::{
    fmt::{self, Display},
    num::ParseIntError,
    str::FromStr,
};

pub use self::user_hz::UserHz;

mod user_hz;


/// the identity of a thread: its process id, and its thread id.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TaskId {
    pub pid: u32,
    pub tid: u32,
}

/// the index of a cpu core.
///
/// this is signed, as it is reported by the kernel; indices outside of the range of online cores
/// are tolerated, but never attributed any time.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct CpuId(pub(crate) i32);

/// the fields of a `/proc/<pid>/task/<tid>/stat` record that we care about.
///
/// see `proc_pid_stat(5)` for more information.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaskStat {
    /// time spent in user mode and kernel mode, combined.
    pub ticks: UserHz,
    /// the cpu this thread last executed on.
    pub cpu: CpuId,
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum StatParseError {
    #[error("stat record is empty")]
    Empty,
    #[error("stat record has no closing parenthesis")]
    MissingName,
    #[error("stat record has no field {field}")]
    MissingField { field: usize },
    #[error("invalid time value: {0}")]
    Ticks(#[source] ParseIntError),
    #[error("invalid cpu index: {0}")]
    Cpu(#[source] ParseIntError),
}

// === impl TaskStat ===

impl TaskStat {
    /// user-mode time, counting from the field after the name.
    const UTIME: usize = 12;
    /// kernel-mode time.
    const STIME: usize = 13;
    /// the cpu last executed on.
    const PROCESSOR: usize = 37;
}

impl FromStr for TaskStat {
    type Err = StatParseError;
    fn from_str(record: &str) -> Result<Self, Self::Err> {
        use StatParseError::*;

        if record.trim().is_empty() {
            return Err(Empty);
        }

        // the name may contain parentheses and spaces, so split at the *last* closing one.
        let (_, rest) = record.rsplit_once(')').ok_or(MissingName)?;
        let fields = rest.split_ascii_whitespace().collect::<Vec<_>>();
        let field = |field: usize| {
            fields
                .get(field - 1)
                .copied()
                .ok_or(MissingField { field })
        };

        let utime = field(Self::UTIME)?.parse::<UserHz>().map_err(Ticks)?;
        let stime = field(Self::STIME)?.parse::<UserHz>().map_err(Ticks)?;
        let cpu = field(Self::PROCESSOR)?
            .parse::<i32>()
            .map(CpuId)
            .map_err(Cpu)?;

        Ok(Self {
            ticks: utime + stime,
            cpu,
        })
    }
}

// === impl CpuId ===

impl CpuId {
    /// returns this as an index into a table of `len` cores, if it is in range.
    pub fn index(self, len: usize) -> Option<usize> {
        let Self(id) = self;
        usize::try_from(id).ok().filter(|&i| i < len)
    }
}

// === impl TaskId ===

impl Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { pid, tid } = self;
        write!(f, "{pid}/{tid}")
    }
}
