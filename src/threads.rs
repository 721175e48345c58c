use {
    crate::{
        source::TaskSource,
        stat::{CpuId, TaskId, TaskStat, UserHz},
    },
    std::{io, vec},
    tracing::trace,
};

/// a single thread's cumulative cpu time, and where it last ran.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Observation {
    pub task: TaskId,
    pub ticks: UserHz,
    pub cpu: CpuId,
}

/// walks every live thread in a [`TaskSource`].
///
/// processes and threads that disappear while being walked, along with records that cannot be
/// parsed, are skipped.
pub struct Threads<'s, S> {
    source: &'s S,
    processes: vec::IntoIter<u32>,
    current: Option<(u32, vec::IntoIter<u32>)>,
}

// === impl Threads ===

impl<'s, S: TaskSource> Threads<'s, S> {
    /// lists the processes in `source`.
    ///
    /// this fails only if the process table itself cannot be listed.
    pub fn new(source: &'s S) -> io::Result<Self> {
        let processes = source.processes()?.into_iter();

        Ok(Self {
            source,
            processes,
            current: None,
        })
    }

    fn next_task(&mut self) -> Option<TaskId> {
        let Self {
            source,
            processes,
            current,
        } = self;

        loop {
            if let Some((pid, threads)) = current {
                if let Some(tid) = threads.next() {
                    return Some(TaskId { pid: *pid, tid });
                }
            }

            let pid = processes.next()?;
            *current = match source.threads(pid) {
                Ok(threads) => Some((pid, threads.into_iter())),
                Err(error) => {
                    trace!(%pid, %error, "skipping process");
                    None
                }
            };
        }
    }

    fn read(&self, task: TaskId) -> Option<Observation> {
        let record = self
            .source
            .stat(task)
            .inspect_err(|error| trace!(%task, %error, "skipping unreadable thread"))
            .ok()?;
        let TaskStat { ticks, cpu } = record
            .parse::<TaskStat>()
            .inspect_err(|error| trace!(%task, %error, "skipping malformed thread"))
            .ok()?;

        Some(Observation { task, ticks, cpu })
    }
}

impl<S: TaskSource> Iterator for Threads<'_, S> {
    type Item = Observation;
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let task = self.next_task()?;
            if let Some(observation) = self.read(task) {
                return Some(observation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            source::{MockTable, MockTaskSource},
            stat::tests::record,
        },
    };

    fn collect(table: MockTable) -> Vec<Observation> {
        let source = MockTaskSource::new([table]);
        Threads::new(&source).unwrap().collect()
    }

    fn observation(pid: u32, tid: u32, ticks: u64, cpu: i32) -> Observation {
        Observation {
            task: TaskId { pid, tid },
            ticks: UserHz::new(ticks),
            cpu: CpuId(cpu),
        }
    }

    #[test]
    fn walks_every_thread() {
        let table = MockTable::default()
            .thread(1, 1, record(1, "init", 10, 5, 0))
            .thread(20, 20, record(20, "server", 100, 50, 1))
            .thread(20, 21, record(20, "server-worker", 7, 0, 3));

        assert_eq!(
            collect(table),
            [
                observation(1, 1, 15, 0),
                observation(20, 20, 150, 1),
                observation(20, 21, 7, 3),
            ]
        );
    }

    #[test]
    fn empty_table() {
        assert!(collect(MockTable::default()).is_empty());
    }

    #[test]
    fn skips_vanished_processes() {
        let table = MockTable::default()
            .vanished(1)
            .thread(2, 2, record(2, "kept", 1, 1, 0))
            .vanished(3);

        assert_eq!(collect(table), [observation(2, 2, 2, 0)]);
    }

    #[test]
    fn skips_unreadable_and_malformed_threads() {
        let table = MockTable::default()
            .unreadable(1, 1)
            .thread(1, 2, "")
            .thread(1, 3, "3 no-closing-parenthesis S 1")
            .thread(1, 4, "4 (short) S 1 1 1")
            .thread(1, 5, record(1, "kept", 3, 4, 1));

        assert_eq!(collect(table), [observation(1, 5, 7, 1)]);
    }

    #[test]
    fn keeps_out_of_range_cpus() {
        let table = MockTable::default().thread(1, 1, record(1, "init", 1, 0, 999));
        assert_eq!(collect(table), [observation(1, 1, 1, 999)]);
    }

    #[test]
    fn unavailable_table() {
        let source = MockTaskSource::unavailable();
        assert!(Threads::new(&source).is_err());
    }
}
