use {
    crate::stat::TaskId,
    std::{
        cell::RefCell,
        collections::{BTreeMap, VecDeque},
        fs, io,
        path::{Path, PathBuf},
        time::Instant,
    },
};

pub use self::{clock::*, tasks::*};

mod clock {
    use super::*;

    pub trait Clock {
        fn now(&self) -> Instant;
    }

    #[derive(Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> Instant {
            Instant::now()
        }
    }

    /// a mock clock.
    #[derive(Default)]
    #[allow(dead_code, reason = "this is a testing utility.")]
    pub struct MockClock {
        times: RefCell<VecDeque<Instant>>,
    }

    impl Clock for MockClock {
        fn now(&self) -> Instant {
            let MockClock { times } = self;

            times
                .borrow_mut()
                .pop_front()
                .expect("mock times should not be empty")
        }
    }

    #[allow(dead_code, reason = "this is a testing utility.")]
    impl MockClock {
        pub fn new(times: impl IntoIterator<Item = Instant>) -> Self {
            Self {
                times: RefCell::new(times.into_iter().collect()),
            }
        }
    }
}

/// abstracts over providers of the process table.
mod tasks {
    use super::*;

    /// a source of per-thread kernel statistics.
    pub trait TaskSource {
        /// checks that the process table can be listed.
        fn probe(&self) -> io::Result<()> {
            self.processes().map(drop)
        }
        /// lists the ids of live processes.
        ///
        /// an error here means the process table itself is unavailable.
        fn processes(&self) -> io::Result<Vec<u32>>;
        /// lists the ids of a process's live threads.
        fn threads(&self, pid: u32) -> io::Result<Vec<u32>>;
        /// reads a thread's stat record.
        fn stat(&self, task: TaskId) -> io::Result<String>;
    }

    /// tasks backed by `/proc`.
    pub struct ProcFs {
        root: PathBuf,
    }

    /// a mock task source.
    ///
    /// each call to [`TaskSource::processes()`] advances to the next scripted [`MockTable`].
    #[derive(Default)]
    #[allow(dead_code, reason = "this is a testing utility.")]
    pub struct MockTaskSource {
        tables: RefCell<VecDeque<Option<MockTable>>>,
        current: RefCell<MockTable>,
    }

    /// a scripted view of the process table.
    #[derive(Clone, Debug, Default)]
    #[allow(dead_code, reason = "this is a testing utility.")]
    pub struct MockTable {
        /// processes mapped to their threads' stat records.
        ///
        /// a `None` process vanishes before its threads are listed, and a `None` thread vanishes
        /// before its record is read.
        procs: BTreeMap<u32, Option<BTreeMap<u32, Option<String>>>>,
    }

    // === impl ProcFs ===

    impl Default for ProcFs {
        fn default() -> Self {
            Self::new(Self::PROC)
        }
    }

    impl ProcFs {
        const PROC: &str = "/proc";

        /// returns a source reading the process table mounted at `root`.
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into() }
        }

        /// lists the numeric entries of a directory.
        fn ids(dir: &Path) -> io::Result<Vec<u32>> {
            let ids = fs::read_dir(dir)?
                .filter_map(Result::ok)
                .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
                .collect();

            Ok(ids)
        }
    }

    impl TaskSource for ProcFs {
        fn processes(&self) -> io::Result<Vec<u32>> {
            let Self { root } = self;
            Self::ids(root)
        }

        fn threads(&self, pid: u32) -> io::Result<Vec<u32>> {
            let Self { root } = self;
            Self::ids(&root.join(pid.to_string()).join("task"))
        }

        fn stat(&self, TaskId { pid, tid }: TaskId) -> io::Result<String> {
            let Self { root } = self;
            let path = root
                .join(pid.to_string())
                .join("task")
                .join(tid.to_string())
                .join("stat");

            // the kernel writes the name as raw, possibly truncated, bytes.
            fs::read(path).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        }
    }

    // === impl MockTaskSource ===

    #[allow(dead_code, reason = "this is a testing utility.")]
    impl MockTaskSource {
        /// returns a source that yields each table in turn.
        pub fn new(tables: impl IntoIterator<Item = MockTable>) -> Self {
            Self {
                tables: RefCell::new(tables.into_iter().map(Some).collect()),
                current: RefCell::default(),
            }
        }

        /// returns a source whose process table cannot be listed.
        pub fn unavailable() -> Self {
            Self {
                tables: RefCell::new(VecDeque::from([None])),
                current: RefCell::default(),
            }
        }
    }

    impl TaskSource for MockTaskSource {
        fn probe(&self) -> io::Result<()> {
            let Self { tables, .. } = self;

            match tables.borrow().front() {
                Some(None) => Err(io::Error::from(io::ErrorKind::NotFound)),
                _ => Ok(()),
            }
        }

        fn processes(&self) -> io::Result<Vec<u32>> {
            let Self { tables, current } = self;

            let table = tables
                .borrow_mut()
                .pop_front()
                .expect("mock tables should not be empty")
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
            let pids = table.procs.keys().copied().collect();
            current.replace(table);

            Ok(pids)
        }

        fn threads(&self, pid: u32) -> io::Result<Vec<u32>> {
            let Self { current, .. } = self;

            current
                .borrow()
                .procs
                .get(&pid)
                .cloned()
                .flatten()
                .map(|threads| threads.into_keys().collect())
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }

        fn stat(&self, TaskId { pid, tid }: TaskId) -> io::Result<String> {
            let Self { current, .. } = self;

            current
                .borrow()
                .procs
                .get(&pid)
                .and_then(Option::as_ref)
                .and_then(|threads| threads.get(&tid))
                .cloned()
                .flatten()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
    }

    // === impl MockTable ===

    #[allow(dead_code, reason = "this is a testing utility.")]
    impl MockTable {
        /// adds a thread with the given stat record.
        pub fn thread(mut self, pid: u32, tid: u32, record: impl Into<String>) -> Self {
            self.threads_of(pid).insert(tid, Some(record.into()));
            self
        }

        /// adds a thread whose record cannot be read.
        pub fn unreadable(mut self, pid: u32, tid: u32) -> Self {
            self.threads_of(pid).insert(tid, None);
            self
        }

        /// adds a process that vanishes before its threads can be listed.
        pub fn vanished(mut self, pid: u32) -> Self {
            self.procs.insert(pid, None);
            self
        }

        fn threads_of(&mut self, pid: u32) -> &mut BTreeMap<u32, Option<String>> {
            self.procs
                .entry(pid)
                .or_default()
                .get_or_insert_with(BTreeMap::new)
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{stat::tests::record, threads::Threads},
        tempfile::TempDir,
    };

    /// writes a thread's stat record beneath `root`.
    fn thread(root: &Path, TaskId { pid, tid }: TaskId, record: &[u8]) {
        let dir = root
            .join(pid.to_string())
            .join("task")
            .join(tid.to_string());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("stat"), record).unwrap();
    }

    /// a record whose name was cut off in the middle of a multibyte character.
    fn truncated_name(pid: u32, utime: u64, stime: u64, cpu: i32) -> Vec<u8> {
        let full = record(pid, "x", utime, stime, cpu);
        let (_, fields) = full.rsplit_once(')').unwrap();
        [
            format!("{pid} (").as_bytes(),
            &b"\xe4\xb8\xad\xe6\x96)"[..],
            fields.as_bytes(),
        ]
        .concat()
    }

    /// builds a small process table:
    ///
    /// * `self`, which is not a process.
    /// * process 1, with an ordinary thread and one with a mangled name.
    /// * process 2, which has exited and has no `task` directory.
    fn table() -> TempDir {
        let root = TempDir::new().unwrap();
        let path = root.path();

        fs::create_dir_all(path.join("self").join("task")).unwrap();
        thread(
            path,
            TaskId { pid: 1, tid: 1 },
            record(1, "init", 10, 5, 0).as_bytes(),
        );
        thread(path, TaskId { pid: 1, tid: 8 }, &truncated_name(8, 40, 2, 1));
        fs::create_dir_all(path.join("2")).unwrap();

        root
    }

    #[test]
    fn lists_numeric_processes() {
        let root = table();
        let source = ProcFs::new(root.path());

        let mut pids = source.processes().unwrap();
        pids.sort();
        assert_eq!(pids, [1, 2]);
        assert!(source.probe().is_ok());
    }

    #[test]
    fn lists_threads() {
        let root = table();
        let source = ProcFs::new(root.path());

        let mut tids = source.threads(1).unwrap();
        tids.sort();
        assert_eq!(tids, [1, 8]);
    }

    #[test]
    fn process_without_tasks() {
        let root = table();
        let source = ProcFs::new(root.path());
        assert!(source.threads(2).is_err());
    }

    #[test]
    fn reads_stat() {
        let root = table();
        let source = ProcFs::new(root.path());

        let stat = source.stat(TaskId { pid: 1, tid: 1 }).unwrap();
        assert_eq!(stat, record(1, "init", 10, 5, 0));
        assert!(source.stat(TaskId { pid: 1, tid: 2 }).is_err());
    }

    #[test]
    fn reads_stat_with_invalid_utf8_name() {
        let root = table();
        let source = ProcFs::new(root.path());

        let stat = source.stat(TaskId { pid: 1, tid: 8 }).unwrap();
        assert!(stat.starts_with("8 ("));
        assert!(stat.contains(") S "));
    }

    #[test]
    fn walks_every_thread() {
        let root = table();
        let source = ProcFs::new(root.path());

        let mut observed = Threads::new(&source)
            .unwrap()
            .map(|observation| (observation.task, observation.ticks.get()))
            .collect::<Vec<_>>();
        observed.sort();
        assert_eq!(
            observed,
            [(TaskId { pid: 1, tid: 1 }, 15), (TaskId { pid: 1, tid: 8 }, 42)]
        );
    }

    #[test]
    fn missing_root() {
        let root = TempDir::new().unwrap();
        let source = ProcFs::new(root.path().join("proc"));
        assert!(source.processes().is_err());
        assert!(source.probe().is_err());
    }
}
