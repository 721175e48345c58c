use {
    crate::stat::{TaskId, UserHz},
    std::collections::{HashMap, hash_map::Entry},
};

/// remembers the cpu time each thread had consumed when it was last observed.
///
/// records are never removed, so this grows with the number of distinct threads observed over
/// the lifetime of the process. a thread id reused by the kernel is indistinguishable from the
/// thread that previously held it, and is compared against that thread's stale time.
#[derive(Debug, Default)]
pub struct Registry {
    tasks: HashMap<TaskId, UserHz>,
}

// === impl Registry ===

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// records `ticks` for the given thread, returning the ticks consumed since it was last seen.
    ///
    /// NB: the first observation of a thread has no baseline, and returns zero.
    pub fn observe(&mut self, task: TaskId, ticks: UserHz) -> i64 {
        let Self { tasks } = self;

        match tasks.entry(task) {
            Entry::Vacant(entry) => {
                entry.insert(ticks);
                0
            }
            Entry::Occupied(mut entry) => {
                let last = entry.insert(ticks);
                ticks.since(last)
            }
        }
    }

    /// returns the number of threads ever observed.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASK: TaskId = TaskId { pid: 10, tid: 10 };

    #[test]
    fn first_observation_is_zero() {
        let mut registry = Registry::new();
        assert_eq!(registry.observe(TASK, UserHz::new(500)), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn subsequent_observations_are_deltas() {
        let mut registry = Registry::new();
        let deltas = [500, 600, 600, 750, 1000]
            .map(UserHz::new)
            .map(|ticks| registry.observe(TASK, ticks));
        assert_eq!(deltas, [0, 100, 0, 150, 250]);
    }

    #[test]
    fn counter_going_backwards_is_negative() {
        let mut registry = Registry::new();
        registry.observe(TASK, UserHz::new(500));
        assert_eq!(registry.observe(TASK, UserHz::new(450)), -50);
        assert_eq!(registry.observe(TASK, UserHz::new(460)), 10);
    }

    /// threads are keyed by both their process and thread ids.
    #[test]
    fn identities_are_distinct() {
        let mut registry = Registry::new();
        let a = TaskId { pid: 1, tid: 2 };
        let b = TaskId { pid: 2, tid: 1 };
        let c = TaskId { pid: 1, tid: 1 };

        assert_eq!(registry.observe(a, UserHz::new(10)), 0);
        assert_eq!(registry.observe(b, UserHz::new(20)), 0);
        assert_eq!(registry.observe(c, UserHz::new(30)), 0);
        assert_eq!(registry.observe(a, UserHz::new(15)), 5);
        assert_eq!(registry.observe(b, UserHz::new(20)), 0);
        assert_eq!(registry.observe(c, UserHz::new(31)), 1);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn never_shrinks() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        let mut last = 0;
        for round in 0..4 {
            for tid in 0..=round {
                registry.observe(TaskId { pid: 1, tid }, UserHz::new(round as u64));
            }
            assert!(registry.len() >= last);
            last = registry.len();
        }
        assert_eq!(last, 4);
    }
}
