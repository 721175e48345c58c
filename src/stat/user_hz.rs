use std::{ops::Add, str::FromStr};

/// an amount of cpu time, in clock ticks.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct UserHz(u64);

// === impl UserHz ===

impl UserHz {
    /// the number of clock ticks in a second.
    ///
    /// this can be obtained via `getconf(1)` and `CLK_TCK`, or `sysconf(_SC_CLK_TCK)`. usually,
    /// this is 100Hz, so it is hard-coded for now.
    pub const FREQ: Self = Self(100);

    pub const fn new(ticks: u64) -> Self {
        Self(ticks)
    }

    pub const fn get(self) -> u64 {
        let Self(ticks) = self;
        ticks
    }

    /// returns the signed number of ticks elapsed since `earlier`.
    ///
    /// this is negative if the counter went backwards.
    pub fn since(self, earlier: Self) -> i64 {
        let (Self(now), Self(then)) = (self, earlier);
        now.wrapping_sub(then) as i64
    }
}

impl FromStr for UserHz {
    type Err = <u64 as FromStr>::Err;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl Add for UserHz {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        let (Self(lhs), Self(rhs)) = (self, rhs);
        Self(lhs.saturating_add(rhs))
    }
}
