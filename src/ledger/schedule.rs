use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// How many nonce increments cooperative mining performs between yields,
/// indexed by difficulty (entry 0 is difficulty 1).
///
/// Higher difficulties yield less often: each yield has a fixed cost and the
/// search itself grows ~16x per difficulty step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct YieldSchedule {
    intervals: Vec<u64>,
}

impl YieldSchedule {
    pub fn new(intervals: Vec<u64>) -> Result<Self> {
        if intervals.is_empty() {
            return Err(LedgerError::config("yield schedule must not be empty"));
        }
        if intervals.iter().any(|&i| i == 0) {
            return Err(LedgerError::config("yield intervals must be >= 1"));
        }
        Ok(Self { intervals })
    }

    /// Yield interval for `difficulty`. Difficulties past the end of the
    /// table reuse its last entry; difficulty 0 uses the first.
    pub fn interval_for(&self, difficulty: u32) -> u64 {
        let idx = (difficulty.max(1) as usize - 1).min(self.intervals.len() - 1);
        self.intervals[idx]
    }

    pub fn intervals(&self) -> &[u64] {
        &self.intervals
    }
}

impl Default for YieldSchedule {
    fn default() -> Self {
        Self {
            intervals: vec![1, 3, 50, 500],
        }
    }
}

impl TryFrom<Vec<u64>> for YieldSchedule {
    type Error = LedgerError;

    fn try_from(intervals: Vec<u64>) -> Result<Self> {
        Self::new(intervals)
    }
}

impl From<YieldSchedule> for Vec<u64> {
    fn from(schedule: YieldSchedule) -> Self {
        schedule.intervals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_and_clamping() {
        let s = YieldSchedule::default();
        assert_eq!(s.interval_for(0), 1);
        assert_eq!(s.interval_for(1), 1);
        assert_eq!(s.interval_for(2), 3);
        assert_eq!(s.interval_for(3), 50);
        assert_eq!(s.interval_for(4), 500);
        assert_eq!(s.interval_for(9), 500);
    }

    #[test]
    fn rejects_empty_or_zero_intervals() {
        assert!(YieldSchedule::new(vec![]).is_err());
        assert!(YieldSchedule::new(vec![1, 0, 5]).is_err());
        assert!(YieldSchedule::new(vec![7]).is_ok());
    }

    #[test]
    fn deserializes_from_plain_list() {
        let s: YieldSchedule = serde_json::from_str("[2, 4, 8]").unwrap();
        assert_eq!(s.intervals(), &[2, 4, 8]);
        assert!(serde_json::from_str::<YieldSchedule>("[]").is_err());
    }
}
