use std::time::Duration;

use serde::Serialize;

use super::outcome::as_millis;

/// Aggregate of repeated step durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingStats {
    /// Number of measured iterations.
    pub count: usize,
    /// Fastest iteration.
    #[serde(rename = "minMs", serialize_with = "as_millis")]
    pub min: Duration,
    /// Slowest iteration.
    #[serde(rename = "maxMs", serialize_with = "as_millis")]
    pub max: Duration,
    /// Average over all iterations.
    #[serde(rename = "meanMs", serialize_with = "as_millis")]
    pub mean: Duration,
}

impl TimingStats {
    /// Computes the statistics, `None` for no durations.
    pub fn from_durations(durations: &[Duration]) -> Option<Self> {
        let min = durations.iter().min().copied()?;
        let max = durations.iter().max().copied()?;
        let total: Duration = durations.iter().sum();
        let count = durations.len();
        let mean = total / u32::try_from(count).ok()?;

        Some(Self {
            count,
            min,
            max,
            mean,
        })
    }

    /// Returns `true` when the mean stays within `threshold`.
    pub fn mean_within(&self, threshold: Duration) -> bool {
        self.mean <= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_durations() {
        assert_eq!(TimingStats::from_durations(&[]), None);
    }

    #[test]
    fn test_stats() {
        let durations = [
            Duration::from_millis(4),
            Duration::from_millis(10),
            Duration::from_millis(7),
        ];

        let stats = TimingStats::from_durations(&durations).expect("non-empty");

        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, Duration::from_millis(4));
        assert_eq!(stats.max, Duration::from_millis(10));
        assert_eq!(stats.mean, Duration::from_millis(7));
        assert!(stats.mean_within(Duration::from_millis(7)));
        assert!(!stats.mean_within(Duration::from_millis(6)));
    }

    #[test]
    fn test_serialize_in_millis() {
        let stats = TimingStats::from_durations(&[Duration::from_micros(1500)]).expect("non-empty");

        let json = serde_json::to_string(&stats).expect("serializable");

        insta::assert_snapshot!(json, @r#"{"count":1,"minMs":1.5,"maxMs":1.5,"meanMs":1.5}"#);
    }
}
