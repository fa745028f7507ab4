use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Milliseconds since the Unix epoch.
///
/// `Timestamp::now()` never goes backwards within a process, even if the wall
/// clock does, so points stamped by successive cycles stay ordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn now() -> Self {
        CLOCK.now()
    }

    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn to_rfc3339(&self) -> String {
        match DateTime::<Utc>::from_timestamp_millis(self.0 as i64) {
            Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            None => self.0.to_string(),
        }
    }
}

impl std::ops::Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, duration: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(duration.as_millis() as u64))
    }
}

impl std::ops::Sub<Duration> for Timestamp {
    type Output = Timestamp;

    fn sub(self, duration: Duration) -> Timestamp {
        Timestamp(self.0.saturating_sub(duration.as_millis() as u64))
    }
}

impl std::ops::Sub for Timestamp {
    type Output = Duration;

    fn sub(self, other: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(other.0))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let parsed = DateTime::parse_from_rfc3339(&raw).map_err(serde::de::Error::custom)?;
        let millis = parsed.timestamp_millis();
        if millis < 0 {
            return Err(serde::de::Error::custom("timestamp before epoch"));
        }
        Ok(Timestamp(millis as u64))
    }
}

struct MonotonicClock {
    last: AtomicU64,
}

impl MonotonicClock {
    const fn new() -> Self {
        MonotonicClock { last: AtomicU64::new(0) }
    }

    fn now(&self) -> Timestamp {
        let wall_clock = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        // fetch_max returns the previous value; the clock reads the larger of the two
        let previous = self.last.fetch_max(wall_clock, Ordering::SeqCst);
        Timestamp(previous.max(wall_clock))
    }
}

static CLOCK: MonotonicClock = MonotonicClock::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_non_decreasing() {
        let mut last = Timestamp::now();
        for _ in 0..1000 {
            let next = Timestamp::now();
            assert!(next >= last);
            last = next;
        }
    }

    #[test]
    fn serializes_as_rfc3339_millis() {
        let ts = Timestamp::from_millis(1_700_000_000_123);
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2023-11-14T22:13:20.123Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn duration_arithmetic_saturates() {
        let ts = Timestamp::from_millis(1_000);
        assert_eq!((ts - Duration::from_secs(5)).as_millis(), 0);
        assert_eq!(Timestamp::from_millis(5_000) - ts, Duration::from_millis(4_000));
        assert_eq!(ts - Timestamp::from_millis(5_000), Duration::ZERO);
    }
}
