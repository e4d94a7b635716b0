//! # Core Traits (Ports)
//!
//! Any storage or time source must implement these traits to be used by the engine.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::error::Result;

/// The four named collections held by the entity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Donors,
    Requests,
    Units,
    Matches,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Donors,
        Collection::Requests,
        Collection::Units,
        Collection::Matches,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Donors => "donors",
            Collection::Requests => "requests",
            Collection::Units => "units",
            Collection::Matches => "matches",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whole-collection persistence contract.
///
/// `load` returns an empty list when nothing has been stored yet. `save` replaces
/// the entire collection. There is no partial write and no multi-collection
/// transaction.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait CollectionStore: Send + Sync {
    fn load(&self, collection: Collection) -> Result<Vec<serde_json::Value>>;
    fn save(&self, collection: Collection, records: &[serde_json::Value]) -> Result<()>;
}

/// Source of "now" for cooldown, expiry and timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::days(2));
        assert_eq!(clock.now().date_naive(), NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
    }

    #[test]
    fn collection_names_are_stable() {
        let names: Vec<_> = Collection::ALL.iter().map(Collection::name).collect();
        assert_eq!(names, ["donors", "requests", "units", "matches"]);
    }
}
