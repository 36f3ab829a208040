use std::time::{Duration, Instant};

use chrono::NaiveDate;
use dashmap::DashMap;

/// External calendar blocks have no change signal, so entries also age out.
const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Per-(date, duration) cache of resolved slot lists. Booking writes
/// invalidate the touched dates; settings writes clear everything.
pub struct SlotCache {
    entries: DashMap<(NaiveDate, i32), (Instant, Vec<String>)>,
    ttl: Duration,
}

impl SlotCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, date: NaiveDate, duration_min: i32) -> Option<Vec<String>> {
        let key = (date, duration_min);
        if let Some(entry) = self.entries.get(&key) {
            if entry.0.elapsed() <= self.ttl {
                return Some(entry.1.clone());
            }
        }
        self.entries.remove(&key);
        None
    }

    pub fn insert(&self, date: NaiveDate, duration_min: i32, slots: Vec<String>) {
        self.entries.insert((date, duration_min), (Instant::now(), slots));
    }

    /// Drops every duration entry for the date.
    pub fn invalidate_date(&self, date: NaiveDate) {
        self.entries.retain(|key, _| key.0 != date);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for SlotCache {
    fn default() -> Self {
        Self::new()
    }
}
