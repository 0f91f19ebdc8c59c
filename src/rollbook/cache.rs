//! # Query Cache
//!
//! Keyed cache of list query results. A key is a query family plus the search
//! term, so the unfiltered list and each typed search are cached separately:
//!
//! ```text
//! ("students", None)          <- unfiltered list, also used for ""
//! ("students", Some("cs-0"))  <- a search
//! ```
//!
//! Entries younger than the stale time are served without a request. A successful
//! mutation calls [`QueryCache::invalidate_family`], which marks every entry of the
//! family stale so the next read of each active query goes back to the server.
//!
//! Entries that are invalidated or older than [`DEFAULT_GC_TIME`] are dropped on
//! the next insert, so search terms typed once do not pile up.
//!
//! The cache is a cheap cloneable handle. It is created once at startup and
//! injected into [`StudentApi`](crate::api::StudentApi); clones share entries.
//! Nothing is persisted.

use crate::model::Student;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

pub const STUDENTS_FAMILY: &str = "students";
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(30);
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub family: &'static str,
    pub search: Option<String>,
}

impl QueryKey {
    /// Key for the student list. An empty term is the unfiltered list.
    pub fn students(search: Option<&str>) -> Self {
        Self {
            family: STUDENTS_FAMILY,
            search: search.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.search {
            Some(term) => write!(f, "{}?search={}", self.family, term),
            None => write!(f, "{}", self.family),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    students: Vec<Student>,
    fetched_at: Instant,
    invalidated: bool,
}

#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<QueryKey, Entry>>>,
    stale_time: Duration,
    gc_time: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_TIME)
    }
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            stale_time,
            gc_time: DEFAULT_GC_TIME.max(stale_time),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the cached value if it is neither invalidated nor older than the stale time.
    pub fn get_fresh(&self, key: &QueryKey) -> Option<Vec<Student>> {
        let entries = self.lock();
        let entry = entries.get(key)?;
        if entry.invalidated || entry.fetched_at.elapsed() >= self.stale_time {
            trace!(%key, "cache stale");
            return None;
        }
        trace!(%key, "cache hit");
        Some(entry.students.clone())
    }

    /// Stores a fresh result and evicts invalidated or long-unused entries.
    pub fn insert(&self, key: QueryKey, students: Vec<Student>) {
        let gc_time = self.gc_time;
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, e| !e.invalidated && e.fetched_at.elapsed() < gc_time);
        let evicted = before - entries.len();
        if evicted > 0 {
            trace!(evicted, "cache entries evicted");
        }
        entries.insert(
            key,
            Entry {
                students,
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    /// Marks every entry under `family` stale. Returns how many entries were affected.
    pub fn invalidate_family(&self, family: &str) -> usize {
        let mut entries = self.lock();
        let mut count = 0;
        for (_, entry) in entries.iter_mut().filter(|(k, _)| k.family == family) {
            entry.invalidated = true;
            count += 1;
        }
        trace!(family, count, "cache invalidated");
        count
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn student(id: i64) -> Student {
        let now = Utc::now();
        Student {
            id,
            name: format!("Student {}", id),
            email: format!("s{}@example.com", id),
            roll_number: format!("R-{}", id),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_search_shares_the_unfiltered_key() {
        assert_eq!(QueryKey::students(Some("")), QueryKey::students(None));
        assert_ne!(QueryKey::students(Some("ada")), QueryKey::students(None));
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_stale_time() {
        let cache = QueryCache::default();
        let key = QueryKey::students(None);
        cache.insert(key.clone(), vec![student(1)]);

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(cache.get_fresh(&key).map(|s| s.len()), Some(1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get_fresh(&key).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidation_hits_every_key_in_the_family() {
        let cache = QueryCache::default();
        cache.insert(QueryKey::students(None), vec![student(1)]);
        cache.insert(QueryKey::students(Some("ada")), vec![]);

        assert_eq!(cache.invalidate_family(STUDENTS_FAMILY), 2);
        assert!(cache.get_fresh(&QueryKey::students(None)).is_none());
        assert!(cache.get_fresh(&QueryKey::students(Some("ada"))).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reinsert_clears_invalidation() {
        let cache = QueryCache::default();
        let key = QueryKey::students(None);
        cache.insert(key.clone(), vec![]);
        cache.invalidate_family(STUDENTS_FAMILY);

        cache.insert(key.clone(), vec![student(2)]);
        assert_eq!(cache.get_fresh(&key).unwrap()[0].id, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn insert_evicts_invalidated_entries() {
        let cache = QueryCache::default();
        cache.insert(QueryKey::students(Some("ada")), vec![student(1)]);
        cache.insert(QueryKey::students(Some("alan")), vec![student(2)]);
        cache.invalidate_family(STUDENTS_FAMILY);

        cache.insert(QueryKey::students(None), vec![student(1), student(2)]);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn insert_evicts_long_unused_entries() {
        let cache = QueryCache::default();
        for term in ["a", "ab", "abc"] {
            cache.insert(QueryKey::students(Some(term)), vec![]);
        }

        tokio::time::advance(DEFAULT_GC_TIME).await;
        cache.insert(QueryKey::students(None), vec![student(1)]);
        assert_eq!(cache.len(), 1);

        tokio::time::advance(Duration::from_secs(60)).await;
        cache.insert(QueryKey::students(Some("ada")), vec![student(1)]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clones_share_entries() {
        let cache = QueryCache::default();
        let handle = cache.clone();
        cache.insert(QueryKey::students(None), vec![]);
        assert_eq!(handle.len(), 1);
    }
}
