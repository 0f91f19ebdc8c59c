use crate::cache::{QueryCache, QueryKey};
use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::StudentBackend;
use tracing::debug;

/// Lists students, served from the cache while the entry is fresh.
///
/// The term goes to the server untouched. An empty term is the unfiltered list.
pub async fn run<B: StudentBackend>(
    backend: &B,
    cache: &QueryCache,
    search: Option<&str>,
) -> Result<CmdResult> {
    let key = QueryKey::students(search);

    if let Some(students) = cache.get_fresh(&key) {
        return Ok(CmdResult::default().with_listed_students(students));
    }

    debug!(%key, "fetching student list");
    let students = backend.list(key.search.as_deref()).await?;
    cache.insert(key, students.clone());
    Ok(CmdResult::default().with_listed_students(students))
}

/// Bypasses the cache, refreshing the entry with whatever the server returns.
pub async fn refetch<B: StudentBackend>(
    backend: &B,
    cache: &QueryCache,
    search: Option<&str>,
) -> Result<CmdResult> {
    let key = QueryKey::students(search);
    let students = backend.list(key.search.as_deref()).await?;
    cache.insert(key, students.clone());
    Ok(CmdResult::default().with_listed_students(students))
}
