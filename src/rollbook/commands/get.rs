use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::StudentBackend;

/// Fetches one student. Single records are not cached.
pub async fn run<B: StudentBackend>(backend: &B, id: i64) -> Result<CmdResult> {
    let student = backend.get(id).await?;
    Ok(CmdResult::default().with_listed_students(vec![student]))
}
