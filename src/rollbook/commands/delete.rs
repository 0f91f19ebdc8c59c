use crate::cache::{QueryCache, STUDENTS_FAMILY};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::StudentBackend;
use tracing::info;

pub async fn run<B: StudentBackend>(
    backend: &B,
    cache: &QueryCache,
    id: i64,
) -> Result<CmdResult> {
    let response = backend.delete(id).await?;
    cache.invalidate_family(STUDENTS_FAMILY);
    info!(id, server_message = %response.message, "student deleted");

    Ok(CmdResult::default().with_message(CmdMessage::success("Student deleted successfully")))
}
