use crate::cache::{QueryCache, STUDENTS_FAMILY};
use crate::commands::{ensure_valid, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::StudentPatch;
use crate::store::StudentBackend;
use crate::validation::validate_patch;
use tracing::info;

/// Partial update (PATCH). An empty patch is a no-op and sends nothing.
pub async fn run<B: StudentBackend>(
    backend: &B,
    cache: &QueryCache,
    id: i64,
    patch: &StudentPatch,
) -> Result<CmdResult> {
    if patch.is_empty() {
        return Ok(CmdResult::default().with_message(CmdMessage::info("Nothing to update.")));
    }

    ensure_valid(validate_patch(patch))?;
    let patch = StudentPatch {
        name: patch.name.as_deref().map(|s| s.trim().to_string()),
        email: patch.email.as_deref().map(|s| s.trim().to_string()),
        roll_number: patch.roll_number.as_deref().map(|s| s.trim().to_string()),
    };

    let student = backend.patch(id, &patch).await?;
    cache.invalidate_family(STUDENTS_FAMILY);
    info!(id = student.id, "student patched");

    Ok(CmdResult::default()
        .with_affected_students(vec![student])
        .with_message(CmdMessage::success("Student updated successfully!")))
}
