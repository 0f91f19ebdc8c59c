use crate::cache::{QueryCache, STUDENTS_FAMILY};
use crate::commands::{ensure_valid, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::StudentDraft;
use crate::store::StudentBackend;
use crate::validation::validate_draft;
use tracing::info;

/// Full update (PUT): every editable field is replaced.
pub async fn run<B: StudentBackend>(
    backend: &B,
    cache: &QueryCache,
    id: i64,
    draft: &StudentDraft,
) -> Result<CmdResult> {
    ensure_valid(validate_draft(draft))?;
    let draft = draft.trimmed();

    let student = backend.update(id, &draft).await?;
    cache.invalidate_family(STUDENTS_FAMILY);
    info!(id = student.id, "student updated");

    Ok(CmdResult::default()
        .with_affected_students(vec![student])
        .with_message(CmdMessage::success("Student updated successfully!")))
}
