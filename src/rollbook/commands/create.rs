use crate::cache::{QueryCache, STUDENTS_FAMILY};
use crate::commands::{ensure_valid, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::StudentDraft;
use crate::store::StudentBackend;
use crate::validation::validate_draft;
use tracing::info;

/// Validates the values as entered, then sends them trimmed.
pub async fn run<B: StudentBackend>(
    backend: &B,
    cache: &QueryCache,
    draft: &StudentDraft,
) -> Result<CmdResult> {
    ensure_valid(validate_draft(draft))?;
    let draft = draft.trimmed();

    let student = backend.create(&draft).await?;
    cache.invalidate_family(STUDENTS_FAMILY);
    info!(id = student.id, roll_number = %student.roll_number, "student created");

    Ok(CmdResult::default()
        .with_affected_students(vec![student])
        .with_message(CmdMessage::success("Student added successfully!")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::list;
    use crate::error::RollbookError;
    use crate::model::Field;
    use crate::store::memory::fixtures::BackendFixture;

    #[tokio::test(start_paused = true)]
    async fn created_student_shows_up_in_next_list() {
        let backend = BackendFixture::new().with_students(2).backend;
        let cache = QueryCache::default();
        let before = list::run(&backend, &cache, None).await.unwrap();
        assert_eq!(before.listed_students.len(), 2);

        let draft = StudentDraft::new("Ada Lovelace", "ada@example.com", "CS-001");
        let result = run(&backend, &cache, &draft).await.unwrap();
        let created = result.student().unwrap().clone();
        assert_eq!(created.id, 3);
        assert_eq!(created.name, "Ada Lovelace");

        let after = list::run(&backend, &cache, None).await.unwrap();
        assert_eq!(after.listed_students.len(), 3);
        assert!(after.listed_students.iter().any(|s| s.id == created.id));
    }

    #[tokio::test]
    async fn invalid_draft_sends_nothing() {
        let backend = BackendFixture::new().backend;
        let cache = QueryCache::default();

        let draft = StudentDraft::new("Ada", "not-an-email", "CS-001");
        let err = run(&backend, &cache, &draft).await.unwrap_err();

        assert!(matches!(
            err,
            RollbookError::Validation {
                field: Field::Email,
                ..
            }
        ));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn values_are_trimmed_before_sending() {
        let backend = BackendFixture::new().backend;
        let cache = QueryCache::default();

        let draft = StudentDraft::new("  Ada  ", "ada@example.com", "CS-001");
        let result = run(&backend, &cache, &draft).await.unwrap();
        let created = result.student().unwrap();
        assert_eq!(created.name, "Ada");
        assert_eq!(created.email, "ada@example.com");
    }

    #[tokio::test]
    async fn padded_email_is_rejected_like_the_form() {
        let backend = BackendFixture::new().backend;
        let cache = QueryCache::default();

        let draft = StudentDraft::new("Ada", " ada@example.com", "CS-001");
        let err = run(&backend, &cache, &draft).await.unwrap_err();

        assert!(matches!(
            err,
            RollbookError::Validation {
                field: Field::Email,
                ..
            }
        ));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_create_keeps_cache() {
        let backend = BackendFixture::new()
            .with_student("Ada", "ada@example.com", "CS-001")
            .backend;
        let cache = QueryCache::default();
        list::run(&backend, &cache, None).await.unwrap();

        let draft = StudentDraft::new("Ada Again", "ada@example.com", "CS-002");
        let err = run(&backend, &cache, &draft).await.unwrap_err();
        assert_eq!(err.as_api().unwrap().code, "DUPLICATE_EMAIL");

        list::run(&backend, &cache, None).await.unwrap();
        assert_eq!(backend.request_count(), 2);
    }
}
