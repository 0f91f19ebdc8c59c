use super::StudentBackend;
use crate::error::{ApiError, Result, RollbookError};
use crate::model::{DeleteResponse, Student, StudentDraft, StudentPatch};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory stand-in for the student service, for testing and development.
/// Does NOT persist data.
///
/// Clones share the same records, so a test can keep a handle for inspection
/// after moving another into a [`StudentApi`](crate::api::StudentApi).
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    inner: Arc<Mutex<Inner>>,
    requests: Arc<AtomicUsize>,
}

#[derive(Default)]
struct Inner {
    students: BTreeMap<i64, Student>,
    next_id: i64,
    fail_next: Option<RollbookError>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests served so far, failed ones included.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// The next request fails with `err` instead of touching any record.
    pub fn fail_next(&self, err: RollbookError) {
        self.lock().fail_next = Some(err);
    }

    pub fn len(&self) -> usize {
        self.lock().students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: i64) -> bool {
        self.lock().students.contains_key(&id)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock only happens in a failing test.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Counts the request and hands out the store, or the injected failure.
    fn begin(&self) -> Result<MutexGuard<'_, Inner>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.lock();
        match inner.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(inner),
        }
    }
}

impl Inner {
    fn find(&self, id: i64) -> Result<&Student> {
        self.students.get(&id).ok_or_else(|| not_found().into())
    }

    fn check_unique(&self, email: Option<&str>, roll_number: Option<&str>, except: i64) -> Result<()> {
        let others = || self.students.values().filter(move |s| s.id != except);

        if let Some(email) = email {
            if others().any(|s| s.email == email) {
                return Err(ApiError::new(
                    409,
                    "DUPLICATE_EMAIL",
                    "A student with this email already exists",
                )
                .with_field("email")
                .into());
            }
        }
        if let Some(roll_number) = roll_number {
            if others().any(|s| s.roll_number == roll_number) {
                return Err(ApiError::new(
                    409,
                    "DUPLICATE_ROLL_NUMBER",
                    "A student with this roll number already exists",
                )
                .with_field("roll_number")
                .into());
            }
        }
        Ok(())
    }
}

fn not_found() -> ApiError {
    ApiError::new(404, "NOT_FOUND", "Student not found").with_field("id")
}

#[async_trait]
impl StudentBackend for InMemoryBackend {
    async fn list(&self, search: Option<&str>) -> Result<Vec<Student>> {
        let inner = self.begin()?;
        let term = search.filter(|s| !s.is_empty()).map(str::to_lowercase);

        Ok(inner
            .students
            .values()
            .filter(|s| match &term {
                Some(t) => {
                    s.name.to_lowercase().contains(t)
                        || s.email.to_lowercase().contains(t)
                        || s.roll_number.to_lowercase().contains(t)
                }
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Student> {
        let inner = self.begin()?;
        inner.find(id).cloned()
    }

    async fn create(&self, draft: &StudentDraft) -> Result<Student> {
        let mut inner = self.begin()?;
        inner.check_unique(Some(&draft.email), Some(&draft.roll_number), 0)?;

        inner.next_id += 1;
        let now = Utc::now();
        let student = Student {
            id: inner.next_id,
            name: draft.name.clone(),
            email: draft.email.clone(),
            roll_number: draft.roll_number.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn update(&self, id: i64, draft: &StudentDraft) -> Result<Student> {
        let mut inner = self.begin()?;
        inner.find(id)?;
        inner.check_unique(Some(&draft.email), Some(&draft.roll_number), id)?;

        let student = inner.students.get_mut(&id).ok_or_else(not_found)?;
        student.name = draft.name.clone();
        student.email = draft.email.clone();
        student.roll_number = draft.roll_number.clone();
        student.updated_at = Utc::now();
        Ok(student.clone())
    }

    async fn patch(&self, id: i64, patch: &StudentPatch) -> Result<Student> {
        let mut inner = self.begin()?;
        inner.find(id)?;
        inner.check_unique(patch.email.as_deref(), patch.roll_number.as_deref(), id)?;

        let student = inner.students.get_mut(&id).ok_or_else(not_found)?;
        patch.apply_to(student);
        student.updated_at = Utc::now();
        Ok(student.clone())
    }

    async fn delete(&self, id: i64) -> Result<DeleteResponse> {
        let mut inner = self.begin()?;
        if inner.students.remove(&id).is_none() {
            return Err(not_found().into());
        }
        Ok(DeleteResponse {
            message: "Student deleted successfully".to_string(),
        })
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    pub struct BackendFixture {
        pub backend: InMemoryBackend,
    }

    impl Default for BackendFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl BackendFixture {
        pub fn new() -> Self {
            Self {
                backend: InMemoryBackend::new(),
            }
        }

        /// Seeds `count` students named "Student N" with roll numbers `R-00N`.
        pub fn with_students(self, count: usize) -> Self {
            for i in 1..=count {
                self.seed(StudentDraft::new(
                    format!("Student {}", i),
                    format!("student{}@example.com", i),
                    format!("R-{:03}", i),
                ));
            }
            self
        }

        pub fn with_student(self, name: &str, email: &str, roll_number: &str) -> Self {
            self.seed(StudentDraft::new(name, email, roll_number));
            self
        }

        /// Seeding does not count as a request.
        fn seed(&self, draft: StudentDraft) {
            let mut inner = self.backend.lock();
            inner.next_id += 1;
            let now = Utc::now();
            let student = Student {
                id: inner.next_id,
                name: draft.name,
                email: draft.email,
                roll_number: draft.roll_number,
                created_at: now,
                updated_at: now,
            };
            inner.students.insert(student.id, student);
        }
    }
}
