//! # View Orchestration
//!
//! [`StudentView`] is the UI-only state of the student screen: what the lists
//! show, which student is open in the detail panel, and which overlay (add form,
//! edit form, delete confirmation) is up. None of it is domain state. The server
//! owns the records and the lists here are just the last thing a query returned.
//!
//! At most one overlay is open at a time, so at most one mutation can be pending.
//! That is the only concurrency guard; the overlay's own loading flag keeps a
//! second click on the same control from sending a duplicate request.
//!
//! After a successful mutation the cache is already invalidated by the command
//! layer and the view refreshes both active queries (unfiltered and search).
//! Callers must not assume the toast and the refreshed list appear in a
//! particular order.

use crate::api::StudentApi;
use crate::dialog::DeleteDialog;
use crate::error::RollbookError;
use crate::form::StudentForm;
use crate::model::Student;
use crate::notify::Notifications;
use crate::store::StudentBackend;
use tracing::warn;

pub const DELETE_FALLBACK: &str = "Failed to delete student. Please try again.";
pub const LOAD_FALLBACK: &str = "Failed to load students. Please try again.";
pub const NO_STUDENTS: &str = "No students found";
pub const NO_SEARCH_RESULTS: &str = "No student found with this roll number or name";

#[derive(Debug, Clone, Default)]
pub enum Overlay {
    #[default]
    None,
    Add(StudentForm),
    Edit(StudentForm),
    ConfirmDelete(DeleteDialog),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent: no form open, invalid fields, or a submit already in flight
    Blocked,
    Saved,
    Failed,
}

#[derive(Debug, Default)]
pub struct StudentView {
    search_term: String,
    all_students: Vec<Student>,
    results: Vec<Student>,
    selected: Option<Student>,
    overlay: Overlay,
    show_list: bool,
    load_error: Option<String>,
}

impl StudentView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn is_searching(&self) -> bool {
        !self.search_term.is_empty()
    }

    pub fn all_students(&self) -> &[Student] {
        &self.all_students
    }

    /// Search results; empty when no search is active.
    pub fn results(&self) -> &[Student] {
        &self.results
    }

    pub fn total_count(&self) -> usize {
        self.all_students.len()
    }

    pub fn selected(&self) -> Option<&Student> {
        self.selected.as_ref()
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn show_list(&self) -> bool {
        self.show_list
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// The empty-state text for whichever list is on screen, if that list is empty.
    pub fn empty_message(&self) -> Option<&'static str> {
        if self.is_searching() {
            self.results.is_empty().then_some(NO_SEARCH_RESULTS)
        } else {
            self.all_students.is_empty().then_some(NO_STUDENTS)
        }
    }

    /// Loads both active queries. Fresh cache entries are reused.
    pub async fn refresh<B: StudentBackend>(&mut self, api: &StudentApi<B>) {
        self.load(api, false).await;
    }

    /// Loads both active queries from the server, ignoring the cache.
    pub async fn reload<B: StudentBackend>(&mut self, api: &StudentApi<B>) {
        self.load(api, true).await;
    }

    async fn load<B: StudentBackend>(&mut self, api: &StudentApi<B>, force: bool) {
        self.load_error = None;

        let all = if force {
            api.refetch_students(None).await
        } else {
            api.list_students(None).await
        };
        match all {
            Ok(result) => self.all_students = result.listed_students,
            Err(err) => {
                warn!(error = %err, "loading students failed");
                self.load_error = Some(err.user_message(LOAD_FALLBACK));
            }
        }

        if !self.is_searching() {
            self.results.clear();
            return;
        }
        let term = self.search_term.clone();
        let found = if force {
            api.refetch_students(Some(&term)).await
        } else {
            api.list_students(Some(&term)).await
        };
        match found {
            Ok(result) => self.results = result.listed_students,
            Err(err) => {
                warn!(error = %err, %term, "search failed");
                self.results.clear();
                self.load_error = Some(err.user_message(LOAD_FALLBACK));
            }
        }
    }

    /// Runs a search. Triggered explicitly (Enter or the search action), never per keystroke.
    pub async fn search<B: StudentBackend>(&mut self, api: &StudentApi<B>, term: &str) {
        self.search_term = term.to_string();
        self.refresh(api).await;
    }

    pub async fn clear_search<B: StudentBackend>(&mut self, api: &StudentApi<B>) {
        self.search(api, "").await;
    }

    /// Opens the detail panel and collapses the roll-number list.
    pub fn select(&mut self, student: Student) {
        self.selected = Some(student);
        self.show_list = false;
    }

    pub fn select_by_id(&mut self, id: i64) -> bool {
        let found = self
            .results
            .iter()
            .chain(self.all_students.iter())
            .find(|s| s.id == id)
            .cloned();
        match found {
            Some(student) => {
                self.select(student);
                true
            }
            None => false,
        }
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    pub fn toggle_list(&mut self) {
        self.show_list = !self.show_list;
        self.selected = None;
    }

    pub fn open_add(&mut self) -> bool {
        self.open(Overlay::Add(StudentForm::create()))
    }

    pub fn open_edit(&mut self, student: &Student) -> bool {
        self.open(Overlay::Edit(StudentForm::edit(student)))
    }

    pub fn request_delete(&mut self, student: &Student) -> bool {
        self.open(Overlay::ConfirmDelete(DeleteDialog::new(student.clone())))
    }

    /// Replacing an overlay is refused while its request is in flight.
    fn open(&mut self, overlay: Overlay) -> bool {
        if self.overlay_busy() {
            return false;
        }
        self.overlay = overlay;
        true
    }

    pub fn cancel_overlay(&mut self) -> bool {
        self.open(Overlay::None)
    }

    pub fn overlay_busy(&self) -> bool {
        match &self.overlay {
            Overlay::None => false,
            Overlay::Add(form) | Overlay::Edit(form) => form.is_loading(),
            Overlay::ConfirmDelete(dialog) => dialog.is_loading(),
        }
    }

    pub fn form(&self) -> Option<&StudentForm> {
        match &self.overlay {
            Overlay::Add(form) | Overlay::Edit(form) => Some(form),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut StudentForm> {
        match &mut self.overlay {
            Overlay::Add(form) | Overlay::Edit(form) => Some(form),
            _ => None,
        }
    }

    pub fn delete_dialog(&self) -> Option<&DeleteDialog> {
        match &self.overlay {
            Overlay::ConfirmDelete(dialog) => Some(dialog),
            _ => None,
        }
    }

    /// Submits the open add/edit form.
    ///
    /// Failures stay inline in the form; success closes the overlay, toasts, keeps
    /// the detail panel in step with the saved record and refreshes the lists.
    pub async fn submit_form<B: StudentBackend>(
        &mut self,
        api: &StudentApi<B>,
        notes: &mut Notifications,
    ) -> SubmitOutcome {
        let Some(form) = self.form_mut() else {
            return SubmitOutcome::Blocked;
        };
        let Some(draft) = form.begin_submit() else {
            return SubmitOutcome::Blocked;
        };
        let editing = form.editing().map(|s| s.id);

        let result = match editing {
            Some(id) => api.update_student(id, &draft).await,
            None => api.create_student(&draft).await,
        };

        // The overlay cannot change while the form is loading.
        let Some(form) = self.form_mut() else {
            return SubmitOutcome::Blocked;
        };
        match result {
            Ok(result) => {
                let Some(saved) = result.student().cloned() else {
                    let err = RollbookError::MalformedResponse("no student returned".into());
                    form.finish_submit(Err(&err));
                    return SubmitOutcome::Failed;
                };
                form.finish_submit(Ok(&saved));
                self.overlay = Overlay::None;
                if self.selected.as_ref().is_some_and(|s| s.id == saved.id) {
                    self.selected = Some(saved);
                }
                notes.extend(&result.messages);
                self.refresh(api).await;
                SubmitOutcome::Saved
            }
            Err(err) => {
                warn!(error = %err, "saving student failed");
                form.finish_submit(Err(&err));
                SubmitOutcome::Failed
            }
        }
    }

    /// Confirms the pending delete.
    ///
    /// Failures go to a toast and leave the dialog open for a retry. Success closes
    /// the dialog and the detail panel if it showed the deleted record.
    pub async fn confirm_delete<B: StudentBackend>(
        &mut self,
        api: &StudentApi<B>,
        notes: &mut Notifications,
    ) -> SubmitOutcome {
        let Overlay::ConfirmDelete(dialog) = &mut self.overlay else {
            return SubmitOutcome::Blocked;
        };
        if !dialog.begin() {
            return SubmitOutcome::Blocked;
        }
        let id = dialog.student().id;

        let result = api.delete_student(id).await;

        if let Overlay::ConfirmDelete(dialog) = &mut self.overlay {
            dialog.finish();
        }
        match result {
            Ok(result) => {
                if self.selected.as_ref().is_some_and(|s| s.id == id) {
                    self.selected = None;
                }
                self.overlay = Overlay::None;
                notes.extend(&result.messages);
                self.refresh(api).await;
                SubmitOutcome::Saved
            }
            Err(err) => {
                warn!(error = %err, id, "deleting student failed");
                notes.error(err.user_message(DELETE_FALLBACK));
                SubmitOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::QueryCache;
    use crate::error::ApiError;
    use crate::form::{FormStatus, ADD_FALLBACK};
    use crate::model::Field;
    use crate::store::memory::fixtures::BackendFixture;
    use crate::commands::MessageLevel;
    use crate::store::memory::InMemoryBackend;

    fn api_with(backend: InMemoryBackend) -> StudentApi<InMemoryBackend> {
        StudentApi::new(backend, QueryCache::default())
    }

    fn fill(view: &mut StudentView, name: &str, email: &str, roll: &str) {
        let form = view.form_mut().unwrap();
        form.set(Field::Name, name);
        form.set(Field::Email, email);
        form.set(Field::RollNumber, roll);
    }

    #[tokio::test(start_paused = true)]
    async fn create_scenario_increments_total() {
        let api = api_with(BackendFixture::new().with_students(2).backend);
        let mut notes = Notifications::default();
        let mut view = StudentView::new();
        view.refresh(&api).await;
        assert_eq!(view.total_count(), 2);

        assert!(view.open_add());
        fill(&mut view, "Ada Lovelace", "ada@example.com", "CS-001");
        let outcome = view.submit_form(&api, &mut notes).await;

        assert_eq!(outcome, SubmitOutcome::Saved);
        assert!(matches!(view.overlay(), Overlay::None));
        assert_eq!(view.total_count(), 3);
        let ada = view
            .all_students()
            .iter()
            .find(|s| s.roll_number == "CS-001")
            .unwrap();
        assert!(ada.id > 0);
        assert_eq!(notes.active()[0].message, "Student added successfully!");
    }

    #[tokio::test]
    async fn invalid_form_sends_nothing() {
        let api = api_with(InMemoryBackend::new());
        let mut notes = Notifications::default();
        let mut view = StudentView::new();

        view.open_add();
        fill(&mut view, "Ada", "ada@", "CS-001");
        let outcome = view.submit_form(&api, &mut notes).await;

        assert_eq!(outcome, SubmitOutcome::Blocked);
        assert_eq!(api.backend().request_count(), 0);
        assert_eq!(view.form().unwrap().status(), FormStatus::Invalid);
    }

    #[tokio::test]
    async fn server_error_message_shows_inline() {
        let backend = InMemoryBackend::new();
        backend.fail_next(
            ApiError::from_response(
                409,
                br#"{"detail":"Email already exists","code":"DUPLICATE_EMAIL"}"#,
            )
            .into(),
        );
        let api = api_with(backend);
        let mut notes = Notifications::default();
        let mut view = StudentView::new();

        view.open_add();
        fill(&mut view, "Ada", "ada@example.com", "CS-001");
        let outcome = view.submit_form(&api, &mut notes).await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        let form = view.form().unwrap();
        assert_eq!(form.submit_error(), Some("Email already exists"));
        assert!(notes.active().is_empty());
    }

    #[tokio::test]
    async fn network_error_shows_fallback_inline() {
        let backend = InMemoryBackend::new();
        backend.fail_next(RollbookError::Network("connection refused".into()));
        let api = api_with(backend);
        let mut notes = Notifications::default();
        let mut view = StudentView::new();

        view.open_add();
        fill(&mut view, "Ada", "ada@example.com", "CS-001");
        view.submit_form(&api, &mut notes).await;

        assert_eq!(view.form().unwrap().submit_error(), Some(ADD_FALLBACK));
    }

    #[tokio::test(start_paused = true)]
    async fn editing_selected_student_updates_detail_panel() {
        let api = api_with(
            BackendFixture::new()
                .with_student("Ada", "ada@example.com", "CS-001")
                .backend,
        );
        let mut notes = Notifications::default();
        let mut view = StudentView::new();
        view.refresh(&api).await;
        assert!(view.select_by_id(1));

        let student = view.selected().unwrap().clone();
        view.open_edit(&student);
        view.form_mut().unwrap().set(Field::Name, "Ada Lovelace");
        let outcome = view.submit_form(&api, &mut notes).await;

        assert_eq!(outcome, SubmitOutcome::Saved);
        assert_eq!(view.selected().unwrap().name, "Ada Lovelace");
        assert_eq!(view.all_students()[0].name, "Ada Lovelace");
    }

    #[tokio::test(start_paused = true)]
    async fn deleting_selected_student_closes_detail() {
        let api = api_with(BackendFixture::new().with_students(3).backend);
        let mut notes = Notifications::default();
        let mut view = StudentView::new();
        view.refresh(&api).await;
        assert!(view.select_by_id(2));

        let student = view.selected().unwrap().clone();
        assert!(view.request_delete(&student));
        let outcome = view.confirm_delete(&api, &mut notes).await;

        assert_eq!(outcome, SubmitOutcome::Saved);
        assert!(view.selected().is_none());
        assert!(view.all_students().iter().all(|s| s.id != 2));
        assert_eq!(view.total_count(), 2);
        assert_eq!(notes.active()[0].message, "Student deleted successfully");
    }

    #[tokio::test(start_paused = true)]
    async fn deleting_other_student_keeps_detail() {
        let api = api_with(BackendFixture::new().with_students(2).backend);
        let mut notes = Notifications::default();
        let mut view = StudentView::new();
        view.refresh(&api).await;
        view.select_by_id(1);

        let other = view.all_students()[1].clone();
        view.request_delete(&other);
        view.confirm_delete(&api, &mut notes).await;

        assert_eq!(view.selected().map(|s| s.id), Some(1));
    }

    #[tokio::test]
    async fn failed_delete_toasts_and_keeps_dialog() {
        let api = api_with(BackendFixture::new().with_students(1).backend);
        let mut notes = Notifications::default();
        let mut view = StudentView::new();
        view.refresh(&api).await;

        let student = view.all_students()[0].clone();
        view.request_delete(&student);
        api.backend()
            .fail_next(RollbookError::MalformedResponse("bad json".into()));
        let outcome = view.confirm_delete(&api, &mut notes).await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        let dialog = view.delete_dialog().unwrap();
        assert!(!dialog.is_loading());
        let toast = &notes.active()[0];
        assert_eq!(toast.level, MessageLevel::Error);
        assert_eq!(toast.message, DELETE_FALLBACK);
        assert!(api.backend().contains(student.id));

        let retry = view.confirm_delete(&api, &mut notes).await;
        assert_eq!(retry, SubmitOutcome::Saved);
        assert!(view.delete_dialog().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reload_bypasses_fresh_cache() {
        let api = api_with(BackendFixture::new().with_students(2).backend);
        let mut view = StudentView::new();
        view.search(&api, "Student 1").await;
        assert_eq!(api.backend().request_count(), 2);

        view.refresh(&api).await;
        assert_eq!(api.backend().request_count(), 2);

        view.reload(&api).await;
        assert_eq!(api.backend().request_count(), 4);
        assert_eq!(view.results().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn whitespace_search_is_sent_as_typed() {
        let api = api_with(
            BackendFixture::new()
                .with_student("Ada Lovelace", "ada@example.com", "CS-001")
                .with_student("Plato", "plato@example.com", "PH-001")
                .backend,
        );
        let mut view = StudentView::new();

        view.search(&api, " ").await;
        assert!(view.is_searching());
        assert_eq!(view.results().len(), 1);
        assert_eq!(view.results()[0].name, "Ada Lovelace");
    }

    #[tokio::test(start_paused = true)]
    async fn nonexistent_search_shows_empty_state() {
        let api = api_with(BackendFixture::new().with_students(2).backend);
        let mut view = StudentView::new();

        view.search(&api, "nonexistent").await;
        assert!(view.results().is_empty());
        assert_eq!(view.empty_message(), Some(NO_SEARCH_RESULTS));
        assert_eq!(view.total_count(), 2);

        view.clear_search(&api).await;
        assert_eq!(view.empty_message(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn search_results_refresh_after_mutation() {
        let api = api_with(
            BackendFixture::new()
                .with_student("Ada", "ada@example.com", "CS-001")
                .backend,
        );
        let mut notes = Notifications::default();
        let mut view = StudentView::new();
        view.search(&api, "CS-").await;
        assert_eq!(view.results().len(), 1);

        view.open_add();
        fill(&mut view, "Grace Hopper", "grace@example.com", "CS-002");
        view.submit_form(&api, &mut notes).await;

        assert_eq!(view.results().len(), 2);
    }

    #[tokio::test]
    async fn overlays_are_exclusive_while_loading() {
        let api = api_with(BackendFixture::new().with_students(1).backend);
        let mut view = StudentView::new();
        view.refresh(&api).await;
        let student = view.all_students()[0].clone();

        view.open_add();
        assert!(view.request_delete(&student));
        assert!(view.form().is_none());

        view.open_edit(&student);
        view.form_mut().unwrap().begin_submit().unwrap();
        assert!(view.overlay_busy());
        assert!(!view.cancel_overlay());
        assert!(!view.open_add());
    }

    #[test]
    fn toggling_list_clears_selection() {
        let mut view = StudentView::new();
        view.selected = Some(Student {
            id: 1,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            roll_number: "CS-001".into(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        });
        view.toggle_list();
        assert!(view.show_list());
        assert!(view.selected().is_none());
    }

    #[tokio::test]
    async fn load_failure_is_reported() {
        let backend = InMemoryBackend::new();
        backend.fail_next(RollbookError::Network("down".into()));
        let api = api_with(backend);
        let mut view = StudentView::new();

        view.refresh(&api).await;
        assert_eq!(view.load_error(), Some(LOAD_FALLBACK));
    }
}
