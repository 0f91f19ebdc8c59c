//! # Student Form
//!
//! One form type serves both "Add Student" and "Edit Student".
//!
//! ```text
//! Pristine ──set──▶ Editing ──begin_submit──▶ (validate) ──▶ Invalid
//!                      ▲                          │
//!                      │                          └────────▶ Submitting ──▶ Succeeded
//!                      │                                         │
//!                      └────────────────set────────────── Failed ◀┘
//! ```
//!
//! Submitting is split in two so a UI can hold the loading flag across an await:
//! [`StudentForm::begin_submit`] hands out the trimmed draft (or nothing, when a
//! field is invalid or a submit is already in flight) and
//! [`StudentForm::finish_submit`] records the outcome.

use crate::error::RollbookError;
use crate::model::{Field, Student, StudentDraft};
use crate::validation::{validate_draft, validate_field, FieldErrors};
use std::collections::BTreeSet;

pub const ADD_FALLBACK: &str = "Failed to add student. Please try again.";
pub const UPDATE_FALLBACK: &str = "Failed to update student. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Student),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Pristine,
    Editing,
    Invalid,
    Valid,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct StudentForm {
    mode: FormMode,
    values: StudentDraft,
    errors: FieldErrors,
    touched: BTreeSet<Field>,
    status: FormStatus,
    submit_error: Option<String>,
}

impl StudentForm {
    pub fn create() -> Self {
        Self::with_mode(FormMode::Create, StudentDraft::default())
    }

    /// Seeds the fields from an existing record.
    pub fn edit(student: &Student) -> Self {
        Self::with_mode(FormMode::Edit(student.clone()), StudentDraft::from(student))
    }

    fn with_mode(mode: FormMode, values: StudentDraft) -> Self {
        Self {
            mode,
            values,
            errors: FieldErrors::new(),
            touched: BTreeSet::new(),
            status: FormStatus::Pristine,
            submit_error: None,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// The record being edited, if any.
    pub fn editing(&self) -> Option<&Student> {
        match &self.mode {
            FormMode::Edit(student) => Some(student),
            FormMode::Create => None,
        }
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.value(field)
    }

    pub fn values(&self) -> &StudentDraft {
        &self.values
    }

    /// Updates a field. Ignored while a submit is in flight.
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> bool {
        if self.status == FormStatus::Submitting {
            return false;
        }
        let value = value.into();
        match field {
            Field::Name => self.values.name = value,
            Field::Email => self.values.email = value,
            Field::RollNumber => self.values.roll_number = value,
        }
        self.status = FormStatus::Editing;
        true
    }

    /// Marks the field touched and re-checks it alone.
    pub fn blur(&mut self, field: Field) -> Option<&str> {
        self.touched.insert(field);
        match validate_field(field, self.values.value(field)) {
            Some(message) => {
                self.errors.insert(field, message);
                if self.status != FormStatus::Submitting {
                    self.status = FormStatus::Invalid;
                }
            }
            None => {
                self.errors.remove(&field);
            }
        }
        self.errors.get(&field).map(String::as_str)
    }

    /// Checks every field and touches all of them.
    pub fn validate(&mut self) -> bool {
        self.errors = validate_draft(&self.values);
        self.touched.extend(Field::ALL);
        let valid = self.errors.is_empty();
        self.status = if valid {
            FormStatus::Valid
        } else {
            FormStatus::Invalid
        };
        valid
    }

    /// The error to display next to a field. Untouched fields show nothing.
    pub fn visible_error(&self, field: Field) -> Option<&str> {
        if !self.touched.contains(&field) {
            return None;
        }
        self.errors.get(&field).map(String::as_str)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Starts a submit.
    ///
    /// Returns `None` without changing anything while a submit is in flight, or after
    /// flagging the failing fields when validation does not pass. Otherwise the form
    /// is `Submitting` and the returned draft has its values trimmed.
    pub fn begin_submit(&mut self) -> Option<StudentDraft> {
        if self.status == FormStatus::Submitting {
            return None;
        }
        self.submit_error = None;
        if !self.validate() {
            return None;
        }
        self.status = FormStatus::Submitting;
        Some(self.values.trimmed())
    }

    /// Records the outcome of the request started by [`begin_submit`](Self::begin_submit).
    pub fn finish_submit(&mut self, outcome: Result<&Student, &RollbookError>) {
        match outcome {
            Ok(student) => {
                self.values = StudentDraft::from(student);
                self.status = FormStatus::Succeeded;
            }
            Err(err) => {
                self.submit_error = Some(err.user_message(self.fallback_message()));
                if let Some(field) = err.as_api().and_then(|api| api.form_field()) {
                    self.touched.insert(field);
                }
                self.status = FormStatus::Failed;
            }
        }
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Drives the submit control's loading state.
    pub fn is_loading(&self) -> bool {
        self.status == FormStatus::Submitting
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add New Student",
            FormMode::Edit(_) => "Edit Student",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add Student",
            FormMode::Edit(_) => "Update Student",
        }
    }

    fn fallback_message(&self) -> &'static str {
        match self.mode {
            FormMode::Create => ADD_FALLBACK,
            FormMode::Edit(_) => UPDATE_FALLBACK,
        }
    }
}
