use crate::model::Student;

pub const DELETE_TITLE: &str = "Delete Student";
pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this student? This action cannot be undone.";

/// Confirmation shown before a student is deleted.
#[derive(Debug, Clone)]
pub struct DeleteDialog {
    student: Student,
    loading: bool,
}

impl DeleteDialog {
    pub fn new(student: Student) -> Self {
        Self {
            student,
            loading: false,
        }
    }

    pub fn student(&self) -> &Student {
        &self.student
    }

    pub fn title(&self) -> &'static str {
        DELETE_TITLE
    }

    pub fn prompt(&self) -> &'static str {
        DELETE_PROMPT
    }

    /// One-line description of the record about to go.
    pub fn summary(&self) -> String {
        format!("{} ({})", self.student.name, self.student.roll_number)
    }

    /// Claims the confirm control. False while a delete is already in flight.
    pub fn begin(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    pub fn finish(&mut self) {
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
