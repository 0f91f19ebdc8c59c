//! # Backend Layer
//!
//! The [`StudentBackend`] trait is the only way rollbook talks to the student service.
//! One method per endpoint; every method resolves to a parsed value or a
//! [`RollbookError`](crate::error::RollbookError).
//!
//! ## Implementations
//!
//! - [`http::HttpBackend`]: production client for the REST service
//!   ```text
//!   GET    /api/students?search=<s>   -> Student[]
//!   GET    /api/students/{id}         -> Student
//!   POST   /api/students              -> Student
//!   PUT    /api/students/{id}         -> Student
//!   PATCH  /api/students/{id}         -> Student
//!   DELETE /api/students/{id}         -> {message}
//!   ```
//!
//! - [`memory::InMemoryBackend`]: stand-in for the service in tests
//!   - No persistence
//!   - Mirrors the service's duplicate and not-found rejections
//!   - Counts requests so tests can assert that nothing was sent
//!
//! Search matching belongs to the server. Clients pass the raw term through and
//! render whatever comes back.

use crate::error::Result;
use crate::model::{DeleteResponse, Student, StudentDraft, StudentPatch};
use async_trait::async_trait;

pub mod http;
pub mod memory;

#[async_trait]
pub trait StudentBackend: Send + Sync {
    /// List students, filtered server-side when `search` is non-empty
    async fn list(&self, search: Option<&str>) -> Result<Vec<Student>>;

    async fn get(&self, id: i64) -> Result<Student>;

    async fn create(&self, draft: &StudentDraft) -> Result<Student>;

    /// Full replacement of the editable fields
    async fn update(&self, id: i64, draft: &StudentDraft) -> Result<Student>;

    /// Partial update; absent fields stay as they are
    async fn patch(&self, id: i64, patch: &StudentPatch) -> Result<Student>;

    async fn delete(&self, id: i64) -> Result<DeleteResponse>;
}
