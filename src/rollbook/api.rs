//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single entry
//! point for every student operation, whichever UI is driving it.
//!
//! ## Role and Responsibilities
//!
//! - **Dispatches** to the matching command
//! - **Owns the query cache handle** so reads and mutations see the same entries
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no validation, formatting or I/O of its own.
//!
//! ## Generic Over StudentBackend
//!
//! `StudentApi<B: StudentBackend>`:
//! - Production: `StudentApi<HttpBackend>`
//! - Testing: `StudentApi<InMemoryBackend>`

use crate::cache::QueryCache;
use crate::commands;
use crate::error::Result;
use crate::model::{StudentDraft, StudentPatch};
use crate::store::StudentBackend;

/// The main API facade for rollbook operations.
pub struct StudentApi<B: StudentBackend> {
    backend: B,
    cache: QueryCache,
}

impl<B: StudentBackend> StudentApi<B> {
    pub fn new(backend: B, cache: QueryCache) -> Self {
        Self { backend, cache }
    }

    pub async fn list_students(&self, search: Option<&str>) -> Result<commands::CmdResult> {
        commands::list::run(&self.backend, &self.cache, search).await
    }

    pub async fn refetch_students(&self, search: Option<&str>) -> Result<commands::CmdResult> {
        commands::list::refetch(&self.backend, &self.cache, search).await
    }

    pub async fn get_student(&self, id: i64) -> Result<commands::CmdResult> {
        commands::get::run(&self.backend, id).await
    }

    pub async fn create_student(&self, draft: &StudentDraft) -> Result<commands::CmdResult> {
        commands::create::run(&self.backend, &self.cache, draft).await
    }

    pub async fn update_student(
        &self,
        id: i64,
        draft: &StudentDraft,
    ) -> Result<commands::CmdResult> {
        commands::update::run(&self.backend, &self.cache, id, draft).await
    }

    pub async fn patch_student(
        &self,
        id: i64,
        patch: &StudentPatch,
    ) -> Result<commands::CmdResult> {
        commands::patch::run(&self.backend, &self.cache, id, patch).await
    }

    pub async fn delete_student(&self, id: i64) -> Result<commands::CmdResult> {
        commands::delete::run(&self.backend, &self.cache, id).await
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

pub use commands::{CmdMessage, CmdResult, MessageLevel};
