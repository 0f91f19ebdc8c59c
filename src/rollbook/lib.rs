//! # Rollbook Architecture
//!
//! Rollbook is a **UI-agnostic student records client**. The terminal binary is one
//! client of this library; the same core could sit behind a TUI or a browser app.
//!
//! The server is the only authority over student data. Rollbook reads and mutates it
//! through four HTTP endpoints, validates forms before anything leaves the machine,
//! and keeps a short-lived query cache so views do not refetch on every render.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders output, prompts, exit codes    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  UI State (form.rs, view.rs, dialog.rs, notify.rs)          │
//! │  - Form state machine, selection/overlay state, toasts      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, owns the query cache handle   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Validation, cache-through reads, invalidating mutations  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Backend Layer (store/)                                     │
//! │  - StudentBackend trait                                     │
//! │  - HttpBackend (production), InMemoryBackend (testing)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Everything except `cli/` and `main.rs`:
//! - Takes regular Rust arguments and returns `Result<T>`
//! - **Never** writes to stdout/stderr (diagnostics go through `tracing`)
//! - **Never** calls `std::process::exit`
//!
//! ## Error Contract
//!
//! Whatever shape the server uses for a rejection, callers see a single
//! [`error::ApiError`]. Anything that is not an API rejection is shown to users as
//! a generic fallback, see [`error::RollbookError::user_message`].
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Logic for each operation
//! - [`store`]: Backend abstraction and implementations
//! - [`cache`]: Keyed query cache with a staleness window
//! - [`model`]: Core data types (`Student`, `StudentDraft`, `StudentPatch`)
//! - [`validation`]: Field rules shared by forms and commands
//! - [`form`]: Create/edit form state machine
//! - [`view`]: Selection, overlays, search and refresh orchestration
//! - [`dialog`]: Delete confirmation
//! - [`notify`]: Transient notifications
//! - [`config`]: Configuration management
//! - [`error`]: Error types and server error normalization

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod dialog;
pub mod error;
pub mod form;
pub mod model;
pub mod notify;
pub mod store;
pub mod validation;
pub mod view;
