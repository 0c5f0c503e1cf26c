//! Core of the dream interpreter backend.
//!
//! This crate has no database or HTTP dependencies — it defines the domain
//! types, the error taxonomy, the storage/interpreter port traits, and the
//! submission workflow (`DreamService`). Postgres adapters live in
//! `oneiro-postgres`, LLM clients in `oneiro-llm`, the HTTP surface in
//! `oneiro-server`.

pub mod error;
pub mod ports;
pub mod service;
pub mod types;

pub use error::{DreamError, Result};
pub use ports::{DreamStore, Interpreter, OperationLogStore, ProfileStore};
pub use service::DreamService;
pub use types::{
    DreamRecord, DreamStatus, OperationKind, Profile, SubmissionOutcome, DEFAULT_CREDIT_GRANT,
};
