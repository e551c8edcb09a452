//! # Praetor Core
//!
//! Core types and traits for the Praetor request/response validation layer.
//!
//! This crate provides the foundational types used throughout Praetor:
//!
//! - [`Schema`] - The single "validate and coerce" capability every schema engine implements
//! - [`SchemaError`] - Structured validation error reported by a schema
//! - [`Part`] - One of the five independently validated request facets
//! - [`InvalidRecord`] - Per-request aggregate of which parts failed validation
//! - [`ValidationOptions`] / [`RouterOpts`] - Per-route and process-wide configuration
//! - [`PraetorError`] - Standard error type, including the request abort primitive
//! - [`RequestId`] - UUID v7 request identifier

#![doc(html_root_url = "https://docs.rs/praetor-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod id;
pub mod invalid;
pub mod options;
pub mod part;
pub mod schema;

pub use error::{PraetorError, PraetorResult, VALIDATION_ERROR_CODE};
pub use id::RequestId;
pub use invalid::InvalidRecord;
pub use options::{RouterOpts, ValidationOptions, ValidationOptionsBuilder};
pub use part::{validate_part, validate_value, FailureRecord, Part, PartResult};
pub use schema::{BoxFuture, FnSchema, Issue, Schema, SchemaError, SharedSchema, SyncFnSchema};
