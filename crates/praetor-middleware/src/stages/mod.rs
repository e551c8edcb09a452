//! Middleware stages.
//!
//! - [`validation`] - Request and response validation against route schemas

pub mod validation;

pub use validation::ValidationMiddleware;
