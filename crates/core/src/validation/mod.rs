//! Flow graph validation.
//!
//! Validation is a pure computation: it takes a document, returns a report,
//! and touches no shared state. Errors block promotion; warnings are
//! advisory and never affect validity.

mod report;
mod validator;

pub use report::{GraphViolation, ValidationReport};
pub use validator::validate;
