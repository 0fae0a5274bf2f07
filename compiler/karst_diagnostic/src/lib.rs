//! Diagnostics for the Karst compiler.
//!
//! A `Diagnostic` is a severity, an error code, a message, and a set of
//! labeled source spans. Phases build diagnostics with the fluent
//! builder; the driver decides how to render them (the `Display` impl
//! gives a plain-text fallback).

mod diagnostic;
mod error_code;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
