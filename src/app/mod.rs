//! Startup wiring: one explicit context owning every long-lived component.

/// The application context.
pub mod context;
