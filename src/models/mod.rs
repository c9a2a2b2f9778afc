//! Shared types used across all modules.
//!
//! This module defines the core data structures for the change snapshot,
//! check results, and the gate decision. Other modules import from here
//! rather than reaching into each other's internals.

pub mod change;
pub mod result;

pub use change::{AffectedFile, ChangeContext, FileAction, ScmKind};
pub use result::{GateDecision, ResultItem, Severity, Summary};
