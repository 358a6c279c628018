//! # Cadence Core Library
//!
//! The recurrence engine for the Cadence task manager: given a recurrence
//! pattern attached to a task, it computes the next occurrence date,
//! enumerates future occurrences, decides when a new concrete instance is
//! due, validates patterns, and renders them as display text.
//!
//! ## Features
//!
//! - **Typed Patterns**: frequencies are a sum type, so a rule can only
//!   carry the fields that are meaningful for it, while stored records
//!   keep their flat serialized shape
//! - **Exact Calendar Arithmetic**: month-length clamping, multi-day
//!   weekly selection, interval stepping, termination by date or count
//! - **Pure Computation**: no I/O, no clock reads, no shared state; every
//!   operation is deterministic over its inputs
//! - **Idempotent Materialization**: the due-instance decision is safe to
//!   re-run and flips off as soon as the created instance is supplied back
//!
//! ## Core Modules
//!
//! - [`models`]: Pattern, record, and instance data structures
//! - [`validate`]: Pattern invariant checks with collected error messages
//! - [`recurrence`]: Next-occurrence calculation and range enumeration
//! - [`materialize`]: Policy deciding when a new instance is due
//! - [`describe`]: Human-readable pattern descriptions
//! - [`error`]: Error types for the conversion boundary
//!
//! ## Example Usage
//!
//! ```rust
//! use cadence_core::models::RecurrencePattern;
//! use cadence_core::recurrence::RecurrenceManager;
//! use chrono::NaiveDate;
//!
//! let pattern = RecurrencePattern::weekly(1, [1, 3, 5]);
//! let manager = RecurrenceManager::new(pattern);
//!
//! // 2024-01-01 is a Monday; the next selected day is Wednesday.
//! let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! assert_eq!(
//!     manager.next_occurrence(monday),
//!     NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
//! );
//! ```

pub mod describe;
pub mod error;
pub mod materialize;
pub mod models;
pub mod recurrence;
pub mod validate;
