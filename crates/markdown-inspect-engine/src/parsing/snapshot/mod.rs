//! # Snapshot Testing Support
//!
//! Utilities for testing the pipeline via snapshot assertions and invariant
//! checks.
//!
//! ## Modules
//!
//! - **`normalize`**: Converts a [`Document`](crate::models::Document) to a
//!   compact, stable `Snap` for `insta` debug snapshots
//! - **`invariants`**: Runtime checks for offset fidelity (spans in bounds,
//!   sentences ordered and disjoint, one offset per content character)

pub mod invariants;
pub mod normalize;

pub use invariants::check as invariants;
pub use normalize::{Snap, normalize};
