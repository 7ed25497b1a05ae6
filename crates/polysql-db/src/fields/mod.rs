//! Field definitions and types for the model registry.
//!
//! This module provides the [`FieldDef`] struct and [`SqlType`] enum that
//! describe model fields and the Data API value wrapper each type maps to.

pub mod types;

pub use types::{FieldConstraints, FieldDef, ForeignKey, SqlType, ValueKind, Visibility};
