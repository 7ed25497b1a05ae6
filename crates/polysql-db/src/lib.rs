//! # polysql-db
//!
//! The statement compiler of polysql. Given a model's field registry
//! ([`ModelSchema`](model::ModelSchema)) and a dialect-agnostic statement
//! description, [`QueryCompiler`](query::QueryCompiler) produces SQL text and
//! parameters for one of three targets:
//!
//! - MySQL through a native driver (`?` placeholders);
//! - PostgreSQL through a native driver (`$1, $2, ...` placeholders);
//! - either engine behind a Data API proxy (`:name` placeholders with
//!   type-tagged parameter values).
//!
//! Nothing here executes SQL. Rows a driver returns can be mapped back onto
//! the compiled field names with [`reconstruct`](query::reconstruct).
//!
//! ## Module Overview
//!
//! - [`model`] - [`ModelSchema`](model::ModelSchema) and [`ModelRegistry`](model::ModelRegistry)
//! - [`fields`] - Field definitions ([`FieldDef`](fields::FieldDef)) and types
//! - [`value`] - The backend-agnostic [`Value`](value::Value) enum
//! - [`query`] - Dialects, filters, joins, statement assembly, and results

// These clippy lints are intentionally allowed for the compiler crate:
// - struct_excessive_bools: FieldConstraints is a flat set of column flags
// - cast_precision_loss: i64-to-f64 casts are acceptable for doubleValue wrapping
// - result_large_err: SqlError is the crate error type and should be used consistently
// - format_push_string: format! with push_str is clearer than write! for SQL generation
// - doc_markdown: backtick requirements for documentation items are too strict
// - return_self_not_must_use: builder pattern methods are self-documenting
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::result_large_err)]
#![allow(clippy::format_push_string)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::match_same_arms)]

pub mod fields;
pub mod model;
pub mod query;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use fields::{FieldDef, SqlType, Visibility};
pub use model::{ModelRegistry, ModelSchema};
pub use query::{
    CompiledQuery, Conditions, DeleteQuery, FieldSelector, FilterExpression, JoinSpec, Operand,
    QueryCompiler, Record, Row, SelectQuery, UpdateQuery,
};
pub use value::Value;
