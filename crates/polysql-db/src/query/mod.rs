//! Statement compilation and result reconstruction.
//!
//! This module contains the complete compile pipeline:
//!
//! - [`dialect`] - The three target dialects and their selection from settings
//! - [`cursor`] - Per-statement placeholder numbering and parameter collection
//! - [`params`] - Positional values and type-tagged Data API parameters
//! - [`selection`] - Field selection and output names
//! - [`filter`] - Filter expressions and the WHERE-clause compiler
//! - [`join`] - Join specifications and the JOIN-clause compiler
//! - [`compiler`] - SELECT/INSERT/UPDATE/DELETE assembly
//! - [`result`] - Mapping driver rows back to named records

pub mod compiler;
pub mod cursor;
pub mod dialect;
pub mod filter;
pub mod join;
pub mod params;
pub mod result;
pub mod selection;

pub use compiler::{
    CompiledQuery, DeleteQuery, Limit, OrderBy, QueryCompiler, Record, SelectQuery, StatementKind,
    UpdateQuery,
};
pub use cursor::{Binder, ParameterCursor};
pub use dialect::{
    dialect_for, dialect_from_settings, DataApiDialect, Dialect, Driver, Engine, MySqlDialect,
    PlaceholderStyle, PostgresDialect,
};
pub use filter::{compile_filter, Condition, Conditions, FilterExpression, Operand, Operator};
pub use join::{compile_joins, CompiledJoins, JoinKind, JoinSpec};
pub use params::{QueryParams, SqlParameter, TypedValue};
pub use result::{reconstruct, reconstruct_data_api, FromValue, QueryResult, Row};
pub use selection::{select_fields, FieldSelector, Selection};
