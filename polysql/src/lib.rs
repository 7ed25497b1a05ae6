//! # polysql
//!
//! A multi-dialect SQL statement compiler for ORM layers.
//!
//! This is the meta-crate that re-exports both sub-crates for convenient
//! access. You can depend on `polysql` to get everything, or depend on the
//! individual crates for finer-grained control.
//!
//! ```
//! use polysql::prelude::*;
//!
//! let users = ModelSchema::new("users")
//!     .field(FieldDef::new("id", SqlType::Int).primary_key())
//!     .field(FieldDef::new("active", SqlType::Bool));
//!
//! let compiled = QueryCompiler::data_api(Engine::PostgreSql)
//!     .select(&users, &SelectQuery::new().filter(Conditions::new().with("active", true)))
//!     .unwrap();
//! assert_eq!(
//!     compiled.sql,
//!     "SELECT \"users\".\"id\", \"users\".\"active\" FROM \"users\" WHERE \"users\".\"active\" = :active;"
//! );
//! ```

/// Error types, settings, and logging setup.
pub use polysql_core as core;

/// Field registry, statement compiler, and result reconstruction.
pub use polysql_db as db;

/// The types most programs need.
pub mod prelude {
    pub use polysql_core::{SqlError, SqlResult};
    pub use polysql_db::query::{
        CompiledQuery, Condition, Conditions, DeleteQuery, Engine, FieldSelector,
        FilterExpression, JoinSpec, Operand, Operator, OrderBy, QueryCompiler, Record,
        SelectQuery, UpdateQuery,
    };
    pub use polysql_db::{FieldDef, ModelRegistry, ModelSchema, SqlType, Value, Visibility};
}
