//! SQL dialects.
//!
//! A [`Dialect`] owns everything that differs between target backends:
//! identifier quoting, placeholder syntax, and how a bound value is carried
//! to the driver. Three implementations exist:
//!
//! | Dialect | Placeholder | Carrier | Quote |
//! |---|---|---|---|
//! | [`MySqlDialect`] | `?` | positional values | `` ` `` |
//! | [`PostgresDialect`] | `$1, $2, ...` | positional values | `"` |
//! | [`DataApiDialect`] | `:name` | named, type-tagged parameters | `"` |

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use polysql_core::{DatabaseSettings, SqlError, SqlResult};

use super::cursor::Binder;
use super::params::TypedValue;
use crate::fields::ValueKind;
use crate::value::Value;

/// How a dialect marks parameters in SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?`
    PositionalAnonymous,
    /// `$N`
    PositionalNumbered,
    /// `:name`
    Named,
}

/// A target SQL convention for quoting and parameters.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// A short name for logs (e.g. "mysql").
    fn name(&self) -> &'static str;

    /// The identifier quote character.
    fn quote_char(&self) -> char;

    /// The placeholder style.
    fn placeholder_style(&self) -> PlaceholderStyle;

    /// Returns `true` if bound values must be tagged with a [`ValueKind`],
    /// which requires the field's declared type.
    fn tags_values(&self) -> bool {
        false
    }

    /// Binds one value and returns the placeholder that refers to it.
    ///
    /// `name` is the field (or qualified `table__column`) the value belongs
    /// to; `kind` is its resolved wrapper when [`tags_values`](Self::tags_values)
    /// is `true`.
    fn bind(
        &self,
        binder: &mut Binder,
        name: &str,
        kind: Option<ValueKind>,
        value: Value,
    ) -> SqlResult<String>;

    /// Quotes an identifier, doubling any embedded quote character.
    fn quote(&self, ident: &str) -> String {
        let q = self.quote_char();
        let escaped = ident.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }

    /// Renders a table-qualified column.
    fn qualify(&self, table: &str, column: &str) -> String {
        format!("{}.{}", self.quote(table), self.quote(column))
    }
}

/// MySQL with a native driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::PositionalAnonymous
    }

    fn bind(
        &self,
        binder: &mut Binder,
        _name: &str,
        _kind: Option<ValueKind>,
        value: Value,
    ) -> SqlResult<String> {
        binder.push_value(value)?;
        Ok("?".to_string())
    }
}

/// PostgreSQL with a native driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn quote_char(&self) -> char {
        '"'
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::PositionalNumbered
    }

    fn bind(
        &self,
        binder: &mut Binder,
        _name: &str,
        _kind: Option<ValueKind>,
        value: Value,
    ) -> SqlResult<String> {
        binder.push_value(value)?;
        let index = binder.cursor_mut().advance();
        Ok(format!("${index}"))
    }
}

/// Either engine behind a Data API proxy.
#[derive(Debug, Clone, Copy)]
pub struct DataApiDialect {
    engine: Engine,
}

impl DataApiDialect {
    /// Creates a Data API dialect for the given engine.
    pub const fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// The engine behind the proxy.
    pub const fn engine(&self) -> Engine {
        self.engine
    }
}

impl Dialect for DataApiDialect {
    fn name(&self) -> &'static str {
        match self.engine {
            Engine::MySql => "data-api/mysql",
            Engine::PostgreSql => "data-api/postgresql",
        }
    }

    fn quote_char(&self) -> char {
        '"'
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Named
    }

    fn tags_values(&self) -> bool {
        true
    }

    fn bind(
        &self,
        binder: &mut Binder,
        name: &str,
        kind: Option<ValueKind>,
        value: Value,
    ) -> SqlResult<String> {
        let kind = kind.unwrap_or_else(|| TypedValue::infer_kind(&value));
        let typed = TypedValue::wrap(kind, value)?;
        let used = binder.push_parameter(name, typed)?;
        Ok(format!(":{used}"))
    }
}

/// A database engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// MySQL / MariaDB.
    MySql,
    /// PostgreSQL.
    PostgreSql,
}

impl FromStr for Engine {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Self::PostgreSql),
            other => Err(SqlError::UnsupportedEngine(format!("engine '{other}'"))),
        }
    }
}

/// How the engine is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// A native wire-protocol driver.
    Native,
    /// A Data API HTTP proxy.
    DataApi,
}

impl FromStr for Driver {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "data-api" | "data_api" | "dataapi" => Ok(Self::DataApi),
            other => Err(SqlError::UnsupportedEngine(format!("driver '{other}'"))),
        }
    }
}

/// Returns the dialect for an engine/driver pair.
pub fn dialect_for(engine: Engine, driver: Driver) -> Arc<dyn Dialect> {
    match (engine, driver) {
        (Engine::MySql, Driver::Native) => Arc::new(MySqlDialect),
        (Engine::PostgreSql, Driver::Native) => Arc::new(PostgresDialect),
        (engine, Driver::DataApi) => Arc::new(DataApiDialect::new(engine)),
    }
}

/// Returns the dialect named by the database settings.
///
/// # Errors
///
/// Returns [`SqlError::UnsupportedEngine`] if the engine or driver string is
/// not recognized.
pub fn dialect_from_settings(settings: &DatabaseSettings) -> SqlResult<Arc<dyn Dialect>> {
    let engine: Engine = settings.engine.parse()?;
    let driver: Driver = settings.driver.parse()?;
    Ok(dialect_for(engine, driver))
}
