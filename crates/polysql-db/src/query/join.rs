//! Join specifications and the JOIN-clause compiler.
//!
//! A [`JoinSpec`] names a foreign-key field on the primary model plus the
//! columns wanted from the table it references. Joins never default to "all
//! fields": the requested list must be explicit and non-empty.

use polysql_core::{SqlError, SqlResult};

use super::dialect::Dialect;
use super::selection::{select_prefixed, Selection};
use crate::model::{ModelRegistry, ModelSchema};

/// The kind of SQL join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinKind {
    /// `LEFT JOIN`
    #[default]
    Left,
    /// `RIGHT JOIN`
    Right,
    /// `INNER JOIN`
    Inner,
}

impl JoinKind {
    /// Returns the SQL keyword pair.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Inner => "INNER JOIN",
        }
    }
}

/// One join through a foreign-key field of the primary model.
///
/// # Examples
///
/// ```
/// use polysql_db::query::join::{JoinKind, JoinSpec};
///
/// let join = JoinSpec::inner("author_id").fields(["id", "username"]);
/// assert_eq!(join.kind, JoinKind::Inner);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSpec {
    /// The field on the primary model that carries the foreign key.
    #[serde(alias = "keyField")]
    pub foreign_key_field: String,
    /// Columns to select from the joined table.
    #[serde(default, alias = "fields")]
    pub requested_fields: Option<Vec<String>>,
    /// The join kind.
    #[serde(default)]
    pub kind: JoinKind,
}

impl JoinSpec {
    /// Creates a join of the given kind with no fields requested yet.
    pub fn new(kind: JoinKind, foreign_key_field: impl Into<String>) -> Self {
        Self {
            foreign_key_field: foreign_key_field.into(),
            requested_fields: None,
            kind,
        }
    }

    /// A `LEFT JOIN`.
    pub fn left(foreign_key_field: impl Into<String>) -> Self {
        Self::new(JoinKind::Left, foreign_key_field)
    }

    /// A `RIGHT JOIN`.
    pub fn right(foreign_key_field: impl Into<String>) -> Self {
        Self::new(JoinKind::Right, foreign_key_field)
    }

    /// An `INNER JOIN`.
    pub fn inner(foreign_key_field: impl Into<String>) -> Self {
        Self::new(JoinKind::Inner, foreign_key_field)
    }

    /// Sets the columns to select from the joined table.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requested_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

/// The output of [`compile_joins`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledJoins {
    /// JOIN clauses separated by single spaces. Empty when there are none.
    pub clause: String,
    /// Extra columns to append after the primary table's own.
    pub selection: Selection,
}

/// Compiles joins from `schema` to the models they reference.
///
/// Target models are looked up in `registry` by the foreign key's
/// `target_model`.
pub fn compile_joins(
    dialect: &dyn Dialect,
    registry: &ModelRegistry,
    schema: &ModelSchema,
    joins: &[JoinSpec],
) -> SqlResult<CompiledJoins> {
    let mut clauses = Vec::with_capacity(joins.len());
    let mut selection = Selection::default();

    for join in joins {
        let requested = match join.requested_fields.as_deref() {
            Some(fields) if !fields.is_empty() => fields,
            _ => {
                return Err(SqlError::InvalidJoin(format!(
                    "join through '{}' must list the fields to select",
                    join.foreign_key_field
                )))
            }
        };

        let field = schema.require_field(&join.foreign_key_field)?;
        let fk = field.foreign_key.as_ref().ok_or_else(|| {
            SqlError::InvalidJoin(format!(
                "'{}.{}' is not a foreign key",
                schema.table_name(),
                field.name
            ))
        })?;
        let target = registry.get(&fk.target_model).ok_or_else(|| {
            SqlError::InvalidJoin(format!(
                "'{}.{}' references unregistered model '{}'",
                schema.table_name(),
                field.name,
                fk.target_model
            ))
        })?;

        clauses.push(format!(
            "{} {} ON {} = {}",
            join.kind.as_sql(),
            dialect.quote(target.table_name()),
            dialect.qualify(schema.table_name(), &fk.local_field),
            dialect.qualify(target.table_name(), &fk.linked_field),
        ));
        selection.extend(select_prefixed(dialect, target, requested)?);
    }

    Ok(CompiledJoins {
        clause: clauses.join(" "),
        selection,
    })
}
