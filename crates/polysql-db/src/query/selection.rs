//! Field selection: which columns a SELECT returns and under which names.
//!
//! The compiler resolves a [`FieldSelector`] against a model's registry and
//! produces both the column list for the SQL text and the ordered list of
//! output names that the result reconstructor later zips with each row.

use polysql_core::{SqlError, SqlResult};

use super::dialect::Dialect;
use crate::fields::{FieldDef, Visibility};
use crate::model::ModelSchema;

/// The columns requested by a SELECT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldSelector {
    /// Every field visible under the compiler's privacy mode.
    #[default]
    All,
    /// Only these fields, in this order. Unknown names are dropped.
    ///
    /// An explicit list is not subject to the privacy mode; an empty list
    /// behaves like [`All`](Self::All).
    Named(Vec<String>),
    /// A column list spliced verbatim.
    ///
    /// Nothing is checked or quoted and no output names are known, so rows
    /// cannot be reconstructed by name. Never pass untrusted input here.
    Raw(String),
}

impl FieldSelector {
    /// Selects the given fields.
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Named(names.into_iter().map(Into::into).collect())
    }

    /// Selects a raw column list.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }
}

/// A resolved selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Rendered column expressions, in output order.
    pub columns: Vec<String>,
    /// Output names, one per column. Empty for a raw selection.
    pub aliases: Vec<String>,
}

impl Selection {
    /// Returns the comma-separated column list.
    pub fn sql(&self) -> String {
        self.columns.join(", ")
    }

    /// Appends another selection after this one.
    pub fn extend(&mut self, other: Self) {
        self.columns.extend(other.columns);
        self.aliases.extend(other.aliases);
    }

    fn push(&mut self, column: String, alias: String) {
        self.columns.push(column);
        self.aliases.push(alias);
    }
}

/// Resolves a selector for the model's own table.
///
/// Each column renders as `table.field`, or `table.field AS alias` when the
/// field declares a distinct alias.
pub fn select_fields(
    dialect: &dyn Dialect,
    schema: &ModelSchema,
    selector: &FieldSelector,
    privacy: Visibility,
) -> SqlResult<Selection> {
    if let FieldSelector::Raw(sql) = selector {
        return Ok(Selection {
            columns: vec![sql.clone()],
            aliases: Vec::new(),
        });
    }

    let fields = resolve(schema, selector, privacy)?;
    let table = schema.table_name();
    let mut selection = Selection::default();
    for field in fields {
        let column = dialect.qualify(table, &field.name);
        if field.has_distinct_alias() {
            let alias = field.output_name();
            selection.push(format!("{column} AS {}", dialect.quote(alias)), alias.to_string());
        } else {
            selection.push(column, field.name.clone());
        }
    }
    Ok(selection)
}

/// Resolves a join's requested fields on the joined table.
///
/// Every column renders as `table.field AS table__field` so that result rows
/// can be split back into per-table groups. Fails with
/// [`SqlError::InvalidJoin`] if none of the names exist.
pub fn select_prefixed(
    dialect: &dyn Dialect,
    schema: &ModelSchema,
    names: &[String],
) -> SqlResult<Selection> {
    let table = schema.table_name();
    let fields = known_fields(schema, names);
    if fields.is_empty() {
        return Err(SqlError::InvalidJoin(format!(
            "none of the fields {names:?} exist on '{table}'"
        )));
    }
    let mut selection = Selection::default();
    for field in fields {
        let alias = format!("{table}__{}", field.name);
        selection.push(
            format!(
                "{} AS {}",
                dialect.qualify(table, &field.name),
                dialect.quote(&alias)
            ),
            alias,
        );
    }
    Ok(selection)
}

fn resolve<'a>(
    schema: &'a ModelSchema,
    selector: &FieldSelector,
    privacy: Visibility,
) -> SqlResult<Vec<&'a FieldDef>> {
    let fields: Vec<&FieldDef> = match selector {
        FieldSelector::Named(names) if !names.is_empty() => known_fields(schema, names),
        _ => schema.visible_fields(privacy).collect(),
    };
    if fields.is_empty() {
        return Err(SqlError::InvalidSelection(format!(
            "no selectable fields on '{}'",
            schema.table_name()
        )));
    }
    Ok(fields)
}

fn known_fields<'a>(schema: &'a ModelSchema, names: &[String]) -> Vec<&'a FieldDef> {
    names
        .iter()
        .filter_map(|name| {
            let field = schema.get_field(name);
            if field.is_none() {
                tracing::debug!(
                    table = schema.table_name(),
                    field = %name,
                    "dropping unknown field from selection"
                );
            }
            field
        })
        .collect()
}
