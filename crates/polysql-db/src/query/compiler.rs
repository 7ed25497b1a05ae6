//! Statement assembly.
//!
//! [`QueryCompiler`] turns statement descriptions ([`SelectQuery`],
//! [`Record`], [`UpdateQuery`], [`DeleteQuery`]) into a [`CompiledQuery`]:
//! SQL text for the configured [`Dialect`] plus the parameters to send with
//! it and, for SELECT, the output column names.
//!
//! Every call builds its own parameter [`Binder`], so the compiler holds no
//! per-statement state and can be shared between threads.

use std::sync::Arc;

use polysql_core::logging::statement_span;
use polysql_core::{DatabaseSettings, SqlError, SqlResult, SETTINGS};

use super::cursor::Binder;
use super::dialect::{dialect_from_settings, DataApiDialect, Dialect, Engine, MySqlDialect, PostgresDialect};
use super::filter::{compile_filter, render_operand, split_qualified, FilterExpression, Operand};
use super::join::{compile_joins, JoinSpec};
use super::params::{QueryParams, SqlParameter};
use super::selection::{select_fields, FieldSelector};
use crate::fields::Visibility;
use crate::model::{ModelRegistry, ModelSchema};
use crate::value::Value;

/// The kind of statement being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `SELECT`
    Select,
    /// `INSERT`
    Insert,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
}

impl StatementKind {
    /// Returns the lowercase name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// A column ordering direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The column to order by. `table__column` names another table.
    pub column: String,
    /// Whether to sort in descending order.
    pub descending: bool,
}

impl OrderBy {
    /// Creates an ascending order.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Creates a descending order.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// A row limit with an optional offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    /// Maximum number of rows.
    pub count: u64,
    /// Rows to skip first.
    pub offset: Option<u64>,
}

/// A SELECT description.
///
/// # Examples
///
/// ```
/// use polysql_db::query::compiler::{OrderBy, QueryCompiler, SelectQuery};
/// use polysql_db::query::filter::Conditions;
/// use polysql_db::fields::{FieldDef, SqlType};
/// use polysql_db::model::ModelSchema;
///
/// let users = ModelSchema::new("users")
///     .field(FieldDef::new("id", SqlType::Int))
///     .field(FieldDef::new("username", SqlType::VarChar));
///
/// let query = SelectQuery::new()
///     .filter(Conditions::new().with("id", 3))
///     .order_by(OrderBy::desc("id"))
///     .limit(10);
/// let compiled = QueryCompiler::mysql().select(&users, &query).unwrap();
/// assert_eq!(
///     compiled.sql,
///     "SELECT `users`.`id`, `users`.`username` FROM `users` \
///      WHERE `users`.`id` = ? ORDER BY `users`.`id` DESC LIMIT 10;"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    /// The columns to return.
    pub fields: FieldSelector,
    /// Which rows to return. `None` returns every row.
    pub filter: Option<FilterExpression>,
    /// Joined tables, in clause order.
    pub joins: Vec<JoinSpec>,
    /// GROUP BY columns.
    pub group_by: Vec<String>,
    /// ORDER BY terms.
    pub order_by: Vec<OrderBy>,
    /// LIMIT and OFFSET.
    pub limit: Option<Limit>,
}

impl SelectQuery {
    /// Creates a query selecting every visible field of every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field selector.
    #[must_use]
    pub fn fields(mut self, fields: FieldSelector) -> Self {
        self.fields = fields;
        self
    }

    /// Sets the filter.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<FilterExpression>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Appends a join.
    #[must_use]
    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }

    /// Appends a GROUP BY column.
    #[must_use]
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    /// Appends an ORDER BY term.
    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    /// Limits the number of rows.
    #[must_use]
    pub const fn limit(mut self, count: u64) -> Self {
        self.limit = Some(Limit {
            count,
            offset: None,
        });
        self
    }

    /// Limits the number of rows after skipping `offset` of them.
    #[must_use]
    pub const fn limit_offset(mut self, count: u64, offset: u64) -> Self {
        self.limit = Some(Limit {
            count,
            offset: Some(offset),
        });
        self
    }
}

/// An ordered field -> operand payload for INSERT and UPDATE.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(Vec<(String, Operand)>);

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing an earlier value for it in place.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets a field, replacing an earlier value for it in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Operand>) {
        let field = field.into();
        let value = value.into();
        if let Some(slot) = self.0.iter_mut().find(|(f, _)| *f == field) {
            slot.1 = value;
        } else {
            self.0.push((field, value));
        }
    }

    /// Reads a record from a JSON object.
    ///
    /// Values follow the operand conventions of [`Operand::from_json`].
    pub fn from_json(json: &serde_json::Value) -> SqlResult<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(SqlError::InvalidPayload(format!(
                "payload must be an object, got {json}"
            )));
        };
        let mut record = Self::new();
        for (field, value) in map {
            record.insert(field.clone(), Operand::from_json(value));
        }
        Ok(record)
    }

    /// Iterates over the fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Operand)> {
        self.0.iter().map(|(f, v)| (f.as_str(), v))
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no fields are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An UPDATE description.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    /// The assignments.
    pub payload: Record,
    /// Which rows to update. Required; use [`FilterExpression::All`] to
    /// update every row.
    pub filter: Option<FilterExpression>,
    /// Joined tables, in clause order.
    pub joins: Vec<JoinSpec>,
}

impl UpdateQuery {
    /// Creates an update with the given assignments and no filter yet.
    pub fn new(payload: Record) -> Self {
        Self {
            payload,
            filter: None,
            joins: Vec::new(),
        }
    }

    /// Sets the filter.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<FilterExpression>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Appends a join.
    #[must_use]
    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }
}

/// A DELETE description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteQuery {
    /// Which rows to delete. Required; use [`FilterExpression::All`] to
    /// delete every row.
    pub filter: Option<FilterExpression>,
    /// Joined tables, in clause order.
    pub joins: Vec<JoinSpec>,
}

impl DeleteQuery {
    /// Creates a delete with the given filter.
    pub fn new(filter: impl Into<FilterExpression>) -> Self {
        Self {
            filter: Some(filter.into()),
            joins: Vec::new(),
        }
    }

    /// Deletes every row.
    pub fn all() -> Self {
        Self::new(FilterExpression::All)
    }

    /// Appends a join.
    #[must_use]
    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }
}

/// A compiled statement, ready for a driver.
///
/// Serializes as `{"sql": .., "values": [..], "fields": [..]}` for native
/// dialects and `{"sql": .., "parameters": [..], "fields": [..]}` for the
/// Data API. `fields` is omitted when empty.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CompiledQuery {
    /// The SQL text, terminated by `;`.
    pub sql: String,
    /// The bound parameters, in placeholder order.
    #[serde(flatten)]
    pub params: QueryParams,
    /// Output column names for SELECT, in column order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl CompiledQuery {
    /// Returns the positional values, if this is a native statement.
    pub fn values(&self) -> Option<&[Value]> {
        match &self.params {
            QueryParams::Values(values) => Some(values),
            QueryParams::Parameters(_) => None,
        }
    }

    /// Returns the named parameters, if this is a Data API statement.
    pub fn parameters(&self) -> Option<&[SqlParameter]> {
        match &self.params {
            QueryParams::Parameters(parameters) => Some(parameters),
            QueryParams::Values(_) => None,
        }
    }
}

/// Compiles statement descriptions for one dialect.
#[derive(Debug, Clone)]
pub struct QueryCompiler {
    dialect: Arc<dyn Dialect>,
    privacy: Visibility,
    registry: Arc<ModelRegistry>,
}

impl QueryCompiler {
    /// Creates a compiler for the given dialect in public mode with an
    /// empty model registry.
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            privacy: Visibility::Public,
            registry: Arc::new(ModelRegistry::new()),
        }
    }

    /// A MySQL native compiler.
    pub fn mysql() -> Self {
        Self::new(Arc::new(MySqlDialect))
    }

    /// A PostgreSQL native compiler.
    pub fn postgres() -> Self {
        Self::new(Arc::new(PostgresDialect))
    }

    /// A Data API compiler for the given engine.
    pub fn data_api(engine: Engine) -> Self {
        Self::new(Arc::new(DataApiDialect::new(engine)))
    }

    /// Creates a compiler from database settings.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::UnsupportedEngine`] for an unknown engine or
    /// driver and [`SqlError::ConfigurationError`] for an unknown privacy
    /// mode.
    pub fn from_settings(settings: &DatabaseSettings) -> SqlResult<Self> {
        let privacy: Visibility = settings.privacy.parse()?;
        Ok(Self::new(dialect_from_settings(settings)?).with_privacy(privacy))
    }

    /// Creates a compiler from the process-wide [`SETTINGS`].
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::ConfigurationError`] if the settings have not been
    /// configured, otherwise the errors of [`from_settings`](Self::from_settings).
    pub fn from_global_settings() -> SqlResult<Self> {
        if !SETTINGS.is_configured() {
            return Err(SqlError::ConfigurationError(
                "settings have not been configured".to_string(),
            ));
        }
        Self::from_settings(&SETTINGS.get().database)
    }

    /// Sets the privacy mode used when selecting every field.
    #[must_use]
    pub fn with_privacy(mut self, privacy: Visibility) -> Self {
        self.privacy = privacy;
        self
    }

    /// Sets the registry that join targets are resolved in.
    #[must_use]
    pub fn with_registry(mut self, registry: impl Into<Arc<ModelRegistry>>) -> Self {
        self.registry = registry.into();
        self
    }

    /// Returns the dialect.
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Returns the privacy mode.
    pub const fn privacy(&self) -> Visibility {
        self.privacy
    }

    /// Returns the model registry.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Compiles a SELECT.
    ///
    /// `SELECT <cols> FROM <table>[ <joins>][ WHERE ..][ GROUP BY ..][ ORDER BY ..][ LIMIT n[ OFFSET m]];`
    pub fn select(&self, schema: &ModelSchema, query: &SelectQuery) -> SqlResult<CompiledQuery> {
        let span = statement_span(StatementKind::Select.as_str(), schema.table_name());
        let _guard = span.enter();

        let dialect = self.dialect();
        let mut binder = Binder::new(dialect.placeholder_style());

        let mut selection = select_fields(dialect, schema, &query.fields, self.privacy)?;
        let joins = compile_joins(dialect, &self.registry, schema, &query.joins)?;
        let raw_selection = matches!(query.fields, FieldSelector::Raw(_));
        selection.extend(joins.selection);

        let mut sql = format!(
            "SELECT {} FROM {}",
            selection.sql(),
            dialect.quote(schema.table_name())
        );
        if !joins.clause.is_empty() {
            sql.push(' ');
            sql.push_str(&joins.clause);
        }
        if let Some(filter) = &query.filter {
            push_where(&mut sql, dialect, &self.registry, schema, filter, &mut binder)?;
        }
        if !query.group_by.is_empty() {
            let columns: Vec<String> = query
                .group_by
                .iter()
                .map(|c| self.column_ref(schema, c))
                .collect();
            sql.push_str(&format!(" GROUP BY {}", columns.join(", ")));
        }
        if !query.order_by.is_empty() {
            let terms: Vec<String> = query
                .order_by
                .iter()
                .map(|o| {
                    let direction = if o.descending { "DESC" } else { "ASC" };
                    format!("{} {direction}", self.column_ref(schema, &o.column))
                })
                .collect();
            sql.push_str(&format!(" ORDER BY {}", terms.join(", ")));
        }
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit.count));
            if let Some(offset) = limit.offset {
                sql.push_str(&format!(" OFFSET {offset}"));
            }
        }
        sql.push(';');

        let fields = if raw_selection {
            Vec::new()
        } else {
            selection.aliases
        };
        Ok(self.finish(sql, binder, fields))
    }

    /// Compiles an INSERT of one record.
    ///
    /// `INSERT INTO <table> (<cols>) VALUES (<values>);` with one entry per
    /// record field, in record order. Raw and function operands are spliced;
    /// column references are rejected.
    pub fn insert(&self, schema: &ModelSchema, record: &Record) -> SqlResult<CompiledQuery> {
        let span = statement_span(StatementKind::Insert.as_str(), schema.table_name());
        let _guard = span.enter();

        if record.is_empty() {
            return Err(SqlError::InvalidPayload(format!(
                "nothing to insert into '{}'",
                schema.table_name()
            )));
        }

        let dialect = self.dialect();
        let mut binder = Binder::new(dialect.placeholder_style());
        let mut columns = Vec::with_capacity(record.len());
        let mut values = Vec::with_capacity(record.len());
        for (name, operand) in record.iter() {
            let field = schema.require_field(name)?;
            if let Operand::Column { table, column } = operand {
                return Err(SqlError::InvalidPayload(format!(
                    "cannot insert column reference '{table}.{column}' into '{name}'"
                )));
            }
            let kind = dialect
                .tags_values()
                .then(|| field.sql_type.value_kind());
            columns.push(dialect.quote(&field.name));
            values.push(render_operand(dialect, &mut binder, name, kind, operand)?);
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({});",
            dialect.quote(schema.table_name()),
            columns.join(", "),
            values.join(", ")
        );
        Ok(self.finish(sql, binder, Vec::new()))
    }

    /// Compiles an UPDATE.
    ///
    /// `UPDATE <table>[ <joins>] SET <assignments>[ WHERE ..];`
    ///
    /// Assignment targets are qualified with the table name when joins are
    /// present.
    ///
    /// A filter is required. [`FilterExpression::All`] updates every row and
    /// is logged at warn level.
    pub fn update(&self, schema: &ModelSchema, query: &UpdateQuery) -> SqlResult<CompiledQuery> {
        let span = statement_span(StatementKind::Update.as_str(), schema.table_name());
        let _guard = span.enter();

        let filter = require_filter(StatementKind::Update, schema, query.filter.as_ref())?;
        if query.payload.is_empty() {
            return Err(SqlError::InvalidPayload(format!(
                "nothing to update on '{}'",
                schema.table_name()
            )));
        }

        let dialect = self.dialect();
        let mut binder = Binder::new(dialect.placeholder_style());
        let joins = compile_joins(dialect, &self.registry, schema, &query.joins)?;

        let mut assignments = Vec::with_capacity(query.payload.len());
        for (name, operand) in query.payload.iter() {
            let field = schema.require_field(name)?;
            let kind = dialect
                .tags_values()
                .then(|| field.sql_type.value_kind());
            let rhs = render_operand(dialect, &mut binder, name, kind, operand)?;
            let target = if joins.clause.is_empty() {
                dialect.quote(&field.name)
            } else {
                dialect.qualify(schema.table_name(), &field.name)
            };
            assignments.push(format!("{target} = {rhs}"));
        }

        let mut sql = format!("UPDATE {}", dialect.quote(schema.table_name()));
        if !joins.clause.is_empty() {
            sql.push(' ');
            sql.push_str(&joins.clause);
        }
        sql.push_str(" SET ");
        sql.push_str(&assignments.join(", "));
        push_where(&mut sql, dialect, &self.registry, schema, filter, &mut binder)?;
        sql.push(';');
        Ok(self.finish(sql, binder, Vec::new()))
    }

    /// Compiles a DELETE.
    ///
    /// `DELETE FROM <table>[ <joins>][ WHERE ..];`
    ///
    /// A filter is required. [`FilterExpression::All`] deletes every row and
    /// is logged at warn level.
    pub fn delete(&self, schema: &ModelSchema, query: &DeleteQuery) -> SqlResult<CompiledQuery> {
        let span = statement_span(StatementKind::Delete.as_str(), schema.table_name());
        let _guard = span.enter();

        let filter = require_filter(StatementKind::Delete, schema, query.filter.as_ref())?;
        let dialect = self.dialect();
        let mut binder = Binder::new(dialect.placeholder_style());
        let joins = compile_joins(dialect, &self.registry, schema, &query.joins)?;

        let mut sql = format!("DELETE FROM {}", dialect.quote(schema.table_name()));
        if !joins.clause.is_empty() {
            sql.push(' ');
            sql.push_str(&joins.clause);
        }
        push_where(&mut sql, dialect, &self.registry, schema, filter, &mut binder)?;
        sql.push(';');
        Ok(self.finish(sql, binder, Vec::new()))
    }

    /// Renders a GROUP BY / ORDER BY column, resolving `table__column`.
    fn column_ref(&self, schema: &ModelSchema, column: &str) -> String {
        match split_qualified(column) {
            Some((table, column)) => self.dialect.qualify(table, column),
            None => self.dialect.qualify(schema.table_name(), column),
        }
    }

    fn finish(&self, sql: String, binder: Binder, fields: Vec<String>) -> CompiledQuery {
        tracing::debug!(
            dialect = self.dialect.name(),
            sql = %sql,
            params = binder.len(),
            "compiled statement"
        );
        CompiledQuery {
            sql,
            params: binder.into_params(),
            fields,
        }
    }
}

fn require_filter<'a>(
    kind: StatementKind,
    schema: &ModelSchema,
    filter: Option<&'a FilterExpression>,
) -> SqlResult<&'a FilterExpression> {
    let filter = filter.ok_or_else(|| {
        SqlError::InvalidFilter(format!(
            "{} on '{}' requires a filter; pass the wildcard to touch every row",
            kind.as_str().to_uppercase(),
            schema.table_name()
        ))
    })?;
    if filter.is_all() {
        tracing::warn!(
            table = schema.table_name(),
            statement = kind.as_str(),
            "wildcard filter applies this statement to every row"
        );
    }
    Ok(filter)
}

fn push_where(
    sql: &mut String,
    dialect: &dyn Dialect,
    registry: &ModelRegistry,
    schema: &ModelSchema,
    filter: &FilterExpression,
    binder: &mut Binder,
) -> SqlResult<()> {
    let condition = compile_filter(dialect, registry, schema, filter, binder)?;
    if !condition.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&condition);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldDef, SqlType};
    use crate::query::filter::{Condition, Conditions, Operator};
    use crate::query::params::TypedValue;

    fn users() -> ModelSchema {
        ModelSchema::new("users")
            .field(FieldDef::new("id", SqlType::Int).primary_key())
            .field(FieldDef::new("username", SqlType::VarChar))
            .field(FieldDef::new("active", SqlType::Bool))
            .field(FieldDef::new("updated_at", SqlType::DateTime).visibility(Visibility::Protected))
    }

    fn registry() -> ModelRegistry {
        ModelRegistry::new().register(
            ModelSchema::new("teams")
                .field(FieldDef::new("id", SqlType::Int).primary_key())
                .field(FieldDef::new("name", SqlType::VarChar)),
        )
    }

    fn members() -> ModelSchema {
        ModelSchema::new("members")
            .field(FieldDef::new("id", SqlType::Int).primary_key())
            .field(FieldDef::new("name", SqlType::VarChar))
            .field(FieldDef::new("team_id", SqlType::Int).references("teams", "id"))
    }

    #[test]
    fn test_select_all_rows() {
        let compiled = QueryCompiler::mysql().select(&users(), &SelectQuery::new()).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT `users`.`id`, `users`.`username`, `users`.`active` FROM `users`;"
        );
        assert_eq!(compiled.fields, vec!["id", "username", "active"]);
        assert_eq!(compiled.values(), Some(&[][..]));
    }

    #[test]
    fn test_select_privacy_mode() {
        let compiled = QueryCompiler::mysql()
            .with_privacy(Visibility::Protected)
            .select(&users(), &SelectQuery::new())
            .unwrap();
        assert_eq!(compiled.fields.len(), 4);
    }

    #[test]
    fn test_select_full_template() {
        let query = SelectQuery::new()
            .fields(FieldSelector::named(["username"]))
            .filter(Conditions::new().with("active", true))
            .group_by("username")
            .order_by(OrderBy::asc("username"))
            .order_by(OrderBy::desc("teams__id"))
            .limit_offset(20, 40);
        let compiled = QueryCompiler::postgres().select(&users(), &query).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT \"users\".\"username\" FROM \"users\" WHERE \"users\".\"active\" = $1 \
             GROUP BY \"users\".\"username\" ORDER BY \"users\".\"username\" ASC, \"teams\".\"id\" DESC \
             LIMIT 20 OFFSET 40;"
        );
        assert_eq!(compiled.values(), Some(&[Value::Bool(true)][..]));
    }

    #[test]
    fn test_select_with_join() {
        let compiler = QueryCompiler::mysql().with_registry(registry());
        let query = SelectQuery::new().join(JoinSpec::inner("team_id").fields(["name"]));
        let compiled = compiler.select(&members(), &query).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT `members`.`id`, `members`.`name`, `members`.`team_id`, \
             `teams`.`name` AS `teams__name` \
             FROM `members` INNER JOIN `teams` ON `members`.`team_id` = `teams`.`id`;"
        );
        assert_eq!(compiled.fields, vec!["id", "name", "team_id", "teams__name"]);
    }

    #[test]
    fn test_select_raw_fields_have_no_aliases() {
        let query = SelectQuery::new().fields(FieldSelector::raw("COUNT(*)"));
        let compiled = QueryCompiler::mysql().select(&users(), &query).unwrap();
        assert_eq!(compiled.sql, "SELECT COUNT(*) FROM `users`;");
        assert!(compiled.fields.is_empty());
    }

    #[test]
    fn test_select_invalid_filter_raises() {
        let query = SelectQuery::new().filter(Conditions::new());
        let err = QueryCompiler::mysql().select(&users(), &query).unwrap_err();
        assert!(matches!(err, SqlError::InvalidFilter(_)));
    }

    #[test]
    fn test_insert() {
        let record = Record::new()
            .with("username", "chriss")
            .with("active", true)
            .with("updated_at", Operand::now());
        let compiled = QueryCompiler::postgres().insert(&users(), &record).unwrap();
        assert_eq!(
            compiled.sql,
            "INSERT INTO \"users\" (\"username\", \"active\", \"updated_at\") VALUES ($1, $2, now());"
        );
        assert_eq!(
            compiled.values(),
            Some(&[Value::from("chriss"), Value::Bool(true)][..])
        );
    }

    #[test]
    fn test_insert_errors() {
        let compiler = QueryCompiler::mysql();
        assert!(matches!(
            compiler.insert(&users(), &Record::new()).unwrap_err(),
            SqlError::InvalidPayload(_)
        ));
        assert!(matches!(
            compiler
                .insert(&users(), &Record::new().with("nickname", "x"))
                .unwrap_err(),
            SqlError::UnknownField { .. }
        ));
        assert!(matches!(
            compiler
                .insert(&users(), &Record::new().with("id", Operand::column("teams", "id")))
                .unwrap_err(),
            SqlError::InvalidPayload(_)
        ));
    }

    #[test]
    fn test_update_binds_set_before_where() {
        let query = UpdateQuery::new(Record::new().with("username", "new").with("updated_at", Operand::now()))
            .filter(Conditions::new().with("id", Condition::new(Operator::Gte, 5)));
        let compiled = QueryCompiler::postgres().update(&users(), &query).unwrap();
        assert_eq!(
            compiled.sql,
            "UPDATE \"users\" SET \"username\" = $1, \"updated_at\" = now() WHERE \"users\".\"id\" >= $2;"
        );
        assert_eq!(
            compiled.values(),
            Some(&[Value::from("new"), Value::Int(5)][..])
        );
    }

    #[test]
    fn test_update_data_api_unique_names() {
        let query = UpdateQuery::new(Record::new().with("id", 2)).filter(Conditions::new().with("id", 1));
        let compiled = QueryCompiler::data_api(Engine::MySql)
            .update(&users(), &query)
            .unwrap();
        assert_eq!(
            compiled.sql,
            "UPDATE \"users\" SET \"id\" = :id WHERE \"users\".\"id\" = :id_2;"
        );
        let params = compiled.parameters().unwrap();
        assert_eq!(params[0].value, TypedValue::LongValue(2));
        assert_eq!(params[1].name, "id_2");
    }

    #[test]
    fn test_update_requires_filter() {
        let compiler = QueryCompiler::mysql();
        let query = UpdateQuery::new(Record::new().with("username", "x"));
        assert!(matches!(
            compiler.update(&users(), &query).unwrap_err(),
            SqlError::InvalidFilter(_)
        ));
        let query = UpdateQuery::new(Record::new().with("username", "x")).filter(Conditions::new());
        assert!(matches!(
            compiler.update(&users(), &query).unwrap_err(),
            SqlError::InvalidFilter(_)
        ));
        let query = UpdateQuery::new(Record::new()).filter(FilterExpression::All);
        assert!(matches!(
            compiler.update(&users(), &query).unwrap_err(),
            SqlError::InvalidPayload(_)
        ));
    }

    #[test]
    fn test_update_all_rows() {
        let query = UpdateQuery::new(Record::new().with("active", false)).filter(FilterExpression::All);
        let compiled = QueryCompiler::mysql().update(&users(), &query).unwrap();
        assert_eq!(compiled.sql, "UPDATE `users` SET `active` = ?;");
    }

    #[test]
    fn test_update_with_join_qualifies_targets() {
        let compiler = QueryCompiler::mysql().with_registry(registry());
        let query = UpdateQuery::new(Record::new().with("name", "x"))
            .filter(Conditions::new().with("teams__id", 4))
            .join(JoinSpec::inner("team_id").fields(["id"]));
        let compiled = compiler.update(&members(), &query).unwrap();
        assert_eq!(
            compiled.sql,
            "UPDATE `members` INNER JOIN `teams` ON `members`.`team_id` = `teams`.`id` \
             SET `members`.`name` = ? WHERE `teams`.`id` = ?;"
        );
        assert_eq!(
            compiled.values(),
            Some(&[Value::from("x"), Value::Int(4)][..])
        );
    }

    #[test]
    fn test_data_api_select_filters_joined_text_column() {
        let compiler = QueryCompiler::data_api(Engine::MySql).with_registry(registry());
        let query = SelectQuery::new()
            .join(JoinSpec::left("team_id").fields(["name"]))
            .filter(Conditions::new().with("teams__name", "core"));
        let compiled = compiler.select(&members(), &query).unwrap();
        assert!(compiled.sql.ends_with("WHERE \"teams\".\"name\" = :teams__name;"));
        let params = compiled.parameters().unwrap();
        assert_eq!(params[0].value, TypedValue::StringValue("core".to_string()));
    }

    #[test]
    fn test_delete() {
        let compiler = QueryCompiler::mysql();
        let compiled = compiler.delete(&users(), &DeleteQuery::all()).unwrap();
        assert_eq!(compiled.sql, "DELETE FROM `users`;");
        assert!(compiled.params.is_empty());

        let compiled = compiler
            .delete(&users(), &DeleteQuery::new(Conditions::new().with("id", 3)))
            .unwrap();
        assert_eq!(compiled.sql, "DELETE FROM `users` WHERE `users`.`id` = ?;");

        assert!(matches!(
            compiler.delete(&users(), &DeleteQuery::default()).unwrap_err(),
            SqlError::InvalidFilter(_)
        ));
    }

    #[test]
    fn test_delete_with_join() {
        let compiler = QueryCompiler::mysql().with_registry(registry());
        let query = DeleteQuery::new(Conditions::new().with("teams__id", 4))
            .join(JoinSpec::left("team_id").fields(["id"]));
        let compiled = compiler.delete(&members(), &query).unwrap();
        assert_eq!(
            compiled.sql,
            "DELETE FROM `members` LEFT JOIN `teams` ON `members`.`team_id` = `teams`.`id` \
             WHERE `teams`.`id` = ?;"
        );
    }

    #[test]
    fn test_compiled_query_serializes() {
        let compiled = QueryCompiler::mysql()
            .delete(&users(), &DeleteQuery::new(Conditions::new().with("id", 3)))
            .unwrap();
        assert_eq!(
            serde_json::to_value(&compiled).unwrap(),
            serde_json::json!({"sql": "DELETE FROM `users` WHERE `users`.`id` = ?;", "values": [3]})
        );
    }

    #[test]
    fn test_from_settings() {
        let settings = DatabaseSettings {
            engine: "postgresql".into(),
            driver: "data-api".into(),
            privacy: "private".into(),
        };
        let compiler = QueryCompiler::from_settings(&settings).unwrap();
        assert_eq!(compiler.dialect().name(), "data-api/postgresql");
        assert_eq!(compiler.privacy(), Visibility::Private);

        let bad = DatabaseSettings {
            privacy: "secret".into(),
            ..settings
        };
        assert!(matches!(
            QueryCompiler::from_settings(&bad).unwrap_err(),
            SqlError::ConfigurationError(_)
        ));
    }

    #[test]
    fn test_compiler_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueryCompiler>();
    }

    #[test]
    fn test_record_from_json() {
        let record = Record::from_json(&serde_json::json!({"b": 1, "a": "\\NULL"})).unwrap();
        let fields: Vec<&str> = record.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["b", "a"]);
        assert!(Record::from_json(&serde_json::json!([1])).is_err());
    }
}
