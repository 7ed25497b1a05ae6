//! Filter expressions and the WHERE-clause compiler.
//!
//! A [`FilterExpression`] is the dialect-agnostic description of which rows a
//! statement touches. It is either the explicit wildcard [`All`], a single
//! AND-ed group of [`Conditions`], or an OR of several such groups.
//!
//! Every condition compares a column against an [`Operand`]. Literal values
//! become bound parameters; raw SQL, column references and function calls
//! are spliced into the statement text.
//!
//! [`All`]: FilterExpression::All

use std::fmt;
use std::str::FromStr;

use polysql_core::{SqlError, SqlResult};

use super::cursor::Binder;
use super::dialect::Dialect;
use super::params::TypedValue;
use crate::fields::ValueKind;
use crate::model::{ModelRegistry, ModelSchema};
use crate::value::Value;

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    /// `=`
    #[default]
    Eq,
    /// `<>`
    NotEq,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IS`
    Is,
    /// `IS NOT`
    IsNot,
}

impl Operator {
    /// Returns the SQL spelling of this operator.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
        }
    }
}

impl FromStr for Operator {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        match normalized.as_str() {
            "=" | "==" => Ok(Self::Eq),
            "<>" | "!=" => Ok(Self::NotEq),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Gte),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Lte),
            "LIKE" => Ok(Self::Like),
            "NOT LIKE" => Ok(Self::NotLike),
            "IS" => Ok(Self::Is),
            "IS NOT" => Ok(Self::IsNot),
            _ => Err(SqlError::InvalidFilter(format!("unknown operator '{s}'"))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// The right-hand side of a condition or assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A literal, bound as a parameter.
    Value(Value),
    /// SQL spliced verbatim. Never pass untrusted input here.
    Raw(String),
    /// A column of some table, e.g. a joined one.
    Column {
        /// The table name.
        table: String,
        /// The column name.
        column: String,
    },
    /// A zero-argument SQL function call, e.g. `now()`.
    Function(String),
}

impl Operand {
    /// A raw SQL literal.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// A reference to `table.column`.
    pub fn column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Column {
            table: table.into(),
            column: column.into(),
        }
    }

    /// A zero-argument function call.
    pub fn function(name: impl Into<String>) -> Self {
        Self::Function(name.into())
    }

    /// `now()`.
    pub fn now() -> Self {
        Self::Function("now".to_string())
    }

    /// Reads an operand from its loose JSON form.
    ///
    /// Strings follow these conventions, checked in order:
    ///
    /// - a leading `\` marks a raw literal (`\'chriss'` splices `'chriss'`);
    /// - the exact text `now()` is a function call;
    /// - exactly one `__` separating two non-empty parts is a column of
    ///   another table (`users__id`).
    ///
    /// Anything else is a bound value.
    pub fn from_json(json: &serde_json::Value) -> Self {
        if let serde_json::Value::String(s) = json {
            if let Some(raw) = s.strip_prefix('\\') {
                return Self::Raw(raw.to_string());
            }
            if s == "now()" {
                return Self::now();
            }
            if let Some((table, column)) = split_qualified(s) {
                return Self::column(table, column);
            }
        }
        Self::Value(Value::from_json(json))
    }

    /// Returns `true` for a NULL literal.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(v) if v.is_null())
    }
}

/// A single comparison: `<column> <operator> <operand>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// The comparison operator.
    pub operator: Operator,
    /// The right-hand side.
    pub operand: Operand,
}

impl Condition {
    /// Creates a condition with an explicit operator.
    pub fn new(operator: Operator, operand: impl Into<Operand>) -> Self {
        Self {
            operator,
            operand: operand.into(),
        }
    }

    /// An equality condition.
    pub fn equals(operand: impl Into<Operand>) -> Self {
        Self::new(Operator::Eq, operand)
    }

    /// Reads a condition from JSON.
    ///
    /// An object carrying an `operator` key is the explicit form
    /// `{"operator": ">", "value": 3}`; anything else is an equality test
    /// against [`Operand::from_json`].
    pub fn from_json(json: &serde_json::Value) -> SqlResult<Self> {
        if let serde_json::Value::Object(map) = json {
            if let Some(op) = map.get("operator") {
                let op = op.as_str().ok_or_else(|| {
                    SqlError::InvalidFilter("operator must be a string".to_string())
                })?;
                let value = map.get("value").ok_or_else(|| {
                    SqlError::InvalidFilter(format!("operator '{op}' given without a value"))
                })?;
                return Ok(Self {
                    operator: op.parse()?,
                    operand: Operand::from_json(value),
                });
            }
        }
        Ok(Self::equals(Operand::from_json(json)))
    }
}

impl From<Operand> for Condition {
    fn from(operand: Operand) -> Self {
        Self::equals(operand)
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Value> for Condition {
    fn from(value: Value) -> Self {
        Self::equals(Operand::Value(value))
    }
}

macro_rules! impl_literal_operand {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Self::Value(Value::from(v))
                }
            }

            impl From<$ty> for Condition {
                fn from(v: $ty) -> Self {
                    Self::equals(Operand::Value(Value::from(v)))
                }
            }
        )*
    };
}

impl_literal_operand!(
    bool,
    i16,
    i32,
    i64,
    u32,
    f32,
    f64,
    String,
    &str,
    Vec<u8>,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    chrono::NaiveTime,
    uuid::Uuid,
);

/// An insertion-ordered list of `column -> condition` pairs, AND-ed together.
///
/// # Examples
///
/// ```
/// use polysql_db::query::filter::{Condition, Conditions, Operator};
///
/// let conditions = Conditions::new()
///     .with("active", true)
///     .with("age", Condition::new(Operator::Gte, 18));
/// assert_eq!(conditions.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions(Vec<(String, Condition)>);

impl Conditions {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition, replacing an earlier one on the same key in place.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, condition: impl Into<Condition>) -> Self {
        self.insert(key, condition);
        self
    }

    /// Adds a condition, replacing an earlier one on the same key in place.
    pub fn insert(&mut self, key: impl Into<String>, condition: impl Into<Condition>) {
        let key = key.into();
        let condition = condition.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = condition;
        } else {
            self.0.push((key, condition));
        }
    }

    /// Iterates over the conditions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.0.iter().map(|(k, c)| (k.as_str(), c))
    }

    /// Returns the number of conditions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn from_json_map(map: &serde_json::Map<String, serde_json::Value>) -> SqlResult<Self> {
        if map.is_empty() {
            return Err(SqlError::InvalidFilter(
                "filter object has no conditions".to_string(),
            ));
        }
        let mut conditions = Self::new();
        for (key, value) in map {
            conditions.insert(key.clone(), Condition::from_json(value)?);
        }
        Ok(conditions)
    }
}

impl<K: Into<String>, C: Into<Condition>> FromIterator<(K, C)> for Conditions {
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        let mut conditions = Self::new();
        for (k, c) in iter {
            conditions.insert(k, c);
        }
        conditions
    }
}

/// Which rows a statement applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    /// Every row. Written `"*"` in JSON.
    All,
    /// One group of AND-ed conditions.
    And(Conditions),
    /// `(A) OR (B) ...`, each element AND-ed internally.
    AnyOf(Vec<Conditions>),
}

impl FilterExpression {
    /// Reads a filter from its loose JSON form.
    ///
    /// `"*"` is [`All`](Self::All), an object is [`And`](Self::And), and an
    /// array of objects is [`AnyOf`](Self::AnyOf). Null, any other string,
    /// an empty array, and an empty object (alone or inside an array) are
    /// rejected with [`SqlError::InvalidFilter`].
    pub fn from_json(json: &serde_json::Value) -> SqlResult<Self> {
        match json {
            serde_json::Value::String(s) if s == "*" => Ok(Self::All),
            serde_json::Value::String(s) => Err(SqlError::InvalidFilter(format!(
                "string filter '{s}' is not the wildcard \"*\""
            ))),
            serde_json::Value::Object(map) => Ok(Self::And(Conditions::from_json_map(map)?)),
            serde_json::Value::Array(items) => {
                if items.is_empty() {
                    return Err(SqlError::InvalidFilter("filter list is empty".to_string()));
                }
                let groups = items
                    .iter()
                    .map(|item| match item {
                        serde_json::Value::Object(map) => Conditions::from_json_map(map),
                        other => Err(SqlError::InvalidFilter(format!(
                            "filter list element must be an object, got {other}"
                        ))),
                    })
                    .collect::<SqlResult<Vec<_>>>()?;
                Ok(Self::AnyOf(groups))
            }
            serde_json::Value::Null => {
                Err(SqlError::InvalidFilter("filter is missing".to_string()))
            }
            other => Err(SqlError::InvalidFilter(format!(
                "unsupported filter shape: {other}"
            ))),
        }
    }

    /// Checks the shape rules that the type system does not enforce.
    pub fn validate(&self) -> SqlResult<()> {
        match self {
            Self::All => Ok(()),
            Self::And(conditions) => non_empty(conditions),
            Self::AnyOf(groups) => {
                if groups.is_empty() {
                    return Err(SqlError::InvalidFilter("filter list is empty".to_string()));
                }
                groups.iter().try_for_each(non_empty)
            }
        }
    }

    /// Returns `true` for the wildcard.
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<Conditions> for FilterExpression {
    fn from(conditions: Conditions) -> Self {
        Self::And(conditions)
    }
}

impl From<Vec<Conditions>> for FilterExpression {
    fn from(groups: Vec<Conditions>) -> Self {
        Self::AnyOf(groups)
    }
}

fn non_empty(conditions: &Conditions) -> SqlResult<()> {
    if conditions.is_empty() {
        Err(SqlError::InvalidFilter(
            "filter object has no conditions".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Splits `table__column` when the text holds exactly one `__` between two
/// non-empty parts.
pub(crate) fn split_qualified(s: &str) -> Option<(&str, &str)> {
    if s.matches("__").count() != 1 {
        return None;
    }
    let (table, column) = s.split_once("__")?;
    if table.is_empty() || column.is_empty() || column.starts_with('_') {
        return None;
    }
    Some((table, column))
}

/// Compiles a filter into a WHERE fragment without the `WHERE ` prefix.
///
/// Values are bound through `binder` in the order their placeholders appear.
/// [`FilterExpression::All`] yields an empty fragment. Qualified keys take
/// their value type from the joined model in `registry`.
pub fn compile_filter(
    dialect: &dyn Dialect,
    registry: &ModelRegistry,
    schema: &ModelSchema,
    filter: &FilterExpression,
    binder: &mut Binder,
) -> SqlResult<String> {
    filter.validate()?;
    match filter {
        FilterExpression::All => Ok(String::new()),
        FilterExpression::And(conditions) => {
            compile_conditions(dialect, registry, schema, conditions, binder)
        }
        FilterExpression::AnyOf(groups) => {
            let parts = groups
                .iter()
                .map(|group| compile_conditions(dialect, registry, schema, group, binder))
                .collect::<SqlResult<Vec<_>>>()?;
            Ok(format!("({})", parts.join(") OR (")))
        }
    }
}

fn compile_conditions(
    dialect: &dyn Dialect,
    registry: &ModelRegistry,
    schema: &ModelSchema,
    conditions: &Conditions,
    binder: &mut Binder,
) -> SqlResult<String> {
    let mut parts = Vec::with_capacity(conditions.len());
    for (key, condition) in conditions.iter() {
        let left = match split_qualified(key) {
            Some((table, column)) => dialect.qualify(table, column),
            None => dialect.qualify(schema.table_name(), key),
        };
        // Raw, column and function operands are never bound, so only
        // literals need a declared type.
        let kind = match &condition.operand {
            Operand::Value(value) => condition_kind(dialect, registry, schema, key, value)?,
            _ => None,
        };

        if condition.operand.is_null() {
            let test = match condition.operator {
                Operator::Eq | Operator::Is => "IS NULL",
                Operator::NotEq | Operator::IsNot => "IS NOT NULL",
                other => {
                    return Err(SqlError::InvalidFilter(format!(
                        "'{key}' cannot be compared with NULL using {other}"
                    )))
                }
            };
            parts.push(format!("{left} {test}"));
            continue;
        }

        let rhs = render_operand(dialect, binder, key, kind, &condition.operand)?;
        parts.push(format!("{left} {} {rhs}", condition.operator.as_sql()));
    }
    Ok(parts.join(" AND "))
}

/// Resolves the value wrapper for a filter key.
///
/// A `table__column` key is typed by the joined model when `registry` knows
/// it, and by the value itself otherwise.
fn condition_kind(
    dialect: &dyn Dialect,
    registry: &ModelRegistry,
    schema: &ModelSchema,
    key: &str,
    value: &Value,
) -> SqlResult<Option<ValueKind>> {
    let Some((table, column)) = split_qualified(key) else {
        return local_kind(dialect, schema, key);
    };
    if !dialect.tags_values() {
        return Ok(None);
    }
    let joined = if table == schema.table_name() {
        Some(schema)
    } else {
        registry.get(table).map(|model| &**model)
    };
    let kind = match joined {
        Some(model) => model.require_field(column)?.sql_type.value_kind(),
        None => TypedValue::infer_kind(value),
    };
    Ok(Some(kind))
}

/// Resolves the value wrapper for a field of `schema`.
///
/// Only dialects that tag values need one, and only they fail on a field
/// the registry does not declare.
pub(crate) fn local_kind(
    dialect: &dyn Dialect,
    schema: &ModelSchema,
    name: &str,
) -> SqlResult<Option<ValueKind>> {
    if !dialect.tags_values() {
        return Ok(None);
    }
    let field = schema.require_field(name)?;
    Ok(Some(field.sql_type.value_kind()))
}

/// Renders an operand, binding it when it is a literal.
pub(crate) fn render_operand(
    dialect: &dyn Dialect,
    binder: &mut Binder,
    name: &str,
    kind: Option<ValueKind>,
    operand: &Operand,
) -> SqlResult<String> {
    match operand {
        Operand::Raw(sql) => Ok(sql.clone()),
        Operand::Column { table, column } => Ok(dialect.qualify(table, column)),
        Operand::Function(function) => Ok(format!("{function}()")),
        Operand::Value(value) => dialect.bind(binder, name, kind, value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldDef, SqlType};
    use crate::query::dialect::{DataApiDialect, Engine, MySqlDialect, PostgresDialect};
    use crate::query::params::{QueryParams, TypedValue};
    use serde_json::json;

    fn users() -> ModelSchema {
        ModelSchema::new("users")
            .field(FieldDef::new("id", SqlType::Int).primary_key())
            .field(FieldDef::new("username", SqlType::VarChar))
            .field(FieldDef::new("active", SqlType::Bool))
            .field(FieldDef::new("a", SqlType::Int))
            .field(FieldDef::new("b", SqlType::Int))
    }

    fn teams() -> ModelRegistry {
        ModelRegistry::new().register(
            ModelSchema::new("teams")
                .field(FieldDef::new("id", SqlType::Int).primary_key())
                .field(FieldDef::new("name", SqlType::VarChar)),
        )
    }

    fn compile(dialect: &dyn Dialect, filter: &FilterExpression) -> SqlResult<(String, QueryParams)> {
        let mut binder = Binder::new(dialect.placeholder_style());
        let sql = compile_filter(dialect, &teams(), &users(), filter, &mut binder)?;
        Ok((sql, binder.into_params()))
    }

    #[test]
    fn test_operator_parse() {
        assert_eq!("!=".parse::<Operator>().unwrap(), Operator::NotEq);
        assert_eq!("not  like".parse::<Operator>().unwrap(), Operator::NotLike);
        assert_eq!("is not".parse::<Operator>().unwrap(), Operator::IsNot);
        assert!(matches!(
            "~~".parse::<Operator>().unwrap_err(),
            SqlError::InvalidFilter(_)
        ));
    }

    #[test]
    fn test_operand_conventions() {
        assert_eq!(Operand::from_json(&json!("\\'chriss'")), Operand::raw("'chriss'"));
        assert_eq!(Operand::from_json(&json!("now()")), Operand::now());
        assert_eq!(
            Operand::from_json(&json!("posts__author_id")),
            Operand::column("posts", "author_id")
        );
        assert_eq!(
            Operand::from_json(&json!("a__b__c")),
            Operand::Value(Value::from("a__b__c"))
        );
        assert_eq!(Operand::from_json(&json!("plain")), Operand::Value(Value::from("plain")));
        assert_eq!(Operand::from_json(&json!(7)), Operand::Value(Value::Int(7)));
    }

    #[test]
    fn test_from_json_shapes() {
        assert_eq!(FilterExpression::from_json(&json!("*")).unwrap(), FilterExpression::All);
        for bad in [json!(null), json!({}), json!([]), json!("id"), json!([{}]), json!(3)] {
            let err = FilterExpression::from_json(&bad).unwrap_err();
            assert!(matches!(err, SqlError::InvalidFilter(_)), "{bad}");
        }
    }

    #[test]
    fn test_from_json_preserves_key_order() {
        let filter = FilterExpression::from_json(&json!({"b": 2, "a": 1})).unwrap();
        let FilterExpression::And(conditions) = filter else {
            panic!("expected And");
        };
        let keys: Vec<&str> = conditions.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_explicit_operator_json() {
        let condition = Condition::from_json(&json!({"operator": ">=", "value": 18})).unwrap();
        assert_eq!(condition, Condition::new(Operator::Gte, 18));
        assert!(Condition::from_json(&json!({"operator": ">="})).is_err());
    }

    #[test]
    fn test_and_mysql() {
        let filter = FilterExpression::from(Conditions::new().with("a", 1).with("b", 2));
        let (sql, params) = compile(&MySqlDialect, &filter).unwrap();
        assert_eq!(sql, "`users`.`a` = ? AND `users`.`b` = ?");
        assert_eq!(params, QueryParams::Values(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn test_any_of_mysql() {
        let filter = FilterExpression::AnyOf(vec![
            Conditions::new().with("id", 3),
            Conditions::new().with("username", "chriss"),
        ]);
        let (sql, params) = compile(&MySqlDialect, &filter).unwrap();
        assert_eq!(sql, "(`users`.`id` = ?) OR (`users`.`username` = ?)");
        assert_eq!(
            params,
            QueryParams::Values(vec![Value::Int(3), Value::from("chriss")])
        );
    }

    #[test]
    fn test_postgres_numbering_across_groups() {
        let filter = FilterExpression::AnyOf(vec![
            Conditions::new().with("a", 1).with("b", 2),
            Conditions::new().with("id", 3),
        ]);
        let (sql, _) = compile(&PostgresDialect, &filter).unwrap();
        assert_eq!(
            sql,
            "(\"users\".\"a\" = $1 AND \"users\".\"b\" = $2) OR (\"users\".\"id\" = $3)"
        );
    }

    #[test]
    fn test_raw_column_and_function_bind_nothing() {
        let filter = FilterExpression::from(
            Conditions::new()
                .with("username", Operand::raw("'chriss'"))
                .with("id", Operand::column("posts", "author_id"))
                .with("a", Condition::new(Operator::Lt, Operand::now())),
        );
        let (sql, params) = compile(&MySqlDialect, &filter).unwrap();
        assert_eq!(
            sql,
            "`users`.`username` = 'chriss' AND `users`.`id` = `posts`.`author_id` AND `users`.`a` < now()"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_null_comparisons() {
        let filter = FilterExpression::from(
            Conditions::new()
                .with("username", Value::Null)
                .with("a", Condition::new(Operator::NotEq, Value::Null)),
        );
        let (sql, params) = compile(&MySqlDialect, &filter).unwrap();
        assert_eq!(sql, "`users`.`username` IS NULL AND `users`.`a` IS NOT NULL");
        assert!(params.is_empty());

        let bad = FilterExpression::from(
            Conditions::new().with("a", Condition::new(Operator::Gt, Value::Null)),
        );
        assert!(matches!(
            compile(&MySqlDialect, &bad).unwrap_err(),
            SqlError::InvalidFilter(_)
        ));
    }

    #[test]
    fn test_qualified_key() {
        let filter = FilterExpression::from(Conditions::new().with("posts__id", 9));
        let (sql, _) = compile(&MySqlDialect, &filter).unwrap();
        assert_eq!(sql, "`posts`.`id` = ?");

        let dialect = DataApiDialect::new(Engine::MySql);
        let (sql, params) = compile(&dialect, &filter).unwrap();
        assert_eq!(sql, "\"posts\".\"id\" = :posts__id");
        let QueryParams::Parameters(params) = params else {
            panic!("expected parameters");
        };
        assert_eq!(params[0].value, TypedValue::LongValue(9));
    }

    #[test]
    fn test_data_api_qualified_key_uses_joined_type() {
        let dialect = DataApiDialect::new(Engine::MySql);
        let filter = FilterExpression::from(
            Conditions::new()
                .with("teams__name", "core")
                .with("teams__id", "4")
                .with("users__username", "chriss"),
        );
        let (sql, params) = compile(&dialect, &filter).unwrap();
        assert_eq!(
            sql,
            "\"teams\".\"name\" = :teams__name AND \"teams\".\"id\" = :teams__id \
             AND \"users\".\"username\" = :users__username"
        );
        let QueryParams::Parameters(params) = params else {
            panic!("expected parameters");
        };
        assert_eq!(params[0].value, TypedValue::StringValue("core".to_string()));
        assert_eq!(params[1].value, TypedValue::LongValue(4));
        assert_eq!(params[2].value, TypedValue::StringValue("chriss".to_string()));

        let unknown = FilterExpression::from(Conditions::new().with("teams__slug", "x"));
        assert!(matches!(
            compile(&dialect, &unknown).unwrap_err(),
            SqlError::UnknownField { .. }
        ));
    }

    #[test]
    fn test_data_api_unregistered_table_infers_type() {
        let dialect = DataApiDialect::new(Engine::PostgreSql);
        let filter = FilterExpression::from(Conditions::new().with("tags__label", "rust"));
        let (_, params) = compile(&dialect, &filter).unwrap();
        let QueryParams::Parameters(params) = params else {
            panic!("expected parameters");
        };
        assert_eq!(params[0].value, TypedValue::StringValue("rust".to_string()));
    }

    #[test]
    fn test_data_api_unbound_operands_skip_type_lookup() {
        let dialect = DataApiDialect::new(Engine::MySql);
        let filter = FilterExpression::from(
            Conditions::new()
                .with("created", Condition::new(Operator::Lt, Operand::now()))
                .with("nickname", Operand::raw("'chriss'"))
                .with("owner_id", Operand::column("posts", "author_id")),
        );
        let (sql, params) = compile(&dialect, &filter).unwrap();
        assert_eq!(
            sql,
            "\"users\".\"created\" < now() AND \"users\".\"nickname\" = 'chriss' \
             AND \"users\".\"owner_id\" = \"posts\".\"author_id\""
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_data_api_tags_by_field_type() {
        let dialect = DataApiDialect::new(Engine::PostgreSql);
        let filter = FilterExpression::from(Conditions::new().with("active", true).with("id", "5"));
        let (sql, params) = compile(&dialect, &filter).unwrap();
        assert_eq!(sql, "\"users\".\"active\" = :active AND \"users\".\"id\" = :id");
        let QueryParams::Parameters(params) = params else {
            panic!("expected parameters");
        };
        assert_eq!(params[0].value, TypedValue::BooleanValue(true));
        assert_eq!(params[1].value, TypedValue::LongValue(5));
    }

    #[test]
    fn test_data_api_unknown_field() {
        let dialect = DataApiDialect::new(Engine::MySql);
        let filter = FilterExpression::from(Conditions::new().with("nickname", "x"));
        assert!(matches!(
            compile(&dialect, &filter).unwrap_err(),
            SqlError::UnknownField { .. }
        ));
    }

    #[test]
    fn test_all_compiles_to_nothing() {
        let (sql, params) = compile(&MySqlDialect, &FilterExpression::All).unwrap();
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn test_empty_groups_rejected() {
        for filter in [
            FilterExpression::And(Conditions::new()),
            FilterExpression::AnyOf(vec![]),
            FilterExpression::AnyOf(vec![Conditions::new().with("id", 1), Conditions::new()]),
        ] {
            assert!(matches!(
                compile(&MySqlDialect, &filter).unwrap_err(),
                SqlError::InvalidFilter(_)
            ));
        }
    }

    #[test]
    fn test_compile_is_repeatable() {
        let filter = FilterExpression::from(Conditions::new().with("a", 1).with("b", 2));
        let first = compile(&PostgresDialect, &filter).unwrap();
        let second = compile(&PostgresDialect, &filter).unwrap();
        assert_eq!(first, second);
    }
}
