//! Field type definitions for the model registry.
//!
//! This module defines the declared column types ([`SqlType`]), the privacy
//! tiers fields belong to ([`Visibility`]), and [`FieldDef`], which captures
//! everything the compiler needs to know about a single model field.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use polysql_core::SqlError;

/// The declared SQL type of a model field.
///
/// Parsing is case-insensitive and ignores a size suffix, so `varchar(255)`
/// and `VARCHAR` both parse to [`SqlType::VarChar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SqlType {
    /// `BOOL` / `BOOLEAN`.
    Bool,
    /// `TINYINT`.
    TinyInt,
    /// `SMALLINT`.
    SmallInt,
    /// `MEDIUMINT`.
    MediumInt,
    /// `INT` / `INTEGER`.
    Int,
    /// `BIGINT`.
    BigInt,
    /// `FLOAT`.
    Float,
    /// `REAL`.
    Real,
    /// `DOUBLE` / `DOUBLE PRECISION`.
    Double,
    /// `DECIMAL` / `NUMERIC`.
    Decimal,
    /// `CHAR`.
    Char,
    /// `VARCHAR`.
    VarChar,
    /// `TEXT` and its sized variants.
    Text,
    /// `DATE`.
    Date,
    /// `TIME`.
    Time,
    /// `DATETIME`.
    DateTime,
    /// `TIMESTAMP` / `TIMESTAMPTZ`.
    Timestamp,
    /// `JSON` / `JSONB`.
    Json,
    /// `UUID`.
    Uuid,
    /// `BINARY`.
    Binary,
    /// `VARBINARY`.
    VarBinary,
    /// `BLOB` and its sized variants, `BYTEA`.
    Blob,
}

/// The Data API value wrapper a field's values are tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `booleanValue`
    Boolean,
    /// `longValue`
    Long,
    /// `doubleValue`
    Double,
    /// `blobValue`
    Blob,
    /// `stringValue`
    String,
}

impl SqlType {
    /// Returns the canonical SQL name of this type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "BOOL",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::MediumInt => "MEDIUMINT",
            Self::Int => "INT",
            Self::BigInt => "BIGINT",
            Self::Float => "FLOAT",
            Self::Real => "REAL",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Char => "CHAR",
            Self::VarChar => "VARCHAR",
            Self::Text => "TEXT",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Json => "JSON",
            Self::Uuid => "UUID",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::Blob => "BLOB",
        }
    }

    /// Returns the Data API value wrapper for this type.
    ///
    /// `DECIMAL` deliberately maps to `stringValue` so no precision is lost.
    pub const fn value_kind(&self) -> ValueKind {
        match self {
            Self::Bool => ValueKind::Boolean,
            Self::TinyInt | Self::SmallInt | Self::MediumInt | Self::Int | Self::BigInt => {
                ValueKind::Long
            }
            Self::Float | Self::Real | Self::Double => ValueKind::Double,
            Self::Binary | Self::VarBinary | Self::Blob => ValueKind::Blob,
            Self::Decimal
            | Self::Char
            | Self::VarChar
            | Self::Text
            | Self::Date
            | Self::Time
            | Self::DateTime
            | Self::Timestamp
            | Self::Json
            | Self::Uuid => ValueKind::String,
        }
    }

    /// Returns `true` for the integer family.
    pub const fn is_integer(&self) -> bool {
        matches!(self.value_kind(), ValueKind::Long)
    }
}

impl FromStr for SqlType {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let base = s.split('(').next().unwrap_or_default().trim().to_uppercase();
        let ty = match base.as_str() {
            "BOOL" | "BOOLEAN" => Self::Bool,
            "TINYINT" => Self::TinyInt,
            "SMALLINT" => Self::SmallInt,
            "MEDIUMINT" => Self::MediumInt,
            "INT" | "INTEGER" => Self::Int,
            "BIGINT" => Self::BigInt,
            "FLOAT" => Self::Float,
            "REAL" => Self::Real,
            "DOUBLE" | "DOUBLE PRECISION" => Self::Double,
            "DECIMAL" | "NUMERIC" => Self::Decimal,
            "CHAR" => Self::Char,
            "VARCHAR" => Self::VarChar,
            "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" => Self::Text,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "DATETIME" => Self::DateTime,
            "TIMESTAMP" | "TIMESTAMPTZ" => Self::Timestamp,
            "JSON" | "JSONB" => Self::Json,
            "UUID" => Self::Uuid,
            "BINARY" => Self::Binary,
            "VARBINARY" => Self::VarBinary,
            "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BYTEA" => Self::Blob,
            _ => return Err(SqlError::UnsupportedType(s.to_string())),
        };
        Ok(ty)
    }
}

impl TryFrom<String> for SqlType {
    type Error = SqlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SqlType> for String {
    fn from(ty: SqlType) -> Self {
        ty.as_str().to_string()
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The privacy tier of a field.
///
/// Tiers are ordered: a compiler running in privacy mode `m` sees every
/// field whose visibility is `<= m`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Always selected by default.
    #[default]
    Public,
    /// Selected in protected and private mode.
    Protected,
    /// Selected only in private mode.
    Private,
}

impl Visibility {
    /// Returns `true` if a field with this visibility is visible in `mode`.
    pub fn visible_in(self, mode: Self) -> bool {
        self <= mode
    }
}

impl FromStr for Visibility {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "protected" => Ok(Self::Protected),
            "private" => Ok(Self::Private),
            other => Err(SqlError::ConfigurationError(format!(
                "Unknown privacy mode '{other}'"
            ))),
        }
    }
}

/// Column constraints declared on a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConstraints {
    /// Part of the primary key.
    pub primary_key: bool,
    /// `NOT NULL`.
    pub not_null: bool,
    /// `UNIQUE`.
    pub unique: bool,
    /// `UNSIGNED` (numeric types).
    pub unsigned: bool,
    /// `ZEROFILL` (numeric types).
    pub zero_fill: bool,
    /// `AUTO_INCREMENT`.
    pub autoincrement: bool,
    /// Computed by the database.
    pub generated: bool,
    /// Declared size, e.g. `VARCHAR(255)`.
    pub size: Option<u32>,
    /// Declared precision, e.g. `DECIMAL(10, 2)`.
    pub precision: Option<u32>,
}

/// A foreign-key link from a field to another model.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    /// The column on the owning table.
    pub local_field: String,
    /// The column on the target table.
    pub linked_field: String,
    /// The table name of the target model.
    pub target_model: String,
}

impl ForeignKey {
    /// Creates a foreign key.
    pub fn new(
        local_field: impl Into<String>,
        target_model: impl Into<String>,
        linked_field: impl Into<String>,
    ) -> Self {
        Self {
            local_field: local_field.into(),
            linked_field: linked_field.into(),
            target_model: target_model.into(),
        }
    }
}

/// Complete definition of a model field.
///
/// Descriptors are immutable once the owning [`ModelSchema`](crate::model::ModelSchema)
/// is built; the builder methods consume and return `self`.
///
/// # Examples
///
/// ```
/// use polysql_db::fields::{FieldDef, SqlType, Visibility};
///
/// let field = FieldDef::new("password_hash", SqlType::VarChar)
///     .size(255)
///     .not_null()
///     .visibility(Visibility::Private);
/// assert!(!field.is_visible_in(Visibility::Public));
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    /// The field (and column) name.
    pub name: String,
    /// The declared SQL type.
    pub sql_type: SqlType,
    /// Output name used in SELECT lists instead of `name`.
    #[serde(default)]
    pub alias: Option<String>,
    /// The privacy tier.
    #[serde(default)]
    pub visibility: Visibility,
    /// Column constraints.
    #[serde(default)]
    pub constraints: FieldConstraints,
    /// Foreign-key linkage, if this field references another model.
    #[serde(default)]
    pub foreign_key: Option<ForeignKey>,
    /// Fixed key/value metadata attached by the schema author.
    #[serde(default)]
    pub static_keys: Option<BTreeMap<String, serde_json::Value>>,
}

impl FieldDef {
    /// Creates a new public field with no constraints.
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            alias: None,
            visibility: Visibility::Public,
            constraints: FieldConstraints::default(),
            foreign_key: None,
            static_keys: None,
        }
    }

    /// Sets the output alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the privacy tier.
    #[must_use]
    pub const fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Marks this field as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.constraints.primary_key = true;
        self
    }

    /// Marks this field `NOT NULL`.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.constraints.not_null = true;
        self
    }

    /// Marks this field as having a UNIQUE constraint.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.constraints.unique = true;
        self
    }

    /// Marks this numeric field `UNSIGNED`.
    #[must_use]
    pub const fn unsigned(mut self) -> Self {
        self.constraints.unsigned = true;
        self
    }

    /// Marks this numeric field `ZEROFILL`.
    #[must_use]
    pub const fn zero_fill(mut self) -> Self {
        self.constraints.zero_fill = true;
        self
    }

    /// Marks this field `AUTO_INCREMENT`.
    #[must_use]
    pub const fn autoincrement(mut self) -> Self {
        self.constraints.autoincrement = true;
        self
    }

    /// Marks this field as computed by the database.
    #[must_use]
    pub const fn generated(mut self) -> Self {
        self.constraints.generated = true;
        self
    }

    /// Sets the declared size.
    #[must_use]
    pub const fn size(mut self, size: u32) -> Self {
        self.constraints.size = Some(size);
        self
    }

    /// Sets the declared precision.
    #[must_use]
    pub const fn precision(mut self, precision: u32) -> Self {
        self.constraints.precision = Some(precision);
        self
    }

    /// Links this field to `target_model.linked_field`.
    ///
    /// The local column is this field's own name.
    #[must_use]
    pub fn references(mut self, target_model: impl Into<String>, linked_field: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKey::new(self.name.clone(), target_model, linked_field));
        self
    }

    /// Attaches a static key/value pair.
    #[must_use]
    pub fn static_key(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.static_keys
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value);
        self
    }

    /// The name this field appears under in a result set.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Returns `true` if the field declares an alias that differs from its name.
    pub fn has_distinct_alias(&self) -> bool {
        self.alias.as_deref().is_some_and(|alias| alias != self.name)
    }

    /// Returns `true` if this field is visible in the given privacy mode.
    pub fn is_visible_in(&self, mode: Visibility) -> bool {
        self.visibility.visible_in(mode)
    }

    /// Returns `true` if this field carries a foreign key.
    pub const fn is_relation(&self) -> bool {
        self.foreign_key.is_some()
    }
}
