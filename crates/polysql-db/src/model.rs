//! Model schemas and the schema registry.
//!
//! A [`ModelSchema`] is the read-only field registry of one model: its table
//! name plus its fields in declaration order. How a schema gets populated
//! (derive macros, decorators, JSON documents) is up to the caller; the
//! compiler only reads it.
//!
//! [`ModelRegistry`] maps table names to schemas so that a foreign key can
//! name its target model and joins can resolve it at compile time.

use std::collections::HashMap;
use std::sync::Arc;

use polysql_core::{SqlError, SqlResult};

use crate::fields::{FieldDef, Visibility};

/// The field registry of a single model.
///
/// # Examples
///
/// ```
/// use polysql_db::fields::{FieldDef, SqlType};
/// use polysql_db::model::ModelSchema;
///
/// let users = ModelSchema::new("users")
///     .field(FieldDef::new("id", SqlType::Int).primary_key())
///     .field(FieldDef::new("username", SqlType::VarChar));
///
/// assert_eq!(users.table_name(), "users");
/// assert!(users.get_field("username").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSchema {
    table_name: String,
    fields: Vec<FieldDef>,
}

impl ModelSchema {
    /// Creates an empty schema for the given table.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field, replacing any earlier field with the same name in place.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        if let Some(existing) = self.fields.iter_mut().find(|f| f.name == field.name) {
            *existing = field;
        } else {
            self.fields.push(field);
        }
        self
    }

    /// Parses a schema from its JSON document form.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::SerializationError`] if the document is malformed,
    /// including unknown column type names.
    pub fn from_json(json: &str) -> SqlResult<Self> {
        let schema: Self = serde_json::from_str(json)?;
        Ok(schema)
    }

    /// Returns the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns all fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up a field by name, failing with [`SqlError::UnknownField`].
    pub fn require_field(&self, name: &str) -> SqlResult<&FieldDef> {
        self.get_field(name)
            .ok_or_else(|| SqlError::unknown_field(&self.table_name, name))
    }

    /// Returns `true` if the registry declares a field with this name.
    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    /// Returns the fields visible under the given privacy mode.
    pub fn visible_fields(&self, mode: Visibility) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(move |f| f.is_visible_in(mode))
    }

    /// Returns the primary key fields.
    pub fn primary_key(&self) -> Vec<&FieldDef> {
        self.fields
            .iter()
            .filter(|f| f.constraints.primary_key)
            .collect()
    }
}

/// A read-only lookup of schemas by table name.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, Arc<ModelSchema>>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under its table name.
    #[must_use]
    pub fn register(mut self, schema: ModelSchema) -> Self {
        self.models
            .insert(schema.table_name().to_string(), Arc::new(schema));
        self
    }

    /// Returns the schema for a table.
    pub fn get(&self, table_name: &str) -> Option<&Arc<ModelSchema>> {
        self.models.get(table_name)
    }

    /// Returns the number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if no models are registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::SqlType;

    fn users() -> ModelSchema {
        ModelSchema::new("users")
            .field(FieldDef::new("id", SqlType::Int).primary_key())
            .field(FieldDef::new("username", SqlType::VarChar))
            .field(FieldDef::new("email", SqlType::VarChar).visibility(Visibility::Protected))
            .field(FieldDef::new("password", SqlType::VarChar).visibility(Visibility::Private))
    }

    #[test]
    fn test_field_order_preserved() {
        let model = users();
        let names: Vec<&str> = model.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "username", "email", "password"]);
    }

    #[test]
    fn test_field_replaces_duplicate() {
        let schema = users().field(FieldDef::new("username", SqlType::Text));
        assert_eq!(schema.fields().len(), 4);
        assert_eq!(schema.fields()[1].sql_type, SqlType::Text);
    }

    #[test]
    fn test_require_field_unknown() {
        let err = users().require_field("nickname").unwrap_err();
        assert!(matches!(
            err,
            SqlError::UnknownField { ref model, ref field } if model == "users" && field == "nickname"
        ));
    }

    #[test]
    fn test_visible_fields() {
        let schema = users();
        assert_eq!(schema.visible_fields(Visibility::Public).count(), 2);
        assert_eq!(schema.visible_fields(Visibility::Protected).count(), 3);
        assert_eq!(schema.visible_fields(Visibility::Private).count(), 4);
    }

    #[test]
    fn test_primary_key() {
        let schema = users();
        let pk = schema.primary_key();
        assert_eq!(pk.len(), 1);
        assert_eq!(pk[0].name, "id");
    }

    #[test]
    fn test_from_json() {
        let schema = ModelSchema::from_json(
            r#"{
                "tableName": "posts",
                "fields": [
                    {"name": "id", "sqlType": "INT", "constraints": {"primaryKey": true}},
                    {"name": "author_id", "sqlType": "INT",
                     "foreignKey": {"localField": "author_id", "linkedField": "id", "targetModel": "users"}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(schema.table_name(), "posts");
        assert!(schema.get_field("author_id").unwrap().is_relation());
    }

    #[test]
    fn test_from_json_unknown_type() {
        let err = ModelSchema::from_json(
            r#"{"tableName": "t", "fields": [{"name": "g", "sqlType": "GEOMETRY"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SqlError::SerializationError(_)));
    }

    #[test]
    fn test_registry() {
        let registry = ModelRegistry::new().register(users());
        assert_eq!(registry.len(), 1);
        assert!(registry.get("users").is_some());
        assert!(registry.get("posts").is_none());
    }
}
