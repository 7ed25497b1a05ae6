//! Integration tests for picking a dialect from loaded settings.
//!
//! The global settings can be configured once per process, so only one test
//! in this binary touches them.

use polysql_core::settings_loader;
use polysql_core::{SqlError, SETTINGS};
use polysql_db::fields::{FieldDef, SqlType, Visibility};
use polysql_db::model::ModelSchema;
use polysql_db::query::{Conditions, QueryCompiler, SelectQuery};

fn accounts() -> ModelSchema {
    ModelSchema::new("accounts")
        .field(FieldDef::new("id", SqlType::BigInt).primary_key())
        .field(FieldDef::new("email", SqlType::VarChar).visibility(Visibility::Protected))
}

#[test]
fn test_global_settings_pick_the_dialect() {
    let err = QueryCompiler::from_global_settings().unwrap_err();
    assert!(matches!(err, SqlError::ConfigurationError(_)));

    let mut settings = settings_loader::from_toml_str(
        r#"
        log_level = "debug"

        [database]
        engine = "postgresql"
        "#,
    )
    .unwrap();
    settings_loader::apply_overrides(&mut settings, |key| {
        (key == "POLYSQL_PRIVACY").then(|| "protected".to_string())
    });
    SETTINGS.configure(settings);

    let compiler = QueryCompiler::from_global_settings().unwrap();
    assert_eq!(compiler.privacy(), Visibility::Protected);

    let query = SelectQuery::new().filter(Conditions::new().with("id", 1_i64));
    let compiled = compiler.select(&accounts(), &query).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT \"accounts\".\"id\", \"accounts\".\"email\" FROM \"accounts\" \
         WHERE \"accounts\".\"id\" = $1;"
    );
}

#[test]
fn test_loaded_settings_with_bad_driver() {
    let settings = settings_loader::from_json_str(r#"{"database": {"driver": "odbc"}}"#).unwrap();
    let err = QueryCompiler::from_settings(&settings.database).unwrap_err();
    assert!(matches!(err, SqlError::UnsupportedEngine(_)));
}
