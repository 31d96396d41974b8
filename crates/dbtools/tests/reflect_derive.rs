#![allow(dead_code)]

use chrono::NaiveDate;
use dbtools::{
    DbError, Reflect, StatementKind, Value, insert_record, reflect, reflect_record, update_record,
};
use serde::Serialize;

#[derive(Reflect)]
#[dbtools(table = "users")]
struct User {
    #[dbtools(id)]
    id: i64,
    name: String,
    email: Option<String>,
    created_at: chrono::NaiveDateTime,
    #[dbtools(skip)]
    cache: Vec<String>,
}

#[derive(Serialize)]
struct Settings {
    theme: String,
    beta: bool,
}

#[derive(Reflect)]
#[dbtools(rename_all = "PascalCase")]
struct Account {
    #[dbtools(id, column = "AccountId")]
    id: i64,
    display_name: String,
    #[dbtools(json)]
    settings: Settings,
    r#type: String,
    balance: u64,
}

#[derive(Reflect)]
#[dbtools(table = "`order`")]
struct Order {
    #[dbtools(id, column = "`OrderId`")]
    id: i64,
    #[dbtools(column = "prix_été")]
    price: f64,
}

fn user() -> User {
    User {
        id: 7,
        name: "Jane".into(),
        email: None,
        created_at: NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(8, 5, 1)
            .unwrap(),
        cache: vec!["ignored".into()],
    }
}

fn account(balance: u64) -> Account {
    Account {
        id: 1,
        display_name: "ops".into(),
        settings: Settings {
            theme: "dark".into(),
            beta: true,
        },
        r#type: "admin".into(),
        balance,
    }
}

#[test]
fn derive_exposes_table_and_primary_key() {
    assert_eq!(User::table(), Some("users"));
    assert_eq!(User::primary_key(), Some("id"));
    assert_eq!(Account::table(), None);
    assert_eq!(Account::primary_key(), Some("AccountId"));
}

#[test]
fn fields_follow_declaration_order_and_skip() {
    let names: Vec<&str> = User::fields().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["id", "name", "email", "created_at"]);

    let names: Vec<&str> = Account::fields().iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        vec!["AccountId", "DisplayName", "Settings", "Type", "Balance"]
    );
}

#[test]
fn declared_types_come_from_field_types() {
    let types: Vec<&str> = User::fields().iter().map(|f| f.declared_type()).collect();
    assert_eq!(types[0], "i64");
    assert_eq!(types[2], "Option<String>");
}

#[test]
fn auto_increment_leaves_out_the_key() {
    let reflection = reflect(&user(), "id", true);
    assert!(reflection.is_complete());
    assert_eq!(reflection.columns(), vec!["name", "email", "created_at"]);
    assert_eq!(reflection.bindings[1].value, Value::Null);
}

#[test]
fn without_auto_increment_the_key_is_kept() {
    let reflection = reflect(&user(), "id", false);
    assert_eq!(reflection.columns(), vec!["id", "name", "email", "created_at"]);
    assert_eq!(reflection.bindings[0].value, Value::Int(7));
}

#[test]
fn datetime_fields_are_normalized_to_text() {
    let reflection = reflect(&user(), "id", true);
    let created = &reflection.bindings[2];
    assert_eq!(created.value, Value::Text("2024-03-09 08:05:01".into()));
    assert_eq!(created.declared_type, "DateTime");
}

#[test]
fn json_field_is_serialized() {
    let reflection = reflect(&account(10), "AccountId", true);
    assert_eq!(
        reflection.bindings[1].value,
        Value::Json(serde_json::json!({ "theme": "dark", "beta": true }))
    );
}

#[test]
fn unreadable_field_is_reported() {
    let reflection = reflect(&account(u64::MAX), "AccountId", true);
    assert!(!reflection.is_complete());
    assert_eq!(reflection.skipped.len(), 1);
    assert_eq!(reflection.skipped[0].column, "Balance");
    assert_eq!(
        reflection.columns(),
        vec!["DisplayName", "Settings", "Type"]
    );

    let err = reflection.into_complete().unwrap_err();
    assert!(matches!(err, DbError::ReflectionIncomplete(ref cols) if cols == &["Balance"]));
}

#[test]
fn reflection_builds_insert() {
    let stmt = reflect(&user(), "id", true).insert_into("users").unwrap();
    assert_eq!(stmt.kind(), StatementKind::Insert);
    assert_eq!(
        stmt.sql(),
        "INSERT INTO users(name,email,created_at) VALUES(@param0,@param1,@param2)"
    );
    assert_eq!(stmt.parameter("@param0"), Some(&Value::Text("Jane".into())));
    assert_eq!(stmt.parameter("@param1"), Some(&Value::Null));
    stmt.verify().unwrap();
}

#[test]
fn reflection_builds_update() {
    let stmt = reflect(&user(), "id", true)
        .update("users", "id = @whereParam0")
        .unwrap()
        .bind("@whereParam0", 7i64);
    assert_eq!(
        stmt.sql(),
        "UPDATE users SET name=@setParam0,email=@setParam1,created_at=@setParam2 \
         WHERE id = @whereParam0"
    );
    stmt.verify().unwrap();
}

#[test]
fn declared_metadata_builds_statements() {
    assert_eq!(
        reflect_record(&user(), true).columns(),
        vec!["name", "email", "created_at"]
    );

    let insert = insert_record(&user(), true).unwrap();
    assert_eq!(
        insert.sql(),
        "INSERT INTO users(name,email,created_at) VALUES(@param0,@param1,@param2)"
    );

    let update = update_record(&user()).unwrap();
    assert_eq!(
        update.sql(),
        "UPDATE users SET name=@setParam0,email=@setParam1,created_at=@setParam2 \
         WHERE id = @whereParam0"
    );
    assert_eq!(update.parameter("@whereParam0"), Some(&Value::Int(7)));
    update.verify().unwrap();
}

#[test]
fn insert_record_without_table_is_rejected() {
    let err = insert_record(&account(10), true).unwrap_err();
    assert!(err.is_invalid_identifier());
}

#[test]
fn quoted_and_unicode_names_pass_runtime_validation() {
    let order = Order { id: 3, price: 9.5 };
    let insert = insert_record(&order, true).unwrap();
    assert_eq!(insert.sql(), "INSERT INTO `order`(prix_été) VALUES(@param0)");

    let update = update_record(&order).unwrap();
    assert_eq!(
        update.sql(),
        "UPDATE `order` SET prix_été=@setParam0 WHERE `OrderId` = @whereParam0"
    );
}
