//! Integration tests for the validation engine
//!
//! This test suite verifies the complete pipeline:
//! - Rule expression parsing and resolution order
//! - Clippers rewriting fields before later checkers
//! - Nested and optional nested records
//! - Collect-all and fail-fast aggregation
//! - Rule errors reported apart from invalid data

#[macro_use]
mod common;

use common::TestResult;
use fieldrules::{ErrorKind, Mode, Record, Registry, Schema, Validator, Value};
use std::sync::{Arc, LazyLock};

fn validator() -> Validator {
    Validator::with_registry(Arc::new(Registry::new()))
}

// ============================================================================
// Single-rule records
// ============================================================================

#[derive(Debug, Default)]
struct Required {
    name: String,
}

impl Record for Required {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Required>> = LazyLock::new(|| {
            Schema::builder()
                .field("name", "require", |r: &mut Required| &mut r.name)
                .build()
        });
        &SCHEMA
    }
}

#[derive(Debug, Default)]
struct Ranged {
    count: i32,
}

impl Record for Ranged {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Ranged>> = LazyLock::new(|| {
            Schema::builder()
                .field("count", "number,min=1,max=10", |r: &mut Ranged| &mut r.count)
                .build()
        });
        &SCHEMA
    }
}

#[derive(Debug, Default)]
struct Chained {
    code: String,
}

impl Record for Chained {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Chained>> = LazyLock::new(|| {
            Schema::builder()
                .field("code", "string,min=2,max=5|require", |r: &mut Chained| &mut r.code)
                .build()
        });
        &SCHEMA
    }
}

#[derive(Debug, Default)]
struct Choice {
    level: String,
}

impl Record for Choice {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Choice>> = LazyLock::new(|| {
            Schema::builder()
                .field("level", "enum=1,2,3", |r: &mut Choice| &mut r.level)
                .build()
        });
        &SCHEMA
    }
}

#[derive(Debug, Default)]
struct Unknown {
    value: String,
}

impl Record for Unknown {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Unknown>> = LazyLock::new(|| {
            Schema::builder()
                .field("value", "fooRule|require", |r: &mut Unknown| &mut r.value)
                .build()
        });
        &SCHEMA
    }
}

#[derive(Debug, Default)]
struct Unchecked {
    anything: String,
    skipped: String,
}

impl Record for Unchecked {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Unchecked>> = LazyLock::new(|| {
            Schema::builder()
                .field("anything", "", |r: &mut Unchecked| &mut r.anything)
                .field("skipped", "-", |r: &mut Unchecked| &mut r.skipped)
                .build()
        });
        &SCHEMA
    }
}

#[test]
fn test_require_on_empty_string() {
    let mut record = Required::default();
    let errors = assert_err!(validator().verify(&mut record));

    assert_eq!(errors.len(), 1);
    let error = errors.first();
    assert_eq!(error.field, "name");
    assert_eq!(error.rule, "require");
    assert_eq!(error.kind, ErrorKind::Invalid);
    assert_eq!(error.message, "must not be empty");
    assert_eq!(error.value, "");
}

#[test]
fn test_number_above_max() {
    let mut record = Ranged { count: 15 };
    let errors = assert_err!(validator().verify(&mut record));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().message, "must be at most 10");
    assert_eq!(errors.first().value, "15");

    let mut record = Ranged { count: 10 };
    assert_ok!(validator().verify(&mut record));
}

#[test]
fn test_string_length_is_exclusive_of_min() {
    let mut record = Chained {
        code: "ok".to_string(),
    };
    let errors = assert_err!(validator().verify(&mut record));

    // require passes; only the length rule fails
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().rule, "string");
    assert_eq!(
        errors.first().message,
        "is too short: must be longer than 2 characters"
    );

    let mut record = Chained {
        code: "abc".to_string(),
    };
    assert_ok!(validator().verify(&mut record));
}

#[test]
fn test_empty_string_fails_length_and_require() {
    let mut record = Chained::default();
    let errors = assert_err!(validator().verify(&mut record));

    let rules: Vec<&str> = errors.iter().map(|e| e.rule.as_str()).collect();
    assert_eq!(rules, vec!["string", "require"]);
    assert!(errors.iter().all(|e| e.message == "must not be empty"));
}

#[test]
fn test_enum_membership() {
    let mut record = Choice {
        level: "4".to_string(),
    };
    let errors = assert_err!(validator().verify(&mut record));
    assert_eq!(errors.first().message, "must be one of [1, 2, 3]");

    let mut record = Choice {
        level: "2".to_string(),
    };
    assert_ok!(validator().verify(&mut record));

    // Absence is not a membership violation
    let mut record = Choice::default();
    assert_ok!(validator().verify(&mut record));
}

#[test]
fn test_unknown_rule_is_reported_as_unresolved() {
    let mut record = Unknown {
        value: "x".to_string(),
    };
    let errors = assert_err!(validator().verify(&mut record));

    assert_eq!(errors.len(), 1);
    let error = errors.first();
    assert_eq!(error.kind, ErrorKind::Unresolved);
    assert_eq!(error.rule, "fooRule");
    assert_eq!(error.message, "Unknown rule: fooRule");
    assert!(error.is_rule_error());
    assert!(!error.is_invalid());
}

#[test]
fn test_unknown_rule_does_not_hide_later_failures() {
    let mut record = Unknown::default();
    let errors = assert_err!(validator().verify(&mut record));

    assert_eq!(errors.count_kind(ErrorKind::Unresolved), 1);
    assert_eq!(errors.count_kind(ErrorKind::Invalid), 1);
}

#[test]
fn test_fields_without_rules_pass() {
    let mut record = Unchecked::default();
    assert_ok!(validator().verify(&mut record));
}

// ============================================================================
// Clippers
// ============================================================================

#[derive(Debug, Default)]
struct Profile {
    nickname: String,
    age: Option<i64>,
    motto: String,
}

impl Record for Profile {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Profile>> = LazyLock::new(|| {
            Schema::builder()
                .field("nickname", "trimSpace|string,min=2,max=8", |p: &mut Profile| {
                    &mut p.nickname
                })
                .field("age", "default=18|number,min=18", |p: &mut Profile| &mut p.age)
                .readonly("motto", "trim|string,max=4", |p: &Profile| &p.motto)
                .build()
        });
        &SCHEMA
    }
}

#[test]
fn test_trim_runs_before_length_check() {
    let mut profile = Profile {
        nickname: "   abc   ".to_string(),
        age: Some(30),
        motto: "go".to_string(),
    };
    assert_ok!(validator().verify(&mut profile));
    assert_eq!(profile.nickname, "abc");
}

#[test]
fn test_default_fills_absent_optional() {
    let mut profile = Profile {
        nickname: "abc".to_string(),
        age: None,
        motto: "go".to_string(),
    };
    assert_ok!(validator().verify(&mut profile));
    assert_eq!(profile.age, Some(18));
}

#[test]
fn test_default_keeps_existing_value() {
    let mut profile = Profile {
        nickname: "abc".to_string(),
        age: Some(12),
        motto: "go".to_string(),
    };
    let errors = assert_err!(validator().verify(&mut profile));
    assert_eq!(profile.age, Some(12));
    assert_eq!(errors.first().field, "age");
    assert_eq!(errors.first().message, "must be at least 18");
}

#[test]
fn test_clip_on_readonly_field_is_noop() {
    let mut profile = Profile {
        nickname: "abc".to_string(),
        age: Some(20),
        motto: "  go  ".to_string(),
    };
    let errors = assert_err!(validator().verify(&mut profile));

    assert_eq!(profile.motto, "  go  ");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().field, "motto");
    assert_eq!(errors.first().value, "  go  ");
}

#[derive(Debug, Default)]
struct Slug {
    text: String,
}

impl Record for Slug {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Slug>> = LazyLock::new(|| {
            Schema::builder()
                .field("text", "string,max=3|trim", |s: &mut Slug| &mut s.text)
                .build()
        });
        &SCHEMA
    }
}

#[test]
fn test_checker_before_clipper_sees_untrimmed_value() {
    let mut slug = Slug {
        text: " ab ".to_string(),
    };
    let errors = assert_err!(validator().verify(&mut slug));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().rule, "string");
    assert_eq!(errors.first().value, " ab ");
    assert_eq!(
        errors.first().message,
        "is too long: must be at most 3 characters"
    );
    // The clipper still runs after the failing checker
    assert_eq!(slug.text, "ab");

    // Once trimmed, the same expression passes
    assert_ok!(validator().verify(&mut slug));
}

// ============================================================================
// Nested records
// ============================================================================

#[derive(Debug, Default, Clone)]
struct Contact {
    email: String,
    phone: String,
}

impl Record for Contact {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Contact>> = LazyLock::new(|| {
            Schema::builder()
                .field("email", "require|email", |c: &mut Contact| &mut c.email)
                .field("phone", "mobile", |c: &mut Contact| &mut c.phone)
                .build()
        });
        &SCHEMA
    }
}

#[derive(Debug, Default, Clone)]
struct Account {
    login: String,
    contact: Contact,
    backup: Option<Contact>,
    comment: String,
}

impl Record for Account {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Account>> = LazyLock::new(|| {
            Schema::builder()
                .field("login", "account", |a: &mut Account| &mut a.login)
                .nested("contact", "", |a: &mut Account| &mut a.contact)
                .nested_opt("backup", "require", |a: &mut Account| &mut a.backup)
                .field("comment", "sql", |a: &mut Account| &mut a.comment)
                .build()
        });
        &SCHEMA
    }
}

fn contact() -> Contact {
    Contact {
        email: "dev@example.com".to_string(),
        phone: "13812345678".to_string(),
    }
}

fn account() -> Account {
    Account {
        login: "dev_user".to_string(),
        contact: contact(),
        backup: Some(contact()),
        comment: "hello there".to_string(),
    }
}

#[derive(Debug, Default)]
struct Holder {
    contact: Contact,
    label: String,
}

impl Record for Holder {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Holder>> = LazyLock::new(|| {
            Schema::builder()
                .nested("contact", "fooRule", |h: &mut Holder| &mut h.contact)
                .field("label", "require", |h: &mut Holder| &mut h.label)
                .build()
        });
        &SCHEMA
    }
}

#[test]
fn test_nested_errors_precede_owning_field_errors() {
    let mut holder = Holder {
        contact: Contact {
            email: String::new(),
            phone: "123".to_string(),
        },
        label: String::new(),
    };
    let errors = assert_err!(validator().verify(&mut holder));

    let order: Vec<(&str, &str)> = errors
        .iter()
        .map(|e| (e.field.as_str(), e.rule.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("contact.email", "require"),
            ("contact.phone", "mobile"),
            ("contact", "fooRule"),
            ("label", "require"),
        ]
    );
    assert_eq!(errors.iter().nth(2).map(|e| e.kind), Some(ErrorKind::Unresolved));
}

#[test]
fn test_valid_nested_account() {
    let mut account = account();
    assert_ok!(validator().verify(&mut account));
}

#[test]
fn test_nested_errors_are_prefixed_with_path() {
    let mut account = account();
    account.contact.email = "not-an-email".to_string();
    account.backup = Some(Contact {
        email: String::new(),
        phone: "123".to_string(),
    });

    let errors = assert_err!(validator().verify(&mut account));
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["contact.email", "backup.email", "backup.phone"]);
    assert_eq!(errors.first().message, "must be a valid email address");
}

#[test]
fn test_absent_optional_record_is_required() {
    let mut account = account();
    account.backup = None;

    let errors = assert_err!(validator().verify(&mut account));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().field, "backup");
    assert_eq!(errors.first().rule, "require");
}

#[test]
fn test_sql_rule_rejects_matches() {
    let mut account = account();
    account.comment = "x' or 1=1 --".to_string();

    let errors = assert_err!(validator().verify(&mut account));
    assert_eq!(errors.first().field, "comment");
    assert_eq!(errors.first().rule, "sql");
}

#[test]
fn test_fail_fast_stops_inside_nested_record() {
    let mut account = account();
    account.contact.email = String::new();
    account.comment = "drop table users".to_string();

    let errors = assert_err!(validator().fail_fast().verify(&mut account));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().field, "contact.email");

    let errors = assert_err!(validator().mode(Mode::CollectAll).verify(&mut account));
    // email skips the empty address, so only require fails before the comment
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.first().rule, "require");
    assert_eq!(errors.iter().nth(1).map(|e| e.field.as_str()), Some("comment"));
}

#[test]
fn test_verify_all_reports_per_record() {
    let mut bad = account();
    bad.login = "1bad".to_string();
    let mut accounts = vec![account(), bad, account()];

    let results = validator().verify_all(&mut accounts);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[2].is_ok());

    let errors = assert_err!(results[1].as_ref());
    assert_eq!(errors.first().field, "login");
}

// ============================================================================
// Rule errors and user checkers
// ============================================================================

#[derive(Debug, Default)]
struct Broken {
    size: u32,
    label: String,
}

impl Record for Broken {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Broken>> = LazyLock::new(|| {
            Schema::builder()
                .field("size", "number,min=abc", |b: &mut Broken| &mut b.size)
                .field("label", "upper", |b: &mut Broken| &mut b.label)
                .build()
        });
        &SCHEMA
    }
}

#[derive(Debug, Default)]
struct Quota {
    limit: u64,
    floor: String,
}

impl Record for Quota {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Quota>> = LazyLock::new(|| {
            Schema::builder()
                .field("limit", "number,min=0,max=9007199254740992", |q: &mut Quota| {
                    &mut q.limit
                })
                .field("floor", "number,min=NaN", |q: &mut Quota| &mut q.floor)
                .build()
        });
        &SCHEMA
    }
}

#[test]
fn test_number_bounds_are_exact_and_finite() {
    let mut quota = Quota {
        limit: 9_007_199_254_740_993,
        floor: "5".to_string(),
    };
    let errors = assert_err!(validator().verify(&mut quota));

    assert_eq!(errors.len(), 2);
    let limit = errors.first();
    assert_eq!(limit.field, "limit");
    assert_eq!(limit.kind, ErrorKind::Invalid);
    assert_eq!(limit.message, "must be at most 9007199254740992");

    let floor = assert_some!(errors.for_field("floor").next());
    assert_eq!(floor.kind, ErrorKind::Malformed);
}

#[test]
fn test_malformed_params_are_reported() {
    let mut record = Broken {
        size: 3,
        label: "ok".to_string(),
    };
    let errors = assert_err!(validator().verify(&mut record));

    assert_eq!(errors.count_kind(ErrorKind::Malformed), 1);
    assert_eq!(errors.count_kind(ErrorKind::Unresolved), 1);
    assert_eq!(errors.first().field, "size");
}

#[test]
fn test_registered_checker_resolves() -> TestResult {
    let registry = Arc::new(Registry::new());
    registry.register_fn("upper", |value: &Value| match value.as_str() {
        Some(s) if s.chars().all(|c| !c.is_lowercase()) => Ok(()),
        _ => Err("must be upper case".to_string()),
    });
    let validator = Validator::with_registry(registry);

    let mut record = Broken {
        size: 3,
        label: "ok".to_string(),
    };
    let errors = assert_err!(validator.verify(&mut record));
    let label_error = assert_some!(errors.for_field("label").next());
    assert_eq!(label_error.kind, ErrorKind::Invalid);
    assert_eq!(label_error.message, "must be upper case");

    record.label = "OK".to_string();
    let errors = assert_err!(validator.verify(&mut record));
    assert_eq!(errors.len(), 1);
    assert!(errors.for_field("label").next().is_none());

    Ok(())
}

#[test]
fn test_errors_display_and_serialize() -> TestResult {
    let mut record = Required::default();
    let errors = assert_err!(validator().verify(&mut record));

    assert_eq!(errors.to_string(), "name: must not be empty");

    let json = serde_json::to_value(&errors)?;
    assert_eq!(json[0]["field"], "name");
    assert_eq!(json[0]["kind"], "invalid");
    Ok(())
}
