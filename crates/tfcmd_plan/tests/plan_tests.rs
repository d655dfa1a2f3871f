//! Integration tests for plan parsing and change inspection.
//!
//! The fixture mirrors the shape of `terraform show -json` output, including
//! keys this crate does not model.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde_json::json;

use tfcmd_plan::{
    BoxedValue, Change, ChangeKind, Plan, PlanError, ResourceFilter, ResourceMode,
};

const FIXTURE: &str = include_str!("fixtures/plan.json");

fn fixture() -> Plan {
    Plan::parse(FIXTURE).unwrap()
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Top-level metadata and variables are read; unmodelled keys are ignored.
#[test]
fn test_parse_fixture() {
    let plan = fixture();

    assert_eq!(plan.format_version.as_deref(), Some("1.2"));
    assert_eq!(plan.terraform_version.as_deref(), Some("1.6.2"));
    assert_eq!(plan.resource_changes.len(), 6);
    assert!(!plan.errored);

    let variables = plan.variable_values();
    assert_eq!(variables.get("region"), Some(&json!("eu-west-1")));
    assert_eq!(variables.get("instance_count"), Some(&json!(2)));
    assert_eq!(variables.get("tags"), Some(&json!({"env": "dev", "team": "platform"})));
}

/// Output changes keep document order.
#[test]
fn test_output_changes_in_order() {
    let plan = fixture();
    let names: Vec<_> = plan.output_changes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["web_ips", "db_password"]);

    let web_ips = plan.output_change_with_name("web_ips").unwrap();
    assert!(web_ips.change.is_create());
    assert!(web_ips.change.present_after());
    assert_eq!(web_ips.change.after_object(), BoxedValue::unknown(false));

    let password = plan.output_change_with_name("db_password").unwrap();
    assert!(password.change.is_update());
    assert_eq!(password.change.after_object(), BoxedValue::known("new-secret", true));
    assert_eq!(password.change.after_object().render(), "(sensitive value)");

    assert!(plan.output_change_with_name("missing").is_none());
}

/// Every resource in the fixture lands in exactly one category.
#[test]
fn test_classification() {
    let plan = fixture();
    let kind = |address: &str| plan.resource_change_with_address(address).unwrap().kind();

    assert_eq!(kind("aws_instance.web[0]"), ChangeKind::Create);
    assert_eq!(kind("aws_instance.web[1]"), ChangeKind::NoOp);
    assert_eq!(kind("module.db.aws_db_instance.main"), ChangeKind::ReplaceDeleteCreate);
    assert_eq!(kind("aws_security_group.legacy"), ChangeKind::Delete);
    assert_eq!(kind("data.aws_ami.ubuntu"), ChangeKind::Read);
    assert_eq!(kind("aws_lb.front"), ChangeKind::ReplaceCreateDelete);
}

/// Delete then create is a replacement, not a creation.
#[test]
fn test_delete_create_is_replace() {
    let plan = fixture();
    let db = plan.resource_change_with_address("module.db.aws_db_instance.main").unwrap();

    assert!(db.is_replace_delete_before_create());
    assert!(db.is_replace());
    assert!(!db.is_create());
    assert!(!db.is_replace_create_before_delete());
    assert_eq!(db.module_address.as_deref(), Some("module.db"));
    assert_eq!(db.action_reason.as_deref(), Some("replace_because_cannot_update"));
    assert_eq!(db.change.replace_paths, vec![json!(["engine_version"])]);
}

#[test]
fn test_summary() {
    let summary = fixture().summary();

    assert_eq!(summary.to_add, 1);
    assert_eq!(summary.to_change, 0);
    assert_eq!(summary.to_replace, 2);
    assert_eq!(summary.to_destroy, 1);
    assert_eq!(summary.to_read, 1);
    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.unrecognised, 0);
    assert!(summary.has_changes());
}

#[test]
fn test_queries() {
    let plan = fixture();

    let instances = plan.resource_changes_with_type("aws_instance");
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].index, Some(json!(0)));
    assert_eq!(instances[1].index, Some(json!(1)));

    let data = plan.resource_changes_matching(&ResourceFilter::new().mode(ResourceMode::Data));
    assert_eq!(data.len(), 1);
    assert!(data[0].is_data());

    let module = plan.resource_changes_matching(&ResourceFilter::new().module_address("module.db"));
    assert_eq!(module.len(), 1);

    let replaced = plan.resource_changes_matching(
        &ResourceFilter::new().resource_type("aws_lb").kind(ChangeKind::ReplaceCreateDelete),
    );
    assert_eq!(replaced.len(), 1);

    assert!(plan.resource_change_with_address("aws_instance.nope").is_none());
}

/// The boxed after-state of a new instance mixes known, unknown and
/// sensitive attributes.
#[test]
fn test_after_object_of_created_instance() {
    let plan = fixture();
    let web = plan.resource_change_with_address("aws_instance.web[0]").unwrap();
    let after = web.change.after_object();

    assert_eq!(after.get("ami"), Some(&BoxedValue::known("ami-0abc", false)));
    assert_eq!(after.get("id"), Some(&BoxedValue::unknown(false)));
    assert_eq!(after.get("arn"), Some(&BoxedValue::unknown(false)));
    assert!(after.get("user_data").unwrap().is_sensitive());
    assert_eq!(
        after.get("tags"),
        Some(&BoxedValue::map([("Name", BoxedValue::known("web-0", false))], false))
    );
    assert!(after.has_unknown());
    assert!(!web.change.present_before());
    assert_eq!(web.change.before_object(), BoxedValue::known(serde_json::Value::Null, false));
}

/// List elements may be individually unknown.
#[test]
fn test_partially_unknown_list() {
    let plan = fixture();
    let lb = plan.resource_change_with_address("aws_lb.front").unwrap();
    let subnets = lb.change.after_object();
    let subnets = subnets.get("subnets").unwrap();

    assert_eq!(
        subnets,
        &BoxedValue::list(
            vec![BoxedValue::known("subnet-a", false), BoxedValue::unknown(false)],
            false
        )
    );
    assert_eq!(subnets.render(), "[\"subnet-a\", (known after apply)]");
}

#[test]
fn test_before_object_sensitivity() {
    let plan = fixture();
    let db = plan.resource_change_with_address("module.db.aws_db_instance.main").unwrap();
    let before = db.change.before_object();

    assert!(before.get("password").unwrap().is_sensitive());
    assert!(!before.get("engine").unwrap().is_sensitive());
    assert!(!before.has_unknown());
    assert_eq!(
        before.render(),
        "{engine = \"postgres\", engine_version = \"14\", id = \"db-1\", password = (sensitive value)}"
    );
}

/// Changes decoded from the same content compare and hash equal whatever
/// the key order of the source document.
#[test]
fn test_structural_equality() {
    let a: Change = serde_json::from_str(
        r#"{"actions":["update"],"before":{"a":1,"b":{"c":[1,2]}},"after":{"a":2,"b":{"c":[1,2]}}}"#,
    )
    .unwrap();
    let b: Change = serde_json::from_str(
        r#"{"after":{"b":{"c":[1,2]},"a":2},"before":{"b":{"c":[1,2]},"a":1},"actions":["update"]}"#,
    )
    .unwrap();

    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_eq!(a.after_object(), b.after_object());
    assert_eq!(hash_of(&a.after_object()), hash_of(&b.after_object()));

    let c = Change::new(["update"]).with_after(json!({"a": 3}), json!({}), json!({}));
    assert_ne!(a, c);
}

#[test]
fn test_whole_plans_compare_structurally() {
    assert_eq!(fixture(), fixture());
    assert_eq!(hash_of(&fixture().resource_changes), hash_of(&fixture().resource_changes));
}

/// Unknown action sequences are tolerated and counted separately.
#[test]
fn test_unrecognised_actions_are_tolerated() {
    let plan = Plan::from_value(json!({
        "resource_changes": [
            {"address": "a.b", "type": "a", "name": "b", "change": {"actions": ["forget"]}},
            {"address": "c.d", "type": "c", "name": "d", "change": {"actions": ["update", "delete"]}}
        ]
    }))
    .unwrap();

    assert!(plan.resource_changes.iter().all(|c| c.kind() == ChangeKind::Other));
    assert_eq!(plan.summary().unrecognised, 2);
    assert!(!plan.summary().has_changes());
}

#[test]
fn test_plan_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.json");
    std::fs::write(&path, FIXTURE).unwrap();

    let plan = Plan::from_file(&path).unwrap();
    assert_eq!(plan, fixture());

    assert!(matches!(
        Plan::from_file(dir.path().join("absent.json")),
        Err(PlanError::Io(_))
    ));
}
