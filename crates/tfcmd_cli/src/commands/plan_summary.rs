//! Plan summary command - Classify the resource changes in a JSON plan.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};
use tracing::{info, warn};

use tfcmd_plan::{ChangeKind, Plan, ResourceChange};

#[derive(Args, Debug)]
pub struct PlanSummaryArgs {
    /// JSON plan produced by `terraform show -json <planfile>`
    plan: PathBuf,

    /// Hide resources without changes
    #[arg(long)]
    changes_only: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

pub fn execute(args: &PlanSummaryArgs) -> Result<()> {
    let plan = Plan::from_file(&args.plan)
        .with_context(|| format!("Failed to read plan {:?}", args.plan))?;
    info!(
        "Loaded plan with {} resource change(s) (terraform {})",
        plan.resource_changes.len(),
        plan.terraform_version.as_deref().unwrap_or("unknown")
    );
    if plan.errored {
        warn!("Plan was produced by a failed terraform run");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&plan, args.changes_only))?);
    } else {
        for line in table(&plan, args.changes_only) {
            println!("{}", line);
        }
        println!();
        println!("Plan: {}.", plan.summary());
    }
    Ok(())
}

fn shown(change: &ResourceChange, changes_only: bool) -> bool {
    !(changes_only && change.kind() == ChangeKind::NoOp)
}

fn table(plan: &Plan, changes_only: bool) -> Vec<String> {
    plan.resource_changes
        .iter()
        .filter(|change| shown(change, changes_only))
        .map(|change| {
            let kind = change.kind();
            format!("{:>3} {} {}", kind.symbol(), change.address, kind.label())
        })
        .collect()
}

fn to_json(plan: &Plan, changes_only: bool) -> Value {
    let resources: Vec<Value> = plan
        .resource_changes
        .iter()
        .filter(|change| shown(change, changes_only))
        .map(|change| {
            json!({
                "address": change.address,
                "type": change.resource_type,
                "action": change.kind().label(),
                "actions": change.change.actions.iter().map(|a| a.as_str().to_string()).collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "terraform_version": plan.terraform_version,
        "summary": plan.summary(),
        "resources": resources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Plan {
        Plan::parse(
            r#"{
                "terraform_version": "1.6.2",
                "resource_changes": [
                    {"address": "aws_instance.web", "type": "aws_instance", "name": "web",
                     "change": {"actions": ["create"]}},
                    {"address": "aws_vpc.main", "type": "aws_vpc", "name": "main",
                     "change": {"actions": ["no-op"]}},
                    {"address": "aws_db_instance.db", "type": "aws_db_instance", "name": "db",
                     "change": {"actions": ["delete", "create"]}}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_table_lines() {
        let lines = table(&sample(), false);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "  + aws_instance.web will be created");
        assert_eq!(lines[2], "-/+ aws_db_instance.db must be replaced");

        assert_eq!(table(&sample(), true).len(), 2);
    }

    #[test]
    fn test_json_report() {
        let report = to_json(&sample(), true);
        assert_eq!(report["summary"]["to_add"], json!(1));
        assert_eq!(report["summary"]["to_replace"], json!(1));
        assert_eq!(report["resources"][1]["actions"], json!(["delete", "create"]));
        assert_eq!(report["terraform_version"], json!("1.6.2"));
    }

    #[test]
    fn test_missing_file() {
        let args = PlanSummaryArgs {
            plan: PathBuf::from("/nonexistent/plan.json"),
            changes_only: false,
            json: false,
        };
        assert!(execute(&args).is_err());
    }
}
