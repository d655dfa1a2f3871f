//! Commands command - List the terraform command catalog.

use anyhow::Result;
use clap::Args;

use tfcmd_core::{catalog, CommandSpec};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show commands whose name contains this text
    filter: Option<String>,

    /// Print the catalog as JSON
    #[arg(long)]
    json: bool,
}

pub fn execute(args: &ListArgs) -> Result<()> {
    let commands = select(args.filter.as_deref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&commands)?);
        return Ok(());
    }

    for spec in &commands {
        println!("{}", describe(spec));
    }
    Ok(())
}

fn select(filter: Option<&str>) -> Vec<&'static CommandSpec> {
    catalog::all()
        .iter()
        .filter(|spec| filter.map(|f| spec.name.contains(f)).unwrap_or(true))
        .collect()
}

fn describe(spec: &CommandSpec) -> String {
    let mut line = spec.name.to_string();
    if !spec.arguments.is_empty() {
        let arguments: Vec<String> = spec.arguments.iter().map(|a| format!("<{}>", a)).collect();
        line.push(' ');
        line.push_str(&arguments.join(" "));
    }
    if !spec.switches.is_empty() {
        line.push_str("\n    ");
        line.push_str(&spec.switches.join(" "));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_filters_by_name() {
        let names: Vec<_> = select(Some("workspace")).iter().map(|s| s.name).collect();
        assert!(names.contains(&"workspace select"));
        assert!(names.iter().all(|n| n.starts_with("workspace")));
        assert_eq!(select(None).len(), catalog::all().len());
    }

    #[test]
    fn test_describe() {
        let text = describe(catalog::lookup("output").unwrap());
        assert_eq!(text, "output <name>\n    -json -raw -no-color -state");

        let bare = describe(catalog::lookup("state pull").unwrap());
        assert_eq!(bare, "state pull");
    }
}
