//! `accounts check` - resolve and summarize

use acctkit::{Catalog, CatalogSummary, ResolvedAccounts, ResourceKind, Target};
use anyhow::Result;
use colored::Colorize;
use std::collections::HashMap;

use crate::Context;
use crate::cli::CheckArgs;
use crate::ui;

pub fn run(ctx: &Context, args: CheckArgs) -> Result<()> {
    let (config, resolved) = super::load_and_resolve(&args.config)?;

    ui::header("Accounts Check");

    if config.is_empty() {
        ui::warn("Configuration declares nothing");
    }

    let catalog = selected(&resolved, args.target.as_deref());
    let summary = CatalogSummary::from_catalog(&catalog);

    println!();
    for kind in ResourceKind::ALL {
        let counts = summary.kind(kind);
        if counts.total() == 0 {
            continue;
        }
        ui::kv(
            kind.label(),
            &format!(
                "{} ({} present, {} absent, {} unset)",
                counts.total().to_string().bold(),
                counts.present.to_string().green(),
                counts.absent.to_string().red(),
                counts.unspecified.to_string().dimmed()
            ),
        );
    }

    let duplicates = duplicate_titles(&resolved);
    for (title, count) in &duplicates {
        ui::warn(&format!("Title '{title}' is used by {count} authorized keys"));
    }

    if ctx.verbose > 0 && catalog.has_removals() {
        ui::section(&format!("Removals ({})", summary.removals()));
        for (kind, resources) in declarative::group_by_kind(&catalog) {
            for resource in resources.iter().filter(|r| r.is_removal()) {
                println!("  {} {} {}", "-".red(), kind, resource.id());
            }
        }
    }

    println!();
    ui::success(&format!(
        "Configuration resolves to {}",
        ui::count(summary.total(), "resource", "resources")
    ));

    Ok(())
}

/// Resources the check covers, all of them without a target
fn selected(resolved: &ResolvedAccounts, target: Option<&str>) -> Catalog {
    let target = target.map(Target::parse);
    if let Some(target) = &target {
        log::debug!("Checking resources matching {target:?}");
    }
    resolved.catalog().filter_by_target(target.as_ref())
}

/// Titles rendered for more than one authorized key, in first-seen order
fn duplicate_titles(resolved: &ResolvedAccounts) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for key in &resolved.ssh_authorized_keys {
        let count = counts.entry(key.title.as_str()).or_insert(0);
        if *count == 0 {
            order.push(key.title.as_str());
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|title| {
            let count = counts[title];
            (count > 1).then(|| (title.to_string(), count))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResolvedAccounts {
        let config: acctkit::AccountsConfig = toml::from_str(
            r#"
[groups.wheel]

[ssh_keys.foo]
[ssh_keys.old]
ensure = "absent"

[users.foo]

[accounts.foo]
groups = ["wheel"]
"#,
        )
        .unwrap();
        acctkit::resolve(&config).unwrap()
    }

    #[test]
    fn test_selected_without_target_keeps_everything() {
        let resolved = sample();
        assert_eq!(selected(&resolved, None).len(), resolved.len());
    }

    #[test]
    fn test_selected_by_target() {
        let resolved = sample();
        let keys = selected(&resolved, Some("keys"));
        let ids: Vec<String> = keys.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["foo-on-foo", "old-on-foo"]);
        assert!(keys.has_removals());

        let groups = selected(&resolved, Some("groups"));
        assert_eq!(groups.len(), 1);
        assert!(!groups.has_removals());
    }

    #[test]
    fn test_duplicate_titles() {
        let config: acctkit::AccountsConfig = toml::from_str(
            r#"
ssh_authorized_key_title = "%{account}"

[ssh_keys.foo]
[ssh_keys.bar]

[accounts.foo]
authorized_keys = "bar"

[accounts.bar]
"#,
        )
        .unwrap();
        let resolved = acctkit::resolve(&config).unwrap();
        assert_eq!(
            duplicate_titles(&resolved),
            vec![("foo".to_string(), 2)]
        );
    }

    #[test]
    fn test_no_duplicate_titles_with_default_template() {
        let config: acctkit::AccountsConfig = toml::from_str(
            r#"
[ssh_keys.foo]
[ssh_keys.bar]

[accounts.foo]
authorized_keys = "bar"
"#,
        )
        .unwrap();
        let resolved = acctkit::resolve(&config).unwrap();
        assert!(duplicate_titles(&resolved).is_empty());
    }
}
