//! `accounts resolve` - print the desired-state resources

use acctkit::{ResolvedAccounts, Resource, ResourceKind, Target};
use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;

use crate::Context;
use crate::cli::{OutputFormat, ResolveArgs};
use crate::ui;

pub fn run(ctx: &Context, args: ResolveArgs) -> Result<()> {
    let (_, mut resolved) = super::load_and_resolve(&args.config)?;

    if let Some(target) = args.target.as_deref() {
        let target = Target::parse(target);
        log::debug!("Filtering resources by {target:?}");
        resolved.retain_target(&target);
    }

    match args.format {
        OutputFormat::Text => print_text(ctx, &resolved),
        OutputFormat::Json => println!("{}", render_json(&resolved)?),
        OutputFormat::Toml => print!("{}", render_toml(&resolved)?),
    }

    Ok(())
}

fn render_json(resolved: &ResolvedAccounts) -> Result<String> {
    serde_json::to_string_pretty(resolved).context("Failed to serialize resources as JSON")
}

fn render_toml(resolved: &ResolvedAccounts) -> Result<String> {
    toml::to_string_pretty(resolved).context("Failed to serialize resources as TOML")
}

fn print_text(ctx: &Context, resolved: &ResolvedAccounts) {
    ui::header("Resolved Accounts");

    if resolved.is_empty() {
        println!();
        ui::info("Nothing to resolve");
        return;
    }

    if !resolved.groups.is_empty() {
        ui::section(ResourceKind::Group.label());
        for group in &resolved.groups {
            println!("  {} {}", ui::ensure_icon(group.ensure), group.name.bold());
        }
    }

    if !resolved.users.is_empty() {
        ui::section(ResourceKind::User.label());
        for user in &resolved.users {
            println!(
                "  {} {} {}",
                ui::ensure_icon(user.ensure),
                user.name.bold(),
                ui::ensure_label(user.ensure)
            );
            if ctx.quiet {
                continue;
            }
            if let Some(comment) = &user.comment {
                ui::dim(&format!("  comment: {comment}"));
            }
            if !user.groups.is_empty() {
                ui::dim(&format!("  groups: {}", user.groups.join(", ")));
            }
            if let Some(purge) = user.purge_ssh_keys {
                ui::dim(&format!("  purge_ssh_keys: {purge}"));
            }
        }
    }

    if !resolved.ssh_authorized_keys.is_empty() {
        ui::section(ResourceKind::SshAuthorizedKey.label());
        for key in &resolved.ssh_authorized_keys {
            println!(
                "  {} {} {}",
                ui::ensure_icon(key.ensure),
                key.title.bold(),
                ui::ensure_label(key.ensure)
            );
            if ctx.quiet {
                continue;
            }
            ui::dim(&format!(
                "  {} → {} ({})",
                key.ssh_key,
                key.user,
                key.key_type.as_deref().unwrap_or("no type")
            ));
            if !key.options.is_empty() {
                ui::dim(&format!("  options: {}", key.options.join(",")));
            }
        }
    }

    if !resolved.private_keys.is_empty() {
        ui::section(ResourceKind::PrivateKey.label());
        for placement in &resolved.private_keys {
            println!(
                "  {} {}",
                ui::ensure_icon(placement.ensure()),
                placement.title.bold()
            );
            if !ctx.quiet {
                ui::dim(&format!("  creates {}", placement.creates));
            }
        }
    }

    println!();
    ui::dim(&format!(
        "{}, {}, {}, {}",
        ui::count(resolved.groups.len(), "group", "groups"),
        ui::count(resolved.users.len(), "user", "users"),
        ui::count(resolved.ssh_authorized_keys.len(), "authorized key", "authorized keys"),
        ui::count(resolved.private_keys.len(), "private key", "private keys"),
    ));
}
