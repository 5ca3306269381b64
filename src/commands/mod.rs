// Resolution commands
pub mod check;
pub mod resolve;

use acctkit::{AccountsConfig, ResolvedAccounts};
use anyhow::Result;

use crate::cli::ConfigArgs;
use crate::config;

/// Load the configuration named by `args` and resolve it
pub(crate) fn load_and_resolve(args: &ConfigArgs) -> Result<(AccountsConfig, ResolvedAccounts)> {
    let config = config::load(args.config.as_deref(), args.title.as_deref())?;
    let resolved = resolve(&config)?;
    Ok((config, resolved))
}

/// Resolve a loaded configuration, naming the title template when it is at fault
fn resolve(config: &AccountsConfig) -> Result<ResolvedAccounts> {
    acctkit::resolve(config).map_err(|err| {
        let message = if err.is_template() {
            format!(
                "Invalid ssh_authorized_key_title '{}'",
                config.ssh_authorized_key_title
            )
        } else {
            "Failed to resolve accounts".to_string()
        };
        anyhow::Error::new(err).context(message)
    })
}
