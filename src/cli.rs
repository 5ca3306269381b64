use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "accounts")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Resolve declarative user, group and SSH key configuration",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the resolved groups, users and authorized keys
    ///
    /// Examples:
    ///   accounts resolve                         # Everything
    ///   accounts resolve users                   # Only users
    ///   accounts resolve ssh_authorized_key.foo  # Keys whose title contains "foo"
    ///   accounts resolve --format json           # Machine-readable output
    Resolve(ResolveArgs),

    /// Resolve the configuration and report what it would produce
    ///
    /// Examples:
    ///   accounts check                           # Every resource
    ///   accounts check keys                      # Only authorized keys
    Check(CheckArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Where the configuration comes from
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Config file (TOML or JSON, by extension)
    #[arg(short, long, env = "ACCOUNTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override ssh_authorized_key_title from the config file
    #[arg(long, value_name = "TEMPLATE")]
    pub title: Option<String>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Only show matching resources: kind or kind.name
    /// (group, user, ssh_authorized_key, private_key)
    pub target: Option<String>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Only count matching resources: kind or kind.name
    pub target: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    Json,
    Toml,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::parse_from([
            "accounts",
            "-vv",
            "resolve",
            "--config",
            "/etc/accounts.toml",
            "--format",
            "json",
            "users.alice",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Resolve(args) = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(args.config.config, Some(PathBuf::from("/etc/accounts.toml")));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.target.as_deref(), Some("users.alice"));
    }

    #[test]
    fn test_parse_check_with_title() {
        let cli = Cli::parse_from(["accounts", "check", "--title", "%{account}", "-q", "keys"]);
        assert!(cli.quiet);
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.config.title.as_deref(), Some("%{account}"));
        assert_eq!(args.target.as_deref(), Some("keys"));
    }
}
