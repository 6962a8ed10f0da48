use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `vetdesk` binary.
#[derive(Debug, Parser)]
#[command(
    name = "vetdesk",
    version,
    about = "vetdesk - session tools for the clinic admin desk"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::subcommands::{AuthCommands, TokenCommands};
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["vetdesk", "--format", "raw", "--verbose", "auth", "status"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Auth {
                action: AuthCommands::Status
            }
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["vetdesk", "auth", "logout", "--quiet"])
            .expect("cli should parse");
        assert!(cli.quiet);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn output_format_rejects_table() {
        assert!(Cli::try_parse_from(["vetdesk", "--format", "table", "auth", "status"]).is_err());
    }

    #[test]
    fn login_takes_email_and_password() {
        let cli = Cli::try_parse_from([
            "vetdesk",
            "auth",
            "login",
            "--email",
            "desk@clinic.test",
            "--password",
            "hunter22",
        ])
        .expect("cli should parse");

        let Commands::Auth {
            action: AuthCommands::Login(args),
        } = cli.command
        else {
            panic!("expected auth login");
        };
        assert_eq!(args.email, "desk@clinic.test");
        assert_eq!(args.password, "hunter22");
    }

    #[test]
    fn token_inspect_accepts_buffer() {
        let cli = Cli::try_parse_from(["vetdesk", "token", "inspect", "a.b.c", "--buffer-secs", "30"])
            .expect("cli should parse");

        let Commands::Token {
            action: TokenCommands::Inspect(args),
        } = cli.command
        else {
            panic!("expected token inspect");
        };
        assert_eq!(args.token, "a.b.c");
        assert_eq!(args.buffer_secs, Some(30));
    }

    #[test]
    fn open_takes_path_and_role() {
        let cli = Cli::try_parse_from(["vetdesk", "open", "/settings", "--role", "admin"])
            .expect("cli should parse");

        let Commands::Open(args) = cli.command else {
            panic!("expected open");
        };
        assert_eq!(args.path, "/settings");
        assert_eq!(args.role.as_deref(), Some("admin"));
    }
}
