//! Command-line surface of the `exact` binary.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Operator client for EXL location servers.
///
/// Configuration flags such as `--server` and `--tls-verification` must come
/// before the subcommand.
#[derive(Debug, Parser)]
#[command(name = "exact", version, about, long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum CliCommand {
    /// Join channels and print notifications until interrupted.
    Listen {
        #[command(flatten)]
        credentials: Credentials,
        /// Channel to join; repeat for several channels.
        #[arg(
            long = "channel",
            value_name = "CHANNEL",
            default_values = ["measurements", "solution"]
        )]
        channels: Vec<String>,
    },
    /// Check that the server answers.
    Ping {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Print every record of a resource listing.
    List {
        #[arg(value_enum)]
        resource: Resource,
        #[command(flatten)]
        credentials: Credentials,
    },
}

/// Login used before running the command.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct Credentials {
    /// User to log in as; without it the command runs unauthenticated.
    #[arg(long)]
    pub(crate) user: Option<String>,
    #[arg(long, requires = "user")]
    pub(crate) password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Resource {
    Users,
    Cells,
    #[value(name = "bs")]
    BaseStations,
    Tags,
    Channels,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_defaults_to_measurements_and_solution() {
        let cli = Cli::try_parse_from(["exact", "listen", "--user", "ops"]).expect("parse");
        let CliCommand::Listen {
            credentials,
            channels,
        } = cli.command
        else {
            panic!("expected listen");
        };
        assert_eq!(credentials.user.as_deref(), Some("ops"));
        assert_eq!(channels, ["measurements", "solution"]);
    }

    #[test]
    fn password_requires_user() {
        assert!(Cli::try_parse_from(["exact", "ping", "--password", "x"]).is_err());
    }

    #[test]
    fn base_stations_are_listed_as_bs() {
        let cli = Cli::try_parse_from(["exact", "list", "bs"]).expect("parse");
        assert!(matches!(
            cli.command,
            CliCommand::List {
                resource: Resource::BaseStations,
                ..
            }
        ));
    }
}
