use anyhow::Context;
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod clock;
mod identity;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "operator-id")]
#[command(about = "Operator identity and timestamps for deployment tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the operator identifier used to tag cloud resources.
    User {
        /// Identity lookup command line, split on whitespace
        /// (e.g. "aws sts get-caller-identity --output text --query UserId").
        #[arg(long)]
        identity_command: Option<String>,

        #[arg(
            long,
            default_value_t = identity::resolver::DEFAULT_MAX_LEN,
            value_parser = RangedU64ValueParser::<usize>::new().range(1..)
        )]
        max_len: usize,
    },
    /// Print the time since the Unix epoch (milliseconds by default).
    Timestamp {
        #[arg(long, value_enum, default_value_t = Precision::Millis)]
        precision: Precision,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Precision {
    /// System wall clock.
    Millis,
    /// Estimated from a monotonic timer.
    Micros,
    /// Estimated from a monotonic timer.
    Nanos,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::User {
            identity_command,
            max_len,
        } => {
            let mut config = identity::ResolverConfig {
                max_len,
                ..Default::default()
            };
            if let Some(line) = identity_command {
                config.identity_command = line.split_whitespace().map(String::from).collect();
            }

            let resolver = identity::UsernameResolver::from_config(config)
                .context("configure identity lookup")?;
            let name = resolver.resolve().context("resolve operator identity")?;
            println!("{}", name);
        }
        Commands::Timestamp { precision } => {
            let value = match precision {
                Precision::Millis => clock::now_millis(),
                Precision::Micros => clock::NanoClock::new().current_time_micros(),
                Precision::Nanos => clock::NanoClock::new().current_time_nanos(),
            };
            println!("{}", value);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_user(args: &[&str]) -> (Option<String>, usize) {
        let cli = Cli::try_parse_from(["operator-id", "user"].iter().chain(args).copied()).unwrap();
        match cli.cmd {
            Commands::User {
                identity_command,
                max_len,
            } => (identity_command, max_len),
            _ => panic!("expected user command"),
        }
    }

    #[test]
    fn user_defaults() {
        assert_eq!(parse_user(&[]), (None, 15));
    }

    #[test]
    fn identity_command_does_not_swallow_later_flags() {
        let (command, max_len) = parse_user(&[
            "--identity-command",
            "aws sts get-caller-identity --profile dev",
            "--max-len",
            "5",
        ]);
        assert_eq!(
            command.as_deref(),
            Some("aws sts get-caller-identity --profile dev")
        );
        assert_eq!(max_len, 5);
    }

    #[test]
    fn zero_max_len_is_rejected() {
        assert!(Cli::try_parse_from(["operator-id", "user", "--max-len", "0"]).is_err());
    }

    #[test]
    fn timestamp_defaults_to_millis() {
        let cli = Cli::try_parse_from(["operator-id", "timestamp"]).unwrap();
        assert!(matches!(
            cli.cmd,
            Commands::Timestamp {
                precision: Precision::Millis
            }
        ));
    }

    #[test]
    fn timestamp_precision_is_selectable() {
        let cli = Cli::try_parse_from(["operator-id", "timestamp", "--precision", "micros"]).unwrap();
        assert!(matches!(
            cli.cmd,
            Commands::Timestamp {
                precision: Precision::Micros
            }
        ));
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
