//! Portman CLI - Find and kill the processes holding network ports
//!
//! Launches the interactive session by default; `kill`, `list` and
//! `config` run once and exit.

mod commands;
mod logging;
mod text;
mod tui;

use std::process::ExitCode;

use clap::error::{ContextKind, ErrorKind};
use clap::{Parser, Subcommand};
use portman_core::{Config, ConfigStore};

const KEYBINDINGS: &str = "\
Keybindings (TUI):
  ↑/↓ or j/k          Navigate
  Home/g, End/G       Jump to first / last row
  Enter               Kill selected process
  r                   Refresh port list
  /                   Filter ports
  q or Ctrl+C         Quit

Examples:
  portman              # Launch interactive mode
  portman kill 3000    # Kill process on port 3000
  portman ls --json    # Print every port as JSON";

#[derive(Parser, Debug)]
#[command(name = "portman")]
#[command(author, version, about = "Find and kill processes on network ports")]
#[command(propagate_version = true)]
#[command(after_help = KEYBINDINGS)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Disable interactive TUI mode
    #[arg(long, global = true)]
    no_tui: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Kill the process on a port
    Kill {
        /// Port number (1-65535)
        #[arg(value_parser = clap::value_parser!(u16).range(1..=65535))]
        port: u16,
    },

    /// List all open ports
    #[command(alias = "ls")]
    List {
        /// Only show this port
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..=65535))]
        port: Option<u16>,

        /// Match process name, command or protocol
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show current configuration
    Config {
        /// Write the default configuration if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return Ok(report_parse_error(&err)),
    };

    let interactive =
        cli.command.is_none() && !cli.no_tui && atty::is(atty::Stream::Stdout);
    logging::init(if interactive {
        logging::Mode::Session
    } else {
        logging::Mode::OneShot
    });

    match cli.command {
        Some(Commands::Kill { port }) => {
            let config = load_config().await?;
            commands::kill::run(port, &config).await
        }
        Some(Commands::List { port, filter }) => {
            commands::list::run(port, filter, cli.json).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Config { init }) => {
            commands::config::run(cli.json, init).await?;
            Ok(ExitCode::SUCCESS)
        }
        None if interactive => {
            let config = load_config().await?;
            tui::run(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            commands::list::run(None, None, cli.json).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn load_config() -> anyhow::Result<Config> {
    Ok(ConfigStore::new()?.load().await?)
}

/// Print a parse failure the way the command line promises and pick the
/// exit code.
fn report_parse_error(err: &clap::Error) -> ExitCode {
    if let Some(arg) = unknown_command(err) {
        eprintln!("Unknown command: {}", arg);
        eprintln!();
        let _ = <Cli as clap::CommandFactory>::command().print_help();
    } else {
        let _ = err.print();
    }
    ExitCode::from(exit_code_for(err))
}

fn unknown_command(err: &clap::Error) -> Option<String> {
    let context = match err.kind() {
        ErrorKind::InvalidSubcommand => ContextKind::InvalidSubcommand,
        ErrorKind::UnknownArgument => ContextKind::InvalidArg,
        _ => return None,
    };
    err.get(context).map(|value| value.to_string())
}

fn exit_code_for(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kill_parses_port() {
        let cli = Cli::try_parse_from(["portman", "kill", "3000"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Kill { port: 3000 }));
    }

    #[test]
    fn test_kill_rejects_out_of_range_ports() {
        for bad in ["0", "65536", "abc"] {
            let err = Cli::try_parse_from(["portman", "kill", bad]).unwrap_err();
            assert_eq!(exit_code_for(&err), 1, "port {bad}");
            assert!(unknown_command(&err).is_none());
        }
    }

    #[test]
    fn test_kill_requires_port() {
        let err = Cli::try_parse_from(["portman", "kill"]).unwrap_err();
        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn test_help_exits_zero() {
        for args in [vec!["portman", "--help"], vec!["portman", "-h"], vec!["portman", "help"]] {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
            assert_eq!(exit_code_for(&err), 0);
        }
    }

    #[test]
    fn test_help_lists_keybindings() {
        let help = <Cli as clap::CommandFactory>::command()
            .render_long_help()
            .to_string();
        assert!(help.contains("Keybindings (TUI):"));
        assert!(help.contains("Kill selected process"));
    }

    #[test]
    fn test_unknown_command() {
        let err = Cli::try_parse_from(["portman", "frobnicate"]).unwrap_err();
        assert_eq!(unknown_command(&err).as_deref(), Some("frobnicate"));
        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn test_no_command_launches_session() {
        let cli = Cli::try_parse_from(["portman"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.no_tui);
    }

    #[test]
    fn test_list_alias_and_flags() {
        let cli = Cli::try_parse_from(["portman", "ls", "--filter", "node", "--json"]).unwrap();
        assert!(cli.json);
        assert_eq!(
            cli.command,
            Some(Commands::List {
                port: None,
                filter: Some("node".to_string()),
            })
        );
    }
}
