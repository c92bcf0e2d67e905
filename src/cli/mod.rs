//! CLI module for the CTF platform
//!
//! Provides subcommands for running the platform:
//! - `serve`: HTTP API with the event lifecycle scheduler

pub mod serve;

use clap::{Parser, Subcommand};

/// CTF Platform - individual and team capture-the-flag competitions
#[derive(Parser)]
#[command(name = "ctf-platform")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve(serve::ServeArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "ctf-platform",
            "serve",
            "--port",
            "9000",
            "--storage",
            "postgres",
        ])
        .unwrap();

        let Command::Serve(args) = cli.command;
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.storage.as_deref(), Some("postgres"));
        assert!(args.host.is_none());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
