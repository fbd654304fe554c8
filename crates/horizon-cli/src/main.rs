//! Homelab Horizon CLI binary entrypoint.
//!
//! This is the main entry point for the `horizon` command-line tool.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use horizon_cli::cli::Cli;
use horizon_cli::commands::{execute, Context};
use horizon_cli::output::{DryRunReport, OutputFormat};
use horizon_cli::CliError;
use horizon_config::GatewayConfig;
use horizon_system::{
    CancellationToken, CommandRunner, DryRunCommandRunner, DryRunFileSystem, FileSystem, RealCommandRunner,
    RealFileSystem,
};

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupted, cancelling");
                cancel.cancel();
            }
        }
    });

    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    if cli.dry_run {
        let ctx = load_context(&cli, DryRunFileSystem::new(), DryRunCommandRunner::new(), cancel)?;
        execute(&ctx, &cli.command, &mut stdout, &format).await?;
        let report = DryRunReport::collect(&ctx.fs, &ctx.runner);
        // Keep stdout a single JSON document.
        if format.is_json() {
            format.write(&mut io::stderr().lock(), &report)?;
        } else {
            format.write(&mut stdout, &report)?;
        }
    } else {
        let ctx = load_context(&cli, RealFileSystem::new(), RealCommandRunner::new(), cancel)?;
        execute(&ctx, &cli.command, &mut stdout, &format).await?;
    }
    stdout.flush()?;
    Ok(())
}

fn load_context<F: FileSystem, R: CommandRunner>(
    cli: &Cli,
    fs: F,
    runner: R,
    cancel: CancellationToken,
) -> Result<Context<F, R>, CliError> {
    let (settings, path) = GatewayConfig::discover(&fs, cli.config.as_deref())?;
    match &path {
        Some(path) => tracing::debug!(path = %path.display(), "using gateway settings"),
        None => tracing::debug!("no settings file found, using defaults"),
    }
    Ok(Context::new(settings, fs, runner, cancel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_cli::cli::{Commands, Format};

    #[test]
    fn test_cli_parsing_peers() {
        let cli = Cli::parse_from(["horizon", "peers"]);
        assert!(matches!(cli.command, Commands::Peers));
        assert!(!cli.dry_run);
        assert_eq!(cli.format, Format::Table);
    }

    #[test]
    fn test_cli_parsing_global_flags() {
        let cli = Cli::parse_from([
            "horizon",
            "--config",
            "/tmp/horizon.json",
            "--dry-run",
            "--format",
            "json",
            "status",
        ]);
        assert!(cli.dry_run);
        assert_eq!(cli.format, Format::Json);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/horizon.json")));
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_cli_parsing_add_peer() {
        let cli = Cli::parse_from([
            "horizon",
            "add-peer",
            "--name",
            "laptop",
            "--public-key",
            "YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXoxMjM0NTY=",
        ]);
        assert!(matches!(
            cli.command,
            Commands::AddPeer(ref args) if args.name == "laptop" && args.public_key.is_some() && args.ip.is_none()
        ));
    }

    #[test]
    fn test_cli_parsing_next_ip() {
        let cli = Cli::parse_from(["horizon", "next-ip", "--cidr", "10.200.0.0/24"]);
        assert!(matches!(cli.command, Commands::NextIp { cidr: Some(ref c) } if c == "10.200.0.0/24"));
    }

    #[test]
    fn test_cli_rejects_missing_name() {
        assert!(Cli::try_parse_from(["horizon", "add-peer"]).is_err());
    }

    #[test]
    fn test_load_context_with_explicit_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("horizon.json");
        std::fs::write(&path, r#"{ "wg_interface": "wg7", // comment
            "vpn_range": "10.77.0.0/24" }"#)
        .expect("write settings");

        let cli = Cli::parse_from(["horizon", "--config", path.to_str().expect("utf-8 path"), "status"]);
        let ctx = load_context(&cli, DryRunFileSystem::new(), DryRunCommandRunner::new(), CancellationToken::new())
            .expect("context");
        assert_eq!(ctx.settings.wg_interface, "wg7");
        assert_eq!(ctx.settings.gateway_ip(), "10.77.0.1");
    }
}
