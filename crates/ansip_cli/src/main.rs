//! ansip
//!
//! Runs the SIP008 server described by a JSON config file.
//!
//! ```text
//! ansip -c /etc/ansip/config.json -l debug
//! ```

mod logging;

use ansip_server::{load_acceptor, ServerConfig, Sip008Server};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Trust-on-first-use SIP008 document server.
#[derive(Parser, Debug)]
#[command(name = "ansip")]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Log level or filter directive (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level)?;
    let config = ServerConfig::from_file(&cli.config)?;
    logging::init(filter, &config.log_target())?;
    info!(?config, "loaded config");

    let tls = match (&config.cert, &config.key) {
        (Some(cert), Some(key)) => Some(load_acceptor(
            cert.clone(),
            key.clone(),
            config.server_name.clone(),
        )?),
        _ => None,
    };

    let listener = TcpListener::bind(&config.listen).await?;
    Sip008Server::new()
        .serve_with_shutdown(listener, tls, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["ansip"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn short_flags() {
        let cli = Cli::try_parse_from(["ansip", "-c", "/etc/ansip.json", "-l", "debug"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/ansip.json"));
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn version_flag() {
        let err = Cli::try_parse_from(["ansip", "-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn bad_log_level_rejected() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("ansip=loud").is_err());
    }
}
