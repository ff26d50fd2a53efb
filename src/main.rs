use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use design_lens::{DesignService, DesignVault, ViewerConfig};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "design_lens", version, about = "Resolve and serve UI design documents")]
struct Cli {
    /// Design tree root (overrides DESIGN_PATH).
    #[arg(long, global = true)]
    design_path: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API.
    Serve {
        /// Listen port (overrides PORT).
        #[arg(long)]
        port: Option<u16>,
        /// Listen host (overrides HOST).
        #[arg(long)]
        host: Option<String>,
    },
    /// List sites.
    Sites,
    /// Show a site and its viewports.
    Site { site: String },
    /// Print a site's screen-transition graph.
    Transitions {
        site: String,
        #[arg(long)]
        viewport: Option<String>,
    },
    /// Print a resolved screen.
    Screen { site: String, screen: String },
    /// Print a screen's geometry at a viewport.
    Layout {
        site: String,
        screen: String,
        #[arg(long)]
        viewport: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ViewerConfig::from_env()?;
    if let Some(path) = cli.design_path {
        config.design_path = path;
    }

    let service = DesignService::new(DesignVault::new(&config.design_path));
    match cli.cmd {
        Command::Serve { port, host } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            design_lens::server::serve(&config).await
        }
        Command::Sites => print_json(&service.list_sites()?),
        Command::Site { site } => print_json(&service.site_detail(&site)?),
        Command::Transitions { site, viewport } => {
            print_json(&service.transitions(&site, viewport.as_deref())?)
        }
        Command::Screen { site, screen } => print_json(&service.screen_detail(&site, &screen)?),
        Command::Layout {
            site,
            screen,
            viewport,
        } => print_json(&service.screen_layout(&site, &screen, viewport.as_deref())?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).context("writing JSON")?;
    writeln!(out)?;
    Ok(())
}
