mod capture;
mod client;
mod commands;
mod config;
mod device;
mod model;
mod output;
mod supabase;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{api, records};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "geofoto")]
#[command(about = "geofoto CLI - Geotag business photos and browse the collected records")]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "Read API server URL")]
    server: Option<String>,

    #[arg(long, global = true, help = "Output format", default_value = "table")]
    format: output::Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure CLI settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Upload a geotagged photo of a business
    #[command(alias = "snap")]
    Capture(commands::capture::Args),
    /// List all records, newest first
    #[command(alias = "ls")]
    List,
    /// Print the map link for a record
    Map {
        #[arg(help = "Record ID")]
        id: Uuid,
    },
    /// Test the backend connection
    Ping,
    /// Query the read API server
    Api {
        #[command(subcommand)]
        command: api::Commands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration values
    Set {
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        supabase_url: Option<String>,
        #[arg(long)]
        anon_key: Option<String>,
        #[arg(long)]
        bucket: Option<String>,
        #[arg(long)]
        table: Option<String>,
        #[arg(long)]
        gallery_dir: Option<PathBuf>,
    },
    /// Show current configuration
    Show,
    /// Get config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format;

    match cli.command {
        Commands::Config { command } => {
            run_config(command)?;
        }
        Commands::Capture(args) => {
            let cfg = load_config(cli.server)?;
            commands::capture::run(args, &cfg, format).await?;
        }
        Commands::List => {
            records::list(&load_config(cli.server)?, format).await?;
        }
        Commands::Map { id } => {
            records::map(id, &load_config(cli.server)?).await?;
        }
        Commands::Ping => {
            records::ping(&load_config(cli.server)?).await?;
        }
        Commands::Api { command } => {
            api::run(command, &load_config(cli.server)?, format).await?;
        }
    }

    Ok(())
}

fn load_config(server: Option<String>) -> Result<config::Config> {
    let mut cfg = config::Config::load()?;
    if let Some(server) = server {
        cfg.server = server;
    }
    Ok(cfg)
}

fn run_config(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Set {
            server,
            supabase_url,
            anon_key,
            bucket,
            table,
            gallery_dir,
        } => {
            let mut cfg = config::Config::load_file()?;
            if let Some(s) = server {
                cfg.server = s;
            }
            if let Some(u) = supabase_url {
                cfg.supabase_url = Some(u);
            }
            if let Some(k) = anon_key {
                cfg.anon_key = Some(k);
            }
            if let Some(b) = bucket {
                cfg.bucket = b;
            }
            if let Some(t) = table {
                cfg.table = t;
            }
            if let Some(d) = gallery_dir {
                cfg.gallery_dir = Some(d);
            }
            cfg.save()?;
            println!("Configuration saved");
        }
        ConfigCommands::Show => {
            let cfg = config::Config::load()?;
            println!("Server: {}", cfg.server);
            println!(
                "Supabase URL: {}",
                cfg.supabase_url.as_deref().unwrap_or("(not set)")
            );
            println!(
                "Anon Key: {}",
                cfg.anon_key
                    .as_ref()
                    .map(|k| format!("{}...", key_preview(k)))
                    .unwrap_or_else(|| "(not set)".into())
            );
            println!("Bucket: {}", cfg.bucket);
            println!("Table: {}", cfg.table);
            match cfg.gallery_dir() {
                Ok(dir) => println!("Gallery: {}", dir.display()),
                Err(_) => println!("Gallery: (not set)"),
            }
            if let Err(e) = cfg.backend() {
                output::print_warning(&format!("{:#}", e));
            }
        }
        ConfigCommands::Path => {
            println!("{}", config::config_path()?.display());
        }
    }

    Ok(())
}

/// First twelve characters of a secret, for display.
fn key_preview(key: &str) -> String {
    key.chars().take(12).collect()
}
