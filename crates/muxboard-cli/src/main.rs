//! Muxboard CLI - upload, list and delete videos through the Muxboard API.
//!
//! Set MUXBOARD_API_URL (or API_URL); defaults to http://localhost:3000.

use anyhow::Context;
use clap::{Parser, Subcommand};
use muxboard_api_client::ApiClient;
use muxboard_cli::{asset_row, default_title, init_tracing, progress_percent};
use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Parser)]
#[command(name = "muxboard", about = "Muxboard video CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a video file
    Upload {
        /// Path to the video file
        file: std::path::PathBuf,
        /// Asset title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,
        /// Asset description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List recent assets
    List {
        /// Maximum number of assets (server default when omitted)
        #[arg(long)]
        limit: Option<u32>,
        /// Print the raw JSON response instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete an asset by ID
    Delete {
        /// Asset ID
        id: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let client = ApiClient::from_env().context("Failed to create API client")?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            file,
            title,
            description,
        } => {
            if !file.is_file() {
                anyhow::bail!("Not a file: {}", file.display());
            }
            let title = title.unwrap_or_else(|| default_title(&file));

            let ticket = client.create_upload(&title, &description).await?;
            tracing::debug!(upload_id = %ticket.id, "Upload URL created");

            let last_reported = AtomicU8::new(u8::MAX);
            client
                .upload_file(&ticket.url, &file, move |sent, total| {
                    let percent = progress_percent(sent, total);
                    if last_reported.swap(percent, Ordering::Relaxed) != percent {
                        eprint!("\rUploading... {}%", percent);
                        let _ = std::io::stderr().flush();
                    }
                })
                .await?;
            eprintln!();

            print_json(&serde_json::json!({
                "upload_id": ticket.id,
                "title": title,
                "message": "Upload complete. The video will appear once processing finishes."
            }))?;
        }
        Commands::List { limit, json } => {
            let assets = client.list_assets(limit).await?;
            if json {
                print_json(&assets)?;
            } else {
                println!("ID\tSTATUS\tDURATION\tTITLE");
                for asset in &assets {
                    println!("{}", asset_row(asset));
                }
            }
        }
        Commands::Delete { id } => {
            let response = client.delete_asset(&id).await?;
            print_json(&response)?;
        }
    }

    Ok(())
}
