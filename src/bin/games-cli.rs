use std::path::PathBuf;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;

#[derive(Parser)]
#[command(name = "games-cli")]
#[command(about = "Command-line client for the games API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all games, newest first
    List,
    /// Show a single game
    Get { id: i64 },
    /// Add a game to the catalog
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        genre: String,
        #[arg(long)]
        platform: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Remove a game
    Delete { id: i64 },
    /// Download an image through the relay
    FetchImage {
        image_url: String,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::List => {
            let res = client.get(format!("{}/api/games", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Get { id } => {
            let res = client.get(format!("{}/api/games/{}", base, id)).send().await?;
            print_response(res).await?;
        }
        Commands::Create {
            name,
            genre,
            platform,
            description,
            year,
            image_url,
        } => {
            let body = json!({
                "nombre": name,
                "genero": genre,
                "plataforma": platform,
                "descripcion": description,
                "año_lanzamiento": year,
                "imagen_url": image_url,
            });
            let res = client
                .post(format!("{}/api/games", base))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Delete { id } => {
            let res = client.delete(format!("{}/api/games/{}", base, id)).send().await?;
            print_response(res).await?;
        }
        Commands::FetchImage { image_url, output } => {
            let res = client
                .get(format!("{}/api/proxy-image", base))
                .query(&[("url", image_url.as_str())])
                .send()
                .await?;
            if !res.status().is_success() {
                return print_response(res).await;
            }

            let mut file = tokio::fs::File::create(&output).await?;
            let mut written = 0usize;
            let mut body = res.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                file.write_all(&chunk).await?;
                written += chunk.len();
            }
            file.flush().await?;
            println!("Wrote {} bytes to {}", written, output.display());
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
