mod client;
mod showcase;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::ListingClient;
use estate_common::models::property::{
    CreatePropertyRequest, ListingQuery, PriceInput, Property, UpdatePropertyRequest,
};
use showcase::{Showcase, ROTATE_EVERY};
use std::path::Path;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "estate", version, about = "Estate CLI - browse and manage property listings")]
struct Cli {
    /// Server URL
    #[arg(long, env = "ESTATE_URL", default_value = "http://localhost:5000")]
    server: String,

    /// Bearer token for protected commands (see `estate login`)
    #[arg(long, env = "ESTATE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ESTATE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in and print a bearer token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ESTATE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Search listings, newest first
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show one listing with its poster
    Show {
        /// Listing ID
        id: Uuid,
    },
    /// Cycle through the first few listings until Ctrl-C
    Showcase {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Create a listing
    Post {
        #[arg(long)]
        title: String,
        #[arg(long)]
        price: i64,
        #[arg(long)]
        location: String,
        #[arg(long)]
        description: Option<String>,
        /// Property type, e.g. apartment or house
        #[arg(long = "type")]
        property_type: Option<String>,
        /// Image URL (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,
        /// Local image file to upload first (repeatable)
        #[arg(long = "upload")]
        uploads: Vec<String>,
    },
    /// Upload an image and print its hosted URL
    Upload {
        /// Path to the image file
        path: String,
    },
    /// List your own listings
    Mine,
    /// Change fields of a listing
    Update {
        /// Listing ID
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        price: Option<i64>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "type")]
        property_type: Option<String>,
        /// Replace the image list (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,
    },
    /// Delete one of your listings
    Delete {
        /// Listing ID
        id: Uuid,
    },
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Case-insensitive substring of the location
    #[arg(long)]
    location: Option<String>,
    /// Upper price bound, inclusive
    #[arg(long)]
    max_price: Option<String>,
}

impl From<FilterArgs> for ListingQuery {
    fn from(args: FilterArgs) -> Self {
        ListingQuery {
            location: args.location,
            max_price: args.max_price,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ListingClient::new(&cli.server, cli.token.as_deref());

    match cli.command {
        Commands::Register { email, password } => {
            let user = client.register(&email, &password).await?;
            println!("Registered {} ({})", user.email, user.id);
        }
        Commands::Login { email, password } => {
            let login = client.login(&email, &password).await?;
            tracing::info!("Logged in as {}", login.user.email);
            println!("{}", login.token);
        }
        Commands::List { filter } => {
            let listings = client.list(&filter.into()).await?;
            print_table(&listings);
        }
        Commands::Show { id } => {
            cmd_show(&client, id).await?;
        }
        Commands::Showcase { filter } => {
            cmd_showcase(&client, filter.into()).await?;
        }
        Commands::Post {
            title,
            price,
            location,
            description,
            property_type,
            mut images,
            uploads,
        } => {
            for path in &uploads {
                images.push(upload_file(&client, path).await?);
            }
            let req = CreatePropertyRequest {
                title: Some(title),
                description,
                price: Some(PriceInput::from(price)),
                location: Some(location),
                images: Some(images.into()),
                property_type,
            };
            let property = client.create(&req).await?;
            println!("Listing created: {}", property.id);
        }
        Commands::Upload { path } => {
            let url = upload_file(&client, &path).await?;
            println!("{}", url);
        }
        Commands::Mine => {
            let listings = client.mine().await?;
            print_table(&listings);
        }
        Commands::Update {
            id,
            title,
            price,
            location,
            description,
            property_type,
            images,
        } => {
            let req = UpdatePropertyRequest {
                title,
                description,
                price: price.map(PriceInput::from),
                location,
                images: (!images.is_empty()).then(|| images.into()),
                property_type,
            };
            let property = client.update(id, &req).await?;
            println!("Listing updated: {}", property.id);
        }
        Commands::Delete { id } => {
            let message = client.delete(id).await?;
            println!("{}", message);
        }
    }

    Ok(())
}

async fn cmd_show(client: &ListingClient, id: Uuid) -> Result<()> {
    let detail = client.get(id).await?;

    println!("Title:    {}", detail.title);
    println!("Price:    {}", detail.price);
    println!("Location: {}", detail.location);
    if let Some(kind) = &detail.property_type {
        println!("Type:     {}", kind);
    }
    match &detail.posted_by {
        Some(poster) => println!("Posted by: {}", poster.email),
        None => println!("Posted by: -"),
    }
    println!("Created:  {}", detail.created_at.format("%Y-%m-%d %H:%M"));

    if let Some(description) = &detail.description {
        println!("\n{}", description);
    }
    if !detail.images.is_empty() {
        println!("\nImages:");
        for url in &detail.images {
            println!("  {}", url);
        }
    }
    Ok(())
}

async fn cmd_showcase(client: &ListingClient, query: ListingQuery) -> Result<()> {
    let listings = client.list(&query).await?;
    let mut showcase = Showcase::new(listings);
    if showcase.is_empty() {
        println!("No listings found.");
        return Ok(());
    }

    showcase::run(
        &mut showcase,
        ROTATE_EVERY,
        |property, position, total| {
            println!("\n[{}/{}] {}", position + 1, total, property.title);
            println!("  {} - {}", property.location, property.price);
            if let Some(image) = property.images.first() {
                println!("  {}", image);
            }
        },
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
            }
        },
    )
    .await;
    Ok(())
}

async fn upload_file(client: &ListingClient, path: &str) -> Result<String> {
    let path = Path::new(path);
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image");
    client
        .upload_image(file_name, content_type_for(path), bytes)
        .await
}

/// Guess an image MIME type from the file extension
fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn print_table(listings: &[Property]) {
    if listings.is_empty() {
        println!("No listings found.");
        return;
    }

    println!(
        "{:36} {:28} {:20} {:>12} CREATED",
        "ID", "TITLE", "LOCATION", "PRICE"
    );
    println!("{}", "-".repeat(115));

    for p in listings {
        println!(
            "{:36} {:28} {:20} {:>12} {}",
            p.id,
            truncate(&p.title, 28),
            truncate(&p.location, 20),
            p.price,
            p.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}
