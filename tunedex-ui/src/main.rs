//! tunedex - song catalog manager
//!
//! Thin presentation layer over the reconciliation store: collects user
//! intent from the command line, forwards it to the store, and renders
//! whatever state comes back. All catalog/cache decisions live in the
//! store, never here.

use std::io::{self, Write};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tunedex_common::config;
use tunedex_common::model::{Song, SongDraft, SongStatus};
use tunedex_ui::cache::SongCache;
use tunedex_ui::remote::CatalogClient;
use tunedex_ui::store::{FetchStatus, Store};

#[derive(Parser)]
#[command(name = "tunedex", version, about = "Song catalog manager")]
struct Cli {
    /// Catalog service base URL (beats TUNEDEX_SERVICE_URL and the config file)
    #[arg(long, global = true)]
    service_url: Option<String>,

    /// Data directory for the local song cache
    #[arg(long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the catalog, from the service or the local cache
    List {
        /// Show only songs whose title contains this term
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one song's details
    Show { id: i64 },
    /// Register a new song (starts Private with zero likes)
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        artist: String,
        #[arg(long)]
        composer: String,
        /// Playing time as hh:mm, e.g. 03:45
        #[arg(long)]
        duration: String,
    },
    /// Add one like to a song
    Like { id: i64 },
    /// Make a song public (asks for confirmation)
    Publish {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Archive a song (make it private; no confirmation needed)
    Archive { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let service_url = config::resolve_service_url(cli.service_url.as_deref());
    let data_dir = config::resolve_data_dir(cli.data_dir.as_deref());
    config::ensure_data_dir(&data_dir)?;

    let client = CatalogClient::new(service_url)?;
    let cache = SongCache::new(&data_dir);
    let store = Store::new(client, cache);

    match cli.command {
        Command::List { search } => {
            let status = store.fetch_all().await;
            if let Some(term) = search {
                store.set_search_term(term).await;
            }
            if status == FetchStatus::Failed {
                println!("(catalog service unreachable - showing local data)\n");
            }
            render_table(&store.filtered_songs().await);
        }

        Command::Show { id } => {
            let song = load_song(&store, id).await?;
            render_detail(&song);
        }

        Command::Add {
            title,
            artist,
            composer,
            duration,
        } => {
            let draft = SongDraft::new(title, artist, composer, duration);
            let song = store.create(draft).await?;
            render_detail(&song);
            if store.status() == FetchStatus::Failed {
                println!("\nSaved locally - the catalog service was unreachable.");
            }
        }

        Command::Like { id } => {
            let song = load_song(&store, id).await?;
            store.add_if_absent(song.clone()).await;
            let likes = store.like(id).await?;
            store.settle().await;
            println!("\"{}\" now has {} like(s).", song.title, likes);
        }

        Command::Publish { id, yes } => {
            let song = load_song(&store, id).await?;
            if song.status == SongStatus::Public {
                println!("\"{}\" is already public.", song.title);
                return Ok(());
            }
            if !yes && !confirm_publish(&song.title)? {
                println!("Cancelled.");
                return Ok(());
            }
            store.add_if_absent(song.clone()).await;
            store.set_status(id, SongStatus::Public).await?;
            store.settle().await;
            println!("\"{}\" is now public.", song.title);
        }

        Command::Archive { id } => {
            let song = load_song(&store, id).await?;
            store.add_if_absent(song.clone()).await;
            store.set_status(id, SongStatus::Private).await?;
            store.settle().await;
            println!("\"{}\" is now archived.", song.title);
        }
    }

    Ok(())
}

/// Populate the store and look the song up across all sources
async fn load_song(store: &Store, id: i64) -> Result<Song> {
    store.fetch_all().await;
    Ok(store.fetch_one(id).await?)
}

/// The publish gate: going public needs an explicit yes. Archiving a song
/// never prompts.
fn confirm_publish(title: &str) -> Result<bool> {
    print!("Publish \"{title}\" for everyone to see? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn render_table(songs: &[Song]) {
    if songs.is_empty() {
        println!("No songs found.");
        return;
    }

    println!(
        "{:<16} {:<28} {:<22} {:>6} {:>6}  {}",
        "ID", "TITLE", "ARTIST", "TIME", "LIKES", "STATUS"
    );
    for song in songs {
        println!(
            "{:<16} {:<28} {:<22} {:>6} {:>6}  {}",
            song.id, song.title, song.artist, song.duration, song.likes, song.status
        );
    }
}

fn render_detail(song: &Song) {
    println!("Title:    {}", song.title);
    println!("Artist:   {}", song.artist);
    println!("Composer: {}", song.composer);
    println!("Time:     {}", song.duration);
    println!("Likes:    {}", song.likes);
    println!("Status:   {}", song.status);
}
