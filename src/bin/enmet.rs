//! enmet: command line access to the metal catalog.
//!
//! Prints entities field by field. Everything goes through the response
//! cache configured in `~/.enmet/config.toml` (or `--config`).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use enmet::config::Config;
use enmet::search::{AlbumQuery, BandQuery};
use enmet::{Album, Artist, Band, ReleaseType};

/// Encyclopaedia Metallum CLI
#[derive(Parser)]
#[command(name = "enmet")]
#[command(version = enmet::PKG_VERSION)]
#[command(about = "Typed access to the Encyclopaedia Metallum catalog")]
struct Args {
    /// Config file (default: ~/.enmet/config.toml)
    #[arg(short, long, env = "ENMET_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a band
    Band {
        /// Band id
        id: String,
        /// Also list the discography
        #[arg(long)]
        discography: bool,
    },

    /// Show an album with its tracklist
    Album {
        /// Album id
        id: String,
    },

    /// Show an artist and their bands
    Artist {
        /// Artist id
        id: String,
    },

    /// Search bands
    SearchBands {
        /// Band name
        name: Option<String>,
        /// Exact name match
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        genre: Option<String>,
        /// ISO country code; repeatable
        #[arg(long = "country")]
        countries: Vec<String>,
        #[arg(long)]
        formed_from: Option<i32>,
        #[arg(long)]
        formed_to: Option<i32>,
    },

    /// Search albums
    SearchAlbums {
        /// Album title
        name: Option<String>,
        /// Exact title match
        #[arg(long)]
        strict: bool,
        /// Band name
        #[arg(long)]
        band: Option<String>,
        #[arg(long)]
        year_from: Option<i32>,
        #[arg(long)]
        year_to: Option<i32>,
        #[arg(long)]
        genre: Option<String>,
        /// Release type, e.g. "Full-length"; repeatable
        #[arg(long = "type")]
        release_types: Vec<ReleaseType>,
    },

    /// Show a random band
    Random,

    /// Show response cache configuration and size
    CacheInfo,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let enmet = config.builder()?.build()?;

    match args.command {
        Command::Band { id, discography } => {
            let band = enmet.band(&id)?;
            print_band(&band)?;
            if discography {
                println!();
                for album in band.discography()? {
                    print_album_line(&album)?;
                }
            }
        }

        Command::Album { id } => print_album(&*enmet.album(&id)?)?,

        Command::Artist { id } => print_artist(&*enmet.artist(&id)?)?,

        Command::SearchBands {
            name,
            strict,
            genre,
            countries,
            formed_from,
            formed_to,
        } => {
            let mut query = BandQuery::new().strict(strict);
            if let Some(name) = name {
                query = query.name(name);
            }
            if let Some(genre) = genre {
                query = query.genre(genre);
            }
            for code in countries {
                query = query.country(code);
            }
            if let Some(year) = formed_from {
                query = query.formed_from(year);
            }
            if let Some(year) = formed_to {
                query = query.formed_to(year);
            }
            let bands = enmet.search_bands(&query)?;
            if bands.is_empty() {
                println!("no bands found");
            }
            for band in bands {
                println!(
                    "{:>8}  {}  ({})",
                    band.id(),
                    band.name()?.unwrap_or_default(),
                    band.country()?.unwrap_or_default()
                );
            }
        }

        Command::SearchAlbums {
            name,
            strict,
            band,
            year_from,
            year_to,
            genre,
            release_types,
        } => {
            let mut query = AlbumQuery::new().strict(strict);
            if let Some(name) = name {
                query = query.name(name);
            }
            if let Some(band) = band {
                query = query.band(band);
            }
            if let Some(year) = year_from {
                query = query.from(year, None);
            }
            if let Some(year) = year_to {
                query = query.to(year, None);
            }
            if let Some(genre) = genre {
                query = query.genre(genre);
            }
            for release_type in release_types {
                query = query.release_type(release_type);
            }
            let albums = enmet.search_albums(&query)?;
            if albums.is_empty() {
                println!("no albums found");
            }
            for album in albums {
                print_album_line(&album)?;
            }
        }

        Command::Random => print_band(&*enmet.random_band()?)?,

        Command::CacheInfo => {
            let cache = enmet.cache_config();
            println!("backend:     {:?}", cache.backend);
            println!("expiration:  {:?}", cache.expiration);
            println!("entries:     {}", enmet.fetcher().response_cache_len()?);
        }
    }

    Ok(())
}

fn print_band(band: &Band) -> enmet::Result<()> {
    println!("band:          {} ({})", band.name()?.unwrap_or_default(), band.id());
    println!("country:       {}", band.country()?.unwrap_or_default());
    println!("location:      {}", band.location()?.unwrap_or_default());
    if let Some(year) = band.formed_in()? {
        println!("formed in:     {year}");
    }
    if let Some(status) = band.status()? {
        println!("status:        {status}");
    }
    println!("genres:        {}", band.genres()?.join(", "));
    println!("themes:        {}", band.lyrical_themes()?.join(", "));
    println!("label:         {}", band.label()?.unwrap_or_default());
    let lineup = band
        .lineup()?
        .iter()
        .map(|member| member.name_in_lineup().map(Option::unwrap_or_default))
        .collect::<enmet::Result<Vec<_>>>()?;
    println!("lineup:        {}", lineup.join(", "));
    Ok(())
}

fn print_album_line(album: &Album) -> enmet::Result<()> {
    println!(
        "{:>8}  {}  {}",
        album.id(),
        album.year()?.map(|y| y.to_string()).unwrap_or_default(),
        album.name()?.unwrap_or_default()
    );
    Ok(())
}

fn print_album(album: &Album) -> enmet::Result<()> {
    let bands = album
        .bands()?
        .iter()
        .map(|band| band.name().map(Option::unwrap_or_default))
        .collect::<enmet::Result<Vec<_>>>()?;
    println!("album:         {} ({})", album.name()?.unwrap_or_default(), album.id());
    println!("by:            {}", bands.join(" / "));
    if let Some(kind) = album.release_type()? {
        println!("type:          {kind}");
    }
    if let Some(date) = album.release_date()? {
        println!("released:      {date}");
    }
    println!("label:         {}", album.label()?.unwrap_or_default());
    if let Some(total) = album.total_time()? {
        println!("total time:    {}", format_duration(total.as_secs()));
    }
    for disc in album.discs()? {
        println!();
        match disc.name()? {
            Some(name) => println!("disc {}: {name}", disc.number()),
            None => println!("disc {}", disc.number()),
        }
        for track in disc.tracks()? {
            let time = track
                .time()
                .map(|t| format_duration(t.as_secs()))
                .unwrap_or_default();
            println!("  {:>2}. {}  {time}", track.number(), track.name());
        }
    }
    Ok(())
}

fn print_artist(artist: &Artist) -> enmet::Result<()> {
    println!("artist:        {} ({})", artist.name()?.unwrap_or_default(), artist.id());
    if let Some(name) = artist.real_full_name()? {
        println!("real name:     {name}");
    }
    if let Some(place) = artist.place_of_birth()? {
        println!("born in:       {place}");
    }
    for membership in artist.active_bands()?.iter().chain(&artist.past_bands()?) {
        println!(
            "  {}  [{}]  {} albums",
            membership.band.name()?.unwrap_or_default(),
            membership.role.as_deref().unwrap_or("-"),
            membership.albums.len()
        );
    }
    Ok(())
}

fn format_duration(secs: u64) -> String {
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
    } else {
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}
