// FILE: crates/cli/src/commands.rs

use crate::catalog;
use anyhow::{anyhow, bail, Context, Result};
use clap::ArgMatches;
use console::style;
use hymnal_config::{Config, ConfigManager};
use hymnal_core::{FileStore, Hymn, HymnalVersion, Playlist, PlaylistLibrary};
use hymnal_network::{
    locate, AudiusResolver, Client, ClientConfig, ResolverConfig, TrackResolver,
};
use hymnal_playback::{ControllerSettings, ProgressSettings};

/// Resolve a hymn and print the stream
pub async fn resolve(config: &Config, matches: &ArgMatches) -> Result<()> {
    let hymn = hymn_from_matches(matches)?;
    let vocal = !matches.get_flag("instrumental");
    let resolver = build_resolver(config)?;

    let stream = resolver
        .resolve(hymn.reference(), vocal)
        .await
        .with_context(|| format!("Failed to resolve {}", hymn.reference()))?;

    println!("{} {}", style("✓").green().bold(), style(&hymn.title).bold());
    println!("  Variant: {}", variant_label(vocal));
    println!("  Track: {} ({})", stream.track_title, stream.track_id);
    println!(
        "  Duration: {}",
        hymnal_core::format_clock(stream.duration_secs)
    );
    println!("  Stream: {}", stream.stream_url);

    Ok(())
}

/// Print the remote collection and position for a hymn
pub fn bucket(matches: &ArgMatches) -> Result<()> {
    let hymn = hymn_from_matches(matches)?;
    let vocal = !matches.get_flag("instrumental");
    let slot = locate(hymn.reference(), vocal);

    println!(
        "{} ({}, {})",
        style(hymn.reference()).bold(),
        hymn.hymnal_version,
        variant_label(vocal)
    );
    println!("  Collection: {}", slot.collection_id);
    println!("  Bucket: {}", slot.bucket);
    println!("  Position: {}", slot.position);

    Ok(())
}

pub fn config_init(manager: &ConfigManager) -> Result<()> {
    if manager.initialize().context("Failed to write config file")? {
        println!(
            "{} Created {}",
            style("✓").green().bold(),
            manager.config_path().display()
        );
    } else {
        println!("Config already exists at {}", manager.config_path().display());
    }
    Ok(())
}

pub fn config_show(manager: &ConfigManager, config: &Config) -> Result<()> {
    println!(
        "{}",
        style(format!("# {}", manager.config_path().display())).dim()
    );
    let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
    println!("{}", rendered);
    Ok(())
}

pub fn config_path(manager: &ConfigManager) -> Result<()> {
    println!("{}", manager.config_path().display());
    Ok(())
}

pub fn config_reset(manager: &ConfigManager) -> Result<()> {
    manager.reset().context("Failed to reset config")?;
    println!(
        "{} Reset {} to defaults",
        style("✓").green().bold(),
        manager.config_path().display()
    );
    Ok(())
}

/// Dispatch `playlist <action>`
pub fn playlist(manager: &ConfigManager, config: &Config, matches: &ArgMatches) -> Result<()> {
    let (mut store, mut library) = open_library(manager, config)?;

    match matches.subcommand() {
        Some(("list", _)) => {
            list_playlists(&library);
            return Ok(());
        }
        Some(("create", sub)) => {
            let name = required(sub, "name")?;
            let description = sub.get_one::<String>("description").cloned();
            library.create_playlist(name, description)?;
            println!("{} Created '{}'", style("✓").green().bold(), name.trim());
        }
        Some(("rename", sub)) => {
            let id = user_playlist(&library, required(sub, "playlist")?)?.id;
            let name = required(sub, "name")?;
            library.rename_playlist(id, name)?;
            println!("{} Renamed to '{}'", style("✓").green().bold(), name.trim());
        }
        Some(("delete", sub)) => {
            let id = user_playlist(&library, required(sub, "playlist")?)?.id;
            let removed = library.delete_playlist(id)?;
            println!("{} Deleted '{}'", style("✓").green().bold(), removed.name);
        }
        Some(("add", sub)) => {
            let id = user_playlist(&library, required(sub, "playlist")?)?.id;
            let hymn = hymn_from_matches(sub)?;
            if library.add_hymn(id, &hymn)? {
                println!("{} Added {}", style("✓").green().bold(), hymn.title);
            } else {
                println!("{} is already in the playlist", hymn.title);
            }
        }
        Some(("remove", sub)) => {
            let playlist = user_playlist(&library, required(sub, "playlist")?)?;
            let index = to_index(position(sub, "position")?, playlist.len())?;
            let (id, entry_id) = (playlist.id, playlist.entries[index].id);
            let removed = library.remove_entry(id, entry_id)?;
            println!("{} Removed {}", style("✓").green().bold(), removed.title);
        }
        Some(("move", sub)) => {
            let playlist = user_playlist(&library, required(sub, "playlist")?)?;
            let len = playlist.len();
            let id = playlist.id;
            let from = to_index(position(sub, "from")?, len)?;
            let to = to_index(position(sub, "to")?, len)?;
            library.move_entry(id, from, to)?;
            println!("{} Moved entry {} → {}", style("✓").green().bold(), from + 1, to + 1);
        }
        _ => bail!("Unknown playlist action"),
    }

    library
        .save(&mut store)
        .context("Failed to save playlists")?;
    Ok(())
}

/// Flip the favorite flag on a hymn
pub fn toggle_favorite(
    manager: &ConfigManager,
    config: &Config,
    matches: &ArgMatches,
) -> Result<()> {
    let hymn = hymn_from_matches(matches)?;
    let (mut store, mut library) = open_library(manager, config)?;

    if library.toggle_favorite(&hymn) {
        println!("{} {} added to favorites", style("★").yellow(), hymn.title);
    } else {
        println!("{} removed from favorites", hymn.title);
    }

    library
        .save(&mut store)
        .context("Failed to save favorites")?;
    Ok(())
}

/// Controller tunables from the `[player]` section
pub fn controller_settings(config: &Config) -> ControllerSettings {
    ControllerSettings {
        load_timeout: config.player.load_timeout(),
        prefer_vocal: config.player.prefer_vocal,
        progress: ProgressSettings {
            interval: config.player.progress_interval(),
            end_reset_delay: config.player.end_reset_delay(),
        },
    }
}

/// Resolver settings from the `[network]` section
pub fn resolver_config(config: &Config) -> ResolverConfig {
    ResolverConfig {
        directory_url: config.network.directory_url.clone(),
        default_host: config.network.default_host.clone(),
        app_name: config.network.app_name.clone(),
    }
}

pub fn build_resolver(config: &Config) -> Result<AudiusResolver<Client>> {
    let client = Client::with_config(
        ClientConfig::default().with_timeout(config.network.request_timeout()),
    )
    .context("Failed to create HTTP client")?;
    Ok(AudiusResolver::new(client, resolver_config(config)))
}

pub fn open_library(
    manager: &ConfigManager,
    config: &Config,
) -> Result<(FileStore, PlaylistLibrary)> {
    let store = FileStore::open(manager.data_dir(config)).context("Failed to open data directory")?;
    let library = PlaylistLibrary::load(&store).context("Failed to load playlists")?;
    Ok((store, library))
}

/// Any playlist by name: user playlists first, then the system ones
pub fn find_playlist(library: &PlaylistLibrary, hymns: &[Hymn], name: &str) -> Result<Playlist> {
    if let Some(playlist) = library.find_by_name(name) {
        return Ok(playlist.clone());
    }
    if name.trim().eq_ignore_ascii_case("favorites") {
        return Ok(library.favorites_playlist(hymns));
    }
    if let Ok(version) = name.parse::<HymnalVersion>() {
        return Ok(PlaylistLibrary::full_hymnal(hymns, version));
    }
    Err(anyhow!("No playlist named '{}'", name))
}

fn user_playlist<'a>(library: &'a PlaylistLibrary, name: &str) -> Result<&'a Playlist> {
    library
        .find_by_name(name)
        .ok_or_else(|| anyhow!("No user playlist named '{}'", name))
}

fn list_playlists(library: &PlaylistLibrary) {
    let playlists = library.user_playlists();
    println!(
        "\n{} Playlists, {} favorites",
        style(playlists.len()).bold().cyan(),
        style(library.favorites().len()).bold().cyan()
    );
    println!("{}", "=".repeat(60));

    for playlist in playlists {
        println!("{} ({} hymns)", style(&playlist.name).bold(), playlist.len());
        if let Some(description) = &playlist.description {
            println!("  {}", style(description).dim());
        }
        for (position, entry) in playlist.entries.iter().enumerate() {
            println!(
                "  {:>3}. {} #{} {}",
                position + 1,
                entry.hymnal_version,
                entry.numeric_id,
                entry.title
            );
        }
    }
}

fn hymn_from_matches(matches: &ArgMatches) -> Result<Hymn> {
    let number = *matches
        .get_one::<u32>("number")
        .ok_or_else(|| anyhow!("Hymn number is required"))?;
    let version = edition(matches)?;
    catalog::hymn(number, version)
}

fn edition(matches: &ArgMatches) -> Result<HymnalVersion> {
    match matches.get_one::<String>("edition") {
        Some(raw) => raw.parse::<HymnalVersion>().map_err(|e| anyhow!(e)),
        None => Ok(HymnalVersion::Standard),
    }
}

fn variant_label(vocal: bool) -> &'static str {
    if vocal {
        "vocal"
    } else {
        "instrumental"
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} is required", name))
}

fn position(matches: &ArgMatches, name: &str) -> Result<usize> {
    matches
        .get_one::<usize>(name)
        .copied()
        .ok_or_else(|| anyhow!("{} is required", name))
}

/// 1-based position → index, bounds-checked
pub fn to_index(position: usize, len: usize) -> Result<usize> {
    if position == 0 || position > len {
        bail!("Position {} is out of range (1..={})", position, len);
    }
    Ok(position - 1)
}
