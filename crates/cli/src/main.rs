// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use hymnal_config::ConfigManager;
use std::path::PathBuf;

mod catalog;
mod commands;
mod session;

fn edition_arg() -> Arg {
    Arg::new("edition")
        .short('e')
        .long("edition")
        .value_name("EDITION")
        .help("Hymnal edition")
        .value_parser(["standard", "revised"])
        .default_value("standard")
}

fn number_arg() -> Arg {
    Arg::new("number")
        .required(true)
        .value_name("NUMBER")
        .help("Hymn number as printed in the hymnal")
        .value_parser(clap::value_parser!(u32))
}

fn instrumental_arg() -> Arg {
    Arg::new("instrumental")
        .short('i')
        .long("instrumental")
        .help("Use the instrumental recording")
        .action(ArgAction::SetTrue)
}

fn playlist_arg() -> Arg {
    Arg::new("playlist")
        .required(true)
        .value_name("PLAYLIST")
        .help("Playlist name")
}

fn build_cli() -> Command {
    Command::new("hymnal")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Hymnal playback core: track resolution, playlists and headless sessions")
        .arg(
            Arg::new("config-dir")
                .short('c')
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .global(true),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve a hymn to a stream URL")
                .arg(number_arg())
                .arg(edition_arg())
                .arg(instrumental_arg()),
        )
        .subcommand(
            Command::new("bucket")
                .about("Show which remote collection holds a hymn")
                .arg(number_arg())
                .arg(edition_arg())
                .arg(instrumental_arg()),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Write a default config file if none exists"))
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("path").about("Print the config file location"))
                .subcommand(Command::new("reset").about("Overwrite the config file with defaults")),
        )
        .subcommand(
            Command::new("playlist")
                .about("Manage user playlists")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List playlists"))
                .subcommand(
                    Command::new("create")
                        .about("Create a playlist")
                        .arg(Arg::new("name").required(true).value_name("NAME"))
                        .arg(
                            Arg::new("description")
                                .short('d')
                                .long("description")
                                .value_name("TEXT")
                                .help("Optional description"),
                        ),
                )
                .subcommand(
                    Command::new("rename")
                        .about("Rename a playlist")
                        .arg(playlist_arg())
                        .arg(Arg::new("name").required(true).value_name("NEW_NAME")),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a playlist")
                        .arg(playlist_arg()),
                )
                .subcommand(
                    Command::new("add")
                        .about("Append a hymn to a playlist")
                        .arg(playlist_arg())
                        .arg(number_arg())
                        .arg(edition_arg()),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Remove the entry at a position")
                        .arg(playlist_arg())
                        .arg(
                            Arg::new("position")
                                .required(true)
                                .value_name("POSITION")
                                .help("1-based position in the playlist")
                                .value_parser(clap::value_parser!(usize)),
                        ),
                )
                .subcommand(
                    Command::new("move")
                        .about("Move an entry to another position")
                        .arg(playlist_arg())
                        .arg(
                            Arg::new("from")
                                .required(true)
                                .value_name("FROM")
                                .value_parser(clap::value_parser!(usize)),
                        )
                        .arg(
                            Arg::new("to")
                                .required(true)
                                .value_name("TO")
                                .value_parser(clap::value_parser!(usize)),
                        ),
                ),
        )
        .subcommand(
            Command::new("favorite")
                .about("Mark a hymn as favorite or remove it from favorites")
                .arg(number_arg())
                .arg(edition_arg()),
        )
        .subcommand(
            Command::new("session")
                .about("Play a playlist through the headless player")
                .arg(
                    Arg::new("playlist")
                        .required(true)
                        .value_name("PLAYLIST")
                        .help("User playlist name, 'favorites', 'standard' or 'revised'"),
                )
                .arg(
                    Arg::new("start")
                        .short('s')
                        .long("start")
                        .value_name("N")
                        .help("1-based entry to start from")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("shuffle")
                        .long("shuffle")
                        .help("Shuffle the queue")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("repeat")
                        .short('r')
                        .long("repeat")
                        .value_name("MODE")
                        .value_parser(["off", "one", "all"]),
                )
                .arg(instrumental_arg())
                .arg(
                    Arg::new("seconds")
                        .long("seconds")
                        .value_name("S")
                        .help("Simulated playback time")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("600"),
                )
                .arg(
                    Arg::new("speed")
                        .long("speed")
                        .value_name("FACTOR")
                        .help("Simulated seconds per real second")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("30"),
                ),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let manager = match matches.get_one::<String>("config-dir") {
        Some(dir) => ConfigManager::with_directory(PathBuf::from(dir)),
        None => ConfigManager::new(),
    }
    .context("Failed to locate config directory")?;
    let config = manager
        .load_with_env_overrides()
        .context("Failed to load configuration")?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.as_filter().to_string()),
    )
    .init();
    log::debug!("Using config at {}", manager.config_path().display());

    match matches.subcommand() {
        Some(("resolve", sub_matches)) => commands::resolve(&config, sub_matches).await,
        Some(("bucket", sub_matches)) => commands::bucket(sub_matches),
        Some(("config", sub_matches)) => match sub_matches.subcommand() {
            Some(("init", _)) => commands::config_init(&manager),
            Some(("show", _)) => commands::config_show(&manager, &config),
            Some(("path", _)) => commands::config_path(&manager),
            Some(("reset", _)) => commands::config_reset(&manager),
            _ => Ok(()),
        },
        Some(("playlist", sub_matches)) => {
            commands::playlist(&manager, &config, sub_matches)
        }
        Some(("favorite", sub_matches)) => {
            commands::toggle_favorite(&manager, &config, sub_matches)
        }
        Some(("session", sub_matches)) => {
            session::run(&manager, &config, sub_matches).await
        }
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_session_defaults() {
        let matches = build_cli()
            .try_get_matches_from(["hymnal", "session", "favorites"])
            .unwrap();
        let (_, session) = matches.subcommand().unwrap();
        assert_eq!(session.get_one::<usize>("start"), Some(&1));
        assert_eq!(session.get_one::<u64>("seconds"), Some(&600));
        assert!(!session.get_flag("shuffle"));
        assert!(session.get_one::<String>("repeat").is_none());
    }

    #[test]
    fn test_repeat_mode_is_checked() {
        let result =
            build_cli().try_get_matches_from(["hymnal", "session", "x", "--repeat", "twice"]);
        assert!(result.is_err());
    }
}
