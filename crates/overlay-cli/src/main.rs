mod commands;
mod demo;
mod logging;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;

use overlay_core::{CoreConfig, Extent};

use commands::Session;

#[derive(Parser)]
#[command(name = "overlay-cli")]
#[command(about = "Inspect and edit photo overlay panel state")]
struct Cli {
    /// Directory holding the preference files (overrides OVERLAY_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Origin the preferences are scoped to (overrides OVERLAY_ORIGIN)
    #[arg(long, global = true)]
    origin: Option<String>,

    /// Interaction mode to run the command in, e.g. `select` or `draw-line`
    #[arg(long, global = true)]
    mode: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, short, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read and write raw preference entries
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },

    /// Show or toggle layers of the demo layer set
    Layers {
        #[command(subcommand)]
        action: LayersAction,
    },

    /// Change photo filters through the panel
    Filter {
        #[command(subcommand)]
        action: FilterAction,
    },

    /// Run one reconciliation pass and print the patches
    Render {
        /// Map zoom level
        #[arg(long)]
        zoom: Option<f64>,

        /// Visible area as min_lon,min_lat,max_lon,max_lat
        #[arg(long, value_parser = parse_bbox)]
        bbox: Option<Extent>,

        /// Local photo files to load before rendering
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,

        /// Print the materialized sections instead of the patches
        #[arg(long)]
        sections: bool,
    },

    /// Pan the map repeatedly and report the debounced passes
    Moves {
        /// Number of map moves
        #[arg(long, default_value_t = 10)]
        count: usize,

        /// Milliseconds between moves
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
    },
}

#[derive(Subcommand)]
enum PrefsAction {
    /// Print a stored value
    Get { key: String },
    /// Store a value
    Set { key: String, value: String },
    /// Delete a stored value
    Remove { key: String },
    /// Print every stored entry
    List,
}

#[derive(Subcommand)]
enum LayersAction {
    /// List layers with their visibility
    Show,
    /// Flip a layer's visibility and persist it
    Toggle { id: String },
}

#[derive(Subcommand)]
enum FilterAction {
    /// Flip a photo type (flat, panoramic)
    Type { photo_type: String },
    /// Set fromDate or toDate (YYYY-MM-DD, empty to clear)
    Date { member: String, value: String },
    /// Set the username filter (separated by `;` or `,`)
    Usernames { raw: String },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: {e:#}");
    }

    match run(cli) {
        Ok((output, pretty)) => print_json(&output, pretty),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<(Value, bool)> {
    let config = load_config(&cli);
    let mut session = Session::open(&config, cli.mode.as_deref());

    let output = match cli.command {
        Commands::Prefs { action } => match action {
            PrefsAction::Get { key } => session.prefs_get(&key)?,
            PrefsAction::Set { key, value } => session.prefs_set(&key, &value)?,
            PrefsAction::Remove { key } => session.prefs_remove(&key)?,
            PrefsAction::List => session.prefs_list(),
        },
        Commands::Layers { action } => match action {
            LayersAction::Show => session.layers_show(),
            LayersAction::Toggle { id } => session.layers_toggle(&id)?,
        },
        Commands::Filter { action } => {
            session.panel.render();
            let patches = match action {
                FilterAction::Type { photo_type } => session.panel.toggle_photo_type(&photo_type),
                FilterAction::Date { member, value } => session.panel.set_date_filter(&member, &value),
                FilterAction::Usernames { raw } => session.panel.set_username_filter(&raw),
            };
            serde_json::to_value(&patches).context("failed to encode patches")?
        }
        Commands::Render {
            zoom,
            bbox,
            photos,
            sections,
        } => {
            session.set_view(bbox, zoom);
            session.load_local_photos(photos);
            let patches = session.render()?;
            if sections {
                session.sections()?
            } else {
                patches
            }
        }
        Commands::Moves { count, interval_ms } => {
            session.simulate_moves(count, Duration::from_millis(interval_ms))?
        }
    };

    Ok((output, cli.pretty))
}

/// Environment first, then command-line flags on top.
fn load_config(cli: &Cli) -> CoreConfig {
    let mut config = CoreConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring invalid environment configuration");
        CoreConfig::default()
    });
    if let Some(ref dir) = cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(ref origin) = cli.origin {
        config.origin = origin.clone();
    }
    config
}

fn parse_bbox(raw: &str) -> Result<Extent, String> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid coordinate: {e}"))?;
    match parts[..] {
        [min_lon, min_lat, max_lon, max_lat] if min_lon <= max_lon && min_lat <= max_lat => {
            Ok(Extent::new(min_lon, min_lat, max_lon, max_lat))
        }
        [_, _, _, _] => Err("minimum corner must not exceed maximum corner".to_string()),
        _ => Err(format!("expected 4 comma-separated numbers, got {}", parts.len())),
    }
}

fn print_json(value: &Value, pretty: bool) {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match text {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("Error: failed to encode output: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let extent = parse_bbox("10.6, 59.8,10.9,60.0").unwrap();
        assert_eq!(extent, Extent::new(10.6, 59.8, 10.9, 60.0));
        assert!(parse_bbox("1,2,3").is_err());
        assert!(parse_bbox("a,b,c,d").is_err());
        assert!(parse_bbox("5,5,1,1").is_err());
    }

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from([
            "overlay-cli",
            "--data-dir",
            "/tmp/overlay-test",
            "--origin",
            "osm.org",
            "prefs",
            "list",
        ]);
        let config = load_config(&cli);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/overlay-test"));
        assert_eq!(config.origin, "osm.org");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["overlay-cli", "layers", "toggle", "osm", "--mode", "draw-line"]);
        assert_eq!(cli.mode.as_deref(), Some("draw-line"));
        assert!(matches!(
            cli.command,
            Commands::Layers { action: LayersAction::Toggle { ref id } } if id == "osm"
        ));
    }
}
