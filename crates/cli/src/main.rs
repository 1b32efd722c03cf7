#![deny(unsafe_code)]
//! CLI binary for the chemotactic aggregation simulation.
//!
//! Subcommands:
//! - `run`: run the configured batches, write one PNG per snapshot plus a manifest
//! - `list`: print available palettes and the parameter schema
//!
//! Parameters are assembled from defaults, then `--config <file>`, then the
//! `--params` JSON object, then the individual flags; later sources win.

mod error;

use aggregation_chemotaxis::Simulation;
use aggregation_core::SimParams;
use aggregation_render::{Palette, PngExporter, RenderStyle};
use clap::{Parser, Subcommand};
use error::CliError;
use log::info;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "aggregation", about = "Chemotactic aggregation simulation")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the simulation and write a PNG snapshot at step 0 and after every batch.
    Run {
        /// JSON file with simulation parameters.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Simulation parameters as a JSON object, applied over --config.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Number of agents.
        #[arg(short = 'n', long)]
        agents: Option<usize>,

        /// Grid width in cells.
        #[arg(short = 'W', long)]
        width: Option<usize>,

        /// Number of batches (one snapshot after each).
        #[arg(short, long)]
        batches: Option<usize>,

        /// Ticks per batch.
        #[arg(long)]
        batch_size: Option<usize>,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Directory for frames and the manifest.
        #[arg(short, long, default_value = "frames")]
        output_dir: PathBuf,

        /// Frame file name prefix.
        #[arg(long, default_value = "aggregation")]
        prefix: String,

        /// Palette name (binary, gray, heat, ocean).
        #[arg(short, long, default_value = "binary")]
        palette: String,

        /// Pixels per grid cell.
        #[arg(long, default_value_t = 4)]
        scale: usize,

        /// Concentration mapped to the top of the palette.
        #[arg(long, default_value_t = 1.0)]
        max_value: f64,
    },
    /// List available palettes and simulation parameters.
    List,
}

/// Flag values that override the JSON parameter sources.
#[derive(Default)]
struct Overrides {
    agents: Option<usize>,
    width: Option<usize>,
    batches: Option<usize>,
    batch_size: Option<usize>,
}

impl Overrides {
    fn apply(&self, params: &mut Map<String, Value>) {
        let pairs = [
            ("agent_count", self.agents),
            ("width", self.width),
            ("batches", self.batches),
            ("batch_size", self.batch_size),
        ];
        for (key, value) in pairs {
            if let Some(v) = value {
                params.insert(key.to_string(), Value::from(v));
            }
        }
    }
}

fn merge_object(
    base: &mut Map<String, Value>,
    overlay: Value,
    source: &str,
) -> Result<(), CliError> {
    match overlay {
        Value::Object(map) => {
            base.extend(map);
            Ok(())
        }
        _ => Err(CliError::Input(format!("{source} must be a JSON object"))),
    }
}

fn build_params(
    config: Option<&Path>,
    inline: &str,
    overrides: &Overrides,
) -> Result<SimParams, CliError> {
    let mut merged = Map::new();
    if let Some(path) = config {
        let text = fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
        let file: Value = serde_json::from_str(&text)
            .map_err(|e| CliError::Input(format!("invalid config {}: {e}", path.display())))?;
        merge_object(&mut merged, file, "config file")?;
    }
    let inline: Value = serde_json::from_str(inline)
        .map_err(|e| CliError::Input(format!("invalid JSON params: {e}")))?;
    merge_object(&mut merged, inline, "--params")?;
    overrides.apply(&mut merged);

    SimParams::from_json(&Value::Object(merged))
        .map_err(|e| CliError::Input(format!("invalid parameters: {e}")))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let palettes = Palette::list_names();
            let schema = SimParams::schema();
            if cli.json {
                let info = serde_json::json!({
                    "palettes": palettes,
                    "params": schema,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Palettes:");
                println!("  {}", palettes.join(", "));
                println!("Parameters:");
                if let Some(entries) = schema.as_object() {
                    for (name, entry) in entries {
                        println!(
                            "  {name} (default {}): {}",
                            entry["default"],
                            entry["description"].as_str().unwrap_or_default()
                        );
                    }
                }
            }
        }
        Command::Run {
            config,
            params,
            agents,
            width,
            batches,
            batch_size,
            seed,
            output_dir,
            prefix,
            palette,
            scale,
            max_value,
        } => {
            let overrides = Overrides {
                agents,
                width,
                batches,
                batch_size,
            };
            let params = build_params(config.as_deref(), &params, &overrides)?;
            let style = RenderStyle {
                palette: Palette::from_name(&palette)?,
                scale,
                max_value,
                ..RenderStyle::default()
            };

            let mut sim = Simulation::new(params, seed)?;
            let mut exporter = PngExporter::new(&output_dir, prefix, style)?;
            info!("writing frames to {}", exporter.dir().display());
            let summary = sim.run(&mut exporter)?;
            let manifest = exporter.write_manifest(&params, seed)?;

            if cli.json {
                let info = serde_json::json!({
                    "summary": summary,
                    "seed": seed,
                    "params": params,
                    "output_dir": output_dir.display().to_string(),
                    "manifest": manifest.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "simulated {} agents on {w}x{w} for {} steps (seed {seed}), {} frames -> {}",
                    summary.agents,
                    summary.steps,
                    summary.snapshots,
                    output_dir.display(),
                    w = params.width,
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({
                "error": e.to_string(),
                "kind": e.kind(),
                "exit_code": e.exit_code(),
            });
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
