//! icon-factory - rewrite, validate and export AI-generated SVG icons.
//!
//! # Usage
//!
//! ```bash
//! icon-factory ingest response.txt > icons.json
//! icon-factory edit icon.svg --color "#ff0000" --size 48 --output red.svg
//! icon-factory export icon.svg --format png --size 128
//! icon-factory generate --prompt "settings gear" --model-cmd ./model.sh
//! icon-factory library save icons.json --name Gears
//! ```

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use icon_factory::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    save_config_flags,
};
use icon_factory::editor::{EditSession, Message};
use icon_factory::export::{
    ExportFormat, ExportSize, combined_svg_text, export_icon, generate_icon_name, icon_file_name,
};
use icon_factory::generate::{
    CommandModel, DEFAULT_MODEL_TIMEOUT, GenerateRequest, IconStyle, generate,
};
use icon_factory::icon::{Icon, IconCollection};
use icon_factory::ingest::ingest;
use icon_factory::library::{CollectionStore, JsonFileStore};
use icon_factory::perf;
use icon_factory::svg::{normalize, validate};

/// Rewrite, validate and export AI-generated SVG icons
#[derive(Parser, Debug)]
#[command(name = "icon-factory", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Collection library file
    #[arg(long, global = true, value_name = "PATH")]
    library: Option<PathBuf>,

    /// Do not add a root fill when recoloring icons that declare none
    #[arg(long, global = true)]
    no_root_fill: bool,

    /// Print timing for each pipeline stage
    #[arg(long, global = true)]
    perf: bool,

    /// Write pipeline debug events to a file
    #[arg(long, global = true, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults
    #[arg(long, global = true)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Turn a raw model response into icons JSON
    Ingest {
        /// Response text; reads stdin when omitted
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Keep at most this many icons
        #[arg(long)]
        count: Option<usize>,
    },
    /// Print a validation report for an SVG file
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Collapse whitespace in an SVG file
    Normalize {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Recolor, resize or restroke an SVG file
    Edit {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        color: Option<String>,

        /// Width, height and viewBox edge length
        #[arg(long)]
        size: Option<f64>,

        #[arg(long)]
        stroke_width: Option<f64>,

        /// Write here instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Export an SVG file as SVG, PNG or JPEG
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long, value_enum)]
        format: Option<ExportFormat>,

        /// Raster edge length: 16, 24, 32, 48, 64, 128 or 256
        #[arg(long, value_parser = parse_export_size)]
        size: Option<ExportSize>,

        /// Defaults to `<file stem>.<format>`
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Generate icons with an external model command
    Generate {
        #[arg(long)]
        prompt: String,

        #[arg(long, value_enum, default_value = "modern")]
        style: IconStyle,

        /// Number of icons, 1 to 8
        #[arg(long)]
        count: Option<usize>,

        /// Program that reads prompts as JSON on stdin and prints the response
        #[arg(long, value_name = "CMD")]
        model_cmd: String,

        /// Seconds before the model command is killed
        #[arg(long, value_name = "SECS", default_value_t = DEFAULT_MODEL_TIMEOUT.as_secs())]
        model_timeout: u64,

        /// Arguments for the model command, after `--`
        #[arg(last = true)]
        model_args: Vec<String>,

        /// Replace icon names with slugs such as `gear-1`
        #[arg(long)]
        slug_names: bool,

        /// Also save the icons as a library collection with this name
        #[arg(long, value_name = "NAME")]
        collection: Option<String>,
    },
    /// Manage saved collections
    Library {
        /// Library file, overriding --library
        #[arg(long, value_name = "PATH")]
        path: Option<PathBuf>,

        #[command(subcommand)]
        action: LibraryAction,
    },
}

#[derive(Subcommand, Debug)]
enum LibraryAction {
    /// Save icons from an ingest or generate JSON file
    Save {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        name: Option<String>,
    },
    /// List collections
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print one collection
    Show {
        id: Uuid,

        /// Print the icons as one annotated SVG document
        #[arg(long)]
        svg: bool,
    },
    /// Delete one collection
    Delete { id: Uuid },
    /// Write every icon of a collection to a directory
    Export {
        id: Uuid,

        #[arg(long, value_name = "DIR")]
        dir: PathBuf,

        #[arg(long, value_enum)]
        format: Option<ExportFormat>,

        #[arg(long, value_parser = parse_export_size)]
        size: Option<ExportSize>,
    },
}

fn parse_export_size(s: &str) -> Result<ExportSize, String> {
    let value: u32 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    ExportSize::try_from(value).map_err(|err| err.to_string())
}

impl Cli {
    /// Flags given on this command line that can be persisted.
    fn config_flags(&self) -> ConfigFlags {
        let mut flags = ConfigFlags {
            library: self.library.clone(),
            no_root_fill: self.no_root_fill,
            perf: self.perf,
            debug_log: self.debug_log.clone(),
            ..ConfigFlags::default()
        };
        match &self.command {
            Command::Edit {
                color,
                size,
                stroke_width,
                ..
            } => {
                flags.color.clone_from(color);
                flags.size = *size;
                flags.stroke_width = *stroke_width;
            }
            Command::Export { format, size, .. }
            | Command::Library {
                action: LibraryAction::Export { format, size, .. },
                ..
            } => {
                flags.export_format = *format;
                flags.export_size = *size;
            }
            _ => {}
        }
        flags
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "icon".to_string(), |stem| stem.to_string_lossy().into_owned())
}

/// Icons from an `ingest`/`generate` output document or a bare icon array.
fn read_icons(path: &Path) -> Result<Vec<Icon>> {
    let text = read_input(Some(path))?;
    let value: Value =
        serde_json::from_str(&text).with_context(|| format!("{} is not JSON", path.display()))?;
    let icons = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map
            .remove("icons")
            .with_context(|| format!("{} has no `icons` array", path.display()))?,
        _ => bail!("{} does not contain icons", path.display()),
    };
    serde_json::from_value(icons).with_context(|| format!("Invalid icons in {}", path.display()))
}

fn run_edit(
    file: &Path,
    output: Option<&Path>,
    effective: &ConfigFlags,
    messages: Vec<Message>,
) -> Result<()> {
    let svg = read_input(Some(file))?;
    let icon = Icon::new(file_stem(file), "", svg, "custom");
    let mut session = EditSession::new(icon, effective.edit_defaults());
    for msg in messages {
        session
            .apply(msg)
            .with_context(|| format!("Failed to edit {}", file.display()))?;
    }
    let icon = session.finish()?;
    match output {
        Some(path) => write_output(path, icon.svg.as_bytes()),
        None => {
            println!("{}", icon.svg);
            Ok(())
        }
    }
}

fn run_library(store_path: PathBuf, action: LibraryAction, effective: &ConfigFlags) -> Result<()> {
    let mut store = JsonFileStore::open(&store_path)
        .with_context(|| format!("Failed to open library {}", store_path.display()))?;
    match action {
        LibraryAction::Save { file, name } => {
            let collection = IconCollection::new(name.as_deref(), read_icons(&file)?)?;
            let id = store.save(collection)?;
            println!("{id}");
        }
        LibraryAction::List { page, limit } => print_json(&store.list(page, limit)?)?,
        LibraryAction::Show { id, svg } => {
            let collection = store
                .get(id)?
                .with_context(|| format!("Collection not found: {id}"))?;
            if svg {
                println!("{}", combined_svg_text(collection.icons()));
            } else {
                print_json(&collection)?;
            }
        }
        LibraryAction::Delete { id } => store.delete(id)?,
        LibraryAction::Export { id, dir, .. } => {
            let collection = store
                .get(id)?
                .with_context(|| format!("Collection not found: {id}"))?;
            let format = effective.export_format.unwrap_or_default();
            let size = effective.export_size.unwrap_or_default();
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            for icon in collection.icons() {
                let bytes = export_icon(&icon.svg, format, size)
                    .with_context(|| format!("Failed to export {}", icon.name))?;
                write_output(&dir.join(icon_file_name(&icon.name, format)), &bytes)?;
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.config_flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let debug_log_path = effective
        .debug_log
        .clone()
        .or_else(perf::debug_log_path_from_env);
    if let Err(err) = perf::set_debug_log_path(debug_log_path.as_deref()) {
        tracing::warn!(
            path = %debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            %err,
            "failed to initialize debug log"
        );
    }

    match cli.command {
        Command::Ingest { file, count } => {
            let mut ingestion = ingest(&read_input(file.as_deref())?)?;
            if let Some(count) = count {
                ingestion.truncate(count);
            }
            print_json(&ingestion)
        }
        Command::Validate { file } => print_json(&validate(&read_input(Some(file.as_path()))?)),
        Command::Normalize { file } => {
            println!("{}", normalize(&read_input(Some(file.as_path()))?));
            Ok(())
        }
        Command::Edit { file, output, .. } => {
            let mut messages = Vec::new();
            if let Some(color) = effective.color.clone() {
                messages.push(Message::SetColor(color));
            }
            if let Some(size) = effective.size {
                messages.push(Message::SetSize(size));
            }
            if let Some(width) = effective.stroke_width {
                messages.push(Message::SetStrokeWidth(width));
            }
            run_edit(&file, output.as_deref(), &effective, messages)
        }
        Command::Export { file, output, .. } => {
            let format = effective.export_format.unwrap_or_default();
            let size = effective.export_size.unwrap_or_default();
            let bytes = export_icon(&read_input(Some(file.as_path()))?, format, size)
                .with_context(|| format!("Failed to export {}", file.display()))?;
            let output =
                output.unwrap_or_else(|| PathBuf::from(icon_file_name(&file_stem(&file), format)));
            write_output(&output, &bytes)
        }
        Command::Generate {
            prompt,
            style,
            count,
            model_cmd,
            model_timeout,
            model_args,
            slug_names,
            collection,
        } => {
            let request = GenerateRequest::new(&prompt, style, count)?;
            let model = CommandModel::new(model_cmd, model_args)
                .with_timeout(Duration::from_secs(model_timeout));
            let mut generated = generate(&model, &request)?;
            if slug_names {
                for (index, icon) in generated.icons.iter_mut().enumerate() {
                    icon.name = generate_icon_name(&icon.name, index);
                }
            }
            if let Some(name) = collection {
                let valid: Vec<Icon> = generated
                    .icons
                    .iter()
                    .filter(|icon| icon.has_valid_svg())
                    .cloned()
                    .collect();
                let mut store = JsonFileStore::open(effective.library_path())?;
                let id = store.save(IconCollection::new(Some(&name), valid)?)?;
                tracing::info!(%id, "saved generated icons");
            }
            print_json(&generated)
        }
        Command::Library { path, action } => {
            let store_path = path.unwrap_or_else(|| effective.library_path());
            run_library(store_path, action, &effective)
        }
    }
}
