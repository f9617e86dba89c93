mod config;
mod controller;
mod field;
mod preview;
mod sync;

use std::fs;
use std::io::{self, BufRead, Read};
use std::sync::mpsc;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::model::{TimeFormat, TimerConfig};
use crate::config::preset::{JsonFileStore, PresetList};
use crate::config::validate::validate_config;
use crate::controller::TimerController;
use crate::field::editor::{EditableField, FieldEditor, FieldEvent, TextField};
use crate::field::section::FieldShape;
use crate::preview::{format_duration, preview_text};
use crate::sync::{
    BROADCAST_CHANNEL, BroadcastTransport, Command, DEFAULT_CHANNEL_NAME, DIRECT_CHANNEL,
    SurfaceState, SyncSender,
};

const STDIN_CHANNEL: &str = "stdin";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliShape {
    Hms,
    Ms,
}

impl From<CliShape> for FieldShape {
    fn from(value: CliShape) -> Self {
        match value {
            CliShape::Hms => FieldShape::Hms,
            CliShape::Ms => FieldShape::Ms,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCommand {
    Start,
    Pause,
    Reset,
}

impl From<CliCommand> for Command {
    fn from(value: CliCommand) -> Self {
        match value {
            CliCommand::Start => Command::Start,
            CliCommand::Pause => Command::Pause,
            CliCommand::Reset => Command::Reset,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "hawktimer",
    version,
    about = "Stage timer control: time fields, presets and display sync"
)]
struct Cli {
    #[arg(long, default_value = "presets.json", global = true)]
    store: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliAction,
}

#[derive(Subcommand, Debug)]
enum CliAction {
    /// Print the canonical form a time field settles on when it loses focus.
    Parse {
        text: String,
        #[arg(long, value_enum, default_value_t = CliShape::Hms)]
        shape: CliShape,
    },
    /// Sanitize a timer config from FILE (or stdin) and print it.
    Validate { file: Option<PathBuf> },
    /// Replay editing events against a time field.
    Edit {
        #[arg(long, value_enum, default_value_t = CliShape::Hms)]
        shape: CliShape,
        #[arg(long, default_value = "")]
        value: String,
        #[arg(long, default_value_t = 0)]
        cursor: usize,
        #[arg(long)]
        selection_end: Option<usize>,
        #[arg(required = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },
    #[command(subcommand)]
    Presets(PresetAction),
    /// Print the sync frame a command would publish.
    Send {
        #[arg(value_enum)]
        command: CliCommand,
        #[command(flatten)]
        source: ConfigSource,
    },
    /// Print what a display surface would show first.
    Preview {
        #[command(flatten)]
        source: ConfigSource,
    },
    /// Open a display surface and print what it shows after the initial reset.
    Open {
        #[command(flatten)]
        source: ConfigSource,
    },
    /// Apply sync frames from stdin, one per line, as a display surface does.
    Receive,
}

#[derive(clap::Args, Debug)]
struct ConfigSource {
    #[arg(long, conflicts_with = "config")]
    preset: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum PresetAction {
    List,
    /// Save a config (defaults when no FILE) under NAME.
    Save {
        name: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    Duplicate { index: usize },
    Delete { index: usize },
    /// Mark whether a preset chains into the next one.
    Link {
        index: usize,
        #[arg(long)]
        off: bool,
    },
    /// Replace every preset with the array in FILE.
    Import { file: PathBuf },
    /// Write presets to FILE, or stdout.
    Export { file: Option<PathBuf> },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        CliAction::Parse { text, shape } => {
            let mut editor = FieldEditor::new(shape.into(), EditableField::new(text));
            editor.handle(&FieldEvent::Blur);
            println!("{}", editor.value());
        }
        CliAction::Validate { file } => {
            let text = read_input(file.as_deref())?;
            let value: Value = serde_json::from_str(&text).map_err(|err| {
                anyhow::anyhow!(
                    "invalid JSON at line {}, column {}: {err}",
                    err.line(),
                    err.column()
                )
            })?;
            let Some(config) = validate_config(&value) else {
                bail!("timer config must be a JSON object");
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        CliAction::Edit {
            shape,
            value,
            cursor,
            selection_end,
            tokens,
        } => {
            let mut field = EditableField::new(value)
                .with_selection(cursor, selection_end.unwrap_or(cursor));
            field.subscribe(|value| debug!(value, "field changed"));
            let mut editor = FieldEditor::new(shape.into(), field);
            for token in &tokens {
                for event in parse_edit_token(token)? {
                    editor.dispatch(&event);
                }
            }
            let (start, end) = editor.field().selection();
            println!("{} {start} {end}", editor.value());
        }
        CliAction::Presets(action) => run_presets(&cli.store, action)?,
        CliAction::Send { command, source } => {
            let mut controller = load_controller(&cli.store, &source, broadcast())?;
            let delivery = match (Command::from(command), &source.preset) {
                (Command::Start, Some(name)) => {
                    let (index, _) = controller.presets().find(name)?;
                    controller.start_preset(index)?
                }
                (command, _) => controller.send(command)?,
            };
            if delivery.direct + delivery.broadcast == 0 {
                debug!("no display surface is listening");
            }
            println!("{}", delivery.frame);
        }
        CliAction::Preview { source } => {
            let controller = load_controller(&cli.store, &source, broadcast())?;
            println!("{}", controller.preview(chrono::Local::now().time()));
        }
        CliAction::Open { source } => {
            let broadcast = broadcast();
            let listener = broadcast.subscribe();
            let mut controller = load_controller(&cli.store, &source, broadcast)?;
            let (direct_tx, direct_rx) = mpsc::channel();
            controller.open_output(direct_tx)?;

            let mut surface = SurfaceState::default();
            surface.drain(DIRECT_CHANNEL, &direct_rx);
            surface.drain(BROADCAST_CHANNEL, &listener);
            print_surface(&surface);
        }
        CliAction::Receive => {
            let mut surface = SurfaceState::listening(&[STDIN_CHANNEL]);
            for line in io::stdin().lock().lines() {
                let frame = line.context("failed to read stdin")?;
                if frame.trim().is_empty() {
                    continue;
                }
                if surface.apply_frame(STDIN_CHANNEL, &frame) {
                    print_surface(&surface);
                }
            }
        }
    }

    Ok(())
}

fn broadcast() -> BroadcastTransport {
    BroadcastTransport::new(DEFAULT_CHANNEL_NAME)
}

fn print_surface(surface: &SurfaceState) {
    if let Some(config) = surface.config() {
        let shown = preview_text(config, chrono::Local::now().time());
        println!("{} {shown}", surface.phase().as_str());
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_presets(store: &Path, action: PresetAction) -> Result<()> {
    let mut list = PresetList::load(JsonFileStore::new(store))
        .with_context(|| format!("failed to load {}", store.display()))?;

    match action {
        PresetAction::List => {
            for (index, preset) in list.presets().iter().enumerate() {
                let duration =
                    format_duration(u64::from(preset.config.duration_sec), TimeFormat::HMmSs);
                let link = if preset.linked_to_next { " ->" } else { "" };
                println!(
                    "{index}\t{}\t{}\t{duration}{link}",
                    preset.name,
                    preset.config.mode.as_str()
                );
            }
        }
        PresetAction::Save { name, config } => {
            let mut controller = TimerController::new(list, SyncSender::new(broadcast()));
            if let Some(path) = config {
                controller.load_config(&load_config_file(&path)?);
            }
            controller.save_preset(&name)?;
            println!("saved preset {}", controller.presets().presets().len() - 1);
        }
        PresetAction::Duplicate { index } => list.duplicate(index)?,
        PresetAction::Delete { index } => {
            let removed = list.delete(index)?;
            println!("deleted {}", removed.name);
        }
        PresetAction::Link { index, off } => list.set_linked_to_next(index, !off)?,
        PresetAction::Import { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let kept = list
                .import_json(&text)
                .with_context(|| format!("failed to import {}", file.display()))?;
            println!("imported {kept} presets");
        }
        PresetAction::Export { file } => {
            let text = list.export_json()?;
            match file {
                Some(path) => fs::write(&path, format!("{text}\n"))
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{text}"),
            }
        }
    }

    Ok(())
}

fn load_controller(
    store: &Path,
    source: &ConfigSource,
    broadcast: BroadcastTransport,
) -> Result<TimerController<JsonFileStore>> {
    let list = PresetList::load(JsonFileStore::new(store))
        .with_context(|| format!("failed to load {}", store.display()))?;
    let mut controller = TimerController::new(list, SyncSender::new(broadcast));

    if let Some(name) = &source.preset {
        let (index, _) = controller.presets().find(name)?;
        controller.apply_preset(index)?;
    } else if let Some(path) = &source.config {
        let config = load_config_file(path)?;
        controller.load_config(&config);
    }
    Ok(controller)
}

fn load_config_file(path: &Path) -> Result<TimerConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    validate_config(&value)
        .with_context(|| format!("{} does not hold a timer config object", path.display()))
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn parse_edit_token(token: &str) -> Result<Vec<FieldEvent>> {
    let key = |ch: char| FieldEvent::Key { ch, modifier: false };
    let event = match token {
        "left" => FieldEvent::ArrowLeft,
        "right" => FieldEvent::ArrowRight,
        "tab" => FieldEvent::Tab,
        "bs" => FieldEvent::Backspace,
        "del" => FieldEvent::Delete,
        "sel" => FieldEvent::Key {
            ch: 'a',
            modifier: true,
        },
        "blur" => FieldEvent::Blur,
        _ => {
            if let Some(text) = token.strip_prefix("paste:") {
                FieldEvent::Paste(text.to_string())
            } else if let Some(at) = token.strip_prefix("click:") {
                FieldEvent::Click {
                    at: parse_position(at, token)?,
                }
            } else if let Some(at) = token.strip_prefix("dbl:") {
                FieldEvent::DoubleClick {
                    at: parse_position(at, token)?,
                }
            } else if !token.is_empty() && token.chars().all(|ch| ch.is_ascii_digit()) {
                return Ok(token.chars().map(key).collect());
            } else {
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => key(ch),
                    _ => bail!("unknown edit token '{token}'"),
                }
            }
        }
    };
    Ok(vec![event])
}

fn parse_position(raw: &str, token: &str) -> Result<usize> {
    raw.parse()
        .with_context(|| format!("invalid position in edit token '{token}'"))
}
