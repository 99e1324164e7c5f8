//! speakr main entry point
//!
//! Parses the command line, loads preferences, discovers engines and runs a
//! single action: speak text, change a preference, or manage the cache.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use speakr::speech::EngineKind;
use speakr::state::config::{Config, Paths};
use speakr::state::State;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(
    name = "speakr",
    version,
    about = "Speak text with any installed TTS engine",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Text to speak; `-` reads standard input
    #[arg(trailing_var_arg = true)]
    text: Vec<String>,

    /// Speak the clipboard contents
    #[arg(short, long)]
    clipboard: bool,

    /// Engine for this call only (system, gtts, festival, espeak-ng)
    #[arg(short, long)]
    engine: Option<String>,

    /// Voice for this call only
    #[arg(short, long)]
    voice: Option<String>,

    /// Write debug logs to speakr.log
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available engines
    Engines,
    /// List voices of an engine (default: current engine)
    Voices { engine: Option<String> },
    /// Select and remember an engine
    Use { engine: String },
    /// Select and remember a voice for the current engine
    Voice { id: String },
    /// Speak a test phrase with the current engine
    Test,
    /// Save speech audio to an MP3 file (Google TTS only)
    Save {
        output: PathBuf,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Manage the audio cache
    Cache {
        #[arg(value_enum)]
        action: CacheAction,
    },
    /// Show the preference file and its values
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CacheAction {
    Status,
    Clear,
    Enable,
    Disable,
}

fn init_logging(debug_mode: bool) {
    if debug_mode {
        // Debug mode: write to speakr.log
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("speakr.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open speakr.log for debug logging: {}", e);
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "speakr version {} starting (debug mode, logging to speakr.log)",
            speakr::VERSION
        );
    } else {
        // Warnings by default, RUST_LOG can raise verbosity
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Warn)
            .parse_default_env()
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(cli) {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = Paths::resolve();

    // Preference-only commands don't need engines
    if let Some(Command::Config) = cli.command {
        let config = Config::load_from(&paths.config_file);
        println!("Config file: {}", config.path().display());
        println!("Cache dir:   {}", paths.cache_dir.display());
        println!("{}", serde_json::to_string_pretty(config.preferences())?);
        return Ok(());
    }

    let mut state = State::new(paths).context("failed to initialize speech engines")?;

    match cli.command {
        None => speak(&mut state, &cli.text, cli.clipboard, cli.engine, cli.voice),
        Some(Command::Engines) => {
            let current = state.current_engine().kind;
            for info in state.engines() {
                println!(
                    "{} {:<10} {:<28} quality: {:<6} {}",
                    if info.kind == current { "*" } else { " " },
                    info.kind.name(),
                    info.display_name,
                    info.quality.to_string(),
                    if info.online { "online" } else { "local" }
                );
            }
            Ok(())
        }
        Some(Command::Voices { engine }) => {
            let kind = engine.map(|e| e.parse::<EngineKind>()).transpose()?;
            let voices = state.voices(kind)?;
            if voices.is_empty() {
                println!("(engine does not list voices)");
            }
            for voice in voices {
                println!("{:<12} {}", voice.id, voice.name);
            }
            Ok(())
        }
        Some(Command::Use { engine }) => {
            state.use_engine(&engine)?;
            println!(
                "Engine changed to: {} (voice {})",
                state.current_engine().display_name,
                state.config.voice_id()
            );
            Ok(())
        }
        Some(Command::Voice { id }) => {
            state.set_voice(&id)?;
            println!("Voice set to {}", state.config.voice_id());
            Ok(())
        }
        Some(Command::Test) => Ok(state.test_voice()?),
        Some(Command::Save { output, text }) => {
            state.save_audio(&text.join(" "), &output)?;
            println!("Audio saved: {}", output.display());
            Ok(())
        }
        Some(Command::Cache { action }) => cache(&mut state, action),
        Some(Command::Config) => Ok(()),
    }
}

fn speak(
    state: &mut State,
    words: &[String],
    clipboard: bool,
    engine: Option<String>,
    voice: Option<String>,
) -> anyhow::Result<()> {
    let engine = engine.map(|e| e.parse::<EngineKind>()).transpose()?;

    if clipboard {
        if !state.speak_clipboard(engine, voice.as_deref())? {
            println!("Clipboard is empty");
        }
        return Ok(());
    }

    let read_stdin = (words.len() == 1 && words[0] == "-")
        || (words.is_empty() && !io::stdin().is_terminal());

    let text = if read_stdin {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read standard input")?;
        buf
    } else if words.is_empty() {
        bail!("no text given (pass text, `-` for stdin, or --clipboard)");
    } else {
        words.join(" ")
    };

    if !state.speak_with(&text, engine, voice.as_deref())? {
        println!("Nothing to speak");
    }
    Ok(())
}

fn cache(state: &mut State, action: CacheAction) -> anyhow::Result<()> {
    match action {
        CacheAction::Status => {
            let stats = state.cache_stats()?;
            println!(
                "Cache {} at {}: {} files, {} bytes",
                if state.config.cache_enabled() {
                    "enabled"
                } else {
                    "disabled"
                },
                state.paths().cache_dir.display(),
                stats.files,
                stats.bytes
            );
        }
        CacheAction::Clear => {
            let removed = state.clear_cache()?;
            println!("Cache cleared ({} files)", removed);
        }
        CacheAction::Enable => {
            state.set_cache_enabled(true)?;
            println!("Cache enabled");
        }
        CacheAction::Disable => {
            state.set_cache_enabled(false)?;
            println!("Cache disabled");
        }
    }
    Ok(())
}
