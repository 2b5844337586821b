//! Entry point for the story narrator.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml` (or `--config`).
//! - Parse the story and glossary, pick a narration source.
//! - Hand everything to the playback runtime.

mod audio;
mod cache;
mod config;
mod narration;
mod runtime;
mod terminal;

use crate::audio::{NarrationAudio, SilentAudio, SpeakerAudio};
use crate::config::{AppConfig, load_config, serialize_config};
use crate::narration::source_from_config;
use crate::runtime::{Player, RuntimeEvent};
use crate::terminal::{TerminalRenderer, render_vocabulary_panel};
use anyhow::{Context, Result, anyhow, bail};
use narration_core::segmenter::VocabularyMarkup;
use narration_core::timing::total_duration_ms;
use narration_core::{Glossary, PlaybackController, SessionOutcome, Story, ThreadScheduler};
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const USAGE: &str = "Usage: story-narrator <story.txt> [--audio <file.mp3>] [--glossary <vocabulary.json>] [--config <config.toml>] [--no-audio] [--print-config]";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    story: Option<PathBuf>,
    audio: Option<PathBuf>,
    glossary: Option<PathBuf>,
    config: Option<PathBuf>,
    no_audio: bool,
    print_config: bool,
}

fn main() {
    let reload_handle = init_tracing();
    match run(&reload_handle) {
        Ok(SessionOutcome::Errored) => std::process::exit(2),
        Ok(_) => {}
        Err(err) => {
            error!("{err:?}");
            std::process::exit(1);
        }
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<SessionOutcome> {
    let args = parse_args(env::args().skip(1))?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("conf/config.toml"));
    let config = load_config(&config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());

    if args.print_config {
        let rendered = serialize_config(&config).context("Serializing effective config")?;
        println!("{rendered}");
        return Ok(SessionOutcome::Ended);
    }

    let story_path = args.story.clone().ok_or_else(|| anyhow!(USAGE))?;
    info!(
        path = %story_path.display(),
        level = %config.log_level,
        avg_word_duration_ms = config.avg_word_duration_ms,
        sentence_gap_ms = config.sentence_gap_ms,
        "Starting story narrator"
    );

    let text = fs::read_to_string(&story_path)
        .with_context(|| format!("Reading story {}", story_path.display()))?;
    let markup = VocabularyMarkup::new(&config.vocabulary_delimiter);
    if markup.is_none() {
        warn!("Empty vocabulary delimiter; vocabulary markup disabled");
    }
    let story = Story::parse(&text, markup.as_ref());
    info!(
        paragraphs = story.paragraphs().len(),
        sentences = story.sentence_count(),
        words = story.word_count(),
        vocabulary = story.vocabulary().len(),
        "Parsed story"
    );

    let glossary = load_glossary(&args, &config)?;
    let panel = render_vocabulary_panel(story.vocabulary(), &glossary);
    let renderer = TerminalRenderer::new(io::stdout(), true).with_header(panel);

    let (tx, rx) = mpsc::channel();
    let audio = build_audio(&args, &config, &story, tx.clone())?;

    let stop_tx = tx.clone();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(RuntimeEvent::StopRequested);
    })
    .context("Installing Ctrl-C handler")?;

    let timer_tx = tx;
    let scheduler = ThreadScheduler::new(move |session, op| {
        let _ = timer_tx.send(RuntimeEvent::Timer(session, op));
    });
    let controller = PlaybackController::new(scheduler, config.timing());
    let mut player = Player::new(controller, rx, &story, &glossary, renderer);
    let outcome = player.play(audio)?;
    if let Some(message) = player.last_error() {
        eprintln!("{message}");
    }
    Ok(outcome)
}

fn load_glossary(args: &CliArgs, config: &AppConfig) -> Result<Glossary> {
    let path = args
        .glossary
        .clone()
        .or_else(|| config.glossary_path.as_ref().map(PathBuf::from));
    let Some(path) = path else {
        return Ok(Glossary::default());
    };
    let json = fs::read_to_string(&path)
        .with_context(|| format!("Reading glossary {}", path.display()))?;
    let glossary = Glossary::from_json_str(&json)
        .with_context(|| format!("Parsing glossary {}", path.display()))?;
    info!(path = %path.display(), entries = glossary.len(), "Loaded glossary");
    Ok(glossary)
}

fn build_audio(
    args: &CliArgs,
    config: &AppConfig,
    story: &Story,
    events: Sender<RuntimeEvent>,
) -> Result<NarrationAudio> {
    if args.no_audio {
        let millis = total_duration_ms(&story.sentence_texts(), &config.timing());
        info!(duration_ms = millis, "Narrating without audio");
        return Ok(NarrationAudio::Silent(SilentAudio::new(
            Duration::from_millis(millis),
            events,
        )));
    }
    let source = source_from_config(config, args.audio.clone())?;
    info!(source = %source.describe(), "Fetching narration audio");
    let bytes = source
        .fetch(story.plain_text())
        .context("Fetching narration audio")?;
    Ok(NarrationAudio::Speaker(SpeakerAudio::new(
        bytes,
        config.volume,
        events,
    )))
}

fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--audio" => parsed.audio = Some(flag_value(&mut args, "--audio")?),
            "--glossary" => parsed.glossary = Some(flag_value(&mut args, "--glossary")?),
            "--config" => parsed.config = Some(flag_value(&mut args, "--config")?),
            "--no-audio" => parsed.no_audio = true,
            "--print-config" => parsed.print_config = true,
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("Unknown option {flag}\n{USAGE}"),
            _ if parsed.story.is_none() => {
                let path = PathBuf::from(&arg);
                if !path.exists() {
                    bail!("File not found: {}", path.display());
                }
                parsed.story = Some(path);
            }
            _ => bail!("Unexpected argument {arg}\n{USAGE}"),
        }
    }
    if parsed.no_audio && parsed.audio.is_some() {
        bail!("--audio and --no-audio cannot be combined");
    }
    Ok(parsed)
}

fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<PathBuf> {
    args.next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("{flag} needs a value\n{USAGE}"))
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
