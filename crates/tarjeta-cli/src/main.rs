//! tarjeta CLI: terminal vocabulary flashcards.
//!
//! ```text
//! tarjeta study [--deck data/deck.json] [--audio embedded|synthesis] [--seed 7] [--no-repeat]
//! tarjeta say "hola" [--language ES]
//! tarjeta bake --deck data/deck.json [--out baked.json] [--overwrite]
//! tarjeta list [--deck data/deck.json]
//! ```

mod study;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use tarjeta_lib::bake::bake_deck;
use tarjeta_lib::deck::{load_deck, save_deck};
use tarjeta_lib::player::{Playback, Player};
use tarjeta_lib::source::{EmbeddedSource, SynthesisSource};
use tarjeta_lib::synth::SynthesisClient;
use tarjeta_lib::tarjeta_core::navigator::DeckNavigator;
use tarjeta_lib::tarjeta_core::types::{
    API_KEY_ENV, DEFAULT_SYNTHESIS_URL, DrawPolicy, LanguageCode, SynthesisConfig,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// tarjeta: vocabulary flashcards with pronunciation
#[derive(Parser)]
#[command(name = "tarjeta", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Study a deck: ←/→ navigate, f flips, s speaks, q quits
    Study {
        /// Deck JSON file
        #[arg(long, default_value = "data/deck.json")]
        deck: PathBuf,
        /// Where pronunciation audio comes from
        #[arg(long, value_enum, default_value_t = AudioChoice::Embedded)]
        audio: AudioChoice,
        /// Seed for reproducible card order
        #[arg(long)]
        seed: Option<u64>,
        /// Never draw the same card twice in a row
        #[arg(long)]
        no_repeat: bool,
        /// Log file while the study view is on screen
        #[arg(long, default_value_os_t = std::env::temp_dir().join("tarjeta.log"))]
        log_file: PathBuf,
        #[command(flatten)]
        synthesis: SynthesisArgs,
    },
    /// Synthesize text and play it
    Say {
        /// Text to speak
        text: String,
        /// EN or ES
        #[arg(long, default_value = "EN")]
        language: LanguageCode,
        #[command(flatten)]
        synthesis: SynthesisArgs,
    },
    /// Fill a deck's missing audio through synthesis
    Bake {
        /// Deck JSON file
        #[arg(long, default_value = "data/deck.json")]
        deck: PathBuf,
        /// Output file (defaults to rewriting the input)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Re-synthesize payloads that are already present
        #[arg(long)]
        overwrite: bool,
        #[command(flatten)]
        synthesis: SynthesisArgs,
    },
    /// Print the cards in a deck
    List {
        #[arg(long, default_value = "data/deck.json")]
        deck: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AudioChoice {
    /// Audio shipped in the deck file
    Embedded,
    /// Remote text-to-speech per request
    Synthesis,
}

#[derive(Args)]
struct SynthesisArgs {
    /// Text-to-speech API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true, default_value = "")]
    api_key: String,
    /// Text-to-speech endpoint
    #[arg(long, default_value = DEFAULT_SYNTHESIS_URL)]
    endpoint: String,
    /// Request timeout in seconds
    #[arg(long, default_value = "15")]
    timeout_secs: u64,
}

impl SynthesisArgs {
    fn client(self) -> SynthesisClient {
        SynthesisClient::new(SynthesisConfig {
            endpoint: self.endpoint,
            api_key: self.api_key,
            timeout: Duration::from_secs(self.timeout_secs),
            ..Default::default()
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_path = log_file(&cli.command);
    let writer = match log_path {
        Some(path) => file_writer(path),
        None => BoxMakeWriter::new(std::io::stderr),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tarjeta_cli=info,tarjeta_lib=info".into()),
        )
        .with_writer(writer)
        .with_ansi(log_path.is_none())
        .init();

    let result = match cli.command {
        Command::Study {
            deck,
            audio,
            seed,
            no_repeat,
            synthesis,
            ..
        } => study_command(&deck, audio, seed, no_repeat, synthesis).await,
        Command::Say {
            text,
            language,
            synthesis,
        } => say_command(&text, language, synthesis).await,
        Command::Bake {
            deck,
            out,
            overwrite,
            synthesis,
        } => bake_command(&deck, out.as_deref(), overwrite, synthesis).await,
        Command::List { deck } => list_command(&deck).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tarjeta: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Where logs go instead of stderr. The study view owns the terminal.
fn log_file(command: &Command) -> Option<&Path> {
    match command {
        Command::Study { log_file, .. } => Some(log_file),
        _ => None,
    }
}

/// Append to `path`; logs are discarded if it can't be opened.
fn file_writer(path: &Path) -> BoxMakeWriter {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(e) => {
            eprintln!("tarjeta: cannot open log file {}: {e}", path.display());
            BoxMakeWriter::new(std::io::sink)
        }
    }
}

async fn study_command(
    deck_path: &Path,
    audio: AudioChoice,
    seed: Option<u64>,
    no_repeat: bool,
    synthesis: SynthesisArgs,
) -> CliResult {
    let deck = load_deck(deck_path).await?;
    let policy = if no_repeat {
        DrawPolicy::AvoidImmediateRepeat
    } else {
        DrawPolicy::Independent
    };
    let navigator = match seed {
        Some(seed) => DeckNavigator::seeded(seed),
        None => DeckNavigator::from_entropy(),
    }
    .with_policy(policy);
    let player = Player::spawn()?;

    match audio {
        AudioChoice::Embedded => study::run(deck, navigator, EmbeddedSource, player).await,
        AudioChoice::Synthesis => {
            let source = SynthesisSource::new(synthesis.client());
            study::run(deck, navigator, source, player).await
        }
    }
}

async fn say_command(text: &str, language: LanguageCode, synthesis: SynthesisArgs) -> CliResult {
    let client = synthesis.client();
    let audio = client.synthesize(text, Some(language)).await?;
    let player = Player::spawn()?;
    player.play(audio).await?;
    player.wait_until_done().await;
    Ok(())
}

async fn bake_command(
    deck_path: &Path,
    out: Option<&Path>,
    overwrite: bool,
    synthesis: SynthesisArgs,
) -> CliResult {
    let deck = load_deck(deck_path).await?;
    let client = synthesis.client();
    let (baked, report) = bake_deck(&client, &deck, overwrite).await?;
    let out = out.unwrap_or(deck_path);
    save_deck(out, &baked).await?;
    println!(
        "baked {} payloads ({} already present) → {}",
        report.synthesized,
        report.skipped,
        out.display()
    );
    Ok(())
}

async fn list_command(deck_path: &Path) -> CliResult {
    let deck = load_deck(deck_path).await?;
    for card in deck.iter() {
        let baked = match (card.english_audio.is_empty(), card.spanish_audio.is_empty()) {
            (false, false) => "audio",
            (true, true) => "no audio",
            _ => "partial audio",
        };
        println!(
            "{:>5}  {:<20} {:<20} {:<14} {}",
            card.id, card.english, card.spanish, baked, card.definition
        );
    }
    println!("{} cards", deck.len());
    Ok(())
}
