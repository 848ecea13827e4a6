//! Tilawah - Quran recitation checker
//!
//! Command line front end: identify a recited verse, verify a recitation
//! word by word, or replay a recorded recognizer transcript through a
//! practice session.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tilawah::asr::ScriptedSource;
use tilawah::config::Config;
use tilawah::matcher::VerseMatcher;
use tilawah::quran::{chapters, corpus, Corpus};
use tilawah::session::{PolicyKind, SessionRunner, SessionUpdate, StreamingSession};
use tilawah::verifier::{map_words_to_original, Verifier};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Corpus file (overrides the configured path)
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Identify which verses a recognized text most likely is
    Match {
        /// Recognized Arabic text
        text: String,
    },

    /// Check a recitation against one verse
    Verify {
        /// Recited Arabic text
        text: String,

        /// Chapter of the expected verse
        #[arg(long, requires = "verse", conflicts_with = "expected")]
        chapter: Option<u32>,

        /// Verse number within the chapter
        #[arg(long, requires = "chapter")]
        verse: Option<u32>,

        /// Expected verse text, instead of a corpus lookup
        #[arg(long)]
        expected: Option<String>,
    },

    /// Replay a recorded transcript through a practice session
    Session {
        /// Chapter to practice
        #[arg(long)]
        chapter: u32,

        /// Zero-based session index within the chapter
        #[arg(long, default_value_t = 0)]
        session: usize,

        /// sequential, best-match or discovery (defaults to the configured policy)
        #[arg(long)]
        policy: Option<PolicyKind>,

        /// JSON-lines file with one recognition event per line
        #[arg(long)]
        transcript: PathBuf,
    },

    /// List the chapters with metadata
    Chapters,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load().context("Failed to load config")?;
    config.validate()?;

    // Setup logging; RUST_LOG wins over the flags
    let level = if args.verbose {
        "debug".to_string()
    } else {
        config.log_level.to_lowercase()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!("📖 Tilawah v{} starting...", env!("CARGO_PKG_VERSION"));

    match &args.command {
        Command::Match { text } => run_match(&args, &config, text),
        Command::Verify {
            text,
            chapter,
            verse,
            expected,
        } => run_verify(&args, &config, text, *chapter, *verse, expected.as_deref()),
        Command::Session {
            chapter,
            session,
            policy,
            transcript,
        } => {
            let policy = policy.unwrap_or(config.policy);
            run_session(&args, &config, *chapter, *session, policy, transcript).await
        }
        Command::Chapters => run_chapters(&args),
    }
}

fn load_corpus(args: &Args, config: &Config) -> Result<Arc<Corpus>> {
    let path = args
        .corpus
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.corpus_path));
    let corpus = corpus::shared(&path)
        .with_context(|| format!("Failed to load corpus from {}", path.display()))?;
    info!("📚 Corpus ready: {} verses", corpus.len());
    Ok(corpus)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_match(args: &Args, config: &Config, text: &str) -> Result<()> {
    let corpus = load_corpus(args, config)?;
    let matcher = VerseMatcher::new(corpus, config.thresholds);
    let candidates = matcher.match_verse(text);

    if args.json {
        return print_json(&candidates);
    }

    if candidates.is_empty() {
        println!("No matching verse found");
        return Ok(());
    }
    for (rank, candidate) in candidates.iter().enumerate() {
        println!(
            "{}. {} {}  {:.1}%",
            rank + 1,
            chapters::display_name(candidate.verse.chapter),
            candidate.verse.reference(),
            candidate.confidence
        );
        println!("   {}", candidate.verse.text);
    }
    Ok(())
}

fn run_verify(
    args: &Args,
    config: &Config,
    text: &str,
    chapter: Option<u32>,
    verse: Option<u32>,
    expected: Option<&str>,
) -> Result<()> {
    let expected_text = match (expected, chapter, verse) {
        (Some(expected), _, _) => expected.to_string(),
        (None, Some(chapter), Some(verse)) => {
            let corpus = load_corpus(args, config)?;
            let found = corpus
                .get_by_reference(chapter, verse)
                .with_context(|| format!("Verse {}:{} is not in the corpus", chapter, verse))?;
            found.text.clone()
        }
        _ => bail!("Pass either --expected or both --chapter and --verse"),
    };

    let verifier = Verifier::new(config.thresholds, config.word_metric);
    let result = verifier.verify(text, &expected_text);

    if args.json {
        return print_json(&result);
    }

    let verdict = if result.is_correct { "✅" } else { "❌" };
    println!("{} Accuracy: {:.1}%", verdict, result.accuracy);

    let highlighted = map_words_to_original(&expected_text, &result.word_matches);
    let marked: Vec<String> = highlighted
        .iter()
        .map(|w| {
            if w.is_correct {
                w.word.clone()
            } else {
                format!("[{}]", w.word)
            }
        })
        .collect();
    println!("   {}", marked.join(" "));

    for mistake in &result.mistakes {
        println!(
            "   #{} {}: expected '{}', heard '{}'",
            mistake.position + 1,
            mistake.kind,
            mistake.expected,
            mistake.received
        );
    }
    Ok(())
}

async fn run_session(
    args: &Args,
    config: &Config,
    chapter: u32,
    session_index: usize,
    policy: PolicyKind,
    transcript: &Path,
) -> Result<()> {
    let corpus = load_corpus(args, config)?;
    let per_session = config.verses_per_session;

    let window = corpus
        .session_window(chapter, session_index, per_session)
        .to_vec();
    if window.is_empty() && policy != PolicyKind::Discovery {
        bail!(
            "Chapter {} has no session {} ({} session(s) of {} verses)",
            chapter,
            session_index,
            corpus.session_count(chapter, per_session),
            per_session
        );
    }

    let source = ScriptedSource::load(transcript)
        .with_context(|| format!("Failed to read transcript {}", transcript.display()))?;
    let matcher = VerseMatcher::new(Arc::clone(&corpus), config.thresholds);
    let verifier = Verifier::new(config.thresholds, config.word_metric);
    let mut session = StreamingSession::for_policy(policy, window, matcher, verifier);
    info!(
        "▶️ {} session {} of {} ({})",
        chapters::display_name(chapter),
        session_index + 1,
        corpus.session_count(chapter, per_session).max(1),
        policy
    );

    let mut runner = SessionRunner::new(source);
    let json = args.json;
    let report = |update: &SessionUpdate| {
        if json {
            if let Ok(line) = serde_json::to_string(update) {
                println!("{}", line);
            }
        } else {
            print_update(update);
        }
    };

    loop {
        let update = runner.run(&mut session, &report).await?;
        let detected = matches!(update, SessionUpdate::Detected(_));
        if !detected || session.is_complete() || runner.source().remaining() == 0 {
            break;
        }
    }

    let summary = session.summary();
    if json {
        print_json(&summary)?;
    } else {
        println!(
            "Session {}: {}/{} detected, {} correct, average {:.1}%",
            session.id(),
            summary.detected,
            summary.total,
            summary.completed,
            summary.average_accuracy
        );
    }
    Ok(())
}

fn print_update(update: &SessionUpdate) {
    match update {
        SessionUpdate::Detected(detection) => println!(
            "✅ {} detected ({:.1}%)",
            detection.verse.reference(),
            detection.result.accuracy
        ),
        SessionUpdate::Pending { position, accuracy } => {
            println!("… verse {} at {:.1}%", position + 1, accuracy)
        }
        SessionUpdate::Tracking {
            position,
            accuracy,
            stored,
        } => println!(
            "🎯 verse {} at {:.1}%{}",
            position + 1,
            accuracy,
            if *stored { " (saved)" } else { "" }
        ),
        SessionUpdate::Unmatched { best_accuracy } => {
            println!("… no verse yet (best {:.1}%)", best_accuracy)
        }
        SessionUpdate::Candidates {
            candidates,
            is_complete,
        } => {
            let names: Vec<String> = candidates
                .iter()
                .map(|c| format!("{} {:.1}%", c.verse.reference(), c.confidence))
                .collect();
            let marker = if *is_complete { "final" } else { "live" };
            println!("🔍 [{}] {}", marker, names.join(", "));
        }
        SessionUpdate::Complete => println!("🏁 All verses recited"),
        SessionUpdate::Skipped(reason) => debug!("Skipped: {:?}", reason),
    }
}

fn run_chapters(args: &Args) -> Result<()> {
    let all = chapters::all_chapters();
    if args.json {
        return print_json(&all);
    }
    for chapter in all {
        println!(
            "{:>3}. {} ({}) - {}, {} verses, {}",
            chapter.number,
            chapter.english_name,
            chapter.name,
            chapter.english_name_translation,
            chapter.number_of_ayahs,
            chapter.revelation_type
        );
    }
    Ok(())
}
