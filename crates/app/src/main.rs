use std::fmt;
use std::sync::Arc;

use rodio::OutputStream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, prelude::*};

use services::{
    ApiError, AudioFeedback, ClipPlayer, GameController, GameFlowError, LetterStep, SessionApi,
    StartParams, Step,
};
use storage::{PreferencesRepository, SqliteStore};
use wordflash_core::VoiceMode;
use wordflash_core::model::{ChildId, Difficulty, GameMode, ThemeId};

mod audio;
mod terminal;

use audio::{RodioChannel, SilentChannel};
use terminal::TerminalView;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidChildId { raw: String },
    InvalidThemeId { raw: String },
    InvalidMode { raw: String },
    InvalidDifficulty { raw: String },
    InvalidVoice { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidChildId { raw } => write!(f, "invalid --child-id value: {raw}"),
            ArgsError::InvalidThemeId { raw } => write!(f, "invalid --theme value: {raw}"),
            ArgsError::InvalidMode { raw } => write!(f, "invalid --mode value: {raw}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value: {raw}")
            }
            ArgsError::InvalidVoice { raw } => write!(f, "invalid --voice value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- play     [--api <url>] [--db <sqlite_url>] --child-id <id>"
    );
    eprintln!(
        "                               [--mode <m>] [--difficulty <d>] [--theme <id>]"
    );
    eprintln!("                               [--audio-root <dir>] [--voice soft|full] [--mute]");
    eprintln!("  cargo run -p app -- themes    [--api <url>]");
    eprintln!("  cargo run -p app -- children  [--api <url>]");
    eprintln!("  cargo run -p app -- add-child --name <name> [--api <url>]");
    eprintln!();
    eprintln!("Modes: word_flash (default), survival, odd_one_out, letter_builder");
    eprintln!("Difficulty: easy, normal (default), hard");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api http://127.0.0.1:8000");
    eprintln!("  --db sqlite://wordflash.sqlite3");
    eprintln!("  --audio-root assets/audio");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  WORDFLASH_API_URL, WORDFLASH_DB_URL, WORDFLASH_LOG");
    eprintln!();
    eprintln!("In game: answer with a number (or the word itself), m toggles sound, q quits.");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Themes,
    Children,
    AddChild,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "themes" => Some(Self::Themes),
            "children" => Some(Self::Children),
            "add-child" => Some(Self::AddChild),
            _ => None,
        }
    }
}

fn parse_mode(raw: &str) -> Option<GameMode> {
    match raw {
        "word_flash" | "flash" => Some(GameMode::WordFlash),
        "survival" => Some(GameMode::Survival),
        "odd_one_out" | "odd" => Some(GameMode::OddOneOut),
        "letter_builder" | "letters" => Some(GameMode::LetterBuilder),
        _ => None,
    }
}

fn parse_difficulty(raw: &str) -> Option<Difficulty> {
    match raw {
        "easy" => Some(Difficulty::Easy),
        "normal" => Some(Difficulty::Normal),
        "hard" => Some(Difficulty::Hard),
        _ => None,
    }
}

struct Args {
    api_url: String,
    db_url: String,
    child_id: ChildId,
    mode: GameMode,
    difficulty: Difficulty,
    theme_id: Option<ThemeId>,
    audio_root: String,
    voice: Option<VoiceMode>,
    mute: bool,
    name: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut api_url = std::env::var("WORDFLASH_API_URL")
            .ok()
            .unwrap_or_else(|| "http://127.0.0.1:8000".into());
        let mut db_url = std::env::var("WORDFLASH_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://wordflash.sqlite3".into(), normalize_sqlite_url);
        let mut child_id = ChildId::new(0);
        let mut mode = GameMode::WordFlash;
        let mut difficulty = Difficulty::Normal;
        let mut theme_id = None;
        let mut audio_root = "assets/audio".to_string();
        let mut voice = None;
        let mut mute = false;
        let mut name = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => {
                    api_url = require_value(args, "--api")?;
                }
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--child-id" => {
                    let value = require_value(args, "--child-id")?;
                    let parsed: i64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidChildId { raw: value.clone() })?;
                    child_id = ChildId::new(parsed);
                }
                "--mode" => {
                    let value = require_value(args, "--mode")?;
                    mode = parse_mode(&value).ok_or(ArgsError::InvalidMode { raw: value })?;
                }
                "--difficulty" => {
                    let value = require_value(args, "--difficulty")?;
                    difficulty = parse_difficulty(&value)
                        .ok_or(ArgsError::InvalidDifficulty { raw: value })?;
                }
                "--theme" => {
                    let value = require_value(args, "--theme")?;
                    let parsed: i64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidThemeId { raw: value.clone() })?;
                    theme_id = Some(ThemeId::new(parsed));
                }
                "--audio-root" => {
                    audio_root = require_value(args, "--audio-root")?;
                }
                "--voice" => {
                    let value = require_value(args, "--voice")?;
                    voice = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidVoice { raw: value })?,
                    );
                }
                "--mute" => {
                    mute = true;
                }
                "--name" => {
                    name = Some(require_value(args, "--name")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            api_url,
            db_url,
            child_id,
            mode,
            difficulty,
            theme_id,
            audio_root,
            voice,
            mute,
            name,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_logging() {
    // Logs go to stderr so they never interleave with the game board.
    let env_filter = EnvFilter::try_from_env("WORDFLASH_LOG")
        .unwrap_or_else(|_| EnvFilter::new("app=info,services=info,storage=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true),
        )
        .init();
}

async fn read_line<R>(lines: &mut Lines<R>) -> Result<String, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    let line = lines.next_line().await?.ok_or("input closed")?;
    Ok(line.trim().to_string())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let api = SessionApi::new(&args.api_url);

    match cmd {
        Command::Themes => {
            for theme in api.list_themes().await? {
                println!("{}\t{}", theme.id, theme.name);
            }
            Ok(())
        }
        Command::Children => {
            for child in api.list_children().await? {
                println!("{}\t{}", child.id, child.name);
            }
            Ok(())
        }
        Command::AddChild => {
            let name = args.name.as_deref().ok_or("add-child requires --name")?;
            let child = api.create_child(name).await?;
            println!("{}\t{}", child.id, child.name);
            Ok(())
        }
        Command::Play => play(args, api).await,
    }
}

async fn play(args: Args, api: SessionApi) -> Result<(), Box<dyn std::error::Error>> {
    // Preferences live in a local SQLite file; the game itself is
    // server-side state.
    prepare_sqlite_file(&args.db_url)?;
    let store = SqliteStore::connect(&args.db_url).await?;
    store.migrate().await?;

    let mut prefs = store.load().await?.unwrap_or_default();
    if let Some(voice) = args.voice {
        prefs.voice_mode = voice;
    }
    if args.mute {
        prefs.sound_on = false;
    }
    let theme_id = match args.theme_id.or(prefs.theme_id) {
        Some(id) => id,
        None => {
            let themes = api.list_themes().await?;
            themes
                .first()
                .map(|theme| theme.id)
                .ok_or("no themes available on the server")?
        }
    };
    prefs.theme_id = Some(theme_id);
    store.save(&prefs).await?;

    // The output stream is not Send, so it stays pinned to this task for
    // the whole session; everything else talks through handles.
    let (_stream, voice_channel, effects_channel): (
        Option<OutputStream>,
        Arc<dyn ClipPlayer>,
        Arc<dyn ClipPlayer>,
    ) = match OutputStream::try_default() {
        Ok((stream, handle)) => (
            Some(stream),
            Arc::new(RodioChannel::new(handle.clone())),
            Arc::new(RodioChannel::new(handle)),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "no audio device, running silent");
            (None, Arc::new(SilentChannel), Arc::new(SilentChannel))
        }
    };

    let audio = AudioFeedback::new(voice_channel, effects_channel, args.audio_root.clone())
        .with_sound_on(prefs.sound_on)
        .with_voice_mode(prefs.voice_mode);

    let mut controller = GameController::new(Arc::new(api), audio, TerminalView::new());

    controller
        .start(StartParams {
            child_id: args.child_id,
            mode: args.mode,
            difficulty: args.difficulty,
            theme_id,
        })
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    'session: loop {
        let step = controller.advance().await?;
        let (options, letters) = match step {
            Step::Finished(_) => break 'session,
            Step::AwaitingAnswer { options, letters } => (options, letters),
        };

        if letters {
            match letter_round(&mut controller, &mut lines).await? {
                AnswerFlow::Next => {}
                AnswerFlow::Ended | AnswerFlow::Quit => break 'session,
            }
            continue;
        }

        let chosen = loop {
            let line = read_line(&mut lines).await?;
            if line.eq_ignore_ascii_case("q") {
                controller.restart().await;
                break 'session;
            }
            if line.eq_ignore_ascii_case("m") {
                let on = !controller.audio().sound_on();
                controller.audio_mut().set_sound_on(on);
                prefs.sound_on = on;
                if let Err(err) = store.save(&prefs).await {
                    tracing::warn!(error = %err, "could not persist sound preference");
                }
                println!("-- sound {}", if on { "on" } else { "off" });
                continue;
            }
            if let Ok(number) = line.parse::<usize>() {
                if number >= 1 && number <= options.len() {
                    break options[number - 1].clone();
                }
            }
            if !line.is_empty() {
                break line;
            }
        };

        match send_answer(&mut controller, &mut lines, &chosen).await? {
            AnswerFlow::Next => {}
            AnswerFlow::Ended | AnswerFlow::Quit => break 'session,
        }
    }

    Ok(())
}

/// What the driver should do after an answer round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnswerFlow {
    /// Move on to the next item.
    Next,
    /// The session closed (the result was already shown).
    Ended,
    /// The player quit mid-session.
    Quit,
}

/// Collect letter presses for one item.
async fn letter_round<R>(
    controller: &mut GameController<TerminalView>,
    lines: &mut Lines<R>,
) -> Result<AnswerFlow, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    // Mirror of the accepted letters, kept so a failed send can be
    // resent after the buffer has locked.
    let mut typed = String::new();

    loop {
        let line = read_line(lines).await?;
        if line.eq_ignore_ascii_case("q") && typed.is_empty() {
            controller.restart().await;
            return Ok(AnswerFlow::Quit);
        }

        for letter in line.chars().filter(|c| !c.is_whitespace()) {
            match controller.press_letter(letter).await {
                Ok(LetterStep::Ignored) => {}
                Ok(LetterStep::Typed) => typed.push(letter),
                Ok(LetterStep::Submitted(outcome)) => {
                    return Ok(if outcome.session.is_some() {
                        AnswerFlow::Ended
                    } else {
                        AnswerFlow::Next
                    });
                }
                Err(GameFlowError::Api(err)) => {
                    // The word was complete; resend it as a plain answer
                    // once the player asks for it.
                    typed.push(letter);
                    return recover_send(controller, lines, &typed, err).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Send one answer. There is no automatic resend: a failure is surfaced
/// and the item stays open until the player decides.
async fn send_answer<R>(
    controller: &mut GameController<TerminalView>,
    lines: &mut Lines<R>,
    chosen: &str,
) -> Result<AnswerFlow, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    match controller.submit_answer(chosen).await {
        Ok(outcome) if outcome.session.is_some() => Ok(AnswerFlow::Ended),
        Ok(_) => Ok(AnswerFlow::Next),
        Err(GameFlowError::Api(err)) => recover_send(controller, lines, chosen, err).await,
        Err(err) => Err(err.into()),
    }
}

/// Surface a failed send and resend only on the player's say-so.
async fn recover_send<R>(
    controller: &mut GameController<TerminalView>,
    lines: &mut Lines<R>,
    chosen: &str,
    mut err: ApiError,
) -> Result<AnswerFlow, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        eprintln!("answer failed to send: {err}");
        println!("-- press Enter to send again, q to quit");
        if read_line(lines).await?.eq_ignore_ascii_case("q") {
            controller.restart().await;
            return Ok(AnswerFlow::Quit);
        }
        match controller.submit_answer(chosen).await {
            Ok(outcome) if outcome.session.is_some() => return Ok(AnswerFlow::Ended),
            Ok(_) => return Ok(AnswerFlow::Next),
            Err(GameFlowError::Api(next)) => err = next,
            Err(other) => return Err(other.into()),
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::testing::{FakeBackend, NullPlayer};
    use services::GamePhase;
    use wordflash_core::model::{Item, ItemId, SessionId, SessionPlan};

    #[test]
    fn normalize_keeps_memory_and_full_urls() {
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/a.sqlite3".into()),
            "sqlite:///tmp/a.sqlite3"
        );
    }

    #[test]
    fn normalize_makes_bare_paths_absolute() {
        let url = normalize_sqlite_url("game.sqlite3".into());
        assert!(url.starts_with("sqlite://"));
        assert!(url.ends_with("game.sqlite3"));
    }

    #[test]
    fn parse_rejects_unknown_mode() {
        let mut args = vec!["--mode".to_string(), "speedrun".to_string()].into_iter();
        assert!(matches!(
            Args::parse(&mut args),
            Err(ArgsError::InvalidMode { .. })
        ));
    }

    #[test]
    fn parse_reads_all_play_flags() {
        let mut args = [
            "--child-id",
            "7",
            "--mode",
            "survival",
            "--difficulty",
            "hard",
            "--theme",
            "3",
            "--voice",
            "full",
            "--mute",
        ]
        .iter()
        .map(ToString::to_string);
        let parsed = Args::parse(&mut args).unwrap();
        assert_eq!(parsed.child_id, ChildId::new(7));
        assert_eq!(parsed.mode, GameMode::Survival);
        assert_eq!(parsed.difficulty, Difficulty::Hard);
        assert_eq!(parsed.theme_id, Some(ThemeId::new(3)));
        assert_eq!(parsed.voice, Some(VoiceMode::Full));
        assert!(parsed.mute);
    }

    fn one_item_plan() -> SessionPlan {
        SessionPlan {
            session_id: SessionId::new(1),
            mode: GameMode::WordFlash,
            difficulty: Difficulty::Normal,
            theme_id: ThemeId::new(1),
            exposure_ms: 900,
            items_total: 1,
            items: vec![Item {
                item_id: ItemId::new("it-0"),
                exposure_ms: 900,
                target: "cat".to_string(),
                options: vec!["cat".to_string(), "dog".to_string()],
                prompt: None,
                correct: None,
            }],
            lives_start: None,
            lives_left: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_send_waits_for_the_player_to_decide() {
        let backend = Arc::new(FakeBackend::new(one_item_plan()).failing_attempts());
        let audio = AudioFeedback::new(Arc::new(NullPlayer), Arc::new(NullPlayer), "audio");
        let mut ctrl = GameController::new(
            backend as Arc<dyn services::SessionBackend>,
            audio,
            TerminalView::new(),
        );
        ctrl.start(StartParams {
            child_id: ChildId::new(7),
            mode: GameMode::WordFlash,
            difficulty: Difficulty::Normal,
            theme_id: ThemeId::new(1),
        })
        .await
        .unwrap();
        ctrl.advance().await.unwrap();

        // Every send fails. One Enter approves a single resend, then q
        // quits; nothing resends on its own after that.
        let mut lines = BufReader::new(&b"\nq\n"[..]).lines();
        let flow = send_answer(&mut ctrl, &mut lines, "cat").await.unwrap();
        assert_eq!(flow, AnswerFlow::Quit);
        assert_eq!(ctrl.phase(), GamePhase::Idle);
    }
}
