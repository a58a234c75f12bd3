//! Xinyu CLI - terminal front end for the rail wellness companion
//!
//! Commands:
//! - questions: Print the question bank
//! - assess: Run the stress assessment and print the analysis
//! - chat: Talk to the counselor (single turn or REPL)
//! - scenes / scene: List therapy scenes or render one as SVG
//! - game: Simulate the bubble game
//! - doctor: Diagnose configuration and credentials

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use rail_xinyu::catalog::{questions, scene, scenes, MAX_SCORE};
use rail_xinyu::chat::ChatSession;
use rail_xinyu::config::Config;
use rail_xinyu::game::{BubbleGame, POP_DELAY};
use rail_xinyu::logging::init_logging;
use rail_xinyu::scene_art::render_scene_svg;
use rail_xinyu::tone::LazyToneContext;
use rail_xinyu::{connect, App, AppTab, GatewayError, SceneId, WellnessError, APP_NAME, APP_VERSION};

/// Xinyu - stress self-check and relaxation for railway staff
#[derive(Parser)]
#[command(name = "xinyu")]
#[command(version = APP_VERSION)]
#[command(about = "Stress assessment, counselor chat and relaxation scenes", long_about = None)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the question bank
    Questions,

    /// Run the stress assessment
    Assess {
        /// Comma-separated option indices (0-3), one per question
        #[arg(long, value_delimiter = ',')]
        answers: Option<Vec<usize>>,

        /// Skip the model and use canned analysis
        #[arg(long)]
        offline: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Talk to the counselor
    Chat {
        /// Send one message and exit
        #[arg(short, long)]
        message: Option<String>,

        /// Skip the model and use canned replies
        #[arg(long)]
        offline: bool,
    },

    /// List therapy scenes
    Scenes,

    /// Render a therapy scene
    Scene {
        /// Scene id (forest, ocean, zen)
        id: String,

        /// Write the SVG to this file (use - for stdout)
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Play the ambient track for this many seconds
        #[arg(long)]
        listen: Option<u64>,
    },

    /// Simulate the bubble game
    Game {
        /// Number of bubbles to pop
        #[arg(long, default_value = "20")]
        pops: u32,

        /// Seed for bubble placement
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Diagnose configuration and credentials
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), XinyuCliError> {
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Questions => cmd_questions(),
        Commands::Assess {
            answers,
            offline,
            json,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            cmd_assess(&config, answers, offline, json).await
        }
        Commands::Chat { message, offline } => {
            let config = Config::load(cli.config.as_deref())?;
            cmd_chat(&config, message, offline).await
        }
        Commands::Scenes => cmd_scenes(),
        Commands::Scene { id, svg, listen } => {
            let config = Config::load(cli.config.as_deref())?;
            cmd_scene(&config, &id, svg.as_deref(), listen).await
        }
        Commands::Game { pops, seed } => {
            let config = Config::load(cli.config.as_deref())?;
            cmd_game(&config, pops, seed)
        }
        Commands::Doctor { json } => cmd_doctor(cli.config.as_deref(), json),
    }
}

fn cmd_questions() -> Result<(), XinyuCliError> {
    for q in questions() {
        println!("{}. {}", q.id, q.text);
        for (i, option) in q.options.iter().enumerate() {
            println!("   [{}] {} ({}分)", i, option.text, option.score);
        }
    }
    Ok(())
}

async fn cmd_assess(
    config: &Config,
    answers: Option<Vec<usize>>,
    offline: bool,
    json: bool,
) -> Result<(), XinyuCliError> {
    let answers = match answers {
        Some(answers) => answers,
        None if atty::is(atty::Stream::Stdin) => prompt_answers()?,
        None => return Err(XinyuCliError::MissingAnswers),
    };
    if answers.len() != questions().len() {
        return Err(XinyuCliError::AnswerCount(answers.len()));
    }

    let gateway = connect(&config.gateway, offline)?;
    let mut app = App::new(gateway);
    app.switch_tab(AppTab::Assessment);
    for option in answers {
        app.answer(option)?;
    }
    let outcome = app.finish_assessment().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    println!("压力指数: {} / {}", outcome.score, MAX_SCORE);
    println!("状态:     {}", outcome.level);
    println!("\n{}", outcome.analysis.analysis);
    if !outcome.analysis.guidance.is_empty() {
        println!("\n建议:");
        for tip in &outcome.analysis.guidance {
            println!("  - {}", tip);
        }
    }
    let scene = outcome.recommended_scene();
    println!("\n推荐疗愈: {} {} ({})", scene.icon, scene.title, scene.id);
    if outcome.used_fallback {
        println!("(离线模式)");
    }
    Ok(())
}

fn prompt_answers() -> Result<Vec<usize>, XinyuCliError> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut answers = Vec::with_capacity(questions().len());

    for q in questions() {
        println!("\n{}/{} {}", q.id, questions().len(), q.text);
        for (i, option) in q.options.iter().enumerate() {
            println!("  {}. {}", i + 1, option.text);
        }

        loop {
            print!("> ");
            io::stdout().flush()?;
            let line = lines.next().ok_or(XinyuCliError::MissingAnswers)??;
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=q.options.len()).contains(&n) => {
                    answers.push(n - 1);
                    break;
                }
                _ => println!("请输入 1-{}", q.options.len()),
            }
        }
    }
    Ok(answers)
}

async fn cmd_chat(config: &Config, message: Option<String>, offline: bool) -> Result<(), XinyuCliError> {
    let gateway = connect(&config.gateway, offline)?;
    let mut chat = ChatSession::new();

    if let Some(message) = message {
        let reply = chat
            .send(&message, gateway.as_ref())
            .await
            .ok_or(XinyuCliError::EmptyMessage)?;
        println!("{}", reply.content);
        return Ok(());
    }

    if let Some(greeting) = chat.transcript().first() {
        println!("{}\n", greeting.content);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("你: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }
        if let Some(reply) = chat.send(&line, gateway.as_ref()).await {
            println!("辅导员: {}\n", reply.content);
        }
    }
    Ok(())
}

fn cmd_scenes() -> Result<(), XinyuCliError> {
    for scene in scenes() {
        println!("{} {:<6} {} - {}", scene.icon, scene.id, scene.title, scene.description);
    }
    Ok(())
}

async fn cmd_scene(
    config: &Config,
    id: &str,
    svg: Option<&Path>,
    listen: Option<u64>,
) -> Result<(), XinyuCliError> {
    let scene_id = SceneId::parse(id).ok_or_else(|| WellnessError::UnknownScene(id.to_string()))?;
    let info = scene(scene_id);

    if let Some(path) = svg {
        let document = render_scene_svg(scene_id, &mut StdRng::from_entropy());
        if path.as_os_str() == "-" {
            print!("{}", document);
        } else {
            fs::write(path, document)?;
            tracing::info!(path = %path.display(), scene = %scene_id, "scene rendered");
        }
    } else {
        println!("{} {}", info.icon, info.title);
        println!("{}", info.description);
        println!("audio: {}", info.audio_url);
    }

    if let Some(secs) = listen {
        listen_to_scene(config, scene_id, Duration::from_secs(secs)).await?;
    }
    Ok(())
}

#[cfg(feature = "audio")]
async fn listen_to_scene(config: &Config, scene_id: SceneId, length: Duration) -> Result<(), XinyuCliError> {
    use rail_xinyu::audio::{fetch_audio, RodioAmbientPlayer};
    use rail_xinyu::TherapyRoom;

    if !config.audio.enabled {
        return Err(WellnessError::Audio("audio is disabled in config".to_string()).into());
    }

    let url = scene(scene_id).audio_url;
    let bytes = fetch_audio(&reqwest::Client::new(), url).await?;
    let mut player = RodioAmbientPlayer::new(config.audio.ambient_volume)?;
    player.load(url, bytes);

    let room = TherapyRoom::new(Box::new(player), Some(scene_id.as_str()), || {});
    if !room.audio_playing() {
        return Err(WellnessError::Audio("playback was refused".to_string()).into());
    }
    tokio::time::sleep(length).await;
    drop(room);
    Ok(())
}

#[cfg(not(feature = "audio"))]
async fn listen_to_scene(_config: &Config, _scene_id: SceneId, _length: Duration) -> Result<(), XinyuCliError> {
    Err(WellnessError::Audio("built without the audio feature".to_string()).into())
}

fn cmd_game(config: &Config, pops: u32, seed: Option<u64>) -> Result<(), XinyuCliError> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = BubbleGame::new(rng, tone_context(config));

    let start = Instant::now();
    let step = Duration::from_millis(250);
    for i in 0..pops {
        let now = start + step * i;
        game.tick(now);
        let target = game.bubbles().iter().find(|b| !b.popped).map(|b| b.id);
        if let Some(id) = target {
            game.pop(id, now);
        }
    }
    game.tick(start + step * pops + POP_DELAY);

    println!("已捏破: {}", game.pop_count());
    println!("泡泡数: {}", game.len());
    Ok(())
}

#[cfg(feature = "audio")]
fn tone_context(config: &Config) -> LazyToneContext {
    use rail_xinyu::audio::RodioToneSink;
    use rail_xinyu::tone::ToneSink;

    if !config.audio.enabled {
        return LazyToneContext::silent();
    }
    LazyToneContext::new(|| Ok(Box::new(RodioToneSink::new()?) as Box<dyn ToneSink>))
}

#[cfg(not(feature = "audio"))]
fn tone_context(_config: &Config) -> LazyToneContext {
    LazyToneContext::silent()
}

fn cmd_doctor(config_path: Option<&Path>, json: bool) -> Result<(), XinyuCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} version {}", APP_NAME, APP_VERSION),
    });

    let config = match Config::load(config_path) {
        Ok(config) => {
            let source = config_path
                .map(Path::to_path_buf)
                .or_else(|| Config::default_path().filter(|p| p.exists()));
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: match source {
                    Some(p) => format!("Loaded {}", p.display()),
                    None => "Using built-in defaults".to_string(),
                },
            });
            Some(config)
        }
        Err(e) => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            });
            None
        }
    };

    if let Some(config) = &config {
        checks.push(if config.gateway.has_credential() {
            DoctorCheck {
                name: "credential".to_string(),
                status: CheckStatus::Ok,
                message: format!("API key present (model {})", config.gateway.model),
            }
        } else {
            DoctorCheck {
                name: "credential".to_string(),
                status: CheckStatus::Warning,
                message: "No API key; analysis and chat will use canned text".to_string(),
            }
        });

        checks.push(DoctorCheck {
            name: "audio".to_string(),
            status: if cfg!(feature = "audio") || !config.audio.enabled {
                CheckStatus::Ok
            } else {
                CheckStatus::Warning
            },
            message: match (cfg!(feature = "audio"), config.audio.enabled) {
                (_, false) => "Audio disabled in config".to_string(),
                (true, true) => format!("Audio output enabled (volume {})", config.audio.ambient_volume),
                (false, true) => "Built without the audio feature; playback is silent".to_string(),
            },
        });
    }

    checks.push(if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive assessment available)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (pass --answers for assessments)".to_string(),
        }
    });

    let report = DoctorReport {
        name: APP_NAME.to_string(),
        version: APP_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Xinyu Doctor Report");
        println!("===================");
        println!("Name:    {}", report.name);
        println!("Version: {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(XinyuCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error handling

enum XinyuCliError {
    Io(io::Error),
    App(WellnessError),
    Gateway(GatewayError),
    Json(serde_json::Error),
    MissingAnswers,
    AnswerCount(usize),
    EmptyMessage,
    DoctorFailed,
}

impl From<io::Error> for XinyuCliError {
    fn from(e: io::Error) -> Self {
        XinyuCliError::Io(e)
    }
}

impl From<WellnessError> for XinyuCliError {
    fn from(e: WellnessError) -> Self {
        XinyuCliError::App(e)
    }
}

impl From<GatewayError> for XinyuCliError {
    fn from(e: GatewayError) -> Self {
        XinyuCliError::Gateway(e)
    }
}

impl From<serde_json::Error> for XinyuCliError {
    fn from(e: serde_json::Error) -> Self {
        XinyuCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<XinyuCliError> for CliError {
    fn from(e: XinyuCliError) -> Self {
        match e {
            XinyuCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            XinyuCliError::App(e) => {
                let (code, hint) = match &e {
                    WellnessError::Config(_) => ("CONFIG_ERROR", "Run 'xinyu doctor' to inspect the configuration"),
                    WellnessError::UnknownScene(_) => ("UNKNOWN_SCENE", "Run 'xinyu scenes' for valid ids"),
                    WellnessError::InvalidAnswer(_) => ("INVALID_ANSWER", "Answers are option indices 0-3"),
                    _ => ("APP_ERROR", "Retry with --log-level debug for details"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            XinyuCliError::Gateway(e) => CliError {
                code: "GATEWAY_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the API key or pass --offline".to_string()),
            },
            XinyuCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            XinyuCliError::MissingAnswers => CliError {
                code: "MISSING_ANSWERS".to_string(),
                message: "No answers given and stdin is not interactive".to_string(),
                hint: Some("Pass --answers 0,1,2,... with one index per question".to_string()),
            },
            XinyuCliError::AnswerCount(count) => CliError {
                code: "ANSWER_COUNT".to_string(),
                message: format!("Expected {} answers, got {}", questions().len(), count),
                hint: Some("Run 'xinyu questions' to see the question bank".to_string()),
            },
            XinyuCliError::EmptyMessage => CliError {
                code: "EMPTY_MESSAGE".to_string(),
                message: "Message is empty".to_string(),
                hint: None,
            },
            XinyuCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    name: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
