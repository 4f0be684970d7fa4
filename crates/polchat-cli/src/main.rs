//! polchat CLI: Command-line interface for the policy chat client

use clap::{Parser, Subcommand};
use polchat_engine::{
    Attachment, Config, Controller, Effect, HttpTransport, Message, SessionError, SessionEvent,
    SessionState, DEFAULT_CONFIG_PATH,
};
use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Terminal chat client for asking questions about company policies
#[derive(Parser, Debug)]
#[command(name = "polchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Backend base URL (overrides the config file and environment)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Send one question and print the reply
    Ask {
        /// Category index or label (default: the first category)
        #[arg(long, short)]
        category: Option<String>,

        /// File to attach (repeatable)
        #[arg(long = "attach", short = 'a')]
        attach: Vec<PathBuf>,

        /// Print the whole transcript as JSON
        #[arg(long)]
        json: bool,

        /// Question text
        #[arg(required = true)]
        prompt: Vec<String>,
    },

    /// List configured categories
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    Init,

    /// Check that the backend is reachable
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

type CliResult<T = ()> = Result<T, Box<dyn Error>>;

fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let tui_mode = matches!(cli.command, None | Some(Commands::Tui));
    init_tracing(&cli.config, tui_mode);
    debug!(?cli, "arguments parsed");

    let result = match cli.command {
        None | Some(Commands::Tui) => cmd_tui(&cli.config, cli.base_url),
        Some(Commands::Ask {
            ref category,
            ref attach,
            json,
            ref prompt,
        }) => cmd_ask(
            &cli.config,
            cli.base_url.clone(),
            category.as_deref(),
            attach,
            &prompt.join(" "),
            json,
        ),
        Some(Commands::Categories { json }) => cmd_categories(&cli.config, cli.base_url, json),
        Some(Commands::Config { json }) => cmd_config(&cli.config, cli.base_url, json),
        Some(Commands::Init) => cmd_init(&cli.config),
        Some(Commands::Doctor { json }) => cmd_doctor(&cli.config, cli.base_url, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Log to a file under the config directory in TUI mode, stderr otherwise.
fn init_tracing(config_path: &Path, tui_mode: bool) {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let builder = fmt().with_env_filter(filter).with_target(false);

        if !tui_mode {
            builder.with_writer(std::io::stderr).init();
            return;
        }

        // stderr would draw over the TUI
        let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        let file = std::fs::create_dir_all(dir).and_then(|()| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("polchat.log"))
        });
        match file {
            Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
            Err(_) => builder.with_writer(std::io::sink).init(),
        }
    });
}

fn load_config(path: &Path, base_url: Option<String>) -> CliResult<Config> {
    let config = Config::resolve(path)?.with_env_override(base_url);
    debug!(base_url = %config.base_url, "configuration resolved");
    Ok(config)
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}

fn cmd_tui(config_path: &Path, base_url: Option<String>) -> CliResult {
    let config = load_config(config_path, base_url)?;
    runtime()?.block_on(polchat_tui::run_tui(&config))
}

fn cmd_ask(
    config_path: &Path,
    base_url: Option<String>,
    category: Option<&str>,
    attach: &[PathBuf],
    prompt: &str,
    json: bool,
) -> CliResult {
    let config = load_config(config_path, base_url)?;
    let session = SessionState::new(config.categories.clone(), config.greeting.clone());
    let mut controller = Controller::new(session, HttpTransport::new(&config)?);

    if let Some(key) = category {
        let index = config.categories.resolve(key)?;
        reject_to_err(controller.apply(SessionEvent::SelectCategory(index)))?;
    }

    let files = attach
        .iter()
        .map(|path| Attachment::from_path(path))
        .collect::<Result<Vec<_>, _>>()?;
    reject_to_err(controller.apply(SessionEvent::AttachFiles(files)))?;

    let effect = runtime()?.block_on(controller.submit(prompt));
    let failure = match effect {
        Effect::Rejected(e) => return Err(e.into()),
        Effect::Completed(Some(SessionError::RequestFailed(reason))) => Some(reason),
        _ => None,
    };

    let session = controller.into_session();
    info!(phase = %session.phase(), "ask finished");
    println!("{}", ask_output(session.messages(), json)?);

    match failure {
        Some(reason) => Err(format!("request failed: {reason}").into()),
        None => Ok(()),
    }
}

/// What `ask` prints: the new replies, or the transcript as JSON.
fn ask_output(messages: &[Message], json: bool) -> CliResult<String> {
    if json {
        return Ok(serde_json::to_string_pretty(messages)?);
    }
    let replies: Vec<&str> = latest_replies(messages)
        .iter()
        .map(|m| m.text.as_str())
        .collect();
    Ok(replies.join("\n"))
}

fn reject_to_err(effect: Effect) -> CliResult {
    match effect {
        Effect::Rejected(e) => Err(e.into()),
        _ => Ok(()),
    }
}

/// Assistant messages after the last user message, empty if nothing was asked.
fn latest_replies(messages: &[Message]) -> &[Message] {
    match messages.iter().rposition(|m| !m.is_assistant()) {
        Some(i) => &messages[i + 1..],
        None => &[],
    }
}

fn cmd_categories(config_path: &Path, base_url: Option<String>, json: bool) -> CliResult {
    let config = load_config(config_path, base_url)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config.categories)?);
        return Ok(());
    }

    for (i, label) in config.categories.iter().enumerate() {
        println!("  {i}  {label}");
    }
    Ok(())
}

fn cmd_config(config_path: &Path, base_url: Option<String>, json: bool) -> CliResult {
    let config = load_config(config_path, base_url)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let source = if config_path.exists() {
        config_path.display().to_string()
    } else {
        "(defaults)".to_string()
    };
    println!("Config:      {source}");
    println!("Backend:     {}", config.base_url);
    println!("Submit URL:  {}", config.submit_url());
    println!(
        "Timeout:     {}",
        config
            .request_timeout_seconds
            .map_or_else(|| "none".to_string(), |s| format!("{s}s"))
    );
    println!("Categories:  {}", config.categories.len());
    Ok(())
}

fn cmd_init(config_path: &Path) -> CliResult {
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    Config::default().save(config_path)?;
    println!("Created {}", config_path.display());
    Ok(())
}

fn cmd_doctor(config_path: &Path, base_url: Option<String>, json: bool) -> CliResult {
    let config = load_config(config_path, base_url)?;
    let transport = HttpTransport::new(&config)?;
    let probe = runtime()?.block_on(transport.probe());

    if json {
        let report = serde_json::json!({
            "base_url": config.base_url,
            "submit_url": transport.submit_url(),
            "reachable": probe.is_ok(),
            "status": probe.as_ref().ok(),
            "error": probe.as_ref().err().map(ToString::to_string),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Backend:     {}", config.base_url);
        println!("Submit URL:  {}", transport.submit_url());
        match &probe {
            Ok(status) => println!("Status:      reachable (HTTP {status})"),
            Err(e) => println!("Status:      unreachable ({e})"),
        }
    }

    probe.map(|_| ()).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_tui() {
        let cli = Cli::try_parse_from(["polchat"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_ask_arguments() {
        let cli = Cli::try_parse_from([
            "polchat",
            "ask",
            "--category",
            "2",
            "-a",
            "a.pdf",
            "--attach",
            "b.txt",
            "what",
            "is",
            "PTO",
            "--base-url",
            "http://example",
        ])
        .unwrap();

        assert_eq!(cli.base_url.as_deref(), Some("http://example"));
        match cli.command {
            Some(Commands::Ask {
                category,
                attach,
                json,
                prompt,
            }) => {
                assert_eq!(category.as_deref(), Some("2"));
                assert_eq!(attach, vec![PathBuf::from("a.pdf"), PathBuf::from("b.txt")]);
                assert!(!json);
                assert_eq!(prompt.join(" "), "what is PTO");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_ask_requires_prompt() {
        assert!(Cli::try_parse_from(["polchat", "ask"]).is_err());
    }

    #[test]
    fn test_latest_replies() {
        let messages = vec![
            Message::assistant("hello"),
            Message::user("q", "General"),
            Message::assistant("a1"),
            Message::assistant("a2"),
        ];
        let replies: Vec<&str> = latest_replies(&messages)
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(replies, vec!["a1", "a2"]);
    }

    #[test]
    fn test_latest_replies_without_question_is_empty() {
        let session = SessionState::default();
        assert!(latest_replies(session.messages()).is_empty());
        assert_eq!(ask_output(session.messages(), false).unwrap(), "");
    }

    #[test]
    fn test_ask_output_joins_new_replies() {
        let messages = vec![
            Message::assistant("hello"),
            Message::user("q", "General"),
            Message::assistant("a1"),
        ];
        assert_eq!(ask_output(&messages, false).unwrap(), "a1");
        assert!(ask_output(&messages, true).unwrap().contains("\"hello\""));
    }

    #[test]
    fn test_ask_whitespace_prompt_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let err = cmd_ask(&path, None, None, &[], "   ", false).unwrap_err();
        assert_eq!(err.to_string(), "draft is empty");
    }

    #[test]
    fn test_init_writes_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".polchat").join("config.json");

        cmd_init(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());

        // Second run leaves the file alone
        cmd_init(&path).unwrap();
    }
}
