//! socratic - Socratic tutoring in the terminal

mod config;
mod logging;
mod ui;

use clap::Parser;
use socratic_ai::GeminiClient;
use socratic_core::{Controller, FAILURE_MESSAGE, TurnOutcome, TutorConfig};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// socratic - explain what you think, get evaluated, get asked a better question
#[derive(Parser, Debug)]
#[command(name = "socratic")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model to use (default: gemini-3-flash-preview)
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature (default: 0.7)
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Ask a single question and print the reply (needs --perspective)
    #[arg(long, requires = "perspective")]
    topic: Option<String>,

    /// Your current understanding, for --topic
    #[arg(long, requires = "topic")]
    perspective: Option<String>,

    /// Directory for socratic_logs.json; in one-shot mode, export after replying
    #[arg(short, long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// Use plain stdin/stdout prompts instead of the full-screen UI
    #[arg(long)]
    no_tui: bool,

    /// Verbose output (logs to stderr, or to socratic.log in TUI mode)
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let one_shot = args.topic.is_some();
    let use_tui = !one_shot && !args.no_tui;

    if args.verbose {
        let target = if use_tui {
            logging::LogTarget::File(config::Config::config_dir().join(logging::LOG_FILE))
        } else {
            logging::LogTarget::Stderr
        };
        logging::init(target)?;
    }

    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();

    // CLI takes precedence over the config file
    let tutor_config = TutorConfig {
        model: args.model.clone().unwrap_or_else(|| cfg.model()),
        temperature: match args.temperature {
            Some(t) if (0.0..=2.0).contains(&t) => t,
            Some(t) => anyhow::bail!("temperature {t} is outside 0.0..=2.0"),
            None => cfg.temperature(),
        },
    };
    let export_dir = args.export.clone().unwrap_or_else(|| cfg.export_dir());

    let mut client = GeminiClient::new(cfg.api_key());
    if let Some(base_url) = cfg.base_url.as_deref() {
        client = client.with_base_url(base_url);
    }
    if !client.has_api_key() {
        tracing::warn!("no API key configured; requests will fail");
        if !use_tui {
            eprintln!("Warning: No API key found. Set GEMINI_API_KEY or add api_key to the config (socratic --init-config).");
        }
    }
    tracing::info!(model = %tutor_config.model, temperature = tutor_config.temperature, "starting");

    let controller = Controller::new(tutor_config, Arc::new(client));

    if let (Some(topic), Some(perspective)) = (args.topic.as_deref(), args.perspective.as_deref()) {
        return run_once(&controller, topic, perspective, args.export.as_deref()).await;
    }

    if use_tui {
        if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
            eprintln!("Error: the full-screen UI needs a terminal. Use --no-tui or --topic/--perspective.");
            std::process::exit(1);
        }
        return ui::run_tui(controller, export_dir).await;
    }

    run_interactive(&controller, &export_dir).await
}

/// Ask one question, print the reply, optionally export the log
async fn run_once(
    controller: &Controller,
    topic: &str,
    perspective: &str,
    export: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let outcome = match controller.submit(topic, perspective).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let failed = match outcome {
        TurnOutcome::Answered(message) => {
            println!("{}", message.content());
            false
        }
        TurnOutcome::Failed => {
            eprintln!("{}", FAILURE_MESSAGE);
            true
        }
    };

    if let Some(dir) = export {
        let path = controller.export_logs(dir)?;
        eprintln!("Log written to {}", path.display());
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn prompt_line(label: &str) -> io::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

/// Line-based session on stdin/stdout
async fn run_interactive(controller: &Controller, export_dir: &std::path::Path) -> anyhow::Result<()> {
    println!("Socratic Mind ({})", controller.config().model);
    println!("Enter a topic and how you see it. Commands: /export, /quit\n");

    loop {
        let Some(topic) = prompt_line("Topic / Question: ")? else {
            break;
        };
        match topic.trim() {
            "/quit" | "/exit" => break,
            "/export" => {
                match controller.export_logs(export_dir) {
                    Ok(path) => println!("Exported to {}\n", path.display()),
                    Err(e) => eprintln!("Export failed: {}\n", e),
                }
                continue;
            }
            _ => {}
        }
        let Some(perspective) = prompt_line("The way I see it is... ")? else {
            break;
        };

        println!("\nThinking...\n");
        match controller.submit(&topic, &perspective).await {
            Ok(TurnOutcome::Answered(message)) => println!("{}\n", message.content()),
            Ok(TurnOutcome::Failed) => eprintln!("{}\n", FAILURE_MESSAGE),
            Err(e) => eprintln!("Not sent: {}\n", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_topic_requires_perspective() {
        assert!(Args::try_parse_from(["socratic", "--topic", "Entropy"]).is_err());
        assert!(Args::try_parse_from(["socratic", "--perspective", "disorder"]).is_err());

        let args = Args::try_parse_from([
            "socratic",
            "--topic",
            "Entropy",
            "--perspective",
            "disorder",
            "--export",
            "logs",
        ])
        .unwrap();
        assert_eq!(args.topic.as_deref(), Some("Entropy"));
        assert_eq!(args.export, Some(PathBuf::from("logs")));
    }
}
