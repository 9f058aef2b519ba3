mod config;
mod error;
mod input;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};
use visolingua_translator::{OllamaClient, Provider, SharedConfig, TranslationClient};

use crate::config::Settings;
use crate::error::Error;

/// Translate text in screenshots with Gemini, OpenAI or a local Ollama model
#[derive(Debug, Parser)]
#[command(name = "visolingua", version)]
struct Cli {
    /// Settings file (defaults to <config dir>/visolingua/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Translate the text in a PNG capture into the configured language
    Translate {
        #[arg(value_name = "PNG")]
        image: PathBuf,
    },
    /// Ask a follow-up question about a previous translation
    Ask {
        question: String,
        /// Translation text the question refers to
        #[arg(long, conflicts_with = "context_file")]
        context: Option<String>,
        /// Read the translation text from a file
        #[arg(long, value_name = "PATH")]
        context_file: Option<PathBuf>,
    },
    /// Show which providers are configured and which one is active
    Status,
    /// Check that the active provider accepts the configured credentials
    Check,
    /// List the models installed on the configured Ollama server
    Models,
    /// Write a default settings file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let path = match cli.config {
        Some(path) => path,
        None => config::default_path()?,
    };

    if let Command::InitConfig { force } = cli.command {
        return init_config(&path, force);
    }

    let settings = Settings::load_or_create(&path)?;
    let client = TranslationClient::new(SharedConfig::new(settings.to_provider_config()))?;

    match cli.command {
        Command::Translate { image } => {
            let image_base64 = input::load_png_base64(&image)?;
            println!("{}", client.translate(&image_base64)?);
        }
        Command::Ask {
            question,
            context,
            context_file,
        } => {
            let context = input::read_context(context, context_file.as_deref())?;
            println!("{}", client.ask(&question, &context)?);
        }
        Command::Status => {
            for status in client.provider_status() {
                println!(
                    "{:<8} {:<14}{}",
                    status.provider.display_name(),
                    if status.configured {
                        "configured"
                    } else {
                        "not configured"
                    },
                    if status.active { " (active)" } else { "" }
                );
            }
        }
        Command::Check => {
            let provider = Provider::parse(&client.config().snapshot().provider)?;
            if !client.verify_credentials()? {
                return Err(Error::CredentialsRejected(provider));
            }
            match provider {
                Provider::Ollama => println!("Ollama is reachable and the configured model is installed"),
                _ => println!("{} is reachable and accepted the credentials", provider.display_name()),
            }
        }
        Command::Models => {
            let configured = OllamaClient::from_config(&client.config().snapshot())?;
            let installed = client.ollama_models()?;
            if installed.is_empty() {
                println!("No models installed on the Ollama server");
            }
            for name in &installed {
                let marker = if configured.is_installed(std::slice::from_ref(name)) {
                    " (configured)"
                } else {
                    ""
                };
                println!("{}{}", name, marker);
            }
            if !installed.is_empty() && !configured.is_installed(&installed) {
                println!("Configured model '{}' is not installed", configured.model());
            }
        }
        Command::InitConfig { .. } => {}
    }

    Ok(())
}

fn init_config(path: &std::path::Path, force: bool) -> Result<(), Error> {
    if path.exists() && !force {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    Settings::default().save(path)?;
    info!("Wrote default config to {:?}", path);
    println!("Wrote default config to {}", path.display());
    Ok(())
}
