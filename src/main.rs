//! agents101 - inspect and drive the AI Agents 101 course state

use agents101::paths;
use agents101::{
    ApplicationState, Config, Course, FileBackend, LabId, Language, ProviderId, StateStore,
    StoreOptions, Theme,
};
use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand};

/// Inspect and update the persisted AI Agents 101 course state
#[derive(Parser)]
#[command(name = "agents101")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current state as JSON (default)
    Show {
        /// Print credentials instead of masking them
        #[arg(long)]
        reveal: bool,
    },
    /// Print the path of the state file
    Path,
    /// List the course labs with completion marks
    Labs,
    /// Configure a provider and make it the active one
    Activate {
        /// Provider to configure (cohere, browser)
        provider: ProviderId,
        /// API credential for the provider
        #[arg(long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
        credential: String,
        /// Available model, repeat in display order
        #[arg(long = "model")]
        models: Vec<String>,
    },
    /// Switch to an already configured provider
    Provider {
        /// Provider to select
        provider: ProviderId,
    },
    /// Select the model used for calls
    Model {
        /// Model identifier
        model: String,
    },
    /// Show a lab
    Goto {
        /// Lab id
        lab: LabId,
    },
    /// Mark a lab complete
    Complete {
        /// Lab id
        lab: LabId,
    },
    /// Mark a lab complete and move to the next one
    Advance {
        /// Lab id
        lab: LabId,
        /// Number of lessons (defaults to the configured count)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        total: Option<u32>,
    },
    /// Set the interface language (en, he)
    Language {
        /// Language code
        language: Language,
    },
    /// Set the color theme (dark, light)
    Theme {
        /// Theme name
        theme: Theme,
    },
    /// Restore the default state
    Reset {
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

fn init_logging() {
    // Log to the temp dir - tail with: tail -f /tmp/agents101.log
    // Set DEBUG=0-3 to control verbosity (0=off, 1=warn, 2=info, 3=debug)
    let debug_level = std::env::var("DEBUG")
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(0);

    if debug_level > 0 {
        let level = match debug_level {
            1 => tracing::Level::WARN,
            2 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        };

        let log_path = paths::log_path();
        let dir = log_path
            .parent()
            .map_or_else(std::env::temp_dir, std::path::Path::to_path_buf);
        let file_appender = tracing_appender::rolling::never(dir, "agents101.log");
        tracing_subscriber::fmt()
            .with_writer(file_appender)
            .with_max_level(level)
            .with_ansi(false)
            .init();
    }
}

fn main() -> Result<()> {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Let --help and --version exit normally
            if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                e.exit();
            }
            // For actual errors, show error + help
            eprintln!("error: {}\n", e.kind());
            Cli::command().print_help()?;
            std::process::exit(1);
        }
    };

    let config = Config::load()?;
    let backend = FileBackend::new(Config::data_dir());
    let mut store = StateStore::open(backend, StoreOptions::from(&config));

    run(
        cli.command.unwrap_or(Commands::Show { reveal: false }),
        &mut store,
        &config,
    )?;

    match store.last_persistence_error() {
        Some(e) => Err(anyhow!("Failed to save state: {e}")),
        None => Ok(()),
    }
}

fn run(command: Commands, store: &mut StateStore<FileBackend>, config: &Config) -> Result<()> {
    match command {
        Commands::Show { reveal } => {
            let state = if reveal {
                store.state().clone()
            } else {
                masked(store.state())
            };
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Commands::Path => {
            let path = store.backend().path_for(&store.options().storage_key)?;
            println!("{}", path.display());
        }
        Commands::Labs => print_labs(store.state(), &Course::default()),
        Commands::Activate {
            provider,
            credential,
            models,
        } => {
            store.activate_provider(provider, credential, models);
            println!(
                "Activated {} (model: {})",
                provider.display_name(),
                store.state().selected_model_id
            );
        }
        Commands::Provider { provider } => {
            if store.set_active_provider(provider) {
                println!(
                    "Switched to {} (model: {})",
                    provider.display_name(),
                    store.state().selected_model_id
                );
            } else {
                println!(
                    "{} is not configured yet; run `agents101 activate {provider}` first.",
                    provider.display_name()
                );
            }
        }
        Commands::Model { model } => {
            store.set_selected_model(model)?;
        }
        Commands::Goto { lab } => store.set_current_lab(lab),
        Commands::Complete { lab } => store.mark_lab_complete(lab),
        Commands::Advance { lab, total } => {
            store.mark_lab_complete_and_advance(lab, total.unwrap_or(config.total_lab_count));
            println!(
                "Lab {lab} complete, now on lab {}",
                store.state().current_lab_id
            );
        }
        Commands::Language { language } => {
            store.set_language(language);
            println!("Language: {language} ({})", language.direction().as_attr());
        }
        Commands::Theme { theme } => store.set_theme(theme),
        Commands::Reset { force } => cmd_reset(store, force)?,
    }
    Ok(())
}

fn masked(state: &ApplicationState) -> ApplicationState {
    let mut masked = state.clone();
    for &id in ProviderId::ALL {
        let mut config = masked.providers.get(id).clone();
        if config.credential.is_some() {
            config.credential = Some("********".to_string());
        }
        masked.providers.set(id, config);
    }
    masked
}

fn print_labs(state: &ApplicationState, course: &Course) {
    let current = course.resolve(state.current_lab_id).map(|lab| lab.id);
    for lab in course.labs() {
        let marker = if Some(lab.id) == current { '>' } else { ' ' };
        let done = if state.is_lab_complete(lab.id) { 'x' } else { ' ' };
        println!("{marker} [{done}] {:>2}  {}", lab.id, lab.title);
    }
    let progress = course.progress(state);
    println!(
        "\n{}/{} lessons complete ({}%)",
        progress.completed,
        progress.total,
        progress.percent()
    );
}

fn cmd_reset(store: &mut StateStore<FileBackend>, force: bool) -> Result<()> {
    use std::io::{self, Write};

    if !force {
        print!("Reset course progress and provider settings? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.reset();
    println!("Reset complete.");
    Ok(())
}
