//! Requirement Drafts - draft authoring client for procurement requirements
//!
//! Validates requirement forms step by step and keeps them synchronised with
//! the remote draft service, autosaving while a session is being edited.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use requirement_drafts::state::{self, RequirementFormData, Step};
use requirement_drafts::storage::{
    FallbackCache, FileFallbackCache, HttpDraftStorage, MemoryFallbackCache,
};
use requirement_drafts::{AuthContext, DraftConfig, DraftSession, Notice, SaveOutcome};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often `watch` looks for changes to the form file
const FILE_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Parser)]
#[command(name = "requirement-drafts", version, about)]
struct Cli {
    /// Draft service base URL (overrides config and environment)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a form file, one step or all of them
    Validate {
        file: PathBuf,
        #[arg(long)]
        step: Option<u8>,
    },
    /// Save a form file as a draft
    Save {
        file: PathBuf,
        /// Update this existing draft instead of creating one
        #[arg(long)]
        draft_id: Option<String>,
    },
    /// Fetch a draft and print it as JSON
    Load {
        id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Edit a form file and autosave it until Ctrl+C
    Watch { file: PathBuf },
    /// Restore the local fallback copy to a file
    Recover { out: PathBuf },
    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "requirement_drafts=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = DraftConfig::load()?;
    if let Some(url) = cli.api_url {
        config.api_base_url = Some(url);
    }

    match cli.command {
        Command::Validate { file, step } => validate(&file, step),
        Command::Save { file, draft_id } => save(&config, &file, draft_id).await,
        Command::Load { id, out } => load(&config, &id, out.as_deref()).await,
        Command::Watch { file } => watch(&config, &file).await,
        Command::Recover { out } => recover(&config, &out),
        Command::Config { write } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if write {
                config.save()?;
                if let Some(path) = DraftConfig::config_path() {
                    eprintln!("Wrote {}", path.display());
                }
            }
            Ok(())
        }
    }
}

fn read_form(path: &Path) -> Result<RequirementFormData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not a valid form", path.display()))
}

fn write_form(path: &Path, form: &RequirementFormData) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(form)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn fallback_cache(config: &DraftConfig) -> Arc<dyn FallbackCache> {
    match config.fallback_dir() {
        Some(dir) => Arc::new(FileFallbackCache::new(dir)),
        None => {
            tracing::warn!("No data directory, local fallback copy kept in memory only");
            Arc::new(MemoryFallbackCache::new())
        }
    }
}

fn build_session(config: &DraftConfig) -> Result<(DraftSession, mpsc::UnboundedReceiver<Notice>)> {
    let storage = HttpDraftStorage::new(config)?;
    Ok(DraftSession::new(
        Arc::new(storage),
        fallback_cache(config),
        AuthContext::new(true),
        config.autosave_interval(),
    ))
}

fn print_notices(notices: &mut mpsc::UnboundedReceiver<Notice>) {
    while let Ok(notice) = notices.try_recv() {
        if notice.is_error() {
            eprintln!("{}", notice.message());
        } else {
            println!("{}", notice.message());
        }
    }
}

fn validate(file: &Path, step: Option<u8>) -> Result<()> {
    let form = read_form(file)?;
    let steps = match step {
        Some(n) => vec![Step::try_from(n)?],
        None => Step::ALL.to_vec(),
    };

    let mut valid = true;
    for step in steps {
        let errors = state::validate_step(&form, step);
        if errors.is_empty() {
            println!("Step {step}: ok");
            continue;
        }
        valid = false;
        println!("Step {step}:");
        for (field, message) in &errors {
            println!("  {field}: {message}");
        }
    }

    if !valid {
        bail!("{} has validation errors", file.display());
    }
    Ok(())
}

async fn save(config: &DraftConfig, file: &Path, draft_id: Option<String>) -> Result<()> {
    let form = read_form(file)?;
    let (session, mut notices) = build_session(config)?;

    if let Some(id) = draft_id {
        session
            .load_draft_by_id(&id)
            .await?
            .with_context(|| format!("Draft {id} is empty"))?;
    }
    session.load_draft_data(form);

    let outcome = session.save_as_draft().await;
    print_notices(&mut notices);
    match outcome {
        SaveOutcome::Created(id) | SaveOutcome::Updated(id) => {
            println!("{id}");
            Ok(())
        }
        SaveOutcome::SavedLocally => Ok(()),
        other => bail!("Draft not saved ({other:?})"),
    }
}

async fn load(config: &DraftConfig, id: &str, out: Option<&Path>) -> Result<()> {
    let (session, _notices) = build_session(config)?;
    let Some(form) = session.load_draft_by_id(id).await? else {
        bail!("Draft {id} is empty");
    };
    match out {
        Some(path) => write_form(path, &form),
        None => {
            println!("{}", serde_json::to_string_pretty(&form)?);
            Ok(())
        }
    }
}

fn recover(config: &DraftConfig, out: &Path) -> Result<()> {
    let (session, _notices) = build_session(config)?;
    match session.restore_local_fallback()? {
        Some(form) => write_form(out, &form),
        None => bail!("No local fallback copy found"),
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

async fn watch(config: &DraftConfig, file: &Path) -> Result<()> {
    let (session, mut notices) = build_session(config)?;
    session.load_draft_data(read_form(file)?);
    session.init();
    session.start_editing();
    tracing::info!(
        "Watching {} (autosave every {}s, Ctrl+C to stop)",
        file.display(),
        config.autosave_interval().as_secs()
    );

    let mut last_modified = modified_at(file);
    let mut poll = tokio::time::interval(FILE_POLL_INTERVAL);
    let mut draft_state = session.watch_draft_state();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = poll.tick() => {
                let modified = modified_at(file);
                if modified != last_modified {
                    last_modified = modified;
                    match read_form(file) {
                        Ok(form) => session.load_draft_data(form),
                        Err(err) => tracing::warn!("{err:#}"),
                    }
                }
            }
            changed = draft_state.changed() => {
                if changed.is_err() {
                    break;
                }
                let label = draft_state.borrow_and_update().status_label();
                tracing::info!("{label}");
            }
            Some(notice) = notices.recv() => {
                println!("{}", notice.message());
            }
        }
    }

    session.stop_editing();
    let outcome = session.save_as_draft().await;
    print_notices(&mut notices);
    session.teardown().await;
    if let Some(id) = outcome.draft_id() {
        println!("{id}");
    }
    Ok(())
}
