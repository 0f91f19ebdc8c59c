//! # CLI Layer
//!
//! This module is **one possible UI client** for rollbook. The library has no idea
//! it exists.
//!
//! The CLI layer is the only place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr, prompts)
//! - Builds the async runtime
//! - Installs the tracing subscriber
//! - Handles argument parsing
//!
//! ## Structure
//!
//! - `run()`: builds the runtime and dispatches (called by `main.rs`)
//! - `init_context()`: config dir, config file, env and flag overrides, then the API
//! - `handle_*()`: per-command handlers that call the API and print the result
//!
//! Errors bubble up as [`RollbookError`] and `main` turns them into exit code 1.

use super::render::{print_delete_dialog, print_messages, print_student_detail, print_students};
use super::setup::{Cli, Commands, FieldArgs};
use super::shell;
use clap::Parser;
use directories::ProjectDirs;
use rollbook::api::{CmdMessage, StudentApi};
use rollbook::cache::QueryCache;
use rollbook::config::RollbookConfig;
use rollbook::dialog::DeleteDialog;
use rollbook::error::{Result, RollbookError};
use rollbook::model::{StudentDraft, StudentPatch};
use rollbook::store::http::HttpBackend;
use rollbook::view::{NO_SEARCH_RESULTS, NO_STUDENTS};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub(crate) struct AppContext {
    pub api: StudentApi<HttpBackend>,
    pub config: RollbookConfig,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_dir = resolve_config_dir(cli.config_dir.clone())?;

    // Config editing never touches the network.
    if let Some(Commands::Config { key, value }) = &cli.command {
        return handle_config(&config_dir, key.as_deref(), value.as_deref());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(cli, config_dir))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second init (tests calling run twice) is not an error worth reporting.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn resolve_config_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    ProjectDirs::from("org", "rollbook", "rollbook")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| RollbookError::Config("Could not determine config dir".to_string()))
}

async fn dispatch(cli: Cli, config_dir: PathBuf) -> Result<()> {
    let ctx = init_context(&cli, &config_dir)?;

    match cli.command {
        Some(Commands::List { search }) => handle_list(&ctx, search.as_deref()).await,
        Some(Commands::Search { term }) => handle_list(&ctx, Some(&term)).await,
        Some(Commands::View { id }) => handle_view(&ctx, id).await,
        Some(Commands::Add { fields }) => handle_add(&ctx, fields).await,
        Some(Commands::Edit { id, fields }) => handle_edit(&ctx, id, fields).await,
        Some(Commands::Patch { id, fields }) => handle_patch(&ctx, id, fields).await,
        Some(Commands::Delete { id, yes }) => handle_delete(&ctx, id, yes).await,
        Some(Commands::Shell) => shell::run(&ctx).await,
        Some(Commands::Config { .. }) => Ok(()),
        None => handle_list(&ctx, None).await,
    }
}

fn init_context(cli: &Cli, config_dir: &Path) -> Result<AppContext> {
    let config = RollbookConfig::load(config_dir)?
        .with_env_overrides()
        .with_api_url_override(cli.api_url.as_deref());
    debug!(api_url = %config.api_url, "resolved backend");

    let backend = HttpBackend::from_config(&config)?;
    let cache = QueryCache::new(Duration::from_secs(config.stale_time_secs));

    Ok(AppContext {
        api: StudentApi::new(backend, cache),
        config,
    })
}

/// The term is sent as given. Only an empty term means the unfiltered list.
async fn handle_list(ctx: &AppContext, search: Option<&str>) -> Result<()> {
    let result = ctx.api.list_students(search).await?;
    let empty = if search.is_some_and(|s| !s.is_empty()) {
        NO_SEARCH_RESULTS
    } else {
        NO_STUDENTS
    };
    print_students(&result.listed_students, empty);
    print_messages(&result.messages);
    Ok(())
}

async fn handle_view(ctx: &AppContext, id: i64) -> Result<()> {
    let result = ctx.api.get_student(id).await?;
    for student in &result.listed_students {
        print_student_detail(student);
    }
    Ok(())
}

async fn handle_add(ctx: &AppContext, fields: FieldArgs) -> Result<()> {
    let draft = StudentDraft::new(
        fields.name.unwrap_or_default(),
        fields.email.unwrap_or_default(),
        fields.roll_number.unwrap_or_default(),
    );
    let result = ctx.api.create_student(&draft).await?;
    if let Some(student) = result.student() {
        print_student_detail(student);
    }
    print_messages(&result.messages);
    Ok(())
}

/// Full replace. Fields not given on the command line keep their current value.
async fn handle_edit(ctx: &AppContext, id: i64, fields: FieldArgs) -> Result<()> {
    let current = ctx.api.get_student(id).await?;
    let Some(student) = current.listed_students.first() else {
        return Err(RollbookError::MalformedResponse(format!(
            "no student returned for id {}",
            id
        )));
    };

    let mut draft = StudentDraft::from(student);
    if let Some(name) = fields.name {
        draft.name = name;
    }
    if let Some(email) = fields.email {
        draft.email = email;
    }
    if let Some(roll_number) = fields.roll_number {
        draft.roll_number = roll_number;
    }

    let result = ctx.api.update_student(id, &draft).await?;
    if let Some(student) = result.student() {
        print_student_detail(student);
    }
    print_messages(&result.messages);
    Ok(())
}

async fn handle_patch(ctx: &AppContext, id: i64, fields: FieldArgs) -> Result<()> {
    let patch = StudentPatch {
        name: fields.name,
        email: fields.email,
        roll_number: fields.roll_number,
    };
    let result = ctx.api.patch_student(id, &patch).await?;
    if let Some(student) = result.student() {
        print_student_detail(student);
    }
    print_messages(&result.messages);
    Ok(())
}

async fn handle_delete(ctx: &AppContext, id: i64, yes: bool) -> Result<()> {
    if !yes {
        let current = ctx.api.get_student(id).await?;
        let Some(student) = current.listed_students.into_iter().next() else {
            return Err(RollbookError::MalformedResponse(format!(
                "no student returned for id {}",
                id
            )));
        };
        let dialog = DeleteDialog::new(student);
        print_delete_dialog(&dialog);
        if !confirm("Delete? [y/N] ")? {
            print_messages(&[CmdMessage::warning("Cancelled.")]);
            return Ok(());
        }
    }

    let result = ctx.api.delete_student(id).await?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(config_dir: &Path, key: Option<&str>, value: Option<&str>) -> Result<()> {
    let mut config = RollbookConfig::load(config_dir)?;

    match (key, value) {
        (None, _) => {
            for key in RollbookConfig::KEYS {
                println!("{} = {}", key, config.get(key)?);
            }
        }
        (Some(key), None) => println!("{} = {}", key, config.get(key)?),
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save(config_dir)?;
            println!("{} = {}", key, config.get(key)?);
        }
    }
    Ok(())
}

/// Reads a yes/no answer from stdin. EOF counts as no.
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
