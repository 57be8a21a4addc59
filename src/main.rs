//! pacdeck binary entrypoint: a headless driver over the catalog engine.

/// CLI argument definition.
mod args;

use std::fmt;
use std::sync::OnceLock;
use std::time::SystemTime;

use clap::Parser;

use pacdeck::catalog::Catalog;
use pacdeck::config::{self, Settings};
use pacdeck::ops::{self, OperationError, OperationKind};
use pacdeck::runtime::{self, Backends, Channels};
use pacdeck::session::{SearchOutcome, Session};
use pacdeck::sources::{AurSource, FlatpakSource, SystemAur, SystemFlatpak, SystemRepo};
use pacdeck::state::View;

/// Timestamp formatter writing `YYYY-MM-DD-THH:MM:SS` from epoch seconds.
struct PacdeckTimer;

impl tracing_subscriber::fmt::time::FormatTime for PacdeckTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let secs = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(0));
        let ts = pacdeck::util::ts_to_date(secs).replacen(' ', "-T", 1);
        w.write_str(&ts)
    }
}

/// Keeps the non-blocking appender alive for the process lifetime.
static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initialize tracing to `<config>/logs/pacdeck.log`, stderr as fallback.
fn init_logging(level: &str) {
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()))
    };
    let mut log_path = config::logs_dir();
    log_path.push("pacdeck.log");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(PacdeckTimer)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::debug!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_timer(PacdeckTimer)
                .init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = args::Args::parse();
    init_logging(&cli.log_level);
    tracing::info!(dry_run = cli.dry_run, "pacdeck starting");
    if let Err(err) = run(cli).await {
        tracing::error!(error = %err, "pacdeck failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Drive one CLI request through the engine.
async fn run(cli: args::Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load();
    let aur = SystemAur::discover();
    let aur_helper = aur.helper();
    let backends = Backends {
        repo: std::sync::Arc::new(SystemRepo),
        flatpak: std::sync::Arc::new(SystemFlatpak),
        aur: std::sync::Arc::new(aur),
    };

    if let Some(name) = cli.info.as_deref() {
        return show_info(&backends, name).await;
    }

    let mut session = Session::new(settings);
    let mut channels = Channels::new();

    runtime::spawn_full_load(backends.clone(), settings.aur_enabled, channels.load_tx.clone());
    let catalog = channels
        .load_rx
        .recv()
        .await
        .ok_or("catalog load channel closed")?;
    session.apply_full_load(catalog);

    let view = View::from_config_key(&cli.view)
        .ok_or_else(|| format!("unknown view '{}' (installed/available/flatpak/aur/all)", cli.view))?;
    session.set_view(view);

    if cli.update || cli.install.is_some() || cli.remove.is_some() {
        return run_operation_flow(
            &cli,
            &mut session,
            &mut channels,
            &backends,
            aur_helper,
        )
        .await;
    }

    if let Some(text) = cli.search.clone()
        && let SearchOutcome::SearchAur(term) = session.set_search(text)
    {
        runtime::spawn_aur_search(backends.clone(), term, channels.aur_tx.clone());
        if let Some((t, hits)) = channels.aur_rx.recv().await {
            session.apply_aur_hits(&t, hits);
        }
    }

    for _ in 0..cli.page {
        if !session.load_more() {
            break;
        }
    }
    print_rows(&session, &backends, cli.json)?;
    Ok(())
}

/// Print detail text for one package.
async fn show_info(backends: &Backends, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let repo = backends.repo.clone();
    let lookup = name.to_string();
    let info = tokio::task::spawn_blocking(move || repo.package_info(&lookup)).await??;
    match info {
        Some(text) => println!("{}", text.trim_end()),
        None => println!("No package named '{name}' was found"),
    }
    Ok(())
}

/// Execute one privileged operation, then reconcile installed state.
async fn run_operation_flow(
    cli: &args::Args,
    session: &mut Session,
    channels: &mut Channels,
    backends: &Backends,
    aur_helper: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (kind, argv, target) = if cli.update {
        (OperationKind::Update, ops::update_argv(), None)
    } else {
        let (kind, name) = cli.remove.as_ref().map_or_else(
            || (OperationKind::Install, cli.install.clone().unwrap_or_default()),
            |n| (OperationKind::Remove, n.clone()),
        );
        let record = session
            .catalog()
            .find_by_name(&name)
            .cloned()
            .ok_or_else(|| OperationError::UnknownPackage(name.clone()))?;
        let argv = ops::build_argv(kind, &record, aur_helper)?;
        (kind, argv, Some(record.name))
    };

    if !session.begin_operation() {
        return Err(Box::new(OperationError::Busy));
    }
    runtime::spawn_operation(argv, kind, target, cli.dry_run, channels.op_tx.clone());
    let outcome = channels
        .op_rx
        .recv()
        .await
        .ok_or("operation channel closed")?;
    session.finish_operation();

    if outcome.success {
        println!("{} finished", outcome.kind.as_str());
    } else {
        println!(
            "{} failed (exit code {})",
            outcome.kind.as_str(),
            outcome
                .exit_code
                .map_or_else(|| "none".to_string(), |c| c.to_string())
        );
    }

    // State may have changed even on failure; re-derive it either way.
    runtime::spawn_reconcile(backends.clone(), channels.reconcile_tx.clone());
    match channels
        .reconcile_rx
        .recv()
        .await
        .ok_or("reconcile channel closed")?
    {
        Ok(sets) => session.apply_reconciled(&sets),
        Err(e) => {
            tracing::warn!(class = e.class(), error = %e, "reconcile failed; reloading catalog");
            runtime::spawn_full_load(
                backends.clone(),
                session.aur_enabled(),
                channels.load_tx.clone(),
            );
            let catalog: Catalog = channels
                .load_rx
                .recv()
                .await
                .ok_or("catalog load channel closed")?;
            session.apply_full_load(catalog);
        }
    }

    if let Some(name) = &outcome.target
        && let Some(rec) = session.catalog().find_by_name(name)
    {
        println!(
            "{} is now {}",
            rec.name,
            if rec.installed { "installed" } else { "not installed" }
        );
    }
    Ok(())
}

/// Render the rows materialized through the current page.
fn print_rows(
    session: &Session,
    backends: &Backends,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = session.rows_through_current_page();
    let page = session.get_page();
    if json {
        let payload = serde_json::json!({
            "rows": rows,
            "counts": page.counts,
            "has_more": page.has_more,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    if rows.is_empty() {
        let reason = session
            .empty_reason(
                backends.aur.helper_available(),
                backends.flatpak.is_available(),
            )
            .unwrap_or_else(|| "Nothing to show".to_string());
        println!("{reason}");
        return Ok(());
    }
    for rec in &rows {
        let mark = if rec.installed { '●' } else { '○' };
        println!(
            "{mark} {:<40} {:<12} {}",
            rec.name,
            rec.origin_label,
            rec.source_kind.as_str()
        );
    }
    println!(
        "{} of {} match(es) shown, {} installed{}",
        page.counts.shown,
        page.counts.total_matches,
        page.counts.installed_matches,
        if page.has_more {
            format!("; pass --page {} for more", session.page_index() + 1)
        } else {
            String::new()
        }
    );
    Ok(())
}
