use anyhow::{Context, Result};
use fba_pipeline::cli::commands::{
    HistoryCommand, ListCommand, RunCommand, StageArg, ValidateCommand,
};
use fba_pipeline::cli::output::*;
use fba_pipeline::cli::{Cli, Command};
use fba_pipeline::core::{CentralityVariant, NetworkKind};
use fba_pipeline::execution::{ExecutionEvent, PipelineDriver};
use fba_pipeline::persistence::{record_run, HistoryBackend};
use fba_pipeline::tool::resolve_program;
use fba_pipeline::{NetworkEntry, PipelineConfig, SubprocessRunner};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd, &cli).await?,
        Command::Validate(cmd) => validate_config(cmd, &cli)?,
        Command::List(cmd) => list_models(cmd, &cli)?,
        Command::History(cmd) => show_history(cmd).await?,
    }

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand, cli: &Cli) -> Result<()> {
    let mut config = PipelineConfig::load(cli.config.as_deref())
        .context("Failed to load pipeline config")?;
    if let Some(root) = &cmd.data_root {
        config.data_root = root.clone();
    }

    let models = config.select_models(&cmd.models)?;
    let networks: Vec<NetworkEntry> = models.iter().map(|m| m.network_entry()).collect();

    let runner = SubprocessRunner::new(config.timeout_secs);
    let driver = PipelineDriver::new(runner, &config)?;

    if cmd.dry_run {
        for invocation in cmd.plan(driver.planner(), &models) {
            println!("{}", invocation.command_line());
        }
        return Ok(());
    }

    config.validate_data_root()?;

    // Open history up front; saving later only warns on failure
    let store = if cmd.no_history {
        None
    } else {
        Some(open_history().await?)
    };

    println!(
        "{} Data root: {} ({} models)",
        INFO,
        style(config.data_root.display()).bold(),
        style(models.len()).cyan()
    );

    // Stop issuing invocations on Ctrl-C / SIGTERM
    let interrupted = driver.interrupt_flag();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, finishing the current invocation");
        interrupted.store(true, Ordering::SeqCst);
    });

    let phases = match cmd.stage {
        StageArg::All => 2,
        _ => 1,
    };
    let progress = create_progress_bar(models.len() * 3 * phases);
    let bar = progress.clone();
    let driver = driver.with_event_handler(move |event| {
        match event {
            ExecutionEvent::InvocationStarted { entry, stage, .. } => {
                bar.set_message(format!("{} {}", entry, stage));
            }
            ExecutionEvent::InvocationCompleted { .. } => bar.inc(1),
            _ => {}
        }
        if let Some(line) = format_execution_event(event) {
            bar.println(line);
        }
    });

    let result = match cmd.stage {
        StageArg::All => driver.run_all(&models).await,
        StageArg::Networks => driver.build_networks(&models).await,
        StageArg::Centralities => driver.build_centralities(&networks).await,
    };
    progress.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            println!("\n{} {}", CROSS, style(&e).red());
            error!("{}", e);
            std::process::exit(2);
        }
    };

    println!("\n{}", format_report(&report));

    // Save to history
    if let Some(store) = store {
        if let Some(summary) = record_run(store.as_ref(), &report, cmd.stage.as_str()).await {
            println!(
                "\n{} Run saved to history (ID: {})",
                INFO,
                style(&summary.run_id.to_string()[..8]).dim()
            );
        }
    }

    // Print final status
    if report.is_success() {
        println!("\n{} Run completed {}", CHECK, style("successfully").green());
    } else {
        println!("\n{} Run {}", CROSS, format_status(report.status));
        std::process::exit(1);
    }

    Ok(())
}

fn validate_config(cmd: &ValidateCommand, cli: &Cli) -> Result<()> {
    println!("{} Validating configuration...", INFO);

    let config = match PipelineConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    };

    println!("{} Configuration is valid!", CHECK);
    println!("  Data root: {}", style(config.data_root.display()).bold());
    println!("  Models: {}", style(config.models.len()).cyan());

    if let Err(e) = config.validate_data_root() {
        println!("  {} {}", WARN, style(e).yellow());
    }
    for (tool, command) in config.tools.iter() {
        let program = command.first().map(String::as_str).unwrap_or_default();
        match resolve_program(program) {
            Some(path) => println!("  {} {}: {}", CHECK, tool, style(path.display()).dim()),
            None => println!("  {} {}: {} not found", WARN, tool, style(program).yellow()),
        }
    }

    if cmd.json {
        let json = serde_json::to_string_pretty(&config)?;
        println!("\n{}", json);
    }
    Ok(())
}

fn list_models(cmd: &ListCommand, cli: &Cli) -> Result<()> {
    let config = PipelineConfig::load(cli.config.as_deref())
        .context("Failed to load pipeline config")?;
    let layout = config.data_layout();

    if cmd.json {
        let models: Vec<_> = config
            .models
            .iter()
            .map(|m| {
                let name = m.output_name();
                serde_json::json!({
                    "name": m.name,
                    "source_format": m.source_format,
                    "output_name": name,
                    "model": layout.model_path(m),
                    "networks": NetworkKind::ALL
                        .iter()
                        .map(|k| layout.network_path(name, *k))
                        .collect::<Vec<_>>(),
                    "centralities": CentralityVariant::ALL
                        .iter()
                        .map(|v| layout.centrality_prefix(name, v))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "models": models }))?);
        return Ok(());
    }

    println!("{} Models ({}):", INFO, config.models.len());
    for model in &config.models {
        if model.output_name() == model.name {
            println!("  {} [{}]", style(&model.name).bold(), model.source_format);
        } else {
            println!(
                "  {} [{}] → {}",
                style(&model.name).bold(),
                model.source_format,
                style(model.output_name()).cyan()
            );
        }
    }

    Ok(())
}

async fn show_history(cmd: &HistoryCommand) -> Result<()> {
    let store = open_history().await?;

    // If specific run ID is requested
    if let Some(run_id) = &cmd.run_id {
        let run_id = uuid::Uuid::parse_str(run_id).context("Invalid run ID format")?;
        match store.load_run(run_id).await? {
            Some(summary) if cmd.json => println!("{}", serde_json::to_string_pretty(&summary)?),
            Some(summary) => {
                println!("{}", format_run_summary(&summary));
                if let Some(completed) = summary.completed_at {
                    if let Ok(duration) = completed.signed_duration_since(summary.started_at).to_std() {
                        println!("  Duration: {}", style(format_duration(duration)).dim());
                    }
                }
                println!("  Invocations: {}", summary.invocations);
                for failure in &summary.failures {
                    println!(
                        "  {} {} / {} [{}]: {}",
                        CROSS, failure.entry, failure.stage, failure.kind, failure.message
                    );
                }
            }
            None => println!("{} Run not found", WARN),
        }
        return Ok(());
    }

    let runs = store.list_runs(cmd.limit).await?;

    if cmd.json {
        let data = serde_json::json!({ "runs": runs });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("{} No runs found", INFO);
        return Ok(());
    }

    println!("{} Run history (showing latest {}):", INFO, cmd.limit);
    for summary in &runs {
        println!("  {}", format_run_summary(summary));
    }

    Ok(())
}

#[cfg(feature = "sqlite")]
async fn open_history() -> Result<Arc<dyn HistoryBackend>> {
    let store = fba_pipeline::persistence::SqliteRunStore::with_default_path().await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite"))]
async fn open_history() -> Result<Arc<dyn HistoryBackend>> {
    warn!("Built without the sqlite feature, run history is not persisted");
    Ok(Arc::new(fba_pipeline::persistence::InMemoryHistory::new()))
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
