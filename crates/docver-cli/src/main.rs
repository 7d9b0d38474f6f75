use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use docver_application::{VersionWorkflow, WorkflowOutcome, WorkflowPorts, WorkflowReport};
use docver_infrastructure::{ConfigService, FileContentProvider};
use docver_interaction::EcmClients;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code of a run whose new version came back without annotations.
const EXIT_NOT_VERIFIED: u8 = 2;
/// Exit code of a run aborted by an error.
const EXIT_FATAL: u8 = 1;

#[derive(Parser)]
#[command(name = "docver", version)]
#[command(about = "Check in a new document version and carry its annotations over", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/docver/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the outcome as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(outcome) => {
            if cli.json {
                match serde_json::to_string_pretty(&outcome) {
                    Ok(json) => println!("{}", json),
                    Err(e) => tracing::error!("[Cli] Failed to render outcome: {}", e),
                }
            } else {
                print_outcome(&outcome);
            }
            ExitCode::from(exit_code(&outcome))
        }
        Err(e) => {
            eprintln!("{} {:#}", "FAILURE".red().bold(), e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docver=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: &Cli) -> Result<WorkflowOutcome> {
    let config = ConfigService::load(cli.config.as_deref())?;
    let document = config.target.clone();

    let clients = EcmClients::from_config(&config).context("Failed to set up ECM clients")?;
    let ports = WorkflowPorts {
        sessions: clients.sessions,
        documents: clients.documents,
        checkin: clients.checkin,
        content: Arc::new(FileContentProvider::from_config(&config.content)),
    };

    tracing::info!("[Cli] Running version transition for {}", document);
    VersionWorkflow::new(config, ports)
        .run()
        .await
        .with_context(|| format!("Version transition of {} failed", document))
}

fn exit_code(outcome: &WorkflowOutcome) -> u8 {
    match outcome {
        WorkflowOutcome::Verified(_) | WorkflowOutcome::NothingToCopy { .. } => 0,
        WorkflowOutcome::NotVerified(_) => EXIT_NOT_VERIFIED,
    }
}

fn print_outcome(outcome: &WorkflowOutcome) {
    match outcome {
        WorkflowOutcome::Verified(report) => {
            println!("{}", "SUCCESS".green().bold());
            print_report(report);
        }
        WorkflowOutcome::NotVerified(report) => {
            println!(
                "{} new version has no annotation groups",
                "FAILURE".red().bold()
            );
            print_report(report);
        }
        WorkflowOutcome::NothingToCopy {
            document,
            source_version,
            ..
        } => {
            println!(
                "{} {} v{} has no annotations; no new version created",
                "NOTHING TO COPY".yellow().bold(),
                document,
                source_version
            );
        }
    }
}

fn print_report(report: &WorkflowReport) {
    println!("  run:       {}", report.run_id);
    println!("  document:  {}", report.document);
    println!(
        "  version:   {} -> {}",
        report.source_version, report.new_version
    );
    println!(
        "  replay:    {} applied, {} already present, {} rejected",
        report.replay.applied(),
        report.replay.already_present(),
        report.replay.rejected()
    );
    for entry in report.replay.entries() {
        if !entry.outcome.is_success() {
            println!("    {} {:?}", entry.group_name.red(), entry.outcome);
        }
    }
    println!(
        "  verified:  {} of {} groups",
        report.verified_groups, report.captured_groups
    );
}
