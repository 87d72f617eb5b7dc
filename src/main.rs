use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use voltplan::advisor::MaintenanceAdvisor;
use voltplan::backend::{CommandBackend, HttpBackend, RecordingBackend, ScheduleBackend};
use voltplan::cli::{Command, GenerateArgs, InitArgs, RenderArgs, RootArgs};
use voltplan::config::{self, BackendChoice};
use voltplan::plan::MaintenancePlan;
use voltplan::render::render_plan_text;
use voltplan::request::RequestPatch;
use voltplan::transcript::TranscriptLog;
use voltplan::util::display_path;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = RootArgs::parse();
    match args.command {
        Command::Generate(args) => cmd_generate(args).await,
        Command::Render(args) => cmd_render(args),
        Command::Init(args) => cmd_init(args),
    }
}

async fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let choice = config::resolve_backend_choice(
        args.endpoint.as_deref(),
        args.backend_command.as_deref(),
    )?;
    let mut backend: Arc<dyn ScheduleBackend> = match choice {
        BackendChoice::Http(endpoint) => Arc::new(HttpBackend::new(endpoint)),
        BackendChoice::Command(command) => Arc::new(CommandBackend::new(&command)?),
    };
    if let Some(dir) = &args.transcript_dir {
        backend = Arc::new(RecordingBackend::new(backend, TranscriptLog::new(dir)));
    }

    let advisor = MaintenanceAdvisor::new(backend);
    if let Some(path) = &args.input {
        advisor.update_request(read_patch(path)?);
    }
    advisor.update_request(patch_from_args(&args));

    let mut progress = advisor.subscribe_progress();
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let message = progress.borrow_and_update().clone();
            if let Some(message) = message {
                eprintln!("  {message}...");
            }
        }
    });

    let notice = advisor.generate().await;
    printer.abort();

    let notice = notice.ok_or_else(|| anyhow!("generate attempt was superseded"))?;
    eprintln!("{notice}");

    let Some(plan) = advisor.plan() else {
        bail!("schedule generation failed");
    };
    if let Some(out) = &args.out {
        write_plan(out, &plan)?;
        eprintln!(
            "Wrote plan to {}",
            display_path(out, std::env::current_dir().ok().as_deref())
        );
    }
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&plan).context("serialize plan")?
        );
    } else {
        print!("{}", render_plan_text(&plan));
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.plan)
        .with_context(|| format!("read plan {}", args.plan.display()))?;
    let plan: MaintenancePlan = serde_json::from_str(&text).context("parse plan JSON")?;
    print!("{}", render_plan_text(&plan));
    Ok(())
}

fn cmd_init(args: InitArgs) -> Result<()> {
    let path = match args.config {
        Some(path) => path,
        None => config::config_path()
            .ok_or_else(|| anyhow!("no config directory available; pass --config"))?,
    };
    if path.exists() && !args.force {
        bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    config::write_config(&path, &config::default_config())?;
    println!("Wrote config stub to {}", path.display());
    Ok(())
}

fn read_patch(path: &Path) -> Result<RequestPatch> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read input {}", path.display()))?;
    serde_json::from_str(&text).context("parse input JSON")
}

fn patch_from_args(args: &GenerateArgs) -> RequestPatch {
    RequestPatch {
        property_type: args.property_type.clone(),
        installation_description: args.description.clone(),
        postcode: args.postcode.clone(),
        installation_age_years: args.age,
        last_inspection: args.last_inspection.clone(),
        known_issues: args.known_issues.clone(),
        detail_level: None,
    }
}

fn write_plan(path: &Path, plan: &MaintenancePlan) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir {}", parent.display()))?;
        }
    }
    let text = serde_json::to_string_pretty(plan).context("serialize plan")?;
    std::fs::write(path, text.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
