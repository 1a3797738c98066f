use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use query_core::{
    assessment::{assess, RandomScorer},
    HttpRecommendationClient, MissingRecommendationClient, OfflineRecommendationClient,
    QueryOrchestrator, RecommendationClient,
};
use shared::domain::{QueryKind, RawCriteria, RequestState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, Settings, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(name = "gyaan", about = "Scholarship, course and career guidance queries")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Answer from the built-in catalog instead of a remote backend.
    #[arg(long)]
    offline: bool,
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    timeout: Option<u64>,
    /// Print the settled state as JSON.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Scholarships(CriteriaArgs),
    Courses(CriteriaArgs),
    Advice(CriteriaArgs),
    Assess {
        #[arg(long = "skill", required = true)]
        skills: Vec<String>,
    },
}

#[derive(Args, Debug, Default)]
struct CriteriaArgs {
    #[arg(long)]
    education: Option<String>,
    #[arg(long)]
    income: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    interest: Option<String>,
}

impl From<CriteriaArgs> for RawCriteria {
    fn from(args: CriteriaArgs) -> Self {
        RawCriteria {
            education_level: args.education,
            annual_income: args.income,
            category: args.category,
            region: args.region,
            free_text_interest: args.interest,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let (kind, criteria) = match cli.command {
        Command::Scholarships(args) => (QueryKind::Scholarship, args),
        Command::Courses(args) => (QueryKind::Course, args),
        Command::Advice(args) => (QueryKind::Advice, args),
        Command::Assess { skills } => {
            let report = assess(skills.as_slice(), &RandomScorer::default())?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render::render_assessment(&report));
            }
            return Ok(());
        }
    };

    let mut settings = load_settings(&cli.config)?;
    settings.apply_overrides(cli.offline, cli.endpoint, cli.timeout);

    let orchestrator = QueryOrchestrator::new(build_client(&settings)?);
    let mut transitions = orchestrator.subscribe_transitions();
    let handle = orchestrator.submit(&criteria.into(), kind).await;
    info!(handle = handle.0, kind = %kind, "cli: query submitted");

    let settled = loop {
        let transition = transitions
            .recv()
            .await
            .context("query state channel closed")?;
        if transition.to.handle() != Some(handle) {
            continue;
        }
        if transition.to.is_settled() {
            break transition.to;
        }
        if !cli.json {
            eprintln!("{}", render::render_state(&transition.to));
        }
    };

    if cli.json {
        println!("{}", state_json(&settled));
    } else {
        println!("{}", render::render_state(&settled));
    }

    if let RequestState::Failed(_, err) = settled {
        bail!("query failed: {err}");
    }
    Ok(())
}

fn build_client(settings: &Settings) -> Result<Arc<dyn RecommendationClient>> {
    if settings.offline {
        info!("cli: using offline catalog");
        return Ok(Arc::new(OfflineRecommendationClient::new()));
    }
    match settings.http_client_config() {
        Some(config) => {
            let client = HttpRecommendationClient::new(config)?;
            info!(endpoint = %client.endpoint(), "cli: using http backend");
            Ok(Arc::new(client))
        }
        None => {
            warn!("cli: no backend_url configured; pass --endpoint or --offline");
            Ok(Arc::new(MissingRecommendationClient))
        }
    }
}

fn state_json(state: &RequestState) -> serde_json::Value {
    match state {
        RequestState::Succeeded(handle, result) => serde_json::json!({
            "handle": handle,
            "state": state.label(),
            "result": result,
        }),
        RequestState::Failed(handle, err) => serde_json::json!({
            "handle": handle,
            "state": state.label(),
            "error": err.to_string(),
            "message": err.user_message(),
            "transient": err.is_transient(),
        }),
        other => serde_json::json!({
            "handle": other.handle(),
            "state": other.label(),
        }),
    }
}
