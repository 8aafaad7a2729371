//! Command-line CRM cleanup report.
//!
//! Fetches contacts and companies from the MCP server (or reads them from a
//! JSON file) and prints the cleanup report.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use crm_cleanup_api::config::{
    parse_threshold, validate_mcp_url, AnalysisConfig, DEFAULT_COMPANY_LIMIT,
    DEFAULT_CONTACT_LIMIT, DEFAULT_MCP_URL, DEFAULT_SIMILARITY_THRESHOLD,
};
use crm_cleanup_api::mcp_client::{McpClient, McpRecordSource};
use crm_cleanup_api::models::RecordsAnalyzeRequest;
use crm_cleanup_api::render::{
    render_action_plan, render_agent_summary, render_export, render_report, DEFAULT_TOP_N,
};
use crm_cleanup_api::services::{
    CleanupService, RecordSource, StaticRecordSource, SUMMARY_COMPANY_LIMIT,
    SUMMARY_CONTACT_LIMIT,
};

#[derive(Parser)]
#[command(name = "crm_cleanup_report")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find duplicates and data gaps in HubSpot CRM data", long_about = None)]
struct Cli {
    /// MCP server endpoint
    #[arg(long, default_value = DEFAULT_MCP_URL)]
    mcp_url: String,

    /// Maximum number of contacts to analyze
    #[arg(long, default_value_t = DEFAULT_CONTACT_LIMIT)]
    contacts: usize,

    /// Maximum number of companies to analyze
    #[arg(long, default_value_t = DEFAULT_COMPANY_LIMIT)]
    companies: usize,

    /// Name similarity threshold (0.0-1.0)
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD, value_parser = parse_threshold)]
    threshold: f64,

    /// Analyze records from a JSON file with `contacts` and `companies` arrays
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Short summary over 100 contacts and 50 companies
    #[arg(short, long)]
    quick: bool,

    /// Print the report and recommendations as JSON
    #[arg(long)]
    json: bool,

    /// Print the phased action plan after the report
    #[arg(long)]
    plan: bool,

    /// Write the full report to a file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Items shown per report section
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,
}

fn load_source(cli: &Cli) -> anyhow::Result<Arc<dyn RecordSource>> {
    match &cli.input {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let input: RecordsAnalyzeRequest = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            tracing::info!(
                "Loaded {} contacts and {} companies from {}",
                input.contacts.len(),
                input.companies.len(),
                path.display()
            );
            Ok(Arc::new(StaticRecordSource::new(
                input.contacts,
                input.companies,
            )))
        }
        None => {
            let url = validate_mcp_url(cli.mcp_url.clone())?;
            let client = McpClient::new(url)?;
            Ok(Arc::new(McpRecordSource::new(client)))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crm_cleanup_api=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source = load_source(&cli)?;
    let service = CleanupService::new(source, AnalysisConfig::default().with_threshold(cli.threshold));

    let (contact_limit, company_limit) = if cli.quick {
        (SUMMARY_CONTACT_LIMIT, SUMMARY_COMPANY_LIMIT)
    } else {
        (cli.contacts, cli.companies)
    };

    let analysis = match service
        .analyze_crm_quality(contact_limit, company_limit, None)
        .await
    {
        Ok(analysis) => analysis,
        Err(e) if e.is_no_data() => {
            eprintln!("No data retrieved. Check the MCP server connection and HubSpot access token.");
            std::process::exit(1);
        }
        Err(e) => return Err(anyhow::anyhow!(e)),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else if cli.quick {
        println!(
            "{}",
            render_agent_summary(&analysis.report, &analysis.recommendations)
        );
    } else {
        print!("{}", render_report(&analysis.report, cli.top));
        if cli.plan {
            println!();
            print!(
                "{}",
                render_action_plan(&analysis.recommendations.action_plan)
            );
        }
    }

    if let Some(path) = &cli.export {
        std::fs::write(path, render_export(&analysis.report))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Report exported to {}", path.display());
    }

    Ok(())
}
