//! Factbase CLI — inspect an ontology and operate on its knowledge graph
//!
//! The graph is opened from a configuration file (`--config`), or from an
//! ontology plus either a snapshot file or the `FACTBASE_GRAPH_*` environment
//! variables (`--remote`).

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use factbase::tools::ParameterKind;
use factbase::{BackendConfig, KnowledgeConfig, KnowledgeGraph, RemoteConfig, Tool, ToolAccess};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "factbase", version, about = "Ontology-driven knowledge graph CLI")]
struct Cli {
    /// Configuration file (ontology + backend)
    #[arg(long, global = true, env = "FACTBASE_CONFIG", conflicts_with = "ontology")]
    config: Option<PathBuf>,

    /// Ontology YAML file, when no configuration file is given
    #[arg(long, global = true)]
    ontology: Option<PathBuf>,

    /// Snapshot file of the in-process graph
    #[arg(long, global = true, default_value = "factbase.snapshot")]
    snapshot: PathBuf,

    /// Use the remote graph named by the FACTBASE_GRAPH_* environment variables
    #[arg(long, global = true)]
    remote: bool,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum AccessFilter {
    Read,
    Write,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ontology
    Schema,
    /// List the generated operations
    Tools {
        /// Only list read or write operations
        #[arg(long)]
        access: Option<AccessFilter>,
    },
    /// Invoke a generated operation; the graph is saved after writes
    Call {
        /// Operation name, e.g. get_all_Company_entities
        name: String,

        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,
    },
    /// Print node and edge counts
    Stats,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let kg = KnowledgeGraph::open(&config)
        .await
        .with_context(|| format!("failed to open knowledge graph from {:?}", config.ontology))?;

    let result = match &cli.command {
        Commands::Schema => run_schema(&kg, &cli.format),
        Commands::Tools { access } => run_tools(&kg, *access, &cli.format),
        Commands::Call { name, args } => run_call(&kg, name, args, &cli.format).await,
        Commands::Stats => run_stats(&kg, &cli.format).await,
    };

    kg.close().await;
    result
}

fn load_config(cli: &Cli) -> anyhow::Result<KnowledgeConfig> {
    if let Some(path) = &cli.config {
        return KnowledgeConfig::from_file(path).with_context(|| format!("failed to load {:?}", path));
    }

    let Some(ontology) = &cli.ontology else {
        bail!("either --config or --ontology is required");
    };
    let backend = if cli.remote {
        BackendConfig::Remote(RemoteConfig::from_env()?)
    } else {
        BackendConfig::InMemory {
            snapshot: cli.snapshot.clone(),
        }
    };
    Ok(KnowledgeConfig::new(ontology.clone(), backend))
}

fn run_schema(kg: &KnowledgeGraph, format: &OutputFormat) -> anyhow::Result<()> {
    let ontology = kg.ontology();
    match format {
        OutputFormat::Json => {
            let schema = serde_json::json!({
                "name": ontology.name(),
                "description": ontology.description(),
                "entity_classes": ontology.entity_classes(),
                "relationships": ontology.relationship_classes(),
            });
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        OutputFormat::Table => print!("{}", ontology),
    }
    Ok(())
}

fn run_tools(kg: &KnowledgeGraph, access: Option<AccessFilter>, format: &OutputFormat) -> anyhow::Result<()> {
    let tools: Vec<Arc<dyn Tool>> = match access {
        Some(AccessFilter::Read) => kg.registry().read_tools(),
        Some(AccessFilter::Write) => kg.registry().write_tools(),
        None => kg.registry().iter().cloned().collect(),
    };

    match format {
        OutputFormat::Json => {
            let definitions: Vec<_> = tools.iter().map(|t| t.definition()).collect();
            println!("{}", serde_json::to_string_pretty(&definitions)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Operation", "Access", "Arguments"]);
            for tool in &tools {
                let access = match tool.access() {
                    ToolAccess::Read => "read",
                    ToolAccess::Write => "write",
                };
                table.add_row(vec![tool.name().to_string(), access.to_string(), describe_arguments(tool.as_ref())]);
            }
            println!("{}", table);
            println!("{} operation(s)", tools.len());
        }
    }
    Ok(())
}

fn describe_arguments(tool: &dyn Tool) -> String {
    tool.parameters()
        .parameters()
        .iter()
        .map(|p| {
            let kind = match &p.kind {
                ParameterKind::Scalar(t) => t.as_str(),
                ParameterKind::Object(_) => "object",
            };
            let optional = if p.required { "" } else { "?" };
            format!("{}{}: {}", p.name, optional, kind)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

async fn run_call(kg: &KnowledgeGraph, name: &str, args: &str, format: &OutputFormat) -> anyhow::Result<()> {
    let args: serde_json::Value = serde_json::from_str(args).context("arguments must be valid JSON")?;
    let tool = kg
        .registry()
        .get(name)
        .with_context(|| format!("unknown operation '{}' (see `factbase tools`)", name))?
        .clone();

    let result = tool.execute(args).await?;
    if tool.access() == ToolAccess::Write {
        kg.save().await.context("failed to save graph")?;
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Table => print_result(&result),
    }
    Ok(())
}

fn print_result(result: &serde_json::Value) {
    let rows: Vec<&serde_json::Map<String, serde_json::Value>> = match result {
        serde_json::Value::Array(items) => items.iter().filter_map(|v| v.as_object()).collect(),
        serde_json::Value::Object(map) => vec![map],
        serde_json::Value::Null => {
            println!("(not found)");
            return;
        }
        other => {
            println!("{}", other);
            return;
        }
    };

    if rows.is_empty() {
        println!("(no results)");
        return;
    }

    let mut columns: Vec<&String> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !columns.contains(&key) {
                columns.push(key);
            }
        }
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(columns.iter().map(|c| c.as_str()).collect::<Vec<_>>());
    for row in &rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| row.get(c.as_str()).map(format_table_value).unwrap_or_default())
            .collect();
        table.add_row(cells);
    }
    println!("{}", table);
    println!("{} row(s)", rows.len());
}

async fn run_stats(kg: &KnowledgeGraph, format: &OutputFormat) -> anyhow::Result<()> {
    let stats = kg.statistics().await;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Table => {
            println!("Ontology: {}", kg.ontology().name());
            println!("Nodes:    {}", stats.node_count);
            println!("Edges:    {}", stats.edge_count);
        }
    }
    Ok(())
}

fn format_table_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
