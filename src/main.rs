use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vaultflow::dag::{DagSpec, VaultDag};
use vaultflow::{definitions, ConnectionRegistry, Phase, SearchPath};

#[derive(Parser)]
#[command(name = "vaultflow")]
#[command(about = "Data Vault 2.0 warehouse loading workflow definitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the shipped workflow definitions
    List,

    /// Show one DAG's tasks grouped by phase
    Show {
        /// DAG id, or a path to a YAML spec file
        dag: String,
    },

    /// Print the topological execution order of one DAG
    Order {
        dag: String,
    },

    /// Export one DAG as a scheduler manifest
    Export {
        dag: String,

        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check graph shape and, optionally, referenced script files
    Validate {
        dag: String,

        /// Directory holding the SQL/HQL template files
        #[arg(long)]
        sql_dir: Option<PathBuf>,
    },

    /// Show task counts per phase
    Stats {
        dag: String,
    },

    /// Print or write the default connection registry
    Connections {
        /// Write YAML to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
    Dot,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "vaultflow=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            println!("Workflow definitions:");
            for dag in definitions::all()? {
                let stats = dag.stats();
                println!(
                    "  {:32} {} tasks, {} edges, {}",
                    dag.id(),
                    stats.total,
                    stats.edges,
                    dag.schedule().interval
                );
            }
        }

        Commands::Show { ref dag } => {
            let dag = resolve(dag)?;
            let schedule = dag.schedule();

            println!("DAG: {}", dag.id());
            println!("  Owner:      {}", schedule.owner);
            println!("  Interval:   {}", schedule.interval);
            println!("  Start:      {} day(s) ago", schedule.start_days_ago);
            println!("  Past dep:   {}", schedule.depends_on_past);
            if let Some(minutes) = schedule.timeout_minutes {
                println!("  Timeout:    {} min", minutes);
            }
            match &schedule.search_path {
                Some(SearchPath::Path(path)) => {
                    println!("  SQL path:   {}", path.display())
                }
                Some(SearchPath::Variable(name)) => {
                    println!("  SQL path:   ${{{}}} (variable)", name)
                }
                None => {}
            }

            for phase in Phase::ALL {
                let tasks = dag.phase_tasks(phase);
                if tasks.is_empty() {
                    continue;
                }
                println!("\n{}:", phase);
                for task in tasks {
                    let script = task
                        .script_file()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    println!("  {:40} {}", task.id, script);
                }
            }

            let unphased: Vec<_> = dag
                .tasks()
                .filter(|t| t.phase.is_none() && !t.is_barrier())
                .collect();
            if !unphased.is_empty() {
                println!("\nother:");
                for task in unphased {
                    println!("  {:40} {}", task.id, task.kind.operator_name());
                }
            }
        }

        Commands::Order { ref dag } => {
            let dag = resolve(dag)?;
            for (i, task_id) in dag.execution_order()?.iter().enumerate() {
                println!("{:3}. {}", i + 1, task_id);
            }
        }

        Commands::Export { ref dag, format, ref output } => {
            let dag = resolve(dag)?;
            let rendered = match format {
                Format::Json => dag.to_json()?,
                Format::Yaml => dag.to_yaml()?,
                Format::Dot => dag.to_dot(),
            };

            match output {
                Some(path) => {
                    std::fs::write(path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Exported {} to {}", dag.id(), path.display());
                }
                None => print!("{}", rendered),
            }
        }

        Commands::Validate { ref dag, ref sql_dir } => {
            let dag = resolve(dag)?;
            dag.execution_order()
                .with_context(|| format!("graph validation failed for {}", dag.id()))?;
            println!("✓ graph shape ok ({} tasks)", dag.task_count());

            if let Some(root) = sql_dir {
                let missing = dag.missing_scripts(root);
                if missing.is_empty() {
                    println!("✓ all referenced script files exist under {}", root.display());
                } else {
                    println!("✗ {} referenced script file(s) missing:", missing.len());
                    for file in &missing {
                        println!("  - {}", file.display());
                    }
                    anyhow::bail!("script validation failed for {}", dag.id());
                }
            }
        }

        Commands::Stats { ref dag } => {
            let dag = resolve(dag)?;
            let stats = dag.stats();
            println!("Task statistics for {}:", dag.id());
            println!("  Total:      {}", stats.total);
            println!("  Edges:      {}", stats.edges);
            println!("  Barriers:   {}", stats.barriers);
            println!("  Staging:    {}", stats.staging);
            println!("  Hubs:       {}", stats.hubs);
            println!("  Links:      {}", stats.links);
            println!("  Satellites: {}", stats.satellites);
            if stats.unphased > 0 {
                println!("  Other:      {}", stats.unphased);
            }
        }

        Commands::Connections { ref output } => {
            let registry = ConnectionRegistry::defaults();
            match output {
                Some(path) => {
                    registry
                        .save(path)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Wrote connection registry to {}", path.display());
                }
                None => print!("{}", registry.to_yaml()?),
            }
        }
    }

    Ok(())
}

/// A DAG argument is either a shipped definition id or a YAML spec path
fn resolve(arg: &str) -> Result<VaultDag> {
    if arg.ends_with(".yaml") || arg.ends_with(".yml") {
        let spec = DagSpec::load(arg.as_ref())
            .with_context(|| format!("failed to load spec {}", arg))?;
        return Ok(spec.build()?);
    }
    Ok(definitions::by_id(arg)?)
}
