use crate::app::dto::{DEFAULT_THRESHOLD, ModulesRequest};
use crate::app::engine::AnalysisEngine;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mftool: recover candidate modules from a class model by call coupling
#[derive(Parser, Debug)]
#[command(name = "mftool")]
#[command(about = "Cluster classes by call coupling and report candidate modules", long_about = None)]
pub struct Cli {
    /// Class model JSON emitted by a source-model provider
    pub model: PathBuf,

    /// Drop classes that look like test code before analysis
    #[arg(long, global = true, default_value_t = false)]
    pub exclude_tests: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Class, method and call counts
    Summary,
    /// Resolved method-level calls
    Callgraph,
    /// Class pairs by normalized coupling, strongest first
    Coupling {
        /// Show at most this many pairs
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Coupling between two classes
    Pair { a: String, b: String },
    /// Square coupling matrix over all classes
    Matrix,
    /// Clustering levels and merge steps
    Dendrogram,
    /// Candidate modules above a coupling threshold
    Modules {
        /// Minimum internal coupling (recommended 0.01-0.05)
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        cp: f64,
        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Serve the analysis over HTTP
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Serve the analysis as an MCP stdio server
    Mcp,
}

impl Cli {
    /// Parse CLI arguments from the environment
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

pub fn display_summary(engine: &AnalysisEngine) -> Result<()> {
    let h = engine.health();
    let filter_msg = if h.exclude_tests {
        format!(" ({} test classes excluded)", h.excluded_test_classes)
    } else {
        String::new()
    };

    println!("Model: {}", h.model_path);
    println!("  Classes: {}{}", h.class_count, filter_msg);
    println!("  Methods: {}", h.method_count);
    println!("  Call edges: {}", h.call_edges);
    println!("  Resolved calls: {}", h.resolved_calls);
    println!("  Unresolved calls: {}", h.unresolved_calls);
    println!("  Coupled class pairs: {}", h.coupled_pairs);
    Ok(())
}

pub fn display_call_graph(engine: &AnalysisEngine) -> Result<()> {
    let graph = engine.call_graph();
    println!(
        "Call graph: {} methods, {} calls",
        graph.method_count, graph.edge_count
    );
    println!("{}", "=".repeat(80));

    for m in &graph.methods {
        println!("{}", m.method);
        for callee in &m.calls {
            println!("  -> {}", callee);
        }
    }
    Ok(())
}

pub fn display_coupling(engine: &AnalysisEngine, limit: Option<usize>) -> Result<()> {
    let result = engine.coupling(limit);
    println!(
        "Class coupling ({} pairs, {} inter-class calls):",
        result.pair_count, result.total
    );
    println!("{}", "=".repeat(80));

    for (i, p) in result.pairs.iter().enumerate() {
        println!(
            "{}. {}-{}: {:.6} ({} calls)",
            i + 1,
            p.first,
            p.second,
            p.score,
            p.raw
        );
    }
    Ok(())
}

pub fn display_pair(engine: &AnalysisEngine, a: &str, b: &str) -> Result<()> {
    let p = engine.pair_coupling(a, b)?;
    println!("{}-{}: {:.6} ({} calls)", p.first, p.second, p.score, p.raw);
    Ok(())
}

pub fn display_matrix(engine: &AnalysisEngine) -> Result<()> {
    let m = engine.coupling_matrix();
    let width = m.classes.iter().map(String::len).max().unwrap_or(0);

    print!("{:width$}", "");
    for (i, _) in m.classes.iter().enumerate() {
        print!(" {:>8}", i);
    }
    println!();

    for (i, (name, row)) in m.classes.iter().zip(&m.values).enumerate() {
        print!("{:width$}", name);
        for v in row {
            print!(" {:>8.4}", v);
        }
        println!("  [{}]", i);
    }
    Ok(())
}

pub fn display_dendrogram(engine: &AnalysisEngine) -> Result<()> {
    let d = engine.dendrogram();
    println!("Dendrogram over {} classes:", d.class_count);
    println!("{}", "=".repeat(80));

    for (level, clusters) in d.levels.iter().enumerate() {
        let rendered: Vec<String> = clusters
            .iter()
            .map(|c| format!("{{{}}}", c.join(", ")))
            .collect();
        println!("Level {}: {}", level, rendered.join(" "));
    }

    if !d.merges.is_empty() {
        println!("\nMerges:");
        for m in &d.merges {
            println!(
                "  {}. {{{}}} + {{{}}} at {:.6}",
                m.level,
                m.left.join(", "),
                m.right.join(", "),
                m.coupling
            );
        }
    }
    Ok(())
}

pub fn display_modules(engine: &AnalysisEngine, cp: f64, json: bool) -> Result<()> {
    let result = engine.modules(ModulesRequest { threshold: cp })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "Modules with internal coupling >= {} ({} found, at most {}):",
        result.threshold,
        result.modules.len(),
        result.class_count / 2
    );
    println!("{}", "=".repeat(80));

    for (i, m) in result.modules.iter().enumerate() {
        println!("{}. [{:.6}] {}", i + 1, m.internal_coupling, m.classes.join(", "));
    }
    Ok(())
}
