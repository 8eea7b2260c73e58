//! citegraph CLI: similarity scores, citation graphs and graph analysis.
//!
//! Usage:
//!   citegraph similarity <a> <b> [--json]
//!   citegraph build --input <bib|json> --out <dir>
//!   citegraph paths --graph <json|csv> [--from S [--to T]] [--all-pairs floyd|dijkstra]
//!   citegraph scc --graph <json|csv> [--top N] [--out dir]
//!   citegraph cooccurrence --input <bib> [--terms a,b,...] --out <file>

use citegraph::analysis::{self, AllPairsStrategy, CostMode, PathAnalyzer};
use citegraph::bib;
use citegraph::graph::exchange;
use citegraph::{
    CitationGraphBuilder, CoOccurrenceBuilder, Config, Graph, NodeId, SimilarityEnsemble,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "citegraph",
    version,
    about = "Text similarity and citation-graph analysis for bibliographies"
)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score two texts with every similarity metric
    Similarity {
        a: String,
        b: String,
        /// Print the scores as JSON
        #[arg(long)]
        json: bool,
    },
    /// Infer a citation graph from a bibliography
    Build {
        /// Raw bibliography text, or a JSON array of records
        #[arg(long)]
        input: PathBuf,
        /// Output directory
        #[arg(long)]
        out: PathBuf,
        /// File name prefix for the exported graph
        #[arg(long, default_value = "citations")]
        prefix: String,
    },
    /// Shortest paths over a graph
    Paths {
        #[arg(long)]
        graph: PathBuf,
        /// inverse, one_minus or unit
        #[arg(long)]
        cost_mode: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long, requires = "from")]
        to: Option<String>,
        /// All-pairs algorithm: floyd or dijkstra
        #[arg(long)]
        all_pairs: Option<String>,
        /// Only compute rows for the first N nodes
        #[arg(long)]
        node_limit: Option<usize>,
        /// Write all-pairs distances as JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Strongly connected components
    Scc {
        #[arg(long)]
        graph: PathBuf,
        /// Number of components to list
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Export the listed components as subgraphs into this directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Term co-occurrence graph over the abstracts of a bibliography
    Cooccurrence {
        #[arg(long)]
        input: PathBuf,
        /// Comma-separated vocabulary (default: built-in terms)
        #[arg(long, value_delimiter = ',')]
        terms: Vec<String>,
        /// Output file (.json or .csv)
        #[arg(long)]
        out: PathBuf,
    },
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("CITEGRAPH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config, String> {
    match path {
        Some(p) => Config::from_yaml_file(p)
            .map_err(|e| format!("Failed to load config '{}': {}", p.display(), e)),
        None => Ok(Config::default()),
    }
}

fn load_graph(path: &Path) -> Result<Graph, String> {
    exchange::read_graph(path).map_err(|e| format!("Failed to read graph '{}': {}", path.display(), e))
}

fn cmd_similarity(config: &Config, a: &str, b: &str, json: bool) -> i32 {
    let ensemble = SimilarityEnsemble::new().with_normalizer(config.similarity.normalizer());
    let result = ensemble.compare(a, b);

    if json {
        return match serde_json::to_string_pretty(&result) {
            Ok(text) => {
                println!("{}", text);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        };
    }

    println!("{:<24}  {:>8}", "METRIC", "SCORE");
    println!("{}", "-".repeat(34));
    for (metric, score) in result.iter() {
        match score {
            Some(s) => println!("{:<24}  {:>8.4}", metric, s),
            None => println!("{:<24}  {:>8}", metric, "-"),
        }
    }
    println!("char n-gram size: {}", result.char_ngram_n);
    0
}

fn cmd_build(config: &Config, input: &Path, out: &Path, prefix: &str) -> i32 {
    let is_json = input
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let records = if is_json {
        std::fs::read_to_string(input)
            .map_err(bib::ParseError::from)
            .and_then(|text| bib::records_from_json(&text))
    } else {
        bib::parse_file(input)
    };
    let records = match records {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let builder = match CitationGraphBuilder::new(config.citation.clone()) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let citations = builder.build(&records);

    match exchange::export_all(&citations.graph, out, prefix) {
        Ok(paths) => {
            let s = citations.summary;
            println!(
                "Built citation graph: {} nodes, {} edges ({} explicit, {} candidates)",
                s.nodes, s.edges, s.explicit_edges, s.candidates
            );
            for path in paths {
                println!("  wrote {}", path.display());
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_paths(
    config: &Config,
    graph_path: &Path,
    cost_mode: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    all_pairs: Option<&str>,
    node_limit: Option<usize>,
    out: Option<&Path>,
) -> i32 {
    let graph = match load_graph(graph_path) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let mode = match cost_mode {
        Some(m) => match m.parse::<CostMode>() {
            Ok(mode) => mode,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        },
        None => config.paths.cost_mode,
    };
    let analyzer = PathAnalyzer::with_epsilon(&graph, mode, config.paths.epsilon)
        .max_floyd_nodes(config.paths.max_floyd_nodes);

    if let Some(source) = from {
        let source = NodeId::from(source);
        if let Some(target) = to {
            return match analyzer.shortest_path(&source, &NodeId::from(target)) {
                Ok(outcome) if outcome.is_reachable() => {
                    let hops: Vec<&str> = outcome.path.iter().map(|id| id.as_str()).collect();
                    println!("{:.6}  {}", outcome.distance, hops.join(" -> "));
                    0
                }
                Ok(_) => {
                    println!("unreachable");
                    0
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    1
                }
            };
        }
        return match analyzer.single_source(&source) {
            Ok(tree) => {
                println!("{:<32}  {:>12}  PATH", "TARGET", "DISTANCE");
                println!("{}", "-".repeat(72));
                for (target, distance) in &tree.distances {
                    let hops: Vec<&str> = tree.paths[target].iter().map(|id| id.as_str()).collect();
                    println!("{:<32}  {:>12.6}  {}", target, distance, hops.join(" -> "));
                }
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        };
    }

    let strategy = match all_pairs.map(str::parse::<AllPairsStrategy>) {
        Some(Ok(s)) => s,
        Some(Err(e)) => {
            eprintln!("Error: {}", e);
            return 1;
        }
        None => AllPairsStrategy::RepeatedDijkstra,
    };
    let limit = node_limit.or(config.paths.node_limit);
    let result = match analyzer.all_pairs(strategy, limit) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let stats = result.stats();
    println!("strategy: {}  cost: {}", result.strategy, mode);
    println!("reachable pairs: {}", stats.count);
    match (stats.average, stats.max) {
        (Some(avg), Some(max)) => println!("average distance: {:.6}\nmax distance: {:.6}", avg, max),
        _ => println!("average distance: -\nmax distance: -"),
    }

    if let Some(out) = out {
        let written = serde_json::to_string_pretty(&result.distances())
            .map_err(|e| e.to_string())
            .and_then(|text| std::fs::write(out, text).map_err(|e| e.to_string()));
        if let Err(e) = written {
            eprintln!("Error: {}", e);
            return 1;
        }
        println!("wrote {}", out.display());
    }
    0
}

fn cmd_scc(graph_path: &Path, top: usize, out: Option<&Path>) -> i32 {
    let graph = match load_graph(graph_path) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let components = analysis::strongly_connected_components(&graph);
    let summary = components.summary();
    println!(
        "{} components, largest {}, mean size {:.2}",
        summary.total, summary.largest, summary.mean_size
    );

    println!("{:>4}  {:>6}  MEMBERS", "#", "SIZE");
    println!("{}", "-".repeat(72));
    for (i, members) in components.iter().take(top).enumerate() {
        let names: Vec<&str> = members.iter().map(|id| id.as_str()).collect();
        println!("{:>4}  {:>6}  {}", i + 1, members.len(), names.join(", "));
    }

    if let Some(dir) = out {
        for i in 0..top.min(components.len()) {
            let Some(sub) = components.subgraph(&graph, i) else {
                continue;
            };
            if let Err(e) = exchange::export_all(&sub, dir, &format!("scc_{}", i + 1)) {
                eprintln!("Error: {}", e);
                return 1;
            }
        }
        println!("exported {} components to {}", top.min(components.len()), dir.display());
    }
    0
}

fn cmd_cooccurrence(input: &Path, terms: &[String], out: &Path) -> i32 {
    let raw = match std::fs::read(input) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", input.display(), e);
            return 1;
        }
    };
    let abstracts = citegraph::extract_abstracts(&raw);
    let builder = if terms.is_empty() {
        CoOccurrenceBuilder::default()
    } else {
        CoOccurrenceBuilder::new(terms)
    };
    let graph = builder.build(&abstracts);

    let is_csv = out
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    let written = if is_csv {
        std::fs::File::create(out)
            .map_err(exchange::GraphError::from)
            .and_then(|file| exchange::write_edges_csv(&graph, file))
    } else {
        exchange::write_json(&graph, out)
    };
    if let Err(e) = written {
        eprintln!("Error: {}", e);
        return 1;
    }

    let mut rows = analysis::degree_table(&graph);
    rows.sort_by(|a, b| b.degree.cmp(&a.degree));
    println!("{:<28}  {:>6}  {:>8}", "TERM", "DEGREE", "WEIGHTED");
    println!("{}", "-".repeat(46));
    for row in rows {
        println!("{:<28}  {:>6}  {:>8.0}", row.id, row.degree, row.weighted_degree);
    }
    println!(
        "{} abstracts, {} edges, {} connected components",
        abstracts.len(),
        graph.edge_count(),
        analysis::connected_components(&graph).len()
    );
    0
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Similarity { a, b, json } => cmd_similarity(&config, &a, &b, json),
        Commands::Build { input, out, prefix } => cmd_build(&config, &input, &out, &prefix),
        Commands::Paths {
            graph,
            cost_mode,
            from,
            to,
            all_pairs,
            node_limit,
            out,
        } => cmd_paths(
            &config,
            &graph,
            cost_mode.as_deref(),
            from.as_deref(),
            to.as_deref(),
            all_pairs.as_deref(),
            node_limit,
            out.as_deref(),
        ),
        Commands::Scc { graph, top, out } => cmd_scc(&graph, top, out.as_deref()),
        Commands::Cooccurrence { input, terms, out } => cmd_cooccurrence(&input, &terms, &out),
    };
    std::process::exit(code);
}
