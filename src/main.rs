use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use gbapx::graph_parser::deserialize_string_to_graph;
use gbapx::{decision, optimize, Orientation, RoundConfig};

#[derive(Parser)]
#[command(name = "gbapx", about = "1.75-approximation for Graph Balancing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decide whether an orientation within 1.75 * target exists.
    Decide {
        #[arg(long)]
        target: f64,
        file: PathBuf,
    },
    /// Binary-search for the best orientation found.
    Optimize { file: PathBuf },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Decide { target, file } => load_graph(&file).and_then(|g| {
            let config = RoundConfig::default();
            decision(&g, target, &config).map(|o| (g, o))
        }),
        Command::Optimize { file } => load_graph(&file).and_then(|g| {
            let config = RoundConfig::default();
            optimize(&g, &config).map(|o| (g, o))
        }),
    };

    match result {
        Ok((graph, Some(orientation))) => {
            print_orientation(&graph, &orientation);
            ExitCode::SUCCESS
        }
        Ok((_, None)) => {
            println!("no orientation within the requested bound exists");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("gbapx: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_graph(file: &PathBuf) -> gbapx::Result<gbapx::Graph> {
    let data = std::fs::read_to_string(file).map_err(|e| {
        gbapx::GraphBalancingError::InvalidInput(format!("could not read {}: {e}", file.display()))
    })?;
    deserialize_string_to_graph(&data).map_err(|(node_err, edge_err)| {
        gbapx::GraphBalancingError::InvalidInput(format!(
            "{} does not parse as either CSV row shape (node error: {node_err}; edge error: {edge_err})",
            file.display()
        ))
    })
}

fn print_orientation(graph: &gbapx::Graph, orientation: &Orientation) {
    for edge in graph.edges() {
        let winner = orientation.get(edge.id).expect("orientation is total");
        let loser = graph.other_endpoint(edge.id, winner);
        println!(
            "edge {} ({} -> {}): weight {}",
            edge.id,
            graph.vertex(loser).name,
            graph.vertex(winner).name,
            edge.weight
        );
    }
    for v in graph.vertices() {
        println!("vertex {}: load {}", v.name, orientation.load(graph, v.id));
    }
    println!("makespan: {}", orientation.makespan(graph));
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_graph_round_trips_an_edge_shaped_csv_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "A,B,0.6\nB,C,0.4").unwrap();
        let graph = load_graph(&file.path().to_path_buf()).unwrap();
        assert_eq!(graph.num_vertices(), 3);
        assert_eq!(graph.num_edges(), 2);
    }

    #[test]
    fn load_graph_reports_invalid_input_for_a_missing_file() {
        let err = load_graph(&PathBuf::from("/nonexistent/does-not-exist.csv")).unwrap_err();
        assert!(matches!(err, gbapx::GraphBalancingError::InvalidInput(_)));
    }
}
