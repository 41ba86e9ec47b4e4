use clap::Parser;
use ilsched::error::Error;
use ilsched::iloc::RegisterNames;
use ilsched::parser::{parse_source, token_stream};
use ilsched::rename::rename;
use ilsched::scheduling::{dot, schedule_block};
use std::path::{Path, PathBuf};

/// Schedules a straight-line ILOC block for a two-slot machine.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// ILOC block to schedule
    file: PathBuf,

    /// Print the token stream and stop
    #[arg(short, long)]
    tokens: bool,

    /// Print the parsed operations in table form and stop
    #[arg(short, long)]
    ir: bool,

    /// Print the block with virtual registers and stop
    #[arg(short, long)]
    renamed: bool,

    /// Print latency and priority of every operation before the schedule
    #[arg(short, long)]
    priorities: bool,

    /// Write the dependency graph to PATH in Graphviz DOT format
    #[arg(short, long, value_name = "PATH")]
    graph: Option<PathBuf>,

    /// Print the cycle count after the schedule
    #[arg(short, long)]
    count: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn read_source(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn run(cli: &Cli) -> Result<(), Error> {
    let src = read_source(&cli.file)?;
    let file_path = cli.file.display().to_string();

    if cli.tokens {
        for (line, token) in token_stream(&src, &file_path)? {
            println!("{}: {}", line, token);
        }
        return Ok(());
    }

    let mut block = parse_source(&src, &file_path)?;
    log::info!("parsed {} operations", block.len());

    if cli.ir {
        for op in block.iter() {
            println!("{}", op.ir_row());
        }
        return Ok(());
    }

    let summary = rename(&mut block);
    log::info!(
        "{} virtual registers, at most {} live",
        summary.vr_count,
        summary.max_live
    );

    if cli.renamed {
        for op in block.iter() {
            println!("{}", op.display(RegisterNames::Virtual));
        }
        return Ok(());
    }

    let (graph, schedule) = schedule_block(&block);

    if let Some(path) = &cli.graph {
        std::fs::write(path, dot::to_dot(&graph)).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("wrote dependency graph to {}", path.display());
    }

    if cli.priorities {
        for id in graph.order() {
            let node = graph.node(*id);
            println!("{} Latency: {} Priority: {}", node.op, node.latency, node.priority);
        }
    }

    for bundle in schedule.bundles.iter() {
        println!("{}", bundle);
    }

    if cli.count {
        println!("{}", schedule.cycles());
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
