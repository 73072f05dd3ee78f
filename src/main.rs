//! Floating Anchor CLI
//!
//! Usage:
//!   floating-anchor [OPTIONS] [FILE]
//!
//! Options:
//!   -p, --placement <PLACEMENT>  Override the requested placement
//!   -s, --strategy <STRATEGY>    Override the positioning strategy
//!   -f, --format <FORMAT>        Output format (json or text)
//!   -d, --debug                  Log every pipeline reset
//!   -h, --help                   Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use floating_anchor::{ComputedPosition, Placement, PositionRequest, Strategy};

#[derive(Parser)]
#[command(name = "floating-anchor")]
#[command(about = "Compute where a floating element goes next to its reference")]
struct Cli {
    /// Request file in TOML format (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Override the requested placement, e.g. `top` or `right-start`
    #[arg(short, long)]
    placement: Option<String>,

    /// Override the positioning strategy
    #[arg(short, long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Debug mode: log pipeline passes and resets
    #[arg(short, long)]
    debug: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Absolute,
    Fixed,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Absolute => Strategy::Absolute,
            StrategyArg::Fixed => Strategy::Fixed,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn main() {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.debug {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    // Validate the override before reading any input
    let placement = match &cli.placement {
        Some(source) => match source.parse::<Placement>() {
            Ok(placement) => Some(placement),
            Err(e) => {
                eprint!("{}", e.format(source, "--placement"));
                std::process::exit(1);
            }
        },
        None => None,
    };

    // Read input
    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let mut request = match PositionRequest::from_str(&source) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(placement) = placement {
        request = request.with_placement(placement);
    }
    if let Some(strategy) = cli.strategy {
        request = request.with_strategy(strategy.into());
    }

    match request.compute() {
        Ok(position) => print_position(&position, cli.format),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_position(position: &ComputedPosition, format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(position) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing result: {}", e);
                std::process::exit(1);
            }
        },
        OutputFormat::Text => println!(
            "{} x={} y={} strategy={} resets={}",
            position.placement, position.x, position.y, position.strategy, position.resets
        ),
    }
}
