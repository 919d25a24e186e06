//! # polibest
//!
//! Command-line access to the calculator and to saved quotes.
//!
//! ## Usage
//! ```bash
//! # Material estimate for 100 m² of paint on primer
//! cargo run -p polibest-client --bin polibest -- calc --mode paint --area 100 --primer
//!
//! # Floki with matte lacquer, addressed to a client, without contacting the backend
//! cargo run -p polibest-client --bin polibest -- calc --mode floki --area 55 \
//!     --lacquer matte --client "ТОВ Клієнт" --offline
//!
//! # Printable text of a saved quote
//! cargo run -p polibest-client --bin polibest -- preview <quote-id>
//! ```
//!
//! Backend URL and session file come from `client.toml` and the
//! `POLIBEST_*` environment variables.

use std::env;

use polibest_client::{init_tracing, ApiClient, ClientConfig, SessionContext, Workflow};
use polibest_core::calculator::{calculate, CalculatorPrices, CoatingMode, LacquerFinish, SurfaceInput};
use polibest_core::report::{calculator_copy_text, calculator_share_text, quote_preview_text};
use polibest_core::validation::parse_number_or_zero;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn print_help() {
    println!("PoliBest 911 command line");
    println!();
    println!("Usage: polibest <COMMAND> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  calc                 Material estimate for one surface");
    println!("  preview <ID>         Printable text of a saved quote");
    println!();
    println!("calc options:");
    println!("  -m, --mode <MODE>    paint | enamel | floki");
    println!("  -a, --area <M2>      Surface area in m²");
    println!("  -l, --layers <N>     Coats for paint/enamel (default: 2)");
    println!("  -p, --primer         Add primer");
    println!("      --lacquer <F>    glossy | matte (floki only, default: glossy)");
    println!("  -c, --client <NAME>  Address the estimate to a client");
    println!("      --offline        Use built-in prices, skip the backend");
    println!();
    println!("  -h, --help           Show this help message");
}

/// Connects to the backend with the configured session.
async fn connect() -> Result<Workflow, Box<dyn std::error::Error>> {
    let config = ClientConfig::load_or_default(None);
    let session = match config
        .session_file
        .clone()
        .or_else(ClientConfig::default_session_path)
    {
        Some(path) => SessionContext::with_file(path),
        None => SessionContext::new(),
    };
    session.load().await?;

    let api = ApiClient::new(&config, session)?;
    Ok(Workflow::new(api))
}

async fn run_calc(args: &[String]) -> CliResult {
    let mut mode: Option<CoatingMode> = None;
    let mut area = 0.0;
    let mut layers: u8 = 2;
    let mut with_primer = false;
    let mut lacquer = LacquerFinish::Glossy;
    let mut client = String::new();
    let mut offline = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" | "-m" => {
                if i + 1 < args.len() {
                    mode = Some(args[i + 1].parse()?);
                    i += 1;
                }
            }
            "--area" | "-a" => {
                if i + 1 < args.len() {
                    area = parse_number_or_zero(&args[i + 1]);
                    i += 1;
                }
            }
            "--layers" | "-l" => {
                if i + 1 < args.len() {
                    layers = args[i + 1].parse().unwrap_or(2);
                    i += 1;
                }
            }
            "--lacquer" => {
                if i + 1 < args.len() {
                    lacquer = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--client" | "-c" => {
                if i + 1 < args.len() {
                    client = args[i + 1].clone();
                    i += 1;
                }
            }
            "--primer" | "-p" => with_primer = true,
            "--offline" => offline = true,
            other => {
                eprintln!("Unknown option: {}", other);
                print_help();
                return Ok(());
            }
        }
        i += 1;
    }

    let Some(mode) = mode else {
        eprintln!("Choose a coating with --mode paint|enamel|floki");
        return Ok(());
    };

    let prices = if offline {
        CalculatorPrices::default()
    } else {
        connect().await?.load_prices().await
    };

    let input = SurfaceInput::new(mode, area)
        .with_primer(with_primer)
        .with_layers(layers)
        .with_lacquer(lacquer);

    match calculate(&input, &prices) {
        Some(result) if client.is_empty() => println!("{}", calculator_share_text(&input, &result)),
        Some(result) => println!("{}", calculator_copy_text(&input, &result, &client)),
        None => eprintln!("Enter an area greater than 0 m²"),
    }
    Ok(())
}

async fn run_preview(args: &[String]) -> CliResult {
    let Some(id) = args.first() else {
        eprintln!("Usage: polibest preview <ID>");
        return Ok(());
    };

    let workflow = connect().await?;
    let preview = workflow.open_preview(id).await?;
    println!("{}", quote_preview_text(&preview.document()));
    Ok(())
}

#[tokio::main]
async fn main() -> CliResult {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_help();
        return Ok(());
    };

    match command.as_str() {
        "calc" => run_calc(&args[1..]).await,
        "preview" => run_preview(&args[1..]).await,
        _ => {
            print_help();
            Ok(())
        }
    }
}
