//! Konzertarchiv command-line interface.
//!
//! Usage:
//!   konzertarchiv --endpoint http://localhost:3030/archive/sparql run all --verify
//!   konzertarchiv --data archive.trig compare
//!   konzertarchiv cue ./rips --recursive

use clap::{ArgAction, Parser, Subcommand};
use konzertarchiv::checks;
use konzertarchiv::comparison;
use konzertarchiv::config::{ConfigOverrides, RunnerConfig};
use konzertarchiv::parsing::cue_parser::{discover_cue_files, CueParser};
use konzertarchiv::queries::NamedQuery;
use konzertarchiv::querying::http_endpoint::{HttpEndpoint, QueryTransport};
use konzertarchiv::querying::query_processing::QueryRunner;
use konzertarchiv::querying::AnyEngine;
use konzertarchiv::results::render::{render, OutputFormat};
use konzertarchiv::{ResultSet, RunnerError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "konzertarchiv")]
#[command(about = "Cross-reference New Year's Concert recordings with programme archives", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// SPARQL query endpoint URL
    #[arg(long, global = true, env = "KONZERTARCHIV_ENDPOINT")]
    endpoint: Option<String>,

    /// Evaluate locally against these RDF files instead of an endpoint
    #[arg(long = "data", global = true, value_name = "FILE")]
    data: Vec<PathBuf>,

    #[arg(long, global = true, value_enum)]
    transport: Option<QueryTransport>,

    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Bearer token for the endpoint
    #[arg(long, global = true, env = "KONZERTARCHIV_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Base IRI for relative graph names; pass "" to let the endpoint resolve them
    #[arg(long, global = true)]
    base_iri: Option<String>,

    /// Directory with edited copies of the .rq files
    #[arg(long, global = true)]
    query_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Debug logging, same as -vv
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the archive queries
    List,
    /// Print a query as it would be sent
    Show { query: String },
    /// Run one query, or `all`
    Run {
        query: String,
        /// Check the returned rows against the query's guarantees
        #[arg(long)]
        verify: bool,
    },
    /// Compare recorded years and titles with the programme archive
    Compare,
    /// Check that the endpoint answers
    Ping,
    /// Parse cue sheets and print them as JSON
    Cue {
        path: PathBuf,
        /// Search the path recursively for .cue files
        #[arg(short, long)]
        recursive: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();
}

fn load_config(args: &Args) -> Result<RunnerConfig, RunnerError> {
    let base = match &args.config {
        Some(path) => RunnerConfig::from_file(path)?,
        None => RunnerConfig::default(),
    };
    Ok(base.merge(ConfigOverrides {
        endpoint: args.endpoint.clone(),
        transport: args.transport,
        timeout_secs: args.timeout_secs,
        auth_token: args.token.clone(),
        base_iri: args.base_iri.clone(),
        query_dir: args.query_dir.clone(),
        data_files: args.data.clone(),
        format: args.format,
    }))
}

fn print_results(
    query: NamedQuery,
    results: &ResultSet,
    format: OutputFormat,
    verify: bool,
) -> Result<bool, RunnerError> {
    println!("{}", render(results, format)?);
    if !verify {
        return Ok(true);
    }

    let violations = checks::verify(query, results);
    for violation in &violations {
        eprintln!("violation: {}", violation);
    }
    Ok(violations.is_empty())
}

async fn run(args: Args) -> Result<bool, RunnerError> {
    let config = load_config(&args)?;

    match args.command {
        Command::List => {
            for query in NamedQuery::ALL {
                println!(
                    "{:<22} {:<26} ?{}",
                    query.name(),
                    query.file_name(),
                    query.projected_variables().join(" ?")
                );
            }
            Ok(true)
        }
        Command::Show { query } => {
            let query: NamedQuery = query.parse()?;
            println!("{}", config.catalog().text(query)?);
            Ok(true)
        }
        Command::Run { query, verify } => {
            let runner = QueryRunner::with_catalog(config.build_engine()?, config.catalog());
            if query.eq_ignore_ascii_case("all") {
                let mut ok = true;
                for (named, outcome) in runner.execute_all().await {
                    println!("# {}", named);
                    match outcome {
                        Ok(results) => ok &= print_results(named, &results, config.format, verify)?,
                        Err(e) => {
                            eprintln!("{} failed: {}", named, e);
                            ok = false;
                        }
                    }
                }
                Ok(ok)
            } else {
                let named: NamedQuery = query.parse()?;
                let results = runner.execute(named).await?;
                print_results(named, &results, config.format, verify)
            }
        }
        Command::Compare => {
            let runner = QueryRunner::with_catalog(config.build_engine()?, config.catalog());
            let (recordings, programmes) = futures_util::future::join(
                runner.execute(NamedQuery::NewYearsReleases),
                runner.execute(NamedQuery::NewYearsProgrammes),
            )
            .await;
            let report = comparison::compare(&recordings?, &programmes?);
            match config.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                _ => print!("{}", report),
            }
            Ok(true)
        }
        Command::Ping => match config.build_engine()? {
            AnyEngine::Http(engine) => {
                let up = ping(&engine).await;
                println!("{}: {}", engine.endpoint().url, if up { "reachable" } else { "unreachable" });
                Ok(up)
            }
            AnyEngine::Local(_) => {
                println!("local data files loaded");
                Ok(true)
            }
        },
        Command::Cue { path, recursive } => {
            let parser = CueParser::new()?;
            let files = discover_cue_files(&path, recursive)?;
            let sheets = files
                .iter()
                .map(|file| parser.parse_file(file))
                .collect::<Result<Vec<_>, _>>()?;
            println!("{}", serde_json::to_string_pretty(&sheets)?);
            Ok(true)
        }
    }
}

async fn ping(engine: &HttpEndpoint) -> bool {
    match engine.ping().await {
        Ok(up) => up,
        Err(e) => {
            tracing::warn!(error = %e, "ping failed");
            false
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let verbose = if args.debug { args.verbose.max(2) } else { args.verbose };
    init_logging(verbose);

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error [{}]: {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}
