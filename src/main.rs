/*!
 * Command-line interface for projtree
 */

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;
use tracing::{debug, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use projtree::config::{Cli, Command, Config, ModifyArgs, OverviewArgs, SearchArgs};
use projtree::report::{search_hits, write_search, Reporter, TreeStyle};
use projtree::scanner::{ScanOptions, Scanner};
use projtree::tokenizer::create_tokenizer;
use projtree::tools::command_contracts;
use projtree::writer::JsonWriter;
use projtree::{mutate, Result};

fn main() -> ExitCode {
    // Parse command line arguments
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Send logs to stderr; RUST_LOG wins over --verbose
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .try_init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Overview(args) => overview(&args),
        Command::Search(args) => search(&args),
        Command::Modify(args) => modify(&args),
        Command::Tools => tools(),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "projtree", &mut io::stdout());
            Ok(())
        }
    }
}

fn overview(args: &OverviewArgs) -> Result<()> {
    let config = Config::from_overview(args);
    config.validate()?;

    let options = args.scan_options();
    let scanner = build_scanner(&config, &options)?;

    let result = scanner.scan(&options)?;
    debug!("Scan complete, {} tokens in total", result.total_tokens);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let reporter = Reporter::new(TreeStyle {
        tokens: args.tokens,
        content: args.content,
    });
    reporter.write_tree(&result.root, &mut out)?;

    if args.large > 0 {
        writeln!(out)?;
        writeln!(out, "{}", reporter.render_largest(&result.largest, args.large))?;
    }

    if let Some(dump_file) = &config.dump_file {
        let writer = JsonWriter::new(dump_file);
        let count = writer.write(&result.dump)?;
        writeln!(
            out,
            "Wrote {} records to {}",
            count,
            writer.output_file().display()
        )?;
    }

    Ok(())
}

fn search(args: &SearchArgs) -> Result<()> {
    let config = Config::from_search(args);
    config.validate()?;

    let options = ScanOptions::search(args.pattern.as_str());
    let scanner = build_scanner(&config, &options)?;

    let result = scanner.scan(&options)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let hits = write_search(
        search_hits(&result.root),
        &config.target_dir,
        &mut out,
    )?;
    debug!("{} files contain {:?}", hits, args.pattern);

    Ok(())
}

fn modify(args: &ModifyArgs) -> Result<()> {
    let path = Path::new(&args.file_path);
    mutate::overwrite(path, &args.joined_content())?;
    println!("Modified {}", args.file_path);
    Ok(())
}

fn tools() -> Result<()> {
    let contracts = command_contracts(&Cli::command());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &contracts)?;
    writeln!(out)?;
    Ok(())
}

/// Configure the thread pool, the progress spinner and the scanner
///
/// The scanner clears the spinner when its scan returns.
fn build_scanner(config: &Config, options: &ScanOptions) -> Result<Scanner> {
    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        warn!("Failed to set thread pool size: {}", e);
    }

    let matcher = config.ignore_matcher()?;
    let tokenizer = if options.needs_tokens() {
        Some(create_tokenizer(config.model)?)
    } else {
        None
    };

    let progress = Arc::new(ProgressBar::new_spinner());
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {pos} files {wide_msg:.dim.white}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress.set_prefix("Scanning");
    progress.set_message(config.target_dir.display().to_string());

    let scanner = Scanner::new(config.clone(), matcher, progress);
    Ok(match tokenizer {
        Some(tokenizer) => scanner.with_tokenizer(tokenizer),
        None => scanner,
    })
}
