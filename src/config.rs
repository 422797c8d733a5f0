/*!
 * Configuration handling for projtree
 */

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::ensure;
use crate::error::Result;
use crate::filter::IgnoreMatcher;
use crate::scanner::ScanOptions;
use crate::tokenizer::Model;

/// Command-line interface for projtree
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "projtree",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect a project tree: structure, token counts, contents, search and JSON dumps",
    long_about = "Walks a project directory while honouring its .gitignore and prints the tree, per-file token counts, file contents, search hits or a JSON dump of every text file."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,

    /// Enable verbose logging (sets log level to DEBUG)
    #[clap(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the directory structure, optionally with token counts, contents, the largest files and a JSON dump
    Overview(OverviewArgs),

    /// Search for a literal pattern in the entire project
    Search(SearchArgs),

    /// Overwrite a file with new content
    Modify(ModifyArgs),

    /// Print the command contract used by agent adapters as JSON
    Tools,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[clap(value_enum)]
        shell: Shell,
    },
}

// Flags shared by every command that walks a tree
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Comma-separated list of extra gitignore-style patterns to exclude
    #[clap(long, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Path to an ignore file used instead of <directory>/.gitignore
    #[clap(long)]
    pub gitignore_path: Option<String>,

    /// Model whose tokenizer is used for token counts
    #[clap(long, value_enum, default_value_t = Model::default())]
    pub model: Model,

    /// Number of threads used to classify and tokenize files
    #[clap(long, default_value = "4")]
    pub threads: usize,
}

// Arguments of the `overview` command
#[derive(Args, Debug, Clone)]
pub struct OverviewArgs {
    /// Directory to inspect
    pub directory: String,

    /// Show per-file token counts and per-folder totals
    #[clap(long)]
    pub tokens: bool,

    /// Show the contents of every text file
    #[clap(long)]
    pub content: bool,

    /// Also list the N files with the most tokens
    #[clap(long, value_name = "N", default_value = "0")]
    pub large: usize,

    /// Write a JSON dump of every text file to PATH
    #[clap(long, value_name = "PATH")]
    pub dump: Option<String>,

    #[clap(flatten)]
    pub scan: ScanArgs,
}

impl OverviewArgs {
    /// Walk options implied by the requested report
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            count_tokens: self.tokens,
            keep_content: self.content,
            largest: self.large,
            collect_dump: self.dump.is_some(),
            pattern: None,
        }
    }
}

// Arguments of the `search` command
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Directory to search
    pub directory: String,

    /// Literal text to look for
    pub pattern: String,

    #[clap(flatten)]
    pub scan: ScanArgs,
}

// Arguments of the `modify` command
#[derive(Args, Debug, Clone)]
pub struct ModifyArgs {
    /// File to overwrite
    pub file_path: String,

    /// New content, words are joined with single spaces
    #[clap(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub content: Vec<String>,
}

impl ModifyArgs {
    /// The content to write
    pub fn joined_content(&self) -> String {
        self.content.join(" ")
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Target directory to process, as given on the command line
    pub target_dir: PathBuf,

    /// Extra patterns to ignore
    pub ignore_patterns: Vec<String>,

    /// Path to custom .gitignore file
    pub gitignore_path: Option<PathBuf>,

    /// Model used for tokenization
    pub model: Model,

    /// Number of threads to use for processing
    pub num_threads: usize,

    /// JSON dump target, if requested
    pub dump_file: Option<PathBuf>,
}

impl Config {
    /// Create configuration from the shared scan flags
    pub fn from_scan_args(directory: &str, args: &ScanArgs) -> Self {
        Self {
            target_dir: PathBuf::from(directory),
            ignore_patterns: args.ignore.clone(),
            gitignore_path: args.gitignore_path.as_ref().map(PathBuf::from),
            model: args.model,
            num_threads: args.threads,
            dump_file: None,
        }
    }

    /// Create configuration for the `overview` command
    pub fn from_overview(args: &OverviewArgs) -> Self {
        Self {
            dump_file: args.dump.as_ref().map(PathBuf::from),
            ..Self::from_scan_args(&args.directory, &args.scan)
        }
    }

    /// Create configuration for the `search` command
    pub fn from_search(args: &SearchArgs) -> Self {
        Self::from_scan_args(&args.directory, &args.scan)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.target_dir.is_dir(),
            PathNotFound,
            "Target directory not found: {}",
            self.target_dir.display()
        );

        // Check if dump file directory exists
        if let Some(parent) = self.dump_file.as_deref().and_then(Path::parent) {
            ensure!(
                parent.as_os_str().is_empty() || parent.is_dir(),
                PathNotFound,
                "Output directory not found: {}",
                parent.display()
            );
        }

        // Check if custom gitignore file exists
        if let Some(path) = &self.gitignore_path {
            ensure!(
                path.is_file(),
                PathNotFound,
                "Custom .gitignore file not found: {}",
                path.display()
            );
        }

        ensure!(
            self.num_threads > 0,
            InvalidArgument,
            "--threads must be at least 1"
        );

        Ok(())
    }

    /// Build the ignore matcher for the target directory
    pub fn ignore_matcher(&self) -> Result<IgnoreMatcher> {
        let mut builder =
            IgnoreMatcher::builder(&self.target_dir).patterns(self.ignore_patterns.iter().cloned());
        if let Some(path) = &self.gitignore_path {
            builder = builder.ignore_file(path);
        }
        builder.build()
    }
}
