use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use tablewiki::batch::{self, BatchReport, BuildEvent};
use tablewiki::categories::CategorySort;
use tablewiki::config::{self, BatchConfig};
use tablewiki::output;
use tablewiki::publish::{DirectoryPublisher, DryRunPublisher, PublishLedger, Publisher};
use tablewiki::sanitize::WikiSanitizer;
use tablewiki::source::{CsvDialect, CsvSource, RowSource};

/// Flags shared by commands that read the whole CSV.
#[derive(clap::Args, Clone)]
struct BatchArgs {
    /// CSV file; the first row holds the column headers
    csv: PathBuf,

    /// Only convert every Nth row (row numbers are kept)
    #[arg(long, value_name = "N")]
    pare: Option<NonZeroUsize>,

    /// TOC category order (overrides cat_sort in the config)
    #[arg(long, value_enum)]
    cat_sort: Option<CategorySort>,

    /// Keep cells containing only "null" instead of treating them as empty
    #[arg(long)]
    null_as_value: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("TABLEWIKI_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("TABLEWIKI_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "tablewiki")]
#[command(about = "Convert each row of a CSV file into a structured wiki page")]
#[command(long_about = "\
Convert each row of a CSV file into a structured wiki page

Every row becomes one page. A section map in the config file describes the
outline shared by all pages; {N} placeholders pull in column N (1-based).

Example tablewiki.toml:

  title_tmpl = \"Entry_{0}_{1}\"      # {0} is the zero-padded row number
  toc_name = \"List_of_Entries\"
  cat_col = 3                        # column holding each row's category
  sec_map = \"\"\"
  . Applicant {1}                    # level-1 section, title from header 1
  | {1}                              # content: cell 1 of the row
  . Contents
  | __TOC__
  . Proposal
  .. Executive Summary               # level-2 section
  | {12}
  \"\"\"

After the last row a table-of-contents page is generated, listing every page
by category, plus one Category:NAME page per category.

Run 'tablewiki columns FILE.csv' to see column numbers, and
'tablewiki gen-config' for a documented config file.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, short, default_value = "tablewiki.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate one page per row, the TOC page, and the category pages
    Build {
        #[command(flatten)]
        batch: BatchArgs,

        /// Write framed pages to stdout instead of the output directory
        #[arg(long)]
        dry_run: bool,

        /// Directory receiving one .wiki file per page
        #[arg(long, short, default_value = "pages")]
        output: PathBuf,

        /// Suppress progress messages
        #[arg(long, short)]
        quiet: bool,
    },
    /// Validate the config and CSV and preview the page outline
    Check(BatchArgs),
    /// Print the CSV's column headers, numbered
    Columns {
        /// CSV file
        csv: PathBuf,
    },
    /// Print a stock tablewiki.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            batch: args,
            dry_run,
            output: out_dir,
            quiet,
        } => {
            let config = load_batch_config(&cli.config, &args)?;
            let source = CsvSource::open(&args.csv, config.csv.dialect()?)?;

            if dry_run {
                // Pages own stdout; progress goes to stderr.
                let publisher = DryRunPublisher::new(std::io::stdout().lock());
                run_build(&source, &config, publisher, args.pare, quiet, true)?;
            } else {
                let publisher = DirectoryPublisher::new(&out_dir)?;
                let report = run_build(&source, &config, publisher, args.pare, quiet, false)?;
                let json = serde_json::to_string_pretty(&report)?;
                std::fs::write(out_dir.join("manifest.json"), json)?;
                if !quiet {
                    output::print_report(&report);
                    println!("==> Build complete: {}", out_dir.display());
                }
            }
        }
        Command::Check(args) => {
            let config = load_batch_config(&cli.config, &args)?;
            println!("==> Checking {}", args.csv.display());
            let source = CsvSource::open(&args.csv, config.csv.dialect()?)?;
            let report = batch::check(
                &source,
                &config,
                WikiSanitizer::new(config.null_as_value),
                args.pare,
            )?;
            output::print_check(&report);
            println!("==> Config and CSV are valid");
        }
        Command::Columns { csv } => {
            let dialect = columns_dialect(&cli.config)?;
            let source = CsvSource::open(&csv, dialect)?;
            output::print_columns(source.headers());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file and apply command-line overrides.
fn load_batch_config(
    path: &Path,
    args: &BatchArgs,
) -> Result<BatchConfig, Box<dyn std::error::Error>> {
    let mut config = config::load_config(path)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    if let Some(sort) = args.cat_sort {
        config.cat_sort = sort;
    }
    if args.null_as_value {
        config.null_as_value = true;
    }
    Ok(config)
}

/// `columns` works without a config; one is only consulted for its CSV dialect.
fn columns_dialect(path: &Path) -> Result<CsvDialect, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Ok(CsvDialect::default());
    }
    Ok(config::load_config(path)?.csv.dialect()?)
}

fn run_build<P: Publisher>(
    source: &CsvSource,
    config: &BatchConfig,
    publisher: P,
    pare: Option<NonZeroUsize>,
    quiet: bool,
    to_stderr: bool,
) -> Result<BatchReport, Box<dyn std::error::Error>> {
    let mut ledger = PublishLedger::new(publisher, &config.generator_url);
    let (events, printer) = if quiet {
        (None, None)
    } else {
        let (tx, handle) = spawn_printer(to_stderr);
        (Some(tx), Some(handle))
    };

    let report = batch::run_batch(
        source,
        config,
        WikiSanitizer::new(config.null_as_value),
        &mut ledger,
        pare,
        events,
    )?;
    if let Some(printer) = printer {
        printer.join().unwrap();
    }
    Ok(report)
}

/// Progress printer thread; exits once every sender is dropped.
fn spawn_printer(to_stderr: bool) -> (Sender<BuildEvent>, JoinHandle<()>) {
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_event(&event) {
                if to_stderr {
                    eprintln!("{}", line);
                } else {
                    println!("{}", line);
                }
            }
        }
    });
    (tx, printer)
}
