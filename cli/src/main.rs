//! docfmt CLI - Word document formatting tool
//!
//! A command-line tool for reformatting DOCX files with consistent
//! styles, spacing, and page margins.

mod update;

use clap::{Parser, Subcommand};
use colored::*;
use docfmt::RoleCounts;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Automatic formatting for Microsoft Word documents
#[derive(Parser)]
#[command(
    name = "docfmt",
    author = "iyulab",
    version,
    about = "Format Word documents automatically",
    long_about = "docfmt - Automatic Word document formatting tool.\n\n\
                  Classifies every paragraph (title, heading, caption, body) and rewrites\n\
                  the document with consistent fonts, spacing, alignment and page margins."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format a document
    #[command(visible_alias = "fmt")]
    Format {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: formatted_<name> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify paragraphs and report labels as JSON
    Labels {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Show document information and metadata
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Update docfmt to the latest version
    Update {
        /// Check only, don't install
        #[arg(long)]
        check: bool,

        /// Force update even if on latest version
        #[arg(long)]
        force: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Format {
            input,
            output,
            json,
        } => {
            let pb = create_spinner("Formatting document...");

            let output = output.unwrap_or_else(|| default_output_path(&input));
            let summary = docfmt::format_file(&input, &output)?;

            pb.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{} Formatted: {}", "✓".green().bold(), output.display());
                println!(
                    "  {} paragraphs ({}), {} empty removed",
                    summary.paragraphs,
                    describe_counts(&summary.counts),
                    summary.removed_empty
                );
            }
        }

        Commands::Labels {
            input,
            output,
            compact,
        } => {
            let pb = create_spinner("Classifying paragraphs...");

            let report = docfmt::label_file(&input)?;

            let json = if compact {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };

            pb.finish_and_clear();
            write_output(output.as_ref(), &json)?;

            if output.is_some() {
                println!(
                    "{} Labeled {} paragraphs: {}",
                    "✓".green().bold(),
                    report.paragraphs.len(),
                    output.unwrap().display()
                );
            }
        }

        Commands::Info { input } => {
            let pb = create_spinner("Analyzing document...");

            let data = fs::read(&input)?;
            let format = docfmt::detect_format_from_bytes(&data)?;
            docfmt::detect::ensure_docx(&data)?;
            let doc = docfmt::docx::DocxReader::from_bytes(data)?.parse()?;
            let report = docfmt::Formatter::new().label_document(&doc);

            pb.finish_and_clear();

            println!("{}", "Document Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Format".bold(), format.name());

            if let Some(ref title) = doc.metadata.title {
                println!("{}: {}", "Title".bold(), title);
            }
            if let Some(ref author) = doc.metadata.author {
                println!("{}: {}", "Author".bold(), author);
            }
            if let Some(ref by) = doc.metadata.last_modified_by {
                println!("{}: {}", "Last modified by".bold(), by);
            }
            if let Some(ref created) = doc.metadata.created {
                println!("{}: {}", "Created".bold(), created);
            }
            if let Some(ref modified) = doc.metadata.modified {
                println!("{}: {}", "Modified".bold(), modified);
            }

            let text = doc.plain_text();
            let word_count = text.split_whitespace().count();
            let char_count = text.len();
            println!("\n{}", "Content Statistics".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Paragraphs".bold(), doc.paragraph_count());
            println!("{}: {}", "Words".bold(), word_count);
            println!("{}: {}", "Characters".bold(), char_count);

            if report.summary.total() > 0 {
                println!("\n{}", "Classification".cyan().bold());
                println!("{}", "─".repeat(40));
                let counts = &report.summary;
                if counts.title > 0 {
                    println!("{}: {}", "Title".bold(), counts.title);
                }
                if counts.heading > 0 {
                    println!("{}: {}", "Headings".bold(), counts.heading);
                }
                if counts.caption > 0 {
                    println!("{}: {}", "Captions".bold(), counts.caption);
                }
                if counts.body > 0 {
                    println!("{}: {}", "Body".bold(), counts.body);
                }
            }
        }

        Commands::Update { check, force } => {
            if let Err(e) = update::run_update(check, force) {
                eprintln!("{}: {}", "Error".red().bold(), e);
                std::process::exit(1);
            }
        }

        Commands::Version => {
            let rx = update::check_update_async();
            print_version();
            if let Some(result) = update::try_get_update_result(&rx) {
                update::print_update_notification(&result);
            }
        }
    }

    Ok(())
}

fn print_version() {
    println!("{} {}", "docfmt".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Automatic formatting for Microsoft Word documents");
    println!();
    println!("Supported formats: DOCX");
    println!("Repository: https://github.com/iyulab/docfmt");
}

/// Default output path: `formatted_<name>` next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let name = input.file_name().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("formatted_{}", name))
}

fn describe_counts(counts: &RoleCounts) -> String {
    let mut parts = Vec::new();
    if counts.title > 0 {
        parts.push(format!("{} title", counts.title));
    }
    if counts.heading > 0 {
        parts.push(format!("{} heading", counts.heading));
    }
    if counts.caption > 0 {
        parts.push(format!("{} caption", counts.caption));
    }
    if counts.body > 0 {
        parts.push(format!("{} body", counts.body));
    }
    if parts.is_empty() {
        "no classified paragraphs".to_string()
    } else {
        parts.join(", ")
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
