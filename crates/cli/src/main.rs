//! CLI tool for extracting plain text from PDF and office documents.

mod dispatch;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use dispatch::{DispatchConfig, Dispatcher};
use doctext_core::{interesting_words, ErrorKind, LineEnding, TextNormalizer};
use doctext_office::OfficeLauncher;
use doctext_sheet::SheetLayout;
use report::RunReport;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

/// Extract plain text from a PDF, Word, Excel or PowerPoint document.
#[derive(Parser, Debug)]
#[command(name = "doctext")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input document (.pdf, .doc, .docx, .xls, .xlsx, .ppt or .pptx)
    input: PathBuf,

    /// Output text file; pass "" to print the text instead
    output: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the words longer than three characters after extraction
    #[arg(long)]
    words: bool,

    /// Print a JSON run report to stdout
    #[arg(long)]
    json: bool,

    /// Spreadsheet field delimiter ("tab" or "\t" for a tab)
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: char,

    /// Office application used for .doc/.ppt conversion
    #[arg(long, value_name = "PATH", default_value = "soffice")]
    office_program: PathBuf,

    /// Give up on the office application after this many seconds
    #[arg(long, value_name = "SECONDS")]
    office_timeout: Option<u64>,
}

impl Args {
    fn output_path(&self) -> Option<&Path> {
        (!self.output.is_empty()).then(|| Path::new(&self.output))
    }

    fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            launcher: OfficeLauncher::new()
                .with_program(&self.office_program)
                .with_timeout(self.office_timeout.map(Duration::from_secs)),
            sheet: SheetLayout::new().with_delimiter(self.delimiter),
        }
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version are not errors
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let kind = e
                .downcast_ref::<doctext_core::Error>()
                .map(doctext_core::Error::kind)
                .unwrap_or(ErrorKind::ExtractionFailed);
            ExitCode::from(kind.exit_code() as u8)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let started = Instant::now();
    let output = args.output_path();

    if args.verbose {
        eprintln!("Processing: {}", args.input.display());
    }

    let dispatcher = Dispatcher::new(args.dispatch_config());
    let outcome = dispatcher.extract(&args.input, output);
    let elapsed = started.elapsed();

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    if args.json {
        let report = RunReport::new(&args.input, output, &outcome, args.words, elapsed);
        writeln!(stdout, "{}", report.to_json().context("Failed to encode run report")?)?;
    }

    let extraction = outcome?;

    if !args.json {
        if output.is_none() {
            let text = TextNormalizer::new().to_file_content(&extraction.text, LineEnding::platform());
            stdout.write_all(text.as_bytes())?;
        }
        if args.words {
            for word in interesting_words(&extraction.text) {
                writeln!(stdout, "{}", word)?;
            }
        }
    }
    stdout.flush()?;

    if args.verbose {
        if let Some(path) = output {
            eprintln!("Written to: {}", path.display());
        }
    }
    eprintln!("Done. Took {:.2?}", elapsed);

    Ok(())
}

/// Parse the `--delimiter` value.
fn parse_delimiter(value: &str) -> std::result::Result<char, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok('\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(format!(
                    "'{}' is not a single character (use \"tab\" for a tab)",
                    value
                )),
            }
        }
    }
}
