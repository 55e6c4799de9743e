use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use casequill::config::Config;
use casequill::document::node::CaseValue;
use casequill::document::parser::{to_pretty_json, to_pretty_json_array};
use casequill::document::template::{default_template, load_template};
use casequill::engine::blank;
use casequill::file::loader::load_cases_file;
use casequill::input::commands::{render_fields, render_list};
use casequill::input::{execute, parse_command, Outcome};
use casequill::session::export::{copy_export, export_to_file, CopyOutcome, SystemClipboard};
use casequill::session::{Message, MessageLevel, Session};

/// casequill - edit, blank and clean JSON test cases
#[derive(Parser)]
#[command(name = "casequill")]
#[command(version)]
#[command(about = "Edit, blank and clean JSON test cases for a health-score API", long_about = None)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Spaces per indentation level in output (overrides config)
    #[arg(long, global = true)]
    indent: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cleaned, non-empty test cases as a JSON array
    Clean {
        /// Input file, or - for stdin
        file: String,
    },
    /// Print a blank template of every test case
    Blank {
        /// Input file, or - for stdin
        file: String,
    },
    /// Report which test cases are empty
    Check {
        /// Input file, or - for stdin
        file: String,
    },
    /// Show the editable fields of one test case
    Fields {
        /// Input file, or - for stdin
        file: String,

        /// Test case number, starting at 1
        #[arg(short = 'n', long, default_value_t = 1)]
        case: usize,
    },
    /// Write the cleaned test cases to a file and optionally the clipboard
    Export {
        /// Input file, or - for stdin
        file: String,

        /// Output file (default from config: test_cases.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also copy the payload to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Print the blank default template
    Template,
    /// Edit test cases with line commands read from stdin
    Session {
        /// File to start from
        file: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("casequill=debug,warn")
    } else {
        EnvFilter::new("casequill=warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut config = Config::load();
    // CLI indent overrides config indent
    if let Some(indent) = cli.indent {
        config.indent_size = indent;
    }
    let template = resolve_template(&config);

    match cli.command {
        Commands::Clean { file } => {
            let session = open_session(&file, &config, &template)?;
            match session.export_payload() {
                Some(payload) => println!("{}", payload),
                None => bail!("No non-empty test cases in {}", file),
            }
        }
        Commands::Blank { file } => {
            let cases = load_cases_file(&file)?;
            let blanks: Vec<CaseValue> = cases.iter().map(blank).collect();
            println!("{}", to_pretty_json_array(&blanks, config.indent_size));
        }
        Commands::Check { file } => {
            let session = open_session(&file, &config, &template)?;
            println!("{}", render_list(&session));
            let ready = session.exportable_count();
            println!("{} of {} test case(s) ready to export", ready, session.len());
            if ready == 0 {
                bail!("Nothing to export");
            }
        }
        Commands::Fields { file, case } => {
            if case == 0 {
                bail!("Test case numbers start at 1");
            }
            let session = open_session(&file, &config, &template)?;
            println!("{}", render_fields(&session, case - 1)?);
        }
        Commands::Export { file, output, copy } => {
            let mut session = open_session(&file, &config, &template)?;
            let summary = export_to_file(&mut session, output.as_deref())?;
            eprintln!(
                "Exported {} test case(s) to {}",
                summary.cases,
                summary.path.display()
            );
            if copy {
                match copy_export(&mut session, None, &mut SystemClipboard)? {
                    CopyOutcome::Copied { cases } => {
                        eprintln!("Copied {} test case(s) to clipboard", cases)
                    }
                    CopyOutcome::Fallback { payload, reason } => {
                        eprintln!("Copy failed ({}). Please copy manually:", reason);
                        println!("{}", payload);
                    }
                }
            }
        }
        Commands::Template => {
            println!("{}", to_pretty_json(&blank(&template), config.indent_size));
        }
        Commands::Session { file } => {
            let session = match file {
                Some(file) => open_session(&file, &config, &template)?,
                None => Session::new(config.clone()).with_template(template),
            };
            run_session(session)?;
        }
    }

    Ok(())
}

/// Uses the configured template when it loads, the built-in one otherwise.
fn resolve_template(config: &Config) -> CaseValue {
    match &config.template {
        Some(path) => match load_template(path) {
            Ok(template) => template,
            Err(e) => {
                tracing::warn!("Using built-in template: {:#}", e);
                default_template()
            }
        },
        None => default_template(),
    }
}

fn open_session(file: &str, config: &Config, template: &CaseValue) -> Result<Session> {
    let cases = load_cases_file(file)?;
    Ok(Session::with_documents(cases, config.clone()).with_template(template.clone()))
}

fn print_message(message: &Message) {
    match message.level {
        MessageLevel::Info => println!("{}", message.text),
        MessageLevel::Warning => eprintln!("warning: {}", message.text),
        MessageLevel::Error => eprintln!("error: {}", message.text),
    }
}

/// Reads commands from stdin until EOF or `quit`.
fn run_session(mut session: Session) -> Result<()> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut clipboard = SystemClipboard;
    let mut stdout = io::stdout();

    if interactive {
        println!("casequill session - {} test case(s). Type `help` for commands.", session.len());
    }

    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            write!(stdout, "casequill> ")?;
            stdout.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("error: {}", e);
                continue;
            }
        };

        match execute(&command, &mut session, &mut clipboard) {
            Ok(Outcome::Quit) => break,
            Ok(Outcome::Print(text)) => println!("{}", text),
            Ok(Outcome::Continue) => {}
            Err(e) => {
                // The session message repeats the same error
                session.clear_message();
                eprintln!("error: {:#}", e);
                continue;
            }
        }

        if let Some(message) = session.message() {
            print_message(message);
        }
        session.clear_message();
    }

    Ok(())
}
