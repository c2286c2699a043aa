use clap::{Parser, Subcommand};
use deskpress::diagnostic::{self, Diagnostic};
use deskpress::pipeline::{self, BuildError};
use deskpress::{config, output};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "deskpress")]
#[command(about = "Static blog generator driven by a Metadesk document")]
#[command(long_about = "\
Static blog generator driven by a Metadesk document

One document declares every post and the page template. Each post's
Markdown is rendered to HTML and substituted into the template.

Site structure:

  blog/
  ├── deskpress.toml          # Optional settings
  ├── posts.mdesk             # Posts and template
  ├── posts/
  │   └── hello.md            # Referenced by a post's `file` field
  └── public/                 # Output: one <name>.html per post

posts.mdesk:

  @post hello:
  {
    title: \"Hello\",
    file: \"posts/hello.md\",
    date: \"2024-01-01\",
  }

  template:
  {
    \"<h1>\" title \"</h1>\" content date
  }

Template names: title, description, content, date.

Run 'deskpress gen-config' to generate a documented deskpress.toml.")]
#[command(version)]
struct Cli {
    /// Site root: holds the document and deskpress.toml
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Render every post to HTML (the default)
    Build,
    /// List posts and where their pages would go
    Scan {
        /// Print the manifest as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate the document and referenced files without writing
    Check,
    /// Print a stock deskpress.toml with all options documented
    GenConfig,
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Document diagnostics go to stdout.
fn print_document_diagnostics(diagnostics: &[Diagnostic]) -> io::Result<()> {
    diagnostic::write_all(&mut io::stdout().lock(), diagnostics)
}

/// Per-post diagnostics go to stderr and never change the exit status.
fn eprint_post_diagnostics<'a>(
    diagnostics: impl Iterator<Item = &'a Diagnostic>,
) -> io::Result<()> {
    diagnostic::write_all(&mut io::stderr().lock(), diagnostics)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let command = cli.command.unwrap_or(Command::Build);
    if let Command::GenConfig = command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let site_config = config::load_config(&cli.root)?;
    tracing::debug!(root = %cli.root.display(), document = %site_config.document.display(), "loaded config");

    match command {
        Command::Build => match pipeline::build(&site_config, &cli.root) {
            Ok(report) => {
                print_document_diagnostics(&report.document_diagnostics)?;
                eprint_post_diagnostics(report.post_diagnostics())?;
                output::print_build_output(&report);
            }
            Err(BuildError::Fatal { diagnostics }) => {
                print_document_diagnostics(&diagnostics)?;
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
        Command::Scan { json } => match pipeline::scan(&site_config, &cli.root) {
            Ok(manifest) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&manifest)?);
                } else {
                    print_document_diagnostics(&manifest.diagnostics)?;
                    output::print_scan_output(&manifest);
                }
            }
            Err(BuildError::Fatal { diagnostics }) => {
                print_document_diagnostics(&diagnostics)?;
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
        Command::Check => {
            println!("==> Checking {}", site_config.document_path(&cli.root).display());
            let diagnostics = pipeline::check(&site_config, &cli.root)?;
            output::print_check_output(&diagnostics);
            if diagnostic::has_errors(&diagnostics) {
                std::process::exit(1);
            }
        }
        Command::GenConfig => {}
    }

    Ok(())
}
