use clap::{Parser, Subcommand};
use contact_sheet::{config, output, process, scan};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contact-sheet")]
#[command(about = "Builds thumbnails, web derivatives and a JSON catalog for a photo gallery")]
#[command(long_about = "\
Builds thumbnails, web derivatives and a JSON catalog for a photo gallery

Photos are read from the public directory; the first subdirectory is the
category. Everything else is generated.

Project structure:

  project/
  ├── contact-sheet.toml           # Optional config (see gen-config)
  ├── public/
  │   ├── photos/                  # Sources (read-only)
  │   │   ├── landscape/dawn.jpg   # Web-safe: served as-is
  │   │   ├── street/market.heic   # Converted with sips or heif-convert
  │   │   └── trip/IMG_0042.CR2    # Converted with sips or exiftool preview
  │   ├── thumbnails/              # Generated, one per photo
  │   └── optimized/               # Generated, non-web-safe photos only
  └── src/data/photos.json         # Generated catalog

Run 'contact-sheet gen-config' to print a documented contact-sheet.toml.")]
#[command(version)]
struct Cli {
    /// Project directory
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate derivatives and write the catalog
    Build {
        /// Ignore the derivative cache and re-encode everything
        #[arg(long)]
        no_cache: bool,
    },
    /// List discovered photos with their format tier and conversion strategy
    Check,
    /// Print a stock contact-sheet.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build { no_cache } => {
            let config = config::load_config(&cli.project)?;
            let options = process::RunOptions {
                use_cache: !no_cache,
            };
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::run(&cli.project, &config, &options, Some(tx));
            // The sender is dropped by now, so the printer drains and exits.
            if printer.join().is_err() {
                tracing::warn!("progress printer panicked");
            }
            let report = result?;
            println!();
            output::print_summary(&report);
        }
        Command::Check => {
            let config = config::load_config(&cli.project)?;
            let paths = config.paths.resolve(&cli.project);
            println!("==> Checking {}", paths.photos.display());
            let files = scan::scan(&paths.photos, &config.catalog.fallback_category)?;
            output::print_check_output(&files, config.tools.platform.resolve());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `warn`, raised by each `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
