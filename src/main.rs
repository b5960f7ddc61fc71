use clap::{Parser, Subcommand};
use fuelplan::api::{run_api_server, server::ApiConfig};
use fuelplan::cli::{self, ConfigArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fuelplan")]
#[command(about = "Fuel distribution plan dashboard for the Pacific zone terminals")]
#[command(long_about = "Fuelplan - Fuel distribution plan dashboard

Finds the plan workbook (file name containing PACIFICO), extracts the
DESTINO table from every terminal sheet, aggregates volumes by terminal,
product and destination, and keeps a daily gzip CSV snapshot.

COMMANDS:
  load      - Load the plan workbook and print the KPIs
  serve     - Run the dashboard HTTP server
  export    - Write an Excel report of the aggregated plan
  snapshot  - Summarize a historical snapshot file

EXAMPLES:
  fuelplan load                                # Search ./data then .
  fuelplan load -d planes --no-snapshot -v
  fuelplan serve --port 8050                   # Dashboard at /dashboard
  fuelplan export reporte.xlsx --input \"BASE PACIFICO.xlsx\"
  fuelplan snapshot historico/historico_01.05.2026.csv.gz")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Load the plan workbook and print the KPIs.

Sheets that are missing, unreadable or lack a DESTINO table are skipped.
The load fails only when the workbook is not found or no terminal yields
data. A snapshot that cannot be written is reported but does not fail
the load.")]
    /// Load the plan workbook and print the KPIs
    Load {
        #[command(flatten)]
        config: ConfigArgs,

        /// Show skipped sheets and per-destination volumes
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the dashboard HTTP server
    Serve {
        #[command(flatten)]
        config: ConfigArgs,

        /// Host address to bind to (use 0.0.0.0 for all interfaces)
        #[arg(short = 'H', long, default_value = "127.0.0.1", env = "FUELPLAN_HOST")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8050", env = "FUELPLAN_PORT")]
        port: u16,

        /// Load the plan workbook once at startup instead of waiting for POST /api/v1/load
        #[arg(long)]
        initial_load: bool,
    },

    /// Write an Excel report of the aggregated plan
    Export {
        /// Output Excel file (.xlsx)
        output: PathBuf,

        /// Plan workbook to read (default: search like `load`)
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,

        /// Show verbose export steps
        #[arg(short, long)]
        verbose: bool,
    },

    /// Summarize a historical snapshot file
    Snapshot {
        /// Snapshot file (historico_DD.MM.YYYY.csv.gz)
        file: PathBuf,

        /// Show per-destination volumes
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Logs go to stderr so they never mix with command output
fn init_logging(verbose: bool) {
    let default = if verbose { "fuelplan=debug" } else { "fuelplan=warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Load { config, verbose } => {
            init_logging(verbose);
            cli::load(&config.resolve()?, verbose)?;
        }

        Commands::Serve {
            config,
            host,
            port,
            initial_load,
        } => {
            let dashboard = config.resolve()?;
            let api = ApiConfig {
                host,
                port,
                load_on_start: initial_load,
            };
            tokio::runtime::Runtime::new()?.block_on(run_api_server(api, dashboard))?;
        }

        Commands::Export {
            output,
            input,
            config,
            verbose,
        } => {
            init_logging(verbose);
            cli::export(&config.resolve()?, input, output, verbose)?;
        }

        Commands::Snapshot { file, verbose } => {
            init_logging(verbose);
            cli::snapshot(&file, verbose)?;
        }
    }

    Ok(())
}
