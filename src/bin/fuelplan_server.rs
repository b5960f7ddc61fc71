//! Fuelplan Dashboard Server binary
//!
//! Loads the plan workbook and serves the dashboard over HTTP.

use clap::Parser;
use fuelplan::api::{run_api_server, server::ApiConfig};
use fuelplan::cli::ConfigArgs;

#[derive(Parser, Debug)]
#[command(name = "fuelplan-server")]
#[command(version)]
#[command(about = "Fuelplan Dashboard Server - fuel distribution plan over HTTP")]
#[command(long_about = r#"
Fuelplan Dashboard Server

Serves the aggregated distribution plan:
  - GET  /dashboard                   - Interactive dashboard page
  - POST /api/v1/load                 - Reload the plan workbook
  - GET  /api/v1/status               - Phase and last load result
  - GET  /api/v1/summary              - Total and per-product volumes
  - GET  /api/v1/series/terminals     - Volume per terminal by product
  - GET  /api/v1/series/products      - Volume per product
  - GET  /api/v1/series/destinations  - Volume per destination (?terminal=)
  - GET  /api/v1/compliance           - Compliance report rows
  - POST /api/v1/shutdown             - Stop the server

Additional endpoints:
  - GET  /health                      - Health check
  - GET  /version                     - Server version info
  - GET  /                            - API documentation

A reload requested while another is running is rejected with 409.

Example usage:
  fuelplan-server                           # Start on localhost:8050
  fuelplan-server --host 0.0.0.0 --port 3000 -d /srv/planes

  curl -X POST http://localhost:8050/api/v1/load
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "FUELPLAN_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8050", env = "FUELPLAN_PORT")]
    port: u16,

    /// Load the plan workbook once at startup instead of waiting for POST /api/v1/load
    #[arg(long)]
    initial_load: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        load_on_start: args.initial_load,
    };

    run_api_server(config, args.config.resolve()?).await
}
