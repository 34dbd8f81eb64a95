use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use authgate::config::GateConfig;
use clap::Parser;
use log::{debug, error};

/// Authorization gate for RESTful APIs.
#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about)]
struct App {
    /// Path of the TOML config file. Defaults to `$AUTHGATE_CONFIG` or `authgate.toml`.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Print the completed config as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

impl App {
    async fn run(&self) -> Result<()> {
        let path = match self.config.as_ref() {
            Some(path) => path.clone(),
            None => GateConfig::default_path(),
        };
        let cfg = GateConfig::load(&path)?;

        if self.print_config {
            let json = serde_json::to_string_pretty(&cfg).context("encode config json")?;
            println!("{json}");
            return Ok(());
        }

        cfg.logs.init()?;
        debug!("Use config: {:?}", cfg);

        let gate = cfg.build_gate().context("init gate")?;
        let srv = cfg.build_restful_server(Arc::new(gate))?;
        srv.run().await
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let app = App::parse();
    match app.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if log::max_level() != log::LevelFilter::Off {
                error!("Fatal: {err:#}");
            } else {
                _ = writeln!(io::stderr(), "Fatal: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}
