//! RCWA command-line interface.
//!
//! Run diffraction solves from TOML job files:
//! ```sh
//! rcwa run job.toml
//! rcwa validate job.toml
//! rcwa materials
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rcwa")]
#[command(about = "Diffraction efficiencies of periodic multilayers by RCWA")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a solve from a TOML job file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse a job file and build its device without solving.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// List the built-in material identifiers.
    Materials,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("RCWA Solver");
            println!("===========");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let result = runner::run_job(&job)?;

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_orders {
                runner::write_orders_csv(&result, &out_dir.join("orders.csv"))?;
            }
            if job.output.save_json {
                runner::write_result_json(&result, &out_dir.join("result.json"))?;
            }

            println!("Solve complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let device = runner::build_device(&job)?;
            runner::build_source(&job)?;
            rcwa_core::RcwaSolver::new(job.solver.options)?;
            println!(
                "Configuration is valid: {} ({} layers)",
                config.display(),
                device.layers().len()
            );
            Ok(())
        }
        Commands::Materials => {
            println!("Available materials:");
            println!();
            for id in rcwa_materials::BUILTIN {
                let model = rcwa_materials::lookup(id)?;
                let (min, max) = model.wavelength_range();
                println!("  {:<6} {}, {:.0}-{:.0} nm", id, model.name(), min, max);
            }
            println!();
            println!("Any material may also be given as a permittivity [re, im].");
            Ok(())
        }
    }
}
