//! CLI module for rdoc-dictionary

mod args;

pub use args::{Args, Command};

use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::{Error, Result};
use crate::pipeline::{Pipeline, RunOptions};
use crate::store::Catalog;
use crate::toolchain::SystemRunner;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the global log subscriber; `RUST_LOG` overrides the level
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Build {
            force,
            verbose,
            quick,
            delete,
            config,
            stores,
            no_install,
        } => {
            init_logging(verbose);

            let mut cfg = match &config {
                Some(path) => Config::load(path)?,
                None => Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE)),
            };

            cfg.merge_cli(stores, no_install);
            cfg.validate()?;

            if cfg.stores.paths.is_empty() {
                return Err(Error::config_validation(
                    "no documentation stores given; pass --store or set [stores] paths",
                ));
            }

            if verbose {
                println!("Base directory: {}", cfg.paths.base_dir.display());
                println!("Stores: {:?}", cfg.stores.paths);
                println!("Dictionary: {}", cfg.build.dictionary_name);
                println!("Install: {}", cfg.build.install);
            }

            let catalog = Catalog::open(&cfg.stores.paths)?;
            let pipeline = Pipeline::new(&cfg, &catalog)?;

            let options = RunOptions {
                force,
                quick,
                reset: delete,
                verbose,
            };

            let report = pipeline.run(options, &mut SystemRunner)?;
            println!("{}", report.summary());

            if report.installed {
                println!("Run Dictionary.app to use the new dictionary. (activate in prefs!)");
            }

            Ok(())
        }

        Command::Version => {
            println!("rdoc-dictionary {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
