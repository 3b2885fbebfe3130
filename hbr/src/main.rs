use clap::Parser;
use eyre::{Context, Result};
use log::{debug, error, info};

use hbrender::cli::{Cli, Mode};
use hbrender::config::Config;
use hbrender::logging::setup_logging;
use hbrender::{Renderer, exit_code_for, load_variables, render_combined, render_separate};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbosity()) {
        eprintln!("{}: error: failed to setup logging: {}", hbrender::PROG, e);
        std::process::exit(1);
    }

    if let Err(report) = run(cli) {
        error!("{:#}", report);
        std::process::exit(exit_code_for(&report));
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("parsed command line arguments.");
    debug!("{:?}", cli);

    // Usage errors must surface before any I/O
    let mode = cli.mode()?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    debug!("{:?}", config);

    let variables = load_variables(&cli.variables, cli.remove_root_key || config.remove_root_key)?;
    debug!(
        "variables = {}",
        serde_json::to_string(&variables).unwrap_or_else(|e| format!("<unprintable: {}>", e))
    );

    let mut renderer = Renderer::new(&config.render_options(cli.strict));
    match mode {
        Mode::Combined { sources, target } => {
            debug!("rendering {} source(s) to {:?}", sources.len(), target);
            render_combined(&mut renderer, &sources, &variables, &target)
        }
        Mode::Separate { templates, outdir } => {
            let written = render_separate(&mut renderer, &templates, &variables, &outdir)?;
            info!("wrote {} document(s).", written.len());
            Ok(())
        }
    }
}
