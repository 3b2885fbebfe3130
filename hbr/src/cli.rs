//! CLI argument parsing for hbrender

use clap::Parser;
use std::path::PathBuf;

use crate::error::RunError;
use crate::logging::Verbosity;
use crate::render::{OutputTarget, STDIN_ARG, TemplateSource};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nCopyright (C) ",
    env!("CARGO_PKG_AUTHORS"),
    "\nLicense MIT <https://opensource.org/licenses/MIT>\n",
    "This is free software: you are free to change and redistribute it.\n",
    "There is NO WARRANTY, to the extent permitted by law."
);

const AFTER_HELP: &str = "\
hbrender reads the template from STDIN, unless one or more template files
are specified. A template named '-' also reads STDIN.

By default, all templates are concatenated to create one output document,
written to STDOUT unless an output file is given with --output.

With --outdir, hbrender treats templates separately and creates one output
document per template in that (existing) directory, using the template name
without the last extension as file name.";

#[derive(Parser, Debug)]
#[command(name = "hbrender")]
#[command(
    author,
    version,
    long_version = LONG_VERSION,
    about = "Render a document from Handlebars templates and YAML variables",
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Handlebars template files (default: STDIN)
    #[arg(value_name = "TEMPLATE")]
    pub templates: Vec<PathBuf>,

    /// YAML variables file; repeat to merge several, later files win
    #[arg(short = 'v', long = "variables", value_name = "FILE")]
    pub variables: Vec<PathBuf>,

    /// Output file (default: STDOUT)
    #[arg(short, long, value_name = "FILE", conflicts_with = "outdir")]
    pub output: Option<PathBuf>,

    /// Directory for one output file per template
    #[arg(short = 'd', long, value_name = "DIR")]
    pub outdir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print progress information
    #[arg(long)]
    pub verbose: bool,

    /// Print errors only
    #[arg(long)]
    pub quiet: bool,

    /// Print debugging information (includes --verbose)
    #[arg(long)]
    pub debug: bool,

    /// Strip a single top-level key from each variables file before merging
    #[arg(long)]
    pub remove_root_key: bool,

    /// Fail on references to undefined variables
    #[arg(long)]
    pub strict: bool,
}

/// How templates are turned into output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// All templates concatenated into one document
    Combined {
        sources: Vec<TemplateSource>,
        target: OutputTarget,
    },
    /// One document per template file
    Separate { templates: Vec<PathBuf>, outdir: PathBuf },
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::new(self.debug, self.verbose, self.quiet)
    }

    /// Resolve the output mode, rejecting invalid option combinations
    ///
    /// Performs no I/O.
    pub fn mode(&self) -> Result<Mode, RunError> {
        match (&self.outdir, &self.output) {
            (Some(_), Some(_)) => Err(RunError::Usage(
                "option \"--output\" cannot be used with option \"--outdir\".".to_string(),
            )),
            (Some(outdir), None) => {
                if self.templates.is_empty() {
                    return Err(RunError::Usage("option \"--outdir\" requires template files.".to_string()));
                }
                if self.templates.iter().any(|t| t.as_os_str() == STDIN_ARG) {
                    return Err(RunError::Usage(format!(
                        "option \"--outdir\" cannot read a template from \"{}\".",
                        STDIN_ARG
                    )));
                }
                Ok(Mode::Separate {
                    templates: self.templates.clone(),
                    outdir: outdir.clone(),
                })
            }
            (None, output) => Ok(Mode::Combined {
                sources: self.templates.iter().map(|t| TemplateSource::from_arg(t)).collect(),
                target: output.clone().map_or(OutputTarget::Stdout, OutputTarget::File),
            }),
        }
    }
}
