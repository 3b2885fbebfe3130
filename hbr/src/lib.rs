//! hbrender - render documents from Handlebars templates and YAML variables
//!
//! Variables are loaded from zero or more YAML files and merged (shallow,
//! later files win). Templates are read from standard input or named files
//! and rendered either as one concatenated document or one document per
//! template.
//!
//! # Pipeline
//!
//! ```text
//! parse args ──► load variables ──► render (combined | separate) ──► write
//!   cli.rs        variables.rs          render.rs                  stdout / file / dir
//! ```
//!
//! # Example
//!
//! ```ignore
//! use hbrender::{Renderer, RenderOptions, load_variables};
//!
//! let variables = load_variables(&["vars.yml".into()], false)?;
//! let mut renderer = Renderer::new(&RenderOptions::default());
//! let document = renderer.render("greeting", "Hello, {{ name }}!", &variables)?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod variables;

pub use error::{RunError, exit_code_for};
pub use logging::Verbosity;
pub use render::{OutputTarget, RenderOptions, Renderer, TemplateSource, render_combined, render_separate};
pub use variables::{Variables, load_variables};

/// Program name used as the prefix of every diagnostic line
pub const PROG: &str = "hbrender";
