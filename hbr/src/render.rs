//! Template rendering
//!
//! Combined mode concatenates every template source into one document.
//! Separate mode renders each template file on its own into an output
//! directory, naming the result after the template minus its last extension.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};

use eyre::{Context, Result, eyre};
use handlebars::Handlebars;
use log::{debug, info, warn};

use crate::error::RunError;
use crate::variables::Variables;

/// Template path argument that means standard input
pub const STDIN_ARG: &str = "-";

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Fail on references to missing variables
    pub strict: bool,
    /// HTML-escape substituted values
    pub html_escape: bool,
    /// Append a newline after each rendered document
    pub trailing_newline: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strict: false,
            html_escape: false,
            trailing_newline: true,
        }
    }
}

/// Where a template's text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Stdin,
    File(PathBuf),
}

impl TemplateSource {
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == STDIN_ARG {
            Self::Stdin
        } else {
            Self::File(arg.to_path_buf())
        }
    }

    pub fn read(&self) -> Result<String> {
        match self {
            Self::Stdin => {
                let mut text = String::new();
                io::stdin()
                    .lock()
                    .read_to_string(&mut text)
                    .context("Failed to read template from standard input")?;
                Ok(text)
            }
            Self::File(path) => {
                fs::read_to_string(path).with_context(|| format!("Failed to read template {}", path.display()))
            }
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Destination of a combined document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn write(&self, document: &str) -> Result<()> {
        match self {
            Self::Stdout => {
                info!("writing output to STDOUT.");
                let mut out = io::stdout().lock();
                out.write_all(document.as_bytes())
                    .and_then(|_| out.flush())
                    .context("Failed to write to standard output")
            }
            Self::File(path) => write_file(path, document),
        }
    }
}

/// Handlebars engine configured for plain-text documents
pub struct Renderer {
    hbs: Handlebars<'static>,
    trailing_newline: bool,
}

impl Renderer {
    pub fn new(options: &RenderOptions) -> Self {
        debug!("creating renderer with {:?}", options);
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(options.strict);
        if !options.html_escape {
            hbs.register_escape_fn(handlebars::no_escape);
        }
        Self {
            hbs,
            trailing_newline: options.trailing_newline,
        }
    }

    /// Compile `source` under `name` and render it against `variables`
    ///
    /// The returned document already carries the trailing newline, if enabled.
    pub fn render(&mut self, name: &str, source: &str, variables: &Variables) -> Result<String> {
        self.hbs
            .register_template_string(name, source)
            .with_context(|| format!("Failed to compile template {}", name))?;
        info!("rendering document {}.", name);
        let mut document = self
            .hbs
            .render(name, variables)
            .with_context(|| format!("Failed to render template {}", name))?;
        self.hbs.unregister_template(name);

        if self.trailing_newline {
            document.push('\n');
        }
        Ok(document)
    }
}

/// Concatenate all sources, in order, into one template text
pub fn combined_source(sources: &[TemplateSource]) -> Result<String> {
    if sources.is_empty() {
        info!("reading template from STDIN.");
        return TemplateSource::Stdin.read();
    }

    let mut text = String::new();
    for source in sources {
        info!("reading template {}.", source.name());
        text.push_str(&source.read()?);
    }
    Ok(text)
}

/// Render all templates as one document and write it to `target`
pub fn render_combined(
    renderer: &mut Renderer,
    sources: &[TemplateSource],
    variables: &Variables,
    target: &OutputTarget,
) -> Result<()> {
    info!("processing combined template(s).");
    let text = combined_source(sources)?;
    let document = renderer.render("combined", &text, variables)?;
    target.write(&document)
}

/// Render each template file into its own file under `outdir`
///
/// Returns the paths written, in template order. `outdir` must exist.
pub fn render_separate(
    renderer: &mut Renderer,
    templates: &[PathBuf],
    variables: &Variables,
    outdir: &Path,
) -> Result<Vec<PathBuf>> {
    info!("processing separate template files.");
    if templates.is_empty() {
        return Err(RunError::Usage("separate rendering requires template files.".to_string()).into());
    }

    let outdir = normalize_directory(outdir);
    debug!("normalized output directory {}", outdir.display());

    let mut written = Vec::with_capacity(templates.len());
    for template in templates {
        info!("processing template file \"{}\".", template.display());
        let text = TemplateSource::File(template.clone()).read()?;
        let document = renderer.render(&template.display().to_string(), &text, variables)?;

        let basename = output_name(template)?;
        debug!("output basename = {}", basename.to_string_lossy());
        let output = outdir.join(basename);
        if same_file(&output, template) {
            warn!(
                "output \"{}\" overwrites its own template; give templates an extension.",
                output.display()
            );
        }
        write_file(&output, &document)?;
        written.push(output);
    }
    Ok(written)
}

/// File name of `template` without its last extension (`x.y.ext` -> `x.y`)
pub fn output_name(template: &Path) -> Result<OsString> {
    template
        .file_stem()
        .map(OsString::from)
        .ok_or_else(|| eyre!("Cannot derive an output name from template {}", template.display()))
}

/// Collapse redundant separators and `.` components, drop a trailing separator
pub fn normalize_directory(dir: &Path) -> PathBuf {
    let normalized: PathBuf = dir.components().filter(|c| !matches!(c, Component::CurDir)).collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

fn same_file(output: &Path, template: &Path) -> bool {
    match (fs::canonicalize(output), fs::canonicalize(template)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn write_file(path: &Path, document: &str) -> Result<()> {
    info!("writing output to file \"{}\".", path.display());
    fs::write(path, document).with_context(|| format!("Failed to write output file {}", path.display()))
}
