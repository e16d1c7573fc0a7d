//! CLI for distill-render - Prerender citations and bibliographies in Distill articles.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use distill_render::{
    bibliography_citation, detect_template, extractors::split_keys, load_refs,
    long_inline_citation, lookup_url, short_inline_citation, Data, Document, Pipeline,
    RenderConfig,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Prerender citations and bibliographies in Distill article HTML
#[derive(Parser)]
#[command(name = "distill-render")]
#[command(version)]
#[command(after_help = "\
Examples:
  distill-render render article.html -o index.html
  distill-render render article.html --bib refs.bib --distillify
  cat article.html | distill-render render -
  distill-render template article.html
  distill-render cite olah2016,gregor2015 --bib refs.bib --style author-year")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an article's citations and bibliography
    #[command(after_help = "\
Examples:
  distill-render render article.html
  distill-render render article.html -b refs.json -o out.html
  distill-render render article.html --distillify --check-template

Citation markup: <dt-cite key=\"a,b\"></dt-cite>, <dt-bibliography></dt-bibliography>")]
    Render {
        /// Input HTML file (use '-' for stdin)
        input: PathBuf,

        /// Extra bibliography file (BibTeX .bib, CSL-style JSON array/object, or JSONL)
        #[arg(short, long)]
        bib: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON file overriding markup names (cite-tag, bibliography-tag, ...)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also inject the publish-time header, appendix and footer
        #[arg(long)]
        distillify: bool,

        /// Fail unless the document loads a known template script
        #[arg(long)]
        check_template: bool,

        /// Render even if the document is already marked prerendered
        #[arg(long)]
        force: bool,

        /// Only log warnings and errors
        #[arg(short, long)]
        quiet: bool,
    },

    /// Report which template generation a document uses (v1 or v2)
    Template {
        /// Input HTML file (use '-' for stdin)
        input: PathBuf,
    },

    /// Format citation keys directly from a bibliography file
    Cite {
        /// Comma-separated citation keys; their order numbers them
        keys: String,

        /// Bibliography file (BibTeX .bib, JSON, or JSONL)
        #[arg(short, long)]
        bib: PathBuf,

        /// Citation form to print
        #[arg(short, long, value_enum, default_value_t = CiteStyle::Numeric)]
        style: CiteStyle,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CiteStyle {
    /// Inline marker like [1, 2]
    Numeric,
    /// Inline marker like "Smith & Doe, 2020"
    AuthorYear,
    /// One bibliography line per key
    Full,
    /// One metadata search URL per key
    Lookup,
}

// ---------------------------------------------------------------------------
// AppError: semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10: input file not found / unreadable
    InputFile(String),
    /// Exit 11: bibliography file not found / invalid
    BibFile(String),
    /// Exit 12: template generation unknown or absent
    Template(String),
    /// Exit 13: document was already prerendered
    AlreadyRendered(String),
    /// Exit 14: a pipeline stage failed
    Pipeline(String),
    /// Exit 15: cannot write output file
    OutputFile(String),
    /// Exit 16: configuration file not found / invalid
    Config(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::InputFile(_) => 10,
            AppError::BibFile(_) => 11,
            AppError::Template(_) => 12,
            AppError::AlreadyRendered(_) => 13,
            AppError::Pipeline(_) => 14,
            AppError::OutputFile(_) => 15,
            AppError::Config(_) => 16,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InputFile(msg) => {
                write!(f, "{}\n  hint: verify the file path is correct", msg)
            }
            AppError::BibFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: use a .bib file, a JSON array of entries with \"id\", a JSON object keyed by citation key, or JSONL",
                    msg
                )
            }
            AppError::Template(msg) => {
                write!(
                    f,
                    "{}\n  hint: the article should load template.v1.js or template.v2.js",
                    msg
                )
            }
            AppError::AlreadyRendered(msg) => {
                write!(
                    f,
                    "{}\n  hint: rendering again appends a second bibliography; pass --force to do it anyway",
                    msg
                )
            }
            AppError::Pipeline(msg) => {
                write!(f, "{}", msg)
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
            AppError::Config(msg) => {
                write!(
                    f,
                    "{}\n  hint: keys are cite-tag, bibliography-tag, bibliography-script, prerendered-attribute",
                    msg
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Render { quiet: true, .. }));

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

/// Logs go to stderr so rendered HTML on stdout stays clean.
/// Priority: RUST_LOG env var > quiet flag > default (info).
fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Render {
            input,
            bib,
            output,
            config,
            distillify,
            check_template,
            force,
            quiet,
        } => {
            let options = RenderOptions {
                distillify,
                check_template,
                force,
                verbose: !quiet,
            };
            render_command(&input, bib.as_deref(), output.as_deref(), config.as_deref(), &options)?;
        }
        Commands::Template { input } => {
            template_command(&input)?;
        }
        Commands::Cite { keys, bib, style } => {
            cite_command(&keys, &bib, style)?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

struct RenderOptions {
    distillify: bool,
    check_template: bool,
    force: bool,
    verbose: bool,
}

/// Render an article's citations and bibliography.
fn render_command(
    input: &Path,
    bib: Option<&Path>,
    output: Option<&Path>,
    config: Option<&Path>,
    options: &RenderOptions,
) -> Result<(), AppError> {
    // 1. Load configuration
    let config = match config {
        Some(path) => RenderConfig::load(path)
            .map_err(|e| AppError::Config(format!("'{}': {}", path.display(), e)))?,
        None => RenderConfig::default(),
    };

    // 2. Read and parse the document
    let mut document = Document::parse(&read_input(input)?);

    // 3. Preconditions
    if options.check_template {
        let generation = detect_template(&document).map_err(|e| AppError::Template(e.to_string()))?;
        tracing::info!(template = generation.label(), "Detected template");
    }
    if document.is_prerendered(&config.prerendered_attribute) && !options.force {
        return Err(AppError::AlreadyRendered(format!(
            "'{}' is already marked {}",
            input.display(),
            config.prerendered_attribute
        )));
    }

    // 4. Preload an external bibliography
    let mut data = match bib {
        Some(path) => Data::with_bibliography(
            load_refs(path).map_err(|e| AppError::BibFile(format!("'{}': {}", path.display(), e)))?,
        ),
        None => Data::new(),
    };

    // 5. Run the pipeline
    let pipeline = Pipeline::standard(config);
    pipeline
        .render(&mut document, &mut data, options.verbose)
        .map_err(|e| AppError::Pipeline(e.to_string()))?;
    if options.distillify {
        pipeline
            .distillify(&mut document, &data, options.verbose)
            .map_err(|e| AppError::Pipeline(e.to_string()))?;
    }

    // 6. Write to file or stdout
    let html = document.to_html();
    if let Some(output_path) = output {
        fs::write(output_path, &html)
            .map_err(|e| AppError::OutputFile(format!("'{}': {}", output_path.display(), e)))?;
        tracing::info!(
            citations = data.citations.len(),
            output = %output_path.display(),
            "Wrote rendered document"
        );
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{}", html).map_err(|e| AppError::OutputFile(format!("stdout: {}", e)))?;
    }

    Ok(())
}

/// Print the template generation of a document.
fn template_command(input: &Path) -> Result<(), AppError> {
    let document = Document::parse(&read_input(input)?);
    let generation = detect_template(&document).map_err(|e| AppError::Template(e.to_string()))?;
    println!("{}", generation.label());
    Ok(())
}

/// Format keys straight from a bibliography file.
fn cite_command(keys: &str, bib: &Path, style: CiteStyle) -> Result<(), AppError> {
    let refs = load_refs(bib).map_err(|e| AppError::BibFile(format!("'{}': {}", bib.display(), e)))?;
    let mut data = Data::with_bibliography(refs);
    let keys = split_keys(keys);
    for key in &keys {
        data.add_citation(key);
    }

    match style {
        CiteStyle::Numeric => println!("{}", short_inline_citation(&keys, &data)),
        CiteStyle::AuthorYear => println!("{}", long_inline_citation(&keys, &data)),
        CiteStyle::Full => {
            for key in &keys {
                println!("{}", bibliography_citation(data.entry(key)).to_string().trim_end());
            }
        }
        CiteStyle::Lookup => {
            for key in &keys {
                match lookup_url(data.entry(key)) {
                    Some(url) => println!("{}", url),
                    None => println!("?"),
                }
            }
        }
    }

    Ok(())
}

fn read_input(input: &Path) -> Result<String, AppError> {
    if input == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| AppError::InputFile(format!("failed to read from stdin: {}", e)))?;
        Ok(buf)
    } else {
        fs::read_to_string(input).map_err(|e| AppError::InputFile(format!("'{}': {}", input.display(), e)))
    }
}
