//! mathfonts CLI

use std::env;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use log::{debug, info};
use regex::Regex;

use mathfonts_core::document::HtmlDocument;
use mathfonts_core::face::{font_faces, FontFaceFilter, FontFaceRule};
use mathfonts_core::inject::StyleInjector;
use mathfonts_core::output::{write_css, write_json_pretty, write_ndjson};

pub mod server;

/// Environment variable consulted when `--base-path` is not given.
pub const BASE_PATH_ENV: &str = "MATHFONTS_BASE_PATH";

/// CLI entrypoint for mathfonts.
#[derive(Debug, Parser)]
#[command(
    name = "mathfonts",
    about = "Render and inject the KaTeX @font-face stylesheet"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the @font-face stylesheet rooted at a base path
    Css(CssArgs),
    /// List the @font-face rules
    Faces(FacesArgs),
    /// Add the stylesheet as a <style> element to an HTML document's head
    Inject(InjectArgs),
    /// Serve the stylesheet over HTTP
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
struct BasePathArg {
    /// Prefix that replaces `fonts/` in every font URL (default: $MATHFONTS_BASE_PATH, else empty)
    #[arg(short = 'b', long = "base-path", value_hint = ValueHint::Other)]
    base_path: Option<String>,
}

#[derive(Debug, Args)]
struct CssArgs {
    #[command(flatten)]
    base: BasePathArg,

    /// Write to this file instead of stdout
    #[arg(short = 'o', long = "output", value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct FacesArgs {
    #[command(flatten)]
    base: BasePathArg,

    /// Regex patterns that must match the font family
    #[arg(short = 'n', long = "family", value_hint = ValueHint::Other)]
    family_patterns: Vec<String>,

    /// Only rules with this font-weight (400, 700, normal, bold)
    #[arg(short = 'w', long = "weight")]
    weight: Option<String>,

    /// Only rules with this font-style (normal, italic)
    #[arg(short = 's', long = "style")]
    style: Option<String>,

    /// Emit a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue, conflicts_with_all = ["ndjson", "columns"])]
    json: bool,

    /// Emit newline-delimited JSON
    #[arg(long = "ndjson", action = ArgAction::SetTrue, conflicts_with = "columns")]
    ndjson: bool,

    /// Format output as padded columns
    #[arg(long = "columns", action = ArgAction::SetTrue)]
    columns: bool,

    /// Control colorized output (auto|always|never)
    #[arg(long = "color", default_value_t = ColorChoice::Auto, value_enum)]
    color: ColorChoice,
}

#[derive(Debug, Args)]
struct InjectArgs {
    #[command(flatten)]
    base: BasePathArg,

    /// HTML document to inject into (`-` reads STDIN)
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Write the result to this file instead of stdout
    #[arg(short = 'o', long = "output", value_hint = ValueHint::FilePath, conflicts_with = "in_place")]
    output: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(short = 'i', long = "in-place", action = ArgAction::SetTrue)]
    in_place: bool,
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long = "bind", default_value = "127.0.0.1:8765")]
    bind: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// Parse CLI args and execute the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Css(args) => run_css(args),
        Command::Faces(args) => run_faces(args),
        Command::Inject(args) => run_inject(args),
        Command::Serve(args) => run_serve(args),
    }
}

fn run_css(args: CssArgs) -> Result<()> {
    let base_path = resolve_base_path(&args.base);
    let css = StyleInjector::new().render(&base_path);

    match &args.output {
        Some(path) => {
            fs::write(path, css.as_bytes())
                .with_context(|| format!("writing {}", path.display()))?;
            info!("wrote stylesheet to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_css(&css, &mut handle)?;
            if handle.is_terminal() {
                writeln!(handle)?;
            }
        }
    }

    Ok(())
}

fn run_faces(args: FacesArgs) -> Result<()> {
    let rules = select_faces(&args)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let use_color = match args.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => handle.is_terminal(),
    };

    if args.ndjson {
        write_ndjson(&rules, &mut handle)?;
    } else if args.json {
        write_json_pretty(&rules, &mut handle)?;
    } else if args.columns {
        write_columns(&rules, &mut handle, use_color)?;
    } else {
        write_plain(&rules, &mut handle)?;
    }

    Ok(())
}

fn run_inject(args: InjectArgs) -> Result<()> {
    let base_path = resolve_base_path(&args.base);
    let reading_stdin = args.input == Path::new("-");

    if args.in_place && reading_stdin {
        return Err(anyhow!("--in-place needs a file, not STDIN"));
    }

    let html = if reading_stdin {
        let mut buf = String::new();
        io::stdin()
            .lock()
            .read_to_string(&mut buf)
            .context("reading HTML from STDIN")?;
        buf
    } else {
        fs::read_to_string(&args.input)
            .with_context(|| format!("reading {}", args.input.display()))?
    };

    let injected = inject_html(html, &base_path)
        .with_context(|| format!("injecting into {}", args.input.display()))?;

    let destination = if args.in_place {
        Some(args.input.as_path())
    } else {
        args.output.as_deref()
    };

    match destination {
        Some(path) => {
            fs::write(path, injected.as_bytes())
                .with_context(|| format!("writing {}", path.display()))?;
            info!("injected stylesheet into {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(injected.as_bytes())?;
        }
    }

    Ok(())
}

fn run_serve(args: ServeArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;
    runtime.block_on(server::serve(&args.bind))
}

/// Add one KaTeX `<style>` element to the head of `html`.
pub fn inject_html(html: String, base_path: &str) -> Result<String> {
    let mut doc = HtmlDocument::new(html);
    StyleInjector::new().inject(base_path, &mut doc)?;
    Ok(doc.into_html())
}

/// Template rules filtered by family/weight/style and rebased onto `base_path`.
pub fn faces_for(
    base_path: &str,
    family_patterns: &[String],
    weight: Option<String>,
    style: Option<String>,
) -> Result<Vec<FontFaceRule>> {
    let filter = FontFaceFilter::new()
        .with_family_patterns(compile_patterns(family_patterns)?)
        .with_weight(weight)
        .with_style(style);

    Ok(font_faces()?
        .iter()
        .filter(|rule| filter.matches(rule))
        .map(|rule| rule.with_base_path(base_path))
        .collect())
}

fn select_faces(args: &FacesArgs) -> Result<Vec<FontFaceRule>> {
    let base_path = resolve_base_path(&args.base);
    faces_for(
        &base_path,
        &args.family_patterns,
        args.weight.clone(),
        args.style.clone(),
    )
}

fn resolve_base_path(arg: &BasePathArg) -> String {
    base_path_from(arg.base_path.clone(), env::var(BASE_PATH_ENV).ok())
}

fn base_path_from(flag: Option<String>, env_value: Option<String>) -> String {
    let resolved = flag.or(env_value).unwrap_or_default();
    debug!("using base path {resolved:?}");
    resolved
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).with_context(|| format!("invalid regex: {p}")))
        .collect()
}

fn write_plain(rules: &[FontFaceRule], mut w: impl Write) -> Result<()> {
    for rule in rules {
        writeln!(w, "{}", rule.to_css())?;
    }
    Ok(())
}

fn write_columns(rules: &[FontFaceRule], mut w: impl Write, color: bool) -> Result<()> {
    let rows: Vec<(String, String, String)> = rules
        .iter()
        .map(|rule| {
            let variant = format!("{} {}", rule.weight, rule.style);
            let files = rule.file_names().join(" ");
            (rule.family.clone(), variant, files)
        })
        .collect();

    let family_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0).clamp(0, 60);
    let variant_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0).clamp(0, 24);

    for (family, variant, files) in rows {
        let padded_family = format!("{:<family_width$}", family);
        let padded_variant = format!("{:<variant_width$}", variant);
        let rendered_family = apply_color(&padded_family, color, AnsiColor::Cyan);
        let rendered_variant = apply_color(&padded_variant, color, AnsiColor::Yellow);
        let rendered_files = apply_color(&files, color, AnsiColor::Green);

        writeln!(w, "{rendered_family}  {rendered_variant}  {rendered_files}")?;
    }

    Ok(())
}

#[derive(Copy, Clone)]
enum AnsiColor {
    Cyan,
    Yellow,
    Green,
}

fn apply_color(text: &str, color: bool, code: AnsiColor) -> String {
    if !color {
        return text.to_string();
    }

    let code_str = match code {
        AnsiColor::Cyan => "36",
        AnsiColor::Yellow => "33",
        AnsiColor::Green => "32",
    };

    format!("\u{1b}[{}m{}\u{1b}[0m", code_str, text)
}
