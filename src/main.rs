use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use markdoc::{Config, ExportFormat};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Styled HTML fragment
    Html,
    /// Standalone preview page
    Preview,
    /// Legacy Word document (HTML flavoured)
    Doc,
    /// Word document (Office Open XML)
    Docx,
}

#[derive(Parser)]
#[command(name = "markdoc")]
#[command(about = "Convert Markdown to styled HTML and Word documents")]
struct Cli {
    /// Input Markdown file, or - for stdin
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "docx")]
    format: Format,

    /// Output file (defaults to stdout for html, otherwise the input name with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file
    #[arg(short, long, default_value = "markdoc.toml")]
    config: PathBuf,

    /// Document name used for the title and default file name
    #[arg(long)]
    name: Option<String>,

    /// Disable GitHub-flavored extensions
    #[arg(long)]
    no_gfm: bool,

    /// Keep soft line breaks as spaces
    #[arg(long)]
    no_breaks: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(&cli.config);
    if cli.no_gfm {
        config.render.gfm = false;
    }
    if cli.no_breaks {
        config.render.breaks = false;
    }
    if let Some(name) = &cli.name {
        config.export.file_name = name.clone();
    } else if let Some(stem) = input_stem(&cli.input) {
        config.export.file_name = stem;
    }

    // Read input
    let markdown = match read_input(&cli.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {}: {}", cli.input.display(), e);
            std::process::exit(1);
        }
    };

    let (bytes, extension) = match cli.format {
        Format::Html => (
            markdoc::render_html(&markdown, &config.render).into_bytes(),
            "html",
        ),
        Format::Preview => (
            markdoc::render_preview_page(&markdown, &config).into_bytes(),
            "html",
        ),
        Format::Doc | Format::Docx => {
            let format = if matches!(cli.format, Format::Doc) {
                ExportFormat::Doc
            } else {
                ExportFormat::Docx
            };
            match markdoc::export(&markdown, format, &config) {
                Ok(file) => (file.bytes, format.extension()),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    // Fragments go to stdout unless an output file is given
    let output = match (cli.output, cli.format) {
        (Some(output), _) => output,
        (None, Format::Html) => {
            print!("{}", String::from_utf8_lossy(&bytes));
            return;
        }
        (None, _) if cli.input != Path::new("-") => cli.input.with_extension(extension),
        (None, _) => PathBuf::from(&config.export.file_name).with_extension(extension),
    };

    if let Err(e) = fs::write(&output, bytes) {
        eprintln!("Error writing {}: {}", output.display(), e);
        std::process::exit(1);
    }

    println!("Created {}", output.display());
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(input: &Path) -> io::Result<String> {
    if input == Path::new("-") {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        fs::read_to_string(input)
    }
}

fn input_stem(input: &Path) -> Option<String> {
    if input == Path::new("-") {
        return None;
    }
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}
