//! CLI for docx2xml - DOCX to annotated XML converter and font reviewer

use clap::{Parser, Subcommand, ValueEnum};
use docx2xml::color::{ColorNamer, LocalPalette};
use docx2xml::localization::for_language;
use docx2xml::{AnnotateOptions, Annotator, ConvertOptions, DocxToXml, Layout};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a DOCX file to XML
    Convert {
        /// Input DOCX file path
        input: PathBuf,

        /// Output XML file path (optional, prints to stdout if not specified)
        output: Option<PathBuf>,

        /// Node layout; `runs` writes a style table for `annotate`
        #[arg(long, value_enum, default_value_t = LayoutArg::Outline)]
        layout: LayoutArg,

        /// Keep text after the first period
        #[arg(long)]
        no_truncate: bool,

        /// Skip page margins
        #[arg(long)]
        no_margins: bool,

        /// Skip footnotes
        #[arg(long)]
        no_footnotes: bool,

        /// Language of table-of-contents markers (default: ru)
        #[arg(long, default_value = "ru")]
        lang: String,

        /// Name colors through the online color API, falling back to the local palette
        #[arg(long)]
        color_api: bool,
    },
    /// Highlight runs whose font differs from the expected one
    Annotate {
        /// Input DOCX file path
        input: PathBuf,

        /// Style table produced by `convert --layout runs`
        style_table: PathBuf,

        /// Output DOCX file path
        output: PathBuf,

        #[arg(long, default_value = "Times New Roman")]
        expected_font: String,

        /// Comment text (default: localized font review message)
        #[arg(long)]
        comment: Option<String>,

        #[arg(long, default_value = "System")]
        author: String,

        /// Annotate the matching part when the style table does not fit the document
        #[arg(long)]
        allow_mismatch: bool,

        /// Language of table-of-contents markers and the default comment (default: ru)
        #[arg(long, default_value = "ru")]
        lang: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LayoutArg {
    Outline,
    Runs,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Outline => Layout::Outline,
            LayoutArg::Runs => Layout::Runs,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> docx2xml::Result<()> {
    match command {
        Command::Convert {
            input,
            output,
            layout,
            no_truncate,
            no_margins,
            no_footnotes,
            lang,
            color_api,
        } => {
            let options = ConvertOptions {
                layout: layout.into(),
                truncate_at_period: !no_truncate,
                include_page_parameters: !no_margins,
                include_footnotes: !no_footnotes,
            };
            let converter = DocxToXml::new(options)
                .with_localization(for_language(&lang))
                .with_color_namer(color_namer(color_api));

            let xml = converter.convert(&input)?;
            if let Some(output) = output {
                std::fs::write(&output, &xml)?;
                println!("Successfully converted to {:?}", output);
            } else {
                print!("{}", xml);
            }
        }
        Command::Annotate {
            input,
            style_table,
            output,
            expected_font,
            comment,
            author,
            allow_mismatch,
            lang,
        } => {
            let localization = for_language(&lang);
            let defaults = AnnotateOptions::localized(localization);
            let options = AnnotateOptions {
                expected_font,
                comment_text: comment.unwrap_or(defaults.comment_text),
                author,
                allow_mismatch,
                highlight: defaults.highlight,
            };
            let report = Annotator::new(options)
                .with_localization(localization)
                .annotate(&input, &style_table, &output)?;
            println!(
                "Checked {} paragraphs ({} runs), flagged {} runs; wrote {:?}",
                report.paragraphs_checked, report.runs_checked, report.runs_flagged, output
            );
        }
    }
    Ok(())
}

#[cfg(feature = "color-api")]
fn color_namer(online: bool) -> Box<dyn ColorNamer> {
    use docx2xml::color::{ColorApiNamer, FallbackNamer};

    if !online {
        return Box::new(LocalPalette::default());
    }
    match ColorApiNamer::new() {
        Ok(api) => Box::new(FallbackNamer::new(api, LocalPalette::default())),
        Err(e) => {
            log::warn!("Color API unavailable ({}), using the local palette", e);
            Box::new(LocalPalette::default())
        }
    }
}

#[cfg(not(feature = "color-api"))]
fn color_namer(online: bool) -> Box<dyn ColorNamer> {
    if online {
        log::warn!("Built without the `color-api` feature, using the local palette");
    }
    Box::new(LocalPalette::default())
}
