//! Quokka command-line tool.
//!
//! Scans a document, balances its tags and prints the result as HTML, as a
//! line-per-event listing or as JSON.
//!
//! Run with: cargo run --bin quokka -- page.html

use std::cell::RefCell;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use quokka_common::{CollectingReporter, Diagnostic, Severity};
use quokka_html::filter::ElementRemover;
use quokka_html::{
    EventCollector, EventSink, HtmlParser, HtmlWriter, IgnoredTags, InputSource, NameCase,
    ParserConfig,
};

/// Quokka: tolerant HTML scanner and tag balancer
#[derive(Parser, Debug)]
#[command(name = "quokka")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Balance a file and print it as HTML
    quokka page.html

    # Read from standard input
    curl -s https://example.com | quokka -

    # Show the balanced event stream
    quokka --events --html '<p>one<p>two'

    # Show the scanner's events without balancing
    quokka --events --raw --html '<b><i>x</b>'

    # Parse a fragment that lives inside a table row
    quokka --fragment table,tbody,tr --html '<td>a<td>b'

    # Keep only paragraphs and links, drop scripts entirely
    quokka --accept p --accept a:href --remove script page.html

    # Report every repair
    quokka --report --ignored page.html
"#)]
struct Cli {
    /// Path to an HTML file, or `-` for standard input
    #[arg(value_name = "FILE")]
    path: Option<String>,

    /// Parse HTML string directly instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Print one line per event instead of HTML
    #[arg(short, long)]
    events: bool,

    /// Print the events as JSON
    #[arg(long, conflicts_with = "events")]
    json: bool,

    /// Skip tag balancing
    #[arg(long)]
    raw: bool,

    /// Balance as a fragment inside these elements (outermost first)
    #[arg(long, value_name = "ELEMENTS", value_delimiter = ',')]
    fragment: Option<Vec<String>>,

    /// Encoding of the input, overriding detection
    #[arg(long, value_name = "ENCODING")]
    encoding: Option<String>,

    /// Encoding assumed when the input declares none
    #[arg(long, value_name = "ENCODING")]
    default_encoding: Option<String>,

    /// Charset written into content-type metas of the HTML output
    #[arg(long, value_name = "ENCODING", default_value = "UTF-8")]
    output_encoding: String,

    /// Element name case: upper, lower or match
    #[arg(long, value_name = "CASE")]
    names_elems: Option<NameCase>,

    /// Attribute name case: upper, lower or match
    #[arg(long, value_name = "CASE")]
    names_attrs: Option<NameCase>,

    /// Attach source locations to events
    #[arg(short, long)]
    locations: bool,

    /// Print recoverable problems to stderr
    #[arg(short, long)]
    report: bool,

    /// Print tags the balancer dropped to stderr
    #[arg(long)]
    ignored: bool,

    /// Load parser settings from a JSON file; flags override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep an element, optionally with some attributes (`a:href,title`)
    #[arg(long, value_name = "ELEMENT[:ATTRS]")]
    accept: Vec<String>,

    /// Drop an element together with its content
    #[arg(long, value_name = "ELEMENT")]
    remove: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    let reporter = Rc::new(CollectingReporter::new());
    let listener = Rc::new(RefCell::new(IgnoredTags::new()));
    let parser = HtmlParser::new(config)
        .with_reporter(reporter.clone())
        .with_listener(listener.clone());
    let source = load_source(&cli)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.events || cli.json {
        let collector = parse_into(&cli, &parser, source, EventCollector::new())?;
        if cli.json {
            serde_json::to_writer_pretty(&mut out, collector.events())?;
            writeln!(out)?;
        } else {
            for event in collector.events() {
                match event.location() {
                    Some(location) => writeln!(out, "{} {event}", location.dimmed())?,
                    None => writeln!(out, "{event}")?,
                }
            }
        }
    } else {
        let writer = HtmlWriter::new(String::new(), cli.output_encoding.clone());
        let html = parse_into(&cli, &parser, source, writer)?
            .finish()
            .context("failed to print the document")?;
        writeln!(out, "{html}")?;
    }

    for diagnostic in reporter.take() {
        print_diagnostic(&diagnostic);
    }
    if cli.ignored {
        let listener = listener.borrow();
        for (tag, rendered) in listener.tags().iter().zip(listener.rendered()) {
            match tag.location {
                Some(location) => eprintln!("{} {} at {location}", "dropped".cyan(), rendered.bold()),
                None => eprintln!("{} {}", "dropped".cyan(), rendered.bold()),
            }
        }
    }
    Ok(())
}

/// Parser settings from the config file (if any) and the flags.
fn build_config(cli: &Cli) -> Result<ParserConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => ParserConfig::default(),
    };
    if cli.raw {
        config.balance_tags = false;
    }
    let scanner = &mut config.scanner;
    if let Some(case) = cli.names_elems {
        scanner.names_elems = case;
    }
    if let Some(case) = cli.names_attrs {
        scanner.names_attrs = case;
    }
    if let Some(encoding) = &cli.default_encoding {
        scanner.default_encoding.clone_from(encoding);
    }
    scanner.augmentations |= cli.locations;
    scanner.report_errors |= cli.report;
    config.sync_shared();
    Ok(config)
}

/// Input source from the CLI arguments.
fn load_source(cli: &Cli) -> Result<InputSource> {
    let source = if let Some(html) = &cli.html {
        InputSource::from_text(html.clone())
    } else if let Some(path) = &cli.path {
        if path == "-" {
            let mut bytes = Vec::new();
            let _ = io::stdin()
                .read_to_end(&mut bytes)
                .context("failed to read standard input")?;
            InputSource::from_bytes(bytes)
        } else {
            let bytes = fs::read(path).with_context(|| format!("failed to read {path}"))?;
            InputSource::from_bytes(bytes).with_system_id(path.clone(), None)
        }
    } else {
        bail!("No input given. Pass a FILE, `-` or --html. See --help.");
    };
    Ok(match &cli.encoding {
        Some(encoding) => source.with_encoding(encoding.clone()),
        None => source,
    })
}

/// Parse `source` into `sink`, through an element filter when one was asked
/// for.
fn parse_into<S: EventSink>(cli: &Cli, parser: &HtmlParser, source: InputSource, mut sink: S) -> Result<S> {
    if cli.accept.is_empty() && cli.remove.is_empty() {
        parse(cli, parser, source, &mut sink)?;
        return Ok(sink);
    }
    let mut remover = ElementRemover::new(sink);
    for accepted in &cli.accept {
        let (element, attributes) = accepted.split_once(':').unwrap_or((accepted.as_str(), ""));
        let attributes: Vec<&str> = attributes.split(',').filter(|name| !name.is_empty()).collect();
        remover.accept_element(element, &attributes);
    }
    for element in &cli.remove {
        remover.remove_element(element);
    }
    parse(cli, parser, source, &mut remover)?;
    Ok(remover.into_inner())
}

fn parse<S: EventSink + ?Sized>(cli: &Cli, parser: &HtmlParser, source: InputSource, sink: &mut S) -> Result<()> {
    match &cli.fragment {
        Some(context) => {
            let context: Vec<&str> = context.iter().map(String::as_str).collect();
            parser.parse_fragment(source, &context, sink)?;
        }
        None => parser.parse(source, sink)?,
    }
    Ok(())
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let key = match diagnostic.severity {
        Severity::Warning => diagnostic.key.yellow().to_string(),
        Severity::Error => diagnostic.key.red().to_string(),
    };
    eprintln!(
        "{} {key} {}",
        format!("[{}]", diagnostic.component).dimmed(),
        diagnostic.message
    );
}
