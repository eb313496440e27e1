use std::io::stdin;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "yamlet", about = "Parse a yamlet document and print it as JSON", version)]
struct Args {
    /// Pretty-print JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Tab stop used when expanding tabs in indentation
    #[arg(long, default_value_t = 8)]
    tab_width: usize,

    /// Maximum nesting depth (0 = unlimited)
    #[arg(long, default_value_t = 256)]
    max_depth: usize,

    /// Log parser activity to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Input file (defaults to stdin)
    input: Option<PathBuf>,
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "yamlet=debug" } else { "yamlet=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let options = yamlet::Options {
        tab_width: args.tab_width,
        max_depth: (args.max_depth > 0).then_some(args.max_depth),
    };
    let parser = yamlet::Parser::with_options(options);
    tracing::debug!(input = ?args.input, options = ?parser.options(), "starting");

    let value = match &args.input {
        Some(path) => parser.parse_file(path)?,
        None => parser.parse_reader(stdin().lock(), "<stdin>")?,
    };

    let json = serde_json::Value::from(value);
    if args.pretty {
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{}", serde_json::to_string(&json)?);
    }

    Ok(())
}
