use anyhow::{anyhow, Result};
use clap::Parser;
use gosub_cssgrammar::grammar::{render, InputKind};
use gosub_cssgrammar::snippet::display_snippet;
use gosub_cssgrammar::syntax::config::{ParserConfig, ParserFlags};
use simple_logger::SimpleLogger;
use std::fs;

#[derive(Parser, Debug)]
#[command(name = "Gosub CSS grammar parser", version = "0.1.0")]
struct Args {
    /// The file to parse, or the text itself with --inline
    input: String,

    /// What the input is parsed as
    #[arg(short, long, value_enum, default_value_t = InputKind::Value)]
    kind: InputKind,

    /// Treat the input argument as css text instead of a file name
    #[arg(short, long)]
    inline: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Accept old Internet Explorer value hacks
    #[arg(long)]
    ie_values: bool,

    /// Accept the `*property` hack in declarations
    #[arg(long)]
    star_hack: bool,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        SimpleLogger::new().init()?;
    }

    let (css, source) = if args.inline {
        (args.input.clone(), None)
    } else {
        (fs::read_to_string(&args.input)?, Some(args.input.clone()))
    };

    let mut flags = ParserFlags::empty();
    if args.ie_values {
        flags |= ParserFlags::IEVALUES;
    }
    if args.star_hack {
        flags |= ParserFlags::STARHACK;
    }

    let config = ParserConfig {
        flags,
        source,
        ..Default::default()
    };

    let rendered = match render(args.kind, &css, &config) {
        Ok(rendered) => rendered,
        Err(err) => {
            eprintln!("{}", display_snippet(&css, &err));
            return Err(anyhow!(err.to_string()));
        }
    };

    for warning in &rendered.warnings {
        eprintln!("warning: {}", display_snippet(&css, warning));
    }
    for err in &rendered.errors {
        eprintln!("error: {}", display_snippet(&css, err));
    }

    if !args.quiet {
        println!("{}", rendered.output);
    }

    Ok(())
}
