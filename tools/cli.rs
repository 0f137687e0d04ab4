use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use sublimate::{Value, convert, parse_plist};

/// Convert a TextMate grammar into a Sublime Text syntax definition.
#[derive(Debug, Parser)]
#[command(name = "sublimate", version, about)]
struct Args {
    /// Grammar to convert, either a plist (.tmLanguage) or its JSON equivalent
    input: PathBuf,

    /// Write the syntax definition here instead of printing it to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Suppress conversion warnings
    #[arg(short, long)]
    quiet: bool,
}

fn load_grammar(path: &Path, source: &str) -> Result<Value, sublimate::Error> {
    // tmLanguage grammars circulate both as plists and as JSON; the extension
    // is the best signal but plenty of JSON grammars are shipped without one.
    let json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        || source.trim_start().starts_with('{');

    if json {
        Value::from_json_str(source)
    } else {
        parse_plist(source)
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(&args.input)?;
    let grammar = load_grammar(&args.input, &source)?;
    let conversion = convert(&grammar)?;

    if !args.quiet {
        for warning in &conversion.diagnostics {
            eprintln!("warning: {}", warning);
        }
    }

    let syntax = conversion.to_yaml()?;
    match &args.output {
        Some(path) => fs::write(path, syntax)?,
        None => io::stdout().write_all(syntax.as_bytes())?,
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("✗ {}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
