use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use linelight::HighlightEngine;
use linelight::engine::DocumentSnapshot;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: linelight <folder> <file> [--dark] [--json] [--start N] [--count N]";

#[derive(Debug, PartialEq)]
struct Args {
    folder: PathBuf,
    file: PathBuf,
    dark: bool,
    json: bool,
    start: usize,
    count: Option<usize>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut dark = false;
    let mut json = false;
    let mut start = 0;
    let mut count = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dark" => dark = true,
            "--json" => json = true,
            "--start" => start = parse_number(&arg, args.next())?,
            "--count" => count = Some(parse_number(&arg, args.next())?),
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            other => positional.push(PathBuf::from(other)),
        }
    }

    let [folder, file]: [PathBuf; 2] = positional
        .try_into()
        .map_err(|_| USAGE.to_string())?;

    Ok(Args {
        folder,
        file,
        dark,
        json,
        start,
        count,
    })
}

fn parse_number(flag: &str, value: Option<String>) -> Result<usize, String> {
    let value = value.ok_or_else(|| format!("{} needs a value", flag))?;
    value
        .parse()
        .map_err(|_| format!("{} expects a number, got {:?}", flag, value))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::from(2);
        }
    };

    let mut engine = match HighlightEngine::construct(&args.folder) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let text = match std::fs::read_to_string(&args.file) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("{}: {}", args.file.display(), err);
            return ExitCode::FAILURE;
        }
    };

    engine.set_dark_mode(args.dark);
    let total_lines = DocumentSnapshot::new(&text).line_count();
    let count = args.count.unwrap_or(total_lines);

    let spans = engine.highlight(&text, args.start, count, total_lines);
    if args.json {
        for span in &spans {
            match serde_json::to_string(span) {
                Ok(line) => println!("{}", line),
                Err(err) => {
                    eprintln!("{}", err);
                    return ExitCode::FAILURE;
                }
            }
        }
        return ExitCode::SUCCESS;
    }

    println!(
        "# {} / {} / background {}",
        engine.grammar_name(),
        engine.theme_name(),
        engine.background_color()
    );
    for span in spans {
        let mut flags = String::new();
        for (on, name) in [(span.bold, " bold"), (span.italic, " italic"), (span.underline, " underline")] {
            if on {
                flags.push_str(name);
            }
        }
        println!(
            "{}:{}+{} fg={} bg={}{}",
            span.line, span.offset, span.length, span.foreground, span.background, flags
        );
    }

    ExitCode::SUCCESS
}
