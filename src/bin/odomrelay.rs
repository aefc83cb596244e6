use std::{
    fs::File,
    io::{self, BufReader, IsTerminal, Write},
    process::ExitCode,
};

use log::{debug, info};
use odomrelay::{
    editor::EditorSource,
    printer::{pr_params, NumberFormat},
    reader::{read_params, LineSource, StreamSource},
    types::{RelayError, RelayResult},
    usage,
};

const USAGE: &str = "\
usage: odomrelay [-p N|--precision N] [-q|--quiet] [FILE]

Asks for the odometry parameters and prints them on one line.
Values are read from FILE instead of standard input when given.

  -p, --precision N  print every value with N decimals
  -q, --quiet        do not prompt
  -h, --help         show this help";

#[derive(Debug, Default, PartialEq)]
struct Options {
    format: NumberFormat,
    quiet: bool,
    input: Option<String>,
    help: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<_> = std::env::args().skip(1).collect();

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("odomrelay: {e}\n\n{USAGE}");
            return ExitCode::from(exit_status(&e));
        }
    };

    if options.help {
        eprintln!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("{e:?}");
            match &e {
                RelayError::Interrupted => eprintln!(),
                e => eprintln!("\nodomrelay: {e}"),
            }
            ExitCode::from(exit_status(&e))
        }
    }
}

fn exit_status(e: &RelayError) -> u8 {
    match e {
        RelayError::Usage(_) => 2,
        _ => 1,
    }
}

fn parse_args(mut args: &[String]) -> RelayResult<Options> {
    let mut options = Options::default();

    while let [arg, rest @ ..] = args {
        args = rest;

        match arg.as_str() {
            "-h" | "--help" => options.help = true,
            "-q" | "--quiet" => options.quiet = true,
            "-p" | "--precision" => {
                let [value, rest @ ..] = args else {
                    usage!("{arg} expects a number of decimals")
                };
                options.format = NumberFormat::Fixed(parse_decimals(value)?);
                args = rest;
            }
            other if other.starts_with("--precision=") => {
                let value = &other["--precision=".len()..];
                options.format = NumberFormat::Fixed(parse_decimals(value)?);
            }
            path if path == "-" || !path.starts_with('-') => {
                if let Some(first) = &options.input {
                    usage!("unexpected argument '{path}' after '{first}'");
                }
                options.input = Some(path.to_string());
            }
            other => usage!("unknown option '{other}'"),
        }
    }

    Ok(options)
}

fn parse_decimals(value: &str) -> RelayResult<usize> {
    match value.parse::<usize>() {
        Ok(n) if n <= 17 => Ok(n),
        _ => usage!("'{value}' is not a number of decimals between 0 and 17"),
    }
}

fn run(options: &Options) -> RelayResult<()> {
    let mut source = input_source(options)?;
    relay(source.as_mut(), &mut io::stdout().lock(), options.format)
}

// the output line is written only once every value has been read
fn relay(
    source: impl LineSource,
    out: &mut impl Write,
    format: NumberFormat,
) -> RelayResult<()> {
    let params = read_params(source)?;

    writeln!(out, "{}", pr_params(&params, format))?;
    out.flush()?;

    Ok(())
}

fn input_source(options: &Options) -> RelayResult<Box<dyn LineSource>> {
    match options.input.as_deref() {
        Some(path) if path != "-" => {
            info!("reading parameters from {path}");
            let file = File::open(path).map_err(|source| RelayError::Open {
                path: path.to_string(),
                source,
            })?;

            Ok(Box::new(StreamSource::new(BufReader::new(file), io::sink())))
        }
        _ if !options.quiet && io::stdin().is_terminal() => {
            info!("reading parameters interactively");
            Ok(Box::new(EditorSource::new()?))
        }
        _ => {
            info!("reading parameters from standard input");
            let prompts: Box<dyn Write> = if options.quiet {
                Box::new(io::sink())
            } else {
                Box::new(io::stderr())
            };

            Ok(Box::new(StreamSource::new(io::stdin().lock(), prompts)))
        }
    }
}
