use std::{env, fs::read_to_string, path::PathBuf, process::ExitCode, time::{Duration, Instant}};

use archit::{
    display_error,
    script_run::{
        config::{InterpreterConfig, RunOptions},
        interpreter::Interpreter,
    },
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: archit <script> [--animate N] [--max-depth N] [--tick-ms N] [-- args...]";

struct Arguments {
    script: PathBuf,
    config: InterpreterConfig,
    animation_speed: Option<u32>,
    script_args: String,
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("{} needs a value", flag))?;
    value
        .parse()
        .map_err(|_| format!("{} expects a number, received {:?}", flag, value))
}

fn parse_arguments(mut args: impl Iterator<Item = String>) -> Result<Arguments, String> {
    let mut script = None;
    let mut config = InterpreterConfig::default();
    let mut animation_speed = None;
    let mut script_args = vec![];

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--animate" => animation_speed = Some(parse_number(&arg, args.next())?),
            "--max-depth" => config.max_recursion_depth = parse_number(&arg, args.next())?,
            "--tick-ms" => config.tick_budget = Duration::from_millis(parse_number(&arg, args.next())?),
            "--" => script_args.extend(args.by_ref()),
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            _ if script.is_none() => script = Some(PathBuf::from(arg)),
            _ => return Err(format!("unexpected argument {:?}", arg)),
        }
    }

    Ok(Arguments {
        script: script.ok_or_else(|| String::from("no script given"))?,
        config,
        animation_speed,
        script_args: script_args.join(" "),
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let arguments = match parse_arguments(env::args().skip(1)) {
        Ok(arguments) => arguments,
        Err(message) => {
            eprintln!("{}\n{}", message, USAGE);
            return ExitCode::from(2);
        }
    };

    let start = Instant::now();
    let interpreter = Interpreter::new(arguments.config);
    let options = RunOptions {
        animation_speed: arguments.animation_speed,
        args: arguments.script_args,
        ..RunOptions::default()
    };

    match interpreter.run_to_completion(&arguments.script, options) {
        Ok(run) => {
            info!("Ran {} in {:?} over {} ticks", run.id(), start.elapsed(), run.ticks());
            ExitCode::SUCCESS
        }
        Err(err) => {
            match read_to_string(&arguments.script) {
                Ok(source) => display_error(&err, &source),
                Err(_) => eprintln!("{}", err),
            }
            ExitCode::FAILURE
        }
    }
}
