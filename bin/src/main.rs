use std::{
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;

use errors::{Line, Reporter};
use interpreter::Interpreter;
use lox::RunError;

/// Exit codes follow sysexits.h.
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;
const EX_IOERR: u8 = 74;

#[derive(clap::Parser)]
#[command(about = "Runs a Lox script, or starts a prompt when no file is given")]
struct Args {
    file: Option<PathBuf>,

    /// Print the syntax tree of each statement instead of running it
    #[arg(long)]
    print_ast: bool,
}

#[derive(Default)]
struct StderrReporter {
    had_runtime_error: bool,
}

impl Reporter for StderrReporter {
    fn runtime_error(&mut self, line: Line, message: &str) {
        eprintln!("{message}\n[line {line}]");
        self.had_runtime_error = true;
    }
}

fn run(
    source: &str,
    print_ast: bool,
    interpreter: &mut Interpreter<std::io::Stdout>,
    reporter: &mut StderrReporter,
) -> Result<(), RunError> {
    if print_ast {
        lox::print_ast(source, &mut stdout())
    } else {
        lox::run(source, interpreter, reporter)
    }
}

fn run_file(path: &Path, print_ast: bool) -> anyhow::Result<ExitCode> {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Could not read {}: {e}", path.display());
            return Ok(ExitCode::from(EX_IOERR));
        }
    };

    let mut reporter = StderrReporter::default();
    match run(&source, print_ast, &mut Interpreter::default(), &mut reporter) {
        Ok(()) if reporter.had_runtime_error => Ok(ExitCode::from(EX_SOFTWARE)),
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(RunError::Static(errors)) => {
            eprintln!("{errors}");
            Ok(ExitCode::from(EX_DATAERR))
        }
        Err(RunError::Io(e)) => Err(e.into()),
    }
}

fn run_prompt(print_ast: bool) -> anyhow::Result<ExitCode> {
    let mut interpreter = Interpreter::default();
    let mut reporter = StderrReporter::default();

    loop {
        print!("> ");
        stdout().flush()?;
        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            return Ok(ExitCode::SUCCESS);
        }

        match run(&line, print_ast, &mut interpreter, &mut reporter) {
            Ok(()) => (),
            Err(RunError::Static(errors)) => eprintln!("{errors}"),
            Err(RunError::Io(e)) => return Err(e.into()),
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();
    log::debug!("Starting with file {:?}, print_ast: {}", args.file, args.print_ast);

    match args.file {
        Some(file) => run_file(&file, args.print_ast),
        None => run_prompt(args.print_ast),
    }
}
