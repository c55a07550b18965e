use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use rust_bfi::cli_util::{Verbosity, init_logging, print_error};
use rust_bfi::config::Overrides;
use rust_bfi::{
    BrainfuckError, Config, InputSource, Interpreter, KeystrokeInput, Program, ReaderInput,
    RunControl, Tape, WriterOutput,
};
use tracing::info;

/// Exit status for command-line usage errors.
const EXIT_USAGE: i32 = 64;

#[derive(Parser, Debug)]
#[command(name = "bf", version, about = "Run a Brainfuck program from a source file")]
struct Cli {
    /// Source file to execute (fallback BF_FILE; default A.BF)
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    file: Option<PathBuf>,

    /// Tape size in bytes, must be above 1000 (fallback BF_MEMORY; default 30000)
    #[arg(short = 'm', long = "memory", value_name = "BYTES", allow_negative_numbers = true)]
    memory: Option<i64>,

    /// Abort after this many steps (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    max_steps: Option<u64>,

    /// Only print warnings and errors on stderr
    #[arg(long = "quiet", conflicts_with = "debug")]
    quiet: bool,

    /// Trace every executed instruction on stderr
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let program = std::env::args().next().unwrap_or_else(|| String::from("bf"));

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { EXIT_USAGE } else { 0 });
        }
    };

    let code = run(&program, cli);
    let _ = io::stdout().flush();
    std::process::exit(code);
}

fn run(program: &str, cli: Cli) -> i32 {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else if cli.debug {
        Verbosity::Debug
    } else {
        Verbosity::Normal
    };
    init_logging(verbosity);

    info!("BrainFuck Interpreter v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::resolve(Overrides {
        file: cli.file,
        memory: cli.memory,
        max_steps: cli.max_steps,
    });

    info!("Reading from source file '{}' ...", config.file.display());
    info!("Initialising memory block : {} bytes", config.memory);

    // The tape is sized before touching the file so a bad size fails first.
    let tape = match Tape::from_requested(config.memory) {
        Ok(tape) => tape,
        Err(err) => return fail(program, None, err),
    };

    info!("Reading file ...");
    let source = match read_source(&config.file) {
        Ok(source) => source,
        Err(err) => return fail(program, None, err),
    };

    info!("Parsing file ...");
    let parsed = match Program::parse(&source) {
        Ok(parsed) => parsed,
        Err(err) => return fail(program, Some(source.as_slice()), err),
    };

    let cancel = Arc::new(AtomicBool::new(false));
    if let Err(e) = install_interrupt_handler(cancel.clone()) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
    }

    let input: Box<dyn InputSource> = if io::stdin().is_terminal() {
        Box::new(KeystrokeInput::new(Some(cancel.clone())))
    } else {
        Box::new(ReaderInput::new(io::stdin()))
    };
    let output = WriterOutput::new(io::stdout().lock());

    info!("Executing file ...");
    let mut bf = Interpreter::new(parsed, tape, input, output)
        .with_control(RunControl::new(config.max_steps, cancel));

    match bf.run() {
        Ok(stats) => {
            info!(steps = stats.steps, "Execution finished");
            0
        }
        Err(err) => fail(program, Some(source.as_slice()), err),
    }
}

fn read_source(path: &Path) -> Result<Vec<u8>, BrainfuckError> {
    fs::read(path).map_err(|source| BrainfuckError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// The first Ctrl+C asks the interpreter to stop at its next step; a second
/// one exits at once, for runs blocked waiting on input.
fn install_interrupt_handler(cancel: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        if cancel.swap(true, Ordering::Relaxed) {
            let _ = io::stderr().flush();
            std::process::exit(130);
        }
    })
}

fn fail(program: &str, source: Option<&[u8]>, err: BrainfuckError) -> i32 {
    print_error(program, source, &err);
    err.exit_code()
}
