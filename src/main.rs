//! Entry point for the `airspace` command-line tool.
//!
//! Compresses AIRS science data files into self-describing `.air` frames
//! using the library in this crate. The decompression direction is not
//! implemented yet; invoking it reports so and exits non-zero.
//!
//! Control flow: parse arguments, configure logging and colour, resolve the
//! input list (files, `-`, or stdin) and the output target, then hand the
//! list to [`cli::file_io::compress_file_list`].

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;

use airspace::{CmpParams, CMP_VERSION_STRING};

mod cli;

use cli::log::{log_debug, log_error};
use cli::{PROGRAM_NAME, STDIN_MARK, STDOUT_MARK};

#[derive(Parser)]
#[command(
    name = "airspace",
    version = CMP_VERSION_STRING,
    about = "(De)compress AIRS science data FILE(s).",
    after_help = "With no FILE, or when FILE is -, read standard input.\n\n\
                  Examples:\n  \
                  airspace -c file1 file2 -o output.air\n  \
                  airspace -c -p preprocess=diff,encoder=golomb_zero,param=4 data.bin"
)]
struct Cli {
    /// Compress input files
    #[arg(short = 'c', long)]
    compress: bool,

    /// Compression parameters as key=value pairs separated by commas
    #[arg(short = 'p', long = "params", value_name = "PARAMS")]
    params: Option<String>,

    /// Write output to OUTPUT instead of FILE.air
    #[arg(short = 'o', value_name = "OUTPUT")]
    output: Option<String>,

    /// Write output to standard output
    #[arg(long = "stdout")]
    to_stdout: bool,

    /// Decrease verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    quiet: u8,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print colour codes in output
    #[arg(long = "color", overrides_with = "no_color")]
    color: bool,

    /// Never print colour codes
    #[arg(long = "no-color")]
    no_color: bool,

    /// Input files; - means standard input
    #[arg(value_name = "FILE")]
    files: Vec<String>,
}

fn run(args: Cli) -> ExitCode {
    let params: CmpParams = match args.params.as_deref() {
        Some(spec) => match cli::params::parse_params(spec) {
            Ok(p) => p,
            Err(msg) => {
                log_error!("incorrect parameter option: {msg}");
                return ExitCode::FAILURE;
            }
        },
        None => CmpParams::default(),
    };

    // Resolve the input list; no files (or "-") means stdin.
    let mut reading_stdin = args.files.is_empty();
    let inputs: Vec<String> = if args.files.is_empty() {
        vec![STDIN_MARK.to_owned()]
    } else {
        args.files
            .iter()
            .map(|f| {
                if f == "-" {
                    reading_stdin = true;
                    STDIN_MARK.to_owned()
                } else {
                    f.clone()
                }
            })
            .collect()
    };

    let mut output = args.output;
    if args.to_stdout {
        output = Some(STDOUT_MARK.to_owned());
    }

    if reading_stdin {
        if std::io::stdin().is_terminal() {
            log_error!("stdin is a terminal, aborting");
            return ExitCode::FAILURE;
        }
        log_debug!("using stdin as an input");

        if output.is_none() {
            if std::io::stdout().is_terminal() {
                log_error!("stdout is a terminal, aborting");
                return ExitCode::FAILURE;
            }
            log_debug!("using stdout as output");
            output = Some(STDOUT_MARK.to_owned());
        }
    }

    // No status line by default when the frame itself goes to stdout.
    if output.as_deref() == Some(STDOUT_MARK) && cli::log::display_level() == 2 {
        cli::log::decrease_verbosity();
    }

    if !args.compress {
        log_error!("decompression not implemented yet");
        return ExitCode::FAILURE;
    }

    match cli::file_io::compress_file_list(output.as_deref(), &inputs, &params) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    cli::log::setup_color();
    let args = Cli::parse();

    for _ in 0..args.quiet {
        cli::log::decrease_verbosity();
    }
    for _ in 0..args.verbose {
        cli::log::increase_verbosity();
    }
    if args.color {
        cli::log::set_color(true);
    } else if args.no_color {
        cli::log::set_color(false);
    }

    log_debug!(
        "*** {} ({}-bit) v{} ***",
        PROGRAM_NAME,
        std::mem::size_of::<usize>() * 8,
        CMP_VERSION_STRING
    );

    run(args)
}
