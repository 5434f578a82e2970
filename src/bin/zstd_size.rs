use std::convert::TryFrom;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use color_eyre::eyre;
use tracing::{debug, info, Level};
use zstd_size::{ContentSize, Frame, ScanError};

/// Print the decompressed size of a zstd compressed file.
///
/// The size is read from the frame headers, nothing is decompressed.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The zstd compressed file to inspect
    file: PathBuf,

    /// Log every frame found in the file to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, thiserror::Error)]
enum Failure {
    #[error("stat: {}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("open: {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not allocate {size} bytes to hold {}", .path.display())]
    Alloc {
        path: PathBuf,
        size: u64,
        #[source]
        source: std::collections::TryReserveError,
    },
    #[error("read: {}: expected {expected} bytes, got {got}", .path.display())]
    ShortRead {
        path: PathBuf,
        expected: u64,
        got: u64,
    },
    #[error("read: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: it was not compressed by zstd", .path.display())]
    NotZstd {
        path: PathBuf,
        #[source]
        source: ScanError,
    },
    #[error("{}: original size unknown", .path.display())]
    UnknownSize { path: PathBuf },
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Failure::Stat { .. } => 2,
            Failure::Open { .. } => 3,
            Failure::Alloc { .. } => 4,
            Failure::ShortRead { .. } | Failure::Read { .. } => 5,
            Failure::NotZstd { .. } => 6,
            Failure::UnknownSize { .. } => 7,
        }
    }
}

const USAGE_EXIT_CODE: u8 = 1;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if err.print().is_err() {
                eprintln!("{err}");
            }
            // --help and --version are not failures
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(USAGE_EXIT_CODE),
            };
        }
    };

    if let Err(err) = color_eyre::install() {
        eprintln!("failed to install error report handler: {err}");
    }
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .without_time()
        .init();

    match run(&cli.file) {
        Ok(size) => {
            let mut stdout = io::stdout().lock();
            // Written without a trailing newline so the output can be used as is
            if let Err(err) = write!(stdout, "{size}").and_then(|_| stdout.flush()) {
                eprintln!("{:?}", eyre::Report::new(err));
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(failure) => {
            let code = failure.exit_code();
            eprintln!("{:?}", eyre::Report::new(failure));
            ExitCode::from(code)
        }
    }
}

fn run(path: &Path) -> Result<u64, Failure> {
    let buffer = load_file(path)?;
    debug!(path = %path.display(), bytes = buffer.len(), "loaded file");

    if tracing::enabled!(Level::DEBUG) {
        log_frames(&buffer);
    }

    match zstd_size::scan(&buffer) {
        Ok(ContentSize::Known(size)) => {
            info!(size, "found decompressed size");
            Ok(size)
        }
        Ok(ContentSize::Unknown) => Err(Failure::UnknownSize {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(Failure::NotZstd {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn load_file(path: &Path) -> Result<Vec<u8>, Failure> {
    let expected = fs::metadata(path)
        .map_err(|source| Failure::Stat {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    let mut file = File::open(path).map_err(|source| Failure::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut buffer = Vec::new();
    let capacity = usize::try_from(expected).unwrap_or(usize::MAX);
    buffer
        .try_reserve_exact(capacity)
        .map_err(|source| Failure::Alloc {
            path: path.to_path_buf(),
            size: expected,
            source,
        })?;

    let got = file
        .read_to_end(&mut buffer)
        .map_err(|source| Failure::Read {
            path: path.to_path_buf(),
            source,
        })? as u64;
    if got != expected {
        return Err(Failure::ShortRead {
            path: path.to_path_buf(),
            expected,
            got,
        });
    }
    Ok(buffer)
}

fn log_frames(buffer: &[u8]) {
    for frame in zstd_size::frames(buffer) {
        match frame {
            Ok(Frame::Skippable {
                offset,
                magic_number,
                length,
            }) => {
                debug!(offset, magic_number = %format_args!("0x{magic_number:X}"), length, "skippable frame");
            }
            Ok(Frame::Standard { offset, header }) => {
                debug!(
                    offset,
                    header_size = header.header_size(),
                    content_size = ?header.frame_content_size(),
                    dictionary_id = ?header.dictionary_id(),
                    single_segment = header.descriptor.single_segment_flag(),
                    checksum = header.descriptor.content_checksum_flag(),
                    "zstd frame"
                );
            }
            Err(err) => {
                debug!(%err, "stopped at invalid frame");
                break;
            }
        }
    }
}
