//! CLI-only modules for the `airspace` binary.
//!
//! Submodules:
//! - [`log`]     — leveled stderr logging with colour control
//! - [`params`]  — `-p key=value,…` parameter-string parsing
//! - [`file_io`] — reading sample files, writing `.air` frames

pub mod file_io;
pub mod log;
pub mod params;

/// Name shown in the welcome banner.
pub const PROGRAM_NAME: &str = "AIRSPACE CLI";

/// Suffix appended to input filenames when no output name is given.
pub const AIRSPACE_EXTENSION: &str = ".air";

/// Marker selecting standard input as an input file.
pub const STDIN_MARK: &str = "stdin";

/// Marker selecting standard output as the output file.
pub const STDOUT_MARK: &str = "stdout";
