//! Shared infrastructure below the compression pipeline.
//!
//! Submodules:
//! - [`bithacks`]  — integer utilities (logarithms, zig-zag map, work-buffer slots)
//! - [`bitstream`] — MSB-first bit appender with rewind and sticky overflow
//! - [`header`]    — bit-exact 24-byte frame-header codec
//! - [`checksum`]  — Fletcher-32 digest of the original samples

pub mod bithacks;
pub mod bitstream;
pub mod checksum;
pub mod header;
