//! AIRSPACE — a streaming compression engine for 16-bit instrument sample
//! streams.
//!
//! The engine accepts successive same-sized buffers of unsigned 16-bit
//! samples and emits one self-describing frame per buffer: a fixed 24-byte
//! header, a bit-packed payload, and an optional Fletcher-32 tail over the
//! original samples. A small session state machine lets later passes borrow
//! information from earlier ones (model-based preprocessing), and an
//! optional fallback guarantees a frame never grows past
//! header + raw samples + checksum.
//!
//! ```
//! use airspace::{cal_work_buf_size, compress_bound, CmpContext, CmpParams};
//!
//! let params = CmpParams::default(); // uncompressed mode
//! let src = [0x0001u16, 0x0203];
//!
//! assert_eq!(cal_work_buf_size(&params, 4).unwrap(), 0);
//!
//! // The destination must be 8-byte aligned; over-allocate and align.
//! let bound = compress_bound(4).unwrap() as usize;
//! let mut backing = vec![0u8; bound + 8];
//! let off = backing.as_ptr().align_offset(8);
//! let dst = &mut backing[off..off + bound];
//!
//! let mut ctx = CmpContext::new(&params, None).unwrap();
//! let size = ctx.compress_u16(dst, &src).unwrap();
//! assert_eq!(size, 28);
//! ```
//!
//! The library core performs no I/O and no allocation; all buffers are
//! caller-provided. The `airspace` binary in this crate layers file handling
//! and logging on top.

pub mod common;
pub mod compress;
pub mod error;

// ─────────────────────────────────────────────────────────────────────────────
// Primary API re-exports
// ─────────────────────────────────────────────────────────────────────────────

/// Compression context; create one per stream with [`CmpContext::new`].
pub use compress::engine::CmpContext;
/// Worst-case frame size for a given input byte count.
pub use compress::engine::compress_bound;
/// Work-buffer size a parameter set needs for a given input byte count.
pub use compress::engine::cal_work_buf_size;
/// Compression parameters and their enums.
pub use compress::{CmpParams, EncoderType, Preprocessing};
/// Bounds on the parameter space.
pub use compress::{CMP_MAX_MODEL_RATE, CMP_MAX_SECONDARY_ITERATIONS};

// ─────────────────────────────────────────────────────────────────────────────
// Timestamp hook
// ─────────────────────────────────────────────────────────────────────────────

/// Installs or clears the process-wide timestamp provider.
pub use compress::timestamp::set_timestamp_func;
/// Signature of a timestamp provider.
pub use compress::timestamp::TimestampFn;

// ─────────────────────────────────────────────────────────────────────────────
// Errors and the packed-u32 boundary convention
// ─────────────────────────────────────────────────────────────────────────────

/// Error kinds returned by every fallible operation.
pub use error::CmpError;
/// Tests a packed `u32` return value for the error range.
pub use error::is_error;
/// Recovers the error kind from a packed `u32` return value.
pub use error::get_error_code;
/// Human-readable message for a packed `u32` return value.
pub use error::get_error_message;

// ─────────────────────────────────────────────────────────────────────────────
// Frame format
// ─────────────────────────────────────────────────────────────────────────────

/// Decoded frame-header fields.
pub use common::header::CmpHdr;
/// Decodes the leading header bytes of a frame.
pub use common::header::cmp_hdr_deserialize;
pub use common::header::{
    CMP_CHECKSUM_SIZE, CMP_HDR_MAX_COMPRESSED_SIZE, CMP_HDR_MAX_ORIGINAL_SIZE, CMP_HDR_SIZE,
};

/// Fletcher-32 digest as emitted in the frame tail.
pub use common::checksum::cmp_checksum;

// ─────────────────────────────────────────────────────────────────────────────
// Version information
// ─────────────────────────────────────────────────────────────────────────────

/// Major part of the library version.
pub const CMP_VERSION_MAJOR: u32 = 0;
/// Minor part of the library version.
pub const CMP_VERSION_MINOR: u32 = 3;
/// Release part of the library version.
pub const CMP_VERSION_RELEASE: u32 = 0;
/// Complete version number as recorded in every frame header.
pub const CMP_VERSION_NUMBER: u32 =
    CMP_VERSION_MAJOR * 100 * 100 + CMP_VERSION_MINOR * 100 + CMP_VERSION_RELEASE;
/// Complete version string.
pub const CMP_VERSION_STRING: &str = "0.3.0";

/// Returns the library version number (e.g. 300 for v0.3.0).
pub fn version_number() -> u32 {
    CMP_VERSION_NUMBER
}

/// Returns the library version string (e.g. `"0.3.0"`).
pub fn version_string() -> &'static str {
    CMP_VERSION_STRING
}
