//! Error taxonomy and the single-`u32` result encoding.
//!
//! Library functions return `Result<_, CmpError>`. For callers that keep the
//! packed return convention of the on-wire API (a byte count or an error bit
//! pattern in one `u32`), this module also provides the boundary adapters:
//! error kind `k` is encoded as the two's-complement `0u32 − k`, so every
//! error lands in the upper range of the 32-bit space and a single
//! [`is_error`] compare separates the two cases. [`CmpError::NoError`] is
//! kind 0 and therefore encodes to 0, a success value — it exists so that
//! reset-style operations have an encodable "nothing went wrong" result.

use core::fmt;

/// Number of error kinds plus one; first code past the valid range.
/// Encoded errors occupy `(u32::MAX − MAX_CODE + 2)..=u32::MAX`.
pub const CMP_ERROR_MAX_CODE: u32 = 16;

/// Compression error kinds.
///
/// The table covers the full packed-convention taxonomy. A few kinds cannot
/// be produced through the safe Rust API (`Generic` null arguments,
/// `SrcNull`, `DstNull`, `ContextInvalid`) because references cannot be null
/// and contexts cannot exist uninitialised; they are kept so that encoded
/// error values remain stable for embedders of the `u32` convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CmpError {
    /// Kind 0 — success sentinel for reset-like operations.
    NoError = 0,
    /// Kind 1 — null required argument or a nonsensical cheap-to-check value.
    Generic = 1,
    /// Kind 2 — forbidden parameter combination or out-of-range parameter.
    ParamsInvalid = 2,
    /// Kind 3 — an uninitialised or clobbered context was used.
    ContextInvalid = 3,
    /// Kind 4 — a preprocessor needs scratch but no work buffer was supplied.
    WorkBufNull = 4,
    /// Kind 5 — the supplied work buffer is too small.
    WorkBufTooSmall = 5,
    /// Kind 6 — the work buffer is not 2-byte aligned.
    WorkBufUnaligned = 6,
    /// Kind 7 — no destination buffer was supplied.
    DstNull = 7,
    /// Kind 8 — the destination buffer cannot hold the compressed frame.
    DstTooSmall = 8,
    /// Kind 9 — the destination buffer is not 8-byte aligned.
    DstUnaligned = 9,
    /// Kind 10 — no source buffer was supplied.
    SrcNull = 10,
    /// Kind 11 — the source size is zero or otherwise unusable.
    SrcSizeWrong = 11,
    /// Kind 12 — the source size differs from the model-locked session size.
    SrcSizeMismatch = 12,
    /// Kind 13 — the original size does not fit the 24-bit header field.
    HdrOriginalTooLarge = 13,
    /// Kind 14 — the compressed size does not fit the 24-bit header field.
    HdrCmpSizeTooLarge = 14,
    /// Kind 15 — a header field exceeds its declared width (internal bug).
    IntHdr = 15,
}

impl CmpError {
    /// Stable identifier string for the error kind.
    pub fn error_name(&self) -> &'static str {
        match self {
            CmpError::NoError => "CMP_ERR_NO_ERROR",
            CmpError::Generic => "CMP_ERR_GENERIC",
            CmpError::ParamsInvalid => "CMP_ERR_PARAMS_INVALID",
            CmpError::ContextInvalid => "CMP_ERR_CONTEXT_INVALID",
            CmpError::WorkBufNull => "CMP_ERR_WORK_BUF_NULL",
            CmpError::WorkBufTooSmall => "CMP_ERR_WORK_BUF_TOO_SMALL",
            CmpError::WorkBufUnaligned => "CMP_ERR_WORK_BUF_UNALIGNED",
            CmpError::DstNull => "CMP_ERR_DST_NULL",
            CmpError::DstTooSmall => "CMP_ERR_DST_TOO_SMALL",
            CmpError::DstUnaligned => "CMP_ERR_DST_UNALIGNED",
            CmpError::SrcNull => "CMP_ERR_SRC_NULL",
            CmpError::SrcSizeWrong => "CMP_ERR_SRC_SIZE_WRONG",
            CmpError::SrcSizeMismatch => "CMP_ERR_SRC_SIZE_MISMATCH",
            CmpError::HdrOriginalTooLarge => "CMP_ERR_HDR_ORIGINAL_TOO_LARGE",
            CmpError::HdrCmpSizeTooLarge => "CMP_ERR_HDR_CMP_SIZE_TOO_LARGE",
            CmpError::IntHdr => "CMP_ERR_INT_HDR",
        }
    }

    /// Human-readable description of the error kind.
    pub fn message(&self) -> &'static str {
        match self {
            CmpError::NoError => "no error",
            CmpError::Generic => "error not further specified",
            CmpError::ParamsInvalid => "invalid compression parameters",
            CmpError::ContextInvalid => "compression context not initialised",
            CmpError::WorkBufNull => "working buffer required but not provided",
            CmpError::WorkBufTooSmall => "working buffer too small",
            CmpError::WorkBufUnaligned => "working buffer not 2-byte aligned",
            CmpError::DstNull => "destination buffer not provided",
            CmpError::DstTooSmall => "destination buffer too small for the compressed data",
            CmpError::DstUnaligned => "destination buffer not 8-byte aligned",
            CmpError::SrcNull => "source buffer not provided",
            CmpError::SrcSizeWrong => "source size is zero or unusable",
            CmpError::SrcSizeMismatch => "source size differs from the established model size",
            CmpError::HdrOriginalTooLarge => "original size exceeds the 24-bit header field",
            CmpError::HdrCmpSizeTooLarge => "compressed size exceeds the 24-bit header field",
            CmpError::IntHdr => "internal header serialization inconsistency",
        }
    }

    /// Converts a kind number to an error variant.
    /// Returns `None` for out-of-range numbers (including the
    /// [`CMP_ERROR_MAX_CODE`] sentinel).
    pub fn from_kind(kind: u32) -> Option<Self> {
        match kind {
            0 => Some(CmpError::NoError),
            1 => Some(CmpError::Generic),
            2 => Some(CmpError::ParamsInvalid),
            3 => Some(CmpError::ContextInvalid),
            4 => Some(CmpError::WorkBufNull),
            5 => Some(CmpError::WorkBufTooSmall),
            6 => Some(CmpError::WorkBufUnaligned),
            7 => Some(CmpError::DstNull),
            8 => Some(CmpError::DstTooSmall),
            9 => Some(CmpError::DstUnaligned),
            10 => Some(CmpError::SrcNull),
            11 => Some(CmpError::SrcSizeWrong),
            12 => Some(CmpError::SrcSizeMismatch),
            13 => Some(CmpError::HdrOriginalTooLarge),
            14 => Some(CmpError::HdrCmpSizeTooLarge),
            15 => Some(CmpError::IntHdr),
            _ => None,
        }
    }

    /// The packed `u32` representation of this error kind.
    #[inline]
    pub fn code(&self) -> u32 {
        0u32.wrapping_sub(*self as u32)
    }
}

impl fmt::Display for CmpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for CmpError {}

/// Returns `true` when a packed `u32` return value represents an error.
///
/// Errors occupy the top of the value range, so a plain byte count
/// (≤ 2^24) can never collide with one.
#[inline]
pub fn is_error(code: u32) -> bool {
    code > 0u32.wrapping_sub(CMP_ERROR_MAX_CODE)
}

/// Recovers the error kind from a packed `u32` return value.
/// Returns [`CmpError::NoError`] when `code` is a success value.
pub fn get_error_code(code: u32) -> CmpError {
    if !is_error(code) {
        return CmpError::NoError;
    }
    CmpError::from_kind(code.wrapping_neg()).unwrap_or(CmpError::Generic)
}

/// Human-readable message for a packed `u32` return value.
pub fn get_error_message(code: u32) -> &'static str {
    get_error_code(code).message()
}

/// Packs a `Result` from the Rust API back into the `u32` convention.
pub fn encode_result(result: Result<u32, CmpError>) -> u32 {
    match result {
        Ok(size) => size,
        Err(e) => e.code(),
    }
}
