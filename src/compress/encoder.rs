//! Entropy encoders: uncompressed, Golomb with zero escape, Golomb with
//! multi escape.
//!
//! Signed residuals are first mapped onto the non-negative integers with the
//! zig-zag bijection, then coded. Golomb codewords are a unary quotient
//! (`q` one-bits and a terminating zero) followed by a binary remainder —
//! `log2(m)` bits on the power-of-two fast path, truncated binary otherwise.
//!
//! Both Golomb variants carry an escape mechanism that caps the codeword
//! length for residuals far outside the tuned range:
//!
//! - **zero escape**: mapped values are shifted by +1 so the codeword for 0
//!   is never produced by regular data; values at or above the internal
//!   threshold (`16 × param`, recorded in the frame header) are sent as the
//!   codeword for 0 followed by the unshifted mapped value in a 32-bit
//!   field.
//! - **multi escape**: values below the caller-chosen `outlier` threshold
//!   are coded normally; the rest are sent as a `outlier / param`-long unary
//!   prefix followed by the mapped value in a `ceil(log2(2·outlier))`-bit
//!   field.

use crate::common::bithacks::{ceil_ilog2, ilog2, is_power_of_two, map_to_pos, round_up_even};
use crate::common::bitstream::BitstreamWriter;
use crate::compress::EncoderType;
use crate::error::CmpError;

/// Largest allowed Golomb divisor parameter.
pub const CMP_ENCODER_MAX_PARAM: u32 = 32;

/// Largest allowed multi-escape outlier threshold (the zig-zag domain).
pub const CMP_ENCODER_MAX_OUTLIER: u32 = (1 << 16) - 1;

/// Zero-escape threshold per unit of the divisor parameter.
const ZERO_ESCAPE_FACTOR: u32 = 16;

/// Field width of the zero-escape raw value.
const ZERO_ESCAPE_RAW_BITS: u32 = 32;

/// Worst-case encoded bits per 16-bit sample, across encoders.
const MAX_BITS_PER_SAMPLE: u64 = 48;

/// Validates an encoder parameter pair for `encoder_type`.
///
/// The uncompressed encoder ignores both values. The zero-escape coder
/// checks only the divisor (its threshold is internal). The multi-escape
/// coder additionally requires `param ≤ outlier ≤ 2^16 − 1`, with `outlier`
/// a multiple of a power-of-two `param` so that the escape prefix stays
/// decodable on the Rice fast path.
pub fn params_check(encoder_type: EncoderType, param: u32, outlier: u32) -> Result<(), CmpError> {
    match encoder_type {
        EncoderType::Uncompressed => Ok(()),
        EncoderType::GolombZero => {
            if param == 0 || param > CMP_ENCODER_MAX_PARAM {
                return Err(CmpError::ParamsInvalid);
            }
            Ok(())
        }
        EncoderType::GolombMulti => {
            if param == 0 || param > CMP_ENCODER_MAX_PARAM {
                return Err(CmpError::ParamsInvalid);
            }
            if outlier < param || outlier > CMP_ENCODER_MAX_OUTLIER {
                return Err(CmpError::ParamsInvalid);
            }
            if is_power_of_two(param) && outlier % param != 0 {
                return Err(CmpError::ParamsInvalid);
            }
            Ok(())
        }
    }
}

/// A configured entropy encoder for one compression pass.
#[derive(Debug, Clone, Copy)]
pub struct CmpEncoder {
    kind: EncoderType,
    param: u32,
    log2_param: u32,
    /// Escape threshold: internal (`16 × param`) for zero escape, the
    /// caller's value for multi escape, 0 for uncompressed.
    outlier: u32,
    /// Raw-field width used after an escape.
    escape_bits: u32,
}

impl CmpEncoder {
    /// Validates the parameters and derives the per-pass constants.
    pub fn new(kind: EncoderType, param: u32, outlier: u32) -> Result<Self, CmpError> {
        params_check(kind, param, outlier)?;
        let enc = match kind {
            EncoderType::Uncompressed => CmpEncoder {
                kind,
                param: 0,
                log2_param: 0,
                outlier: 0,
                escape_bits: 0,
            },
            EncoderType::GolombZero => CmpEncoder {
                kind,
                param,
                log2_param: ilog2(param),
                outlier: ZERO_ESCAPE_FACTOR * param,
                escape_bits: ZERO_ESCAPE_RAW_BITS,
            },
            EncoderType::GolombMulti => CmpEncoder {
                kind,
                param,
                log2_param: ilog2(param),
                outlier,
                escape_bits: ceil_ilog2(2 * outlier),
            },
        };
        Ok(enc)
    }

    /// The effective escape threshold recorded in the frame header.
    #[inline]
    pub fn outlier(&self) -> u32 {
        self.outlier
    }

    /// Golomb codeword for a non-negative `value`: unary quotient, then a
    /// `log2(param)`-bit remainder (truncated binary when the divisor is not
    /// a power of two).
    fn golomb_encode(&self, value: u32, bs: &mut BitstreamWriter<'_>) {
        let q = value / self.param;
        bs.add_unary(q);
        bs.add_bits(0, 1);

        if is_power_of_two(self.param) {
            if self.log2_param > 0 {
                bs.add_bits(value & (self.param - 1), self.log2_param);
            }
        } else {
            let r = value % self.param;
            let cutoff = (1 << (self.log2_param + 1)) - self.param;
            if r < cutoff {
                bs.add_bits(r, self.log2_param);
            } else {
                bs.add_bits(r + cutoff, self.log2_param + 1);
            }
        }
    }

    /// Emits one signed residual into the bitstream.
    pub fn encode_s16(&self, value: i16, bs: &mut BitstreamWriter<'_>) {
        match self.kind {
            EncoderType::Uncompressed => {
                bs.add_bits(u32::from(value as u16), 16);
            }
            EncoderType::GolombZero => {
                let mapped = map_to_pos(value);
                let shifted = mapped + 1;
                if shifted < self.outlier {
                    self.golomb_encode(shifted, bs);
                } else {
                    self.golomb_encode(0, bs);
                    bs.add_bits(mapped, self.escape_bits);
                }
            }
            EncoderType::GolombMulti => {
                let mapped = map_to_pos(value);
                if mapped < self.outlier {
                    self.golomb_encode(mapped, bs);
                } else {
                    bs.add_unary(self.outlier / self.param);
                    bs.add_bits(0, 1);
                    bs.add_bits(mapped, self.escape_bits);
                }
            }
        }
    }
}

/// Worst-case compressed payload size in bytes for `src_size` input bytes,
/// independent of the selected encoder and parameters.
///
/// Covers every escape-capped codeword the coders emit for sanely chosen
/// thresholds; the bitstream's sticky capacity check remains the backstop.
pub fn max_compressed_size(src_size: u32) -> u64 {
    let n_samples = u64::from(round_up_even(src_size)) / 2;
    n_samples * MAX_BITS_PER_SAMPLE / 8
}
