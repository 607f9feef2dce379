//! Compression context and the per-pass pipeline.
//!
//! A [`CmpContext`] is a small state machine keyed by a 48-bit session
//! identifier and a pass counter. The first pass of a session runs the
//! primary preprocessing/encoder pair; the following `secondary_iterations`
//! passes run the secondary pair, typically model-based. When the counter
//! would run past `secondary_iterations`, the next pass implicitly starts a
//! fresh session with a new identifier.
//!
//! One pass produces one self-describing frame: the header is serialized
//! with a placeholder size, the residuals are encoded behind it, the
//! optional checksum tail is appended, and the header is rewritten in place
//! once the total length is known.
//!
//! The context owns no memory: the work buffer is borrowed from the caller
//! for the context's lifetime and the destination buffer only for the
//! duration of a single call. Nothing here allocates, blocks, or touches
//! floating point.

use crate::common::bithacks::{work_get_u16, work_set_u16};
use crate::common::bitstream::BitstreamWriter;
use crate::common::checksum::cmp_checksum;
use crate::common::header::{
    cmp_hdr_serialize, CmpHdr, CMP_CHECKSUM_SIZE, CMP_HDR_MAX_ORIGINAL_SIZE, CMP_HDR_SIZE,
};
use crate::compress::timestamp::{next_identifier, TimestampFn};
use crate::compress::{
    encoder, preprocess, CmpParams, EncoderType, Preprocessing, CMP_MAX_MODEL_RATE,
    CMP_MAX_SECONDARY_ITERATIONS,
};
use crate::error::CmpError;
use crate::CMP_VERSION_NUMBER;

/// Source size used to size-check the work buffer at context creation; the
/// real requirement is rechecked against the actual input on every pass.
const MIN_SRC_SIZE: u32 = 2;

/// Returns the worst-case compressed frame size for a `src_size`-byte input.
///
/// A destination buffer of this size is guaranteed to be large enough for
/// any parameter set. Fails with [`CmpError::HdrOriginalTooLarge`] when
/// `src_size` exceeds the 24-bit header field and with
/// [`CmpError::HdrCmpSizeTooLarge`] when the bound itself would not fit the
/// 24-bit compressed-size field.
pub fn compress_bound(src_size: u32) -> Result<u32, CmpError> {
    if src_size > CMP_HDR_MAX_ORIGINAL_SIZE {
        return Err(CmpError::HdrOriginalTooLarge);
    }

    let bound = u64::from(CMP_HDR_SIZE)
        + u64::from(CMP_CHECKSUM_SIZE)
        + encoder::max_compressed_size(src_size);

    if bound > u64::from(crate::common::header::CMP_HDR_MAX_COMPRESSED_SIZE) {
        return Err(CmpError::HdrCmpSizeTooLarge);
    }
    Ok(bound as u32)
}

/// Returns the work-buffer size in bytes that `params` needs for
/// `src_size`-byte inputs: the maximum over the primary method and, when
/// secondary passes are enabled, the secondary method. Can be 0.
pub fn cal_work_buf_size(params: &CmpParams, src_size: u32) -> Result<u32, CmpError> {
    if params.primary_preprocessing == Preprocessing::Model {
        return Err(CmpError::ParamsInvalid);
    }

    let primary = preprocess::get_work_buf_size(params.primary_preprocessing, src_size);
    let secondary = if params.secondary_iterations > 0 {
        preprocess::get_work_buf_size(params.secondary_preprocessing, src_size)
    } else {
        0
    };

    Ok(primary.max(secondary))
}

/// Weighted average of the current model slot and the new sample; a higher
/// `model_rate` keeps more of the model.
fn update_model(data: u16, model: u16, model_rate: u32) -> u16 {
    let weighted_data = u32::from(data) * (CMP_MAX_MODEL_RATE - model_rate);
    let weighted_model = u32::from(model) * model_rate;

    ((weighted_model + weighted_data) / CMP_MAX_MODEL_RATE) as u16
}

/// Compression context: parameters, session state, and the borrowed work
/// buffer.
///
/// Construction validates the parameters, so a context in hand is always
/// usable; dropping it releases the work-buffer borrow.
#[derive(Debug)]
pub struct CmpContext<'a> {
    params: CmpParams,
    work_buf: Option<&'a mut [u8]>,
    /// Original byte count locked on the first pass of a session; the input
    /// size must not change until the next reset while model preprocessing
    /// is active.
    model_size: u64,
    /// 48-bit session identifier; refreshed on every reset.
    identifier: u64,
    /// Passes performed since the last reset.
    sequence_number: u8,
    /// Per-context timestamp provider; `None` defers to the process-wide one.
    timestamp_fn: Option<TimestampFn>,
}

impl<'a> CmpContext<'a> {
    /// Creates a context using the process-wide timestamp provider.
    ///
    /// `work_buf` supplies the preprocessor scratch; it may be `None` when
    /// no configured preprocessing needs any (see [`cal_work_buf_size`]).
    /// The buffer must be 2-byte aligned and stays borrowed until the
    /// context is dropped.
    pub fn new(params: &CmpParams, work_buf: Option<&'a mut [u8]>) -> Result<Self, CmpError> {
        Self::init(params, work_buf, None)
    }

    /// Creates a context with its own timestamp provider, bypassing the
    /// process-wide state entirely.
    pub fn with_timestamp(
        params: &CmpParams,
        work_buf: Option<&'a mut [u8]>,
        timestamp_fn: TimestampFn,
    ) -> Result<Self, CmpError> {
        Self::init(params, work_buf, Some(timestamp_fn))
    }

    fn init(
        params: &CmpParams,
        work_buf: Option<&'a mut [u8]>,
        timestamp_fn: Option<TimestampFn>,
    ) -> Result<Self, CmpError> {
        if params.secondary_iterations > CMP_MAX_SECONDARY_ITERATIONS {
            return Err(CmpError::ParamsInvalid);
        }

        encoder::params_check(
            params.primary_encoder_type,
            params.primary_encoder_param,
            params.primary_encoder_outlier,
        )?;

        if params.secondary_iterations > 0 {
            encoder::params_check(
                params.secondary_encoder_type,
                params.secondary_encoder_param,
                params.secondary_encoder_outlier,
            )?;

            if params.model_rate > CMP_MAX_MODEL_RATE
                && params.secondary_preprocessing == Preprocessing::Model
            {
                return Err(CmpError::ParamsInvalid);
            }
        }

        // Rejects primary model preprocessing as a side effect.
        let work_buf_needed = cal_work_buf_size(params, MIN_SRC_SIZE)?;
        if work_buf_needed > 0 {
            match &work_buf {
                None => return Err(CmpError::WorkBufNull),
                Some(buf) if buf.is_empty() => return Err(CmpError::WorkBufTooSmall),
                Some(buf) if buf.as_ptr() as usize & 1 != 0 => {
                    return Err(CmpError::WorkBufUnaligned)
                }
                Some(_) => {}
            }
        }

        let mut ctx = CmpContext {
            params: *params,
            work_buf,
            model_size: 0,
            identifier: 0,
            sequence_number: 0,
            timestamp_fn,
        };
        ctx.reset();
        Ok(ctx)
    }

    /// Ends the current session: zeroes the pass counter and the locked
    /// model size, and draws a fresh identifier from the timestamp provider.
    pub fn reset(&mut self) {
        self.sequence_number = 0;
        self.model_size = 0;
        self.identifier = next_identifier(self.timestamp_fn);
    }

    /// The parameters this context was created with.
    pub fn params(&self) -> &CmpParams {
        &self.params
    }

    /// Compresses one buffer of samples into `dst` and returns the frame
    /// length in bytes.
    ///
    /// `dst` must be 8-byte aligned; `compress_bound` of the input byte
    /// count is always a sufficient capacity. With
    /// `uncompressed_fallback_enabled` and a destination at least as large
    /// as the raw frame, a pass whose encoded form would expand the data is
    /// restarted as an uncompressed frame, so the result never exceeds
    /// header + samples + optional checksum.
    pub fn compress_u16(&mut self, dst: &mut [u8], src: &[u16]) -> Result<u32, CmpError> {
        let mut uncompressed_size = u64::from(CMP_HDR_SIZE) + src.len() as u64 * 2;
        if self.params.checksum_enabled {
            uncompressed_size += u64::from(CMP_CHECKSUM_SIZE);
        }

        // Fallback needs enough room for the raw frame to be worth trying.
        if !self.params.uncompressed_fallback_enabled || (dst.len() as u64) < uncompressed_size {
            return self.compress_engine(dst, src);
        }

        // Give the engine only as much room as the raw frame would take; a
        // capacity overflow then means compression expands the data.
        let clamped = uncompressed_size as usize;
        match self.compress_engine(&mut dst[..clamped], src) {
            Err(CmpError::DstTooSmall) => {}
            other => return other,
        }

        // Restart the session so no half-updated model survives, then
        // rerun this pass in uncompressed mode.
        self.reset();
        let saved_preprocessing = self.params.primary_preprocessing;
        let saved_encoder_type = self.params.primary_encoder_type;
        self.params.primary_preprocessing = Preprocessing::None;
        self.params.primary_encoder_type = EncoderType::Uncompressed;

        let result = self.compress_engine(&mut dst[..clamped], src);

        self.params.primary_preprocessing = saved_preprocessing;
        self.params.primary_encoder_type = saved_encoder_type;
        result
    }

    /// One pass of the pipeline: session bookkeeping, header placeholder,
    /// residual encoding, checksum tail, header patch.
    fn compress_engine(&mut self, dst: &mut [u8], src: &[u16]) -> Result<u32, CmpError> {
        let src_size = src.len() as u64 * 2;

        let selected_preprocessing;
        let selected_encoder_type;
        let selected_encoder_param;
        let selected_outlier;

        if self.sequence_number == 0
            || u32::from(self.sequence_number) > self.params.secondary_iterations
        {
            // New session: primary settings, lock the model size.
            self.reset();
            selected_preprocessing = self.params.primary_preprocessing;
            selected_encoder_type = self.params.primary_encoder_type;
            selected_encoder_param = self.params.primary_encoder_param;
            selected_outlier = self.params.primary_encoder_outlier;
            self.model_size = src_size;
        } else {
            selected_preprocessing = self.params.secondary_preprocessing;
            selected_encoder_type = self.params.secondary_encoder_type;
            selected_encoder_param = self.params.secondary_encoder_param;
            selected_outlier = self.params.secondary_encoder_outlier;
            // The model is indexed per sample; the input size is locked
            // until the session ends.
            if self.params.secondary_preprocessing == Preprocessing::Model
                && src_size != self.model_size
            {
                return Err(CmpError::SrcSizeMismatch);
            }
        }

        let model_is_needed = self.params.secondary_preprocessing == Preprocessing::Model
            && self.params.secondary_iterations != 0;
        if model_is_needed {
            let work_len = self.work_buf.as_ref().map_or(0, |b| b.len()) as u64;
            if work_len < src_size {
                return Err(CmpError::WorkBufTooSmall);
            }
        }

        if src_size > u64::from(CMP_HDR_MAX_ORIGINAL_SIZE) {
            return Err(CmpError::HdrOriginalTooLarge);
        }

        let dst_capacity = dst.len() as u64;
        let mut bs = BitstreamWriter::new(dst)?;
        let enc = encoder::CmpEncoder::new(
            selected_encoder_type,
            selected_encoder_param,
            selected_outlier,
        )?;

        let mut hdr = CmpHdr {
            version_flag: 1,
            version_id: CMP_VERSION_NUMBER as u16,
            compressed_size: 0, // placeholder, patched after the flush
            original_size: src_size as u32,
            sequence_number: self.sequence_number,
            preprocessing: selected_preprocessing as u8,
            checksum_enabled: u8::from(self.params.checksum_enabled),
            encoder_type: selected_encoder_type as u8,
            ..CmpHdr::default()
        };
        hdr.identifier = self.identifier;
        if selected_preprocessing == Preprocessing::Model {
            hdr.model_rate = self.params.model_rate as u8;
        }
        if selected_encoder_type != EncoderType::Uncompressed {
            hdr.encoder_param = selected_encoder_param as u16;
            hdr.encoder_outlier = enc.outlier();
        }
        cmp_hdr_serialize(&mut bs, &hdr)?;

        // With a bound-sized destination the stream cannot overflow, so the
        // per-sample overflow probe is only worth running below the bound.
        let bound = compress_bound(src_size as u32)
            .map(u64::from)
            .unwrap_or(u64::MAX);
        let probe_overflow = dst_capacity < bound;

        let first_pass = self.sequence_number == 0;
        let model_rate = self.params.model_rate;
        let checksum_enabled = self.params.checksum_enabled;

        let mut no_work: [u8; 0] = [];
        let work: &mut [u8] = match self.work_buf.as_deref_mut() {
            Some(buf) => buf,
            None => &mut no_work,
        };

        let n_values = preprocess::prepare(selected_preprocessing, src, work)?;

        for i in 0..n_values as usize {
            let value = preprocess::residual(selected_preprocessing, i, src, work);
            enc.encode_s16(value, &mut bs);
            if probe_overflow && bs.has_error() {
                break;
            }

            if model_is_needed {
                let slot = if first_pass {
                    src[i]
                } else {
                    update_model(src[i], work_get_u16(work, i), model_rate)
                };
                work_set_u16(work, i, slot);
            }
        }

        if checksum_enabled {
            let checksum = cmp_checksum(src);
            bs.pad_last_byte();
            bs.add_bits32(checksum);
        }

        hdr.compressed_size = bs.flush()?;

        // The final size is known only now; patch it into the header.
        bs.rewind();
        cmp_hdr_serialize(&mut bs, &hdr)?;

        self.sequence_number = self.sequence_number.wrapping_add(1);
        Ok(hdr.compressed_size)
    }
}
