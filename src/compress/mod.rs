//! The compression pipeline: parameter model, preprocessors, entropy
//! encoders, and the engine that orchestrates them.

pub mod encoder;
pub mod engine;
pub mod preprocess;
pub mod timestamp;

/// Upper bound on `secondary_iterations`; the pass counter must fit the
/// 8-bit header field.
pub const CMP_MAX_SECONDARY_ITERATIONS: u32 = (1 << 8) - 1;

/// Largest allowed model adaptation rate.
pub const CMP_MAX_MODEL_RATE: u32 = 16;

/// Preprocessing applied to the samples before entropy encoding.
///
/// Preprocessing turns the raw samples into signed residuals; a good choice
/// concentrates the residuals around zero, which is what the Golomb coders
/// reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Preprocessing {
    /// Samples pass through unchanged (reinterpreted as signed).
    #[default]
    None = 0,
    /// Differences between neighbouring samples.
    Diff = 1,
    /// Single-level integer wavelet transform.
    Iwt = 2,
    /// Subtracts a per-index model built from earlier passes; only allowed
    /// as secondary preprocessing.
    Model = 3,
}

/// Entropy encoder emitting the residuals into the bitstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum EncoderType {
    /// Residuals are stored as plain 16-bit fields.
    #[default]
    Uncompressed = 0,
    /// Golomb coder with the zero-escape mechanism.
    GolombZero = 1,
    /// Golomb coder with the multi-escape mechanism.
    GolombMulti = 2,
}

/// Compression parameters, immutable once a context is created.
///
/// The primary fields configure the first pass of a session; the secondary
/// fields configure the following `secondary_iterations` passes and are
/// ignored when `secondary_iterations` is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CmpParams {
    /// Preprocessing for the first pass; [`Preprocessing::Model`] is not
    /// allowed here.
    pub primary_preprocessing: Preprocessing,
    /// Encoder used in the first pass.
    pub primary_encoder_type: EncoderType,
    /// Divisor parameter for the primary encoder.
    pub primary_encoder_param: u32,
    /// Escape threshold for [`EncoderType::GolombMulti`] in the first pass.
    pub primary_encoder_outlier: u32,

    /// Maximum number of secondary passes (0 = disabled).
    pub secondary_iterations: u32,
    /// Preprocessing for secondary passes; may be [`Preprocessing::Model`].
    pub secondary_preprocessing: Preprocessing,
    /// Encoder for secondary passes.
    pub secondary_encoder_type: EncoderType,
    /// Divisor parameter for the secondary encoder.
    pub secondary_encoder_param: u32,
    /// Escape threshold for [`EncoderType::GolombMulti`] in secondary passes.
    pub secondary_encoder_outlier: u32,
    /// Model adaptation rate in `[0, 16]`; higher adapts more slowly.
    pub model_rate: u32,

    /// Append a Fletcher-32 digest of the original samples to each frame.
    pub checksum_enabled: bool,
    /// Store the samples uncompressed when compression would expand them.
    pub uncompressed_fallback_enabled: bool,
}
