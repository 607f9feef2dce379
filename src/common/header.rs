//! Bit-exact frame-header codec.
//!
//! Every compressed frame starts with a fixed 24-byte header, big-endian
//! within each field:
//!
//! ```text
//! version_flag:1 | version_id:15 | compressed_size:24 | original_size:24 |
//! sequence_number:8 | preprocessing:8 | checksum_enabled:8 | encoder_type:8 |
//! model_rate:8 | encoder_outlier:24 | encoder_param:16 | identifier:48
//! ```
//!
//! `compressed_size` is the total frame length in bytes (header + payload +
//! optional checksum tail). The engine first serializes the header with a
//! zero placeholder there and patches the real value in after the payload is
//! flushed. Serialization validates every field against its declared width;
//! a violation is a programmer error surfaced as [`CmpError::IntHdr`],
//! except for the two size fields which map to their dedicated kinds.

use crate::common::bitstream::BitstreamWriter;
use crate::error::CmpError;

/// Frame header size in bytes.
pub const CMP_HDR_SIZE: u32 = 24;

/// Size of the optional checksum tail in bytes.
pub const CMP_CHECKSUM_SIZE: u32 = 4;

/// Largest original size representable in the 24-bit header field.
pub const CMP_HDR_MAX_ORIGINAL_SIZE: u32 = (1 << 24) - 1;

/// Largest compressed size representable in the 24-bit header field.
pub const CMP_HDR_MAX_COMPRESSED_SIZE: u32 = (1 << 24) - 1;

/// Width of the `sequence_number` field; bounds `secondary_iterations`.
pub const CMP_HDR_BITS_SEQUENCE_NUMBER: u32 = 8;

/// Width of the `identifier` field.
pub const CMP_HDR_BITS_IDENTIFIER: u32 = 48;

/// Decoded frame-header fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CmpHdr {
    /// Format marker; always 1 in frames produced by this engine.
    pub version_flag: u8,
    /// Library version number that produced the frame (15 bits).
    pub version_id: u16,
    /// Total frame length in bytes (24 bits); 0 in the placeholder pass.
    pub compressed_size: u32,
    /// Byte count of the original sample buffer (24 bits).
    pub original_size: u32,
    /// Pass counter within the session.
    pub sequence_number: u8,
    /// Preprocessing applied to this pass (numeric [`Preprocessing`] value).
    ///
    /// [`Preprocessing`]: crate::compress::Preprocessing
    pub preprocessing: u8,
    /// Non-zero when a checksum tail follows the payload.
    pub checksum_enabled: u8,
    /// Encoder used for this pass (numeric [`EncoderType`] value).
    ///
    /// [`EncoderType`]: crate::compress::EncoderType
    pub encoder_type: u8,
    /// Model adaptation rate; meaningful only for model preprocessing.
    pub model_rate: u8,
    /// Escape threshold of the encoder (24 bits); 0 in uncompressed mode.
    pub encoder_outlier: u32,
    /// Divisor parameter of the encoder (16 bits); 0 in uncompressed mode.
    pub encoder_param: u16,
    /// 48-bit session identifier from the timestamp provider.
    pub identifier: u64,
}

/// Serializes `hdr` into the bitstream at its current position.
///
/// The engine calls this twice per frame: once at offset 0 with the
/// placeholder `compressed_size`, and again after a rewind with the real
/// value.
pub fn cmp_hdr_serialize(bs: &mut BitstreamWriter<'_>, hdr: &CmpHdr) -> Result<(), CmpError> {
    if hdr.version_flag > 1 || hdr.version_id >= 1 << 15 {
        return Err(CmpError::IntHdr);
    }
    if hdr.compressed_size > CMP_HDR_MAX_COMPRESSED_SIZE {
        return Err(CmpError::HdrCmpSizeTooLarge);
    }
    if hdr.original_size > CMP_HDR_MAX_ORIGINAL_SIZE {
        return Err(CmpError::HdrOriginalTooLarge);
    }
    if hdr.encoder_outlier >= 1 << 24 || hdr.identifier >= 1 << 48 {
        return Err(CmpError::IntHdr);
    }

    bs.add_bits((u32::from(hdr.version_flag) << 15) | u32::from(hdr.version_id), 16);
    bs.add_bits(hdr.compressed_size, 24);
    bs.add_bits(hdr.original_size, 24);
    bs.add_bits(u32::from(hdr.sequence_number), 8);
    bs.add_bits(u32::from(hdr.preprocessing), 8);
    bs.add_bits(u32::from(hdr.checksum_enabled), 8);
    bs.add_bits(u32::from(hdr.encoder_type), 8);
    bs.add_bits(u32::from(hdr.model_rate), 8);
    bs.add_bits(hdr.encoder_outlier, 24);
    bs.add_bits(u32::from(hdr.encoder_param), 16);
    bs.add_bits((hdr.identifier >> 32) as u32, 16);
    bs.add_bits(hdr.identifier as u32, 32);

    Ok(())
}

fn read_u24(src: &[u8], offset: usize) -> u32 {
    (u32::from(src[offset]) << 16) | (u32::from(src[offset + 1]) << 8) | u32::from(src[offset + 2])
}

/// Decodes the leading 24 bytes of `src` into a [`CmpHdr`].
///
/// Fails with [`CmpError::SrcSizeWrong`] when fewer than
/// [`CMP_HDR_SIZE`] bytes are available or when the decoded
/// `compressed_size` claims more bytes than `src` holds (a truncated
/// frame), and with [`CmpError::IntHdr`] when the version flag is not set
/// (the buffer does not start with a frame produced by this engine).
pub fn cmp_hdr_deserialize(src: &[u8]) -> Result<CmpHdr, CmpError> {
    if src.len() < CMP_HDR_SIZE as usize {
        return Err(CmpError::SrcSizeWrong);
    }

    let version = (u16::from(src[0]) << 8) | u16::from(src[1]);
    let hdr = CmpHdr {
        version_flag: (version >> 15) as u8,
        version_id: version & 0x7FFF,
        compressed_size: read_u24(src, 2),
        original_size: read_u24(src, 5),
        sequence_number: src[8],
        preprocessing: src[9],
        checksum_enabled: src[10],
        encoder_type: src[11],
        model_rate: src[12],
        encoder_outlier: read_u24(src, 13),
        encoder_param: (u16::from(src[16]) << 8) | u16::from(src[17]),
        identifier: (u64::from(read_u24(src, 18)) << 24) | u64::from(read_u24(src, 21)),
    };

    if hdr.version_flag != 1 {
        return Err(CmpError::IntHdr);
    }
    if hdr.compressed_size as usize > src.len() {
        return Err(CmpError::SrcSizeWrong);
    }
    Ok(hdr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize_to_bytes(hdr: &CmpHdr) -> Result<[u8; 24], CmpError> {
        let mut backing = vec![0u8; 32];
        let off = backing.as_ptr().align_offset(8);
        let mut bs = BitstreamWriter::new(&mut backing[off..off + 24]).unwrap();
        cmp_hdr_serialize(&mut bs, hdr)?;
        let len = bs.flush()?;
        assert_eq!(len, CMP_HDR_SIZE);
        drop(bs);
        let mut out = [0u8; 24];
        out.copy_from_slice(&backing[off..off + 24]);
        Ok(out)
    }

    /// Header bytes padded out to the length the header claims, as a
    /// decoder of a persisted frame would see them.
    fn frame_bytes(hdr: &CmpHdr) -> Vec<u8> {
        let bytes = serialize_to_bytes(hdr).unwrap();
        let mut frame = vec![0u8; (hdr.compressed_size as usize).max(bytes.len())];
        frame[..bytes.len()].copy_from_slice(&bytes);
        frame
    }

    fn sample_hdr() -> CmpHdr {
        CmpHdr {
            version_flag: 1,
            version_id: 300,
            compressed_size: 0x00AB_CDEF,
            original_size: 0x0012_3456,
            sequence_number: 7,
            preprocessing: 2,
            checksum_enabled: 1,
            encoder_type: 1,
            model_rate: 8,
            encoder_outlier: 0x00FE_DCBA,
            encoder_param: 0xBEEF,
            identifier: 0x1234_5678_ABCD,
        }
    }

    #[test]
    fn serializes_exactly_24_bytes_big_endian() {
        let bytes = serialize_to_bytes(&sample_hdr()).unwrap();
        // version: flag 1 + id 300 → 0x812C
        assert_eq!(&bytes[0..2], &[0x81, 0x2C]);
        assert_eq!(&bytes[2..5], &[0xAB, 0xCD, 0xEF]);
        assert_eq!(&bytes[5..8], &[0x12, 0x34, 0x56]);
        assert_eq!(bytes[8], 7);
        assert_eq!(bytes[9], 2);
        assert_eq!(bytes[10], 1);
        assert_eq!(bytes[11], 1);
        assert_eq!(bytes[12], 8);
        assert_eq!(&bytes[13..16], &[0xFE, 0xDC, 0xBA]);
        assert_eq!(&bytes[16..18], &[0xBE, 0xEF]);
        assert_eq!(&bytes[18..24], &[0x12, 0x34, 0x56, 0x78, 0xAB, 0xCD]);
    }

    #[test]
    fn round_trip_preserves_all_fields() {
        let hdr = sample_hdr();
        assert_eq!(cmp_hdr_deserialize(&frame_bytes(&hdr)).unwrap(), hdr);
    }

    #[test]
    fn round_trip_extreme_field_values() {
        let hdr = CmpHdr {
            version_flag: 1,
            version_id: 0x7FFF,
            compressed_size: CMP_HDR_MAX_COMPRESSED_SIZE,
            original_size: CMP_HDR_MAX_ORIGINAL_SIZE,
            sequence_number: u8::MAX,
            preprocessing: u8::MAX,
            checksum_enabled: u8::MAX,
            encoder_type: u8::MAX,
            model_rate: u8::MAX,
            encoder_outlier: (1 << 24) - 1,
            encoder_param: u16::MAX,
            identifier: (1 << 48) - 1,
        };
        assert_eq!(cmp_hdr_deserialize(&frame_bytes(&hdr)).unwrap(), hdr);
    }

    #[test]
    fn rejects_oversized_size_fields() {
        let mut hdr = sample_hdr();
        hdr.original_size = CMP_HDR_MAX_ORIGINAL_SIZE + 1;
        assert_eq!(
            serialize_to_bytes(&hdr).unwrap_err(),
            CmpError::HdrOriginalTooLarge
        );

        let mut hdr = sample_hdr();
        hdr.compressed_size = CMP_HDR_MAX_COMPRESSED_SIZE + 1;
        assert_eq!(
            serialize_to_bytes(&hdr).unwrap_err(),
            CmpError::HdrCmpSizeTooLarge
        );
    }

    #[test]
    fn rejects_fields_wider_than_declared() {
        let mut hdr = sample_hdr();
        hdr.version_id = 1 << 15;
        assert_eq!(serialize_to_bytes(&hdr).unwrap_err(), CmpError::IntHdr);

        let mut hdr = sample_hdr();
        hdr.identifier = 1 << 48;
        assert_eq!(serialize_to_bytes(&hdr).unwrap_err(), CmpError::IntHdr);

        let mut hdr = sample_hdr();
        hdr.encoder_outlier = 1 << 24;
        assert_eq!(serialize_to_bytes(&hdr).unwrap_err(), CmpError::IntHdr);
    }

    #[test]
    fn deserialize_rejects_short_buffer() {
        let bytes = serialize_to_bytes(&sample_hdr()).unwrap();
        assert_eq!(
            cmp_hdr_deserialize(&bytes[..23]).unwrap_err(),
            CmpError::SrcSizeWrong
        );
    }

    #[test]
    fn deserialize_rejects_truncated_frame() {
        // The header claims a 100-byte frame; offering fewer bytes than
        // that must be refused, offering at least that many must not.
        let mut hdr = sample_hdr();
        hdr.compressed_size = 100;
        let frame = frame_bytes(&hdr);
        assert_eq!(frame.len(), 100);

        assert_eq!(
            cmp_hdr_deserialize(&frame[..24]).unwrap_err(),
            CmpError::SrcSizeWrong
        );
        assert_eq!(
            cmp_hdr_deserialize(&frame[..99]).unwrap_err(),
            CmpError::SrcSizeWrong
        );
        assert_eq!(cmp_hdr_deserialize(&frame).unwrap(), hdr);
    }

    #[test]
    fn deserialize_rejects_cleared_version_flag() {
        let mut bytes = serialize_to_bytes(&sample_hdr()).unwrap();
        bytes[0] &= 0x7F;
        assert_eq!(cmp_hdr_deserialize(&bytes).unwrap_err(), CmpError::IntHdr);
    }
}
