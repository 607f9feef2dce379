//! End-to-end tests of the public compression API.

use airspace::{
    cal_work_buf_size, cmp_checksum, cmp_hdr_deserialize, compress_bound, error, CmpContext,
    CmpError, CmpParams, EncoderType, Preprocessing, CMP_CHECKSUM_SIZE, CMP_HDR_SIZE,
    CMP_VERSION_NUMBER,
};

// ── Buffer helpers ───────────────────────────────────────────────────────────

/// 8-byte-aligned destination buffer carved out of an over-allocated `Vec`.
struct AlignedBuf {
    backing: Vec<u8>,
    off: usize,
    len: usize,
}

impl AlignedBuf {
    fn new(len: usize) -> Self {
        let backing = vec![0u8; len + 8];
        let off = backing.as_ptr().align_offset(8);
        AlignedBuf { backing, off, len }
    }

    fn slice(&mut self) -> &mut [u8] {
        &mut self.backing[self.off..self.off + self.len]
    }

    fn bytes(&self) -> &[u8] {
        &self.backing[self.off..self.off + self.len]
    }
}

/// Carves a 2-byte-aligned work slice out of `backing`.
fn aligned_work(backing: &mut Vec<u8>, len: usize) -> &mut [u8] {
    backing.resize(len + 2, 0);
    let off = backing.as_ptr().align_offset(2);
    &mut backing[off..off + len]
}

fn counter_timestamp() -> (u32, u16) {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNT: AtomicU64 = AtomicU64::new(0xBEEF);
    let c = COUNT.fetch_add(1, Ordering::Relaxed);
    ((c >> 16) as u32, c as u16)
}

// ── Scenario: uncompressed mode ──────────────────────────────────────────────

#[test]
fn uncompressed_two_samples() {
    let params = CmpParams::default();
    let mut ctx = CmpContext::new(&params, None).unwrap();
    let mut dst = AlignedBuf::new(64);

    let size = ctx.compress_u16(dst.slice(), &[0x0001, 0x0203]).unwrap();

    assert_eq!(size, CMP_HDR_SIZE + 4);
    let frame = dst.bytes();
    assert_eq!(&frame[24..28], &[0x00, 0x01, 0x02, 0x03]);
    let hdr = cmp_hdr_deserialize(frame).unwrap();
    assert_eq!(hdr.version_flag, 1);
    assert_eq!(hdr.version_id, CMP_VERSION_NUMBER as u16);
    assert_eq!(hdr.original_size, 4);
    assert_eq!(hdr.compressed_size, 28);
    assert_eq!(hdr.encoder_type, EncoderType::Uncompressed as u8);
    assert_eq!(hdr.preprocessing, Preprocessing::None as u8);
}

// ── Scenario: timestamp propagation ──────────────────────────────────────────

#[test]
fn installed_timestamp_becomes_identifier() {
    fn stub() -> (u32, u16) {
        (0x1234_5678, 0xABCD)
    }

    // The per-context constructor bypasses process-wide state, so parallel
    // tests cannot interfere.
    let params = CmpParams::default();
    let mut ctx = CmpContext::with_timestamp(&params, None, stub).unwrap();
    let mut dst = AlignedBuf::new(64);
    let size = ctx.compress_u16(dst.slice(), &[0, 0]).unwrap();
    assert!(!error::is_error(size));

    let hdr = cmp_hdr_deserialize(dst.bytes()).unwrap();
    assert_eq!(hdr.identifier, 0x1234_5678_ABCD);
}

#[test]
fn process_wide_timestamp_provider() {
    fn stub() -> (u32, u16) {
        (0x00C0_FFEE, 0x4242)
    }

    airspace::set_timestamp_func(Some(stub));
    let params = CmpParams::default();
    let mut ctx = CmpContext::new(&params, None).unwrap();
    let mut dst = AlignedBuf::new(64);
    ctx.compress_u16(dst.slice(), &[0, 0]).unwrap();
    airspace::set_timestamp_func(None);

    let hdr = cmp_hdr_deserialize(dst.bytes()).unwrap();
    assert_eq!(hdr.identifier, 0x00C0_FFEE_4242);
}

// ── Scenario: checksum tail ──────────────────────────────────────────────────

#[test]
fn checksum_appended_after_payload() {
    let params = CmpParams {
        checksum_enabled: true,
        ..CmpParams::default()
    };
    let mut ctx = CmpContext::new(&params, None).unwrap();
    let src = [0x00CAu16, 0x00FF, 0x00EE];
    let mut dst = AlignedBuf::new(64);

    let size = ctx.compress_u16(dst.slice(), &src).unwrap();

    assert_eq!(size, CMP_HDR_SIZE + 6 + CMP_CHECKSUM_SIZE);
    let tail = &dst.bytes()[size as usize - 4..size as usize];
    assert_eq!(tail, cmp_checksum(&src).to_be_bytes());
}

#[test]
fn checksum_is_independent_of_pipeline_choice() {
    let src = [0x00C0u16, 0x00FF, 0x00EE];

    let plain = CmpParams {
        checksum_enabled: true,
        ..CmpParams::default()
    };
    let golomb = CmpParams {
        checksum_enabled: true,
        primary_preprocessing: Preprocessing::Diff,
        primary_encoder_type: EncoderType::GolombZero,
        primary_encoder_param: 4,
        ..CmpParams::default()
    };

    let mut tails = Vec::new();
    for params in [plain, golomb] {
        let mut ctx = CmpContext::new(&params, None).unwrap();
        let mut dst = AlignedBuf::new(64);
        let size = ctx.compress_u16(dst.slice(), &src).unwrap() as usize;
        tails.push(dst.bytes()[size - 4..size].to_vec());
    }
    assert_eq!(tails[0], tails[1]);
}

// ── Scenario: uncompressed fallback ──────────────────────────────────────────

#[test]
fn fallback_then_compressible_pass() {
    let params = CmpParams {
        uncompressed_fallback_enabled: true,
        primary_preprocessing: Preprocessing::Diff,
        primary_encoder_type: EncoderType::GolombZero,
        primary_encoder_param: 1,
        ..CmpParams::default()
    };
    let mut ctx = CmpContext::new(&params, None).unwrap();
    let mut dst = AlignedBuf::new(64);

    // Incompressible input falls back to raw storage.
    let size = ctx
        .compress_u16(dst.slice(), &[0xAAAA, 0xBBBB, 0xCCCC])
        .unwrap();
    assert_eq!(size, CMP_HDR_SIZE + 6);
    assert_eq!(&dst.bytes()[24..30], &[0xAA, 0xAA, 0xBB, 0xBB, 0xCC, 0xCC]);
    let hdr = cmp_hdr_deserialize(dst.bytes()).unwrap();
    assert_eq!(hdr.preprocessing, Preprocessing::None as u8);
    assert_eq!(hdr.encoder_type, EncoderType::Uncompressed as u8);

    // The next, compressible input beats the raw frame again.
    let size = ctx.compress_u16(dst.slice(), &[0, 0, 0, 0]).unwrap();
    assert!(size < CMP_HDR_SIZE + 8);
    let hdr = cmp_hdr_deserialize(dst.bytes()).unwrap();
    assert_eq!(hdr.preprocessing, Preprocessing::Diff as u8);
    assert_eq!(hdr.encoder_type, EncoderType::GolombZero as u8);
}

#[test]
fn fallback_bound_holds_for_varied_data() {
    let params = CmpParams {
        uncompressed_fallback_enabled: true,
        checksum_enabled: true,
        primary_preprocessing: Preprocessing::Diff,
        primary_encoder_type: EncoderType::GolombMulti,
        primary_encoder_param: 1,
        primary_encoder_outlier: 16,
        ..CmpParams::default()
    };
    let mut ctx = CmpContext::new(&params, None).unwrap();

    for pattern in [
        vec![0u16; 32],
        (0..32u16).collect::<Vec<_>>(),
        (0..32u32).map(|i| (i * 0x9E37) as u16).collect::<Vec<_>>(),
    ] {
        let raw_frame = CMP_HDR_SIZE + pattern.len() as u32 * 2 + CMP_CHECKSUM_SIZE;
        let mut dst = AlignedBuf::new(256);
        let size = ctx.compress_u16(dst.slice(), &pattern).unwrap();
        assert!(size <= raw_frame, "frame {size} exceeds raw bound {raw_frame}");
    }
}

// ── Scenario: session lifecycle ──────────────────────────────────────────────

#[test]
fn session_identifier_and_rollover() {
    let params = CmpParams {
        secondary_iterations: 1,
        secondary_preprocessing: Preprocessing::Model,
        secondary_encoder_type: EncoderType::GolombZero,
        secondary_encoder_param: 1,
        ..CmpParams::default()
    };
    let mut work = Vec::new();
    let mut ctx =
        CmpContext::with_timestamp(&params, Some(aligned_work(&mut work, 8)), counter_timestamp)
            .unwrap();
    let src = [5u16, 6, 7, 8];
    let mut dst = AlignedBuf::new(64);

    let mut headers = Vec::new();
    for _ in 0..4 {
        ctx.compress_u16(dst.slice(), &src).unwrap();
        headers.push(cmp_hdr_deserialize(dst.bytes()).unwrap());
    }

    // Passes 1 and 2 share a session; pass 3 starts a new one.
    assert_eq!(headers[0].sequence_number, 0);
    assert_eq!(headers[1].sequence_number, 1);
    assert_eq!(headers[2].sequence_number, 0);
    assert_eq!(headers[3].sequence_number, 1);
    assert_eq!(headers[0].identifier, headers[1].identifier);
    assert_ne!(headers[1].identifier, headers[2].identifier);
    assert_eq!(headers[2].identifier, headers[3].identifier);
}

#[test]
fn model_locked_size_enforced() {
    let params = CmpParams {
        secondary_iterations: 5,
        secondary_preprocessing: Preprocessing::Model,
        secondary_encoder_type: EncoderType::GolombZero,
        secondary_encoder_param: 1,
        ..CmpParams::default()
    };
    let mut work = Vec::new();
    let mut ctx = CmpContext::new(&params, Some(aligned_work(&mut work, 8))).unwrap();
    let mut dst = AlignedBuf::new(64);

    ctx.compress_u16(dst.slice(), &[1, 2, 3, 4]).unwrap();
    assert_eq!(
        ctx.compress_u16(dst.slice(), &[1, 2]).unwrap_err(),
        CmpError::SrcSizeMismatch
    );

    // An explicit reset unlocks the size again.
    ctx.reset();
    ctx.compress_u16(dst.slice(), &[1, 2]).unwrap();
}

#[test]
fn reset_is_idempotent_up_to_identifier() {
    let params = CmpParams::default();
    let mut ctx = CmpContext::with_timestamp(&params, None, counter_timestamp).unwrap();
    let mut dst = AlignedBuf::new(64);

    ctx.compress_u16(dst.slice(), &[1, 2]).unwrap();
    ctx.reset();
    ctx.reset();

    ctx.compress_u16(dst.slice(), &[1, 2]).unwrap();
    let hdr = cmp_hdr_deserialize(dst.bytes()).unwrap();
    assert_eq!(hdr.sequence_number, 0);
}

// ── Scenario: work-buffer safety ─────────────────────────────────────────────

#[test]
fn work_buffer_too_small_and_unaligned() {
    let params = CmpParams {
        primary_preprocessing: Preprocessing::Iwt,
        ..CmpParams::default()
    };

    // A 2-byte buffer passes creation but not a 4-byte input (needs 6).
    let mut work = Vec::new();
    let mut ctx = CmpContext::new(&params, Some(aligned_work(&mut work, 2))).unwrap();
    let mut dst = AlignedBuf::new(64);
    assert_eq!(
        ctx.compress_u16(dst.slice(), &[1, 2]).unwrap_err(),
        CmpError::WorkBufTooSmall
    );

    // A misaligned 6-byte buffer is rejected at creation.
    let mut backing = vec![0u8; 16];
    let off = backing.as_ptr().align_offset(2) + 1;
    assert_eq!(
        CmpContext::new(&params, Some(&mut backing[off..off + 6])).unwrap_err(),
        CmpError::WorkBufUnaligned
    );

    // An aligned 6-byte buffer works.
    let mut work = Vec::new();
    let mut ctx = CmpContext::new(&params, Some(aligned_work(&mut work, 6))).unwrap();
    ctx.compress_u16(dst.slice(), &[1, 2]).unwrap();
}

#[test]
fn work_buf_sizing_matches_engine_demands() {
    let params = CmpParams {
        primary_preprocessing: Preprocessing::Iwt,
        secondary_iterations: 2,
        secondary_preprocessing: Preprocessing::Model,
        secondary_encoder_type: EncoderType::GolombZero,
        secondary_encoder_param: 1,
        ..CmpParams::default()
    };
    let src = [9u16; 8];
    let src_size = (src.len() * 2) as u32;
    let needed = cal_work_buf_size(&params, src_size).unwrap() as usize;
    assert_eq!(needed, 18); // IWT needs n+1 slots, the model only n

    let mut work = Vec::new();
    let mut ctx = CmpContext::new(&params, Some(aligned_work(&mut work, needed))).unwrap();
    let mut dst = AlignedBuf::new(128);
    for _ in 0..3 {
        ctx.compress_u16(dst.slice(), &src).unwrap();
    }
}

// ── Property: bound correctness ──────────────────────────────────────────────

#[test]
fn bound_sized_destination_never_too_small() {
    let param_sets = [
        CmpParams::default(),
        CmpParams {
            primary_preprocessing: Preprocessing::Diff,
            primary_encoder_type: EncoderType::GolombZero,
            primary_encoder_param: 1,
            checksum_enabled: true,
            ..CmpParams::default()
        },
        CmpParams {
            primary_preprocessing: Preprocessing::Iwt,
            primary_encoder_type: EncoderType::GolombMulti,
            primary_encoder_param: 2,
            primary_encoder_outlier: 32,
            ..CmpParams::default()
        },
        CmpParams {
            primary_encoder_type: EncoderType::GolombMulti,
            primary_encoder_param: 1,
            primary_encoder_outlier: 32,
            checksum_enabled: true,
            ..CmpParams::default()
        },
    ];

    let patterns: Vec<Vec<u16>> = vec![
        vec![0; 16],
        vec![0xFFFF; 16],
        (0..16u16).collect(),
        (0..16u32).map(|i| (i * 0xAAAA) as u16).collect(),
        vec![0xAAAA, 0xBBBB, 0xCCCC, 0xDDDD, 0x5555, 0x1234, 0x8000, 0x7FFF],
    ];

    for params in &param_sets {
        let needed = cal_work_buf_size(params, 32).unwrap() as usize;
        let mut work = Vec::new();
        let work_buf = if needed > 0 {
            Some(aligned_work(&mut work, needed))
        } else {
            None
        };
        let mut ctx = CmpContext::new(params, work_buf).unwrap();

        for pattern in &patterns {
            let src_size = (pattern.len() * 2) as u32;
            let bound = compress_bound(src_size).unwrap();
            let mut dst = AlignedBuf::new(bound as usize);
            let size = ctx
                .compress_u16(dst.slice(), pattern)
                .expect("bound-sized destination must suffice");
            assert!(size <= bound);
        }
    }
}

#[test]
fn frame_is_self_describing() {
    let params = CmpParams {
        primary_preprocessing: Preprocessing::Diff,
        primary_encoder_type: EncoderType::GolombZero,
        primary_encoder_param: 2,
        checksum_enabled: true,
        ..CmpParams::default()
    };
    let mut ctx = CmpContext::new(&params, None).unwrap();
    let mut dst = AlignedBuf::new(256);
    // Pre-fill so untouched bytes are visible.
    dst.slice().fill(0xEE);

    let src: Vec<u16> = (0..20u16).map(|i| i * 3).collect();
    let size = ctx.compress_u16(dst.slice(), &src).unwrap() as usize;

    let hdr = cmp_hdr_deserialize(dst.bytes()).unwrap();
    assert_eq!(hdr.compressed_size as usize, size);
    // Nothing past the reported frame length was written.
    assert!(dst.bytes()[size..].iter().all(|&b| b == 0xEE));
}

// ── Input validation ─────────────────────────────────────────────────────────

#[test]
fn input_constraint_errors() {
    let params = CmpParams::default();
    let mut ctx = CmpContext::new(&params, None).unwrap();
    let mut dst = AlignedBuf::new(64);

    assert_eq!(
        ctx.compress_u16(dst.slice(), &[]).unwrap_err(),
        CmpError::SrcSizeWrong
    );

    let off = dst.off;
    assert_eq!(
        ctx.compress_u16(&mut dst.backing[off + 1..off + 33], &[1])
            .unwrap_err(),
        CmpError::DstUnaligned
    );
}

#[test]
fn bound_rejects_oversized_inputs() {
    assert_eq!(
        compress_bound((1 << 24) + 2).unwrap_err(),
        CmpError::HdrOriginalTooLarge
    );
    assert_eq!(
        compress_bound(6_000_000).unwrap_err(),
        CmpError::HdrCmpSizeTooLarge
    );
}

// ── Packed-u32 convention ────────────────────────────────────────────────────

#[test]
fn packed_convention_round_trip() {
    let packed = error::encode_result(Err(CmpError::WorkBufTooSmall));
    assert!(airspace::is_error(packed));
    assert_eq!(airspace::get_error_code(packed), CmpError::WorkBufTooSmall);
    assert_eq!(
        airspace::get_error_message(packed),
        "working buffer too small"
    );

    let packed = error::encode_result(Ok(28));
    assert!(!airspace::is_error(packed));
    assert_eq!(airspace::get_error_code(packed), CmpError::NoError);
}
