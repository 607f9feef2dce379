//! Step-by-step usage of the compression library.
//!
//! Run with: `cargo run --example simple_compression`

use airspace::{
    cal_work_buf_size, cmp_hdr_deserialize, compress_bound, set_timestamp_func, CmpContext,
    CmpParams,
};

/// Counter-based timestamp provider, for demonstration only; flight
/// software would report the spacecraft clock here.
fn dummy_timestamp() -> (u32, u16) {
    use std::sync::atomic::{AtomicU64, Ordering};
    static TICKS: AtomicU64 = AtomicU64::new(1);
    let t = TICKS.fetch_add(1, Ordering::Relaxed);
    ((t >> 16) as u32, t as u16)
}

fn main() {
    // Step 0: register a timestamp provider so every session gets a
    // meaningful identifier.
    set_timestamp_func(Some(dummy_timestamp));

    // Step 1: configure the compression parameters. This example stays in
    // uncompressed mode; real configurations pick a preprocessing/encoder
    // pair per pass.
    let params = CmpParams::default();

    // Step 2: size the working buffer. Uncompressed mode needs none, but
    // the call shows how the sizing works.
    let samples = [42u16, 42, 48];
    let src_size = (samples.len() * 2) as u32;
    let work_buf_size = cal_work_buf_size(&params, src_size).expect("valid parameters");
    println!("work buffer: {work_buf_size} B");

    // Step 3: size and allocate the destination buffer. compress_bound is
    // always enough; the destination must be 8-byte aligned, so carve an
    // aligned slice out of a slightly larger allocation.
    let bound = compress_bound(src_size).expect("source size fits the header") as usize;
    let mut backing = vec![0u8; bound + 8];
    let off = backing.as_ptr().align_offset(8);

    // Step 4: create the context and compress.
    let mut ctx = CmpContext::new(&params, None).expect("valid parameters");
    let frame_size = ctx
        .compress_u16(&mut backing[off..off + bound], &samples)
        .expect("bound-sized destination") as usize;

    // Step 5: look at the self-describing result.
    let frame = &backing[off..off + frame_size];
    let hdr = cmp_hdr_deserialize(frame).expect("well-formed frame");
    println!("compressed {src_size} B into a {frame_size} B frame");
    println!("  version id      : {}", hdr.version_id);
    println!("  compressed size : {} B", hdr.compressed_size);
    println!("  original size   : {} B", hdr.original_size);
    println!("  identifier      : {:#014x}", hdr.identifier);
    println!("  sequence number : {}", hdr.sequence_number);

    set_timestamp_func(None);
}
