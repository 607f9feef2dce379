//! Fletcher-32 digest over the original samples.
//!
//! The sums run over the sample values as 16-bit words in declaration order,
//! so the digest is independent of the host byte order (it equals Fletcher-32
//! over the little-endian byte serialization of the samples). The engine
//! appends the digest big-endian as the byte-aligned frame tail.

/// Words processed between deferred modulo reductions; the largest block
/// size for which the 32-bit accumulators cannot overflow.
const REDUCE_BLOCK: usize = 359;

/// Computes the Fletcher-32 digest of `data`.
pub fn cmp_checksum(data: &[u16]) -> u32 {
    let mut sum1: u32 = 0;
    let mut sum2: u32 = 0;

    for block in data.chunks(REDUCE_BLOCK) {
        for &word in block {
            sum1 += u32::from(word);
            sum2 += sum1;
        }
        sum1 %= 65535;
        sum2 %= 65535;
    }

    (sum2 << 16) | sum1
}
