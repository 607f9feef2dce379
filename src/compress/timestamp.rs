//! Timestamp provider feeding the 48-bit session identifier.
//!
//! Every session (context creation or reset) draws one `(coarse, fine)`
//! timestamp pair and combines it as `(coarse << 16) | fine`. The provider
//! can be installed process-wide with [`set_timestamp_func`] or per context
//! via [`CmpContext::with_timestamp`]; without either, a monotonically
//! increasing internal counter keeps identifiers distinct within the
//! process.
//!
//! [`CmpContext::with_timestamp`]: crate::compress::engine::CmpContext::with_timestamp

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Produces one timestamp: a coarse 32-bit part and a fine 16-bit part.
pub type TimestampFn = fn() -> (u32, u16);

/// Process-wide provider override; `None` selects the internal counter.
static CUSTOM_TIMESTAMP: Mutex<Option<TimestampFn>> = Mutex::new(None);

/// Backing counter of the default provider.
static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

fn fallback_timestamp() -> (u32, u16) {
    let count = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    ((count >> 16) as u32, count as u16)
}

/// Installs `f` as the process-wide timestamp provider; `None` restores the
/// internal counter.
///
/// Replacing the provider while another thread is creating or resetting a
/// context is serialized internally, but the embedder decides which provider
/// such a racing context ends up seeing.
pub fn set_timestamp_func(f: Option<TimestampFn>) {
    *CUSTOM_TIMESTAMP
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = f;
}

/// Draws a fresh 48-bit identifier, preferring the per-context provider.
pub(crate) fn next_identifier(per_context: Option<TimestampFn>) -> u64 {
    let provider = per_context.or_else(|| {
        *CUSTOM_TIMESTAMP
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    });
    let (coarse, fine) = match provider {
        Some(f) => f(),
        None => fallback_timestamp(),
    };
    (u64::from(coarse) << 16) | u64::from(fine)
}
