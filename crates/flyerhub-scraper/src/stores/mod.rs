//! Per-retailer flyer extractors.
//!
//! Each module owns one retailer: its flyer URL(s), readiness selector,
//! pagination policy, and markup-specific field extraction. All share the
//! same contract: `extract(session, timeout, out)` appends finalized
//! [`ProductRecord`]s to `out` in place and only lets driver-level
//! [`SessionError`]s escape, so the aggregation runner keeps whatever
//! partial output exists when a retailer fails mid-run.

pub mod foodbasics;
pub mod galleria;
pub mod nofrills;
pub mod tnt;

use std::time::Duration;

use flyerhub_core::{ProductRecord, StoreKey};

use crate::session::{BrowserSession, SessionError};

/// Runs the extractor for `store` against the shared session.
///
/// # Errors
///
/// Returns [`SessionError`] on driver-level failure; `out` keeps whatever
/// was appended before the fault.
pub async fn extract_store(
    store: StoreKey,
    session: &dyn BrowserSession,
    timeout: Duration,
    out: &mut Vec<ProductRecord>,
) -> Result<(), SessionError> {
    match store {
        StoreKey::Galleria => galleria::extract(session, timeout, out).await,
        StoreKey::Foodbasics => foodbasics::extract(session, timeout, out).await,
        StoreKey::TntSupermarket => tnt::extract(session, timeout, out).await,
        StoreKey::Nofrills => nofrills::extract(session, timeout, out).await,
    }
}
