//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

/// Replenish interval: one request every 500 ms, i.e. 2 requests per second.
const REPLENISH_MILLIS: u64 = 500;

/// Requests a client may send in a burst before throttling kicks in.
const BURST_SIZE: u32 = 100;

/// Creates a per-client rate limiter for the public routes.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Key Extraction
///
/// Limits are keyed by the socket peer address, so the server must be run
/// with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn layer() -> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(REPLENISH_MILLIS)
            .burst_size(BURST_SIZE)
            .finish()
            .expect("rate limit constants are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}
