//! Response compression layer.

use tower_http::compression::CompressionLayer;

/// Builds a gzip compression layer.
///
/// Signed object downloads are mostly already-compressed images, so only
/// gzip is enabled.
pub fn build_compression_layer() -> CompressionLayer {
    CompressionLayer::new().gzip(true)
}
