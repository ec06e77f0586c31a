//! Picture signatures
//!
//! Every picture is fetched, decoded and reduced to a 64-bit DCT
//! perceptual hash. A meme's signature keeps the per-picture hashes in
//! picture order.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use image::imageops::FilterType;
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig};
use meme_core::Signature;
use tracing::{debug, instrument};

use super::error::{ServiceError, ServiceResult};

/// Side of the low-frequency block the hash is read from
const HASH_SIDE: u32 = 8;

/// Computes the signature of a candidate's pictures
#[async_trait]
pub trait SignatureProvider: Send + Sync {
    /// Signature of `pictures`, one hash per picture in order.
    ///
    /// Fetch and decode failures are retryable.
    async fn signature(&self, pictures: &[String]) -> ServiceResult<Signature>;
}

/// Fetches pictures over HTTP and hashes them off the async runtime
#[derive(Clone)]
pub struct HttpSignatureProvider {
    client: reqwest::Client,
}

impl HttpSignatureProvider {
    /// Create a provider whose every fetch is bounded by `request_timeout`
    pub fn new(request_timeout: Duration) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ServiceError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    #[instrument(skip(self))]
    async fn hash_picture(&self, url: &str) -> ServiceResult<u64> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ServiceError::transient(format!("fetching {url}: {e}")))?
            .bytes()
            .await
            .map_err(|e| ServiceError::transient(format!("reading {url}: {e}")))?;

        let hash = tokio::task::spawn_blocking(move || {
            image::load_from_memory(&bytes).map(|picture| perceptual_hash(&picture))
        })
        .await
        .map_err(|e| ServiceError::internal(format!("hashing task failed: {e}")))?
        .map_err(|e| ServiceError::transient(format!("decoding {url}: {e}")))?;

        debug!(url, hash = format_args!("{hash:016x}"), "Picture hashed");
        Ok(hash)
    }
}

#[async_trait]
impl SignatureProvider for HttpSignatureProvider {
    async fn signature(&self, pictures: &[String]) -> ServiceResult<Signature> {
        if pictures.is_empty() {
            return Err(ServiceError::validation("at least one picture is required"));
        }

        let hashes = try_join_all(pictures.iter().map(|url| self.hash_picture(url))).await?;
        Ok(Signature::new(hashes))
    }
}

/// 64-bit DCT perceptual hash of a decoded picture.
///
/// The picture is reduced to luma with a triangle filter and transformed
/// with a 2-D DCT; bit `i` (from the most significant) is set when
/// coefficient `i` of the low-frequency 8x8 block is above the block median.
pub fn perceptual_hash(picture: &DynamicImage) -> u64 {
    let hasher = HasherConfig::new()
        .hash_size(HASH_SIDE, HASH_SIDE)
        .hash_alg(HashAlg::Median)
        .resize_filter(FilterType::Triangle)
        .preproc_dct()
        .to_hasher();

    hasher
        .hash_image(picture)
        .as_bytes()
        .iter()
        .fold(0u64, |hash, &byte| (hash << 8) | u64::from(byte))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    /// Deterministic noise picture with values in `20..230`
    fn noise(seed: u64) -> GrayImage {
        let mut state = seed;
        GrayImage::from_fn(64, 64, |_, _| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            Luma([20 + ((state >> 33) % 210) as u8])
        })
    }

    fn brighten(picture: &GrayImage, by: u8) -> GrayImage {
        GrayImage::from_fn(picture.width(), picture.height(), |x, y| {
            Luma([picture.get_pixel(x, y).0[0] + by])
        })
    }

    fn distance(a: u64, b: u64) -> u32 {
        (a ^ b).count_ones()
    }

    #[test]
    fn test_hash_is_deterministic() {
        let picture = DynamicImage::ImageLuma8(noise(7));
        assert_eq!(perceptual_hash(&picture), perceptual_hash(&picture.clone()));
    }

    #[test]
    fn test_brightness_shift_keeps_hash() {
        let original = noise(11);
        let brighter = brighten(&original, 5);

        let a = perceptual_hash(&DynamicImage::ImageLuma8(original));
        let b = perceptual_hash(&DynamicImage::ImageLuma8(brighter));
        assert!(distance(a, b) <= 2, "distance {}", distance(a, b));
    }

    #[test]
    fn test_unrelated_pictures_are_far_apart() {
        let a = perceptual_hash(&DynamicImage::ImageLuma8(noise(1)));
        let b = perceptual_hash(&DynamicImage::ImageLuma8(noise(2)));
        assert!(distance(a, b) > 10, "distance {}", distance(a, b));
    }

    #[tokio::test]
    async fn test_empty_picture_list_is_rejected() {
        let provider = HttpSignatureProvider::new(Duration::from_secs(1)).unwrap();
        let err = provider.signature(&[]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
