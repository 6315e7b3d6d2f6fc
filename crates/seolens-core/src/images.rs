//! Image classification and isolated byte downloads.
//!
//! Classification is attribute-driven and happens once, before any network
//! work. Downloads fan out concurrently with one task per image; a failed or
//! oversized download leaves that image's `size`/`format`/`base64` unset and
//! never disturbs its siblings.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::future::join_all;
use reqwest::Client;
use url::Url;

use crate::types::ImageFact;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Skip bodies beyond this size instead of inlining them.
const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Derive the role flags for each image.
///
/// Roles are informational and not mutually exclusive. The hero is the
/// first image declaring a width of at least 600 pixels.
pub fn classify_images(images: &mut [ImageFact]) {
    let mut hero_assigned = false;

    for image in images.iter_mut() {
        let src_lower = image.src.to_lowercase();
        let alt_lower = image
            .alt
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default();

        image.is_logo = src_lower.contains("logo") || alt_lower.contains("logo");

        if !hero_assigned && declared_width(image) >= 600 {
            image.is_hero = true;
            hero_assigned = true;
        }

        image.is_product = src_lower.contains("/product")
            || src_lower.contains("/products/")
            || src_lower.contains("/p/");
    }
}

fn declared_width(image: &ImageFact) -> u32 {
    image
        .width
        .as_deref()
        .and_then(|w| w.trim_end_matches("px").trim().parse::<u32>().ok())
        .unwrap_or(0)
}

/// Download bytes for every image concurrently, filling `size`, `format`
/// and `base64` where the fetch succeeds.
pub async fn download_images(client: &Client, page_url: &str, images: &mut [ImageFact]) {
    let downloads = join_all(
        images
            .iter()
            .map(|image| fetch_image_bytes(client, page_url, &image.src)),
    )
    .await;

    for (image, bytes) in images.iter_mut().zip(downloads) {
        if let Some(bytes) = bytes {
            image.size = Some(bytes.len());
            image.format = Some(sniff_format(&bytes, &image.src));
            image.base64 = Some(BASE64.encode(&bytes));
        }
    }
}

/// Fetch one image, degrading every failure to `None`.
async fn fetch_image_bytes(client: &Client, page_url: &str, src: &str) -> Option<Vec<u8>> {
    let url = resolve_src(page_url, src)?;

    let response = match tokio::time::timeout(DOWNLOAD_TIMEOUT, client.get(url.clone()).send())
        .await
    {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => {
            log::debug!("image fetch failed for {}: {}", url, e);
            return None;
        }
        Err(_) => {
            log::debug!("image fetch timed out for {}", url);
            return None;
        }
    };

    if !response.status().is_success() {
        log::debug!("image fetch returned {} for {}", response.status(), url);
        return None;
    }

    if let Some(length) = response.content_length()
        && length as usize > MAX_IMAGE_BYTES
    {
        log::debug!("image too large ({} bytes) for {}", length, url);
        return None;
    }

    match response.bytes().await {
        Ok(bytes) if bytes.len() <= MAX_IMAGE_BYTES => Some(bytes.to_vec()),
        Ok(bytes) => {
            log::debug!("image too large ({} bytes) for {}", bytes.len(), url);
            None
        }
        Err(e) => {
            log::debug!("image body read failed for {}: {}", url, e);
            None
        }
    }
}

fn resolve_src(page_url: &str, src: &str) -> Option<Url> {
    // Inline data URIs carry their bytes already; nothing to download.
    if src.starts_with("data:") {
        return None;
    }
    let base = Url::parse(page_url).ok()?;
    base.join(src).ok()
}

/// Identify the image format from magic bytes, falling back to the URL
/// extension.
fn sniff_format(bytes: &[u8], src: &str) -> String {
    if bytes.starts_with(b"\x89PNG") {
        return "png".to_string();
    }
    if bytes.starts_with(b"\xFF\xD8\xFF") {
        return "jpeg".to_string();
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return "gif".to_string();
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return "webp".to_string();
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    if head.contains("<svg") {
        return "svg".to_string();
    }

    src.rsplit('.')
        .next()
        .filter(|ext| ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| "unknown".to_string())
}
