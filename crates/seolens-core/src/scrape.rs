//! The audit pipeline: fetch, extract, probe, score.
//!
//! Only the primary page fetch can fail. Once the document is in hand the
//! auxiliary probes and optional image downloads run concurrently, each
//! degrading independently, and the scorers fill in the derived facts before
//! the completed tree is returned.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::ScrapeError;
use crate::extract::extract_content;
use crate::images::{classify_images, download_images};
use crate::probe::{derive_security, detect_analytics, probe_auxiliary};
use crate::score::{JitterEstimator, VitalsEstimator, apply_scores};
use crate::types::WebsiteContent;
use crate::url_utils::{normalize_origin, normalize_url, url_path};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser-like user agent; some sites serve crawler UAs a stripped page.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Knobs for one audit run.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// Fetch image bytes to report size/format. Off by default; role
    /// classification happens either way.
    pub download_images: bool,
}

/// Audit a page with default options and the jittered vitals estimator.
pub async fn scrape_website(url: &str) -> Result<WebsiteContent, ScrapeError> {
    scrape_website_with(url, &ScrapeOptions::default(), &JitterEstimator).await
}

/// Audit a page with explicit options and vitals estimator.
pub async fn scrape_website_with(
    url: &str,
    options: &ScrapeOptions,
    estimator: &dyn VitalsEstimator,
) -> Result<WebsiteContent, ScrapeError> {
    let normalized = normalize_url(url);
    Url::parse(&normalized).map_err(|source| ScrapeError::InvalidUrl {
        url: normalized.clone(),
        source,
    })?;

    log::info!("auditing {}", normalized);

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|source| ScrapeError::Fetch {
            url: normalized.clone(),
            source,
        })?;

    let response = client.get(&normalized).send().await.map_err(|source| {
        if source.is_timeout() {
            ScrapeError::Timeout {
                url: normalized.clone(),
                seconds: FETCH_TIMEOUT.as_secs(),
            }
        } else {
            ScrapeError::Fetch {
                url: normalized.clone(),
                source,
            }
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::HttpStatus {
            url: normalized,
            status: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let body = response.text().await.map_err(|source| ScrapeError::Body {
        url: final_url.clone(),
        source,
    })?;

    let mut content = extract_content(&body, &final_url);
    classify_images(&mut content.images);
    content.security = derive_security(&final_url);
    content.analytics = detect_analytics(&body);

    let origin = normalize_origin(&final_url);
    let path = url_path(&final_url);

    // Probes and image downloads write disjoint parts of the tree, so they
    // simply join before scoring.
    let (crawlers, sitemaps) = if options.download_images {
        let (aux, ()) = tokio::join!(
            probe_auxiliary(&client, &origin, &path),
            download_images(&client, &final_url, &mut content.images),
        );
        aux
    } else {
        probe_auxiliary(&client, &origin, &path).await
    };
    content.crawlers = crawlers;
    content.sitemaps = sitemaps;

    apply_scores(&mut content, estimator);

    log::debug!(
        "audit of {} extracted {} images, {} links, {} headings",
        final_url,
        content.performance.image_count,
        content.performance.link_count,
        content.performance.heading_count
    );

    Ok(content)
}
