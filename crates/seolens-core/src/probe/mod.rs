//! Auxiliary resource probes.
//!
//! For a given origin the prober issues independent bounded-timeout requests
//! for robots.txt, sitemap.xml and llms.txt. The three probes run
//! concurrently; any failure degrades that probe to "not found" and never
//! reaches the caller. Security and analytics facts are derived locally from
//! the fetch result, with no extra requests.

pub mod robots;
pub mod sitemap;

use std::time::Duration;

use reqwest::Client;

use crate::types::{AnalyticsFacts, CrawlerFacts, SecurityFacts, SitemapFacts};

/// Per-probe request timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe robots.txt, sitemap.xml and llms.txt for an origin.
///
/// `page_path` is the path of the audited page, used for the
/// blocked-by-robots judgement.
pub async fn probe_auxiliary(
    client: &Client,
    origin: &str,
    page_path: &str,
) -> (CrawlerFacts, SitemapFacts) {
    let robots_url = format!("{}/robots.txt", origin);
    let sitemap_url = format!("{}/sitemap.xml", origin);
    let llms_url = format!("{}/llms.txt", origin);

    let (robots_body, sitemap_body, llms_body) = tokio::join!(
        fetch_text(client, &robots_url),
        fetch_text(client, &sitemap_url),
        fetch_text(client, &llms_url),
    );

    let mut crawlers = CrawlerFacts::default();
    let mut sitemaps = SitemapFacts::default();

    if let Some(body) = robots_body {
        let rules = robots::parse_robots_txt(&body);
        crawlers.robots_txt_exists = true;
        crawlers.blocked_by_robots = robots::is_path_blocked(page_path, &rules);
        crawlers.disallow_rules = rules.disallow;
        crawlers.crawl_delay = rules.crawl_delay;
        sitemaps.robots_advertised = rules.sitemaps;
    }

    crawlers.llms_txt_exists = llms_body.is_some();

    if let Some(body) = sitemap_body {
        let summary = sitemap::inspect_sitemap(&body);
        sitemaps.sitemap_exists = true;
        sitemaps.sitemap_url = sitemap_url;
        sitemaps.url_count = summary.url_count;
        sitemaps.is_index = summary.is_index;
    }

    (crawlers, sitemaps)
}

/// Fetch a small text resource, degrading every failure to `None`.
async fn fetch_text(client: &Client, url: &str) -> Option<String> {
    let response = match tokio::time::timeout(PROBE_TIMEOUT, client.get(url).send()).await {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => {
            log::debug!("probe failed for {}: {}", url, e);
            return None;
        }
        Err(_) => {
            log::debug!("probe timed out for {}", url);
            return None;
        }
    };

    if !response.status().is_success() {
        log::debug!("probe returned {} for {}", response.status(), url);
        return None;
    }

    match response.text().await {
        Ok(body) => Some(body),
        Err(e) => {
            log::debug!("probe body read failed for {}: {}", url, e);
            None
        }
    }
}

/// Derive security facts from the final fetch URL.
///
/// No live redirect-chain inspection: a final https URL implies both flags.
pub fn derive_security(final_url: &str) -> SecurityFacts {
    let https = final_url.starts_with("https://");
    SecurityFacts {
        ssl_enabled: https,
        https_redirect: https,
    }
}

/// Known analytics script-source fingerprints.
const ANALYTICS_FINGERPRINTS: &[(&str, &[&str])] = &[
    (
        "Google Analytics",
        &["googletagmanager.com/gtag/js", "google-analytics.com/analytics.js"],
    ),
    ("Google Tag Manager", &["googletagmanager.com/gtm.js"]),
    ("Facebook Pixel", &["connect.facebook.net"]),
    ("Hotjar", &["static.hotjar.com"]),
    ("Microsoft Clarity", &["clarity.ms/tag"]),
    ("Plausible", &["plausible.io/js"]),
    ("Matomo", &["matomo.js"]),
];

/// Detect analytics scripts by substring presence in the raw document.
pub fn detect_analytics(html: &str) -> AnalyticsFacts {
    let providers: Vec<String> = ANALYTICS_FINGERPRINTS
        .iter()
        .filter(|(_, needles)| needles.iter().any(|needle| html.contains(needle)))
        .map(|(provider, _)| provider.to_string())
        .collect();

    AnalyticsFacts {
        has_analytics: !providers.is_empty(),
        providers,
    }
}
