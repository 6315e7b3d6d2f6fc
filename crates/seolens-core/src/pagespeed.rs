//! PageSpeed aggregation.
//!
//! One call per strategy against an external PSI-shaped performance service,
//! normalized into a fixed [`PerformanceData`] document. Any failure -
//! timeout, non-2xx, malformed payload - is replaced wholesale by a
//! fully-populated zero-value document, so downstream consumers never branch
//! on absence. The combined entry point runs both strategies concurrently
//! and independently.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Audit keys this engine depends on.
const METRIC_AUDITS: [&str; 7] = [
    "first-contentful-paint",
    "largest-contentful-paint",
    "speed-index",
    "interactive",
    "total-blocking-time",
    "cumulative-layout-shift",
    "server-response-time",
];

/// Performance measurement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Mobile,
    Desktop,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }
}

/// Normalized performance document for one (URL, strategy) pair.
///
/// Always fully populated: the zero-value fallback carries every field with
/// `fetched` false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceData {
    pub strategy: Strategy,

    /// False when this document is the failure fallback.
    pub fetched: bool,

    pub scores: CategoryScores,

    /// Raw audit values, milliseconds except CLS.
    pub metrics: MetricSet,

    /// The same metrics converted to seconds (two decimals) for display;
    /// CLS passes through unchanged.
    pub display: MetricSet,

    pub resources: ResourceBreakdown,

    pub image_opportunities: ImageOpportunities,

    /// Fully-loaded final frame as a data URI, empty when unavailable.
    pub screenshot: String,
}

/// Lighthouse category scores on a 0-100 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub performance: u32,
    pub accessibility: u32,
    pub best_practices: u32,
    pub seo: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSet {
    pub first_contentful_paint: f64,
    pub largest_contentful_paint: f64,
    pub speed_index: f64,
    pub interactive: f64,
    pub total_blocking_time: f64,
    pub cumulative_layout_shift: f64,
    pub server_response_time: f64,
}

/// Requests bucketed into the eight fixed resource categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBreakdown {
    pub document: ResourceBucket,
    pub script: ResourceBucket,
    pub stylesheet: ResourceBucket,
    pub image: ResourceBucket,
    pub font: ResourceBucket,
    pub media: ResourceBucket,
    pub xhr: ResourceBucket,
    pub other: ResourceBucket,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBucket {
    pub requests: u32,
    pub transfer_kb: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOpportunities {
    pub count: u32,
    pub wasted_kb: f64,
}

impl PerformanceData {
    /// The documented zero-value document for a failed strategy call.
    pub fn fallback(strategy: Strategy) -> Self {
        Self {
            strategy,
            fetched: false,
            scores: CategoryScores::default(),
            metrics: MetricSet::default(),
            display: MetricSet::default(),
            resources: ResourceBreakdown::default(),
            image_opportunities: ImageOpportunities::default(),
            screenshot: String::new(),
        }
    }
}

// Raw PSI payload. Only the documented keys are modeled; everything else is
// ignored during deserialization.

#[derive(Debug, Deserialize)]
struct PsiResponse {
    #[serde(rename = "lighthouseResult", default)]
    lighthouse_result: LighthouseResult,
}

#[derive(Debug, Default, Deserialize)]
struct LighthouseResult {
    #[serde(default)]
    audits: HashMap<String, PsiAudit>,
    #[serde(default)]
    categories: PsiCategories,
}

#[derive(Debug, Default, Deserialize)]
struct PsiCategories {
    #[serde(default)]
    performance: PsiCategory,
    #[serde(default)]
    accessibility: PsiCategory,
    #[serde(rename = "best-practices", default)]
    best_practices: PsiCategory,
    #[serde(default)]
    seo: PsiCategory,
}

#[derive(Debug, Default, Deserialize)]
struct PsiCategory {
    score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct PsiAudit {
    #[serde(rename = "numericValue")]
    numeric_value: Option<f64>,
    details: Option<PsiAuditDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct PsiAuditDetails {
    #[serde(default)]
    items: Vec<serde_json::Value>,
    data: Option<String>,
    #[serde(rename = "overallSavingsBytes")]
    overall_savings_bytes: Option<f64>,
}

/// Client for the external performance-measurement service.
pub struct PageSpeedClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl PageSpeedClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Point the client at a different service endpoint (tests,
    /// self-hosted proxies).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Measure one strategy. Never fails: any error yields the zero-value
    /// fallback document.
    pub async fn analyze(&self, url: &str, strategy: Strategy) -> PerformanceData {
        match self.fetch(url, strategy).await {
            Ok(data) => data,
            Err(e) => {
                log::warn!(
                    "pagespeed {} call failed for {}: {}; using fallback",
                    strategy.as_str(),
                    url,
                    e
                );
                PerformanceData::fallback(strategy)
            }
        }
    }

    /// Measure both strategies concurrently and independently.
    pub async fn collect_performance(&self, url: &str) -> (PerformanceData, PerformanceData) {
        tokio::join!(
            self.analyze(url, Strategy::Mobile),
            self.analyze(url, Strategy::Desktop),
        )
    }

    async fn fetch(&self, url: &str, strategy: Strategy) -> anyhow::Result<PerformanceData> {
        let mut query: Vec<(&str, &str)> = vec![
            ("url", url),
            ("strategy", strategy.as_str()),
            ("category", "performance"),
            ("category", "accessibility"),
            ("category", "best-practices"),
            ("category", "seo"),
        ];
        if let Some(key) = &self.api_key {
            query.push(("key", key.as_str()));
        }

        let response = tokio::time::timeout(
            self.timeout,
            self.client.get(&self.endpoint).query(&query).send(),
        )
        .await
        .map_err(|_| anyhow::anyhow!("request timed out"))??;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("service returned HTTP {}", status);
        }

        let payload: PsiResponse = response.json().await?;
        Ok(normalize(payload, strategy))
    }
}

/// Normalize a raw PSI payload into the fixed document shape.
fn normalize(payload: PsiResponse, strategy: Strategy) -> PerformanceData {
    let result = payload.lighthouse_result;

    let scores = CategoryScores {
        performance: to_percent(result.categories.performance.score),
        accessibility: to_percent(result.categories.accessibility.score),
        best_practices: to_percent(result.categories.best_practices.score),
        seo: to_percent(result.categories.seo.score),
    };

    let value = |key: &str| -> f64 {
        result
            .audits
            .get(key)
            .and_then(|a| a.numeric_value)
            .unwrap_or(0.0)
    };

    let metrics = MetricSet {
        first_contentful_paint: value(METRIC_AUDITS[0]),
        largest_contentful_paint: value(METRIC_AUDITS[1]),
        speed_index: value(METRIC_AUDITS[2]),
        interactive: value(METRIC_AUDITS[3]),
        total_blocking_time: value(METRIC_AUDITS[4]),
        cumulative_layout_shift: value(METRIC_AUDITS[5]),
        server_response_time: value(METRIC_AUDITS[6]),
    };

    // Display block: milliseconds to seconds at two decimals; CLS is
    // unitless and passes through.
    let display = MetricSet {
        first_contentful_paint: to_seconds(metrics.first_contentful_paint),
        largest_contentful_paint: to_seconds(metrics.largest_contentful_paint),
        speed_index: to_seconds(metrics.speed_index),
        interactive: to_seconds(metrics.interactive),
        total_blocking_time: to_seconds(metrics.total_blocking_time),
        cumulative_layout_shift: round2(metrics.cumulative_layout_shift),
        server_response_time: to_seconds(metrics.server_response_time),
    };

    let resources = bucket_resources(result.audits.get("network-requests"));

    let image_opportunities = result
        .audits
        .get("uses-optimized-images")
        .and_then(|audit| audit.details.as_ref())
        .map(|details| ImageOpportunities {
            count: details.items.len() as u32,
            wasted_kb: round2(details.overall_savings_bytes.unwrap_or(0.0) / 1024.0),
        })
        .unwrap_or_default();

    let screenshot = final_screenshot(&result.audits);

    PerformanceData {
        strategy,
        fetched: true,
        scores,
        metrics,
        display,
        resources,
        image_opportunities,
        screenshot,
    }
}

fn bucket_resources(audit: Option<&PsiAudit>) -> ResourceBreakdown {
    let mut breakdown = ResourceBreakdown::default();
    let Some(items) = audit.and_then(|a| a.details.as_ref()).map(|d| &d.items) else {
        return breakdown;
    };

    let mut kb_totals: HashMap<&'static str, f64> = HashMap::new();

    for item in items {
        let resource_type = item
            .get("resourceType")
            .and_then(|t| t.as_str())
            .unwrap_or("Other");
        let transfer = item
            .get("transferSize")
            .and_then(|s| s.as_f64())
            .unwrap_or(0.0);

        let key = match resource_type {
            "Document" => "document",
            "Script" => "script",
            "Stylesheet" => "stylesheet",
            "Image" => "image",
            "Font" => "font",
            "Media" => "media",
            "XHR" | "Fetch" => "xhr",
            _ => "other",
        };

        let bucket = bucket_mut(&mut breakdown, key);
        bucket.requests += 1;
        *kb_totals.entry(key).or_insert(0.0) += transfer / 1024.0;
    }

    for (key, kb) in kb_totals {
        bucket_mut(&mut breakdown, key).transfer_kb = round2(kb);
    }

    breakdown
}

fn bucket_mut<'a>(breakdown: &'a mut ResourceBreakdown, key: &str) -> &'a mut ResourceBucket {
    match key {
        "document" => &mut breakdown.document,
        "script" => &mut breakdown.script,
        "stylesheet" => &mut breakdown.stylesheet,
        "image" => &mut breakdown.image,
        "font" => &mut breakdown.font,
        "media" => &mut breakdown.media,
        "xhr" => &mut breakdown.xhr,
        _ => &mut breakdown.other,
    }
}

/// The fully-loaded final frame: the last thumbnail in the filmstrip, with
/// the dedicated final-screenshot audit as fallback.
fn final_screenshot(audits: &HashMap<String, PsiAudit>) -> String {
    let last_thumbnail = audits
        .get("screenshot-thumbnails")
        .and_then(|audit| audit.details.as_ref())
        .and_then(|details| details.items.last())
        .and_then(|item| item.get("data"))
        .and_then(|data| data.as_str())
        .map(str::to_string);

    last_thumbnail
        .or_else(|| {
            audits
                .get("final-screenshot")
                .and_then(|audit| audit.details.as_ref())
                .and_then(|details| details.data.clone())
        })
        .unwrap_or_default()
}

fn to_percent(score: Option<f64>) -> u32 {
    (score.unwrap_or(0.0) * 100.0).round() as u32
}

fn to_seconds(ms: f64) -> f64 {
    round2(ms / 1000.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn sample_payload() -> serde_json::Value {
        serde_json::json!({
            "lighthouseResult": {
                "categories": {
                    "performance": {"score": 0.92},
                    "accessibility": {"score": 0.87},
                    "best-practices": {"score": 1.0},
                    "seo": {"score": 0.785}
                },
                "audits": {
                    "first-contentful-paint": {"numericValue": 1234.5},
                    "largest-contentful-paint": {"numericValue": 2517.0},
                    "speed-index": {"numericValue": 3000.0},
                    "interactive": {"numericValue": 4100.0},
                    "total-blocking-time": {"numericValue": 150.0},
                    "cumulative-layout-shift": {"numericValue": 0.054},
                    "server-response-time": {"numericValue": 420.0},
                    "network-requests": {"details": {"items": [
                        {"resourceType": "Document", "transferSize": 10240},
                        {"resourceType": "Script", "transferSize": 51200},
                        {"resourceType": "Script", "transferSize": 25600},
                        {"resourceType": "Image", "transferSize": 204800},
                        {"resourceType": "Preflight", "transferSize": 512}
                    ]}},
                    "uses-optimized-images": {"details": {
                        "items": [{}, {}],
                        "overallSavingsBytes": 51200.0
                    }},
                    "screenshot-thumbnails": {"details": {"items": [
                        {"data": "data:image/jpeg;base64,FIRST"},
                        {"data": "data:image/jpeg;base64,MIDDLE"},
                        {"data": "data:image/jpeg;base64,LAST"}
                    ]}},
                    "final-screenshot": {"details": {"data": "data:image/jpeg;base64,FINAL"}}
                }
            }
        })
    }

    fn normalized_sample() -> PerformanceData {
        let payload: PsiResponse = serde_json::from_value(sample_payload()).unwrap();
        normalize(payload, Strategy::Desktop)
    }

    #[test]
    fn scores_scale_to_percent() {
        let data = normalized_sample();
        assert_eq!(data.scores.performance, 92);
        assert_eq!(data.scores.accessibility, 87);
        assert_eq!(data.scores.best_practices, 100);
        assert_eq!(data.scores.seo, 79);
    }

    #[test]
    fn raw_metrics_pass_through_and_display_converts() {
        let data = normalized_sample();
        assert_eq!(data.metrics.largest_contentful_paint, 2517.0);
        assert_eq!(data.display.largest_contentful_paint, 2.52);
        assert_eq!(data.display.first_contentful_paint, 1.23);
        assert_eq!(data.display.cumulative_layout_shift, 0.05);
    }

    #[test]
    fn resources_bucket_into_fixed_categories() {
        let data = normalized_sample();
        assert_eq!(data.resources.document.requests, 1);
        assert_eq!(data.resources.document.transfer_kb, 10.0);
        assert_eq!(data.resources.script.requests, 2);
        assert_eq!(data.resources.script.transfer_kb, 75.0);
        assert_eq!(data.resources.image.requests, 1);
        // Unknown resource types land in "other".
        assert_eq!(data.resources.other.requests, 1);
        assert_eq!(data.resources.xhr.requests, 0);
    }

    #[test]
    fn screenshot_is_the_last_thumbnail_frame() {
        let data = normalized_sample();
        assert_eq!(data.screenshot, "data:image/jpeg;base64,LAST");
    }

    #[test]
    fn image_opportunities_summarize_savings() {
        let data = normalized_sample();
        assert_eq!(data.image_opportunities.count, 2);
        assert_eq!(data.image_opportunities.wasted_kb, 50.0);
    }

    #[test]
    fn empty_payload_normalizes_to_zeroes_but_fetched() {
        let payload: PsiResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        let data = normalize(payload, Strategy::Mobile);
        assert!(data.fetched);
        assert_eq!(data.scores, CategoryScores::default());
        assert_eq!(data.metrics, MetricSet::default());
        assert_eq!(data.screenshot, "");
    }

    #[tokio::test]
    async fn unreachable_service_yields_exact_fallback() {
        let client = PageSpeedClient::new(None).with_endpoint("http://127.0.0.1:9/psi");
        let data = client.analyze("https://example.com", Strategy::Desktop).await;
        assert_eq!(data, PerformanceData::fallback(Strategy::Desktop));
    }

    /// Minimal canned-response server: valid payload for mobile, HTTP 500
    /// for desktop.
    async fn spawn_split_service() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();

                let response = if request.contains("strategy=desktop") {
                    "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                        .to_string()
                } else {
                    let body = sample_payload().to_string();
                    format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    )
                };
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{}/psi", addr)
    }

    #[tokio::test]
    async fn one_failed_strategy_does_not_affect_the_other() {
        let endpoint = spawn_split_service().await;
        let client = PageSpeedClient::new(None)
            .with_endpoint(endpoint)
            .with_timeout(Duration::from_secs(5));

        let (mobile, desktop) = client.collect_performance("https://example.com").await;

        assert!(mobile.fetched);
        assert_eq!(mobile.scores.performance, 92);
        assert_eq!(desktop, PerformanceData::fallback(Strategy::Desktop));
    }
}
