//! The rule evaluator.
//!
//! A pure function from the extracted fact tree to a fixed report of named
//! checks. Every check is total and independent: it always produces a
//! status and a message, never consults another check, and never performs
//! I/O. Absent inputs map to deterministic warning/error results rather
//! than missing keys, so the report can be serialized as-is.

use serde::{Deserialize, Serialize};

use crate::types::WebsiteContent;

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Good,
    Warning,
    Error,
}

/// A check with no extra measurements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub message: String,
}

/// A check judged on a character length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LengthCheck {
    pub status: CheckStatus,
    pub message: String,
    pub length: usize,
}

/// A check judged on an item count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountCheck {
    pub status: CheckStatus,
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingsCheck {
    pub status: CheckStatus,
    pub message: String,
    pub h1_count: usize,
    pub proper_hierarchy: bool,
    pub skipped_levels: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCountCheck {
    pub status: CheckStatus,
    pub message: String,
    pub word_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadabilityCheck {
    pub status: CheckStatus,
    pub message: String,
    pub flesch_kincaid: f64,
    pub reading_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAltCheck {
    pub status: CheckStatus,
    pub message: String,
    pub image_count: usize,
    pub missing_alt: usize,
    pub missing_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinksCheck {
    pub status: CheckStatus,
    pub message: String,
    pub internal: usize,
    pub external: usize,
    pub nofollow: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredDataCheck {
    pub status: CheckStatus,
    pub message: String,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsCheck {
    pub status: CheckStatus,
    pub message: String,
    pub providers: Vec<String>,
}

/// The complete audit report. Every field is always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnPageSeoAnalysis {
    pub title: LengthCheck,
    pub meta_description: LengthCheck,
    pub headings: HeadingsCheck,
    pub content: WordCountCheck,
    pub readability: ReadabilityCheck,
    pub images: ImageAltCheck,
    pub links: LinksCheck,
    pub canonical: CheckResult,
    pub noindex: CheckResult,
    pub ssl: CheckResult,
    pub robots_txt: CheckResult,
    pub sitemap: CountCheck,
    pub llms_txt: CheckResult,
    pub hreflang: CountCheck,
    pub open_graph: CountCheck,
    pub twitter_cards: CountCheck,
    pub structured_data: StructuredDataCheck,
    pub analytics: AnalyticsCheck,
    pub mobile_friendly: CheckResult,
    pub keywords: CountCheck,
    pub language: CheckResult,
}

/// Evaluate every check over an already-populated fact tree.
pub fn run_onpage_seo_analysis(content: &WebsiteContent) -> OnPageSeoAnalysis {
    OnPageSeoAnalysis {
        title: check_title(content),
        meta_description: check_meta_description(content),
        headings: check_headings(content),
        content: check_word_count(content),
        readability: check_readability(content),
        images: check_image_alt(content),
        links: check_links(content),
        canonical: check_canonical(content),
        noindex: check_noindex(content),
        ssl: check_ssl(content),
        robots_txt: check_robots_txt(content),
        sitemap: check_sitemap(content),
        llms_txt: check_llms_txt(content),
        hreflang: check_hreflang(content),
        open_graph: check_open_graph(content),
        twitter_cards: check_twitter_cards(content),
        structured_data: check_structured_data(content),
        analytics: check_analytics(content),
        mobile_friendly: check_mobile_friendly(content),
        keywords: check_keywords(content),
        language: check_language(content),
    }
}

fn check_title(content: &WebsiteContent) -> LengthCheck {
    let length = content.title.chars().count();
    let (status, message) = if length == 0 {
        (
            CheckStatus::Error,
            "Page is missing a title tag".to_string(),
        )
    } else if (50..=60).contains(&length) {
        (
            CheckStatus::Good,
            format!("Title length is optimal ({} chars)", length),
        )
    } else if length < 50 {
        (
            CheckStatus::Warning,
            format!("Title is too short ({} chars, recommended: 50-60)", length),
        )
    } else {
        (
            CheckStatus::Warning,
            format!("Title is too long ({} chars, recommended: 50-60)", length),
        )
    };

    LengthCheck {
        status,
        message,
        length,
    }
}

fn check_meta_description(content: &WebsiteContent) -> LengthCheck {
    let length = content.meta_description.chars().count();
    let (status, message) = if length == 0 {
        (
            CheckStatus::Error,
            "Page is missing a meta description".to_string(),
        )
    } else if (120..=160).contains(&length) {
        (
            CheckStatus::Good,
            format!("Meta description length is optimal ({} chars)", length),
        )
    } else if length < 120 {
        (
            CheckStatus::Warning,
            format!(
                "Meta description is too short ({} chars, recommended: 120-160)",
                length
            ),
        )
    } else {
        (
            CheckStatus::Warning,
            format!(
                "Meta description is too long ({} chars, recommended: 120-160)",
                length
            ),
        )
    };

    LengthCheck {
        status,
        message,
        length,
    }
}

fn check_headings(content: &WebsiteContent) -> HeadingsCheck {
    let structure = &content.technical.heading_structure;
    let h1_count = content.headings.h1.len();

    let (status, message) = match h1_count {
        0 => (
            CheckStatus::Error,
            "Page is missing an H1 heading".to_string(),
        ),
        1 => {
            let message = if structure.skipped_levels {
                "Single H1 found, but the heading outline skips levels".to_string()
            } else {
                "Exactly one H1 with a clean heading outline".to_string()
            };
            (CheckStatus::Good, message)
        }
        n => (
            CheckStatus::Warning,
            format!("Page has {} H1 headings, expected exactly one", n),
        ),
    };

    HeadingsCheck {
        status,
        message,
        h1_count,
        proper_hierarchy: structure.proper_hierarchy,
        skipped_levels: structure.skipped_levels,
    }
}

fn check_word_count(content: &WebsiteContent) -> WordCountCheck {
    let word_count = content.performance.word_count;
    let (status, message) = if (300..=3500).contains(&word_count) {
        (
            CheckStatus::Good,
            format!("Content length is healthy ({} words)", word_count),
        )
    } else if word_count < 300 {
        (
            CheckStatus::Warning,
            format!("Thin content ({} words, recommended: 300-3500)", word_count),
        )
    } else {
        (
            CheckStatus::Warning,
            format!(
                "Very long content ({} words, recommended: 300-3500)",
                word_count
            ),
        )
    };

    WordCountCheck {
        status,
        message,
        word_count,
    }
}

fn check_readability(content: &WebsiteContent) -> ReadabilityCheck {
    let readability = &content.technical.readability;

    let (status, message) = if readability.word_count == 0 {
        (
            CheckStatus::Warning,
            "No text content to score for readability".to_string(),
        )
    } else if readability.flesch_kincaid >= 12.0 {
        (
            CheckStatus::Warning,
            format!(
                "Text reads at a very difficult level (grade {:.1})",
                readability.flesch_kincaid
            ),
        )
    } else if readability.flesch_kincaid >= 8.0 {
        (
            CheckStatus::Warning,
            format!(
                "Text is fairly difficult to read (grade {:.1})",
                readability.flesch_kincaid
            ),
        )
    } else {
        (
            CheckStatus::Good,
            format!(
                "Readability is accessible (grade {:.1}, {})",
                readability.flesch_kincaid, readability.reading_level
            ),
        )
    };

    ReadabilityCheck {
        status,
        message,
        flesch_kincaid: readability.flesch_kincaid,
        reading_level: readability.reading_level.clone(),
    }
}

fn check_image_alt(content: &WebsiteContent) -> ImageAltCheck {
    let image_count = content.performance.image_count;
    let missing_alt = content.performance.images_missing_alt;

    if image_count == 0 {
        return ImageAltCheck {
            status: CheckStatus::Warning,
            message: "No images found on the page".to_string(),
            image_count,
            missing_alt,
            missing_percentage: 0.0,
        };
    }

    let missing_percentage = (missing_alt as f64 / image_count as f64 * 100.0).round();
    let (status, message) = if missing_alt == 0 {
        (
            CheckStatus::Good,
            format!("All {} images have alt text", image_count),
        )
    } else if missing_percentage <= 50.0 {
        (
            CheckStatus::Warning,
            format!(
                "{} of {} images missing alt text ({}%)",
                missing_alt, image_count, missing_percentage
            ),
        )
    } else {
        (
            CheckStatus::Error,
            format!(
                "{} of {} images missing alt text ({}%)",
                missing_alt, image_count, missing_percentage
            ),
        )
    };

    ImageAltCheck {
        status,
        message,
        image_count,
        missing_alt,
        missing_percentage,
    }
}

fn check_links(content: &WebsiteContent) -> LinksCheck {
    let internal = content.performance.internal_link_count;
    let external = content.performance.external_link_count;
    let nofollow = content.performance.nofollow_link_count;

    let (status, message) = if internal + external == 0 {
        (
            CheckStatus::Warning,
            "Page has no links at all".to_string(),
        )
    } else if internal == 0 {
        (
            CheckStatus::Warning,
            "No internal links found for crawlers to follow".to_string(),
        )
    } else {
        (
            CheckStatus::Good,
            format!("{} internal and {} external links", internal, external),
        )
    };

    LinksCheck {
        status,
        message,
        internal,
        external,
        nofollow,
    }
}

fn check_canonical(content: &WebsiteContent) -> CheckResult {
    if content.meta.canonical.is_empty() {
        CheckResult {
            status: CheckStatus::Warning,
            message: "No canonical tag found".to_string(),
        }
    } else {
        CheckResult {
            status: CheckStatus::Good,
            message: format!("Canonical tag points to {}", content.meta.canonical),
        }
    }
}

fn check_noindex(content: &WebsiteContent) -> CheckResult {
    let robots = content.meta.robots.to_lowercase();
    if robots.contains("noindex") {
        CheckResult {
            status: CheckStatus::Warning,
            message: "Page carries a noindex directive and will not be indexed".to_string(),
        }
    } else if robots.is_empty() {
        // Absent robots meta is distinguished from an explicit indexable one.
        CheckResult {
            status: CheckStatus::Warning,
            message: "No robots meta tag found".to_string(),
        }
    } else {
        CheckResult {
            status: CheckStatus::Good,
            message: "No noindex directive present".to_string(),
        }
    }
}

fn check_ssl(content: &WebsiteContent) -> CheckResult {
    if content.security.ssl_enabled {
        CheckResult {
            status: CheckStatus::Good,
            message: "Page is served over HTTPS".to_string(),
        }
    } else {
        CheckResult {
            status: CheckStatus::Error,
            message: "Page is not served over HTTPS".to_string(),
        }
    }
}

fn check_robots_txt(content: &WebsiteContent) -> CheckResult {
    if content.crawlers.robots_txt_exists {
        let message = if content.crawlers.blocked_by_robots {
            "robots.txt found, but it blocks this page".to_string()
        } else {
            "robots.txt found".to_string()
        };
        CheckResult {
            status: CheckStatus::Good,
            message,
        }
    } else {
        CheckResult {
            status: CheckStatus::Warning,
            message: "No robots.txt found".to_string(),
        }
    }
}

fn check_sitemap(content: &WebsiteContent) -> CountCheck {
    if content.sitemaps.sitemap_exists {
        CountCheck {
            status: CheckStatus::Good,
            message: format!(
                "sitemap.xml found with {} entries",
                content.sitemaps.url_count
            ),
            count: content.sitemaps.url_count,
        }
    } else {
        CountCheck {
            status: CheckStatus::Warning,
            message: "No sitemap.xml found".to_string(),
            count: 0,
        }
    }
}

fn check_llms_txt(content: &WebsiteContent) -> CheckResult {
    if content.crawlers.llms_txt_exists {
        CheckResult {
            status: CheckStatus::Good,
            message: "llms.txt found".to_string(),
        }
    } else {
        CheckResult {
            status: CheckStatus::Warning,
            message: "No llms.txt found".to_string(),
        }
    }
}

fn check_hreflang(content: &WebsiteContent) -> CountCheck {
    let count = content.meta.hreflang.len();
    if count >= 1 {
        CountCheck {
            status: CheckStatus::Good,
            message: format!("{} hreflang entries found", count),
            count,
        }
    } else {
        CountCheck {
            status: CheckStatus::Warning,
            message: "No hreflang entries found".to_string(),
            count,
        }
    }
}

fn check_open_graph(content: &WebsiteContent) -> CountCheck {
    let count = content.meta.open_graph.len();
    let (status, message) = if count > 3 {
        (
            CheckStatus::Good,
            format!("{} Open Graph tags found", count),
        )
    } else if count > 0 {
        (
            CheckStatus::Warning,
            format!("Only {} Open Graph tags found", count),
        )
    } else {
        (
            CheckStatus::Warning,
            "No Open Graph tags found".to_string(),
        )
    };

    CountCheck {
        status,
        message,
        count,
    }
}

fn check_twitter_cards(content: &WebsiteContent) -> CountCheck {
    let count = content.meta.twitter.len();
    let (status, message) = if count > 2 {
        (
            CheckStatus::Good,
            format!("{} Twitter Card tags found", count),
        )
    } else if count > 0 {
        (
            CheckStatus::Warning,
            format!("Only {} Twitter Card tags found", count),
        )
    } else {
        (
            CheckStatus::Warning,
            "No Twitter Card tags found".to_string(),
        )
    };

    CountCheck {
        status,
        message,
        count,
    }
}

fn check_structured_data(content: &WebsiteContent) -> StructuredDataCheck {
    let types = content.structured_data.structured_data_types.clone();
    if content.structured_data.json_ld_count > 0 {
        StructuredDataCheck {
            status: CheckStatus::Good,
            message: format!(
                "{} JSON-LD blocks found ({})",
                content.structured_data.json_ld_count,
                if types.is_empty() {
                    "untyped".to_string()
                } else {
                    types.join(", ")
                }
            ),
            types,
        }
    } else {
        StructuredDataCheck {
            status: CheckStatus::Warning,
            message: "No structured data found".to_string(),
            types,
        }
    }
}

fn check_analytics(content: &WebsiteContent) -> AnalyticsCheck {
    let providers = content.analytics.providers.clone();
    if content.analytics.has_analytics {
        AnalyticsCheck {
            status: CheckStatus::Good,
            message: format!("Analytics detected: {}", providers.join(", ")),
            providers,
        }
    } else {
        AnalyticsCheck {
            status: CheckStatus::Warning,
            message: "No analytics scripts detected".to_string(),
            providers,
        }
    }
}

fn check_mobile_friendly(content: &WebsiteContent) -> CheckResult {
    if content.usability.has_viewport {
        CheckResult {
            status: CheckStatus::Good,
            message: "Viewport meta tag present".to_string(),
        }
    } else {
        CheckResult {
            status: CheckStatus::Warning,
            message: "No viewport meta tag; page may not be mobile friendly".to_string(),
        }
    }
}

fn check_keywords(content: &WebsiteContent) -> CountCheck {
    let count = content.meta.keywords.len();
    if count >= 1 {
        CountCheck {
            status: CheckStatus::Good,
            message: format!("{} meta keywords defined", count),
            count,
        }
    } else {
        CountCheck {
            status: CheckStatus::Warning,
            message: "No meta keywords defined".to_string(),
            count,
        }
    }
}

fn check_language(content: &WebsiteContent) -> CheckResult {
    if content.meta.language.is_empty() {
        CheckResult {
            status: CheckStatus::Warning,
            message: "No lang attribute on the html element".to_string(),
        }
    } else {
        CheckResult {
            status: CheckStatus::Good,
            message: format!("Page language declared as '{}'", content.meta.language),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_with_title(title: &str) -> WebsiteContent {
        WebsiteContent {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn title_boundaries_are_exact() {
        assert_eq!(
            check_title(&content_with_title(&"t".repeat(49))).status,
            CheckStatus::Warning
        );
        assert_eq!(
            check_title(&content_with_title(&"t".repeat(50))).status,
            CheckStatus::Good
        );
        assert_eq!(
            check_title(&content_with_title(&"t".repeat(60))).status,
            CheckStatus::Good
        );
        assert_eq!(
            check_title(&content_with_title(&"t".repeat(61))).status,
            CheckStatus::Warning
        );
        assert_eq!(
            check_title(&content_with_title("")).status,
            CheckStatus::Error
        );
    }

    #[test]
    fn meta_description_boundaries_are_exact() {
        let with_desc = |n: usize| WebsiteContent {
            meta_description: "d".repeat(n),
            ..Default::default()
        };

        assert_eq!(check_meta_description(&with_desc(119)).status, CheckStatus::Warning);
        assert_eq!(check_meta_description(&with_desc(120)).status, CheckStatus::Good);
        assert_eq!(check_meta_description(&with_desc(160)).status, CheckStatus::Good);
        assert_eq!(check_meta_description(&with_desc(161)).status, CheckStatus::Warning);
        assert_eq!(check_meta_description(&with_desc(0)).status, CheckStatus::Error);
    }

    #[test]
    fn h1_count_drives_heading_status() {
        let with_h1s = |n: usize| {
            let mut content = WebsiteContent::default();
            content.headings.h1 = vec!["h".to_string(); n];
            content
        };

        assert_eq!(check_headings(&with_h1s(0)).status, CheckStatus::Error);
        assert_eq!(check_headings(&with_h1s(1)).status, CheckStatus::Good);
        assert_eq!(check_headings(&with_h1s(2)).status, CheckStatus::Warning);
    }

    #[test]
    fn word_count_boundaries_are_exact() {
        let with_words = |n: usize| {
            let mut content = WebsiteContent::default();
            content.performance.word_count = n;
            content
        };

        assert_eq!(check_word_count(&with_words(299)).status, CheckStatus::Warning);
        assert_eq!(check_word_count(&with_words(300)).status, CheckStatus::Good);
        assert_eq!(check_word_count(&with_words(3500)).status, CheckStatus::Good);
        assert_eq!(check_word_count(&with_words(3501)).status, CheckStatus::Warning);
    }

    #[test]
    fn alt_coverage_thresholds() {
        let with_images = |total: usize, missing: usize| {
            let mut content = WebsiteContent::default();
            content.performance.image_count = total;
            content.performance.images_missing_alt = missing;
            content
        };

        let quarter = check_image_alt(&with_images(4, 1));
        assert_eq!(quarter.status, CheckStatus::Warning);
        assert_eq!(quarter.missing_percentage, 25.0);

        assert_eq!(check_image_alt(&with_images(4, 0)).status, CheckStatus::Good);
        // Exactly half missing is still a warning; beyond half is an error.
        assert_eq!(check_image_alt(&with_images(4, 2)).status, CheckStatus::Warning);
        assert_eq!(check_image_alt(&with_images(4, 3)).status, CheckStatus::Error);
        assert_eq!(check_image_alt(&with_images(0, 0)).status, CheckStatus::Warning);
    }

    #[test]
    fn ssl_and_robots_follow_probe_facts() {
        let mut content = WebsiteContent::default();
        assert_eq!(check_ssl(&content).status, CheckStatus::Error);
        assert_eq!(check_robots_txt(&content).status, CheckStatus::Warning);

        content.security.ssl_enabled = true;
        content.crawlers.robots_txt_exists = true;
        assert_eq!(check_ssl(&content).status, CheckStatus::Good);
        assert_eq!(check_robots_txt(&content).status, CheckStatus::Good);
    }

    #[test]
    fn hreflang_requires_at_least_one_entry() {
        let mut content = WebsiteContent::default();
        assert_eq!(check_hreflang(&content).status, CheckStatus::Warning);

        content.meta.hreflang.push("en".to_string());
        assert_eq!(check_hreflang(&content).status, CheckStatus::Good);
    }

    #[test]
    fn evaluator_is_total_on_empty_facts() {
        let report = run_onpage_seo_analysis(&WebsiteContent::default());
        let json = serde_json::to_value(&report).unwrap();
        let object = json.as_object().unwrap();

        // Every check is present with a status and a non-empty message.
        assert_eq!(object.len(), 21);
        for (name, check) in object {
            let status = check
                .get("status")
                .and_then(|s| s.as_str())
                .unwrap_or_else(|| panic!("check {} missing status", name));
            assert!(
                status == "warning" || status == "error",
                "check {} should degrade on empty facts, got {}",
                name,
                status
            );
            let message = check.get("message").and_then(|m| m.as_str()).unwrap();
            assert!(!message.is_empty(), "check {} has empty message", name);
        }
    }

    #[test]
    fn report_serializes_camel_case_keys() {
        let report = run_onpage_seo_analysis(&WebsiteContent::default());
        let json = serde_json::to_value(&report).unwrap();

        assert!(json.get("metaDescription").is_some());
        assert!(json.get("robotsTxt").is_some());
        assert!(json.get("llmsTxt").is_some());
        assert!(json.get("twitterCards").is_some());
        assert!(json.get("mobileFriendly").is_some());
    }

    #[test]
    fn healthy_page_reports_good_checks() {
        let mut content = WebsiteContent {
            url: "https://example.com/widgets".to_string(),
            // 50 chars, inside the 50-60 window.
            title: "Example widget store with quality widgets for sale".to_string(),
            meta_description: "d".repeat(140),
            ..Default::default()
        };
        content.headings.h1.push("Widgets".to_string());
        content.technical.heading_structure.proper_hierarchy = true;
        content.performance.word_count = 800;
        content.performance.image_count = 4;
        content.performance.internal_link_count = 12;
        content.performance.external_link_count = 3;
        content.meta.canonical = "https://example.com/widgets".to_string();
        content.meta.robots = "index, follow".to_string();
        content.security.ssl_enabled = true;

        let report = run_onpage_seo_analysis(&content);
        assert_eq!(report.title.status, CheckStatus::Good);
        assert_eq!(report.meta_description.status, CheckStatus::Good);
        assert_eq!(report.headings.status, CheckStatus::Good);
        assert_eq!(report.content.status, CheckStatus::Good);
        assert_eq!(report.images.status, CheckStatus::Good);
        assert_eq!(report.links.status, CheckStatus::Good);
        assert_eq!(report.canonical.status, CheckStatus::Good);
        assert_eq!(report.noindex.status, CheckStatus::Good);
        assert_eq!(report.ssl.status, CheckStatus::Good);
    }

    #[test]
    fn noindex_directive_is_flagged() {
        let mut content = WebsiteContent::default();
        content.meta.robots = "noindex, nofollow".to_string();
        let check = check_noindex(&content);
        assert_eq!(check.status, CheckStatus::Warning);
        assert!(check.message.contains("noindex"));
    }
}
