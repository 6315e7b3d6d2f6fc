//! The fact tree produced by one page audit.
//!
//! `WebsiteContent` is constructed once per audit request, filled in by the
//! extractor, the auxiliary probes and the scorers, and is immutable after
//! the scrape completes. It serializes in camelCase so it can be returned
//! directly as an API response body or fed to a prompt builder.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical fact tree for one page fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteContent {
    /// Final URL after protocol normalization.
    pub url: String,

    /// Document title, empty when absent.
    pub title: String,

    /// Meta description, empty when absent.
    pub meta_description: String,

    /// Heading text per level, in document order.
    pub headings: Headings,

    /// Flattened visible text of the page body.
    pub content: String,

    pub images: Vec<ImageFact>,

    pub links: Vec<LinkFact>,

    /// Meta tag facts (keywords, viewport, canonical, social maps).
    pub meta: MetaFacts,

    /// Derived counts over the extracted lists.
    pub performance: PerformanceFacts,

    /// Derived scores and structural flags.
    pub technical: TechnicalFacts,

    pub security: SecurityFacts,

    pub crawlers: CrawlerFacts,

    pub sitemaps: SitemapFacts,

    pub analytics: AnalyticsFacts,

    pub structured_data: StructuredDataFacts,

    pub usability: UsabilityFacts,
}

/// Ordered heading text lists, h1 through h6.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    pub h4: Vec<String>,
    pub h5: Vec<String>,
    pub h6: Vec<String>,
}

impl Headings {
    /// Heading texts for a level in 1..=6. Out-of-range levels are empty.
    pub fn level(&self, level: usize) -> &[String] {
        match level {
            1 => &self.h1,
            2 => &self.h2,
            3 => &self.h3,
            4 => &self.h4,
            5 => &self.h5,
            6 => &self.h6,
            _ => &[],
        }
    }

    pub fn total(&self) -> usize {
        (1..=6).map(|l| self.level(l).len()).sum()
    }
}

/// One `<img>` element.
///
/// `base64`, `size` and `format` are present only when the byte download for
/// this image succeeded; a failed download leaves them unset without
/// affecting the rest of the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFact {
    pub src: String,

    /// Alt attribute; `None` means the attribute is missing (distinct from
    /// an empty decorative alt).
    pub alt: Option<String>,

    pub title: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub loading: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    pub is_logo: bool,
    pub is_hero: bool,
    pub is_product: bool,
}

/// One `<a href>` element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkFact {
    pub href: String,

    /// Visible link text, trimmed.
    pub text: String,

    /// Link text, falling back to the `title` attribute when the text is
    /// empty.
    pub anchor_text: String,

    /// True when the href is absolute and does not contain the page origin
    /// as a substring. This is a deliberate containment heuristic, not a
    /// host comparison: a foreign subdomain that embeds the origin string is
    /// classified internal. Preserved as documented behavior because the
    /// rule thresholds are tuned against it.
    pub is_external: bool,

    pub is_nofollow: bool,
}

/// Meta tag facts extracted from the document head.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaFacts {
    /// Parsed `meta[name=keywords]` entries.
    pub keywords: Vec<String>,

    pub author: String,
    pub viewport: String,

    /// Raw `meta[name=robots]` content (e.g. "noindex, nofollow").
    pub robots: String,

    pub canonical: String,

    /// `<html lang>` attribute.
    pub language: String,

    /// hreflang codes from `link[rel=alternate]` entries.
    pub hreflang: Vec<String>,

    /// `og:*` property map.
    pub open_graph: HashMap<String, String>,

    /// `twitter:*` name map.
    pub twitter: HashMap<String, String>,
}

/// Counts derived from the extracted lists.
///
/// Invariant: every count equals the length of its corresponding list
/// (`image_count == images.len()`, `heading_count == headings.total()`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceFacts {
    pub image_count: usize,
    pub images_missing_alt: usize,
    pub link_count: usize,
    pub internal_link_count: usize,
    pub external_link_count: usize,
    pub nofollow_link_count: usize,
    pub heading_count: usize,
    pub word_count: usize,
    pub content_length: usize,
}

/// Derived scores and structural flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalFacts {
    pub heading_structure: HeadingStructure,
    pub readability: Readability,
    pub domain_authority: DomainAuthorityEstimate,
    pub core_web_vitals: CoreWebVitals,
    pub pagespeed_estimate: PageSpeedEstimate,
}

/// Heading counts and hierarchy validity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingStructure {
    pub h1_count: usize,
    pub h2_count: usize,
    pub h3_count: usize,
    pub h4_count: usize,
    pub h5_count: usize,
    pub h6_count: usize,

    /// True iff exactly one h1 exists and the non-empty levels below it form
    /// a contiguous prefix (no skipped level).
    pub proper_hierarchy: bool,

    /// True when a populated level sits below an empty one.
    pub skipped_levels: bool,
}

/// Flesch-Kincaid readability approximation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Readability {
    /// Grade-level score, rounded to one decimal.
    pub flesch_kincaid: f64,
    pub avg_words_per_sentence: f64,
    pub avg_syllables_per_word: f64,
    pub sentence_count: usize,
    pub word_count: usize,

    /// Bucket label ("Easy" through "Very Difficult").
    pub reading_level: String,
}

/// Bounded domain-authority estimate and its dependent projections.
///
/// These are illustrative estimates derived from on-page signals, not
/// measured backlink or traffic data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainAuthorityEstimate {
    /// Estimate in [1, 100].
    pub score: u32,
    pub estimated_backlinks: u64,
    pub estimated_traffic: u64,
}

/// Where a Core Web Vitals triple came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VitalsSource {
    /// Placeholder values from the jitter estimator.
    #[default]
    Simulated,
    /// Values taken from a real performance measurement.
    Measured,
}

/// LCP / INP / CLS, tagged with their provenance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreWebVitals {
    /// Largest Contentful Paint in seconds.
    pub lcp: f64,
    /// Interaction to Next Paint in milliseconds.
    pub inp: f64,
    /// Cumulative Layout Shift.
    pub cls: f64,
    pub source: VitalsSource,
}

/// Heuristic PageSpeed score estimates per strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpeedEstimate {
    pub desktop: u32,
    pub mobile: u32,
}

/// Facts derived from the final fetch URL, not a live redirect probe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityFacts {
    pub ssl_enabled: bool,
    pub https_redirect: bool,
}

/// robots.txt and llms.txt probe results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerFacts {
    pub robots_txt_exists: bool,

    /// True when a wildcard disallow rule covers the audited page path.
    pub blocked_by_robots: bool,

    /// Disallow rules that apply to all user agents.
    pub disallow_rules: Vec<String>,

    pub crawl_delay: Option<u32>,

    pub llms_txt_exists: bool,
}

/// sitemap.xml probe results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapFacts {
    pub sitemap_exists: bool,
    pub sitemap_url: String,

    /// URL entries in a standard sitemap, or nested sitemaps in an index.
    pub url_count: usize,

    pub is_index: bool,

    /// Sitemap URLs advertised in robots.txt.
    pub robots_advertised: Vec<String>,
}

/// Analytics script presence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsFacts {
    pub has_analytics: bool,
    pub providers: Vec<String>,
}

/// JSON-LD structured data facts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDataFacts {
    pub json_ld_count: usize,

    /// Flattened `@type` values across all parsed blocks.
    pub structured_data_types: Vec<String>,

    pub has_organization_schema: bool,
    pub organization_name: String,
    pub has_person_schema: bool,
}

/// Mobile and presentation usability flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsabilityFacts {
    pub has_viewport: bool,
    pub has_favicon: bool,
}
