//! Light sitemap.xml inspection.
//!
//! The audit only needs to know that a sitemap exists, which flavor it is,
//! and roughly how many entries it carries; a regex scan over `<loc>`
//! entries is enough and tolerates the malformed XML real sites serve.

use once_cell::sync::Lazy;
use regex::Regex;

/// Summary of a fetched sitemap body.
#[derive(Debug, Clone, Default)]
pub struct SitemapSummary {
    /// True for a sitemap index, false for a standard urlset.
    pub is_index: bool,

    /// URL entries in a urlset, or nested sitemap locations in an index.
    pub url_count: usize,

    /// Nested sitemap URLs (index flavor only).
    pub nested_sitemaps: Vec<String>,
}

/// Inspect sitemap content.
pub fn inspect_sitemap(content: &str) -> SitemapSummary {
    static LOC: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?s)<loc>(.*?)</loc>").expect("invalid loc regex"));

    let locations: Vec<String> = LOC
        .captures_iter(content)
        .filter_map(|cap| cap.get(1))
        .map(|loc| decode_xml_entities(loc.as_str().trim()))
        .collect();

    if content.contains("<sitemapindex") {
        SitemapSummary {
            is_index: true,
            url_count: locations.len(),
            nested_sitemaps: locations,
        }
    } else {
        SitemapSummary {
            is_index: false,
            url_count: locations.len(),
            nested_sitemaps: Vec::new(),
        }
    }
}

fn decode_xml_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_urlset_entries() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/page1</loc></url>
  <url><loc>https://example.com/page2</loc></url>
</urlset>"#;

        let summary = inspect_sitemap(xml);
        assert!(!summary.is_index);
        assert_eq!(summary.url_count, 2);
        assert!(summary.nested_sitemaps.is_empty());
    }

    #[test]
    fn recognizes_sitemap_index() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://example.com/sitemap1.xml</loc></sitemap>
  <sitemap><loc>https://example.com/sitemap2.xml</loc></sitemap>
</sitemapindex>"#;

        let summary = inspect_sitemap(xml);
        assert!(summary.is_index);
        assert_eq!(summary.url_count, 2);
        assert_eq!(summary.nested_sitemaps.len(), 2);
    }

    #[test]
    fn decodes_xml_entities_in_locations() {
        let xml = "<urlset><url><loc>https://example.com/page?a=1&amp;b=2</loc></url></urlset>";
        let summary = inspect_sitemap(xml);
        assert_eq!(summary.url_count, 1);
    }

    #[test]
    fn garbage_body_counts_nothing() {
        let summary = inspect_sitemap("<html>This is not a sitemap</html>");
        assert!(!summary.is_index);
        assert_eq!(summary.url_count, 0);
    }
}
