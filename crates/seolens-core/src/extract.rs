//! HTML parsing: raw markup to the base fact tree.
//!
//! Everything in this module is pure. Given the fetched document body and
//! the final request URL it fills `WebsiteContent` up through
//! `structured_data`; probes and scorers complete the tree afterwards.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::types::{
    Headings, ImageFact, LinkFact, MetaFacts, PerformanceFacts, StructuredDataFacts,
    UsabilityFacts, WebsiteContent,
};
use crate::url_utils::normalize_origin;

/// Parse a fetched document into the base fact tree.
///
/// Missing optional tags default to empty values; this function never fails
/// on malformed markup.
pub fn extract_content(html: &str, url: &str) -> WebsiteContent {
    let document = Html::parse_document(html);
    let origin = normalize_origin(url);

    let title = first_text(&document, "title");
    let meta_description = meta_content(&document, "meta[name='description']");
    let headings = extract_headings(&document);
    let content = visible_text(html);
    let images = extract_images(&document);
    let links = extract_links(&document, &origin);
    let meta = extract_meta(&document);
    let structured_data = extract_structured_data(html);
    let usability = UsabilityFacts {
        has_viewport: !meta.viewport.is_empty(),
        has_favicon: select_exists(&document, "link[rel~='icon']")
            || select_exists(&document, "link[rel='shortcut icon']"),
    };

    let performance = derive_counts(&headings, &content, &images, &links);

    WebsiteContent {
        url: url.to_string(),
        title,
        meta_description,
        headings,
        content,
        images,
        links,
        meta,
        performance,
        usability,
        structured_data,
        ..Default::default()
    }
}

/// Remove script, style and other non-visible blocks before text extraction.
pub fn sanitize_html(html: &str) -> String {
    static RE_TAG_BLOCKS: Lazy<Vec<Regex>> = Lazy::new(|| {
        [
            r"(?is)<script[^>]*?>[\s\S]*?</script>",
            r"(?is)<style[^>]*?>[\s\S]*?</style>",
            r"(?is)<noscript[^>]*?>[\s\S]*?</noscript>",
            r"(?is)<template[^>]*?>[\s\S]*?</template>",
        ]
        .into_iter()
        .map(|pattern| Regex::new(pattern).expect("invalid block regex"))
        .collect()
    });
    static RE_COMMENT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?is)<!--.*?-->").expect("invalid comment regex"));

    let mut clean = html.to_string();
    for re in RE_TAG_BLOCKS.iter() {
        clean = re.replace_all(&clean, "").into_owned();
    }

    RE_COMMENT.replace_all(&clean, "").into_owned()
}

/// Flattened, whitespace-normalized visible text of the page body.
fn visible_text(html: &str) -> String {
    let sanitized = sanitize_html(html);
    let document = Html::parse_document(&sanitized);

    let body_text = match Selector::parse("body") {
        Ok(selector) => document
            .select(&selector)
            .next()
            .map(|body| body.text().collect::<Vec<_>>().join(" "))
            .unwrap_or_default(),
        Err(_) => String::new(),
    };

    body_text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_headings(document: &Html) -> Headings {
    let texts = |tag: &str| -> Vec<String> {
        match Selector::parse(tag) {
            Ok(selector) => document
                .select(&selector)
                .map(element_text)
                .filter(|text| !text.is_empty())
                .collect(),
            Err(_) => Vec::new(),
        }
    };

    Headings {
        h1: texts("h1"),
        h2: texts("h2"),
        h3: texts("h3"),
        h4: texts("h4"),
        h5: texts("h5"),
        h6: texts("h6"),
    }
}

fn extract_images(document: &Html) -> Vec<ImageFact> {
    let selector = match Selector::parse("img") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let attr = |name: &str| element.value().attr(name).map(str::to_string);
            // Lazy-loading sites park the real source in data-src.
            let src = attr("src").or_else(|| attr("data-src"))?;

            Some(ImageFact {
                src,
                alt: attr("alt"),
                title: attr("title"),
                width: attr("width"),
                height: attr("height"),
                loading: attr("loading"),
                ..Default::default()
            })
        })
        .collect()
}

fn extract_links(document: &Html, origin: &str) -> Vec<LinkFact> {
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?.trim().to_string();
            if href.is_empty() {
                return None;
            }

            let text = element_text(element);
            let anchor_text = if text.is_empty() {
                element
                    .value()
                    .attr("title")
                    .map(|t| t.trim().to_string())
                    .unwrap_or_default()
            } else {
                text.clone()
            };

            // Containment heuristic, see LinkFact::is_external.
            let is_external = href.starts_with("http") && !href.contains(origin);
            let is_nofollow = element
                .value()
                .attr("rel")
                .map(|rel| rel.to_ascii_lowercase().contains("nofollow"))
                .unwrap_or(false);

            Some(LinkFact {
                href,
                text,
                anchor_text,
                is_external,
                is_nofollow,
            })
        })
        .collect()
}

fn extract_meta(document: &Html) -> MetaFacts {
    let keywords = meta_content(document, "meta[name='keywords']");
    let keywords = if keywords.is_empty() {
        Vec::new()
    } else {
        keywords
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect()
    };

    let language = match Selector::parse("html") {
        Ok(selector) => document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("lang"))
            .map(|lang| lang.trim().to_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    };

    let hreflang = match Selector::parse("link[rel='alternate'][hreflang]") {
        Ok(selector) => document
            .select(&selector)
            .filter_map(|el| el.value().attr("hreflang"))
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    };

    MetaFacts {
        keywords,
        author: meta_content(document, "meta[name='author']"),
        viewport: meta_content(document, "meta[name='viewport']"),
        robots: meta_content(document, "meta[name='robots']"),
        canonical: attr_value(document, "link[rel='canonical']", "href"),
        language,
        hreflang,
        open_graph: prefixed_meta_map(document, "meta[property^='og:']", "property"),
        twitter: prefixed_meta_map(document, "meta[name^='twitter:']", "name"),
    }
}

/// Extract JSON-LD script blocks from HTML.
pub fn extract_json_ld_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("script") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let script_type = element
                .value()
                .attr("type")
                .map(|t| t.trim().to_ascii_lowercase())
                .unwrap_or_default();

            // contains() catches variations like "application/ld+json; charset=utf-8"
            if script_type.contains("ld+json") {
                let text = element.text().collect::<String>().trim().to_string();
                if text.is_empty() { None } else { Some(text) }
            } else {
                None
            }
        })
        .collect()
}

fn extract_structured_data(html: &str) -> StructuredDataFacts {
    let mut facts = StructuredDataFacts::default();

    for block in extract_json_ld_blocks(html) {
        let parsed: JsonValue = match serde_json::from_str(&block) {
            Ok(value) => value,
            Err(e) => {
                // A single bad block never aborts the remaining ones.
                log::debug!("skipping unparseable JSON-LD block: {}", e);
                continue;
            }
        };

        facts.json_ld_count += 1;

        match parsed {
            JsonValue::Array(items) => {
                for item in items {
                    record_schema_entity(&item, &mut facts);
                }
            }
            other => record_schema_entity(&other, &mut facts),
        }
    }

    facts
}

fn record_schema_entity(value: &JsonValue, facts: &mut StructuredDataFacts) {
    let Some(obj) = value.as_object() else {
        return;
    };

    let mut types = Vec::new();
    match obj.get("@type") {
        Some(JsonValue::String(t)) => types.push(t.clone()),
        Some(JsonValue::Array(list)) => {
            types.extend(list.iter().filter_map(|t| t.as_str().map(str::to_string)));
        }
        _ => {}
    }

    for type_name in &types {
        if !facts.structured_data_types.contains(type_name) {
            facts.structured_data_types.push(type_name.clone());
        }

        match type_name.as_str() {
            "Organization" | "ProfessionalService" => {
                facts.has_organization_schema = true;
                if facts.organization_name.is_empty()
                    && let Some(name) = obj.get("name").and_then(|n| n.as_str())
                {
                    facts.organization_name = name.to_string();
                }
            }
            "Person" => facts.has_person_schema = true,
            _ => {}
        }
    }

    // Nested graphs carry their entities under @graph.
    if let Some(JsonValue::Array(graph)) = obj.get("@graph") {
        for item in graph {
            record_schema_entity(item, facts);
        }
    }
}

fn derive_counts(
    headings: &Headings,
    content: &str,
    images: &[ImageFact],
    links: &[LinkFact],
) -> PerformanceFacts {
    let external = links.iter().filter(|l| l.is_external).count();

    PerformanceFacts {
        image_count: images.len(),
        images_missing_alt: images.iter().filter(|i| i.alt.is_none()).count(),
        link_count: links.len(),
        internal_link_count: links.len() - external,
        external_link_count: external,
        nofollow_link_count: links.iter().filter(|l| l.is_nofollow).count(),
        heading_count: headings.total(),
        word_count: content.split_whitespace().count(),
        content_length: content.chars().count(),
    }
}

// Selector helpers. The fixed selectors in this module are known-good; a
// parse failure degrades to "absent" rather than panicking.

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(document: &Html, selector_str: &str) -> String {
    match Selector::parse(selector_str) {
        Ok(selector) => document
            .select(&selector)
            .next()
            .map(element_text)
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

fn meta_content(document: &Html, selector_str: &str) -> String {
    attr_value(document, selector_str, "content")
}

fn attr_value(document: &Html, selector_str: &str, attr: &str) -> String {
    match Selector::parse(selector_str) {
        Ok(selector) => document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(|v| v.trim().to_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

fn select_exists(document: &Html, selector_str: &str) -> bool {
    match Selector::parse(selector_str) {
        Ok(selector) => document.select(&selector).next().is_some(),
        Err(_) => false,
    }
}

fn prefixed_meta_map(
    document: &Html,
    selector_str: &str,
    key_attr: &str,
) -> HashMap<String, String> {
    let mut map = HashMap::new();

    if let Ok(selector) = Selector::parse(selector_str) {
        for element in document.select(&selector) {
            if let (Some(key), Some(content)) = (
                element.value().attr(key_attr),
                element.value().attr("content"),
            ) {
                map.insert(key.to_string(), content.to_string());
            }
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <title>  Example Store - Quality Widgets  </title>
            <meta name="description" content="Buy quality widgets online.">
            <meta name="keywords" content="widgets, gadgets , ">
            <meta name="viewport" content="width=device-width, initial-scale=1">
            <meta name="robots" content="index, follow">
            <link rel="canonical" href="https://example.com/widgets">
            <link rel="icon" href="/favicon.ico">
            <link rel="alternate" hreflang="en" href="https://example.com/widgets">
            <link rel="alternate" hreflang="de" href="https://example.com/de/widgets">
            <meta property="og:title" content="Example Store">
            <meta name="twitter:card" content="summary">
            <script type="application/ld+json">
                {"@context": "https://schema.org", "@type": "Organization", "name": "Example Inc"}
            </script>
            <script type="application/ld+json">not valid json</script>
        </head>
        <body>
            <h1>Quality Widgets</h1>
            <h2>Featured</h2>
            <h2>Reviews</h2>
            <p>Widgets for every purpose.</p>
            <img src="/logo.png" alt="Example logo">
            <img src="/hero.jpg" width="1200" height="600">
            <a href="/about">About us</a>
            <a href="https://other.example.net" rel="nofollow">Partner</a>
            <a href="https://example.com/shop" title="Shop now"><img src="/cta.png" alt=""></a>
            <script>console.log("hidden");</script>
        </body>
        </html>
    "#;

    #[test]
    fn extracts_title_and_meta() {
        let content = extract_content(PAGE, "https://example.com/widgets");

        assert_eq!(content.title, "Example Store - Quality Widgets");
        assert_eq!(content.meta_description, "Buy quality widgets online.");
        assert_eq!(content.meta.keywords, vec!["widgets", "gadgets"]);
        assert_eq!(content.meta.canonical, "https://example.com/widgets");
        assert_eq!(content.meta.language, "en");
        assert_eq!(content.meta.hreflang.len(), 2);
        assert_eq!(content.meta.open_graph.len(), 1);
        assert_eq!(content.meta.twitter.len(), 1);
        assert!(content.usability.has_viewport);
        assert!(content.usability.has_favicon);
    }

    #[test]
    fn missing_tags_default_to_empty() {
        let content = extract_content("<html><body>hi</body></html>", "https://example.com");

        assert_eq!(content.title, "");
        assert_eq!(content.meta_description, "");
        assert!(content.meta.canonical.is_empty());
        assert!(content.images.is_empty());
        assert!(content.links.is_empty());
    }

    #[test]
    fn headings_keep_document_order() {
        let content = extract_content(PAGE, "https://example.com/widgets");

        assert_eq!(content.headings.h1, vec!["Quality Widgets"]);
        assert_eq!(content.headings.h2, vec!["Featured", "Reviews"]);
        assert!(content.headings.h3.is_empty());
    }

    #[test]
    fn count_fields_match_list_lengths() {
        let content = extract_content(PAGE, "https://example.com/widgets");

        assert_eq!(content.performance.image_count, content.images.len());
        assert_eq!(content.performance.link_count, content.links.len());
        assert_eq!(content.performance.heading_count, content.headings.total());
        assert_eq!(
            content.performance.internal_link_count + content.performance.external_link_count,
            content.links.len()
        );
    }

    #[test]
    fn visible_text_excludes_scripts() {
        let content = extract_content(PAGE, "https://example.com/widgets");

        assert!(content.content.contains("Widgets for every purpose."));
        assert!(!content.content.contains("console.log"));
    }

    #[test]
    fn images_distinguish_missing_alt_from_empty() {
        let content = extract_content(PAGE, "https://example.com/widgets");

        assert_eq!(content.images.len(), 3);
        assert_eq!(content.images[0].alt.as_deref(), Some("Example logo"));
        assert_eq!(content.images[1].alt, None);
        assert_eq!(content.images[2].alt.as_deref(), Some(""));
        assert_eq!(content.performance.images_missing_alt, 1);
    }

    #[test]
    fn link_classification_uses_origin_containment() {
        let content = extract_content(PAGE, "https://example.com/widgets");

        let about = content.links.iter().find(|l| l.href == "/about").unwrap();
        assert!(!about.is_external);

        let partner = content
            .links
            .iter()
            .find(|l| l.href.contains("other.example.net"))
            .unwrap();
        assert!(partner.is_external);
        assert!(partner.is_nofollow);

        let shop = content
            .links
            .iter()
            .find(|l| l.href.contains("example.com/shop"))
            .unwrap();
        assert!(!shop.is_external);
        // Empty link text falls back to the title attribute.
        assert_eq!(shop.anchor_text, "Shop now");
    }

    #[test]
    fn external_heuristic_misclassifies_embedding_subdomains() {
        // Documented limitation: the origin substring appears inside a
        // foreign host, so the link counts as internal.
        let html = r#"<a href="https://example.com.evil.net/page">x</a>"#;
        let content = extract_content(html, "https://example.com");
        assert!(!content.links[0].is_external);
    }

    #[test]
    fn invalid_json_ld_block_is_skipped() {
        let content = extract_content(PAGE, "https://example.com/widgets");

        assert_eq!(content.structured_data.json_ld_count, 1);
        assert!(content.structured_data.has_organization_schema);
        assert_eq!(content.structured_data.organization_name, "Example Inc");
        assert!(!content.structured_data.has_person_schema);
    }

    #[test]
    fn json_ld_type_arrays_are_flattened() {
        let html = r#"
            <script type="application/ld+json">
                {"@type": ["WebPage", "Article"]}
            </script>
        "#;
        let content = extract_content(html, "https://example.com");

        let types = &content.structured_data.structured_data_types;
        assert!(types.contains(&"WebPage".to_string()));
        assert!(types.contains(&"Article".to_string()));
    }

    #[test]
    fn json_ld_graph_entities_are_recorded() {
        let html = r#"
            <script type="application/ld+json">
                {"@context": "https://schema.org", "@graph": [
                    {"@type": "Person", "name": "Ada"},
                    {"@type": "ProfessionalService", "name": "Widget Repair"}
                ]}
            </script>
        "#;
        let content = extract_content(html, "https://example.com");

        assert!(content.structured_data.has_person_schema);
        assert!(content.structured_data.has_organization_schema);
        assert_eq!(content.structured_data.organization_name, "Widget Repair");
    }

    #[test]
    fn json_ld_charset_variant_is_accepted() {
        let html = r#"
            <script type="application/ld+json; charset=utf-8">
                {"@type": "WebSite"}
            </script>
        "#;
        let blocks = extract_json_ld_blocks(html);
        assert_eq!(blocks.len(), 1);
    }
}
