//! # seolens-core
//!
//! Core library for auditing a single public web page for on-page SEO
//! health.
//!
//! This library provides:
//! - Page fetching and markup extraction into a typed fact tree
//! - Concurrent auxiliary probing (robots.txt, sitemap.xml, llms.txt)
//! - Heuristic scoring (readability, heading hierarchy, domain authority)
//! - PageSpeed aggregation with a zero-value fallback per strategy
//! - A deterministic rule evaluator producing a per-check report
//!
//! ## Example
//!
//! ```no_run
//! use seolens_core::{run_onpage_seo_analysis, scrape_website};
//!
//! # async fn example() -> Result<(), seolens_core::ScrapeError> {
//! let facts = scrape_website("example.com").await?;
//! let report = run_onpage_seo_analysis(&facts);
//!
//! println!("{}", report.title.message);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod error;
pub mod extract;
pub mod images;
pub mod pagespeed;
pub mod probe;
pub mod scrape;
pub mod score;
pub mod types;
pub mod url_utils;

// Re-export the audit surface
pub use analysis::{CheckStatus, OnPageSeoAnalysis, run_onpage_seo_analysis};
pub use error::ScrapeError;
pub use pagespeed::{PageSpeedClient, PerformanceData, Strategy};
pub use scrape::{ScrapeOptions, scrape_website, scrape_website_with};
pub use score::{FixedVitals, JitterEstimator, VitalsEstimator};
pub use types::{ImageFact, LinkFact, WebsiteContent};
