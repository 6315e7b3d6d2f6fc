//! Bounded domain-authority estimate.
//!
//! The estimate rewards on-page quality signals additively from a fixed
//! base; it is an illustrative heuristic bounded to [1, 100], and the
//! backlink/traffic projections derived from it are likewise estimates, not
//! measured data.

use crate::types::{DomainAuthorityEstimate, WebsiteContent};

const BASE_SCORE: u32 = 30;

/// Estimate domain authority from the extracted facts.
///
/// Each bonus applies independently, so the estimate is monotone in every
/// individual signal.
pub fn estimate_domain_authority(content: &WebsiteContent) -> DomainAuthorityEstimate {
    let mut score = BASE_SCORE;

    if content.url.starts_with("https://") {
        score += 10;
    }

    let title_len = content.title.chars().count();
    if title_len > 0 && title_len <= 60 {
        score += 5;
    }

    let desc_len = content.meta_description.chars().count();
    if desc_len > 0 && desc_len <= 160 {
        score += 5;
    }

    if content.structured_data.json_ld_count > 0 {
        score += 8;
    }

    if content.headings.h1.len() == 1 {
        score += 5;
    }

    if !content.meta.canonical.is_empty() {
        score += 3;
    }

    if !content.meta.robots.is_empty() {
        score += 2;
    }

    if !content.meta.viewport.is_empty() {
        score += 2;
    }

    if content.performance.content_length > 1000 {
        score += 5;
    }

    if content.headings.h2.len() > 3 {
        score += 3;
    }

    if content.performance.image_count > 3 {
        score += 2;
    }

    if content.performance.external_link_count > 5 {
        score += 3;
    }

    if content.performance.internal_link_count > 10 {
        score += 2;
    }

    if content.meta.open_graph.len() > 3 {
        score += 3;
    }

    if content.meta.twitter.len() > 2 {
        score += 2;
    }

    let score = score.clamp(1, 100);

    DomainAuthorityEstimate {
        score,
        estimated_backlinks: project_backlinks(score),
        estimated_traffic: project_traffic(score),
    }
}

fn project_backlinks(score: u32) -> u64 {
    ((f64::from(score) / 10.0).powf(2.5) * 50.0).floor() as u64
}

fn project_traffic(score: u32) -> u64 {
    ((f64::from(score) / 10.0).powi(3) * 100.0).floor() as u64
}
