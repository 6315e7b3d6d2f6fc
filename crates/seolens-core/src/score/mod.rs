//! Heuristic scorers over the extracted fact tree.
//!
//! Everything here is pure and deterministic except the simulated Core Web
//! Vitals, which are isolated behind [`VitalsEstimator`] so tests can swap
//! in a fixed stub.

pub mod authority;
pub mod headings;
pub mod readability;
pub mod vitals;

pub use authority::estimate_domain_authority;
pub use headings::analyze_heading_structure;
pub use readability::analyze_readability;
pub use vitals::{FixedVitals, JitterEstimator, VitalsEstimator, estimate_pagespeed};

use crate::types::WebsiteContent;

/// Fill the derived `technical` facts from the already-extracted base tree.
pub fn apply_scores(content: &mut WebsiteContent, estimator: &dyn VitalsEstimator) {
    content.technical.heading_structure = analyze_heading_structure(&content.headings);
    content.technical.readability = analyze_readability(&content.content);
    content.technical.domain_authority = estimate_domain_authority(content);

    let da = content.technical.domain_authority.score;
    content.technical.core_web_vitals = estimator.estimate(da);
    content.technical.pagespeed_estimate =
        estimate_pagespeed(content.technical.core_web_vitals.lcp, da);
}
