//! Simulated Core Web Vitals.
//!
//! When no real measurement is available the audit carries placeholder
//! vitals. The randomness lives behind [`VitalsEstimator`] so the fallback
//! path is swappable for a deterministic stub in tests and clearly separated
//! from measured-data code: everything produced here is tagged
//! [`VitalsSource::Simulated`].

use rand::Rng;

use crate::types::{CoreWebVitals, PageSpeedEstimate, VitalsSource};

/// Provider of Core Web Vitals estimates.
pub trait VitalsEstimator {
    /// Produce one vitals triple for a page with the given domain-authority
    /// estimate.
    fn estimate(&self, domain_authority: u32) -> CoreWebVitals;
}

/// Jittered placeholder generator.
///
/// Pages with an authority estimate above 70 draw from a faster band:
/// LCP 1.2-2.2s, INP 80-180ms, CLS 0.02-0.10; everything else draws from
/// LCP 1.8-3.8s, INP 120-320ms, CLS 0.05-0.25.
#[derive(Debug, Default, Clone, Copy)]
pub struct JitterEstimator;

impl VitalsEstimator for JitterEstimator {
    fn estimate(&self, domain_authority: u32) -> CoreWebVitals {
        let mut rng = rand::thread_rng();

        let (lcp, inp, cls): (f64, f64, f64) = if domain_authority > 70 {
            (
                rng.gen_range(1.2..2.2),
                rng.gen_range(80.0..180.0),
                rng.gen_range(0.02..0.10),
            )
        } else {
            (
                rng.gen_range(1.8..3.8),
                rng.gen_range(120.0..320.0),
                rng.gen_range(0.05..0.25),
            )
        };

        CoreWebVitals {
            lcp: round2(lcp),
            inp: inp.round(),
            cls: round2(cls),
            source: VitalsSource::Simulated,
        }
    }
}

/// Fixed vitals for deterministic tests.
#[derive(Debug, Clone)]
pub struct FixedVitals(pub CoreWebVitals);

impl VitalsEstimator for FixedVitals {
    fn estimate(&self, _domain_authority: u32) -> CoreWebVitals {
        self.0.clone()
    }
}

/// Heuristic PageSpeed score estimates derived from LCP and authority.
pub fn estimate_pagespeed(lcp_seconds: f64, domain_authority: u32) -> PageSpeedEstimate {
    let authority_bonus = domain_authority > 70;

    let desktop = 90.0 - lcp_seconds * 10.0 + if authority_bonus { 10.0 } else { 0.0 };
    let mobile = 80.0 - lcp_seconds * 15.0 + if authority_bonus { 5.0 } else { 0.0 };

    PageSpeedEstimate {
        desktop: (desktop.round() as i64).clamp(40, 100) as u32,
        mobile: (mobile.round() as i64).clamp(30, 100) as u32,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
