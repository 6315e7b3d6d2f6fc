use std::env;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use seolens_core::analysis::CheckStatus;
use seolens_core::pagespeed::PerformanceData;
use seolens_core::{
    JitterEstimator, OnPageSeoAnalysis, PageSpeedClient, ScrapeOptions, WebsiteContent,
    run_onpage_seo_analysis, scrape_website_with,
};

const APP_NAME: &str = "seolens";
const VERSION: &str = env!("CARGO_PKG_VERSION");
const DIVIDER: &str = "─────────────────────────────────────────────────────────────";

#[derive(Clone, Copy, PartialEq)]
enum OutputMode {
    Markdown,
    Json,
}

struct CliOptions {
    url: String,
    mode: OutputMode,
    include_pagespeed: bool,
    download_images: bool,
    save_target: Option<PathBuf>,
}

enum CliCommand {
    Run(CliOptions),
    Help,
    Version,
}

fn parse_arguments(args: &[String]) -> Result<CliCommand> {
    if args.is_empty() {
        return Ok(CliCommand::Help);
    }

    let mut url: Option<String> = None;
    let mut mode = OutputMode::Markdown;
    let mut include_pagespeed = false;
    let mut download_images = false;
    let mut save_target: Option<PathBuf> = None;
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if matches!(arg.as_str(), "-h" | "--help") {
            return Ok(CliCommand::Help);
        }

        if matches!(arg.as_str(), "-v" | "--version") {
            return Ok(CliCommand::Version);
        }

        if matches!(arg.as_str(), "-j" | "--json") {
            mode = OutputMode::Json;
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-p" | "--pagespeed") {
            include_pagespeed = true;
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-i" | "--images") {
            download_images = true;
            i += 1;
            continue;
        }

        if arg.starts_with("--save=") {
            if save_target.is_some() {
                return Err(anyhow!("--save specified multiple times"));
            }
            let value = &arg["--save=".len()..];
            if value.is_empty() {
                return Err(anyhow!("--save requires a file path"));
            }
            save_target = Some(PathBuf::from(value));
            i += 1;
            continue;
        }

        if arg.starts_with('-') {
            return Err(anyhow!("unknown option '{}'", arg));
        }

        if url.is_some() {
            return Err(anyhow!("multiple URLs supplied"));
        }
        url = Some(arg.clone());
        i += 1;
    }

    let url = url.ok_or_else(|| anyhow!("no URL supplied"))?;

    Ok(CliCommand::Run(CliOptions {
        url,
        mode,
        include_pagespeed,
        download_images,
        save_target,
    }))
}

fn print_help() {
    println!("{APP_NAME} — on-page SEO audits from the command line");
    println!("Usage: {APP_NAME} [OPTIONS] <URL>\n");
    println!("Options:");
    println!("  -j, --json          Output the full fact tree and report as JSON");
    println!("  -p, --pagespeed     Include PageSpeed measurements (mobile + desktop)");
    println!("  -i, --images        Download image bytes to report size and format");
    println!("      --save=PATH     Save the JSON result to a file");
    println!("  -v, --version       Show version information");
    println!("  -h, --help          Show this help message");
    println!();
    println!("Set PAGESPEED_API_KEY to raise the PageSpeed service quota.");
}

fn print_version() {
    println!("{APP_NAME} {VERSION}");
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_arguments(&args)? {
        CliCommand::Help => {
            print_help();
            return Ok(());
        }
        CliCommand::Version => {
            print_version();
            return Ok(());
        }
        CliCommand::Run(options) => options,
    };

    let scrape_options = ScrapeOptions {
        download_images: options.download_images,
    };

    let facts = scrape_website_with(&options.url, &scrape_options, &JitterEstimator)
        .await
        .map_err(|e| anyhow!("audit failed: {}", e))?;

    let report = run_onpage_seo_analysis(&facts);

    let pagespeed = if options.include_pagespeed {
        let api_key = env::var("PAGESPEED_API_KEY").ok();
        let client = PageSpeedClient::new(api_key);
        Some(client.collect_performance(&facts.url).await)
    } else {
        None
    };

    if let Some(path) = &options.save_target {
        let json = result_json(&facts, &report, pagespeed.as_ref())?;
        fs::write(path, &json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Saved audit to {}", path.display());
        return Ok(());
    }

    match options.mode {
        OutputMode::Json => {
            println!("{}", result_json(&facts, &report, pagespeed.as_ref())?);
        }
        OutputMode::Markdown => {
            print!("{}", render_markdown(&facts, &report, pagespeed.as_ref()));
        }
    }

    Ok(())
}

fn result_json(
    facts: &WebsiteContent,
    report: &OnPageSeoAnalysis,
    pagespeed: Option<&(PerformanceData, PerformanceData)>,
) -> Result<String> {
    let mut root = serde_json::json!({
        "website": facts,
        "analysis": report,
    });

    if let Some((mobile, desktop)) = pagespeed {
        root["pagespeed"] = serde_json::json!({
            "mobile": mobile,
            "desktop": desktop,
        });
    }

    Ok(serde_json::to_string_pretty(&root)?)
}

fn status_label(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Good => "good",
        CheckStatus::Warning => "warn",
        CheckStatus::Error => "FAIL",
    }
}

fn render_markdown(
    facts: &WebsiteContent,
    report: &OnPageSeoAnalysis,
    pagespeed: Option<&(PerformanceData, PerformanceData)>,
) -> String {
    let mut md = String::new();

    let title = if facts.title.is_empty() {
        "(untitled page)"
    } else {
        facts.title.as_str()
    };

    md.push_str(DIVIDER);
    md.push('\n');
    let _ = writeln!(md, "# {}", title);
    md.push_str(DIVIDER);
    md.push_str("\n\n");

    let _ = writeln!(md, "**URL**: {}", facts.url);
    let _ = writeln!(
        md,
        "**Domain authority estimate**: {} (≈{} backlinks, ≈{} monthly visits)",
        facts.technical.domain_authority.score,
        facts.technical.domain_authority.estimated_backlinks,
        facts.technical.domain_authority.estimated_traffic
    );
    let _ = writeln!(
        md,
        "**Words**: {}  **Images**: {}  **Links**: {} ({} external)",
        facts.performance.word_count,
        facts.performance.image_count,
        facts.performance.link_count,
        facts.performance.external_link_count
    );
    md.push('\n');

    md.push_str("## Checks\n\n");
    let checks: Vec<(&str, CheckStatus, &str)> = vec![
        ("Title", report.title.status, &report.title.message),
        (
            "Meta description",
            report.meta_description.status,
            &report.meta_description.message,
        ),
        ("Headings", report.headings.status, &report.headings.message),
        ("Content", report.content.status, &report.content.message),
        (
            "Readability",
            report.readability.status,
            &report.readability.message,
        ),
        ("Images", report.images.status, &report.images.message),
        ("Links", report.links.status, &report.links.message),
        ("Canonical", report.canonical.status, &report.canonical.message),
        ("Noindex", report.noindex.status, &report.noindex.message),
        ("SSL", report.ssl.status, &report.ssl.message),
        ("robots.txt", report.robots_txt.status, &report.robots_txt.message),
        ("Sitemap", report.sitemap.status, &report.sitemap.message),
        ("llms.txt", report.llms_txt.status, &report.llms_txt.message),
        ("Hreflang", report.hreflang.status, &report.hreflang.message),
        (
            "Open Graph",
            report.open_graph.status,
            &report.open_graph.message,
        ),
        (
            "Twitter Cards",
            report.twitter_cards.status,
            &report.twitter_cards.message,
        ),
        (
            "Structured data",
            report.structured_data.status,
            &report.structured_data.message,
        ),
        ("Analytics", report.analytics.status, &report.analytics.message),
        (
            "Mobile friendly",
            report.mobile_friendly.status,
            &report.mobile_friendly.message,
        ),
        ("Keywords", report.keywords.status, &report.keywords.message),
        ("Language", report.language.status, &report.language.message),
    ];

    for (name, status, message) in checks {
        let _ = writeln!(md, "- `[{}]` **{}** — {}", status_label(status), name, message);
    }

    if let Some((mobile, desktop)) = pagespeed {
        md.push('\n');
        md.push_str("## PageSpeed\n\n");
        for data in [mobile, desktop] {
            if data.fetched {
                let _ = writeln!(
                    md,
                    "- **{}**: performance {} | LCP {:.2}s | CLS {:.2}",
                    data.strategy.as_str(),
                    data.scores.performance,
                    data.display.largest_contentful_paint,
                    data.display.cumulative_layout_shift
                );
            } else {
                let _ = writeln!(
                    md,
                    "- **{}**: no data (measurement failed)",
                    data.strategy.as_str()
                );
            }
        }
    }

    md
}
