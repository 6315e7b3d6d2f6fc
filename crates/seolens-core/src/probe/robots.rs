//! robots.txt parsing and path blocking.

/// Parsed robots.txt facts relevant to a single-page audit.
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    /// Disallow rules that apply to all user agents.
    pub disallow: Vec<String>,

    /// Allow rules that apply to all user agents.
    pub allow: Vec<String>,

    pub crawl_delay: Option<u32>,

    /// Sitemap URLs advertised anywhere in the file.
    pub sitemaps: Vec<String>,
}

/// Parse robots.txt content, keeping the wildcard-agent rule group.
pub fn parse_robots_txt(content: &str) -> RobotsRules {
    let mut rules = RobotsRules::default();
    let mut applies_to_all = false;

    for line in content.lines() {
        let line = line.trim();

        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Split on first colon
        let Some((directive, value)) = line.split_once(':') else {
            continue;
        };
        let directive = directive.trim().to_lowercase();
        let value = value.trim();

        match directive.as_str() {
            "user-agent" => {
                applies_to_all = value == "*";
            }
            "disallow" if applies_to_all => {
                if !value.is_empty() {
                    rules.disallow.push(value.to_string());
                }
            }
            "allow" if applies_to_all => {
                if !value.is_empty() {
                    rules.allow.push(value.to_string());
                }
            }
            "crawl-delay" if applies_to_all => {
                if let Ok(delay) = value.parse::<u32>() {
                    rules.crawl_delay = Some(delay);
                }
            }
            "sitemap" => {
                if !value.is_empty() {
                    rules.sitemaps.push(value.to_string());
                }
            }
            _ => {}
        }
    }

    rules
}

/// Whether a page path is blocked by the wildcard disallow rules.
///
/// A rule blocks the path when it is `/`, or when it is a slash-bounded
/// prefix of the path: `/blog/` blocks `/blog/post-1` but not `/blogger`.
/// Allow rules take precedence over disallow rules.
pub fn is_path_blocked(path: &str, rules: &RobotsRules) -> bool {
    if rules.allow.iter().any(|allow| prefix_matches(path, allow)) {
        return false;
    }

    rules.disallow.iter().any(|disallow| {
        if disallow == "/" {
            return true;
        }
        prefix_matches(path, disallow)
    })
}

fn prefix_matches(path: &str, rule: &str) -> bool {
    if !path.starts_with(rule) {
        return false;
    }
    // Slash-bounded: the match must end at a path-segment boundary.
    rule.ends_with('/')
        || path.len() == rule.len()
        || path.as_bytes().get(rule.len()) == Some(&b'/')
}
