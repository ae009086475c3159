//! Text-driven extraction: the trailing `Sources:` line the model is asked to write.

use std::sync::LazyLock;

use regex::Regex;

/// `Sources:` (or `Source:`) label opening the last non-blank line, or
/// following the sentence that ends it, optionally wrapped in markdown
/// emphasis; captures the rest of that line.
static SOURCES_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)(?:^|[.!?])[ \t]*[*_]*sources?[ \t]*[*_]*[ \t]*:[ \t]*[*_]*[ \t]*([^\n]*?)\s*\z",
    )
    .expect("sources line regex compiles")
});

/// Parses the trailing `Sources: a, b; c` line of an answer.
///
/// Items are split on `,` and `;`, trimmed (including stray markdown `*`
/// and backticks) and deduplicated in order. No such line yields an empty list.
pub fn sources_from_text(answer: &str) -> Vec<String> {
    let Some(caps) = SOURCES_LINE.captures(answer) else {
        return Vec::new();
    };
    let list = caps.get(1).map_or("", |m| m.as_str());

    let mut out: Vec<String> = Vec::new();
    for item in list.split([',', ';']) {
        let item = item.trim().trim_matches(['*', '`']).trim();
        if !item.is_empty() && !out.iter().any(|seen| seen == item) {
            out.push(item.to_string());
        }
    }
    out
}
