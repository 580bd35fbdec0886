use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

// Block-level boundaries that should survive as line breaks
static BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</p\s*>|</li\s*>").expect("valid break regex"));

static NUMERIC_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));").expect("valid entity regex")
});

/// Episode code, zero-padded to two digits: (1, 2) -> "S01E02"
pub fn format_code(season: u32, episode: u32) -> String {
    format!("S{:02}E{:02}", season, episode)
}

/// "Displaying 3 / 10 episodes"
pub fn count_label(shown: usize, total: usize, noun: &str) -> String {
    format!("Displaying {} / {} {}", shown, total, noun)
}

fn decode_entities(text: &str) -> String {
    // Unknown or invalid code points are left as written
    let numeric = NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, Some(dec)) => dec.as_str().parse().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    numeric
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Reduce an HTML fragment to a single line of plain text
pub fn strip_markup(html: &str) -> String {
    let spaced = BREAK.replace_all(html, " ");
    let text = decode_entities(&TAG.replace_all(&spaced, ""));
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Convert an HTML fragment to plain-text paragraphs, one per line
pub fn markup_to_text(html: &str) -> Vec<String> {
    let with_breaks = BREAK.replace_all(html, "\n");
    with_breaks
        .lines()
        .map(strip_markup)
        .filter(|line| !line.is_empty())
        .collect()
}
