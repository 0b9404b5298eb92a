use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));
static SEPARATOR_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*-{3,}\s*$").expect("valid regex"));

/// Clean LLM-produced diagram text into something [`super::parse`] can read
/// deterministically.
///
/// Markup tags and `( ... )` annotations are removed, typographic dashes and
/// quotes become ASCII, separator lines (`---`) and blank lines are dropped,
/// and every line ending becomes `\n`. Never fails, and
/// `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let without_tags = MARKUP_TAG.replace_all(raw, "");
    // `Name(extra info)suffix` -> `Namesuffix`
    let without_parens = PARENTHETICAL.replace_all(&without_tags, "");
    let ascii = replace_typographic(&without_parens);

    let unified = ascii.replace("\r\n", "\n").replace('\r', "\n");
    let kept: Vec<&str> = unified
        .split('\n')
        .filter(|line| !SEPARATOR_LINE.is_match(line))
        .filter(|line| !line.trim().is_empty())
        .collect();

    kept.join("\n").trim().to_string()
}

fn replace_typographic(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' => '-',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}
