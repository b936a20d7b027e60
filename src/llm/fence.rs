use regex::Regex;
use std::sync::LazyLock;

const FENCE: &str = "```";

// An opening fence and, if present, a known SQL language tag. Any other word
// after the fence is statement text ("```SELECT\n*") and stays.
static OPENING_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^```[ \t]*(?:(?i:sqlite|sql|postgresql|postgres|mysql)\b)?").unwrap()
});

/// Recovers bare SQL from model output: trims whitespace, removes one
/// leading and one trailing markdown code fence when present, and trims
/// again. Text without fences only loses its surrounding whitespace.
pub fn strip_code_fence(raw: &str) -> String {
    let mut sql = raw.trim();

    if let Some(found) = OPENING_FENCE.find(sql) {
        sql = &sql[found.end()..];
    }

    if let Some(rest) = sql.strip_suffix(FENCE) {
        sql = rest;
    }

    sql.trim().to_string()
}
