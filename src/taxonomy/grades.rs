use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Tokens a grade set may contain. `HS` and `K-12` are accepted so a set that
/// skipped expansion still passes; expansion never emits them.
pub const ALLOWED_GRADES: [&str; 15] = [
    "K", "HS", "K-12", "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12",
];

/// Highest numbered grade. Range bounds above it are not expanded.
pub const MAX_GRADE: u64 = 12;

static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)-([0-9]+)").expect("grade range regex is valid"));

/// Expands one grade-level token into canonical two-character grade codes.
///
/// `K-12` and `HS` are fixed spans, `<a>-<b>` is an inclusive range taken in
/// the order written (reversed bounds yield nothing), and anything else is
/// kept as `K` or zero-padded from its leading digits. A range reaching past
/// [`MAX_GRADE`] yields only its largest bound, which fails validation.
pub fn expand(token: &str) -> Vec<String> {
    if token == "K-12" {
        let mut grades = vec!["K".to_string()];
        grades.extend((1..=12).map(pad));
        return grades;
    }
    if token == "HS" {
        return (9..=12).map(pad).collect();
    }
    if let Some(captures) = RANGE_RE.captures(token) {
        let low = leading_number(&captures[1]);
        let high = leading_number(&captures[2]);
        if low.max(high) > MAX_GRADE {
            return vec![pad(low.max(high))];
        }
        return (low..=high).map(pad).collect();
    }
    if token == "K" {
        return vec!["K".to_string()];
    }
    vec![pad(leading_number(token))]
}

/// Union of the expansions of every token.
pub fn expand_all<'a, I>(tokens: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens.into_iter().flat_map(expand).collect()
}

pub fn is_valid_grade_set(grades: &BTreeSet<String>) -> bool {
    grades
        .iter()
        .all(|grade| ALLOWED_GRADES.contains(&grade.as_str()))
}

fn pad(value: u64) -> String {
    format!("{value:02}")
}

// Non-numeric input reads as zero.
fn leading_number(token: &str) -> u64 {
    let trimmed = token.trim_start();
    let digits = trimmed
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map(|(index, _)| &trimmed[..index])
        .unwrap_or(trimmed);
    digits.parse::<u64>().unwrap_or(0)
}
