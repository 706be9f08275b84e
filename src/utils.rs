use rand::{Rng, distr::Alphanumeric};

pub const SLUG_TITLE_MAX_CHARS: usize = 47;

pub fn random_slug(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Spaces become underscores, then the result is cut to 47 characters.
pub fn slug_title(title: &str) -> String {
    title
        .replace(' ', "_")
        .chars()
        .take(SLUG_TITLE_MAX_CHARS)
        .collect()
}

/// `from` defaults to 0, `size` to 100 when absent or below 1.
pub fn page_bounds(from: Option<i64>, size: Option<i64>) -> (i64, i64) {
    let from = from.filter(|f| *f >= 0).unwrap_or(0);
    let size = size.filter(|s| *s >= 1).unwrap_or(100);
    (from, size)
}
