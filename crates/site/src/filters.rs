//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Renders a 1-5 rating as filled and empty stars.
///
/// Usage in templates: `{{ review.review_rating|stars }}`
#[askama::filter_fn]
pub fn stars(rating: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let filled = rating
        .to_string()
        .parse::<usize>()
        .unwrap_or(0)
        .min(MAX_STARS);
    Ok(render_stars(filled))
}

const MAX_STARS: usize = 5;

fn render_stars(filled: usize) -> String {
    let mut out = "\u{2605}".repeat(filled);
    out.push_str(&"\u{2606}".repeat(MAX_STARS - filled));
    out
}
