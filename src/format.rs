//! Label and tooltip templates such as `{point.name}: {point.value}`.

use crate::models::MapPoint;
use num_format::{Locale, ToFormattedString};
use regex::Regex;
use std::sync::OnceLock;

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

/// Format a value with locale thousands separators and at most two decimals.
pub fn format_value(v: f64, locale_tag: &str) -> String {
    if !v.is_finite() {
        return "null".to_string();
    }
    let (locale, dec_sep) = map_locale(locale_tag);
    let rounded = (v * 100.0).round() / 100.0;
    // beyond i64 the grouped form would saturate; print the plain float
    if !rounded.is_finite() || rounded.abs() >= i64::MAX as f64 {
        return format!("{v}");
    }
    let int = rounded.trunc() as i64;
    let sign = if rounded < 0.0 && int == 0 { "-" } else { "" };
    let frac = format!("{:.2}", rounded.abs().fract());
    // "0.25" -> "25", "0.50" -> "5", "0.00" -> ""
    let frac = frac
        .trim_start_matches("0.")
        .trim_end_matches('0')
        .to_string();
    if frac.is_empty() {
        format!("{sign}{}", int.to_formatted_string(locale))
    } else {
        format!("{sign}{}{dec_sep}{frac}", int.to_formatted_string(locale))
    }
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{point\.([A-Za-z0-9_-]+)\}").expect("valid placeholder regex"))
}

/// Expand `{point.*}` placeholders for one point.
///
/// `name` and `value` read the point fields; any other key reads a property.
/// Missing values render as `null`, missing properties as an empty string.
pub fn render_template(format: &str, point: &MapPoint, locale_tag: &str) -> String {
    placeholder()
        .replace_all(format, |caps: &regex::Captures<'_>| match &caps[1] {
            "name" => point.name.clone(),
            "value" => point
                .value
                .map(|v| format_value(v, locale_tag))
                .unwrap_or_else(|| "null".to_string()),
            key => point.property(key).unwrap_or_default(),
        })
        .into_owned()
}
