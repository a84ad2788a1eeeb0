//! Text transforms applied to catalog data pulled from Shopify.
//!
//! Product copy arrives as HTML and variant-qualified titles; the site
//! stores plain text, a short teaser, and URL slugs. These helpers are the
//! single place those rules live so the full sync and the webhook relay
//! produce identical fields.

use std::sync::LazyLock;

use regex::Regex;

/// Character budget for the short product description.
pub const SHORT_DESCRIPTION_CHARS: usize = 200;

/// Variant title Shopify assigns when a product has no explicit variants.
pub const DEFAULT_VARIANT_TITLE: &str = "Default Title";

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));

static NON_ALPHANUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("Invalid regex"));

/// Strip HTML tags from product copy, leaving trimmed plain text.
///
/// Tag-stripping only; entities are left as-is, matching what the site
/// renders today.
#[must_use]
pub fn strip_html(html: &str) -> String {
    HTML_TAG.replace_all(html, "").trim().to_string()
}

/// Truncate to at most `limit` characters, never splitting a character.
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Derive a URL slug from a product title: lowercase, non-alphanumeric runs
/// collapsed to single hyphens, no leading or trailing hyphen.
///
/// Callers append the variant id to keep slugs unique across variants of
/// the same product.
#[must_use]
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    NON_ALPHANUMERIC_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Display name for a variant record: the product title, qualified by the
/// variant title unless it is the platform's implicit default.
#[must_use]
pub fn display_name(product_title: &str, variant_title: &str) -> String {
    if variant_title == DEFAULT_VARIANT_TITLE {
        product_title.to_string()
    } else {
        format!("{product_title} - {variant_title}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_removes_tags() {
        assert_eq!(
            strip_html("<p>Small-batch vanilla bean</p>"),
            "Small-batch vanilla bean"
        );
    }

    #[test]
    fn test_strip_html_removes_nested_tags_and_attributes() {
        assert_eq!(
            strip_html(r#"<div class="desc"><strong>Rich</strong> and <em>creamy</em></div>"#),
            "Rich and creamy"
        );
    }

    #[test]
    fn test_strip_html_plain_text_passthrough() {
        assert_eq!(strip_html("No markup here"), "No markup here");
    }

    #[test]
    fn test_strip_html_trims_whitespace() {
        assert_eq!(strip_html("<p>  padded  </p>"), "padded");
    }

    #[test]
    fn test_truncate_chars_shorter_than_limit() {
        assert_eq!(truncate_chars("short", 200), "short");
    }

    #[test]
    fn test_truncate_chars_cuts_at_limit() {
        let long = "x".repeat(250);
        assert_eq!(truncate_chars(&long, 200).chars().count(), 200);
    }

    #[test]
    fn test_truncate_chars_respects_multibyte_boundaries() {
        // é is two bytes; counting must be per character, not per byte
        let text = "crème brûlée".repeat(30);
        let truncated = truncate_chars(&text, 200);
        assert_eq!(truncated.chars().count(), 200);
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Mango Tango"), "mango-tango");
    }

    #[test]
    fn test_slugify_collapses_punctuation_runs() {
        assert_eq!(slugify("Rocky Road -- Extra Nuts!"), "rocky-road-extra-nuts");
    }

    #[test]
    fn test_slugify_trims_edge_hyphens() {
        assert_eq!(slugify("  (Seasonal) Peppermint  "), "seasonal-peppermint");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        // Accented characters are outside [a-z0-9] and become separators
        assert_eq!(slugify("Crème Fraîche"), "cr-me-fra-che");
    }

    #[test]
    fn test_display_name_default_variant_uses_product_title() {
        assert_eq!(
            display_name("Vanilla Bean Pint", DEFAULT_VARIANT_TITLE),
            "Vanilla Bean Pint"
        );
    }

    #[test]
    fn test_display_name_appends_real_variant_title() {
        assert_eq!(
            display_name("Vanilla Roll", "Six Pack"),
            "Vanilla Roll - Six Pack"
        );
    }
}
