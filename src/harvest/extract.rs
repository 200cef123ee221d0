use crate::domain::locator::FieldProbe;
use crate::domain::model::ReviewRecord;
use crate::domain::ports::ItemHandle;
use crate::utils::error::Result;
use regex::Regex;
use std::sync::LazyLock;

static RATING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:[.,]\d+)?)\s*(?:/\s*(\d+(?:[.,]\d+)?))?")
        .expect("rating pattern is a valid regex")
});

fn parse_number(raw: &str) -> Option<f32> {
    raw.replace(',', ".").parse().ok()
}

/// Parses a rating into the 1..=5 scale.
///
/// `"3/5"` gives 3 and `"8/10"` is rescaled to 4. Without a fraction the
/// first number is taken (`"4 stars"`) unless `require_fraction` is set,
/// which keeps dates like "2 months ago" in the same element from being
/// mistaken for a rating.
pub fn parse_rating(raw: &str, require_fraction: bool) -> Option<u8> {
    let caps = RATING_PATTERN.captures(raw.trim())?;
    let mut value = parse_number(caps.get(1)?.as_str())?;

    match caps.get(2) {
        Some(scale) => {
            let scale = parse_number(scale.as_str())?;
            if scale <= 0.0 {
                return None;
            }
            value = value * 5.0 / scale;
        }
        None if require_fraction => return None,
        None => {}
    }

    let rounded = value.round();
    if (1.0..=5.0).contains(&rounded) {
        Some(rounded as u8)
    } else {
        None
    }
}

fn read_probe<I: ItemHandle + ?Sized>(item: &I, probe: &FieldProbe) -> Result<Option<String>> {
    match &probe.attribute {
        Some(attribute) => item.attribute_of(&probe.locator, attribute),
        None => item.text_of(&probe.locator).map(Some),
    }
}

/// Tries each probe in order; the first one that yields a parsed value wins.
/// Lookup failures only mean "try the next probe".
fn first_value<I, T>(
    item: &I,
    probes: &[FieldProbe],
    field: &str,
    parse: impl Fn(&FieldProbe, &str) -> Option<T>,
) -> Option<T>
where
    I: ItemHandle + ?Sized,
{
    for probe in probes {
        match read_probe(item, probe) {
            Ok(Some(raw)) => {
                if let Some(value) = parse(probe, raw.trim()) {
                    return Some(value);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::trace!("{} probe {} failed: {}", field, probe.locator, e),
        }
    }
    None
}

/// One record per review element, or `None` when neither field has a value.
pub fn extract_record<I: ItemHandle + ?Sized>(
    item: &I,
    rating_probes: &[FieldProbe],
    text_probes: &[FieldProbe],
) -> Option<ReviewRecord> {
    let rating = first_value(item, rating_probes, "rating", |probe, raw| {
        parse_rating(raw, probe.attribute.is_none())
    });
    let text = first_value(item, text_probes, "text", |_, raw| {
        (!raw.is_empty()).then(|| raw.to_string())
    })
    .unwrap_or_default();

    ReviewRecord::new(rating, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;
    use crate::testing::FakeItem;

    #[test]
    fn test_parse_rating_fraction() {
        assert_eq!(parse_rating("3/5", true), Some(3));
        assert_eq!(parse_rating(" 5 / 5 ", true), Some(5));
        assert_eq!(parse_rating("8/10", true), Some(4));
        assert_eq!(parse_rating("4,5/5", true), Some(5));
        assert_eq!(parse_rating("0/5", true), None);
        assert_eq!(parse_rating("3/0", true), None);
    }

    #[test]
    fn test_parse_rating_plain_numbers() {
        assert_eq!(parse_rating("4 stars", false), Some(4));
        assert_eq!(parse_rating("Rated 2.0 out of 5,", false), Some(2));
        assert_eq!(parse_rating("4 stars", true), None);
        assert_eq!(parse_rating("2 months ago", true), None);
        assert_eq!(parse_rating("N/A", false), None);
        assert_eq!(parse_rating("", false), None);
        assert_eq!(parse_rating("12 stars", false), None);
    }

    #[test]
    fn test_fraction_rating_with_empty_text_is_kept() {
        let selectors = SelectorConfig::default();
        let item = FakeItem::new().text("div.fontBodySmall", "3/5");

        let record = extract_record(&item, &selectors.rating, &selectors.text).unwrap();
        assert_eq!(record.rating, Some(3));
        assert_eq!(record.text, "");
    }

    #[test]
    fn test_unparsable_rating_and_empty_text_is_skipped() {
        let selectors = SelectorConfig::default();
        let item = FakeItem::new()
            .text("div.fontBodySmall", "a week ago")
            .text("span.wiI7pd", "   ");

        assert!(extract_record(&item, &selectors.rating, &selectors.text).is_none());
    }

    #[test]
    fn test_falls_back_to_later_probes() {
        let selectors = SelectorConfig::default();
        let item = FakeItem::new()
            .attr("span.kvMYJc", "aria-label", "4 stars")
            .text("div.MyEned span", "Lovely staff");

        let record = extract_record(&item, &selectors.rating, &selectors.text).unwrap();
        assert_eq!(record.rating, Some(4));
        assert_eq!(record.text, "Lovely staff");
    }

    #[test]
    fn test_text_only_review() {
        let selectors = SelectorConfig::default();
        let item = FakeItem::new().text("span.wiI7pd", "ok");

        let record = extract_record(&item, &selectors.rating, &selectors.text).unwrap();
        assert_eq!(record.rating, None);
        assert_eq!(record.text, "ok");
    }
}
