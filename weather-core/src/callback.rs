//! Inline-keyboard callback payloads.
//!
//! A payload is `<period>|<city>`, e.g. `today|Berlin`. Telegram caps
//! callback data at 64 bytes, so long city names are cut on a char boundary
//! when encoding.

use crate::{error::PayloadError, model::Period};

/// Telegram's limit for `callback_data`, in bytes.
pub const MAX_CALLBACK_DATA: usize = 64;

const SEPARATOR: char = '|';

pub fn encode(period: Period, city: &str) -> String {
    let prefix_len = period.as_str().len() + SEPARATOR.len_utf8();
    let city = truncate_on_char_boundary(city, MAX_CALLBACK_DATA.saturating_sub(prefix_len));

    format!("{period}{SEPARATOR}{city}")
}

pub fn decode(data: &str) -> Result<(Period, String), PayloadError> {
    if data.is_empty() {
        return Err(PayloadError::Empty);
    }

    let (period, city) = data
        .split_once(SEPARATOR)
        .ok_or(PayloadError::MissingSeparator)?;

    let period = Period::try_from(period)?;

    if city.is_empty() {
        return Err(PayloadError::EmptyCity);
    }

    Ok((period, city.to_string()))
}

fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }

    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_period_then_city() {
        assert_eq!(encode(Period::Current, "Berlin"), "current|Berlin");
        assert_eq!(encode(Period::Tomorrow, "Санкт-Петербург"), "tomorrow|Санкт-Петербург");
    }

    #[test]
    fn decodes_known_periods() {
        assert_eq!(decode("current|Berlin"), Ok((Period::Current, "Berlin".into())));
        assert_eq!(decode("today|Berlin"), Ok((Period::Today, "Berlin".into())));
    }

    #[test]
    fn city_may_contain_separator() {
        assert_eq!(decode("today|a|b"), Ok((Period::Today, "a|b".into())));
    }

    #[test]
    fn long_city_is_truncated_to_fit() {
        let city = "Llanfairpwllgwyngyllgogerychwyrndrobwllllantysiliogogogoch-on-Sea";
        let data = encode(Period::Tomorrow, city);

        assert_eq!(data.len(), MAX_CALLBACK_DATA);
        let (period, decoded) = decode(&data).expect("truncated payload still decodes");
        assert_eq!(period, Period::Tomorrow);
        assert!(city.starts_with(&decoded));
    }

    #[test]
    fn truncation_respects_multibyte_chars() {
        let city = "Щ".repeat(40);
        let data = encode(Period::Current, &city);

        assert!(data.len() <= MAX_CALLBACK_DATA);
        let (_, decoded) = decode(&data).expect("payload must stay valid UTF-8");
        assert!(decoded.chars().all(|c| c == 'Щ'));
    }

    #[test]
    fn malformed_payloads_have_named_errors() {
        assert_eq!(decode(""), Err(PayloadError::Empty));
        assert_eq!(decode("Berlin"), Err(PayloadError::MissingSeparator));
        assert_eq!(decode("['current','Berlin']"), Err(PayloadError::MissingSeparator));
        assert_eq!(
            decode("weekly|Berlin"),
            Err(PayloadError::UnknownPeriod("weekly".into()))
        );
        assert_eq!(decode("current|"), Err(PayloadError::EmptyCity));
    }
}
