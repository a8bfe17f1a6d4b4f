//! ISO 3166 / libphonenumber backed lookup.

use isocountry::CountryCode;
use phonenumber::{country, Mode};

use crate::enrich::CountryPhoneLookup;

/// Values checkout forms submit when no country was picked.
const PLACEHOLDERS: &[&str] = &["select a country", "select a country / region", "none", "n/a"];

/// Common names that are not ISO short names or prefixes of one.
const ALIASES: &[(&str, &str)] = &[
    ("uk", "GB"),
    ("great britain", "GB"),
    ("england", "GB"),
    ("scotland", "GB"),
    ("wales", "GB"),
    ("northern ireland", "GB"),
    ("south korea", "KR"),
    ("north korea", "KP"),
    ("russia", "RU"),
    ("vietnam", "VN"),
    ("czech republic", "CZ"),
    ("ivory coast", "CI"),
    ("laos", "LA"),
];

/// Substring matching is only attempted for queries at least this long.
const MIN_SUBSTRING_QUERY: usize = 4;

/// Default [`CountryPhoneLookup`] backed by the `isocountry` and
/// `phonenumber` reference tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct IsoLookup;

impl CountryPhoneLookup for IsoLookup {
    fn normalize_country(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        let lowered = trimmed.to_lowercase();
        if trimmed.is_empty() || PLACEHOLDERS.contains(&lowered.as_str()) {
            return String::new();
        }

        if let Some((_, alpha2)) = ALIASES.iter().find(|(alias, _)| *alias == lowered) {
            return (*alpha2).to_owned();
        }

        let upper = trimmed.to_ascii_uppercase();
        let found = match trimmed.chars().count() {
            2 => CountryCode::for_alpha2(&upper).ok(),
            3 => CountryCode::for_alpha3(&upper)
                .ok()
                .or_else(|| search_by_name(&lowered)),
            _ => search_by_name(&lowered),
        };

        found.map(|code| code.alpha2().to_owned()).unwrap_or_default()
    }

    fn country_name(&self, alpha2: &str) -> String {
        CountryCode::for_alpha2(&alpha2.trim().to_ascii_uppercase())
            .map(|code| code.name().to_owned())
            .unwrap_or_default()
    }

    fn normalize_phone(&self, phone: &str, alpha2: &str) -> String {
        let Ok(region) = alpha2.trim().to_ascii_uppercase().parse::<country::Id>() else {
            return String::new();
        };

        match phonenumber::parse(Some(region), phone.trim()) {
            Ok(number) => number.format().mode(Mode::E164).to_string(),
            Err(e) => {
                tracing::debug!(error = %e, region = alpha2, "unparseable phone number");
                String::new()
            }
        }
    }
}

/// Case-insensitive name search: exact name, then the shortest name starting
/// with the query, then the shortest name containing it.
fn search_by_name(lowered: &str) -> Option<CountryCode> {
    let name_of = |code: &CountryCode| code.name().to_lowercase();

    if let Some(code) = CountryCode::iter().find(|code| name_of(code) == lowered) {
        return Some(*code);
    }

    let prefixed = CountryCode::iter()
        .filter(|code| name_of(code).starts_with(lowered))
        .min_by_key(|code| code.name().len());
    if let Some(code) = prefixed {
        return Some(*code);
    }

    if lowered.chars().count() < MIN_SUBSTRING_QUERY {
        return None;
    }
    CountryCode::iter()
        .filter(|code| name_of(code).contains(lowered))
        .min_by_key(|code| code.name().len())
        .copied()
}
