//! Known destinations and the reference facts the tools report for them.
//!
//! This table doubles as the gazetteer used for context extraction: any
//! place listed here is recognised when a traveller names it.

/// Reference data for one destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Place {
    pub name: &'static str,
    pub country: &'static str,
    pub language: &'static str,
    pub time_zone: &'static str,
    pub currency_code: &'static str,
    pub currency_name: &'static str,
    pub currency_symbol: &'static str,
    /// Approximate units of local currency per US dollar.
    pub per_usd: f64,
}

const fn place(
    name: &'static str,
    country: &'static str,
    language: &'static str,
    time_zone: &'static str,
    currency: (&'static str, &'static str, &'static str, f64),
) -> Place {
    Place {
        name,
        country,
        language,
        time_zone,
        currency_code: currency.0,
        currency_name: currency.1,
        currency_symbol: currency.2,
        per_usd: currency.3,
    }
}

const EUR: (&str, &str, &str, f64) = ("EUR", "Euro", "€", 0.92);
const USD: (&str, &str, &str, f64) = ("USD", "US Dollar", "$", 1.0);
const INR: (&str, &str, &str, f64) = ("INR", "Indian Rupee", "₹", 83.0);

pub const KNOWN_PLACES: &[Place] = &[
    place("Paris", "France", "French", "CET (UTC+1)", EUR),
    place("London", "United Kingdom", "English", "GMT (UTC+0)", ("GBP", "Pound Sterling", "£", 0.79)),
    place("Tokyo", "Japan", "Japanese", "JST (UTC+9)", ("JPY", "Japanese Yen", "¥", 150.0)),
    place("New York", "United States", "English", "EST (UTC-5)", USD),
    place("Rome", "Italy", "Italian", "CET (UTC+1)", EUR),
    place("Barcelona", "Spain", "Spanish and Catalan", "CET (UTC+1)", EUR),
    place("Amsterdam", "Netherlands", "Dutch", "CET (UTC+1)", EUR),
    place("Berlin", "Germany", "German", "CET (UTC+1)", EUR),
    place("Prague", "Czech Republic", "Czech", "CET (UTC+1)", ("CZK", "Czech Koruna", "Kč", 23.0)),
    place("Vienna", "Austria", "German", "CET (UTC+1)", EUR),
    place("Budapest", "Hungary", "Hungarian", "CET (UTC+1)", ("HUF", "Hungarian Forint", "Ft", 360.0)),
    place("Lisbon", "Portugal", "Portuguese", "WET (UTC+0)", EUR),
    place("Dublin", "Ireland", "English and Irish", "GMT (UTC+0)", EUR),
    place("Edinburgh", "United Kingdom", "English", "GMT (UTC+0)", ("GBP", "Pound Sterling", "£", 0.79)),
    place("Venice", "Italy", "Italian", "CET (UTC+1)", EUR),
    place("Florence", "Italy", "Italian", "CET (UTC+1)", EUR),
    place("Milan", "Italy", "Italian", "CET (UTC+1)", EUR),
    place("Madrid", "Spain", "Spanish", "CET (UTC+1)", EUR),
    place("Athens", "Greece", "Greek", "EET (UTC+2)", EUR),
    place("Istanbul", "Turkey", "Turkish", "TRT (UTC+3)", ("TRY", "Turkish Lira", "₺", 32.0)),
    place("Dubai", "United Arab Emirates", "Arabic", "GST (UTC+4)", ("AED", "UAE Dirham", "د.إ", 3.67)),
    place("Singapore", "Singapore", "English, Malay, Mandarin and Tamil", "SGT (UTC+8)", ("SGD", "Singapore Dollar", "S$", 1.35)),
    place("Hong Kong", "China (SAR)", "Cantonese and English", "HKT (UTC+8)", ("HKD", "Hong Kong Dollar", "HK$", 7.8)),
    place("Sydney", "Australia", "English", "AEST (UTC+10)", ("AUD", "Australian Dollar", "A$", 1.52)),
    place("Los Angeles", "United States", "English", "PST (UTC-8)", USD),
    place("San Francisco", "United States", "English", "PST (UTC-8)", USD),
    place("Chicago", "United States", "English", "CST (UTC-6)", USD),
    place("Washington DC", "United States", "English", "EST (UTC-5)", USD),
    place("Boston", "United States", "English", "EST (UTC-5)", USD),
    place("Mumbai", "India", "Marathi, Hindi and English", "IST (UTC+5:30)", INR),
    place("Delhi", "India", "Hindi and English", "IST (UTC+5:30)", INR),
    place("Bangalore", "India", "Kannada and English", "IST (UTC+5:30)", INR),
    place("Bangkok", "Thailand", "Thai", "ICT (UTC+7)", ("THB", "Thai Baht", "฿", 36.0)),
    place("Seoul", "South Korea", "Korean", "KST (UTC+9)", ("KRW", "South Korean Won", "₩", 1330.0)),
    place("Beijing", "China", "Mandarin", "CST (UTC+8)", ("CNY", "Chinese Yuan", "¥", 7.2)),
];

/// Look a destination up by name or country, ignoring case.
pub fn lookup(name: &str) -> Option<&'static Place> {
    let wanted = name.trim().to_lowercase();
    KNOWN_PLACES
        .iter()
        .find(|p| p.name.to_lowercase() == wanted)
        .or_else(|| KNOWN_PLACES.iter().find(|p| p.country.to_lowercase() == wanted))
}

/// Names of every known destination, in table order.
pub fn known_destinations() -> impl Iterator<Item = &'static str> {
    KNOWN_PLACES.iter().map(|p| p.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup("paris").map(|p| p.country), Some("France"));
        assert_eq!(lookup("  TOKYO ").map(|p| p.currency_code), Some("JPY"));
        assert!(lookup("Atlantis").is_none());
    }

    #[test]
    fn lookup_falls_back_to_country() {
        assert_eq!(lookup("japan").map(|p| p.name), Some("Tokyo"));
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<String> = known_destinations().map(str::to_lowercase).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 35);
    }
}
