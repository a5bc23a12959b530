//! Culture conventions used by the formatter and parser.
//!
//! A [`Culture`] carries the handful of conventions the grid needs: number
//! separators, the currency symbol, and the short date and time patterns.

/// Date component ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// Day/Month/Year (most of the world)
    Dmy,
    /// Month/Day/Year (US)
    Mdy,
    /// Year/Month/Day (ISO, East Asian)
    Ymd,
}

/// Formatting conventions for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Culture {
    /// The full locale identifier (e.g., "en-US", "fr-FR").
    pub identifier: String,
    /// The language code (e.g., "en", "fr").
    pub language: String,
    /// The region/country code (e.g., "US", "FR"), if present.
    pub region: Option<String>,
    /// Thousands separator character.
    pub thousands_sep: char,
    /// Decimal separator character.
    pub decimal_sep: char,
    /// Currency symbol.
    pub currency_symbol: &'static str,
    /// Whether the currency symbol follows the amount.
    pub currency_suffix: bool,
    /// Order of date components.
    pub date_order: DateOrder,
    /// Separator between date components.
    pub date_sep: char,
    /// Whether times use a 24-hour clock.
    pub use_24_hour: bool,
}

impl Culture {
    /// Parse a locale identifier and derive its conventions.
    ///
    /// Unknown languages fall back to English separators and day-first dates.
    pub fn parse(identifier: &str) -> Self {
        let mut parts = identifier.split(['-', '_']);
        let language = parts.next().filter(|p| !p.is_empty()).unwrap_or("en").to_lowercase();
        let region = parts
            .find(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
            .map(|part| part.to_uppercase());

        let (thousands_sep, decimal_sep) = separators_for(&language);
        let (currency_symbol, currency_suffix) = currency_for(&language, region.as_deref());
        let (date_order, date_sep) = date_format_for(&language, region.as_deref());
        let use_24_hour = !matches!(
            (language.as_str(), region.as_deref()),
            ("en", Some("US")) | ("en", Some("PH")) | ("es", Some("US")) | ("fil", _)
        );

        Self {
            identifier: identifier.to_string(),
            language,
            region,
            thousands_sep,
            decimal_sep,
            currency_symbol,
            currency_suffix,
            date_order,
            date_sep,
            use_24_hour,
        }
    }

    /// The short date pattern, e.g. `M/d/yyyy` for en-US.
    pub fn short_date_pattern(&self) -> String {
        let sep = self.date_sep;
        match self.date_order {
            DateOrder::Mdy => format!("M{sep}d{sep}yyyy"),
            DateOrder::Dmy => format!("dd{sep}MM{sep}yyyy"),
            DateOrder::Ymd => format!("yyyy{sep}MM{sep}dd"),
        }
    }

    /// The medium date pattern with an abbreviated month name.
    pub fn medium_date_pattern(&self) -> &'static str {
        match self.date_order {
            DateOrder::Mdy => "MMM d, yyyy",
            DateOrder::Dmy => "d MMM yyyy",
            DateOrder::Ymd => "yyyy MMM d",
        }
    }

    /// The time pattern with seconds.
    pub fn time_pattern(&self) -> &'static str {
        if self.use_24_hour {
            "HH:mm:ss"
        } else {
            "h:mm:ss tt"
        }
    }
}

impl Default for Culture {
    fn default() -> Self {
        Self::parse("en-US")
    }
}

fn separators_for(lang: &str) -> (char, char) {
    // Locales using comma as decimal separator (and period/space as thousands)
    let comma_decimal = matches!(
        lang,
        "de" | "fr" | "es" | "it" | "pt" | "nl" | "da" | "fi" | "nb" | "nn" | "sv"
            | "pl" | "cs" | "sk" | "hu" | "ro" | "bg" | "hr" | "sl" | "sr" | "uk" | "ru"
            | "el" | "tr" | "vi" | "id" | "ca" | "gl" | "eu" | "et" | "lv" | "lt"
    );
    let space_thousands = matches!(
        lang,
        "fr" | "fi" | "sv" | "nb" | "nn" | "pl" | "cs" | "sk" | "ru" | "uk" | "bg"
    );

    if comma_decimal {
        if space_thousands {
            ('\u{202F}', ',')
        } else {
            ('.', ',')
        }
    } else {
        (',', '.')
    }
}

fn currency_for(lang: &str, region: Option<&str>) -> (&'static str, bool) {
    match region {
        Some("US") => return ("$", false),
        Some("GB") => return ("£", false),
        Some("JP") | Some("CN") => return ("¥", false),
        Some("IN") => return ("₹", false),
        Some("CH") => return ("CHF", false),
        _ => {}
    }
    match lang {
        "de" | "fr" | "es" | "it" | "nl" | "fi" | "pt" | "el" | "et" | "lv" | "lt" | "sk"
        | "sl" => ("€", true),
        "en" => ("$", false),
        "ja" | "zh" => ("¥", false),
        _ => ("¤", false),
    }
}

fn date_format_for(lang: &str, region: Option<&str>) -> (DateOrder, char) {
    let ymd_langs = ["ja", "zh", "ko", "hu", "lt", "mn", "fa"];
    if ymd_langs.contains(&lang) {
        return (DateOrder::Ymd, '/');
    }

    if let ("en", Some("US")) | ("en", Some("PH")) | ("es", Some("US")) | ("fil", _) =
        (lang, region)
    {
        return (DateOrder::Mdy, '/');
    }

    let period_sep_langs = [
        "de", "no", "nb", "nn", "fi", "et", "lv", "sl", "sk", "cs", "hr", "ro", "bg", "ru",
        "pl", "tr",
    ];
    if period_sep_langs.contains(&lang) {
        return (DateOrder::Dmy, '.');
    }

    let dash_sep_langs = ["nl", "da", "sv", "is"];
    if dash_sep_langs.contains(&lang) {
        return (DateOrder::Dmy, '-');
    }

    (DateOrder::Dmy, '/')
}
