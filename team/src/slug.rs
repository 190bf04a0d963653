//! Species display name to lookup key

use unicode_normalization::UnicodeNormalization;

/// Names whose slug cannot be derived by the general rules
const IRREGULAR: &[(&str, &str)] = &[
    ("Nidoran♀", "nidoran-f"),
    ("Nidoran♂", "nidoran-m"),
    ("Farfetch'd", "farfetchd"),
    ("Mr. Mime", "mr-mime"),
    ("Mime Jr.", "mime-jr"),
    ("Type: Null", "type-null"),
    ("Flabébé", "flabebe"),
    ("Ho-Oh", "ho-oh"),
];

/// Normalize a species display name into its canonical lookup slug.
///
/// Total and deterministic: empty input yields an empty slug.
///
/// ```
/// use winrate_team::slug::normalize;
///
/// assert_eq!(normalize("Tapu Koko"), "tapu-koko");
/// assert_eq!(normalize("Nidoran♀"), "nidoran-f");
/// ```
pub fn normalize(display_name: &str) -> String {
    if display_name.is_empty() {
        return String::new();
    }

    if let Some((_, slug)) = IRREGULAR.iter().find(|(name, _)| *name == display_name) {
        return (*slug).to_string();
    }

    let cleaned: String = display_name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !matches!(c, '\u{2019}' | '\'' | '`' | '.'))
        .map(|c| if c == ':' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    cleaned
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}
