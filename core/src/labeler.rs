//! Human-readable labels for machine-style feature identifiers.

/// Turn `monthly_charges` or `ContractPeriod` into `Monthly Charges` /
/// `Contract Period`.
///
/// Every uppercase letter not already preceded by whitespace starts a new
/// word, underscores become spaces, and each word gets its first character
/// uppercased. The rest of each word keeps its casing.
pub fn label(feature_id: &str) -> String {
    let mut spaced = String::with_capacity(feature_id.len() + 8);
    let mut prev: Option<char> = None;

    for c in feature_id.chars() {
        if c.is_uppercase() && !prev.is_some_and(char::is_whitespace) {
            spaced.push(' ');
        }
        spaced.push(if c == '_' { ' ' } else { c });
        prev = Some(c);
    }

    spaced
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
