//! Variable name normalization
//!
//! Variables have no lifecycle of their own: a variable *is* its normalized
//! name, derived from the relationships it appears in.

/// Normalize a variable name: lowercase, trim, strip sentence punctuation.
///
/// This is the identity function for variables — two names that normalize to
/// the same string denote the same variable.
///
/// # Examples
///
/// ```
/// use cld_domain::normalize_name;
///
/// assert_eq!(normalize_name("  Death Rate. "), "death rate");
/// assert_eq!(normalize_name("population!"), "population");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '!' | '.' | ',' | ';' | ':'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Convert a camelCase or snake_case identifier into a spaced, lowercased
/// phrase.
///
/// Model output sometimes names variables `deathRate` or `death_rate`; both
/// humanize to `"death rate"`.
///
/// # Examples
///
/// ```
/// use cld_domain::humanize;
///
/// assert_eq!(humanize("deathRate"), "death rate");
/// assert_eq!(humanize("schedule_pressure"), "schedule pressure");
/// assert_eq!(humanize("Population"), "population");
/// ```
pub fn humanize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' {
            out.push(' ');
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower {
            out.push(' ');
        }
        prev_lower = c.is_lowercase();
        for lc in c.to_lowercase() {
            out.push(lc);
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_name("Death Rate."), "death rate");
        assert_eq!(normalize_name("  POPULATION;  "), "population");
        assert_eq!(normalize_name("fatigue"), "fatigue");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_name("   "), "");
        assert_eq!(normalize_name(".,;:!"), "");
    }

    #[test]
    fn test_humanize_camel_case() {
        assert_eq!(humanize("deathRate"), "death rate");
        assert_eq!(humanize("schedulePressureLevel"), "schedule pressure level");
    }

    #[test]
    fn test_humanize_snake_case() {
        assert_eq!(humanize("death_rate"), "death rate");
        assert_eq!(humanize("work_remaining"), "work remaining");
    }

    #[test]
    fn test_humanize_plain_words_unchanged() {
        assert_eq!(humanize("death rate"), "death rate");
    }
}
