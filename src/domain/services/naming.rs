//! Instance naming and case-insensitive name matching

/// Name given to a character, monster or object instance
pub fn instance_name(template_name: &str, token: &str) -> String {
    format!("{} ({})", template_name.trim(), token)
}

/// Remove the trailing `(token)` disambiguation suffix, if any
pub fn strip_suffix(name: &str) -> &str {
    let trimmed = name.trim_end();
    if let Some(inner) = trimmed.strip_suffix(')') {
        if let Some(start) = inner.rfind(" (") {
            let token = &inner[start + 2..];
            if !token.is_empty() && !token.contains(char::is_whitespace) {
                return trimmed[..start].trim_end();
            }
        }
    }
    trimmed
}

/// Lowercase and collapse whitespace
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a typed phrase names an entity
///
/// Matches either the display name without its suffix or the full name.
pub fn name_matches(phrase: &str, name: &str) -> bool {
    let phrase = normalize(phrase);
    !phrase.is_empty() && (phrase == normalize(strip_suffix(name)) || phrase == normalize(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip_suffix("Grumpy Dwarf (1f3c9a2b)"), "Grumpy Dwarf");
        assert_eq!(strip_suffix("Cave Entrance"), "Cave Entrance");
        assert_eq!(strip_suffix("Odd (name with spaces)"), "Odd (name with spaces)");
        assert_eq!(strip_suffix("()"), "()");
    }

    #[test]
    fn test_name_matches_ignores_case_and_suffix() {
        assert!(name_matches("grumpy dwarf", "Grumpy Dwarf (1f3c9a2b)"));
        assert!(name_matches("  GRUMPY   dwarf ", "Grumpy Dwarf (00aa11bb)"));
        assert!(name_matches("grumpy dwarf (1f3c9a2b)", "Grumpy Dwarf (1f3c9a2b)"));
        assert!(!name_matches("grumpy", "Grumpy Dwarf (1f3c9a2b)"));
        assert!(!name_matches("", "Grumpy Dwarf (1f3c9a2b)"));
    }

    #[test]
    fn test_instance_name_round_trips_through_strip() {
        let name = instance_name("Stone Mace", "deadbeef");
        assert_eq!(name, "Stone Mace (deadbeef)");
        assert_eq!(strip_suffix(&name), "Stone Mace");
    }
}
