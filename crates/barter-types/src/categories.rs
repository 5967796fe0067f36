/// Categories an item can be listed under or asked for.
pub const ITEM_CATEGORIES: &[&str] = &[
    "Books",
    "Clothing",
    "Collectibles",
    "Electronics",
    "Furniture",
    "Games",
    "Garden",
    "Home Decor",
    "Kitchen",
    "Music",
    "Sports",
    "Tools",
    "Toys",
    "Other",
];

/// Canonical spelling of a known category, matched case-insensitively.
pub fn canonical_category(value: &str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    ITEM_CATEGORIES
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(trimmed))
}

/// Canonical spelling for known categories, the trimmed input otherwise.
pub fn normalize_category(value: &str) -> String {
    canonical_category(value)
        .map(str::to_string)
        .unwrap_or_else(|| value.trim().to_string())
}

/// Normalize a wanted-categories list, dropping unknown and duplicate entries.
pub fn normalize_wanted<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<String> = Vec::new();
    for c in values.into_iter().filter_map(canonical_category) {
        if !out.iter().any(|existing| existing == c) {
            out.push(c.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_is_case_insensitive() {
        assert_eq!(canonical_category("home decor"), Some("Home Decor"));
        assert_eq!(canonical_category("  TOOLS "), Some("Tools"));
        assert_eq!(canonical_category("astronomy"), None);
        assert_eq!(canonical_category("   "), None);
    }

    #[test]
    fn normalize_keeps_unknown_input_trimmed() {
        assert_eq!(normalize_category("books"), "Books");
        assert_eq!(normalize_category(" misc "), "misc");
        assert_eq!(normalize_category(""), "");
    }

    #[test]
    fn wanted_list_drops_unknown_and_duplicates() {
        let wanted = normalize_wanted(["toys", "puzzles", "Toys", "books"]);
        assert_eq!(wanted, vec!["Toys".to_string(), "Books".to_string()]);
    }
}
