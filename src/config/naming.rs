//! Naming convention used to match column and embed names against table names.
//!
//! The default is regular English pluralization (`user` -> `users`, `category` ->
//! `categories`, `box` -> `boxes`). Irregular pairs (`person` -> `people`) must be
//! registered explicitly; nothing is guessed for them.

#[derive(Clone, Debug, Default)]
pub struct NamingConvention {
    /// (singular, plural) pairs, lower-case.
    irregular: Vec<(String, String)>,
}

impl NamingConvention {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an irregular singular/plural pair.
    pub fn with_irregular(mut self, singular: &str, plural: &str) -> Self {
        self.irregular
            .push((singular.to_lowercase(), plural.to_lowercase()));
        self
    }

    pub fn pluralize(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        if let Some((_, plural)) = self.irregular.iter().find(|(s, _)| *s == lower) {
            return plural.clone();
        }
        if self.irregular.iter().any(|(_, p)| *p == lower) {
            return lower;
        }
        if let Some(stem) = lower.strip_suffix('y') {
            if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
                return format!("{stem}ies");
            }
        }
        if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
            return format!("{lower}es");
        }
        format!("{lower}s")
    }

    pub fn singularize(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        if let Some((singular, _)) = self.irregular.iter().find(|(_, p)| *p == lower) {
            return singular.clone();
        }
        if self.irregular.iter().any(|(s, _)| *s == lower) {
            return lower;
        }
        if let Some(stem) = lower.strip_suffix("ies") {
            if !stem.is_empty() {
                return format!("{stem}y");
            }
        }
        for suffix in ["ses", "xes", "zes", "ches", "shes"] {
            if lower.ends_with(suffix) {
                return lower[..lower.len() - 2].to_string();
            }
        }
        if lower.ends_with('s') && !lower.ends_with("ss") && lower.len() > 1 {
            return lower[..lower.len() - 1].to_string();
        }
        lower
    }

    /// The word, its plural and its singular, de-duplicated, lower-case.
    pub fn variants(&self, word: &str) -> Vec<String> {
        let mut out = vec![word.to_lowercase()];
        for v in [self.pluralize(word), self.singularize(word)] {
            if !out.contains(&v) {
                out.push(v);
            }
        }
        out
    }
}

/// Strips a trailing `Id` or `_id` from a column name and lower-cases the rest.
/// Returns `None` when the column does not follow the foreign-key convention.
pub fn strip_foreign_key_suffix(column: &str) -> Option<String> {
    let base = column
        .strip_suffix("_id")
        .or_else(|| column.strip_suffix("Id"))?;
    if base.is_empty() {
        return None;
    }
    Some(base.to_lowercase())
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_plurals() {
        let n = NamingConvention::new();
        assert_eq!(n.pluralize("user"), "users");
        assert_eq!(n.pluralize("category"), "categories");
        assert_eq!(n.pluralize("day"), "days");
        assert_eq!(n.pluralize("box"), "boxes");
        assert_eq!(n.singularize("posts"), "post");
        assert_eq!(n.singularize("categories"), "category");
        assert_eq!(n.singularize("boxes"), "box");
        assert_eq!(n.singularize("address"), "address");
    }

    #[test]
    fn irregular_pairs_are_opt_in() {
        let n = NamingConvention::new();
        assert_eq!(n.pluralize("person"), "persons");

        let n = NamingConvention::new().with_irregular("person", "people");
        assert_eq!(n.pluralize("person"), "people");
        assert_eq!(n.singularize("people"), "person");
        assert_eq!(n.pluralize("people"), "people");
    }

    #[test]
    fn foreign_key_suffix() {
        assert_eq!(strip_foreign_key_suffix("userId").as_deref(), Some("user"));
        assert_eq!(strip_foreign_key_suffix("author_id").as_deref(), Some("author"));
        assert_eq!(strip_foreign_key_suffix("BlogPostId").as_deref(), Some("blogpost"));
        assert_eq!(strip_foreign_key_suffix("id"), None);
        assert_eq!(strip_foreign_key_suffix("_id"), None);
        assert_eq!(strip_foreign_key_suffix("paid"), None);
    }
}
