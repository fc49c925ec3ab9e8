//! Translation table lookup and placeholder interpolation.

use serde::Deserialize;
use serde_json::{
    Map,
    Value,
};

/// Separator between the segments of a translation key (`nav.about`).
pub const KEY_SEPARATOR: char = '.';

/// Nested translations of one language, as read from its JSON file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TranslationTable(
    /// 最上位のエントリ
    Map<String, Value>,
);

impl TranslationTable {
    #[must_use]
    pub fn new(entries: Map<String, Value>) -> Self {
        Self(entries)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves a dot-separated key to its text.
    ///
    /// Returns `None` if a segment is missing or the value is not a string.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use site_i18n::i18n::TranslationTable;
    ///
    /// let table: TranslationTable =
    ///     serde_json::from_value(json!({"nav": {"about": "About us"}})).unwrap();
    ///
    /// assert_eq!(table.lookup("nav.about"), Some("About us"));
    /// assert_eq!(table.lookup("nav"), None);
    /// assert_eq!(table.lookup("nav.missing"), None);
    /// ```
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut segments = key.split(KEY_SEPARATOR);
        let first = segments.next()?;
        let mut value = self.0.get(first)?;
        for segment in segments {
            value = value.as_object()?.get(segment)?;
        }
        value.as_str()
    }

    /// Top-level entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

/// Replaces every `{name}` whose name has a value in `params`.
///
/// Names are ASCII letters, digits and underscores. Placeholders without a
/// value, and braces that do not form a placeholder, are kept as written.
///
/// # Examples
/// ```
/// use site_i18n::i18n::interpolate;
///
/// assert_eq!(interpolate("Hi {name}", &[("name", "Bob")]), "Hi Bob");
/// assert_eq!(interpolate("Hi {name}", &[]), "Hi {name}");
/// ```
#[must_use]
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return template.to_string();
    }

    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let (literal, tail) = rest.split_at(open);
        result.push_str(literal);

        let after_brace = tail.get(1..).unwrap_or_default();
        let name_len = after_brace
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after_brace.len());
        let (name, after_name) = after_brace.split_at(name_len);

        match after_name.strip_prefix('}') {
            Some(remaining) if !name.is_empty() => {
                match params.iter().find(|(param, _)| *param == name) {
                    Some((_, value)) => result.push_str(value),
                    None => {
                        result.push('{');
                        result.push_str(name);
                        result.push('}');
                    }
                }
                rest = remaining;
            }
            _ => {
                result.push('{');
                rest = after_brace;
            }
        }
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;
    use serde_json::json;

    use super::*;

    #[fixture]
    fn table() -> TranslationTable {
        serde_json::from_value(json!({
            "greeting": "Hi",
            "nav": {
                "about": "About us",
                "apps": { "title": "Apps" }
            },
            "footer": { "copyright": "© {year} Studio" },
            "count": 3,
            "list": ["a", "b"]
        }))
        .unwrap()
    }

    #[rstest]
    #[case::top_level("greeting", Some("Hi"))]
    #[case::nested("nav.about", Some("About us"))]
    #[case::deep("nav.apps.title", Some("Apps"))]
    #[case::object_leaf("nav.apps", None)]
    #[case::number_leaf("count", None)]
    #[case::array_leaf("list", None)]
    #[case::through_string("greeting.more", None)]
    #[case::missing_segment("nav.team", None)]
    #[case::missing_root("unknown", None)]
    #[case::empty_key("", None)]
    fn test_lookup(table: TranslationTable, #[case] key: &str, #[case] expected: Option<&str>) {
        assert_that!(table.lookup(key), eq(expected));
    }

    #[rstest]
    #[case::single("Hi {name}", &[("name", "Bob")], "Hi Bob")]
    #[case::repeated("{a}-{a}", &[("a", "x")], "x-x")]
    #[case::several("{a} and {b}", &[("a", "1"), ("b", "2")], "1 and 2")]
    #[case::unresolved("Hi {name}", &[("other", "x")], "Hi {name}")]
    #[case::no_params("Hi {name}", &[], "Hi {name}")]
    #[case::empty_braces("a {} b", &[("a", "x")], "a {} b")]
    #[case::not_identifier("{not valid}", &[("not", "x")], "{not valid}")]
    #[case::unclosed("{name", &[("name", "x")], "{name")]
    #[case::nested_braces("{{name}}", &[("name", "x")], "{x}")]
    #[case::digits_and_underscore("{year_2}", &[("year_2", "2026")], "2026")]
    #[case::multibyte("¡Hola {name}! ✓", &[("name", "Ana")], "¡Hola Ana! ✓")]
    fn test_interpolate(
        #[case] template: &str,
        #[case] params: &[(&str, &str)],
        #[case] expected: &str,
    ) {
        assert_that!(interpolate(template, params), eq(expected));
    }

    #[rstest]
    fn non_object_file_is_rejected() {
        let result = serde_json::from_str::<TranslationTable>(r#"["not", "an", "object"]"#);

        assert!(result.is_err());
    }
}
