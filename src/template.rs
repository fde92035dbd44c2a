use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder regex"));

/// Distinct `{{name}}` parameter names, in first-occurrence order.
pub fn extract_parameters(template: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let name = &caps[1];
        if !seen.iter().any(|s: &String| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

/// Substitutes every placeholder occurrence. A missing or empty value
/// degrades to the bare parameter name, never to the `{{name}}` token.
pub fn render(template: &str, values: &BTreeMap<String, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            match values.get(name) {
                Some(value) if !value.is_empty() => value.clone(),
                _ => name.to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn extracts_distinct_names_in_order() {
        assert_eq!(
            extract_parameters("{{b}} then {{a}} then {{b}} again"),
            vec!["b".to_string(), "a".to_string()]
        );
        assert!(extract_parameters("no placeholders here").is_empty());
    }

    #[test]
    fn ignores_malformed_braces() {
        assert!(extract_parameters("{ {x} } {{not closed").is_empty());
        assert_eq!(extract_parameters("{{a-b}} {{ok}}"), vec!["ok".to_string()]);
    }

    #[test]
    fn renders_values_and_falls_back_to_bare_name() {
        assert_eq!(render("Hi {{name}}", &values(&[])), "Hi name");
        assert_eq!(render("Hi {{name}}", &values(&[("name", "Ada")])), "Hi Ada");
        assert_eq!(render("Hi {{name}}", &values(&[("name", "")])), "Hi name");
    }

    #[test]
    fn replaces_every_occurrence() {
        let t = "{{x}} and {{y}} and {{x}}";
        assert_eq!(render(t, &values(&[("x", "1")])), "1 and y and 1");
    }
}
