// ─── Placeholder Substitution ───
// Scans `${identifier}` runs and replaces known identifiers.

use std::collections::BTreeMap;

/// Placeholder key → literal value used while building argument lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionMap {
    values: BTreeMap<String, String>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Replace every `${key}` whose key is known. Unknown keys, empty
    /// `${}` and unterminated `${` stay in the output untouched.
    pub fn substitute(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];

            let Some(len) = after_open.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };

            let key = &after_open[..len];
            match self.get(key).filter(|_| is_identifier(key)) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[start..start + 2 + len + 1]),
            }
            rest = &after_open[len + 1..];
        }

        out.push_str(rest);
        out
    }
}

fn is_identifier(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || ch == '-')
}
