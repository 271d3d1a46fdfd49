use serde::{Deserialize, Serialize};

/// Flat snapshot of one pet's profile attributes.
///
/// Backed by a plain vector of pairs rather than a map so the rendered
/// `key: value` block preserves insertion order. Immutable for the duration
/// of one response generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PetProfile(Vec<(String, String)>);

impl PetProfile {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// One `key: value` line per attribute, insertion order preserved.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (k, v) in self.iter() {
            out.push_str(k);
            out.push_str(": ");
            out.push_str(v);
            out.push('\n');
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PetProfile {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_keeps_insertion_order() {
        let profile: PetProfile =
            [("name", "Lucky"), ("weight", "4.6kg"), ("age", "3")].into_iter().collect();
        assert_eq!(profile.render(), "name: Lucky\nweight: 4.6kg\nage: 3\n");
    }

    #[test]
    fn empty_profile_renders_nothing() {
        assert_eq!(PetProfile::new().render(), "");
    }
}
