/// Ordered bag of upstream query parameters.
///
/// Later inserts of the same key replace earlier ones, which lets callers layer
/// defaults (`sort_by`) under page-specific filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    /// Inserts only when the key is not already present
    pub fn set_default(&mut self, key: &str, value: impl ToString) {
        if self.get(key).is_none() {
            self.0.push((key.to_string(), value.to_string()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Copies every pair from `other`, overriding existing keys
    pub fn merge(mut self, other: &Params) -> Self {
        for (k, v) in &other.0 {
            self.set(k, v);
        }
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Params {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}
