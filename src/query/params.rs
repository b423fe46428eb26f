//! Raw query parameters as they arrive from the HTTP layer.

/// A parameter value: single occurrence or repeated key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

impl ParamValue {
    pub fn first(&self) -> &str {
        match self {
            ParamValue::One(s) => s,
            ParamValue::Many(v) => v.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            ParamValue::One(s) => vec![s.as_str()],
            ParamValue::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            ParamValue::One(s) => *self = ParamValue::Many(vec![std::mem::take(s), value]),
            ParamValue::Many(v) => v.push(value),
        }
    }
}

/// Query parameters keyed by name, in first-occurrence order. Repeated keys collapse
/// into `ParamValue::Many`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawParams {
    entries: Vec<(String, ParamValue)>,
}

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = RawParams::new();
        for (k, v) in pairs {
            params.push(k.into(), v.into());
        }
        params
    }

    pub fn push(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((key, ParamValue::One(value))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
