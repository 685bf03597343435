use serde::Serialize;

use crate::error::{Error, Result};

/// Form fields of a single Bot API call, in insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an earlier value for the same key.
    pub fn set(&mut self, key: &str, value: impl ToString) -> &mut Self {
        let value = value.to_string();
        match self.0.iter_mut().find(|(existing, _)| existing == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
        self
    }

    pub fn set_opt<T: ToString>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    /// Sets `key` to the JSON encoding of `value`.
    pub fn set_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<&mut Self> {
        let json = serde_json::to_string(value).map_err(Error::Encode)?;
        Ok(self.set(key, json))
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends the set fields of an optional-parameters struct.
    pub fn extend_from<O: AppendParams + ?Sized>(&mut self, options: Option<&O>) -> Result<()> {
        match options {
            Some(options) => options.append_params(self),
            None => Ok(()),
        }
    }
}

/// Implemented by the optional-parameters structs of each method.
pub trait AppendParams {
    /// Adds a field for every option that is set; unset options add nothing.
    fn append_params(&self, params: &mut Params) -> Result<()>;
}
