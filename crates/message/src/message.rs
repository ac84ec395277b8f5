//! Nested configuration message

use crate::error::{MessageError, MessageResult};
use crate::value::TaggedValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named option values plus nested sub-messages keyed by section name.
///
/// Absence of an option entry means "no value"; there is no explicit null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigMessage {
    options: IndexMap<String, TaggedValue>,
    configs: IndexMap<String, ConfigMessage>,
}

impl ConfigMessage {
    /// Create an empty message
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an option value
    pub fn option(&self, name: &str) -> Option<&TaggedValue> {
        self.options.get(name)
    }

    /// Check whether an option value is present
    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Set (or replace) an option value
    pub fn set_option(&mut self, name: impl Into<String>, value: impl Into<TaggedValue>) {
        self.options.insert(name.into(), value.into());
    }

    /// Remove an option value
    pub fn remove_option(&mut self, name: &str) -> Option<TaggedValue> {
        self.options.shift_remove(name)
    }

    /// All option values in insertion order
    pub fn options(&self) -> &IndexMap<String, TaggedValue> {
        &self.options
    }

    /// Get a nested message
    pub fn config(&self, name: &str) -> Option<&ConfigMessage> {
        self.configs.get(name)
    }

    /// Get a nested message, creating an empty one if missing
    pub fn config_mut(&mut self, name: &str) -> &mut ConfigMessage {
        self.configs.entry(name.to_string()).or_default()
    }

    /// Remove a nested message
    pub fn remove_config(&mut self, name: &str) -> Option<ConfigMessage> {
        self.configs.shift_remove(name)
    }

    /// All nested messages in insertion order
    pub fn configs(&self) -> &IndexMap<String, ConfigMessage> {
        &self.configs
    }

    /// Check whether the message holds neither options nor sub-messages
    pub fn is_empty(&self) -> bool {
        self.options.is_empty() && self.configs.is_empty()
    }

    /// Encode into the compact binary form
    pub fn to_bytes(&self) -> MessageResult<Vec<u8>> {
        let bytes =
            postcard::to_allocvec(self).map_err(|err| MessageError::encode(err.to_string()))?;
        tracing::debug!(
            options = self.options.len(),
            configs = self.configs.len(),
            size = bytes.len(),
            "encoded configuration message"
        );
        Ok(bytes)
    }

    /// Decode from the compact binary form
    pub fn from_bytes(bytes: &[u8]) -> MessageResult<Self> {
        let message: Self =
            postcard::from_bytes(bytes).map_err(|err| MessageError::decode(err.to_string()))?;
        tracing::debug!(
            options = message.options.len(),
            configs = message.configs.len(),
            size = bytes.len(),
            "decoded configuration message"
        );
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    #[test]
    fn config_mut_creates_once() {
        let mut message = ConfigMessage::new();
        message.config_mut("db").set_option("user", "SYSDBA");
        message.config_mut("db").set_option("port", 3050_u64);
        let db = message.config("db").unwrap();
        assert_eq!(db.options().len(), 2);
        assert_eq!(db.option("port").unwrap().kind(), ValueKind::Uint64);
    }

    #[test]
    fn remove_option_reports_previous() {
        let mut message = ConfigMessage::new();
        message.set_option("flag", true);
        assert_eq!(message.remove_option("flag"), Some(TaggedValue::Bool(true)));
        assert!(!message.has_option("flag"));
        assert!(message.is_empty());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = ConfigMessage::from_bytes(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, MessageError::Decode { .. }));
    }
}
