//! Configuration section aggregate

use std::fmt::Write as _;

use indexmap::IndexMap;
use strata_ini::IniSource;
use strata_message::ConfigMessage;
use tracing::debug;

use crate::core::error::{ConfigError, ConfigResult};
use crate::core::option::ConfigOption;

/// Default type tag of a configuration section
pub const DEFAULT_TYPE_NAME: &str = "Config";

/// A named collection of options and nested configurations.
///
/// A `Config` maps to one section of the host text format. Options and
/// sub-configurations are registered under attribute names when the
/// configuration is built; registration order is the order used for
/// loading, serialization and rendering.
///
/// Configurations referenced by section name (see
/// [`ConfigRefOption`](crate::ConfigRefOption) and
/// [`ConfigListOption`](crate::ConfigListOption)) are owned by the option
/// that names them, not registered here, but they are part of
/// [`configs`](Self::configs).
///
/// # Examples
///
/// ```
/// use strata_config::{Config, ConfigOption, IntOption, StrOption};
/// use strata_ini::IniSource;
///
/// let mut db = Config::new("db")
///     .with_description("Database connection")
///     .with_option(StrOption::new("host", "Server host").required())
///     .with_option(IntOption::new("port", "Server port").with_default(3050));
///
/// let source = IniSource::from_text("[db]\nhost = localhost\n").unwrap();
/// db.load_config(&source, None).unwrap();
/// db.validate().unwrap();
///
/// let host = db.get::<StrOption>("host").unwrap();
/// assert_eq!(host.value().map(String::as_str), Some("localhost"));
/// assert_eq!(db.option("port").unwrap().get_as_str(), "3050");
/// ```
#[derive(Debug)]
pub struct Config {
    name: String,
    type_name: String,
    optional: bool,
    description: Option<String>,
    options: IndexMap<String, Box<dyn ConfigOption>>,
    configs: IndexMap<String, Config>,
}

impl Config {
    /// Create an empty, mandatory configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: DEFAULT_TYPE_NAME.to_string(),
            optional: false,
            description: None,
            options: IndexMap::new(),
            configs: IndexMap::new(),
        }
    }

    /// Set the type tag, used to check items of configuration lists
    #[must_use]
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Make the section optional in the text source
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Register an option under its own name
    ///
    /// # Panics
    ///
    /// Panics if the name collides with a registered option.
    #[must_use]
    pub fn with_option(mut self, option: impl ConfigOption) -> Self {
        let name = option.name().to_string();
        if let Err(err) = self.add_option_as(name, option) {
            panic!("cannot register option in '{}': {err}", self.name);
        }
        self
    }

    /// Register a nested configuration under its own name
    ///
    /// # Panics
    ///
    /// Panics if the name collides with a registered option.
    #[must_use]
    pub fn with_config(mut self, config: Self) -> Self {
        let attr = config.name.clone();
        if let Err(err) = self.add_config_as(attr, config) {
            panic!("cannot register section in '{}': {err}", self.name);
        }
        self
    }

    /// Register an option under its own name
    pub fn add_option(&mut self, option: impl ConfigOption) -> ConfigResult<()> {
        let name = option.name().to_string();
        self.add_option_as(name, option)
    }

    /// Register an option under an explicit attribute name
    ///
    /// An attribute that differs from the option name is reported by
    /// [`validate`](Self::validate).
    pub fn add_option_as(
        &mut self,
        attr: impl Into<String>,
        option: impl ConfigOption,
    ) -> ConfigResult<()> {
        let attr = attr.into();
        self.guard_attr(&attr)?;
        self.options.insert(attr, Box::new(option));
        Ok(())
    }

    /// Register a nested configuration under an explicit attribute name
    pub fn add_config_as(&mut self, attr: impl Into<String>, config: Self) -> ConfigResult<()> {
        let attr = attr.into();
        self.guard_attr(&attr)?;
        self.configs.insert(attr, config);
        Ok(())
    }

    fn guard_attr(&self, attr: &str) -> ConfigResult<()> {
        if self.options.values().any(|option| option.name() == attr) {
            return Err(ConfigError::value(
                "Cannot assign values to option itself, use 'option.value' instead",
            ));
        }
        if self.options.contains_key(attr) || self.configs.contains_key(attr) {
            return Err(ConfigError::value(format!(
                "Attribute '{attr}' is already registered in '{}'",
                self.name
            )));
        }
        Ok(())
    }

    /// Section name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Change the section name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Type tag
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Whether a missing section is accepted by [`load_config`](Self::load_config)
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Change whether the section is optional
    pub fn set_optional(&mut self, optional: bool) {
        self.optional = optional;
    }

    /// Description, empty when none was given
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Option registered under `attr`
    pub fn option(&self, attr: &str) -> Option<&dyn ConfigOption> {
        self.options.get(attr).map(|option| &**option)
    }

    /// Mutable option registered under `attr`
    pub fn option_mut(&mut self, attr: &str) -> Option<&mut dyn ConfigOption> {
        match self.options.get_mut(attr) {
            Some(option) => Some(&mut **option),
            None => None,
        }
    }

    /// Option registered under `attr`, as its concrete type
    pub fn get<T: ConfigOption>(&self, attr: &str) -> Option<&T> {
        self.options
            .get(attr)
            .and_then(|option| (**option).as_any().downcast_ref::<T>())
    }

    /// Mutable option registered under `attr`, as its concrete type
    pub fn get_mut<T: ConfigOption>(&mut self, attr: &str) -> Option<&mut T> {
        self.options
            .get_mut(attr)
            .and_then(|option| (**option).as_any_mut().downcast_mut::<T>())
    }

    /// Nested configuration registered under `attr`
    pub fn config(&self, attr: &str) -> Option<&Self> {
        self.configs.get(attr)
    }

    /// Mutable nested configuration registered under `attr`
    pub fn config_mut(&mut self, attr: &str) -> Option<&mut Self> {
        self.configs.get_mut(attr)
    }

    /// Registered options in registration order
    pub fn options(&self) -> impl Iterator<Item = &dyn ConfigOption> {
        self.options.values().map(|option| &**option)
    }

    /// Registered options with their attribute names
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &dyn ConfigOption)> {
        self.options
            .iter()
            .map(|(attr, option)| (attr.as_str(), &**option))
    }

    /// All nested configurations
    ///
    /// Registered sub-configurations come first, followed by the
    /// configurations held by options, in option order.
    pub fn configs(&self) -> Vec<&Self> {
        let mut result: Vec<&Self> = self.configs.values().collect();
        for option in self.options.values() {
            result.extend(option.configs());
        }
        result
    }

    /// Mutable access to all nested configurations, in [`configs`](Self::configs) order
    pub fn configs_mut(&mut self) -> Vec<&mut Self> {
        let mut result: Vec<&mut Self> = self.configs.values_mut().collect();
        for option in self.options.values_mut() {
            result.extend(option.configs_mut());
        }
        result
    }

    /// Check every option and the attribute binding of each
    ///
    /// Nested configurations are checked only through the options that
    /// hold them.
    pub fn validate(&self) -> ConfigResult<()> {
        for (attr, option) in &self.options {
            option.validate()?;
            if attr != option.name() {
                return Err(ConfigError::config(format!(
                    "Option '{}' is not defined as attribute with the same name",
                    option.name()
                )));
            }
        }
        Ok(())
    }

    /// Clear every option and registered sub-configuration
    pub fn clear(&mut self, to_default: bool) {
        for option in self.options.values_mut() {
            option.clear(to_default);
        }
        for config in self.configs.values_mut() {
            config.clear(to_default);
        }
    }

    /// Text for a config file
    ///
    /// An optional configuration without a name renders as an empty string.
    /// Unless `plain`, the section header is followed by the description
    /// and every option is preceded by its annotations.
    pub fn get_config(&self, plain: bool) -> String {
        if self.optional && self.name.is_empty() {
            return String::new();
        }
        let mut lines = format!("[{}]\n", self.name);
        if !plain {
            lines.push_str(";\n");
            for line in self.description().trim().lines() {
                let _ = writeln!(lines, "; {line}");
            }
        }
        for option in self.options.values() {
            if !plain {
                lines.push('\n');
            }
            lines.push_str(&option.get_config(plain));
        }
        for config in self.configs() {
            let text = config.get_config(plain);
            if !text.is_empty() {
                if !plain {
                    lines.push('\n');
                }
                lines.push_str(&text);
            }
        }
        lines
    }

    /// Load values from `section` of a host source, or from the own section
    ///
    /// A missing section is skipped for optional configurations and is an
    /// error otherwise, except for the default section. Options are loaded
    /// first, then registered sub-configurations from their own sections.
    /// Failures other than structural ones are wrapped in a structural
    /// loading error.
    pub fn load_config(&mut self, source: &IniSource, section: Option<&str>) -> ConfigResult<()> {
        let section = section.unwrap_or(&self.name).to_string();
        if !source.has_section(&section) {
            if self.optional {
                debug!(config = %self.name, section = %section, "optional section not present, skipped");
                return Ok(());
            }
            if !source.is_default_section(&section) {
                return Err(ConfigError::missing_section(&section));
            }
        }
        debug!(config = %self.name, section = %section, "loading configuration section");
        self.load_section(source, &section).map_err(|err| {
            if err.is_structural() {
                err
            } else {
                ConfigError::loading(err)
            }
        })
    }

    fn load_section(&mut self, source: &IniSource, section: &str) -> ConfigResult<()> {
        for option in self.options.values_mut() {
            option.load_config(source, section)?;
        }
        for config in self.configs.values_mut() {
            config.load_config(source, None)?;
        }
        Ok(())
    }

    /// Load values from a message, then nested configurations from its
    /// sub-messages of the same name
    pub fn load_proto(&mut self, message: &ConfigMessage) -> ConfigResult<()> {
        for option in self.options.values_mut() {
            option.load_proto(message)?;
        }
        for config in self.configs_mut() {
            if let Some(nested) = message.config(&config.name) {
                config.load_proto(nested)?;
            }
        }
        Ok(())
    }

    /// Store values into a message, nested configurations into sub-messages
    pub fn save_proto(&self, message: &mut ConfigMessage) {
        for option in self.options.values() {
            option.save_proto(message);
        }
        for config in self.configs() {
            config.save_proto(message.config_mut(&config.name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::options::{IntOption, StrOption};
    use pretty_assertions::assert_eq;

    fn server() -> Config {
        Config::new("server")
            .with_description("Server settings")
            .with_option(StrOption::new("host", "Host name").required())
            .with_option(IntOption::new("port", "Port").with_default(8080))
    }

    #[test]
    fn typed_access() {
        let mut cfg = server();
        cfg.get_mut::<StrOption>("host")
            .unwrap()
            .set_value(Some("localhost".into()))
            .unwrap();
        assert_eq!(cfg.option("host").unwrap().get_as_str(), "localhost");
        assert!(cfg.get::<IntOption>("host").is_none());
        assert!(cfg.get::<StrOption>("missing").is_none());
    }

    #[test]
    fn option_collision_is_rejected() {
        let mut cfg = server();
        let err = cfg.add_config_as("port", Config::new("port")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(
            err.to_string(),
            "Cannot assign values to option itself, use 'option.value' instead"
        );
    }

    #[test]
    fn taken_attribute_is_rejected() {
        let mut cfg = server();
        cfg.add_option_as("other", StrOption::new("name", "Name")).unwrap();
        let err = cfg
            .add_option_as("other", IntOption::new("count", "Count"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(
            err.to_string(),
            "Attribute 'other' is already registered in 'server'"
        );
        assert!(cfg.get::<StrOption>("other").is_some());

        cfg.add_config_as("nested", Config::new("nested")).unwrap();
        assert!(cfg.add_config_as("nested", Config::new("again")).is_err());
        assert!(cfg.add_option_as("nested", StrOption::new("x", "X")).is_err());
        assert_eq!(cfg.config("nested").unwrap().name(), "nested");
    }

    #[test]
    fn mismatched_attribute_fails_validation() {
        let mut cfg = Config::new("app");
        cfg.add_option_as("other", StrOption::new("name", "Name").with_default("x".into()))
            .unwrap();
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(
            err.to_string(),
            "Option 'name' is not defined as attribute with the same name"
        );
    }

    #[test]
    fn required_option_fails_validation() {
        let cfg = server();
        let err = cfg.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing value for required option 'host'"
        );
    }

    #[test]
    fn clear_recurses_into_sub_configs() {
        let mut cfg = Config::new("app").with_config(server());
        let nested = cfg.config_mut("server").unwrap();
        nested
            .get_mut::<IntOption>("port")
            .unwrap()
            .set_value(Some(1))
            .unwrap();
        cfg.clear(true);
        let port = cfg.config("server").unwrap().get::<IntOption>("port").unwrap();
        assert_eq!(port.value(), Some(&8080));
        cfg.clear(false);
        let port = cfg.config("server").unwrap().get::<IntOption>("port").unwrap();
        assert_eq!(port.value(), None);
    }

    #[test]
    fn missing_section_handling() {
        let source = IniSource::from_text("[other]\nx = 1\n").unwrap();

        let err = server().load_config(&source, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(
            err.to_string(),
            "Configuration error: section 'server' not found!"
        );

        assert!(server().optional().load_config(&source, None).is_ok());
        assert!(server().load_config(&source, Some("DEFAULT")).is_ok());
    }

    #[test]
    fn bad_value_is_wrapped() {
        let source = IniSource::from_text("[server]\nport = many\n").unwrap();
        let err = server().load_config(&source, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().starts_with("Configuration error: "));
    }

    #[test]
    fn unnamed_optional_renders_nothing() {
        let cfg = Config::new("").optional();
        assert_eq!(cfg.get_config(false), "");
    }

    #[test]
    fn plain_rendering() {
        let mut cfg = server();
        cfg.get_mut::<StrOption>("host")
            .unwrap()
            .set_value(Some("localhost".into()))
            .unwrap();
        assert_eq!(
            cfg.get_config(true),
            "[server]\nhost = localhost\n;port = 8080\n"
        );
    }

    #[test]
    fn proto_recurses_by_name() {
        let mut cfg = Config::new("app").with_config(server());
        cfg.config_mut("server")
            .unwrap()
            .get_mut::<StrOption>("host")
            .unwrap()
            .set_value(Some("db".into()))
            .unwrap();
        let mut message = ConfigMessage::new();
        cfg.save_proto(&mut message);
        assert!(message.config("server").unwrap().has_option("host"));

        let mut fresh = Config::new("app").with_config(server());
        fresh.load_proto(&message).unwrap();
        let host = fresh.config("server").unwrap().get::<StrOption>("host").unwrap();
        assert_eq!(host.value().map(String::as_str), Some("db"));
    }
}
