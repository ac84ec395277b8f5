//! Options whose value names other configuration sections
//!
//! The text and message forms of these options are section names. The
//! configurations behind those names are owned by the option and loaded from
//! their sections right after the names are parsed.

use std::fmt;
use std::sync::Arc;

use strata_ini::IniSource;
use strata_message::{ConfigMessage, TaggedValue};
use tracing::debug;

use crate::core::config::Config;
use crate::core::error::{ConfigError, ConfigResult};
use crate::core::option::{AnyValue, ConfigOption, UNDEFINED, ensure_section};
use crate::text::{format_items, pick_separator, split_items};

fn read_string(message: &ConfigMessage, name: &str) -> ConfigResult<Option<String>> {
    match message.option(name) {
        None => Ok(None),
        Some(TaggedValue::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(ConfigError::wrong_value_type(other.kind())),
    }
}

/// Option holding one configuration, addressed by its section name
///
/// The value of the option is the name of the target configuration. An
/// empty name means the option has no value.
#[derive(Debug)]
pub struct ConfigRefOption {
    name: String,
    description: String,
    required: bool,
    default: Option<String>,
    config: Config,
}

impl ConfigRefOption {
    /// Create the option around its target configuration
    ///
    /// The target becomes optional unless the option is made required.
    ///
    /// # Panics
    ///
    /// Panics if `name` or `description` is empty.
    pub fn new(name: impl Into<String>, description: impl Into<String>, mut config: Config) -> Self {
        let name = name.into();
        let description = description.into();
        assert!(!name.is_empty(), "option name must not be empty");
        assert!(
            !description.is_empty(),
            "option '{name}' must have a description"
        );
        config.set_optional(true);
        Self {
            name,
            description,
            required: false,
            default: None,
            config,
        }
    }

    /// Mark the option, and so its target section, as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self.config.set_optional(false);
        self
    }

    /// Set the default section name and install it
    #[must_use]
    pub fn with_default(mut self, section: impl Into<String>) -> Self {
        let section = section.into();
        self.config.set_name(section.clone());
        self.default = Some(section);
        self
    }

    /// Target configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable target configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Section name of the target, empty when unset
    pub fn section(&self) -> &str {
        self.config.name()
    }

    /// Set the section name of the target
    ///
    /// `None` is the same as an empty name, which a required option rejects.
    pub fn set_value(&mut self, section: Option<String>) -> ConfigResult<()> {
        let section = section.unwrap_or_default();
        if section.is_empty() && self.required {
            return Err(ConfigError::value_required(&self.name));
        }
        self.config.set_name(section);
        Ok(())
    }
}

impl ConfigOption for ConfigRefOption {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn type_name(&self) -> String {
        "str".to_string()
    }

    fn value_description(&self) -> String {
        "configuration section name".to_string()
    }

    fn has_value(&self) -> bool {
        true
    }

    fn is_default(&self) -> bool {
        false
    }

    fn clear(&mut self, to_default: bool) {
        self.config.clear(to_default);
        let section = if to_default {
            self.default.clone().unwrap_or_default()
        } else {
            String::new()
        };
        self.config.set_name(section);
    }

    fn get_as_str(&self) -> String {
        self.config.name().to_string()
    }

    fn set_as_str(&mut self, text: &str) -> ConfigResult<()> {
        self.config.set_name(text);
        Ok(())
    }

    fn get_formatted(&self) -> String {
        self.config.name().to_string()
    }

    fn set_dynamic(&mut self, value: Option<&dyn AnyValue>) -> ConfigResult<()> {
        let Some(value) = value else {
            return self.set_value(None);
        };
        let any = value.as_any_value();
        if let Some(text) = any.downcast_ref::<String>() {
            self.set_value(Some(text.clone()))
        } else if let Some(text) = any.downcast_ref::<&'static str>() {
            self.set_value(Some((*text).to_string()))
        } else {
            Err(ConfigError::wrong_type(
                &self.name,
                "str",
                &value.value_type_name(),
            ))
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.config.name().is_empty() {
            if self.required {
                return Err(ConfigError::missing_value(&self.name));
            }
            return Ok(());
        }
        self.config.validate()
    }

    fn load_config(&mut self, source: &IniSource, section: &str) -> ConfigResult<()> {
        ensure_section(source, section)?;
        if source.has_option(section, &self.name) {
            let target = source.get(section, &self.name)?;
            self.config.set_name(target);
            if !self.config.name().is_empty() {
                debug!(option = %self.name, target = %self.config.name(), "loading referenced section");
                self.config.load_config(source, None)?;
            }
        }
        Ok(())
    }

    fn load_proto(&mut self, message: &ConfigMessage) -> ConfigResult<()> {
        if let Some(text) = read_string(message, &self.name)? {
            self.set_as_str(&text)?;
        }
        Ok(())
    }

    fn save_proto(&self, message: &mut ConfigMessage) {
        message.set_option(
            self.name.clone(),
            TaggedValue::String(self.config.name().to_string()),
        );
    }

    fn configs(&self) -> Vec<&Config> {
        vec![&self.config]
    }

    fn configs_mut(&mut self) -> Vec<&mut Config> {
        vec![&mut self.config]
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Builds an item configuration for a section name
pub type ConfigFactory = Arc<dyn Fn(&str) -> Config + Send + Sync>;

/// Option holding a list of configurations of one type, addressed by their
/// section names
pub struct ConfigListOption {
    name: String,
    description: String,
    required: bool,
    separator: Option<String>,
    item_type: String,
    factory: ConfigFactory,
    items: Vec<Config>,
}

impl fmt::Debug for ConfigListOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigListOption")
            .field("name", &self.name)
            .field("item_type", &self.item_type)
            .field("required", &self.required)
            .field("separator", &self.separator)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl ConfigListOption {
    /// Create the option with the function building one item per section
    ///
    /// The item type is the type tag of the configurations built by
    /// `factory`.
    ///
    /// # Panics
    ///
    /// Panics if `name` or `description` is empty.
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&str) -> Config + Send + Sync + 'static,
    {
        let name = name.into();
        let description = description.into();
        assert!(!name.is_empty(), "option name must not be empty");
        assert!(
            !description.is_empty(),
            "option '{name}' must have a description"
        );
        let item_type = factory("").type_name().to_string();
        Self {
            name,
            description,
            required: false,
            separator: None,
            item_type,
            factory: Arc::new(factory),
            items: Vec::new(),
        }
    }

    /// Require at least one item
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Use an explicit separator between section names
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Type tag of the items
    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    /// Item configurations
    pub fn items(&self) -> &[Config] {
        &self.items
    }

    /// Mutable item configurations
    pub fn items_mut(&mut self) -> &mut [Config] {
        &mut self.items
    }

    /// Replace the items; `None` empties the list
    pub fn set_value(&mut self, items: Option<Vec<Config>>) -> ConfigResult<()> {
        let Some(items) = items else {
            if self.required {
                return Err(ConfigError::value_required(&self.name));
            }
            self.items.clear();
            return Ok(());
        };
        for (index, item) in items.iter().enumerate() {
            if item.type_name() != self.item_type {
                return Err(ConfigError::value(format!(
                    "List item[{index}] has wrong type: Expected '{}', got '{}'",
                    self.item_type,
                    item.type_name()
                )));
            }
        }
        self.items = items;
        Ok(())
    }

    fn section_names(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|item| item.name().to_string())
            .collect()
    }

    fn build_items(&self, text: &str) -> Vec<Config> {
        split_items(text, self.separator.as_deref())
            .into_iter()
            .map(|section| (self.factory)(section))
            .collect()
    }
}

impl ConfigOption for ConfigListOption {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn type_name(&self) -> String {
        "list".to_string()
    }

    fn value_description(&self) -> String {
        format!(
            "list of configuration section names (for sections of type '{}')",
            self.item_type
        )
    }

    fn has_value(&self) -> bool {
        true
    }

    fn is_default(&self) -> bool {
        self.items.is_empty()
    }

    fn clear(&mut self, _to_default: bool) {
        self.items.clear();
    }

    fn get_as_str(&self) -> String {
        let names = self.section_names();
        let separator = pick_separator(&names, self.separator.as_deref(), ", ");
        names.join(separator)
    }

    fn set_as_str(&mut self, text: &str) -> ConfigResult<()> {
        self.items = self.build_items(text);
        Ok(())
    }

    fn get_formatted(&self) -> String {
        if self.items.is_empty() {
            return UNDEFINED.to_string();
        }
        format_items(&self.section_names(), self.separator.as_deref())
    }

    fn set_dynamic(&mut self, value: Option<&dyn AnyValue>) -> ConfigResult<()> {
        let Some(value) = value else {
            return self.set_value(None);
        };
        match value.as_any_value().downcast_ref::<Vec<String>>() {
            Some(sections) => {
                let items = sections
                    .iter()
                    .map(|section| (self.factory)(section))
                    .collect();
                self.set_value(Some(items))
            }
            None => Err(ConfigError::wrong_type(
                &self.name,
                "list",
                &value.value_type_name(),
            )),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.required && self.items.is_empty() {
            return Err(ConfigError::missing_value(&self.name));
        }
        self.items.iter().try_for_each(Config::validate)
    }

    fn load_config(&mut self, source: &IniSource, section: &str) -> ConfigResult<()> {
        ensure_section(source, section)?;
        if source.has_option(section, &self.name) {
            let text = source.get(section, &self.name)?;
            self.items = self.build_items(&text);
            debug!(option = %self.name, count = self.items.len(), "loading listed sections");
            for item in &mut self.items {
                item.load_config(source, None)?;
            }
        }
        Ok(())
    }

    fn load_proto(&mut self, message: &ConfigMessage) -> ConfigResult<()> {
        if let Some(text) = read_string(message, &self.name)? {
            self.set_as_str(&text)?;
        }
        Ok(())
    }

    fn save_proto(&self, message: &mut ConfigMessage) {
        let names = self.section_names();
        let separator = pick_separator(&names, self.separator.as_deref(), ",");
        message.set_option(self.name.clone(), TaggedValue::String(names.join(separator)));
    }

    fn configs(&self) -> Vec<&Config> {
        self.items.iter().collect()
    }

    fn configs_mut(&mut self) -> Vec<&mut Config> {
        self.items.iter_mut().collect()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::options::StrOption;
    use pretty_assertions::assert_eq;

    fn worker(name: &str) -> Config {
        Config::new(name)
            .with_type_name("WorkerConfig")
            .with_option(StrOption::new("task", "Task type").with_default("generic".into()))
    }

    fn task(config: &Config) -> Option<&str> {
        config
            .get::<StrOption>("task")
            .and_then(|option| option.value())
            .map(String::as_str)
    }

    const TEXT: &str = "[main]\nworker = alpha\nworkers = alpha, beta\n\n\
                        [alpha]\ntask = processing\n\n[beta]\ntask = reporting\n";

    #[test]
    fn reference_loads_target_section() {
        let source = IniSource::from_text(TEXT).unwrap();
        let mut opt = ConfigRefOption::new("worker", "Worker", worker(""));
        opt.load_config(&source, "main").unwrap();
        assert_eq!(opt.section(), "alpha");
        assert_eq!(task(opt.config()), Some("processing"));
        assert_eq!(opt.get_formatted(), "alpha");
    }

    #[test]
    fn reference_without_name_skips_target() {
        let source = IniSource::from_text("[main]\nworker =\n").unwrap();
        let mut opt = ConfigRefOption::new("worker", "Worker", worker(""));
        opt.load_config(&source, "main").unwrap();
        assert_eq!(opt.section(), "");
        assert!(opt.validate().is_ok());
    }

    #[test]
    fn required_reference() {
        let mut opt = ConfigRefOption::new("worker", "Worker", worker("")).required();
        assert!(!opt.config().is_optional());
        let err = opt.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        let err = opt.set_value(None).unwrap_err();
        assert_eq!(err.to_string(), "Value is required for option 'worker'.");
    }

    #[test]
    fn reference_clear_restores_default_name() {
        let mut opt = ConfigRefOption::new("worker", "Worker", worker("")).with_default("alpha");
        opt.set_as_str("beta").unwrap();
        opt.clear(true);
        assert_eq!(opt.section(), "alpha");
        opt.clear(false);
        assert_eq!(opt.section(), "");
    }

    #[test]
    fn reference_dynamic_value() {
        let mut opt = ConfigRefOption::new("worker", "Worker", worker(""));
        opt.set_dynamic(Some(&"beta")).unwrap();
        assert_eq!(opt.section(), "beta");
        let err = opt.set_dynamic(Some(&1_i64)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert_eq!(
            err.to_string(),
            "Option 'worker' value must be a 'str', not 'i64'"
        );
    }

    #[test]
    fn reference_proto_holds_name() {
        let mut opt = ConfigRefOption::new("worker", "Worker", worker("alpha"));
        let mut message = ConfigMessage::new();
        opt.save_proto(&mut message);
        assert_eq!(
            message.option("worker"),
            Some(&TaggedValue::String("alpha".into()))
        );
        opt.clear(false);
        opt.load_proto(&message).unwrap();
        assert_eq!(opt.section(), "alpha");

        message.set_option("worker", TaggedValue::Bool(true));
        let err = opt.load_proto(&message).unwrap_err();
        assert_eq!(err.to_string(), "Wrong value type: bool");
    }

    #[test]
    fn list_loads_every_section() {
        let source = IniSource::from_text(TEXT).unwrap();
        let mut opt = ConfigListOption::new("workers", "Workers", worker);
        opt.load_config(&source, "main").unwrap();
        let names: Vec<_> = opt.items().iter().map(Config::name).collect();
        assert_eq!(names, ["alpha", "beta"]);
        assert_eq!(task(&opt.items()[0]), Some("processing"));
        assert_eq!(task(&opt.items()[1]), Some("reporting"));
        assert_eq!(opt.get_as_str(), "alpha, beta");
        assert_eq!(opt.get_formatted(), "alpha, beta");
    }

    #[test]
    fn list_item_type_is_checked() {
        let mut opt = ConfigListOption::new("workers", "Workers", worker);
        assert_eq!(opt.item_type(), "WorkerConfig");
        assert_eq!(
            opt.value_description(),
            "list of configuration section names (for sections of type 'WorkerConfig')"
        );
        let err = opt
            .set_value(Some(vec![worker("a"), Config::new("b")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "List item[1] has wrong type: Expected 'WorkerConfig', got 'Config'"
        );
    }

    #[test]
    fn required_list_must_not_be_empty() {
        let opt = ConfigListOption::new("workers", "Workers", worker).required();
        assert_eq!(
            opt.validate().unwrap_err().to_string(),
            "Missing value for required option 'workers'"
        );
        assert_eq!(opt.get_formatted(), UNDEFINED);
    }

    #[test]
    fn list_dynamic_names() {
        let mut opt = ConfigListOption::new("workers", "Workers", worker);
        let names = vec!["one".to_string(), "two".to_string()];
        opt.set_dynamic(Some(&names)).unwrap();
        assert_eq!(opt.items().len(), 2);
        opt.set_dynamic(None).unwrap();
        assert!(opt.items().is_empty());
    }

    #[test]
    fn list_proto_always_written() {
        let mut opt = ConfigListOption::new("workers", "Workers", worker);
        let mut message = ConfigMessage::new();
        opt.save_proto(&mut message);
        assert_eq!(
            message.option("workers"),
            Some(&TaggedValue::String(String::new()))
        );
        opt.set_as_str("a,b").unwrap();
        opt.save_proto(&mut message);
        assert_eq!(
            message.option("workers"),
            Some(&TaggedValue::String("a,b".into()))
        );
    }
}
