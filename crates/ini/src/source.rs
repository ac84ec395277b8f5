//! Parsed INI data with section/key lookup

use crate::error::{IniError, IniResult};
use crate::interpolation::{EnvExtendedInterpolation, Interpolation};
use crate::options::IniOptions;
use crate::parser;
use indexmap::IndexMap;
use std::path::Path;
use std::sync::Arc;

/// Sections of key/value pairs read from one or more INI texts.
///
/// Every section falls back to the default section for keys it does not
/// define. Keys are case-insensitive (stored lower-cased); section names are
/// case-sensitive.
#[derive(Debug, Clone)]
pub struct IniSource {
    options: IniOptions,
    interpolation: Arc<dyn Interpolation>,
    defaults: IndexMap<String, String>,
    sections: IndexMap<String, IndexMap<String, String>>,
    sources: Vec<String>,
}

impl Default for IniSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IniSource {
    /// Create an empty source using [`EnvExtendedInterpolation`]
    pub fn new() -> Self {
        Self::with_options(IniOptions::default())
    }

    /// Create an empty source with custom syntax settings
    pub fn with_options(options: IniOptions) -> Self {
        Self {
            options,
            interpolation: Arc::new(EnvExtendedInterpolation),
            defaults: IndexMap::new(),
            sections: IndexMap::new(),
            sources: Vec::new(),
        }
    }

    /// Replace the interpolation strategy
    pub fn with_interpolation(mut self, interpolation: impl Interpolation + 'static) -> Self {
        self.interpolation = Arc::new(interpolation);
        self
    }

    /// Parse from a string (convenience for a single anonymous text)
    pub fn from_text(text: &str) -> IniResult<Self> {
        let mut source = Self::new();
        source.read_str(text, "<string>")?;
        Ok(source)
    }

    /// Syntax settings
    pub fn options(&self) -> &IniOptions {
        &self.options
    }

    /// Name of the fallback section
    pub fn default_section(&self) -> &str {
        &self.options.default_section
    }

    /// Check whether `section` is the fallback section
    pub fn is_default_section(&self, section: &str) -> bool {
        section == self.options.default_section
    }

    /// Names of the texts read so far
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Read INI text, merging it into the data read so far
    pub fn read_str(&mut self, text: &str, source_name: &str) -> IniResult<()> {
        let parsed = parser::parse(text, source_name, &self.options)?;
        let section_count = parsed.sections.len();
        self.defaults.extend(parsed.defaults);
        for (section, entries) in parsed.sections {
            self.sections.entry(section).or_default().extend(entries);
        }
        self.sources.push(source_name.to_string());
        tracing::debug!(
            source = source_name,
            sections = section_count,
            "read configuration source"
        );
        Ok(())
    }

    /// Read an INI file
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> IniResult<()> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| IniError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        self.read_str(&text, &path.display().to_string())
    }

    /// Section names in reading order (the default section is not listed)
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Check whether a section exists; always false for the default section
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Check whether an option is available in a section, directly or by fallback
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        let option = option.to_lowercase();
        if self.is_default_section(section) {
            return self.defaults.contains_key(&option);
        }
        match self.sections.get(section) {
            Some(entries) => {
                entries.contains_key(&option) || self.defaults.contains_key(&option)
            }
            None => false,
        }
    }

    /// Option names available in a section, including fallbacks
    pub fn option_names(&self, section: &str) -> IniResult<Vec<String>> {
        Ok(self.raw_items(section)?.into_keys().collect())
    }

    /// Add an empty section
    pub fn add_section(&mut self, section: &str) -> IniResult<()> {
        if self.is_default_section(section) || self.sections.contains_key(section) {
            return Err(IniError::SectionExists {
                section: section.to_string(),
            });
        }
        self.sections.insert(section.to_string(), IndexMap::new());
        Ok(())
    }

    /// Store a value in an existing section (or the default section)
    pub fn set(&mut self, section: &str, option: &str, value: impl Into<String>) -> IniResult<()> {
        let value = value.into();
        let option = option.to_lowercase();
        self.interpolation.before_set(section, &option, &value)?;
        let entries = if self.is_default_section(section) {
            &mut self.defaults
        } else {
            self.sections
                .get_mut(section)
                .ok_or_else(|| IniError::no_section(section))?
        };
        entries.insert(option, value);
        Ok(())
    }

    /// Raw items of a section merged over the defaults
    pub fn raw_items(&self, section: &str) -> IniResult<IndexMap<String, String>> {
        let mut merged = self.defaults.clone();
        if !self.is_default_section(section) {
            let entries = self
                .sections
                .get(section)
                .ok_or_else(|| IniError::no_section(section))?;
            merged.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Ok(merged)
    }

    /// Interpolated items of a section merged over the defaults
    pub fn items(&self, section: &str) -> IniResult<Vec<(String, String)>> {
        let vars = self.raw_items(section)?;
        vars.iter()
            .map(|(name, value)| {
                self.interpolation
                    .before_get(self, section, name, value, &vars)
                    .map(|expanded| (name.clone(), expanded))
            })
            .collect()
    }

    /// Value as written, without interpolation
    pub fn get_raw(&self, section: &str, option: &str) -> IniResult<String> {
        let option = option.to_lowercase();
        if !self.is_default_section(section)
            && let Some(entries) = self.sections.get(section)
            && let Some(value) = entries.get(&option)
        {
            return Ok(value.clone());
        }
        if !self.is_default_section(section) && !self.sections.contains_key(section) {
            return Err(IniError::no_section(section));
        }
        self.defaults
            .get(&option)
            .cloned()
            .ok_or_else(|| IniError::no_option(section, option))
    }

    /// Interpolated value
    pub fn get(&self, section: &str, option: &str) -> IniResult<String> {
        let raw = self.get_raw(section, option)?;
        let vars = self.raw_items(section)?;
        self.interpolation
            .before_get(self, section, &option.to_lowercase(), &raw, &vars)
    }

    /// Value parsed as a signed integer
    pub fn get_i64(&self, section: &str, option: &str) -> IniResult<i64> {
        let value = self.get(section, option)?;
        value.trim().parse().map_err(|_| {
            IniError::invalid_value(
                section,
                option,
                format!("invalid literal for int() with base 10: '{value}'"),
            )
        })
    }

    /// Value parsed as a float
    pub fn get_f64(&self, section: &str, option: &str) -> IniResult<f64> {
        let value = self.get(section, option)?;
        value.trim().parse().map_err(|_| {
            IniError::invalid_value(
                section,
                option,
                format!("could not convert string to float: '{value}'"),
            )
        })
    }

    /// Value parsed with the shared yes/no literal set
    pub fn get_bool(&self, section: &str, option: &str) -> IniResult<bool> {
        let value = self.get(section, option)?;
        strata_convert::parse_bool(&value)
            .map_err(|_| IniError::invalid_value(section, option, format!("Not a boolean: {value}")))
    }
}
