//! Value substitution strategies
//!
//! Interpolation runs when a value is read through [`IniSource::get`].
//! [`ExtendedInterpolation`] resolves `${key}` against the current section
//! and `${section:key}` against any section. [`EnvExtendedInterpolation`]
//! adds the reserved `env` section, resolved from the process environment.

use crate::error::{IniError, IniResult};
use crate::source::IniSource;
use indexmap::IndexMap;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Maximum nesting of substitutions before giving up.
pub const MAX_INTERPOLATION_DEPTH: usize = 10;

/// Pseudo-section name resolved from environment variables.
pub const ENV_SECTION: &str = "env";

static REFERENCE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\$\{([^}]+)\}").ok());
static ANY_REFERENCE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\$\{[^}]+\}").ok());

/// Strategy applied to values read from or written to an [`IniSource`].
pub trait Interpolation: fmt::Debug + Send + Sync {
    /// Expand `value` of `section`/`option`; `vars` holds the section's raw items
    fn before_get(
        &self,
        source: &IniSource,
        section: &str,
        option: &str,
        value: &str,
        vars: &IndexMap<String, String>,
    ) -> IniResult<String>;

    /// Check a value before it is stored
    fn before_set(&self, _section: &str, _option: &str, _value: &str) -> IniResult<()> {
        Ok(())
    }
}

/// Values are returned exactly as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInterpolation;

impl Interpolation for NoInterpolation {
    fn before_get(
        &self,
        _source: &IniSource,
        _section: &str,
        _option: &str,
        value: &str,
        _vars: &IndexMap<String, String>,
    ) -> IniResult<String> {
        Ok(value.to_string())
    }
}

/// `${key}` and `${section:key}` substitution with `$$` as escape.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedInterpolation;

impl Interpolation for ExtendedInterpolation {
    fn before_get(
        &self,
        source: &IniSource,
        section: &str,
        option: &str,
        value: &str,
        vars: &IndexMap<String, String>,
    ) -> IniResult<String> {
        Expander { env: false }.expand(source, section, option, value, vars)
    }

    fn before_set(&self, section: &str, option: &str, value: &str) -> IniResult<()> {
        check_syntax(section, option, value)
    }
}

/// [`ExtendedInterpolation`] plus `${env:VAR}` from the process environment.
///
/// The variable name is upper-cased; an unset variable expands to an empty
/// string. Environment values are inserted verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvExtendedInterpolation;

impl Interpolation for EnvExtendedInterpolation {
    fn before_get(
        &self,
        source: &IniSource,
        section: &str,
        option: &str,
        value: &str,
        vars: &IndexMap<String, String>,
    ) -> IniResult<String> {
        Expander { env: true }.expand(source, section, option, value, vars)
    }

    fn before_set(&self, section: &str, option: &str, value: &str) -> IniResult<()> {
        check_syntax(section, option, value)
    }
}

fn check_syntax(section: &str, option: &str, value: &str) -> IniResult<()> {
    let without_escapes = value.replace("$$", "");
    let stripped = match ANY_REFERENCE.as_ref() {
        Some(pattern) => pattern.replace_all(&without_escapes, "").into_owned(),
        None => without_escapes,
    };
    if let Some(position) = stripped.find('$') {
        return Err(IniError::interpolation_syntax(
            section,
            option,
            format!("invalid interpolation syntax in '{value}' at position {position}"),
        ));
    }
    Ok(())
}

struct Expander {
    env: bool,
}

impl Expander {
    fn expand(
        &self,
        source: &IniSource,
        section: &str,
        option: &str,
        value: &str,
        vars: &IndexMap<String, String>,
    ) -> IniResult<String> {
        let mut accum = String::with_capacity(value.len());
        self.expand_into(source, &mut accum, section, option, value, vars, 1)?;
        Ok(accum)
    }

    #[allow(clippy::too_many_arguments)]
    fn expand_into(
        &self,
        source: &IniSource,
        accum: &mut String,
        section: &str,
        option: &str,
        value: &str,
        vars: &IndexMap<String, String>,
        depth: usize,
    ) -> IniResult<()> {
        let raw_value = || {
            source
                .get_raw(section, option)
                .unwrap_or_else(|_| value.to_string())
        };
        if depth > MAX_INTERPOLATION_DEPTH {
            return Err(IniError::InterpolationDepth {
                section: section.to_string(),
                option: option.to_string(),
                raw_value: raw_value(),
                max_depth: MAX_INTERPOLATION_DEPTH,
            });
        }

        let mut rest = value;
        while !rest.is_empty() {
            let Some(position) = rest.find('$') else {
                accum.push_str(rest);
                return Ok(());
            };
            accum.push_str(&rest[..position]);
            rest = &rest[position..];

            match rest[1..].chars().next() {
                Some('$') => {
                    accum.push('$');
                    rest = &rest[2..];
                }
                Some('{') => {
                    let captures = REFERENCE.as_ref().and_then(|pattern| pattern.captures(rest));
                    let Some(captures) = captures else {
                        return Err(IniError::interpolation_syntax(
                            section,
                            option,
                            format!("bad interpolation variable reference '{rest}'"),
                        ));
                    };
                    let whole = captures.get(0).map_or(0, |m| m.end());
                    let reference = captures.get(1).map_or("", |m| m.as_str());
                    rest = &rest[whole..];

                    let path: Vec<&str> = reference.split(':').collect();
                    let missing = || IniError::InterpolationMissingOption {
                        section: section.to_string(),
                        option: option.to_string(),
                        raw_value: raw_value(),
                        reference: reference.to_string(),
                    };

                    match path.as_slice() {
                        [key] => {
                            let key = key.to_lowercase();
                            let resolved = vars.get(&key).ok_or_else(missing)?;
                            if resolved.contains('$') {
                                self.expand_into(
                                    source,
                                    accum,
                                    section,
                                    &key,
                                    resolved,
                                    vars,
                                    depth + 1,
                                )?;
                            } else {
                                accum.push_str(resolved);
                            }
                        }
                        [target_section, key] => {
                            let key = key.to_lowercase();
                            if self.env && *target_section == ENV_SECTION {
                                let resolved =
                                    std::env::var(key.to_uppercase()).unwrap_or_default();
                                accum.push_str(&resolved);
                                continue;
                            }
                            let resolved = source
                                .get_raw(target_section, &key)
                                .map_err(|_| missing())?;
                            if resolved.contains('$') {
                                let target_vars = source
                                    .raw_items(target_section)
                                    .map_err(|_| missing())?;
                                self.expand_into(
                                    source,
                                    accum,
                                    target_section,
                                    &key,
                                    &resolved,
                                    &target_vars,
                                    depth + 1,
                                )?;
                            } else {
                                accum.push_str(&resolved);
                            }
                        }
                        _ => {
                            return Err(IniError::interpolation_syntax(
                                section,
                                option,
                                format!("More than one ':' found: '${{{reference}}}'"),
                            ));
                        }
                    }
                }
                _ => {
                    return Err(IniError::interpolation_syntax(
                        section,
                        option,
                        format!("'$' must be followed by '$' or '{{', found: '{rest}'"),
                    ));
                }
            }
        }
        Ok(())
    }
}
