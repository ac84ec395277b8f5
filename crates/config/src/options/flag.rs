//! Bit flag kind and member decomposition

use std::fmt;
use std::marker::PhantomData;

use bitflags::Flags;
use strata_message::TaggedValue;

use crate::core::error::{ConfigError, ConfigResult};
use crate::core::option::short_type_name;
use crate::options::scalar::{OptionKind, ScalarOption};

/// One named member covering part of a flag value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagPart<'a> {
    /// Member name
    pub name: &'a str,
    /// Member bits
    pub bits: u64,
}

/// Cover `value` with named members
///
/// Returns the members whose bits are all set in `value`, highest first,
/// and the bits no member covers. A member equal to the whole value is
/// dropped when smaller members already cover it.
///
/// ```
/// use strata_config::options::decompose;
///
/// let members = [("ONE", 1), ("TWO", 2), ("BOTH", 3)];
/// let (parts, uncovered) = decompose(&members, 3 | 8);
/// let names: Vec<_> = parts.iter().map(|part| part.name).collect();
/// assert_eq!(names, ["BOTH", "TWO", "ONE"]);
/// assert_eq!(uncovered, 8);
/// ```
pub fn decompose<'a>(members: &[(&'a str, u64)], value: u64) -> (Vec<FlagPart<'a>>, u64) {
    let mut uncovered = value;
    let mut parts: Vec<FlagPart<'a>> = members
        .iter()
        .filter(|(_, bits)| *bits != 0 && bits & value == *bits)
        .map(|&(name, bits)| FlagPart { name, bits })
        .collect();
    for part in &parts {
        uncovered &= !part.bits;
    }
    if parts.is_empty()
        && let Some(&(name, bits)) = members.iter().find(|(_, bits)| *bits == value)
    {
        parts.push(FlagPart { name, bits });
    }
    parts.sort_by(|a, b| b.bits.cmp(&a.bits));
    if parts.len() > 1 && parts[0].bits == value {
        parts.remove(0);
    }
    (parts, uncovered)
}

fn named_members<F: Flags<Bits = u64>>() -> Vec<(&'static str, u64)> {
    F::FLAGS
        .iter()
        .filter(|flag| !flag.name().is_empty())
        .map(|flag| (flag.name(), flag.value().bits()))
        .collect()
}

/// Set of bit flags drawn from an allowed subset of named members
pub struct FlagKind<F> {
    allowed: Vec<(&'static str, u64)>,
    marker: PhantomData<fn() -> F>,
}

impl<F: Flags<Bits = u64>> Default for FlagKind<F> {
    fn default() -> Self {
        Self {
            allowed: named_members::<F>(),
            marker: PhantomData,
        }
    }
}

impl<F> fmt::Debug for FlagKind<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagKind")
            .field("type", &std::any::type_name::<F>())
            .field("allowed", &self.allowed)
            .finish()
    }
}

impl<F: Flags<Bits = u64>> FlagKind<F> {
    fn illegal(option: &str, value: impl fmt::Display) -> ConfigError {
        ConfigError::value(format!("Illegal value '{value}' for flag option '{option}'"))
    }

    fn describe(bits: u64) -> String {
        let members = named_members::<F>();
        if let Some((name, _)) = members.iter().find(|(_, member)| *member == bits) {
            return (*name).to_string();
        }
        let (mut parts, _) = decompose(&members, bits);
        parts.reverse();
        parts
            .iter()
            .map(|part| part.name)
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl<F> OptionKind for FlagKind<F>
where
    F: Flags<Bits = u64> + Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    type Value = F;

    fn type_name(&self) -> String {
        short_type_name(std::any::type_name::<F>())
    }

    fn value_description(&self) -> String {
        let names: Vec<String> = self
            .allowed
            .iter()
            .map(|(name, _)| name.to_lowercase())
            .collect();
        format!("flag [{}]", names.join(", "))
    }

    fn check(&self, option: &str, value: &F) -> ConfigResult<()> {
        let (_, uncovered) = decompose(&self.allowed, value.bits());
        if uncovered != 0 {
            return Err(Self::illegal(option, Self::describe(value.bits())));
        }
        Ok(())
    }

    fn parse(&self, option: &str, text: &str) -> ConfigResult<F> {
        if text.trim().is_empty() {
            return Ok(F::empty());
        }
        let separator = if text.contains('|') { '|' } else { ',' };
        let mut bits = 0_u64;
        for name in text.split(separator).map(|name| name.trim().to_lowercase()) {
            let member = self
                .allowed
                .iter()
                .find(|(member, _)| member.to_lowercase() == name)
                .ok_or_else(|| Self::illegal(option, &name))?;
            bits |= member.1;
        }
        Ok(F::from_bits_retain(bits))
    }

    fn to_str(&self, value: &F) -> String {
        Self::describe(value.bits())
    }

    fn format(&self, value: &F) -> String {
        Self::describe(value.bits()).to_lowercase()
    }

    fn to_tagged(&self, value: &F) -> TaggedValue {
        TaggedValue::Uint64(value.bits())
    }

    fn from_tagged(&self, option: &str, value: &TaggedValue) -> ConfigResult<F> {
        match value {
            TaggedValue::Uint64(bits) => Ok(F::from_bits_retain(*bits)),
            TaggedValue::String(text) => self.parse(option, text),
            other => Err(ConfigError::wrong_value_type(other.kind())),
        }
    }
}

impl<F> ScalarOption<FlagKind<F>>
where
    F: Flags<Bits = u64> + Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    /// Restrict the accepted members
    ///
    /// Only named members of `F` are kept.
    #[must_use]
    pub fn with_allowed(mut self, allowed: impl IntoIterator<Item = F>) -> Self {
        let wanted: Vec<u64> = allowed.into_iter().map(|flag| flag.bits()).collect();
        self.kind_mut().allowed = named_members::<F>()
            .into_iter()
            .filter(|(_, bits)| wanted.contains(bits))
            .collect();
        self
    }
}

/// Bit flag option
pub type FlagOption<F> = ScalarOption<FlagKind<F>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::option::ConfigOption;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use strata_ini::IniSource;

    bitflags::bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct Numbers: u64 {
            const ONE = 1;
            const TWO = 2;
            const THREE = 4;
        }
    }

    const MEMBERS: [(&str, u64); 3] = [("ONE", 1), ("TWO", 2), ("THREE", 4)];

    #[test]
    fn composite_value_prints_ascending() {
        let mut opt = FlagOption::<Numbers>::new("numbers", "Numbers");
        opt.set_as_str("one, two").unwrap();
        assert_eq!(opt.value(), Some(&(Numbers::ONE | Numbers::TWO)));
        assert_eq!(opt.get_as_str(), "ONE|TWO");
        assert_eq!(opt.get_formatted(), "one|two");
    }

    #[test]
    fn pipe_separator_is_accepted() {
        let mut opt = FlagOption::<Numbers>::new("numbers", "Numbers");
        opt.set_as_str("THREE | one").unwrap();
        assert_eq!(opt.value(), Some(&(Numbers::ONE | Numbers::THREE)));
        assert_eq!(opt.get_as_str(), "ONE|THREE");
    }

    #[test]
    fn single_member_prints_name() {
        let mut opt = FlagOption::<Numbers>::new("numbers", "Numbers");
        opt.set_value(Some(Numbers::TWO)).unwrap();
        assert_eq!(opt.get_as_str(), "TWO");
    }

    #[test]
    fn unknown_name_is_named_in_error() {
        let mut opt = FlagOption::<Numbers>::new("numbers", "Numbers");
        let err = opt.set_as_str("one, illegal").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(
            err.to_string(),
            "Illegal value 'illegal' for flag option 'numbers'"
        );
    }

    #[test]
    fn disallowed_member_is_rejected() {
        let mut opt = FlagOption::<Numbers>::new("numbers", "Numbers")
            .with_allowed([Numbers::ONE, Numbers::TWO]);
        assert_eq!(opt.value_description(), "flag [one, two]");
        assert!(opt.set_value(Some(Numbers::ONE | Numbers::TWO)).is_ok());
        let err = opt.set_value(Some(Numbers::ONE | Numbers::THREE)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Illegal value 'ONE|THREE' for flag option 'numbers'"
        );
        assert!(opt.set_as_str("three").is_err());
    }

    #[test]
    fn unnamed_bits_are_rejected() {
        let mut opt = FlagOption::<Numbers>::new("numbers", "Numbers");
        assert!(opt.set_value(Some(Numbers::from_bits_retain(8))).is_err());
    }

    #[test]
    fn empty_value_survives_text() {
        let mut opt = FlagOption::<Numbers>::new("numbers", "Numbers");
        opt.set_value(Some(Numbers::empty())).unwrap();
        assert_eq!(opt.get_formatted(), "");
        assert!(opt.get_config(true).ends_with("numbers = \n"));

        let source = IniSource::from_text(&format!("[s]\n{}", opt.get_config(true))).unwrap();
        let mut fresh = FlagOption::<Numbers>::new("numbers", "Numbers");
        fresh.load_config(&source, "s").unwrap();
        assert_eq!(fresh.value(), Some(&Numbers::empty()));
        fresh.set_as_str("  ").unwrap();
        assert_eq!(fresh.value(), Some(&Numbers::empty()));
    }

    #[test]
    fn decompose_named_value_without_bits() {
        let members = [("NONE", 0), ("ONE", 1)];
        let (parts, uncovered) = decompose(&members, 0);
        assert_eq!(parts, vec![FlagPart { name: "NONE", bits: 0 }]);
        assert_eq!(uncovered, 0);
    }

    proptest! {
        #[test]
        fn decompose_covers_every_named_bit(value in 0_u64..16) {
            let (parts, uncovered) = decompose(&MEMBERS, value);
            let covered = parts.iter().fold(0, |acc, part| acc | part.bits);
            prop_assert_eq!(covered | uncovered, value);
            prop_assert_eq!(uncovered, value & 8);
        }
    }
}
