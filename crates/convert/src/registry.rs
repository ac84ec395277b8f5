//! Global registry of string convertors
//!
//! The registry maps a Rust type to a pair of type-erased functions that
//! render a value as text and parse it back. Types can be looked up by
//! [`TypeId`], by their simple name (`int`, `UUID`, ...) or by their fully
//! qualified Rust path, and extra names can be attached as aliases.

use crate::convertible::Convertible;
use crate::error::{ConvertError, ConvertResult};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;
use uuid::Uuid;

/// Type-erased to/from string functions for one registered type.
#[derive(Debug, Clone, Copy)]
pub struct Convertor {
    type_id: TypeId,
    type_name: &'static str,
    qualified_name: &'static str,
    to_str: fn(&dyn Any) -> Option<String>,
    from_str: fn(&str) -> ConvertResult<Box<dyn Any + Send>>,
}

fn erased_to_str<T: Convertible>(value: &dyn Any) -> Option<String> {
    value.downcast_ref::<T>().map(T::to_config_string)
}

fn erased_from_str<T: Convertible>(text: &str) -> ConvertResult<Box<dyn Any + Send>> {
    T::from_config_string(text).map(|value| Box::new(value) as Box<dyn Any + Send>)
}

impl Convertor {
    /// Build the convertor for a [`Convertible`] type
    pub fn of<T: Convertible>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: T::TYPE_NAME,
            qualified_name: std::any::type_name::<T>(),
            to_str: erased_to_str::<T>,
            from_str: erased_from_str::<T>,
        }
    }

    /// Type handled by this convertor
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Simple type name
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Fully qualified Rust type path
    pub fn qualified_name(&self) -> &'static str {
        self.qualified_name
    }

    /// Render a value; fails if the value is not of the handled type
    pub fn to_string(&self, value: &dyn Any) -> ConvertResult<String> {
        (self.to_str)(value)
            .ok_or_else(|| ConvertError::type_mismatch(self.type_name, "unknown type"))
    }

    /// Parse text into a boxed value of the handled type
    pub fn from_string(&self, text: &str) -> ConvertResult<Box<dyn Any + Send>> {
        (self.from_str)(text)
    }
}

/// Collection of convertors keyed by type, with name lookup.
#[derive(Debug, Default)]
pub struct ConvertorRegistry {
    by_type: HashMap<TypeId, Convertor>,
    by_name: HashMap<String, TypeId>,
}

impl ConvertorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the built-in value types
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<String>();
        registry.register::<bool>();
        registry.register::<i64>();
        registry.register::<i32>();
        registry.register::<i16>();
        registry.register::<i8>();
        registry.register::<u64>();
        registry.register::<u32>();
        registry.register::<u16>();
        registry.register::<u8>();
        registry.register::<f64>();
        registry.register::<f32>();
        registry.register::<Decimal>();
        registry.register::<Uuid>();
        registry.register::<PathBuf>();
        registry
    }

    /// Register (or replace) the convertor for `T`
    ///
    /// Both the simple and the qualified type name become lookup keys.
    pub fn register<T: Convertible>(&mut self) {
        let convertor = Convertor::of::<T>();
        self.by_name
            .insert(convertor.type_name.to_string(), convertor.type_id);
        self.by_name
            .insert(convertor.qualified_name.to_string(), convertor.type_id);
        self.by_type.insert(convertor.type_id, convertor);
    }

    /// Attach an additional lookup name to an already registered type
    pub fn register_alias(&mut self, alias: impl Into<String>, target: &str) -> ConvertResult<()> {
        let type_id = self
            .by_name
            .get(target)
            .copied()
            .ok_or_else(|| ConvertError::unregistered(target))?;
        self.by_name.insert(alias.into(), type_id);
        Ok(())
    }

    /// Check whether `T` has a convertor
    pub fn contains<T: 'static>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    /// Check whether a type name (simple, qualified or alias) is known
    pub fn has_convertor(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Look up the convertor for a type id
    pub fn get_by_type(&self, type_id: TypeId) -> Option<&Convertor> {
        self.by_type.get(&type_id)
    }

    /// Look up the convertor by simple, qualified or alias name
    pub fn get_by_name(&self, name: &str) -> Option<&Convertor> {
        self.by_name
            .get(name)
            .and_then(|type_id| self.by_type.get(type_id))
    }

    /// Render a type-erased value
    pub fn to_string_dyn(&self, value: &dyn Any) -> ConvertResult<String> {
        let convertor = self
            .get_by_type(value.type_id())
            .ok_or_else(|| ConvertError::unregistered(format!("{:?}", value.type_id())))?;
        convertor.to_string(value)
    }

    /// Render a typed value
    pub fn to_string<T: 'static>(&self, value: &T) -> ConvertResult<String> {
        let convertor = self
            .get_by_type(TypeId::of::<T>())
            .ok_or_else(|| ConvertError::unregistered(std::any::type_name::<T>()))?;
        convertor.to_string(value)
    }

    /// Parse text for a type given by name
    pub fn from_string_by_name(
        &self,
        name: &str,
        text: &str,
    ) -> ConvertResult<Box<dyn Any + Send>> {
        let convertor = self
            .get_by_name(name)
            .ok_or_else(|| ConvertError::unregistered(name))?;
        convertor.from_string(text)
    }

    /// Parse text into a typed value
    pub fn from_string<T: 'static>(&self, text: &str) -> ConvertResult<T> {
        let name = std::any::type_name::<T>();
        let convertor = self
            .get_by_type(TypeId::of::<T>())
            .ok_or_else(|| ConvertError::unregistered(name))?;
        let boxed: Box<dyn Any> = convertor.from_string(text)?;
        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| ConvertError::type_mismatch(name, convertor.type_name))
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// Check whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

/// Global static registry instance
static REGISTRY: LazyLock<RwLock<ConvertorRegistry>> =
    LazyLock::new(|| RwLock::new(ConvertorRegistry::with_builtins()));

/// Process-wide convertor registry, pre-populated with built-ins
pub fn global() -> &'static RwLock<ConvertorRegistry> {
    &REGISTRY
}

/// Register a type in the global registry
pub fn register<T: Convertible>() {
    REGISTRY.write().register::<T>();
}

/// Check whether the global registry knows a type name
pub fn has_convertor(name: &str) -> bool {
    REGISTRY.read().has_convertor(name)
}

/// Render a value through the global registry
pub fn convert_to_str<T: 'static>(value: &T) -> ConvertResult<String> {
    REGISTRY.read().to_string(value)
}

/// Parse a value through the global registry
pub fn convert_from_str<T: 'static>(text: &str) -> ConvertResult<T> {
    REGISTRY.read().from_string(text)
}
