//! Property keys, attribute flags, and property descriptors (ECMAScript §6.2.6).
//!
//! Two descriptor shapes exist:
//!
//! * [`PropertyDescriptor`]: the **complete** form.  Every descriptor read
//!   back from an object's storage has all of its fields populated.
//! * [`PartialDescriptor`]: the **input** form accepted by
//!   `[[DefineOwnProperty]]`, in which every field is optional.  Which
//!   fields are present decides whether it is a data, accessor, or generic
//!   descriptor.

use std::fmt;

use bitflags::bitflags;

use crate::object_ops::same_object;
use crate::objects::heap_object::ObjectRef;
use crate::objects::value::JsValue;

// ──────────────────────────────────────────────────────────────────────────────
// PropertyKey
// ──────────────────────────────────────────────────────────────────────────────

/// A property key: either a string or a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// String key (array indices are canonical numeric strings).
    String(String),
    /// Symbol key, identified by the symbol's descriptor.
    Symbol(u64),
}

impl PropertyKey {
    /// Returns the numeric value if this key is an array index
    /// (a canonical decimal string for an integer below `2³² − 1`).
    pub fn array_index(&self) -> Option<u32> {
        let Self::String(s) = self else {
            return None;
        };
        if s.is_empty() || (s.len() > 1 && s.starts_with('0')) {
            return None;
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse::<u32>().ok().filter(|&n| n != u32::MAX)
    }

    /// Converts this key to the value passed to trap functions.
    pub fn to_value(&self) -> JsValue {
        match self {
            Self::String(s) => JsValue::String(s.clone()),
            Self::Symbol(id) => JsValue::Symbol(*id),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Symbol(id) => write!(f, "Symbol({id})"),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<u32> for PropertyKey {
    fn from(index: u32) -> Self {
        Self::String(index.to_string())
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// PropertyAttributes
// ──────────────────────────────────────────────────────────────────────────────

bitflags! {
    /// Attribute bits stored alongside every own property.
    ///
    /// `WRITABLE` is meaningless for accessor properties and is kept clear
    /// for them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyAttributes: u8 {
        /// `[[Writable]]`, data properties only.
        const WRITABLE = 1 << 0;
        /// `[[Enumerable]]`.
        const ENUMERABLE = 1 << 1;
        /// `[[Configurable]]`.
        const CONFIGURABLE = 1 << 2;
    }
}

impl PropertyAttributes {
    /// The attributes `CreateDataProperty` uses: writable, enumerable,
    /// configurable.
    pub const DEFAULT: Self = Self::all();
}

// ──────────────────────────────────────────────────────────────────────────────
// PropertyDescriptor (complete)
// ──────────────────────────────────────────────────────────────────────────────

/// The value-carrying half of a complete descriptor.
#[derive(Debug, Clone)]
pub enum PropertyKind {
    /// `{ [[Value]], [[Writable]] }`.
    Data {
        /// `[[Value]]`.
        value: JsValue,
        /// `[[Writable]]`.
        writable: bool,
    },
    /// `{ [[Get]], [[Set]] }`; `None` is `undefined`.
    Accessor {
        /// `[[Get]]`.
        get: Option<ObjectRef>,
        /// `[[Set]]`.
        set: Option<ObjectRef>,
    },
}

/// A fully populated property descriptor.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// Data or accessor payload.
    pub kind: PropertyKind,
    /// `[[Enumerable]]`.
    pub enumerable: bool,
    /// `[[Configurable]]`.
    pub configurable: bool,
}

impl PropertyDescriptor {
    /// Creates a data descriptor from a value and attribute flags.
    pub fn data(value: JsValue, attributes: PropertyAttributes) -> Self {
        Self {
            kind: PropertyKind::Data {
                value,
                writable: attributes.contains(PropertyAttributes::WRITABLE),
            },
            enumerable: attributes.contains(PropertyAttributes::ENUMERABLE),
            configurable: attributes.contains(PropertyAttributes::CONFIGURABLE),
        }
    }

    /// Creates an accessor descriptor; `WRITABLE` in `attributes` is ignored.
    pub fn accessor(
        get: Option<ObjectRef>,
        set: Option<ObjectRef>,
        attributes: PropertyAttributes,
    ) -> Self {
        Self {
            kind: PropertyKind::Accessor { get, set },
            enumerable: attributes.contains(PropertyAttributes::ENUMERABLE),
            configurable: attributes.contains(PropertyAttributes::CONFIGURABLE),
        }
    }

    /// Returns `true` for `{ value, writable }` descriptors.
    pub fn is_data(&self) -> bool {
        matches!(self.kind, PropertyKind::Data { .. })
    }

    /// Returns `true` for `{ get, set }` descriptors.
    pub fn is_accessor(&self) -> bool {
        matches!(self.kind, PropertyKind::Accessor { .. })
    }

    /// Returns the value of a data descriptor.
    pub fn value(&self) -> Option<&JsValue> {
        match &self.kind {
            PropertyKind::Data { value, .. } => Some(value),
            PropertyKind::Accessor { .. } => None,
        }
    }

    /// Returns `[[Writable]]` for data descriptors and `false` for accessors.
    pub fn is_writable(&self) -> bool {
        matches!(self.kind, PropertyKind::Data { writable: true, .. })
    }

    /// Returns the attribute bits of this descriptor.
    pub fn attributes(&self) -> PropertyAttributes {
        let mut attributes = PropertyAttributes::empty();
        attributes.set(PropertyAttributes::WRITABLE, self.is_writable());
        attributes.set(PropertyAttributes::ENUMERABLE, self.enumerable);
        attributes.set(PropertyAttributes::CONFIGURABLE, self.configurable);
        attributes
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// PartialDescriptor (input)
// ──────────────────────────────────────────────────────────────────────────────

/// A property descriptor whose fields may be absent.
///
/// `get` and `set` are doubly optional: the outer `Option` records whether
/// the field is present, the inner one whether it holds a function or
/// `undefined`.
#[derive(Debug, Clone, Default)]
pub struct PartialDescriptor {
    /// `[[Value]]`.
    pub value: Option<JsValue>,
    /// `[[Writable]]`.
    pub writable: Option<bool>,
    /// `[[Get]]`; `Some(None)` is an explicit `undefined` getter.
    pub get: Option<Option<ObjectRef>>,
    /// `[[Set]]`; `Some(None)` is an explicit `undefined` setter.
    pub set: Option<Option<ObjectRef>>,
    /// `[[Enumerable]]`.
    pub enumerable: Option<bool>,
    /// `[[Configurable]]`.
    pub configurable: Option<bool>,
}

impl PartialDescriptor {
    /// An empty (generic) descriptor, as produced by `{}`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `[[Value]]`.
    pub fn with_value(mut self, value: impl Into<JsValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets `[[Writable]]`.
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    /// Sets `[[Get]]`; `None` stores `undefined`.
    pub fn with_get(mut self, get: Option<ObjectRef>) -> Self {
        self.get = Some(get);
        self
    }

    /// Sets `[[Set]]`; `None` stores `undefined`.
    pub fn with_set(mut self, set: Option<ObjectRef>) -> Self {
        self.set = Some(set);
        self
    }

    /// Sets `[[Enumerable]]`.
    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    /// Sets `[[Configurable]]`.
    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }

    /// IsDataDescriptor (§6.2.6.2).
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// IsAccessorDescriptor (§6.2.6.1).
    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// IsGenericDescriptor (§6.2.6.3).
    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_data_descriptor() && !self.is_accessor_descriptor()
    }

    /// Returns `true` when no field is present.
    pub fn is_empty(&self) -> bool {
        self.is_generic_descriptor() && self.enumerable.is_none() && self.configurable.is_none()
    }

    /// CompletePropertyDescriptor (§6.2.6.6): fills absent fields with their
    /// defaults (`undefined` / `false`).
    pub fn complete(&self) -> PropertyDescriptor {
        let kind = if self.is_accessor_descriptor() {
            PropertyKind::Accessor {
                get: self.get.clone().flatten(),
                set: self.set.clone().flatten(),
            }
        } else {
            PropertyKind::Data {
                value: self.value.clone().unwrap_or(JsValue::Undefined),
                writable: self.writable.unwrap_or(false),
            }
        };
        PropertyDescriptor {
            kind,
            enumerable: self.enumerable.unwrap_or(false),
            configurable: self.configurable.unwrap_or(false),
        }
    }
}

impl From<PropertyDescriptor> for PartialDescriptor {
    fn from(desc: PropertyDescriptor) -> Self {
        let mut partial = Self {
            enumerable: Some(desc.enumerable),
            configurable: Some(desc.configurable),
            ..Self::default()
        };
        match desc.kind {
            PropertyKind::Data { value, writable } => {
                partial.value = Some(value);
                partial.writable = Some(writable);
            }
            PropertyKind::Accessor { get, set } => {
                partial.get = Some(get);
                partial.set = Some(set);
            }
        }
        partial
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Descriptor compatibility (ECMAScript §10.1.6.3)
// ──────────────────────────────────────────────────────────────────────────────

/// The validation half of **ValidateAndApplyPropertyDescriptor**: decides
/// whether `desc` may be applied over `current` on an object whose
/// `[[Extensible]]` slot is `extensible`.
///
/// This is also **IsCompatiblePropertyDescriptor** (§10.1.6.2), which the
/// Proxy validators use to compare trap results against the target.
pub fn is_compatible_property_descriptor(
    extensible: bool,
    desc: &PartialDescriptor,
    current: Option<&PropertyDescriptor>,
) -> bool {
    let Some(current) = current else {
        return extensible;
    };
    if desc.is_empty() || current.configurable {
        return true;
    }
    if desc.configurable == Some(true) {
        return false;
    }
    if desc.enumerable.is_some_and(|e| e != current.enumerable) {
        return false;
    }
    if !desc.is_generic_descriptor() && desc.is_accessor_descriptor() != current.is_accessor() {
        return false;
    }
    match &current.kind {
        PropertyKind::Accessor { get, set } => {
            if desc.get.as_ref().is_some_and(|g| !same_object(g, get)) {
                return false;
            }
            if desc.set.as_ref().is_some_and(|s| !same_object(s, set)) {
                return false;
            }
        }
        PropertyKind::Data {
            value,
            writable: false,
        } => {
            if desc.writable == Some(true) {
                return false;
            }
            if desc.value.as_ref().is_some_and(|v| !v.same_value(value)) {
                return false;
            }
        }
        PropertyKind::Data { writable: true, .. } => {}
    }
    true
}

/// The application half of **ValidateAndApplyPropertyDescriptor**: merges
/// `desc` into `current` (or builds a fresh property when `current` is
/// absent).  Callers must have checked
/// [`is_compatible_property_descriptor`] first.
pub(crate) fn apply_property_descriptor(
    desc: &PartialDescriptor,
    current: Option<PropertyDescriptor>,
) -> PropertyDescriptor {
    let Some(current) = current else {
        return desc.complete();
    };
    let enumerable = desc.enumerable.unwrap_or(current.enumerable);
    let configurable = desc.configurable.unwrap_or(current.configurable);
    let kind = match current.kind {
        PropertyKind::Data { .. } if desc.is_accessor_descriptor() => PropertyKind::Accessor {
            get: desc.get.clone().flatten(),
            set: desc.set.clone().flatten(),
        },
        PropertyKind::Accessor { .. } if desc.is_data_descriptor() => PropertyKind::Data {
            value: desc.value.clone().unwrap_or(JsValue::Undefined),
            writable: desc.writable.unwrap_or(false),
        },
        PropertyKind::Data { value, writable } => PropertyKind::Data {
            value: desc.value.clone().unwrap_or(value),
            writable: desc.writable.unwrap_or(writable),
        },
        PropertyKind::Accessor { get, set } => PropertyKind::Accessor {
            get: desc.get.clone().unwrap_or(get),
            set: desc.set.clone().unwrap_or(set),
        },
    };
    PropertyDescriptor {
        kind,
        enumerable,
        configurable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::objects::heap_object::HeapObject;

    fn frozen(value: i32) -> PropertyDescriptor {
        PropertyDescriptor::data(JsValue::Smi(value), PropertyAttributes::empty())
    }

    #[test]
    fn test_array_index_detection() {
        assert_eq!(PropertyKey::from("0").array_index(), Some(0));
        assert_eq!(PropertyKey::from("42").array_index(), Some(42));
        assert_eq!(PropertyKey::from("042").array_index(), None);
        assert_eq!(PropertyKey::from("-1").array_index(), None);
        assert_eq!(PropertyKey::from("4294967295").array_index(), None);
        assert_eq!(PropertyKey::from("foo").array_index(), None);
        assert_eq!(PropertyKey::Symbol(1).array_index(), None);
    }

    #[test]
    fn test_descriptor_attributes_roundtrip() {
        let desc = PropertyDescriptor::data(
            JsValue::Smi(1),
            PropertyAttributes::WRITABLE | PropertyAttributes::CONFIGURABLE,
        );
        assert!(desc.is_writable());
        assert!(!desc.enumerable);
        assert_eq!(
            desc.attributes(),
            PropertyAttributes::WRITABLE | PropertyAttributes::CONFIGURABLE
        );
    }

    #[test]
    fn test_accessor_ignores_writable_bit() {
        let desc = PropertyDescriptor::accessor(None, None, PropertyAttributes::all());
        assert!(desc.is_accessor());
        assert!(!desc.is_writable());
        assert!(!desc.attributes().contains(PropertyAttributes::WRITABLE));
    }

    #[test]
    fn test_partial_descriptor_classification() {
        assert!(PartialDescriptor::new().is_generic_descriptor());
        assert!(PartialDescriptor::new().is_empty());
        assert!(PartialDescriptor::new().with_writable(false).is_data_descriptor());
        assert!(PartialDescriptor::new().with_get(None).is_accessor_descriptor());
        assert!(!PartialDescriptor::new().with_configurable(false).is_empty());
    }

    #[test]
    fn test_complete_fills_defaults() {
        let desc = PartialDescriptor::new().with_enumerable(true).complete();
        assert!(desc.is_data());
        assert_eq!(desc.value(), Some(&JsValue::Undefined));
        assert!(!desc.is_writable());
        assert!(desc.enumerable);
        assert!(!desc.configurable);
    }

    #[test]
    fn test_compatible_absent_depends_on_extensibility() {
        let desc = PartialDescriptor::new().with_value(1);
        assert!(is_compatible_property_descriptor(true, &desc, None));
        assert!(!is_compatible_property_descriptor(false, &desc, None));
    }

    #[test]
    fn test_compatible_frozen_same_value() {
        let current = frozen(10);
        let same = PartialDescriptor::new().with_value(10).with_writable(false);
        let different = PartialDescriptor::new().with_value(8);
        assert!(is_compatible_property_descriptor(true, &same, Some(&current)));
        assert!(!is_compatible_property_descriptor(true, &different, Some(&current)));
    }

    #[test]
    fn test_compatible_rejects_reconfiguring_non_configurable() {
        let current = frozen(1);
        assert!(!is_compatible_property_descriptor(
            true,
            &PartialDescriptor::new().with_configurable(true),
            Some(&current)
        ));
        assert!(!is_compatible_property_descriptor(
            true,
            &PartialDescriptor::new().with_enumerable(true),
            Some(&current)
        ));
        assert!(!is_compatible_property_descriptor(
            true,
            &PartialDescriptor::new().with_get(None),
            Some(&current)
        ));
        assert!(!is_compatible_property_descriptor(
            true,
            &PartialDescriptor::new().with_writable(true),
            Some(&current)
        ));
    }

    #[test]
    fn test_compatible_accessor_identity() {
        let getter = HeapObject::ordinary(None);
        let current =
            PropertyDescriptor::accessor(Some(Rc::clone(&getter)), None, PropertyAttributes::empty());
        let same = PartialDescriptor::new().with_get(Some(Rc::clone(&getter)));
        let other = PartialDescriptor::new().with_get(Some(HeapObject::ordinary(None)));
        assert!(is_compatible_property_descriptor(true, &same, Some(&current)));
        assert!(!is_compatible_property_descriptor(true, &other, Some(&current)));
    }

    #[test]
    fn test_apply_converts_data_to_accessor() {
        let current = PropertyDescriptor::data(JsValue::Smi(1), PropertyAttributes::all());
        let applied = apply_property_descriptor(
            &PartialDescriptor::new().with_get(None),
            Some(current),
        );
        assert!(applied.is_accessor());
        assert!(applied.enumerable);
        assert!(applied.configurable);
    }

    #[test]
    fn test_apply_merges_present_fields_only() {
        let current = PropertyDescriptor::data(JsValue::Smi(1), PropertyAttributes::all());
        let applied =
            apply_property_descriptor(&PartialDescriptor::new().with_value(2), Some(current));
        assert_eq!(applied.value(), Some(&JsValue::Smi(2)));
        assert!(applied.is_writable());
        assert!(applied.configurable);
    }
}
