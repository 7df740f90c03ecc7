//! Property storage for ordinary objects.
//!
//! # Storage model
//!
//! A [`JsObject`] starts life in **fast mode**: own properties are kept in a
//! [`SmallVec`] in insertion order.  When the number of properties exceeds
//! [`MAX_FAST_PROPERTIES`] the object is *normalised* into **slow (dictionary)
//! mode**, where each entry is stored in a [`HashMap`] together with an
//! insertion stamp so that key order survives the transition.
//!
//! # Prototype link
//!
//! The `[[Prototype]]` slot holds an [`ObjectRef`], which may be an ordinary
//! object, a function, or a proxy.  Walking the chain is the job of
//! [`object_ops`][crate::object_ops]: a proxy on the chain has to be entered
//! through its own internal methods, which needs the isolate.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::objects::heap_object::ObjectRef;
use crate::objects::property::{
    PartialDescriptor, PropertyDescriptor, PropertyKey, apply_property_descriptor,
    is_compatible_property_descriptor,
};

/// Number of own properties stored inline before the property store
/// overflows to a [`HashMap`] (slow / dictionary mode).
pub const MAX_FAST_PROPERTIES: usize = 8;

/// An own property in slow (dictionary-mode) storage.
#[derive(Debug, Clone)]
struct SlowProperty {
    descriptor: PropertyDescriptor,
    order: u64,
}

/// Own-property backing store.
#[derive(Debug)]
enum NamedProperties {
    /// Fast mode: `(key, descriptor)` pairs in insertion order.
    Fast(SmallVec<[(PropertyKey, PropertyDescriptor); MAX_FAST_PROPERTIES]>),
    /// Slow (dictionary) mode: insertion order is kept as a monotonic stamp.
    Slow {
        map: HashMap<PropertyKey, SlowProperty>,
        next_order: u64,
    },
}

/// The state of an ordinary object per ECMAScript §10.1: own properties,
/// `[[Prototype]]` and `[[Extensible]]`.
///
/// Every operation here is local to the object and never runs user code,
/// so callers may hold a `RefCell` borrow for its duration.
#[derive(Debug)]
pub struct JsObject {
    properties: NamedProperties,
    prototype: Option<ObjectRef>,
    extensible: bool,
}

impl JsObject {
    /// Creates an empty, extensible object with the given prototype.
    pub fn new(prototype: Option<ObjectRef>) -> Self {
        Self {
            properties: NamedProperties::Fast(SmallVec::new()),
            prototype,
            extensible: true,
        }
    }

    /// Returns `true` if this object is in fast (inline) mode.
    pub fn is_fast_mode(&self) -> bool {
        matches!(self.properties, NamedProperties::Fast(_))
    }

    /// Returns the number of own properties.
    pub fn property_count(&self) -> usize {
        match &self.properties {
            NamedProperties::Fast(entries) => entries.len(),
            NamedProperties::Slow { map, .. } => map.len(),
        }
    }

    // ── [[Prototype]] / [[Extensible]] ────────────────────────────────────────

    /// Returns the `[[Prototype]]` slot.
    pub fn prototype(&self) -> Option<ObjectRef> {
        self.prototype.clone()
    }

    /// Overwrites the `[[Prototype]]` slot without any validation.
    ///
    /// The checked algorithm (extensibility and cycle detection) is
    /// [`object_ops::set_prototype_of`][crate::object_ops::set_prototype_of].
    pub fn set_prototype(&mut self, prototype: Option<ObjectRef>) {
        self.prototype = prototype;
    }

    /// OrdinaryIsExtensible (§10.1.3.1).
    pub fn is_extensible(&self) -> bool {
        self.extensible
    }

    /// OrdinaryPreventExtensions (§10.1.4.1).  Always succeeds.
    pub fn prevent_extensions(&mut self) -> bool {
        self.extensible = false;
        true
    }

    // ── Own properties ────────────────────────────────────────────────────────

    /// OrdinaryGetOwnProperty (§10.1.5.1).
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        match &self.properties {
            NamedProperties::Fast(entries) => entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, desc)| desc.clone()),
            NamedProperties::Slow { map, .. } => map.get(key).map(|p| p.descriptor.clone()),
        }
    }

    /// Returns `true` if `key` is an own property.
    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        match &self.properties {
            NamedProperties::Fast(entries) => entries.iter().any(|(k, _)| k == key),
            NamedProperties::Slow { map, .. } => map.contains_key(key),
        }
    }

    /// OrdinaryDefineOwnProperty (§10.1.6.1) via
    /// ValidateAndApplyPropertyDescriptor (§10.1.6.3).
    ///
    /// Returns `false`, leaving the object untouched, when `desc` is not
    /// compatible with the current property or when adding a new property to
    /// a non-extensible object.
    pub fn define_own_property(&mut self, key: PropertyKey, desc: &PartialDescriptor) -> bool {
        let current = self.get_own_property(&key);
        if !is_compatible_property_descriptor(self.extensible, desc, current.as_ref()) {
            return false;
        }
        let updated = apply_property_descriptor(desc, current);
        self.store(key, updated);
        true
    }

    /// OrdinaryDelete (§10.1.10.1).
    ///
    /// Deleting an absent key succeeds; deleting a non-configurable property
    /// fails and returns `false`.
    pub fn delete(&mut self, key: &PropertyKey) -> bool {
        match self.get_own_property(key) {
            None => true,
            Some(desc) if !desc.configurable => false,
            Some(_) => {
                match &mut self.properties {
                    NamedProperties::Fast(entries) => entries.retain(|(k, _)| k != key),
                    NamedProperties::Slow { map, .. } => {
                        map.remove(key);
                    }
                }
                true
            }
        }
    }

    /// OrdinaryOwnPropertyKeys (§10.1.11.1): array indices in ascending
    /// numeric order, then other strings in insertion order, then symbols in
    /// insertion order.
    pub fn own_property_keys(&self) -> Vec<PropertyKey> {
        let insertion_ordered: Vec<PropertyKey> = match &self.properties {
            NamedProperties::Fast(entries) => entries.iter().map(|(k, _)| k.clone()).collect(),
            NamedProperties::Slow { map, .. } => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by_key(|(_, p)| p.order);
                entries.into_iter().map(|(k, _)| k.clone()).collect()
            }
        };

        let mut indices: Vec<(u32, PropertyKey)> = Vec::new();
        let mut strings = Vec::new();
        let mut symbols = Vec::new();
        for key in insertion_ordered {
            match key.array_index() {
                Some(index) => indices.push((index, key)),
                None if matches!(key, PropertyKey::Symbol(_)) => symbols.push(key),
                None => strings.push(key),
            }
        }
        indices.sort_by_key(|(index, _)| *index);

        let mut keys = Vec::with_capacity(indices.len() + strings.len() + symbols.len());
        keys.extend(indices.into_iter().map(|(_, key)| key));
        keys.extend(strings);
        keys.extend(symbols);
        keys
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    /// Inserts or replaces `key`, keeping the original position of an
    /// existing key.
    fn store(&mut self, key: PropertyKey, descriptor: PropertyDescriptor) {
        if let NamedProperties::Fast(entries) = &mut self.properties {
            if let Some((_, slot)) = entries.iter_mut().find(|(k, _)| *k == key) {
                *slot = descriptor;
                return;
            }
            if entries.len() < MAX_FAST_PROPERTIES {
                entries.push((key, descriptor));
                return;
            }
            self.normalise_to_slow();
        }
        if let NamedProperties::Slow { map, next_order } = &mut self.properties {
            if let Some(existing) = map.get_mut(&key) {
                existing.descriptor = descriptor;
            } else {
                map.insert(
                    key,
                    SlowProperty {
                        descriptor,
                        order: *next_order,
                    },
                );
                *next_order += 1;
            }
        }
    }

    /// Normalises this object from fast to slow mode.
    fn normalise_to_slow(&mut self) {
        let NamedProperties::Fast(entries) = &mut self.properties else {
            return;
        };
        let entries = std::mem::take(entries);
        let next_order = entries.len() as u64;
        let map = entries
            .into_iter()
            .enumerate()
            .map(|(i, (key, descriptor))| {
                (
                    key,
                    SlowProperty {
                        descriptor,
                        order: i as u64,
                    },
                )
            })
            .collect();
        self.properties = NamedProperties::Slow { map, next_order };
    }
}

impl Default for JsObject {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::property::PropertyAttributes;
    use crate::objects::value::JsValue;

    fn data(value: i32) -> PartialDescriptor {
        PartialDescriptor::from(PropertyDescriptor::data(
            JsValue::Smi(value),
            PropertyAttributes::DEFAULT,
        ))
    }

    fn key(s: &str) -> PropertyKey {
        PropertyKey::from(s)
    }

    // ── Property CRUD ─────────────────────────────────────────────────────────

    #[test]
    fn test_define_and_get_own_property() {
        let mut obj = JsObject::default();
        assert!(obj.define_own_property(key("x"), &data(42)));
        let desc = obj.get_own_property(&key("x")).unwrap();
        assert_eq!(desc.value(), Some(&JsValue::Smi(42)));
        assert!(desc.is_writable() && desc.enumerable && desc.configurable);
    }

    #[test]
    fn test_get_missing_own_property_returns_none() {
        let obj = JsObject::default();
        assert!(obj.get_own_property(&key("missing")).is_none());
    }

    #[test]
    fn test_update_existing_property_keeps_attributes() {
        let mut obj = JsObject::default();
        obj.define_own_property(key("x"), &data(1));
        assert!(obj.define_own_property(key("x"), &PartialDescriptor::new().with_value(2)));
        let desc = obj.get_own_property(&key("x")).unwrap();
        assert_eq!(desc.value(), Some(&JsValue::Smi(2)));
        assert!(desc.configurable);
    }

    #[test]
    fn test_define_on_non_extensible_fails() {
        let mut obj = JsObject::default();
        obj.prevent_extensions();
        assert!(!obj.is_extensible());
        assert!(!obj.define_own_property(key("x"), &data(1)));
        assert!(!obj.has_own_property(&key("x")));
    }

    #[test]
    fn test_frozen_property_rejects_new_value() {
        let mut obj = JsObject::default();
        obj.define_own_property(
            key("foo"),
            &PartialDescriptor::new()
                .with_value(10)
                .with_writable(false)
                .with_configurable(false),
        );
        assert!(!obj.define_own_property(key("foo"), &PartialDescriptor::new().with_value(8)));
        assert!(obj.define_own_property(key("foo"), &PartialDescriptor::new().with_value(10)));
        assert_eq!(
            obj.get_own_property(&key("foo")).unwrap().value(),
            Some(&JsValue::Smi(10))
        );
    }

    #[test]
    fn test_delete_own_property() {
        let mut obj = JsObject::default();
        obj.define_own_property(key("x"), &data(99));
        assert!(obj.delete(&key("x")));
        assert!(!obj.has_own_property(&key("x")));
        assert!(obj.delete(&key("ghost")));
    }

    #[test]
    fn test_delete_non_configurable_fails() {
        let mut obj = JsObject::default();
        obj.define_own_property(key("x"), &PartialDescriptor::new().with_value(1));
        assert!(!obj.delete(&key("x")));
        assert!(obj.has_own_property(&key("x")));
    }

    // ── Key order ─────────────────────────────────────────────────────────────

    #[test]
    fn test_own_property_keys_order() {
        let mut obj = JsObject::default();
        obj.define_own_property(PropertyKey::Symbol(1), &data(0));
        obj.define_own_property(key("b"), &data(0));
        obj.define_own_property(key("10"), &data(0));
        obj.define_own_property(key("a"), &data(0));
        obj.define_own_property(key("2"), &data(0));
        assert_eq!(
            obj.own_property_keys(),
            vec![key("2"), key("10"), key("b"), key("a"), PropertyKey::Symbol(1)]
        );
    }

    #[test]
    fn test_readding_deleted_key_moves_it_last() {
        let mut obj = JsObject::default();
        obj.define_own_property(key("a"), &data(0));
        obj.define_own_property(key("b"), &data(0));
        obj.delete(&key("a"));
        obj.define_own_property(key("a"), &data(0));
        assert_eq!(obj.own_property_keys(), vec![key("b"), key("a")]);
    }

    // ── Fast / slow mode ──────────────────────────────────────────────────────

    #[test]
    fn test_normalises_to_slow_mode_and_keeps_order() {
        let mut obj = JsObject::default();
        let names: Vec<String> = (0..=MAX_FAST_PROPERTIES).map(|i| format!("p{i}")).collect();
        for (i, name) in names.iter().enumerate() {
            assert_eq!(obj.is_fast_mode(), i <= MAX_FAST_PROPERTIES);
            obj.define_own_property(key(name), &data(i as i32));
        }
        assert!(!obj.is_fast_mode());
        assert_eq!(obj.property_count(), MAX_FAST_PROPERTIES + 1);
        let keys: Vec<PropertyKey> = names.iter().map(|n| key(n)).collect();
        assert_eq!(obj.own_property_keys(), keys);
        assert_eq!(
            obj.get_own_property(&key("p3")).unwrap().value(),
            Some(&JsValue::Smi(3))
        );
    }

    #[test]
    fn test_slow_mode_redefine_keeps_position() {
        let mut obj = JsObject::default();
        for i in 0..12 {
            obj.define_own_property(key(&format!("p{i}")), &data(i));
        }
        obj.define_own_property(key("p0"), &data(100));
        assert_eq!(obj.own_property_keys().first(), Some(&key("p0")));
    }

    // ── Prototype slot ────────────────────────────────────────────────────────

    #[test]
    fn test_prototype_slot() {
        use crate::objects::heap_object::HeapObject;
        use std::rc::Rc;

        let proto = HeapObject::ordinary(None);
        let mut obj = JsObject::new(Some(Rc::clone(&proto)));
        assert!(Rc::ptr_eq(&obj.prototype().unwrap(), &proto));
        obj.set_prototype(None);
        assert!(obj.prototype().is_none());
    }
}
