//! The `Reflect` namespace (ECMAScript §28.1).
//!
//! Each function validates its JavaScript-level arguments and then performs
//! exactly one fundamental operation, returning its raw result: `false` from
//! `[[Set]]`, `[[DefineOwnProperty]]` and friends is reported, not thrown.

use crate::error::{UmbraError, UmbraResult};
use crate::isolate::Isolate;
use crate::object_ops::{self, require_object};
use crate::objects::heap_object::ObjectRef;
use crate::objects::property::PartialDescriptor;
use crate::objects::value::JsValue;

/// Namespace for the `Reflect.*` functions.
pub struct Reflect;

fn prototype_argument(proto: &JsValue) -> UmbraResult<Option<ObjectRef>> {
    match proto {
        JsValue::Object(o) => Ok(Some(o.clone())),
        JsValue::Null => Ok(None),
        other => Err(UmbraError::TypeError(format!(
            "Prototype must be an object or null, got {other}"
        ))),
    }
}

impl Reflect {
    /// `Reflect.apply(target, thisArgument, argumentsList)`.
    pub fn apply(isolate: &Isolate, target: &JsValue, this: &JsValue, args: &[JsValue]) -> UmbraResult<JsValue> {
        object_ops::call(isolate, target, this, args)
    }

    /// `Reflect.construct(target, argumentsList, newTarget)`.
    ///
    /// `new_target` defaults to `target`; both must be constructors.
    pub fn construct(
        isolate: &Isolate,
        target: &JsValue,
        args: &[JsValue],
        new_target: Option<&JsValue>,
    ) -> UmbraResult<JsValue> {
        let constructor = match target {
            JsValue::Object(o) if o.is_constructor() => o,
            other => return Err(UmbraError::NotConstructor(other.to_string())),
        };
        let new_target = match new_target {
            None => constructor,
            Some(JsValue::Object(o)) if o.is_constructor() => o,
            Some(other) => return Err(UmbraError::NotConstructor(other.to_string())),
        };
        object_ops::construct(isolate, constructor, args, Some(new_target)).map(JsValue::Object)
    }

    /// `Reflect.defineProperty(target, propertyKey, attributes)`.
    pub fn define_property(
        isolate: &Isolate,
        target: &JsValue,
        key: &JsValue,
        attributes: &JsValue,
    ) -> UmbraResult<bool> {
        let target = require_object(target)?;
        let key = key.to_property_key()?;
        let desc = object_ops::to_property_descriptor(isolate, attributes)?;
        object_ops::define_own_property(isolate, target, &key, &desc)
    }

    /// `Reflect.defineProperty` with an already-converted descriptor.
    pub fn define_property_with(
        isolate: &Isolate,
        target: &JsValue,
        key: &JsValue,
        desc: &PartialDescriptor,
    ) -> UmbraResult<bool> {
        let target = require_object(target)?;
        let key = key.to_property_key()?;
        object_ops::define_own_property(isolate, target, &key, desc)
    }

    /// `Reflect.deleteProperty(target, propertyKey)`.
    pub fn delete_property(isolate: &Isolate, target: &JsValue, key: &JsValue) -> UmbraResult<bool> {
        let target = require_object(target)?;
        object_ops::delete(isolate, target, &key.to_property_key()?)
    }

    /// `Reflect.get(target, propertyKey, receiver)`; `receiver` defaults to
    /// `target`.
    pub fn get(
        isolate: &Isolate,
        target: &JsValue,
        key: &JsValue,
        receiver: Option<&JsValue>,
    ) -> UmbraResult<JsValue> {
        let object = require_object(target)?;
        let key = key.to_property_key()?;
        object_ops::get(isolate, object, &key, receiver.unwrap_or(target))
    }

    /// `Reflect.getOwnPropertyDescriptor(target, propertyKey)`: a
    /// descriptor object or `undefined`.
    pub fn get_own_property_descriptor(isolate: &Isolate, target: &JsValue, key: &JsValue) -> UmbraResult<JsValue> {
        let target = require_object(target)?;
        let key = key.to_property_key()?;
        Ok(match object_ops::get_own_property(isolate, target, &key)? {
            Some(desc) => JsValue::Object(object_ops::from_property_descriptor(&desc.into())),
            None => JsValue::Undefined,
        })
    }

    /// `Reflect.getPrototypeOf(target)`: an object or `null`.
    pub fn get_prototype_of(isolate: &Isolate, target: &JsValue) -> UmbraResult<JsValue> {
        let target = require_object(target)?;
        object_ops::get_prototype_of(isolate, target).map(JsValue::from)
    }

    /// `Reflect.has(target, propertyKey)`.
    pub fn has(isolate: &Isolate, target: &JsValue, key: &JsValue) -> UmbraResult<bool> {
        let target = require_object(target)?;
        object_ops::has_property(isolate, target, &key.to_property_key()?)
    }

    /// `Reflect.isExtensible(target)`.
    pub fn is_extensible(isolate: &Isolate, target: &JsValue) -> UmbraResult<bool> {
        object_ops::is_extensible(isolate, require_object(target)?)
    }

    /// `Reflect.ownKeys(target)`: an array of strings and symbols.
    pub fn own_keys(isolate: &Isolate, target: &JsValue) -> UmbraResult<JsValue> {
        let keys = object_ops::own_property_keys(isolate, require_object(target)?)?;
        let values: Vec<JsValue> = keys.iter().map(|k| k.to_value()).collect();
        Ok(JsValue::Object(object_ops::create_array_from_list(&values)))
    }

    /// `Reflect.preventExtensions(target)`.
    pub fn prevent_extensions(isolate: &Isolate, target: &JsValue) -> UmbraResult<bool> {
        object_ops::prevent_extensions(isolate, require_object(target)?)
    }

    /// `Reflect.set(target, propertyKey, V, receiver)`; `receiver` defaults
    /// to `target`.
    pub fn set(
        isolate: &Isolate,
        target: &JsValue,
        key: &JsValue,
        value: JsValue,
        receiver: Option<&JsValue>,
    ) -> UmbraResult<bool> {
        let object = require_object(target)?;
        let key = key.to_property_key()?;
        object_ops::set(isolate, object, &key, value, receiver.unwrap_or(target))
    }

    /// `Reflect.setPrototypeOf(target, proto)`.
    pub fn set_prototype_of(isolate: &Isolate, target: &JsValue, proto: &JsValue) -> UmbraResult<bool> {
        let target = require_object(target)?;
        object_ops::set_prototype_of(isolate, target, prototype_argument(proto)?)
    }
}
