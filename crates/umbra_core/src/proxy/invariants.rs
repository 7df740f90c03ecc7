//! Cross-checks of trap results against the proxy target (§10.5).
//!
//! Every check reads the target's state *after* the trap has run: the trap
//! may have mutated the target, and nothing is cached between operations.
//! A failed check produces an [`UmbraError::InvariantViolation`]; checks
//! never mutate the target.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{UmbraError, UmbraResult, Violation};
use crate::isolate::Isolate;
use crate::object_ops::{self, same_object};
use crate::objects::heap_object::ObjectRef;
use crate::objects::property::{
    PartialDescriptor, PropertyDescriptor, PropertyKey, PropertyKind,
    is_compatible_property_descriptor,
};
use crate::objects::value::JsValue;

fn reject(violation: Violation) -> UmbraError {
    debug!(
        domain = "proxy",
        kind = "invariant_violation",
        trap = %violation.trap(),
        message = %violation,
        "trap result rejected"
    );
    violation.into()
}

fn ensure(ok: bool, violation: Violation) -> UmbraResult<()> {
    if ok { Ok(()) } else { Err(reject(violation)) }
}

// ── get / set / has ───────────────────────────────────────────────────────────

/// `[[Get]]` (§10.5.8 steps 9–10).
pub fn check_get(isolate: &Isolate, target: &ObjectRef, key: &PropertyKey, result: &JsValue) -> UmbraResult<()> {
    let Some(target_desc) = object_ops::get_own_property(isolate, target, key)? else {
        return Ok(());
    };
    if target_desc.configurable {
        return Ok(());
    }
    match &target_desc.kind {
        PropertyKind::Data {
            value,
            writable: false,
        } => ensure(result.same_value(value), Violation::GetImmutableDataProperty),
        PropertyKind::Accessor { get: None, .. } => {
            ensure(result.is_undefined(), Violation::GetNonConfigurableAccessor)
        }
        _ => Ok(()),
    }
}

/// `[[Set]]` (§10.5.9 steps 10–11); only called when the trap reported success.
pub fn check_set(isolate: &Isolate, target: &ObjectRef, key: &PropertyKey, value: &JsValue) -> UmbraResult<()> {
    let Some(target_desc) = object_ops::get_own_property(isolate, target, key)? else {
        return Ok(());
    };
    if target_desc.configurable {
        return Ok(());
    }
    match &target_desc.kind {
        PropertyKind::Data {
            value: target_value,
            writable: false,
        } => ensure(value.same_value(target_value), Violation::SetImmutableDataProperty),
        PropertyKind::Accessor { set: None, .. } => Err(reject(Violation::SetNonConfigurableAccessor)),
        _ => Ok(()),
    }
}

/// `[[HasProperty]]` (§10.5.7 step 9); only called when the trap reported
/// the property as absent.
pub fn check_has(isolate: &Isolate, target: &ObjectRef, key: &PropertyKey) -> UmbraResult<()> {
    let Some(target_desc) = object_ops::get_own_property(isolate, target, key)? else {
        return Ok(());
    };
    ensure(target_desc.configurable, Violation::HasExistingNonConfigurable)?;
    ensure(
        object_ops::is_extensible(isolate, target)?,
        Violation::HasExistingNonExtensible,
    )
}

// ── defineProperty / getOwnPropertyDescriptor / deleteProperty ───────────────

/// `[[DefineOwnProperty]]` (§10.5.6 steps 11–16); only called when the trap
/// reported success.
pub fn check_define_own_property(
    isolate: &Isolate,
    target: &ObjectRef,
    key: &PropertyKey,
    desc: &PartialDescriptor,
) -> UmbraResult<()> {
    let target_desc = object_ops::get_own_property(isolate, target, key)?;
    let extensible = object_ops::is_extensible(isolate, target)?;
    let setting_non_configurable = desc.configurable == Some(false);

    let Some(target_desc) = target_desc else {
        ensure(extensible, Violation::DefineNonExtensible)?;
        return ensure(!setting_non_configurable, Violation::DefineNonConfigurableNonExisting);
    };
    ensure(
        is_compatible_property_descriptor(extensible, desc, Some(&target_desc)),
        Violation::DefineIncompatibleDescriptor,
    )?;
    ensure(
        !(setting_non_configurable && target_desc.configurable),
        Violation::DefineExistingConfigurable,
    )?;
    if let PropertyKind::Data { writable: true, .. } = target_desc.kind
        && !target_desc.configurable
    {
        ensure(desc.writable != Some(false), Violation::DefineNonWritable)?;
    }
    Ok(())
}

/// `[[GetOwnProperty]]` (§10.5.5 steps 8–17).
///
/// Converts an object result to a complete descriptor and returns it.
pub fn check_get_own_property(
    isolate: &Isolate,
    target: &ObjectRef,
    key: &PropertyKey,
    result: &JsValue,
) -> UmbraResult<Option<PropertyDescriptor>> {
    ensure(
        result.is_object() || result.is_undefined(),
        Violation::GetOwnDescriptorReturn,
    )?;
    let target_desc = object_ops::get_own_property(isolate, target, key)?;

    if result.is_undefined() {
        let Some(target_desc) = target_desc else {
            return Ok(None);
        };
        ensure(target_desc.configurable, Violation::GetOwnDescriptorNonConfigurable)?;
        ensure(
            object_ops::is_extensible(isolate, target)?,
            Violation::GetOwnDescriptorUndefinedReturn,
        )?;
        return Ok(None);
    }

    let extensible = object_ops::is_extensible(isolate, target)?;
    let result_desc = object_ops::to_property_descriptor(isolate, result)?.complete();
    ensure(
        is_compatible_property_descriptor(
            extensible,
            &PartialDescriptor::from(result_desc.clone()),
            target_desc.as_ref(),
        ),
        Violation::GetOwnDescriptorInvalidDescriptor,
    )?;

    if !result_desc.configurable {
        let Some(target_desc) = target_desc.filter(|d| !d.configurable) else {
            return Err(reject(Violation::GetOwnDescriptorInvalidNonConfig));
        };
        if result_desc.is_data() && !result_desc.is_writable() {
            ensure(
                !target_desc.is_writable(),
                Violation::GetOwnDescriptorNonConfigurableNonWritable,
            )?;
        }
    }
    Ok(Some(result_desc))
}

/// `[[Delete]]` (§10.5.10 steps 10–13); only called when the trap reported
/// success.
pub fn check_delete(isolate: &Isolate, target: &ObjectRef, key: &PropertyKey) -> UmbraResult<()> {
    let Some(target_desc) = object_ops::get_own_property(isolate, target, key)? else {
        return Ok(());
    };
    ensure(target_desc.configurable, Violation::DeleteNonConfigurable)?;
    ensure(
        object_ops::is_extensible(isolate, target)?,
        Violation::DeleteNonExtensible,
    )
}

// ── prototype and extensibility ───────────────────────────────────────────────

/// `[[GetPrototypeOf]]` (§10.5.1 steps 7–11).
pub fn check_get_prototype_of(
    isolate: &Isolate,
    target: &ObjectRef,
    result: &JsValue,
) -> UmbraResult<Option<ObjectRef>> {
    let prototype = match result {
        JsValue::Object(o) => Some(o.clone()),
        JsValue::Null => None,
        _ => return Err(reject(Violation::GetPrototypeOfReturn)),
    };
    if object_ops::is_extensible(isolate, target)? {
        return Ok(prototype);
    }
    let target_proto = object_ops::get_prototype_of(isolate, target)?;
    ensure(
        same_object(&prototype, &target_proto),
        Violation::GetPrototypeOfNonExtensible,
    )?;
    Ok(prototype)
}

/// `[[SetPrototypeOf]]` (§10.5.2 steps 9–13); only called when the trap
/// reported success.
pub fn check_set_prototype_of(
    isolate: &Isolate,
    target: &ObjectRef,
    prototype: &Option<ObjectRef>,
) -> UmbraResult<()> {
    if object_ops::is_extensible(isolate, target)? {
        return Ok(());
    }
    let target_proto = object_ops::get_prototype_of(isolate, target)?;
    ensure(
        same_object(prototype, &target_proto),
        Violation::SetPrototypeOfNonExtensible,
    )
}

/// `[[IsExtensible]]` (§10.5.3 steps 8–9).
pub fn check_is_extensible(isolate: &Isolate, target: &ObjectRef, result: bool) -> UmbraResult<()> {
    ensure(
        result == object_ops::is_extensible(isolate, target)?,
        Violation::IsExtensibleReturn,
    )
}

/// `[[PreventExtensions]]` (§10.5.4 step 8); only called when the trap
/// reported success.
pub fn check_prevent_extensions(isolate: &Isolate, target: &ObjectRef) -> UmbraResult<()> {
    ensure(
        !object_ops::is_extensible(isolate, target)?,
        Violation::PreventExtensionsReturn,
    )
}

// ── ownKeys / construct ───────────────────────────────────────────────────────

/// CreateListFromArrayLike restricted to property keys (§7.3.18).
///
/// Each element is type-checked as soon as it is read, so a bad element
/// stops the walk before later indices (and their getters) are touched.
fn create_property_key_list_from_array_like(isolate: &Isolate, value: &JsValue) -> UmbraResult<Vec<PropertyKey>> {
    let object = object_ops::require_object(value)?;
    let length = object_ops::get_property(isolate, object, &PropertyKey::from("length"))?.to_length()?;
    let mut keys = Vec::with_capacity(length.min(1024));
    for index in 0..length {
        let element = object_ops::get_property(isolate, object, &PropertyKey::from(index.to_string()))?;
        let key = match element {
            JsValue::String(s) => PropertyKey::String(s),
            JsValue::Symbol(id) => PropertyKey::Symbol(id),
            _ => return Err(reject(Violation::OwnKeysNotStringOrSymbol)),
        };
        keys.push(key);
    }
    Ok(keys)
}

/// `[[OwnPropertyKeys]]` (§10.5.11 steps 7–23).
///
/// Converts the trap's array-like result into a key list and validates it.
pub fn check_own_property_keys(
    isolate: &Isolate,
    target: &ObjectRef,
    result: &JsValue,
) -> UmbraResult<Vec<PropertyKey>> {
    let keys = create_property_key_list_from_array_like(isolate, result)?;
    let mut seen = HashSet::with_capacity(keys.len());
    for key in &keys {
        ensure(seen.insert(key.clone()), Violation::OwnKeysDuplicates)?;
    }

    let extensible = object_ops::is_extensible(isolate, target)?;
    let target_keys = object_ops::own_property_keys(isolate, target)?;
    let mut configurable_keys = Vec::new();
    let mut non_configurable_keys = Vec::new();
    for key in target_keys {
        match object_ops::get_own_property(isolate, target, &key)? {
            Some(desc) if !desc.configurable => non_configurable_keys.push(key),
            _ => configurable_keys.push(key),
        }
    }
    if extensible && non_configurable_keys.is_empty() {
        return Ok(keys);
    }

    let mut unchecked = seen;
    for key in non_configurable_keys {
        if !unchecked.remove(&key) {
            return Err(reject(Violation::OwnKeysSkippedNonConfigurable(key)));
        }
    }
    if extensible {
        return Ok(keys);
    }
    for key in configurable_keys {
        if !unchecked.remove(&key) {
            return Err(reject(Violation::OwnKeysNonExtensibleSkipped(key)));
        }
    }
    if let Some(extra) = keys.iter().find(|k| unchecked.contains(*k)) {
        return Err(reject(Violation::OwnKeysNonExtensibleNewProperty(extra.clone())));
    }
    Ok(keys)
}

/// `[[Construct]]` (§10.5.13 step 11).
pub fn check_construct(result: JsValue) -> UmbraResult<ObjectRef> {
    match result {
        JsValue::Object(object) => Ok(object),
        _ => Err(reject(Violation::ConstructBadReturnType)),
    }
}
