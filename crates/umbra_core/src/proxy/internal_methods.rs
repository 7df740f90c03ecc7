//! The internal methods of proxy exotic objects (ECMAScript §10.5.1–§10.5.13).
//!
//! Each method follows the same shape: take the `(target, handler)` pair
//! (failing if revoked), enter one level of call depth, resolve the trap,
//! and either forward to the target or call the trap and validate its
//! result.  Boolean-returning traps have their results coerced with
//! ToBoolean.

use std::rc::Rc;

use crate::error::UmbraResult;
use crate::isolate::Isolate;
use crate::object_ops;
use crate::objects::heap_object::ObjectRef;
use crate::objects::property::{PartialDescriptor, PropertyDescriptor, PropertyKey};
use crate::objects::value::JsValue;
use crate::proxy::ProxyObject;
use crate::proxy::invariants;
use crate::proxy::trap::{Trap, TrapName, call_trap, resolve};

fn object(o: &ObjectRef) -> JsValue {
    JsValue::Object(Rc::clone(o))
}

/// `[[GetPrototypeOf]]` (§10.5.1).
pub fn get_prototype_of(isolate: &Isolate, proxy: &ProxyObject) -> UmbraResult<Option<ObjectRef>> {
    let (target, handler) = proxy.active()?;
    let _guard = isolate.enter()?;
    let Trap::Call(trap) = resolve(isolate, &handler, TrapName::GetPrototypeOf)? else {
        return object_ops::get_prototype_of(isolate, &target);
    };
    let result = call_trap(isolate, TrapName::GetPrototypeOf, &trap, &handler, &[object(&target)])?;
    invariants::check_get_prototype_of(isolate, &target, &result)
}

/// `[[SetPrototypeOf]]` (§10.5.2).
pub fn set_prototype_of(
    isolate: &Isolate,
    proxy: &ProxyObject,
    prototype: Option<ObjectRef>,
) -> UmbraResult<bool> {
    let (target, handler) = proxy.active()?;
    let _guard = isolate.enter()?;
    let Trap::Call(trap) = resolve(isolate, &handler, TrapName::SetPrototypeOf)? else {
        return object_ops::set_prototype_of(isolate, &target, prototype);
    };
    let args = [object(&target), JsValue::from(prototype.clone())];
    if !call_trap(isolate, TrapName::SetPrototypeOf, &trap, &handler, &args)?.to_boolean() {
        return Ok(false);
    }
    invariants::check_set_prototype_of(isolate, &target, &prototype)?;
    Ok(true)
}

/// `[[IsExtensible]]` (§10.5.3).
pub fn is_extensible(isolate: &Isolate, proxy: &ProxyObject) -> UmbraResult<bool> {
    let (target, handler) = proxy.active()?;
    let _guard = isolate.enter()?;
    let Trap::Call(trap) = resolve(isolate, &handler, TrapName::IsExtensible)? else {
        return object_ops::is_extensible(isolate, &target);
    };
    let result = call_trap(isolate, TrapName::IsExtensible, &trap, &handler, &[object(&target)])?
        .to_boolean();
    invariants::check_is_extensible(isolate, &target, result)?;
    Ok(result)
}

/// `[[PreventExtensions]]` (§10.5.4).
pub fn prevent_extensions(isolate: &Isolate, proxy: &ProxyObject) -> UmbraResult<bool> {
    let (target, handler) = proxy.active()?;
    let _guard = isolate.enter()?;
    let Trap::Call(trap) = resolve(isolate, &handler, TrapName::PreventExtensions)? else {
        return object_ops::prevent_extensions(isolate, &target);
    };
    let result = call_trap(isolate, TrapName::PreventExtensions, &trap, &handler, &[object(&target)])?
        .to_boolean();
    if result {
        invariants::check_prevent_extensions(isolate, &target)?;
    }
    Ok(result)
}

/// `[[GetOwnProperty]]` (§10.5.5).
pub fn get_own_property(
    isolate: &Isolate,
    proxy: &ProxyObject,
    key: &PropertyKey,
) -> UmbraResult<Option<PropertyDescriptor>> {
    let (target, handler) = proxy.active()?;
    let _guard = isolate.enter()?;
    let Trap::Call(trap) = resolve(isolate, &handler, TrapName::GetOwnPropertyDescriptor)? else {
        return object_ops::get_own_property(isolate, &target, key);
    };
    let args = [object(&target), key.to_value()];
    let result = call_trap(isolate, TrapName::GetOwnPropertyDescriptor, &trap, &handler, &args)?;
    invariants::check_get_own_property(isolate, &target, key, &result)
}

/// `[[DefineOwnProperty]]` (§10.5.6).
pub fn define_own_property(
    isolate: &Isolate,
    proxy: &ProxyObject,
    key: &PropertyKey,
    desc: &PartialDescriptor,
) -> UmbraResult<bool> {
    let (target, handler) = proxy.active()?;
    let _guard = isolate.enter()?;
    let Trap::Call(trap) = resolve(isolate, &handler, TrapName::DefineProperty)? else {
        return object_ops::define_own_property(isolate, &target, key, desc);
    };
    let desc_object = object_ops::from_property_descriptor(desc);
    let args = [object(&target), key.to_value(), JsValue::Object(desc_object)];
    if !call_trap(isolate, TrapName::DefineProperty, &trap, &handler, &args)?.to_boolean() {
        return Ok(false);
    }
    invariants::check_define_own_property(isolate, &target, key, desc)?;
    Ok(true)
}

/// `[[HasProperty]]` (§10.5.7).
pub fn has(isolate: &Isolate, proxy: &ProxyObject, key: &PropertyKey) -> UmbraResult<bool> {
    let (target, handler) = proxy.active()?;
    let _guard = isolate.enter()?;
    let Trap::Call(trap) = resolve(isolate, &handler, TrapName::Has)? else {
        return object_ops::has_property(isolate, &target, key);
    };
    let args = [object(&target), key.to_value()];
    let result = call_trap(isolate, TrapName::Has, &trap, &handler, &args)?.to_boolean();
    if !result {
        invariants::check_has(isolate, &target, key)?;
    }
    Ok(result)
}

/// `[[Get]]` (§10.5.8).
pub fn get(
    isolate: &Isolate,
    proxy: &ProxyObject,
    key: &PropertyKey,
    receiver: &JsValue,
) -> UmbraResult<JsValue> {
    let (target, handler) = proxy.active()?;
    let _guard = isolate.enter()?;
    let Trap::Call(trap) = resolve(isolate, &handler, TrapName::Get)? else {
        return object_ops::get(isolate, &target, key, receiver);
    };
    let args = [object(&target), key.to_value(), receiver.clone()];
    let result = call_trap(isolate, TrapName::Get, &trap, &handler, &args)?;
    invariants::check_get(isolate, &target, key, &result)?;
    Ok(result)
}

/// `[[Set]]` (§10.5.9).
pub fn set(
    isolate: &Isolate,
    proxy: &ProxyObject,
    key: &PropertyKey,
    value: JsValue,
    receiver: &JsValue,
) -> UmbraResult<bool> {
    let (target, handler) = proxy.active()?;
    let _guard = isolate.enter()?;
    let Trap::Call(trap) = resolve(isolate, &handler, TrapName::Set)? else {
        return object_ops::set(isolate, &target, key, value, receiver);
    };
    let args = [object(&target), key.to_value(), value.clone(), receiver.clone()];
    if !call_trap(isolate, TrapName::Set, &trap, &handler, &args)?.to_boolean() {
        return Ok(false);
    }
    invariants::check_set(isolate, &target, key, &value)?;
    Ok(true)
}

/// `[[Delete]]` (§10.5.10).
pub fn delete(isolate: &Isolate, proxy: &ProxyObject, key: &PropertyKey) -> UmbraResult<bool> {
    let (target, handler) = proxy.active()?;
    let _guard = isolate.enter()?;
    let Trap::Call(trap) = resolve(isolate, &handler, TrapName::DeleteProperty)? else {
        return object_ops::delete(isolate, &target, key);
    };
    let args = [object(&target), key.to_value()];
    if !call_trap(isolate, TrapName::DeleteProperty, &trap, &handler, &args)?.to_boolean() {
        return Ok(false);
    }
    invariants::check_delete(isolate, &target, key)?;
    Ok(true)
}

/// `[[OwnPropertyKeys]]` (§10.5.11).
pub fn own_property_keys(isolate: &Isolate, proxy: &ProxyObject) -> UmbraResult<Vec<PropertyKey>> {
    let (target, handler) = proxy.active()?;
    let _guard = isolate.enter()?;
    let Trap::Call(trap) = resolve(isolate, &handler, TrapName::OwnKeys)? else {
        return object_ops::own_property_keys(isolate, &target);
    };
    let result = call_trap(isolate, TrapName::OwnKeys, &trap, &handler, &[object(&target)])?;
    invariants::check_own_property_keys(isolate, &target, &result)
}

/// `[[Call]]` (§10.5.12).  Only reachable for proxies whose target was
/// callable at creation.
pub fn call(isolate: &Isolate, proxy: &ProxyObject, this: &JsValue, args: &[JsValue]) -> UmbraResult<JsValue> {
    let (target, handler) = proxy.active()?;
    let _guard = isolate.enter()?;
    let Trap::Call(trap) = resolve(isolate, &handler, TrapName::Apply)? else {
        return object_ops::call(isolate, &object(&target), this, args);
    };
    let args_array = object_ops::create_array_from_list(args);
    let trap_args = [object(&target), this.clone(), JsValue::Object(args_array)];
    call_trap(isolate, TrapName::Apply, &trap, &handler, &trap_args)
}

/// `[[Construct]]` (§10.5.13).  Only reachable for proxies whose target was
/// a constructor at creation.
pub fn construct(
    isolate: &Isolate,
    proxy: &ProxyObject,
    args: &[JsValue],
    new_target: &ObjectRef,
) -> UmbraResult<ObjectRef> {
    let (target, handler) = proxy.active()?;
    let _guard = isolate.enter()?;
    let Trap::Call(trap) = resolve(isolate, &handler, TrapName::Construct)? else {
        return object_ops::construct(isolate, &target, args, Some(new_target));
    };
    let args_array = object_ops::create_array_from_list(args);
    let trap_args = [object(&target), JsValue::Object(args_array), object(new_target)];
    let result = call_trap(isolate, TrapName::Construct, &trap, &handler, &trap_args)?;
    invariants::check_construct(result)
}
