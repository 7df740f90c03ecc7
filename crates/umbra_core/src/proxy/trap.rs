//! Trap lookup on proxy handlers.

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::error::{UmbraError, UmbraResult};
use crate::isolate::Isolate;
use crate::object_ops;
use crate::objects::heap_object::ObjectRef;
use crate::objects::property::PropertyKey;
use crate::objects::value::JsValue;

/// The thirteen handler traps, one per fundamental operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrapName {
    GetPrototypeOf,
    SetPrototypeOf,
    IsExtensible,
    PreventExtensions,
    GetOwnPropertyDescriptor,
    DefineProperty,
    Has,
    Get,
    Set,
    DeleteProperty,
    OwnKeys,
    Apply,
    Construct,
}

impl TrapName {
    /// Every trap, in the order the internal methods are listed in §10.5.
    pub const ALL: [TrapName; 13] = [
        Self::GetPrototypeOf,
        Self::SetPrototypeOf,
        Self::IsExtensible,
        Self::PreventExtensions,
        Self::GetOwnPropertyDescriptor,
        Self::DefineProperty,
        Self::Has,
        Self::Get,
        Self::Set,
        Self::DeleteProperty,
        Self::OwnKeys,
        Self::Apply,
        Self::Construct,
    ];

    /// The handler property the trap is looked up under.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetPrototypeOf => "getPrototypeOf",
            Self::SetPrototypeOf => "setPrototypeOf",
            Self::IsExtensible => "isExtensible",
            Self::PreventExtensions => "preventExtensions",
            Self::GetOwnPropertyDescriptor => "getOwnPropertyDescriptor",
            Self::DefineProperty => "defineProperty",
            Self::Has => "has",
            Self::Get => "get",
            Self::Set => "set",
            Self::DeleteProperty => "deleteProperty",
            Self::OwnKeys => "ownKeys",
            Self::Apply => "apply",
            Self::Construct => "construct",
        }
    }
}

impl fmt::Display for TrapName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of looking a trap up on a handler.
#[derive(Debug, Clone)]
pub enum Trap {
    /// The handler has no trap (`undefined` or `null`); forward to the target.
    Default,
    /// The handler's trap value; checked for callability when invoked.
    Call(JsValue),
}

/// Looks `name` up on `handler` with an ordinary `[[Get]]`.
///
/// The lookup itself may run getters or enter other proxies.
pub fn resolve(isolate: &Isolate, handler: &ObjectRef, name: TrapName) -> UmbraResult<Trap> {
    let value = object_ops::get(
        isolate,
        handler,
        &PropertyKey::from(name.as_str()),
        &JsValue::Object(Rc::clone(handler)),
    )?;
    let found = !value.is_nullish();
    trace!(domain = "proxy", kind = "trap_resolution", trap = %name, found);
    Ok(if found { Trap::Call(value) } else { Trap::Default })
}

/// Calls a resolved trap with the handler as `this`.
///
/// Fails with `NotCallable` naming the trap before anything runs if the
/// trap value is not callable.
pub fn call_trap(
    isolate: &Isolate,
    name: TrapName,
    trap: &JsValue,
    handler: &ObjectRef,
    args: &[JsValue],
) -> UmbraResult<JsValue> {
    if !trap.is_callable() {
        return Err(UmbraError::NotCallable(name.as_str().to_string()));
    }
    object_ops::call(isolate, trap, &JsValue::Object(Rc::clone(handler)), args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::heap_object::HeapObject;
    use crate::objects::js_function::JsFunction;

    fn handler_with(isolate: &Isolate, name: &str, value: JsValue) -> ObjectRef {
        let handler = HeapObject::ordinary(None);
        object_ops::create_data_property(isolate, &handler, &PropertyKey::from(name), value).unwrap();
        handler
    }

    #[test]
    fn test_trap_names_are_distinct() {
        let mut names: Vec<&str> = TrapName::ALL.iter().map(|t| t.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 13);
        assert_eq!(TrapName::GetOwnPropertyDescriptor.to_string(), "getOwnPropertyDescriptor");
    }

    #[test]
    fn test_missing_and_nullish_traps_default() {
        let isolate = Isolate::new();
        let empty = HeapObject::ordinary(None);
        assert!(matches!(resolve(&isolate, &empty, TrapName::Get).unwrap(), Trap::Default));
        let nulled = handler_with(&isolate, "get", JsValue::Null);
        assert!(matches!(resolve(&isolate, &nulled, TrapName::Get).unwrap(), Trap::Default));
        let undefined = handler_with(&isolate, "has", JsValue::Undefined);
        assert!(matches!(resolve(&isolate, &undefined, TrapName::Has).unwrap(), Trap::Default));
    }

    #[test]
    fn test_inherited_trap_is_found() {
        let isolate = Isolate::new();
        let f = HeapObject::function(None, JsFunction::new("get", 3, |_, _, _| Ok(JsValue::Smi(1))));
        let proto = handler_with(&isolate, "get", JsValue::Object(f));
        let handler = HeapObject::ordinary(Some(proto));
        assert!(matches!(resolve(&isolate, &handler, TrapName::Get).unwrap(), Trap::Call(_)));
    }

    #[test]
    fn test_non_callable_trap_fails_when_called() {
        let isolate = Isolate::new();
        let handler = handler_with(&isolate, "get", JsValue::Smi(42));
        let Trap::Call(trap) = resolve(&isolate, &handler, TrapName::Get).unwrap() else {
            panic!("expected a trap");
        };
        let err = call_trap(&isolate, TrapName::Get, &trap, &handler, &[]).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: get is not a function");
    }

    #[test]
    fn test_trap_this_is_handler() {
        let isolate = Isolate::new();
        let f = HeapObject::function(None, JsFunction::new("has", 2, |_, this, _| Ok(this.clone())));
        let handler = handler_with(&isolate, "has", JsValue::Object(f));
        let Trap::Call(trap) = resolve(&isolate, &handler, TrapName::Has).unwrap() else {
            panic!("expected a trap");
        };
        let this = call_trap(&isolate, TrapName::Has, &trap, &handler, &[]).unwrap();
        assert_eq!(this, JsValue::Object(handler));
    }
}
