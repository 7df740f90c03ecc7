//! Proxy exotic objects (ECMAScript §10.5, §28.2).
//!
//! A proxy forwards each fundamental operation to a user-supplied *handler*
//! object.  For every operation the engine:
//!
//! 1. fails with `RevokedAccess` if the proxy has been revoked,
//! 2. enters one level of call depth on the
//!    [`Isolate`][crate::isolate::Isolate],
//! 3. looks the trap up on the handler ([`trap`]); with no trap the
//!    operation is forwarded to the *target* unchanged,
//! 4. calls the trap and coerces its result,
//! 5. cross-checks the result against the target's current state
//!    ([`invariants`]).
//!
//! The per-operation algorithms live in [`internal_methods`]; callers reach
//! them through [`object_ops`][crate::object_ops].

use std::cell::{Cell, RefCell};

use tracing::debug;

use crate::error::{UmbraError, UmbraResult};
use crate::objects::heap_object::{HeapObject, ObjectRef};
use crate::objects::js_function::JsFunction;
use crate::objects::value::JsValue;

pub mod internal_methods;
pub mod invariants;
pub mod trap;

/// Lifecycle state of a proxy.  `Revoked` is terminal.
#[derive(Debug)]
pub enum ProxyState {
    /// The proxy forwards to `handler` and `target`.
    Active {
        /// `[[ProxyTarget]]`.
        target: ObjectRef,
        /// `[[ProxyHandler]]`.
        handler: ObjectRef,
    },
    /// Both slots are `null`; every operation fails.
    Revoked,
}

/// The internal slots of a proxy exotic object.
///
/// Whether the proxy has `[[Call]]` / `[[Construct]]` is fixed at creation
/// from its target and survives revocation.
#[derive(Debug)]
pub struct ProxyObject {
    state: RefCell<ProxyState>,
    callable: bool,
    constructor: bool,
}

impl ProxyObject {
    fn new(target: ObjectRef, handler: ObjectRef) -> Self {
        Self {
            callable: target.is_callable(),
            constructor: target.is_constructor(),
            state: RefCell::new(ProxyState::Active { target, handler }),
        }
    }

    /// Returns `true` once [`revoke`][Self::revoke] has been called.
    pub fn is_revoked(&self) -> bool {
        matches!(*self.state.borrow(), ProxyState::Revoked)
    }

    /// Returns `[[ProxyTarget]]`, or `None` when revoked.
    pub fn target(&self) -> Option<ObjectRef> {
        match &*self.state.borrow() {
            ProxyState::Active { target, .. } => Some(target.clone()),
            ProxyState::Revoked => None,
        }
    }

    /// Returns `[[ProxyHandler]]`, or `None` when revoked.
    pub fn handler(&self) -> Option<ObjectRef> {
        match &*self.state.borrow() {
            ProxyState::Active { handler, .. } => Some(handler.clone()),
            ProxyState::Revoked => None,
        }
    }

    /// Returns `(target, handler)` or fails with `RevokedAccess`.
    ///
    /// The returned handles stay valid even if a trap revokes the proxy
    /// while the operation is still running.
    pub(crate) fn active(&self) -> UmbraResult<(ObjectRef, ObjectRef)> {
        match &*self.state.borrow() {
            ProxyState::Active { target, handler } => Ok((target.clone(), handler.clone())),
            ProxyState::Revoked => Err(UmbraError::RevokedAccess),
        }
    }

    /// Moves the proxy to the `Revoked` state, releasing its target and
    /// handler.  Returns `false` if it was already revoked.
    pub fn revoke(&self) -> bool {
        let previous = self.state.replace(ProxyState::Revoked);
        let revoked = matches!(previous, ProxyState::Active { .. });
        if revoked {
            debug!(domain = "proxy", kind = "revoke", "proxy revoked");
        }
        // The old target and handler are dropped here, outside the borrow.
        drop(previous);
        revoked
    }

    /// Returns `true` if the proxy has a `[[Call]]` internal method.
    pub fn is_callable(&self) -> bool {
        self.callable
    }

    /// Returns `true` if the proxy has a `[[Construct]]` internal method.
    pub fn is_constructor(&self) -> bool {
        self.constructor
    }
}

/// A proxy together with the function object that revokes it.
#[derive(Debug, Clone)]
pub struct RevocableProxy {
    /// The proxy object.
    pub proxy: ObjectRef,
    /// A native function; calling it revokes `proxy` and returns `undefined`.
    pub revoke: ObjectRef,
}

/// Constructors for proxy objects.
pub struct Proxy;

impl Proxy {
    /// ProxyCreate (§10.5.14).
    ///
    /// Both `target` and `handler` must be objects; revoked proxies are
    /// acceptable for either.
    pub fn create(target: &JsValue, handler: &JsValue) -> UmbraResult<ObjectRef> {
        let JsValue::Object(target) = target else {
            return Err(UmbraError::TypeError(format!(
                "Expected target argument of Proxy constructor to be object, got {target}"
            )));
        };
        let JsValue::Object(handler) = handler else {
            return Err(UmbraError::TypeError(format!(
                "Expected handler argument of Proxy constructor to be object, got {handler}"
            )));
        };
        let proxy = ProxyObject::new(target.clone(), handler.clone());
        debug!(
            domain = "proxy",
            kind = "create",
            callable = proxy.is_callable(),
            constructor = proxy.is_constructor(),
            "proxy created"
        );
        Ok(HeapObject::proxy(proxy))
    }

    /// `Proxy.revocable(target, handler)` (§28.2.2.1).
    ///
    /// The revoke function holds the only engine-side reference to the
    /// proxy and drops it on first use; later calls do nothing.
    pub fn revocable(target: &JsValue, handler: &JsValue) -> UmbraResult<RevocableProxy> {
        let proxy = Self::create(target, handler)?;
        let slot = Cell::new(Some(proxy.clone()));
        let revoke = JsFunction::new("", 0, move |_, _, _| {
            if let Some(proxy) = slot.take()
                && let Some(state) = proxy.as_proxy()
            {
                state.revoke();
            }
            Ok(JsValue::Undefined)
        });
        Ok(RevocableProxy {
            proxy,
            revoke: HeapObject::function(None, revoke),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isolate::Isolate;
    use crate::object_ops;
    use std::rc::Rc;

    fn object() -> JsValue {
        JsValue::Object(HeapObject::ordinary(None))
    }

    #[test]
    fn test_create_requires_objects() {
        let err = Proxy::create(&JsValue::Smi(1), &object()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: Expected target argument of Proxy constructor to be object, got 1"
        );
        let err = Proxy::create(&object(), &JsValue::Undefined).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: Expected handler argument of Proxy constructor to be object, got undefined"
        );
    }

    #[test]
    fn test_create_exposes_slots() {
        let target = HeapObject::ordinary(None);
        let handler = HeapObject::ordinary(None);
        let proxy = Proxy::create(&JsValue::Object(target.clone()), &JsValue::Object(handler.clone()))
            .unwrap();
        let state = proxy.as_proxy().unwrap();
        assert!(Rc::ptr_eq(&state.target().unwrap(), &target));
        assert!(Rc::ptr_eq(&state.handler().unwrap(), &handler));
        assert!(!state.is_revoked());
        assert!(!proxy.is_callable());
    }

    #[test]
    fn test_revoke_is_one_shot() {
        let proxy = Proxy::create(&object(), &object()).unwrap();
        let state = proxy.as_proxy().unwrap();
        assert!(state.revoke());
        assert!(!state.revoke());
        assert!(state.is_revoked());
        assert!(state.target().is_none() && state.handler().is_none());
        assert!(matches!(state.active(), Err(UmbraError::RevokedAccess)));
    }

    #[test]
    fn test_revoked_proxy_is_a_valid_target() {
        let inner = Proxy::create(&object(), &object()).unwrap();
        inner.as_proxy().unwrap().revoke();
        assert!(Proxy::create(&JsValue::Object(inner.clone()), &object()).is_ok());
        assert!(Proxy::create(&object(), &JsValue::Object(inner)).is_ok());
    }

    #[test]
    fn test_callable_status_survives_revocation() {
        let f = HeapObject::function(None, JsFunction::new("f", 0, |_, _, _| Ok(JsValue::Undefined)));
        let proxy = Proxy::create(&JsValue::Object(f), &object()).unwrap();
        proxy.as_proxy().unwrap().revoke();
        assert!(proxy.is_callable());
        assert!(!proxy.is_constructor());
    }

    #[test]
    fn test_revocable_revoke_function() {
        let isolate = Isolate::new();
        let RevocableProxy { proxy, revoke } = Proxy::revocable(&object(), &object()).unwrap();
        let revoke = JsValue::Object(revoke);
        let result = object_ops::call(&isolate, &revoke, &JsValue::Undefined, &[]).unwrap();
        assert!(result.is_undefined());
        assert!(proxy.as_proxy().unwrap().is_revoked());
        // Second call is a no-op.
        assert!(object_ops::call(&isolate, &revoke, &JsValue::Undefined, &[]).is_ok());
    }
}
