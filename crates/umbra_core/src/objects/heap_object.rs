//! The [`HeapObject`] type shared by every kind of object.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::objects::js_function::JsFunction;
use crate::objects::js_object::JsObject;
use crate::proxy::ProxyObject;

/// Shared, reference-counted handle to an object.
///
/// Identity is pointer identity ([`Rc::ptr_eq`]).
pub type ObjectRef = Rc<HeapObject>;

/// The representation-specific part of a [`HeapObject`].
#[derive(Debug)]
pub enum ObjectBody {
    /// An ordinary object.
    Ordinary(RefCell<JsObject>),
    /// A function object: ordinary property storage plus a callable.
    Function {
        /// Own properties, prototype and extensibility.
        object: RefCell<JsObject>,
        /// `[[Call]]` / `[[Construct]]` behaviour.
        function: JsFunction,
    },
    /// A proxy exotic object (ECMAScript §10.5).
    Proxy(ProxyObject),
}

/// Any object reachable from a [`JsValue`][crate::objects::value::JsValue].
///
/// Ordinary and function objects store their state in a [`JsObject`] behind
/// a `RefCell`; proxies store none of their own and delegate everything to
/// their handler and target.
pub struct HeapObject {
    body: ObjectBody,
}

impl HeapObject {
    /// Allocates an empty ordinary object.
    pub fn ordinary(prototype: Option<ObjectRef>) -> ObjectRef {
        Rc::new(Self {
            body: ObjectBody::Ordinary(RefCell::new(JsObject::new(prototype))),
        })
    }

    /// Allocates a function object.
    pub fn function(prototype: Option<ObjectRef>, function: JsFunction) -> ObjectRef {
        Rc::new(Self {
            body: ObjectBody::Function {
                object: RefCell::new(JsObject::new(prototype)),
                function,
            },
        })
    }

    /// Allocates a proxy object.  Use [`Proxy::create`][crate::proxy::Proxy::create].
    pub(crate) fn proxy(proxy: ProxyObject) -> ObjectRef {
        Rc::new(Self {
            body: ObjectBody::Proxy(proxy),
        })
    }

    /// Returns the representation-specific body.
    pub fn body(&self) -> &ObjectBody {
        &self.body
    }

    /// Returns the property storage of an ordinary or function object, or
    /// `None` for proxies.
    pub fn storage(&self) -> Option<&RefCell<JsObject>> {
        match &self.body {
            ObjectBody::Ordinary(object) | ObjectBody::Function { object, .. } => Some(object),
            ObjectBody::Proxy(_) => None,
        }
    }

    /// Returns the callable half of a function object.
    pub fn as_function(&self) -> Option<&JsFunction> {
        match &self.body {
            ObjectBody::Function { function, .. } => Some(function),
            _ => None,
        }
    }

    /// Returns the proxy state of a proxy object.
    pub fn as_proxy(&self) -> Option<&ProxyObject> {
        match &self.body {
            ObjectBody::Proxy(proxy) => Some(proxy),
            _ => None,
        }
    }

    /// Returns `true` for proxy exotic objects.
    pub fn is_proxy(&self) -> bool {
        matches!(self.body, ObjectBody::Proxy(_))
    }

    /// Returns `true` if the object has a `[[Call]]` internal method.
    pub fn is_callable(&self) -> bool {
        match &self.body {
            ObjectBody::Ordinary(_) => false,
            ObjectBody::Function { .. } => true,
            ObjectBody::Proxy(proxy) => proxy.is_callable(),
        }
    }

    /// Returns `true` if the object has a `[[Construct]]` internal method.
    pub fn is_constructor(&self) -> bool {
        match &self.body {
            ObjectBody::Ordinary(_) => false,
            ObjectBody::Function { function, .. } => function.is_constructor(),
            ObjectBody::Proxy(proxy) => proxy.is_constructor(),
        }
    }
}

// Object graphs may be cyclic, so Debug prints only the object's kind.
impl fmt::Debug for HeapObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.body {
            ObjectBody::Ordinary(_) => "Ordinary",
            ObjectBody::Function { .. } => "Function",
            ObjectBody::Proxy(_) => "Proxy",
        };
        f.debug_struct("HeapObject")
            .field("kind", &kind)
            .field("addr", &(self as *const Self))
            .finish()
    }
}

impl fmt::Display for HeapObject {
    /// Side-effect free rendering used in diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            ObjectBody::Ordinary(_) => f.write_str("[object Object]"),
            ObjectBody::Function { function, .. } => {
                write!(f, "[object Function {}]", function.name())
            }
            ObjectBody::Proxy(_) => f.write_str("[object ProxyObject]"),
        }
    }
}
