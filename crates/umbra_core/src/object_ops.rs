//! Fundamental-operation dispatch (ECMAScript §7.3, §10.1).
//!
//! Every internal method an object can have is exposed here as a free
//! function taking the [`Isolate`] and an [`ObjectRef`].  Ordinary and
//! function objects run the ordinary algorithms directly against their
//! [`JsObject`] storage; proxies are routed to
//! [`proxy::internal_methods`][crate::proxy::internal_methods].
//!
//! The ordinary algorithms walk prototype chains iteratively and re-dispatch
//! as soon as they meet a proxy on the chain.  No `RefCell` borrow is held
//! across a call that can reach user code (getters, setters, traps).

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{UmbraError, UmbraResult};
use crate::isolate::Isolate;
use crate::objects::heap_object::{HeapObject, ObjectBody, ObjectRef};
use crate::objects::js_object::JsObject;
use crate::objects::property::{
    PartialDescriptor, PropertyAttributes, PropertyDescriptor, PropertyKey, PropertyKind,
};
use crate::objects::value::JsValue;
use crate::proxy::{ProxyObject, internal_methods};

/// How an object implements its internal methods.
enum Dispatch<'a> {
    Ordinary(&'a RefCell<JsObject>),
    Proxy(&'a ProxyObject),
}

fn dispatch(object: &HeapObject) -> Dispatch<'_> {
    match object.body() {
        ObjectBody::Ordinary(storage) | ObjectBody::Function { object: storage, .. } => {
            Dispatch::Ordinary(storage)
        }
        ObjectBody::Proxy(proxy) => Dispatch::Proxy(proxy),
    }
}

/// SameValue on optional objects (`None` is `null` or `undefined`).
pub(crate) fn same_object(a: &Option<ObjectRef>, b: &Option<ObjectRef>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

/// Returns `value` as an object or fails with `TypeError: <value> is not an object`.
pub fn require_object(value: &JsValue) -> UmbraResult<&ObjectRef> {
    value
        .as_object()
        .ok_or_else(|| UmbraError::TypeError(format!("{value} is not an object")))
}

// ──────────────────────────────────────────────────────────────────────────────
// [[GetPrototypeOf]] / [[SetPrototypeOf]]
// ──────────────────────────────────────────────────────────────────────────────

/// `O.[[GetPrototypeOf]]()`.
pub fn get_prototype_of(isolate: &Isolate, object: &ObjectRef) -> UmbraResult<Option<ObjectRef>> {
    match dispatch(object) {
        Dispatch::Ordinary(storage) => Ok(storage.borrow().prototype()),
        Dispatch::Proxy(proxy) => internal_methods::get_prototype_of(isolate, proxy),
    }
}

/// `O.[[SetPrototypeOf]](V)`.
///
/// The ordinary algorithm (§10.1.2.1) refuses to change the prototype of a
/// non-extensible object and refuses to create a cycle.  The cycle walk
/// stops at the first proxy on the chain.
pub fn set_prototype_of(
    isolate: &Isolate,
    object: &ObjectRef,
    prototype: Option<ObjectRef>,
) -> UmbraResult<bool> {
    let storage = match dispatch(object) {
        Dispatch::Ordinary(storage) => storage,
        Dispatch::Proxy(proxy) => {
            return internal_methods::set_prototype_of(isolate, proxy, prototype);
        }
    };
    let (current, extensible) = {
        let obj = storage.borrow();
        (obj.prototype(), obj.is_extensible())
    };
    if same_object(&prototype, &current) {
        return Ok(true);
    }
    if !extensible {
        return Ok(false);
    }
    let mut link = prototype.clone();
    while let Some(p) = link {
        if Rc::ptr_eq(&p, object) {
            return Ok(false);
        }
        link = match dispatch(&p) {
            Dispatch::Ordinary(s) => s.borrow().prototype(),
            Dispatch::Proxy(_) => None,
        };
    }
    storage.borrow_mut().set_prototype(prototype);
    Ok(true)
}

// ──────────────────────────────────────────────────────────────────────────────
// [[IsExtensible]] / [[PreventExtensions]]
// ──────────────────────────────────────────────────────────────────────────────

/// `O.[[IsExtensible]]()`.
pub fn is_extensible(isolate: &Isolate, object: &ObjectRef) -> UmbraResult<bool> {
    match dispatch(object) {
        Dispatch::Ordinary(storage) => Ok(storage.borrow().is_extensible()),
        Dispatch::Proxy(proxy) => internal_methods::is_extensible(isolate, proxy),
    }
}

/// `O.[[PreventExtensions]]()`.
pub fn prevent_extensions(isolate: &Isolate, object: &ObjectRef) -> UmbraResult<bool> {
    match dispatch(object) {
        Dispatch::Ordinary(storage) => Ok(storage.borrow_mut().prevent_extensions()),
        Dispatch::Proxy(proxy) => internal_methods::prevent_extensions(isolate, proxy),
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// [[GetOwnProperty]] / [[DefineOwnProperty]] / [[Delete]] / [[OwnPropertyKeys]]
// ──────────────────────────────────────────────────────────────────────────────

/// `O.[[GetOwnProperty]](P)`.
pub fn get_own_property(
    isolate: &Isolate,
    object: &ObjectRef,
    key: &PropertyKey,
) -> UmbraResult<Option<PropertyDescriptor>> {
    match dispatch(object) {
        Dispatch::Ordinary(storage) => Ok(storage.borrow().get_own_property(key)),
        Dispatch::Proxy(proxy) => internal_methods::get_own_property(isolate, proxy, key),
    }
}

/// `O.[[DefineOwnProperty]](P, Desc)`.
pub fn define_own_property(
    isolate: &Isolate,
    object: &ObjectRef,
    key: &PropertyKey,
    desc: &PartialDescriptor,
) -> UmbraResult<bool> {
    match dispatch(object) {
        Dispatch::Ordinary(storage) => {
            Ok(storage.borrow_mut().define_own_property(key.clone(), desc))
        }
        Dispatch::Proxy(proxy) => internal_methods::define_own_property(isolate, proxy, key, desc),
    }
}

/// `O.[[Delete]](P)`.
pub fn delete(isolate: &Isolate, object: &ObjectRef, key: &PropertyKey) -> UmbraResult<bool> {
    match dispatch(object) {
        Dispatch::Ordinary(storage) => Ok(storage.borrow_mut().delete(key)),
        Dispatch::Proxy(proxy) => internal_methods::delete(isolate, proxy, key),
    }
}

/// `O.[[OwnPropertyKeys]]()`.
pub fn own_property_keys(isolate: &Isolate, object: &ObjectRef) -> UmbraResult<Vec<PropertyKey>> {
    match dispatch(object) {
        Dispatch::Ordinary(storage) => Ok(storage.borrow().own_property_keys()),
        Dispatch::Proxy(proxy) => internal_methods::own_property_keys(isolate, proxy),
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// [[HasProperty]] / [[Get]] / [[Set]]
// ──────────────────────────────────────────────────────────────────────────────

/// `O.[[HasProperty]](P)`; OrdinaryHasProperty is §10.1.7.1.
pub fn has_property(isolate: &Isolate, object: &ObjectRef, key: &PropertyKey) -> UmbraResult<bool> {
    let mut current = Rc::clone(object);
    loop {
        let parent = match dispatch(&current) {
            Dispatch::Proxy(proxy) => return internal_methods::has(isolate, proxy, key),
            Dispatch::Ordinary(storage) => {
                let obj = storage.borrow();
                if obj.has_own_property(key) {
                    return Ok(true);
                }
                obj.prototype()
            }
        };
        match parent {
            Some(parent) => current = parent,
            None => return Ok(false),
        }
    }
}

/// `O.[[Get]](P, Receiver)`; OrdinaryGet is §10.1.8.1.
///
/// Getters are invoked with `receiver` as `this`.
pub fn get(
    isolate: &Isolate,
    object: &ObjectRef,
    key: &PropertyKey,
    receiver: &JsValue,
) -> UmbraResult<JsValue> {
    let mut current = Rc::clone(object);
    loop {
        let (own, parent) = match dispatch(&current) {
            Dispatch::Proxy(proxy) => return internal_methods::get(isolate, proxy, key, receiver),
            Dispatch::Ordinary(storage) => {
                let obj = storage.borrow();
                (obj.get_own_property(key), obj.prototype())
            }
        };
        match own {
            Some(PropertyDescriptor {
                kind: PropertyKind::Data { value, .. },
                ..
            }) => return Ok(value),
            Some(PropertyDescriptor {
                kind: PropertyKind::Accessor { get: None, .. },
                ..
            }) => return Ok(JsValue::Undefined),
            Some(PropertyDescriptor {
                kind: PropertyKind::Accessor { get: Some(getter), .. },
                ..
            }) => return call(isolate, &JsValue::Object(getter), receiver, &[]),
            None => match parent {
                Some(parent) => current = parent,
                None => return Ok(JsValue::Undefined),
            },
        }
    }
}

/// `O.[[Get]](P)` with `O` itself as the receiver.
pub fn get_property(isolate: &Isolate, object: &ObjectRef, key: &PropertyKey) -> UmbraResult<JsValue> {
    get(isolate, object, key, &JsValue::Object(Rc::clone(object)))
}

/// `O.[[Set]](P, V, Receiver)`; OrdinarySet is §10.1.9.1.
///
/// Returns `false` for an ordinary failure (non-writable property, missing
/// setter, non-object receiver, rejected definition on the receiver).
pub fn set(
    isolate: &Isolate,
    object: &ObjectRef,
    key: &PropertyKey,
    value: JsValue,
    receiver: &JsValue,
) -> UmbraResult<bool> {
    let mut current = Rc::clone(object);
    let own = loop {
        let (own, parent) = match dispatch(&current) {
            Dispatch::Proxy(proxy) => {
                return internal_methods::set(isolate, proxy, key, value, receiver);
            }
            Dispatch::Ordinary(storage) => {
                let obj = storage.borrow();
                (obj.get_own_property(key), obj.prototype())
            }
        };
        match (own, parent) {
            (Some(own), _) => break own,
            (None, Some(parent)) => current = parent,
            (None, None) => {
                break PropertyDescriptor::data(JsValue::Undefined, PropertyAttributes::DEFAULT);
            }
        }
    };

    match own.kind {
        PropertyKind::Data { writable: false, .. } => Ok(false),
        PropertyKind::Data { writable: true, .. } => {
            let Some(receiver) = receiver.as_object() else {
                return Ok(false);
            };
            match get_own_property(isolate, receiver, key)? {
                Some(existing) if existing.is_accessor() || !existing.is_writable() => Ok(false),
                Some(_) => define_own_property(
                    isolate,
                    receiver,
                    key,
                    &PartialDescriptor::new().with_value(value),
                ),
                None => create_data_property(isolate, receiver, key, value),
            }
        }
        PropertyKind::Accessor { set: None, .. } => Ok(false),
        PropertyKind::Accessor { set: Some(setter), .. } => {
            call(isolate, &JsValue::Object(setter), receiver, &[value])?;
            Ok(true)
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// [[Call]] / [[Construct]]
// ──────────────────────────────────────────────────────────────────────────────

/// Call(F, V, argumentsList) (§7.3.14).
///
/// Fails with `NotCallable` if `callee` has no `[[Call]]` method.  Calling a
/// function object consumes one level of call depth.
pub fn call(isolate: &Isolate, callee: &JsValue, this: &JsValue, args: &[JsValue]) -> UmbraResult<JsValue> {
    let Some(object) = callee.as_object() else {
        return Err(UmbraError::NotCallable(callee.to_string()));
    };
    match object.body() {
        ObjectBody::Function { function, .. } => {
            let _guard = isolate.enter()?;
            function.call(isolate, this, args)
        }
        ObjectBody::Proxy(proxy) if proxy.is_callable() => {
            internal_methods::call(isolate, proxy, this, args)
        }
        _ => Err(UmbraError::NotCallable(callee.to_string())),
    }
}

/// Construct(F, argumentsList, newTarget) (§7.3.15).
///
/// `new_target` defaults to `constructor`.
pub fn construct(
    isolate: &Isolate,
    constructor: &ObjectRef,
    args: &[JsValue],
    new_target: Option<&ObjectRef>,
) -> UmbraResult<ObjectRef> {
    let new_target = new_target.unwrap_or(constructor);
    match constructor.body() {
        ObjectBody::Function { function, .. } => {
            let _guard = isolate.enter()?;
            function
                .construct(isolate, args, new_target)
                .unwrap_or_else(|| Err(UmbraError::NotConstructor(constructor.to_string())))
        }
        ObjectBody::Proxy(proxy) if proxy.is_constructor() => {
            internal_methods::construct(isolate, proxy, args, new_target)
        }
        _ => Err(UmbraError::NotConstructor(constructor.to_string())),
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Throw-on-failure helpers (§7.3)
// ──────────────────────────────────────────────────────────────────────────────

fn returned_false(method: &str) -> UmbraError {
    UmbraError::TypeError(format!("Object's [[{method}]] method returned false"))
}

/// DefinePropertyOrThrow (§7.3.8).
pub fn define_property_or_throw(
    isolate: &Isolate,
    object: &ObjectRef,
    key: &PropertyKey,
    desc: &PartialDescriptor,
) -> UmbraResult<()> {
    if define_own_property(isolate, object, key, desc)? {
        Ok(())
    } else {
        Err(returned_false("DefineProperty"))
    }
}

/// `[[SetPrototypeOf]]`, upgrading `false` to a `TypeError`.
pub fn set_prototype_of_or_throw(
    isolate: &Isolate,
    object: &ObjectRef,
    prototype: Option<ObjectRef>,
) -> UmbraResult<()> {
    if set_prototype_of(isolate, object, prototype)? {
        Ok(())
    } else {
        Err(returned_false("SetPrototypeOf"))
    }
}

/// `[[PreventExtensions]]`, upgrading `false` to a `TypeError`.
pub fn prevent_extensions_or_throw(isolate: &Isolate, object: &ObjectRef) -> UmbraResult<()> {
    if prevent_extensions(isolate, object)? {
        Ok(())
    } else {
        Err(returned_false("PreventExtensions"))
    }
}

/// DeletePropertyOrThrow (§7.3.10).
pub fn delete_property_or_throw(isolate: &Isolate, object: &ObjectRef, key: &PropertyKey) -> UmbraResult<()> {
    if delete(isolate, object, key)? {
        Ok(())
    } else {
        Err(returned_false("Delete"))
    }
}

/// Set(O, P, V, true) (§7.3.4): `O` is the receiver.
pub fn set_or_throw(isolate: &Isolate, object: &ObjectRef, key: &PropertyKey, value: JsValue) -> UmbraResult<()> {
    let receiver = JsValue::Object(Rc::clone(object));
    if set(isolate, object, key, value, &receiver)? {
        Ok(())
    } else {
        Err(returned_false("Set"))
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Object and descriptor helpers
// ──────────────────────────────────────────────────────────────────────────────

/// CreateDataProperty (§7.3.5).
pub fn create_data_property(
    isolate: &Isolate,
    object: &ObjectRef,
    key: &PropertyKey,
    value: JsValue,
) -> UmbraResult<bool> {
    let desc = PartialDescriptor::from(PropertyDescriptor::data(value, PropertyAttributes::DEFAULT));
    define_own_property(isolate, object, key, &desc)
}

/// Defines a default-attribute data property on a freshly allocated ordinary
/// object, which cannot fail.
fn init_data_property(object: &ObjectRef, key: &str, value: JsValue, attributes: PropertyAttributes) {
    if let Some(storage) = object.storage() {
        let desc = PartialDescriptor::from(PropertyDescriptor::data(value, attributes));
        storage.borrow_mut().define_own_property(PropertyKey::from(key), &desc);
    }
}

/// CreateArrayFromList (§7.3.17).
///
/// Produces an ordinary object with index properties and a non-enumerable
/// `length`.
pub fn create_array_from_list(elements: &[JsValue]) -> ObjectRef {
    let array = HeapObject::ordinary(None);
    for (index, element) in elements.iter().enumerate() {
        init_data_property(&array, &index.to_string(), element.clone(), PropertyAttributes::DEFAULT);
    }
    let length = i32::try_from(elements.len())
        .map(JsValue::Smi)
        .unwrap_or(JsValue::HeapNumber(elements.len() as f64));
    init_data_property(&array, "length", length, PropertyAttributes::WRITABLE);
    array
}

/// CreateListFromArrayLike (§7.3.18): reads `length` and then every index
/// through `[[Get]]`.
pub fn create_list_from_array_like(isolate: &Isolate, value: &JsValue) -> UmbraResult<Vec<JsValue>> {
    let object = require_object(value)?;
    let length = get_property(isolate, object, &PropertyKey::from("length"))?.to_length()?;
    let mut list = Vec::with_capacity(length.min(1024));
    for index in 0..length {
        list.push(get_property(isolate, object, &PropertyKey::from(index.to_string()))?);
    }
    Ok(list)
}

/// FromPropertyDescriptor (§6.2.6.4): converts a descriptor into an
/// ordinary object carrying only the fields the descriptor has.
pub fn from_property_descriptor(desc: &PartialDescriptor) -> ObjectRef {
    let object = HeapObject::ordinary(None);
    let put = |key: &str, value: JsValue| {
        init_data_property(&object, key, value, PropertyAttributes::DEFAULT);
    };
    if let Some(value) = &desc.value {
        put("value", value.clone());
    }
    if let Some(writable) = desc.writable {
        put("writable", JsValue::Boolean(writable));
    }
    if let Some(get) = &desc.get {
        put("get", get.clone().map_or(JsValue::Undefined, JsValue::Object));
    }
    if let Some(set) = &desc.set {
        put("set", set.clone().map_or(JsValue::Undefined, JsValue::Object));
    }
    if let Some(enumerable) = desc.enumerable {
        put("enumerable", JsValue::Boolean(enumerable));
    }
    if let Some(configurable) = desc.configurable {
        put("configurable", JsValue::Boolean(configurable));
    }
    object
}

/// ToPropertyDescriptor (§6.2.6.5).
///
/// Fields are probed with `[[HasProperty]]` and read with `[[Get]]`, so a
/// proxy passed as the descriptor observes every probe.
pub fn to_property_descriptor(isolate: &Isolate, value: &JsValue) -> UmbraResult<PartialDescriptor> {
    let object = require_object(value)?;
    let field = |name: &str| -> UmbraResult<Option<JsValue>> {
        let key = PropertyKey::from(name);
        if has_property(isolate, object, &key)? {
            get_property(isolate, object, &key).map(Some)
        } else {
            Ok(None)
        }
    };
    let accessor = |name: &str| -> UmbraResult<Option<Option<ObjectRef>>> {
        match field(name)? {
            None => Ok(None),
            Some(JsValue::Undefined) => Ok(Some(None)),
            Some(f) if f.is_callable() => Ok(f.as_object().cloned().map(Some)),
            Some(_) => Err(UmbraError::TypeError(format!(
                "Accessor property descriptor's '{name}' field must be a function or undefined"
            ))),
        }
    };

    let desc = PartialDescriptor {
        enumerable: field("enumerable")?.map(|v| v.to_boolean()),
        configurable: field("configurable")?.map(|v| v.to_boolean()),
        value: field("value")?,
        writable: field("writable")?.map(|v| v.to_boolean()),
        get: accessor("get")?,
        set: accessor("set")?,
    };
    if desc.is_accessor_descriptor() && desc.is_data_descriptor() {
        return Err(UmbraError::TypeError(
            "Accessor property descriptor cannot specify a value or writable key".to_string(),
        ));
    }
    Ok(desc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::js_function::JsFunction;

    fn key(s: &str) -> PropertyKey {
        PropertyKey::from(s)
    }

    fn object_with(isolate: &Isolate, props: &[(&str, JsValue)]) -> ObjectRef {
        let obj = HeapObject::ordinary(None);
        for (k, v) in props {
            create_data_property(isolate, &obj, &key(k), v.clone()).unwrap();
        }
        obj
    }

    fn native(f: impl Fn(&Isolate, &JsValue, &[JsValue]) -> UmbraResult<JsValue> + 'static) -> ObjectRef {
        HeapObject::function(None, JsFunction::new("native", 0, f))
    }

    // ── Prototype chain ───────────────────────────────────────────────────────

    #[test]
    fn test_get_walks_prototype_chain() {
        let isolate = Isolate::new();
        let proto = object_with(&isolate, &[("inherited", JsValue::Smi(7))]);
        let child = HeapObject::ordinary(Some(proto));
        assert_eq!(get_property(&isolate, &child, &key("inherited")).unwrap(), JsValue::Smi(7));
        assert!(has_property(&isolate, &child, &key("inherited")).unwrap());
        assert!(!has_property(&isolate, &child, &key("missing")).unwrap());
        assert_eq!(get_property(&isolate, &child, &key("missing")).unwrap(), JsValue::Undefined);
    }

    #[test]
    fn test_set_prototype_rejects_cycles() {
        let isolate = Isolate::new();
        let a = HeapObject::ordinary(None);
        let b = HeapObject::ordinary(Some(Rc::clone(&a)));
        assert!(!set_prototype_of(&isolate, &a, Some(Rc::clone(&b))).unwrap());
        assert!(!set_prototype_of(&isolate, &a, Some(Rc::clone(&a))).unwrap());
        assert!(set_prototype_of(&isolate, &b, None).unwrap());
    }

    #[test]
    fn test_set_prototype_on_non_extensible() {
        let isolate = Isolate::new();
        let proto = HeapObject::ordinary(None);
        let obj = HeapObject::ordinary(Some(Rc::clone(&proto)));
        prevent_extensions(&isolate, &obj).unwrap();
        assert!(set_prototype_of(&isolate, &obj, Some(Rc::clone(&proto))).unwrap());
        assert!(!set_prototype_of(&isolate, &obj, None).unwrap());
        assert!(matches!(
            set_prototype_of_or_throw(&isolate, &obj, None),
            Err(UmbraError::TypeError(m)) if m == "Object's [[SetPrototypeOf]] method returned false"
        ));
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    #[test]
    fn test_getter_receives_receiver() {
        let isolate = Isolate::new();
        let getter = native(|_, this, _| Ok(this.clone()));
        let obj = HeapObject::ordinary(None);
        define_property_or_throw(
            &isolate,
            &obj,
            &key("me"),
            &PartialDescriptor::new().with_get(Some(getter)),
        )
        .unwrap();
        let receiver = JsValue::Smi(5);
        assert_eq!(get(&isolate, &obj, &key("me"), &receiver).unwrap(), JsValue::Smi(5));
    }

    #[test]
    fn test_setter_is_invoked() {
        let isolate = Isolate::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let setter = native(move |_, _, args| {
            sink.borrow_mut().push(args[0].clone());
            Ok(JsValue::Undefined)
        });
        let obj = HeapObject::ordinary(None);
        define_property_or_throw(
            &isolate,
            &obj,
            &key("x"),
            &PartialDescriptor::new().with_set(Some(setter)),
        )
        .unwrap();
        set_or_throw(&isolate, &obj, &key("x"), JsValue::Smi(3)).unwrap();
        assert_eq!(*log.borrow(), vec![JsValue::Smi(3)]);
    }

    #[test]
    fn test_set_without_setter_fails() {
        let isolate = Isolate::new();
        let obj = HeapObject::ordinary(None);
        define_property_or_throw(&isolate, &obj, &key("x"), &PartialDescriptor::new().with_get(None))
            .unwrap();
        let receiver = JsValue::Object(Rc::clone(&obj));
        assert!(!set(&isolate, &obj, &key("x"), JsValue::Smi(1), &receiver).unwrap());
        assert!(matches!(
            set_or_throw(&isolate, &obj, &key("x"), JsValue::Smi(1)),
            Err(UmbraError::TypeError(m)) if m == "Object's [[Set]] method returned false"
        ));
    }

    // ── OrdinarySet ───────────────────────────────────────────────────────────

    #[test]
    fn test_set_defines_on_receiver_not_prototype() {
        let isolate = Isolate::new();
        let proto = object_with(&isolate, &[("x", JsValue::Smi(1))]);
        let child = HeapObject::ordinary(Some(Rc::clone(&proto)));
        set_or_throw(&isolate, &child, &key("x"), JsValue::Smi(2)).unwrap();
        assert_eq!(get_property(&isolate, &proto, &key("x")).unwrap(), JsValue::Smi(1));
        assert_eq!(get_property(&isolate, &child, &key("x")).unwrap(), JsValue::Smi(2));
    }

    #[test]
    fn test_set_respects_inherited_read_only() {
        let isolate = Isolate::new();
        let proto = HeapObject::ordinary(None);
        define_property_or_throw(
            &isolate,
            &proto,
            &key("x"),
            &PartialDescriptor::new().with_value(1).with_writable(false),
        )
        .unwrap();
        let child = HeapObject::ordinary(Some(proto));
        let receiver = JsValue::Object(Rc::clone(&child));
        assert!(!set(&isolate, &child, &key("x"), JsValue::Smi(2), &receiver).unwrap());
        assert!(get_own_property(&isolate, &child, &key("x")).unwrap().is_none());
    }

    #[test]
    fn test_set_with_primitive_receiver_fails() {
        let isolate = Isolate::new();
        let obj = HeapObject::ordinary(None);
        assert!(!set(&isolate, &obj, &key("x"), JsValue::Smi(1), &JsValue::Smi(0)).unwrap());
    }

    // ── Throw-on-failure ──────────────────────────────────────────────────────

    #[test]
    fn test_delete_property_or_throw() {
        let isolate = Isolate::new();
        let obj = HeapObject::ordinary(None);
        define_property_or_throw(&isolate, &obj, &key("x"), &PartialDescriptor::new().with_value(1))
            .unwrap();
        assert!(matches!(
            delete_property_or_throw(&isolate, &obj, &key("x")),
            Err(UmbraError::TypeError(m)) if m == "Object's [[Delete]] method returned false"
        ));
    }

    #[test]
    fn test_define_property_or_throw_on_non_extensible() {
        let isolate = Isolate::new();
        let obj = HeapObject::ordinary(None);
        prevent_extensions_or_throw(&isolate, &obj).unwrap();
        assert!(matches!(
            define_property_or_throw(&isolate, &obj, &key("x"), &PartialDescriptor::new()),
            Err(UmbraError::TypeError(m)) if m == "Object's [[DefineProperty]] method returned false"
        ));
    }

    // ── Call / Construct ──────────────────────────────────────────────────────

    #[test]
    fn test_call_non_callable() {
        let isolate = Isolate::new();
        let obj = JsValue::Object(HeapObject::ordinary(None));
        assert!(matches!(
            call(&isolate, &obj, &JsValue::Undefined, &[]),
            Err(UmbraError::NotCallable(_))
        ));
        assert!(matches!(
            call(&isolate, &JsValue::Smi(1), &JsValue::Undefined, &[]),
            Err(UmbraError::NotCallable(s)) if s == "1"
        ));
    }

    #[test]
    fn test_call_accounts_for_depth() {
        let isolate = Isolate::new();
        let f = native(|isolate, _, _| Ok(JsValue::Smi(isolate.call_depth() as i32)));
        let depth = call(&isolate, &JsValue::Object(f), &JsValue::Undefined, &[]).unwrap();
        assert_eq!(depth, JsValue::Smi(1));
        assert_eq!(isolate.call_depth(), 0);
    }

    #[test]
    fn test_construct_defaults_new_target() {
        let isolate = Isolate::new();
        let ctor = HeapObject::function(
            None,
            JsFunction::new("Ctor", 0, |_, _, _| Ok(JsValue::Undefined)).with_construct(
                |_, _, new_target| Ok(HeapObject::ordinary(Some(Rc::clone(new_target)))),
            ),
        );
        let instance = construct(&isolate, &ctor, &[], None).unwrap();
        let proto = get_prototype_of(&isolate, &instance).unwrap().unwrap();
        assert!(Rc::ptr_eq(&proto, &ctor));

        let plain = native(|_, _, _| Ok(JsValue::Undefined));
        assert!(matches!(
            construct(&isolate, &plain, &[], None),
            Err(UmbraError::NotConstructor(_))
        ));
    }

    // ── Array-likes and descriptors ───────────────────────────────────────────

    #[test]
    fn test_array_from_list_round_trips() {
        let isolate = Isolate::new();
        let array = create_array_from_list(&[JsValue::Smi(1), JsValue::from("two")]);
        let length = get_own_property(&isolate, &array, &key("length")).unwrap().unwrap();
        assert!(!length.enumerable);
        let list = create_list_from_array_like(&isolate, &JsValue::Object(array)).unwrap();
        assert_eq!(list, vec![JsValue::Smi(1), JsValue::from("two")]);
    }

    #[test]
    fn test_list_from_non_object_fails() {
        let isolate = Isolate::new();
        assert!(matches!(
            create_list_from_array_like(&isolate, &JsValue::Smi(3)),
            Err(UmbraError::TypeError(m)) if m == "3 is not an object"
        ));
    }

    #[test]
    fn test_descriptor_object_conversion() {
        let isolate = Isolate::new();
        let desc = PartialDescriptor::new().with_value(4).with_configurable(false);
        let object = from_property_descriptor(&desc);
        assert_eq!(
            own_property_keys(&isolate, &object).unwrap(),
            vec![key("value"), key("configurable")]
        );
        let back = to_property_descriptor(&isolate, &JsValue::Object(object)).unwrap();
        assert_eq!(back.value, Some(JsValue::Smi(4)));
        assert_eq!(back.configurable, Some(false));
        assert!(back.writable.is_none() && back.enumerable.is_none());
    }

    #[test]
    fn test_to_property_descriptor_rejects_mixed_and_bad_getter() {
        let isolate = Isolate::new();
        let getter = native(|_, _, _| Ok(JsValue::Undefined));
        let mixed = object_with(&isolate, &[("get", JsValue::Object(getter)), ("value", JsValue::Smi(1))]);
        assert!(matches!(
            to_property_descriptor(&isolate, &JsValue::Object(mixed)),
            Err(UmbraError::TypeError(_))
        ));
        let bad = object_with(&isolate, &[("set", JsValue::Smi(1))]);
        assert!(matches!(
            to_property_descriptor(&isolate, &JsValue::Object(bad)),
            Err(UmbraError::TypeError(_))
        ));
    }
}
