//! The built-in catalogue of Proxy conformance scenarios.
//!
//! Each scenario builds its own objects on a fresh [`Isolate`] and returns
//! `Err` with a human-readable reason when the engine misbehaves.

use std::cell::RefCell;
use std::rc::Rc;

use umbra_core::config::IsolateConfig;
use umbra_core::object_ops;
use umbra_core::objects::js_function::JsFunction;
use umbra_core::objects::property::{PartialDescriptor, PropertyKey};
use umbra_core::{HeapObject, Isolate, JsValue, ObjectRef, Proxy, UmbraError, UmbraResult, Violation};

/// Outcome of a single scenario.
pub type Outcome = Result<(), String>;

/// A named, self-contained check.
pub struct Scenario {
    pub name: &'static str,
    pub run: fn(&IsolateConfig) -> Outcome,
}

/// Every scenario, in execution order.
pub fn catalogue() -> Vec<Scenario> {
    vec![
        Scenario { name: "forwarding/empty-handler", run: forwarding_empty_handler },
        Scenario { name: "forwarding/nullish-traps", run: forwarding_nullish_traps },
        Scenario { name: "forwarding/accessor-target", run: forwarding_accessor_target },
        Scenario { name: "forwarding/no-caching", run: forwarding_no_caching },
        Scenario { name: "get/immutable-data-property", run: get_immutable_data_property },
        Scenario { name: "has/non-configurable", run: has_non_configurable },
        Scenario { name: "define/absent-key-non-extensible", run: define_absent_key_non_extensible },
        Scenario { name: "define/demotion", run: define_demotion },
        Scenario { name: "set-prototype-of/non-extensible", run: set_prototype_of_non_extensible },
        Scenario { name: "revocation/all-operations", run: revocation_all_operations },
        Scenario { name: "revocation/idempotent", run: revocation_idempotent },
        Scenario { name: "recursion/handler-prototype-loop", run: recursion_handler_prototype_loop },
        Scenario { name: "traps/arguments", run: traps_arguments },
        Scenario { name: "traps/errors-propagate", run: traps_errors_propagate },
    ]
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn key(s: &str) -> PropertyKey {
    PropertyKey::from(s)
}

fn check(condition: bool, what: &str) -> Outcome {
    if condition { Ok(()) } else { Err(what.to_string()) }
}

fn engine<T>(result: UmbraResult<T>) -> Result<T, String> {
    result.map_err(|e| format!("unexpected error: {e}"))
}

fn expect_violation<T>(result: UmbraResult<T>, expected: Violation) -> Outcome {
    match result {
        Err(UmbraError::InvariantViolation(v)) if v == expected => Ok(()),
        Err(e) => Err(format!("expected `{expected}`, got `{e}`")),
        Ok(_) => Err(format!("expected `{expected}`, operation succeeded")),
    }
}

fn function(f: impl Fn(&Isolate, &JsValue, &[JsValue]) -> UmbraResult<JsValue> + 'static) -> JsValue {
    JsValue::Object(HeapObject::function(None, JsFunction::new("trap", 0, f)))
}

fn handler(isolate: &Isolate, traps: &[(&str, JsValue)]) -> Result<ObjectRef, String> {
    let handler = HeapObject::ordinary(None);
    for (name, trap) in traps {
        engine(object_ops::create_data_property(isolate, &handler, &key(name), trap.clone()))?;
    }
    Ok(handler)
}

fn proxy(target: &ObjectRef, handler: &ObjectRef) -> Result<ObjectRef, String> {
    engine(Proxy::create(
        &JsValue::Object(target.clone()),
        &JsValue::Object(handler.clone()),
    ))
}

fn define(isolate: &Isolate, object: &ObjectRef, name: &str, desc: PartialDescriptor) -> Outcome {
    engine(object_ops::define_property_or_throw(isolate, object, &key(name), &desc))
}

fn frozen(value: i32) -> PartialDescriptor {
    PartialDescriptor::new()
        .with_value(value)
        .with_writable(false)
        .with_enumerable(false)
        .with_configurable(false)
}

/// Compares every read-only operation on `proxy` with the same operation on
/// `target`.
fn compare_reads(isolate: &Isolate, target: &ObjectRef, proxy: &ObjectRef, names: &[&str]) -> Outcome {
    check(
        engine(object_ops::own_property_keys(isolate, target))?
            == engine(object_ops::own_property_keys(isolate, proxy))?,
        "own keys differ",
    )?;
    check(
        engine(object_ops::is_extensible(isolate, target))?
            == engine(object_ops::is_extensible(isolate, proxy))?,
        "extensibility differs",
    )?;
    check(
        JsValue::from(engine(object_ops::get_prototype_of(isolate, target))?)
            == JsValue::from(engine(object_ops::get_prototype_of(isolate, proxy))?),
        "prototype differs",
    )?;
    for name in names {
        let k = key(name);
        let receiver = JsValue::Object(target.clone());
        check(
            engine(object_ops::get(isolate, target, &k, &receiver))?
                == engine(object_ops::get(isolate, proxy, &k, &receiver))?,
            &format!("get({name}) differs"),
        )?;
        check(
            engine(object_ops::has_property(isolate, target, &k))?
                == engine(object_ops::has_property(isolate, proxy, &k))?,
            &format!("has({name}) differs"),
        )?;
        let direct = engine(object_ops::get_own_property(isolate, target, &k))?;
        let forwarded = engine(object_ops::get_own_property(isolate, proxy, &k))?;
        check(
            direct.map(|d| d.attributes()) == forwarded.map(|d| d.attributes()),
            &format!("getOwnPropertyDescriptor({name}) differs"),
        )?;
    }
    Ok(())
}

// ── Forwarding ────────────────────────────────────────────────────────────────

fn forwarding_empty_handler(config: &IsolateConfig) -> Outcome {
    let isolate = Isolate::with_config(*config);
    let proto = HeapObject::ordinary(None);
    define(&isolate, &proto, "inherited", PartialDescriptor::new().with_value(1))?;
    let target = HeapObject::ordinary(Some(proto));
    engine(object_ops::create_data_property(&isolate, &target, &key("a"), JsValue::Smi(1)))?;
    define(&isolate, &target, "frozen", frozen(2))?;
    let p = proxy(&target, &HeapObject::ordinary(None))?;
    compare_reads(&isolate, &target, &p, &["a", "frozen", "inherited", "missing"])?;

    engine(object_ops::set_or_throw(&isolate, &p, &key("b"), JsValue::Smi(3)))?;
    check(
        engine(object_ops::get_own_property(&isolate, &target, &key("b")))?.is_some(),
        "set through proxy did not reach target",
    )?;
    engine(object_ops::delete_property_or_throw(&isolate, &p, &key("b")))?;
    check(
        !engine(object_ops::has_property(&isolate, &target, &key("b")))?,
        "delete through proxy did not reach target",
    )?;
    engine(object_ops::prevent_extensions_or_throw(&isolate, &p))?;
    check(
        !engine(object_ops::is_extensible(&isolate, &target))?,
        "preventExtensions through proxy did not reach target",
    )?;
    compare_reads(&isolate, &target, &p, &["a", "frozen"])
}

fn forwarding_nullish_traps(config: &IsolateConfig) -> Outcome {
    let isolate = Isolate::with_config(*config);
    let target = HeapObject::ordinary(None);
    engine(object_ops::create_data_property(&isolate, &target, &key("x"), JsValue::Smi(5)))?;
    let traps: Vec<(&str, JsValue)> = ["get", "has", "ownKeys", "getOwnPropertyDescriptor", "isExtensible"]
        .iter()
        .enumerate()
        .map(|(i, name)| (*name, if i % 2 == 0 { JsValue::Undefined } else { JsValue::Null }))
        .collect();
    let p = proxy(&target, &handler(&isolate, &traps)?)?;
    compare_reads(&isolate, &target, &p, &["x", "y"])
}

fn forwarding_accessor_target(config: &IsolateConfig) -> Outcome {
    let isolate = Isolate::with_config(*config);
    let target = HeapObject::ordinary(None);
    let getter = function(|_, this, _| Ok(this.clone()));
    let getter = getter.as_object().cloned();
    define(&isolate, &target, "self", PartialDescriptor::new().with_get(getter))?;
    let p = proxy(&target, &HeapObject::ordinary(None))?;
    let receiver = JsValue::Object(p.clone());
    let value = engine(object_ops::get(&isolate, &p, &key("self"), &receiver))?;
    check(value == receiver, "getter did not receive the proxy as receiver")?;
    compare_reads(&isolate, &target, &p, &["self"])
}

fn forwarding_no_caching(config: &IsolateConfig) -> Outcome {
    let isolate = Isolate::with_config(*config);
    let target = HeapObject::ordinary(None);
    let p = proxy(&target, &HeapObject::ordinary(None))?;
    for i in 0..4 {
        engine(object_ops::set_or_throw(&isolate, &target, &key("x"), JsValue::Smi(i)))?;
        let seen = engine(object_ops::get_property(&isolate, &p, &key("x")))?;
        check(seen == JsValue::Smi(i), "forwarded read returned a stale value")?;
    }
    engine(object_ops::delete_property_or_throw(&isolate, &target, &key("x")))?;
    check(
        !engine(object_ops::has_property(&isolate, &p, &key("x")))?,
        "forwarded has saw a deleted property",
    )
}

// ── Invariants ────────────────────────────────────────────────────────────────

fn get_immutable_data_property(config: &IsolateConfig) -> Outcome {
    let isolate = Isolate::with_config(*config);
    let target = HeapObject::ordinary(None);
    define(&isolate, &target, "foo", frozen(10))?;
    engine(object_ops::create_data_property(&isolate, &target, &key("bar"), JsValue::Smi(10)))?;
    let h = handler(&isolate, &[("get", function(|_, _, _| Ok(JsValue::Smi(8))))])?;
    let p = proxy(&target, &h)?;
    expect_violation(
        object_ops::get_property(&isolate, &p, &key("foo")),
        Violation::GetImmutableDataProperty,
    )?;
    let bar = engine(object_ops::get_property(&isolate, &p, &key("bar")))?;
    check(bar == JsValue::Smi(8), "configurable property should report the trap value")
}

fn has_non_configurable(config: &IsolateConfig) -> Outcome {
    let isolate = Isolate::with_config(*config);
    let target = HeapObject::ordinary(None);
    define(&isolate, &target, "foo", frozen(1))?;
    let h = handler(&isolate, &[("has", function(|_, _, _| Ok(JsValue::Boolean(false))))])?;
    let p = proxy(&target, &h)?;
    expect_violation(
        object_ops::has_property(&isolate, &p, &key("foo")),
        Violation::HasExistingNonConfigurable,
    )
}

fn define_absent_key_non_extensible(config: &IsolateConfig) -> Outcome {
    let isolate = Isolate::with_config(*config);
    let target = HeapObject::ordinary(None);
    engine(object_ops::prevent_extensions_or_throw(&isolate, &target))?;
    let h = handler(&isolate, &[("defineProperty", function(|_, _, _| Ok(JsValue::Boolean(true))))])?;
    let p = proxy(&target, &h)?;
    expect_violation(
        object_ops::define_property_or_throw(&isolate, &p, &key("foo"), &PartialDescriptor::new()),
        Violation::DefineNonExtensible,
    )
}

fn define_demotion(config: &IsolateConfig) -> Outcome {
    let isolate = Isolate::with_config(*config);
    let target = HeapObject::ordinary(None);
    engine(object_ops::create_data_property(&isolate, &target, &key("foo"), JsValue::Smi(10)))?;
    let h = handler(&isolate, &[("defineProperty", function(|_, _, _| Ok(JsValue::Boolean(true))))])?;
    let p = proxy(&target, &h)?;
    let non_configurable = PartialDescriptor::new().with_configurable(false);
    expect_violation(
        object_ops::define_property_or_throw(&isolate, &p, &key("foo"), &non_configurable),
        Violation::DefineExistingConfigurable,
    )?;
    expect_violation(
        object_ops::define_property_or_throw(&isolate, &p, &key("bar"), &non_configurable),
        Violation::DefineNonConfigurableNonExisting,
    )
}

fn set_prototype_of_non_extensible(config: &IsolateConfig) -> Outcome {
    let isolate = Isolate::with_config(*config);
    let p_proto = HeapObject::ordinary(None);
    let q_proto = HeapObject::ordinary(None);
    let target = HeapObject::ordinary(Some(p_proto.clone()));
    engine(object_ops::prevent_extensions_or_throw(&isolate, &target))?;
    let h = handler(&isolate, &[("setPrototypeOf", function(|_, _, _| Ok(JsValue::Boolean(true))))])?;
    let p = proxy(&target, &h)?;
    engine(object_ops::set_prototype_of_or_throw(&isolate, &p, Some(p_proto)))?;
    expect_violation(
        object_ops::set_prototype_of(&isolate, &p, Some(q_proto)),
        Violation::SetPrototypeOfNonExtensible,
    )
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

fn expect_revoked<T>(result: UmbraResult<T>, operation: &str) -> Outcome {
    match result {
        Err(UmbraError::RevokedAccess) => Ok(()),
        Err(e) => Err(format!("{operation}: expected RevokedAccess, got `{e}`")),
        Ok(_) => Err(format!("{operation}: succeeded on a revoked proxy")),
    }
}

fn revocation_all_operations(config: &IsolateConfig) -> Outcome {
    let isolate = Isolate::with_config(*config);
    let target = HeapObject::function(
        None,
        JsFunction::new("f", 0, |_, _, _| Ok(JsValue::Undefined))
            .with_construct(|_, _, _| Ok(HeapObject::ordinary(None))),
    );
    let pair = engine(Proxy::revocable(
        &JsValue::Object(target),
        &JsValue::Object(HeapObject::ordinary(None)),
    ))?;
    engine(object_ops::call(
        &isolate,
        &JsValue::Object(pair.revoke.clone()),
        &JsValue::Undefined,
        &[],
    ))?;
    let p = &pair.proxy;
    let k = key("x");
    let this = JsValue::Object(p.clone());
    expect_revoked(object_ops::get_prototype_of(&isolate, p), "getPrototypeOf")?;
    expect_revoked(object_ops::set_prototype_of(&isolate, p, None), "setPrototypeOf")?;
    expect_revoked(object_ops::is_extensible(&isolate, p), "isExtensible")?;
    expect_revoked(object_ops::prevent_extensions(&isolate, p), "preventExtensions")?;
    expect_revoked(object_ops::get_own_property(&isolate, p, &k), "getOwnPropertyDescriptor")?;
    expect_revoked(
        object_ops::define_own_property(&isolate, p, &k, &PartialDescriptor::new()),
        "defineProperty",
    )?;
    expect_revoked(object_ops::has_property(&isolate, p, &k), "has")?;
    expect_revoked(object_ops::get(&isolate, p, &k, &this), "get")?;
    expect_revoked(object_ops::set(&isolate, p, &k, JsValue::Smi(1), &this), "set")?;
    expect_revoked(object_ops::delete(&isolate, p, &k), "deleteProperty")?;
    expect_revoked(object_ops::own_property_keys(&isolate, p), "ownKeys")?;
    expect_revoked(object_ops::call(&isolate, &this, &JsValue::Undefined, &[]), "apply")?;
    expect_revoked(object_ops::construct(&isolate, p, &[], None), "construct")?;
    check(isolate.call_depth() == 0, "depth counter leaked")
}

fn revocation_idempotent(config: &IsolateConfig) -> Outcome {
    let isolate = Isolate::with_config(*config);
    let pair = engine(Proxy::revocable(
        &JsValue::Object(HeapObject::ordinary(None)),
        &JsValue::Object(HeapObject::ordinary(None)),
    ))?;
    let revoke = JsValue::Object(pair.revoke.clone());
    for _ in 0..3 {
        let result = engine(object_ops::call(&isolate, &revoke, &JsValue::Undefined, &[]))?;
        check(result.is_undefined(), "revoke must return undefined")?;
    }
    expect_revoked(object_ops::is_extensible(&isolate, &pair.proxy), "isExtensible")
}

fn recursion_handler_prototype_loop(config: &IsolateConfig) -> Outcome {
    let isolate = Isolate::with_config(*config);
    let h = HeapObject::ordinary(None);
    let p = proxy(&HeapObject::ordinary(None), &h)?;
    engine(object_ops::set_prototype_of_or_throw(&isolate, &h, Some(p.clone())))?;
    let outcome = match object_ops::get_property(&isolate, &p, &key("x")) {
        Err(UmbraError::StackOverflow) => check(isolate.call_depth() == 0, "depth counter leaked"),
        Err(e) => Err(format!("expected StackOverflow, got `{e}`")),
        Ok(v) => Err(format!("expected StackOverflow, got {v}")),
    };
    if let Some(state) = p.as_proxy() {
        state.revoke();
    }
    outcome
}

// ── Trap calls ────────────────────────────────────────────────────────────────

fn traps_arguments(config: &IsolateConfig) -> Outcome {
    let isolate = Isolate::with_config(*config);
    let target = HeapObject::ordinary(None);
    let seen: Rc<RefCell<Vec<JsValue>>> = Rc::default();
    let log = Rc::clone(&seen);
    let h = handler(
        &isolate,
        &[(
            "set",
            function(move |_, this, args| {
                let mut log = log.borrow_mut();
                log.push(this.clone());
                log.extend(args.iter().cloned());
                Ok(JsValue::Boolean(true))
            }),
        )],
    )?;
    let p = proxy(&target, &h)?;
    let receiver = JsValue::from("receiver");
    engine(object_ops::set(&isolate, &p, &key("k"), JsValue::Smi(4), &receiver))?;
    let expected = vec![
        JsValue::Object(h),
        JsValue::Object(target),
        JsValue::from("k"),
        JsValue::Smi(4),
        receiver,
    ];
    check(*seen.borrow() == expected, "set trap received unexpected arguments")
}

fn traps_errors_propagate(config: &IsolateConfig) -> Outcome {
    let isolate = Isolate::with_config(*config);
    let h = handler(
        &isolate,
        &[("getPrototypeOf", function(|_, _, _| Err(UmbraError::Thrown(JsValue::from("boom")))))],
    )?;
    let p = proxy(&HeapObject::ordinary(None), &h)?;
    match object_ops::get_prototype_of(&isolate, &p) {
        Err(UmbraError::Thrown(JsValue::String(s))) if s == "boom" => Ok(()),
        Err(e) => Err(format!("thrown value was replaced by `{e}`")),
        Ok(_) => Err("trap error was swallowed".to_string()),
    }
}
