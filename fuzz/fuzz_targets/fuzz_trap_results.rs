#![no_main]

use libfuzzer_sys::fuzz_target;
use umbra_core::object_ops;
use umbra_core::objects::js_function::JsFunction;
use umbra_core::config::IsolateConfig;
use umbra_core::objects::property::{
    PartialDescriptor, PropertyAttributes, PropertyDescriptor, PropertyKey,
};
use umbra_core::proxy::trap::TrapName;
use umbra_core::{HeapObject, Isolate, JsValue, ObjectRef, Proxy};

// Installs every trap on a handler, each returning a value chosen by the
// input, and then drives random operations through the proxy.  Whatever the
// traps return, the engine must report success or an error without
// panicking, and the call-depth counter must be balanced afterwards.
//
// Input layout:
//   byte 0            target shape: bit 0 freezes `k0`, bit 1 makes the
//                     target non-extensible, bit 2 adds an accessor `k1`
//   bytes 1..=13      one result selector per trap, in `TrapName::ALL` order
//   remaining bytes   operations, one byte each:
//                       bits [3:0] – operation selector
//                       bits [5:4] – property key index k0–k3

fn trap_result(selector: u8, shared: &ObjectRef) -> JsValue {
    match selector % 10 {
        0 => JsValue::Undefined,
        1 => JsValue::Null,
        2 => JsValue::Boolean(true),
        3 => JsValue::Boolean(false),
        4 => JsValue::Smi((selector >> 4) as i32),
        5 => JsValue::from("k0"),
        6 => JsValue::Object(shared.clone()),
        7 => JsValue::Object(object_ops::create_array_from_list(&[
            JsValue::from("k0"),
            JsValue::from("k1"),
        ])),
        8 => JsValue::Object(object_ops::create_array_from_list(&[
            JsValue::from("k0"),
            JsValue::from("k0"),
        ])),
        _ => JsValue::Object(object_ops::create_array_from_list(&[JsValue::Smi(1)])),
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&shape, rest)) = data.split_first() else {
        return;
    };
    if rest.len() < TrapName::ALL.len() {
        return;
    }
    let (selectors, ops) = rest.split_at(TrapName::ALL.len());

    let isolate = Isolate::with_config(IsolateConfig::with_max_call_depth(64));
    let target = HeapObject::function(
        None,
        JsFunction::new("target", 0, |_, _, _| Ok(JsValue::Undefined))
            .with_construct(|_, _, _| Ok(HeapObject::ordinary(None))),
    );
    if shape & 1 != 0 {
        let frozen = PartialDescriptor::new()
            .with_value(10)
            .with_writable(false)
            .with_configurable(false);
        let _ = object_ops::define_own_property(&isolate, &target, &PropertyKey::from("k0"), &frozen);
    }
    if shape & 4 != 0 {
        let accessor = PartialDescriptor::new()
            .with_get(None)
            .with_enumerable(true)
            .with_configurable(shape & 8 != 0);
        let _ = object_ops::define_own_property(&isolate, &target, &PropertyKey::from("k1"), &accessor);
    }
    if shape & 2 != 0 {
        let _ = object_ops::prevent_extensions(&isolate, &target);
    }

    let shared = HeapObject::ordinary(None);
    let handler = HeapObject::ordinary(None);
    for (name, &selector) in TrapName::ALL.iter().zip(selectors) {
        let result = trap_result(selector, &shared);
        let trap = JsFunction::new(name.as_str(), 0, move |_, _, _| Ok(result.clone()));
        let _ = object_ops::create_data_property(
            &isolate,
            &handler,
            &PropertyKey::from(name.as_str()),
            JsValue::Object(HeapObject::function(None, trap)),
        );
    }

    let Ok(proxy) = Proxy::create(&JsValue::Object(target), &JsValue::Object(handler)) else {
        return;
    };
    let this = JsValue::Object(proxy.clone());

    for &byte in ops.iter().take(256) {
        let key = PropertyKey::from(format!("k{}", (byte >> 4) & 0x3));
        match byte & 0xf {
            0 => drop(object_ops::get_prototype_of(&isolate, &proxy)),
            1 => drop(object_ops::set_prototype_of(&isolate, &proxy, Some(shared.clone()))),
            2 => drop(object_ops::set_prototype_of(&isolate, &proxy, None)),
            3 => drop(object_ops::is_extensible(&isolate, &proxy)),
            4 => drop(object_ops::prevent_extensions(&isolate, &proxy)),
            5 => drop(object_ops::get_own_property(&isolate, &proxy, &key)),
            6 => {
                let attrs = PropertyAttributes::from_bits_truncate(byte >> 6);
                let desc = PartialDescriptor::from(PropertyDescriptor::data(JsValue::Smi(1), attrs));
                drop(object_ops::define_own_property(&isolate, &proxy, &key, &desc));
            }
            7 => drop(object_ops::has_property(&isolate, &proxy, &key)),
            8 => drop(object_ops::get(&isolate, &proxy, &key, &this)),
            9 => drop(object_ops::set(&isolate, &proxy, &key, JsValue::Smi(2), &this)),
            10 => drop(object_ops::delete(&isolate, &proxy, &key)),
            11 => drop(object_ops::own_property_keys(&isolate, &proxy)),
            12 => drop(object_ops::call(&isolate, &this, &JsValue::Undefined, &[JsValue::Smi(1)])),
            13 => drop(object_ops::construct(&isolate, &proxy, &[], None)),
            _ => {
                if let Some(state) = proxy.as_proxy() {
                    state.revoke();
                }
            }
        }
        assert_eq!(isolate.call_depth(), 0);
    }

    if let Some(state) = proxy.as_proxy() {
        state.revoke();
    }
});
