#![no_main]

use libfuzzer_sys::fuzz_target;
use umbra_core::object_ops;
use umbra_core::objects::property::{
    PartialDescriptor, PropertyAttributes, PropertyDescriptor, PropertyKey,
};
use umbra_core::{HeapObject, Isolate, JsValue, Proxy};

// Applies the same random operation sequence to a plain object (the mirror)
// and, through a handler with no traps, to a proxy over a second plain
// object.  Every result and the final own-key list must agree.
//
// Each operation is encoded in two bytes:
//   byte 0  bits [2:0] – operation selector
//                        (0=set, 1=get, 2=delete, 3=define, 4=has,
//                         5=getOwnPropertyDescriptor, 6=preventExtensions,
//                         7=ownKeys)
//           bits [7:3] – value payload (Smi), low three bits double as
//                        attribute flags for define
//   byte 1  bits [3:0] – property key index k0–k15
fuzz_target!(|data: &[u8]| {
    let isolate = Isolate::new();
    let mirror = HeapObject::ordinary(None);
    let target = HeapObject::ordinary(None);
    let Ok(proxy) = Proxy::create(
        &JsValue::Object(target.clone()),
        &JsValue::Object(HeapObject::ordinary(None)),
    ) else {
        return;
    };
    const MAX_OPS: usize = 256;

    for chunk in data.chunks_exact(2).take(MAX_OPS) {
        let op = chunk[0] & 0x7;
        let payload = (chunk[0] >> 3) as i32;
        let key = PropertyKey::from(format!("k{}", chunk[1] & 0xf));
        let value = JsValue::Smi(payload);

        match op {
            0 => {
                let direct = object_ops::set(&isolate, &mirror, &key, value.clone(), &JsValue::Object(mirror.clone()));
                let forwarded = object_ops::set(&isolate, &proxy, &key, value, &JsValue::Object(proxy.clone()));
                assert_eq!(direct.ok(), forwarded.ok());
            }
            1 => {
                let direct = object_ops::get_property(&isolate, &mirror, &key);
                let forwarded = object_ops::get_property(&isolate, &proxy, &key);
                assert_eq!(direct.ok(), forwarded.ok());
            }
            2 => {
                let direct = object_ops::delete(&isolate, &mirror, &key);
                let forwarded = object_ops::delete(&isolate, &proxy, &key);
                assert_eq!(direct.ok(), forwarded.ok());
            }
            3 => {
                let attrs = PropertyAttributes::from_bits_truncate(payload as u8);
                let desc = PartialDescriptor::from(PropertyDescriptor::data(value, attrs));
                let direct = object_ops::define_own_property(&isolate, &mirror, &key, &desc);
                let forwarded = object_ops::define_own_property(&isolate, &proxy, &key, &desc);
                assert_eq!(direct.ok(), forwarded.ok());
            }
            4 => {
                let direct = object_ops::has_property(&isolate, &mirror, &key);
                let forwarded = object_ops::has_property(&isolate, &proxy, &key);
                assert_eq!(direct.ok(), forwarded.ok());
            }
            5 => {
                let direct = object_ops::get_own_property(&isolate, &mirror, &key);
                let forwarded = object_ops::get_own_property(&isolate, &proxy, &key);
                let shape = |d: Option<PropertyDescriptor>| d.map(|d| (d.attributes(), d.value().cloned()));
                assert_eq!(direct.ok().map(shape), forwarded.ok().map(shape));
            }
            6 => {
                let direct = object_ops::prevent_extensions(&isolate, &mirror);
                let forwarded = object_ops::prevent_extensions(&isolate, &proxy);
                assert_eq!(direct.ok(), forwarded.ok());
            }
            _ => {
                let direct = object_ops::own_property_keys(&isolate, &mirror);
                let forwarded = object_ops::own_property_keys(&isolate, &proxy);
                assert_eq!(direct.ok(), forwarded.ok());
            }
        }
    }

    assert_eq!(
        object_ops::own_property_keys(&isolate, &mirror).ok(),
        object_ops::own_property_keys(&isolate, &proxy).ok()
    );
    assert_eq!(isolate.call_depth(), 0);
});
