/// The [`HeapObject`][heap_object::HeapObject] type shared by every kind of object.
pub mod heap_object;
/// Function objects backed by host closures.
pub mod js_function;
/// Ordinary objects with inline and dictionary property storage.
pub mod js_object;
/// Property keys, attributes, and descriptors.
pub mod property;
/// Top-level JavaScript value enum and ECMAScript §7.1 type conversions.
pub mod value;
