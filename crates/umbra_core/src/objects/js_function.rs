//! JavaScript function objects backed by host (Rust) closures.
//!
//! A [`JsFunction`] carries the `[[Call]]` behaviour of a function object and,
//! optionally, its `[[Construct]]` behaviour.  Property storage for the
//! function lives in the surrounding
//! [`HeapObject`][crate::objects::heap_object::HeapObject], exactly like any
//! ordinary object.

use std::fmt;

use crate::error::UmbraResult;
use crate::isolate::Isolate;
use crate::objects::heap_object::ObjectRef;
use crate::objects::value::JsValue;

/// A host-side callback implementing `[[Call]]`.
///
/// Receives the isolate, the `this` value and the positional arguments.
pub type NativeFn = Box<dyn Fn(&Isolate, &JsValue, &[JsValue]) -> UmbraResult<JsValue>>;

/// A host-side callback implementing `[[Construct]]`.
///
/// Receives the isolate, the positional arguments and `newTarget`, and must
/// produce an object.
pub type NativeConstructFn = Box<dyn Fn(&Isolate, &[JsValue], &ObjectRef) -> UmbraResult<ObjectRef>>;

/// The callable half of a function object.
///
/// # Example
///
/// ```rust
/// use umbra_core::isolate::Isolate;
/// use umbra_core::objects::js_function::JsFunction;
/// use umbra_core::objects::value::JsValue;
///
/// let add = JsFunction::new("add", 2, |_isolate, _this, args| {
///     match (args.first(), args.get(1)) {
///         (Some(JsValue::Smi(a)), Some(JsValue::Smi(b))) => Ok(JsValue::Smi(a + b)),
///         _ => Ok(JsValue::Undefined),
///     }
/// });
/// let isolate = Isolate::new();
/// let sum = add
///     .call(&isolate, &JsValue::Undefined, &[JsValue::Smi(2), JsValue::Smi(3)])
///     .unwrap();
/// assert_eq!(sum, JsValue::Smi(5));
/// assert!(!add.is_constructor());
/// ```
pub struct JsFunction {
    name: String,
    param_count: u32,
    call: NativeFn,
    construct: Option<NativeConstructFn>,
}

impl JsFunction {
    /// Creates a plain (non-constructor) function.
    pub fn new(
        name: impl Into<String>,
        param_count: u32,
        call: impl Fn(&Isolate, &JsValue, &[JsValue]) -> UmbraResult<JsValue> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            param_count,
            call: Box::new(call),
            construct: None,
        }
    }

    /// Adds `[[Construct]]` behaviour, turning the function into a constructor.
    pub fn with_construct(
        mut self,
        construct: impl Fn(&Isolate, &[JsValue], &ObjectRef) -> UmbraResult<ObjectRef> + 'static,
    ) -> Self {
        self.construct = Some(Box::new(construct));
        self
    }

    /// Returns the function's declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the formal parameter count.
    pub fn param_count(&self) -> u32 {
        self.param_count
    }

    /// Returns `true` if the function has a `[[Construct]]` method.
    pub fn is_constructor(&self) -> bool {
        self.construct.is_some()
    }

    /// Invokes `[[Call]]` without touching the call-depth counter.
    ///
    /// Engine code goes through [`object_ops::call`][crate::object_ops::call],
    /// which accounts for the depth first.
    pub fn call(&self, isolate: &Isolate, this: &JsValue, args: &[JsValue]) -> UmbraResult<JsValue> {
        (self.call)(isolate, this, args)
    }

    /// Invokes `[[Construct]]`, or returns `None` for non-constructors.
    pub fn construct(
        &self,
        isolate: &Isolate,
        args: &[JsValue],
        new_target: &ObjectRef,
    ) -> Option<UmbraResult<ObjectRef>> {
        self.construct
            .as_ref()
            .map(|construct| construct(isolate, args, new_target))
    }
}

// Closures don't implement Debug.
impl fmt::Debug for JsFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsFunction")
            .field("name", &self.name)
            .field("param_count", &self.param_count)
            .field("constructor", &self.is_constructor())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UmbraError;
    use crate::objects::heap_object::HeapObject;

    fn identity() -> JsFunction {
        JsFunction::new("identity", 1, |_, _, args| {
            Ok(args.first().cloned().unwrap_or(JsValue::Undefined))
        })
    }

    #[test]
    fn test_metadata() {
        let f = identity();
        assert_eq!(f.name(), "identity");
        assert_eq!(f.param_count(), 1);
        assert!(!f.is_constructor());
    }

    #[test]
    fn test_call_passes_this_and_args() {
        let f = JsFunction::new("this", 0, |_, this, _| Ok(this.clone()));
        let isolate = Isolate::new();
        let result = f.call(&isolate, &JsValue::Smi(7), &[]).unwrap();
        assert_eq!(result, JsValue::Smi(7));
    }

    #[test]
    fn test_call_propagates_errors() {
        let f = JsFunction::new("thrower", 0, |_, _, _| {
            Err(UmbraError::Thrown(JsValue::from("boom")))
        });
        let isolate = Isolate::new();
        assert!(matches!(
            f.call(&isolate, &JsValue::Undefined, &[]),
            Err(UmbraError::Thrown(JsValue::String(s))) if s == "boom"
        ));
    }

    #[test]
    fn test_construct_only_for_constructors() {
        let isolate = Isolate::new();
        let new_target = HeapObject::ordinary(None);
        assert!(identity().construct(&isolate, &[], &new_target).is_none());

        let ctor = identity().with_construct(|_, _, _| Ok(HeapObject::ordinary(None)));
        assert!(ctor.is_constructor());
        assert!(ctor.construct(&isolate, &[], &new_target).unwrap().is_ok());
    }

    #[test]
    fn test_debug_hides_closures() {
        let rendered = format!("{:?}", identity());
        assert!(rendered.contains("identity"));
    }
}
