//! [`JsValue`] and the few abstract operations on it that the object model
//! and proxy machinery need: SameValue (§7.2.10), which every invariant check
//! compares with, and the ToBoolean / ToNumber / ToLength / ToString /
//! ToPropertyKey conversions (§7.1) applied to trap results and `Reflect`
//! arguments.
//!
//! None of the conversions call user code.  Objects are rejected where
//! ECMAScript would run ToPrimitive, which is out of scope here.

use std::fmt;
use std::rc::Rc;

use crate::error::{UmbraError, UmbraResult};
use crate::objects::heap_object::ObjectRef;
use crate::objects::property::PropertyKey;

/// Any ECMAScript value.
///
/// `Object` holds a shared reference to a
/// [`HeapObject`][crate::objects::heap_object::HeapObject]; equality on
/// `JsValue` is SameValue, so two objects are equal only when they are the
/// same object.
#[derive(Debug, Clone, Default)]
pub enum JsValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    /// Small integer, kept separate from `HeapNumber` so integral values
    /// stay exact and cheap to compare.
    Smi(i32),
    HeapNumber(f64),
    String(String),
    /// Symbol identity from [`Isolate::new_symbol`][crate::isolate::Isolate::new_symbol].
    Symbol(u64),
    Object(ObjectRef),
}

impl JsValue {
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `undefined` or `null`: what GetMethod treats as "no trap".
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    #[inline]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// IsCallable (§7.2.3).
    pub fn is_callable(&self) -> bool {
        self.as_object().is_some_and(|o| o.is_callable())
    }

    /// IsConstructor (§7.2.4).
    pub fn is_constructor(&self) -> bool {
        self.as_object().is_some_and(|o| o.is_constructor())
    }

    fn as_number(&self) -> Option<f64> {
        match *self {
            Self::Smi(n) => Some(f64::from(n)),
            Self::HeapNumber(n) => Some(n),
            _ => None,
        }
    }

    /// SameValue (§7.2.10).
    ///
    /// `NaN` equals `NaN`, `+0` and `-0` differ, and a `Smi` equals a
    /// `HeapNumber` of the same mathematical value.
    pub fn same_value(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return (a.is_nan() && b.is_nan()) || (a == b && a.is_sign_negative() == b.is_sign_negative());
        }
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// ToBoolean (§7.1.2).  Applied to every boolean-valued trap result.
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            Self::String(s) => !s.is_empty(),
            Self::Symbol(_) | Self::Object(_) => true,
            Self::Undefined | Self::Null => false,
            number => number.as_number().is_some_and(|n| n != 0.0 && !n.is_nan()),
        }
    }

    /// ToNumber (§7.1.4) for primitives.
    pub fn to_number(&self) -> UmbraResult<f64> {
        if let Some(n) = self.as_number() {
            return Ok(n);
        }
        match self {
            Self::Undefined => Ok(f64::NAN),
            Self::Null | Self::Boolean(false) => Ok(0.0),
            Self::Boolean(true) => Ok(1.0),
            Self::String(s) => Ok(string_to_number(s)),
            _ => Err(UmbraError::TypeError(format!("Cannot convert {self} to a number"))),
        }
    }

    /// ToLength (§7.1.20), saturating at `2^53 - 1`.
    pub fn to_length(&self) -> UmbraResult<usize> {
        const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
        let n = self.to_number()?;
        Ok(if n > 0.0 { n.trunc().min(MAX_SAFE_INTEGER) as usize } else { 0 })
    }

    /// ToString (§7.1.17) for primitives other than symbols.
    pub fn to_js_string(&self) -> UmbraResult<String> {
        match self {
            Self::String(s) => Ok(s.clone()),
            Self::Symbol(_) | Self::Object(_) => {
                Err(UmbraError::TypeError(format!("Cannot convert {self} to a string")))
            }
            // Display renders the remaining primitives exactly as ToString does.
            primitive => Ok(primitive.to_string()),
        }
    }

    /// ToPropertyKey (§7.1.19).
    pub fn to_property_key(&self) -> UmbraResult<PropertyKey> {
        match self {
            Self::Symbol(id) => Ok(PropertyKey::Symbol(*id)),
            other => other.to_js_string().map(PropertyKey::String),
        }
    }
}

/// StringToNumber for decimal literals; anything unparseable is `NaN`.
fn string_to_number(s: &str) -> f64 {
    match s.trim() {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // Rust accepts spellings ("inf", "NaN") that JavaScript does not.
        t if t.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') => f64::NAN,
        t => t.parse().unwrap_or(f64::NAN),
    }
}

impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

impl From<ObjectRef> for JsValue {
    fn from(object: ObjectRef) -> Self {
        Self::Object(object)
    }
}

impl From<Option<ObjectRef>> for JsValue {
    /// `None` is `null`, matching `[[Prototype]]` slots.
    fn from(object: Option<ObjectRef>) -> Self {
        object.map_or(Self::Null, Self::Object)
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i32> for JsValue {
    fn from(n: i32) -> Self {
        Self::Smi(n)
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl fmt::Display for JsValue {
    /// Diagnostic rendering for error messages.  Strings are quoted; numbers
    /// follow Number::toString for the common cases.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Smi(n) => write!(f, "{n}"),
            Self::HeapNumber(n) if n.is_nan() => f.write_str("NaN"),
            Self::HeapNumber(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            // Covers -0, which prints as "0".
            Self::HeapNumber(n) if *n == 0.0 => f.write_str("0"),
            Self::HeapNumber(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Symbol(id) => write!(f, "Symbol({id})"),
            Self::Object(o) => write!(f, "{o}"),
        }
    }
}
