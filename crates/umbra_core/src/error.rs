//! Error types for the Umbra engine.

use thiserror::Error;

use crate::objects::property::PropertyKey;
use crate::objects::value::JsValue;
use crate::proxy::trap::TrapName;

/// All errors that can be produced by the Umbra engine.
#[derive(Debug, Error)]
pub enum UmbraError {
    /// A fundamental operation was attempted on a revoked proxy.
    #[error("TypeError: An operation was performed on a revoked Proxy object")]
    RevokedAccess,

    /// The isolate's call-depth ceiling was reached.
    #[error("InternalError: Call stack size limit exceeded")]
    StackOverflow,

    /// A proxy trap returned a result that contradicts its target.
    #[error("TypeError: {0}")]
    InvariantViolation(#[from] Violation),

    /// A value that had to be called is not callable.
    #[error("TypeError: {0} is not a function")]
    NotCallable(String),

    /// A value that had to be constructed is not a constructor.
    #[error("TypeError: {0} is not a constructor")]
    NotConstructor(String),

    /// A JavaScript TypeError was raised.
    #[error("TypeError: {0}")]
    TypeError(String),

    /// A value thrown by user code (a trap, getter, or native function),
    /// propagated unchanged.
    #[error("Uncaught {0}")]
    Thrown(JsValue),
}

impl UmbraError {
    /// Returns the violation if this is an [`InvariantViolation`][Self::InvariantViolation].
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Self::InvariantViolation(v) => Some(v),
            _ => None,
        }
    }
}

/// Convenient `Result` alias for fallible engine operations.
pub type UmbraResult<T> = Result<T, UmbraError>;

/// An inconsistency between a proxy trap result and the proxy's target.
///
/// The rendered messages are stable; embedders match on them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    // ── get ───────────────────────────────────────────────────────────────────
    /// `get` reported a different value for a frozen data property.
    #[error(
        "Proxy handler's get trap violates invariant: the returned value must match the value on the target if the property exists on the target as a non-writable, non-configurable own data property"
    )]
    GetImmutableDataProperty,
    /// `get` reported a value for a non-configurable accessor without a getter.
    #[error(
        "Proxy handler's get trap violates invariant: the returned value must be undefined if the property exists on the target as a non-configurable accessor property with an undefined get attribute"
    )]
    GetNonConfigurableAccessor,

    // ── set ───────────────────────────────────────────────────────────────────
    /// `set` claimed to change a frozen data property.
    #[error(
        "Proxy handler's set trap violates invariant: a property cannot be reported as being successfully set if it is a non-writable, non-configurable own data property of the target object"
    )]
    SetImmutableDataProperty,
    /// `set` claimed success on a non-configurable accessor without a setter.
    #[error(
        "Proxy handler's set trap violates invariant: a property cannot be reported as being successfully set if it is a non-configurable own accessor property of the target object with an undefined set attribute"
    )]
    SetNonConfigurableAccessor,

    // ── has ───────────────────────────────────────────────────────────────────
    /// `has` hid a non-configurable own property.
    #[error(
        "Proxy handler's has trap violates invariant: a property cannot be reported as non-existent if it exists on the target as a non-configurable property"
    )]
    HasExistingNonConfigurable,
    /// `has` hid an own property of a non-extensible target.
    #[error(
        "Proxy handler's has trap violates invariant: a property cannot be reported as non-existent if it exists on the target and the target is non-extensible"
    )]
    HasExistingNonExtensible,

    // ── defineProperty ────────────────────────────────────────────────────────
    /// `defineProperty` claimed to add a property to a non-extensible target.
    #[error(
        "Proxy handler's defineProperty trap violates invariant: a property cannot be reported as being defined if the property does not exist on the target and the target is non-extensible"
    )]
    DefineNonExtensible,
    /// `defineProperty` claimed to create a new non-configurable property.
    #[error(
        "Proxy handler's defineProperty trap violates invariant: a property cannot be defined as non-configurable if it does not already exist on the target object"
    )]
    DefineNonConfigurableNonExisting,
    /// `defineProperty` accepted a descriptor the target property cannot take.
    #[error(
        "Proxy handler's defineProperty trap violates invariant: the new descriptor is not compatible with the existing descriptor of the property on the target"
    )]
    DefineIncompatibleDescriptor,
    /// `defineProperty` claimed to make a configurable property non-configurable.
    #[error(
        "Proxy handler's defineProperty trap violates invariant: a property cannot be defined as non-configurable if it already exists on the target object as a configurable property"
    )]
    DefineExistingConfigurable,
    /// `defineProperty` claimed to make a non-configurable writable property non-writable.
    #[error(
        "Proxy handler's defineProperty trap violates invariant: a non-configurable property cannot be non-writable, unless there exists a corresponding non-configurable, non-writable own property of the target object"
    )]
    DefineNonWritable,

    // ── getPrototypeOf ────────────────────────────────────────────────────────
    /// `getPrototypeOf` returned something other than an object or `null`.
    #[error("Proxy handler's getPrototypeOf trap violates invariant: must return an object or null")]
    GetPrototypeOfReturn,
    /// `getPrototypeOf` misreported the prototype of a non-extensible target.
    #[error(
        "Proxy handler's getPrototypeOf trap violates invariant: cannot return a different prototype object for a non-extensible target"
    )]
    GetPrototypeOfNonExtensible,

    // ── setPrototypeOf ────────────────────────────────────────────────────────
    /// `setPrototypeOf` claimed to change the prototype of a non-extensible target.
    #[error(
        "Proxy handler's setPrototypeOf trap violates invariant: the argument must match the prototype of the target if the target is non-extensible"
    )]
    SetPrototypeOfNonExtensible,

    // ── isExtensible / preventExtensions ──────────────────────────────────────
    /// `isExtensible` disagreed with the target.
    #[error(
        "Proxy handler's isExtensible trap violates invariant: return value must match the target's extensibility"
    )]
    IsExtensibleReturn,
    /// `preventExtensions` returned `true` while the target stayed extensible.
    #[error(
        "Proxy handler's preventExtensions trap violates invariant: cannot return true if the target object is extensible"
    )]
    PreventExtensionsReturn,

    // ── getOwnPropertyDescriptor ──────────────────────────────────────────────
    /// `getOwnPropertyDescriptor` returned something other than an object or `undefined`.
    #[error(
        "Proxy handler's getOwnPropertyDescriptor trap violates invariant: must return an object or undefined"
    )]
    GetOwnDescriptorReturn,
    /// `getOwnPropertyDescriptor` hid a non-configurable own property.
    #[error(
        "Proxy handler's getOwnPropertyDescriptor trap violates invariant: cannot return undefined for a property on the target which is a non-configurable property"
    )]
    GetOwnDescriptorNonConfigurable,
    /// `getOwnPropertyDescriptor` hid an own property of a non-extensible target.
    #[error(
        "Proxy handler's getOwnPropertyDescriptor trap violates invariant: cannot report a property as being undefined if it exists as an own property of the target and the target is non-extensible"
    )]
    GetOwnDescriptorUndefinedReturn,
    /// `getOwnPropertyDescriptor` reported a descriptor incompatible with the target property.
    #[error(
        "Proxy handler's getOwnPropertyDescriptor trap violates invariant: invalid property descriptor for existing property on the target"
    )]
    GetOwnDescriptorInvalidDescriptor,
    /// `getOwnPropertyDescriptor` reported a missing or configurable property as non-configurable.
    #[error(
        "Proxy handler's getOwnPropertyDescriptor trap violates invariant: cannot report target's property as non-configurable if the property does not exist, or if it is configurable"
    )]
    GetOwnDescriptorInvalidNonConfig,
    /// `getOwnPropertyDescriptor` reported a writable property as non-configurable and non-writable.
    #[error(
        "Proxy handler's getOwnPropertyDescriptor trap violates invariant: cannot report target's property as non-configurable and non-writable, unless it is non-configurable and non-writable on the target"
    )]
    GetOwnDescriptorNonConfigurableNonWritable,

    // ── deleteProperty ────────────────────────────────────────────────────────
    /// `deleteProperty` claimed to delete a non-configurable own property.
    #[error(
        "Proxy handler's deleteProperty trap violates invariant: cannot report a non-configurable own property of the target as deleted"
    )]
    DeleteNonConfigurable,
    /// `deleteProperty` claimed to delete an own property of a non-extensible target.
    #[error(
        "Proxy handler's deleteProperty trap violates invariant: a property cannot be reported as deleted, if it exists as an own property of the target object and the target object is non-extensible"
    )]
    DeleteNonExtensible,

    // ── ownKeys ───────────────────────────────────────────────────────────────
    /// `ownKeys` returned an element that is neither a string nor a symbol.
    #[error(
        "Proxy handler's ownKeys trap violates invariant: the type of each result list element is either String or Symbol"
    )]
    OwnKeysNotStringOrSymbol,
    /// `ownKeys` returned the same key twice.
    #[error(
        "Proxy handler's ownKeys trap violates invariant: the result list may not contain duplicate elements"
    )]
    OwnKeysDuplicates,
    /// `ownKeys` left out a non-configurable own key.
    #[error(
        "Proxy handler's ownKeys trap violates invariant: cannot skip non-configurable property '{0}'"
    )]
    OwnKeysSkippedNonConfigurable(PropertyKey),
    /// `ownKeys` left out an own key of a non-extensible target.
    #[error(
        "Proxy handler's ownKeys trap violates invariant: cannot skip property '{0}' of non-extensible object"
    )]
    OwnKeysNonExtensibleSkipped(PropertyKey),
    /// `ownKeys` invented a key for a non-extensible target.
    #[error(
        "Proxy handler's ownKeys trap violates invariant: cannot report new property '{0}' of non-extensible object"
    )]
    OwnKeysNonExtensibleNewProperty(PropertyKey),

    // ── construct ─────────────────────────────────────────────────────────────
    /// `construct` returned a primitive.
    #[error("Proxy handler's construct trap violates invariant: must return an object")]
    ConstructBadReturnType,
}

impl Violation {
    /// The trap whose result was rejected.
    pub fn trap(&self) -> TrapName {
        match self {
            Self::GetImmutableDataProperty | Self::GetNonConfigurableAccessor => TrapName::Get,
            Self::SetImmutableDataProperty | Self::SetNonConfigurableAccessor => TrapName::Set,
            Self::HasExistingNonConfigurable | Self::HasExistingNonExtensible => TrapName::Has,
            Self::DefineNonExtensible
            | Self::DefineNonConfigurableNonExisting
            | Self::DefineIncompatibleDescriptor
            | Self::DefineExistingConfigurable
            | Self::DefineNonWritable => TrapName::DefineProperty,
            Self::GetPrototypeOfReturn | Self::GetPrototypeOfNonExtensible => {
                TrapName::GetPrototypeOf
            }
            Self::SetPrototypeOfNonExtensible => TrapName::SetPrototypeOf,
            Self::IsExtensibleReturn => TrapName::IsExtensible,
            Self::PreventExtensionsReturn => TrapName::PreventExtensions,
            Self::GetOwnDescriptorReturn
            | Self::GetOwnDescriptorNonConfigurable
            | Self::GetOwnDescriptorUndefinedReturn
            | Self::GetOwnDescriptorInvalidDescriptor
            | Self::GetOwnDescriptorInvalidNonConfig
            | Self::GetOwnDescriptorNonConfigurableNonWritable => {
                TrapName::GetOwnPropertyDescriptor
            }
            Self::DeleteNonConfigurable | Self::DeleteNonExtensible => TrapName::DeleteProperty,
            Self::OwnKeysNotStringOrSymbol
            | Self::OwnKeysDuplicates
            | Self::OwnKeysSkippedNonConfigurable(_)
            | Self::OwnKeysNonExtensibleSkipped(_)
            | Self::OwnKeysNonExtensibleNewProperty(_) => TrapName::OwnKeys,
            Self::ConstructBadReturnType => TrapName::Construct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_message_prefix_names_trap() {
        let all = [
            Violation::GetImmutableDataProperty,
            Violation::SetNonConfigurableAccessor,
            Violation::HasExistingNonExtensible,
            Violation::DefineNonWritable,
            Violation::GetPrototypeOfReturn,
            Violation::SetPrototypeOfNonExtensible,
            Violation::IsExtensibleReturn,
            Violation::PreventExtensionsReturn,
            Violation::GetOwnDescriptorInvalidNonConfig,
            Violation::DeleteNonExtensible,
            Violation::OwnKeysDuplicates,
            Violation::ConstructBadReturnType,
        ];
        for v in all {
            let prefix = format!("Proxy handler's {} trap violates invariant: ", v.trap());
            assert!(v.to_string().starts_with(&prefix), "{v}");
        }
    }

    #[test]
    fn test_own_keys_violation_includes_key() {
        let v = Violation::OwnKeysSkippedNonConfigurable(PropertyKey::from("foo"));
        assert_eq!(
            v.to_string(),
            "Proxy handler's ownKeys trap violates invariant: cannot skip non-configurable property 'foo'"
        );
    }

    #[test]
    fn test_error_display_carries_error_class() {
        assert_eq!(
            UmbraError::RevokedAccess.to_string(),
            "TypeError: An operation was performed on a revoked Proxy object"
        );
        assert_eq!(
            UmbraError::StackOverflow.to_string(),
            "InternalError: Call stack size limit exceeded"
        );
        assert_eq!(
            UmbraError::NotCallable("get".to_string()).to_string(),
            "TypeError: get is not a function"
        );
        let err: UmbraError = Violation::ConstructBadReturnType.into();
        assert_eq!(
            err.to_string(),
            "TypeError: Proxy handler's construct trap violates invariant: must return an object"
        );
        assert_eq!(err.violation(), Some(&Violation::ConstructBadReturnType));
    }

    #[test]
    fn test_thrown_value_display() {
        let err = UmbraError::Thrown(JsValue::from("boom"));
        assert_eq!(err.to_string(), "Uncaught \"boom\"");
    }
}
