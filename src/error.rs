use serde::Serialize;
use thiserror::Error;

use crate::native::{NativeResult, NativeStatus};

/// Closed set of failures surfaced by the bridge.
///
/// `InvalidArgument` is raised locally before any native call. Everything else
/// originates at the native boundary and passes through [`translate`] exactly once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomationError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Native condition does not match any known condition variant")]
    UnsupportedVariant,

    #[error("Unsupported text attribute: {0}")]
    UnsupportedAttribute(i32),

    #[error("Element is no longer available (0x{code:08X})")]
    ElementNotAvailable { code: u32 },

    #[error("Request not supported by the provider (0x{code:08X})")]
    RequestNotSupported { code: u32 },

    #[error("Automation call failed (0x{code:08X})")]
    AutomationCallFailed { code: u32 },
}

/// Discriminant of [`AutomationError`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InvalidArgument,
    UnsupportedVariant,
    UnsupportedAttribute,
    ElementNotAvailable,
    RequestNotSupported,
    AutomationCallFailed,
}

impl AutomationError {
    pub fn invalid_argument(name: impl Into<String>) -> Self {
        Self::InvalidArgument(name.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::UnsupportedVariant => ErrorKind::UnsupportedVariant,
            Self::UnsupportedAttribute(_) => ErrorKind::UnsupportedAttribute,
            Self::ElementNotAvailable { .. } => ErrorKind::ElementNotAvailable,
            Self::RequestNotSupported { .. } => ErrorKind::RequestNotSupported,
            Self::AutomationCallFailed { .. } => ErrorKind::AutomationCallFailed,
        }
    }

    /// Native status code this error was translated from, if any.
    pub fn code(&self) -> Option<NativeStatus> {
        match self {
            Self::ElementNotAvailable { code }
            | Self::RequestNotSupported { code }
            | Self::AutomationCallFailed { code } => Some(NativeStatus::from_bits(*code)),
            _ => None,
        }
    }
}

/// Map a native failure code onto the error taxonomy.
pub fn translate(status: NativeStatus) -> AutomationError {
    let code = status.bits();
    match status {
        NativeStatus::ELEMENT_NOT_AVAILABLE
        | NativeStatus::OBJECT_NOT_CONNECTED
        | NativeStatus::RPC_DISCONNECTED => AutomationError::ElementNotAvailable { code },
        NativeStatus::NOT_SUPPORTED
        | NativeStatus::INVALID_OPERATION
        | NativeStatus::NOT_IMPLEMENTED
        | NativeStatus::ELEMENT_NOT_ENABLED
        | NativeStatus::NO_CLICKABLE_POINT => AutomationError::RequestNotSupported { code },
        _ => AutomationError::AutomationCallFailed { code },
    }
}

/// Run one call across the native boundary, translating any failure.
pub fn native_call<T>(operation: &'static str, call: impl FnOnce() -> NativeResult<T>) -> Result<T> {
    call().map_err(|status| {
        let err = translate(status);
        tracing::debug!(
            operation,
            code = %status,
            kind = ?err.kind(),
            "Native automation call failed"
        );
        err
    })
}

pub type Result<T> = std::result::Result<T, AutomationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_known_codes() {
        assert_eq!(
            translate(NativeStatus::ELEMENT_NOT_AVAILABLE).kind(),
            ErrorKind::ElementNotAvailable
        );
        assert_eq!(
            translate(NativeStatus::RPC_DISCONNECTED).kind(),
            ErrorKind::ElementNotAvailable
        );
        assert_eq!(
            translate(NativeStatus::INVALID_OPERATION).kind(),
            ErrorKind::RequestNotSupported
        );
        assert_eq!(
            translate(NativeStatus::NOT_SUPPORTED).kind(),
            ErrorKind::RequestNotSupported
        );
    }

    #[test]
    fn test_unmapped_code_keeps_original() {
        let err = translate(NativeStatus::from_bits(0x8000_4005));
        assert_eq!(err.kind(), ErrorKind::AutomationCallFailed);
        assert_eq!(err.code(), Some(NativeStatus::from_bits(0x8000_4005)));
        assert!(err.to_string().contains("0x80004005"));
    }

    #[test]
    fn test_invalid_argument_never_carries_code() {
        let err = translate(NativeStatus::INVALID_ARG);
        assert_eq!(err.kind(), ErrorKind::AutomationCallFailed);

        let local = AutomationError::invalid_argument("property");
        assert_eq!(local.kind(), ErrorKind::InvalidArgument);
        assert_eq!(local.code(), None);
    }

    #[test]
    fn test_native_call_passes_success_through() {
        let value = native_call("test", || Ok(7)).unwrap();
        assert_eq!(value, 7);

        let err = native_call::<()>("test", || Err(NativeStatus::ELEMENT_NOT_AVAILABLE))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ElementNotAvailable);
    }
}
