//! The host automation capability the resolver dispatches through.

use thiserror::Error;
use uuid::Uuid;

/// Error raised by a single dispatch call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DispatchError {
    pub message: String,
}

impl DispatchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for DispatchError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for DispatchError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Outcome of one dispatch call. `Ok(None)` means the call returned without
/// an object.
pub type DispatchResult<H> = Result<Option<H>, DispatchError>;

/// A platform service that turns a ProgID or GUID into a callable handle.
///
/// Implementations own whatever per-thread setup the platform needs; the
/// resolver only calls these methods in sequence.
pub trait AutomationHost {
    /// Opaque reference to the remote object. Owned by the caller once returned.
    type Handle;

    /// Whether the capability exists on this platform at all.
    fn availability(&self) -> Result<(), String>;

    /// Dispatch by program identifier.
    fn dispatch(&self, prog_id: &str) -> DispatchResult<Self::Handle>;

    /// Dispatch by class GUID.
    fn dispatch_by_guid(&self, guid: &Uuid) -> DispatchResult<Self::Handle>;

    /// Dispatch by class GUID and make sure the server's type information is
    /// loaded alongside the handle.
    fn dispatch_with_type_cache(&self, guid: &Uuid) -> DispatchResult<Self::Handle>;
}

impl<H: AutomationHost + ?Sized> AutomationHost for &H {
    type Handle = H::Handle;

    fn availability(&self) -> Result<(), String> {
        (**self).availability()
    }

    fn dispatch(&self, prog_id: &str) -> DispatchResult<Self::Handle> {
        (**self).dispatch(prog_id)
    }

    fn dispatch_by_guid(&self, guid: &Uuid) -> DispatchResult<Self::Handle> {
        (**self).dispatch_by_guid(guid)
    }

    fn dispatch_with_type_cache(&self, guid: &Uuid) -> DispatchResult<Self::Handle> {
        (**self).dispatch_with_type_cache(guid)
    }
}

impl<H: AutomationHost + ?Sized> AutomationHost for Box<H> {
    type Handle = H::Handle;

    fn availability(&self) -> Result<(), String> {
        (**self).availability()
    }

    fn dispatch(&self, prog_id: &str) -> DispatchResult<Self::Handle> {
        (**self).dispatch(prog_id)
    }

    fn dispatch_by_guid(&self, guid: &Uuid) -> DispatchResult<Self::Handle> {
        (**self).dispatch_by_guid(guid)
    }

    fn dispatch_with_type_cache(&self, guid: &Uuid) -> DispatchResult<Self::Handle> {
        (**self).dispatch_with_type_cache(guid)
    }
}

/// Stand-in host for platforms without COM, and for tests.
///
/// Reports itself unavailable, and every dispatch fails.
#[derive(Debug, Clone)]
pub struct UnsupportedHost {
    reason: String,
}

impl UnsupportedHost {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Default for UnsupportedHost {
    fn default() -> Self {
        Self::new("COM automation is only available on Windows")
    }
}

impl AutomationHost for UnsupportedHost {
    type Handle = std::convert::Infallible;

    fn availability(&self) -> Result<(), String> {
        Err(self.reason.clone())
    }

    fn dispatch(&self, _prog_id: &str) -> DispatchResult<Self::Handle> {
        Err(DispatchError::new(self.reason.clone()))
    }

    fn dispatch_by_guid(&self, _guid: &Uuid) -> DispatchResult<Self::Handle> {
        Err(DispatchError::new(self.reason.clone()))
    }

    fn dispatch_with_type_cache(&self, _guid: &Uuid) -> DispatchResult<Self::Handle> {
        Err(DispatchError::new(self.reason.clone()))
    }
}
