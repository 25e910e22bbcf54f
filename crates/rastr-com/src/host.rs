//! [`AutomationHost`] backed by the Windows COM runtime.

#![cfg(windows)]

use std::marker::PhantomData;

use rastr_connect::{AutomationHost, DispatchError, DispatchResult, MemberLookup};
use uuid::Uuid;
use windows::core::GUID;
use windows::Win32::Foundation::RPC_E_CHANGED_MODE;
use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_APARTMENTTHREADED};

use crate::dispatch::ComObject;

/// COM host for the current thread.
///
/// Initializes COM in a single-threaded apartment on construction and
/// uninitializes it on drop. Objects it creates belong to this thread's
/// apartment, so neither the host nor its handles can leave the thread.
pub struct ComHost {
    init: Result<(), String>,
    /// Whether `Drop` owes a `CoUninitialize`.
    owns_apartment: bool,
    _not_send: PhantomData<*const ()>,
}

impl ComHost {
    pub fn new() -> Self {
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };
        let (init, owns_apartment) = if hr == RPC_E_CHANGED_MODE {
            // Already multithreaded on this thread; COM is usable, the apartment isn't ours.
            tracing::debug!("COM already initialized in another apartment mode");
            (Ok(()), false)
        } else {
            match hr.ok() {
                Ok(()) => {
                    tracing::debug!("COM initialized (STA)");
                    (Ok(()), true)
                }
                Err(e) => (Err(format!("CoInitializeEx failed: {e}")), false),
            }
        };
        Self {
            init,
            owns_apartment,
            _not_send: PhantomData,
        }
    }
}

impl Default for ComHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ComHost {
    fn drop(&mut self) {
        if self.owns_apartment {
            unsafe { CoUninitialize() };
            tracing::debug!("COM uninitialized");
        }
    }
}

fn clsid(guid: &Uuid) -> GUID {
    GUID::from_u128(guid.as_u128())
}

impl AutomationHost for ComHost {
    type Handle = ComObject;

    fn availability(&self) -> Result<(), String> {
        self.init.clone()
    }

    fn dispatch(&self, prog_id: &str) -> DispatchResult<ComObject> {
        tracing::debug!("Dispatch by ProgID {prog_id}");
        ComObject::create_from_progid(prog_id)
            .map(Some)
            .map_err(DispatchError::from)
    }

    fn dispatch_by_guid(&self, guid: &Uuid) -> DispatchResult<ComObject> {
        tracing::debug!("Dispatch by CLSID {}", guid.braced());
        ComObject::create_from_clsid(&clsid(guid))
            .map(Some)
            .map_err(DispatchError::from)
    }

    fn dispatch_with_type_cache(&self, guid: &Uuid) -> DispatchResult<ComObject> {
        tracing::debug!("Dispatch by CLSID {} with type info", guid.braced());
        ComObject::create_from_clsid(&clsid(guid))
            .and_then(ComObject::with_type_info)
            .map(Some)
            .map_err(DispatchError::from)
    }
}

impl MemberLookup for ComObject {
    fn has_member(&self, name: &str) -> bool {
        self.get_dispid(name).is_ok()
    }

    fn read_property(&self, name: &str) -> Result<(), String> {
        self.get_property(name).map(|_| ())
    }
}
