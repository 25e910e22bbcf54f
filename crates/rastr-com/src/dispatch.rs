//! Safe wrapper around IDispatch for late-bound COM automation.
//!
//! RastrWin exposes its object model through IDispatch only, so members are
//! looked up by name at runtime (like VBScript late binding).

#![cfg(windows)]

use windows::{
    core::{GUID, HSTRING, PCWSTR},
    Win32::{
        Foundation::DISP_E_EXCEPTION,
        Globalization::GetSystemDefaultLCID,
        System::{
            Com::{
                CLSIDFromProgID, CoCreateInstance, IDispatch, ITypeInfo, ITypeLib,
                CLSCTX_INPROC_SERVER, CLSCTX_LOCAL_SERVER, DISPATCH_PROPERTYGET, DISPPARAMS,
                EXCEPINFO,
            },
            Variant::VARIANT,
        },
    },
};

/// Type information kept alive next to a dispatched object.
#[derive(Clone)]
struct TypeInfoCache {
    info: ITypeInfo,
    _library: ITypeLib,
}

/// A RastrWin (or any other) automation object reached through IDispatch.
#[derive(Clone)]
pub struct ComObject {
    inner: IDispatch,
    type_info: Option<TypeInfoCache>,
}

impl ComObject {
    /// Create an object from a ProgID string (e.g., "Astra.Rastr").
    pub fn create_from_progid(progid: &str) -> Result<Self, String> {
        let hstr = HSTRING::from(progid);
        let clsid = unsafe { CLSIDFromProgID(&hstr) }
            .map_err(|e| format!("CLSIDFromProgID('{progid}') failed: {e}"))?;
        Self::create_from_clsid(&clsid)
    }

    /// Create an object from its CLSID, in-process or local server.
    pub fn create_from_clsid(clsid: &GUID) -> Result<Self, String> {
        let disp: IDispatch =
            unsafe { CoCreateInstance(clsid, None, CLSCTX_INPROC_SERVER | CLSCTX_LOCAL_SERVER) }
                .map_err(|e| format!("CoCreateInstance failed for {clsid:?}: {e}"))?;
        Ok(Self {
            inner: disp,
            type_info: None,
        })
    }

    /// Load the object's type information and its containing type library
    /// and keep both for the lifetime of the object.
    pub fn with_type_info(mut self) -> Result<Self, String> {
        unsafe {
            let count = self
                .inner
                .GetTypeInfoCount()
                .map_err(|e| format!("GetTypeInfoCount failed: {e}"))?;
            if count == 0 {
                return Err("server exposes no type information".to_string());
            }

            let info = self
                .inner
                .GetTypeInfo(0, GetSystemDefaultLCID())
                .map_err(|e| format!("GetTypeInfo failed: {e}"))?;

            let mut library: Option<ITypeLib> = None;
            let mut index = 0u32;
            info.GetContainingTypeLib(&mut library, &mut index)
                .map_err(|e| format!("GetContainingTypeLib failed: {e}"))?;
            let library =
                library.ok_or_else(|| "type information has no containing library".to_string())?;

            self.type_info = Some(TypeInfoCache {
                info,
                _library: library,
            });
        }
        Ok(self)
    }

    /// Look up the DISPID for a member name. Uses the cached type information
    /// when present, falling back to asking the object.
    pub fn get_dispid(&self, name: &str) -> Result<i32, String> {
        unsafe {
            let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
            let pcwstr = PCWSTR(wide.as_ptr());
            let names = [pcwstr];
            let mut dispid = 0i32;

            if let Some(cache) = &self.type_info {
                if cache.info.GetIDsOfNames(names.as_ptr(), 1, &mut dispid).is_ok() {
                    return Ok(dispid);
                }
            }

            self.inner
                .GetIDsOfNames(
                    &GUID::zeroed(),
                    names.as_ptr(),
                    1,
                    GetSystemDefaultLCID(),
                    &mut dispid,
                )
                .map_err(|e| format!("GetIDsOfNames('{name}') failed: {e}"))?;
            Ok(dispid)
        }
    }

    /// Get a property value. Equivalent to VB's `obj.PropertyName`.
    pub fn get_property(&self, name: &str) -> Result<VARIANT, String> {
        let dispid = self.get_dispid(name)?;
        unsafe {
            let params = DISPPARAMS::default();
            let mut result = VARIANT::default();
            let mut except = EXCEPINFO::default();
            self.inner
                .Invoke(
                    dispid,
                    &GUID::zeroed(),
                    GetSystemDefaultLCID(),
                    DISPATCH_PROPERTYGET,
                    &params,
                    Some(&mut result),
                    Some(&mut except),
                    None,
                )
                .map_err(|e| format_invoke_error(e, &except, name))?;
            Ok(result)
        }
    }
}

/// Format an Invoke error, including EXCEPINFO details if available.
fn format_invoke_error(err: windows::core::Error, except: &EXCEPINFO, member_name: &str) -> String {
    let code = err.code().0 as u32;
    if code == DISP_E_EXCEPTION.0 as u32 {
        let desc = if !except.bstrDescription.is_empty() {
            except.bstrDescription.to_string()
        } else {
            String::from("(no description)")
        };
        let source = if !except.bstrSource.is_empty() {
            except.bstrSource.to_string()
        } else {
            String::from("(no source)")
        };
        format!("COM exception in '{member_name}': {desc} (source: {source})")
    } else {
        format!("Invoke('{member_name}') failed: {err}")
    }
}
