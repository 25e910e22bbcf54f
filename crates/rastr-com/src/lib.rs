//! Windows COM host for `rastr-connect`.
//!
//! On Windows, [`platform_host`] returns a [`ComHost`] that creates objects
//! through `CoCreateInstance` and talks to them over IDispatch. Everywhere
//! else it returns an [`UnsupportedHost`], so callers compile and run the same
//! code on every platform and get a "platform unsupported" outcome off Windows.
//!
//! # Architecture
//!
//! ```text
//! ConnectionResolver (rastr-connect)
//!     └── ComHost (this crate)
//!           └── COM: Astra.Rastr / {EFC5E4AD-A3DD-11D3-B73F-00500454CF3F}
//! ```

#[cfg(windows)]
mod dispatch;
#[cfg(windows)]
mod host;

#[cfg(windows)]
pub use dispatch::ComObject;
#[cfg(windows)]
pub use host::ComHost;

pub use rastr_connect::UnsupportedHost;

/// The automation host for the platform this was compiled for.
#[cfg(windows)]
pub type PlatformHost = ComHost;

/// The automation host for the platform this was compiled for.
#[cfg(not(windows))]
pub type PlatformHost = UnsupportedHost;

/// Build the host for this platform. On Windows this initializes COM on the
/// calling thread, so call it on the thread that will use the handles.
pub fn platform_host() -> PlatformHost {
    #[cfg(windows)]
    {
        ComHost::new()
    }
    #[cfg(not(windows))]
    {
        UnsupportedHost::default()
    }
}
