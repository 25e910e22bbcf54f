//! Connection resolution for the RastrWin automation server.
//!
//! RastrWin registers a COM server that can be reached several ways: by its
//! ProgID, by its CLSID, or by CLSID with its type library loaded. Which one
//! works depends on how the machine was set up, so this crate tries an
//! ordered list of [`ConnectionStrategy`] values and stops at the first that
//! yields a handle.
//!
//! The platform side is abstracted behind [`AutomationHost`]. The Windows
//! implementation lives in the `rastr-com` crate; [`UnsupportedHost`] stands
//! in everywhere else.
//!
//! # Example
//!
//! ```rust
//! use rastr_connect::{ConnectionOutcome, ConnectionResolver, UnsupportedHost, WriterSink};
//!
//! let resolver = ConnectionResolver::rastr();
//! let mut sink = WriterSink::new(std::io::stderr());
//! match resolver.resolve(&UnsupportedHost::default(), &mut sink) {
//!     ConnectionOutcome::Connected(conn) => println!("connected via {}", conn.strategy),
//!     ConnectionOutcome::Exhausted { failures } => eprintln!("{} strategies failed", failures.len()),
//!     ConnectionOutcome::PlatformUnsupported { reason } => eprintln!("{reason}"),
//! }
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod host;
pub mod inspect;
pub mod report;
pub mod resolver;
pub mod strategy;

pub use config::ResolverConfig;
pub use diagnostics::{DiagnosticSink, NullSink, TracingSink, WriterSink};
pub use error::{ConfigError, ResolveError, StrategyFailure};
pub use host::{AutomationHost, DispatchError, DispatchResult, UnsupportedHost};
pub use inspect::{
    inspect, MemberLookup, MemberStatus, ObjectInspection, PropertyRead, DEFAULT_PROBE_MEMBERS,
};
pub use report::{ConnectionReport, ReportStatus};
pub use resolver::{Connection, ConnectionOutcome, ConnectionResolver};
pub use strategy::{
    default_strategies, ConnectionStrategy, DispatchMethod, Target, RASTR_CLSID, RASTR_PROG_ID,
};

/// Things to check when no strategy connects.
pub const TROUBLESHOOTING_HINTS: &[&str] = &[
    "RastrWin is installed on this computer",
    "the ProgID or GUID is correct",
    "the required services are running",
];
