//! Connection strategies: what to dispatch, and how.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ProgID under which RastrWin registers its automation server.
pub const RASTR_PROG_ID: &str = "Astra.Rastr";

/// CLSID of the RastrWin automation server.
pub const RASTR_CLSID: &str = "{EFC5E4AD-A3DD-11D3-B73F-00500454CF3F}";

/// How a strategy asks the host for an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispatchMethod {
    /// Plain late-bound dispatch by ProgID or GUID.
    #[serde(rename = "simple-dispatch")]
    Simple,
    /// Dispatch by GUID that also loads and keeps the server's type information.
    #[serde(rename = "type-cached-dispatch")]
    TypeCached,
}

impl DispatchMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchMethod::Simple => "simple-dispatch",
            DispatchMethod::TypeCached => "type-cached-dispatch",
        }
    }
}

impl fmt::Display for DispatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a strategy identifier refers to once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    ProgId(&'a str),
    Guid(Uuid),
}

/// One entry in an ordered list of connection attempts.
///
/// Strategies are immutable once built; the resolver only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStrategy {
    identifier: String,
    method: DispatchMethod,
    label: String,
}

impl ConnectionStrategy {
    /// Build a strategy with an explicit diagnostic label.
    pub fn new(
        identifier: impl Into<String>,
        method: DispatchMethod,
        label: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            method,
            label: label.into(),
        }
    }

    /// Simple dispatch by ProgID, labelled `ProgID('<id>')`.
    pub fn prog_id(prog_id: impl Into<String>) -> Self {
        let prog_id = prog_id.into();
        let label = format!("ProgID('{prog_id}')");
        Self::new(prog_id, DispatchMethod::Simple, label)
    }

    /// Simple dispatch by GUID, labelled `GUID('<guid>')`.
    pub fn guid(guid: impl Into<String>) -> Self {
        let guid = guid.into();
        let label = format!("GUID('{guid}')");
        Self::new(guid, DispatchMethod::Simple, label)
    }

    /// Type-cached dispatch by GUID, labelled `TypeCache('<guid>')`.
    pub fn type_cached(guid: impl Into<String>) -> Self {
        let guid = guid.into();
        let label = format!("TypeCache('{guid}')");
        Self::new(guid, DispatchMethod::TypeCached, label)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn method(&self) -> DispatchMethod {
        self.method
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Classify the identifier. Anything that parses as a GUID (braced,
    /// hyphenated or simple form) is a GUID; everything else is a ProgID.
    pub fn target(&self) -> Target<'_> {
        match Uuid::parse_str(self.identifier.trim()) {
            Ok(guid) => Target::Guid(guid),
            Err(_) => Target::ProgId(&self.identifier),
        }
    }
}

impl fmt::Display for ConnectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.label, self.method)
    }
}

/// The RastrWin strategies in priority order: ProgID, GUID, then
/// GUID with type information cached.
pub fn default_strategies() -> Vec<ConnectionStrategy> {
    vec![
        ConnectionStrategy::prog_id(RASTR_PROG_ID),
        ConnectionStrategy::guid(RASTR_CLSID),
        ConnectionStrategy::type_cached(RASTR_CLSID),
    ]
}
