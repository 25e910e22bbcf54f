//! Inspection of a connected automation object.

use serde::{Deserialize, Serialize};

use crate::diagnostics::DiagnosticSink;

/// Members a usable RastrWin object is expected to expose.
pub const DEFAULT_PROBE_MEMBERS: &[&str] = &["rgm", "Load", "Save", "Tables"];

/// Property read back to confirm the object answers calls, not just names.
pub const TABLES_PROPERTY: &str = "Tables";

/// Name-level access to a late-bound object.
pub trait MemberLookup {
    /// Whether the object knows a member by this name.
    fn has_member(&self, name: &str) -> bool;

    /// Read a property, discarding the value.
    fn read_property(&self, name: &str) -> Result<(), String>;
}

impl MemberLookup for std::convert::Infallible {
    fn has_member(&self, _name: &str) -> bool {
        match *self {}
    }

    fn read_property(&self, _name: &str) -> Result<(), String> {
        match *self {}
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberStatus {
    pub name: String,
    pub present: bool,
}

/// Result of reading a property back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum PropertyRead {
    Readable,
    Failed { error: String },
}

/// What [`inspect`] found.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectInspection {
    pub members: Vec<MemberStatus>,
    /// Reading `Tables`; `None` when `Tables` was not probed or is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<PropertyRead>,
}

impl ObjectInspection {
    pub fn missing(&self) -> Vec<&str> {
        self.members
            .iter()
            .filter(|m| !m.present)
            .map(|m| m.name.as_str())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.members.iter().all(|m| m.present) && !matches!(self.tables, Some(PropertyRead::Failed { .. }))
    }
}

/// Look up each member by name, then try reading `Tables` if it was requested
/// and exists. Writes one line per member plus one for the `Tables` read.
///
/// Member names match `Tables` case-insensitively, as IDispatch name lookup does.
pub fn inspect<O: MemberLookup + ?Sized>(
    object: &O,
    members: &[impl AsRef<str>],
    sink: &mut impl DiagnosticSink,
) -> ObjectInspection {
    let mut inspection = ObjectInspection::default();

    for name in members {
        let name = name.as_ref();
        let present = object.has_member(name);
        tracing::debug!(member = name, present, "Probed member");
        sink.line(&if present {
            format!("  + {name}")
        } else {
            format!("  - {name} (not found)")
        });
        inspection.members.push(MemberStatus {
            name: name.to_string(),
            present,
        });
    }

    let tables = inspection
        .members
        .iter()
        .find(|m| m.present && m.name.eq_ignore_ascii_case(TABLES_PROPERTY))
        .map(|m| m.name.clone());
    if let Some(name) = tables {
        let read = match object.read_property(&name) {
            Ok(()) => {
                sink.line(&format!("'{name}' property is readable"));
                PropertyRead::Readable
            }
            Err(error) => {
                tracing::warn!("Reading {name} failed: {error}");
                sink.line(&format!("Error reading '{name}': {error}"));
                PropertyRead::Failed { error }
            }
        };
        inspection.tables = Some(read);
    }

    inspection
}
