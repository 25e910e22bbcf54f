//! Serializable summary of a connection attempt, for machine-readable output.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StrategyFailure;
use crate::inspect::ObjectInspection;
use crate::resolver::ConnectionOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    Connected,
    Exhausted,
    PlatformUnsupported,
    /// The caller's deadline passed before the resolver finished.
    TimedOut,
}

/// Everything a caller might want to log about one resolver call. Holds no
/// handle, so it can cross threads and processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub status: ReportStatus,
    /// Label of the strategy that connected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    /// Why the platform was rejected, or why the run was cut short.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub failures: Vec<StrategyFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspection: Option<ObjectInspection>,
}

impl ConnectionReport {
    pub fn from_outcome<H>(outcome: &ConnectionOutcome<H>) -> Self {
        let (status, reason) = match outcome {
            ConnectionOutcome::Connected(_) => (ReportStatus::Connected, None),
            ConnectionOutcome::Exhausted { .. } => (ReportStatus::Exhausted, None),
            ConnectionOutcome::PlatformUnsupported { reason } => {
                (ReportStatus::PlatformUnsupported, Some(reason.clone()))
            }
        };
        Self {
            status,
            strategy: outcome.strategy().map(str::to_string),
            reason,
            failures: outcome.failures().to_vec(),
            inspection: None,
        }
    }

    /// Report for a run abandoned after `deadline`. Nothing is known about
    /// which strategies were tried.
    pub fn timed_out(deadline: Duration) -> Self {
        Self {
            status: ReportStatus::TimedOut,
            strategy: None,
            reason: Some(format!(
                "timed out after {} ms waiting for the automation server",
                deadline.as_millis()
            )),
            failures: Vec::new(),
            inspection: None,
        }
    }

    pub fn with_inspection(mut self, inspection: ObjectInspection) -> Self {
        self.inspection = Some(inspection);
        self
    }

    pub fn is_connected(&self) -> bool {
        self.status == ReportStatus::Connected
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::resolver::Connection;

    #[test]
    fn test_connected_report_json() {
        let outcome = ConnectionOutcome::Connected(Connection {
            handle: (),
            strategy: "GUID('{EFC5E4AD-A3DD-11D3-B73F-00500454CF3F}')".to_string(),
            failures: vec![StrategyFailure::new("ProgID('Astra.Rastr')", "not registered")],
        });
        let report = ConnectionReport::from_outcome(&outcome);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "status": "connected",
                "strategy": "GUID('{EFC5E4AD-A3DD-11D3-B73F-00500454CF3F}')",
                "failures": [
                    { "label": "ProgID('Astra.Rastr')", "message": "not registered" }
                ]
            })
        );
    }

    #[test]
    fn test_unsupported_report_json() {
        let outcome: ConnectionOutcome<()> = ConnectionOutcome::PlatformUnsupported {
            reason: "COM automation is only available on Windows".to_string(),
        };
        let report = ConnectionReport::from_outcome(&outcome);
        assert!(!report.is_connected());
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "status": "platform-unsupported",
                "reason": "COM automation is only available on Windows",
                "failures": []
            })
        );
    }

    #[test]
    fn test_timed_out_report_json() {
        let report = ConnectionReport::timed_out(Duration::from_millis(1500));
        assert!(!report.is_connected());
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "status": "timed-out",
                "reason": "timed out after 1500 ms waiting for the automation server",
                "failures": []
            })
        );
    }
}
