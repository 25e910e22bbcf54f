//! Ordered-fallback connection resolution.
//!
//! Strategies are tried strictly in order, each at most once. The first one
//! that yields a handle ends the sequence; failures before it are recorded and
//! returned alongside the handle.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::diagnostics::DiagnosticSink;
use crate::error::{ConfigError, ResolveError, Result, StrategyFailure};
use crate::host::AutomationHost;
use crate::strategy::{default_strategies, ConnectionStrategy, DispatchMethod, Target};

/// Failure message when a dispatch call returns without an object.
pub const NO_OBJECT: &str = "dispatch returned no object";

/// Failure message for a type-cached strategy whose identifier is not a GUID.
pub const TYPE_CACHE_NEEDS_GUID: &str = "type-cached dispatch requires a GUID identifier";

/// A handle together with how it was obtained.
#[derive(Debug)]
pub struct Connection<H> {
    pub handle: H,
    /// Label of the strategy that succeeded.
    pub strategy: String,
    /// Strategies that failed before it, in attempt order.
    pub failures: Vec<StrategyFailure>,
}

/// Result of one resolver call. Holds at most one handle.
#[derive(Debug)]
pub enum ConnectionOutcome<H> {
    Connected(Connection<H>),
    Exhausted { failures: Vec<StrategyFailure> },
    PlatformUnsupported { reason: String },
}

impl<H> ConnectionOutcome<H> {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionOutcome::Connected(_))
    }

    pub fn handle(&self) -> Option<&H> {
        match self {
            ConnectionOutcome::Connected(conn) => Some(&conn.handle),
            _ => None,
        }
    }

    /// Label of the succeeding strategy, if any.
    pub fn strategy(&self) -> Option<&str> {
        match self {
            ConnectionOutcome::Connected(conn) => Some(&conn.strategy),
            _ => None,
        }
    }

    /// Recorded failures in attempt order.
    pub fn failures(&self) -> &[StrategyFailure] {
        match self {
            ConnectionOutcome::Connected(conn) => &conn.failures,
            ConnectionOutcome::Exhausted { failures } => failures,
            ConnectionOutcome::PlatformUnsupported { .. } => &[],
        }
    }

    pub fn into_handle(self) -> Option<H> {
        match self {
            ConnectionOutcome::Connected(conn) => Some(conn.handle),
            _ => None,
        }
    }

    pub fn into_result(self) -> std::result::Result<Connection<H>, ResolveError> {
        match self {
            ConnectionOutcome::Connected(conn) => Ok(conn),
            ConnectionOutcome::Exhausted { failures } => {
                Err(ResolveError::AllStrategiesExhausted(failures))
            }
            ConnectionOutcome::PlatformUnsupported { reason } => {
                Err(ResolveError::PlatformUnsupported(reason))
            }
        }
    }
}

/// Tries a fixed, non-empty list of strategies against a host.
#[derive(Debug, Clone)]
pub struct ConnectionResolver {
    strategies: Vec<ConnectionStrategy>,
}

impl ConnectionResolver {
    pub fn new(strategies: Vec<ConnectionStrategy>) -> Result<Self> {
        if strategies.is_empty() {
            return Err(ConfigError::NoStrategies);
        }
        Ok(Self { strategies })
    }

    /// Resolver over the built-in RastrWin strategies.
    pub fn rastr() -> Self {
        Self {
            strategies: default_strategies(),
        }
    }

    pub fn strategies(&self) -> &[ConnectionStrategy] {
        &self.strategies
    }

    /// Resolve a handle, blocking on each dispatch call for as long as the
    /// host takes.
    pub fn resolve<H: AutomationHost>(
        &self,
        host: &H,
        sink: &mut impl DiagnosticSink,
    ) -> ConnectionOutcome<H::Handle> {
        if let Some(unsupported) = check_platform(host, sink) {
            return unsupported;
        }
        self.run(sink, |strategy| attempt(host, strategy))
    }

    /// Like [`resolve`](Self::resolve), but gives up on any single attempt
    /// after `attempt_timeout` and moves on to the next strategy.
    ///
    /// Each attempt runs on its own thread. A handle produced after its
    /// attempt timed out is dropped on that thread.
    pub fn resolve_with_timeout<H>(
        &self,
        host: &H,
        sink: &mut impl DiagnosticSink,
        attempt_timeout: Duration,
    ) -> ConnectionOutcome<H::Handle>
    where
        H: AutomationHost + Clone + Send + 'static,
        H::Handle: Send + 'static,
    {
        if let Some(unsupported) = check_platform(host, sink) {
            return unsupported;
        }
        self.run(sink, |strategy| {
            attempt_on_thread(host.clone(), strategy.clone(), attempt_timeout)
        })
    }

    fn run<T>(
        &self,
        sink: &mut impl DiagnosticSink,
        mut try_strategy: impl FnMut(&ConnectionStrategy) -> std::result::Result<T, String>,
    ) -> ConnectionOutcome<T> {
        let total = self.strategies.len();
        let mut failures = Vec::new();

        for (i, strategy) in self.strategies.iter().enumerate() {
            let position = i + 1;
            tracing::debug!(
                strategy = strategy.label(),
                method = %strategy.method(),
                "Trying strategy {position}/{total}"
            );
            sink.line(&format!(
                "[{position}/{total}] trying {} ({})",
                strategy.label(),
                strategy.method()
            ));

            match try_strategy(strategy) {
                Ok(handle) => {
                    tracing::info!("Connected via {}", strategy.label());
                    sink.line(&format!(
                        "[{position}/{total}] {} ({}): connected",
                        strategy.label(),
                        strategy.method()
                    ));
                    return ConnectionOutcome::Connected(Connection {
                        handle,
                        strategy: strategy.label().to_string(),
                        failures,
                    });
                }
                Err(message) => {
                    tracing::warn!("Strategy {} failed: {message}", strategy.label());
                    sink.line(&format!(
                        "[{position}/{total}] {} ({}): failed: {message}",
                        strategy.label(),
                        strategy.method()
                    ));
                    failures.push(StrategyFailure::new(strategy.label(), message));
                }
            }
        }

        sink.line(&format!(
            "Could not connect: all {total} connection strategies failed"
        ));
        ConnectionOutcome::Exhausted { failures }
    }
}

impl Default for ConnectionResolver {
    fn default() -> Self {
        Self::rastr()
    }
}

fn check_platform<H: AutomationHost, T>(
    host: &H,
    sink: &mut impl DiagnosticSink,
) -> Option<ConnectionOutcome<T>> {
    match host.availability() {
        Ok(()) => None,
        Err(reason) => {
            tracing::warn!("Automation host unavailable: {reason}");
            sink.line(&format!("Automation unavailable on this platform: {reason}"));
            Some(ConnectionOutcome::PlatformUnsupported { reason })
        }
    }
}

/// Route one strategy to the matching host operation. Null handles and
/// dispatch errors both come back as `Err`.
fn attempt<H: AutomationHost>(
    host: &H,
    strategy: &ConnectionStrategy,
) -> std::result::Result<H::Handle, String> {
    let dispatched = match (strategy.method(), strategy.target()) {
        (DispatchMethod::Simple, Target::ProgId(prog_id)) => host.dispatch(prog_id),
        (DispatchMethod::Simple, Target::Guid(guid)) => host.dispatch_by_guid(&guid),
        (DispatchMethod::TypeCached, Target::Guid(guid)) => host.dispatch_with_type_cache(&guid),
        (DispatchMethod::TypeCached, Target::ProgId(_)) => {
            return Err(TYPE_CACHE_NEEDS_GUID.to_string());
        }
    };

    match dispatched {
        Ok(Some(handle)) => Ok(handle),
        Ok(None) => Err(NO_OBJECT.to_string()),
        Err(e) => Err(e.message),
    }
}

fn attempt_on_thread<H>(
    host: H,
    strategy: ConnectionStrategy,
    timeout: Duration,
) -> std::result::Result<H::Handle, String>
where
    H: AutomationHost + Send + 'static,
    H::Handle: Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("rastr-dispatch".to_string())
        .spawn(move || {
            // Receiver is gone if we timed out; the handle drops here.
            let _ = tx.send(attempt(&host, &strategy));
        });

    if let Err(e) = spawned {
        return Err(format!("failed to start dispatch thread: {e}"));
    }

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            Err(format!("timed out after {} ms", timeout.as_millis()))
        }
        Err(RecvTimeoutError::Disconnected) => Err("dispatch thread panicked".to_string()),
    }
}
