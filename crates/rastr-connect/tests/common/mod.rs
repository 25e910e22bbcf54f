//! Scripted automation host shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rastr_connect::{AutomationHost, DispatchError, DispatchResult};
use uuid::Uuid;

/// Which host operation was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Dispatch,
    ByGuid,
    TypeCache,
}

/// What the next dispatch call should do.
#[derive(Debug, Clone)]
pub enum Reply {
    Handle(&'static str),
    Null,
    Fail(&'static str),
    /// Sleep, then hand back a handle.
    Slow(Duration, &'static str),
}

/// Host that answers dispatch calls from a queue of replies, in call order,
/// and records every call it receives.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHost {
    unavailable: Option<String>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
    calls: Arc<Mutex<Vec<(Op, String)>>>,
}

impl ScriptedHost {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            ..Default::default()
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            unavailable: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(Op, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn answer(&self, op: Op, target: String) -> DispatchResult<String> {
        self.calls.lock().unwrap().push((op, target));
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Handle(h)) => Ok(Some(h.to_string())),
            Some(Reply::Null) => Ok(None),
            Some(Reply::Fail(msg)) => Err(DispatchError::new(msg)),
            Some(Reply::Slow(delay, h)) => {
                thread::sleep(delay);
                Ok(Some(h.to_string()))
            }
            None => Err(DispatchError::new("unscripted call")),
        }
    }
}

impl AutomationHost for ScriptedHost {
    type Handle = String;

    fn availability(&self) -> Result<(), String> {
        match &self.unavailable {
            Some(reason) => Err(reason.clone()),
            None => Ok(()),
        }
    }

    fn dispatch(&self, prog_id: &str) -> DispatchResult<String> {
        self.answer(Op::Dispatch, prog_id.to_string())
    }

    fn dispatch_by_guid(&self, guid: &Uuid) -> DispatchResult<String> {
        self.answer(Op::ByGuid, guid.braced().to_string().to_uppercase())
    }

    fn dispatch_with_type_cache(&self, guid: &Uuid) -> DispatchResult<String> {
        self.answer(Op::TypeCache, guid.braced().to_string().to_uppercase())
    }
}
