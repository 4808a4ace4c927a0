// Scripted capability double shared by engine and session tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::enhance::capability::{CapabilityError, EnhanceRequest, EnhancementCapability};

pub(crate) struct ScriptedCapability {
    replies: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<EnhanceRequest>>,
    calls: AtomicUsize,
    fail: bool,
}

impl ScriptedCapability {
    /// Replies in order; once exhausted, answers with an empty object.
    pub(crate) fn replying(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            seen: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    pub(crate) fn failing() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<EnhanceRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnhancementCapability for ScriptedCapability {
    async fn rewrite(&self, request: &EnhanceRequest) -> Result<String, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(CapabilityError::Transport("connection reset".into()));
        }
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "{}".to_string()))
    }
}
