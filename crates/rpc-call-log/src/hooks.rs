//! Hook registry for host implementations
//!
//! [`CallHooks`] stores the observers registered for one call and fires them
//! when the host reaches the matching lifecycle event. A host embeds one per
//! call and forwards the shape traits to it.
//!
//! Observers run in registration order. The host's continuation is handed to
//! the first observer, which runs it before doing its own work; if no
//! observer is registered the continuation runs directly. Either way it runs
//! exactly once per event.

use std::sync::Mutex;

use crate::call::{
    InboundHooks, Message, MessageHook, OutboundHooks, Proceed, ResponseHook, ResponseHooks,
    StreamEndHook,
};
use crate::error::CallError;
use crate::shape::HookKind;

/// Observers registered for a single call.
///
/// Firing methods take `&self`, so inbound and outbound events may be fired
/// from different threads at the same time.
#[derive(Default)]
pub struct CallHooks {
    response_sent: Mutex<Vec<ResponseHook>>,
    inbound_message: Vec<MessageHook>,
    inbound_end: Mutex<Vec<StreamEndHook>>,
    outbound_message: Vec<MessageHook>,
    outbound_end: Mutex<Vec<StreamEndHook>>,
}

impl CallHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of observers currently registered for `kind`.
    ///
    /// Once-only hooks are consumed when fired and no longer counted.
    pub fn count(&self, kind: HookKind) -> usize {
        match kind {
            HookKind::ResponseSent => lock(&self.response_sent).len(),
            HookKind::InboundMessage => self.inbound_message.len(),
            HookKind::InboundEnd => lock(&self.inbound_end).len(),
            HookKind::OutboundMessage => self.outbound_message.len(),
            HookKind::OutboundEnd => lock(&self.outbound_end).len(),
        }
    }

    /// Kinds with at least one observer, in [`HookKind`] order.
    pub fn registered(&self) -> Vec<HookKind> {
        [
            HookKind::ResponseSent,
            HookKind::InboundMessage,
            HookKind::InboundEnd,
            HookKind::OutboundMessage,
            HookKind::OutboundEnd,
        ]
        .into_iter()
        .filter(|kind| self.count(*kind) > 0)
        .collect()
    }

    /// Fires the response observers with the call outcome.
    pub fn fire_response_sent(&self, outcome: Result<&dyn Message, &CallError>, proceed: Proceed) {
        let hooks = std::mem::take(&mut *lock(&self.response_sent));
        let mut proceed = Some(proceed);
        for hook in hooks {
            hook(outcome, proceed.take());
        }
        if let Some(proceed) = proceed {
            proceed();
        }
    }

    /// Fires the inbound message observers; `forward` hands the message on.
    pub fn fire_inbound_message(&self, message: &dyn Message, forward: Proceed) {
        fire_message(&self.inbound_message, message, forward);
    }

    /// Fires the outbound message observers; `forward` writes the message.
    pub fn fire_outbound_message(&self, message: &dyn Message, forward: Proceed) {
        fire_message(&self.outbound_message, message, forward);
    }

    pub fn fire_inbound_end(&self, error: Option<&CallError>, proceed: Proceed) {
        fire_end(&self.inbound_end, error, proceed);
    }

    pub fn fire_outbound_end(&self, error: Option<&CallError>, proceed: Proceed) {
        fire_end(&self.outbound_end, error, proceed);
    }
}

impl std::fmt::Debug for CallHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallHooks")
            .field("registered", &self.registered())
            .finish()
    }
}

impl ResponseHooks for CallHooks {
    fn on_response_sent(&mut self, hook: ResponseHook) {
        lock(&self.response_sent).push(hook);
    }
}

impl InboundHooks for CallHooks {
    fn on_inbound_message(&mut self, hook: MessageHook) {
        self.inbound_message.push(hook);
    }

    fn on_inbound_end(&mut self, hook: StreamEndHook) {
        lock(&self.inbound_end).push(hook);
    }
}

impl OutboundHooks for CallHooks {
    fn on_outbound_message(&mut self, hook: MessageHook) {
        self.outbound_message.push(hook);
    }

    fn on_outbound_end(&mut self, hook: StreamEndHook) {
        lock(&self.outbound_end).push(hook);
    }
}

fn fire_message(hooks: &[MessageHook], message: &dyn Message, forward: Proceed) {
    let mut forward = Some(forward);
    for hook in hooks {
        hook(message, forward.take());
    }
    if let Some(forward) = forward {
        forward();
    }
}

fn fire_end(hooks: &Mutex<Vec<StreamEndHook>>, error: Option<&CallError>, proceed: Proceed) {
    let hooks = std::mem::take(&mut *lock(hooks));
    let mut proceed = Some(proceed);
    for hook in hooks {
        hook(error, proceed.take());
    }
    if let Some(proceed) = proceed {
        proceed();
    }
}

// A panicking observer must not disable the remaining lifecycle events.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
