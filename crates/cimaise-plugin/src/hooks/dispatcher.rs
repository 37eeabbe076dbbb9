//! Hook dispatch: fires actions and runs filter chains.
//!
//! Every callback invocation is isolated: an `Err` return, a panic, or a
//! callback registered with a different type contract is logged with the
//! hook name and the owning plugin, then dispatch moves on to the next
//! callback. Nothing a callback does can abort the chain.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, error, warn};

use cimaise_core::result::AppResult;

use super::registry::{
    ActionCallback, FilterCallback, HookEntry, HookKind, HookRegistry, Signature,
};
use crate::error::{PluginError, panic_message};

impl HookRegistry {
    /// Invokes every action registered under `hook`, in priority order.
    ///
    /// Returns the number of callbacks that completed successfully.
    pub fn do_action<A: 'static>(&self, hook: impl AsRef<str>, args: &A) -> usize {
        let hook = hook.as_ref();
        let entries = self.snapshot(HookKind::Action, hook);
        if entries.is_empty() {
            return 0;
        }

        debug!(hook = %hook, handler_count = entries.len(), "Dispatching action");

        let mut succeeded = 0;
        for entry in &entries {
            let Some(action) = entry.callback.downcast_ref::<ActionCallback<A>>() else {
                report_mismatch(hook, entry, Signature::action::<A>());
                continue;
            };

            match guarded(|| (action.0)(args)) {
                Ok(()) => succeeded += 1,
                Err(message) => report_failure(hook, entry, message),
            }
        }
        succeeded
    }

    /// Pipes `value` through every filter registered under `hook`.
    ///
    /// With no filters the value comes back unchanged. A failing filter is
    /// skipped and the value it received is handed to the next one.
    pub fn apply_filters<V, A>(&self, hook: impl AsRef<str>, value: V, args: &A) -> V
    where
        V: Clone + 'static,
        A: 'static,
    {
        let hook = hook.as_ref();
        let entries = self.snapshot(HookKind::Filter, hook);
        if entries.is_empty() {
            return value;
        }

        debug!(hook = %hook, handler_count = entries.len(), "Applying filters");

        let mut value = value;
        for entry in &entries {
            let Some(filter) = entry.callback.downcast_ref::<FilterCallback<V, A>>() else {
                report_mismatch(hook, entry, Signature::filter::<V, A>());
                continue;
            };

            let input = value.clone();
            match guarded(|| (filter.0)(input, args)) {
                Ok(next) => value = next,
                Err(message) => report_failure(hook, entry, message),
            }
        }
        value
    }
}

/// Runs a callback, converting both `Err` and panics into a message.
fn guarded<T>(call: impl FnOnce() -> AppResult<T>) -> Result<T, String> {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn report_failure(hook: &str, entry: &HookEntry, message: String) {
    let err = PluginError::HookCallback {
        hook: hook.to_string(),
        plugin_id: entry.owner.clone(),
        message,
    };
    error!(
        hook = %hook,
        plugin_id = %entry.owner,
        priority = entry.priority,
        error = %err,
        "Hook callback failed, continuing"
    );
}

fn report_mismatch(hook: &str, entry: &HookEntry, dispatched: Signature) {
    let err = PluginError::HookCallback {
        hook: hook.to_string(),
        plugin_id: entry.owner.clone(),
        message: format!(
            "type mismatch: registered for {}, dispatched with {dispatched}",
            entry.signature
        ),
    };
    warn!(hook = %hook, plugin_id = %entry.owner, error = %err, "Hook callback skipped");
}
