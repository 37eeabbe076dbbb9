//! Hook registry: plugins register actions and filters by hook name.
//!
//! Entries are appended as they arrive and stable-sorted by
//! `(priority, sequence)` the first time a hook is dispatched after a
//! registration. Lower priority runs first; equal priorities run in
//! registration order.

use std::any::{Any, type_name};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use cimaise_core::result::AppResult;

/// Priority used when a plugin does not pick one.
pub const DEFAULT_PRIORITY: i32 = 10;

/// The two call modes of the registry. Each has its own namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HookKind {
    Action,
    Filter,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action => f.write_str("action"),
            Self::Filter => f.write_str("filter"),
        }
    }
}

/// Handle returned by registration; identifies one entry for removal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HookId {
    pub kind: HookKind,
    pub hook: String,
    pub sequence: u64,
}

/// Introspection view of a registered entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookInfo {
    pub kind: HookKind,
    pub hook: String,
    pub priority: i32,
    pub sequence: u64,
    pub owner: String,
    pub signature: Signature,
}

/// Payload types a callback was registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Signature {
    /// The filtered value type; `None` for actions.
    pub value: Option<&'static str>,
    pub args: &'static str,
}

impl Signature {
    pub(crate) fn action<A: 'static>() -> Self {
        Self {
            value: None,
            args: type_name::<A>(),
        }
    }

    pub(crate) fn filter<V: 'static, A: 'static>() -> Self {
        Self {
            value: Some(type_name::<V>()),
            args: type_name::<A>(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(value) => write!(f, "fn({value}, &{}) -> {value}", self.args),
            None => write!(f, "fn(&{})", self.args),
        }
    }
}

pub(crate) struct ActionCallback<A: 'static>(
    pub(crate) Box<dyn Fn(&A) -> AppResult<()> + Send + Sync>,
);

pub(crate) struct FilterCallback<V: 'static, A: 'static>(
    pub(crate) Box<dyn Fn(V, &A) -> AppResult<V> + Send + Sync>,
);

/// One registered callback.
#[derive(Clone)]
pub(crate) struct HookEntry {
    pub(crate) priority: i32,
    pub(crate) sequence: u64,
    pub(crate) owner: String,
    pub(crate) signature: Signature,
    pub(crate) callback: Arc<dyn Any + Send + Sync>,
}

impl fmt::Debug for HookEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookEntry")
            .field("priority", &self.priority)
            .field("sequence", &self.sequence)
            .field("owner", &self.owner)
            .field("signature", &self.signature)
            .finish()
    }
}

#[derive(Debug, Default)]
struct HookList {
    entries: Vec<HookEntry>,
    sorted: bool,
}

#[derive(Debug, Default)]
struct HookTable {
    actions: HashMap<String, HookList>,
    filters: HashMap<String, HookList>,
    next_sequence: u64,
}

impl HookTable {
    fn namespace(&self, kind: HookKind) -> &HashMap<String, HookList> {
        match kind {
            HookKind::Action => &self.actions,
            HookKind::Filter => &self.filters,
        }
    }

    fn namespace_mut(&mut self, kind: HookKind) -> &mut HashMap<String, HookList> {
        match kind {
            HookKind::Action => &mut self.actions,
            HookKind::Filter => &mut self.filters,
        }
    }
}

/// Per-request registry of actions and filters.
///
/// Never persisted; a fresh registry is built for every request.
#[derive(Debug, Default)]
pub struct HookRegistry {
    table: Mutex<HookTable>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a side-effect callback. Registration cannot fail.
    pub fn add_action<A, F>(
        &self,
        hook: impl AsRef<str>,
        priority: i32,
        owner: impl Into<String>,
        callback: F,
    ) -> HookId
    where
        A: 'static,
        F: Fn(&A) -> AppResult<()> + Send + Sync + 'static,
    {
        self.insert(
            HookKind::Action,
            hook.as_ref(),
            priority,
            owner.into(),
            Signature::action::<A>(),
            Arc::new(ActionCallback(Box::new(callback))),
        )
    }

    /// Registers a value-transforming callback. Registration cannot fail.
    pub fn add_filter<V, A, F>(
        &self,
        hook: impl AsRef<str>,
        priority: i32,
        owner: impl Into<String>,
        callback: F,
    ) -> HookId
    where
        V: 'static,
        A: 'static,
        F: Fn(V, &A) -> AppResult<V> + Send + Sync + 'static,
    {
        self.insert(
            HookKind::Filter,
            hook.as_ref(),
            priority,
            owner.into(),
            Signature::filter::<V, A>(),
            Arc::new(FilterCallback(Box::new(callback))),
        )
    }

    fn insert(
        &self,
        kind: HookKind,
        hook: &str,
        priority: i32,
        owner: String,
        signature: Signature,
        callback: Arc<dyn Any + Send + Sync>,
    ) -> HookId {
        let mut table = self.table.lock();
        let sequence = table.next_sequence;
        table.next_sequence += 1;

        debug!(
            hook = %hook,
            kind = %kind,
            plugin_id = %owner,
            priority = priority,
            sequence = sequence,
            "Hook callback registered"
        );

        let list = table.namespace_mut(kind).entry(hook.to_string()).or_default();
        list.entries.push(HookEntry {
            priority,
            sequence,
            owner,
            signature,
            callback,
        });
        list.sorted = false;

        HookId {
            kind,
            hook: hook.to_string(),
            sequence,
        }
    }

    /// Ordered snapshot of the entries for a hook, sorting first if needed.
    ///
    /// The lock is released before the caller invokes anything, so
    /// callbacks may register or fire hooks on this same registry.
    pub(crate) fn snapshot(&self, kind: HookKind, hook: &str) -> Vec<HookEntry> {
        let mut table = self.table.lock();
        match table.namespace_mut(kind).get_mut(hook) {
            Some(list) => {
                if !list.sorted {
                    list.entries.sort_by_key(|e| (e.priority, e.sequence));
                    list.sorted = true;
                }
                list.entries.clone()
            }
            None => Vec::new(),
        }
    }

    /// Removes one entry. Returns `false` if it was already gone.
    pub fn remove_hook(&self, id: &HookId) -> bool {
        let mut table = self.table.lock();
        let namespace = table.namespace_mut(id.kind);
        let Some(list) = namespace.get_mut(&id.hook) else {
            return false;
        };
        let before = list.entries.len();
        list.entries.retain(|e| e.sequence != id.sequence);
        let removed = list.entries.len() != before;
        if list.entries.is_empty() {
            namespace.remove(&id.hook);
        }
        removed
    }

    /// Removes every entry owned by a plugin. Returns how many were removed.
    pub fn remove_plugin_hooks(&self, owner: &str) -> usize {
        let mut table = self.table.lock();
        let mut removed = 0;

        for kind in [HookKind::Action, HookKind::Filter] {
            let namespace = table.namespace_mut(kind);
            for list in namespace.values_mut() {
                let before = list.entries.len();
                list.entries.retain(|e| e.owner != owner);
                removed += before - list.entries.len();
            }
            namespace.retain(|_, list| !list.entries.is_empty());
        }

        if removed > 0 {
            debug!(plugin_id = %owner, removed = removed, "Plugin hooks removed");
        }
        removed
    }

    /// Whether any action or filter is registered under the name.
    pub fn has_hook(&self, hook: impl AsRef<str>) -> bool {
        self.count_for(hook) > 0
    }

    /// Every hook name with at least one callback, across both namespaces.
    pub fn list_hooks(&self) -> BTreeSet<String> {
        let table = self.table.lock();
        table
            .actions
            .keys()
            .chain(table.filters.keys())
            .cloned()
            .collect()
    }

    /// Number of callbacks (actions plus filters) registered under the name.
    pub fn count_for(&self, hook: impl AsRef<str>) -> usize {
        let table = self.table.lock();
        let hook = hook.as_ref();
        [HookKind::Action, HookKind::Filter]
            .into_iter()
            .filter_map(|kind| table.namespace(kind).get(hook))
            .map(|list| list.entries.len())
            .sum()
    }

    /// Number of callbacks across all hooks.
    pub fn total_callbacks(&self) -> usize {
        let table = self.table.lock();
        table
            .actions
            .values()
            .chain(table.filters.values())
            .map(|list| list.entries.len())
            .sum()
    }

    /// Number of callbacks a plugin has registered.
    pub fn count_owned_by(&self, owner: &str) -> usize {
        let table = self.table.lock();
        table
            .actions
            .values()
            .chain(table.filters.values())
            .flat_map(|list| list.entries.iter())
            .filter(|e| e.owner == owner)
            .count()
    }

    /// Entries registered under a hook, in dispatch order. Actions first.
    pub fn hooks_for(&self, hook: impl AsRef<str>) -> Vec<HookInfo> {
        let hook = hook.as_ref();
        let table = self.table.lock();
        let mut out = Vec::new();

        for kind in [HookKind::Action, HookKind::Filter] {
            if let Some(list) = table.namespace(kind).get(hook) {
                let mut entries: Vec<&HookEntry> = list.entries.iter().collect();
                entries.sort_by_key(|e| (e.priority, e.sequence));
                out.extend(entries.into_iter().map(|e| HookInfo {
                    kind,
                    hook: hook.to_string(),
                    priority: e.priority,
                    sequence: e.sequence,
                    owner: e.owner.clone(),
                    signature: e.signature,
                }));
            }
        }
        out
    }
}
