//! Read-only introspection over the hook registry and plugin state.

use serde::Serialize;

use cimaise_core::result::AppResult;

use crate::hooks::registry::{HookKind, HookRegistry};
use crate::loader::LoadedPlugin;
use crate::manager::LifecycleManager;

/// Per-hook line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookSummary {
    pub hook: String,
    pub actions: usize,
    pub filters: usize,
    /// Owning plugins in dispatch order, without duplicates.
    pub owners: Vec<String>,
}

/// Snapshot consumed by the admin dashboard widget and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticsReport {
    /// Distinct hook names with at least one callback.
    pub total_hooks: usize,
    pub total_callbacks: usize,
    pub hooks: Vec<HookSummary>,
    pub installed_plugins: u64,
    pub active_plugins: u64,
    /// Slugs that registered successfully in this request.
    pub loaded_plugins: Vec<String>,
}

/// Aggregation entry point. Never mutates anything.
pub struct Diagnostics;

impl Diagnostics {
    pub async fn collect(
        hooks: &HookRegistry,
        lifecycle: &LifecycleManager,
        loaded: &[LoadedPlugin],
    ) -> AppResult<DiagnosticsReport> {
        let stats = lifecycle.get_stats(hooks).await?;
        Ok(DiagnosticsReport {
            total_hooks: hooks.list_hooks().len(),
            total_callbacks: stats.total_hooks_registered,
            hooks: Self::summarize(hooks),
            installed_plugins: stats.total_plugins,
            active_plugins: stats.active_count,
            loaded_plugins: loaded.iter().map(|p| p.slug().to_string()).collect(),
        })
    }

    /// Registry-only part of the report; needs no database.
    pub fn summarize(hooks: &HookRegistry) -> Vec<HookSummary> {
        hooks
            .list_hooks()
            .into_iter()
            .map(|hook| {
                let entries = hooks.hooks_for(&hook);
                let mut owners: Vec<String> = Vec::new();
                for info in &entries {
                    if !owners.contains(&info.owner) {
                        owners.push(info.owner.clone());
                    }
                }
                HookSummary {
                    actions: entries.iter().filter(|e| e.kind == HookKind::Action).count(),
                    filters: entries.iter().filter(|e| e.kind == HookKind::Filter).count(),
                    owners,
                    hook,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_groups_by_hook() {
        let hooks = HookRegistry::new();
        hooks.add_action("boot", 5, "b", |_: &()| Ok(()));
        hooks.add_action("boot", 1, "a", |_: &()| Ok(()));
        hooks.add_filter("boot", 1, "a", |v: u8, _: &()| Ok(v));
        hooks.add_filter("menu", 10, "c", |v: u8, _: &()| Ok(v));

        let summary = Diagnostics::summarize(&hooks);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].hook, "boot");
        assert_eq!(summary[0].actions, 2);
        assert_eq!(summary[0].filters, 1);
        assert_eq!(summary[0].owners, vec!["a", "b"]);
        assert_eq!(summary[1].owners, vec!["c"]);
    }
}
