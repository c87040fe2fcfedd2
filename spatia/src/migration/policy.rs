use std::collections::BTreeSet;

/// Decides when a schema mismatch may be resolved by dropping and recreating
/// the managed tables instead of failing.
///
/// The builder methods compose: `unconditional` makes the explicit start
/// versions irrelevant, while `on_downgrade_only` only widens what happens
/// for downgrades.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DestructiveFallbackPolicy {
    unconditional: bool,
    on_downgrade_only: bool,
    explicit_start_versions: BTreeSet<u32>,
}

impl DestructiveFallbackPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_unconditional(&mut self) {
        self.unconditional = true;
    }

    pub(crate) fn set_on_downgrade_only(&mut self) {
        self.on_downgrade_only = true;
    }

    pub(crate) fn add_start_versions(&mut self, versions: impl IntoIterator<Item = u32>) {
        self.explicit_start_versions.extend(versions);
    }

    pub fn is_unconditional(&self) -> bool {
        self.unconditional
    }

    pub fn is_on_downgrade_only(&self) -> bool {
        self.on_downgrade_only
    }

    pub fn explicit_start_versions(&self) -> &BTreeSet<u32> {
        &self.explicit_start_versions
    }

    /// Whether a missing migration path from `current` to `target` may be
    /// resolved destructively.
    pub fn allows_recreate(&self, current: u32, target: u32) -> bool {
        let downgrade = target < current;
        if downgrade && self.on_downgrade_only {
            return true;
        }
        self.unconditional || self.explicit_start_versions.contains(&current)
    }

    /// Returns `true` when no fallback of any kind was configured.
    pub fn is_disabled(&self) -> bool {
        !self.unconditional && !self.on_downgrade_only && self.explicit_start_versions.is_empty()
    }
}
