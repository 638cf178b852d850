//! Grouping policy configuration.

/// Switches controlling how the store propagates group assignments.
#[derive(Debug, Clone)]
pub struct GroupingConfig {
    /// Re-resolve an asset's group every time the asset is updated
    /// (default: true). When false the stored group is kept as is.
    pub regroup_on_asset_update: bool,
    /// Log a warning when more than one rule matches an asset
    /// (default: false). Resolution is first-match either way.
    pub warn_on_multiple_matches: bool,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            regroup_on_asset_update: true,
            warn_on_multiple_matches: false,
        }
    }
}
