//! Repository trait for asset grouping storage.
//!
//! All operations are async. Implementations own both the asset and the
//! rule collections so that a rule change and the regrouping it triggers
//! happen as one serialized mutation.

use uuid::Uuid;

use crate::error::AssetGroupResult;
use crate::models::{
    asset::{Asset, CreateAsset, UpdateAsset},
    rule::{CreateRule, Rule, UpdateRule},
};

pub trait GroupingRepository: Send + Sync {
    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------

    /// Store a new asset, grouped against the current rule set.
    fn create_asset(
        &self,
        input: CreateAsset,
    ) -> impl Future<Output = AssetGroupResult<Asset>> + Send;
    fn get_asset(&self, id: Uuid) -> impl Future<Output = AssetGroupResult<Asset>> + Send;
    /// All assets, oldest first.
    fn list_assets(&self) -> impl Future<Output = AssetGroupResult<Vec<Asset>>> + Send;
    /// Merge `input` over the stored asset and re-resolve its group.
    fn update_asset(
        &self,
        id: Uuid,
        input: UpdateAsset,
    ) -> impl Future<Output = AssetGroupResult<Asset>> + Send;
    fn delete_asset(&self, id: Uuid) -> impl Future<Output = AssetGroupResult<()>> + Send;

    // -----------------------------------------------------------------------
    // Rules
    // -----------------------------------------------------------------------

    /// Append a rule to the evaluation order and regroup ungrouped assets.
    fn create_rule(
        &self,
        input: CreateRule,
    ) -> impl Future<Output = AssetGroupResult<Rule>> + Send;
    fn get_rule(&self, id: Uuid) -> impl Future<Output = AssetGroupResult<Rule>> + Send;
    /// All rules in evaluation order.
    fn list_rules(&self) -> impl Future<Output = AssetGroupResult<Vec<Rule>>> + Send;
    /// Merge `input` over the stored rule and regroup ungrouped assets.
    fn update_rule(
        &self,
        id: Uuid,
        input: UpdateRule,
    ) -> impl Future<Output = AssetGroupResult<Rule>> + Send;
    /// Remove a rule, release the assets in its group and regroup them
    /// against the remaining rules.
    fn delete_rule(&self, id: Uuid) -> impl Future<Output = AssetGroupResult<()>> + Send;

    /// Run the reprocessing pass on demand. Returns the ids of the assets
    /// that acquired a group.
    fn reprocess(&self) -> impl Future<Output = AssetGroupResult<Vec<Uuid>>> + Send;
}
