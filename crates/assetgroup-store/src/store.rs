//! In-memory implementation of [`GroupingRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use assetgroup_core::error::{AssetGroupError, AssetGroupResult};
use assetgroup_core::evaluator::{matching_rules, resolve_group};
use assetgroup_core::grouping::{release_orphaned, reprocess_all};
use assetgroup_core::models::asset::{Asset, CreateAsset, UpdateAsset};
use assetgroup_core::models::rule::{CreateRule, Rule, UpdateRule};
use assetgroup_core::repository::GroupingRepository;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::GroupingConfig;

/// Both collections live behind one lock: a rule change and the regrouping
/// pass it triggers must not interleave with asset writes.
#[derive(Debug, Default)]
struct StoreState {
    assets: HashMap<Uuid, Asset>,
    /// Evaluation order is creation order.
    rules: Vec<Rule>,
}

impl StoreState {
    fn rule_index(&self, id: Uuid) -> AssetGroupResult<usize> {
        self.rules
            .iter()
            .position(|rule| rule.id == id)
            .ok_or_else(|| AssetGroupError::rule_not_found(id))
    }

    fn reprocess(&mut self, now: DateTime<Utc>) -> Vec<Uuid> {
        reprocess_all(&self.rules, self.assets.values_mut(), now)
    }
}

/// In-memory grouping store.
///
/// Cloning is cheap and every clone shares the same collections, so one
/// store can be handed to any number of request workers.
#[derive(Clone, Default)]
pub struct GroupingStore {
    state: Arc<RwLock<StoreState>>,
    config: GroupingConfig,
}

impl GroupingStore {
    pub fn new(config: GroupingConfig) -> Self {
        Self {
            state: Arc::default(),
            config,
        }
    }

    fn resolve(&self, asset: &Asset, rules: &[Rule]) -> Option<String> {
        if self.config.warn_on_multiple_matches {
            let ignored: Vec<Uuid> = matching_rules(asset, rules)
                .skip(1)
                .map(|rule| rule.id)
                .collect();
            if !ignored.is_empty() {
                warn!(
                    asset_id = %asset.id,
                    ignored_rules = ?ignored,
                    "Asset matches more than one rule, keeping the first"
                );
            }
        }

        let group = resolve_group(asset, rules).map(str::to_owned);
        debug!(asset_id = %asset.id, group = ?group, "Resolved asset group");
        group
    }
}

impl GroupingRepository for GroupingStore {
    async fn create_asset(&self, input: CreateAsset) -> AssetGroupResult<Asset> {
        let mut state = self.state.write().await;

        let mut asset = Asset::new(input, Utc::now());
        asset.group_name = self.resolve(&asset, &state.rules);
        state.assets.insert(asset.id, asset.clone());

        info!(asset_id = %asset.id, group = ?asset.group_name, "Created asset");
        Ok(asset)
    }

    async fn get_asset(&self, id: Uuid) -> AssetGroupResult<Asset> {
        let state = self.state.read().await;
        state
            .assets
            .get(&id)
            .cloned()
            .ok_or_else(|| AssetGroupError::asset_not_found(id))
    }

    async fn list_assets(&self) -> AssetGroupResult<Vec<Asset>> {
        let state = self.state.read().await;
        let mut assets: Vec<Asset> = state.assets.values().cloned().collect();
        assets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(assets)
    }

    async fn update_asset(&self, id: Uuid, input: UpdateAsset) -> AssetGroupResult<Asset> {
        let mut state = self.state.write().await;
        let StoreState { assets, rules } = &mut *state;

        let asset = assets
            .get_mut(&id)
            .ok_or_else(|| AssetGroupError::asset_not_found(id))?;
        asset.apply(input);
        asset.touch(Utc::now());

        // Overwrites whatever group the asset had, including none.
        if self.config.regroup_on_asset_update {
            asset.group_name = self.resolve(asset, rules);
        }

        info!(asset_id = %id, group = ?asset.group_name, "Updated asset");
        Ok(asset.clone())
    }

    async fn delete_asset(&self, id: Uuid) -> AssetGroupResult<()> {
        let mut state = self.state.write().await;
        state
            .assets
            .remove(&id)
            .ok_or_else(|| AssetGroupError::asset_not_found(id))?;

        info!(asset_id = %id, "Deleted asset");
        Ok(())
    }

    async fn create_rule(&self, input: CreateRule) -> AssetGroupResult<Rule> {
        let mut state = self.state.write().await;

        let now = Utc::now();
        let rule = Rule::new(input, now);
        state.rules.push(rule.clone());
        let regrouped = state.reprocess(now);

        info!(
            rule_id = %rule.id,
            group = %rule.group_name,
            regrouped = regrouped.len(),
            "Created rule"
        );
        Ok(rule)
    }

    async fn get_rule(&self, id: Uuid) -> AssetGroupResult<Rule> {
        let state = self.state.read().await;
        let index = state.rule_index(id)?;
        Ok(state.rules[index].clone())
    }

    async fn list_rules(&self) -> AssetGroupResult<Vec<Rule>> {
        let state = self.state.read().await;
        Ok(state.rules.clone())
    }

    async fn update_rule(&self, id: Uuid, input: UpdateRule) -> AssetGroupResult<Rule> {
        let mut state = self.state.write().await;
        let index = state.rule_index(id)?;

        let now = Utc::now();
        let rule = &mut state.rules[index];
        rule.apply(input, now);
        let rule = rule.clone();
        let regrouped = state.reprocess(now);

        info!(
            rule_id = %id,
            group = %rule.group_name,
            regrouped = regrouped.len(),
            "Updated rule"
        );
        Ok(rule)
    }

    async fn delete_rule(&self, id: Uuid) -> AssetGroupResult<()> {
        let mut state = self.state.write().await;
        let index = state.rule_index(id)?;

        let now = Utc::now();
        let rule = state.rules.remove(index);
        let StoreState { assets, rules } = &mut *state;
        let released = release_orphaned(rules, assets.values_mut(), now);
        let regrouped = state.reprocess(now);

        info!(
            rule_id = %id,
            group = %rule.group_name,
            released = released.len(),
            regrouped = regrouped.len(),
            "Deleted rule"
        );
        Ok(())
    }

    async fn reprocess(&self) -> AssetGroupResult<Vec<Uuid>> {
        let mut state = self.state.write().await;
        let regrouped = state.reprocess(Utc::now());

        info!(regrouped = regrouped.len(), "Reprocessed ungrouped assets");
        Ok(regrouped)
    }
}
