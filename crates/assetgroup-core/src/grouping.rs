//! Group propagation passes run by the store after rule changes.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::evaluator::resolve_group;
use crate::models::asset::Asset;
use crate::models::rule::Rule;

/// Reprocess every ungrouped asset against `rules`.
///
/// Assets that already carry a group are skipped. An ungrouped asset that
/// now resolves to a group gets it assigned and its `updated_at`
/// refreshed. Returns the ids of the assets that were grouped.
pub fn reprocess_all<'a>(
    rules: &[Rule],
    assets: impl IntoIterator<Item = &'a mut Asset>,
    now: DateTime<Utc>,
) -> Vec<Uuid> {
    let mut regrouped = Vec::new();
    for asset in assets {
        if asset.group_name.is_some() {
            continue;
        }
        if let Some(group) = resolve_group(asset, rules) {
            asset.group_name = Some(group.to_owned());
            asset.touch(now);
            regrouped.push(asset.id);
        }
    }
    regrouped
}

/// Clear the group of every asset whose group is no longer produced by
/// any of `rules`. This catches names left behind by a deleted rule as
/// well as names a rule carried before it was renamed. Returns the ids
/// of the released assets.
pub fn release_orphaned<'a>(
    rules: &[Rule],
    assets: impl IntoIterator<Item = &'a mut Asset>,
    now: DateTime<Utc>,
) -> Vec<Uuid> {
    let live: HashSet<&str> = rules.iter().map(|rule| rule.group_name.as_str()).collect();

    let mut released = Vec::new();
    for asset in assets {
        let orphaned = asset
            .group_name
            .as_deref()
            .is_some_and(|group| !live.contains(group));
        if orphaned {
            asset.group_name = None;
            asset.touch(now);
            released.push(asset.id);
        }
    }
    released
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::asset::{CloudAccount, CreateAsset, Tag};
    use crate::models::rule::{Condition, CreateRule};
    use chrono::Duration;

    fn asset(name: &str, env: &str, now: DateTime<Utc>) -> Asset {
        Asset::new(
            CreateAsset {
                name: name.into(),
                asset_type: "ec2-instance".into(),
                region: "us-east-1".into(),
                owner_id: "user1".into(),
                cloud_account: CloudAccount {
                    id: "123".into(),
                    name: "main".into(),
                },
                tags: vec![Tag::new("env", env)],
            },
            now,
        )
    }

    fn env_rule(group: &str, env: &str, now: DateTime<Utc>) -> Rule {
        Rule::new(
            CreateRule {
                group_name: group.into(),
                conditions: vec![Condition::tag_equals("env", env)],
                description: None,
            },
            now,
        )
    }

    #[test]
    fn reprocess_groups_only_ungrouped_assets() {
        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(5);
        let mut grouped = asset("a", "prod", t0);
        grouped.group_name = Some("legacy".into());
        let mut ungrouped = asset("b", "prod", t0);
        let mut unmatched = asset("c", "dev", t0);
        let rules = vec![env_rule("prod", "prod", t0)];

        let regrouped = reprocess_all(&rules, [&mut grouped, &mut ungrouped, &mut unmatched], t1);

        assert_eq!(regrouped, vec![ungrouped.id]);
        assert_eq!(grouped.group_name.as_deref(), Some("legacy"));
        assert_eq!(grouped.updated_at, t0);
        assert_eq!(ungrouped.group_name.as_deref(), Some("prod"));
        assert_eq!(ungrouped.updated_at, t1);
        assert_eq!(unmatched.group_name, None);
        assert_eq!(unmatched.updated_at, t0);
    }

    #[test]
    fn reprocess_twice_changes_nothing_the_second_time() {
        let t0 = Utc::now();
        let mut assets = vec![asset("a", "prod", t0), asset("b", "dev", t0)];
        let rules = vec![env_rule("prod", "prod", t0)];

        let first = reprocess_all(&rules, assets.iter_mut(), t0 + Duration::seconds(1));
        let snapshot: Vec<_> = assets
            .iter()
            .map(|a| (a.group_name.clone(), a.updated_at))
            .collect();
        let second = reprocess_all(&rules, assets.iter_mut(), t0 + Duration::seconds(2));

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        let after: Vec<_> = assets
            .iter()
            .map(|a| (a.group_name.clone(), a.updated_at))
            .collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn release_clears_groups_no_rule_produces() {
        let t0 = Utc::now();
        let mut live = asset("a", "prod", t0);
        live.group_name = Some("web".into());
        let mut stale = asset("b", "prod", t0);
        stale.group_name = Some("renamed-away".into());
        let mut ungrouped = asset("c", "dev", t0);
        let rules = vec![env_rule("web", "prod", t0)];

        let released = release_orphaned(
            &rules,
            [&mut live, &mut stale, &mut ungrouped],
            t0 + Duration::seconds(1),
        );

        assert_eq!(released, vec![stale.id]);
        assert_eq!(live.group_name.as_deref(), Some("web"));
        assert_eq!(live.updated_at, t0);
        assert_eq!(stale.group_name, None);
        assert!(stale.updated_at > t0);
        assert_eq!(ungrouped.updated_at, t0);
    }
}
