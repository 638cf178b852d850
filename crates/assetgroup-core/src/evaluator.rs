//! Rule evaluation.
//!
//! Everything here is pure: evaluating a condition or resolving a group
//! never mutates the asset and never fails. Field/operator combinations
//! outside the matching table, or a comparison value that is missing,
//! evaluate to `false`.

use crate::models::asset::Asset;
use crate::models::rule::{Condition, ConditionOperator, FIELD_NAME, FIELD_TAG, FIELD_TYPE, Rule};

/// Evaluate a single condition against an asset.
///
/// Comparisons are case-sensitive and exact; `contains` is a plain
/// substring test.
pub fn condition_matches(asset: &Asset, condition: &Condition) -> bool {
    let value = condition.value.as_deref();
    let tag_key = condition.tag_key.as_deref();

    match (condition.field.as_str(), condition.operator) {
        (FIELD_TYPE, ConditionOperator::Equals) => value == Some(asset.asset_type.as_str()),
        (FIELD_TYPE, ConditionOperator::Contains) => {
            value.is_some_and(|v| asset.asset_type.contains(v))
        }
        (FIELD_NAME, ConditionOperator::Equals) => value == Some(asset.name.as_str()),
        (FIELD_NAME, ConditionOperator::Contains) => value.is_some_and(|v| asset.name.contains(v)),
        (FIELD_TAG, ConditionOperator::Exists) => {
            tag_key.is_some_and(|key| asset.tags.iter().any(|tag| tag.key == key))
        }
        (FIELD_TAG, ConditionOperator::Equals) => {
            match (tag_key, condition.tag_value.as_deref()) {
                (Some(key), Some(expected)) => asset
                    .tags
                    .iter()
                    .any(|tag| tag.key == key && tag.value == expected),
                _ => false,
            }
        }
        _ => false,
    }
}

/// A rule matches when every one of its conditions holds. A rule with no
/// conditions matches every asset.
pub fn rule_matches(asset: &Asset, rule: &Rule) -> bool {
    rule.conditions
        .iter()
        .all(|condition| condition_matches(asset, condition))
}

/// Every rule matching `asset`, in evaluation order.
pub fn matching_rules<'r>(asset: &Asset, rules: &'r [Rule]) -> impl Iterator<Item = &'r Rule> {
    rules.iter().filter(move |rule| rule_matches(asset, rule))
}

/// Resolve the group for `asset`: the group name of the first rule, in
/// insertion order, whose conditions all hold. Later matches are ignored.
pub fn resolve_group<'r>(asset: &Asset, rules: &'r [Rule]) -> Option<&'r str> {
    matching_rules(asset, rules)
        .next()
        .map(|rule| rule.group_name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::asset::{CloudAccount, CreateAsset, Tag};
    use crate::models::rule::CreateRule;
    use chrono::Utc;

    fn asset(name: &str, asset_type: &str, tags: &[(&str, &str)]) -> Asset {
        Asset::new(
            CreateAsset {
                name: name.into(),
                asset_type: asset_type.into(),
                region: "us-east-1".into(),
                owner_id: "user1".into(),
                cloud_account: CloudAccount {
                    id: "123".into(),
                    name: "main".into(),
                },
                tags: tags.iter().map(|(k, v)| Tag::new(*k, *v)).collect(),
            },
            Utc::now(),
        )
    }

    fn rule(group_name: &str, conditions: Vec<Condition>) -> Rule {
        Rule::new(
            CreateRule {
                group_name: group_name.into(),
                conditions,
                description: None,
            },
            Utc::now(),
        )
    }

    fn prod_instance() -> Asset {
        asset(
            "test-instance-prod",
            "ec2-instance",
            &[("env", "prod"), ("team", "platform")],
        )
    }

    #[test]
    fn type_and_name_comparisons() {
        let a = prod_instance();

        assert!(condition_matches(
            &a,
            &Condition::new(FIELD_TYPE, ConditionOperator::Equals, "ec2-instance")
        ));
        assert!(!condition_matches(
            &a,
            &Condition::new(FIELD_TYPE, ConditionOperator::Equals, "ec2")
        ));
        assert!(condition_matches(
            &a,
            &Condition::new(FIELD_TYPE, ConditionOperator::Contains, "ec2")
        ));
        assert!(condition_matches(
            &a,
            &Condition::new(FIELD_NAME, ConditionOperator::Contains, "prod")
        ));
        assert!(condition_matches(
            &a,
            &Condition::new(FIELD_NAME, ConditionOperator::Equals, "test-instance-prod")
        ));
    }

    #[test]
    fn comparisons_are_case_sensitive() {
        let a = prod_instance();

        assert!(!condition_matches(
            &a,
            &Condition::new(FIELD_NAME, ConditionOperator::Contains, "PROD")
        ));
        assert!(!condition_matches(&a, &Condition::tag_equals("env", "Prod")));
    }

    #[test]
    fn tag_comparisons() {
        let a = prod_instance();

        assert!(condition_matches(&a, &Condition::tag_exists("team")));
        assert!(!condition_matches(&a, &Condition::tag_exists("owner")));
        assert!(condition_matches(&a, &Condition::tag_equals("env", "prod")));
        assert!(!condition_matches(&a, &Condition::tag_equals("env", "dev")));
        // key and value must come from the same tag
        assert!(!condition_matches(&a, &Condition::tag_equals("env", "platform")));
    }

    #[test]
    fn undefined_combinations_never_match() {
        let a = prod_instance();

        assert!(!condition_matches(
            &a,
            &Condition::new(FIELD_TYPE, ConditionOperator::Exists, "ec2-instance")
        ));
        assert!(!condition_matches(
            &a,
            &Condition::new(FIELD_TAG, ConditionOperator::Contains, "env")
        ));
        assert!(!condition_matches(
            &a,
            &Condition::new("region", ConditionOperator::Equals, "us-east-1")
        ));
    }

    #[test]
    fn missing_comparison_values_never_match() {
        let a = prod_instance();
        let mut no_value = Condition::new(FIELD_NAME, ConditionOperator::Contains, "");
        no_value.value = None;
        let mut no_tag_value = Condition::tag_equals("env", "prod");
        no_tag_value.tag_value = None;
        let mut no_tag_key = Condition::tag_exists("env");
        no_tag_key.tag_key = None;

        assert!(!condition_matches(&a, &no_value));
        assert!(!condition_matches(&a, &no_tag_value));
        assert!(!condition_matches(&a, &no_tag_key));
    }

    #[test]
    fn empty_condition_list_matches_everything() {
        let rules = vec![rule("catch-all", vec![])];

        assert_eq!(resolve_group(&prod_instance(), &rules), Some("catch-all"));
        assert_eq!(
            resolve_group(&asset("x", "s3-bucket", &[]), &rules),
            Some("catch-all")
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = vec![
            rule("any-prod", vec![Condition::tag_equals("env", "prod")]),
            rule(
                "production-instances",
                vec![
                    Condition::new(FIELD_TYPE, ConditionOperator::Equals, "ec2-instance"),
                    Condition::tag_equals("env", "prod"),
                ],
            ),
        ];
        let a = prod_instance();

        assert_eq!(resolve_group(&a, &rules), Some("any-prod"));
        assert_eq!(matching_rules(&a, &rules).count(), 2);
    }

    #[test]
    fn all_conditions_must_hold() {
        let rules = vec![rule(
            "production-instances",
            vec![
                Condition::new(FIELD_TYPE, ConditionOperator::Equals, "ec2-instance"),
                Condition::new(FIELD_NAME, ConditionOperator::Contains, "prod"),
                Condition::tag_equals("env", "prod"),
            ],
        )];

        let prod = asset("prod-instance", "ec2-instance", &[("env", "prod")]);
        let dev = asset("dev-instance", "ec2-instance", &[("env", "dev")]);

        assert_eq!(resolve_group(&prod, &rules), Some("production-instances"));
        assert_eq!(resolve_group(&dev, &rules), None);
    }

    #[test]
    fn resolution_is_deterministic_and_pure() {
        let rules = vec![rule("prod", vec![Condition::tag_equals("env", "prod")])];
        let a = prod_instance();
        let before = a.clone();

        let first = resolve_group(&a, &rules);
        let second = resolve_group(&a, &rules);

        assert_eq!(first, second);
        assert_eq!(a.group_name, before.group_name);
        assert_eq!(a.updated_at, before.updated_at);
    }

    #[test]
    fn no_rules_means_no_group() {
        assert_eq!(resolve_group(&prod_instance(), &[]), None);
    }
}
