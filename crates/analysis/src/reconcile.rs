use std::collections::BTreeSet;

use extract::{Entity, EntitySet};
use serde::Serialize;

/// Set relationship between the user's and the competitor's entity keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub shared: BTreeSet<String>,
    /// In the competitor document, absent from the user's.
    pub missing: BTreeSet<String>,
    /// In the user's document, absent from the competitor's.
    pub unique: BTreeSet<String>,
    /// |shared| / |user ∪ competitor|, 0 when both are empty.
    pub coverage_ratio: f64,
    /// |shared| / |competitor|, 0 when the competitor has no entities.
    pub competitor_coverage: f64,
}

impl ComparisonResult {
    pub fn compare(user: &EntitySet, competitor: &EntitySet) -> Self {
        let user_keys: BTreeSet<&str> = user.keys().collect();
        let competitor_keys: BTreeSet<&str> = competitor.keys().collect();

        let shared: BTreeSet<String> = user_keys.intersection(&competitor_keys).map(|k| k.to_string()).collect();
        let missing: BTreeSet<String> = competitor_keys.difference(&user_keys).map(|k| k.to_string()).collect();
        let unique: BTreeSet<String> = user_keys.difference(&competitor_keys).map(|k| k.to_string()).collect();

        let union = shared.len() + missing.len() + unique.len();

        Self {
            coverage_ratio: ratio(shared.len(), union),
            competitor_coverage: ratio(shared.len(), competitor_keys.len()),
            shared,
            missing,
            unique,
        }
    }

    /// Re-attach display attributes. Missing entities come from the
    /// competitor's set, unique and shared ones from the user's.
    pub fn resolve(&self, user: &EntitySet, competitor: &EntitySet) -> EntityPartitions {
        EntityPartitions {
            shared: lookup(&self.shared, user, competitor),
            missing: lookup(&self.missing, competitor, user),
            unique: lookup(&self.unique, user, competitor),
        }
    }
}

fn lookup(keys: &BTreeSet<String>, primary: &EntitySet, fallback: &EntitySet) -> Vec<Entity> {
    keys.iter()
        .filter_map(|k| primary.get(k).or_else(|| fallback.get(k)))
        .cloned()
        .collect()
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Comparison partitions resolved to entities, each in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityPartitions {
    pub shared: Vec<Entity>,
    pub missing: Vec<Entity>,
    pub unique: Vec<Entity>,
}
