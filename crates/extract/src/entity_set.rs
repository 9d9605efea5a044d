use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::schema::{Annotation, Entity, TypeGroup};

/// Deduplicated entities from one document, in first-seen order.
/// No two entries share a canonical key.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
}

impl EntitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_annotations<I>(annotations: I) -> Self
    where
        I: IntoIterator<Item = Annotation>,
    {
        Self::from_entities(annotations.into_iter().filter_map(Entity::from_annotation))
    }

    pub fn from_entities<I>(entities: I) -> Self
    where
        I: IntoIterator<Item = Entity>,
    {
        let mut set = Self::new();
        for entity in entities {
            set.insert(entity);
        }
        set
    }

    /// Add an entity, merging with an existing one of the same key.
    /// A strictly higher confidence replaces type, URI and confidence;
    /// the first-seen label and position are kept.
    pub fn insert(&mut self, entity: Entity) {
        match self.index.get(&entity.canonical_key) {
            Some(&pos) => {
                let stored = &mut self.entities[pos];
                if outranks(entity.confidence, stored.confidence) {
                    stored.entity_type = entity.entity_type;
                    stored.uri = entity.uri;
                    stored.confidence = entity.confidence;
                }
            }
            None => {
                self.index.insert(entity.canonical_key.clone(), self.entities.len());
                self.entities.push(entity);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.index.get(key).map(|&pos| &self.entities[pos])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.canonical_key.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Labels grouped by entity type, types in first-seen order.
    pub fn group_by_type(&self) -> Vec<TypeGroup> {
        let mut groups: Vec<TypeGroup> = Vec::new();
        for entity in &self.entities {
            match groups.iter_mut().find(|g| g.entity_type == entity.entity_type) {
                Some(group) => group.labels.push(entity.label.clone()),
                None => groups.push(TypeGroup {
                    entity_type: entity.entity_type.clone(),
                    labels: vec![entity.label.clone()],
                }),
            }
        }
        groups
    }
}

// Missing incoming confidence never wins; a present one beats a missing one.
fn outranks(incoming: Option<f64>, stored: Option<f64>) -> bool {
    match (incoming, stored) {
        (Some(incoming), Some(stored)) => incoming > stored,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

impl<'a> IntoIterator for &'a EntitySet {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

impl Serialize for EntitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entities.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(set: &EntitySet) -> Vec<&str> {
        set.iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn test_higher_confidence_wins_but_label_is_kept() {
        let set = EntitySet::from_annotations(vec![
            Annotation::new("Apple").with_confidence(0.5),
            Annotation::new("apple")
                .with_confidence(0.9)
                .with_types(["http://dbpedia.org/ontology/Company"])
                .with_uri("http://en.wikipedia.org/wiki/Apple_Inc."),
        ]);

        assert_eq!(set.len(), 1);
        let apple = set.get("apple").unwrap();
        assert_eq!(apple.label, "Apple");
        assert_eq!(apple.confidence, Some(0.9));
        assert_eq!(apple.entity_type, "Company");
        assert_eq!(apple.uri.as_deref(), Some("http://en.wikipedia.org/wiki/Apple_Inc."));
    }

    #[test]
    fn test_ties_and_missing_confidence_keep_first() {
        let set = EntitySet::from_annotations(vec![
            Annotation::new("Rust").with_confidence(0.7).with_uri("first"),
            Annotation::new("RUST").with_confidence(0.7).with_uri("second"),
            Annotation::new(" rust ").with_uri("third"),
        ]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("rust").unwrap().uri.as_deref(), Some("first"));
    }

    #[test]
    fn test_present_confidence_beats_missing() {
        let set = EntitySet::from_annotations(vec![
            Annotation::new("Tokio"),
            Annotation::new("tokio").with_confidence(0.1).with_uri("later"),
        ]);

        let tokio = set.get("tokio").unwrap();
        assert_eq!(tokio.label, "Tokio");
        assert_eq!(tokio.confidence, Some(0.1));
        assert_eq!(tokio.uri.as_deref(), Some("later"));
    }

    #[test]
    fn test_replacement_keeps_position() {
        let set = EntitySet::from_annotations(vec![
            Annotation::new("SEO").with_confidence(0.6),
            Annotation::new("Python").with_confidence(0.8),
            Annotation::new("seo").with_confidence(0.95),
        ]);

        assert_eq!(labels(&set), vec!["SEO", "Python"]);
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["seo", "python"]);
    }

    #[test]
    fn test_unlabeled_annotations_are_dropped() {
        let set = EntitySet::from_annotations(vec![
            Annotation::default(),
            Annotation::new(""),
            Annotation::new("NLP"),
        ]);

        assert_eq!(labels(&set), vec!["NLP"]);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let once = EntitySet::from_annotations(vec![
            Annotation::new("Apple").with_confidence(0.5),
            Annotation::new("apple").with_confidence(0.9),
            Annotation::new("Google"),
            Annotation::new("google").with_confidence(0.3),
            Annotation::new("Berlin").with_types(["http://dbpedia.org/ontology/City"]),
        ]);
        let twice = EntitySet::from_entities(once.iter().cloned());

        assert_eq!(once.iter().collect::<Vec<_>>(), twice.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_group_by_type() {
        let set = EntitySet::from_annotations(vec![
            Annotation::new("Ada Lovelace").with_types(["http://dbpedia.org/ontology/Person"]),
            Annotation::new("London").with_types(["http://dbpedia.org/ontology/City"]),
            Annotation::new("Alan Turing").with_types(["http://dbpedia.org/ontology/Person"]),
            Annotation::new("Computing"),
        ]);

        let groups = set.group_by_type();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].entity_type, "Person");
        assert_eq!(groups[0].labels, vec!["Ada Lovelace", "Alan Turing"]);
        assert_eq!(groups[1].entity_type, "City");
        assert_eq!(groups[2].entity_type, "Thing");
    }

    #[test]
    fn test_serializes_as_list() {
        let set = EntitySet::from_annotations(vec![Annotation::new("Rust")]);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json[0]["label"], "Rust");
        assert_eq!(json[0]["key"], "rust");
        assert_eq!(json[0]["type"], "Thing");
    }
}
