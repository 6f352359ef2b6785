use fixture_factory::sequence::Sequence;
use fixture_factory::{AttributeMap, FactoryDefinition, FactoryEngine, Instance};
use proptest::prelude::*;
use std::collections::HashSet;

fn attribute_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,15}"
}

proptest! {
    /// Property: a sequence never repeats and counts up from one
    #[test]
    fn sequence_values_are_unique_and_monotonic(draws in 1usize..200) {
        let sequence = Sequence::new("prop", |n| n);
        let values: Vec<u64> = (0..draws)
            .map(|_| sequence.next().as_u64().unwrap())
            .collect();

        let unique: HashSet<u64> = values.iter().copied().collect();
        prop_assert_eq!(unique.len(), draws);
        prop_assert_eq!(values[0], 1);
        prop_assert!(values.windows(2).all(|pair| pair[1] == pair[0] + 1));
    }

    /// Property: overrides always win over declared defaults
    #[test]
    fn overrides_replace_declared_values(name in attribute_name_strategy(), value in "[ -~]{0,32}") {
        let engine = FactoryEngine::new();
        engine
            .define(FactoryDefinition::new("thing").attribute(name.clone(), "default"))
            .unwrap();

        let mut overrides = AttributeMap::new();
        overrides.insert(name.clone(), value.clone().into());
        let attributes = engine.attributes_for("thing", overrides).unwrap();

        prop_assert_eq!(attributes[&name].as_str(), Some(value.as_str()));
    }

    /// Property: stub ids never collide
    #[test]
    fn stub_ids_are_distinct(count in 1usize..50) {
        let engine = FactoryEngine::new();
        engine.define(FactoryDefinition::new("thing")).unwrap();

        let ids: HashSet<i64> = engine
            .stub_list("thing", count, AttributeMap::new())
            .unwrap()
            .iter()
            .filter_map(Instance::id)
            .collect();
        prop_assert_eq!(ids.len(), count);
    }
}
