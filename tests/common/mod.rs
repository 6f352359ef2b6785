//! Shared factory definitions for integration tests

#![allow(dead_code)]

use fixture_factory::prelude::*;

/// Engine with `user`, `admin`, `guest` and `post` factories and an `email` sequence
pub fn engine_with_core_factories() -> FactoryEngine {
    let engine = FactoryEngine::new();
    define_core_factories(&engine);
    engine
}

pub fn define_core_factories(engine: &FactoryEngine) {
    engine
        .define_sequence("email", |n| format!("somebody{n}@example.com"))
        .expect("email sequence");

    engine
        .define(
            FactoryDefinition::new("user")
                .attribute("first_name", "Jimi")
                .attribute("last_name", "Hendrix")
                .attribute("admin", false)
                .dynamic("email", |ev| {
                    let first = ev.get_str("first_name")?;
                    let last = ev.get_str("last_name")?;
                    Ok(format!("{first}.{last}@example.com").to_lowercase())
                }),
        )
        .expect("user factory");

    engine
        .define(
            FactoryDefinition::new("admin")
                .parent("user")
                .attribute("admin", true),
        )
        .expect("admin factory");

    engine
        .define(
            FactoryDefinition::new("guest")
                .parent("user")
                .attribute("last_name", "Anonymous")
                .attribute("username", "GuestUser"),
        )
        .expect("guest factory");

    engine
        .define(
            FactoryDefinition::new("post")
                .attribute("title", "Test Post")
                .association("author", AssociationDef::factory("user")),
        )
        .expect("post factory");
}

/// String attribute of an instance, panicking with a readable message when absent
pub fn text(instance: &Instance, attribute: &str) -> String {
    instance
        .get_str(attribute)
        .unwrap_or_else(|| panic!("{attribute} missing on {instance:?}"))
}
