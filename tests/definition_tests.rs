//! Integration tests for factory definitions, inheritance and resolution errors

mod common;

use common::{engine_with_core_factories, text};
use fixture_factory::persistence::ConnectionInfo;
use fixture_factory::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn test_guest_inherits_and_overrides_user() {
    let engine = engine_with_core_factories();

    let guest = engine.create("guest", attrs! {}).unwrap();

    assert_eq!(guest.model_name(), "User");
    assert_eq!(text(&guest, "first_name"), "Jimi");
    assert_eq!(text(&guest, "last_name"), "Anonymous");
    assert_eq!(text(&guest, "username"), "GuestUser");
    assert_eq!(text(&guest, "email"), "jimi.anonymous@example.com");
    assert!(!guest.is_new_record());
}

#[test]
fn test_admin_overrides_static_attribute() {
    let engine = engine_with_core_factories();

    let admin = engine.build("admin", attrs! {}).unwrap();
    let user = engine.build("user", attrs! {}).unwrap();

    assert_eq!(admin.get("admin").unwrap().as_bool(), Some(true));
    assert_eq!(user.get("admin").unwrap().as_bool(), Some(false));
}

#[test]
fn test_target_type_derived_and_overridden() {
    let engine = FactoryEngine::new();
    engine.define(FactoryDefinition::new("admin_user")).unwrap();
    engine
        .define(FactoryDefinition::new("writer").class("Author"))
        .unwrap();
    engine
        .define(FactoryDefinition::new("senior_writer").parent("writer"))
        .unwrap();

    assert_eq!(engine.build("admin_user", attrs! {}).unwrap().model_name(), "AdminUser");
    assert_eq!(engine.build("writer", attrs! {}).unwrap().model_name(), "Author");
    assert_eq!(
        engine.build("senior_writer", attrs! {}).unwrap().model_name(),
        "Author"
    );
}

#[test]
fn test_callbacks_run_parent_first_across_generations() {
    let engine = FactoryEngine::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let log = |label: &'static str| {
        let order = order.clone();
        move |_: &Instance| -> FactoryResult<()> {
            order.lock().unwrap().push(label);
            Ok(())
        }
    };

    engine
        .define(
            FactoryDefinition::new("user")
                .after_build(log("user.after_build"))
                .after_create(log("user.after_create")),
        )
        .unwrap();
    engine
        .define(
            FactoryDefinition::new("admin")
                .parent("user")
                .after_build(log("admin.after_build"))
                .after_create(log("admin.after_create")),
        )
        .unwrap();
    engine
        .define(
            FactoryDefinition::new("super_admin")
                .parent("admin")
                .after_create(log("super_admin.after_create")),
        )
        .unwrap();

    engine.create("super_admin", attrs! {}).unwrap();

    assert_eq!(
        *order.lock().unwrap(),
        vec![
            "user.after_build",
            "admin.after_build",
            "user.after_create",
            "admin.after_create",
            "super_admin.after_create",
        ]
    );
}

#[test]
fn test_unknown_factory_and_parent() {
    let engine = FactoryEngine::new();
    engine
        .define(FactoryDefinition::new("orphan").parent("ghost"))
        .unwrap();

    assert_eq!(
        engine.build("missing", attrs! {}).unwrap_err(),
        FactoryError::UnknownFactory {
            name: "missing".to_string()
        }
    );
    assert_eq!(
        engine.build("orphan", attrs! {}).unwrap_err(),
        FactoryError::UnknownFactory {
            name: "ghost".to_string()
        }
    );
}

#[test]
fn test_duplicate_factory_rejected() {
    let engine = engine_with_core_factories();

    assert_eq!(
        engine.define(FactoryDefinition::new("user")).unwrap_err(),
        FactoryError::DuplicateFactory {
            name: "user".to_string()
        }
    );
}

#[test]
fn test_invalid_definitions_rejected_at_registration() {
    let engine = FactoryEngine::new();

    let duplicate = FactoryDefinition::new("user")
        .attribute("name", "a")
        .attribute("name", "b");
    let setter_name = FactoryDefinition::new("account").attribute("name=", "a");
    let self_parent = FactoryDefinition::new("loop").parent("loop");

    assert!(matches!(
        engine.define(duplicate),
        Err(FactoryError::InvalidAttributeDefinition { .. })
    ));
    assert!(matches!(
        engine.define(setter_name),
        Err(FactoryError::InvalidAttributeDefinition { .. })
    ));
    assert!(matches!(
        engine.define(self_parent),
        Err(FactoryError::CircularInheritance { .. })
    ));
    assert!(engine.factories().is_empty());
}

#[test]
fn test_inheritance_cycle_detected_on_use() {
    let engine = FactoryEngine::new();
    engine
        .define(FactoryDefinition::new("a").parent("b"))
        .unwrap();
    engine
        .define(FactoryDefinition::new("b").parent("a"))
        .unwrap();

    assert!(matches!(
        engine.build("a", attrs! {}),
        Err(FactoryError::CircularInheritance { .. })
    ));
}

#[test]
fn test_circular_attributes_detected() {
    let engine = FactoryEngine::new();
    engine
        .define(
            FactoryDefinition::new("user")
                .dynamic("a", |ev| ev.get("b"))
                .dynamic("b", |ev| ev.get("a")),
        )
        .unwrap();

    assert_eq!(
        engine.attributes_for("user", attrs! {}).unwrap_err(),
        FactoryError::CircularAttribute {
            factory: "user".to_string(),
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        }
    );

    // An override breaks the cycle.
    let attributes = engine
        .attributes_for("user", attrs! { "b" => 7 })
        .unwrap();
    assert_eq!(attributes["a"], 7);
}

#[test]
fn test_reading_undeclared_attribute_fails() {
    let engine = FactoryEngine::new();
    engine
        .define(FactoryDefinition::new("user").dynamic("email", |ev| ev.get_str("nickname")))
        .unwrap();

    assert_eq!(
        engine.build("user", attrs! {}).unwrap_err(),
        FactoryError::UnknownAttribute {
            factory: "user".to_string(),
            attribute: "nickname".to_string(),
        }
    );

    let user = engine.build("user", attrs! { "nickname" => "jh" }).unwrap();
    assert_eq!(text(&user, "email"), "jh");
}

#[test]
fn test_dynamic_block_runs_once_per_build() {
    let engine = FactoryEngine::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    engine
        .define(
            FactoryDefinition::new("user")
                .dynamic("token", move |_| {
                    Ok(counter.fetch_add(1, Ordering::SeqCst) as i64)
                })
                .dynamic("first", |ev| ev.get("token"))
                .dynamic("second", |ev| ev.get("token")),
        )
        .unwrap();

    let attributes = engine.attributes_for("user", attrs! {}).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(attributes["first"], attributes["second"]);
}

#[test]
fn test_dynamic_block_can_build_associations() {
    let engine = engine_with_core_factories();
    engine
        .define(
            FactoryDefinition::new("comment")
                .dynamic("author", |ev| ev.association("admin", attrs! {}))
                .dynamic("strategy", |ev| Ok(ev.strategy().to_string())),
        )
        .unwrap();

    let comment = engine.build("comment", attrs! {}).unwrap();
    let author = comment.get_record("author").unwrap();
    assert!(!author.is_new_record());
    assert_eq!(text(&comment, "strategy"), "build");

    let attributes = engine.attributes_for("comment", attrs! {}).unwrap();
    assert!(attributes["author"].is_null());
}

#[test]
fn test_self_referential_association_hits_depth_limit() {
    let engine = FactoryEngine::with_config(FactoryConfig {
        max_association_depth: 3,
        ..FactoryConfig::default()
    });
    engine
        .define(FactoryDefinition::new("node").association("parent", AssociationDef::factory("node")))
        .unwrap();

    assert_eq!(
        engine.build("node", attrs! {}).unwrap_err(),
        FactoryError::AssociationDepthExceeded {
            factory: "node".to_string(),
            depth: 4,
        }
    );
    assert_eq!(engine.store().count("Node"), 0);

    // Ending the chain with an override keeps it finite.
    assert!(engine
        .build("node", attrs! { "parent" => serde_json::Value::Null })
        .is_ok());
}

#[derive(Debug)]
struct AuditedRecord {
    attributes: AttributeMap,
    saves: Arc<AtomicUsize>,
    saved: bool,
}

impl Record for AuditedRecord {
    fn model_name(&self) -> &str {
        "Audited"
    }

    fn id(&self) -> Option<i64> {
        self.saved.then_some(1)
    }

    fn get(&self, attribute: &str) -> Option<AttributeValue> {
        self.attributes.get(attribute).cloned()
    }

    fn set(&mut self, attribute: &str, value: AttributeValue) -> FactoryResult<()> {
        self.attributes.insert(attribute.to_string(), value);
        Ok(())
    }

    fn attributes(&self) -> AttributeMap {
        self.attributes.clone()
    }

    fn is_new_record(&self) -> bool {
        !self.saved
    }

    fn save(&mut self) -> FactoryResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.saved = true;
        Ok(())
    }

    fn reload(&mut self) -> FactoryResult<()> {
        Ok(())
    }

    fn destroy(&mut self) -> FactoryResult<()> {
        self.saved = false;
        Ok(())
    }

    fn connection(&self) -> FactoryResult<ConnectionInfo> {
        Ok(ConnectionInfo {
            adapter: "audit".to_string(),
        })
    }

    fn increment(&mut self, attribute: &str, by: i64) -> FactoryResult<()> {
        let current = self
            .attributes
            .get(attribute)
            .and_then(AttributeValue::as_i64)
            .unwrap_or(0);
        self.set(attribute, (current + by).into())?;
        self.save()
    }
}

struct AuditedModel {
    saves: Arc<AtomicUsize>,
}

impl Model for AuditedModel {
    fn name(&self) -> &str {
        "Audited"
    }

    fn instantiate(&self) -> FactoryResult<Box<dyn Record>> {
        Ok(Box::new(AuditedRecord {
            attributes: AttributeMap::new(),
            saves: self.saves.clone(),
            saved: false,
        }))
    }
}

#[test]
fn test_registered_model_is_saved_exactly_once() {
    let engine = FactoryEngine::with_config(FactoryConfig {
        strict_models: true,
        ..FactoryConfig::default()
    });
    assert!(engine.models().is_strict());
    let saves = Arc::new(AtomicUsize::new(0));
    engine.register_model(Arc::new(AuditedModel {
        saves: saves.clone(),
    }));
    engine
        .define(
            FactoryDefinition::new("audited")
                .attribute("name", "entry")
                .after_build(|record| record.set("built", true)),
        )
        .unwrap();
    engine.define(FactoryDefinition::new("unmapped")).unwrap();

    let built = engine.build("audited", attrs! {}).unwrap();
    assert!(built.is_new_record());
    assert_eq!(saves.load(Ordering::SeqCst), 0);

    let created = engine.create("audited", attrs! {}).unwrap();
    assert!(!created.is_new_record());
    assert_eq!(created.connection().unwrap().adapter, "audit");
    assert_eq!(created.get("built").unwrap().as_bool(), Some(true));
    assert_eq!(saves.load(Ordering::SeqCst), 1);

    assert_eq!(
        engine.build("unmapped", attrs! {}).unwrap_err(),
        FactoryError::UnknownModel {
            name: "Unmapped".to_string()
        }
    );
    // Stubs never instantiate a model.
    assert!(engine.stub("unmapped", attrs! {}).is_ok());
}

#[test]
fn test_custom_alias_rule_suppresses_attribute() {
    let engine = FactoryEngine::new();
    engine.aliases().add_rule(|name| (name == "mail").then(|| "email".to_string()));
    engine
        .define(
            FactoryDefinition::new("user")
                .attribute("email", "jimi@example.com")
                .attribute("name", "Jimi"),
        )
        .unwrap();

    let attributes = engine
        .attributes_for("user", attrs! { "mail" => "jh@example.com" })
        .unwrap();

    assert!(!attributes.contains_key("email"));
    assert_eq!(attributes["mail"], "jh@example.com");

    engine.reset();
    assert!(engine.factories().is_empty());
    assert_eq!(engine.aliases().aliases_for("mail"), vec!["mail_id", "mail"]);
}

#[test]
fn test_global_engine_is_shared() {
    let first = FactoryEngine::global();
    let second = FactoryEngine::global();

    assert!(std::ptr::eq(first, second));
    first
        .define_sequence("global_tests.counter", |n| n)
        .unwrap();
    assert_eq!(
        second.next_sequence("global_tests.counter").unwrap(),
        serde_json::json!(1)
    );
}
