//! # Build Strategies
//!
//! The closed set of ways a factory can be run. Every strategy shares the attribute
//! resolver and differs only in what happens to the resolved attributes:
//!
//! | Strategy         | Result               | Persistence           | Callbacks                   |
//! |------------------|----------------------|-----------------------|-----------------------------|
//! | `AttributesFor`  | plain attribute map  | none                  | none                        |
//! | `Build`          | unsaved instance     | associations only     | `after_build`               |
//! | `Create`         | saved instance       | instance and associations | `after_build`, `after_create` |
//! | `Stub`           | stubbed stand-in     | forbidden             | `after_stub`                |

pub mod runner;

use crate::attributes::AttributeValue;
use crate::error::FactoryError;
use crate::persistence::Instance;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    AttributesFor,
    Build,
    #[default]
    Create,
    Stub,
}

impl Strategy {
    /// Strategy used for associations that do not declare one
    pub const ASSOCIATION_DEFAULT: Strategy = Strategy::Create;

    /// Whether this strategy produces a live object
    pub fn produces_instance(&self) -> bool {
        !matches!(self, Self::AttributesFor)
    }

    /// Strategy an association runs with when the outer build uses `self`
    pub fn for_association(&self, declared: Option<Strategy>) -> Option<Strategy> {
        match self {
            Self::AttributesFor => None,
            Self::Stub => Some(Self::Stub),
            Self::Build | Self::Create => Some(declared.unwrap_or(Self::ASSOCIATION_DEFAULT)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttributesFor => write!(f, "attributes_for"),
            Self::Build => write!(f, "build"),
            Self::Create => write!(f, "create"),
            Self::Stub => write!(f, "stub"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attributes_for" => Ok(Self::AttributesFor),
            "build" => Ok(Self::Build),
            "create" => Ok(Self::Create),
            "stub" => Ok(Self::Stub),
            _ => Err(FactoryError::InvalidStrategy(s.to_string())),
        }
    }
}

/// What a strategy run hands back
#[derive(Debug, Clone)]
pub enum Product {
    Attributes(Map<String, Value>),
    Instance(Instance),
}

impl Product {
    pub fn into_attributes(self) -> Option<Map<String, Value>> {
        match self {
            Product::Attributes(attributes) => Some(attributes),
            Product::Instance(_) => None,
        }
    }

    pub fn into_instance(self) -> Option<Instance> {
        match self {
            Product::Instance(instance) => Some(instance),
            Product::Attributes(_) => None,
        }
    }
}

impl From<Product> for AttributeValue {
    fn from(product: Product) -> Self {
        match product {
            Product::Attributes(attributes) => AttributeValue::Value(Value::Object(attributes)),
            Product::Instance(instance) => AttributeValue::Record(instance),
        }
    }
}
