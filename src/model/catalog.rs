use crate::model::common::default_true;
use crate::model::Id;
use serde::{Deserialize, Serialize};

/// A manufacturable catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub product_group_id: Id,
    #[serde(default)]
    pub measure_id: Id,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub min_cost: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Product {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            product_group_id: 0,
            measure_id: 0,
            price: 0.0,
            cost: 0.0,
            min_cost: 0.0,
            is_active: true,
        }
    }
}

/// A raw or purchased component with a unit cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(default)]
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub measure_id: Id,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Material {
    pub fn new(id: Id, name: impl Into<String>, cost: f64) -> Self {
        Self {
            id,
            name: name.into(),
            measure_id: 0,
            price: cost,
            cost,
            is_active: true,
        }
    }

    pub fn with_measure(mut self, measure_id: Id) -> Self {
        self.measure_id = measure_id;
        self
    }
}

/// A billable process step such as cutting or printing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub measure_id: Id,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Operation {
    pub fn new(id: Id, name: impl Into<String>, price: f64, cost: f64) -> Self {
        Self {
            id,
            name: name.into(),
            measure_id: 0,
            price,
            cost,
            is_active: true,
        }
    }

    pub fn with_measure(mut self, measure_id: Id) -> Self {
        self.measure_id = measure_id;
        self
    }
}
