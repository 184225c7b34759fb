use crate::model::common::default_true;
use crate::model::{Id, DEFAULT_LIST_NAME};
use serde::{Deserialize, Serialize};

/// Binds a material to a product inside a named variant list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialToProduct {
    #[serde(default)]
    pub id: Id,
    pub product_id: Id,
    #[serde(rename = "matherial_id")]
    pub material_id: Id,
    pub list_name: String,
    /// Quantity per unit of product.
    pub number: f64,
    /// Unit cost captured when the binding was made.
    pub cost: f64,
    #[serde(default)]
    pub add_to_price: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl MaterialToProduct {
    pub fn new(product_id: Id, material_id: Id, number: f64, cost: f64) -> Self {
        Self {
            id: 0,
            product_id,
            material_id,
            list_name: DEFAULT_LIST_NAME.to_string(),
            number,
            cost,
            add_to_price: false,
            is_active: true,
        }
    }

    pub fn in_list(mut self, list_name: impl Into<String>) -> Self {
        self.list_name = list_name.into();
        self
    }
}

/// Binds an operation (and optionally the equipment running it) to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationToProduct {
    #[serde(default)]
    pub id: Id,
    pub product_id: Id,
    pub operation_id: Id,
    pub list_name: String,
    pub number: f64,
    pub cost: f64,
    #[serde(default)]
    pub equipment_id: Id,
    #[serde(default)]
    pub equipment_cost: f64,
    #[serde(default)]
    pub add_to_price: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl OperationToProduct {
    pub fn new(product_id: Id, operation_id: Id, number: f64, cost: f64) -> Self {
        Self {
            id: 0,
            product_id,
            operation_id,
            list_name: DEFAULT_LIST_NAME.to_string(),
            number,
            cost,
            equipment_id: 0,
            equipment_cost: 0.0,
            add_to_price: false,
            is_active: true,
        }
    }

    pub fn in_list(mut self, list_name: impl Into<String>) -> Self {
        self.list_name = list_name.into();
        self
    }

    pub fn with_equipment(mut self, equipment_id: Id, equipment_cost: f64) -> Self {
        self.equipment_id = equipment_id;
        self.equipment_cost = equipment_cost;
        self
    }
}

/// Parent/child edge of the sub-assembly graph. Cycles are possible in stored data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductToProduct {
    #[serde(default)]
    pub id: Id,
    pub product_id: Id,
    pub product2_id: Id,
    pub list_name: String,
    pub number: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ProductToProduct {
    pub fn new(product_id: Id, product2_id: Id, number: f64) -> Self {
        Self {
            id: 0,
            product_id,
            product2_id,
            list_name: DEFAULT_LIST_NAME.to_string(),
            number,
            is_active: true,
        }
    }

    pub fn in_list(mut self, list_name: impl Into<String>) -> Self {
        self.list_name = list_name.into();
        self
    }
}
