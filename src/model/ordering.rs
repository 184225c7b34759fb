use crate::model::common::{default_pieces, default_true};
use crate::model::{Dimensions, Id};
use serde::{Deserialize, Serialize};

/// Order header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ordering {
    #[serde(default)]
    pub id: Id,
    #[serde(default)]
    pub name: String,
    pub price: f64,
    /// Markup in percent.
    #[serde(default)]
    pub persent: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Ordering {
    pub fn new(id: Id, name: impl Into<String>, price: f64, persent: f64) -> Self {
        let mut ordering = Self {
            id,
            name: name.into(),
            price,
            persent,
            cost: 0.0,
            is_active: true,
        };
        ordering.update_cost();
        ordering
    }

    /// Re-derive `cost` from `price` and the percentage markup.
    pub fn update_cost(&mut self) {
        self.cost = crate::logic::pricing::markup_cost(self.price, self.persent);
    }
}

/// A product placed on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductToOrdering {
    #[serde(default)]
    pub id: Id,
    pub ordering_id: Id,
    pub product_id: Id,
    #[serde(default)]
    pub user_id: Id,
    pub number: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub length: f64,
    #[serde(default = "default_pieces")]
    pub pieces: i64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ProductToOrdering {
    pub fn new(ordering_id: Id, product_id: Id, user_id: Id, number: f64) -> Self {
        Self {
            id: 0,
            ordering_id,
            product_id,
            user_id,
            number,
            width: 0.0,
            length: 0.0,
            pieces: 1,
            price: 0.0,
            cost: 0.0,
            is_active: true,
        }
    }

    pub fn sized(mut self, width: f64, length: f64, pieces: i64) -> Self {
        self.width = width;
        self.length = length;
        self.pieces = pieces;
        self
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.length, self.pieces)
    }
}

/// Material line item of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialToOrdering {
    #[serde(default)]
    pub id: Id,
    pub ordering_id: Id,
    #[serde(rename = "matherial_id")]
    pub material_id: Id,
    pub product_to_ordering_id: Id,
    pub user_id: Id,
    pub width: f64,
    pub length: f64,
    pub pieces: i64,
    pub color_id: Id,
    pub number: f64,
    pub price: f64,
    pub persent: f64,
    pub profit: f64,
    pub cost: f64,
    pub comm: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Operation line item of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationToOrdering {
    #[serde(default)]
    pub id: Id,
    pub ordering_id: Id,
    pub operation_id: Id,
    pub product_to_ordering_id: Id,
    pub user_id: Id,
    pub number: f64,
    /// Internal unit cost.
    pub price: f64,
    /// Amount billed to the customer, from the operation's live price.
    pub user_sum: f64,
    pub cost: f64,
    pub equipment_id: Id,
    pub equipment_cost: f64,
    pub comm: String,
    pub is_done: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Line items produced for one product placed on an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterializationPlan {
    pub materials: Vec<MaterialToOrdering>,
    pub operations: Vec<OperationToOrdering>,
}

impl MaterializationPlan {
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty() && self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.materials.len() + self.operations.len()
    }

    /// Point every line item at the product link they were planned for.
    pub fn attach_to(&mut self, product_to_ordering_id: Id) {
        for row in &mut self.materials {
            row.product_to_ordering_id = product_to_ordering_id;
        }
        for row in &mut self.operations {
            row.product_to_ordering_id = product_to_ordering_id;
        }
    }
}

/// Cost totals over the active line items of one order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderingSummary {
    pub ordering_id: Id,
    pub product_count: usize,
    pub material_cost: f64,
    pub operation_cost: f64,
    pub equipment_cost: f64,
    pub user_sum: f64,
    pub total_cost: f64,
}
