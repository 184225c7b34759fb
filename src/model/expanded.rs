use crate::model::{
    Id, Material, MaterialToProduct, Operation, OperationToProduct, Product, ProductToProduct,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Association rows keyed by `list_name`, keys and rows in encounter order.
pub type Grouped<T> = IndexMap<String, Vec<T>>;

/// Node identifier, unique within one top-level expansion.
pub type Uid = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialNode {
    #[serde(rename = "matherial")]
    pub material: Material,
    #[serde(rename = "matherial_to_product")]
    pub material_to_product: MaterialToProduct,
    pub uid: Uid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationNode {
    pub operation: Operation,
    pub operation_to_product: OperationToProduct,
    pub uid: Uid,
}

/// A product summary; `product_to_product` is absent for the root of a deep expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductNode {
    pub product: Product,
    pub product_to_product: Option<ProductToProduct>,
    pub uid: Uid,
}

/// One-level expansion of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatComposition {
    pub product: Product,
    #[serde(rename = "matherial_extra")]
    pub materials: Grouped<MaterialNode>,
    #[serde(rename = "operation_extra")]
    pub operations: Grouped<OperationNode>,
    #[serde(rename = "product_extra")]
    pub products: Grouped<ProductNode>,
}

/// Full composition tree of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepComposition {
    #[serde(rename = "product_extra")]
    pub product: ProductNode,
    #[serde(rename = "matherial_extra")]
    pub materials: Grouped<MaterialNode>,
    #[serde(rename = "operation_extra")]
    pub operations: Grouped<OperationNode>,
    #[serde(rename = "product_deep")]
    pub sub_products: Grouped<DeepComposition>,
    pub uid: Uid,
}

impl DeepComposition {
    pub fn product_id(&self) -> Id {
        self.product.product.id
    }

    /// Every uid in the tree, in assignment order.
    pub fn uids(&self) -> Vec<Uid> {
        let mut uids = Vec::new();
        self.collect_uids(&mut uids);
        uids
    }

    fn collect_uids(&self, uids: &mut Vec<Uid>) {
        uids.push(self.uid);
        uids.push(self.product.uid);
        uids.extend(self.materials.values().flatten().map(|n| n.uid));
        uids.extend(self.operations.values().flatten().map(|n| n.uid));
        for child in self.sub_products.values().flatten() {
            child.collect_uids(uids);
        }
    }

    /// Number of product nodes in the tree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self
            .sub_products
            .values()
            .flatten()
            .map(DeepComposition::node_count)
            .sum::<usize>()
    }
}
