use crate::model::{
    Id, Material, MaterialToOrdering, MaterialToProduct, MaterializationPlan, Operation,
    OperationToOrdering, OperationToProduct, Ordering, Product, ProductToOrdering,
    ProductToProduct,
};
use anyhow::Result;

/// Read access to catalog entities and the association tables that compose them
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_product(&self, id: Id) -> Result<Option<Product>>;
    async fn get_material(&self, id: Id) -> Result<Option<Material>>;
    async fn get_operation(&self, id: Id) -> Result<Option<Operation>>;
    /// Active material bindings of a product, in row order
    async fn list_materials_of(&self, product_id: Id) -> Result<Vec<MaterialToProduct>>;
    /// Active operation bindings of a product, in row order
    async fn list_operations_of(&self, product_id: Id) -> Result<Vec<OperationToProduct>>;
    /// Active sub-product bindings of a product, in row order
    async fn list_sub_products_of(&self, product_id: Id) -> Result<Vec<ProductToProduct>>;
}

/// Catalog inserts; ids are assigned by the store and returned on the record
#[async_trait::async_trait]
pub trait CatalogWriter: Send + Sync {
    async fn create_product(&self, product: Product) -> Result<Product>;
    async fn create_material(&self, material: Material) -> Result<Material>;
    async fn create_operation(&self, operation: Operation) -> Result<Operation>;
    async fn create_material_to_product(&self, row: MaterialToProduct) -> Result<MaterialToProduct>;
    async fn create_operation_to_product(&self, row: OperationToProduct) -> Result<OperationToProduct>;
    async fn create_product_to_product(&self, row: ProductToProduct) -> Result<ProductToProduct>;
}

/// Hands out a consistent read view for one top-level call
#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    type Snapshot: CatalogStore;

    async fn snapshot(&self) -> Result<Self::Snapshot>;
}

/// Persistence for orders and their line items
#[async_trait::async_trait]
pub trait OrderLedger: Send + Sync {
    async fn create_ordering(&self, ordering: Ordering) -> Result<Ordering>;
    async fn get_ordering(&self, id: Id) -> Result<Option<Ordering>>;

    async fn create_product_to_ordering(&self, row: ProductToOrdering) -> Result<ProductToOrdering>;
    async fn get_product_to_ordering(&self, id: Id) -> Result<Option<ProductToOrdering>>;
    async fn list_products_for_ordering(&self, ordering_id: Id) -> Result<Vec<ProductToOrdering>>;

    async fn create_material_to_ordering(&self, row: MaterialToOrdering) -> Result<MaterialToOrdering>;
    async fn list_materials_for_ordering(&self, ordering_id: Id) -> Result<Vec<MaterialToOrdering>>;

    async fn create_operation_to_ordering(&self, row: OperationToOrdering) -> Result<OperationToOrdering>;
    async fn list_operations_for_ordering(&self, ordering_id: Id) -> Result<Vec<OperationToOrdering>>;

    /// Persist every line item of a plan. Writes one row at a time and stops at
    /// the first failure; rows written before it stay. Stores with transactions
    /// override this to make the batch atomic.
    async fn record_materialization(&self, plan: MaterializationPlan) -> Result<MaterializationPlan> {
        let mut recorded = MaterializationPlan::default();
        for row in plan.materials {
            recorded.materials.push(self.create_material_to_ordering(row).await?);
        }
        for row in plan.operations {
            recorded.operations.push(self.create_operation_to_ordering(row).await?);
        }
        Ok(recorded)
    }

    /// Store a new product link and the line items planned for it. The plan's
    /// rows are re-pointed at the stored link's id. Like
    /// [`OrderLedger::record_materialization`], the default is not atomic.
    async fn record_link_with_materialization(
        &self,
        link: ProductToOrdering,
        mut plan: MaterializationPlan,
    ) -> Result<(ProductToOrdering, MaterializationPlan)> {
        let link = self.create_product_to_ordering(link).await?;
        plan.attach_to(link.id);
        let recorded = self.record_materialization(plan).await?;
        Ok((link, recorded))
    }
}

pub trait Store: CatalogStore + CatalogWriter + SnapshotSource + OrderLedger + Send + Sync {}
impl<T: CatalogStore + CatalogWriter + SnapshotSource + OrderLedger + Send + Sync> Store for T {}
