use crate::model::{
    Id, Material, MaterialToOrdering, MaterialToProduct, MaterializationPlan, Operation,
    OperationToOrdering, OperationToProduct, Ordering, Product, ProductToOrdering,
    ProductToProduct,
};
use crate::store::traits::{CatalogStore, CatalogWriter, OrderLedger, SnapshotSource};
use anyhow::{bail, Context, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Rows that carry a store-assigned id
trait Record: Clone {
    fn id(&self) -> Id;
    fn set_id(&mut self, id: Id);
}

macro_rules! impl_record {
    ($($ty:ty),* $(,)?) => {
        $(impl Record for $ty {
            fn id(&self) -> Id {
                self.id
            }

            fn set_id(&mut self, id: Id) {
                self.id = id;
            }
        })*
    };
}

impl_record!(
    Product,
    Material,
    Operation,
    MaterialToProduct,
    OperationToProduct,
    ProductToProduct,
    Ordering,
    ProductToOrdering,
    MaterialToOrdering,
    OperationToOrdering,
);

#[derive(Debug, Clone)]
struct Table<T> {
    rows: BTreeMap<Id, T>,
    last_id: Id,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Record> Table<T> {
    /// Insert a row; a zero id gets the next free one, an explicit id is kept
    fn insert(&mut self, row: T) -> Result<T> {
        let row = self.stage_one(row)?;
        self.commit(std::slice::from_ref(&row));
        Ok(row)
    }

    fn stage_one(&self, row: T) -> Result<T> {
        let mut staged = self.stage(vec![row])?;
        staged.pop().context("Staged row vanished")
    }

    /// Assign ids to `rows` exactly as inserting them one by one would,
    /// without touching the table
    fn stage(&self, rows: Vec<T>) -> Result<Vec<T>> {
        let mut last_id = self.last_id;
        let mut taken = BTreeSet::new();
        let mut staged = Vec::with_capacity(rows.len());
        for mut row in rows {
            if row.id() == 0 {
                row.set_id(last_id + 1);
            } else if self.rows.contains_key(&row.id()) || taken.contains(&row.id()) {
                bail!("Duplicate id {}", row.id());
            }
            last_id = last_id.max(row.id());
            taken.insert(row.id());
            staged.push(row);
        }
        Ok(staged)
    }

    fn commit(&mut self, staged: &[T]) {
        for row in staged {
            self.last_id = self.last_id.max(row.id());
            self.rows.insert(row.id(), row.clone());
        }
    }

    fn get(&self, id: Id) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn select(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| predicate(row)).cloned().collect()
    }
}

#[derive(Debug, Clone, Default)]
struct CatalogTables {
    products: Table<Product>,
    materials: Table<Material>,
    operations: Table<Operation>,
    material_to_product: Table<MaterialToProduct>,
    operation_to_product: Table<OperationToProduct>,
    product_to_product: Table<ProductToProduct>,
}

impl CatalogTables {
    fn materials_of(&self, product_id: Id) -> Vec<MaterialToProduct> {
        self.material_to_product
            .select(|row| row.product_id == product_id && row.is_active)
    }

    fn operations_of(&self, product_id: Id) -> Vec<OperationToProduct> {
        self.operation_to_product
            .select(|row| row.product_id == product_id && row.is_active)
    }

    fn sub_products_of(&self, product_id: Id) -> Vec<ProductToProduct> {
        self.product_to_product
            .select(|row| row.product_id == product_id && row.is_active)
    }
}

#[derive(Debug, Default)]
struct LedgerTables {
    orderings: Table<Ordering>,
    product_to_ordering: Table<ProductToOrdering>,
    material_to_ordering: Table<MaterialToOrdering>,
    operation_to_ordering: Table<OperationToOrdering>,
}

impl LedgerTables {
    fn check_ordering(&self, ordering_id: Id) -> Result<()> {
        if !self.orderings.rows.contains_key(&ordering_id) {
            bail!("Ordering {} does not exist", ordering_id);
        }
        Ok(())
    }

    fn check_line_item(&self, ordering_id: Id, product_to_ordering_id: Id) -> Result<()> {
        self.check_ordering(ordering_id)?;
        if !self.product_to_ordering.rows.contains_key(&product_to_ordering_id) {
            bail!("Product link {} does not exist", product_to_ordering_id);
        }
        Ok(())
    }
}

/// In-process store for development and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: RwLock<CatalogTables>,
    ledger: RwLock<LedgerTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Frozen copy of the catalog taken at one instant
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    catalog: Arc<CatalogTables>,
}

#[async_trait::async_trait]
impl CatalogStore for MemoryStore {
    async fn get_product(&self, id: Id) -> Result<Option<Product>> {
        Ok(self.catalog.read().products.get(id))
    }

    async fn get_material(&self, id: Id) -> Result<Option<Material>> {
        Ok(self.catalog.read().materials.get(id))
    }

    async fn get_operation(&self, id: Id) -> Result<Option<Operation>> {
        Ok(self.catalog.read().operations.get(id))
    }

    async fn list_materials_of(&self, product_id: Id) -> Result<Vec<MaterialToProduct>> {
        Ok(self.catalog.read().materials_of(product_id))
    }

    async fn list_operations_of(&self, product_id: Id) -> Result<Vec<OperationToProduct>> {
        Ok(self.catalog.read().operations_of(product_id))
    }

    async fn list_sub_products_of(&self, product_id: Id) -> Result<Vec<ProductToProduct>> {
        Ok(self.catalog.read().sub_products_of(product_id))
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemorySnapshot {
    async fn get_product(&self, id: Id) -> Result<Option<Product>> {
        Ok(self.catalog.products.get(id))
    }

    async fn get_material(&self, id: Id) -> Result<Option<Material>> {
        Ok(self.catalog.materials.get(id))
    }

    async fn get_operation(&self, id: Id) -> Result<Option<Operation>> {
        Ok(self.catalog.operations.get(id))
    }

    async fn list_materials_of(&self, product_id: Id) -> Result<Vec<MaterialToProduct>> {
        Ok(self.catalog.materials_of(product_id))
    }

    async fn list_operations_of(&self, product_id: Id) -> Result<Vec<OperationToProduct>> {
        Ok(self.catalog.operations_of(product_id))
    }

    async fn list_sub_products_of(&self, product_id: Id) -> Result<Vec<ProductToProduct>> {
        Ok(self.catalog.sub_products_of(product_id))
    }
}

#[async_trait::async_trait]
impl SnapshotSource for MemoryStore {
    type Snapshot = MemorySnapshot;

    async fn snapshot(&self) -> Result<MemorySnapshot> {
        let catalog = self.catalog.read().clone();
        Ok(MemorySnapshot {
            catalog: Arc::new(catalog),
        })
    }
}

#[async_trait::async_trait]
impl CatalogWriter for MemoryStore {
    async fn create_product(&self, product: Product) -> Result<Product> {
        self.catalog.write().products.insert(product)
    }

    async fn create_material(&self, material: Material) -> Result<Material> {
        self.catalog.write().materials.insert(material)
    }

    async fn create_operation(&self, operation: Operation) -> Result<Operation> {
        self.catalog.write().operations.insert(operation)
    }

    async fn create_material_to_product(&self, row: MaterialToProduct) -> Result<MaterialToProduct> {
        let mut catalog = self.catalog.write();
        if !catalog.products.rows.contains_key(&row.product_id) {
            bail!("Product {} does not exist", row.product_id);
        }
        catalog.material_to_product.insert(row)
    }

    async fn create_operation_to_product(&self, row: OperationToProduct) -> Result<OperationToProduct> {
        let mut catalog = self.catalog.write();
        if !catalog.products.rows.contains_key(&row.product_id) {
            bail!("Product {} does not exist", row.product_id);
        }
        catalog.operation_to_product.insert(row)
    }

    async fn create_product_to_product(&self, row: ProductToProduct) -> Result<ProductToProduct> {
        let mut catalog = self.catalog.write();
        if !catalog.products.rows.contains_key(&row.product_id) {
            bail!("Product {} does not exist", row.product_id);
        }
        catalog.product_to_product.insert(row)
    }
}

#[async_trait::async_trait]
impl OrderLedger for MemoryStore {
    async fn create_ordering(&self, ordering: Ordering) -> Result<Ordering> {
        self.ledger.write().orderings.insert(ordering)
    }

    async fn get_ordering(&self, id: Id) -> Result<Option<Ordering>> {
        Ok(self.ledger.read().orderings.get(id))
    }

    async fn create_product_to_ordering(&self, row: ProductToOrdering) -> Result<ProductToOrdering> {
        let mut ledger = self.ledger.write();
        ledger.check_ordering(row.ordering_id)?;
        ledger.product_to_ordering.insert(row)
    }

    async fn get_product_to_ordering(&self, id: Id) -> Result<Option<ProductToOrdering>> {
        Ok(self.ledger.read().product_to_ordering.get(id))
    }

    async fn list_products_for_ordering(&self, ordering_id: Id) -> Result<Vec<ProductToOrdering>> {
        Ok(self
            .ledger
            .read()
            .product_to_ordering
            .select(|row| row.ordering_id == ordering_id))
    }

    async fn create_material_to_ordering(&self, row: MaterialToOrdering) -> Result<MaterialToOrdering> {
        let mut ledger = self.ledger.write();
        ledger.check_line_item(row.ordering_id, row.product_to_ordering_id)?;
        ledger.material_to_ordering.insert(row)
    }

    async fn list_materials_for_ordering(&self, ordering_id: Id) -> Result<Vec<MaterialToOrdering>> {
        Ok(self
            .ledger
            .read()
            .material_to_ordering
            .select(|row| row.ordering_id == ordering_id))
    }

    async fn create_operation_to_ordering(&self, row: OperationToOrdering) -> Result<OperationToOrdering> {
        let mut ledger = self.ledger.write();
        ledger.check_line_item(row.ordering_id, row.product_to_ordering_id)?;
        ledger.operation_to_ordering.insert(row)
    }

    async fn list_operations_for_ordering(&self, ordering_id: Id) -> Result<Vec<OperationToOrdering>> {
        Ok(self
            .ledger
            .read()
            .operation_to_ordering
            .select(|row| row.ordering_id == ordering_id))
    }

    /// Applies the whole plan under one write lock; nothing is kept on failure
    async fn record_materialization(&self, plan: MaterializationPlan) -> Result<MaterializationPlan> {
        let mut ledger = self.ledger.write();
        for row in &plan.materials {
            ledger.check_line_item(row.ordering_id, row.product_to_ordering_id)?;
        }
        for row in &plan.operations {
            ledger.check_line_item(row.ordering_id, row.product_to_ordering_id)?;
        }

        let materials = ledger.material_to_ordering.stage(plan.materials)?;
        let operations = ledger.operation_to_ordering.stage(plan.operations)?;
        ledger.material_to_ordering.commit(&materials);
        ledger.operation_to_ordering.commit(&operations);

        Ok(MaterializationPlan {
            materials,
            operations,
        })
    }

    /// The link and its line items become visible together or not at all
    async fn record_link_with_materialization(
        &self,
        link: ProductToOrdering,
        mut plan: MaterializationPlan,
    ) -> Result<(ProductToOrdering, MaterializationPlan)> {
        let mut ledger = self.ledger.write();
        ledger.check_ordering(link.ordering_id)?;
        let link = ledger.product_to_ordering.stage_one(link)?;

        plan.attach_to(link.id);
        for row in &plan.materials {
            ledger.check_ordering(row.ordering_id)?;
        }
        for row in &plan.operations {
            ledger.check_ordering(row.ordering_id)?;
        }
        let materials = ledger.material_to_ordering.stage(plan.materials)?;
        let operations = ledger.operation_to_ordering.stage(plan.operations)?;

        ledger.product_to_ordering.commit(std::slice::from_ref(&link));
        ledger.material_to_ordering.commit(&materials);
        ledger.operation_to_ordering.commit(&operations);

        Ok((
            link,
            MaterializationPlan {
                materials,
                operations,
            },
        ))
    }
}
