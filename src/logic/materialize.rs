use crate::error::{EngineError, EngineResult};
use crate::model::{
    Id, MaterialToOrdering, MaterialToProduct, MaterializationPlan, OperationToOrdering,
    OperationToProduct, ProductToOrdering, DEFAULT_LIST_NAME, LINEAR_MEASURE_ID,
    SQUARE_MEASURE_ID,
};
use crate::store::traits::{CatalogStore, OrderLedger};

/// Turns the default variant list of a product into order line items.
#[derive(Debug, Clone)]
pub struct Materializer {
    default_list_name: String,
    copy_center: bool,
}

impl Default for Materializer {
    fn default() -> Self {
        Self::new(DEFAULT_LIST_NAME, false)
    }
}

impl Materializer {
    pub fn new(default_list_name: impl Into<String>, copy_center: bool) -> Self {
        Self {
            default_list_name: default_list_name.into(),
            copy_center,
        }
    }

    /// Plan and persist the default line items for `link`, returning `link` as is.
    ///
    /// The batch is handed to the ledger in one call; whether a failure part way
    /// leaves earlier rows behind depends on the ledger.
    pub async fn materialize<C, L>(
        &self,
        catalog: &C,
        ledger: &L,
        link: ProductToOrdering,
    ) -> EngineResult<ProductToOrdering>
    where
        C: CatalogStore + ?Sized,
        L: OrderLedger + ?Sized,
    {
        let plan = self.plan(catalog, &link).await?;
        self.record(ledger, link, plan).await
    }

    /// Persist a plan made for an already stored link.
    pub async fn record<L: OrderLedger + ?Sized>(
        &self,
        ledger: &L,
        link: ProductToOrdering,
        plan: MaterializationPlan,
    ) -> EngineResult<ProductToOrdering> {
        let planned = plan.len();
        let recorded = ledger.record_materialization(plan).await?;
        debug_assert_eq!(planned, recorded.len());

        log_recorded(&link, &recorded);
        Ok(link)
    }

    /// Store a new link together with the plan made for it. Returns the
    /// stored link, carrying its assigned id.
    pub async fn record_new_link<L: OrderLedger + ?Sized>(
        &self,
        ledger: &L,
        link: ProductToOrdering,
        plan: MaterializationPlan,
    ) -> EngineResult<ProductToOrdering> {
        let planned = plan.len();
        let (link, recorded) = ledger.record_link_with_materialization(link, plan).await?;
        debug_assert_eq!(planned, recorded.len());

        log_recorded(&link, &recorded);
        Ok(link)
    }

    /// Compute the line items without writing anything.
    pub async fn plan<C: CatalogStore + ?Sized>(
        &self,
        catalog: &C,
        link: &ProductToOrdering,
    ) -> EngineResult<MaterializationPlan> {
        validate_link(link)?;
        let mut plan = MaterializationPlan::default();

        for row in catalog.list_materials_of(link.product_id).await? {
            if row.list_name != self.default_list_name {
                continue;
            }
            check_quantity("material binding", row.id, row.number)?;

            let dims = link.dimensions();
            let measure_id = if dims.is_sized() {
                catalog
                    .get_material(row.material_id)
                    .await?
                    .ok_or_else(|| EngineError::not_found("material", row.material_id))?
                    .measure_id
            } else {
                0
            };
            plan.materials.push(material_line_item(link, &row, measure_id));
        }

        for row in catalog.list_operations_of(link.product_id).await? {
            if row.list_name != self.default_list_name {
                continue;
            }
            check_quantity("operation binding", row.id, row.number)?;

            let operation = catalog
                .get_operation(row.operation_id)
                .await?
                .ok_or_else(|| EngineError::not_found("operation", row.operation_id))?;
            plan.operations.push(operation_line_item(
                link,
                &row,
                operation.measure_id,
                operation.price,
                self.copy_center,
            ));
        }

        log::debug!(
            "Planned {} line items for product link {}",
            plan.len(),
            link.id
        );
        Ok(plan)
    }
}

fn log_recorded(link: &ProductToOrdering, recorded: &MaterializationPlan) {
    log::info!(
        "Materialized product link {} (product {}, ordering {}): {} material and {} operation line items",
        link.id,
        link.product_id,
        link.ordering_id,
        recorded.materials.len(),
        recorded.operations.len()
    );
}

/// Per-row quantity factor for materials.
///
/// Fixed bindings count once per line. Sized products use the perimeter for
/// linear-measured materials; everything else scales with the ordered number.
pub fn base_multiplier(link: &ProductToOrdering, measure_id: Id, add_to_price: bool) -> f64 {
    if add_to_price {
        return 1.0;
    }
    let dims = link.dimensions();
    if dims.is_sized() && measure_id == LINEAR_MEASURE_ID {
        dims.perimeter_m()
    } else {
        link.number
    }
}

/// Per-row quantity factor for operations.
///
/// Unlike materials, an operation on a sized product only counts when it is
/// linear-measured; any other operation gets zero.
pub fn operation_multiplier(link: &ProductToOrdering, measure_id: Id, add_to_price: bool) -> f64 {
    if add_to_price {
        return 1.0;
    }
    let dims = link.dimensions();
    if !dims.is_sized() {
        link.number
    } else if measure_id == LINEAR_MEASURE_ID {
        dims.perimeter_m()
    } else {
        0.0
    }
}

fn material_line_item(
    link: &ProductToOrdering,
    row: &MaterialToProduct,
    measure_id: Id,
) -> MaterialToOrdering {
    let q = base_multiplier(link, measure_id, row.add_to_price);
    let number = q * row.number;
    let dims = link.dimensions();
    let (width, length, pieces) = if dims.is_sized() && measure_id == SQUARE_MEASURE_ID {
        (dims.width, dims.length, dims.pieces)
    } else {
        (0.0, 0.0, 1)
    };

    MaterialToOrdering {
        id: 0,
        ordering_id: link.ordering_id,
        material_id: row.material_id,
        product_to_ordering_id: link.id,
        user_id: link.user_id,
        width,
        length,
        pieces,
        color_id: 0,
        number,
        price: row.cost,
        persent: 0.0,
        profit: 0.0,
        cost: number * row.cost,
        comm: String::new(),
        is_active: true,
    }
}

fn operation_line_item(
    link: &ProductToOrdering,
    row: &OperationToProduct,
    measure_id: Id,
    live_price: f64,
    is_done: bool,
) -> OperationToOrdering {
    let q = operation_multiplier(link, measure_id, row.add_to_price);
    let number = q * row.number;

    OperationToOrdering {
        id: 0,
        ordering_id: link.ordering_id,
        operation_id: row.operation_id,
        product_to_ordering_id: link.id,
        user_id: link.user_id,
        number,
        price: row.cost,
        user_sum: q * live_price,
        cost: number * row.cost,
        equipment_id: row.equipment_id,
        equipment_cost: q * row.equipment_cost,
        comm: String::new(),
        is_done,
        is_active: true,
    }
}

pub(crate) fn validate_link(link: &ProductToOrdering) -> EngineResult<()> {
    check_quantity("product link", link.id, link.number)?;
    if !(link.width >= 0.0 && link.length >= 0.0) {
        return Err(EngineError::validation(format!(
            "product link {} has negative size {}x{}",
            link.id, link.width, link.length
        )));
    }
    if link.pieces < 0 {
        return Err(EngineError::validation(format!(
            "product link {} has negative pieces {}",
            link.id, link.pieces
        )));
    }
    Ok(())
}

fn check_quantity(what: &str, id: Id, number: f64) -> EngineResult<()> {
    if number >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::validation(format!(
            "{} {} has invalid quantity {}",
            what, id, number
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Material, Operation, Ordering, Product};
    use crate::store::traits::CatalogWriter;
    use crate::store::MemoryStore;

    struct Fixture {
        store: MemoryStore,
        link: ProductToOrdering,
    }

    async fn fixture(number: f64) -> Fixture {
        let store = MemoryStore::new();
        store.create_product(Product::new(1, "Poster")).await.unwrap();
        store.create_material(Material::new(10, "Paper", 5.0)).await.unwrap();
        store
            .create_operation(Operation::new(20, "Print", 10.0, 2.0))
            .await
            .unwrap();
        let ordering = store
            .create_ordering(Ordering::new(0, "Order", 0.0, 0.0))
            .await
            .unwrap();
        let link = store
            .create_product_to_ordering(ProductToOrdering::new(ordering.id, 1, 7, number))
            .await
            .unwrap();
        Fixture { store, link }
    }

    #[tokio::test]
    async fn test_material_arithmetic() {
        let f = fixture(3.0).await;
        f.store
            .create_material_to_product(MaterialToProduct::new(1, 10, 2.0, 5.0))
            .await
            .unwrap();

        Materializer::default()
            .materialize(&f.store, &f.store, f.link.clone())
            .await
            .unwrap();

        let items = f.store.list_materials_for_ordering(f.link.ordering_id).await.unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.number, 6.0);
        assert_eq!(item.cost, 30.0);
        assert_eq!(item.price, 5.0);
        assert_eq!(item.persent, 0.0);
        assert_eq!(item.profit, 0.0);
        assert_eq!(item.material_id, 10);
        assert_eq!(item.user_id, 7);
        assert_eq!(item.product_to_ordering_id, f.link.id);
    }

    #[tokio::test]
    async fn test_operation_arithmetic_uses_live_price_for_user_sum() {
        let f = fixture(4.0).await;
        f.store
            .create_operation_to_product(
                OperationToProduct::new(1, 20, 1.0, 2.0).with_equipment(3, 1.5),
            )
            .await
            .unwrap();

        Materializer::default()
            .materialize(&f.store, &f.store, f.link.clone())
            .await
            .unwrap();

        let items = f.store.list_operations_for_ordering(f.link.ordering_id).await.unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.number, 4.0);
        assert_eq!(item.price, 2.0);
        assert_eq!(item.cost, 8.0);
        assert_eq!(item.user_sum, 40.0);
        assert_eq!(item.equipment_id, 3);
        assert_eq!(item.equipment_cost, 6.0);
        assert!(!item.is_done);
    }

    #[tokio::test]
    async fn test_non_default_lists_are_skipped() {
        let f = fixture(2.0).await;
        f.store
            .create_material_to_product(MaterialToProduct::new(1, 10, 1.0, 5.0).in_list("alt1"))
            .await
            .unwrap();
        f.store
            .create_operation_to_product(OperationToProduct::new(1, 20, 1.0, 2.0).in_list("alt1"))
            .await
            .unwrap();

        let plan = Materializer::default().plan(&f.store, &f.link).await.unwrap();
        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn test_custom_default_list_name() {
        let f = fixture(1.0).await;
        f.store
            .create_material_to_product(MaterialToProduct::new(1, 10, 1.0, 5.0).in_list("standard"))
            .await
            .unwrap();

        let plan = Materializer::new("standard", false).plan(&f.store, &f.link).await.unwrap();
        assert_eq!(plan.materials.len(), 1);
    }

    #[tokio::test]
    async fn test_returns_link_unchanged() {
        let f = fixture(2.0).await;
        let returned = Materializer::default()
            .materialize(&f.store, &f.store, f.link.clone())
            .await
            .unwrap();
        assert_eq!(returned, f.link);
    }

    #[tokio::test]
    async fn test_copy_center_marks_operations_done() {
        let f = fixture(1.0).await;
        f.store
            .create_operation_to_product(OperationToProduct::new(1, 20, 1.0, 2.0))
            .await
            .unwrap();

        let plan = Materializer::new(DEFAULT_LIST_NAME, true).plan(&f.store, &f.link).await.unwrap();
        assert!(plan.operations[0].is_done);
    }

    #[tokio::test]
    async fn test_negative_binding_quantity_is_rejected_before_writing() {
        let f = fixture(1.0).await;
        f.store
            .create_material_to_product(MaterialToProduct::new(1, 10, 1.0, 5.0))
            .await
            .unwrap();
        f.store
            .create_operation_to_product(OperationToProduct::new(1, 20, -1.0, 2.0))
            .await
            .unwrap();

        let err = Materializer::default()
            .materialize(&f.store, &f.store, f.link.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(f
            .store
            .list_materials_for_ordering(f.link.ordering_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_negative_link_number_is_rejected() {
        let f = fixture(-2.0).await;
        let err = Materializer::default().plan(&f.store, &f.link).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_operation_is_not_found() {
        let f = fixture(1.0).await;
        f.store
            .create_operation_to_product(OperationToProduct::new(1, 404, 1.0, 2.0))
            .await
            .unwrap();

        let err = Materializer::default().plan(&f.store, &f.link).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { entity: "operation", id: 404 }));
    }

    #[tokio::test]
    async fn test_sized_product_uses_perimeter_for_linear_material() {
        let f = fixture(1.0).await;
        f.store
            .create_material(Material::new(11, "Frame", 4.0).with_measure(LINEAR_MEASURE_ID))
            .await
            .unwrap();
        f.store
            .create_material(Material::new(12, "Canvas", 9.0).with_measure(SQUARE_MEASURE_ID))
            .await
            .unwrap();
        f.store
            .create_material_to_product(MaterialToProduct::new(1, 11, 1.0, 4.0))
            .await
            .unwrap();
        f.store
            .create_material_to_product(MaterialToProduct::new(1, 12, 1.0, 9.0))
            .await
            .unwrap();
        let link = f.link.clone().sized(1000.0, 500.0, 2);

        let plan = Materializer::default().plan(&f.store, &link).await.unwrap();

        let frame = &plan.materials[0];
        assert_eq!(frame.number, 6.0);
        assert_eq!(frame.cost, 24.0);
        assert_eq!((frame.width, frame.length, frame.pieces), (0.0, 0.0, 1));

        let canvas = &plan.materials[1];
        assert_eq!(canvas.number, 1.0);
        assert_eq!((canvas.width, canvas.length, canvas.pieces), (1000.0, 500.0, 2));
    }

    #[test]
    fn test_fixed_binding_ignores_ordered_number() {
        let link = ProductToOrdering::new(1, 1, 1, 25.0);
        assert_eq!(base_multiplier(&link, 0, true), 1.0);
        assert_eq!(base_multiplier(&link, 0, false), 25.0);

        let sized = link.sized(200.0, 300.0, 1);
        assert_eq!(base_multiplier(&sized, LINEAR_MEASURE_ID, false), 1.0);
        assert_eq!(base_multiplier(&sized, SQUARE_MEASURE_ID, false), 25.0);
    }

    #[tokio::test]
    async fn test_sized_product_zeroes_non_linear_operations() {
        let f = fixture(3.0).await;
        f.store
            .create_operation(Operation::new(21, "Hemming", 8.0, 3.0).with_measure(LINEAR_MEASURE_ID))
            .await
            .unwrap();
        f.store
            .create_operation_to_product(OperationToProduct::new(1, 20, 1.0, 2.0).with_equipment(3, 1.5))
            .await
            .unwrap();
        f.store
            .create_operation_to_product(OperationToProduct::new(1, 21, 1.0, 3.0))
            .await
            .unwrap();
        let link = f.link.clone().sized(1000.0, 500.0, 1);

        let plan = Materializer::default().plan(&f.store, &link).await.unwrap();

        let print = &plan.operations[0];
        assert_eq!(print.number, 0.0);
        assert_eq!(print.cost, 0.0);
        assert_eq!(print.user_sum, 0.0);
        assert_eq!(print.equipment_cost, 0.0);

        let hemming = &plan.operations[1];
        assert_eq!(hemming.number, 3.0);
        assert_eq!(hemming.cost, 9.0);
        assert_eq!(hemming.user_sum, 24.0);
    }

    #[test]
    fn test_operation_multiplier_on_sized_link() {
        let sized = ProductToOrdering::new(1, 1, 1, 3.0).sized(1000.0, 500.0, 1);
        assert_eq!(operation_multiplier(&sized, LINEAR_MEASURE_ID, false), 3.0);
        assert_eq!(operation_multiplier(&sized, SQUARE_MEASURE_ID, false), 0.0);
        assert_eq!(operation_multiplier(&sized, 0, false), 0.0);
        assert_eq!(operation_multiplier(&sized, 0, true), 1.0);

        let unsized_link = ProductToOrdering::new(1, 1, 1, 3.0);
        assert_eq!(operation_multiplier(&unsized_link, 0, false), 3.0);
    }
}
