use anyhow::{Context, Result};
use sqlx::postgres::{PgExecutor, PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tokio::sync::Mutex;

use crate::model::{
    Id, Material, MaterialToOrdering, MaterialToProduct, MaterializationPlan, Operation,
    OperationToOrdering, OperationToProduct, Ordering, Product, ProductToOrdering,
    ProductToProduct,
};
use crate::store::traits::{CatalogStore, CatalogWriter, OrderLedger, SnapshotSource};

const PRODUCT_COLUMNS: &str =
    "id, name, product_group_id, measure_id, price, cost, min_cost, is_active";
const MATERIAL_COLUMNS: &str = "id, name, measure_id, price, cost, is_active";
const OPERATION_COLUMNS: &str = "id, name, measure_id, price, cost, is_active";
const MATERIAL_TO_PRODUCT_COLUMNS: &str =
    "id, product_id, material_id, list_name, number, cost, add_to_price, is_active";
const OPERATION_TO_PRODUCT_COLUMNS: &str = "id, product_id, operation_id, list_name, number, cost, equipment_id, equipment_cost, add_to_price, is_active";
const PRODUCT_TO_PRODUCT_COLUMNS: &str =
    "id, product_id, product2_id, list_name, number, is_active";
const ORDERING_COLUMNS: &str = "id, name, price, persent, cost, is_active";
const PRODUCT_TO_ORDERING_COLUMNS: &str = "id, ordering_id, product_id, user_id, number, width, length, pieces, price, cost, is_active";
const MATERIAL_TO_ORDERING_COLUMNS: &str = "id, ordering_id, material_id, product_to_ordering_id, user_id, width, length, pieces, color_id, number, price, persent, profit, cost, comm, is_active";
const OPERATION_TO_ORDERING_COLUMNS: &str = "id, ordering_id, operation_id, product_to_ordering_id, user_id, number, price, user_sum, cost, equipment_id, equipment_cost, comm, is_done, is_active";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Catalog reads bound to one `REPEATABLE READ` transaction
pub struct PostgresSnapshot {
    tx: Mutex<Transaction<'static, Postgres>>,
}

fn product_from_row(row: &PgRow) -> Product {
    Product {
        id: row.get("id"),
        name: row.get("name"),
        product_group_id: row.get("product_group_id"),
        measure_id: row.get("measure_id"),
        price: row.get("price"),
        cost: row.get("cost"),
        min_cost: row.get("min_cost"),
        is_active: row.get("is_active"),
    }
}

fn material_from_row(row: &PgRow) -> Material {
    Material {
        id: row.get("id"),
        name: row.get("name"),
        measure_id: row.get("measure_id"),
        price: row.get("price"),
        cost: row.get("cost"),
        is_active: row.get("is_active"),
    }
}

fn operation_from_row(row: &PgRow) -> Operation {
    Operation {
        id: row.get("id"),
        name: row.get("name"),
        measure_id: row.get("measure_id"),
        price: row.get("price"),
        cost: row.get("cost"),
        is_active: row.get("is_active"),
    }
}

fn material_to_product_from_row(row: &PgRow) -> MaterialToProduct {
    MaterialToProduct {
        id: row.get("id"),
        product_id: row.get("product_id"),
        material_id: row.get("material_id"),
        list_name: row.get("list_name"),
        number: row.get("number"),
        cost: row.get("cost"),
        add_to_price: row.get("add_to_price"),
        is_active: row.get("is_active"),
    }
}

fn operation_to_product_from_row(row: &PgRow) -> OperationToProduct {
    OperationToProduct {
        id: row.get("id"),
        product_id: row.get("product_id"),
        operation_id: row.get("operation_id"),
        list_name: row.get("list_name"),
        number: row.get("number"),
        cost: row.get("cost"),
        equipment_id: row.get("equipment_id"),
        equipment_cost: row.get("equipment_cost"),
        add_to_price: row.get("add_to_price"),
        is_active: row.get("is_active"),
    }
}

fn product_to_product_from_row(row: &PgRow) -> ProductToProduct {
    ProductToProduct {
        id: row.get("id"),
        product_id: row.get("product_id"),
        product2_id: row.get("product2_id"),
        list_name: row.get("list_name"),
        number: row.get("number"),
        is_active: row.get("is_active"),
    }
}

fn ordering_from_row(row: &PgRow) -> Ordering {
    Ordering {
        id: row.get("id"),
        name: row.get("name"),
        price: row.get("price"),
        persent: row.get("persent"),
        cost: row.get("cost"),
        is_active: row.get("is_active"),
    }
}

fn product_to_ordering_from_row(row: &PgRow) -> ProductToOrdering {
    ProductToOrdering {
        id: row.get("id"),
        ordering_id: row.get("ordering_id"),
        product_id: row.get("product_id"),
        user_id: row.get("user_id"),
        number: row.get("number"),
        width: row.get("width"),
        length: row.get("length"),
        pieces: row.get("pieces"),
        price: row.get("price"),
        cost: row.get("cost"),
        is_active: row.get("is_active"),
    }
}

fn material_to_ordering_from_row(row: &PgRow) -> MaterialToOrdering {
    MaterialToOrdering {
        id: row.get("id"),
        ordering_id: row.get("ordering_id"),
        material_id: row.get("material_id"),
        product_to_ordering_id: row.get("product_to_ordering_id"),
        user_id: row.get("user_id"),
        width: row.get("width"),
        length: row.get("length"),
        pieces: row.get("pieces"),
        color_id: row.get("color_id"),
        number: row.get("number"),
        price: row.get("price"),
        persent: row.get("persent"),
        profit: row.get("profit"),
        cost: row.get("cost"),
        comm: row.get("comm"),
        is_active: row.get("is_active"),
    }
}

fn operation_to_ordering_from_row(row: &PgRow) -> OperationToOrdering {
    OperationToOrdering {
        id: row.get("id"),
        ordering_id: row.get("ordering_id"),
        operation_id: row.get("operation_id"),
        product_to_ordering_id: row.get("product_to_ordering_id"),
        user_id: row.get("user_id"),
        number: row.get("number"),
        price: row.get("price"),
        user_sum: row.get("user_sum"),
        cost: row.get("cost"),
        equipment_id: row.get("equipment_id"),
        equipment_cost: row.get("equipment_cost"),
        comm: row.get("comm"),
        is_done: row.get("is_done"),
        is_active: row.get("is_active"),
    }
}

// Catalog queries shared by the pool and snapshot transactions

async fn fetch_product<'e>(executor: impl PgExecutor<'e>, id: Id) -> Result<Option<Product>> {
    let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
        .context("Failed to fetch product")?;
    Ok(row.as_ref().map(product_from_row))
}

async fn fetch_material<'e>(executor: impl PgExecutor<'e>, id: Id) -> Result<Option<Material>> {
    let row = sqlx::query(&format!("SELECT {MATERIAL_COLUMNS} FROM material WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
        .context("Failed to fetch material")?;
    Ok(row.as_ref().map(material_from_row))
}

async fn fetch_operation<'e>(executor: impl PgExecutor<'e>, id: Id) -> Result<Option<Operation>> {
    let row = sqlx::query(&format!("SELECT {OPERATION_COLUMNS} FROM operation WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
        .context("Failed to fetch operation")?;
    Ok(row.as_ref().map(operation_from_row))
}

async fn fetch_materials_of<'e>(
    executor: impl PgExecutor<'e>,
    product_id: Id,
) -> Result<Vec<MaterialToProduct>> {
    let rows = sqlx::query(&format!(
        "SELECT {MATERIAL_TO_PRODUCT_COLUMNS} FROM material_to_product WHERE product_id = $1 AND is_active ORDER BY id"
    ))
    .bind(product_id)
    .fetch_all(executor)
    .await
    .context("Failed to list material bindings")?;
    Ok(rows.iter().map(material_to_product_from_row).collect())
}

async fn fetch_operations_of<'e>(
    executor: impl PgExecutor<'e>,
    product_id: Id,
) -> Result<Vec<OperationToProduct>> {
    let rows = sqlx::query(&format!(
        "SELECT {OPERATION_TO_PRODUCT_COLUMNS} FROM operation_to_product WHERE product_id = $1 AND is_active ORDER BY id"
    ))
    .bind(product_id)
    .fetch_all(executor)
    .await
    .context("Failed to list operation bindings")?;
    Ok(rows.iter().map(operation_to_product_from_row).collect())
}

async fn fetch_sub_products_of<'e>(
    executor: impl PgExecutor<'e>,
    product_id: Id,
) -> Result<Vec<ProductToProduct>> {
    let rows = sqlx::query(&format!(
        "SELECT {PRODUCT_TO_PRODUCT_COLUMNS} FROM product_to_product WHERE product_id = $1 AND is_active ORDER BY id"
    ))
    .bind(product_id)
    .fetch_all(executor)
    .await
    .context("Failed to list sub-product bindings")?;
    Ok(rows.iter().map(product_to_product_from_row).collect())
}

// Line-item inserts shared by single writes and the materialization transaction

async fn insert_product_to_ordering<'e>(
    executor: impl PgExecutor<'e>,
    mut link: ProductToOrdering,
) -> Result<ProductToOrdering> {
    let row = sqlx::query(
        r#"
        INSERT INTO product_to_ordering (ordering_id, product_id, user_id, number, width, length,
                                         pieces, price, cost, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(link.ordering_id)
    .bind(link.product_id)
    .bind(link.user_id)
    .bind(link.number)
    .bind(link.width)
    .bind(link.length)
    .bind(link.pieces)
    .bind(link.price)
    .bind(link.cost)
    .bind(link.is_active)
    .fetch_one(executor)
    .await
    .context("Failed to create product link")?;

    link.id = row.get("id");
    Ok(link)
}

async fn insert_material_to_ordering<'e>(
    executor: impl PgExecutor<'e>,
    mut row: MaterialToOrdering,
) -> Result<MaterialToOrdering> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO material_to_ordering (ordering_id, material_id, product_to_ordering_id, user_id,
                                          width, length, pieces, color_id, number, price, persent,
                                          profit, cost, comm, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING id
        "#,
    )
    .bind(row.ordering_id)
    .bind(row.material_id)
    .bind(row.product_to_ordering_id)
    .bind(row.user_id)
    .bind(row.width)
    .bind(row.length)
    .bind(row.pieces)
    .bind(row.color_id)
    .bind(row.number)
    .bind(row.price)
    .bind(row.persent)
    .bind(row.profit)
    .bind(row.cost)
    .bind(&row.comm)
    .bind(row.is_active)
    .fetch_one(executor)
    .await
    .context("Failed to create material line item")?;

    row.id = inserted.get("id");
    Ok(row)
}

async fn insert_operation_to_ordering<'e>(
    executor: impl PgExecutor<'e>,
    mut row: OperationToOrdering,
) -> Result<OperationToOrdering> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO operation_to_ordering (ordering_id, operation_id, product_to_ordering_id, user_id,
                                           number, price, user_sum, cost, equipment_id,
                                           equipment_cost, comm, is_done, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING id
        "#,
    )
    .bind(row.ordering_id)
    .bind(row.operation_id)
    .bind(row.product_to_ordering_id)
    .bind(row.user_id)
    .bind(row.number)
    .bind(row.price)
    .bind(row.user_sum)
    .bind(row.cost)
    .bind(row.equipment_id)
    .bind(row.equipment_cost)
    .bind(&row.comm)
    .bind(row.is_done)
    .bind(row.is_active)
    .fetch_one(executor)
    .await
    .context("Failed to create operation line item")?;

    row.id = inserted.get("id");
    Ok(row)
}

#[async_trait::async_trait]
impl CatalogStore for PostgresStore {
    async fn get_product(&self, id: Id) -> Result<Option<Product>> {
        fetch_product(&self.pool, id).await
    }

    async fn get_material(&self, id: Id) -> Result<Option<Material>> {
        fetch_material(&self.pool, id).await
    }

    async fn get_operation(&self, id: Id) -> Result<Option<Operation>> {
        fetch_operation(&self.pool, id).await
    }

    async fn list_materials_of(&self, product_id: Id) -> Result<Vec<MaterialToProduct>> {
        fetch_materials_of(&self.pool, product_id).await
    }

    async fn list_operations_of(&self, product_id: Id) -> Result<Vec<OperationToProduct>> {
        fetch_operations_of(&self.pool, product_id).await
    }

    async fn list_sub_products_of(&self, product_id: Id) -> Result<Vec<ProductToProduct>> {
        fetch_sub_products_of(&self.pool, product_id).await
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresSnapshot {
    async fn get_product(&self, id: Id) -> Result<Option<Product>> {
        let mut tx = self.tx.lock().await;
        fetch_product(&mut **tx, id).await
    }

    async fn get_material(&self, id: Id) -> Result<Option<Material>> {
        let mut tx = self.tx.lock().await;
        fetch_material(&mut **tx, id).await
    }

    async fn get_operation(&self, id: Id) -> Result<Option<Operation>> {
        let mut tx = self.tx.lock().await;
        fetch_operation(&mut **tx, id).await
    }

    async fn list_materials_of(&self, product_id: Id) -> Result<Vec<MaterialToProduct>> {
        let mut tx = self.tx.lock().await;
        fetch_materials_of(&mut **tx, product_id).await
    }

    async fn list_operations_of(&self, product_id: Id) -> Result<Vec<OperationToProduct>> {
        let mut tx = self.tx.lock().await;
        fetch_operations_of(&mut **tx, product_id).await
    }

    async fn list_sub_products_of(&self, product_id: Id) -> Result<Vec<ProductToProduct>> {
        let mut tx = self.tx.lock().await;
        fetch_sub_products_of(&mut **tx, product_id).await
    }
}

#[async_trait::async_trait]
impl SnapshotSource for PostgresStore {
    type Snapshot = PostgresSnapshot;

    /// The transaction is read-only and rolls back when the snapshot is dropped
    async fn snapshot(&self) -> Result<PostgresSnapshot> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin snapshot transaction")?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .context("Failed to set snapshot isolation")?;

        Ok(PostgresSnapshot { tx: Mutex::new(tx) })
    }
}

#[async_trait::async_trait]
impl CatalogWriter for PostgresStore {
    async fn create_product(&self, mut product: Product) -> Result<Product> {
        let row = sqlx::query(
            r#"
            INSERT INTO product (name, product_group_id, measure_id, price, cost, min_cost, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(product.product_group_id)
        .bind(product.measure_id)
        .bind(product.price)
        .bind(product.cost)
        .bind(product.min_cost)
        .bind(product.is_active)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create product")?;

        product.id = row.get("id");
        Ok(product)
    }

    async fn create_material(&self, mut material: Material) -> Result<Material> {
        let row = sqlx::query(
            r#"
            INSERT INTO material (name, measure_id, price, cost, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&material.name)
        .bind(material.measure_id)
        .bind(material.price)
        .bind(material.cost)
        .bind(material.is_active)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create material")?;

        material.id = row.get("id");
        Ok(material)
    }

    async fn create_operation(&self, mut operation: Operation) -> Result<Operation> {
        let row = sqlx::query(
            r#"
            INSERT INTO operation (name, measure_id, price, cost, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&operation.name)
        .bind(operation.measure_id)
        .bind(operation.price)
        .bind(operation.cost)
        .bind(operation.is_active)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create operation")?;

        operation.id = row.get("id");
        Ok(operation)
    }

    async fn create_material_to_product(&self, mut binding: MaterialToProduct) -> Result<MaterialToProduct> {
        let row = sqlx::query(
            r#"
            INSERT INTO material_to_product (product_id, material_id, list_name, number, cost, add_to_price, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(binding.product_id)
        .bind(binding.material_id)
        .bind(&binding.list_name)
        .bind(binding.number)
        .bind(binding.cost)
        .bind(binding.add_to_price)
        .bind(binding.is_active)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create material binding")?;

        binding.id = row.get("id");
        Ok(binding)
    }

    async fn create_operation_to_product(&self, mut binding: OperationToProduct) -> Result<OperationToProduct> {
        let row = sqlx::query(
            r#"
            INSERT INTO operation_to_product (product_id, operation_id, list_name, number, cost,
                                              equipment_id, equipment_cost, add_to_price, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(binding.product_id)
        .bind(binding.operation_id)
        .bind(&binding.list_name)
        .bind(binding.number)
        .bind(binding.cost)
        .bind(binding.equipment_id)
        .bind(binding.equipment_cost)
        .bind(binding.add_to_price)
        .bind(binding.is_active)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create operation binding")?;

        binding.id = row.get("id");
        Ok(binding)
    }

    async fn create_product_to_product(&self, mut binding: ProductToProduct) -> Result<ProductToProduct> {
        let row = sqlx::query(
            r#"
            INSERT INTO product_to_product (product_id, product2_id, list_name, number, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(binding.product_id)
        .bind(binding.product2_id)
        .bind(&binding.list_name)
        .bind(binding.number)
        .bind(binding.is_active)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create sub-product binding")?;

        binding.id = row.get("id");
        Ok(binding)
    }
}

#[async_trait::async_trait]
impl OrderLedger for PostgresStore {
    async fn create_ordering(&self, mut ordering: Ordering) -> Result<Ordering> {
        let row = sqlx::query(
            r#"
            INSERT INTO ordering (name, price, persent, cost, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&ordering.name)
        .bind(ordering.price)
        .bind(ordering.persent)
        .bind(ordering.cost)
        .bind(ordering.is_active)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create ordering")?;

        ordering.id = row.get("id");
        Ok(ordering)
    }

    async fn get_ordering(&self, id: Id) -> Result<Option<Ordering>> {
        let row = sqlx::query(&format!("SELECT {ORDERING_COLUMNS} FROM ordering WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch ordering")?;
        Ok(row.as_ref().map(ordering_from_row))
    }

    async fn create_product_to_ordering(&self, link: ProductToOrdering) -> Result<ProductToOrdering> {
        insert_product_to_ordering(&self.pool, link).await
    }

    async fn get_product_to_ordering(&self, id: Id) -> Result<Option<ProductToOrdering>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_TO_ORDERING_COLUMNS} FROM product_to_ordering WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch product link")?;
        Ok(row.as_ref().map(product_to_ordering_from_row))
    }

    async fn list_products_for_ordering(&self, ordering_id: Id) -> Result<Vec<ProductToOrdering>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_TO_ORDERING_COLUMNS} FROM product_to_ordering WHERE ordering_id = $1 ORDER BY id"
        ))
        .bind(ordering_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list product links")?;
        Ok(rows.iter().map(product_to_ordering_from_row).collect())
    }

    async fn create_material_to_ordering(&self, row: MaterialToOrdering) -> Result<MaterialToOrdering> {
        insert_material_to_ordering(&self.pool, row).await
    }

    async fn list_materials_for_ordering(&self, ordering_id: Id) -> Result<Vec<MaterialToOrdering>> {
        let rows = sqlx::query(&format!(
            "SELECT {MATERIAL_TO_ORDERING_COLUMNS} FROM material_to_ordering WHERE ordering_id = $1 ORDER BY id"
        ))
        .bind(ordering_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list material line items")?;
        Ok(rows.iter().map(material_to_ordering_from_row).collect())
    }

    async fn create_operation_to_ordering(&self, row: OperationToOrdering) -> Result<OperationToOrdering> {
        insert_operation_to_ordering(&self.pool, row).await
    }

    async fn list_operations_for_ordering(&self, ordering_id: Id) -> Result<Vec<OperationToOrdering>> {
        let rows = sqlx::query(&format!(
            "SELECT {OPERATION_TO_ORDERING_COLUMNS} FROM operation_to_ordering WHERE ordering_id = $1 ORDER BY id"
        ))
        .bind(ordering_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list operation line items")?;
        Ok(rows.iter().map(operation_to_ordering_from_row).collect())
    }

    /// All line items go in one transaction; a failure rolls every row back
    async fn record_materialization(&self, plan: MaterializationPlan) -> Result<MaterializationPlan> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin materialization transaction")?;

        let recorded = insert_plan(&mut tx, plan).await?;

        tx.commit()
            .await
            .context("Failed to commit materialization")?;
        Ok(recorded)
    }

    /// The link and its line items share one transaction
    async fn record_link_with_materialization(
        &self,
        link: ProductToOrdering,
        mut plan: MaterializationPlan,
    ) -> Result<(ProductToOrdering, MaterializationPlan)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin materialization transaction")?;

        let link = insert_product_to_ordering(&mut *tx, link).await?;
        plan.attach_to(link.id);
        let recorded = insert_plan(&mut tx, plan).await?;

        tx.commit()
            .await
            .context("Failed to commit product link")?;
        Ok((link, recorded))
    }
}

async fn insert_plan(
    tx: &mut Transaction<'static, Postgres>,
    plan: MaterializationPlan,
) -> Result<MaterializationPlan> {
    let mut recorded = MaterializationPlan::default();
    for row in plan.materials {
        recorded
            .materials
            .push(insert_material_to_ordering(&mut **tx, row).await?);
    }
    for row in plan.operations {
        recorded
            .operations
            .push(insert_operation_to_ordering(&mut **tx, row).await?);
    }
    Ok(recorded)
}
