use crate::logic::Materializer;
use crate::model::{
    Id, Material, MaterialToProduct, Operation, OperationToProduct, Ordering, Product,
    ProductToOrdering, ProductToProduct, LINEAR_MEASURE_ID, SQUARE_MEASURE_ID,
};
use crate::store::traits::Store;
use anyhow::{Context, Result};

/// Ids of the demo records, as assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct SeedCatalog {
    pub calendar: Id,
    pub calendar_cover: Id,
    pub calendar_page: Id,
    pub roll_up_banner: Id,
    pub banner_print: Id,
    pub demo_ordering: Id,
    pub demo_product_link: Id,
}

/// Load a small print-shop catalog and one demo order into the store.
///
/// The calendar is a three-level tree (calendar, cover and pages) with an
/// alternative "matte" list on the cover; the roll-up banner is a sized
/// product whose frame is linear-measured and whose print is square-measured.
pub async fn load_seed_data<S: Store>(store: &S) -> Result<SeedCatalog> {
    let materials = load_materials(store).await?;
    let operations = load_operations(store).await?;

    let calendar_page = product(store, "Calendar page", 2.5).await?;
    bind_material(store, calendar_page, materials.coated_paper, 1.0, 0.12).await?;
    bind_operation(store, calendar_page, operations.digital_print, 1.0, 0.2, None).await?;
    bind_operation(store, calendar_page, operations.cutting, 1.0, 0.1, None).await?;

    let calendar_cover = product(store, "Calendar cover", 4.0).await?;
    bind_material(store, calendar_cover, materials.cardboard, 1.0, 0.35).await?;
    bind_material(store, calendar_cover, materials.gloss_film, 0.09, 0.8).await?;
    bind_operation(store, calendar_cover, operations.digital_print, 1.0, 0.2, None).await?;
    bind_operation(store, calendar_cover, operations.lamination, 1.0, 0.6, Some((3, 0.15)))
        .await?;
    store
        .create_material_to_product(
            MaterialToProduct::new(calendar_cover, materials.matte_film, 0.09, 0.7).in_list("matte"),
        )
        .await?;

    let calendar = product(store, "Wall calendar", 45.0).await?;
    bind_material(store, calendar, materials.spiral_wire, 1.0, 0.05).await?;
    bind_operation(store, calendar, operations.spiral_binding, 1.0, 0.9, Some((4, 0.3))).await?;
    store
        .create_product_to_product(ProductToProduct::new(calendar, calendar_cover, 1.0))
        .await?;
    store
        .create_product_to_product(ProductToProduct::new(calendar, calendar_page, 12.0))
        .await?;

    let banner_print = product(store, "Banner print", 30.0).await?;
    bind_material(store, banner_print, materials.banner_vinyl, 1.0, 6.0).await?;
    bind_operation(store, banner_print, operations.wide_format_print, 1.0, 5.0, Some((2, 1.2)))
        .await?;

    let roll_up_banner = product(store, "Roll-up banner", 120.0).await?;
    bind_material(store, roll_up_banner, materials.aluminium_profile, 1.0, 4.5).await?;
    bind_operation(store, roll_up_banner, operations.frame_assembly, 1.0, 3.0, None).await?;
    store
        .create_operation_to_product(OperationToProduct {
            add_to_price: true,
            ..OperationToProduct::new(roll_up_banner, operations.packing, 1.0, 1.5)
        })
        .await?;
    store
        .create_product_to_product(ProductToProduct::new(roll_up_banner, banner_print, 1.0))
        .await?;

    let ordering = store
        .create_ordering(Ordering::new(0, "Demo order", 500.0, 15.0))
        .await
        .context("Failed to create demo ordering")?;
    let link = store
        .create_product_to_ordering(ProductToOrdering::new(ordering.id, calendar, 1, 25.0))
        .await
        .context("Failed to place demo product on ordering")?;
    Materializer::default().materialize(store, store, link.clone()).await?;

    log::info!(
        "Seeded print-shop catalog: calendar {}, roll-up banner {}, demo ordering {}",
        calendar,
        roll_up_banner,
        ordering.id
    );

    Ok(SeedCatalog {
        calendar,
        calendar_cover,
        calendar_page,
        roll_up_banner,
        banner_print,
        demo_ordering: ordering.id,
        demo_product_link: link.id,
    })
}

struct SeedMaterials {
    coated_paper: Id,
    cardboard: Id,
    gloss_film: Id,
    matte_film: Id,
    spiral_wire: Id,
    banner_vinyl: Id,
    aluminium_profile: Id,
}

struct SeedOperations {
    digital_print: Id,
    cutting: Id,
    lamination: Id,
    spiral_binding: Id,
    wide_format_print: Id,
    frame_assembly: Id,
    packing: Id,
}

async fn load_materials<S: Store>(store: &S) -> Result<SeedMaterials> {
    let create = |material: Material| async move {
        let name = material.name.clone();
        store
            .create_material(material)
            .await
            .map(|m| m.id)
            .with_context(|| format!("Failed to seed material {}", name))
    };

    Ok(SeedMaterials {
        coated_paper: create(Material::new(0, "Coated paper 130g A3", 0.12)).await?,
        cardboard: create(Material::new(0, "Cardboard 300g A3", 0.35)).await?,
        gloss_film: create(Material::new(0, "Gloss laminate film", 0.8).with_measure(SQUARE_MEASURE_ID))
            .await?,
        matte_film: create(Material::new(0, "Matte laminate film", 0.7).with_measure(SQUARE_MEASURE_ID))
            .await?,
        spiral_wire: create(Material::new(0, "Spiral wire 3:1", 0.05)).await?,
        banner_vinyl: create(Material::new(0, "Banner vinyl 440g", 6.0).with_measure(SQUARE_MEASURE_ID))
            .await?,
        aluminium_profile: create(
            Material::new(0, "Aluminium profile", 4.5).with_measure(LINEAR_MEASURE_ID),
        )
        .await?,
    })
}

async fn load_operations<S: Store>(store: &S) -> Result<SeedOperations> {
    let create = |operation: Operation| async move {
        let name = operation.name.clone();
        store
            .create_operation(operation)
            .await
            .map(|o| o.id)
            .with_context(|| format!("Failed to seed operation {}", name))
    };

    Ok(SeedOperations {
        digital_print: create(Operation::new(0, "Digital print", 0.5, 0.2)).await?,
        cutting: create(Operation::new(0, "Guillotine cutting", 0.3, 0.1)).await?,
        lamination: create(Operation::new(0, "Lamination", 1.2, 0.6)).await?,
        spiral_binding: create(Operation::new(0, "Spiral binding", 2.0, 0.9)).await?,
        wide_format_print: create(Operation::new(0, "Wide-format print", 12.0, 5.0)).await?,
        frame_assembly: create(
            Operation::new(0, "Frame assembly", 8.0, 3.0).with_measure(LINEAR_MEASURE_ID),
        )
        .await?,
        packing: create(Operation::new(0, "Packing", 3.0, 1.5)).await?,
    })
}

async fn product<S: Store>(store: &S, name: &str, price: f64) -> Result<Id> {
    let product = store
        .create_product(Product {
            price,
            ..Product::new(0, name)
        })
        .await
        .with_context(|| format!("Failed to seed product {}", name))?;
    Ok(product.id)
}

async fn bind_material<S: Store>(
    store: &S,
    product_id: Id,
    material_id: Id,
    number: f64,
    cost: f64,
) -> Result<()> {
    store
        .create_material_to_product(MaterialToProduct::new(product_id, material_id, number, cost))
        .await?;
    Ok(())
}

async fn bind_operation<S: Store>(
    store: &S,
    product_id: Id,
    operation_id: Id,
    number: f64,
    cost: f64,
    equipment: Option<(Id, f64)>,
) -> Result<()> {
    let mut row = OperationToProduct::new(product_id, operation_id, number, cost);
    if let Some((equipment_id, equipment_cost)) = equipment {
        row = row.with_equipment(equipment_id, equipment_cost);
    }
    store.create_operation_to_product(row).await?;
    Ok(())
}
