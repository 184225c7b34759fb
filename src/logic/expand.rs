use crate::error::{EngineError, EngineResult};
use crate::logic::grouping::{push_grouped, UidCounter};
use crate::model::{
    DeepComposition, FlatComposition, Grouped, Id, MaterialNode, OperationNode, Product,
    ProductNode, ProductToProduct,
};
use crate::store::traits::CatalogStore;
use indexmap::IndexSet;
use std::future::Future;
use std::pin::Pin;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub struct Expander;

impl Expander {
    /// One-level expansion: direct materials, operations and sub-product summaries,
    /// numbered from 1 in that order.
    pub async fn expand_flat<S: CatalogStore + ?Sized>(
        store: &S,
        product_id: Id,
    ) -> EngineResult<FlatComposition> {
        let product = Self::require_product(store, product_id).await?;
        let mut counter = UidCounter::new();

        let materials = Self::material_nodes(store, product.id, &mut counter).await?;
        let operations = Self::operation_nodes(store, product.id, &mut counter).await?;

        let mut products = Grouped::new();
        for row in store.list_sub_products_of(product.id).await? {
            let child = Self::require_product(store, row.product2_id).await?;
            let list_name = row.list_name.clone();
            push_grouped(
                &mut products,
                &list_name,
                ProductNode {
                    product: child,
                    product_to_product: Some(row),
                    uid: counter.next(),
                },
            );
        }

        log::debug!(
            "Flat expansion of product {} produced {} nodes",
            product.id,
            counter.peek() - 1
        );

        Ok(FlatComposition {
            product,
            materials,
            operations,
            products,
        })
    }

    /// Full composition tree. `counter` keeps running across the whole
    /// recursion; a sub-product that leads back to one of its ancestors fails
    /// with [`EngineError::CyclicComposition`].
    pub async fn expand_deep<S: CatalogStore + ?Sized>(
        store: &S,
        product_id: Id,
        counter: &mut UidCounter,
    ) -> EngineResult<DeepComposition> {
        let first_uid = counter.peek();
        let mut path = IndexSet::new();
        let tree = Self::expand_node(store, product_id, None, counter, &mut path).await?;

        log::debug!(
            "Deep expansion of product {} produced {} product nodes, uids {}..{}",
            product_id,
            tree.node_count(),
            first_uid,
            counter.peek() - 1
        );

        Ok(tree)
    }

    fn expand_node<'a, S: CatalogStore + ?Sized>(
        store: &'a S,
        product_id: Id,
        binding: Option<ProductToProduct>,
        counter: &'a mut UidCounter,
        path: &'a mut IndexSet<Id>,
    ) -> BoxFuture<'a, EngineResult<DeepComposition>> {
        Box::pin(async move {
            // The path holds only ancestors on this branch, so a product shared
            // by two siblings is not mistaken for a loop.
            if let Some(start) = path.get_index_of(&product_id) {
                let cycle = path
                    .iter()
                    .skip(start)
                    .copied()
                    .chain(std::iter::once(product_id))
                    .collect();
                return Err(EngineError::CyclicComposition { path: cycle });
            }

            let product = Self::require_product(store, product_id).await?;
            let uid = counter.next();
            let summary_uid = counter.next();

            let materials = Self::material_nodes(store, product.id, counter).await?;
            let operations = Self::operation_nodes(store, product.id, counter).await?;

            path.insert(product.id);
            let mut sub_products = Grouped::new();
            for row in store.list_sub_products_of(product.id).await? {
                let list_name = row.list_name.clone();
                let child_id = row.product2_id;
                let child =
                    Self::expand_node(store, child_id, Some(row), &mut *counter, &mut *path)
                        .await?;
                push_grouped(&mut sub_products, &list_name, child);
            }
            path.pop();

            Ok(DeepComposition {
                product: ProductNode {
                    product,
                    product_to_product: binding,
                    uid: summary_uid,
                },
                materials,
                operations,
                sub_products,
                uid,
            })
        })
    }

    async fn require_product<S: CatalogStore + ?Sized>(store: &S, id: Id) -> EngineResult<Product> {
        store
            .get_product(id)
            .await?
            .ok_or_else(|| EngineError::not_found("product", id))
    }

    async fn material_nodes<S: CatalogStore + ?Sized>(
        store: &S,
        product_id: Id,
        counter: &mut UidCounter,
    ) -> EngineResult<Grouped<MaterialNode>> {
        let mut groups = Grouped::new();
        for row in store.list_materials_of(product_id).await? {
            let material = store
                .get_material(row.material_id)
                .await?
                .ok_or_else(|| EngineError::not_found("material", row.material_id))?;
            let list_name = row.list_name.clone();
            push_grouped(
                &mut groups,
                &list_name,
                MaterialNode {
                    material,
                    material_to_product: row,
                    uid: counter.next(),
                },
            );
        }
        Ok(groups)
    }

    async fn operation_nodes<S: CatalogStore + ?Sized>(
        store: &S,
        product_id: Id,
        counter: &mut UidCounter,
    ) -> EngineResult<Grouped<OperationNode>> {
        let mut groups = Grouped::new();
        for row in store.list_operations_of(product_id).await? {
            let operation = store
                .get_operation(row.operation_id)
                .await?
                .ok_or_else(|| EngineError::not_found("operation", row.operation_id))?;
            let list_name = row.list_name.clone();
            push_grouped(
                &mut groups,
                &list_name,
                OperationNode {
                    operation,
                    operation_to_product: row,
                    uid: counter.next(),
                },
            );
        }
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Material, MaterialToProduct, Operation, OperationToProduct, Product, ProductToProduct,
    };
    use crate::store::traits::CatalogWriter;
    use crate::store::MemoryStore;

    async fn product(store: &MemoryStore, id: Id, name: &str) -> Product {
        store.create_product(Product::new(id, name)).await.unwrap()
    }

    async fn bind_material(store: &MemoryStore, product_id: Id, material_id: Id, list: &str) {
        store
            .create_material_to_product(
                MaterialToProduct::new(product_id, material_id, 1.0, 1.0).in_list(list),
            )
            .await
            .unwrap();
    }

    async fn bind_operation(store: &MemoryStore, product_id: Id, operation_id: Id, list: &str) {
        store
            .create_operation_to_product(
                OperationToProduct::new(product_id, operation_id, 1.0, 1.0).in_list(list),
            )
            .await
            .unwrap();
    }

    async fn bind_child(store: &MemoryStore, parent: Id, child: Id, number: f64) {
        store
            .create_product_to_product(ProductToProduct::new(parent, child, number))
            .await
            .unwrap();
    }

    /// Booklet(1) = paper, ink / print, bind / cover(2) x1, insert(3) x4
    async fn booklet_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.create_material(Material::new(100, "Paper", 0.5)).await.unwrap();
        store.create_material(Material::new(101, "Ink", 2.0)).await.unwrap();
        store.create_material(Material::new(102, "Card", 1.0)).await.unwrap();
        store
            .create_operation(Operation::new(200, "Print", 3.0, 1.0))
            .await
            .unwrap();
        store
            .create_operation(Operation::new(201, "Bind", 5.0, 2.0))
            .await
            .unwrap();

        product(&store, 1, "Booklet").await;
        product(&store, 2, "Cover").await;
        product(&store, 3, "Insert").await;

        bind_material(&store, 1, 100, "default").await;
        bind_material(&store, 1, 101, "alt1").await;
        bind_operation(&store, 1, 200, "default").await;
        bind_operation(&store, 1, 201, "default").await;
        bind_child(&store, 1, 2, 1.0).await;
        bind_child(&store, 1, 3, 4.0).await;

        bind_material(&store, 2, 102, "default").await;
        bind_operation(&store, 2, 200, "default").await;
        bind_material(&store, 3, 100, "default").await;
        store
    }

    #[tokio::test]
    async fn test_flat_assigns_uids_materials_then_operations_then_products() {
        let store = booklet_store().await;
        let flat = Expander::expand_flat(&store, 1).await.unwrap();

        assert_eq!(flat.product.name, "Booklet");
        assert_eq!(flat.materials["default"][0].uid, 1);
        assert_eq!(flat.materials["alt1"][0].uid, 2);
        let op_uids: Vec<_> = flat.operations["default"].iter().map(|n| n.uid).collect();
        assert_eq!(op_uids, vec![3, 4]);
        let product_uids: Vec<_> = flat.products["default"].iter().map(|n| n.uid).collect();
        assert_eq!(product_uids, vec![5, 6]);
    }

    #[tokio::test]
    async fn test_flat_does_not_recurse_into_sub_products() {
        let store = booklet_store().await;
        let flat = Expander::expand_flat(&store, 1).await.unwrap();

        let children = &flat.products["default"];
        assert_eq!(children[0].product.name, "Cover");
        assert_eq!(children[1].product.name, "Insert");
        assert_eq!(children[1].product_to_product.as_ref().unwrap().number, 4.0);
        // Only the booklet's own material rows are present.
        let material_count: usize = flat.materials.values().map(Vec::len).sum();
        assert_eq!(material_count, 2);
    }

    #[tokio::test]
    async fn test_flat_groups_interleaved_lists_in_row_order() {
        let store = booklet_store().await;
        product(&store, 4, "Flyer").await;
        bind_material(&store, 4, 100, "default").await;
        bind_material(&store, 4, 101, "alt1").await;
        bind_material(&store, 4, 102, "default").await;
        bind_material(&store, 4, 100, "alt1").await;
        bind_operation(&store, 4, 201, "alt1").await;
        bind_operation(&store, 4, 200, "default").await;

        let flat = Expander::expand_flat(&store, 4).await.unwrap();

        let keys: Vec<_> = flat.materials.keys().cloned().collect();
        assert_eq!(keys, vec!["default", "alt1"]);
        let ids = |name: &str| -> Vec<Id> {
            flat.materials[name].iter().map(|n| n.material.id).collect()
        };
        assert_eq!(ids("default"), vec![100, 102]);
        assert_eq!(ids("alt1"), vec![101, 100]);
        let material_count: usize = flat.materials.values().map(Vec::len).sum();
        assert_eq!(material_count, 4);

        let op_keys: Vec<_> = flat.operations.keys().cloned().collect();
        assert_eq!(op_keys, vec!["alt1", "default"]);
        assert_eq!(flat.operations["alt1"][0].uid, 5);
        assert_eq!(flat.operations["default"][0].uid, 6);
    }

    #[tokio::test]
    async fn test_flat_missing_product_is_not_found() {
        let store = booklet_store().await;
        let err = Expander::expand_flat(&store, 99).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { entity: "product", id: 99 }));
    }

    #[tokio::test]
    async fn test_flat_missing_material_aborts_expansion() {
        let store = booklet_store().await;
        bind_material(&store, 3, 555, "default").await;
        let err = Expander::expand_flat(&store, 3).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { entity: "material", id: 555 }));
    }

    #[tokio::test]
    async fn test_deep_numbers_nodes_depth_first() {
        let store = booklet_store().await;
        let mut counter = UidCounter::new();
        let tree = Expander::expand_deep(&store, 1, &mut counter).await.unwrap();

        // root node, root summary, 2 materials, 2 operations
        assert_eq!(tree.uid, 1);
        assert_eq!(tree.product.uid, 2);
        assert_eq!(tree.materials["default"][0].uid, 3);
        assert_eq!(tree.materials["alt1"][0].uid, 4);
        assert_eq!(tree.operations["default"][1].uid, 6);

        let cover = &tree.sub_products["default"][0];
        assert_eq!(cover.uid, 7);
        assert_eq!(cover.product.uid, 8);
        assert_eq!(cover.materials["default"][0].uid, 9);
        assert_eq!(cover.operations["default"][0].uid, 10);

        let insert = &tree.sub_products["default"][1];
        assert_eq!(insert.uid, 11);
        assert_eq!(insert.materials["default"][0].uid, 13);
        assert_eq!(counter.peek(), 14);
    }

    #[tokio::test]
    async fn test_deep_uids_are_contiguous_from_one() {
        let store = booklet_store().await;
        let mut counter = UidCounter::new();
        let tree = Expander::expand_deep(&store, 1, &mut counter).await.unwrap();

        let mut uids = tree.uids();
        uids.sort_unstable();
        let expected: Vec<u64> = (1..=uids.len() as u64).collect();
        assert_eq!(uids, expected);
    }

    #[tokio::test]
    async fn test_deep_attaches_binding_to_child() {
        let store = booklet_store().await;
        let mut counter = UidCounter::new();
        let tree = Expander::expand_deep(&store, 1, &mut counter).await.unwrap();

        assert!(tree.product.product_to_product.is_none());
        let insert = &tree.sub_products["default"][1];
        let binding = insert.product.product_to_product.as_ref().unwrap();
        assert_eq!(binding.product_id, 1);
        assert_eq!(binding.product2_id, 3);
        assert_eq!(binding.number, 4.0);
    }

    #[tokio::test]
    async fn test_deep_of_leaf_matches_flat() {
        let store = booklet_store().await;
        let flat = Expander::expand_flat(&store, 2).await.unwrap();
        let mut counter = UidCounter::new();
        let tree = Expander::expand_deep(&store, 2, &mut counter).await.unwrap();

        assert!(tree.sub_products.is_empty());
        assert!(flat.products.is_empty());
        assert_eq!(tree.product.product, flat.product);
        let rows = |g: &Grouped<MaterialNode>| -> Vec<_> {
            g.iter()
                .flat_map(|(k, v)| v.iter().map(move |n| (k.clone(), n.material_to_product.clone())))
                .collect()
        };
        assert_eq!(rows(&tree.materials), rows(&flat.materials));
        assert_eq!(
            tree.operations.keys().collect::<Vec<_>>(),
            flat.operations.keys().collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_deep_continues_caller_counter() {
        let store = booklet_store().await;
        let mut counter = UidCounter::starting_at(40);
        let tree = Expander::expand_deep(&store, 3, &mut counter).await.unwrap();
        assert_eq!(tree.uid, 40);
        assert_eq!(tree.product.uid, 41);
        assert_eq!(tree.materials["default"][0].uid, 42);
    }

    #[tokio::test]
    async fn test_deep_rejects_cycle() {
        let store = booklet_store().await;
        // insert(3) -> booklet(1) closes 1 -> 3 -> 1
        bind_child(&store, 3, 1, 1.0).await;

        let mut counter = UidCounter::new();
        let err = Expander::expand_deep(&store, 1, &mut counter).await.unwrap_err();
        match err {
            EngineError::CyclicComposition { path } => assert_eq!(path, vec![1, 3, 1]),
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_deep_rejects_self_reference() {
        let store = booklet_store().await;
        bind_child(&store, 2, 2, 1.0).await;

        let mut counter = UidCounter::new();
        let err = Expander::expand_deep(&store, 2, &mut counter).await.unwrap_err();
        assert!(matches!(err, EngineError::CyclicComposition { ref path } if path == &vec![2, 2]));
    }

    #[tokio::test]
    async fn test_deep_allows_shared_child_in_two_branches() {
        let store = booklet_store().await;
        // cover(2) and insert(3) both use a sticker(4)
        product(&store, 4, "Sticker").await;
        bind_child(&store, 2, 4, 1.0).await;
        bind_child(&store, 3, 4, 2.0).await;

        let mut counter = UidCounter::new();
        let tree = Expander::expand_deep(&store, 1, &mut counter).await.unwrap();

        let cover_sticker = &tree.sub_products["default"][0].sub_products["default"][0];
        let insert_sticker = &tree.sub_products["default"][1].sub_products["default"][0];
        assert_eq!(cover_sticker.product_id(), 4);
        assert_eq!(insert_sticker.product_id(), 4);
        assert_ne!(cover_sticker.uid, insert_sticker.uid);
        assert_eq!(tree.node_count(), 5);
    }

    #[tokio::test]
    async fn test_deep_missing_child_is_not_found() {
        let store = booklet_store().await;
        let mut orphan = ProductToProduct::new(2, 77, 1.0);
        orphan.list_name = "alt1".to_string();
        store.create_product_to_product(orphan).await.unwrap();

        let mut counter = UidCounter::new();
        let err = Expander::expand_deep(&store, 1, &mut counter).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { entity: "product", id: 77 }));
    }
}
