use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::logic::expand::Expander;
use crate::logic::grouping::UidCounter;
use crate::logic::materialize::{validate_link, Materializer};
use crate::logic::pricing;
use crate::model::access::{AccessMask, DOC_CREATE, DOC_READ};
use crate::model::{
    DeepComposition, FlatComposition, Id, MaterializationPlan, OrderingSummary, ProductToOrdering,
    UserContext,
};
use crate::store::traits::{SnapshotSource, Store};

/// Entry point for every composition and ordering operation.
///
/// Each call checks the caller's capability before touching the store, then
/// reads the catalog either through a per-call snapshot or live, depending on
/// [`EngineConfig::snapshot_reads`].
pub struct BomEngine<S: Store> {
    store: Arc<S>,
    config: EngineConfig,
    materializer: Materializer,
}

impl<S: Store> BomEngine<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        let materializer = Materializer::new(config.default_list_name.clone(), config.copy_center);
        Self {
            store,
            config,
            materializer,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn expand_flat(
        &self,
        user: &UserContext,
        product_id: Id,
    ) -> EngineResult<FlatComposition> {
        self.authorize(user, DOC_READ, "expand product")?;

        if self.config.snapshot_reads {
            let snapshot = self.store.snapshot().await?;
            Expander::expand_flat(&snapshot, product_id).await
        } else {
            Expander::expand_flat(self.store.as_ref(), product_id).await
        }
    }

    pub async fn expand_deep(
        &self,
        user: &UserContext,
        product_id: Id,
    ) -> EngineResult<DeepComposition> {
        self.authorize(user, DOC_READ, "expand product tree")?;
        let mut counter = UidCounter::new();

        if self.config.snapshot_reads {
            let snapshot = self.store.snapshot().await?;
            Expander::expand_deep(&snapshot, product_id, &mut counter).await
        } else {
            Expander::expand_deep(self.store.as_ref(), product_id, &mut counter).await
        }
    }

    /// Place the default materials and operations of an already stored
    /// product link onto its order.
    pub async fn materialize_defaults(
        &self,
        user: &UserContext,
        product_to_ordering_id: Id,
    ) -> EngineResult<ProductToOrdering> {
        self.authorize(user, DOC_CREATE, "materialize product link")?;

        let link = self
            .store
            .get_product_to_ordering(product_to_ordering_id)
            .await?
            .ok_or_else(|| EngineError::not_found("product link", product_to_ordering_id))?;

        let plan = self.plan_for(&link).await?;
        self.materializer
            .record(self.store.as_ref(), link, plan)
            .await
    }

    /// Store a new product link and materialize its defaults.
    ///
    /// The line items are planned before anything is written, and the link is
    /// stored together with them, so a failed plan leaves the order untouched.
    /// A link without a user id is attributed to the caller.
    pub async fn create_default(
        &self,
        user: &UserContext,
        mut new_link: ProductToOrdering,
    ) -> EngineResult<ProductToOrdering> {
        self.authorize(user, DOC_CREATE, "create product link")?;
        validate_link(&new_link)?;

        if new_link.user_id == 0 {
            new_link.user_id = user.user_id;
        }
        self.store
            .get_product(new_link.product_id)
            .await?
            .ok_or_else(|| EngineError::not_found("product", new_link.product_id))?;

        let plan = self.plan_for(&new_link).await?;
        let link = self
            .materializer
            .record_new_link(self.store.as_ref(), new_link, plan)
            .await?;
        log::debug!(
            "Created product link {} for product {} on ordering {}",
            link.id,
            link.product_id,
            link.ordering_id
        );
        Ok(link)
    }

    pub async fn ordering_summary(
        &self,
        user: &UserContext,
        ordering_id: Id,
    ) -> EngineResult<OrderingSummary> {
        self.authorize(user, DOC_READ, "read ordering summary")?;

        self.store
            .get_ordering(ordering_id)
            .await?
            .ok_or_else(|| EngineError::not_found("ordering", ordering_id))?;

        let products = self.store.list_products_for_ordering(ordering_id).await?;
        let materials = self.store.list_materials_for_ordering(ordering_id).await?;
        let operations = self.store.list_operations_for_ordering(ordering_id).await?;

        Ok(pricing::summarize(
            ordering_id,
            &products,
            &materials,
            &operations,
        ))
    }

    /// The snapshot, if any, is released before this returns, so the ledger
    /// write that follows never waits on it.
    async fn plan_for(&self, link: &ProductToOrdering) -> EngineResult<MaterializationPlan> {
        if self.config.snapshot_reads {
            let snapshot = self.store.snapshot().await?;
            self.materializer.plan(&snapshot, link).await
        } else {
            self.materializer.plan(self.store.as_ref(), link).await
        }
    }

    fn authorize(&self, user: &UserContext, required: AccessMask, action: &str) -> EngineResult<()> {
        if user.can(required) {
            Ok(())
        } else {
            log::warn!(
                "User {} denied '{}': capability {:#x} required",
                user.user_id,
                action,
                required
            );
            Err(EngineError::AccessDenied { required })
        }
    }
}
