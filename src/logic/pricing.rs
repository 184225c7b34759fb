use crate::model::{Id, MaterialToOrdering, OperationToOrdering, OrderingSummary, ProductToOrdering};

/// Cost after applying a percentage markup: `price * (1 + persent / 100)`.
pub fn markup_cost(price: f64, persent: f64) -> f64 {
    price * (1.0 + persent / 100.0)
}

/// Totals over the active rows of one ordering's line items.
pub fn summarize(
    ordering_id: Id,
    products: &[ProductToOrdering],
    materials: &[MaterialToOrdering],
    operations: &[OperationToOrdering],
) -> OrderingSummary {
    let material_cost: f64 = materials
        .iter()
        .filter(|row| row.is_active)
        .map(|row| row.cost)
        .sum();

    let active_operations = || operations.iter().filter(|row| row.is_active);
    let operation_cost: f64 = active_operations().map(|row| row.cost).sum();
    let equipment_cost: f64 = active_operations().map(|row| row.equipment_cost).sum();
    let user_sum: f64 = active_operations().map(|row| row.user_sum).sum();

    OrderingSummary {
        ordering_id,
        product_count: products.iter().filter(|row| row.is_active).count(),
        material_cost,
        operation_cost,
        equipment_cost,
        user_sum,
        total_cost: material_cost + operation_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ordering;

    #[test]
    fn test_markup_is_percent_not_basis_points() {
        assert_eq!(markup_cost(100.0, 20.0), 120.0);
        assert_eq!(markup_cost(80.0, 0.0), 80.0);
        assert_eq!(markup_cost(50.0, -10.0), 45.0);
    }

    #[test]
    fn test_update_cost_overwrites_stale_cost() {
        let mut ordering = Ordering::new(1, "Banner", 100.0, 20.0);
        ordering.persent = 50.0;
        ordering.update_cost();
        assert_eq!(ordering.cost, 150.0);
    }

    fn operation_item(cost: f64, equipment_cost: f64, user_sum: f64, is_active: bool) -> OperationToOrdering {
        OperationToOrdering {
            id: 0,
            ordering_id: 1,
            operation_id: 1,
            product_to_ordering_id: 1,
            user_id: 1,
            number: 1.0,
            price: cost,
            user_sum,
            cost,
            equipment_id: 0,
            equipment_cost,
            comm: String::new(),
            is_done: false,
            is_active,
        }
    }

    #[test]
    fn test_summary_skips_inactive_rows() {
        let products = vec![
            ProductToOrdering::new(1, 5, 1, 2.0),
            ProductToOrdering {
                is_active: false,
                ..ProductToOrdering::new(1, 6, 1, 1.0)
            },
        ];
        let operations = vec![
            operation_item(8.0, 6.0, 40.0, true),
            operation_item(100.0, 100.0, 100.0, false),
        ];

        let summary = summarize(1, &products, &[], &operations);

        assert_eq!(summary.product_count, 1);
        assert_eq!(summary.material_cost, 0.0);
        assert_eq!(summary.operation_cost, 8.0);
        assert_eq!(summary.equipment_cost, 6.0);
        assert_eq!(summary.user_sum, 40.0);
        assert_eq!(summary.total_cost, 8.0);
    }
}
