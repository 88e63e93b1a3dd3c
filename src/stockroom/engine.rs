//! Filter/sort engine.
//!
//! [`apply`] is a pure function from a product snapshot and the current
//! [`FilterCriteria`] to the derived view. Stages run in a fixed order (search,
//! price bounds, quantity bounds, sort). The filters are independent and
//! AND-combined, so the order only matters for determinism of the implementation.

use crate::model::{FilterCriteria, Product, SortField, SortOrder};
use std::cmp::Ordering;

/// Filters and sorts `products` according to `criteria`.
///
/// Never fails: missing fields, inverted bounds and empty input all degrade to an
/// empty or full result.
pub fn apply(products: &[Product], criteria: &FilterCriteria) -> Vec<Product> {
    let term = criteria.search_term.trim().to_lowercase();

    let mut filtered: Vec<Product> = products
        .iter()
        .filter(|p| term.is_empty() || matches_search(p, &term))
        .filter(|p| within_bounds(p.effective_price(), criteria.min_price, criteria.max_price))
        .filter(|p| {
            within_bounds(
                p.effective_quantity() as f64,
                criteria.min_quantity,
                criteria.max_quantity,
            )
        })
        .cloned()
        .collect();

    // `sort_by` is stable: ties keep their source order in both directions.
    filtered.sort_by(|a, b| compare(a, b, criteria.sort_by, criteria.sort_order));
    filtered
}

/// `term` must already be trimmed and lowercased.
fn matches_search(product: &Product, term: &str) -> bool {
    let field_matches = |field: &Option<String>| {
        field
            .as_deref()
            .map(|s| s.to_lowercase().contains(term))
            .unwrap_or(false)
    };
    field_matches(&product.name) || field_matches(&product.description)
}

fn within_bounds(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_some_and(|min| value < min) {
        return false;
    }
    if max.is_some_and(|max| value > max) {
        return false;
    }
    true
}

/// Comparator used by the sort stage.
///
/// Descending order reverses the comparator rather than the output, so equal
/// keys stay in their pre-sort order.
pub fn compare(a: &Product, b: &Product, field: SortField, order: SortOrder) -> Ordering {
    let ord = sort_key(a, field).cmp_key(&sort_key(b, field));
    match order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}

enum SortKey {
    Text(String),
    Number(f64),
}

impl SortKey {
    fn cmp_key(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            // A field never mixes kinds; treat as equal if it ever does.
            _ => Ordering::Equal,
        }
    }
}

fn sort_key(product: &Product, field: SortField) -> SortKey {
    match field {
        SortField::Name => SortKey::Text(product.display_name().to_lowercase()),
        // Missing numbers order as zero.
        SortField::Price => SortKey::Number(product.effective_price()),
        SortField::Quantity => SortKey::Number(product.effective_quantity() as f64),
        SortField::Id => SortKey::Number(product.id.unwrap_or(0) as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CriteriaPatch;

    fn apple_banana() -> Vec<Product> {
        vec![
            Product::new("Apple", "", 10.0, 5).with_id(1),
            Product::new("Banana", "", 5.0, 0).with_id(2),
        ]
    }

    fn criteria(patch: CriteriaPatch) -> FilterCriteria {
        let mut c = FilterCriteria::default();
        c.merge(&patch);
        c
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.display_name()).collect()
    }

    #[test]
    fn sorts_by_price_ascending() {
        let c = criteria(CriteriaPatch::default().sort_by(SortField::Price));
        let result = apply(&apple_banana(), &c);
        assert_eq!(names(&result), vec!["Banana", "Apple"]);
    }

    #[test]
    fn search_matches_name_prefix_case_insensitively() {
        let c = criteria(CriteriaPatch::default().search("app"));
        let result = apply(&apple_banana(), &c);
        assert_eq!(names(&result), vec!["Apple"]);

        let c = criteria(CriteriaPatch::default().search("  APP "));
        assert_eq!(names(&apply(&apple_banana(), &c)), vec!["Apple"]);
    }

    #[test]
    fn min_quantity_excludes_out_of_stock() {
        let c = criteria(CriteriaPatch::default().min_quantity(Some(1.0)));
        let result = apply(&apple_banana(), &c);
        assert_eq!(names(&result), vec!["Apple"]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let c = criteria(CriteriaPatch::default().search("x").min_price(Some(3.0)));
        assert!(apply(&[], &c).is_empty());
    }

    #[test]
    fn search_also_matches_description() {
        let products = vec![
            Product::new("Widget", "a small red gadget", 1.0, 1),
            Product::new("Gizmo", "blue", 1.0, 1),
        ];
        let c = criteria(CriteriaPatch::default().search("RED"));
        assert_eq!(names(&apply(&products, &c)), vec!["Widget"]);
    }

    #[test]
    fn missing_name_and_description_never_match_search() {
        let products = vec![Product {
            id: Some(1),
            price: Some(1.0),
            ..Default::default()
        }];
        let c = criteria(CriteriaPatch::default().search("a"));
        assert!(apply(&products, &c).is_empty());
    }

    #[test]
    fn blank_search_term_is_ignored() {
        let c = criteria(CriteriaPatch::default().search("   "));
        assert_eq!(apply(&apple_banana(), &c).len(), 2);
    }

    #[test]
    fn zero_min_price_is_a_real_bound() {
        let products = vec![
            Product::new("Free", "", 0.0, 1),
            Product::new("Refund", "", -2.0, 1),
        ];
        let c = criteria(CriteriaPatch::default().min_price(Some(0.0)));
        assert_eq!(names(&apply(&products, &c)), vec!["Free"]);
    }

    #[test]
    fn zero_max_quantity_keeps_only_out_of_stock() {
        let c = criteria(CriteriaPatch::default().max_quantity(Some(0.0)));
        assert_eq!(names(&apply(&apple_banana(), &c)), vec!["Banana"]);
    }

    #[test]
    fn missing_price_counts_as_zero_for_bounds() {
        let products = vec![Product {
            name: Some("Mystery".into()),
            ..Default::default()
        }];
        let c = criteria(CriteriaPatch::default().max_price(Some(0.0)));
        assert_eq!(apply(&products, &c).len(), 1);
        let c = criteria(CriteriaPatch::default().min_price(Some(0.01)));
        assert!(apply(&products, &c).is_empty());
    }

    #[test]
    fn inverted_bounds_yield_empty_result() {
        let c = criteria(
            CriteriaPatch::default()
                .min_price(Some(8.0))
                .max_price(Some(2.0)),
        );
        assert!(apply(&apple_banana(), &c).is_empty());
    }

    #[test]
    fn name_sort_is_case_insensitive_with_missing_names_first() {
        let products = vec![
            Product::new("banana", "", 1.0, 1),
            Product::new("Apple", "", 1.0, 1),
            Product {
                price: Some(1.0),
                ..Default::default()
            },
            Product::new("cherry", "", 1.0, 1),
        ];
        let result = apply(&products, &FilterCriteria::default());
        assert_eq!(names(&result), vec!["", "Apple", "banana", "cherry"]);
    }

    #[test]
    fn descending_sort_keeps_ties_in_source_order() {
        let products = vec![
            Product::new("First", "", 5.0, 1),
            Product::new("Cheap", "", 1.0, 1),
            Product::new("Second", "", 5.0, 1),
        ];
        let c = criteria(
            CriteriaPatch::default()
                .sort_by(SortField::Price)
                .sort_order(SortOrder::Desc),
        );
        assert_eq!(
            names(&apply(&products, &c)),
            vec!["First", "Second", "Cheap"]
        );
    }

    #[test]
    fn sorts_by_id_and_quantity() {
        let products = vec![
            Product::new("B", "", 1.0, 3).with_id(7),
            Product::new("A", "", 1.0, 9).with_id(2),
        ];
        let by_id = criteria(CriteriaPatch::default().sort_by(SortField::Id));
        assert_eq!(names(&apply(&products, &by_id)), vec!["A", "B"]);

        let by_qty = criteria(
            CriteriaPatch::default()
                .sort_by(SortField::Quantity)
                .sort_order(SortOrder::Desc),
        );
        assert_eq!(names(&apply(&products, &by_qty)), vec!["A", "B"]);
    }

    #[test]
    fn unfiltered_result_is_a_sorted_permutation() {
        let products: Vec<Product> = (0..20)
            .map(|i| {
                let price = ((i * 13) % 11) as f64;
                Product::new(format!("P{}", (i * 7) % 20), "", price, i)
            })
            .collect();
        for field in [SortField::Name, SortField::Price, SortField::Quantity, SortField::Id] {
            for order in [SortOrder::Asc, SortOrder::Desc] {
                let c = criteria(CriteriaPatch::default().sort_by(field).sort_order(order));
                let result = apply(&products, &c);
                assert_eq!(result.len(), products.len());
                assert!(result.iter().all(|p| products.contains(p)));
                assert!(result
                    .windows(2)
                    .all(|w| compare(&w[0], &w[1], field, order) != Ordering::Greater));
            }
        }
    }

    #[test]
    fn output_never_grows_and_is_idempotent() {
        let products: Vec<Product> = (0..15)
            .map(|i| {
                let description = format!("batch {}", i % 3);
                Product::new(format!("Item {}", i), description, i as f64, i % 4)
            })
            .collect();
        let patches = [
            CriteriaPatch::default(),
            CriteriaPatch::default().search("batch 1"),
            CriteriaPatch::default().min_price(Some(3.0)).max_price(Some(9.0)),
            CriteriaPatch::default()
                .min_quantity(Some(1.0))
                .sort_by(SortField::Price)
                .sort_order(SortOrder::Desc),
        ];
        for patch in patches {
            let c = criteria(patch);
            let once = apply(&products, &c);
            assert!(once.len() <= products.len());
            assert_eq!(apply(&once, &c), once);
        }
    }

    #[test]
    fn does_not_mutate_input() {
        let products = apple_banana();
        let before = products.clone();
        let c = criteria(CriteriaPatch::default().sort_by(SortField::Price));
        let _ = apply(&products, &c);
        assert_eq!(products, before);
    }
}
