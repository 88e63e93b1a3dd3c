use crate::commands::{CmdMessage, CmdResult};
use crate::pipeline::FilteredView;

/// Turns the latest published view into a listing. `None` means the pipeline has
/// not produced a view yet.
pub fn run(view: Option<&FilteredView>) -> CmdResult {
    let view = match view {
        Some(view) => view,
        None => {
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::info("Loading products..."));
            return result;
        }
    };

    let mut result = CmdResult::default()
        .with_listed_products(view.products.clone())
        .with_summary(view.summary)
        .with_criteria(view.criteria.clone());

    if view.products.is_empty() {
        if view.summary.total == 0 {
            result.add_message(CmdMessage::info("No products yet."));
        } else {
            result.add_message(CmdMessage::info("No products match the current filters."));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine;
    use crate::model::{FilterCriteria, Product};
    use crate::summary::summarize;

    fn view(all: Vec<Product>, criteria: FilterCriteria) -> FilteredView {
        let products = engine::apply(&all, &criteria);
        FilteredView {
            summary: summarize(&all, &products),
            criteria,
            products,
            revision: 1,
        }
    }

    #[test]
    fn without_a_view_reports_loading() {
        let result = run(None);
        assert!(result.listed_products.is_empty());
        assert!(result.summary.is_none());
        assert_eq!(result.messages[0].content, "Loading products...");
    }

    #[test]
    fn lists_the_derived_products() {
        let all = vec![
            Product::new("Apple", "", 10.0, 5).with_id(1),
            Product::new("Banana", "", 5.0, 0).with_id(2),
        ];
        let result = run(Some(&view(all, FilterCriteria::default())));
        assert_eq!(result.listed_products.len(), 2);
        assert_eq!(result.summary.unwrap().percentage, 100);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn distinguishes_empty_store_from_everything_hidden() {
        let empty = run(Some(&view(vec![], FilterCriteria::default())));
        assert_eq!(empty.messages[0].content, "No products yet.");

        let hidden = run(Some(&view(
            vec![Product::new("Apple", "", 10.0, 5)],
            FilterCriteria {
                search_term: "zzz".into(),
                ..Default::default()
            },
        )));
        assert_eq!(
            hidden.messages[0].content,
            "No products match the current filters."
        );
    }
}
