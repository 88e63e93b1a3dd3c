use crate::commands::{CmdMessage, CmdResult};
use crate::criteria::CriteriaStore;
use crate::error::Result;
use crate::model::{format_js_number, CriteriaPatch, FilterCriteria};

/// Apply `patch`. An empty patch leaves the store untouched and only reports
/// the current filters.
pub fn run(criteria: &mut CriteriaStore, patch: &CriteriaPatch) -> Result<CmdResult> {
    if !patch.is_empty() {
        criteria.update(patch);
    }
    Ok(describe_result(criteria.current()))
}

pub fn clear(criteria: &mut CriteriaStore) -> Result<CmdResult> {
    criteria.clear();
    Ok(describe_result(criteria.current()))
}

fn describe_result(current: &FilterCriteria) -> CmdResult {
    let mut result = CmdResult::default().with_criteria(current.clone());
    result.add_message(CmdMessage::info(describe(current)));
    result
}

/// One-line human description of the active filters and sort.
pub fn describe(criteria: &FilterCriteria) -> String {
    let sort = format!("sorted by {} ({})", criteria.sort_by, criteria.sort_order);
    if !criteria.has_active_filters() {
        return format!("No filters active, {}", sort);
    }

    let mut parts = Vec::new();
    let term = criteria.search_term.trim();
    if !term.is_empty() {
        parts.push(format!("search '{}'", term));
    }
    let bounds = [
        ("price >=", criteria.min_price),
        ("price <=", criteria.max_price),
        ("quantity >=", criteria.min_quantity),
        ("quantity <=", criteria.max_quantity),
    ];
    for (label, bound) in bounds {
        if let Some(value) = bound {
            parts.push(format!("{} {}", label, format_js_number(value)));
        }
    }

    format!("Filters: {}; {}", parts.join(", "), sort)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SortField, SortOrder};

    #[test]
    fn run_patches_the_store() {
        let mut store = CriteriaStore::new();
        let result = run(
            &mut store,
            &CriteriaPatch::default().search("lamp").min_price(Some(0.0)),
        )
        .unwrap();

        assert_eq!(store.current().search_term, "lamp");
        assert_eq!(store.current().min_price, Some(0.0));
        assert_eq!(result.criteria.as_ref(), Some(store.current()));
        assert_eq!(
            result.messages[0].content,
            "Filters: search 'lamp', price >= 0; sorted by name (asc)"
        );
    }

    #[test]
    fn empty_patch_does_not_notify_subscribers() {
        let mut store = CriteriaStore::new();
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let c = calls.clone();
        store.subscribe(move |_| c.set(c.get() + 1));

        let result = run(&mut store, &CriteriaPatch::default()).unwrap();
        assert_eq!(calls.get(), 0);
        assert_eq!(
            result.messages[0].content,
            "No filters active, sorted by name (asc)"
        );

        run(&mut store, &CriteriaPatch::default().search("x")).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn whitespace_search_counts_as_no_filter() {
        let criteria = FilterCriteria {
            search_term: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(describe(&criteria), "No filters active, sorted by name (asc)");
    }

    #[test]
    fn clear_resets_everything() {
        let mut store = CriteriaStore::new();
        run(
            &mut store,
            &CriteriaPatch::default()
                .max_quantity(Some(3.0))
                .sort_by(SortField::Quantity)
                .sort_order(SortOrder::Desc),
        )
        .unwrap();

        let result = clear(&mut store).unwrap();
        assert_eq!(store.current(), &FilterCriteria::default());
        assert_eq!(
            result.messages[0].content,
            "No filters active, sorted by name (asc)"
        );
    }

    #[test]
    fn describes_fractional_bounds() {
        let criteria = FilterCriteria {
            max_price: Some(10.5),
            sort_by: SortField::Price,
            sort_order: SortOrder::Desc,
            ..Default::default()
        };
        assert_eq!(
            describe(&criteria),
            "Filters: price <= 10.5; sorted by price (desc)"
        );
    }
}
