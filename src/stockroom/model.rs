use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;
use std::fmt;
use std::str::FromStr;

/// A product record.
///
/// Every field is optional: ids are assigned by the store on insert, and records
/// coming from outside the add form may lack any of the others. The filter engine
/// copes with missing fields instead of rejecting the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_js_number"
    )]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        quantity: i64,
    ) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            description: Some(description.into()),
            price: Some(price),
            quantity: Some(quantity),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Price used for comparisons: absent or NaN counts as zero.
    pub fn effective_price(&self) -> f64 {
        match self.price {
            Some(p) if !p.is_nan() => p,
            _ => 0.0,
        }
    }

    /// Quantity used for comparisons: absent counts as zero.
    pub fn effective_quantity(&self) -> i64 {
        self.quantity.unwrap_or(0)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Unvalidated input from the add form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: f64, quantity: i64) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
            price: Some(price),
            quantity: Some(quantity),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Name,
    Price,
    Quantity,
    Id,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::Quantity => "quantity",
            SortField::Id => "id",
        };
        f.write_str(s)
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "price" => Ok(SortField::Price),
            "quantity" | "qty" => Ok(SortField::Quantity),
            "id" => Ok(SortField::Id),
            other => Err(format!(
                "unknown sort field '{}' (expected name, price, quantity or id)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{}' (expected asc or desc)", other)),
        }
    }
}

/// The current filter and sort configuration.
///
/// Bounds are `Option`s: `Some(0.0)` is a real bound, only `None` means "unset".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search_term: String,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_quantity: Option<f64>,
    pub max_quantity: Option<f64>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl FilterCriteria {
    /// Shallow-merges `patch` over the current values.
    pub fn merge(&mut self, patch: &CriteriaPatch) {
        if let Some(term) = &patch.search_term {
            self.search_term = term.clone();
        }
        if let Some(v) = patch.min_price {
            self.min_price = v;
        }
        if let Some(v) = patch.max_price {
            self.max_price = v;
        }
        if let Some(v) = patch.min_quantity {
            self.min_quantity = v;
        }
        if let Some(v) = patch.max_quantity {
            self.max_quantity = v;
        }
        if let Some(v) = patch.sort_by {
            self.sort_by = v;
        }
        if let Some(v) = patch.sort_order {
            self.sort_order = v;
        }
    }

    pub fn has_active_filters(&self) -> bool {
        !self.search_term.trim().is_empty()
            || self.min_price.is_some()
            || self.max_price.is_some()
            || self.min_quantity.is_some()
            || self.max_quantity.is_some()
    }
}

/// A partial update of [`FilterCriteria`].
///
/// Outer `None` leaves a field untouched. For the bounds, `Some(None)` clears the
/// bound and `Some(Some(x))` sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriteriaPatch {
    pub search_term: Option<String>,
    pub min_price: Option<Option<f64>>,
    pub max_price: Option<Option<f64>>,
    pub min_quantity: Option<Option<f64>>,
    pub max_quantity: Option<Option<f64>>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl CriteriaPatch {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn min_price(mut self, bound: Option<f64>) -> Self {
        self.min_price = Some(bound);
        self
    }

    pub fn max_price(mut self, bound: Option<f64>) -> Self {
        self.max_price = Some(bound);
        self
    }

    pub fn min_quantity(mut self, bound: Option<f64>) -> Self {
        self.min_quantity = Some(bound);
        self
    }

    pub fn max_quantity(mut self, bound: Option<f64>) -> Self {
        self.max_quantity = Some(bound);
        self
    }

    pub fn sort_by(mut self, field: SortField) -> Self {
        self.sort_by = Some(field);
        self
    }

    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    /// A patch that sets every field, turning the merge into a full replacement.
    pub fn replace_all(criteria: &FilterCriteria) -> Self {
        Self {
            search_term: Some(criteria.search_term.clone()),
            min_price: Some(criteria.min_price),
            max_price: Some(criteria.max_price),
            min_quantity: Some(criteria.min_quantity),
            max_quantity: Some(criteria.max_quantity),
            sort_by: Some(criteria.sort_by),
            sort_order: Some(criteria.sort_order),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Counts describing how much of the product list the current filters show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub total: usize,
    pub filtered: usize,
    pub hidden: isize,
    pub percentage: u32,
}

/// Formats a number the way JavaScript's `Number.prototype.toString` does.
///
/// The shortest round-trip digits are laid out in plain decimal notation while
/// the decimal exponent is in `[-7, 21)`, and as `d.ddde±N` outside it:
/// `10`, `0.000001`, `1e-7`, `1e+21`.
pub fn format_js_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. `1.2345e-7`.
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let k = digits.len() as i32;
    // Position of the decimal point relative to the start of `digits`.
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{}.{}", int, frac)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let sign = if n - 1 >= 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, (n - 1).abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, (n - 1).abs())
        }
    };

    if value < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Serializes numbers with the same text [`format_js_number`] produces, so JSON
/// output matches `JSON.stringify`. Non-finite values become `null`.
pub(crate) fn serialize_js_number<S>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) => serialize_js_f64(v, serializer),
        None => serializer.serialize_none(),
    }
}

pub(crate) fn serialize_js_f64<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if !value.is_finite() {
        return serializer.serialize_none();
    }
    let raw = RawValue::from_string(format_js_number(*value)).map_err(S::Error::custom)?;
    raw.serialize(serializer)
}
