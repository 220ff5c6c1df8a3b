//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by value: two forecasts with the
/// same units, bounds and explanation are the same forecast. To "modify" one,
/// build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct ReorderPlan { eoq: f64, safety_stock: f64, reorder_point: f64 }
///
/// impl ValueObject for ReorderPlan {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
