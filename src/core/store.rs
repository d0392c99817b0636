//! Store traits for filtering and sorting

/// Trait for stores that support filtering and sorting
///
/// `Filter` is the list's own typed filter (parsed from query parameters by
/// the handlers), so stores never interpret raw strings.
pub trait QueryableStore<T>: Send + Sync {
    type Filter;

    /// Keep only the entities matching `filter`
    fn apply_filters(&self, data: Vec<T>, filter: &Self::Filter) -> Vec<T>;

    /// Sort entities by a `field`, `field:asc` or `field:desc` expression
    ///
    /// Unknown fields leave the order untouched.
    fn apply_sort(&self, data: Vec<T>, sort: &str) -> Vec<T>;
}

/// Split a sort expression into field name and descending flag
pub fn parse_sort(sort: &str) -> (&str, bool) {
    match sort.split_once(':') {
        Some((field, "desc")) => (field, true),
        Some((field, _)) => (field, false),
        None => (sort, false),
    }
}
