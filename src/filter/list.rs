use crate::filter::Filter;

/// How a filter list combines its children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// AND: a row/cell passes only if every child passes it
    MustPassAll,
    /// OR: a row/cell passes if at least one child passes it
    MustPassOne,
}

/// Ordered list of child filters combined with AND or OR.
///
/// Lists nest, so arbitrary boolean expressions can be built:
///
/// ```ignore
/// // (address = 'beijing' OR address = 'shanghai') AND name = 'zhangsan'
/// let city = FilterList::with_filters(Operator::MustPassOne, vec![beijing, shanghai]);
/// let query = FilterList::with_filters(Operator::MustPassAll, vec![city.into(), zhangsan]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FilterList {
    operator: Operator,
    filters: Vec<Filter>,
}

impl FilterList {
    pub fn new(operator: Operator) -> Self {
        FilterList {
            operator,
            filters: Vec::new(),
        }
    }

    pub fn with_filters(operator: Operator, filters: Vec<Filter>) -> Self {
        FilterList { operator, filters }
    }

    pub fn add_filter(&mut self, filter: impl Into<Filter>) -> &mut Self {
        self.filters.push(filter.into());
        self
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl From<FilterList> for Filter {
    fn from(list: FilterList) -> Self {
        Filter::List(list)
    }
}
