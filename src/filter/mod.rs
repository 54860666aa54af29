/// Filter Engine for cellbase
///
/// Filters are immutable predicates evaluated by the scan executor on every
/// row it visits. Each filter decides per cell with one of three outcomes
/// (INCLUDE, EXCLUDE, SKIP_ROW) and/or per row (a row-key predicate, or a
/// decision taken after seeing all the row's cells).
///
/// # Filter kinds
///
/// ```text
/// per cell     Value, Family, Qualifier, ColumnPrefix, MultiColumnPrefix,
///              FirstKeyOnly, ColumnCount, KeyOnly
/// per row key  Row, RowRange, Prefix, Fuzzy
/// per row      SingleColumnValue
/// combinator   List(MustPassAll | MustPassOne)
/// ```
///
/// Row-key filters can also tell the scanner where the next possibly
/// matching row starts (seek hint) and when no later row can match at all.
///
/// # Construction
///
/// Constructors validate their arguments eagerly and fail with
/// `InvalidFilterConfig`, `EmptyFilterConfig` or `MalformedKeyRange`.
///
/// ```ignore
/// use cellbase::filter::{CompareOp, Comparator, Filter};
///
/// let wang = Filter::value(CompareOp::Equal, Comparator::substring("Wang"))?;
/// let rows = Filter::prefix("row1");
/// let both = Filter::all(vec![wang, rows]);
/// ```
pub mod comparator;
mod evaluator;
pub mod fuzzy;
pub mod list;
pub mod row_range;

use bytes::Bytes;

pub use comparator::{CompareFilter, CompareOp, Comparator};
pub use fuzzy::{FUZZY_FIXED, FUZZY_WILDCARD, FuzzyRowFilter, FuzzyRule};
pub use list::{FilterList, Operator};
pub use row_range::{MultiRowRangeFilter, RowRange};

use crate::{
    memtable::Cell,
    util::{Result, Status},
};

/// Outcome of evaluating a filter on one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    /// Keep the cell
    Include,
    /// Drop the cell, keep evaluating the row
    Exclude,
    /// Drop this and every remaining cell of the row
    SkipRow,
}

/// Row-level filter on the value of one designated column.
///
/// If the column is present and its value matches, every cell of the row is
/// kept; if it is present and does not match, the row is dropped. Rows
/// without the column are kept unless `filter_if_missing` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleColumnValueFilter {
    family: Bytes,
    qualifier: Bytes,
    compare: CompareFilter,
    filter_if_missing: bool,
    latest_version_only: bool,
}

impl SingleColumnValueFilter {
    pub fn new(
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        op: CompareOp,
        comparator: Comparator,
    ) -> Result<Self> {
        Ok(SingleColumnValueFilter {
            family: family.into(),
            qualifier: qualifier.into(),
            compare: CompareFilter::new(op, comparator)?,
            filter_if_missing: false,
            latest_version_only: true,
        })
    }

    /// Drop rows that do not have the column at all
    pub fn filter_if_missing(mut self, filter_if_missing: bool) -> Self {
        self.filter_if_missing = filter_if_missing;
        self
    }

    /// Test only the newest version of the column (default) or any version
    pub fn latest_version_only(mut self, latest_version_only: bool) -> Self {
        self.latest_version_only = latest_version_only;
        self
    }

    pub fn family(&self) -> &Bytes {
        &self.family
    }

    pub fn qualifier(&self) -> &Bytes {
        &self.qualifier
    }
}

impl From<SingleColumnValueFilter> for Filter {
    fn from(filter: SingleColumnValueFilter) -> Self {
        Filter::SingleColumnValue(filter)
    }
}

/// Qualifier must start with one of a non-empty set of prefixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleColumnPrefixFilter {
    prefixes: Vec<Bytes>,
}

impl MultipleColumnPrefixFilter {
    pub fn new<P: Into<Bytes>>(prefixes: impl IntoIterator<Item = P>) -> Result<Self> {
        let mut prefixes: Vec<Bytes> = prefixes.into_iter().map(Into::into).collect();
        if prefixes.is_empty() {
            return Err(Status::empty_filter_config(
                "multiple column prefix filter needs at least one prefix",
            ));
        }
        prefixes.sort();
        prefixes.dedup();
        Ok(MultipleColumnPrefixFilter { prefixes })
    }

    pub fn prefixes(&self) -> &[Bytes] {
        &self.prefixes
    }

    pub fn matches(&self, qualifier: &[u8]) -> bool {
        self.prefixes.iter().any(|p| qualifier.starts_with(p))
    }
}

/// A filter tree
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Per cell: compare the value
    Value(CompareFilter),
    /// Per row: compare one designated column's value
    SingleColumnValue(SingleColumnValueFilter),
    /// Per cell: compare the family name
    Family(CompareFilter),
    /// Per cell: compare the qualifier
    Qualifier(CompareFilter),
    /// Per row key: compare the row key
    Row(CompareFilter),
    /// Per row key: row key within any of a set of ranges
    RowRange(MultiRowRangeFilter),
    /// Per row key: row key starts with the prefix
    Prefix(Bytes),
    /// Per row key: row key matches any (pattern, mask) rule
    Fuzzy(FuzzyRowFilter),
    /// Per cell: qualifier starts with the prefix
    ColumnPrefix(Bytes),
    /// Per cell: qualifier starts with any of the prefixes
    MultiColumnPrefix(MultipleColumnPrefixFilter),
    /// Per cell: only the first cell of each row
    FirstKeyOnly,
    /// Per cell: keep every cell but strip its value
    KeyOnly,
    /// Per cell: only the first N cells of each row
    ColumnCount(usize),
    /// Combinator
    List(FilterList),
}

impl Filter {
    pub fn value(op: CompareOp, comparator: Comparator) -> Result<Filter> {
        Ok(Filter::Value(CompareFilter::new(op, comparator)?))
    }

    pub fn single_column_value(
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        op: CompareOp,
        comparator: Comparator,
    ) -> Result<Filter> {
        SingleColumnValueFilter::new(family, qualifier, op, comparator).map(Filter::from)
    }

    pub fn family(op: CompareOp, comparator: Comparator) -> Result<Filter> {
        Ok(Filter::Family(CompareFilter::new(op, comparator)?))
    }

    pub fn qualifier(op: CompareOp, comparator: Comparator) -> Result<Filter> {
        Ok(Filter::Qualifier(CompareFilter::new(op, comparator)?))
    }

    pub fn row(op: CompareOp, comparator: Comparator) -> Result<Filter> {
        Ok(Filter::Row(CompareFilter::new(op, comparator)?))
    }

    pub fn row_ranges(ranges: Vec<RowRange>) -> Result<Filter> {
        Ok(Filter::RowRange(MultiRowRangeFilter::new(ranges)?))
    }

    pub fn prefix(prefix: impl Into<Bytes>) -> Filter {
        Filter::Prefix(prefix.into())
    }

    pub fn fuzzy<P, M>(pairs: impl IntoIterator<Item = (P, M)>) -> Result<Filter>
    where
        P: Into<Bytes>,
        M: Into<Bytes>,
    {
        Ok(Filter::Fuzzy(FuzzyRowFilter::from_pairs(pairs)?))
    }

    pub fn column_prefix(prefix: impl Into<Bytes>) -> Filter {
        Filter::ColumnPrefix(prefix.into())
    }

    pub fn multi_column_prefix<P: Into<Bytes>>(
        prefixes: impl IntoIterator<Item = P>,
    ) -> Result<Filter> {
        Ok(Filter::MultiColumnPrefix(MultipleColumnPrefixFilter::new(
            prefixes,
        )?))
    }

    pub fn first_key_only() -> Filter {
        Filter::FirstKeyOnly
    }

    pub fn key_only() -> Filter {
        Filter::KeyOnly
    }

    pub fn column_count(limit: usize) -> Filter {
        Filter::ColumnCount(limit)
    }

    /// AND of the given filters
    pub fn all(filters: Vec<Filter>) -> Filter {
        Filter::List(FilterList::with_filters(Operator::MustPassAll, filters))
    }

    /// OR of the given filters
    pub fn any(filters: Vec<Filter>) -> Filter {
        Filter::List(FilterList::with_filters(Operator::MustPassOne, filters))
    }

    /// Evaluate the filter on one row.
    ///
    /// `cells` must be the row's cells in store order (family, qualifier,
    /// newest first). Returns `Include` if the row passes the filter and
    /// `SkipRow` if it does not. A passing row may still have every cell
    /// excluded; see [`Filter::apply`].
    pub fn evaluate_row(&self, row: &[u8], cells: &[Cell]) -> ReturnCode {
        match evaluator::evaluate(self, row, cells) {
            Some(_) => ReturnCode::Include,
            None => ReturnCode::SkipRow,
        }
    }

    /// Cells of the row that survive the filter, or None if the row is
    /// filtered out entirely.
    pub fn apply(&self, row: &[u8], cells: Vec<Cell>) -> Option<Vec<Cell>> {
        let mask = evaluator::evaluate(self, row, &cells)?;
        let strip_values = evaluator::strips_values(self);

        let kept: Vec<Cell> = cells
            .into_iter()
            .zip(mask)
            .filter_map(|(mut cell, keep)| {
                if !keep {
                    return None;
                }
                if strip_values {
                    cell.value = Bytes::new();
                }
                Some(cell)
            })
            .collect();

        (!kept.is_empty()).then_some(kept)
    }

    /// Whether the row is rejected from its key alone, before reading any
    /// cell.
    pub fn rejects_row_key(&self, row: &[u8]) -> bool {
        evaluator::rejects_row_key(self, row)
    }

    /// After `rejects_row_key(row)`, the smallest key that may pass.
    pub fn next_row_hint(&self, row: &[u8]) -> Option<Bytes> {
        evaluator::next_row_hint(self, row)
    }

    /// Every row key greater than `row` is rejected.
    pub fn filter_all_remaining(&self, row: &[u8]) -> bool {
        evaluator::filter_all_remaining(self, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Code;

    fn cell(row: &'static str, family: &'static str, q: &'static str, v: &'static str) -> Cell {
        Cell::new(row, family, q, 1, v)
    }

    #[test]
    fn test_multi_column_prefix_requires_prefixes() {
        let err = Filter::multi_column_prefix(Vec::<Bytes>::new()).unwrap_err();
        assert_eq!(err.code(), &Code::EmptyFilterConfig);

        let f = MultipleColumnPrefixFilter::new(["na", "se", "da", "na"]).unwrap();
        assert_eq!(f.prefixes().len(), 3);
        assert!(f.matches(b"name"));
        assert!(f.matches(b"sex"));
        assert!(!f.matches(b"address"));
    }

    #[test]
    fn test_apply_strips_values_for_key_only() {
        let cells = vec![cell("row1", "cf1", "name", "sara")];
        let kept = Filter::key_only().apply(b"row1", cells).unwrap();
        assert_eq!(kept.len(), 1);
        assert!(kept[0].value.is_empty());
        assert_eq!(kept[0].qualifier, Bytes::from("name"));
    }

    #[test]
    fn test_apply_drops_rows_without_surviving_cells() {
        let filter = Filter::qualifier(CompareOp::Equal, Comparator::binary("age")).unwrap();
        let cells = vec![cell("row1", "cf1", "name", "sara")];
        assert_eq!(filter.evaluate_row(b"row1", &cells), ReturnCode::Include);
        assert!(filter.apply(b"row1", cells).is_none());
    }
}
