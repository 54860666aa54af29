//! Single dispatch over the filter tree.
//!
//! `evaluate` answers two questions at once: does the row survive, and which
//! of its cells do. A row-level rejection is `None`; otherwise the result
//! holds one flag per input cell.
//!
//! Lists combine at the row level. MustPassAll rejects the row when any
//! child does and ANDs the masks; MustPassOne keeps the row when any child
//! does and ORs the masks of the children that kept it. Both can stop early
//! without changing the result.

use bytes::Bytes;

use super::{Filter, FilterList, Operator, ReturnCode, SingleColumnValueFilter};
use crate::memtable::Cell;

pub(crate) fn evaluate(filter: &Filter, row: &[u8], cells: &[Cell]) -> Option<Vec<bool>> {
    match filter {
        Filter::Row(_) | Filter::RowRange(_) | Filter::Prefix(_) | Filter::Fuzzy(_) => {
            if rejects_row_key(filter, row) {
                None
            } else {
                Some(vec![true; cells.len()])
            }
        },
        Filter::SingleColumnValue(scv) => evaluate_single_column(scv, cells),
        Filter::List(list) => evaluate_list(list, row, cells),
        _ => Some(cell_mask(filter, cells)),
    }
}

fn evaluate_single_column(scv: &SingleColumnValueFilter, cells: &[Cell]) -> Option<Vec<bool>> {
    let mut versions = cells
        .iter()
        .filter(|c| c.is_column(scv.family(), scv.qualifier()));

    let (found, matched) = if scv.latest_version_only {
        match versions.next() {
            Some(latest) => (true, scv.compare.matches(&latest.value)),
            None => (false, false),
        }
    } else {
        let mut found = false;
        let mut matched = false;
        for cell in versions {
            found = true;
            if scv.compare.matches(&cell.value) {
                matched = true;
                break;
            }
        }
        (found, matched)
    };

    let keep = if found { matched } else { !scv.filter_if_missing };
    keep.then(|| vec![true; cells.len()])
}

fn evaluate_list(list: &FilterList, row: &[u8], cells: &[Cell]) -> Option<Vec<bool>> {
    if list.is_empty() {
        return Some(vec![true; cells.len()]);
    }

    match list.operator() {
        Operator::MustPassAll => {
            let mut mask = vec![true; cells.len()];
            for child in list.filters() {
                let child_mask = evaluate(child, row, cells)?;
                for (m, c) in mask.iter_mut().zip(child_mask) {
                    *m &= c;
                }
            }
            Some(mask)
        },
        Operator::MustPassOne => {
            let mut mask: Option<Vec<bool>> = None;
            for child in list.filters() {
                let Some(child_mask) = evaluate(child, row, cells) else {
                    continue;
                };
                match mask.as_mut() {
                    None => mask = Some(child_mask),
                    Some(mask) => {
                        for (m, c) in mask.iter_mut().zip(child_mask) {
                            *m |= c;
                        }
                    },
                }
                if mask.as_ref().is_some_and(|m| m.iter().all(|keep| *keep)) {
                    break;
                }
            }
            mask
        },
    }
}

/// Walk the row's cells through a per-cell leaf.
fn cell_mask(filter: &Filter, cells: &[Cell]) -> Vec<bool> {
    let mut mask = vec![false; cells.len()];
    let mut included = 0usize;

    for (i, cell) in cells.iter().enumerate() {
        match cell_code(filter, cell, included) {
            ReturnCode::Include => {
                mask[i] = true;
                included += 1;
            },
            ReturnCode::Exclude => {},
            ReturnCode::SkipRow => break,
        }
    }
    mask
}

fn cell_code(filter: &Filter, cell: &Cell, included: usize) -> ReturnCode {
    let pass = |ok: bool| {
        if ok {
            ReturnCode::Include
        } else {
            ReturnCode::Exclude
        }
    };

    match filter {
        Filter::Value(f) => pass(f.matches(&cell.value)),
        Filter::Family(f) => pass(f.matches(&cell.family)),
        Filter::Qualifier(f) => pass(f.matches(&cell.qualifier)),
        Filter::ColumnPrefix(prefix) => pass(cell.qualifier.starts_with(prefix)),
        Filter::MultiColumnPrefix(f) => pass(f.matches(&cell.qualifier)),
        Filter::FirstKeyOnly => {
            if included == 0 {
                ReturnCode::Include
            } else {
                ReturnCode::SkipRow
            }
        },
        Filter::ColumnCount(limit) => {
            if included < *limit {
                ReturnCode::Include
            } else {
                ReturnCode::SkipRow
            }
        },
        Filter::KeyOnly => ReturnCode::Include,
        // row-level variants never reach the per-cell walk
        Filter::Row(_)
        | Filter::RowRange(_)
        | Filter::Prefix(_)
        | Filter::Fuzzy(_)
        | Filter::SingleColumnValue(_)
        | Filter::List(_) => ReturnCode::Include,
    }
}

/// Values are dropped from the result when a KeyOnly filter appears
/// anywhere in the tree.
pub(crate) fn strips_values(filter: &Filter) -> bool {
    match filter {
        Filter::KeyOnly => true,
        Filter::List(list) => list.filters().iter().any(strips_values),
        _ => false,
    }
}

pub(crate) fn rejects_row_key(filter: &Filter, row: &[u8]) -> bool {
    match filter {
        Filter::Row(f) => !f.matches(row),
        Filter::RowRange(f) => !f.contains(row),
        Filter::Prefix(prefix) => !row.starts_with(prefix),
        Filter::Fuzzy(f) => !f.matches(row),
        Filter::List(list) if !list.is_empty() => match list.operator() {
            Operator::MustPassAll => list.filters().iter().any(|f| rejects_row_key(f, row)),
            Operator::MustPassOne => list.filters().iter().all(|f| rejects_row_key(f, row)),
        },
        _ => false,
    }
}

/// Every key in `(row, hint)` is rejected by the filter. Only meaningful
/// right after `rejects_row_key(filter, row)` returned true.
pub(crate) fn next_row_hint(filter: &Filter, row: &[u8]) -> Option<Bytes> {
    let hint = match filter {
        Filter::Row(f) => f.seek_hint(row),
        Filter::RowRange(f) => f.seek_hint(row),
        Filter::Prefix(prefix) => (row < prefix.as_ref()).then(|| prefix.clone()),
        Filter::Fuzzy(f) => f.seek_hint(row),
        Filter::List(list) if !list.is_empty() => match list.operator() {
            Operator::MustPassAll => list
                .filters()
                .iter()
                .filter(|f| rejects_row_key(f, row))
                .filter_map(|f| next_row_hint(f, row))
                .max(),
            Operator::MustPassOne => {
                let mut lowest: Option<Bytes> = None;
                for f in list.filters() {
                    let h = next_row_hint(f, row)?;
                    if lowest.as_ref().is_none_or(|l| h < *l) {
                        lowest = Some(h);
                    }
                }
                lowest
            },
        },
        _ => None,
    };

    hint.filter(|h| h.as_ref() > row)
}

pub(crate) fn filter_all_remaining(filter: &Filter, row: &[u8]) -> bool {
    match filter {
        Filter::Row(f) => f.rejects_everything_after(row),
        Filter::RowRange(f) => f.is_exhausted_after(row),
        Filter::Prefix(prefix) => row > prefix.as_ref() && !row.starts_with(prefix),
        Filter::Fuzzy(f) => f.is_exhausted_after(row),
        Filter::List(list) if !list.is_empty() => match list.operator() {
            Operator::MustPassAll => list.filters().iter().any(|f| filter_all_remaining(f, row)),
            Operator::MustPassOne => list.filters().iter().all(|f| filter_all_remaining(f, row)),
        },
        _ => false,
    }
}
