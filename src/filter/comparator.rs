use std::cmp::Ordering;

use bytes::Bytes;

use crate::util::{Result, Status, logging::log_debug};

/// Comparison operator applied as `candidate OP operand`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl CompareOp {
    /// Whether `candidate.cmp(operand) == ordering` satisfies this operator
    #[inline]
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Equal => ordering == Ordering::Equal,
            CompareOp::NotEqual => ordering != Ordering::Equal,
            CompareOp::Greater => ordering == Ordering::Greater,
            CompareOp::GreaterOrEqual => ordering != Ordering::Less,
            CompareOp::Less => ordering == Ordering::Less,
            CompareOp::LessOrEqual => ordering != Ordering::Greater,
        }
    }

    fn is_ordering(self) -> bool {
        !matches!(self, CompareOp::Equal | CompareOp::NotEqual)
    }
}

/// How a candidate byte string is compared against the operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparator {
    /// Byte-lexicographic comparison of the whole candidate
    Binary(Bytes),
    /// Byte-lexicographic comparison of the candidate's first
    /// `operand.len()` bytes
    BinaryPrefix(Bytes),
    /// Candidate contains the operand; only EQUAL and NOT_EQUAL apply
    Substring(Bytes),
}

impl Comparator {
    pub fn binary(operand: impl Into<Bytes>) -> Self {
        Comparator::Binary(operand.into())
    }

    pub fn binary_prefix(operand: impl Into<Bytes>) -> Self {
        Comparator::BinaryPrefix(operand.into())
    }

    pub fn substring(operand: impl Into<Bytes>) -> Self {
        Comparator::Substring(operand.into())
    }

    pub fn operand(&self) -> &Bytes {
        match self {
            Comparator::Binary(b) | Comparator::BinaryPrefix(b) | Comparator::Substring(b) => b,
        }
    }

    /// Order `candidate` relative to the operand.
    ///
    /// Substring has no order: a containing candidate is `Equal`, any other
    /// is `Greater`.
    pub fn compare(&self, candidate: &[u8]) -> Ordering {
        match self {
            Comparator::Binary(operand) => candidate.cmp(operand.as_ref()),
            Comparator::BinaryPrefix(operand) => {
                let n = candidate.len().min(operand.len());
                candidate[..n].cmp(operand.as_ref())
            },
            Comparator::Substring(operand) => {
                if contains(candidate, operand) {
                    Ordering::Equal
                } else {
                    Ordering::Greater
                }
            },
        }
    }

    /// Ordering is monotone in the candidate: sorted candidates produce
    /// non-decreasing orderings.
    pub(crate) fn is_ordered(&self) -> bool {
        !matches!(self, Comparator::Substring(_))
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

/// An operator bound to a comparator, validated at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareFilter {
    op: CompareOp,
    comparator: Comparator,
}

impl CompareFilter {
    pub fn new(op: CompareOp, comparator: Comparator) -> Result<Self> {
        if op.is_ordering() && !comparator.is_ordered() {
            log_debug!(
                component = "filter",
                event = "invalid_filter_config",
                op = ?op,
                comparator = ?comparator,
            );
            return Err(Status::invalid_filter_config(format!(
                "substring comparator only supports Equal and NotEqual, got {op:?}"
            )));
        }
        Ok(CompareFilter { op, comparator })
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    #[inline]
    pub fn matches(&self, candidate: &[u8]) -> bool {
        self.op.matches(self.comparator.compare(candidate))
    }

    /// Once a candidate orders after the operand, no larger candidate can
    /// match either.
    pub(crate) fn rejects_everything_after(&self, candidate: &[u8]) -> bool {
        self.comparator.is_ordered()
            && matches!(
                self.op,
                CompareOp::Equal | CompareOp::Less | CompareOp::LessOrEqual
            )
            && self.comparator.compare(candidate) == Ordering::Greater
    }

    /// Smallest candidate worth trying after a rejected `candidate`.
    pub(crate) fn seek_hint(&self, candidate: &[u8]) -> Option<Bytes> {
        let seeks_forward = matches!(
            self.op,
            CompareOp::Equal | CompareOp::Greater | CompareOp::GreaterOrEqual
        );
        if seeks_forward
            && self.comparator.is_ordered()
            && self.comparator.compare(candidate) == Ordering::Less
        {
            return Some(self.comparator.operand().clone());
        }
        None
    }
}
