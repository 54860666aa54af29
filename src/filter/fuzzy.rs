use bytes::Bytes;

use crate::util::{Result, Status, key_successor, logging::log_debug};

/// Mask byte marking a position that matches any byte
pub const FUZZY_WILDCARD: u8 = 1;
/// Mask byte marking a position that must equal the pattern byte
pub const FUZZY_FIXED: u8 = 0;

/// One (pattern, mask) pair of a fuzzy row filter.
///
/// A row key matches when it is at least as long as the pattern and equals
/// the pattern at every fixed position. Bytes after the pattern's length are
/// unconstrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyRule {
    pattern: Bytes,
    mask: Bytes,
}

impl FuzzyRule {
    pub fn new(pattern: impl Into<Bytes>, mask: impl Into<Bytes>) -> Result<Self> {
        let pattern = pattern.into();
        let mask = mask.into();

        if pattern.len() != mask.len() {
            log_debug!(
                component = "filter",
                event = "invalid_filter_config",
                pattern_len = pattern.len(),
                mask_len = mask.len(),
            );
            return Err(Status::invalid_filter_config(format!(
                "fuzzy pattern has {} bytes but mask has {}",
                pattern.len(),
                mask.len()
            )));
        }
        if pattern.is_empty() {
            return Err(Status::invalid_filter_config("fuzzy pattern is empty"));
        }
        if let Some(pos) = mask
            .iter()
            .position(|&m| m != FUZZY_WILDCARD && m != FUZZY_FIXED)
        {
            return Err(Status::invalid_filter_config(format!(
                "fuzzy mask byte {} at position {pos} is neither 0 nor 1",
                mask[pos]
            )));
        }

        // Wildcard positions carry no information; zero them so that seek
        // hints start from the smallest byte.
        let pattern: Vec<u8> = pattern
            .iter()
            .zip(mask.iter())
            .map(|(&p, &m)| if m == FUZZY_WILDCARD { 0 } else { p })
            .collect();

        Ok(FuzzyRule {
            pattern: Bytes::from(pattern),
            mask,
        })
    }

    pub fn matches(&self, row: &[u8]) -> bool {
        row.len() >= self.pattern.len()
            && self
                .pattern
                .iter()
                .zip(self.mask.iter())
                .zip(row)
                .all(|((&p, &m), &r)| m == FUZZY_WILDCARD || p == r)
    }

    /// Smallest key strictly greater than `row` that matches this rule, or
    /// None if there is none.
    pub(crate) fn next_match_after(&self, row: &[u8]) -> Option<Vec<u8>> {
        let n = self.pattern.len();
        let mut result = self.pattern.to_vec();
        // Last wildcard position that can still be incremented
        let mut to_inc: Option<usize> = None;

        for i in 0..n {
            if i >= row.len() {
                // row is a proper prefix of `result`
                return Some(result);
            }

            if self.mask[i] == FUZZY_WILDCARD {
                result[i] = row[i];
                if row[i] != 0xFF {
                    to_inc = Some(i);
                }
            } else if row[i] != self.pattern[i] {
                if row[i] < self.pattern[i] {
                    // Same prefix, bigger fixed byte; the rest is already minimal
                    return Some(result);
                }

                let i = to_inc?;
                result[i] += 1;
                for j in i + 1..n {
                    if self.mask[j] == FUZZY_WILDCARD {
                        result[j] = 0;
                    }
                }
                return Some(result);
            }
        }

        // `row` matches; anything extending it matches as well
        Some(key_successor(row))
    }
}

/// Fuzzy row filter: a row passes if it matches any of the rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyRowFilter {
    rules: Vec<FuzzyRule>,
}

impl FuzzyRowFilter {
    pub fn new(rules: Vec<FuzzyRule>) -> Result<Self> {
        if rules.is_empty() {
            return Err(Status::empty_filter_config(
                "fuzzy row filter needs at least one rule",
            ));
        }
        Ok(FuzzyRowFilter { rules })
    }

    /// Build from raw (pattern, mask) pairs
    pub fn from_pairs<P, M>(pairs: impl IntoIterator<Item = (P, M)>) -> Result<Self>
    where
        P: Into<Bytes>,
        M: Into<Bytes>,
    {
        let rules = pairs
            .into_iter()
            .map(|(p, m)| FuzzyRule::new(p, m))
            .collect::<Result<Vec<_>>>()?;
        FuzzyRowFilter::new(rules)
    }

    pub fn rules(&self) -> &[FuzzyRule] {
        &self.rules
    }

    pub fn matches(&self, row: &[u8]) -> bool {
        self.rules.iter().any(|rule| rule.matches(row))
    }

    /// Closest key after a rejected `row` that some rule accepts
    pub(crate) fn seek_hint(&self, row: &[u8]) -> Option<Bytes> {
        self.rules
            .iter()
            .filter_map(|rule| rule.next_match_after(row))
            .min()
            .map(Bytes::from)
    }

    pub(crate) fn is_exhausted_after(&self, row: &[u8]) -> bool {
        !self.matches(row) && self.seek_hint(row).is_none()
    }
}
