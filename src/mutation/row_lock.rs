use parking_lot::{Mutex, MutexGuard};

const DEFAULT_STRIPES: usize = 64;

/// Striped row locks.
///
/// Rows hash onto a fixed set of mutexes; two writers of the same row always
/// meet on the same stripe. Unrelated rows rarely contend.
pub struct RowLocks {
    stripes: Vec<Mutex<()>>,
}

impl RowLocks {
    pub fn new() -> Self {
        Self::with_stripes(DEFAULT_STRIPES)
    }

    pub fn with_stripes(n: usize) -> Self {
        let n = n.max(1);
        RowLocks {
            stripes: (0..n).map(|_| Mutex::new(())).collect(),
        }
    }

    #[inline]
    fn stripe(&self, row: &[u8]) -> usize {
        crc32fast::hash(row) as usize % self.stripes.len()
    }

    /// Lock `row` until the guard is dropped
    pub fn lock(&self, row: &[u8]) -> MutexGuard<'_, ()> {
        self.stripes[self.stripe(row)].lock()
    }
}

impl Default for RowLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_row_same_stripe() {
        let locks = RowLocks::new();
        assert_eq!(locks.stripe(b"row1"), locks.stripe(b"row1"));

        let guard = locks.lock(b"row1");
        assert!(locks.stripes[locks.stripe(b"row1")].try_lock().is_none());
        drop(guard);
        assert!(locks.stripes[locks.stripe(b"row1")].try_lock().is_some());
    }

    #[test]
    fn test_single_stripe() {
        let locks = RowLocks::with_stripes(0);
        assert_eq!(locks.stripes.len(), 1);
        let _g = locks.lock(b"a");
    }
}
