use crate::base::Result;
use crate::shape::Morphology;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Identifies an energy-density table evaluated over the aspect-ratio grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct TableKey {
    pub morphology: Morphology,
    pub fingerprint: u64,
    pub grid: u64,
}

/// Identifies an equilibrium aspect ratio
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ResultKey {
    pub morphology: Morphology,
    pub bucket: i64,
    pub gamma: u64,
    pub fingerprint: u64,
    pub grid: u64,
}

/// Holds energy-density tables and equilibrium aspect ratios computed by the grid search
///
/// The cache may be shared among threads and solvers through an [Arc]. It only stores values
/// that are recomputed identically on a miss; hence, clearing it never changes the results.
#[derive(Debug, Default)]
pub struct AspectRatioCache {
    tables: RwLock<HashMap<TableKey, Arc<Vec<f64>>>>,
    results: RwLock<HashMap<ResultKey, f64>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl AspectRatioCache {
    /// Allocates a new (empty) instance
    pub fn new() -> Self {
        AspectRatioCache::default()
    }

    /// Removes all tables and results and resets the statistics
    pub fn clear(&self) {
        self.tables.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.results.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Returns the number of cached equilibrium aspect ratios
    pub fn len(&self) -> usize {
        self.results.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Indicates that no tables and no results are cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.n_tables() == 0
    }

    /// Returns the number of cached energy-density tables
    pub fn n_tables(&self) -> usize {
        self.tables.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns the number of result lookups that found a value
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the number of result lookups that did not find a value
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// Looks up an equilibrium aspect ratio
    pub(crate) fn result(&self, key: &ResultKey) -> Option<f64> {
        let found = self
            .results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Stores an equilibrium aspect ratio
    pub(crate) fn store_result(&self, key: ResultKey, aspect_ratio: f64) {
        self.results
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, aspect_ratio);
    }

    /// Returns the table with the given key, building (and storing) it if necessary
    ///
    /// The lock is not held while building; two threads may thus build the same table.
    pub(crate) fn table<F>(&self, key: &TableKey, build: F) -> Result<(Arc<Vec<f64>>, bool)>
    where
        F: FnOnce() -> Result<Vec<f64>>,
    {
        if let Some(table) = self.tables.read().unwrap_or_else(PoisonError::into_inner).get(key) {
            return Ok((Arc::clone(table), false));
        }
        let table = Arc::new(build()?);
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(*key, Arc::clone(&table));
        Ok((table, true))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{AspectRatioCache, ResultKey, TableKey};
    use crate::base::Error;
    use crate::shape::Morphology;
    use std::sync::Arc;

    fn result_key(bucket: i64) -> ResultKey {
        ResultKey {
            morphology: Morphology::Plate,
            bucket,
            gamma: 0.05_f64.to_bits(),
            fingerprint: 123,
            grid: 456,
        }
    }

    #[test]
    fn results_work() {
        let cache = AspectRatioCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.result(&result_key(1)), None);
        cache.store_result(result_key(1), 2.5);
        assert_eq!(cache.result(&result_key(1)), Some(2.5));
        assert_eq!(cache.result(&result_key(2)), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 2);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.result(&result_key(1)), None);
    }

    #[test]
    fn tables_work() {
        let cache = AspectRatioCache::new();
        let key = TableKey {
            morphology: Morphology::Needle,
            fingerprint: 1,
            grid: 2,
        };
        let (table, built) = cache.table(&key, || Ok(vec![1.0, 2.0])).unwrap();
        assert!(built);
        assert_eq!(*table, vec![1.0, 2.0]);
        let (again, built) = cache.table(&key, || Ok(vec![3.0])).unwrap();
        assert!(!built);
        assert!(Arc::ptr_eq(&table, &again));
        assert_eq!(cache.n_tables(), 1);
        let other = TableKey { fingerprint: 3, ..key };
        assert_eq!(
            cache.table(&other, || Err(Error::InvalidInput("bad".to_string()))).err(),
            Some(Error::InvalidInput("bad".to_string()))
        );
        assert_eq!(cache.n_tables(), 1);
    }

    #[test]
    fn cache_is_shareable() {
        let cache = Arc::new(AspectRatioCache::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.store_result(result_key(i), i as f64))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.result(&result_key(3)), Some(3.0));
    }
}
