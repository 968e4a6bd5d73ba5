use std::sync::Mutex;

use anyhow::Result;

use crate::store::Team;

/// In-memory roster cache sitting in front of the teams table. Reads come
/// from the cache once warm; every team mutation has to call [`invalidate`]
/// so the next read goes back to the database.
///
/// [`invalidate`]: TeamCache::invalidate
#[derive(Debug, Default)]
pub struct TeamCache {
    slot: Mutex<Option<Vec<Team>>>,
}

impl TeamCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached roster, calling `load` only when the slot is empty.
    /// A failed load leaves the slot empty, so the next read retries.
    pub fn get_or_load<F>(&self, load: F) -> Result<Vec<Team>>
    where
        F: FnOnce() -> Result<Vec<Team>>,
    {
        let mut guard = self.slot.lock().expect("team cache lock poisoned");
        if let Some(teams) = guard.as_ref() {
            return Ok(teams.clone());
        }
        let teams = load()?;
        *guard = Some(teams.clone());
        Ok(teams)
    }

    pub fn invalidate(&self) {
        let mut guard = self.slot.lock().expect("team cache lock poisoned");
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample() -> Vec<Team> {
        vec![Team {
            id: 1,
            name: "Alba".to_string(),
            strength: 80,
        }]
    }

    #[test]
    fn second_read_skips_the_loader() {
        let cache = TeamCache::new();
        let loads = AtomicUsize::new(0);
        for _ in 0..3 {
            let teams = cache
                .get_or_load(|| {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(sample())
                })
                .unwrap();
            assert_eq!(teams.len(), 1);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalidate_forces_a_reload() {
        let cache = TeamCache::new();
        let loads = AtomicUsize::new(0);
        let read = || {
            cache
                .get_or_load(|| {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(sample())
                })
                .unwrap()
        };
        read();
        read();
        cache.invalidate();
        read();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_load_leaves_the_cache_cold() {
        let cache = TeamCache::new();
        let err = cache.get_or_load(|| Err(anyhow::anyhow!("db gone")));
        assert!(err.is_err());

        let loads = AtomicUsize::new(0);
        cache
            .get_or_load(|| {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(sample())
            })
            .unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
