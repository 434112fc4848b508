use crate::store::ScoreStore;

/// Running maximum of the score stream, written through to the store on every increase.
#[derive(Debug, Clone)]
pub struct HighScoreAggregator {
    key: String,
    best: Option<u32>,
    last_seen: Option<u32>,
}

impl HighScoreAggregator {
    /// Folds the persisted value in as the first observation. Seeding never writes.
    pub fn seeded<S: ScoreStore + ?Sized>(store: &S, key: &str) -> Self {
        let persisted = store.get_int(key);
        let seed = u32::try_from(persisted.max(0)).unwrap_or(u32::MAX);
        let mut aggregator = Self {
            key: key.to_string(),
            best: None,
            last_seen: None,
        };
        aggregator.fold(seed);
        tracing::debug!(key, seed, "high score seeded");
        aggregator
    }

    pub fn best(&self) -> u32 {
        self.best.unwrap_or(0)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the new best when `value` raises it. A failed store write is
    /// logged and otherwise ignored; the in-memory best still advances.
    pub fn observe<S: ScoreStore + ?Sized>(&mut self, store: &mut S, value: u32) -> Option<u32> {
        let best = self.fold(value)?;
        if let Err(err) = store.set_int(&self.key, i64::from(best)) {
            tracing::error!(key = %self.key, best, %err, "failed to persist high score");
        } else {
            tracing::info!(best, "new high score");
        }
        Some(best)
    }

    fn fold(&mut self, value: u32) -> Option<u32> {
        if self.last_seen == Some(value) {
            return None;
        }
        self.last_seen = Some(value);
        match self.best {
            Some(best) if value <= best => None,
            _ => {
                self.best = Some(value);
                Some(value)
            }
        }
    }
}
