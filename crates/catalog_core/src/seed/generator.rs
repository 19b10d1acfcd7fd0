//! Seed run orchestration.
//!
//! # Responsibility
//! - Take the run-once lock, apply the idempotency guard, then write
//!   categories followed by items through the batching policy.
//!
//! # Invariants
//! - The guard is evaluated while holding the lock, so two processes
//!   starting together cannot both seed.
//! - The lock is released on every exit path after it was acquired.
//! - A skipped run (locked or already seeded) returns `Ok` with zero
//!   counters; the reason is only visible in logs.

use crate::model::category::{CategoryId, NewCategory};
use crate::model::item::NewItem;
use crate::repo::category_repo::CategoryRepository;
use crate::repo::item_repo::ItemRepository;
use crate::repo::seed_lock_repo::{LockHolder, SeedLockRepository};
use crate::repo::{RepoError, RepoResult};
use crate::seed::batch::{BatchSink, BatchStats, BatchWriter};
use crate::seed::fake_data::CatalogFaker;
use crate::seed::{SeedResult, SeedSettings};
use log::{error, info, warn};
use serde::Serialize;
use std::num::NonZeroUsize;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Name of the advisory lock row guarding seed runs.
pub const SEED_LOCK_NAME: &str = "catalog_seed";
/// Lock age after which a skipped run warns that the holder likely crashed.
pub const STALE_LOCK_AGE_MS: i64 = 10 * 60 * 1000;

/// Counters for one seed invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub categories_written: u64,
    pub items_written: u64,
    pub category_flushes: u64,
    pub item_flushes: u64,
    pub largest_item_batch: usize,
    pub elapsed_ms: u64,
}

/// Populates an empty catalog; see the module docs for the run protocol.
pub struct SeedGenerator<C, I, L> {
    categories: C,
    items: I,
    locks: L,
    settings: SeedSettings,
}

impl<C, I, L> SeedGenerator<C, I, L>
where
    C: CategoryRepository,
    I: ItemRepository,
    L: SeedLockRepository,
{
    pub fn new(categories: C, items: I, locks: L, settings: SeedSettings) -> Self {
        Self {
            categories,
            items,
            locks,
            settings,
        }
    }

    /// Runs one seed pass.
    ///
    /// # Errors
    /// - `SeedError::InvalidSettings` before any storage access.
    /// - `SeedError::Repo` when a count, flush or lock operation fails; the
    ///   store may then be partially seeded and must be cleared before a
    ///   new run can write anything.
    pub fn run(&self) -> SeedResult<SeedReport> {
        let batch_size = self.settings.validate()?;
        let started_at = Instant::now();
        let owner = Uuid::new_v4();

        info!(
            "event=seed_run module=seed status=start categories={} items={} batch_size={} owner={owner}",
            self.settings.category_count, self.settings.item_count, batch_size
        );

        if !self.locks.try_acquire(SEED_LOCK_NAME, owner)? {
            self.log_lock_held()?;
            return Ok(with_elapsed(SeedReport::default(), started_at));
        }

        let outcome = self.run_locked(batch_size);
        let released = self.locks.release(SEED_LOCK_NAME, owner);

        match (outcome, released) {
            (Ok(Some(report)), Ok(_)) => {
                let report = with_elapsed(report, started_at);
                info!(
                    "event=seed_run module=seed status=ok categories={} items={} item_batches={} duration_ms={}",
                    report.categories_written,
                    report.items_written,
                    report.item_flushes,
                    report.elapsed_ms
                );
                Ok(report)
            }
            (Ok(None), Ok(_)) => Ok(with_elapsed(SeedReport::default(), started_at)),
            (Ok(_), Err(release_err)) => {
                error!(
                    "event=seed_run module=seed status=error error_code=lock_release_failed error={release_err}"
                );
                Err(release_err.into())
            }
            (Err(err), release) => {
                if let Err(release_err) = release {
                    warn!(
                        "event=seed_lock module=seed status=error error_code=lock_release_failed error={release_err}"
                    );
                }
                error!(
                    "event=seed_run module=seed status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Logs the current holder; warns once it is older than
    /// [`STALE_LOCK_AGE_MS`].
    fn log_lock_held(&self) -> SeedResult<()> {
        let Some(holder) = self.locks.holder(SEED_LOCK_NAME)? else {
            // Released between our claim attempt and this lookup.
            info!("event=seed_run module=seed status=skipped reason=locked holder=none");
            return Ok(());
        };
        let age_ms = lock_age_ms(&holder, now_epoch_ms());
        if age_ms >= STALE_LOCK_AGE_MS {
            warn!(
                "event=seed_run module=seed status=skipped reason=stale_lock holder={} lock_age_ms={age_ms} hint=clear_catalog",
                holder.owner
            );
        } else {
            info!(
                "event=seed_run module=seed status=skipped reason=locked holder={} lock_age_ms={age_ms}",
                holder.owner
            );
        }
        Ok(())
    }

    /// Returns `None` when the guard finds existing rows.
    fn run_locked(&self, batch_size: NonZeroUsize) -> SeedResult<Option<SeedReport>> {
        let existing_categories = self.categories.count()?;
        let existing_items = self.items.count()?;
        if existing_categories > 0 || existing_items > 0 {
            info!(
                "event=seed_run module=seed status=skipped reason=already_seeded categories={existing_categories} items={existing_items}"
            );
            return Ok(None);
        }

        let mut faker = CatalogFaker::new(self.settings.rng_seed);

        let (category_stats, category_ids) = self.write_categories(&mut faker, batch_size)?;
        info!(
            "event=seed_categories module=seed status=ok rows={}",
            category_stats.written
        );

        let item_stats = self.write_items(&mut faker, &category_ids, batch_size)?;
        info!(
            "event=seed_items module=seed status=ok rows={} batches={}",
            item_stats.written, item_stats.flushes
        );

        Ok(Some(SeedReport {
            categories_written: category_stats.written,
            items_written: item_stats.written,
            category_flushes: category_stats.flushes,
            item_flushes: item_stats.flushes,
            largest_item_batch: item_stats.largest_batch,
            elapsed_ms: 0,
        }))
    }

    fn write_categories(
        &self,
        faker: &mut CatalogFaker,
        batch_size: NonZeroUsize,
    ) -> RepoResult<(BatchStats, Vec<CategoryId>)> {
        let sink = CategorySink {
            repo: &self.categories,
            ids: Vec::with_capacity(self.settings.category_count as usize),
        };
        let mut writer = BatchWriter::new("category", batch_size, sink);
        for index in 0..self.settings.category_count {
            writer.push(faker.category(index))?;
        }
        let (stats, sink) = writer.finish()?;
        Ok((stats, sink.ids))
    }

    fn write_items(
        &self,
        faker: &mut CatalogFaker,
        category_ids: &[CategoryId],
        batch_size: NonZeroUsize,
    ) -> RepoResult<BatchStats> {
        let sink = ItemSink { repo: &self.items };
        let mut writer = BatchWriter::new("item", batch_size, sink);
        for index in 0..self.settings.item_count {
            writer.push(faker.item(index, category_ids)?)?;
        }
        let (stats, _) = writer.finish()?;
        Ok(stats)
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

/// Milliseconds since `holder` took the lock; clock skew clamps to zero.
fn lock_age_ms(holder: &LockHolder, now_ms: i64) -> i64 {
    now_ms.saturating_sub(holder.acquired_at).max(0)
}

fn with_elapsed(report: SeedReport, started_at: Instant) -> SeedReport {
    SeedReport {
        elapsed_ms: u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX),
        ..report
    }
}

/// Persists category batches and keeps the assigned ids for item generation.
struct CategorySink<'a, C> {
    repo: &'a C,
    ids: Vec<CategoryId>,
}

impl<C: CategoryRepository> BatchSink<NewCategory> for CategorySink<'_, C> {
    type Error = RepoError;

    fn write_batch(&mut self, batch: &[NewCategory]) -> Result<(), Self::Error> {
        let saved = self.repo.save_batch(batch)?;
        self.ids.extend(saved.into_iter().map(|category| category.id));
        Ok(())
    }
}

struct ItemSink<'a, I> {
    repo: &'a I,
}

impl<I: ItemRepository> BatchSink<NewItem> for ItemSink<'_, I> {
    type Error = RepoError;

    fn write_batch(&mut self, batch: &[NewItem]) -> Result<(), Self::Error> {
        self.repo.save_batch(batch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{lock_age_ms, STALE_LOCK_AGE_MS};
    use crate::repo::seed_lock_repo::LockHolder;
    use uuid::Uuid;

    fn holder_at(acquired_at: i64) -> LockHolder {
        LockHolder {
            owner: Uuid::new_v4(),
            acquired_at,
        }
    }

    #[test]
    fn lock_age_is_measured_from_acquisition() {
        assert_eq!(lock_age_ms(&holder_at(1_000), 4_000), 3_000);
        assert!(lock_age_ms(&holder_at(0), STALE_LOCK_AGE_MS) >= STALE_LOCK_AGE_MS);
    }

    #[test]
    fn holder_clock_ahead_of_ours_counts_as_fresh() {
        assert_eq!(lock_age_ms(&holder_at(9_000), 4_000), 0);
    }
}
