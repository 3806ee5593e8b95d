//! Daily meal diary session
//!
//! Accumulates externally-analyzed meals into an append-only per-day
//! log. Each append stamps a fresh id and timestamp and persists the
//! whole day's sequence immediately; entries are never edited or
//! deleted.

use crate::store::Records;
use chrono::{Local, NaiveDate};
use nutriai_shared::{AnalyzedMeal, CoreError, MealLogEntry};
use tracing::debug;

/// One calendar day's meal log, bound to its diary key
///
/// The active date is fixed when the session loads; crossing midnight
/// while a session is open does not move entries. The next load starts
/// the new day empty.
pub struct DiarySession {
    date: NaiveDate,
    entries: Vec<MealLogEntry>,
    records: Records,
}

impl DiarySession {
    /// Load the log for today's local calendar date
    pub fn load_today(records: Records) -> Self {
        Self::load_for_date(records, Local::now().date_naive())
    }

    /// Load the log for an explicit date; an absent day is empty
    pub fn load_for_date(records: Records, date: NaiveDate) -> Self {
        let entries = records.diary_day(date);
        debug!(%date, entries = entries.len(), "Diary session loaded");
        Self {
            date,
            entries,
            records,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn entries(&self) -> &[MealLogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an analyzed meal and persist the updated day
    ///
    /// The only mutation path. A failed persist rolls the in-memory
    /// append back so the sequence always reflects what is on disk.
    pub fn append(
        &mut self,
        meal: AnalyzedMeal,
        image_ref: Option<String>,
    ) -> Result<&MealLogEntry, CoreError> {
        let entry = MealLogEntry::from_analysis(meal, image_ref);
        self.entries.push(entry);
        if let Err(e) = self.records.set_diary_day(self.date, &self.entries) {
            self.entries.pop();
            return Err(e);
        }
        Ok(self.entries.last().expect("entry was just pushed"))
    }

    /// Total calories logged today, recomputed on demand
    pub fn total_calories(&self) -> f64 {
        self.entries.iter().map(|e| e.calories).sum()
    }
}
