//! Typed repository over the key-value store
//!
//! One method pair per logical record kind, internally mapped to a
//! namespaced key. Readers validate on load and treat validation
//! failure as "absent".

use crate::store::KvStore;
use chrono::NaiveDate;
use nutriai_shared::{CoreError, HealthProfile, MealLogEntry, ReminderSettings, UserProfile};
use std::path::Path;
use std::sync::{Arc, Mutex};

const KEY_USER_PROFILE: &str = "profile.user";
const KEY_HEALTH_PROFILE: &str = "profile.health";
const KEY_REMINDER_SETTINGS: &str = "settings.reminders";

/// Key for one calendar day's diary sequence
fn diary_key(date: NaiveDate) -> String {
    format!("diary.{}", date.format("%Y-%m-%d"))
}

/// Shared handle to the typed record store
///
/// Access is logically single-threaded; the mutex exists only to
/// satisfy aliasing across the components that hold a handle.
#[derive(Clone)]
pub struct Records {
    inner: Arc<Mutex<KvStore>>,
}

impl Records {
    /// Open the backing store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        Ok(Self {
            inner: Arc::new(Mutex::new(KvStore::open(path)?)),
        })
    }

    /// Wrap an already-open store
    pub fn new(store: KvStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Load the committed user profile, if onboarding has completed
    pub fn user_profile(&self) -> Option<UserProfile> {
        self.lock().get(KEY_USER_PROFILE)
    }

    /// Replace the user profile wholesale
    pub fn set_user_profile(&self, profile: &UserProfile) -> Result<(), CoreError> {
        self.lock().set(KEY_USER_PROFILE, profile)
    }

    /// Load the generated health profile, if present
    pub fn health_profile(&self) -> Option<HealthProfile> {
        self.lock().get(KEY_HEALTH_PROFILE)
    }

    /// Replace the health profile wholesale
    pub fn set_health_profile(&self, profile: &HealthProfile) -> Result<(), CoreError> {
        self.lock().set(KEY_HEALTH_PROFILE, profile)
    }

    /// Load reminder settings; an unsaved or corrupt record yields the
    /// defaults (all three slots present, disabled).
    pub fn reminder_settings(&self) -> ReminderSettings {
        self.lock().get(KEY_REMINDER_SETTINGS).unwrap_or_default()
    }

    /// Replace reminder settings wholesale
    pub fn set_reminder_settings(&self, settings: &ReminderSettings) -> Result<(), CoreError> {
        self.lock().set(KEY_REMINDER_SETTINGS, settings)
    }

    /// Load one day's diary sequence; absence is an empty day, not an
    /// error.
    pub fn diary_day(&self, date: NaiveDate) -> Vec<MealLogEntry> {
        self.lock().get(&diary_key(date)).unwrap_or_default()
    }

    /// Persist one day's full diary sequence
    pub fn set_diary_day(&self, date: NaiveDate, entries: &[MealLogEntry]) -> Result<(), CoreError> {
        self.lock().set(&diary_key(date), &entries)
    }

    /// Wipe everything (used when the user restarts onboarding)
    pub fn clear(&self) -> Result<(), CoreError> {
        self.lock().clear()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, KvStore> {
        // A poisoned mutex means a panic mid-write; the store's
        // contents are still the last flushed state.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
