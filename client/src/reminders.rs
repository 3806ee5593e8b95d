//! Meal reminder scheduling
//!
//! Computes per-slot fire times from wall-clock settings and owns the
//! set of pending one-shot timers. Scheduling is same-day only: a slot
//! whose time has already passed today is skipped, with no catch-up
//! and no next-day rollover. Every settings change goes through a full
//! cancel-then-reschedule so a slot can never hold two live timers.

use chrono::{Local, NaiveDateTime};
use nutriai_shared::validation::parse_clock_time;
use nutriai_shared::{CoreError, MealSlot, ReminderSettings};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Fixed notification title
pub const REMINDER_TITLE: &str = "NutriAI meal reminder";

/// Slot-specific notification body
pub fn reminder_body(slot: MealSlot) -> String {
    format!(
        "Time for {}! Don't forget to log your meal to keep your streak going.",
        slot.label()
    )
}

/// Notification side channel
///
/// Firing is fire-and-forget; nothing is queried back. Permission
/// requests are synchronous from the caller's point of view and return
/// the final grant state.
pub trait Notifier: Send + Sync {
    fn permission_granted(&self) -> bool;
    fn request_permission(&self) -> bool;
    fn notify(&self, title: &str, body: &str);
}

/// Production notifier: renders notifications into the log stream
///
/// Desktop notification delivery is platform-specific and outside this
/// core, so permission is always considered granted here. The trait
/// seam keeps the ask-on-enable flow intact for real channels.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn permission_granted(&self) -> bool {
        true
    }

    fn request_permission(&self) -> bool {
        true
    }

    fn notify(&self, title: &str, body: &str) {
        info!(title, body, "Reminder fired");
    }
}

/// Compute the slots that should fire today, in fixed slot order
///
/// A slot qualifies when it is enabled and its wall-clock time,
/// resolved against `now`'s date, is strictly after `now`. Slots with
/// unparseable times are skipped.
pub fn upcoming_fires(
    settings: &ReminderSettings,
    now: NaiveDateTime,
) -> Vec<(MealSlot, NaiveDateTime)> {
    let mut fires = Vec::new();
    for (slot, reminder) in settings.iter() {
        if !reminder.enabled {
            continue;
        }
        let Some((hour, minute)) = parse_clock_time(&reminder.time) else {
            debug!(%slot, time = %reminder.time, "Skipping slot with unparseable time");
            continue;
        };
        let fire = now
            .date()
            .and_hms_opt(hour, minute, 0)
            .expect("hour/minute validated by parse_clock_time");
        if fire > now {
            fires.push((slot, fire));
        }
    }
    fires
}

/// Owner of the pending reminder timers
///
/// Zero to three timers, at most one per enabled slot whose time is
/// still ahead today. Timers are process-lifetime tokio tasks; firing
/// does not depend on any view being open.
pub struct ReminderScheduler {
    notifier: Arc<dyn Notifier>,
    timers: Vec<(MealSlot, JoinHandle<()>)>,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            timers: Vec::new(),
        }
    }

    /// Cancel everything pending and schedule afresh from `settings`
    ///
    /// The cancel happens first unconditionally, so a denied
    /// permission leaves no timers alive (a silent no-op, not an
    /// error).
    pub fn reschedule(&mut self, settings: &ReminderSettings) {
        self.reschedule_at(settings, Local::now().naive_local());
    }

    /// Reschedule against an explicit `now` (separated out for tests)
    pub fn reschedule_at(&mut self, settings: &ReminderSettings, now: NaiveDateTime) {
        self.cancel_all();

        if !self.notifier.permission_granted() {
            debug!("Notification permission not granted, skipping reschedule");
            return;
        }

        for (slot, fire) in upcoming_fires(settings, now) {
            let delay = (fire - now).to_std().unwrap_or(Duration::ZERO);
            let notifier = Arc::clone(&self.notifier);
            let handle = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                notifier.notify(REMINDER_TITLE, &reminder_body(slot));
            });
            debug!(%slot, %fire, "Reminder scheduled");
            self.timers.push((slot, handle));
        }
    }

    /// Cancel every tracked timer. Idempotent.
    pub fn cancel_all(&mut self) {
        for (slot, handle) in self.timers.drain(..) {
            debug!(%slot, "Reminder cancelled");
            handle.abort();
        }
    }

    /// Slots with a live (scheduled, not yet fired) timer
    pub fn pending_slots(&self) -> Vec<MealSlot> {
        self.timers
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(slot, _)| *slot)
            .collect()
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Toggle a slot, asking for notification permission when enabling
///
/// If permission has not been granted, enabling requests it first; a
/// refusal discards the mutation (the slot stays disabled) and
/// surfaces [`CoreError::PermissionRefused`] so the caller can tell
/// the user. Disabling never prompts.
pub fn set_slot_enabled(
    settings: &mut ReminderSettings,
    slot: MealSlot,
    enabled: bool,
    notifier: &dyn Notifier,
) -> Result<(), CoreError> {
    if enabled && !notifier.permission_granted() && !notifier.request_permission() {
        return Err(CoreError::PermissionRefused);
    }
    settings.slot_mut(slot).enabled = enabled;
    Ok(())
}
