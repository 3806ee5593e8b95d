//! View router
//!
//! The active screen is a pure function of three inputs: whether the
//! initial load has finished, whether a committed profile pair exists,
//! and the selected tab. Data-dependent screens are unreachable before
//! their data.

use serde::{Deserialize, Serialize};

/// Main navigation tabs, available once onboarding has completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Dashboard,
    Diary,
    Plans,
    Recipes,
}

/// Every reachable screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Splash,
    Onboarding,
    Dashboard,
    Diary,
    Plans,
    Recipes,
}

impl From<Tab> for Screen {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::Dashboard => Screen::Dashboard,
            Tab::Diary => Screen::Diary,
            Tab::Plans => Screen::Plans,
            Tab::Recipes => Screen::Recipes,
        }
    }
}

/// Routing state
#[derive(Debug, Clone)]
pub struct ViewRouter {
    loading: bool,
    onboarded: bool,
    tab: Tab,
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRouter {
    /// A fresh router shows the splash screen until the initial load
    /// reports in.
    pub fn new() -> Self {
        Self {
            loading: true,
            onboarded: false,
            tab: Tab::default(),
        }
    }

    /// Record the initial-load outcome: whether a committed
    /// UserProfile + HealthProfile pair was found.
    pub fn finish_loading(&mut self, onboarded: bool) {
        self.loading = false;
        self.onboarded = onboarded;
    }

    /// Unlock the tabs after onboarding commits a profile pair
    pub fn mark_onboarded(&mut self) {
        self.onboarded = true;
    }

    /// Back to onboarding (profile wiped)
    pub fn reset_onboarding(&mut self) {
        self.onboarded = false;
        self.tab = Tab::default();
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// The screen to render right now
    pub fn active_screen(&self) -> Screen {
        if self.loading {
            Screen::Splash
        } else if !self.onboarded {
            Screen::Onboarding
        } else {
            Screen::from(self.tab)
        }
    }
}
