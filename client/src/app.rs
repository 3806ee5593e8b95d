//! Application orchestrator
//!
//! Owns the long-lived pieces (store, router, reminder scheduler, AI
//! provider, chat session, today's diary) and the page-local result
//! state for meal plans and grocery lists. Every AI failure is caught
//! here and converted to component-local error state; unrelated state
//! is never touched.

use crate::ai::NutritionAi;
use crate::chat::ChatSession;
use crate::diary::DiarySession;
use crate::error::{ClientError, ClientResult};
use crate::reminders::{set_slot_enabled, Notifier, ReminderScheduler};
use crate::router::{Screen, Tab, ViewRouter};
use crate::store::Records;
use nutriai_shared::{
    AnalyzedMeal, CoreError, FullRecipe, GroceryList, HealthProfile, MealPlanRequest, MealSlot,
    ReminderSettings, SuggestedRecipe, UserProfile, WeeklyMealPlan,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct App {
    records: Records,
    router: ViewRouter,
    scheduler: ReminderScheduler,
    notifier: Arc<dyn Notifier>,
    ai: Arc<dyn NutritionAi>,
    chat: ChatSession,
    diary: Option<DiarySession>,

    user_profile: Option<UserProfile>,
    health_profile: Option<HealthProfile>,
    meal_plan: Option<WeeklyMealPlan>,
    meal_plan_error: Option<String>,
    grocery_list: Option<GroceryList>,
    grocery_error: Option<String>,
}

impl App {
    pub fn new(records: Records, ai: Arc<dyn NutritionAi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            records,
            router: ViewRouter::new(),
            scheduler: ReminderScheduler::new(Arc::clone(&notifier)),
            notifier,
            chat: ChatSession::new(Arc::clone(&ai)),
            ai,
            diary: None,
            user_profile: None,
            health_profile: None,
            meal_plan: None,
            meal_plan_error: None,
            grocery_list: None,
            grocery_error: None,
        }
    }

    /// Startup: load the committed profiles, open today's diary, move
    /// the router off the splash screen and arm saved reminders.
    ///
    /// Corrupt records were already degraded to absence by the store,
    /// so a damaged profile simply routes back to onboarding.
    pub fn initial_load(&mut self) {
        self.user_profile = self.records.user_profile();
        self.health_profile = self.records.health_profile();
        let onboarded = self.user_profile.is_some() && self.health_profile.is_some();
        self.router.finish_loading(onboarded);
        self.diary = Some(DiarySession::load_today(self.records.clone()));
        self.scheduler.reschedule(&self.records.reminder_settings());
        info!(onboarded, "Initial load complete");
    }

    pub fn active_screen(&self) -> Screen {
        self.router.active_screen()
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.router.select_tab(tab);
    }

    pub fn user_profile(&self) -> Option<&UserProfile> {
        self.user_profile.as_ref()
    }

    pub fn health_profile(&self) -> Option<&HealthProfile> {
        self.health_profile.as_ref()
    }

    pub fn meal_plan(&self) -> Option<&WeeklyMealPlan> {
        self.meal_plan.as_ref()
    }

    pub fn meal_plan_error(&self) -> Option<&str> {
        self.meal_plan_error.as_deref()
    }

    pub fn grocery_list(&self) -> Option<&GroceryList> {
        self.grocery_list.as_ref()
    }

    pub fn grocery_error(&self) -> Option<&str> {
        self.grocery_error.as_deref()
    }

    pub fn diary(&self) -> Option<&DiarySession> {
        self.diary.as_ref()
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Finish onboarding: generate the health profile, then commit the
    /// pair (user profile first) and unlock the tabs.
    ///
    /// Any failure leaves nothing committed; the wizard's output is
    /// discarded and the error surfaced for the onboarding screen.
    pub async fn complete_onboarding(&mut self, profile: UserProfile) -> ClientResult<()> {
        let health = self.ai.generate_health_profile(&profile).await?;
        self.records.set_user_profile(&profile)?;
        self.records.set_health_profile(&health)?;

        self.user_profile = Some(profile);
        self.health_profile = Some(health);
        self.router.mark_onboarded();
        info!("Onboarding complete, profile pair committed");
        Ok(())
    }

    /// Wipe everything and return to onboarding
    pub fn reset(&mut self) -> ClientResult<()> {
        self.records.clear()?;
        self.scheduler.cancel_all();
        self.user_profile = None;
        self.health_profile = None;
        self.meal_plan = None;
        self.meal_plan_error = None;
        self.grocery_list = None;
        self.grocery_error = None;
        self.diary = Some(DiarySession::load_today(self.records.clone()));
        self.router.reset_onboarding();
        Ok(())
    }

    /// Request a fresh weekly meal plan
    ///
    /// The previous plan and its grocery list clear before the call;
    /// a failure therefore shows an error over an empty plan, never a
    /// stale one.
    pub async fn generate_meal_plan(&mut self, request: MealPlanRequest) {
        self.meal_plan = None;
        self.meal_plan_error = None;
        self.grocery_list = None;
        self.grocery_error = None;

        let Some(health) = self.health_profile.clone() else {
            self.meal_plan_error = Some("Complete onboarding before requesting a plan.".to_string());
            return;
        };

        match self.ai.generate_weekly_meal_plan(&health, &request).await {
            Ok(plan) => self.meal_plan = Some(plan),
            Err(e) => {
                warn!(error = %e, "Meal plan generation failed");
                self.meal_plan_error = Some(ClientError::from(e).user_message());
            }
        }
    }

    /// Derive a grocery list from the current plan
    ///
    /// A failure sets only the grocery error; the displayed plan is
    /// untouched.
    pub async fn generate_grocery_list(&mut self) {
        self.grocery_error = None;

        let Some(plan) = self.meal_plan.clone() else {
            self.grocery_error = Some("Generate a meal plan first.".to_string());
            return;
        };

        match self.ai.generate_grocery_list(&plan).await {
            Ok(list) => self.grocery_list = Some(list),
            Err(e) => {
                warn!(error = %e, "Grocery list generation failed");
                self.grocery_error = Some(ClientError::from(e).user_message());
            }
        }
    }

    /// Analyze a meal photo and append the result to today's diary
    pub async fn log_meal_photo(
        &mut self,
        image: &[u8],
        mime_type: &str,
        image_ref: Option<String>,
    ) -> ClientResult<AnalyzedMeal> {
        let analyzed = self.ai.analyze_meal_image(image, mime_type).await?;
        let diary = self
            .diary
            .as_mut()
            .ok_or_else(|| CoreError::Persistence("Diary not loaded yet".to_string()))?;
        diary.append(analyzed.clone(), image_ref)?;
        Ok(analyzed)
    }

    pub async fn suggest_recipes(&self, cuisine: &str) -> ClientResult<Vec<SuggestedRecipe>> {
        let health = self.require_health_profile()?;
        Ok(self.ai.suggest_recipes(cuisine, health).await?)
    }

    pub async fn recipe_details(&self, name: &str) -> ClientResult<FullRecipe> {
        let health = self.require_health_profile()?;
        Ok(self.ai.recipe_details(name, health).await?)
    }

    pub async fn send_chat_message(&mut self, text: &str) -> ClientResult<()> {
        self.chat.send(text).await
    }

    /// Toggle one reminder slot, then persist and rearm
    ///
    /// A refused permission request leaves settings, storage, and
    /// timers exactly as they were.
    pub async fn toggle_reminder(&mut self, slot: MealSlot, enabled: bool) -> ClientResult<()> {
        let mut settings = self.records.reminder_settings();
        set_slot_enabled(&mut settings, slot, enabled, self.notifier.as_ref())?;
        self.update_reminder_settings(settings)
    }

    /// Replace reminder settings wholesale, then reschedule atomically
    pub fn update_reminder_settings(&mut self, settings: ReminderSettings) -> ClientResult<()> {
        self.records.set_reminder_settings(&settings)?;
        self.scheduler.reschedule(&settings);
        Ok(())
    }

    pub fn pending_reminder_slots(&self) -> Vec<MealSlot> {
        self.scheduler.pending_slots()
    }

    /// Cancel every pending reminder timer before exit
    pub fn shutdown(&mut self) {
        self.scheduler.cancel_all();
        info!("Application shut down");
    }

    fn require_health_profile(&self) -> Result<&HealthProfile, CoreError> {
        self.health_profile
            .as_ref()
            .ok_or_else(|| CoreError::Validation("Complete onboarding first.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminders::LogNotifier;
    use crate::store::test_util::temp_store_path;
    use async_trait::async_trait;
    use nutriai_shared::{
        Bmi, DailyNutritionPlan, DayMeals, MacroDistribution, Macros, Meal, MealPlanDay,
        MealPlanMeal,
    };
    use tokio::sync::mpsc;

    fn health_profile() -> HealthProfile {
        let meal = |name: &str, calories: f64| Meal {
            name: name.to_string(),
            description: String::new(),
            calories,
        };
        HealthProfile {
            name: "Sara".to_string(),
            bmi: Bmi {
                value: 22.5,
                category: "Normal weight".to_string(),
            },
            daily_calorie_needs: 2100.0,
            macronutrient_distribution: MacroDistribution {
                protein_grams: 120.0,
                carbs_grams: 220.0,
                fat_grams: 70.0,
            },
            hydration_liters: 2.5,
            wearable_insights: vec![],
            key_recommendations: vec!["More fiber".to_string()],
            daily_nutrition_plan: DailyNutritionPlan {
                breakfast: meal("Oats", 350.0),
                lunch: meal("Chicken and rice", 650.0),
                dinner: meal("Fish and salad", 550.0),
                snacks: vec![],
            },
        }
    }

    fn plan_day(day: u32) -> MealPlanDay {
        let meal = |name: &str| MealPlanMeal {
            name: name.to_string(),
            calories: 500.0,
            protein_g: 30.0,
        };
        MealPlanDay {
            day,
            total_calories: 2000.0,
            macros: Macros {
                protein_g: 120.0,
                carbs_g: 210.0,
                fat_g: 65.0,
            },
            meals: DayMeals {
                breakfast: meal("Eggs"),
                lunch: meal("Koshari"),
                dinner: meal("Grilled fish"),
                snacks: vec![],
            },
        }
    }

    /// Provider stub returning canned results (or failing when unset)
    #[derive(Default)]
    struct StubAi {
        health: Option<HealthProfile>,
        plan: Option<WeeklyMealPlan>,
        grocery: Option<GroceryList>,
    }

    #[async_trait]
    impl NutritionAi for StubAi {
        async fn generate_health_profile(
            &self,
            _profile: &UserProfile,
        ) -> Result<HealthProfile, CoreError> {
            self.health.clone().ok_or_else(|| {
                CoreError::Generation("Could not generate health profile.".to_string())
            })
        }

        async fn generate_weekly_meal_plan(
            &self,
            _profile: &HealthProfile,
            _request: &MealPlanRequest,
        ) -> Result<WeeklyMealPlan, CoreError> {
            self.plan
                .clone()
                .ok_or_else(|| CoreError::Generation("Could not generate meal plan.".to_string()))
        }

        async fn generate_grocery_list(
            &self,
            _plan: &WeeklyMealPlan,
        ) -> Result<GroceryList, CoreError> {
            self.grocery.clone().ok_or_else(|| {
                CoreError::Generation("Could not generate grocery list.".to_string())
            })
        }

        async fn analyze_meal_image(
            &self,
            _image: &[u8],
            _mime_type: &str,
        ) -> Result<AnalyzedMeal, CoreError> {
            Ok(AnalyzedMeal {
                meal_name: "Salad".to_string(),
                calories: 250.0,
                protein_g: 8.0,
                carbs_g: 15.0,
                fat_g: 18.0,
                notes: String::new(),
            })
        }

        async fn suggest_recipes(
            &self,
            _cuisine: &str,
            _profile: &HealthProfile,
        ) -> Result<Vec<SuggestedRecipe>, CoreError> {
            Ok(vec![])
        }

        async fn recipe_details(
            &self,
            _name: &str,
            _profile: &HealthProfile,
        ) -> Result<FullRecipe, CoreError> {
            Err(CoreError::Generation("Could not get recipe details.".to_string()))
        }

        async fn send_chat_message(
            &self,
            _text: &str,
        ) -> Result<mpsc::Receiver<Result<String, CoreError>>, CoreError> {
            let (tx, rx) = mpsc::channel(1);
            drop(tx);
            Ok(rx)
        }
    }

    fn app_with(ai: StubAi) -> App {
        let records = Records::open(temp_store_path()).unwrap();
        App::new(records, Arc::new(ai), Arc::new(LogNotifier))
    }

    fn profile() -> UserProfile {
        UserProfile {
            name: "Sara".to_string(),
            ..UserProfile::default()
        }
    }

    #[tokio::test]
    async fn test_initial_load_without_profiles_routes_to_onboarding() {
        let mut app = app_with(StubAi::default());
        assert_eq!(app.active_screen(), Screen::Splash);
        app.initial_load();
        assert_eq!(app.active_screen(), Screen::Onboarding);
    }

    #[tokio::test]
    async fn test_complete_onboarding_commits_pair_and_unlocks_tabs() {
        let mut app = app_with(StubAi {
            health: Some(health_profile()),
            ..StubAi::default()
        });
        app.initial_load();
        app.complete_onboarding(profile()).await.unwrap();

        assert_eq!(app.active_screen(), Screen::Dashboard);
        assert!(app.records.user_profile().is_some());
        assert!(app.records.health_profile().is_some());
    }

    #[tokio::test]
    async fn test_failed_generation_commits_nothing() {
        let mut app = app_with(StubAi::default());
        app.initial_load();

        let err = app.complete_onboarding(profile()).await.unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::Generation(_))));
        assert_eq!(app.active_screen(), Screen::Onboarding);
        assert!(app.records.user_profile().is_none());
        assert!(app.records.health_profile().is_none());
    }

    #[tokio::test]
    async fn test_initial_load_with_committed_pair_skips_onboarding() {
        let path = temp_store_path();
        {
            let records = Records::open(&path).unwrap();
            records.set_user_profile(&profile()).unwrap();
            records.set_health_profile(&health_profile()).unwrap();
        }
        let records = Records::open(&path).unwrap();
        let mut app = App::new(records, Arc::new(StubAi::default()), Arc::new(LogNotifier));
        app.initial_load();
        assert_eq!(app.active_screen(), Screen::Dashboard);
    }

    #[tokio::test]
    async fn test_meal_plan_failure_clears_previous_plan() {
        let mut app = app_with(StubAi {
            health: Some(health_profile()),
            plan: Some(vec![plan_day(1)]),
            ..StubAi::default()
        });
        app.initial_load();
        app.complete_onboarding(profile()).await.unwrap();

        app.generate_meal_plan(MealPlanRequest::default()).await;
        assert!(app.meal_plan().is_some());
        assert!(app.meal_plan_error().is_none());

        // Swap in a failing provider state by rebuilding the app on
        // the same store
        let mut app = App::new(
            app.records.clone(),
            Arc::new(StubAi {
                health: Some(health_profile()),
                ..StubAi::default()
            }),
            Arc::new(LogNotifier),
        );
        app.initial_load();
        app.generate_meal_plan(MealPlanRequest::default()).await;
        assert!(app.meal_plan().is_none());
        assert_eq!(app.meal_plan_error(), Some("Could not generate meal plan."));
    }

    #[tokio::test]
    async fn test_grocery_failure_preserves_plan() {
        let mut app = app_with(StubAi {
            health: Some(health_profile()),
            plan: Some(vec![plan_day(1), plan_day(2)]),
            grocery: None,
            ..StubAi::default()
        });
        app.initial_load();
        app.complete_onboarding(profile()).await.unwrap();
        app.generate_meal_plan(MealPlanRequest::default()).await;

        app.generate_grocery_list().await;
        assert!(app.grocery_list().is_none());
        assert!(app.grocery_error().is_some());
        // The plan is still on screen
        assert_eq!(app.meal_plan().map(|p| p.len()), Some(2));
    }

    #[tokio::test]
    async fn test_log_meal_photo_appends_to_diary() {
        let mut app = app_with(StubAi::default());
        app.initial_load();

        let analyzed = app
            .log_meal_photo(b"not-a-real-jpeg", "image/jpeg", Some("img-1".to_string()))
            .await
            .unwrap();
        assert_eq!(analyzed.meal_name, "Salad");
        let diary = app.diary().unwrap();
        assert_eq!(diary.entries().len(), 1);
        assert_eq!(diary.total_calories(), 250.0);
    }

    #[tokio::test]
    async fn test_reset_wipes_profiles_and_returns_to_onboarding() {
        let mut app = app_with(StubAi {
            health: Some(health_profile()),
            ..StubAi::default()
        });
        app.initial_load();
        app.complete_onboarding(profile()).await.unwrap();

        app.reset().unwrap();
        assert_eq!(app.active_screen(), Screen::Onboarding);
        assert!(app.records.user_profile().is_none());
        assert!(app.pending_reminder_slots().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_reminder_persists_and_arms_timer() {
        let mut app = app_with(StubAi::default());
        app.initial_load();

        app.toggle_reminder(MealSlot::Dinner, true).await.unwrap();
        assert!(app.records.reminder_settings().dinner.enabled);
        // Whether a timer is pending depends on the wall clock, but the
        // persisted record must be committed either way.
        app.toggle_reminder(MealSlot::Dinner, false).await.unwrap();
        assert!(!app.records.reminder_settings().dinner.enabled);
    }
}
