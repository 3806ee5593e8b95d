//! Onboarding wizard state machine
//!
//! A linear four-step wizard collecting the user's health data into a
//! draft profile. `next`/`previous` are total: they clamp at the ends
//! and no invalid step is reachable. Nothing is persisted until the
//! app commits the submitted profile.

use nutriai_shared::validation::{
    parse_tag_list, validate_age, validate_height_cm, validate_name, validate_weight_kg,
};
use nutriai_shared::{ActivityLevel, CoreError, Gender, Goal, UserProfile};

/// Number of wizard steps
pub const TOTAL_STEPS: u8 = 4;

/// The in-progress onboarding wizard
///
/// The draft is mutable until [`submit`](Self::submit); abandoning the
/// wizard simply drops it.
#[derive(Debug, Clone)]
pub struct OnboardingWizard {
    step: u8,
    draft: UserProfile,
}

impl Default for OnboardingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingWizard {
    pub fn new() -> Self {
        Self {
            step: 1,
            draft: UserProfile::default(),
        }
    }

    /// Current step, always within `1..=TOTAL_STEPS`
    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn is_last_step(&self) -> bool {
        self.step == TOTAL_STEPS
    }

    /// Advance one step, clamped at the last step
    pub fn next(&mut self) {
        self.step = (self.step + 1).min(TOTAL_STEPS);
    }

    /// Go back one step, clamped at the first step
    pub fn previous(&mut self) {
        self.step = self.step.saturating_sub(1).max(1);
    }

    /// Read access to the draft (for rendering the current step)
    pub fn draft(&self) -> &UserProfile {
        &self.draft
    }

    // Step 1: identity
    pub fn set_name(&mut self, name: &str) {
        self.draft.name = name.to_string();
    }

    pub fn set_age(&mut self, age: u32) {
        self.draft.age = age;
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.draft.gender = gender;
    }

    // Step 2: measurements
    pub fn set_weight_kg(&mut self, weight_kg: f64) {
        self.draft.weight_kg = weight_kg;
    }

    pub fn set_height_cm(&mut self, height_cm: f64) {
        self.draft.height_cm = height_cm;
    }

    pub fn set_blood_type(&mut self, blood_type: &str) {
        self.draft.blood_type = blood_type.to_string();
    }

    pub fn set_activity_level(&mut self, level: ActivityLevel) {
        self.draft.activity_level = level;
    }

    // Step 3: goals and dietary constraints. Multi-value fields are
    // edited as comma-delimited text; user-entered order and
    // duplicates are preserved.
    pub fn set_goal(&mut self, goal: Goal) {
        self.draft.goal = goal;
    }

    pub fn set_allergies(&mut self, input: &str) {
        self.draft.allergies = parse_tag_list(input);
    }

    pub fn set_dietary_preferences(&mut self, input: &str) {
        self.draft.dietary_preferences = parse_tag_list(input);
    }

    // Step 4: chronic conditions, optional health markers, optional
    // wearable metrics
    pub fn set_chronic_conditions(&mut self, input: &str) {
        self.draft.chronic_conditions = parse_tag_list(input);
    }

    pub fn set_blood_pressure(&mut self, reading: Option<String>) {
        self.draft.blood_pressure = reading;
    }

    pub fn set_fasting_glucose(&mut self, mg_dl: Option<f64>) {
        self.draft.fasting_glucose = mg_dl;
    }

    pub fn set_cholesterol_total(&mut self, mg_dl: Option<f64>) {
        self.draft.cholesterol_total = mg_dl;
    }

    pub fn set_resting_heart_rate(&mut self, bpm: Option<u32>) {
        self.draft.resting_heart_rate = bpm;
    }

    pub fn set_avg_steps_per_day(&mut self, steps: Option<u32>) {
        self.draft.avg_steps_per_day = steps;
    }

    pub fn set_avg_sleep_hours(&mut self, hours: Option<f64>) {
        self.draft.avg_sleep_hours = hours;
    }

    /// Complete the wizard, yielding the profile to hand to the
    /// generation provider
    ///
    /// Only required-field presence and basic ranges are checked here;
    /// semantic judgment of the answers is the provider's job.
    pub fn submit(self) -> Result<UserProfile, CoreError> {
        if !self.is_last_step() {
            return Err(CoreError::Validation(
                "Onboarding is not on the final step".to_string(),
            ));
        }
        validate_name(&self.draft.name).map_err(CoreError::Validation)?;
        validate_age(self.draft.age).map_err(CoreError::Validation)?;
        validate_weight_kg(self.draft.weight_kg).map_err(CoreError::Validation)?;
        validate_height_cm(self.draft.height_cm).map_err(CoreError::Validation)?;
        Ok(self.draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn completed_wizard() -> OnboardingWizard {
        let mut wizard = OnboardingWizard::new();
        wizard.set_name("Sara");
        for _ in 1..TOTAL_STEPS {
            wizard.next();
        }
        wizard
    }

    #[test]
    fn test_starts_at_step_one() {
        assert_eq!(OnboardingWizard::new().step(), 1);
    }

    #[test]
    fn test_next_clamps_at_last_step() {
        let mut wizard = OnboardingWizard::new();
        for _ in 0..10 {
            wizard.next();
        }
        assert_eq!(wizard.step(), TOTAL_STEPS);
        assert!(wizard.is_last_step());
    }

    #[test]
    fn test_previous_clamps_at_first_step() {
        let mut wizard = OnboardingWizard::new();
        wizard.next();
        for _ in 0..10 {
            wizard.previous();
        }
        assert_eq!(wizard.step(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_step_always_in_range(moves in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut wizard = OnboardingWizard::new();
            for forward in moves {
                if forward {
                    wizard.next();
                } else {
                    wizard.previous();
                }
                prop_assert!((1..=TOTAL_STEPS).contains(&wizard.step()));
            }
        }
    }

    #[test]
    fn test_multi_value_fields_preserve_order_and_duplicates() {
        let mut wizard = OnboardingWizard::new();
        wizard.set_allergies("nuts, lactose, nuts");
        wizard.set_dietary_preferences(" vegetarian ,, seafood ");
        assert_eq!(wizard.draft().allergies, vec!["nuts", "lactose", "nuts"]);
        assert_eq!(
            wizard.draft().dietary_preferences,
            vec!["vegetarian", "seafood"]
        );
    }

    #[test]
    fn test_submit_requires_final_step() {
        let mut wizard = OnboardingWizard::new();
        wizard.set_name("Sara");
        assert!(matches!(
            wizard.submit(),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_submit_requires_name() {
        let mut wizard = completed_wizard();
        wizard.set_name("  ");
        assert!(matches!(wizard.submit(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_submit_rejects_out_of_range_measurements() {
        let mut wizard = completed_wizard();
        wizard.set_weight_kg(5.0);
        assert!(matches!(wizard.submit(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_submit_yields_draft() {
        let mut wizard = completed_wizard();
        wizard.set_age(28);
        wizard.set_goal(Goal::GainMuscle);
        wizard.set_avg_sleep_hours(Some(7.0));

        let profile = wizard.submit().unwrap();
        assert_eq!(profile.name, "Sara");
        assert_eq!(profile.age, 28);
        assert_eq!(profile.goal, Goal::GainMuscle);
        assert_eq!(profile.avg_sleep_hours, Some(7.0));
    }
}
