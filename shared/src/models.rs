//! Data models for the NutriAI client
//!
//! Field names and serialized shapes match the records the client
//! persists locally and the JSON the generation provider returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Biological gender used for health-profile generation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

/// Activity level for calorie estimation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    Light,
    /// Moderate exercise 3-5 days/week
    #[default]
    Moderate,
    /// Hard exercise 6-7 days/week
    Active,
    /// Very hard exercise or a physical job
    VeryActive,
}

/// Primary user goal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    #[default]
    MaintainWeight,
    GainMuscle,
}

/// Onboarding snapshot of the user's health data
///
/// Created once at onboarding completion and never mutated in place;
/// re-running onboarding replaces the whole record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub blood_type: String,
    pub activity_level: ActivityLevel,
    pub chronic_conditions: Vec<String>,
    pub allergies: Vec<String>,
    pub dietary_preferences: Vec<String>,
    pub goal: Goal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fasting_glucose: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cholesterol_total: Option<f64>,
    // Wearable metrics are optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resting_heart_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_steps_per_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_sleep_hours: Option<f64>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: 30,
            gender: Gender::default(),
            weight_kg: 70.0,
            height_cm: 175.0,
            blood_type: "A+".to_string(),
            activity_level: ActivityLevel::default(),
            chronic_conditions: Vec::new(),
            allergies: Vec::new(),
            dietary_preferences: Vec::new(),
            goal: Goal::default(),
            blood_pressure: None,
            fasting_glucose: None,
            cholesterol_total: None,
            resting_heart_rate: None,
            avg_steps_per_day: None,
            avg_sleep_hours: None,
        }
    }
}

/// BMI value with its category label, as returned by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bmi {
    pub value: f64,
    pub category: String,
}

/// Daily macronutrient targets in grams
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MacroDistribution {
    pub protein_grams: f64,
    pub carbs_grams: f64,
    pub fat_grams: f64,
}

/// A single meal suggestion within a daily nutrition plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meal {
    pub name: String,
    pub description: String,
    pub calories: f64,
}

/// Suggested daily nutrition plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyNutritionPlan {
    pub breakfast: Meal,
    pub lunch: Meal,
    pub dinner: Meal,
    pub snacks: Vec<Meal>,
}

/// Provider-generated health profile
///
/// Treated as opaque structured data by the core, except for
/// `daily_calorie_needs` which the diary uses as the calorie goal.
/// A persisted HealthProfile implies a persisted [`UserProfile`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthProfile {
    pub name: String,
    pub bmi: Bmi,
    pub daily_calorie_needs: f64,
    pub macronutrient_distribution: MacroDistribution,
    pub hydration_liters: f64,
    pub wearable_insights: Vec<String>,
    pub key_recommendations: Vec<String>,
    pub daily_nutrition_plan: DailyNutritionPlan,
}

// ============================================================================
// Meal Plans and Groceries
// ============================================================================

/// User preferences for weekly meal-plan generation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MealPlanRequest {
    pub cuisine_preferences: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_per_day: Option<f64>,
}

/// A meal inside a generated plan day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealPlanMeal {
    pub name: String,
    pub calories: f64,
    pub protein_g: f64,
}

/// Macro totals for one plan day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Macros {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// The meals of one plan day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayMeals {
    pub breakfast: MealPlanMeal,
    pub lunch: MealPlanMeal,
    pub dinner: MealPlanMeal,
    pub snacks: Vec<MealPlanMeal>,
}

/// One day of a generated weekly meal plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealPlanDay {
    pub day: u32,
    pub total_calories: f64,
    pub macros: Macros,
    pub meals: DayMeals,
}

/// Seven-day meal plan as returned by the provider
pub type WeeklyMealPlan = Vec<MealPlanDay>;

/// One grocery item with a free-form quantity ("500 g", "2 pieces")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroceryItem {
    pub name: String,
    pub quantity: String,
}

/// A grocery category with its items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroceryCategory {
    pub category: String,
    pub items: Vec<GroceryItem>,
}

/// Categorized grocery list derived from a weekly plan
pub type GroceryList = Vec<GroceryCategory>;

// ============================================================================
// Diary
// ============================================================================

/// Nutritional breakdown of a photographed meal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzedMeal {
    #[serde(rename = "mealName")]
    pub meal_name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub notes: String,
}

/// One immutable entry in a day's meal log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "mealName")]
    pub meal_name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl MealLogEntry {
    /// Stamp an analyzed meal into a log entry with a fresh id and
    /// the current instant.
    pub fn from_analysis(meal: AnalyzedMeal, image_ref: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            meal_name: meal.meal_name,
            calories: meal.calories,
            protein_g: meal.protein_g,
            carbs_g: meal.carbs_g,
            fat_g: meal.fat_g,
            notes: meal.notes,
            image_ref,
        }
    }
}

// ============================================================================
// Recipes
// ============================================================================

/// Brief recipe suggestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestedRecipe {
    pub name: String,
    pub description: String,
    pub calories: f64,
}

/// Recipe ingredient line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeIngredient {
    pub item: String,
    pub quantity: String,
}

/// Per-serving nutritional information of a recipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionalInfo {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// Full recipe with ingredients and instructions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FullRecipe {
    pub name: String,
    pub description: String,
    pub servings: u32,
    pub prep_time_minutes: u32,
    pub cook_time_minutes: u32,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: Vec<String>,
    pub nutritional_info: NutritionalInfo,
}

// ============================================================================
// Chat
// ============================================================================

/// Author of a chat turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn in the assistant transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

// ============================================================================
// Reminders
// ============================================================================

/// The three fixed meal slots the reminder subsystem knows about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    /// Fixed iteration order used by the scheduler
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    /// Human-readable label used in notification bodies
    pub fn label(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }
}

impl std::fmt::Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-slot reminder configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reminder {
    pub enabled: bool,
    /// Wall-clock fire time, "HH:MM"
    pub time: String,
}

impl Reminder {
    pub fn new(enabled: bool, time: &str) -> Self {
        Self {
            enabled,
            time: time.to_string(),
        }
    }
}

/// Reminder configuration for all three slots
///
/// Exactly three slots are always present; defaults apply when the
/// record has never been saved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderSettings {
    pub breakfast: Reminder,
    pub lunch: Reminder,
    pub dinner: Reminder,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            breakfast: Reminder::new(false, "08:00"),
            lunch: Reminder::new(false, "13:00"),
            dinner: Reminder::new(false, "19:00"),
        }
    }
}

impl ReminderSettings {
    /// Get the reminder for a slot
    pub fn slot(&self, slot: MealSlot) -> &Reminder {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    /// Get the reminder for a slot, mutably
    pub fn slot_mut(&mut self, slot: MealSlot) -> &mut Reminder {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
        }
    }

    /// Iterate slots in the fixed scheduler order
    pub fn iter(&self) -> impl Iterator<Item = (MealSlot, &Reminder)> {
        MealSlot::ALL.into_iter().map(move |s| (s, self.slot(s)))
    }
}
