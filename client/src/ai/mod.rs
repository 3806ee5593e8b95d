//! Generative AI collaborator boundary
//!
//! Every AI operation the app depends on sits behind [`NutritionAi`]
//! so the rest of the client never touches the provider directly.
//! Operations are fail-fast: a response that does not parse into its
//! expected shape is a [`CoreError::Generation`] with a fixed
//! user-facing message, and nothing is committed.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use nutriai_shared::{
    AnalyzedMeal, CoreError, FullRecipe, GroceryList, HealthProfile, MealPlanRequest,
    SuggestedRecipe, UserProfile, WeeklyMealPlan,
};
use tokio::sync::mpsc;

/// The AI operations the client is built on
///
/// Implementations hold their own conversation state for the chat
/// session; the transcript shown to the user lives client-side.
#[async_trait]
pub trait NutritionAi: Send + Sync {
    /// Derive a full health profile from the onboarding snapshot
    async fn generate_health_profile(
        &self,
        profile: &UserProfile,
    ) -> Result<HealthProfile, CoreError>;

    /// Generate a 7-day meal plan; an empty plan is a generation
    /// failure, never a valid result.
    async fn generate_weekly_meal_plan(
        &self,
        profile: &HealthProfile,
        request: &MealPlanRequest,
    ) -> Result<WeeklyMealPlan, CoreError>;

    /// Derive a categorized grocery list from a weekly plan
    async fn generate_grocery_list(&self, plan: &WeeklyMealPlan) -> Result<GroceryList, CoreError>;

    /// Estimate the nutritional breakdown of a photographed meal
    async fn analyze_meal_image(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<AnalyzedMeal, CoreError>;

    /// Suggest recipes for a cuisine, adapted to the health profile
    async fn suggest_recipes(
        &self,
        cuisine: &str,
        profile: &HealthProfile,
    ) -> Result<Vec<SuggestedRecipe>, CoreError>;

    /// Expand a suggestion into a full recipe
    async fn recipe_details(
        &self,
        name: &str,
        profile: &HealthProfile,
    ) -> Result<FullRecipe, CoreError>;

    /// Send a chat message; the receiver yields response fragments in
    /// arrival order, with a final `Err` on stream failure.
    async fn send_chat_message(
        &self,
        text: &str,
    ) -> Result<mpsc::Receiver<Result<String, CoreError>>, CoreError>;
}
