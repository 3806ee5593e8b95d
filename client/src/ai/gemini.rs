//! Gemini implementation of the AI collaborator
//!
//! Talks to the Generative Language REST API. Structured operations
//! request a JSON response mime type and parse the returned text
//! strictly; anything that does not match the expected shape becomes
//! the operation's fixed user-facing message. Chat uses the SSE
//! streaming endpoint, with conversation history held here so the
//! transcript component stays presentation-only.

use crate::ai::NutritionAi;
use crate::config::AiConfig;
use async_trait::async_trait;
use base64::Engine;
use nutriai_shared::{
    AnalyzedMeal, CoreError, FullRecipe, GroceryList, HealthProfile, MealPlanRequest,
    SuggestedRecipe, UserProfile, WeeklyMealPlan,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const ERR_HEALTH_PROFILE: &str =
    "Could not generate health profile. The model returned an invalid format.";
const ERR_MEAL_PLAN: &str = "Could not generate meal plan. The model returned an invalid format.";
const ERR_GROCERY_LIST: &str =
    "Could not generate grocery list. The model returned an invalid format.";
const ERR_MEAL_ANALYSIS: &str =
    "Could not analyze the meal. The model returned an invalid format.";
const ERR_RECIPE_SUGGESTIONS: &str = "Could not get recipe suggestions.";
const ERR_RECIPE_DETAILS: &str = "Could not get recipe details.";

const CHAT_SYSTEM_INSTRUCTION: &str = "You are Sarah, a friendly and helpful AI nutrition \
assistant for an app called NutriAI. Keep your answers concise, helpful, and encouraging. You \
can help with nutrition questions, recipe ideas, and general health tips related to the user's \
profile, although you don't have direct access to it unless they provide it in the chat.";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

impl Content {
    fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.into()),
                inline_data: None,
            }],
        }
    }

    fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts: vec![Part {
                text: Some(text.into()),
                inline_data: None,
            }],
        }
    }
}

/// Concatenated text of the first candidate, if any
fn candidate_text(response: &GenerateResponse) -> Option<String> {
    let candidate = response.candidates.first()?;
    let text: String = candidate
        .content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Feed an SSE chunk into `buffer` and drain the complete `data:`
/// payloads it now contains. Partial lines stay buffered for the next
/// chunk.
fn drain_sse_data(buffer: &mut String, chunk: &str) -> Vec<String> {
    buffer.push_str(chunk);
    let mut payloads = Vec::new();
    while let Some(newline) = buffer.find('\n') {
        let line: String = buffer.drain(..=newline).collect();
        let line = line.trim_end();
        if let Some(data) = line.strip_prefix("data: ") {
            payloads.push(data.to_string());
        }
    }
    payloads
}

// ============================================================================
// Client
// ============================================================================

/// Gemini-backed [`NutritionAi`]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    vision_model: String,
    /// Completed chat exchanges, replayed on every send
    chat_history: Arc<Mutex<Vec<Content>>>,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            vision_model: config.vision_model.clone(),
            chat_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        )
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// One structured-output round trip: send, pull the candidate
    /// text, hand back the raw JSON string for the caller to parse.
    async fn generate_json(
        &self,
        model: &str,
        contents: Vec<Content>,
        user_error: &str,
    ) -> Result<String, CoreError> {
        let request = GenerateRequest {
            contents,
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };

        let response = self
            .http
            .post(self.generate_url(model))
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!(error = %e, model, "Generation request failed");
                CoreError::Generation(user_error.to_string())
            })?;

        let body: GenerateResponse = response.json().await.map_err(|e| {
            warn!(error = %e, model, "Generation response was not valid JSON");
            CoreError::Generation(user_error.to_string())
        })?;

        candidate_text(&body).ok_or_else(|| {
            warn!(model, "Generation response contained no text");
            CoreError::Generation(user_error.to_string())
        })
    }

    /// Strict parse of the model's JSON text into the expected shape
    fn parse_payload<T: serde::de::DeserializeOwned>(
        text: &str,
        user_error: &str,
    ) -> Result<T, CoreError> {
        serde_json::from_str(text.trim()).map_err(|e| {
            warn!(error = %e, "Model returned JSON that does not match the expected shape");
            CoreError::Generation(user_error.to_string())
        })
    }

    fn health_profile_prompt(profile: &UserProfile) -> String {
        let data = serde_json::to_string_pretty(profile).unwrap_or_default();
        format!(
            r#"Based on the following user data, generate a comprehensive and personalized health profile. The output must be a valid JSON object.

User Data:
{data}

The JSON output should strictly follow this structure:
{{
  "name": "string",
  "bmi": {{ "value": number, "category": "string (e.g., 'Normal weight')" }},
  "daily_calorie_needs": number,
  "macronutrient_distribution": {{ "protein_grams": number, "carbs_grams": number, "fat_grams": number }},
  "hydration_liters": number,
  "wearable_insights": ["string"],
  "key_recommendations": ["string"],
  "daily_nutrition_plan": {{
    "breakfast": {{ "name": "string", "description": "string", "calories": number }},
    "lunch": {{ "name": "string", "description": "string", "calories": number }},
    "dinner": {{ "name": "string", "description": "string", "calories": number }},
    "snacks": [{{ "name": "string", "description": "string", "calories": number }}]
  }}
}}

Instructions:
1. Calculate BMI and determine the category (Underweight, Normal weight, Overweight, Obesity).
2. Estimate daily calorie needs using a standard formula like Mifflin-St Jeor, considering the activity level.
3. Distribute macronutrients based on the user's goal (e.g., higher protein for muscle gain).
4. Provide 2-3 key, actionable recommendations.
5. If wearable data is available, provide 1-2 insights based on it. If not, make the array empty.
6. Suggest a simple, balanced daily nutrition plan with approximate calories."#
        )
    }

    fn meal_plan_prompt(profile: &HealthProfile, request: &MealPlanRequest) -> String {
        let budget = request
            .budget_per_day
            .map(|b| format!("{b} per day"))
            .unwrap_or_else(|| "Not specified".to_string());
        format!(
            r#"Create a 7-day weekly meal plan for a user with the following health profile and preferences. The output must be a valid JSON array.

Health Profile Summary:
- Daily Calorie Goal: {calories}
- Daily Macros: Protein {protein}g, Carbs {carbs}g, Fat {fat}g
- Key Recommendations: {recommendations}

User Preferences:
- Cuisine Preferences: {cuisines}
- Budget per day: {budget}

The JSON output must be an array of 7 day objects, strictly following this structure for each day:
[
  {{
    "day": 1,
    "total_calories": number,
    "macros": {{ "protein_g": number, "carbs_g": number, "fat_g": number }},
    "meals": {{
      "breakfast": {{ "name": "string", "calories": number, "protein_g": number }},
      "lunch": {{ "name": "string", "calories": number, "protein_g": number }},
      "dinner": {{ "name": "string", "calories": number, "protein_g": number }},
      "snacks": [{{ "name": "string", "calories": number, "protein_g": number }}]
    }}
  }}
]

Instructions:
1. The plan must be for 7 days.
2. The total calories for each day should be close to the user's daily goal.
3. Ensure variety of meals and adherence to cuisine preferences.
4. If a budget is specified, suggest cost-effective meals."#,
            calories = profile.daily_calorie_needs,
            protein = profile.macronutrient_distribution.protein_grams,
            carbs = profile.macronutrient_distribution.carbs_grams,
            fat = profile.macronutrient_distribution.fat_grams,
            recommendations = profile.key_recommendations.join(", "),
            cuisines = request.cuisine_preferences.join(", "),
        )
    }

    fn grocery_list_prompt(plan: &WeeklyMealPlan) -> String {
        let meals: Vec<_> = plan.iter().map(|day| &day.meals).collect();
        let meals = serde_json::to_string_pretty(&meals).unwrap_or_default();
        format!(
            r#"Based on the following 7-day meal plan, create a categorized grocery list. The output must be a valid JSON array.

Meal Plan:
{meals}

The JSON output should be an array of category objects, strictly following this structure:
[
  {{
    "category": "string (e.g., 'Vegetables', 'Protein', 'Grains')",
    "items": [
      {{ "name": "string", "quantity": "string (e.g., '500 g', '2 pieces', '1 can')" }}
    ]
  }}
]

Instructions:
1. Consolidate ingredients from the entire week.
2. Estimate reasonable quantities for one person for a week.
3. Categorize items logically (e.g., Vegetables, Fruits, Protein, Dairy, Grains, Spices, etc.)."#
        )
    }

    fn meal_analysis_prompt() -> &'static str {
        r#"Analyze this image of a meal. Identify the food items and provide an estimated nutritional breakdown. Respond ONLY with a valid JSON object with the following structure:
{
  "mealName": "string",
  "calories": number,
  "protein_g": number,
  "carbs_g": number,
  "fat_g": number,
  "notes": "string (briefly describe the main components of the meal)"
}"#
    }

    fn recipe_suggestions_prompt(cuisine: &str, profile: &HealthProfile) -> String {
        format!(
            r#"Suggest 3-5 healthy recipes for a user based on their health profile and selected cuisine.
The output must be a valid JSON array of objects.

User Profile Summary:
- Daily Calorie Goal: {calories}
- Goal: {recommendations}

Selected Cuisine: {cuisine}

The JSON output must be an array of recipe objects, strictly following this structure:
[
  {{
    "name": "string",
    "description": "string (brief, appealing description)",
    "calories": number
  }}
]"#,
            calories = profile.daily_calorie_needs,
            recommendations = profile.key_recommendations.join(", "),
        )
    }

    fn recipe_details_prompt(name: &str, profile: &HealthProfile) -> String {
        format!(
            r#"Provide a full, detailed recipe for "{name}".
The recipe should be adapted to be healthy and suitable for a user with a daily calorie goal of around {calories}.
The output must be a single valid JSON object.

The JSON output must strictly follow this structure:
{{
  "name": "string",
  "description": "string",
  "servings": number,
  "prep_time_minutes": number,
  "cook_time_minutes": number,
  "ingredients": [
    {{ "item": "string", "quantity": "string" }}
  ],
  "instructions": ["string"],
  "nutritional_info": {{
    "calories": number,
    "protein_g": number,
    "carbs_g": number,
    "fat_g": number
  }}
}}"#,
            calories = profile.daily_calorie_needs,
        )
    }
}

#[async_trait]
impl NutritionAi for GeminiClient {
    async fn generate_health_profile(
        &self,
        profile: &UserProfile,
    ) -> Result<HealthProfile, CoreError> {
        let contents = vec![Content::user_text(Self::health_profile_prompt(profile))];
        let text = self
            .generate_json(&self.model, contents, ERR_HEALTH_PROFILE)
            .await?;
        Self::parse_payload(&text, ERR_HEALTH_PROFILE)
    }

    async fn generate_weekly_meal_plan(
        &self,
        profile: &HealthProfile,
        request: &MealPlanRequest,
    ) -> Result<WeeklyMealPlan, CoreError> {
        let contents = vec![Content::user_text(Self::meal_plan_prompt(profile, request))];
        let text = self
            .generate_json(&self.model, contents, ERR_MEAL_PLAN)
            .await?;
        let plan: WeeklyMealPlan = Self::parse_payload(&text, ERR_MEAL_PLAN)?;
        // An empty plan is a malformed response, not a valid result
        if plan.is_empty() {
            warn!("Model returned an empty meal plan");
            return Err(CoreError::Generation(ERR_MEAL_PLAN.to_string()));
        }
        Ok(plan)
    }

    async fn generate_grocery_list(&self, plan: &WeeklyMealPlan) -> Result<GroceryList, CoreError> {
        let contents = vec![Content::user_text(Self::grocery_list_prompt(plan))];
        let text = self
            .generate_json(&self.model, contents, ERR_GROCERY_LIST)
            .await?;
        Self::parse_payload(&text, ERR_GROCERY_LIST)
    }

    async fn analyze_meal_image(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<AnalyzedMeal, CoreError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let contents = vec![Content {
            role: Some("user".to_string()),
            parts: vec![
                Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: mime_type.to_string(),
                        data: encoded,
                    }),
                },
                Part {
                    text: Some(Self::meal_analysis_prompt().to_string()),
                    inline_data: None,
                },
            ],
        }];
        let text = self
            .generate_json(&self.vision_model, contents, ERR_MEAL_ANALYSIS)
            .await?;
        Self::parse_payload(&text, ERR_MEAL_ANALYSIS)
    }

    async fn suggest_recipes(
        &self,
        cuisine: &str,
        profile: &HealthProfile,
    ) -> Result<Vec<SuggestedRecipe>, CoreError> {
        let contents = vec![Content::user_text(Self::recipe_suggestions_prompt(
            cuisine, profile,
        ))];
        let text = self
            .generate_json(&self.model, contents, ERR_RECIPE_SUGGESTIONS)
            .await?;
        Self::parse_payload(&text, ERR_RECIPE_SUGGESTIONS)
    }

    async fn recipe_details(
        &self,
        name: &str,
        profile: &HealthProfile,
    ) -> Result<FullRecipe, CoreError> {
        let contents = vec![Content::user_text(Self::recipe_details_prompt(
            name, profile,
        ))];
        let text = self
            .generate_json(&self.model, contents, ERR_RECIPE_DETAILS)
            .await?;
        Self::parse_payload(&text, ERR_RECIPE_DETAILS)
    }

    async fn send_chat_message(
        &self,
        text: &str,
    ) -> Result<mpsc::Receiver<Result<String, CoreError>>, CoreError> {
        let contents = {
            let mut history = lock_history(&self.chat_history);
            history.push(Content::user_text(text));
            history.clone()
        };

        let request = GenerateRequest {
            contents,
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: Some(CHAT_SYSTEM_INSTRUCTION.to_string()),
                    inline_data: None,
                }],
            }),
            generation_config: None,
        };

        let send_result = self
            .http
            .post(self.stream_url())
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let mut response = match send_result {
            Ok(r) => r,
            Err(e) => {
                // The exchange never started; take the user turn back
                // out so the next send replays a consistent history.
                lock_history(&self.chat_history).pop();
                warn!(error = %e, "Chat request failed");
                return Err(CoreError::Stream(e.to_string()));
            }
        };

        let (tx, rx) = mpsc::channel(32);
        let history = Arc::clone(&self.chat_history);

        tokio::spawn(async move {
            let mut buffer = String::new();
            let mut full_reply = String::new();
            loop {
                match response.chunk().await {
                    Ok(Some(bytes)) => {
                        let chunk = String::from_utf8_lossy(&bytes);
                        for payload in drain_sse_data(&mut buffer, &chunk) {
                            let event: GenerateResponse = match serde_json::from_str(&payload) {
                                Ok(event) => event,
                                Err(e) => {
                                    debug!(error = %e, "Skipping unparseable stream event");
                                    continue;
                                }
                            };
                            if let Some(fragment) = candidate_text(&event) {
                                full_reply.push_str(&fragment);
                                if tx.send(Ok(fragment)).await.is_err() {
                                    return;
                                }
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "Chat stream broke mid-response");
                        lock_history(&history).pop();
                        let _ = tx.send(Err(CoreError::Stream(e.to_string()))).await;
                        return;
                    }
                }
            }
            lock_history(&history).push(Content::model_text(full_reply));
            // Dropping tx closes the channel, signalling completion
        });

        Ok(rx)
    }
}

fn lock_history(history: &Mutex<Vec<Content>>) -> std::sync::MutexGuard<'_, Vec<Content>> {
    history.lock().unwrap_or_else(|e| e.into_inner())
}
