//! Integration tests for the Gemini provider client
//!
//! The provider is mocked with wiremock; these tests pin down the
//! request shapes, the strict parsing of structured responses, and the
//! fixed user-facing messages on malformed payloads.

use nutriai_client::ai::{GeminiClient, NutritionAi};
use nutriai_client::config::AiConfig;
use nutriai_shared::{CoreError, HealthProfile, MealPlanRequest, UserProfile};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(&AiConfig {
        enabled: true,
        api_key: "test-key".to_string(),
        base_url: server.uri(),
        model: "gemini-2.5-flash".to_string(),
        vision_model: "gemini-2.5-flash".to_string(),
    })
}

/// Wrap a payload string the way the API returns generated text
fn candidate_response(payload: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": payload }]
            }
        }]
    }))
}

fn health_profile_payload() -> String {
    json!({
        "name": "Sara",
        "bmi": { "value": 22.5, "category": "Normal weight" },
        "daily_calorie_needs": 2100.0,
        "macronutrient_distribution": {
            "protein_grams": 120.0,
            "carbs_grams": 220.0,
            "fat_grams": 70.0
        },
        "hydration_liters": 2.5,
        "wearable_insights": [],
        "key_recommendations": ["More fiber"],
        "daily_nutrition_plan": {
            "breakfast": { "name": "Oats", "description": "With fruit", "calories": 350.0 },
            "lunch": { "name": "Chicken and rice", "description": "", "calories": 650.0 },
            "dinner": { "name": "Fish and salad", "description": "", "calories": 550.0 },
            "snacks": []
        }
    })
    .to_string()
}

fn sample_health_profile() -> HealthProfile {
    serde_json::from_str(&health_profile_payload()).unwrap()
}

#[tokio::test]
async fn test_health_profile_parses_valid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(candidate_response(&health_profile_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let profile = client
        .generate_health_profile(&UserProfile::default())
        .await
        .unwrap();

    assert_eq!(profile.name, "Sara");
    assert_eq!(profile.daily_calorie_needs, 2100.0);
    assert_eq!(profile.bmi.category, "Normal weight");
}

#[tokio::test]
async fn test_health_profile_fails_fast_on_malformed_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(candidate_response("this is not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .generate_health_profile(&UserProfile::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Generation(msg)
            if msg == "Could not generate health profile. The model returned an invalid format."
    ));
}

#[tokio::test]
async fn test_meal_plan_rejects_empty_plan() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(candidate_response("[]"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .generate_weekly_meal_plan(&sample_health_profile(), &MealPlanRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Generation(msg)
            if msg == "Could not generate meal plan. The model returned an invalid format."
    ));
}

#[tokio::test]
async fn test_meal_plan_parses_valid_plan() {
    let day = json!({
        "day": 1,
        "total_calories": 2050.0,
        "macros": { "protein_g": 118.0, "carbs_g": 215.0, "fat_g": 68.0 },
        "meals": {
            "breakfast": { "name": "Eggs", "calories": 400.0, "protein_g": 25.0 },
            "lunch": { "name": "Koshari", "calories": 700.0, "protein_g": 20.0 },
            "dinner": { "name": "Grilled fish", "calories": 600.0, "protein_g": 45.0 },
            "snacks": [{ "name": "Yogurt", "calories": 150.0, "protein_g": 10.0 }]
        }
    });
    let payload = serde_json::to_string(&json!([day])).unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("7-day weekly meal plan"))
        .respond_with(candidate_response(&payload))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let plan = client
        .generate_weekly_meal_plan(&sample_health_profile(), &MealPlanRequest::default())
        .await
        .unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].meals.lunch.name, "Koshari");
}

#[tokio::test]
async fn test_meal_analysis_sends_image_and_parses_result() {
    let payload = json!({
        "mealName": "Grilled chicken salad",
        "calories": 420.0,
        "protein_g": 38.0,
        "carbs_g": 12.0,
        "fat_g": 22.0,
        "notes": "Chicken breast, greens, olive oil dressing"
    })
    .to_string();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        // The image travels as inline base64 data
        .and(body_string_contains("inlineData"))
        .and(body_string_contains("image/jpeg"))
        .respond_with(candidate_response(&payload))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let meal = client
        .analyze_meal_image(b"fake-jpeg-bytes", "image/jpeg")
        .await
        .unwrap();

    assert_eq!(meal.meal_name, "Grilled chicken salad");
    assert_eq!(meal.calories, 420.0);
}

#[tokio::test]
async fn test_recipe_suggestions_map_failure_to_fixed_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .suggest_recipes("Italian", &sample_health_profile())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Generation(msg) if msg == "Could not get recipe suggestions."
    ));
}

#[tokio::test]
async fn test_chat_streams_fragments_in_order() {
    let event = |text: &str| {
        format!(
            "data: {}\n\n",
            json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": text }] }
                }]
            })
        )
    };
    let body = format!("{}{}", event("Hel"), event("lo"));

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:streamGenerateContent"))
        .and(query_param("alt", "sse"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut rx = client.send_chat_message("hi").await.unwrap();

    let mut fragments = Vec::new();
    while let Some(item) = rx.recv().await {
        fragments.push(item.unwrap());
    }
    assert_eq!(fragments, vec!["Hel", "lo"]);
}

#[tokio::test]
async fn test_chat_request_failure_is_a_stream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.send_chat_message("hi").await.unwrap_err();
    assert!(matches!(err, CoreError::Stream(_)));
}
