//! NutriAI Client Library
//!
//! Local state and scheduling core of the NutriAI nutrition tracker:
//! key-value persistence, reminder scheduling, the onboarding wizard,
//! the daily meal diary, the chat stream buffer, and view routing.
//! Generation itself is delegated to an external AI provider behind
//! the [`ai::NutritionAi`] trait.

pub mod ai;
pub mod app;
pub mod chat;
pub mod config;
pub mod diary;
pub mod error;
pub mod onboarding;
pub mod reminders;
pub mod router;
pub mod store;
