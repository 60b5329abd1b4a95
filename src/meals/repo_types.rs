use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

// Calendar-date wire format, e.g. "2024-05-01".
time::serde::format_description!(calendar_date, Date, "[year]-[month]-[day]");

/// Meal slot in the plan. One meal may exist per (type, date) pair,
/// enforced by a unique constraint in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "meal_type", rename_all = "UPPERCASE")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BREAKFAST" => Some(Self::Breakfast),
            "LUNCH" => Some(Self::Lunch),
            "DINNER" => Some(Self::Dinner),
            _ => None,
        }
    }
}

/// Meal record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub meal_type: MealType,
    #[serde(with = "calendar_date")]
    pub date: Date,
    #[serde(rename = "imgURL")]
    pub img_url: String,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Ingredient row, owned exclusively by its meal (cascade-deleted with it).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub item_name: String,
    pub grams_per_pax: i32,
}

/// Attendance record. Written by the attendance service; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Feedback record. Written by the feedback service; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Validated input for a meal insert, produced by payload validation.
#[derive(Debug, Clone)]
pub struct NewMeal {
    pub title: String,
    pub meal_type: MealType,
    pub date: Date,
    pub img_url: String,
    pub ingredients: Vec<NewIngredient>,
}

#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub item_name: String,
    pub grams_per_pax: i32,
}
