use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{info, instrument, warn};

use crate::auth::extractors::AdminUser;
use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{CreateMealRequest, CreateMealResponse, CreatedMeal, ListMealsResponse, MealDetails};
use super::repo::{self, CreateOutcome};
use super::services;

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/meals", get(list_meals))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/meals", post(create_meal))
}

#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    body: Result<Json<CreateMealRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateMealResponse>), ApiError> {
    // Syntactically broken bodies get the same structured {error} shape as
    // every other validation failure.
    let Json(body) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
    let new_meal = services::validate_create(body)?;

    let outcome = repo::create_with_ingredients(&state.db, &new_meal).await?;
    match &outcome {
        CreateOutcome::Created { meal, .. } => {
            info!(meal_id = %meal.id, admin = %claims.sub, "meal created");
        }
        CreateOutcome::Conflict => {
            warn!(
                meal_type = ?new_meal.meal_type,
                date = %new_meal.date,
                "meal slot already taken"
            );
        }
    }
    creation_response(outcome)
}

fn creation_response(
    outcome: CreateOutcome,
) -> Result<(StatusCode, Json<CreateMealResponse>), ApiError> {
    match outcome {
        CreateOutcome::Created { meal, ingredients } => Ok((
            StatusCode::CREATED,
            Json(CreateMealResponse {
                message: "Meal created successfully".into(),
                meal: CreatedMeal { meal, ingredients },
            }),
        )),
        CreateOutcome::Conflict => Err(ApiError::Conflict(
            "A meal with this type already exists for the selected date".into(),
        )),
    }
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
) -> Result<Json<ListMealsResponse>, ApiError> {
    let graphs = repo::list_with_relations(&state.db).await?;
    let meals = graphs
        .into_iter()
        .map(|g| MealDetails {
            meal: g.meal,
            ingredients: g.ingredients,
            attendance: g.attendance,
            feedback: g.feedback,
        })
        .collect();
    Ok(Json(ListMealsResponse { meals }))
}
