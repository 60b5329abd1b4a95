use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;

use crate::error::ApiError;
use crate::meals::dto::{CreateMealRequest, IngredientInput, PLACEHOLDER_IMG_URL};
use crate::meals::repo_types::{MealType, NewIngredient, NewMeal};

const DATE_FORMAT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Validates a create payload into a `NewMeal`, failing with the first
/// violated rule. Pure function; nothing is written until it succeeds.
pub fn validate_create(req: CreateMealRequest) -> Result<NewMeal, ApiError> {
    let title = req.title.as_deref().map(str::trim).unwrap_or("");
    let type_raw = req.meal_type.as_deref().map(str::trim).unwrap_or("");
    let date_raw = req.date.as_deref().map(str::trim).unwrap_or("");

    if title.is_empty() || type_raw.is_empty() || date_raw.is_empty() {
        return Err(ApiError::Validation(
            "Missing required fields: title, type, date".into(),
        ));
    }

    let meal_type = MealType::parse(type_raw).ok_or_else(|| {
        ApiError::Validation("Invalid meal type. Must be BREAKFAST, LUNCH, or DINNER".into())
    })?;

    // A non-array `ingredients` shape gets the same answer as an empty one.
    let entries = req.ingredients.entries().unwrap_or(&[]);
    if entries.is_empty() {
        return Err(ApiError::Validation(
            "At least one ingredient is required".into(),
        ));
    }

    let mut ingredients = Vec::with_capacity(entries.len());
    for value in entries {
        let ing: IngredientInput = serde_json::from_value(value.clone()).map_err(|_| {
            ApiError::Validation("Each ingredient must have itemName and gramsPerPax".into())
        })?;
        let item_name = ing.item_name.as_deref().map(str::trim).unwrap_or("");
        let has_grams = ing
            .grams_per_pax
            .as_ref()
            .map(|g| g.is_present())
            .unwrap_or(false);
        if item_name.is_empty() || !has_grams {
            return Err(ApiError::Validation(
                "Each ingredient must have itemName and gramsPerPax".into(),
            ));
        }
        let grams = ing
            .grams_per_pax
            .as_ref()
            .and_then(|g| g.as_grams())
            .ok_or_else(|| {
                ApiError::Validation("gramsPerPax must be greater than 0".into())
            })?;
        ingredients.push(NewIngredient {
            item_name: item_name.to_string(),
            grams_per_pax: grams,
        });
    }

    let date = Date::parse(date_raw, DATE_FORMAT)
        .map_err(|_| ApiError::Validation("Invalid date format".into()))?;

    let img_url = match req.img_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => PLACEHOLDER_IMG_URL.to_string(),
    };

    Ok(NewMeal {
        title: title.to_string(),
        meal_type,
        date,
        img_url,
        ingredients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn request(value: serde_json::Value) -> CreateMealRequest {
        serde_json::from_value(value).expect("request deserializes")
    }

    fn idli_payload() -> serde_json::Value {
        serde_json::json!({
            "title": "Idli",
            "type": "BREAKFAST",
            "date": "2024-05-01",
            "ingredients": [{ "itemName": "Idli", "gramsPerPax": "150" }]
        })
    }

    fn expect_validation(req: CreateMealRequest, message: &str) {
        let err = validate_create(req).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn accepts_the_example_payload() {
        let meal = validate_create(request(idli_payload())).expect("valid");
        assert_eq!(meal.title, "Idli");
        assert_eq!(meal.meal_type, MealType::Breakfast);
        assert_eq!(
            meal.date,
            Date::from_calendar_date(2024, time::Month::May, 1).unwrap()
        );
        assert_eq!(meal.ingredients.len(), 1);
        assert_eq!(meal.ingredients[0].grams_per_pax, 150);
        assert_eq!(meal.img_url, PLACEHOLDER_IMG_URL);
    }

    #[test]
    fn keeps_explicit_image_url() {
        let mut payload = idli_payload();
        payload["imgURL"] = serde_json::json!("https://img.example/idli.jpg");
        let meal = validate_create(request(payload)).expect("valid");
        assert_eq!(meal.img_url, "https://img.example/idli.jpg");
    }

    #[test]
    fn blank_image_url_falls_back_to_placeholder() {
        let mut payload = idli_payload();
        payload["imgURL"] = serde_json::json!("   ");
        let meal = validate_create(request(payload)).expect("valid");
        assert_eq!(meal.img_url, PLACEHOLDER_IMG_URL);
    }

    #[test]
    fn missing_title_type_or_date_is_rejected() {
        for field in ["title", "type", "date"] {
            let mut payload = idli_payload();
            payload.as_object_mut().unwrap().remove(field);
            expect_validation(request(payload), "Missing required fields: title, type, date");
        }
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut payload = idli_payload();
        payload["title"] = serde_json::json!("   ");
        expect_validation(request(payload), "Missing required fields: title, type, date");
    }

    #[test]
    fn unknown_meal_type_is_rejected() {
        let mut payload = idli_payload();
        payload["type"] = serde_json::json!("BRUNCH");
        expect_validation(
            request(payload),
            "Invalid meal type. Must be BREAKFAST, LUNCH, or DINNER",
        );
    }

    #[test]
    fn lowercase_meal_type_is_rejected() {
        let mut payload = idli_payload();
        payload["type"] = serde_json::json!("breakfast");
        expect_validation(
            request(payload),
            "Invalid meal type. Must be BREAKFAST, LUNCH, or DINNER",
        );
    }

    #[test]
    fn empty_ingredient_list_is_rejected() {
        let mut payload = idli_payload();
        payload["ingredients"] = serde_json::json!([]);
        expect_validation(request(payload), "At least one ingredient is required");
    }

    #[test]
    fn non_array_ingredients_is_rejected() {
        for shape in [
            serde_json::json!("rice"),
            serde_json::json!(null),
            serde_json::json!({ "itemName": "Idli" }),
        ] {
            let mut payload = idli_payload();
            payload["ingredients"] = shape;
            expect_validation(request(payload), "At least one ingredient is required");
        }
    }

    #[test]
    fn malformed_ingredient_entry_is_rejected() {
        for entry in [
            serde_json::json!("rice"),
            serde_json::json!({ "itemName": 5, "gramsPerPax": "150" }),
            serde_json::json!({ "itemName": "Idli", "gramsPerPax": true }),
        ] {
            let mut payload = idli_payload();
            payload["ingredients"] = serde_json::json!([entry]);
            expect_validation(
                request(payload),
                "Each ingredient must have itemName and gramsPerPax",
            );
        }
    }

    #[test]
    fn ingredient_without_name_or_grams_is_rejected() {
        let mut payload = idli_payload();
        payload["ingredients"] = serde_json::json!([{ "gramsPerPax": "150" }]);
        expect_validation(
            request(payload),
            "Each ingredient must have itemName and gramsPerPax",
        );

        let mut payload = idli_payload();
        payload["ingredients"] = serde_json::json!([{ "itemName": "Idli" }]);
        expect_validation(
            request(payload),
            "Each ingredient must have itemName and gramsPerPax",
        );

        let mut payload = idli_payload();
        payload["ingredients"] = serde_json::json!([{ "itemName": "Idli", "gramsPerPax": "" }]);
        expect_validation(
            request(payload),
            "Each ingredient must have itemName and gramsPerPax",
        );
    }

    #[test]
    fn non_positive_or_unparseable_grams_is_rejected() {
        for grams in [
            serde_json::json!(0),
            serde_json::json!(-10),
            serde_json::json!("0"),
            serde_json::json!("abc"),
            serde_json::json!(12.5),
        ] {
            let mut payload = idli_payload();
            payload["ingredients"] =
                serde_json::json!([{ "itemName": "Idli", "gramsPerPax": grams }]);
            expect_validation(request(payload), "gramsPerPax must be greater than 0");
        }
    }

    #[test]
    fn first_bad_ingredient_short_circuits() {
        let mut payload = idli_payload();
        payload["ingredients"] = serde_json::json!([
            { "itemName": "Idli", "gramsPerPax": "150" },
            { "itemName": "", "gramsPerPax": "80" },
            { "itemName": "Chutney", "gramsPerPax": "-1" }
        ]);
        expect_validation(
            request(payload),
            "Each ingredient must have itemName and gramsPerPax",
        );
    }

    #[test]
    fn bad_date_is_rejected() {
        for date in ["01-05-2024", "2024/05/01", "2024-13-01", "yesterday"] {
            let mut payload = idli_payload();
            payload["date"] = serde_json::json!(date);
            expect_validation(request(payload), "Invalid date format");
        }
    }

    #[test]
    fn grams_may_arrive_as_number() {
        let mut payload = idli_payload();
        payload["ingredients"] = serde_json::json!([
            { "itemName": "Idli", "gramsPerPax": 150 },
            { "itemName": "Sambar", "gramsPerPax": "200" }
        ]);
        let meal = validate_create(request(payload)).expect("valid");
        assert_eq!(meal.ingredients[0].grams_per_pax, 150);
        assert_eq!(meal.ingredients[1].grams_per_pax, 200);
    }
}
