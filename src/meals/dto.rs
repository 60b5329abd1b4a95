use serde::{Deserialize, Serialize};

use crate::meals::repo_types::{Attendance, Feedback, Ingredient, Meal};

/// Shown when the admin leaves the image field empty.
pub const PLACEHOLDER_IMG_URL: &str =
    "https://eduauraapublic.s3.ap-south-1.amazonaws.com/webassets/images/blogs/indian-food-nutrition.jpg";

/// Request body for meal creation. Fields are deliberately lenient so that
/// missing or mistyped values reach the validator and get one of the
/// documented error messages instead of an opaque deserializer rejection.
#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "imgURL")]
    pub img_url: Option<String>,
    #[serde(default)]
    pub ingredients: IngredientsInput,
}

/// Accepts whatever shape the client put under `ingredients`. Anything that
/// is not an array of objects still deserializes, so the validator can
/// answer with the documented message instead of a serde rejection.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IngredientsInput {
    List(Vec<serde_json::Value>),
    Other(serde_json::Value),
}

impl Default for IngredientsInput {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl IngredientsInput {
    /// The entries if the client sent an array, None otherwise.
    pub fn entries(&self) -> Option<&[serde_json::Value]> {
        match self {
            IngredientsInput::List(list) => Some(list),
            IngredientsInput::Other(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IngredientInput {
    #[serde(default, rename = "itemName")]
    pub item_name: Option<String>,
    #[serde(default, rename = "gramsPerPax")]
    pub grams_per_pax: Option<GramsPerPax>,
}

/// The admin form posts grams as a string; API clients send a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GramsPerPax {
    Int(i64),
    Float(f64),
    Text(String),
}

impl GramsPerPax {
    /// A blank string counts as absent, mirroring the empty form field.
    pub fn is_present(&self) -> bool {
        match self {
            GramsPerPax::Text(s) => !s.trim().is_empty(),
            _ => true,
        }
    }

    /// Whole grams greater than zero, or None. Fractional values are
    /// rejected rather than truncated.
    pub fn as_grams(&self) -> Option<i32> {
        let value = match self {
            GramsPerPax::Int(n) => *n,
            GramsPerPax::Float(f) => {
                if f.fract() != 0.0 {
                    return None;
                }
                *f as i64
            }
            GramsPerPax::Text(s) => s.trim().parse::<i64>().ok()?,
        };
        if value > 0 {
            i32::try_from(value).ok()
        } else {
            None
        }
    }
}

/// Meal as returned from a successful create: row fields plus its
/// ingredients.
#[derive(Debug, Serialize)]
pub struct CreatedMeal {
    #[serde(flatten)]
    pub meal: Meal,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Serialize)]
pub struct CreateMealResponse {
    pub message: String,
    pub meal: CreatedMeal,
}

/// Meal with all related collections, as returned by the listing endpoint.
#[derive(Debug, Serialize)]
pub struct MealDetails {
    #[serde(flatten)]
    pub meal: Meal,
    pub ingredients: Vec<Ingredient>,
    pub attendance: Vec<Attendance>,
    pub feedback: Vec<Feedback>,
}

#[derive(Debug, Serialize)]
pub struct ListMealsResponse {
    pub meals: Vec<MealDetails>,
}
