use std::collections::HashMap;

use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::meals::repo_types::{Attendance, Feedback, Ingredient, Meal, NewMeal};

/// Outcome of a meal insert. The unique constraint on (meal_type, date) is
/// the only existence check; there is no read-before-write, so concurrent
/// creates for the same slot race safely and the loser sees `Conflict`.
#[derive(Debug)]
pub enum CreateOutcome {
    Created {
        meal: Meal,
        ingredients: Vec<Ingredient>,
    },
    Conflict,
}

/// Meal plus every related collection, for the listing endpoint.
#[derive(Debug)]
pub struct MealGraph {
    pub meal: Meal,
    pub ingredients: Vec<Ingredient>,
    pub attendance: Vec<Attendance>,
    pub feedback: Vec<Feedback>,
}

/// Inserts the meal and all its ingredient rows in one transaction.
pub async fn create_with_ingredients(
    db: &PgPool,
    new: &NewMeal,
) -> anyhow::Result<CreateOutcome> {
    let mut tx = db.begin().await.context("begin transaction")?;

    let inserted = sqlx::query_as::<_, Meal>(
        r#"
        INSERT INTO meals (title, meal_type, date, img_url)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, meal_type, date, img_url, created_at
        "#,
    )
    .bind(&new.title)
    .bind(new.meal_type)
    .bind(new.date)
    .bind(&new.img_url)
    .fetch_one(&mut *tx)
    .await;

    let meal = match inserted {
        Ok(m) => m,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            tx.rollback().await.context("rollback after conflict")?;
            return Ok(CreateOutcome::Conflict);
        }
        Err(e) => return Err(e).context("insert meal"),
    };

    let mut ingredients = Vec::with_capacity(new.ingredients.len());
    for ing in &new.ingredients {
        let row = sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (meal_id, item_name, grams_per_pax)
            VALUES ($1, $2, $3)
            RETURNING id, meal_id, item_name, grams_per_pax
            "#,
        )
        .bind(meal.id)
        .bind(&ing.item_name)
        .bind(ing.grams_per_pax)
        .fetch_one(&mut *tx)
        .await
        .context("insert ingredient")?;
        ingredients.push(row);
    }

    tx.commit().await.context("commit meal create")?;
    Ok(CreateOutcome::Created { meal, ingredients })
}

/// All meals ordered by date descending, with ingredients, attendance and
/// feedback attached. Relations are fetched in three batch queries and
/// grouped in memory.
pub async fn list_with_relations(db: &PgPool) -> anyhow::Result<Vec<MealGraph>> {
    let meals = sqlx::query_as::<_, Meal>(
        r#"
        SELECT id, title, meal_type, date, img_url, created_at
        FROM meals
        ORDER BY date DESC
        "#,
    )
    .fetch_all(db)
    .await
    .context("list meals")?;

    let ids: Vec<Uuid> = meals.iter().map(|m| m.id).collect();

    let ingredients = sqlx::query_as::<_, Ingredient>(
        r#"
        SELECT id, meal_id, item_name, grams_per_pax
        FROM ingredients
        WHERE meal_id = ANY($1)
        "#,
    )
    .bind(&ids)
    .fetch_all(db)
    .await
    .context("list ingredients")?;

    let attendance = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, meal_id, user_id, created_at
        FROM attendance
        WHERE meal_id = ANY($1)
        "#,
    )
    .bind(&ids)
    .fetch_all(db)
    .await
    .context("list attendance")?;

    let feedback = sqlx::query_as::<_, Feedback>(
        r#"
        SELECT id, meal_id, user_id, rating, comment, created_at
        FROM feedback
        WHERE meal_id = ANY($1)
        "#,
    )
    .bind(&ids)
    .fetch_all(db)
    .await
    .context("list feedback")?;

    let mut ingredients_by_meal = group_by_meal(ingredients, |i| i.meal_id);
    let mut attendance_by_meal = group_by_meal(attendance, |a| a.meal_id);
    let mut feedback_by_meal = group_by_meal(feedback, |f| f.meal_id);

    Ok(meals
        .into_iter()
        .map(|meal| {
            let id = meal.id;
            MealGraph {
                meal,
                ingredients: ingredients_by_meal.remove(&id).unwrap_or_default(),
                attendance: attendance_by_meal.remove(&id).unwrap_or_default(),
                feedback: feedback_by_meal.remove(&id).unwrap_or_default(),
            }
        })
        .collect())
}

fn group_by_meal<T>(rows: Vec<T>, key: impl Fn(&T) -> Uuid) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(key(&row)).or_default().push(row);
    }
    grouped
}
