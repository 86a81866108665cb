use axum::{extract::State, Json};
use tracing::{info, instrument};

use crate::diary::dto::{
    AddFoodRequest, AddMealRequest, AddMealTodayRequest, DeleteFoodEntryRequest,
    DeleteMealRequest, DeletedResponse, EntriesAddedResponse, EntryCreatedResponse,
    FoodEntriesResponse, GetFoodEntriesRequest, GetMealsRequest, MealCreatedResponse,
    MealsResponse,
};
use crate::diary::service::{self, NewMeal};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

#[instrument(skip(state, body))]
pub async fn add_meal(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AddMealRequest>,
) -> Result<Json<MealCreatedResponse>, ApiError> {
    let meal = service::create_meal(
        state.store.as_ref(),
        NewMeal {
            user_id: body.user_id,
            meal_name: body.meal_name,
            meal_type: body.meal_type,
            food_items: body.food_items,
            date: body.date,
        },
    )
    .await?;

    info!(meal_id = %meal.id, user_id = meal.user_id, "meal created");
    Ok(Json(MealCreatedResponse {
        success: true,
        message: "Meal has been created successfully".into(),
        meal_id: meal.id,
        meal,
    }))
}

#[instrument(skip(state, body))]
pub async fn get_meals(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GetMealsRequest>,
) -> Result<Json<MealsResponse>, ApiError> {
    let meals = service::list_meals(state.store.as_ref(), body.user_id, body.date).await?;
    Ok(Json(MealsResponse {
        success: true,
        meals,
    }))
}

#[instrument(skip(state, body))]
pub async fn add_meal_today(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AddMealTodayRequest>,
) -> Result<Json<EntriesAddedResponse>, ApiError> {
    let (meal_name, added_entries) =
        service::add_meal_to_today(state.store.as_ref(), body.user_id, body.meal_id, body.date)
            .await?;

    info!(
        user_id = body.user_id,
        meal_id = %body.meal_id,
        count = added_entries.len(),
        "meal added to log"
    );
    Ok(Json(EntriesAddedResponse {
        success: true,
        message: format!("Added {meal_name} to today's log"),
        added_entries,
    }))
}

#[instrument(skip(state, body))]
pub async fn delete_meal(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DeleteMealRequest>,
) -> Result<Json<DeletedResponse>, ApiError> {
    service::delete_meal(state.store.as_ref(), body.user_id, body.meal_id).await?;
    info!(user_id = body.user_id, meal_id = %body.meal_id, "meal deleted");
    Ok(Json(DeletedResponse {
        success: true,
        message: "Meal deleted".into(),
    }))
}

#[instrument(skip(state, body))]
pub async fn add_food(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AddFoodRequest>,
) -> Result<Json<EntryCreatedResponse>, ApiError> {
    let entry = service::add_food_entry(
        state.store.as_ref(),
        state.foods.as_ref(),
        body.user_id,
        body.fdc_id,
        body.serving_size,
        body.date,
    )
    .await?;

    info!(entry_id = %entry.id, user_id = entry.user_id, fdc_id = entry.fdc_id, "food logged");
    Ok(Json(EntryCreatedResponse {
        success: true,
        message: "Food has been added to your diary".into(),
        entry_id: entry.id,
        entry,
    }))
}

#[instrument(skip(state, body))]
pub async fn get_food_entries(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GetFoodEntriesRequest>,
) -> Result<Json<FoodEntriesResponse>, ApiError> {
    let (food_entries, total_calories) =
        service::list_food_entries(state.store.as_ref(), body.user_id, body.date).await?;
    Ok(Json(FoodEntriesResponse {
        success: true,
        food_entries,
        total_calories,
    }))
}

#[instrument(skip(state, body))]
pub async fn delete_food_entry(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DeleteFoodEntryRequest>,
) -> Result<Json<DeletedResponse>, ApiError> {
    service::delete_food_entry(state.store.as_ref(), body.user_id, body.entry_id).await?;
    info!(user_id = body.user_id, entry_id = %body.entry_id, "food entry deleted");
    Ok(Json(DeletedResponse {
        success: true,
        message: "Food entry deleted".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary::model::{FoodItem, MealType};
    use crate::nutrition::NutrientMap;
    use crate::state::AppState;

    fn add_meal_body() -> AddMealRequest {
        AddMealRequest {
            user_id: 1,
            meal_name: "Breakfast".into(),
            meal_type: MealType::Breakfast,
            food_items: vec![FoodItem {
                fdc_id: 1,
                food_name: "Oats".into(),
                brand_owner: String::new(),
                serving_size: 40.0,
                serving_size_unit: "g".into(),
                nutrients: NutrientMap {
                    calories: "150.0".into(),
                    ..NutrientMap::default()
                },
            }],
            date: None,
        }
    }

    #[tokio::test]
    async fn add_meal_responds_with_the_persisted_meal() {
        let state = AppState::fake();
        let Json(response) = add_meal(State(state.clone()), ApiJson(add_meal_body()))
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.meal_id, response.meal.id);
        assert_eq!(response.meal.total_nutrients.calories, "150.0");

        let Json(listed) = get_meals(
            State(state),
            ApiJson(GetMealsRequest {
                user_id: 1,
                date: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(listed.meals.len(), 1);
    }

    #[tokio::test]
    async fn add_meal_today_reports_the_meal_name() {
        let state = AppState::fake();
        let Json(created) = add_meal(State(state.clone()), ApiJson(add_meal_body()))
            .await
            .unwrap();

        let Json(response) = add_meal_today(
            State(state),
            ApiJson(AddMealTodayRequest {
                user_id: 1,
                meal_id: created.meal_id,
                date: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.message, "Added Breakfast to today's log");
        assert_eq!(response.added_entries.len(), 1);
    }

    #[tokio::test]
    async fn delete_meal_of_another_user_is_not_found() {
        let state = AppState::fake();
        let Json(created) = add_meal(State(state.clone()), ApiJson(add_meal_body()))
            .await
            .unwrap();

        let err = delete_meal(
            State(state),
            ApiJson(DeleteMealRequest {
                user_id: 99,
                meal_id: created.meal_id,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
