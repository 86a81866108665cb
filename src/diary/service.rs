use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::diary::model::{today, FoodEntry, FoodItem, Meal, MealType};
use crate::error::ApiError;
use crate::foods::client::FoodDataClient;
use crate::foods::mapping::nutrients_for_serving;
use crate::nutrition::{aggregate, daily_calories};
use crate::store::DiaryStore;

pub struct NewMeal {
    pub user_id: i64,
    pub meal_name: String,
    pub meal_type: MealType,
    pub food_items: Vec<FoodItem>,
    pub date: Option<Date>,
}

/// Create a meal template, computing its nutrient totals once from the
/// items. The totals are never recomputed afterwards.
pub async fn create_meal(store: &dyn DiaryStore, new: NewMeal) -> Result<Meal, ApiError> {
    if new.user_id <= 0 || new.meal_name.trim().is_empty() || new.food_items.is_empty() {
        return Err(ApiError::InvalidArgument(
            "userId, mealName, and foodItems are required".into(),
        ));
    }

    let total_nutrients = aggregate(&new.food_items);
    let meal = Meal {
        id: Uuid::new_v4(),
        user_id: new.user_id,
        meal_name: new.meal_name,
        meal_type: new.meal_type,
        food_items: new.food_items,
        total_nutrients,
        date_created: new.date.unwrap_or_else(today),
        timestamp: OffsetDateTime::now_utc(),
    };
    store.insert_meal(&meal).await?;
    Ok(meal)
}

pub async fn list_meals(
    store: &dyn DiaryStore,
    user_id: i64,
    date: Option<Date>,
) -> Result<Vec<Meal>, ApiError> {
    Ok(store.list_meals(user_id, date).await?)
}

/// Instantiate a meal's items as food entries on the given day.
///
/// Entries are inserted one at a time with no transaction around the loop:
/// if an insert fails partway, the entries already written stay written.
pub async fn add_meal_to_today(
    store: &dyn DiaryStore,
    user_id: i64,
    meal_id: Uuid,
    date: Option<Date>,
) -> Result<(String, Vec<FoodEntry>), ApiError> {
    let meal = store
        .find_meal(meal_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Meal not found".into()))?;

    let date_added = date.unwrap_or_else(today);
    let mut added = Vec::with_capacity(meal.food_items.len());
    for item in &meal.food_items {
        let entry = FoodEntry {
            id: Uuid::new_v4(),
            user_id,
            fdc_id: item.fdc_id,
            food_name: item.food_name.clone(),
            brand_owner: item.brand_owner.clone(),
            serving_size: item.serving_size,
            serving_size_unit: item.serving_size_unit.clone(),
            nutrients: item.nutrients.clone(),
            date_added,
            timestamp: OffsetDateTime::now_utc(),
            meal_name: Some(meal.meal_name.clone()),
        };
        store.insert_entry(&entry).await?;
        added.push(entry);
    }
    Ok((meal.meal_name, added))
}

pub async fn delete_meal(
    store: &dyn DiaryStore,
    user_id: i64,
    meal_id: Uuid,
) -> Result<(), ApiError> {
    if store.delete_meal(meal_id, user_id).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound("Meal not found".into()))
    }
}

/// Log one food by FDC id: fetch its details from the nutrition database,
/// derive the nutrient map for the serving, persist the entry. Nothing is
/// written if the upstream lookup fails.
pub async fn add_food_entry(
    store: &dyn DiaryStore,
    foods: &dyn FoodDataClient,
    user_id: i64,
    fdc_id: i64,
    serving_size: f64,
    date: Option<Date>,
) -> Result<FoodEntry, ApiError> {
    if user_id <= 0 || fdc_id <= 0 || serving_size <= 0.0 {
        return Err(ApiError::InvalidArgument(
            "userId, fdcId, and servingSize are required".into(),
        ));
    }

    let record = foods.fetch_food(fdc_id).await?;
    let nutrients = nutrients_for_serving(&record.food_nutrients, serving_size);

    let entry = FoodEntry {
        id: Uuid::new_v4(),
        user_id,
        fdc_id,
        food_name: record
            .description
            .unwrap_or_else(|| "Unknown Food".to_string()),
        brand_owner: record.brand_owner.unwrap_or_default(),
        serving_size,
        serving_size_unit: "g".to_string(),
        nutrients,
        date_added: date.unwrap_or_else(today),
        timestamp: OffsetDateTime::now_utc(),
        meal_name: None,
    };
    store.insert_entry(&entry).await?;
    Ok(entry)
}

/// A day's entries plus their live calorie total.
pub async fn list_food_entries(
    store: &dyn DiaryStore,
    user_id: i64,
    date: Option<Date>,
) -> Result<(Vec<FoodEntry>, String), ApiError> {
    let entries = store.list_entries(user_id, date).await?;
    let total = daily_calories(entries.iter().map(|e| &e.nutrients));
    Ok((entries, total))
}

pub async fn delete_food_entry(
    store: &dyn DiaryStore,
    user_id: i64,
    entry_id: Uuid,
) -> Result<(), ApiError> {
    if store.delete_entry(entry_id, user_id).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound("Food entry not found".into()))
    }
}
