use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::diary::model::{ymd_option, FoodEntry, FoodItem, Meal, MealType};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMealRequest {
    pub user_id: i64,
    pub meal_name: String,
    #[serde(default)]
    pub meal_type: MealType,
    pub food_items: Vec<FoodItem>,
    #[serde(default, with = "ymd_option")]
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMealsRequest {
    pub user_id: i64,
    #[serde(default, with = "ymd_option")]
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMealTodayRequest {
    pub user_id: i64,
    pub meal_id: Uuid,
    #[serde(default, with = "ymd_option")]
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMealRequest {
    pub user_id: i64,
    pub meal_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFoodRequest {
    pub user_id: i64,
    pub fdc_id: i64,
    pub serving_size: f64,
    #[serde(default, with = "ymd_option")]
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFoodEntriesRequest {
    pub user_id: i64,
    #[serde(default, with = "ymd_option")]
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFoodEntryRequest {
    pub user_id: i64,
    pub entry_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealCreatedResponse {
    pub success: bool,
    pub message: String,
    pub meal_id: Uuid,
    pub meal: Meal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealsResponse {
    pub success: bool,
    pub meals: Vec<Meal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntriesAddedResponse {
    pub success: bool,
    pub message: String,
    pub added_entries: Vec<FoodEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryCreatedResponse {
    pub success: bool,
    pub message: String,
    pub entry_id: Uuid,
    pub entry: FoodEntry,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntriesResponse {
    pub success: bool,
    pub food_entries: Vec<FoodEntry>,
    pub total_calories: String,
}
