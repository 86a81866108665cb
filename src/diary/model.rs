use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::NutrientMap;

/// Calendar dates travel as `YYYY-MM-DD` strings on the wire.
pub mod ymd {
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};
    use time::{format_description::FormatItem, macros::format_description, Date};

    pub const FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let s = date.format(FORMAT).map_err(S::Error::custom)?;
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, FORMAT).map_err(D::Error::custom)
    }
}

/// Optional request dates: absent, null, and `""` all read as `None`.
/// Deserialize-only, since no response carries an optional date.
pub mod ymd_option {
    use serde::{de::Error as _, Deserialize, Deserializer};
    use time::Date;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Date>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.is_empty() => Date::parse(&s, super::ymd::FORMAT)
                .map(Some)
                .map_err(D::Error::custom),
            _ => Ok(None),
        }
    }
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    #[default]
    Custom,
}

/// One food inside a meal template. Shares its shape with [`FoodEntry`]
/// but carries no identity or date of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub fdc_id: i64,
    pub food_name: String,
    #[serde(default)]
    pub brand_owner: String,
    pub serving_size: f64,
    #[serde(default = "default_unit")]
    pub serving_size_unit: String,
    #[serde(default)]
    pub nutrients: NutrientMap,
}

fn default_unit() -> String {
    "g".to_string()
}

/// A saved, reusable template of food items. `total_nutrients` is fixed at
/// creation; meals are never updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: Uuid,
    pub user_id: i64,
    pub meal_name: String,
    pub meal_type: MealType,
    pub food_items: Vec<FoodItem>,
    pub total_nutrients: NutrientMap,
    #[serde(with = "ymd")]
    pub date_created: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// One logged food on a specific day. `meal_name` is set only when the
/// entry was instantiated from a meal template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntry {
    pub id: Uuid,
    pub user_id: i64,
    pub fdc_id: i64,
    pub food_name: String,
    #[serde(default)]
    pub brand_owner: String,
    pub serving_size: f64,
    #[serde(default = "default_unit")]
    pub serving_size_unit: String,
    #[serde(default)]
    pub nutrients: NutrientMap,
    #[serde(with = "ymd")]
    pub date_added: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn meal_serializes_with_wire_field_names() {
        let meal = Meal {
            id: Uuid::nil(),
            user_id: 7,
            meal_name: "Breakfast".into(),
            meal_type: MealType::Breakfast,
            food_items: vec![],
            total_nutrients: NutrientMap::default(),
            date_created: date!(2024 - 01 - 02),
            timestamp: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&meal).unwrap();
        assert_eq!(json["mealName"], "Breakfast");
        assert_eq!(json["mealType"], "breakfast");
        assert_eq!(json["dateCreated"], "2024-01-02");
        assert_eq!(json["totalNutrients"]["calories"], "0.0");
    }

    #[test]
    fn food_item_fills_defaults() {
        let item: FoodItem = serde_json::from_str(
            r#"{"fdcId": 171688, "foodName": "Apples, raw, with skin", "servingSize": 182}"#,
        )
        .unwrap();
        assert_eq!(item.brand_owner, "");
        assert_eq!(item.serving_size_unit, "g");
        assert_eq!(item.nutrients.calories, "0.0");
    }

    #[test]
    fn entry_meal_name_absent_unless_set() {
        let entry = FoodEntry {
            id: Uuid::nil(),
            user_id: 1,
            fdc_id: 2,
            food_name: "Oats".into(),
            brand_owner: String::new(),
            serving_size: 40.0,
            serving_size_unit: "g".into(),
            nutrients: NutrientMap::default(),
            date_added: date!(2024 - 01 - 02),
            timestamp: OffsetDateTime::UNIX_EPOCH,
            meal_name: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("mealName").is_none());
    }

    #[test]
    fn meal_type_defaults_to_custom() {
        assert_eq!(MealType::default(), MealType::Custom);
        let parsed: MealType = serde_json::from_str(r#""snack""#).unwrap();
        assert_eq!(parsed, MealType::Snack);
    }
}
