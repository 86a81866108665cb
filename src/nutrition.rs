use serde::{Deserialize, Deserializer, Serialize};

use crate::diary::model::FoodItem;

/// Fixed-key nutrient totals. Values are decimal strings with one digit
/// after the point, matching what the clients render and what USDA-derived
/// entries store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientMap {
    #[serde(default = "zero", deserialize_with = "lenient_decimal")]
    pub calories: String,
    #[serde(default = "zero", deserialize_with = "lenient_decimal")]
    pub protein: String,
    #[serde(default = "zero", deserialize_with = "lenient_decimal")]
    pub carbohydrates: String,
    #[serde(default = "zero", deserialize_with = "lenient_decimal")]
    pub fat: String,
    #[serde(default = "zero", deserialize_with = "lenient_decimal")]
    pub fiber: String,
    #[serde(default = "zero", deserialize_with = "lenient_decimal")]
    pub sugar: String,
    #[serde(default = "zero", deserialize_with = "lenient_decimal")]
    pub sodium: String,
}

impl Default for NutrientMap {
    fn default() -> Self {
        Self::from_amounts([0.0; 7])
    }
}

impl NutrientMap {
    /// Build a map from raw amounts in the fixed key order
    /// (calories, protein, carbohydrates, fat, fiber, sugar, sodium),
    /// rounding each to one decimal place.
    pub fn from_amounts(amounts: [f64; 7]) -> Self {
        let [calories, protein, carbohydrates, fat, fiber, sugar, sodium] =
            amounts.map(|v| format!("{v:.1}"));
        Self {
            calories,
            protein,
            carbohydrates,
            fat,
            fiber,
            sugar,
            sodium,
        }
    }

    fn values(&self) -> [&str; 7] {
        [
            &self.calories,
            &self.protein,
            &self.carbohydrates,
            &self.fat,
            &self.fiber,
            &self.sugar,
            &self.sodium,
        ]
    }
}

fn zero() -> String {
    "0".to_string()
}

/// Clients send nutrient values as strings, but numbers show up too.
/// Anything else reads as zero rather than failing the whole payload.
fn lenient_decimal<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(de)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => zero(),
    })
}

// "nan"/"inf" parse as valid f64s but would poison every sum they touch.
fn parse_or_zero(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Sum the nutrients of a list of food items into a single map.
///
/// Missing or unparsable values count as zero; rounding happens once at
/// the end, so the result does not depend on item order.
pub fn aggregate(items: &[FoodItem]) -> NutrientMap {
    let mut sums = [0.0f64; 7];
    for item in items {
        for (sum, value) in sums.iter_mut().zip(item.nutrients.values()) {
            *sum += parse_or_zero(value);
        }
    }
    NutrientMap::from_amounts(sums)
}

/// Total calories across a day's food entries.
///
/// This is intentionally separate from [`aggregate`]: a meal's totals are
/// computed once from its items at creation, while a day's total is summed
/// live from whatever entries are on the log.
pub fn daily_calories<'a, I>(nutrients: I) -> String
where
    I: IntoIterator<Item = &'a NutrientMap>,
{
    let total: f64 = nutrients
        .into_iter()
        .map(|n| parse_or_zero(&n.calories))
        .sum();
    format!("{total:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with(nutrients: NutrientMap) -> FoodItem {
        FoodItem {
            fdc_id: 1,
            food_name: "test".into(),
            brand_owner: String::new(),
            serving_size: 100.0,
            serving_size_unit: "g".into(),
            nutrients,
        }
    }

    fn map(calories: &str, protein: &str) -> NutrientMap {
        NutrientMap {
            calories: calories.into(),
            protein: protein.into(),
            ..NutrientMap::default()
        }
    }

    #[test]
    fn empty_input_is_all_zero() {
        let totals = aggregate(&[]);
        assert_eq!(totals, NutrientMap::from_amounts([0.0; 7]));
        assert_eq!(totals.calories, "0.0");
        assert_eq!(totals.sodium, "0.0");
    }

    #[test]
    fn sums_and_rounds_to_one_decimal() {
        let items = vec![
            item_with(map("100.0", "12.25")),
            item_with(map("50.5", "3.25")),
        ];
        let totals = aggregate(&items);
        assert_eq!(totals.calories, "150.5");
        assert_eq!(totals.protein, "15.5");
        assert_eq!(totals.fat, "0.0");
    }

    #[test]
    fn order_does_not_change_result() {
        let mut items = vec![
            item_with(map("10.1", "1.01")),
            item_with(map("20.2", "2.02")),
            item_with(map("30.3", "3.03")),
        ];
        let forward = aggregate(&items);
        items.reverse();
        assert_eq!(aggregate(&items), forward);
    }

    #[test]
    fn unparsable_values_count_as_zero() {
        let items = vec![
            item_with(map("not a number", "")),
            item_with(map("99.9", "2.0")),
        ];
        let totals = aggregate(&items);
        assert_eq!(totals.calories, "99.9");
        assert_eq!(totals.protein, "2.0");
    }

    #[test]
    fn non_finite_values_count_as_zero() {
        let items = vec![item_with(map("nan", "inf")), item_with(map("100.0", "-inf"))];
        let totals = aggregate(&items);
        assert_eq!(totals.calories, "100.0");
        assert_eq!(totals.protein, "0.0");
    }

    #[test]
    fn every_output_field_has_one_fractional_digit() {
        let totals = aggregate(&[item_with(map("100", "7"))]);
        for value in totals.values() {
            let (_, frac) = value.split_once('.').expect("decimal point");
            assert_eq!(frac.len(), 1, "field {value:?}");
        }
    }

    #[test]
    fn daily_calories_sums_entry_calories() {
        let maps = [map("120.3", "0"), map("79.7", "0")];
        assert_eq!(daily_calories(maps.iter()), "200.0");
    }

    #[test]
    fn daily_calories_skips_unparsable() {
        let maps = [map("junk", "0"), map("10.0", "0")];
        assert_eq!(daily_calories(maps.iter()), "10.0");
    }

    #[test]
    fn daily_calories_skips_non_finite() {
        let maps = [map("nan", "0")];
        assert_eq!(daily_calories(maps.iter()), "0.0");
        let maps = [map("inf", "0"), map("25.5", "0")];
        assert_eq!(daily_calories(maps.iter()), "25.5");
    }

    #[test]
    fn nutrient_map_accepts_numbers_and_fills_gaps() {
        let parsed: NutrientMap =
            serde_json::from_str(r#"{"calories": 52, "protein": "0.3"}"#).unwrap();
        assert_eq!(parsed.calories, "52");
        assert_eq!(parsed.protein, "0.3");
        assert_eq!(parsed.fat, "0");
    }
}
