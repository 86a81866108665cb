//! Best-effort mapping from USDA nutrient names onto the diary's fixed
//! nutrient keys.
//!
//! The upstream taxonomy is loose ("Energy", "Energy (Atwater General
//! Factors)", "Total lipid (fat)", ...), so matching is by case-insensitive
//! substring against the display name. The rules below are pinned by tests
//! against known upstream strings; they are not expected to generalize to
//! names the tests have never seen.

use crate::foods::client::FoodNutrient;
use crate::nutrition::NutrientMap;

/// Upstream amounts are per 100 g/ml of the food.
const AMOUNT_BASE: f64 = 100.0;

/// Slot indexes follow the fixed key order of [`NutrientMap`].
fn classify(name: &str) -> Option<usize> {
    if name.contains("energy") || name.contains("calorie") {
        Some(0)
    } else if name.contains("protein") {
        Some(1)
    } else if name.contains("carbohydrate") {
        Some(2)
    } else if name.contains("fat") && !name.contains("fatty") {
        Some(3)
    } else if name.contains("fiber") {
        Some(4)
    } else if name.contains("sugar") {
        Some(5)
    } else if name.contains("sodium") {
        Some(6)
    } else {
        None
    }
}

/// Reduce a heterogeneous upstream nutrient list to the seven fixed keys,
/// scaled from per-100-unit amounts to the requested serving size.
///
/// The first nutrient to match a target key wins; later matches for the
/// same key are ignored. Keys with no match come out as zero.
pub fn nutrients_for_serving(nutrients: &[FoodNutrient], serving_size: f64) -> NutrientMap {
    let mut slots: [Option<f64>; 7] = [None; 7];

    for entry in nutrients {
        let Some(info) = &entry.nutrient else { continue };
        let Some(slot) = classify(&info.name.to_lowercase()) else {
            continue;
        };
        if slots[slot].is_none() {
            slots[slot] = Some(entry.amount.unwrap_or(0.0) * serving_size / AMOUNT_BASE);
        }
    }

    NutrientMap::from_amounts(slots.map(|v| v.unwrap_or(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::client::NutrientInfo;

    fn nutrient(name: &str, amount: f64) -> FoodNutrient {
        FoodNutrient {
            nutrient: Some(NutrientInfo { name: name.into() }),
            amount: Some(amount),
        }
    }

    #[test]
    fn known_upstream_names_land_on_their_keys() {
        let nutrients = vec![
            nutrient("Energy", 52.0),
            nutrient("Protein", 0.26),
            nutrient("Carbohydrate, by difference", 13.81),
            nutrient("Total lipid (fat)", 0.17),
            nutrient("Fiber, total dietary", 2.4),
            nutrient("Sugars, total including NLEA", 10.39),
            nutrient("Sodium, Na", 1.0),
        ];
        let map = nutrients_for_serving(&nutrients, 100.0);
        assert_eq!(map.calories, "52.0");
        assert_eq!(map.protein, "0.3");
        assert_eq!(map.carbohydrates, "13.8");
        assert_eq!(map.fat, "0.2");
        assert_eq!(map.fiber, "2.4");
        assert_eq!(map.sugar, "10.4");
        assert_eq!(map.sodium, "1.0");
    }

    #[test]
    fn amounts_scale_with_serving_size() {
        let nutrients = vec![nutrient("Energy", 52.0)];
        let map = nutrients_for_serving(&nutrients, 50.0);
        assert_eq!(map.calories, "26.0");
    }

    #[test]
    fn fatty_acids_do_not_count_as_fat() {
        let nutrients = vec![
            nutrient("Fatty acids, total saturated", 12.0),
            nutrient("Total lipid (fat)", 3.5),
        ];
        let map = nutrients_for_serving(&nutrients, 100.0);
        assert_eq!(map.fat, "3.5");
    }

    #[test]
    fn first_match_wins_per_key() {
        let nutrients = vec![
            nutrient("Energy", 52.0),
            nutrient("Energy (Atwater General Factors)", 55.0),
        ];
        let map = nutrients_for_serving(&nutrients, 100.0);
        assert_eq!(map.calories, "52.0");
    }

    #[test]
    fn unknown_names_are_ignored_and_unmatched_keys_are_zero() {
        let nutrients = vec![
            nutrient("Vitamin C, total ascorbic acid", 4.6),
            nutrient("Protein", 1.0),
        ];
        let map = nutrients_for_serving(&nutrients, 100.0);
        assert_eq!(map.protein, "1.0");
        assert_eq!(map.calories, "0.0");
        assert_eq!(map.sodium, "0.0");
    }

    #[test]
    fn missing_amount_reads_as_zero() {
        let nutrients = vec![FoodNutrient {
            nutrient: Some(NutrientInfo {
                name: "Energy".into(),
            }),
            amount: None,
        }];
        let map = nutrients_for_serving(&nutrients, 100.0);
        assert_eq!(map.calories, "0.0");
    }
}
