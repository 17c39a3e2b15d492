//! Membership cost rule.
//!
//! Each member is charged by age bracket. The two most expensive members of a
//! household pay full price, everyone else pays the discounted-tier rate, and
//! households inside the district get a further discount on the total.

use serde::{Deserialize, Serialize};

use crate::domain::model::{Address, Household, Person};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};

/// Age brackets as `(upper bound exclusive, cost)`, ascending; the last
/// bracket has no upper bound.
const AGE_BRACKETS: [(i32, f64); 3] = [(5, 3.00), (18, 5.00), (60, 10.50)];
const SENIOR_COST: f64 = 7.00;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingRules {
    pub district_city: String,
    pub district_streets: Vec<String>,
    /// House numbers strictly below this are in the district.
    pub district_max_house_number: i32,
    /// Number of most expensive members charged full price.
    pub full_price_members: usize,
    pub discounted_tier_rate: f64,
    pub district_discount_factor: f64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            district_city: "Denver".to_string(),
            district_streets: vec![
                "first".to_string(),
                "second".to_string(),
                "third".to_string(),
            ],
            district_max_house_number: 1000,
            full_price_members: 2,
            discounted_tier_rate: 0.5,
            district_discount_factor: 0.9,
        }
    }
}

impl PricingRules {
    pub fn individual_cost(&self, person: &Person) -> f64 {
        AGE_BRACKETS
            .iter()
            .find(|(upper, _)| person.age < *upper)
            .map(|(_, cost)| *cost)
            .unwrap_or(SENIOR_COST)
    }

    /// Case-sensitive. All three conditions are always evaluated.
    pub fn in_district(&self, address: &Address) -> bool {
        let city_matches = address.city == self.district_city;
        let street_matches = self.district_streets.iter().any(|s| *s == address.street);
        let number_matches = address.house_number < self.district_max_house_number;
        city_matches & street_matches & number_matches
    }

    pub fn household_cost(&self, household: &Household) -> f64 {
        let mut costs: Vec<f64> = household
            .members()
            .iter()
            .map(|p| self.individual_cost(p))
            .collect();
        costs.sort_by(f64::total_cmp);

        // 少於 full_price_members 位成員時，全部都算全額
        let split = costs.len().saturating_sub(self.full_price_members);
        let (discounted, full_price) = costs.split_at(split);

        let base_price = full_price.iter().sum::<f64>()
            + self.discounted_tier_rate * discounted.iter().sum::<f64>();

        if self.in_district(household.address()) {
            base_price * self.district_discount_factor
        } else {
            base_price
        }
    }
}

impl Validate for PricingRules {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("pricing.district_city", &self.district_city)?;
        if self.district_streets.is_empty() {
            return Err(EtlError::InvalidConfigValueError {
                field: "pricing.district_streets".to_string(),
                value: "[]".to_string(),
                reason: "At least one district street is required".to_string(),
            });
        }
        for street in &self.district_streets {
            validate_non_empty_string("pricing.district_streets", street)?;
        }
        validate_range("pricing.discounted_tier_rate", self.discounted_tier_rate, 0.0, 1.0)?;
        validate_range(
            "pricing.district_discount_factor",
            self.district_discount_factor,
            0.0,
            1.0,
        )?;
        Ok(())
    }
}

pub fn individual_cost(person: &Person) -> f64 {
    PricingRules::default().individual_cost(person)
}

pub fn in_district(address: &Address) -> bool {
    PricingRules::default().in_district(address)
}

pub fn household_cost(household: &Household) -> f64 {
    PricingRules::default().household_cost(household)
}
