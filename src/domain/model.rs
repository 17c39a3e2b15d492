use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    /// Expected to be non-negative; not validated on decode.
    pub age: i32,
}

impl Person {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, age: i32) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            age,
        }
    }
}

/// Grouping key for households. Equality and hashing cover all three fields,
/// so grouping by `Address` partitions exactly like grouping by
/// `(street, house_number, city)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub house_number: i32,
    pub city: String,
}

impl Address {
    pub fn new(street: impl Into<String>, house_number: i32, city: impl Into<String>) -> Self {
        Self {
            street: street.into(),
            house_number,
            city: city.into(),
        }
    }
}

/// 一筆扁平輸入列：成員與其地址
pub type FlatRow = (Person, Address);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidGroupError {
    #[error("household at {street} {house_number}, {city} has no members")]
    EmptyMembers {
        street: String,
        house_number: i32,
        city: String,
    },
}

/// Members of one address, in the order they were collected.
///
/// Fields are private so a `Household` can only exist with at least one
/// member; use [`Household::try_new`] to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Household {
    members: Vec<Person>,
    address: Address,
}

impl Household {
    pub fn try_new(members: Vec<Person>, address: Address) -> Result<Self, InvalidGroupError> {
        if members.is_empty() {
            return Err(InvalidGroupError::EmptyMembers {
                street: address.street,
                house_number: address.house_number,
                city: address.city,
            });
        }
        Ok(Self { members, address })
    }

    /// For groups produced by in-crate grouping, which are never empty.
    pub(crate) fn from_collected(members: Vec<Person>, address: Address) -> Self {
        debug_assert!(!members.is_empty(), "collected group has no members");
        Self { members, address }
    }

    pub fn members(&self) -> &[Person] {
        &self.members
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Typed member filter. The result may be empty, so it is a plain list
    /// rather than a new `Household`.
    pub fn members_where<F>(&self, predicate: F) -> Vec<Person>
    where
        F: Fn(&Person) -> bool,
    {
        self.members.iter().filter(|&p| predicate(p)).cloned().collect()
    }

    pub fn into_parts(self) -> (Vec<Person>, Address) {
        (self.members, self.address)
    }
}

/// 計價後的家戶，是 pipeline 的輸出列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedHousehold {
    pub household: Household,
    pub in_district: bool,
    pub cost: f64,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub priced_households: Vec<PricedHousehold>,
    pub csv_output: String,
    pub tsv_output: String,
    pub json_output: String,
    /// 因成員過濾而整戶被剔除的家戶數
    pub dropped_households: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_household_rejects_empty_members() {
        let err = Household::try_new(vec![], Address::new("first", 1, "Denver")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "household at first 1, Denver has no members"
        );
    }

    #[test]
    fn test_members_where_keeps_order() {
        let household = Household::try_new(
            vec![
                Person::new("Anne", "Smith", 33),
                Person::new("Kaylee", "Smith", 3),
                Person::new("Zak", "Smith", 29),
            ],
            Address::new("second", 28, "Denver"),
        )
        .unwrap();

        let young: Vec<String> = household
            .members_where(|p| p.age < 30)
            .into_iter()
            .map(|p| p.first_name)
            .collect();

        assert_eq!(young, vec!["Kaylee", "Zak"]);
        assert!(household.members_where(|p| p.age > 100).is_empty());
    }

    #[test]
    fn test_address_equality_covers_all_fields() {
        let a = Address::new("first", 10, "Denver");
        assert_eq!(a, Address::new("first", 10, "Denver"));
        assert_ne!(a, Address::new("first", 11, "Denver"));
        assert_ne!(a, Address::new("First", 10, "Denver"));
        assert_ne!(a, Address::new("first", 10, "Boulder"));
    }
}
