use std::collections::HashMap;
use std::hash::Hash;

use crate::domain::model::{Address, FlatRow, Household, InvalidGroupError, Person};
use crate::record::{DecodeError, StructuredRecord, StructuredType};

/// Buckets `items` by key. Groups come out in first-occurrence order of their
/// key and each group keeps the input order of its items. The whole input is
/// consumed before anything is returned.
pub fn group_by_key<T, K, F>(items: impl IntoIterator<Item = T>, key_fn: F) -> Vec<(K, Vec<T>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();

    for item in items {
        let key = key_fn(&item);
        match slots.get(&key) {
            Some(&slot) => groups[slot].1.push(item),
            None => {
                slots.insert(key.clone(), groups.len());
                groups.push((key, vec![item]));
            }
        }
    }

    groups
}

/// 依地址分組成家戶，家戶順序為地址第一次出現的順序
pub fn group_into_households(rows: &[FlatRow]) -> Vec<Household> {
    let groups = group_by_key(rows.iter(), |(_, address)| address.clone());

    let households: Vec<Household> = groups
        .into_iter()
        .map(|(address, rows)| {
            let members = rows.into_iter().map(|(person, _)| person.clone()).collect();
            Household::from_collected(members, address)
        })
        .collect();

    tracing::debug!(
        "Grouped {} rows into {} households",
        rows.len(),
        households.len()
    );
    households
}

/// Builds households from groups collected elsewhere, e.g. by an engine's
/// group-and-collect step. Fails on the first empty group.
pub fn households_from_groups<I>(groups: I) -> Result<Vec<Household>, InvalidGroupError>
where
    I: IntoIterator<Item = (Address, Vec<Person>)>,
{
    groups
        .into_iter()
        .map(|(address, members)| Household::try_new(members, address))
        .collect()
}

pub fn explode_household(household: &Household) -> Vec<FlatRow> {
    household
        .members()
        .iter()
        .map(|person| (person.clone(), household.address().clone()))
        .collect()
}

pub fn flatten_households(households: &[Household]) -> Vec<FlatRow> {
    households.iter().flat_map(explode_household).collect()
}

/// Filters a sequence of structured member records.
///
/// Every entry is decoded into a [`Person`] first; the predicate only ever
/// sees typed values. Survivors are re-encoded in their original order.
pub fn filter_member_records<F>(
    records: &[StructuredRecord],
    predicate: F,
) -> Result<Vec<StructuredRecord>, DecodeError>
where
    F: Fn(&Person) -> bool,
{
    let members = crate::record::decode_all::<Person>(records)?;
    Ok(members
        .iter()
        .filter(|&p| predicate(p))
        .map(Person::to_structured_record)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(first: &str, age: i32, street: &str, number: i32, city: &str) -> FlatRow {
        (
            Person::new(first, "Smith", age),
            Address::new(street, number, city),
        )
    }

    fn tutorial_rows() -> Vec<FlatRow> {
        vec![
            row("Anne", 33, "second", 28, "Denver"),
            row("Bob", 41, "juniper", 1986, "Boulder"),
            row("Zak", 33, "second", 28, "Denver"),
            row("Cleo", 70, "third", 18, "Denver"),
            row("Kaylee", 3, "second", 28, "Denver"),
            row("Dan", 12, "juniper", 1986, "Boulder"),
        ]
    }

    fn counts(rows: &[FlatRow]) -> HashMap<FlatRow, usize> {
        let mut map = HashMap::new();
        for r in rows {
            *map.entry(r.clone()).or_insert(0) += 1;
        }
        map
    }

    #[test]
    fn test_group_by_key_first_occurrence_order() {
        let groups = group_by_key(vec![3, 1, 4, 1, 5, 9, 2, 6], |n| n % 3);
        assert_eq!(
            groups,
            vec![(0, vec![3, 9, 6]), (1, vec![1, 4, 1]), (2, vec![5, 2])]
        );
    }

    #[test]
    fn test_group_into_households_preserves_member_order() {
        let households = group_into_households(&tutorial_rows());

        assert_eq!(households.len(), 3);
        assert_eq!(households[0].address(), &Address::new("second", 28, "Denver"));
        assert_eq!(households[1].address(), &Address::new("juniper", 1986, "Boulder"));
        assert_eq!(households[2].address(), &Address::new("third", 18, "Denver"));

        let names: Vec<&str> = households[0]
            .members()
            .iter()
            .map(|p| p.first_name.as_str())
            .collect();
        assert_eq!(names, vec!["Anne", "Zak", "Kaylee"]);
    }

    #[test]
    fn test_grouping_by_address_matches_grouping_by_columns() {
        let rows = tutorial_rows();

        let by_address: Vec<Vec<Person>> = group_into_households(&rows)
            .into_iter()
            .map(|h| h.into_parts().0)
            .collect();

        let by_columns: Vec<Vec<Person>> = group_by_key(rows.iter(), |(_, a)| {
            (a.street.clone(), a.house_number, a.city.clone())
        })
        .into_iter()
        .map(|(_, rows)| rows.into_iter().map(|(p, _)| p.clone()).collect())
        .collect();

        assert_eq!(by_address, by_columns);
    }

    #[test]
    fn test_same_street_different_city_are_distinct_households() {
        let rows = vec![
            row("Anne", 33, "first", 1, "Denver"),
            row("Bob", 33, "first", 1, "Boulder"),
        ];
        assert_eq!(group_into_households(&rows).len(), 2);
    }

    #[test]
    fn test_flatten_after_group_is_permutation() {
        let rows = tutorial_rows();
        let flattened = flatten_households(&group_into_households(&rows));

        assert_eq!(flattened.len(), rows.len());
        assert_eq!(counts(&flattened), counts(&rows));
    }

    #[test]
    fn test_round_trip_keeps_duplicate_rows() {
        let rows = vec![
            row("Anne", 33, "first", 1, "Denver"),
            row("Anne", 33, "first", 1, "Denver"),
        ];
        let households = group_into_households(&rows);

        assert_eq!(households.len(), 1);
        assert_eq!(households[0].members().len(), 2);
        assert_eq!(flatten_households(&households), rows);
    }

    #[test]
    fn test_empty_input_yields_no_households() {
        assert!(group_into_households(&[]).is_empty());
    }

    #[test]
    fn test_explode_household_pairs_every_member_with_address() {
        let household = group_into_households(&tutorial_rows()).remove(0);
        let exploded = explode_household(&household);

        assert_eq!(exploded.len(), 3);
        assert!(exploded.iter().all(|(_, a)| a == household.address()));
        assert_eq!(exploded[2].0.first_name, "Kaylee");
    }

    #[test]
    fn test_households_from_groups_rejects_empty_group() {
        let groups = vec![
            (Address::new("first", 1, "Denver"), vec![Person::new("Anne", "Smith", 33)]),
            (Address::new("third", 2, "Denver"), vec![]),
        ];

        let err = households_from_groups(groups).unwrap_err();
        assert!(matches!(
            err,
            InvalidGroupError::EmptyMembers { house_number: 2, .. }
        ));
    }

    #[test]
    fn test_filter_member_records_decodes_before_filtering() {
        let records: Vec<StructuredRecord> = vec![
            Person::new("Anne", "Smith", 33).to_structured_record(),
            // age arrives as text and must still be compared numerically
            StructuredRecord::from_texts(["Kaylee", "Smith", "3"]),
            Person::new("Zak", "Smith", 29).to_structured_record(),
        ];

        let young = filter_member_records(&records, |p| p.age < 30).unwrap();

        assert_eq!(
            crate::record::decode_all::<Person>(&young).unwrap(),
            vec![Person::new("Kaylee", "Smith", 3), Person::new("Zak", "Smith", 29)]
        );
        assert_eq!(young[0], Person::new("Kaylee", "Smith", 3).to_structured_record());
    }

    #[test]
    fn test_filter_member_records_fails_on_bad_member() {
        let records = vec![StructuredRecord::from_texts(["Anne", "Smith", "old"])];
        assert!(filter_member_records(&records, |_| true).is_err());
    }
}
