pub mod nest;

pub use nest::{
    explode_household, filter_member_records, flatten_households, group_by_key,
    group_into_households, households_from_groups,
};
