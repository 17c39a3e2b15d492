use super::{DecodeError, FieldDef, FieldKind, RecordSchema, StructuredRecord, StructuredType};
use crate::domain::model::{Address, FlatRow, Household, Person};

pub const PERSON_SCHEMA: RecordSchema = RecordSchema {
    name: "Person",
    version: 1,
    fields: &[
        FieldDef::new("first_name", FieldKind::Text),
        FieldDef::new("last_name", FieldKind::Text),
        FieldDef::new("age", FieldKind::Int),
    ],
};

pub const ADDRESS_SCHEMA: RecordSchema = RecordSchema {
    name: "Address",
    version: 1,
    fields: &[
        FieldDef::new("street", FieldKind::Text),
        FieldDef::new("house_number", FieldKind::Int),
        FieldDef::new("city", FieldKind::Text),
    ],
};

pub const HOUSEHOLD_SCHEMA: RecordSchema = RecordSchema {
    name: "Household",
    version: 1,
    fields: &[
        FieldDef::new("members", FieldKind::Records("Person")),
        FieldDef::new("address", FieldKind::Record("Address")),
    ],
};

pub const FLAT_ROW_SCHEMA: RecordSchema = RecordSchema {
    name: "FlatRow",
    version: 1,
    fields: &[
        FieldDef::new("person", FieldKind::Record("Person")),
        FieldDef::new("address", FieldKind::Record("Address")),
    ],
};

impl StructuredType for Person {
    const SCHEMA: &'static RecordSchema = &PERSON_SCHEMA;

    fn from_structured_record(record: &StructuredRecord) -> Result<Self, DecodeError> {
        let r = Self::SCHEMA.reader(record)?;
        Ok(Person {
            first_name: r.text(0)?,
            last_name: r.text(1)?,
            age: r.int32(2)?,
        })
    }

    fn to_structured_record(&self) -> StructuredRecord {
        Self::SCHEMA
            .writer()
            .push(self.first_name.as_str())
            .push(self.last_name.as_str())
            .push(self.age)
            .finish()
    }
}

impl StructuredType for Address {
    const SCHEMA: &'static RecordSchema = &ADDRESS_SCHEMA;

    fn from_structured_record(record: &StructuredRecord) -> Result<Self, DecodeError> {
        let r = Self::SCHEMA.reader(record)?;
        Ok(Address {
            street: r.text(0)?,
            house_number: r.int32(1)?,
            city: r.text(2)?,
        })
    }

    fn to_structured_record(&self) -> StructuredRecord {
        Self::SCHEMA
            .writer()
            .push(self.street.as_str())
            .push(self.house_number)
            .push(self.city.as_str())
            .finish()
    }
}

impl StructuredType for Household {
    const SCHEMA: &'static RecordSchema = &HOUSEHOLD_SCHEMA;

    fn from_structured_record(record: &StructuredRecord) -> Result<Self, DecodeError> {
        let r = Self::SCHEMA.reader(record)?;
        let members = r.sequence::<Person>(0)?;
        let address = r.nested::<Address>(1)?;
        Ok(Household::try_new(members, address)?)
    }

    fn to_structured_record(&self) -> StructuredRecord {
        Self::SCHEMA
            .writer()
            .push_sequence(self.members())
            .push_nested(self.address())
            .finish()
    }
}

impl StructuredType for FlatRow {
    const SCHEMA: &'static RecordSchema = &FLAT_ROW_SCHEMA;

    fn from_structured_record(record: &StructuredRecord) -> Result<Self, DecodeError> {
        let r = Self::SCHEMA.reader(record)?;
        Ok((r.nested::<Person>(0)?, r.nested::<Address>(1)?))
    }

    fn to_structured_record(&self) -> StructuredRecord {
        Self::SCHEMA
            .writer()
            .push_nested(&self.0)
            .push_nested(&self.1)
            .finish()
    }
}

/// Decodes a batch of records, stopping at the first failure.
pub fn decode_all<T: StructuredType>(records: &[StructuredRecord]) -> Result<Vec<T>, DecodeError> {
    records.iter().map(T::from_structured_record).collect()
}
