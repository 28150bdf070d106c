use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of columns in every extracted record.
pub const FIELD_COUNT: usize = 9;

/// Canonical semantic column extracted from a collections sheet.
///
/// The declaration order is the canonical output order, so `key as usize` is
/// the position of the field inside an [`OutputRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    /// Vehicle registration plate; the primary identifier of a record.
    Plate,
    /// Vehicle model, brand, or asset type.
    VehicleType,
    /// Financing (leasing) company.
    Financier,
    /// Number of days the instalment is overdue.
    DaysOverdue,
    /// Outstanding balance.
    Balance,
    /// Branch office handling the account.
    Branch,
    /// Free-form remarks.
    Remarks,
    /// Chassis (frame) number.
    ChassisNumber,
    /// Engine number.
    EngineNumber,
}

impl FieldKey {
    /// All keys in canonical output order.
    pub const ALL: [FieldKey; FIELD_COUNT] = [
        FieldKey::Plate,
        FieldKey::VehicleType,
        FieldKey::Financier,
        FieldKey::DaysOverdue,
        FieldKey::Balance,
        FieldKey::Branch,
        FieldKey::Remarks,
        FieldKey::ChassisNumber,
        FieldKey::EngineNumber,
    ];

    /// Position of the field in an [`OutputRow`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Canonical name used in serialized output.
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldKey::Plate => "plate",
            FieldKey::VehicleType => "vehicleType",
            FieldKey::Financier => "financier",
            FieldKey::DaysOverdue => "daysOverdue",
            FieldKey::Balance => "balance",
            FieldKey::Branch => "branch",
            FieldKey::Remarks => "remarks",
            FieldKey::ChassisNumber => "chassisNumber",
            FieldKey::EngineNumber => "engineNumber",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized values of one candidate data row. A slot is `None` when the
/// source cell was missing or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: [Option<String>; FIELD_COUNT],
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the normalized value of a field, replacing any previous one.
    pub fn set(&mut self, key: FieldKey, value: String) {
        self.values[key.index()] = Some(value);
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.values[key.index()].as_deref()
    }

    /// Whether the field holds a non-empty value.
    pub fn has_value(&self, key: FieldKey) -> bool {
        self.get(key).is_some_and(|value| !value.is_empty())
    }

    /// Converts the record into its fixed-arity output form.
    pub fn into_output_row(self) -> OutputRow {
        OutputRow(self.values.map(Option::unwrap_or_default))
    }
}

/// One extracted record: exactly [`FIELD_COUNT`] strings in canonical order.
///
/// Serializes as a plain JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputRow([String; FIELD_COUNT]);

impl OutputRow {
    pub fn get(&self, key: FieldKey) -> &str {
        &self.0[key.index()]
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn into_values(self) -> [String; FIELD_COUNT] {
        self.0
    }
}

impl From<[String; FIELD_COUNT]> for OutputRow {
    fn from(values: [String; FIELD_COUNT]) -> Self {
        Self(values)
    }
}
