//! Canonical field dictionary used to recognise header cells.
//!
//! Header text in collections sheets varies wildly between sources ("No
//! Polisi", "NOPOL", "License Plate", ...). Each canonical field owns a list of
//! lowercase, whitespace-free aliases; a header cell names a field when its
//! cleaned text contains one of them.

use std::collections::BTreeSet;

use crate::fleet::arrears::error::{ExtractError, Result};
use crate::fleet::arrears::model::FieldKey;

/// One dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: FieldKey,
    /// Lowercase, whitespace-free substrings, tested in order.
    pub aliases: &'static [&'static str],
    /// A header row naming this field is accepted on that basis alone, and a
    /// data row is only emitted when this field has a value.
    pub required: bool,
}

impl FieldSpec {
    /// Whether any alias occurs inside the cleaned header text.
    pub fn matches(&self, cleaned: &str) -> bool {
        self.aliases.iter().any(|alias| cleaned.contains(alias))
    }
}

static STANDARD_FIELDS: [FieldSpec; 9] = [
    FieldSpec {
        key: FieldKey::Plate,
        aliases: &["licenseplate", "nopolisi", "nopol", "plate", "vehicleplate"],
        required: true,
    },
    FieldSpec {
        key: FieldKey::VehicleType,
        aliases: &[
            "unit",
            "assettype",
            "merk",
            "type",
            "jeniskendaraan",
            "mobil",
            "jenis",
            "typeunit",
            "vehicle",
        ],
        required: false,
    },
    FieldSpec {
        key: FieldKey::Financier,
        aliases: &["lesing", "leasing", "lesng", "finance", "financing", "financier"],
        required: false,
    },
    FieldSpec {
        key: FieldKey::DaysOverdue,
        aliases: &[
            "overdue",
            "ovd",
            "daysoverdue",
            "overdu",
            "hari",
            "keterlambatan",
            "dayslate",
        ],
        required: false,
    },
    FieldSpec {
        key: FieldKey::Balance,
        aliases: &["saldo", "credit", "balance", "amount", "remaining"],
        required: false,
    },
    FieldSpec {
        key: FieldKey::Branch,
        aliases: &["branchfullname", "cabang", "branch", "office", "location"],
        required: false,
    },
    FieldSpec {
        key: FieldKey::Remarks,
        aliases: &["ket", "keterangan", "catatan", "cat", "remark"],
        required: false,
    },
    FieldSpec {
        key: FieldKey::ChassisNumber,
        aliases: &[
            "chasisno",
            "nomorrangka",
            "norangka",
            "no.rangka",
            "noka",
            "chassis",
            "frame",
        ],
        required: false,
    },
    FieldSpec {
        key: FieldKey::EngineNumber,
        aliases: &["nomesin", "nomormesin", "no.mesin", "nosin", "engine", "engineno"],
        required: false,
    },
];

static STANDARD: FieldDictionary<'static> = FieldDictionary {
    specs: &STANDARD_FIELDS,
    required: Some(FieldKey::Plate),
};

/// Ordered, immutable set of [`FieldSpec`]s.
#[derive(Debug, Clone, Copy)]
pub struct FieldDictionary<'a> {
    specs: &'a [FieldSpec],
    required: Option<FieldKey>,
}

impl FieldDictionary<'static> {
    /// The dictionary shipped with the tool.
    pub fn standard() -> &'static FieldDictionary<'static> {
        &STANDARD
    }
}

impl<'a> FieldDictionary<'a> {
    /// Builds a custom dictionary, rejecting repeated keys and more than one
    /// required field.
    pub fn new(specs: &'a [FieldSpec]) -> Result<Self> {
        let mut seen = BTreeSet::new();
        let mut required = None;
        for spec in specs {
            if !seen.insert(spec.key) {
                return Err(ExtractError::DuplicateField(spec.key));
            }
            if spec.required {
                if let Some(existing) = required {
                    return Err(ExtractError::InvalidDictionary(format!(
                        "both '{existing}' and '{}' are marked required",
                        spec.key
                    )));
                }
                required = Some(spec.key);
            }
        }
        Ok(Self { specs, required })
    }

    pub fn specs(&self) -> &'a [FieldSpec] {
        self.specs
    }

    /// The field whose presence gates header acceptance and record emission.
    pub fn required_key(&self) -> Option<FieldKey> {
        self.required
    }

    /// Keys whose aliases occur in an already cleaned header cell, in
    /// dictionary order.
    pub fn matching_fields<'s>(&'s self, cleaned: &'s str) -> impl Iterator<Item = FieldKey> + 's {
        self.specs
            .iter()
            .filter(move |spec| spec.matches(cleaned))
            .map(|spec| spec.key)
    }
}

/// Lowercases a header cell and removes every whitespace character.
pub fn clean_header_cell(cell: &str) -> String {
    cell.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
