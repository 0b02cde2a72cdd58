use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column order of the tabular store and key order of the webhook body.
pub const HEADER: [&str; 7] = ["Timestamp", "Name", "City", "Intent", "Type", "Budget", "Phone"];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    City,
    Intent,
    Type,
    Budget,
    Phone,
}

// ---------------------------------------------------------------------------
// LeadRecord
// ---------------------------------------------------------------------------

/// A finalized inquiry. All values are free-form and unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LeadRecord {
    pub timestamp: String,
    pub name: String,
    pub city: String,
    pub intent: String,
    #[serde(rename = "Type")]
    pub property_type: String,
    pub budget: String,
    pub phone: String,
}

impl LeadRecord {
    /// Build the record from collected answers, stamped with `now`.
    /// Fields that were never answered become empty strings.
    pub fn from_answers<Tz>(answers: &BTreeMap<Field, String>, now: DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let get = |field: Field| answers.get(&field).cloned().unwrap_or_default();
        Self {
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            name: get(Field::Name),
            city: get(Field::City),
            intent: get(Field::Intent),
            property_type: get(Field::Type),
            budget: get(Field::Budget),
            phone: get(Field::Phone),
        }
    }

    /// Values in [`HEADER`] order.
    pub fn row(&self) -> [&str; 7] {
        [
            &self.timestamp,
            &self.name,
            &self.city,
            &self.intent,
            &self.property_type,
            &self.budget,
            &self.phone,
        ]
    }
}
