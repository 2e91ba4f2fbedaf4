use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Lists read from the EHR when the dashboard starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Problems,
    Allergies,
    Notes,
    Medications,
    Vitals,
    RadiologyOrders,
    LabOrders,
}

impl ListKind {
    pub const ALL: [ListKind; 7] = [
        ListKind::Problems,
        ListKind::Allergies,
        ListKind::Notes,
        ListKind::Medications,
        ListKind::Vitals,
        ListKind::RadiologyOrders,
        ListKind::LabOrders,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Problems => "problems",
            Self::Allergies => "allergies",
            Self::Notes => "clinical notes",
            Self::Medications => "medications",
            Self::Vitals => "vitals",
            Self::RadiologyOrders => "radiology orders",
            Self::LabOrders => "lab orders",
        }
    }
}

/// Entities the EHR can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateKind {
    Problem,
    Allergy,
    Medication,
    RadiologyOrder,
    ReportOrder,
}

impl CreateKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Problem => "problem",
            Self::Allergy => "allergy",
            Self::Medication => "medication",
            Self::RadiologyOrder => "radiology order",
            Self::ReportOrder => "report order",
        }
    }
}

/// A flat field set posted to a create endpoint. Credentials and patient
/// identifiers are added by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    pub kind: CreateKind,
    pub fields: Map<String, Value>,
}

impl CreateRequest {
    pub fn new(kind: CreateKind) -> Self {
        Self {
            kind,
            fields: Map::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteAck {
    pub message: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "problem", alias = "Problem")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "dateOfOnset", alias = "Date of Onset")]
    pub date_onset: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Status")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Immediacy")]
    pub immediacy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicationEntry {
    #[serde(default, deserialize_with = "lenient_string", alias = "Order IEN")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Medication", alias = "Drug")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Reason")]
    pub reason: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Dose", alias = "dosage")]
    pub amount: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Schedule", alias = "schedule")]
    pub timing: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Status")]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllergyEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Allergies", alias = "Allergen")]
    pub allergen: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Reaction", alias = "Sign/Symptoms")]
    pub reaction: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Severity")]
    pub severity: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "dateOnset")]
    pub date_onset: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub treatment: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Status")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "createdBy")]
    pub created_by: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalNote {
    #[serde(default, deserialize_with = "lenient_string", alias = "Note IEN", alias = "noteIen")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Notes Title", alias = "Title")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Author")]
    pub author: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Date of Entry", alias = "Date")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Status")]
    pub status: String,
}

/// One vital sign reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSign {
    #[serde(default, deserialize_with = "lenient_string", alias = "Vital IEN")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Vital", alias = "type", alias = "Name")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Value", alias = "Reading")]
    pub value: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Unit", alias = "Units")]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Date", alias = "Date Taken", alias = "dateTime")]
    pub date: String,
}

/// A radiology or lab order already on the patient's record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(default, deserialize_with = "lenient_string", alias = "Order IEN", alias = "orderIen")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        alias = "Order",
        alias = "Test",
        alias = "Exam",
        alias = "testName",
        alias = "examName"
    )]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Status")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Start Date", alias = "startDate", alias = "Date")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string", alias = "Provider")]
    pub provider: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCategory {
    Radiology,
    Report,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub category: OrderCategory,
    pub description: String,
    #[serde(default)]
    pub notes: String,
    pub ordered_at: DateTime<Utc>,
}

/// Parse loosely shaped records, skipping the ones that do not fit.
pub fn parse_entries<T>(records: Vec<Value>) -> Vec<T>
where
    T: for<'de> Deserialize<'de>,
{
    records
        .into_iter()
        .filter_map(|v| match serde_json::from_value(v) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("skipping malformed record: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn problem_entry_accepts_source_field_names() {
        let entries: Vec<ProblemEntry> = parse_entries(vec![json!({
            "problem": "Hypertension (I10)",
            "dateOfOnset": "2024-01-15",
            "status": "A",
            "immediacy": "Chronic",
            "id": 12345
        })]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "12345");
        assert_eq!(entries[0].description, "Hypertension (I10)");
        assert_eq!(entries[0].date_onset, "2024-01-15");
    }

    #[test]
    fn vitals_and_orders_accept_source_field_names() {
        let vitals: Vec<VitalSign> = parse_entries(vec![json!({
            "Vital": "Pulse",
            "Value": 72,
            "Unit": "/min",
            "Date": "2024-03-01 08:00"
        })]);
        assert_eq!(vitals[0].name, "Pulse");
        assert_eq!(vitals[0].value, "72");

        let orders: Vec<OrderRecord> = parse_entries(vec![json!({
            "Order IEN": 991,
            "Test": "CBC",
            "Status": "ACTIVE",
            "Start Date": "2024-03-02"
        })]);
        assert_eq!(orders[0].id, "991");
        assert_eq!(orders[0].name, "CBC");
        assert_eq!(orders[0].date, "2024-03-02");
    }

    #[test]
    fn non_object_records_are_skipped() {
        let entries: Vec<ClinicalNote> = parse_entries(vec![json!("junk"), json!({"Title": "Progress"})]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Progress");
    }
}
