use super::models::{CreateKind, CreateRequest, ListKind, RemoteAck};
use super::EhrApi;
use crate::error::DeskError;
use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

/// Endpoint paths relative to the API base url.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub problem_save: String,
    pub allergy_save: String,
    pub medication_save: String,
    pub radiology_save: String,
    pub report_save: String,
    pub problem_list: String,
    pub allergy_list: String,
    pub note_list: String,
    pub medication_list: String,
    pub vital_list: String,
    pub radiology_order_list: String,
    pub lab_order_list: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            problem_save: "apiProbSave.sh".into(),
            allergy_save: "apiAllergySave.sh".into(),
            medication_save: "apiOrdMedSave.sh".into(),
            radiology_save: "apiOrdRadSave.sh".into(),
            report_save: "apiOrdLabSave.sh".into(),
            problem_list: "apiProbList.sh".into(),
            allergy_list: "apiAllergyList.sh".into(),
            note_list: "apiCLNoteList.sh".into(),
            medication_list: "apiOrdMedList.sh".into(),
            vital_list: "apiVitalView.sh".into(),
            radiology_order_list: "apiOrdRadListNew.sh".into(),
            lab_order_list: "apiOrdLabList.sh".into(),
        }
    }
}

impl Endpoints {
    fn create(&self, kind: CreateKind) -> &str {
        match kind {
            CreateKind::Problem => &self.problem_save,
            CreateKind::Allergy => &self.allergy_save,
            CreateKind::Medication => &self.medication_save,
            CreateKind::RadiologyOrder => &self.radiology_save,
            CreateKind::ReportOrder => &self.report_save,
        }
    }

    fn list(&self, kind: ListKind) -> &str {
        match kind {
            ListKind::Problems => &self.problem_list,
            ListKind::Allergies => &self.allergy_list,
            ListKind::Notes => &self.note_list,
            ListKind::Medications => &self.medication_list,
            ListKind::Vitals => &self.vital_list,
            ListKind::RadiologyOrders => &self.radiology_order_list,
            ListKind::LabOrders => &self.lab_order_list,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub user_name: String,
    pub password: String,
    pub duz: String,
    pub location: u32,
    pub timeout: Duration,
    pub endpoints: Endpoints,
}

impl ApiConfig {
    /// Parse `base_url`, making sure it ends with a slash so endpoint paths
    /// join under it.
    pub fn parse_base(base_url: &str) -> Result<Url> {
        let mut base = base_url.trim().to_string();
        if base.is_empty() {
            bail!("empty api base url");
        }
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base).with_context(|| format!("invalid api base url {base_url}"))
    }
}

/// Blocking JSON-over-HTTP client for the EHR endpoints.
pub struct HttpEhrClient {
    client: Client,
    config: ApiConfig,
}

/// Best message a response body offers for a failure.
fn server_message(body: &Value) -> Option<String> {
    for key in ["message", "error", "errors"] {
        match body.get(key).filter(|v| is_truthy(v)) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.clone()),
            Some(Value::Array(items)) => {
                if let Some(first) = items.first() {
                    return Some(match first {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                }
            }
            None => {}
            Some(other) => return Some(other.to_string()),
        }
    }
    None
}

/// Whether a JSON value counts as set: `null`, `false`, `0` and `""` do not.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn is_error_body(body: &Value) -> bool {
    ["errors", "error"]
        .into_iter()
        .any(|key| body.get(key).map_or(false, is_truthy))
}

impl HttpEhrClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("chart-desk")
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self, endpoint: &str) -> Result<Url, DeskError> {
        self.config
            .base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| DeskError::Remote(format!("invalid endpoint {endpoint}: {e}")))
    }

    fn base_body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("UserName".into(), self.config.user_name.clone().into());
        body.insert("Password".into(), self.config.password.clone().into());
        body.insert("DUZ".into(), self.config.duz.clone().into());
        body.insert("ihtLocation".into(), self.config.location.into());
        body
    }

    fn post(&self, endpoint: &str, body: Map<String, Value>) -> Result<Value, DeskError> {
        let url = self.url(endpoint)?;
        tracing::debug!(%url, "POST");
        let resp = self
            .client
            .post(url.clone())
            .json(&body)
            .send()
            .map_err(|e| DeskError::Remote(format!("Request to {endpoint} failed: {e}")))?;
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        let json = serde_json::from_str::<Value>(&text).ok();
        if !status.is_success() {
            let message = json
                .as_ref()
                .and_then(server_message)
                .unwrap_or_else(|| format!("HTTP error! Status: {status}"));
            tracing::warn!(%url, %status, "request failed: {message}");
            return Err(DeskError::Remote(message));
        }
        match json {
            Some(body) if is_error_body(&body) => {
                let message = server_message(&body).unwrap_or_else(|| "Request failed".into());
                tracing::warn!(%url, "server reported error: {message}");
                Err(DeskError::Remote(message))
            }
            Some(body) => Ok(body),
            None => Ok(Value::Null),
        }
    }
}

impl EhrApi for HttpEhrClient {
    fn create(&self, request: &CreateRequest) -> Result<RemoteAck, DeskError> {
        let mut body = self.base_body();
        body.extend(request.fields.clone());
        let reply = self.post(self.config.endpoints.create(request.kind), body)?;
        Ok(RemoteAck {
            message: reply.get("message").and_then(Value::as_str).map(str::to_string),
        })
    }

    fn fetch(&self, list: ListKind, patient: &str) -> Result<Vec<Value>> {
        let mut body = self.base_body();
        body.insert("PatientSSN".into(), patient.into());
        body.insert("FromDate".into(), "".into());
        body.insert("ToDate".into(), "".into());
        let reply = self
            .post(self.config.endpoints.list(list), body)
            .with_context(|| format!("fetch {}", list.label()))?;
        Ok(match reply {
            Value::Array(items) => items,
            Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
            _ => Vec::new(),
        })
    }
}
