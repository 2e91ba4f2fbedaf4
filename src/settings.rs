use crate::api::{ApiConfig, Endpoints};
use crate::dialog::{drag::KEY_STEP, MAX_DIALOGS};
use crate::drafts::default_draft_dir;
use crate::forms::FormContext;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Base url of the EHR api. When `None` the desk runs offline and keeps
    /// new entries locally.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: Option<String>,
    #[serde(default = "default_api_user")]
    pub api_user: String,
    #[serde(default)]
    pub api_password: String,
    #[serde(default = "default_duz")]
    pub duz: String,
    /// Hospital location sent with every request.
    #[serde(default = "default_location")]
    pub location: u32,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: f32,
    #[serde(default)]
    pub endpoints: Endpoints,
    /// SSN of the patient shown on the dashboard.
    #[serde(default)]
    pub patient_ssn: String,
    /// Recorded as the author of entries created from this desk.
    #[serde(default = "default_provider_name")]
    pub provider_name: String,
    /// Maximum number of floating dialogs open at once.
    #[serde(default = "default_max_dialogs")]
    pub max_dialogs: usize,
    /// Seconds between draft flushes.
    #[serde(default = "default_draft_interval")]
    pub draft_interval_secs: u64,
    /// Directory holding draft blobs. Defaults to the user data directory.
    #[serde(default)]
    pub draft_dir: Option<PathBuf>,
    /// Pixels an arrow key moves the focused dialog.
    #[serde(default = "default_keyboard_step")]
    pub keyboard_step: f32,
    /// Require status and immediacy before a problem can be created.
    #[serde(default = "default_true")]
    pub require_problem_status: bool,
    /// Enable toast notifications in the UI.
    #[serde(default = "default_true")]
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
    /// When enabled the application initialises the logger at debug level.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving a copy of the log output.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_api_base_url() -> Option<String> {
    None
}

fn default_api_user() -> String {
    "CPRS-UAT".into()
}

fn default_duz() -> String {
    "115".into()
}

fn default_location() -> u32 {
    102
}

fn default_request_timeout() -> f32 {
    10.0
}

fn default_provider_name() -> String {
    "Dr. User".into()
}

fn default_max_dialogs() -> usize {
    MAX_DIALOGS
}

fn default_draft_interval() -> u64 {
    30
}

fn default_keyboard_step() -> f32 {
    KEY_STEP
}

fn default_true() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    3.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_user: default_api_user(),
            api_password: String::new(),
            duz: default_duz(),
            location: default_location(),
            request_timeout: default_request_timeout(),
            endpoints: Endpoints::default(),
            patient_ssn: String::new(),
            provider_name: default_provider_name(),
            max_dialogs: default_max_dialogs(),
            draft_interval_secs: default_draft_interval(),
            draft_dir: None,
            keyboard_step: default_keyboard_step(),
            require_problem_status: true,
            enable_toasts: true,
            toast_duration: default_toast_duration(),
            debug_logging: false,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn draft_dir(&self) -> PathBuf {
        self.draft_dir.clone().unwrap_or_else(default_draft_dir)
    }

    pub fn draft_interval(&self) -> Duration {
        Duration::from_secs(self.draft_interval_secs.max(1))
    }

    pub fn form_context(&self) -> FormContext {
        FormContext {
            require_problem_status: self.require_problem_status,
            provider_name: self.provider_name.clone(),
        }
    }

    /// Api settings, or `None` when no base url is configured.
    pub fn api_config(&self) -> anyhow::Result<Option<ApiConfig>> {
        let Some(base) = self.api_base_url.as_deref() else {
            return Ok(None);
        };
        if base.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(ApiConfig {
            base_url: ApiConfig::parse_base(base)?,
            user_name: self.api_user.clone(),
            password: self.api_password.clone(),
            duz: self.duz.clone(),
            location: self.location,
            timeout: Duration::from_secs_f32(self.request_timeout.max(1.0)),
            endpoints: self.endpoints.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"patient_ssn": "670230065"}"#).unwrap();
        assert_eq!(settings.patient_ssn, "670230065");
        assert_eq!(settings.max_dialogs, 3);
        assert_eq!(settings.draft_interval_secs, 30);
        assert_eq!(settings.keyboard_step, 10.0);
        assert!(settings.require_problem_status);
        assert_eq!(settings.endpoints.problem_save, "apiProbSave.sh");
    }

    #[test]
    fn blank_base_url_means_offline() {
        let mut settings = Settings::default();
        assert!(settings.api_config().unwrap().is_none());
        settings.api_base_url = Some(" ".into());
        assert!(settings.api_config().unwrap().is_none());
        settings.api_base_url = Some("http://localhost:4003/api".into());
        let cfg = settings.api_config().unwrap().unwrap();
        assert_eq!(cfg.base_url.as_str(), "http://localhost:4003/api/");
        assert_eq!(cfg.location, 102);
    }
}
