use super::{DialogForm, FormContext, InputState, ListUpdate, SlotMap, Submission};
use crate::api::models::{CreateKind, CreateRequest, OrderCategory, OrderEntry};
use crate::dialog::DialogKind;
use crate::error::{DeskError, DeskResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const REPORT_TESTS: &[&str] = &["LIVER FUNCTION TEST", "DSDNA AB", "THYROID PANEL"];
pub const QUICK_ORDERS: &[&str] = &["BLOOD SUGAR", "CBC", "ESR"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportForm {
    pub search: String,
    pub quick_search: String,
    pub selected: Vec<String>,
}

fn filter_list(list: &'static [&'static str], filter: &str) -> Vec<&'static str> {
    let filter = filter.trim().to_lowercase();
    list.iter()
        .copied()
        .filter(|item| item.to_lowercase().contains(&filter))
        .collect()
}

impl ReportForm {
    pub fn report_matches(&self) -> Vec<&'static str> {
        filter_list(REPORT_TESTS, &self.search)
    }

    pub fn quick_matches(&self) -> Vec<&'static str> {
        filter_list(QUICK_ORDERS, &self.quick_search)
    }

    pub fn toggle(&mut self, test: &str, checked: bool) {
        let present = self.selected.iter().any(|s| s == test);
        if checked && !present {
            self.selected.push(test.to_string());
        } else if !checked {
            self.selected.retain(|s| s != test);
        }
    }

    /// Tests to order: the ticked ones, or the typed search when none are.
    fn ordered(&self) -> Vec<String> {
        if self.selected.is_empty() {
            let search = self.search.trim();
            if search.is_empty() {
                Vec::new()
            } else {
                vec![search.to_string()]
            }
        } else {
            self.selected.clone()
        }
    }
}

impl DialogForm for ReportForm {
    const KIND: DialogKind = DialogKind::Report;

    fn validate(&self, _ctx: &FormContext) -> DeskResult<()> {
        if self.ordered().is_empty() {
            return Err(DeskError::validation(
                "search",
                "Search for a report or select a quick order.",
            ));
        }
        Ok(())
    }

    fn submission(&self, _ctx: &FormContext) -> Submission {
        let tests = self.ordered();
        let description = tests.join(", ");
        Submission {
            remote: Some(CreateRequest::new(CreateKind::ReportOrder).field("Tests", tests)),
            update: ListUpdate::Order(OrderEntry {
                category: OrderCategory::Report,
                description,
                notes: String::new(),
                ordered_at: Utc::now(),
            }),
            success: "Report order confirmed".into(),
        }
    }

    fn slots(state: &InputState) -> &SlotMap<Self> {
        &state.reports
    }

    fn slots_mut(state: &mut InputState) -> &mut SlotMap<Self> {
        &mut state.reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_are_case_insensitive() {
        let form = ReportForm {
            search: "thyroid".into(),
            quick_search: "c".into(),
            ..Default::default()
        };
        assert_eq!(form.report_matches(), vec!["THYROID PANEL"]);
        assert_eq!(form.quick_matches(), vec!["CBC"]);
    }

    #[test]
    fn needs_search_text_or_a_selection() {
        let mut form = ReportForm::default();
        assert!(form.validate(&FormContext::default()).is_err());
        form.toggle("CBC", true);
        assert!(form.validate(&FormContext::default()).is_ok());
        form.toggle("CBC", false);
        form.search = "Lipid profile".into();
        assert!(form.validate(&FormContext::default()).is_ok());
    }
}
