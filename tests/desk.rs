use chart_desk::api::{CreateKind, CreateRequest, EhrApi, ListKind, OfflineApi, RemoteAck};
use chart_desk::desk::{Desk, DeskOptions, SubmitStatus};
use chart_desk::dialog::{DialogData, DialogKey, DialogKind, Position};
use chart_desk::error::DeskError;
use chart_desk::forms::{AllergyForm, InfoItemForm, ProblemForm};
use chart_desk::notice::NoticeLevel;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct FakeApi {
    creates: AtomicUsize,
    requests: Mutex<Vec<CreateRequest>>,
    fail_with: Option<String>,
    delay: Option<Duration>,
}

impl FakeApi {
    fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }
}

impl EhrApi for FakeApi {
    fn create(&self, request: &CreateRequest) -> Result<RemoteAck, DeskError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match &self.fail_with {
            Some(msg) => Err(DeskError::Remote(msg.clone())),
            None => Ok(RemoteAck::default()),
        }
    }

    fn fetch(&self, list: ListKind, _patient: &str) -> anyhow::Result<Vec<Value>> {
        match list {
            ListKind::Problems => anyhow::bail!("connection refused"),
            ListKind::Allergies => Ok(vec![
                json!({"Allergies": "Penicillin", "Severity": "Severe", "id": 7}),
                json!("not a record"),
            ]),
            ListKind::Vitals => Ok(vec![json!({"Vital": "Pulse", "Value": 72, "Unit": "/min"})]),
            ListKind::LabOrders => Ok(vec![json!({"Test": "CBC", "Status": "ACTIVE"})]),
            _ => Ok(Vec::new()),
        }
    }
}

fn desk_with(api: Arc<FakeApi>) -> Desk {
    let options = DeskOptions {
        patient: "670230065".into(),
        ..DeskOptions::default()
    };
    Desk::new(options, api, None)
}

fn fill_problem(desk: &mut Desk, id: &chart_desk::dialog::DialogId) {
    let form = desk.slot_mut::<ProblemForm>(id).unwrap();
    form.toggle_preferred("Fever (R50.9)", true);
    form.status = "Active".into();
    form.immediacy = "Acute".into();
}

#[test]
fn fourth_dialog_is_rejected_with_one_warning() {
    let mut desk = desk_with(Arc::new(FakeApi::default()));
    let ids: Vec<_> = [DialogKind::Problem, DialogKind::Medication, DialogKind::Allergy]
        .into_iter()
        .map(|k| desk.open(k, k.default_title(), None).unwrap())
        .collect();
    assert!(desk.open(DialogKind::Report, "Order Report", None).is_none());
    assert_eq!(desk.dialog_count(), 3);
    assert_eq!(desk.inputs().len_of(DialogKind::Report), 0);

    let notices = desk.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(notices[0].text, "Maximum 3 dialogs can be open at a time.");

    assert!(desk.close(&ids[1]));
    assert!(desk.open(DialogKind::Report, "Order Report", None).is_some());
}

#[test]
fn drag_and_keyboard_move_the_dialog() {
    let mut desk = desk_with(Arc::new(FakeApi::default()));
    let id = desk.open(DialogKind::Radiology, "Order Radiology", None).unwrap();

    desk.pointer_down(&id, Position::new(100.0, 100.0));
    desk.pointer_move(Position::new(130.0, 145.0));
    assert_eq!(desk.dialog(&id).unwrap().position, Position::new(30.0, 45.0));

    assert!(!desk.handle_key(&id, DialogKey::ArrowRight));
    assert_eq!(desk.dialog(&id).unwrap().position, Position::new(30.0, 45.0));

    desk.pointer_up();
    desk.pointer_move(Position::new(500.0, 500.0));
    assert!(desk.handle_key(&id, DialogKey::ArrowRight));
    assert!(desk.handle_key(&id, DialogKey::ArrowUp));
    assert_eq!(desk.dialog(&id).unwrap().position, Position::new(40.0, 35.0));

    assert!(desk.handle_key(&id, DialogKey::Escape));
    assert!(desk.dialog(&id).is_none());
    assert!(!desk.inputs().contains(&id));
}

#[test]
fn invalid_form_never_reaches_the_api() {
    let api = Arc::new(FakeApi::default());
    let mut desk = desk_with(api.clone());
    let id = desk.open(DialogKind::Problem, "Add New Problem", None).unwrap();

    let err = desk.submit(&id).unwrap_err();
    assert!(matches!(err, DeskError::Validation { field: "problem", .. }));

    desk.slot_mut::<ProblemForm>(&id)
        .unwrap()
        .toggle_preferred("Fever (R50.9)", true);
    let err = desk.submit(&id).unwrap_err();
    assert!(matches!(err, DeskError::Validation { field: "status", .. }));

    assert_eq!(api.creates.load(Ordering::SeqCst), 0);
    assert!(desk.dialog(&id).is_some());
    let notices = desk.take_notices();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| n.level == NoticeLevel::Error));
}

#[test]
fn remote_success_updates_list_and_closes() {
    let api = Arc::new(FakeApi::default());
    let mut desk = desk_with(api.clone());
    let id = desk.open(DialogKind::Problem, "Add New Problem", None).unwrap();
    fill_problem(&mut desk, &id);

    assert_eq!(desk.submit(&id).unwrap(), SubmitStatus::Pending);
    desk.wait_for_events(WAIT);

    assert!(desk.dialog(&id).is_none());
    assert!(!desk.inputs().contains(&id));
    assert_eq!(desk.lists().problems.len(), 1);
    assert_eq!(desk.lists().problems[0].description, "Fever (R50.9)");
    assert!(!desk.lists().problems[0].id.is_empty());
    assert_eq!(desk.badges().problems, 1);

    let requests = api.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].kind, CreateKind::Problem);
    assert_eq!(requests[0].fields["PatientSSN"], json!("670230065"));

    let notices = desk.take_notices();
    assert_eq!(notices.last().unwrap().text, "Problem added successfully!");
}

#[test]
fn remote_failure_keeps_dialog_for_retry() {
    let api = Arc::new(FakeApi::failing("Duplicate allergy"));
    let mut desk = desk_with(api.clone());
    let id = desk.open(DialogKind::Allergy, "Add New Allergy", None).unwrap();
    {
        let form = desk.slot_mut::<AllergyForm>(&id).unwrap();
        form.allergen = "Penicillin".into();
        form.severity = "Severe".into();
        form.status = "Active".into();
    }
    let before = desk.slot::<AllergyForm>(&id).cloned();

    assert_eq!(desk.submit(&id).unwrap(), SubmitStatus::Pending);
    desk.wait_for_events(WAIT);

    assert!(desk.dialog(&id).is_some());
    assert_eq!(desk.slot::<AllergyForm>(&id).cloned(), before);
    assert!(desk.lists().allergies.is_empty());
    assert!(!desk.is_in_flight(&id));
    let notices = desk.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].text, "Duplicate allergy");
}

#[test]
fn repeated_submit_issues_one_call() {
    let api = Arc::new(FakeApi::slow(Duration::from_millis(50)));
    let mut desk = desk_with(api.clone());
    let id = desk.open(DialogKind::Problem, "Add New Problem", None).unwrap();
    fill_problem(&mut desk, &id);

    assert_eq!(desk.submit(&id).unwrap(), SubmitStatus::Pending);
    assert!(desk.is_in_flight(&id));
    assert_eq!(desk.submit(&id).unwrap(), SubmitStatus::Ignored);
    desk.wait_for_events(WAIT);

    assert_eq!(api.creates.load(Ordering::SeqCst), 1);
    assert_eq!(desk.lists().problems.len(), 1);
}

#[test]
fn closing_mid_flight_discards_the_result() {
    let api = Arc::new(FakeApi::slow(Duration::from_millis(50)));
    let mut desk = desk_with(api.clone());
    let id = desk.open(DialogKind::Problem, "Add New Problem", None).unwrap();
    fill_problem(&mut desk, &id);

    assert_eq!(desk.submit(&id).unwrap(), SubmitStatus::Pending);
    assert!(desk.close(&id));
    assert!(!desk.is_busy());

    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(desk.poll_events(), 1);
    assert_eq!(api.creates.load(Ordering::SeqCst), 1);
    assert!(desk.lists().problems.is_empty());
    assert!(desk.take_notices().is_empty());
}

#[test]
fn info_item_is_applied_locally() {
    let api = Arc::new(FakeApi::default());
    let mut desk = desk_with(api.clone());
    let id = desk
        .open(
            DialogKind::InfoItem,
            "Add Diagnosis Item",
            Some(DialogData::titled("Diagnosis")),
        )
        .unwrap();
    assert_eq!(desk.slot::<InfoItemForm>(&id).unwrap().title, "Diagnosis");
    desk.slot_mut::<InfoItemForm>(&id).unwrap().item = "Hypertension".into();

    assert_eq!(desk.submit(&id).unwrap(), SubmitStatus::Completed);
    assert_eq!(api.creates.load(Ordering::SeqCst), 0);
    assert!(desk.dialog(&id).is_none());
    assert_eq!(desk.lists().info_cards["Diagnosis"], vec!["Hypertension".to_string()]);
}

#[test]
fn reset_restores_seed_values() {
    let mut desk = desk_with(Arc::new(FakeApi::default()));
    let id = desk.open(DialogKind::Problem, "Add New Problem", None).unwrap();
    fill_problem(&mut desk, &id);
    desk.reset(&id);
    assert_eq!(desk.slot::<ProblemForm>(&id), Some(&ProblemForm::default()));
}

#[test]
fn failed_list_reads_leave_empty_lists() {
    let mut desk = desk_with(Arc::new(FakeApi::default()));
    desk.load_lists();
    assert!(desk.is_busy());
    assert_eq!(desk.wait_for_events(WAIT), ListKind::ALL.len());
    assert!(!desk.is_busy());

    let lists = desk.lists();
    assert!(lists.problems.is_empty());
    assert_eq!(lists.allergies.len(), 1);
    assert_eq!(lists.allergies[0].allergen, "Penicillin");
    assert_eq!(lists.allergies[0].id, "7");
    assert_eq!(lists.vitals[0].name, "Pulse");
    assert_eq!(lists.vitals[0].value, "72");
    assert_eq!(lists.lab_orders[0].name, "CBC");
    assert!(lists.radiology_orders.is_empty());
    let badges = desk.badges();
    assert_eq!(badges.vitals, 1);
    assert_eq!(badges.orders, 1);
}

#[test]
fn failed_refresh_keeps_entries_already_listed() {
    let mut desk = desk_with(Arc::new(FakeApi::default()));
    let id = desk.open(DialogKind::Problem, "Add New Problem", None).unwrap();
    fill_problem(&mut desk, &id);
    desk.submit(&id).unwrap();
    desk.wait_for_events(WAIT);
    assert_eq!(desk.lists().problems.len(), 1);

    desk.load_lists();
    desk.wait_for_events(WAIT);
    assert_eq!(desk.lists().problems.len(), 1);
    assert_eq!(desk.lists().problems[0].description, "Fever (R50.9)");
}

#[test]
fn offline_refresh_keeps_local_entries() {
    let options = DeskOptions {
        patient: "670230065".into(),
        ..DeskOptions::default()
    };
    let mut desk = Desk::new(options, Arc::new(OfflineApi), None);
    let id = desk.open(DialogKind::Allergy, "Add New Allergy", None).unwrap();
    {
        let form = desk.slot_mut::<AllergyForm>(&id).unwrap();
        form.allergen = "Latex".into();
        form.severity = "Mild".into();
        form.status = "Active".into();
    }
    assert_eq!(desk.submit(&id).unwrap(), SubmitStatus::Pending);
    desk.wait_for_events(WAIT);
    assert_eq!(desk.lists().allergies.len(), 1);

    desk.load_lists();
    assert!(!desk.is_busy());
    desk.wait_for_events(WAIT);
    assert_eq!(desk.lists().allergies.len(), 1);
    assert_eq!(desk.lists().allergies[0].allergen, "Latex");
}

#[test]
fn no_patient_skips_list_loading() {
    let mut desk = Desk::new(DeskOptions::default(), Arc::new(FakeApi::default()), None);
    desk.load_lists();
    assert!(!desk.is_busy());
}
