use chart_desk::api::OfflineApi;
use chart_desk::desk::{Desk, DeskOptions, SubmitStatus};
use chart_desk::dialog::{DialogData, DialogId, DialogKind};
use chart_desk::drafts::DraftStore;
use chart_desk::forms::{InfoItemForm, MedicationForm, ProblemForm};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn desk(store: &DraftStore) -> Desk {
    Desk::new(DeskOptions::default(), Arc::new(OfflineApi), Some(store.clone()))
}

#[test]
fn drafts_survive_a_restart() {
    let dir = tempdir().unwrap();
    let store = DraftStore::new(dir.path());

    let mut first = desk(&store);
    let id = first.open(DialogKind::Problem, "Add New Problem", None).unwrap();
    {
        let form = first.slot_mut::<ProblemForm>(&id).unwrap();
        form.input = "Fever".into();
        form.preferred = vec!["Fever".into()];
    }
    let med = first.open(DialogKind::Medication, "Order Medications", None).unwrap();
    first.slot_mut::<MedicationForm>(&med).unwrap().stage("Aspirin");
    assert!(first.flush_drafts());

    let mut second = desk(&store);
    assert_eq!(second.restore_drafts(), 2);
    assert_eq!(second.dialog_count(), 2);
    let restored = second.slot::<ProblemForm>(&id).unwrap();
    assert_eq!(restored.input, "Fever");
    assert_eq!(restored.preferred, vec!["Fever".to_string()]);
    let rows = &second.slot::<MedicationForm>(&med).unwrap().rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].route, "Oral");
    assert_eq!(rows[0].priority, "Routine");

    let next = second.open(DialogKind::Report, "Order Report", None).unwrap();
    assert!(next > id && next > med);
}

#[test]
fn empty_mappings_are_not_written() {
    let dir = tempdir().unwrap();
    let store = DraftStore::new(dir.path());
    let mut desk = desk(&store);
    desk.open(DialogKind::Radiology, "Order Radiology", None).unwrap();
    assert!(desk.flush_drafts());

    assert!(store.read(DialogKind::Radiology.draft_name()).is_some());
    assert!(store.read(DialogKind::Problem.draft_name()).is_none());
}

#[test]
fn partial_blob_fills_missing_fields_with_defaults() {
    let dir = tempdir().unwrap();
    let store = DraftStore::new(dir.path());
    store
        .write(DialogKind::Problem.draft_name(), r#"{"1700000000000": {"input": "Fever"}}"#)
        .unwrap();

    let mut desk = desk(&store);
    assert_eq!(desk.restore_drafts(), 1);
    let id = DialogId::from("1700000000000");
    let form = desk.slot::<ProblemForm>(&id).unwrap();
    assert_eq!(form.input, "Fever");
    assert!(form.status.is_empty());
    assert!(form.preferred.is_empty());
    assert_eq!(desk.dialog(&id).unwrap().kind, DialogKind::Problem);
    assert_eq!(desk.take_notices().len(), 1);
}

#[test]
fn restore_drops_drafts_beyond_capacity() {
    let dir = tempdir().unwrap();
    let store = DraftStore::new(dir.path());
    store
        .write(
            DialogKind::InfoItem.draft_name(),
            r#"{"1": {"title": "Diagnosis", "item": "a"},
                "2": {"title": "Diagnosis", "item": "b"},
                "3": {"title": "Vitals", "item": "c"},
                "4": {"title": "Vitals", "item": "d"}}"#,
        )
        .unwrap();

    let mut desk = desk(&store);
    desk.restore_drafts();
    assert_eq!(desk.dialog_count(), 3);
    assert_eq!(desk.inputs().len_of(DialogKind::InfoItem), 3);
    for dialog in desk.dialogs() {
        let form = desk.slot::<InfoItemForm>(&dialog.id).unwrap();
        assert_eq!(
            dialog.data.as_ref().and_then(|d| d.title.as_deref()),
            Some(form.title.as_str())
        );
    }
}

#[test]
fn corrupt_blob_is_skipped() {
    let dir = tempdir().unwrap();
    let store = DraftStore::new(dir.path());
    store.write(DialogKind::Allergy.draft_name(), "{not json").unwrap();
    store
        .write(
            DialogKind::InfoItem.draft_name(),
            r#"{"5": {"title": "Vitals", "item": "BP 120/80"}}"#,
        )
        .unwrap();

    let mut desk = desk(&store);
    assert_eq!(desk.restore_drafts(), 1);
    assert_eq!(desk.inputs().len_of(DialogKind::Allergy), 0);
    let id = DialogId::from("5");
    assert_eq!(
        desk.dialog(&id).unwrap().data,
        Some(DialogData::titled("Vitals"))
    );
}

#[test]
fn tick_flushes_once_per_interval() {
    let dir = tempdir().unwrap();
    let store = DraftStore::new(dir.path());
    let mut desk = desk(&store);
    desk.open(DialogKind::Allergy, "Add New Allergy", None).unwrap();

    let now = Instant::now();
    assert!(!desk.tick(now));
    assert!(store.read(DialogKind::Allergy.draft_name()).is_none());
    assert!(desk.tick(now + Duration::from_secs(31)));
    assert!(store.read(DialogKind::Allergy.draft_name()).is_some());
    assert!(!desk.tick(now + Duration::from_secs(32)));
}

#[test]
fn desk_without_store_does_nothing() {
    let mut desk = Desk::default();
    desk.open(DialogKind::Problem, "Add New Problem", None).unwrap();
    assert!(!desk.flush_drafts());
    assert_eq!(desk.restore_drafts(), 0);
}

#[test]
fn unreadable_slot_does_not_take_its_neighbours_down() {
    let dir = tempdir().unwrap();
    let store = DraftStore::new(dir.path());
    store
        .write(
            DialogKind::Problem.draft_name(),
            r#"{"1700000000001": {"input": "Fever", "preferred": ["Fever"]},
                "1700000000002": {"input": "Cough", "other": "yes"}}"#,
        )
        .unwrap();

    let mut desk = desk(&store);
    assert_eq!(desk.restore_drafts(), 1);
    let kept = DialogId::from("1700000000001");
    assert_eq!(desk.slot::<ProblemForm>(&kept).unwrap().input, "Fever");
    assert!(desk.dialog(&kept).is_some());
    assert!(!desk.inputs().contains(&DialogId::from("1700000000002")));
    assert_eq!(desk.dialog_count(), 1);
}

#[test]
fn submitted_dialog_does_not_return_after_restart() {
    let dir = tempdir().unwrap();
    let store = DraftStore::new(dir.path());

    let mut first = desk(&store);
    let id = first
        .open(
            DialogKind::InfoItem,
            "Add Diagnosis Item",
            Some(DialogData::titled("Diagnosis")),
        )
        .unwrap();
    first.slot_mut::<InfoItemForm>(&id).unwrap().item = "Hypertension".into();
    assert!(first.flush_drafts());
    assert!(store.read(DialogKind::InfoItem.draft_name()).is_some());

    assert_eq!(first.submit(&id).unwrap(), SubmitStatus::Completed);
    assert!(first.flush_drafts());
    assert!(store.read(DialogKind::InfoItem.draft_name()).is_none());

    let mut second = desk(&store);
    assert_eq!(second.restore_drafts(), 0);
    assert_eq!(second.dialog_count(), 0);
}

#[test]
fn cancelled_dialog_leaves_its_sibling_draft() {
    let dir = tempdir().unwrap();
    let store = DraftStore::new(dir.path());

    let mut first = desk(&store);
    let gone = first.open(DialogKind::Problem, "Add New Problem", None).unwrap();
    let kept = first.open(DialogKind::Problem, "Add New Problem", None).unwrap();
    first.slot_mut::<ProblemForm>(&kept).unwrap().input = "Cough".into();
    assert!(first.flush_drafts());
    assert!(first.close(&gone));

    let mut second = desk(&store);
    assert_eq!(second.restore_drafts(), 1);
    assert_eq!(second.dialog_count(), 1);
    assert!(second.dialog(&gone).is_none());
    assert_eq!(second.slot::<ProblemForm>(&kept).unwrap().input, "Cough");
}

#[test]
fn info_item_draft_without_card_is_dropped() {
    let dir = tempdir().unwrap();
    let store = DraftStore::new(dir.path());
    store
        .write(
            DialogKind::InfoItem.draft_name(),
            r#"{"1": {"title": "  ", "item": "orphan"},
                "2": {"title": "Vitals", "item": "BP 120/80"}}"#,
        )
        .unwrap();

    let mut desk = desk(&store);
    desk.restore_drafts();
    assert_eq!(desk.dialog_count(), 1);
    assert!(!desk.inputs().contains(&DialogId::from("1")));
    assert_eq!(
        desk.dialog(&DialogId::from("2")).unwrap().title,
        "Add Vitals Item"
    );

    let blob = store.read(DialogKind::InfoItem.draft_name()).unwrap();
    let stored: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&blob).unwrap();
    assert_eq!(stored.keys().collect::<Vec<_>>(), vec!["2"]);
}
