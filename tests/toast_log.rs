use chart_desk::gui::ToastLogDialog;
use chart_desk::notice::Notice;
use chart_desk::toast_log::{append_toast_log, read_last_lines, TOAST_LOG_FILE};
use tempfile::tempdir;

#[test]
fn toast_log_dialog_open_missing_file_does_not_panic() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(TOAST_LOG_FILE);
    let mut dialog = ToastLogDialog::default();
    assert!(std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| dialog.open(&path))).is_ok());
    assert!(dialog.open);
}

#[test]
fn notices_are_logged_with_level() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(TOAST_LOG_FILE);
    append_toast_log(&path, &Notice::warning("Maximum 3 dialogs can be open at a time."));
    append_toast_log(&path, &Notice::success("Problem added successfully!"));

    let lines = read_last_lines(&path, 20);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("[warning] Maximum 3 dialogs can be open at a time."));
    assert!(lines[1].ends_with("[success] Problem added successfully!"));
}
