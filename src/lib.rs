pub mod api;
pub mod desk;
pub mod dialog;
pub mod drafts;
pub mod error;
pub mod forms;
pub mod gui;
pub mod logging;
pub mod notice;
pub mod settings;
pub mod toast_log;

pub use desk::{Desk, DeskOptions, SubmitStatus};
pub use error::{DeskError, DeskResult};
