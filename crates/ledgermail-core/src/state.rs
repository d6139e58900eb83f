//! Compose form state

use crate::message::MessageDraft;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Resolution status of the recipient field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipientStatus {
    /// Field is empty
    #[default]
    Clear,
    /// Input changed, resolution pending
    Loading,
    /// Resolved to a well-formed address
    Valid,
    /// Resolution failed or produced a malformed address
    Invalid,
}

impl RecipientStatus {
    /// Icon classes for the status indicator
    pub fn icon(self) -> &'static str {
        match self {
            RecipientStatus::Clear => "",
            RecipientStatus::Loading => "fa fa-spinner fa-pulse",
            RecipientStatus::Valid => "fa fa-check-circle text-success",
            RecipientStatus::Invalid => "fa fa-times-circle text-danger",
        }
    }
}

/// An error shown to the user in a modal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDisplay {
    pub title: String,
    pub message: String,
}

/// Everything the compose view renders
#[derive(Debug, Clone, Default)]
pub struct ComposeState {
    pub draft: MessageDraft,
    /// Sender addresses offered in the from dropdown
    pub from_addresses: Vec<String>,
    /// Disables the send control while a submission is running
    pub send_disabled: bool,
    /// Last value typed into the recipient field
    pub current_recipient_value: String,
    /// Text shown in the recipient field
    pub message_to_field: String,
    pub recipient_status: RecipientStatus,
    pub recipient_text: String,
    /// The single error currently displayed
    pub error: Option<ErrorDisplay>,
    /// Bumped on every recipient keystroke; stale resolutions carry an older value
    pub(crate) input_generation: u64,
}

impl ComposeState {
    /// Reset the draft fields to empty
    pub fn init_mail(&mut self) {
        self.draft.clear();
    }

    /// Clear only the draft recipient
    pub fn reset_to_field(&mut self) {
        self.draft.to.clear();
    }

    pub fn set_recipient_status(&mut self, status: RecipientStatus, text: impl Into<String>) {
        self.recipient_status = status;
        self.recipient_text = text.into();
    }

    /// Show an error unless one is already displayed.
    ///
    /// Returns the error when it was shown, `None` when it was dropped.
    pub fn show_error(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Option<ErrorDisplay> {
        if self.error.is_some() {
            return None;
        }
        let error = ErrorDisplay {
            title: title.into(),
            message: message.into(),
        };
        self.error = Some(error.clone());
        Some(error)
    }

    /// Dismiss the displayed error
    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

/// Lock the shared state, recovering the data if a holder panicked
pub(crate) fn lock(state: &Mutex<ComposeState>) -> MutexGuard<'_, ComposeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
