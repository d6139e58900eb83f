//! Compose controller
//!
//! Owns the draft for one compose/reply session. The host feeds it recipient
//! keystrokes and form edits, calls [`ComposeController::submit`], and reacts
//! to [`ComposeEvent`]s for navigation, status updates and error modals.

use crate::config::ComposeConfig;
use crate::message::{Message, MessageDraft};
use crate::reply::apply_reply_fields;
use crate::resolver::{RecipientResolver, ResolverContext};
use crate::services::Services;
use crate::state::{lock, ComposeState, ErrorDisplay, RecipientStatus};
use crate::{CoreError, CoreResult, ServiceError};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Label for the error modal's close button
pub const ERROR_CLOSE_LABEL: &str = "Close";

/// Inputs supplied by the surrounding application
#[derive(Debug, Clone, Default)]
pub struct ComposeContext {
    /// Preselected sender address
    pub current_account: Option<String>,
    /// Network used for lookups and sending
    pub current_network: String,
    /// Protocol used for name resolution
    pub current_protocol: String,
    /// Message being replied to
    pub current_message: Option<Message>,
}

impl ComposeContext {
    pub fn new(protocol: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            current_protocol: protocol.into(),
            current_network: network.into(),
            ..Default::default()
        }
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.current_account = Some(account.into());
        self
    }

    pub fn replying_to(mut self, message: Message) -> Self {
        self.current_message = Some(message);
        self
    }
}

/// Events sent from the controller to the host view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeEvent {
    /// Navigate to the message being replied to
    OpenMessage(Message),
    /// Navigate back to the inbox list
    GoToInboxMessages,
    /// Recipient indicator changed
    RecipientStatusChanged {
        status: RecipientStatus,
        text: String,
    },
    /// Present an error modal
    ShowError {
        error: ErrorDisplay,
        close_label: String,
    },
}

/// Headless compose/reply component
pub struct ComposeController {
    state: Arc<Mutex<ComposeState>>,
    services: Services,
    context: ComposeContext,
    config: ComposeConfig,
    event_tx: mpsc::UnboundedSender<ComposeEvent>,
    resolver: RecipientResolver,
}

impl ComposeController {
    /// Create a controller and run initialization.
    ///
    /// Fetches the sender addresses, resets the draft, preselects the
    /// current account, prefills reply fields and starts the recipient
    /// resolver. Returns the controller and the receiver for its events.
    pub async fn initialize(
        services: Services,
        context: ComposeContext,
        config: ComposeConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ComposeEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(ComposeState::default()));

        let addresses = services.addresses.get_addresses().await;

        let resolver = RecipientResolver::spawn(ResolverContext {
            state: state.clone(),
            services: services.clone(),
            protocol: context.current_protocol.clone(),
            network: context.current_network.clone(),
            debounce: config.recipient_debounce,
            event_tx: event_tx.clone(),
        });

        let controller = Self {
            state,
            services,
            context,
            config,
            event_tx,
            resolver,
        };

        match addresses {
            Ok(addresses) => {
                info!("Loaded {} sender addresses", addresses.len());
                controller.lock().from_addresses = addresses;
            }
            Err(e) => {
                warn!("Failed to load sender addresses: {}", e);
                controller.handle_service_error(&e);
            }
        }

        {
            let mut state = controller.lock();
            state.init_mail();
            if let Some(account) = &controller.context.current_account {
                state.draft.from = account.clone();
            }
            if let Some(message) = &controller.context.current_message {
                if apply_reply_fields(&mut state, message, controller.services.mailchain.as_ref()) {
                    debug!("Prefilled reply to {}", state.draft.to);
                }
            }
        }

        (controller, event_rx)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ComposeState> {
        lock(&self.state)
    }

    fn emit(&self, event: ComposeEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("Compose event receiver dropped");
        }
    }

    /// Copy of the full form state
    pub fn snapshot(&self) -> ComposeState {
        self.lock().clone()
    }

    pub fn draft(&self) -> MessageDraft {
        self.lock().draft.clone()
    }

    pub fn from_addresses(&self) -> Vec<String> {
        self.lock().from_addresses.clone()
    }

    pub fn recipient_status(&self) -> RecipientStatus {
        self.lock().recipient_status
    }

    pub fn recipient_text(&self) -> String {
        self.lock().recipient_text.clone()
    }

    pub fn send_disabled(&self) -> bool {
        self.lock().send_disabled
    }

    pub fn error(&self) -> Option<ErrorDisplay> {
        self.lock().error.clone()
    }

    /// Dismiss the displayed error so the next one can be shown
    pub fn clear_error(&self) {
        self.lock().clear_error();
    }

    pub fn set_from(&self, from: impl Into<String>) {
        self.lock().draft.from = from.into();
    }

    pub fn set_subject(&self, subject: impl Into<String>) {
        self.lock().draft.subject = subject.into();
    }

    pub fn set_body(&self, body: impl Into<String>) {
        self.lock().draft.body = body.into();
    }

    /// Identicon for an address, or the fallback icon
    pub fn generate_identicon(&self, address: &str) -> String {
        let icon = self.services.mailchain.generate_identicon(address);
        if icon.is_empty() {
            self.config.fallback_identicon.clone()
        } else {
            icon
        }
    }

    /// Handle a keystroke in the recipient field
    pub fn on_recipient_input(&self, value: &str) {
        let (generation, status_changed) = {
            let mut state = self.lock();
            let mut status_changed = false;

            if value.is_empty() {
                state.set_recipient_status(RecipientStatus::Clear, "");
                state.reset_to_field();
                status_changed = true;
            } else if state.current_recipient_value != value {
                state.set_recipient_status(RecipientStatus::Loading, "");
                state.reset_to_field();
                status_changed = true;
            }

            state.current_recipient_value = value.to_string();
            state.message_to_field = value.to_string();
            state.input_generation += 1;

            let changed = status_changed.then(|| (state.recipient_status, state.recipient_text.clone()));
            (state.input_generation, changed)
        };

        if let Some((status, text)) = status_changed {
            self.emit(ComposeEvent::RecipientStatusChanged { status, text });
        }
        self.resolver.push(value, generation);
    }

    /// Navigate back to the inbox list
    pub fn return_to_inbox_messages(&self) {
        self.emit(ComposeEvent::GoToInboxMessages);
    }

    /// Navigate to the message being replied to, or the inbox when composing
    pub fn return_to_message(&self) {
        match &self.context.current_message {
            Some(message) => self.emit(ComposeEvent::OpenMessage(message.clone())),
            None => self.return_to_inbox_messages(),
        }
    }

    /// Send the draft.
    ///
    /// Looks up the recipient public key, builds the outbound mail and sends
    /// it. On success the draft is cleared and the host is sent back to the
    /// inbox. On failure the error modal is shown once, the draft is kept and
    /// the send control is enabled again.
    pub async fn submit(&self) -> CoreResult<()> {
        let mut draft = {
            let mut state = self.lock();
            if state.send_disabled {
                return Err(CoreError::SubmitInProgress);
            }
            if state.draft.to.is_empty() {
                return Err(CoreError::MissingRecipient);
            }
            state.send_disabled = true;
            state.draft.clone()
        };
        let network = &self.context.current_network;

        info!("Sending message to {} on {}", draft.to, network);

        let public_key = match self.services.public_keys.get_public_key(&draft.to, network).await {
            Ok(key) => key.public_key,
            Err(e) => {
                error!("Public key lookup failed for {}: {}", draft.to, e);
                self.fail_submission(&e);
                return Err(CoreError::PublicKeyLookup(e));
            }
        };

        self.lock().draft.public_key = Some(public_key.clone());
        draft.public_key = Some(public_key);
        let outbound = self.services.mailchain.generate_mail(&draft);

        match self.services.sender.send_mail(&outbound, network).await {
            Ok(()) => {
                info!("Message sent");
                {
                    let mut state = self.lock();
                    state.init_mail();
                    state.send_disabled = false;
                }
                self.return_to_inbox_messages();
                Ok(())
            }
            Err(e) => {
                error!("Send failed: {}", e);
                self.fail_submission(&e);
                Err(CoreError::SendFailed(e))
            }
        }
    }

    fn fail_submission(&self, e: &ServiceError) {
        self.lock().send_disabled = false;
        self.handle_service_error(e);
    }

    fn handle_service_error(&self, e: &ServiceError) {
        let title = format!("Error Code: {}", e.code_display());
        let message = format!(
            "<p>{}</p><p>Please visit <a href=\"{}\" target=\"_blank\">Docs: common inbox errors</a> to see how to fix this.</p>",
            e.message, self.config.help_url
        );
        self.handle_error_on_page(title, message);
    }

    /// Show an error modal unless one is already displayed
    pub fn handle_error_on_page(&self, title: impl Into<String>, message: impl Into<String>) {
        let shown = self.lock().show_error(title, message);
        match shown {
            Some(error) => self.emit(ComposeEvent::ShowError {
                error,
                close_label: ERROR_CLOSE_LABEL.to_string(),
            }),
            None => debug!("Error already displayed, dropping new error"),
        }
    }

    /// Stop the recipient resolver and release the controller
    pub fn teardown(self) {
        info!("Tearing down compose controller");
        drop(self);
    }
}
