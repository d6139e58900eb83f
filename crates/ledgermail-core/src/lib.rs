//! Core compose logic for Ledgermail
//!
//! Provides the compose/reply controller, recipient resolution, reply
//! quoting and the collaborator interfaces it is driven through.

mod compose;
mod config;
mod error;
pub mod identicon;
pub mod mailchain;
mod message;
pub mod reply;
mod resolver;
pub mod services;
mod state;

pub use compose::{ComposeContext, ComposeController, ComposeEvent, ERROR_CLOSE_LABEL};
pub use config::{ComposeConfig, DEFAULT_FALLBACK_IDENTICON, DEFAULT_HELP_URL, DEFAULT_RECIPIENT_DEBOUNCE};
pub use error::{CoreError, CoreResult, ServiceError, ServiceResult};
pub use mailchain::DefaultMailchain;
pub use message::{Message, MessageDraft, MessageHeaders, OutboundHeaders, OutboundMail, OutboundMessage};
pub use resolver::{resolve_address, INVALID_ADDRESS_TEXT, VALID_ADDRESS_TEXT};
pub use services::Services;
pub use state::{ComposeState, ErrorDisplay, RecipientStatus};
