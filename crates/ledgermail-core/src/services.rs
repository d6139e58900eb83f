//! Collaborator interfaces consumed by the compose controller
//!
//! Address listing, name resolution, public key lookup and sending are
//! remote calls owned by the backend. Validation, address parsing and
//! outbound mail generation are local helpers behind [`MailchainService`].

use crate::mailchain::DefaultMailchain;
use crate::message::{MessageDraft, OutboundMail};
use crate::ServiceResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of resolving a recipient, `address` may be empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    pub address: String,
}

impl ResolvedAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// Public key of a recipient address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub public_key: String,
}

/// Lists the sender addresses available to the user
#[async_trait]
pub trait AddressService: Send + Sync {
    async fn get_addresses(&self) -> ServiceResult<Vec<String>>;
}

/// Resolves name-service aliases to addresses
#[async_trait]
pub trait NameService: Send + Sync {
    async fn resolve_name(
        &self,
        protocol: &str,
        network: &str,
        name: &str,
    ) -> ServiceResult<ResolvedAddress>;
}

/// Looks up the public key registered for an address
#[async_trait]
pub trait PublicKeyService: Send + Sync {
    async fn get_public_key(&self, address: &str, network: &str) -> ServiceResult<PublicKey>;
}

/// Sends an outbound mail on a network
#[async_trait]
pub trait SendService: Send + Sync {
    async fn send_mail(&self, mail: &OutboundMail, network: &str) -> ServiceResult<()>;
}

/// Local address helpers and message building
pub trait MailchainService: Send + Sync {
    /// Build the sendable representation of a draft
    fn generate_mail(&self, draft: &MessageDraft) -> OutboundMail;

    /// Identicon image for an address, empty when none can be generated
    fn generate_identicon(&self, address: &str) -> String;

    /// Whether `value` looks like a name-service alias
    fn validate_ens_name(&self, value: &str) -> bool;

    /// Whether `value` is a well-formed chain address
    fn validate_eth_address(&self, value: &str) -> bool;

    /// Extract the raw address from an encoded mail header value
    fn parse_address_from_mailchain(&self, encoded: &str) -> String;
}

/// The full set of collaborators used by a compose controller
#[derive(Clone)]
pub struct Services {
    pub addresses: Arc<dyn AddressService>,
    pub names: Arc<dyn NameService>,
    pub public_keys: Arc<dyn PublicKeyService>,
    pub sender: Arc<dyn SendService>,
    pub mailchain: Arc<dyn MailchainService>,
}

impl Services {
    /// Use one backend for every remote call and the default local helpers
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: AddressService + NameService + PublicKeyService + SendService + 'static,
    {
        Self {
            addresses: backend.clone(),
            names: backend.clone(),
            public_keys: backend.clone(),
            sender: backend,
            mailchain: Arc::new(DefaultMailchain::new()),
        }
    }

    /// Replace the local helpers
    pub fn with_mailchain(mut self, mailchain: Arc<dyn MailchainService>) -> Self {
        self.mailchain = mailchain;
        self
    }
}
