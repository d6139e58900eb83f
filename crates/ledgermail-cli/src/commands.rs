//! Subcommand implementations driving the compose controller

use anyhow::{bail, Context};
use ledgermail_core::{
    ComposeConfig, ComposeContext, ComposeController, ComposeEvent, RecipientStatus, Services,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

/// Wait until the recipient resolver settles.
///
/// Returns the status text of a valid recipient, fails on an invalid one.
pub async fn wait_for_recipient(events: &mut UnboundedReceiver<ComposeEvent>) -> anyhow::Result<String> {
    while let Some(event) = events.recv().await {
        match event {
            ComposeEvent::RecipientStatusChanged {
                status: RecipientStatus::Valid,
                text,
            } => return Ok(text),
            ComposeEvent::RecipientStatusChanged {
                status: RecipientStatus::Invalid,
                text,
            } => bail!("Recipient could not be resolved: {}", text),
            ComposeEvent::ShowError { error, .. } => bail!("{}", error.title),
            _ => {}
        }
    }
    bail!("Compose controller stopped before the recipient was resolved")
}

/// Reject recipients that would never settle into a valid or invalid status
fn recipient_value(value: &str) -> anyhow::Result<&str> {
    let value = value.trim();
    if value.is_empty() {
        bail!("Recipient is empty");
    }
    Ok(value)
}

pub async fn list_addresses(
    services: Services,
    context: ComposeContext,
    config: ComposeConfig,
    identicons: bool,
) -> anyhow::Result<()> {
    let (controller, _events) = ComposeController::initialize(services, context, config).await;
    if let Some(error) = controller.error() {
        bail!("{}", error.title);
    }

    for address in controller.from_addresses() {
        if identicons {
            println!("{}\t{}", address, controller.generate_identicon(&address));
        } else {
            println!("{}", address);
        }
    }
    controller.teardown();
    Ok(())
}

pub async fn resolve(
    services: Services,
    context: ComposeContext,
    config: ComposeConfig,
    value: &str,
) -> anyhow::Result<String> {
    let value = recipient_value(value)?;
    let (controller, mut events) = ComposeController::initialize(services, context, config).await;
    // Sender address errors are irrelevant to resolution
    while events.try_recv().is_ok() {}

    controller.on_recipient_input(value);
    wait_for_recipient(&mut events).await?;

    let address = controller.draft().to;
    controller.teardown();
    Ok(address)
}

pub async fn send(
    services: Services,
    context: ComposeContext,
    config: ComposeConfig,
    to: &str,
    subject: String,
    body: String,
) -> anyhow::Result<()> {
    let to = recipient_value(to)?;
    let (controller, mut events) = ComposeController::initialize(services, context, config).await;
    if let Some(error) = controller.error() {
        bail!("{}", error.title);
    }

    let addresses = controller.from_addresses();
    let draft = controller.draft();
    if draft.from.is_empty() {
        let first = addresses
            .first()
            .context("The sending service holds no sender addresses")?;
        controller.set_from(first.clone());
    } else if !addresses.contains(&draft.from) {
        warn!("Sender {} is not held by the sending service", draft.from);
    }

    controller.on_recipient_input(to);
    wait_for_recipient(&mut events).await?;

    controller.set_subject(subject);
    controller.set_body(body);
    submit(&controller, &mut events).await
}

pub async fn reply(
    services: Services,
    context: ComposeContext,
    config: ComposeConfig,
    body: &str,
) -> anyhow::Result<()> {
    let (controller, mut events) = ComposeController::initialize(services, context, config).await;
    if let Some(error) = controller.error() {
        bail!("{}", error.title);
    }

    let draft = controller.draft();
    if draft.to.is_empty() {
        bail!("The message has no sender to reply to");
    }
    info!("Replying to {} as {}", draft.to, draft.from);

    controller.set_body(format!("{}{}", body, draft.body));
    submit(&controller, &mut events).await
}

async fn submit(
    controller: &ComposeController,
    events: &mut UnboundedReceiver<ComposeEvent>,
) -> anyhow::Result<()> {
    let to = controller.draft().to;
    controller.submit().await?;

    while let Ok(event) = events.try_recv() {
        if event == ComposeEvent::GoToInboxMessages {
            println!("Message sent to {}", to);
            return Ok(());
        }
    }
    bail!("Send finished without returning to the inbox")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ledgermail_core::services::{
        AddressService, NameService, PublicKey, PublicKeyService, ResolvedAddress, SendService,
    };
    use ledgermail_core::{ErrorDisplay, OutboundMail, ServiceError, ServiceResult};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    const ALICE: &str = "0x92d8f10248c6a3953cc3692a894655ad05d61efb";

    /// Backend holding one sender address and resolving nothing
    struct OfflineBackend;

    #[async_trait]
    impl AddressService for OfflineBackend {
        async fn get_addresses(&self) -> ServiceResult<Vec<String>> {
            Ok(vec![ALICE.to_string()])
        }
    }

    #[async_trait]
    impl NameService for OfflineBackend {
        async fn resolve_name(&self, _: &str, _: &str, _: &str) -> ServiceResult<ResolvedAddress> {
            Err(ServiceError::new(Some(404), "name not found"))
        }
    }

    #[async_trait]
    impl PublicKeyService for OfflineBackend {
        async fn get_public_key(&self, _: &str, _: &str) -> ServiceResult<PublicKey> {
            Err(ServiceError::new(Some(404), "no public key"))
        }
    }

    #[async_trait]
    impl SendService for OfflineBackend {
        async fn send_mail(&self, _: &OutboundMail, _: &str) -> ServiceResult<()> {
            Err(ServiceError::new(Some(503), "offline"))
        }
    }

    fn offline() -> (Services, ComposeContext, ComposeConfig) {
        (
            Services::from_backend(Arc::new(OfflineBackend)),
            ComposeContext::new("ethereum", "ropsten"),
            ComposeConfig::default().with_debounce(Duration::from_millis(10)),
        )
    }

    #[test]
    fn test_recipient_value_trims_and_rejects_blank() {
        assert_eq!(recipient_value("  bob.eth ").unwrap(), "bob.eth");
        assert!(recipient_value("").is_err());
        assert!(recipient_value(" \t ").is_err());
    }

    #[tokio::test]
    async fn test_resolve_empty_recipient_fails_fast() {
        for value in ["", "   "] {
            let (services, context, config) = offline();
            let result = tokio::time::timeout(
                Duration::from_secs(3),
                resolve(services, context, config, value),
            )
            .await
            .expect("resolve returned");
            assert_eq!(result.unwrap_err().to_string(), "Recipient is empty");
        }
    }

    #[tokio::test]
    async fn test_send_empty_recipient_fails_fast() {
        let (services, context, config) = offline();
        let result = tokio::time::timeout(
            Duration::from_secs(3),
            send(services, context, config, "", "Hi".to_string(), String::new()),
        )
        .await
        .expect("send returned");
        assert_eq!(result.unwrap_err().to_string(), "Recipient is empty");
    }

    #[tokio::test]
    async fn test_resolve_unknown_name_reports_error() {
        let (services, context, config) = offline();
        let err = resolve(services, context, config, "nobody.eth").await.unwrap_err();
        assert!(err.to_string().contains("name not found"));
    }

    #[tokio::test]
    async fn test_wait_for_valid_recipient() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(ComposeEvent::RecipientStatusChanged {
            status: RecipientStatus::Loading,
            text: String::new(),
        })
        .unwrap();
        tx.send(ComposeEvent::RecipientStatusChanged {
            status: RecipientStatus::Valid,
            text: "valid address".to_string(),
        })
        .unwrap();

        assert_eq!(wait_for_recipient(&mut rx).await.unwrap(), "valid address");
    }

    #[tokio::test]
    async fn test_wait_for_invalid_recipient() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(ComposeEvent::RecipientStatusChanged {
            status: RecipientStatus::Invalid,
            text: "name not found".to_string(),
        })
        .unwrap();

        let err = wait_for_recipient(&mut rx).await.unwrap_err();
        assert!(err.to_string().contains("name not found"));
    }

    #[tokio::test]
    async fn test_wait_stops_on_error_or_close() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(ComposeEvent::ShowError {
            error: ErrorDisplay {
                title: "Error Code: 503".to_string(),
                message: String::new(),
            },
            close_label: "Close".to_string(),
        })
        .unwrap();
        drop(tx);

        let err = wait_for_recipient(&mut rx).await.unwrap_err();
        assert_eq!(err.to_string(), "Error Code: 503");
        assert!(wait_for_recipient(&mut rx).await.is_err());
    }
}
