//! Debounced recipient resolution
//!
//! Keystrokes are pushed into a channel read by a background task. The task
//! waits for a quiet period, skips a settled value equal to the last resolved
//! one, and runs one resolution at a time. A keystroke arriving while a
//! resolution is in flight cancels it.

use crate::compose::ComposeEvent;
use crate::services::{ResolvedAddress, Services};
use crate::state::{lock, ComposeState, RecipientStatus};
use crate::ServiceResult;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub const VALID_ADDRESS_TEXT: &str = "valid address";
pub const INVALID_ADDRESS_TEXT: &str = "invalid address";

/// Classify `value` and resolve it to an address.
///
/// Aliases go through the name service, well-formed addresses resolve to
/// themselves, and anything else resolves to an empty address.
pub async fn resolve_address(
    services: &Services,
    protocol: &str,
    network: &str,
    value: &str,
) -> ServiceResult<ResolvedAddress> {
    if services.mailchain.validate_ens_name(value) {
        debug!("Resolving name {} on {}/{}", value, protocol, network);
        services.names.resolve_name(protocol, network, value).await
    } else if services.mailchain.validate_eth_address(value) {
        Ok(ResolvedAddress::new(value))
    } else {
        Ok(ResolvedAddress::new(""))
    }
}

/// Apply a settled resolution to the form state
pub(crate) fn apply_resolution(
    state: &mut ComposeState,
    services: &Services,
    outcome: &ServiceResult<ResolvedAddress>,
) {
    match outcome {
        Ok(resolved) if services.mailchain.validate_eth_address(&resolved.address) => {
            state.draft.to = resolved.address.clone();
            state.set_recipient_status(RecipientStatus::Valid, VALID_ADDRESS_TEXT);
        }
        Ok(_) => {
            state.set_recipient_status(RecipientStatus::Invalid, INVALID_ADDRESS_TEXT);
        }
        Err(e) => {
            state.set_recipient_status(RecipientStatus::Invalid, e.message.clone());
        }
    }
}

/// A keystroke tagged with the input generation it produced
#[derive(Debug)]
struct RecipientInput {
    value: String,
    generation: u64,
}

/// Everything the resolver task needs
pub(crate) struct ResolverContext {
    pub state: Arc<Mutex<ComposeState>>,
    pub services: Services,
    pub protocol: String,
    pub network: String,
    pub debounce: Duration,
    pub event_tx: mpsc::UnboundedSender<ComposeEvent>,
}

/// Handle to the resolver task, aborted on drop
pub(crate) struct RecipientResolver {
    input_tx: mpsc::UnboundedSender<RecipientInput>,
    task: JoinHandle<()>,
}

impl RecipientResolver {
    pub fn spawn(ctx: ResolverContext) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(resolver_loop(ctx, input_rx));
        Self { input_tx, task }
    }

    /// Queue a keystroke for debounced resolution
    pub fn push(&self, value: &str, generation: u64) {
        let _ = self.input_tx.send(RecipientInput {
            value: value.to_string(),
            generation,
        });
    }
}

impl Drop for RecipientResolver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Wait until no new input arrives for `debounce`, starting from `latest`.
///
/// Returns `None` when the input channel closed.
async fn settle(
    input_rx: &mut mpsc::UnboundedReceiver<RecipientInput>,
    mut latest: RecipientInput,
    debounce: Duration,
) -> Option<RecipientInput> {
    loop {
        tokio::select! {
            next = input_rx.recv() => latest = next?,
            _ = tokio::time::sleep(debounce) => return Some(latest),
        }
    }
}

async fn resolver_loop(ctx: ResolverContext, mut input_rx: mpsc::UnboundedReceiver<RecipientInput>) {
    // Last settled value and the outcome applied for it
    let mut last_settled: Option<(String, Option<ServiceResult<ResolvedAddress>>)> = None;
    let mut pending: Option<RecipientInput> = None;

    loop {
        let first = match pending.take() {
            Some(input) => input,
            None => match input_rx.recv().await {
                Some(input) => input,
                None => break,
            },
        };

        let Some(input) = settle(&mut input_rx, first, ctx.debounce).await else {
            break;
        };

        if let Some((value, cached)) = &last_settled {
            if *value == input.value {
                debug!("Recipient unchanged after debounce, skipping resolution");
                // Typing away and back leaves the field loading; restore the earlier outcome
                if let Some(outcome) = cached {
                    apply_if_current(&ctx, input.generation, outcome);
                }
                continue;
            }
        }

        if input.value.is_empty() {
            last_settled = Some((String::new(), None));
            continue;
        }

        let outcome = tokio::select! {
            outcome = resolve_address(&ctx.services, &ctx.protocol, &ctx.network, &input.value) => outcome,
            next = input_rx.recv() => match next {
                Some(next) => {
                    debug!("Recipient changed during resolution, dropping stale lookup");
                    pending = Some(next);
                    continue;
                }
                None => break,
            },
        };

        apply_if_current(&ctx, input.generation, &outcome);
        last_settled = Some((input.value, Some(outcome)));
    }

    info!("Recipient resolver stopped");
}

fn apply_if_current(ctx: &ResolverContext, generation: u64, outcome: &ServiceResult<ResolvedAddress>) {
    let mut state = lock(&ctx.state);
    if state.input_generation != generation {
        debug!("Discarding stale recipient resolution");
        return;
    }

    apply_resolution(&mut state, &ctx.services, outcome);
    let _ = ctx.event_tx.send(ComposeEvent::RecipientStatusChanged {
        status: state.recipient_status,
        text: state.recipient_text.clone(),
    });
}
