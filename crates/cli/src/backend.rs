//! The two stores a command can run against.

use api_types::{
    event::{EventNew, EventView, ParticipantStatusView, ParticipantView, SettlementView},
    payment::{ParticipantRef, PaymentNew, PaymentView, QuickPay},
};
use mirror::{EventPatch, FileStorage, LocalEvent, LocalParticipant, LocalPayment, Mirror};

use crate::{
    client::Client,
    error::{AppError, Result},
};

/// Number of events shown by `list --recent`.
pub const RECENT_EVENTS: usize = 5;

pub enum Backend {
    Remote(Client),
    Local(Mirror<FileStorage>),
}

fn roster_guard(has_payments: bool, force: bool) -> Result<()> {
    if has_payments && !force {
        return Err(AppError::Usage(
            "replacing participants deletes every recorded payment; rerun with --force".to_string(),
        ));
    }
    Ok(())
}

impl Backend {
    pub fn local_mirror(&mut self) -> Result<&mut Mirror<FileStorage>> {
        match self {
            Self::Local(mirror) => Ok(mirror),
            Self::Remote(_) => Err(AppError::Usage(
                "this command only works on the local store (--local)".to_string(),
            )),
        }
    }

    pub async fn events(&self, recent: bool) -> Result<Vec<EventView>> {
        match self {
            Self::Remote(client) => {
                let mut events = client.events().await?;
                if recent {
                    events.truncate(RECENT_EVENTS);
                }
                Ok(events)
            }
            Self::Local(mirror) => {
                let events = if recent {
                    mirror.recent(RECENT_EVENTS)?
                } else {
                    mirror.recent(usize::MAX)?
                };
                Ok(events.iter().map(local_event_view).collect())
            }
        }
    }

    pub async fn event(&self, event_id: &str) -> Result<EventView> {
        match self {
            Self::Remote(client) => Ok(client.event(event_id).await?),
            Self::Local(mirror) => Ok(local_event_view(&mirror.event(event_id)?)),
        }
    }

    pub async fn create_event(&mut self, payload: EventNew) -> Result<EventView> {
        match self {
            Self::Remote(client) => Ok(client.create_event(&payload).await?),
            Self::Local(mirror) => {
                let event = mirror.create_event(
                    &payload.name,
                    payload.total_amount,
                    &payload.participant_names,
                )?;
                Ok(local_event_view(&event))
            }
        }
    }

    /// Apply `patch` to an event.
    ///
    /// The server always recreates the roster, so any remote edit of an event
    /// with payments needs `force`. Locally only a roster change does.
    pub async fn update_event(
        &mut self,
        event_id: &str,
        patch: EventPatch,
        force: bool,
    ) -> Result<EventView> {
        match self {
            Self::Remote(client) => {
                let current = client.event(event_id).await?;
                roster_guard(!current.payments.is_empty(), force)?;
                let payload = EventNew {
                    name: patch.name.unwrap_or(current.name),
                    total_amount: patch.total_amount.unwrap_or(current.total_amount),
                    participant_names: patch.participant_names.unwrap_or_else(|| {
                        current
                            .participants
                            .into_iter()
                            .map(|participant| participant.name)
                            .collect()
                    }),
                };
                Ok(client.update_event(event_id, &payload).await?)
            }
            Self::Local(mirror) => {
                if patch.participant_names.is_some() {
                    let current = mirror.event(event_id)?;
                    roster_guard(!current.payments().is_empty(), force)?;
                }
                Ok(local_event_view(&mirror.update_event(event_id, patch)?))
            }
        }
    }

    pub async fn delete_event(&mut self, event_id: &str) -> Result<String> {
        match self {
            Self::Remote(client) => Ok(client.delete_event(event_id).await?.message),
            Self::Local(mirror) => {
                mirror.delete_event(event_id)?;
                Ok("Event deleted successfully".to_string())
            }
        }
    }

    pub async fn pay(
        &mut self,
        event_id: &str,
        participant_id: &str,
        amount: i64,
    ) -> Result<PaymentView> {
        match self {
            Self::Remote(client) => {
                let payload = PaymentNew {
                    event_id: event_id.to_string(),
                    participant_id: participant_id.to_string(),
                    amount,
                };
                Ok(client.pay(&payload).await?)
            }
            Self::Local(mirror) => {
                let payment = mirror.add_payment(event_id, participant_id, amount)?;
                local_created_payment(mirror, event_id, &payment)
            }
        }
    }

    pub async fn quick_pay(&mut self, event_id: &str, participant_id: &str) -> Result<PaymentView> {
        match self {
            Self::Remote(client) => {
                let payload = QuickPay {
                    event_id: event_id.to_string(),
                    participant_id: participant_id.to_string(),
                };
                Ok(client.quick_pay(&payload).await?)
            }
            Self::Local(mirror) => {
                let payment = mirror.quick_pay(event_id, participant_id)?;
                local_created_payment(mirror, event_id, &payment)
            }
        }
    }

    pub async fn delete_payment(&mut self, payment_id: &str) -> Result<String> {
        match self {
            Self::Remote(client) => Ok(client.delete_payment(payment_id).await?.message),
            Self::Local(mirror) => {
                let location = mirror.locate_payment(payment_id)?;
                mirror.delete_payment(&location.event_id, &location.participant_id, payment_id)?;
                Ok("Payment deleted successfully".to_string())
            }
        }
    }
}

fn local_created_payment(
    mirror: &Mirror<FileStorage>,
    event_id: &str,
    payment: &LocalPayment,
) -> Result<PaymentView> {
    let event = mirror.event(event_id)?;
    Ok(local_payment_view(
        &event,
        payment,
        event.participant(&payment.participant_id),
    ))
}

fn local_payment_view(
    event: &LocalEvent,
    payment: &LocalPayment,
    participant: Option<&LocalParticipant>,
) -> PaymentView {
    PaymentView {
        id: payment.id.clone(),
        amount: payment.amount,
        created_at: payment.created_at,
        event_id: event.id.clone(),
        participant_id: payment.participant_id.clone(),
        participant: participant.map(|participant| ParticipantRef {
            id: participant.id.clone(),
            name: participant.name.clone(),
            event_id: event.id.clone(),
        }),
    }
}

/// Convert a mirror event to the API view.
pub fn local_event_view(event: &LocalEvent) -> EventView {
    let settlement = match event.settlement() {
        Ok(settlement) => Some(SettlementView {
            expected_share: settlement.expected_share,
            total_collected: settlement.total_collected,
            remaining: settlement.remaining,
            paid_participants: settlement.paid_participants,
            is_settled: settlement.is_settled(),
            participants: event
                .participants
                .iter()
                .zip(&settlement.participants)
                .map(|(participant, share)| ParticipantStatusView {
                    participant_id: participant.id.clone(),
                    name: participant.name.clone(),
                    total_paid: share.total_paid,
                    expected_share: share.expected_share,
                    outstanding: share.outstanding,
                    is_paid_in_full: share.is_paid_in_full,
                })
                .collect(),
        }),
        Err(err) => {
            tracing::warn!("local event {} has no settlement: {err}", event.id);
            None
        }
    };

    EventView {
        id: event.id.clone(),
        name: event.name.clone(),
        total_amount: event.total_amount,
        created_at: event.created_at,
        updated_at: event.updated_at,
        participants: event
            .participants
            .iter()
            .map(|participant| ParticipantView {
                id: participant.id.clone(),
                name: participant.name.clone(),
                event_id: event.id.clone(),
                payments: participant
                    .payments
                    .iter()
                    .map(|payment| local_payment_view(event, payment, None))
                    .collect(),
            })
            .collect(),
        payments: event
            .payments()
            .into_iter()
            .map(|(participant, payment)| local_payment_view(event, payment, Some(participant)))
            .collect(),
        settlement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> (tempfile::TempDir, Backend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::Local(Mirror::new(FileStorage::new(dir.path())));
        (dir, backend)
    }

    fn new_event(names: &[&str]) -> EventNew {
        EventNew {
            name: "Trip".to_string(),
            total_amount: 9_000,
            participant_names: names.iter().map(|name| name.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn local_roster_replace_needs_force_once_paid() {
        let (_dir, mut backend) = local();
        let event = backend.create_event(new_event(&["A", "B"])).await.unwrap();
        backend
            .pay(&event.id, &event.participants[0].id, 500)
            .await
            .unwrap();

        let patch = EventPatch {
            participant_names: Some(vec!["A".to_string(), "C".to_string()]),
            ..Default::default()
        };
        let err = backend
            .update_event(&event.id, patch.clone(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Usage(_)));

        // Renaming alone keeps payments and needs no force.
        let renamed = backend
            .update_event(
                &event.id,
                EventPatch {
                    name: Some("Trip 2".to_string()),
                    ..Default::default()
                },
                false,
            )
            .await
            .unwrap();
        assert_eq!(renamed.payments.len(), 1);

        let replaced = backend.update_event(&event.id, patch, true).await.unwrap();
        assert!(replaced.payments.is_empty());
        assert_eq!(replaced.name, "Trip 2");
    }

    #[tokio::test]
    async fn local_unpay_finds_the_owner() {
        let (_dir, mut backend) = local();
        let event = backend.create_event(new_event(&["A", "B"])).await.unwrap();
        let payment = backend
            .quick_pay(&event.id, &event.participants[1].id)
            .await
            .unwrap();
        assert_eq!(payment.amount, 4_500);
        assert_eq!(payment.participant.as_ref().unwrap().name, "B");

        let message = backend.delete_payment(&payment.id).await.unwrap();
        assert_eq!(message, "Payment deleted successfully");
        assert!(backend.delete_payment(&payment.id).await.is_err());

        let view = backend.event(&event.id).await.unwrap();
        assert_eq!(view.settlement.unwrap().total_collected, 0);
    }

    #[test]
    fn export_is_local_only() {
        let mut backend = Backend::Remote(Client::new("http://127.0.0.1:3000").unwrap());
        assert!(matches!(backend.local_mirror(), Err(AppError::Usage(_))));
    }
}
