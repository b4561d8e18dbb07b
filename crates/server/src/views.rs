//! Mapping from engine aggregates to API views.

use api_types::{
    event::{EventView, ParticipantStatusView, ParticipantView, SettlementView},
    payment::{ParticipantRef, PaymentView},
};
use engine::{Event, Participant, Payment};

fn participant_ref(participant: &Participant) -> ParticipantRef {
    ParticipantRef {
        id: participant.id.to_string(),
        name: participant.name.clone(),
        event_id: participant.event_id.to_string(),
    }
}

pub(crate) fn payment_view(payment: &Payment, participant: Option<&Participant>) -> PaymentView {
    PaymentView {
        id: payment.id.to_string(),
        amount: payment.amount,
        created_at: payment.created_at,
        event_id: payment.event_id.to_string(),
        participant_id: payment.participant_id.to_string(),
        participant: participant.map(participant_ref),
    }
}

fn settlement_view(event: &Event) -> Option<SettlementView> {
    let settlement = match event.settlement() {
        Ok(settlement) => settlement,
        Err(err) => {
            tracing::warn!("event {} has no settlement: {err}", event.id);
            return None;
        }
    };

    let participants = event
        .participants
        .iter()
        .zip(&settlement.participants)
        .map(|(participant, share)| ParticipantStatusView {
            participant_id: participant.id.to_string(),
            name: participant.name.clone(),
            total_paid: share.total_paid,
            expected_share: share.expected_share,
            outstanding: share.outstanding,
            is_paid_in_full: share.is_paid_in_full,
        })
        .collect();

    Some(SettlementView {
        expected_share: settlement.expected_share,
        total_collected: settlement.total_collected,
        remaining: settlement.remaining,
        paid_participants: settlement.paid_participants,
        is_settled: settlement.is_settled(),
        participants,
    })
}

pub(crate) fn event_view(event: &Event) -> EventView {
    let participants = event
        .participants
        .iter()
        .map(|participant| ParticipantView {
            id: participant.id.to_string(),
            name: participant.name.clone(),
            event_id: participant.event_id.to_string(),
            payments: participant
                .payments
                .iter()
                .map(|payment| payment_view(payment, None))
                .collect(),
        })
        .collect();

    let payments = event
        .payments
        .iter()
        .map(|payment| payment_view(payment, event.participant(payment.participant_id)))
        .collect();

    EventView {
        id: event.id.to_string(),
        name: event.name.clone(),
        total_amount: event.total_amount,
        created_at: event.created_at,
        updated_at: event.updated_at,
        participants,
        payments,
        settlement: settlement_view(event),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use engine::EventDraft;

    use super::*;

    #[test]
    fn flat_payments_carry_their_participant() {
        let draft = EventDraft::new("Dinner", 10_000, &["A", "B", "C"]).unwrap();
        let mut event = Event::new(draft, Utc::now());
        let payer = event.participants[1].clone();
        let payment = Payment::new(event.id, payer.id, 3_334, Utc::now()).unwrap();
        event.participants[1].payments.push(payment.clone());
        event.payments.push(payment);

        let view = event_view(&event);

        let flat = &view.payments[0];
        let participant = flat.participant.as_ref().unwrap();
        assert_eq!(participant.name, "B");
        assert_eq!(participant.id, payer.id.to_string());
        assert!(view.participants[1].payments[0].participant.is_none());

        let settlement = view.settlement.unwrap();
        assert_eq!(settlement.expected_share, 3_334);
        assert_eq!(settlement.paid_participants, 1);
        assert_eq!(settlement.remaining, 6_666);
        assert!(settlement.participants[1].is_paid_in_full);
        assert!(!settlement.participants[0].is_paid_in_full);
    }

    #[test]
    fn empty_roster_has_no_settlement() {
        let draft = EventDraft::new("Dinner", 100, &["A"]).unwrap();
        let mut event = Event::new(draft, Utc::now());
        event.participants.clear();

        assert!(event_view(&event).settlement.is_none());
    }
}
