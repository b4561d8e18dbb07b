//! The module contains `Event` struct and its implementation.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Participant, Payment, ResultEngine, Settlement, participants, payments,
    settlement,
    util::{normalize_required_name, parse_uuid},
};

/// Validated input for creating or replacing an event.
///
/// Names are trimmed and normalized; the total must be positive and the
/// roster must contain at least one non-blank name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub total_amount: i64,
    pub participant_names: Vec<String>,
}

impl EventDraft {
    pub fn new<S: AsRef<str>>(
        name: &str,
        total_amount: i64,
        participant_names: &[S],
    ) -> ResultEngine<Self> {
        Ok(Self {
            name: Self::validate_name(name)?,
            total_amount: Self::validate_total_amount(total_amount)?,
            participant_names: Self::validate_participant_names(participant_names)?,
        })
    }

    pub fn validate_name(name: &str) -> ResultEngine<String> {
        normalize_required_name(name, "event")
    }

    pub fn validate_total_amount(total_amount: i64) -> ResultEngine<i64> {
        if total_amount <= 0 {
            return Err(EngineError::InvalidInput(
                "total_amount must be > 0".to_string(),
            ));
        }
        Ok(total_amount)
    }

    pub fn validate_participant_names<S: AsRef<str>>(names: &[S]) -> ResultEngine<Vec<String>> {
        if names.is_empty() {
            return Err(EngineError::InvalidInput(
                "at least one participant is required".to_string(),
            ));
        }
        names
            .iter()
            .map(|name| normalize_required_name(name.as_ref(), "participant"))
            .collect()
    }
}

/// A shared-expense occasion with its roster and payments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Roster, in the order the names were given.
    pub participants: Vec<Participant>,
    /// Every payment of the event, newest first.
    pub payments: Vec<Payment>,
}

impl Event {
    /// Build a fresh event, with new participants and no payments.
    pub fn new(draft: EventDraft, now: DateTime<Utc>) -> Self {
        let id = Uuid::new_v4();
        let participants = Participant::roster(id, draft.participant_names);
        Self {
            id,
            name: draft.name,
            total_amount: draft.total_amount,
            created_at: now,
            updated_at: now,
            participants,
            payments: Vec::new(),
        }
    }

    pub fn participant(&self, participant_id: Uuid) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    /// Settlement computed from the current roster and payments.
    pub fn settlement(&self) -> ResultEngine<Settlement> {
        settlement::settle(
            self.total_amount,
            self.participants
                .iter()
                .map(|participant| participant.payments.iter().map(|payment| payment.amount)),
        )
    }

    /// Assemble an event from its rows.
    ///
    /// `participant_models` must be sorted by position and `payment_models`
    /// newest first.
    pub(crate) fn from_rows(
        model: Model,
        participant_models: Vec<participants::Model>,
        payment_models: Vec<payments::Model>,
    ) -> ResultEngine<Self> {
        let mut participants = participant_models
            .into_iter()
            .map(Participant::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        let payments = payment_models
            .into_iter()
            .map(Payment::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        // Nested lists read oldest first.
        for payment in payments.iter().rev() {
            if let Some(participant) = participants
                .iter_mut()
                .find(|p| p.id == payment.participant_id)
            {
                participant.payments.push(payment.clone());
            }
        }

        Ok(Self {
            id: parse_uuid(&model.id, "event")?,
            name: model.name,
            total_amount: model.total_amount,
            created_at: model.created_at,
            updated_at: model.updated_at,
            participants,
            payments,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub total_amount: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participants::Entity")]
    Participants,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Event> for ActiveModel {
    fn from(value: &Event) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            total_amount: ActiveValue::Set(value.total_amount),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn draft_normalizes_names() {
        let draft = EventDraft::new(" Dinner ", 10_000, &["  Aki", "Ben  "]).unwrap();

        assert_eq!(draft.name, "Dinner");
        assert_eq!(draft.participant_names, vec!["Aki", "Ben"]);
    }

    #[test]
    fn draft_rejects_invalid_fields() {
        assert!(matches!(
            EventDraft::new("", 100, &["A"]),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            EventDraft::new("Dinner", 0, &["A"]),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            EventDraft::new("Dinner", -5, &["A"]),
            Err(EngineError::InvalidInput(_))
        ));
        let none: [&str; 0] = [];
        assert!(matches!(
            EventDraft::new("Dinner", 100, &none),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            EventDraft::new("Dinner", 100, &["A", "  "]),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn new_event_has_roster_and_no_payments() {
        let draft = EventDraft::new("Trip", 9_000, &["A", "B", "C"]).unwrap();
        let event = Event::new(draft, now());

        assert_eq!(event.participants.len(), 3);
        assert!(event.payments.is_empty());
        assert!(event.participants.iter().all(|p| p.event_id == event.id));
        assert!(event.participants.iter().all(|p| p.payments.is_empty()));
        assert_eq!(event.created_at, event.updated_at);
        assert_eq!(event.settlement().unwrap().expected_share, 3_000);
    }

    #[test]
    fn from_rows_nests_payments_oldest_first() {
        let event_id = Uuid::new_v4();
        let participant_id = Uuid::new_v4();
        let model = Model {
            id: event_id.to_string(),
            name: "Trip".to_string(),
            total_amount: 1_000,
            created_at: now(),
            updated_at: now(),
        };
        let participant = participants::Model {
            id: participant_id.to_string(),
            event_id: event_id.to_string(),
            name: "A".to_string(),
            position: 0,
        };
        let payment = |amount: i64, secs: i64| payments::Model {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            participant_id: participant_id.to_string(),
            amount,
            created_at: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        };

        let event =
            Event::from_rows(model, vec![participant], vec![payment(20, 2), payment(10, 1)])
                .unwrap();

        assert_eq!(event.payments[0].amount, 20);
        assert_eq!(event.participants[0].payments[0].amount, 10);
        assert_eq!(event.participants[0].payments[1].amount, 20);
        assert_eq!(event.settlement().unwrap().total_collected, 30);
    }
}
