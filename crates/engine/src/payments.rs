//! The module contains `Payment` struct and its implementation.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

/// A recorded contribution of a participant. Payments are never updated,
/// only created and deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payment {
    pub id: Uuid,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub event_id: Uuid,
    pub participant_id: Uuid,
}

impl Payment {
    pub fn new(
        event_id: Uuid,
        participant_id: Uuid,
        amount: i64,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            amount: Self::validate_amount(amount)?,
            created_at,
            event_id,
            participant_id,
        })
    }

    /// Payment amounts are positive integers in the smallest currency unit.
    pub fn validate_amount(amount: i64) -> ResultEngine<i64> {
        if amount <= 0 {
            return Err(EngineError::InvalidInput("amount must be > 0".to_string()));
        }
        Ok(amount)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub event_id: String,
    pub participant_id: String,
    pub amount: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::events::Entity",
        from = "Column::EventId",
        to = "super::events::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Events,
    #[sea_orm(
        belongs_to = "super::participants::Entity",
        from = "Column::ParticipantId",
        to = "super::participants::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Participants,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payment> for ActiveModel {
    fn from(value: &Payment) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            event_id: ActiveValue::Set(value.event_id.to_string()),
            participant_id: ActiveValue::Set(value.participant_id.to_string()),
            amount: ActiveValue::Set(value.amount),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "payment")?,
            amount: model.amount,
            created_at: model.created_at,
            event_id: parse_uuid(&model.event_id, "event")?,
            participant_id: parse_uuid(&model.participant_id, "participant")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_amounts() {
        let (event, participant) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(Payment::new(event, participant, 0, Utc::now()).is_err());
        assert!(Payment::new(event, participant, -10, Utc::now()).is_err());
        let payment = Payment::new(event, participant, 3_334, Utc::now()).unwrap();
        assert_eq!(payment.amount, 3_334);
        assert_eq!(payment.participant_id, participant);
    }
}
