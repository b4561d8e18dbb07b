//! The module contains `Participant` struct and its implementation.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Payment, ResultEngine, util::parse_uuid};

/// A person owing a share of an event's total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
    pub event_id: Uuid,
    /// Roster index, used to keep the given order on read.
    pub position: i32,
    /// Payments of this participant, oldest first.
    pub payments: Vec<Payment>,
}

impl Participant {
    pub fn new(event_id: Uuid, name: String, position: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            event_id,
            position,
            payments: Vec::new(),
        }
    }

    /// Build a fresh roster from already normalized names.
    pub(crate) fn roster(event_id: Uuid, names: Vec<String>) -> Vec<Self> {
        names
            .into_iter()
            .zip(0..)
            .map(|(name, position)| Self::new(event_id, name, position))
            .collect()
    }

    pub fn total_paid(&self) -> ResultEngine<i64> {
        crate::settlement::total_paid(self.payments.iter().map(|payment| payment.amount))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub position: i32,
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
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Participant> for ActiveModel {
    fn from(value: &Participant) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            event_id: ActiveValue::Set(value.event_id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            position: ActiveValue::Set(value.position),
        }
    }
}

impl TryFrom<Model> for Participant {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "participant")?,
            name: model.name,
            event_id: parse_uuid(&model.event_id, "event")?,
            position: model.position,
            payments: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_keeps_order() {
        let event_id = Uuid::new_v4();
        let roster = Participant::roster(
            event_id,
            vec!["C".to_string(), "A".to_string(), "B".to_string()],
        );

        let names: Vec<&str> = roster.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
        let positions: Vec<i32> = roster.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }
}
