use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, Event, EventDraft, Participant, ResultEngine, events, participants, payments,
};

use super::{Engine, load_event, load_events, with_tx};

impl Engine {
    /// Create an event together with its roster.
    ///
    /// The event and its participants are inserted in one DB transaction.
    pub async fn new_event<S: AsRef<str>>(
        &self,
        name: &str,
        total_amount: i64,
        participant_names: &[S],
    ) -> ResultEngine<Event> {
        let draft = EventDraft::new(name, total_amount, participant_names)?;
        let event = Event::new(draft, Utc::now());

        with_tx!(self, |db_tx| {
            events::ActiveModel::from(&event).insert(&db_tx).await?;
            for participant in &event.participants {
                participants::ActiveModel::from(participant)
                    .insert(&db_tx)
                    .await?;
            }
            Ok::<_, EngineError>(())
        })?;

        Ok(event)
    }

    /// Return every event, newest first.
    pub async fn events(&self) -> ResultEngine<Vec<Event>> {
        let models = events::Entity::find()
            .order_by_desc(events::Column::CreatedAt)
            .all(&self.database)
            .await?;
        load_events(&self.database, models).await
    }

    /// Return a single event with its participants and payments.
    pub async fn event(&self, event_id: &str) -> ResultEngine<Event> {
        load_event(&self.database, event_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("event not exists".to_string()))
    }

    /// Replace name, total and roster of an event.
    ///
    /// This is a destructive replace: every participant is deleted and
    /// recreated, so **all** payments of the event are dropped, including the
    /// ones of participants whose name did not change. Everything happens in
    /// one DB transaction.
    pub async fn update_event<S: AsRef<str>>(
        &self,
        event_id: &str,
        name: &str,
        total_amount: i64,
        participant_names: &[S],
    ) -> ResultEngine<Event> {
        let draft = EventDraft::new(name, total_amount, participant_names)?;
        let now = Utc::now();

        with_tx!(self, |db_tx| {
            let model = events::Entity::find_by_id(event_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("event not exists".to_string()))?;
            let event_uuid = crate::util::parse_uuid(&model.id, "event")?;

            let active = events::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                name: ActiveValue::Set(draft.name),
                total_amount: ActiveValue::Set(draft.total_amount),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            payments::Entity::delete_many()
                .filter(payments::Column::EventId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            participants::Entity::delete_many()
                .filter(participants::Column::EventId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;

            for participant in Participant::roster(event_uuid, draft.participant_names) {
                participants::ActiveModel::from(&participant)
                    .insert(&db_tx)
                    .await?;
            }

            load_event(&db_tx, &model.id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("event not exists".to_string()))
        })
    }

    /// Delete an event with its participants and payments.
    pub async fn delete_event(&self, event_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = events::Entity::find_by_id(event_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("event not exists".to_string()))?;

            // The schema cascades too; deleting children explicitly keeps the
            // operation correct on connections without foreign key enforcement.
            payments::Entity::delete_many()
                .filter(payments::Column::EventId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            participants::Entity::delete_many()
                .filter(participants::Column::EventId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            events::Entity::delete_by_id(model.id).exec(&db_tx).await?;

            Ok(())
        })
    }
}
