use chrono::Utc;
use sea_orm::{
    DatabaseTransaction, PaginatorTrait, QueryFilter, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, Participant, Payment, ResultEngine, events, participants, payments, settlement,
    util::parse_uuid,
};

use super::{Engine, with_tx};

impl Engine {
    async fn require_event(
        &self,
        db: &DatabaseTransaction,
        event_id: &str,
    ) -> ResultEngine<events::Model> {
        events::Entity::find_by_id(event_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("event not exists".to_string()))
    }

    /// Return the participant only if it belongs to the given event.
    async fn require_participant_in_event(
        &self,
        db: &DatabaseTransaction,
        event_id: &str,
        participant_id: &str,
    ) -> ResultEngine<participants::Model> {
        participants::Entity::find_by_id(participant_id.to_string())
            .filter(participants::Column::EventId.eq(event_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("participant not exists".to_string()))
    }

    /// Refuse a payment that would push the participant's or the event's
    /// running total past `i64::MAX`.
    async fn check_running_totals(
        &self,
        db: &DatabaseTransaction,
        event: &events::Model,
        participant: &participants::Model,
        amount: i64,
    ) -> ResultEngine<()> {
        let recorded = payments::Entity::find()
            .filter(payments::Column::EventId.eq(event.id.clone()))
            .all(db)
            .await?;
        let event_total = settlement::total_paid(recorded.iter().map(|payment| payment.amount))?;
        let participant_total = settlement::total_paid(
            recorded
                .iter()
                .filter(|payment| payment.participant_id == participant.id)
                .map(|payment| payment.amount),
        )?;

        if participant_total.checked_add(amount).is_none() || event_total.checked_add(amount).is_none()
        {
            return Err(EngineError::InvalidInput(
                "amount would push the collected total past the maximum".to_string(),
            ));
        }
        Ok(())
    }

    /// Insert a payment and return it with its participant.
    async fn insert_payment(
        &self,
        db: &DatabaseTransaction,
        event: &events::Model,
        participant: participants::Model,
        amount: i64,
    ) -> ResultEngine<(Payment, Participant)> {
        self.check_running_totals(db, event, &participant, amount)
            .await?;
        let payment = Payment::new(
            parse_uuid(&event.id, "event")?,
            parse_uuid(&participant.id, "participant")?,
            amount,
            Utc::now(),
        )?;
        payments::ActiveModel::from(&payment).insert(db).await?;
        Ok((payment, Participant::try_from(participant)?))
    }

    /// Record a payment of `amount` for a participant of an event.
    ///
    /// Returns the payment together with the participant it belongs to.
    pub async fn new_payment(
        &self,
        event_id: &str,
        participant_id: &str,
        amount: i64,
    ) -> ResultEngine<(Payment, Participant)> {
        let amount = Payment::validate_amount(amount)?;
        with_tx!(self, |db_tx| {
            let event = self.require_event(&db_tx, event_id).await?;
            let participant = self
                .require_participant_in_event(&db_tx, event_id, participant_id)
                .await?;
            self.insert_payment(&db_tx, &event, participant, amount)
                .await
        })
    }

    /// Settle a participant in one step.
    ///
    /// Records exactly `expected_share - total_paid`. Fails with
    /// [`EngineError::AlreadyPaid`] when the participant owes nothing.
    pub async fn quick_pay(
        &self,
        event_id: &str,
        participant_id: &str,
    ) -> ResultEngine<(Payment, Participant)> {
        with_tx!(self, |db_tx| {
            let event = self.require_event(&db_tx, event_id).await?;
            let participant = self
                .require_participant_in_event(&db_tx, event_id, participant_id)
                .await?;

            let participant_count = participants::Entity::find()
                .filter(participants::Column::EventId.eq(event.id.clone()))
                .count(&db_tx)
                .await?;
            let participant_count = usize::try_from(participant_count)
                .map_err(|_| EngineError::InvalidInput("too many participants".to_string()))?;
            let expected_share = settlement::expected_share(event.total_amount, participant_count)?;

            let paid = payments::Entity::find()
                .filter(payments::Column::EventId.eq(event.id.clone()))
                .filter(payments::Column::ParticipantId.eq(participant.id.clone()))
                .all(&db_tx)
                .await?;
            let total_paid = settlement::total_paid(paid.iter().map(|payment| payment.amount))?;

            let amount = settlement::quick_pay_amount(expected_share, total_paid)?;
            self.insert_payment(&db_tx, &event, participant, amount)
                .await
        })
    }

    /// Delete a single payment.
    pub async fn delete_payment(&self, payment_id: &str) -> ResultEngine<()> {
        let result = payments::Entity::delete_by_id(payment_id.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("payment not exists".to_string()));
        }
        Ok(())
    }
}
