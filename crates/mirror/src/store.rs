use chrono::{NaiveDate, Utc};
use engine::{EngineError, EventDraft, Payment, Settlement, settlement};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    LocalEvent, LocalParticipant, LocalPayment, Storage,
    error::{MirrorError, Result},
};

/// Partial update of an event. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub name: Option<String>,
    pub total_amount: Option<i64>,
    /// Replacing the roster drops every payment of the event.
    pub participant_names: Option<Vec<String>>,
}

/// Owner of a payment, as found by [`Mirror::locate_payment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLocation {
    pub event_id: String,
    pub participant_id: String,
}

/// File name suggested for an export taken on `date`.
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("whopaid-backup-{}.json", date.format("%Y-%m-%d"))
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn roster(names: Vec<String>) -> Vec<LocalParticipant> {
    names
        .into_iter()
        .map(|name| LocalParticipant {
            id: new_id(),
            name,
            payments: Vec::new(),
        })
        .collect()
}

fn not_found(what: &str) -> MirrorError {
    MirrorError::NotFound(what.to_string())
}

/// Refuse a payment that would push the participant's or the event's
/// running total past `i64::MAX`.
fn check_running_totals(
    event: &LocalEvent,
    participant: &LocalParticipant,
    amount: i64,
) -> Result<()> {
    let event_total = settlement::total_paid(
        event
            .participants
            .iter()
            .flat_map(|participant| participant.payments.iter().map(|payment| payment.amount)),
    )?;
    let participant_total = participant.total_paid()?;

    if participant_total.checked_add(amount).is_none() || event_total.checked_add(amount).is_none()
    {
        return Err(EngineError::InvalidInput(
            "amount would push the collected total past the maximum".to_string(),
        )
        .into());
    }
    Ok(())
}

/// Check the shape of an import document, element by element.
fn validate_import(value: &Value) -> Result<()> {
    let items = value
        .as_array()
        .ok_or_else(|| MirrorError::InvalidImport("expected a JSON array".to_string()))?;

    for (index, item) in items.iter().enumerate() {
        let non_empty = |key: &str| {
            item.get(key)
                .and_then(Value::as_str)
                .is_some_and(|value| !value.is_empty())
        };
        if !non_empty("id") {
            return Err(MirrorError::InvalidImport(format!(
                "event #{index} has no id"
            )));
        }
        if !non_empty("name") {
            return Err(MirrorError::InvalidImport(format!(
                "event #{index} has no name"
            )));
        }
        if !item.get("totalAmount").is_some_and(Value::is_number) {
            return Err(MirrorError::InvalidImport(format!(
                "event #{index} has no numeric totalAmount"
            )));
        }
    }
    Ok(())
}

/// Local store of events, participants and payments.
///
/// The whole collection is read from and written back to the [`Storage`]
/// on every operation; there is no cache.
#[derive(Debug)]
pub struct Mirror<S> {
    storage: S,
}

impl<S: Storage> Mirror<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn read(&self) -> Result<Vec<LocalEvent>> {
        let Some(document) = self.storage.load()? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&document) {
            Ok(events) => Ok(events),
            Err(err) => {
                tracing::error!("failed to load stored events, starting empty: {err}");
                Ok(Vec::new())
            }
        }
    }

    fn write(&mut self, events: &[LocalEvent]) -> Result<()> {
        let document = serde_json::to_string(events)?;
        self.storage.save(&document)?;
        Ok(())
    }

    /// Every event, in insertion order.
    pub fn events(&self) -> Result<Vec<LocalEvent>> {
        self.read()
    }

    /// The `limit` most recently created events, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<LocalEvent>> {
        let mut events = self.read()?;
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        events.truncate(limit);
        Ok(events)
    }

    pub fn event(&self, event_id: &str) -> Result<LocalEvent> {
        self.read()?
            .into_iter()
            .find(|event| event.id == event_id)
            .ok_or_else(|| not_found("event"))
    }

    pub fn create_event<N: AsRef<str>>(
        &mut self,
        name: &str,
        total_amount: i64,
        participant_names: &[N],
    ) -> Result<LocalEvent> {
        let draft = EventDraft::new(name, total_amount, participant_names)?;
        let now = Utc::now();
        let event = LocalEvent {
            id: new_id(),
            name: draft.name,
            total_amount: draft.total_amount,
            created_at: now,
            updated_at: now,
            participants: roster(draft.participant_names),
        };

        let mut events = self.read()?;
        events.push(event.clone());
        self.write(&events)?;
        tracing::debug!("created local event {}", event.id);
        Ok(event)
    }

    pub fn update_event(&mut self, event_id: &str, patch: EventPatch) -> Result<LocalEvent> {
        // Validate everything before touching the stored event.
        let name = patch
            .name
            .as_deref()
            .map(EventDraft::validate_name)
            .transpose()?;
        let total_amount = patch
            .total_amount
            .map(EventDraft::validate_total_amount)
            .transpose()?;
        let participant_names = patch
            .participant_names
            .as_deref()
            .map(EventDraft::validate_participant_names)
            .transpose()?;

        let mut events = self.read()?;
        let event = events
            .iter_mut()
            .find(|event| event.id == event_id)
            .ok_or_else(|| not_found("event"))?;

        if let Some(name) = name {
            event.name = name;
        }
        if let Some(total_amount) = total_amount {
            event.total_amount = total_amount;
        }
        if let Some(names) = participant_names {
            event.participants = roster(names);
        }
        event.updated_at = Utc::now();

        let event = event.clone();
        self.write(&events)?;
        Ok(event)
    }

    pub fn delete_event(&mut self, event_id: &str) -> Result<()> {
        let mut events = self.read()?;
        let before = events.len();
        events.retain(|event| event.id != event_id);
        if events.len() == before {
            return Err(not_found("event"));
        }
        self.write(&events)
    }

    fn record_payment(
        &mut self,
        event_id: &str,
        participant_id: &str,
        amount: impl FnOnce(&LocalEvent, &LocalParticipant) -> Result<i64>,
    ) -> Result<LocalPayment> {
        let mut events = self.read()?;
        let event = events
            .iter_mut()
            .find(|event| event.id == event_id)
            .ok_or_else(|| not_found("event"))?;
        let participant = event
            .participant(participant_id)
            .ok_or_else(|| not_found("participant"))?;
        let amount = amount(event, participant)?;
        check_running_totals(event, participant, amount)?;

        let now = Utc::now();
        let payment = LocalPayment {
            id: new_id(),
            amount,
            created_at: now,
            participant_id: participant_id.to_string(),
        };
        event
            .participant_mut(participant_id)
            .ok_or_else(|| not_found("participant"))?
            .payments
            .push(payment.clone());
        event.updated_at = now;

        self.write(&events)?;
        Ok(payment)
    }

    pub fn add_payment(
        &mut self,
        event_id: &str,
        participant_id: &str,
        amount: i64,
    ) -> Result<LocalPayment> {
        let amount = Payment::validate_amount(amount)?;
        self.record_payment(event_id, participant_id, |_, _| Ok(amount))
    }

    /// Record whatever the participant still owes.
    pub fn quick_pay(&mut self, event_id: &str, participant_id: &str) -> Result<LocalPayment> {
        self.record_payment(event_id, participant_id, |event, participant| {
            let share = settlement::expected_share(event.total_amount, event.participants.len())?;
            Ok(settlement::quick_pay_amount(share, participant.total_paid()?)?)
        })
    }

    pub fn delete_payment(
        &mut self,
        event_id: &str,
        participant_id: &str,
        payment_id: &str,
    ) -> Result<()> {
        let mut events = self.read()?;
        let event = events
            .iter_mut()
            .find(|event| event.id == event_id)
            .ok_or_else(|| not_found("event"))?;
        let participant = event
            .participant_mut(participant_id)
            .ok_or_else(|| not_found("participant"))?;

        let before = participant.payments.len();
        participant.payments.retain(|payment| payment.id != payment_id);
        if participant.payments.len() == before {
            return Err(not_found("payment"));
        }
        event.updated_at = Utc::now();

        self.write(&events)
    }

    /// Find the event and participant a payment belongs to.
    pub fn locate_payment(&self, payment_id: &str) -> Result<PaymentLocation> {
        self.read()?
            .iter()
            .find_map(|event| {
                event.participants.iter().find_map(|participant| {
                    participant
                        .payments
                        .iter()
                        .any(|payment| payment.id == payment_id)
                        .then(|| PaymentLocation {
                            event_id: event.id.clone(),
                            participant_id: participant.id.clone(),
                        })
                })
            })
            .ok_or_else(|| not_found("payment"))
    }

    pub fn settlement(&self, event_id: &str) -> Result<Settlement> {
        Ok(self.event(event_id)?.settlement()?)
    }

    /// The whole store as pretty-printed JSON.
    pub fn export(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.read()?)?)
    }

    /// Replace the whole store with `text`. Returns the number of events.
    ///
    /// Nothing is written unless every element is valid.
    pub fn import(&mut self, text: &str) -> Result<usize> {
        let value: Value = serde_json::from_str(text)
            .map_err(|err| MirrorError::InvalidImport(err.to_string()))?;
        validate_import(&value)?;
        let mut events: Vec<LocalEvent> = serde_json::from_value(value)
            .map_err(|err| MirrorError::InvalidImport(err.to_string()))?;
        for event in &mut events {
            event.relink_payments();
        }

        self.write(&events)?;
        tracing::info!("imported {} local events", events.len());
        Ok(events.len())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.storage.clear()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;

    fn mirror() -> Mirror<MemoryStorage> {
        Mirror::new(MemoryStorage::default())
    }

    #[test]
    fn backup_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(backup_file_name(date), "whopaid-backup-2024-03-07.json");
    }

    #[test]
    fn create_validates_and_trims() {
        let mut mirror = mirror();

        let event = mirror.create_event(" BBQ ", 10_000, &[" A", "B "]).unwrap();
        assert_eq!(event.name, "BBQ");
        assert_eq!(event.participants[0].name, "A");
        assert_eq!(event.participants[1].name, "B");
        assert_eq!(event.created_at, event.updated_at);

        assert!(matches!(
            mirror.create_event("BBQ", 0, &["A"]),
            Err(MirrorError::Engine(EngineError::InvalidInput(_)))
        ));
        assert_eq!(mirror.events().unwrap().len(), 1);
    }

    #[test]
    fn patch_keeps_payments_unless_roster_changes() {
        let mut mirror = mirror();
        let event = mirror.create_event("Trip", 9_000, &["A", "B"]).unwrap();
        let a = event.participants[0].id.clone();
        mirror.add_payment(&event.id, &a, 1_000).unwrap();

        let renamed = mirror
            .update_event(
                &event.id,
                EventPatch {
                    name: Some("Trip 2".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "Trip 2");
        assert_eq!(renamed.participants[0].payments.len(), 1);

        let replaced = mirror
            .update_event(
                &event.id,
                EventPatch {
                    participant_names: Some(vec!["A".to_string(), "C".to_string()]),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(replaced.payments().is_empty());
        assert_ne!(replaced.participants[0].id, a);

        let err = mirror
            .update_event(
                &event.id,
                EventPatch {
                    total_amount: Some(-1),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, MirrorError::Engine(EngineError::InvalidInput(_))));
        assert_eq!(mirror.event(&event.id).unwrap().total_amount, 9_000);
    }

    #[test]
    fn quick_pay_follows_settlement() {
        let mut mirror = mirror();
        let event = mirror.create_event("Dinner", 10_000, &["A", "B", "C"]).unwrap();
        let a = event.participants[0].id.clone();
        let b = event.participants[1].id.clone();

        mirror.add_payment(&event.id, &a, 3_334).unwrap();
        let quick = mirror.quick_pay(&event.id, &b).unwrap();
        assert_eq!(quick.amount, 3_334);
        assert!(matches!(
            mirror.quick_pay(&event.id, &b),
            Err(MirrorError::Engine(EngineError::AlreadyPaid(_)))
        ));

        let settlement = mirror.settlement(&event.id).unwrap();
        assert_eq!(settlement.remaining, 3_332);
        assert_eq!(settlement.paid_participants, 2);
    }

    #[test]
    fn payments_bump_updated_at_and_delete_once() {
        let mut mirror = mirror();
        let event = mirror.create_event("Trip", 100, &["A"]).unwrap();
        let a = event.participants[0].id.clone();

        let payment = mirror.add_payment(&event.id, &a, 40).unwrap();
        let stored = mirror.event(&event.id).unwrap();
        assert!(stored.updated_at >= event.updated_at);
        assert_eq!(stored.updated_at, payment.created_at);

        let location = mirror.locate_payment(&payment.id).unwrap();
        assert_eq!(location.event_id, event.id);
        assert_eq!(location.participant_id, a);

        mirror.delete_payment(&event.id, &a, &payment.id).unwrap();
        assert!(matches!(
            mirror.delete_payment(&event.id, &a, &payment.id),
            Err(MirrorError::NotFound(_))
        ));
        assert!(matches!(
            mirror.locate_payment(&payment.id),
            Err(MirrorError::NotFound(_))
        ));
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut mirror = mirror();
        let event = mirror.create_event("Trip", 100, &["A"]).unwrap();

        assert!(matches!(mirror.event("nope"), Err(MirrorError::NotFound(_))));
        assert!(matches!(
            mirror.add_payment(&event.id, "nope", 10),
            Err(MirrorError::NotFound(_))
        ));
        assert!(matches!(
            mirror.add_payment(&event.id, &event.participants[0].id, 0),
            Err(MirrorError::Engine(EngineError::InvalidInput(_)))
        ));
        mirror.delete_event(&event.id).unwrap();
        assert!(matches!(
            mirror.delete_event(&event.id),
            Err(MirrorError::NotFound(_))
        ));
    }

    #[test]
    fn payments_cannot_push_totals_past_i64() {
        let mut mirror = mirror();
        let event = mirror.create_event("Coffee", 100, &["A", "B"]).unwrap();
        let a = event.participants[0].id.clone();
        let b = event.participants[1].id.clone();

        mirror.add_payment(&event.id, &a, i64::MAX).unwrap();
        for err in [
            mirror.add_payment(&event.id, &a, 1).unwrap_err(),
            mirror.add_payment(&event.id, &b, 1).unwrap_err(),
            mirror.quick_pay(&event.id, &b).unwrap_err(),
        ] {
            assert!(matches!(err, MirrorError::Engine(EngineError::InvalidInput(_))));
        }

        let settlement = mirror.settlement(&event.id).unwrap();
        assert_eq!(settlement.total_collected, i64::MAX);
        assert_eq!(mirror.event(&event.id).unwrap().payments().len(), 1);
    }

    #[test]
    fn imported_totals_past_i64_are_a_data_error() {
        let mut mirror = mirror();
        let count = mirror
            .import(
                r#"[{"id":"e","name":"X","totalAmount":100,"participants":[
                    {"id":"a","name":"A","payments":[
                        {"id":"p1","amount":9223372036854775807},
                        {"id":"p2","amount":1}
                    ]}
                ]}]"#,
            )
            .unwrap();
        assert_eq!(count, 1);

        assert!(matches!(
            mirror.settlement("e"),
            Err(MirrorError::Engine(EngineError::Overflow(_)))
        ));
        let event = mirror.event("e").unwrap();
        assert!(matches!(
            event.participants[0].total_paid(),
            Err(EngineError::Overflow(_))
        ));
        assert!(matches!(
            mirror.quick_pay("e", "a"),
            Err(MirrorError::Engine(EngineError::Overflow(_)))
        ));
        // Reads still work.
        assert_eq!(mirror.events().unwrap().len(), 1);
    }

    #[test]
    fn corrupt_document_reads_as_empty() {
        let mirror = Mirror::new(MemoryStorage::with_document("{oops"));
        assert!(mirror.events().unwrap().is_empty());
    }

    #[test]
    fn import_is_all_or_nothing() {
        let mut mirror = mirror();
        mirror.create_event("Keep", 100, &["A"]).unwrap();

        for bad in [
            "not json",
            r#"{"id":"e1"}"#,
            r#"[{"id":"e1","name":"Trip","totalAmount":100},{"id":"","name":"X","totalAmount":1}]"#,
            r#"[{"id":"e1","name":"","totalAmount":100}]"#,
            r#"[{"id":"e1","name":"Trip","totalAmount":"100"}]"#,
            r#"[{"id":"e1","name":"Trip","totalAmount":100.5}]"#,
        ] {
            assert!(
                matches!(mirror.import(bad), Err(MirrorError::InvalidImport(_))),
                "{bad}"
            );
        }
        assert_eq!(mirror.events().unwrap()[0].name, "Keep");

        let count = mirror
            .import(r#"[{"id":"legacy-1","name":"Old","totalAmount":300,"participants":[{"id":"x","name":"X","payments":[{"id":"p","amount":100}]}]}]"#)
            .unwrap();
        assert_eq!(count, 1);
        let event = mirror.event("legacy-1").unwrap();
        assert_eq!(event.participants[0].payments[0].participant_id, "x");
        assert_eq!(mirror.locate_payment("p").unwrap().participant_id, "x");
    }

    #[test]
    fn export_then_clear() {
        let mut mirror = mirror();
        let event = mirror.create_event("Trip", 100, &["A"]).unwrap();

        let exported = mirror.export().unwrap();
        assert!(exported.contains("\n"));
        assert!(exported.contains("\"totalAmount\": 100"));

        mirror.clear().unwrap();
        assert!(mirror.events().unwrap().is_empty());

        mirror.import(&exported).unwrap();
        assert_eq!(mirror.event(&event.id).unwrap(), event);
    }
}
