//! Records of the mirror document.
//!
//! The document is one JSON array of events; participants are embedded in
//! their event and payments in their participant.

use chrono::{DateTime, Utc};
use engine::{ResultEngine, Settlement, settlement};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalEvent {
    pub id: String,
    pub name: String,
    pub total_amount: i64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub participants: Vec<LocalParticipant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalParticipant {
    pub id: String,
    pub name: String,
    /// Oldest first.
    #[serde(default)]
    pub payments: Vec<LocalPayment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalPayment {
    pub id: String,
    pub amount: i64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub participant_id: String,
}

impl LocalEvent {
    pub fn participant(&self, participant_id: &str) -> Option<&LocalParticipant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    pub(crate) fn participant_mut(&mut self, participant_id: &str) -> Option<&mut LocalParticipant> {
        self.participants.iter_mut().find(|p| p.id == participant_id)
    }

    pub fn settlement(&self) -> ResultEngine<Settlement> {
        settlement::settle(
            self.total_amount,
            self.participants
                .iter()
                .map(|participant| participant.payments.iter().map(|payment| payment.amount)),
        )
    }

    /// Every payment with its participant, newest first.
    pub fn payments(&self) -> Vec<(&LocalParticipant, &LocalPayment)> {
        let mut out: Vec<_> = self
            .participants
            .iter()
            .flat_map(|participant| {
                participant
                    .payments
                    .iter()
                    .map(move |payment| (participant, payment))
            })
            .collect();
        out.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));
        out
    }

    /// Point every payment at the participant that embeds it.
    pub(crate) fn relink_payments(&mut self) {
        for participant in &mut self.participants {
            for payment in &mut participant.payments {
                payment.participant_id = participant.id.clone();
            }
        }
    }
}

impl LocalParticipant {
    pub fn total_paid(&self) -> ResultEngine<i64> {
        settlement::total_paid(self.payments.iter().map(|payment| payment.amount))
    }
}
