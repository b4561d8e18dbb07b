use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Plain `{ "message": ... }` acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod event {
    use super::*;

    use crate::payment::PaymentView;

    /// Request body for creating or replacing an event.
    ///
    /// Fields default to empty so that missing values are reported as
    /// validation errors instead of decode failures.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EventNew {
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub total_amount: i64,
        #[serde(default)]
        pub participant_names: Vec<String>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EventView {
        pub id: String,
        pub name: String,
        pub total_amount: i64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub participants: Vec<ParticipantView>,
        /// Every payment of the event, newest first.
        #[serde(default)]
        pub payments: Vec<PaymentView>,
        /// `None` when the event has no participants.
        #[serde(default)]
        pub settlement: Option<SettlementView>,
    }

    impl EventView {
        pub fn participant(&self, participant_id: &str) -> Option<&ParticipantView> {
            self.participants.iter().find(|p| p.id == participant_id)
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ParticipantView {
        pub id: String,
        pub name: String,
        pub event_id: String,
        /// Payments of the participant, oldest first.
        #[serde(default)]
        pub payments: Vec<PaymentView>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SettlementView {
        pub expected_share: i64,
        pub total_collected: i64,
        pub remaining: i64,
        pub paid_participants: usize,
        pub is_settled: bool,
        pub participants: Vec<ParticipantStatusView>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ParticipantStatusView {
        pub participant_id: String,
        pub name: String,
        pub total_paid: i64,
        pub expected_share: i64,
        pub outstanding: i64,
        pub is_paid_in_full: bool,
    }
}

pub mod payment {
    use super::*;

    /// Request body for a manual payment.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaymentNew {
        #[serde(default)]
        pub event_id: String,
        #[serde(default)]
        pub participant_id: String,
        #[serde(default)]
        pub amount: i64,
    }

    /// Request body for a quick-pay.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QuickPay {
        #[serde(default)]
        pub event_id: String,
        #[serde(default)]
        pub participant_id: String,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaymentView {
        pub id: String,
        pub amount: i64,
        pub created_at: DateTime<Utc>,
        pub event_id: String,
        pub participant_id: String,
        /// Set on flat payment lists and on created payments.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub participant: Option<ParticipantRef>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ParticipantRef {
        pub id: String,
        pub name: String,
        pub event_id: String,
    }
}

#[cfg(test)]
mod tests {
    use super::event::EventNew;
    use super::payment::PaymentNew;

    #[test]
    fn request_bodies_use_camel_case() {
        let body: EventNew = serde_json::from_str(
            r#"{"name":"BBQ","totalAmount":10000,"participantNames":["A","B"]}"#,
        )
        .unwrap();
        assert_eq!(body.total_amount, 10_000);
        assert_eq!(body.participant_names, vec!["A", "B"]);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let body: PaymentNew = serde_json::from_str(r#"{"eventId":"e"}"#).unwrap();
        assert_eq!(body.event_id, "e");
        assert!(body.participant_id.is_empty());
        assert_eq!(body.amount, 0);
    }
}
