//! Terminal rendering of events and payments.

use std::fmt::{self, Write};

use api_types::{event::EventView, payment::PaymentView};
use chrono::{DateTime, TimeZone};

/// Yen amount with thousands separators.
///
/// ```text
/// 10000 -> ¥10,000
/// -50   -> -¥50
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Yen(pub i64);

impl fmt::Display for Yen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (index, digit) in digits.chars().enumerate() {
            if index > 0 && (digits.len() - index) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        write!(f, "{sign}¥{grouped}")
    }
}

pub fn format_date<Tz>(value: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    value.format("%Y/%m/%d").to_string()
}

/// `paid in full` once nothing is left, `remaining ¥X` otherwise.
pub fn status_badge(event: &EventView) -> String {
    match &event.settlement {
        Some(settlement) if settlement.remaining == 0 => "paid in full".to_string(),
        Some(settlement) => format!("remaining {}", Yen(settlement.remaining)),
        None => "no participants".to_string(),
    }
}

pub fn render_list(events: &[EventView]) -> String {
    if events.is_empty() {
        return "No events yet.\n".to_string();
    }

    let mut out = String::new();
    for event in events {
        let paid = event
            .settlement
            .as_ref()
            .map_or(0, |settlement| settlement.paid_participants);
        let _ = writeln!(
            out,
            "{}  {}  {}  paid: {}/{}  [{}]",
            event.name,
            Yen(event.total_amount),
            format_date(&event.created_at),
            paid,
            event.participants.len(),
            status_badge(event),
        );
        let _ = writeln!(out, "  id: {}", event.id);
    }
    out
}

pub fn render_detail(event: &EventView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", event.name);
    let _ = writeln!(out, "  id:        {}", event.id);
    let _ = writeln!(out, "  created:   {}", format_date(&event.created_at));
    let _ = writeln!(out, "  total:     {}", Yen(event.total_amount));
    if let Some(settlement) = &event.settlement {
        let _ = writeln!(
            out,
            "  share:     {} per person",
            Yen(settlement.expected_share)
        );
        let _ = writeln!(out, "  collected: {}", Yen(settlement.total_collected));
    }
    let _ = writeln!(out, "  status:    {}", status_badge(event));

    let _ = writeln!(out, "\nParticipants");
    for participant in &event.participants {
        let status = event.settlement.as_ref().and_then(|settlement| {
            settlement
                .participants
                .iter()
                .find(|status| status.participant_id == participant.id)
        });
        match status {
            Some(status) => {
                let badge = if status.is_paid_in_full {
                    "paid in full".to_string()
                } else {
                    format!("owes {}", Yen(status.outstanding))
                };
                let _ = writeln!(
                    out,
                    "  {}  paid {} / {}  {}  ({})",
                    participant.name,
                    Yen(status.total_paid),
                    Yen(status.expected_share),
                    badge,
                    participant.id,
                );
            }
            None => {
                let _ = writeln!(out, "  {}  ({})", participant.name, participant.id);
            }
        }
    }

    let _ = writeln!(out, "\nPayments");
    if event.payments.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for payment in &event.payments {
        let _ = writeln!(out, "  {}", render_payment(payment));
    }
    out
}

pub fn render_payment(payment: &PaymentView) -> String {
    let who = payment
        .participant
        .as_ref()
        .map_or(payment.participant_id.as_str(), |participant| {
            participant.name.as_str()
        });
    format!(
        "{}  {}  {}  ({})",
        format_date(&payment.created_at),
        who,
        Yen(payment.amount),
        payment.id
    )
}

#[cfg(test)]
mod tests {
    use api_types::{
        event::{ParticipantStatusView, ParticipantView, SettlementView},
        payment::ParticipantRef,
    };
    use chrono::Utc;

    use super::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn event(remaining: i64) -> EventView {
        let participant = |id: &str, name: &str| ParticipantView {
            id: id.to_string(),
            name: name.to_string(),
            event_id: "e1".to_string(),
            payments: Vec::new(),
        };
        let status = |id: &str, name: &str, paid: i64| ParticipantStatusView {
            participant_id: id.to_string(),
            name: name.to_string(),
            total_paid: paid,
            expected_share: 3_334,
            outstanding: 3_334 - paid,
            is_paid_in_full: paid >= 3_334,
        };
        EventView {
            id: "e1".to_string(),
            name: "BBQ".to_string(),
            total_amount: 10_000,
            created_at: at(),
            updated_at: at(),
            participants: vec![participant("a", "Aki"), participant("b", "Ben")],
            payments: vec![PaymentView {
                id: "p1".to_string(),
                amount: 3_334,
                created_at: at(),
                event_id: "e1".to_string(),
                participant_id: "a".to_string(),
                participant: Some(ParticipantRef {
                    id: "a".to_string(),
                    name: "Aki".to_string(),
                    event_id: "e1".to_string(),
                }),
            }],
            settlement: Some(SettlementView {
                expected_share: 3_334,
                total_collected: 10_000 - remaining,
                remaining,
                paid_participants: 1,
                is_settled: remaining == 0,
                participants: vec![status("a", "Aki", 3_334), status("b", "Ben", 0)],
            }),
        }
    }

    #[test]
    fn yen_groups_thousands() {
        assert_eq!(Yen(0).to_string(), "¥0");
        assert_eq!(Yen(999).to_string(), "¥999");
        assert_eq!(Yen(1_000).to_string(), "¥1,000");
        assert_eq!(Yen(10_000).to_string(), "¥10,000");
        assert_eq!(Yen(1_234_567).to_string(), "¥1,234,567");
        assert_eq!(Yen(-50).to_string(), "-¥50");
        assert_eq!(Yen(-3_332).to_string(), "-¥3,332");
    }

    #[test]
    fn dates_use_slashes() {
        assert_eq!(format_date(&at()), "2024/05/01");
    }

    #[test]
    fn badge_depends_on_remaining() {
        assert_eq!(status_badge(&event(0)), "paid in full");
        assert_eq!(status_badge(&event(6_666)), "remaining ¥6,666");

        let mut empty = event(0);
        empty.settlement = None;
        assert_eq!(status_badge(&empty), "no participants");
    }

    #[test]
    fn list_line_shows_counter() {
        let out = render_list(&[event(6_666)]);
        assert!(out.starts_with("BBQ  ¥10,000  2024/05/01  paid: 1/2  [remaining ¥6,666]"));
        assert!(out.contains("id: e1"));
        assert_eq!(render_list(&[]), "No events yet.\n");
    }

    #[test]
    fn detail_lists_participants_and_payments() {
        let out = render_detail(&event(6_666));

        assert!(out.contains("share:     ¥3,334 per person"));
        assert!(out.contains("Aki  paid ¥3,334 / ¥3,334  paid in full  (a)"));
        assert!(out.contains("Ben  paid ¥0 / ¥3,334  owes ¥3,334  (b)"));
        assert!(out.contains("2024/05/01  Aki  ¥3,334  (p1)"));
    }
}
