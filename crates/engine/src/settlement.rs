//! Cost splitting and payment settlement.
//!
//! Every participant owes `ceil(total_amount / participant_count)`. The
//! rounding remainder is pushed onto the payers, so the shares may add up to
//! slightly more than the event total. Nothing here is clamped: an overpaid
//! event reports a negative `remaining`.
//!
//! The functions are storage agnostic. Callers pass the payment amounts of
//! each participant, in roster order, and get the statuses back in the same
//! order.
//!
//! Sums use checked arithmetic; totals that do not fit an `i64` are reported
//! as [`EngineError::Overflow`].
//!
//! ```rust
//! use engine::settlement;
//!
//! let settlement = settlement::settle(10_000, [vec![3_334], vec![], vec![]]).unwrap();
//! assert_eq!(settlement.expected_share, 3_334);
//! assert!(settlement.participants[0].is_paid_in_full);
//! assert_eq!(settlement.remaining, 6_666);
//! ```

use crate::{EngineError, ResultEngine};

/// Settlement status of one participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticipantShare {
    pub total_paid: i64,
    pub expected_share: i64,
    /// `expected_share - total_paid`; negative when overpaid.
    pub outstanding: i64,
    pub is_paid_in_full: bool,
}

/// Settlement status of a whole event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub total_amount: i64,
    pub expected_share: i64,
    pub total_collected: i64,
    /// `total_amount - total_collected`; negative when overpaid.
    pub remaining: i64,
    /// Participants that paid anything at all.
    pub paid_participants: usize,
    pub participants: Vec<ParticipantShare>,
}

impl Settlement {
    /// `true` once the collected amount matches the total exactly.
    pub fn is_settled(&self) -> bool {
        self.remaining == 0
    }
}

/// Per-participant obligation: `ceil(total_amount / participant_count)`.
///
/// An empty roster has no defined share and is reported as a data error.
pub fn expected_share(total_amount: i64, participant_count: usize) -> ResultEngine<i64> {
    if participant_count == 0 {
        return Err(EngineError::NoParticipants(
            "event has no participants".to_string(),
        ));
    }
    let count = i64::try_from(participant_count)
        .map_err(|_| EngineError::InvalidInput("too many participants".to_string()))?;

    let quotient = total_amount / count;
    if total_amount % count > 0 {
        Ok(quotient + 1)
    } else {
        Ok(quotient)
    }
}

fn overflow() -> EngineError {
    EngineError::Overflow("amount total does not fit in i64".to_string())
}

/// Sum of a participant's payments.
pub fn total_paid<I>(amounts: I) -> ResultEngine<i64>
where
    I: IntoIterator<Item = i64>,
{
    amounts
        .into_iter()
        .try_fold(0_i64, |total, amount| total.checked_add(amount))
        .ok_or_else(overflow)
}

/// Amount a quick-pay must record to settle a participant.
///
/// Fails with [`EngineError::AlreadyPaid`] when nothing is left to pay.
pub fn quick_pay_amount(expected_share: i64, total_paid: i64) -> ResultEngine<i64> {
    let remaining = expected_share.checked_sub(total_paid).ok_or_else(overflow)?;
    if remaining <= 0 {
        return Err(EngineError::AlreadyPaid(
            "participant already paid in full".to_string(),
        ));
    }
    Ok(remaining)
}

/// Compute the settlement of an event.
///
/// `participants` yields, for every participant in roster order, the amounts
/// of their payments.
pub fn settle<P, I>(total_amount: i64, participants: P) -> ResultEngine<Settlement>
where
    P: IntoIterator<Item = I>,
    I: IntoIterator<Item = i64>,
{
    let paid = participants
        .into_iter()
        .map(total_paid)
        .collect::<ResultEngine<Vec<i64>>>()?;
    let expected_share = expected_share(total_amount, paid.len())?;

    let participants = paid
        .iter()
        .map(|&total_paid| {
            Ok(ParticipantShare {
                total_paid,
                expected_share,
                outstanding: expected_share.checked_sub(total_paid).ok_or_else(overflow)?,
                is_paid_in_full: total_paid >= expected_share,
            })
        })
        .collect::<ResultEngine<Vec<ParticipantShare>>>()?;

    let total_collected = total_paid(paid.iter().copied())?;
    Ok(Settlement {
        total_amount,
        expected_share,
        total_collected,
        remaining: total_amount
            .checked_sub(total_collected)
            .ok_or_else(overflow)?,
        paid_participants: paid.iter().filter(|&&amount| amount > 0).count(),
        participants,
    })
}
