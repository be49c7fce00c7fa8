//! Split computation: turning an expense total into per-participant shares

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SettlementPolicy;
use crate::types::*;

/// Round a monetary value to `scale` decimal places, half to even
pub fn round_money(value: &BigDecimal, scale: i64) -> BigDecimal {
    value.with_scale_round(scale, RoundingMode::HalfEven)
}

/// One participant's computed share, before it becomes an [`ExpenseSplit`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitShare {
    pub user_id: MemberId,
    pub amount: BigDecimal,
    /// The payer's own share starts out paid
    pub is_paid: bool,
}

/// Compute each participant's owed amount for an expense.
///
/// Rounded shares are stored as-is; their sum may drift from the total by up
/// to half a cent per participant.
pub fn compute_splits(
    total_amount: &BigDecimal,
    paid_by: MemberId,
    split_type: SplitType,
    participants: &[Participant],
    policy: &SettlementPolicy,
) -> PlanResult<Vec<SplitShare>> {
    if *total_amount <= BigDecimal::from(0) {
        return Err(PlanError::InvalidExpense(format!(
            "Total amount must be positive, got {total_amount}"
        )));
    }
    if participants.is_empty() {
        return Err(PlanError::InvalidSplit(
            "An expense needs at least one participant".to_string(),
        ));
    }
    for participant in participants {
        if participant
            .percentage
            .as_ref()
            .is_some_and(|p| *p < BigDecimal::from(0))
        {
            return Err(PlanError::InvalidSplit(format!(
                "Negative percentage for user {}",
                participant.user_id
            )));
        }
        if participant
            .amount
            .as_ref()
            .is_some_and(|a| *a < BigDecimal::from(0))
        {
            return Err(PlanError::InvalidSplit(format!(
                "Negative amount for user {}",
                participant.user_id
            )));
        }
    }

    let n = BigDecimal::from(participants.len() as u64);
    let hundred = BigDecimal::from(100);

    let shares = participants
        .iter()
        .map(|p| {
            let amount = match split_type {
                SplitType::Equal => round_money(&(total_amount / &n), policy.scale),
                SplitType::ByPercentage => {
                    let percentage = p.percentage.clone().unwrap_or_else(|| &hundred / &n);
                    round_money(&((total_amount * &percentage) / &hundred), policy.scale)
                }
                SplitType::OnePays => {
                    if p.user_id == paid_by || participants.len() < 2 {
                        BigDecimal::from(0)
                    } else {
                        let others = BigDecimal::from(participants.len() as u64 - 1);
                        round_money(&(total_amount / others), policy.scale)
                    }
                }
                SplitType::ByItem => p.amount.clone().unwrap_or_else(|| total_amount / &n),
            };
            SplitShare {
                user_id: p.user_id,
                amount,
                is_paid: p.user_id == paid_by,
            }
        })
        .collect();

    Ok(shares)
}

/// Builder for recording an expense with its computed splits
#[derive(Debug)]
pub struct ExpenseBuilder {
    draft: ExpenseDraft,
    policy: SettlementPolicy,
}

impl ExpenseBuilder {
    /// Start an expense paid in full by `paid_by`
    pub fn new(
        plan_id: PlanId,
        description: String,
        total_amount: BigDecimal,
        paid_by: MemberId,
    ) -> Self {
        Self::from_draft(ExpenseDraft {
            plan_id,
            description,
            total_amount,
            paid_by,
            split_type: SplitType::default(),
            participants: Vec::new(),
        })
    }

    /// Continue from an already assembled draft
    pub fn from_draft(draft: ExpenseDraft) -> Self {
        Self {
            draft,
            policy: SettlementPolicy::default(),
        }
    }

    pub fn split_type(mut self, split_type: SplitType) -> Self {
        self.draft.split_type = split_type;
        self
    }

    pub fn policy(mut self, policy: SettlementPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn participant(mut self, user_id: MemberId) -> Self {
        self.draft.participants.push(Participant::new(user_id));
        self
    }

    pub fn participant_with_percentage(mut self, user_id: MemberId, percentage: BigDecimal) -> Self {
        self.draft
            .participants
            .push(Participant::with_percentage(user_id, percentage));
        self
    }

    pub fn participant_with_amount(mut self, user_id: MemberId, amount: BigDecimal) -> Self {
        self.draft
            .participants
            .push(Participant::with_amount(user_id, amount));
        self
    }

    /// Compute the splits and produce the expense record
    pub fn build(self) -> PlanResult<Expense> {
        self.policy.validate()?;
        let draft = self.draft;
        let shares = compute_splits(
            &draft.total_amount,
            draft.paid_by,
            draft.split_type,
            &draft.participants,
            &self.policy,
        )?;

        let expense_id = Uuid::new_v4();
        let splits = shares
            .into_iter()
            .map(|share| ExpenseSplit {
                id: Uuid::new_v4(),
                expense_id,
                user_id: share.user_id,
                amount: share.amount,
                is_paid: share.is_paid,
            })
            .collect();

        Ok(Expense {
            id: expense_id,
            plan_id: draft.plan_id,
            description: draft.description,
            total_amount: draft.total_amount,
            paid_by: draft.paid_by,
            split_type: draft.split_type,
            splits,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn people(ids: &[MemberId]) -> Vec<Participant> {
        ids.iter().copied().map(Participant::new).collect()
    }

    fn amounts(shares: &[SplitShare]) -> Vec<BigDecimal> {
        shares.iter().map(|s| s.amount.clone()).collect()
    }

    #[test]
    fn test_equal_split() {
        let shares = compute_splits(
            &dec("90.00"),
            1,
            SplitType::Equal,
            &people(&[1, 2, 3]),
            &SettlementPolicy::default(),
        )
        .unwrap();

        assert_eq!(amounts(&shares), vec![dec("30"), dec("30"), dec("30")]);
        assert!(shares[0].is_paid);
        assert!(!shares[1].is_paid);
        assert!(!shares[2].is_paid);
    }

    #[test]
    fn test_equal_split_keeps_rounding_drift() {
        let shares = compute_splits(
            &dec("100"),
            1,
            SplitType::Equal,
            &people(&[1, 2, 3]),
            &SettlementPolicy::default(),
        )
        .unwrap();

        assert_eq!(amounts(&shares), vec![dec("33.33"); 3]);
        let sum: BigDecimal = shares.iter().map(|s| &s.amount).sum();
        assert_eq!(sum, dec("99.99"));
    }

    #[test]
    fn test_percentage_split_with_default_share() {
        let participants = vec![
            Participant::with_percentage(1, dec("50")),
            Participant::with_percentage(2, dec("25")),
            Participant::new(3),
            Participant::new(4),
        ];
        let shares = compute_splits(
            &dec("200"),
            1,
            SplitType::ByPercentage,
            &participants,
            &SettlementPolicy::default(),
        )
        .unwrap();

        // Members without an explicit percentage default to 100 / n = 25%.
        assert_eq!(
            amounts(&shares),
            vec![dec("100"), dec("50"), dec("50"), dec("50")]
        );
    }

    #[test]
    fn test_one_pays() {
        let shares = compute_splits(
            &dec("30"),
            1,
            SplitType::OnePays,
            &people(&[1, 2]),
            &SettlementPolicy::default(),
        )
        .unwrap();
        assert_eq!(amounts(&shares), vec![dec("0"), dec("30")]);

        let shares = compute_splits(
            &dec("10"),
            1,
            SplitType::OnePays,
            &people(&[1, 2, 3, 4]),
            &SettlementPolicy::default(),
        )
        .unwrap();
        assert_eq!(
            amounts(&shares),
            vec![dec("0"), dec("3.33"), dec("3.33"), dec("3.33")]
        );
    }

    #[test]
    fn test_one_pays_single_participant_owes_nothing() {
        let shares = compute_splits(
            &dec("45"),
            7,
            SplitType::OnePays,
            &people(&[7]),
            &SettlementPolicy::default(),
        )
        .unwrap();
        assert_eq!(amounts(&shares), vec![dec("0")]);
    }

    #[test]
    fn test_by_item_explicit_and_fallback() {
        let participants = vec![
            Participant::with_amount(1, dec("12.50")),
            Participant::new(2),
        ];
        let shares = compute_splits(
            &dec("30"),
            1,
            SplitType::ByItem,
            &participants,
            &SettlementPolicy::default(),
        )
        .unwrap();
        assert_eq!(amounts(&shares), vec![dec("12.50"), dec("15")]);
    }

    #[test]
    fn test_by_item_fallback_is_unrounded() {
        let shares = compute_splits(
            &dec("10"),
            1,
            SplitType::ByItem,
            &people(&[1, 2, 3]),
            &SettlementPolicy::default(),
        )
        .unwrap();
        assert!(shares[0].amount > dec("3.333"));
        assert!(shares[0].amount < dec("3.334"));
    }

    #[test]
    fn test_rejects_invalid_input() {
        let policy = SettlementPolicy::default();

        let err = compute_splits(&dec("10"), 1, SplitType::Equal, &[], &policy).unwrap_err();
        assert!(matches!(err, PlanError::InvalidSplit(_)));

        let err = compute_splits(&dec("-5"), 1, SplitType::Equal, &people(&[1]), &policy)
            .unwrap_err();
        assert!(matches!(err, PlanError::InvalidExpense(_)));

        let err =
            compute_splits(&dec("0"), 1, SplitType::Equal, &people(&[1]), &policy).unwrap_err();
        assert!(matches!(err, PlanError::InvalidExpense(_)));

        let bad = vec![Participant::with_amount(2, dec("-1"))];
        let err = compute_splits(&dec("10"), 1, SplitType::ByItem, &bad, &policy).unwrap_err();
        assert!(matches!(err, PlanError::InvalidSplit(_)));
    }

    #[test]
    fn test_builder_links_splits_to_expense() {
        let expense = ExpenseBuilder::new(3, "Dinner".to_string(), dec("90.00"), 1)
            .participant(1)
            .participant(2)
            .participant(3)
            .build()
            .unwrap();

        assert_eq!(expense.split_type, SplitType::Equal);
        assert_eq!(expense.splits.len(), 3);
        assert!(expense.splits.iter().all(|s| s.expense_id == expense.id));
        assert_eq!(expense.split_total(), dec("90"));
    }
}
