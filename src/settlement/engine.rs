//! Debt minimization: net balances and the greedy transfer plan

use bigdecimal::BigDecimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::SettlementPolicy;
use crate::settlement::splits::round_money;
use crate::types::*;

/// Ordering used for both debtors and creditors: largest outstanding amount
/// first, ties broken by ascending member id.
pub fn largest_first(a: &(MemberId, BigDecimal), b: &(MemberId, BigDecimal)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Settlement engine over immutable expense snapshots
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    policy: SettlementPolicy,
}

impl SettlementEngine {
    /// Build an engine, rejecting a non-positive tolerance or negative scale
    pub fn new(policy: SettlementPolicy) -> PlanResult<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &SettlementPolicy {
        &self.policy
    }

    /// Net balance per member: total paid minus total owed.
    ///
    /// Members are keyed in ascending id order.
    pub fn balances(&self, expenses: &[Expense]) -> BTreeMap<MemberId, BigDecimal> {
        let mut balances: BTreeMap<MemberId, BigDecimal> = BTreeMap::new();

        for expense in expenses {
            *balances
                .entry(expense.paid_by)
                .or_insert_with(|| BigDecimal::from(0)) += &expense.total_amount;
            for split in &expense.splits {
                *balances
                    .entry(split.user_id)
                    .or_insert_with(|| BigDecimal::from(0)) -= &split.amount;
            }
        }

        balances
    }

    /// Greedily pair the largest debtor with the largest creditor until one
    /// side runs out. Produces at most `debtors + creditors - 1` transfers.
    pub fn settle_balances(&self, balances: &BTreeMap<MemberId, BigDecimal>) -> Vec<Transfer> {
        let tolerance = &self.policy.tolerance;
        let negative_tolerance = -tolerance.clone();
        let zero = BigDecimal::from(0);

        let mut debtors: Vec<(MemberId, BigDecimal)> = balances
            .iter()
            .filter(|(_, balance)| **balance < negative_tolerance)
            .map(|(id, balance)| (*id, balance.abs()))
            .collect();
        let mut creditors: Vec<(MemberId, BigDecimal)> = balances
            .iter()
            .filter(|(_, balance)| *balance > tolerance)
            .map(|(id, balance)| (*id, balance.clone()))
            .collect();

        debtors.sort_by(largest_first);
        creditors.sort_by(largest_first);

        let mut transfers = Vec::new();
        let (mut di, mut ci) = (0, 0);

        while di < debtors.len() && ci < creditors.len() {
            let amount = std::cmp::min(debtors[di].1.clone(), creditors[ci].1.clone());

            transfers.push(Transfer {
                from_user: debtors[di].0,
                to_user: creditors[ci].0,
                amount: round_money(&amount, self.policy.scale),
            });

            debtors[di].1 -= &amount;
            creditors[ci].1 -= &amount;

            // A side at exactly zero is done even if the tolerance is zero.
            if debtors[di].1 <= zero || debtors[di].1 < *tolerance {
                di += 1;
            }
            if creditors[ci].1 <= zero || creditors[ci].1 < *tolerance {
                ci += 1;
            }
        }

        transfers
    }

    /// Transfers that zero every member's balance for the given expenses
    pub fn compute_settlement(&self, expenses: &[Expense]) -> Vec<Transfer> {
        self.settle_balances(&self.balances(expenses))
    }

    /// Balances and transfers for one plan's expenses
    pub fn summarize(&self, plan_id: PlanId, expenses: &[Expense]) -> SettlementSummary {
        let balances = self.balances(expenses);
        let transfers = self.settle_balances(&balances);

        SettlementSummary {
            plan_id,
            balances: balances
                .into_iter()
                .map(|(user_id, balance)| MemberBalance { user_id, balance })
                .collect(),
            transfers,
        }
    }
}

/// Settle a list of expenses with the default policy
pub fn compute_settlement(expenses: &[Expense]) -> Vec<Transfer> {
    SettlementEngine::default().compute_settlement(expenses)
}
