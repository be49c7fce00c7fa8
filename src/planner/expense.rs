//! Expense recording and settlement backed by storage

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SettlementPolicy;
use crate::settlement::{ExpenseBuilder, SettlementEngine};
use crate::traits::*;
use crate::types::*;

/// Manager for a plan's shared expenses
pub struct ExpenseManager<S: PlanStorage> {
    storage: S,
    validator: Box<dyn ExpenseValidator>,
    engine: SettlementEngine,
}

impl<S: PlanStorage> ExpenseManager<S> {
    /// Create a new expense manager
    pub fn new(storage: S) -> Self {
        Self::with_validator(storage, Box::new(DefaultExpenseValidator))
    }

    /// Create a new expense manager with custom validator
    pub fn with_validator(storage: S, validator: Box<dyn ExpenseValidator>) -> Self {
        Self {
            storage,
            validator,
            engine: SettlementEngine::default(),
        }
    }

    /// Replace the rounding and tolerance policy
    pub fn with_policy(mut self, policy: SettlementPolicy) -> PlanResult<Self> {
        self.engine = SettlementEngine::new(policy)?;
        Ok(self)
    }

    /// Record an expense and its computed splits.
    ///
    /// With no participants listed, every member of the plan's group takes part.
    pub async fn record_expense(&mut self, mut draft: ExpenseDraft) -> PlanResult<Expense> {
        let plan = self
            .storage
            .get_plan(draft.plan_id)
            .await?
            .ok_or(PlanError::PlanNotFound(draft.plan_id))?;

        if draft.participants.is_empty() {
            let group = self
                .storage
                .get_group(plan.group_id)
                .await?
                .ok_or(PlanError::GroupNotFound(plan.group_id))?;
            draft.participants = group.members.into_iter().map(Participant::new).collect();
        }

        self.validator.validate_expense(&draft)?;

        let expense = ExpenseBuilder::from_draft(draft)
            .policy(self.engine.policy().clone())
            .build()?;

        self.storage.save_expense(&expense).await?;
        info!(
            plan_id = expense.plan_id,
            expense_id = %expense.id,
            paid_by = expense.paid_by,
            total = %expense.total_amount,
            splits = expense.splits.len(),
            "expense recorded"
        );

        Ok(expense)
    }

    /// Get an expense by ID, returning an error if not found
    pub async fn get_expense_required(&self, expense_id: Uuid) -> PlanResult<Expense> {
        self.storage
            .get_expense(expense_id)
            .await?
            .ok_or(PlanError::ExpenseNotFound(expense_id))
    }

    /// List the expenses of a plan
    pub async fn list_expenses(&self, plan_id: PlanId) -> PlanResult<Vec<Expense>> {
        self.storage.list_expenses(plan_id).await
    }

    /// Acknowledge that a debtor paid their share
    pub async fn mark_split_paid(
        &mut self,
        expense_id: Uuid,
        split_id: Uuid,
    ) -> PlanResult<ExpenseSplit> {
        let mut expense = self.get_expense_required(expense_id).await?;
        let split = expense.mark_split_paid(split_id)?.clone();
        self.storage.update_expense(&expense).await?;
        info!(expense_id = %expense_id, user_id = split.user_id, "split marked paid");

        Ok(split)
    }

    /// Net balances and settling transfers for a plan
    pub async fn settlement_summary(&self, plan_id: PlanId) -> PlanResult<SettlementSummary> {
        if self.storage.get_plan(plan_id).await?.is_none() {
            return Err(PlanError::PlanNotFound(plan_id));
        }

        let expenses = self.storage.list_expenses(plan_id).await?;
        let summary = self.engine.summarize(plan_id, &expenses);
        debug!(
            plan_id,
            expenses = expenses.len(),
            transfers = summary.transfers.len(),
            "settlement computed"
        );

        Ok(summary)
    }
}
