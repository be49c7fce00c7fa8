//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use uuid::Uuid;

use crate::types::*;
use crate::utils::validation::validate_positive_amount;

/// Storage abstraction for groups, plans, votes and expenses
///
/// The pure core never touches storage; managers load a snapshot through
/// this trait, compute, then write the result back.
#[async_trait]
pub trait PlanStorage: Send + Sync {
    /// Save a group to storage
    async fn save_group(&mut self, group: &Group) -> PlanResult<()>;

    /// Get a group by ID
    async fn get_group(&self, group_id: GroupId) -> PlanResult<Option<Group>>;

    /// Replace a stored group
    async fn update_group(&mut self, group: &Group) -> PlanResult<()>;

    /// Save a new plan
    async fn save_plan(&mut self, plan: &Plan) -> PlanResult<()>;

    /// Get a plan by ID
    async fn get_plan(&self, plan_id: PlanId) -> PlanResult<Option<Plan>>;

    /// Replace a stored plan
    async fn update_plan(&mut self, plan: &Plan) -> PlanResult<()>;

    /// List every plan of a group, by ascending plan ID
    async fn list_group_plans(&self, group_id: GroupId) -> PlanResult<Vec<Plan>>;

    /// Save an option for a plan; option IDs are scoped to their plan
    async fn save_option(&mut self, option: &PlanOption) -> PlanResult<()>;

    /// List the options of a plan, by ascending option ID
    async fn list_options(&self, plan_id: PlanId) -> PlanResult<Vec<PlanOption>>;

    /// Insert a vote, or replace the one with the same ID
    async fn upsert_vote(&mut self, vote: &Vote) -> PlanResult<()>;

    /// List the votes of a plan in the order they were first cast
    async fn list_votes(&self, plan_id: PlanId) -> PlanResult<Vec<Vote>>;

    /// Save a new expense with its splits
    async fn save_expense(&mut self, expense: &Expense) -> PlanResult<()>;

    /// Get an expense by ID
    async fn get_expense(&self, expense_id: Uuid) -> PlanResult<Option<Expense>>;

    /// Replace a stored expense
    async fn update_expense(&mut self, expense: &Expense) -> PlanResult<()>;

    /// List the expenses of a plan in the order they were recorded
    async fn list_expenses(&self, plan_id: PlanId) -> PlanResult<Vec<Expense>>;

    /// Save a memory left on a plan
    async fn save_memory(&mut self, memory: &PlanMemory) -> PlanResult<()>;

    /// List the memories of a plan, oldest first
    async fn list_memories(&self, plan_id: PlanId) -> PlanResult<Vec<PlanMemory>>;
}

/// Trait for implementing custom expense validation rules
pub trait ExpenseValidator: Send + Sync {
    /// Validate an expense draft before its splits are computed
    fn validate_expense(&self, draft: &ExpenseDraft) -> PlanResult<()>;
}

/// Default expense validator with the basic rules
pub struct DefaultExpenseValidator;

impl ExpenseValidator for DefaultExpenseValidator {
    fn validate_expense(&self, draft: &ExpenseDraft) -> PlanResult<()> {
        validate_positive_amount(&draft.total_amount)?;

        if draft.participants.is_empty() {
            return Err(PlanError::InvalidSplit(
                "An expense needs at least one participant".to_string(),
            ));
        }

        Ok(())
    }
}
