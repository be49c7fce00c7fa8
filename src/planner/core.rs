//! Main planner orchestrator that coordinates plans, votes and expenses

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::config::PlannerConfig;
use crate::lifecycle::{VoteCast, VoteSet};
use crate::planner::{ExpenseManager, PlanManager};
use crate::traits::*;
use crate::types::*;

/// Main planner that orchestrates all group plan operations
pub struct Planner<S: PlanStorage> {
    plan_manager: PlanManager<S>,
    expense_manager: ExpenseManager<S>,
    config: PlannerConfig,
}

impl<S: PlanStorage + Clone> Planner<S> {
    /// Create a new planner with the given storage backend
    pub fn new(storage: S) -> Self {
        Self {
            plan_manager: PlanManager::new(storage.clone()),
            expense_manager: ExpenseManager::new(storage),
            config: PlannerConfig::default(),
        }
    }

    /// Create a new planner with custom configuration
    pub fn with_config(storage: S, config: PlannerConfig) -> PlanResult<Self> {
        Self::with_validator(storage, config, Box::new(DefaultExpenseValidator))
    }

    /// Create a new planner with a custom expense validator
    pub fn with_validator(
        storage: S,
        config: PlannerConfig,
        expense_validator: Box<dyn ExpenseValidator>,
    ) -> PlanResult<Self> {
        Ok(Self {
            plan_manager: PlanManager::new(storage.clone()),
            expense_manager: ExpenseManager::with_validator(storage, expense_validator)
                .with_policy(config.settlement.clone())?,
            config,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    // Group and plan operations
    /// Create a new group
    pub async fn create_group(
        &mut self,
        id: GroupId,
        name: String,
        members: Vec<MemberId>,
    ) -> PlanResult<Group> {
        self.plan_manager.create_group(id, name, members).await
    }

    /// Get a group by ID, returning an error if not found
    pub async fn get_group(&self, group_id: GroupId) -> PlanResult<Group> {
        self.plan_manager.get_group_required(group_id).await
    }

    /// Invite a member into a group
    pub async fn add_member(&mut self, group_id: GroupId, user_id: MemberId) -> PlanResult<Group> {
        self.plan_manager.add_member(group_id, user_id).await
    }

    /// Count a cancelled plan against a member
    pub async fn record_cancellation(
        &mut self,
        group_id: GroupId,
        user_id: MemberId,
    ) -> PlanResult<Group> {
        self.plan_manager.record_cancellation(group_id, user_id).await
    }

    /// Pick a random plan master, skipping members who cancel often
    pub async fn spin_plan_master(&self, group_id: GroupId) -> PlanResult<MemberId> {
        self.plan_manager.spin_plan_master(group_id).await
    }

    /// Propose a new plan
    pub async fn create_plan(
        &mut self,
        id: PlanId,
        group_id: GroupId,
        title: String,
    ) -> PlanResult<Plan> {
        self.plan_manager.create_plan(id, group_id, title).await
    }

    /// Get a plan by ID
    pub async fn get_plan(&self, plan_id: PlanId) -> PlanResult<Option<Plan>> {
        self.plan_manager.get_plan(plan_id).await
    }

    /// List every plan of a group
    pub async fn list_group_plans(&self, group_id: GroupId) -> PlanResult<Vec<Plan>> {
        self.plan_manager.list_group_plans(group_id).await
    }

    /// Step a plan to its next status
    pub async fn advance_plan(&mut self, plan_id: PlanId) -> PlanResult<Plan> {
        self.plan_manager.advance_plan(plan_id).await
    }

    /// Assign a plan status explicitly
    pub async fn set_plan_status(&mut self, plan_id: PlanId, status: PlanStatus) -> PlanResult<Plan> {
        self.plan_manager.set_plan_status(plan_id, status).await
    }

    /// Rate a plan from 0 to 5
    pub async fn rate_plan(&mut self, plan_id: PlanId, rating: BigDecimal) -> PlanResult<Plan> {
        self.plan_manager.rate_plan(plan_id, rating).await
    }

    /// Leave a memory on a plan
    pub async fn add_memory(
        &mut self,
        plan_id: PlanId,
        user_id: MemberId,
        phrase: String,
    ) -> PlanResult<PlanMemory> {
        self.plan_manager.add_memory(plan_id, user_id, phrase).await
    }

    /// Memories left on a plan
    pub async fn list_memories(&self, plan_id: PlanId) -> PlanResult<Vec<PlanMemory>> {
        self.plan_manager.list_memories(plan_id).await
    }

    /// Best-rated plans of a group
    pub async fn hall_of_fame(&self, group_id: GroupId) -> PlanResult<Vec<Plan>> {
        self.plan_manager
            .hall_of_fame(group_id, self.config.hall_of_fame_size)
            .await
    }

    // Voting operations
    /// Add a votable option to a plan
    pub async fn add_option(
        &mut self,
        id: OptionId,
        plan_id: PlanId,
        title: String,
        estimated_cost: Option<BigDecimal>,
    ) -> PlanResult<PlanOption> {
        self.plan_manager
            .add_option(id, plan_id, title, estimated_cost)
            .await
    }

    /// List the options of a plan
    pub async fn list_options(&self, plan_id: PlanId) -> PlanResult<Vec<PlanOption>> {
        self.plan_manager.list_options(plan_id).await
    }

    /// Cast or change a vote
    pub async fn cast_vote(&mut self, ballot: Ballot) -> PlanResult<VoteCast> {
        self.plan_manager.cast_vote(ballot).await
    }

    /// Current vote snapshot for a plan
    pub async fn votes(&self, plan_id: PlanId) -> PlanResult<VoteSet> {
        self.plan_manager.votes(plan_id).await
    }

    /// Vote counts across a whole plan
    pub async fn tally(&self, plan_id: PlanId) -> PlanResult<VoteTally> {
        self.plan_manager.tally(plan_id).await
    }

    /// Vote counts for one option
    pub async fn option_tally(&self, plan_id: PlanId, option_id: OptionId) -> PlanResult<VoteTally> {
        self.plan_manager.option_tally(plan_id, option_id).await
    }

    // Expense operations
    /// Record a shared expense
    pub async fn record_expense(&mut self, draft: ExpenseDraft) -> PlanResult<Expense> {
        self.expense_manager.record_expense(draft).await
    }

    /// List the expenses of a plan
    pub async fn list_expenses(&self, plan_id: PlanId) -> PlanResult<Vec<Expense>> {
        self.expense_manager.list_expenses(plan_id).await
    }

    /// Acknowledge a paid split
    pub async fn mark_split_paid(
        &mut self,
        expense_id: Uuid,
        split_id: Uuid,
    ) -> PlanResult<ExpenseSplit> {
        self.expense_manager
            .mark_split_paid(expense_id, split_id)
            .await
    }

    /// Net balances and settling transfers for a plan
    pub async fn settlement_summary(&self, plan_id: PlanId) -> PlanResult<SettlementSummary> {
        self.expense_manager.settlement_summary(plan_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;

    #[tokio::test]
    async fn test_planner_basic_operations() {
        let mut planner = Planner::new(MemoryStorage::new());

        planner
            .create_group(1, "Book club".to_string(), vec![1, 2])
            .await
            .unwrap();
        let plan = planner
            .create_plan(1, 1, "Author talk".to_string())
            .await
            .unwrap();
        assert_eq!(plan.status, PlanStatus::Proposed);

        planner
            .cast_vote(Ballot::on_plan(1, 2, VoteType::Yes))
            .await
            .unwrap();
        assert_eq!(planner.tally(1).await.unwrap().yes, 1);

        let expense = planner
            .record_expense(ExpenseDraft {
                plan_id: 1,
                description: "Tickets".to_string(),
                total_amount: BigDecimal::from(50),
                paid_by: 1,
                split_type: SplitType::Equal,
                participants: Vec::new(),
            })
            .await
            .unwrap();
        assert_eq!(expense.splits.len(), 2);

        let summary = planner.settlement_summary(1).await.unwrap();
        assert_eq!(
            summary.transfers,
            vec![Transfer {
                from_user: 2,
                to_user: 1,
                amount: BigDecimal::from(25),
            }]
        );
    }

    #[tokio::test]
    async fn test_config_limits_hall_of_fame() {
        let config = PlannerConfig::from_json_str(r#"{"hall_of_fame_size": 1}"#).unwrap();
        let mut planner = Planner::with_config(MemoryStorage::new(), config).unwrap();

        planner
            .create_group(1, "Runners".to_string(), vec![1])
            .await
            .unwrap();
        for id in 1..=3 {
            planner
                .create_plan(id, 1, format!("Run {id}"))
                .await
                .unwrap();
            planner
                .rate_plan(id, BigDecimal::from(id as i64))
                .await
                .unwrap();
        }

        let best = planner.hall_of_fame(1).await.unwrap();
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].id, 3);
    }

    #[test]
    fn test_config_with_zero_tolerance_rejected() {
        let mut config = PlannerConfig::default();
        config.settlement.tolerance = BigDecimal::from(0);

        let result = Planner::with_config(MemoryStorage::new(), config);
        assert!(matches!(result, Err(PlanError::Validation(_))));
    }
}
