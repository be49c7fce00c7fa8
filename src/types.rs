//! Core types and data structures for group plans and shared expenses

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Identifier of a group member
pub type MemberId = u64;
/// Identifier of a group
pub type GroupId = u64;
/// Identifier of a plan
pub type PlanId = u64;
/// Identifier of a plan option
pub type OptionId = u64;

/// Lifecycle status of a plan, in its fixed order of progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Someone floated the idea
    Proposed,
    /// Members are voting on the plan or its options
    Voting,
    /// The plan is going ahead
    Confirmed,
    /// The plan is happening right now
    InProgress,
    /// Terminal state; expenses can be settled
    Closed,
}

impl PlanStatus {
    /// Every status in lifecycle order
    pub const ORDER: [PlanStatus; 5] = [
        PlanStatus::Proposed,
        PlanStatus::Voting,
        PlanStatus::Confirmed,
        PlanStatus::InProgress,
        PlanStatus::Closed,
    ];

    /// The status that follows this one, or `None` for the terminal state
    pub fn next(self) -> Option<PlanStatus> {
        match self {
            PlanStatus::Proposed => Some(PlanStatus::Voting),
            PlanStatus::Voting => Some(PlanStatus::Confirmed),
            PlanStatus::Confirmed => Some(PlanStatus::InProgress),
            PlanStatus::InProgress => Some(PlanStatus::Closed),
            PlanStatus::Closed => None,
        }
    }

    /// Zero-based position in [`PlanStatus::ORDER`]
    pub fn position(self) -> usize {
        self as usize
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlanStatus::Proposed => "proposed",
            PlanStatus::Voting => "voting",
            PlanStatus::Confirmed => "confirmed",
            PlanStatus::InProgress => "in_progress",
            PlanStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A group of members who plan things together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Member identifiers, in the order they joined
    pub members: Vec<MemberId>,
    /// Plans each member backed out of; absent means none
    #[serde(default)]
    pub cancellations: BTreeMap<MemberId, u32>,
    pub created_at: DateTime<Utc>,
}

/// Members with this many cancellations are skipped by the plan-master spin
pub const PLAN_MASTER_CANCELLATION_LIMIT: u32 = 2;

impl Group {
    /// Create a new group
    pub fn new(id: GroupId, name: String, members: Vec<MemberId>) -> Self {
        Self {
            id,
            name,
            members,
            cancellations: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_member(&self, user_id: MemberId) -> bool {
        self.members.contains(&user_id)
    }

    pub fn cancellations_of(&self, user_id: MemberId) -> u32 {
        self.cancellations.get(&user_id).copied().unwrap_or(0)
    }

    /// Members who may be picked as plan master.
    ///
    /// Falls back to every member when nobody is under the cancellation limit.
    pub fn plan_master_candidates(&self) -> Vec<MemberId> {
        let reliable: Vec<MemberId> = self
            .members
            .iter()
            .copied()
            .filter(|id| self.cancellations_of(*id) < PLAN_MASTER_CANCELLATION_LIMIT)
            .collect();

        if reliable.is_empty() {
            self.members.clone()
        } else {
            reliable
        }
    }
}

/// A proposed group activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub group_id: GroupId,
    pub title: String,
    pub status: PlanStatus,
    /// Post-event rating from 0 to 5, used by the hall of fame
    pub rating: Option<BigDecimal>,
    pub created_at: DateTime<Utc>,
    /// Set only on the transition into [`PlanStatus::Closed`]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Plan {
    /// Create a new plan in the `proposed` status
    pub fn new(id: PlanId, group_id: GroupId, title: String) -> Self {
        Self {
            id,
            group_id,
            title,
            status: PlanStatus::Proposed,
            rating: None,
            created_at: Utc::now(),
            closed_at: None,
        }
    }
}

/// One alternative members can vote on inside a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOption {
    pub id: OptionId,
    pub plan_id: PlanId,
    pub title: String,
    pub estimated_cost: Option<BigDecimal>,
}

/// A short phrase a member leaves on a plan to remember it by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMemory {
    pub id: Uuid,
    pub plan_id: PlanId,
    pub user_id: MemberId,
    pub phrase: String,
    pub created_at: DateTime<Utc>,
}

impl PlanMemory {
    pub fn new(plan_id: PlanId, user_id: MemberId, phrase: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            plan_id,
            user_id,
            phrase,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    Yes,
    No,
    Indifferent,
}

/// A stored vote. `option_id == None` is a vote on the plan as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: Uuid,
    pub plan_id: PlanId,
    pub option_id: Option<OptionId>,
    pub user_id: MemberId,
    pub vote_type: VoteType,
    pub is_veto: bool,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    /// Whether this vote occupies the given `(plan, option, user)` slot
    pub fn matches(&self, plan_id: PlanId, option_id: Option<OptionId>, user_id: MemberId) -> bool {
        self.plan_id == plan_id && self.option_id == option_id && self.user_id == user_id
    }
}

/// A request to cast or change a vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    pub plan_id: PlanId,
    pub option_id: Option<OptionId>,
    pub user_id: MemberId,
    pub vote_type: VoteType,
    #[serde(default)]
    pub is_veto: bool,
}

impl Ballot {
    /// A plain (non-veto) vote on the plan as a whole
    pub fn on_plan(plan_id: PlanId, user_id: MemberId, vote_type: VoteType) -> Self {
        Self {
            plan_id,
            option_id: None,
            user_id,
            vote_type,
            is_veto: false,
        }
    }

    /// Target a specific option instead of the whole plan
    pub fn for_option(mut self, option_id: OptionId) -> Self {
        self.option_id = Some(option_id);
        self
    }

    /// Flag the ballot as a veto
    pub fn veto(mut self) -> Self {
        self.is_veto = true;
        self
    }
}

/// Vote counts by type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub yes: usize,
    pub no: usize,
    pub indifferent: usize,
}

impl VoteTally {
    pub fn record(&mut self, vote_type: VoteType) {
        match vote_type {
            VoteType::Yes => self.yes += 1,
            VoteType::No => self.no += 1,
            VoteType::Indifferent => self.indifferent += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.yes + self.no + self.indifferent
    }
}

/// How an expense is divided between its participants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    /// Everyone owes the same rounded share
    #[default]
    Equal,
    /// Each participant owes an explicit amount
    ByItem,
    /// Each participant owes a percentage of the total
    ByPercentage,
    /// The payer covers it; everyone else shares the total
    OnePays,
}

/// A member taking part in an expense, with optional per-member terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: MemberId,
    /// Share in percent, used by [`SplitType::ByPercentage`]
    #[serde(default)]
    pub percentage: Option<BigDecimal>,
    /// Explicit owed amount, used by [`SplitType::ByItem`]
    #[serde(default)]
    pub amount: Option<BigDecimal>,
}

impl Participant {
    pub fn new(user_id: MemberId) -> Self {
        Self {
            user_id,
            percentage: None,
            amount: None,
        }
    }

    pub fn with_percentage(user_id: MemberId, percentage: BigDecimal) -> Self {
        Self {
            percentage: Some(percentage),
            ..Self::new(user_id)
        }
    }

    pub fn with_amount(user_id: MemberId, amount: BigDecimal) -> Self {
        Self {
            amount: Some(amount),
            ..Self::new(user_id)
        }
    }
}

/// Everything needed to record an expense, before splits are computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub plan_id: PlanId,
    pub description: String,
    pub total_amount: BigDecimal,
    pub paid_by: MemberId,
    #[serde(default)]
    pub split_type: SplitType,
    /// Empty means "every member of the plan's group"
    #[serde(default)]
    pub participants: Vec<Participant>,
}

/// A single participant's owed share of one expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub user_id: MemberId,
    pub amount: BigDecimal,
    pub is_paid: bool,
}

/// A recorded expense together with its splits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub plan_id: PlanId,
    pub description: String,
    pub total_amount: BigDecimal,
    pub paid_by: MemberId,
    pub split_type: SplitType,
    pub splits: Vec<ExpenseSplit>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Sum of all split amounts
    pub fn split_total(&self) -> BigDecimal {
        self.splits.iter().map(|s| &s.amount).sum()
    }

    /// Mark one split as paid; returns the updated split
    pub fn mark_split_paid(&mut self, split_id: Uuid) -> PlanResult<&ExpenseSplit> {
        let split = self
            .splits
            .iter_mut()
            .find(|s| s.id == split_id)
            .ok_or(PlanError::SplitNotFound(split_id))?;
        split.is_paid = true;
        Ok(&*split)
    }

    /// Whether every split has been acknowledged as paid
    pub fn is_fully_paid(&self) -> bool {
        self.splits.iter().all(|s| s.is_paid)
    }
}

/// One member's net position across a set of expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub user_id: MemberId,
    /// Positive: owed money. Negative: owes money.
    pub balance: BigDecimal,
}

/// A payment that moves money from a debtor to a creditor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub from_user: MemberId,
    pub to_user: MemberId,
    pub amount: BigDecimal,
}

/// Net balances plus the transfers that settle them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub plan_id: PlanId,
    pub balances: Vec<MemberBalance>,
    pub transfers: Vec<Transfer>,
}

/// Errors that can occur while planning, voting or settling
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Invalid expense: {0}")]
    InvalidExpense(String),
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("User {user_id} already used their veto on plan {plan_id}")]
    DuplicateVeto { plan_id: PlanId, user_id: MemberId },
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: PlanStatus, to: PlanStatus },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),
    #[error("Plan not found: {0}")]
    PlanNotFound(PlanId),
    #[error("Option not found: {0}")]
    OptionNotFound(OptionId),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(Uuid),
    #[error("Split not found: {0}")]
    SplitNotFound(Uuid),
    #[error("User {user_id} is already a member of group {group_id}")]
    AlreadyMember { group_id: GroupId, user_id: MemberId },
    #[error("User {user_id} is not a member of group {group_id}")]
    NotAMember { group_id: GroupId, user_id: MemberId },
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for plan and expense operations
pub type PlanResult<T> = Result<T, PlanError>;
