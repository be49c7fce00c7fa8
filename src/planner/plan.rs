//! Groups, plans, options and votes backed by storage

use bigdecimal::BigDecimal;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::lifecycle::{self, VoteCast, VoteSet};
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::{validate_phrase, validate_rating, validate_title};

/// Manager for plan lifecycle and voting operations
///
/// Writes take `&mut self`, so one manager serializes advances and votes.
pub struct PlanManager<S: PlanStorage> {
    pub(crate) storage: S,
}

impl<S: PlanStorage> PlanManager<S> {
    /// Create a new plan manager
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a new group
    pub async fn create_group(
        &mut self,
        id: GroupId,
        name: String,
        members: Vec<MemberId>,
    ) -> PlanResult<Group> {
        if name.trim().is_empty() {
            return Err(PlanError::Validation(
                "Group name cannot be empty".to_string(),
            ));
        }

        if self.storage.get_group(id).await?.is_some() {
            return Err(PlanError::Validation(format!(
                "Group with ID '{id}' already exists"
            )));
        }

        let group = Group::new(id, name, members);
        self.storage.save_group(&group).await?;
        info!(group_id = id, members = group.members.len(), "group created");

        Ok(group)
    }

    /// Get a group by ID, returning an error if not found
    pub async fn get_group_required(&self, group_id: GroupId) -> PlanResult<Group> {
        self.storage
            .get_group(group_id)
            .await?
            .ok_or(PlanError::GroupNotFound(group_id))
    }

    /// Invite a member into a group
    pub async fn add_member(&mut self, group_id: GroupId, user_id: MemberId) -> PlanResult<Group> {
        let mut group = self.get_group_required(group_id).await?;

        if group.is_member(user_id) {
            warn!(group_id, user_id, "member already in group");
            return Err(PlanError::AlreadyMember { group_id, user_id });
        }

        group.members.push(user_id);
        self.storage.update_group(&group).await?;
        info!(group_id, user_id, members = group.members.len(), "member added");

        Ok(group)
    }

    /// Count one more cancelled plan against a member
    pub async fn record_cancellation(
        &mut self,
        group_id: GroupId,
        user_id: MemberId,
    ) -> PlanResult<Group> {
        let mut group = self.get_group_required(group_id).await?;

        if !group.is_member(user_id) {
            return Err(PlanError::NotAMember { group_id, user_id });
        }

        *group.cancellations.entry(user_id).or_insert(0) += 1;
        self.storage.update_group(&group).await?;
        debug!(
            group_id,
            user_id,
            cancellations = group.cancellations_of(user_id),
            "cancellation recorded"
        );

        Ok(group)
    }

    /// Pick a random plan master for the group
    pub async fn spin_plan_master(&self, group_id: GroupId) -> PlanResult<MemberId> {
        let group = self.get_group_required(group_id).await?;
        pick_plan_master(&group, &mut rand::thread_rng())
    }

    /// Same as [`Self::spin_plan_master`] with a caller-supplied source of randomness
    pub async fn spin_plan_master_with<R: Rng + ?Sized>(
        &self,
        group_id: GroupId,
        rng: &mut R,
    ) -> PlanResult<MemberId> {
        let group = self.get_group_required(group_id).await?;
        pick_plan_master(&group, rng)
    }

    /// Propose a new plan for a group
    pub async fn create_plan(
        &mut self,
        id: PlanId,
        group_id: GroupId,
        title: String,
    ) -> PlanResult<Plan> {
        validate_title(&title)?;

        if self.storage.get_plan(id).await?.is_some() {
            return Err(PlanError::Validation(format!(
                "Plan with ID '{id}' already exists"
            )));
        }

        // The group must exist
        self.get_group_required(group_id).await?;

        let plan = Plan::new(id, group_id, title);
        self.storage.save_plan(&plan).await?;
        info!(plan_id = id, group_id, "plan proposed");

        Ok(plan)
    }

    /// Get a plan by ID
    pub async fn get_plan(&self, plan_id: PlanId) -> PlanResult<Option<Plan>> {
        self.storage.get_plan(plan_id).await
    }

    /// Get a plan by ID, returning an error if not found
    pub async fn get_plan_required(&self, plan_id: PlanId) -> PlanResult<Plan> {
        self.storage
            .get_plan(plan_id)
            .await?
            .ok_or(PlanError::PlanNotFound(plan_id))
    }

    /// List every plan of a group
    pub async fn list_group_plans(&self, group_id: GroupId) -> PlanResult<Vec<Plan>> {
        self.storage.list_group_plans(group_id).await
    }

    /// Step a plan to its next status
    pub async fn advance_plan(&mut self, plan_id: PlanId) -> PlanResult<Plan> {
        let current = self.get_plan_required(plan_id).await?;
        let next = lifecycle::advance(&current);

        if next.status == current.status {
            debug!(plan_id, status = %current.status, "plan already closed");
            return Ok(current);
        }

        self.storage.update_plan(&next).await?;
        info!(plan_id, from = %current.status, to = %next.status, "plan advanced");

        Ok(next)
    }

    /// Assign a status explicitly; only the next status is accepted
    pub async fn set_plan_status(&mut self, plan_id: PlanId, status: PlanStatus) -> PlanResult<Plan> {
        let current = self.get_plan_required(plan_id).await?;
        let next = lifecycle::transition(&current, status).inspect_err(|e| {
            warn!(plan_id, error = %e, "status change rejected");
        })?;

        if next != current {
            self.storage.update_plan(&next).await?;
            info!(plan_id, from = %current.status, to = %next.status, "plan status set");
        }

        Ok(next)
    }

    /// Rate a plan from 0 to 5
    pub async fn rate_plan(&mut self, plan_id: PlanId, rating: BigDecimal) -> PlanResult<Plan> {
        validate_rating(&rating)?;

        let mut plan = self.get_plan_required(plan_id).await?;
        plan.rating = Some(rating);
        self.storage.update_plan(&plan).await?;
        debug!(plan_id, "plan rated");

        Ok(plan)
    }

    /// Add a votable option to a plan
    pub async fn add_option(
        &mut self,
        id: OptionId,
        plan_id: PlanId,
        title: String,
        estimated_cost: Option<BigDecimal>,
    ) -> PlanResult<PlanOption> {
        validate_title(&title)?;
        self.get_plan_required(plan_id).await?;

        if self
            .storage
            .list_options(plan_id)
            .await?
            .iter()
            .any(|option| option.id == id)
        {
            return Err(PlanError::Validation(format!(
                "Option with ID '{id}' already exists"
            )));
        }

        let option = PlanOption {
            id,
            plan_id,
            title,
            estimated_cost,
        };
        self.storage.save_option(&option).await?;
        info!(plan_id, option_id = id, "option added");

        Ok(option)
    }

    /// List the options of a plan
    pub async fn list_options(&self, plan_id: PlanId) -> PlanResult<Vec<PlanOption>> {
        self.storage.list_options(plan_id).await
    }

    /// Current vote snapshot for a plan
    pub async fn votes(&self, plan_id: PlanId) -> PlanResult<VoteSet> {
        let votes = self.storage.list_votes(plan_id).await?;
        Ok(VoteSet::from_votes(plan_id, votes))
    }

    /// Cast or change a vote
    pub async fn cast_vote(&mut self, ballot: Ballot) -> PlanResult<VoteCast> {
        let plan_id = ballot.plan_id;
        self.get_plan_required(plan_id).await?;

        if let Some(option_id) = ballot.option_id {
            let options = self.storage.list_options(plan_id).await?;
            if !options.iter().any(|option| option.id == option_id) {
                return Err(PlanError::OptionNotFound(option_id));
            }
        }

        let cast = self
            .votes(plan_id)
            .await?
            .cast(ballot)
            .inspect_err(|e| warn!(plan_id, error = %e, "vote rejected"))?;

        self.storage.upsert_vote(&cast.vote).await?;
        info!(
            plan_id,
            user_id = cast.vote.user_id,
            option_id = ?cast.vote.option_id,
            veto = cast.vote.is_veto,
            outcome = ?cast.outcome,
            "vote cast"
        );

        Ok(cast)
    }

    /// Counts across every vote on a plan
    pub async fn tally(&self, plan_id: PlanId) -> PlanResult<VoteTally> {
        Ok(self.votes(plan_id).await?.tally())
    }

    /// Counts for one option of a plan
    pub async fn option_tally(&self, plan_id: PlanId, option_id: OptionId) -> PlanResult<VoteTally> {
        Ok(self.votes(plan_id).await?.tally_for(Some(option_id)))
    }

    /// Leave a memory on a plan
    pub async fn add_memory(
        &mut self,
        plan_id: PlanId,
        user_id: MemberId,
        phrase: String,
    ) -> PlanResult<PlanMemory> {
        validate_phrase(&phrase)?;
        self.get_plan_required(plan_id).await?;

        let memory = PlanMemory::new(plan_id, user_id, phrase);
        self.storage.save_memory(&memory).await?;
        info!(plan_id, user_id, memory_id = %memory.id, "memory added");

        Ok(memory)
    }

    /// Memories left on a plan, oldest first
    pub async fn list_memories(&self, plan_id: PlanId) -> PlanResult<Vec<PlanMemory>> {
        self.storage.list_memories(plan_id).await
    }

    /// Best-rated plans of a group, highest rating first
    pub async fn hall_of_fame(&self, group_id: GroupId, limit: usize) -> PlanResult<Vec<Plan>> {
        let mut rated: Vec<Plan> = self
            .storage
            .list_group_plans(group_id)
            .await?
            .into_iter()
            .filter(|plan| plan.rating.is_some())
            .collect();

        // Plans arrive in ascending id order; the sort is stable.
        rated.sort_by(|a, b| b.rating.cmp(&a.rating));
        rated.truncate(limit);

        Ok(rated)
    }
}

fn pick_plan_master<R: Rng + ?Sized>(group: &Group, rng: &mut R) -> PlanResult<MemberId> {
    let chosen = group
        .plan_master_candidates()
        .choose(rng)
        .copied()
        .ok_or_else(|| PlanError::Validation(format!("Group {} has no members", group.id)))?;
    info!(group_id = group.id, user_id = chosen, "plan master chosen");

    Ok(chosen)
}
