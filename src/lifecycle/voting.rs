//! Vote casting with one-veto-per-member rules, and tallies

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::*;

/// Whether a cast created a new vote or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastOutcome {
    Created,
    Overwritten,
}

/// Result of casting a ballot against a vote set
#[derive(Debug, Clone, PartialEq)]
pub struct VoteCast {
    /// The vote as it should now be stored
    pub vote: Vote,
    pub outcome: CastOutcome,
    /// The full vote set after the cast
    pub votes: VoteSet,
}

/// Snapshot of every vote on one plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteSet {
    plan_id: PlanId,
    votes: Vec<Vote>,
}

impl VoteSet {
    /// Empty vote set for a plan
    pub fn new(plan_id: PlanId) -> Self {
        Self {
            plan_id,
            votes: Vec::new(),
        }
    }

    /// Build a snapshot from stored votes; votes for other plans are dropped
    pub fn from_votes(plan_id: PlanId, votes: Vec<Vote>) -> Self {
        Self {
            plan_id,
            votes: votes.into_iter().filter(|v| v.plan_id == plan_id).collect(),
        }
    }

    pub fn plan_id(&self) -> PlanId {
        self.plan_id
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Whether the member already holds a veto anywhere on this plan
    pub fn has_veto(&self, user_id: MemberId) -> bool {
        self.votes.iter().any(|v| v.user_id == user_id && v.is_veto)
    }

    /// Apply a ballot and return the resulting snapshot.
    ///
    /// A member holds one vote per target (the plan itself or one option);
    /// casting again overwrites it. A new veto is refused if the member
    /// already vetoed anything on the plan.
    pub fn cast(&self, ballot: Ballot) -> PlanResult<VoteCast> {
        if ballot.plan_id != self.plan_id {
            return Err(PlanError::Validation(format!(
                "Ballot for plan {} cast against votes of plan {}",
                ballot.plan_id, self.plan_id
            )));
        }

        let mut votes = self.votes.clone();
        let existing = votes
            .iter_mut()
            .find(|v| v.matches(ballot.plan_id, ballot.option_id, ballot.user_id));

        let (vote, outcome) = match existing {
            Some(vote) => {
                vote.vote_type = ballot.vote_type;
                vote.is_veto = ballot.is_veto;
                (vote.clone(), CastOutcome::Overwritten)
            }
            None => {
                if ballot.is_veto && self.has_veto(ballot.user_id) {
                    return Err(PlanError::DuplicateVeto {
                        plan_id: ballot.plan_id,
                        user_id: ballot.user_id,
                    });
                }
                let vote = Vote {
                    id: Uuid::new_v4(),
                    plan_id: ballot.plan_id,
                    option_id: ballot.option_id,
                    user_id: ballot.user_id,
                    vote_type: ballot.vote_type,
                    is_veto: ballot.is_veto,
                    created_at: Utc::now(),
                };
                votes.push(vote.clone());
                (vote, CastOutcome::Created)
            }
        };

        Ok(VoteCast {
            vote,
            outcome,
            votes: VoteSet {
                plan_id: self.plan_id,
                votes,
            },
        })
    }

    /// Counts across every vote on the plan, all options pooled
    pub fn tally(&self) -> VoteTally {
        tally_votes(self.votes.iter())
    }

    /// Counts for a single target; `None` counts whole-plan votes only
    pub fn tally_for(&self, option_id: Option<OptionId>) -> VoteTally {
        tally_votes(self.votes.iter().filter(|v| v.option_id == option_id))
    }
}

fn tally_votes<'a>(votes: impl Iterator<Item = &'a Vote>) -> VoteTally {
    votes.fold(VoteTally::default(), |mut tally, vote| {
        tally.record(vote.vote_type);
        tally
    })
}
