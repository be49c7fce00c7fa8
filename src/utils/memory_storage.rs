//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
///
/// Clones share the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    groups: Arc<RwLock<HashMap<GroupId, Group>>>,
    plans: Arc<RwLock<HashMap<PlanId, Plan>>>,
    options: Arc<RwLock<HashMap<(PlanId, OptionId), PlanOption>>>,
    // Kept in insertion order.
    votes: Arc<RwLock<Vec<Vote>>>,
    expenses: Arc<RwLock<Vec<Expense>>>,
    memories: Arc<RwLock<Vec<PlanMemory>>>,
}

fn read<T>(lock: &RwLock<T>) -> PlanResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| PlanError::Storage("memory storage lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> PlanResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| PlanError::Storage("memory storage lock poisoned".to_string()))
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> PlanResult<()> {
        write(&self.groups)?.clear();
        write(&self.plans)?.clear();
        write(&self.options)?.clear();
        write(&self.votes)?.clear();
        write(&self.expenses)?.clear();
        write(&self.memories)?.clear();
        Ok(())
    }
}

#[async_trait]
impl PlanStorage for MemoryStorage {
    async fn save_group(&mut self, group: &Group) -> PlanResult<()> {
        write(&self.groups)?.insert(group.id, group.clone());
        Ok(())
    }

    async fn get_group(&self, group_id: GroupId) -> PlanResult<Option<Group>> {
        Ok(read(&self.groups)?.get(&group_id).cloned())
    }

    async fn update_group(&mut self, group: &Group) -> PlanResult<()> {
        let mut groups = write(&self.groups)?;
        match groups.get_mut(&group.id) {
            Some(stored) => {
                *stored = group.clone();
                Ok(())
            }
            None => Err(PlanError::GroupNotFound(group.id)),
        }
    }

    async fn save_plan(&mut self, plan: &Plan) -> PlanResult<()> {
        write(&self.plans)?.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn get_plan(&self, plan_id: PlanId) -> PlanResult<Option<Plan>> {
        Ok(read(&self.plans)?.get(&plan_id).cloned())
    }

    async fn update_plan(&mut self, plan: &Plan) -> PlanResult<()> {
        let mut plans = write(&self.plans)?;
        match plans.get_mut(&plan.id) {
            Some(stored) => {
                *stored = plan.clone();
                Ok(())
            }
            None => Err(PlanError::PlanNotFound(plan.id)),
        }
    }

    async fn list_group_plans(&self, group_id: GroupId) -> PlanResult<Vec<Plan>> {
        let mut plans: Vec<Plan> = read(&self.plans)?
            .values()
            .filter(|plan| plan.group_id == group_id)
            .cloned()
            .collect();
        plans.sort_by_key(|plan| plan.id);
        Ok(plans)
    }

    async fn save_option(&mut self, option: &PlanOption) -> PlanResult<()> {
        write(&self.options)?.insert((option.plan_id, option.id), option.clone());
        Ok(())
    }

    async fn list_options(&self, plan_id: PlanId) -> PlanResult<Vec<PlanOption>> {
        let mut options: Vec<PlanOption> = read(&self.options)?
            .values()
            .filter(|option| option.plan_id == plan_id)
            .cloned()
            .collect();
        options.sort_by_key(|option| option.id);
        Ok(options)
    }

    async fn upsert_vote(&mut self, vote: &Vote) -> PlanResult<()> {
        let mut votes = write(&self.votes)?;
        match votes.iter_mut().find(|v| v.id == vote.id) {
            Some(stored) => *stored = vote.clone(),
            None => votes.push(vote.clone()),
        }
        Ok(())
    }

    async fn list_votes(&self, plan_id: PlanId) -> PlanResult<Vec<Vote>> {
        Ok(read(&self.votes)?
            .iter()
            .filter(|vote| vote.plan_id == plan_id)
            .cloned()
            .collect())
    }

    async fn save_expense(&mut self, expense: &Expense) -> PlanResult<()> {
        write(&self.expenses)?.push(expense.clone());
        Ok(())
    }

    async fn get_expense(&self, expense_id: Uuid) -> PlanResult<Option<Expense>> {
        Ok(read(&self.expenses)?
            .iter()
            .find(|expense| expense.id == expense_id)
            .cloned())
    }

    async fn update_expense(&mut self, expense: &Expense) -> PlanResult<()> {
        let mut expenses = write(&self.expenses)?;
        match expenses.iter_mut().find(|e| e.id == expense.id) {
            Some(stored) => {
                *stored = expense.clone();
                Ok(())
            }
            None => Err(PlanError::ExpenseNotFound(expense.id)),
        }
    }

    async fn list_expenses(&self, plan_id: PlanId) -> PlanResult<Vec<Expense>> {
        Ok(read(&self.expenses)?
            .iter()
            .filter(|expense| expense.plan_id == plan_id)
            .cloned()
            .collect())
    }

    async fn save_memory(&mut self, memory: &PlanMemory) -> PlanResult<()> {
        write(&self.memories)?.push(memory.clone());
        Ok(())
    }

    async fn list_memories(&self, plan_id: PlanId) -> PlanResult<Vec<PlanMemory>> {
        Ok(read(&self.memories)?
            .iter()
            .filter(|memory| memory.plan_id == plan_id)
            .cloned()
            .collect())
    }
}
