//! Integration tests for group-plans-core

use std::str::FromStr;

use bigdecimal::BigDecimal;
use group_plans_core::{
    utils::{EnhancedExpenseValidator, MemoryStorage},
    Ballot, CastOutcome, ExpenseDraft, Participant, PlanError, PlanStatus, PlanStorage, Planner,
    PlannerConfig, SplitType, Transfer, VoteTally, VoteType,
};

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn draft(
    plan_id: u64,
    description: &str,
    total: &str,
    paid_by: u64,
    split_type: SplitType,
    participants: Vec<Participant>,
) -> ExpenseDraft {
    ExpenseDraft {
        plan_id,
        description: description.to_string(),
        total_amount: dec(total),
        paid_by,
        split_type,
        participants,
    }
}

async fn planner_with_plan() -> Planner<MemoryStorage> {
    let mut planner = Planner::new(MemoryStorage::new());
    planner
        .create_group(1, "Friday crew".to_string(), vec![1, 2, 3])
        .await
        .unwrap();
    planner
        .create_plan(1, 1, "Weekend in the mountains".to_string())
        .await
        .unwrap();
    planner
}

#[tokio::test]
async fn test_complete_plan_workflow() {
    let mut planner = planner_with_plan().await;

    // Proposal goes to a vote
    planner.advance_plan(1).await.unwrap();
    planner
        .add_option(1, 1, "Cabin".to_string(), Some(dec("300")))
        .await
        .unwrap();
    planner
        .add_option(2, 1, "Campsite".to_string(), Some(dec("90")))
        .await
        .unwrap();

    for user in 1..=3 {
        planner
            .cast_vote(Ballot::on_plan(1, user, VoteType::Yes).for_option(1))
            .await
            .unwrap();
    }
    planner
        .cast_vote(Ballot::on_plan(1, 3, VoteType::No).for_option(2).veto())
        .await
        .unwrap();

    assert_eq!(planner.option_tally(1, 1).await.unwrap().yes, 3);
    assert_eq!(planner.option_tally(1, 2).await.unwrap().no, 1);

    // Confirmed, happening, closed
    for _ in 0..3 {
        planner.advance_plan(1).await.unwrap();
    }
    let plan = planner.get_plan(1).await.unwrap().unwrap();
    assert_eq!(plan.status, PlanStatus::Closed);
    assert!(plan.closed_at.is_some());

    // Expenses are settled afterwards
    planner
        .record_expense(draft(
            1,
            "Dinner",
            "90.00",
            1,
            SplitType::Equal,
            Vec::new(),
        ))
        .await
        .unwrap();
    planner
        .record_expense(draft(
            1,
            "Taxi",
            "30.00",
            1,
            SplitType::OnePays,
            vec![Participant::new(1), Participant::new(2)],
        ))
        .await
        .unwrap();

    let summary = planner.settlement_summary(1).await.unwrap();
    let balances: Vec<(u64, BigDecimal)> = summary
        .balances
        .iter()
        .map(|b| (b.user_id, b.balance.clone()))
        .collect();
    assert_eq!(
        balances,
        vec![(1, dec("90")), (2, dec("-60")), (3, dec("-30"))]
    );
    assert_eq!(
        summary.transfers,
        vec![
            Transfer {
                from_user: 2,
                to_user: 1,
                amount: dec("60.00"),
            },
            Transfer {
                from_user: 3,
                to_user: 1,
                amount: dec("30.00"),
            },
        ]
    );
}

#[tokio::test]
async fn test_revote_keeps_single_record() {
    let mut planner = planner_with_plan().await;

    let first = planner
        .cast_vote(Ballot::on_plan(1, 5, VoteType::Yes))
        .await
        .unwrap();
    assert_eq!(first.outcome, CastOutcome::Created);

    let second = planner
        .cast_vote(Ballot::on_plan(1, 5, VoteType::No))
        .await
        .unwrap();
    assert_eq!(second.outcome, CastOutcome::Overwritten);

    assert_eq!(
        planner.tally(1).await.unwrap(),
        VoteTally {
            yes: 0,
            no: 1,
            indifferent: 0
        }
    );
    assert_eq!(planner.votes(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_veto_is_rejected_and_not_stored() {
    let mut planner = planner_with_plan().await;
    planner
        .add_option(1, 1, "Bowling".to_string(), None)
        .await
        .unwrap();
    planner
        .add_option(2, 1, "Escape room".to_string(), None)
        .await
        .unwrap();

    planner
        .cast_vote(Ballot::on_plan(1, 2, VoteType::No).for_option(1).veto())
        .await
        .unwrap();
    let err = planner
        .cast_vote(Ballot::on_plan(1, 2, VoteType::No).for_option(2).veto())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PlanError::DuplicateVeto {
            plan_id: 1,
            user_id: 2
        }
    ));
    assert_eq!(planner.votes(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_advance_closed_plan_keeps_timestamp() {
    let mut planner = planner_with_plan().await;
    for _ in 0..4 {
        planner.advance_plan(1).await.unwrap();
    }
    let closed = planner.get_plan(1).await.unwrap().unwrap();

    let again = planner.advance_plan(1).await.unwrap();
    assert_eq!(again.status, PlanStatus::Closed);
    assert_eq!(again.closed_at, closed.closed_at);

    let err = planner
        .set_plan_status(1, PlanStatus::Voting)
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::InvalidStatusTransition { .. }));
}

#[tokio::test]
async fn test_percentage_split_and_payment_acknowledgement() {
    let mut planner = planner_with_plan().await;

    let expense = planner
        .record_expense(draft(
            1,
            "Cabin rental",
            "250",
            2,
            SplitType::ByPercentage,
            vec![
                Participant::with_percentage(1, dec("20")),
                Participant::with_percentage(2, dec("30")),
                Participant::with_percentage(3, dec("50")),
            ],
        ))
        .await
        .unwrap();

    let owed: Vec<BigDecimal> = expense.splits.iter().map(|s| s.amount.clone()).collect();
    assert_eq!(owed, vec![dec("50"), dec("75"), dec("125")]);
    assert!(expense.splits[1].is_paid);

    let paid = planner
        .mark_split_paid(expense.id, expense.splits[0].id)
        .await
        .unwrap();
    assert!(paid.is_paid);

    let stored = planner.list_expenses(1).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].splits[0].is_paid);
    assert!(!stored[0].splits[2].is_paid);
}

#[tokio::test]
async fn test_enhanced_validation() {
    let mut planner = Planner::with_validator(
        MemoryStorage::new(),
        PlannerConfig::default(),
        Box::new(EnhancedExpenseValidator),
    )
    .unwrap();
    planner
        .create_group(1, "Team".to_string(), vec![1, 2])
        .await
        .unwrap();
    planner
        .create_plan(1, 1, "Offsite".to_string())
        .await
        .unwrap();

    let duplicate = draft(
        1,
        "Lunch",
        "20",
        1,
        SplitType::Equal,
        vec![Participant::new(2), Participant::new(2)],
    );
    assert!(matches!(
        planner.record_expense(duplicate).await,
        Err(PlanError::InvalidSplit(_))
    ));

    let unnamed = draft(1, "", "20", 1, SplitType::Equal, Vec::new());
    assert!(matches!(
        planner.record_expense(unnamed).await,
        Err(PlanError::InvalidExpense(_))
    ));

    assert!(planner.list_expenses(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_memory_storage_operations() {
    let mut storage = MemoryStorage::new();
    let mut planner = Planner::new(storage.clone());

    planner
        .create_group(4, "Neighbours".to_string(), vec![8, 9])
        .await
        .unwrap();
    planner
        .create_plan(40, 4, "Street party".to_string())
        .await
        .unwrap();

    // The planner and the handle share the same data
    let plan = storage.get_plan(40).await.unwrap();
    assert!(plan.is_some());
    assert_eq!(storage.list_group_plans(4).await.unwrap().len(), 1);

    let mut missing = plan.unwrap();
    missing.id = 41;
    assert!(matches!(
        storage.update_plan(&missing).await,
        Err(PlanError::PlanNotFound(41))
    ));

    storage.clear().unwrap();
    assert!(storage.get_group(4).await.unwrap().is_none());
}

#[tokio::test]
async fn test_invited_member_joins_default_split() {
    let mut planner = planner_with_plan().await;
    planner.add_member(1, 4).await.unwrap();
    assert!(matches!(
        planner.add_member(1, 4).await,
        Err(PlanError::AlreadyMember { .. })
    ));

    let expense = planner
        .record_expense(draft(1, "Groceries", "100", 4, SplitType::Equal, Vec::new()))
        .await
        .unwrap();
    let members: Vec<u64> = expense.splits.iter().map(|s| s.user_id).collect();
    assert_eq!(members, vec![1, 2, 3, 4]);
    assert!(expense.splits.iter().all(|s| s.amount == dec("25")));

    planner
        .add_memory(1, 4, "First trip with the crew".to_string())
        .await
        .unwrap();
    assert_eq!(planner.list_memories(1).await.unwrap().len(), 1);

    let master = planner.spin_plan_master(1).await.unwrap();
    assert!(planner.get_group(1).await.unwrap().is_member(master));
}
