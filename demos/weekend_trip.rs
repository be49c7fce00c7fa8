//! A weekend trip from proposal to settled expenses

use bigdecimal::BigDecimal;
use group_plans_core::utils::MemoryStorage;
use group_plans_core::{
    telemetry, Ballot, ExpenseDraft, Participant, Planner, SplitType, VoteType,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init();
    println!("🏕️  Group Plans Core - Weekend Trip Example\n");

    let mut planner = Planner::new(MemoryStorage::new());

    // 1. Group and plan
    planner
        .create_group(1, "Friday crew".to_string(), vec![1, 2, 3])
        .await?;
    let plan = planner
        .create_plan(1, 1, "Weekend in the mountains".to_string())
        .await?;
    println!("  ✓ Proposed: {} ({})", plan.title, plan.status);

    // 2. Vote on where to stay
    let plan = planner.advance_plan(1).await?;
    println!("  ✓ Status: {}", plan.status);

    planner
        .add_option(1, 1, "Cabin".to_string(), Some(BigDecimal::from(300)))
        .await?;
    planner
        .add_option(2, 1, "Campsite".to_string(), Some(BigDecimal::from(90)))
        .await?;

    planner
        .cast_vote(Ballot::on_plan(1, 1, VoteType::Yes).for_option(1))
        .await?;
    planner
        .cast_vote(Ballot::on_plan(1, 2, VoteType::Yes).for_option(1))
        .await?;
    planner
        .cast_vote(Ballot::on_plan(1, 3, VoteType::No).for_option(2).veto())
        .await?;

    for option in planner.list_options(1).await? {
        let tally = planner.option_tally(1, option.id).await?;
        println!(
            "  • {}: {} yes / {} no / {} indifferent",
            option.title, tally.yes, tally.no, tally.indifferent
        );
    }

    // Member 3 already vetoed the campsite
    if let Err(e) = planner
        .cast_vote(Ballot::on_plan(1, 3, VoteType::No).for_option(1).veto())
        .await
    {
        println!("  ✗ {e}");
    }
    println!();

    // 3. Run the plan
    for _ in 0..3 {
        planner.advance_plan(1).await?;
    }

    // 4. Expenses
    println!("💸 Recording expenses...");
    planner
        .record_expense(ExpenseDraft {
            plan_id: 1,
            description: "Dinner".to_string(),
            total_amount: BigDecimal::from(90),
            paid_by: 1,
            split_type: SplitType::Equal,
            participants: Vec::new(),
        })
        .await?;
    planner
        .record_expense(ExpenseDraft {
            plan_id: 1,
            description: "Taxi".to_string(),
            total_amount: BigDecimal::from(30),
            paid_by: 1,
            split_type: SplitType::OnePays,
            participants: vec![Participant::new(1), Participant::new(2)],
        })
        .await?;

    let summary = planner.settlement_summary(1).await?;
    println!("\n📊 Balances:");
    for balance in &summary.balances {
        println!("  member {}: {}", balance.user_id, balance.balance);
    }
    println!("\n🔁 Transfers:");
    for transfer in &summary.transfers {
        println!(
            "  member {} pays member {}: {}",
            transfer.from_user, transfer.to_user, transfer.amount
        );
    }

    Ok(())
}
