//! Validation utilities

use bigdecimal::BigDecimal;
use std::collections::HashSet;

use crate::traits::*;
use crate::types::*;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> PlanResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(PlanError::InvalidExpense(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate an expense description
pub fn validate_description(description: &str) -> PlanResult<()> {
    if description.trim().is_empty() {
        return Err(PlanError::InvalidExpense(
            "Expense description cannot be empty".to_string(),
        ));
    }

    if description.chars().count() > 200 {
        return Err(PlanError::InvalidExpense(
            "Expense description cannot exceed 200 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate a plan title
pub fn validate_title(title: &str) -> PlanResult<()> {
    if title.trim().is_empty() {
        return Err(PlanError::Validation(
            "Plan title cannot be empty".to_string(),
        ));
    }

    if title.chars().count() > 150 {
        return Err(PlanError::Validation(
            "Plan title cannot exceed 150 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate a memory phrase
pub fn validate_phrase(phrase: &str) -> PlanResult<()> {
    if phrase.trim().is_empty() {
        return Err(PlanError::Validation(
            "Memory phrase cannot be empty".to_string(),
        ));
    }

    if phrase.chars().count() > 500 {
        return Err(PlanError::Validation(
            "Memory phrase cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate a plan rating (0 to 5 inclusive)
pub fn validate_rating(rating: &BigDecimal) -> PlanResult<()> {
    if *rating < BigDecimal::from(0) || *rating > BigDecimal::from(5) {
        return Err(PlanError::Validation(format!(
            "Rating must be between 0 and 5, got {rating}"
        )));
    }
    Ok(())
}

/// Enhanced expense validator with detailed checks
pub struct EnhancedExpenseValidator;

impl ExpenseValidator for EnhancedExpenseValidator {
    fn validate_expense(&self, draft: &ExpenseDraft) -> PlanResult<()> {
        // Basic validation
        DefaultExpenseValidator.validate_expense(draft)?;

        validate_description(&draft.description)?;

        let hundred = BigDecimal::from(100);
        let mut seen = HashSet::new();
        for participant in &draft.participants {
            if !seen.insert(participant.user_id) {
                return Err(PlanError::InvalidSplit(format!(
                    "User {} appears more than once in the split",
                    participant.user_id
                )));
            }

            if let Some(percentage) = &participant.percentage {
                if *percentage < BigDecimal::from(0) || *percentage > hundred {
                    return Err(PlanError::InvalidSplit(format!(
                        "Percentage for user {} must be between 0 and 100",
                        participant.user_id
                    )));
                }
            }

            if let Some(amount) = &participant.amount {
                if *amount < BigDecimal::from(0) {
                    return Err(PlanError::InvalidSplit(format!(
                        "Amount for user {} cannot be negative",
                        participant.user_id
                    )));
                }
            }
        }

        Ok(())
    }
}
