//! Totals over a list of expenses, overall, per category and per month.

use std::{borrow::Borrow, collections::HashMap};

use serde::Serialize;
use time::{Date, Month};

use crate::{category::Category, expense::Expense};

/// The sum of the amounts of `expenses`, zero if there are none.
pub fn total_of<E: Borrow<Expense>>(expenses: impl IntoIterator<Item = E>) -> f64 {
    expenses
        .into_iter()
        .map(|expense| expense.borrow().amount)
        .sum()
}

/// The sum of the amounts of `expenses` for each category.
///
/// Categories without any expenses are not included.
pub fn totals_by_category<E: Borrow<Expense>>(
    expenses: impl IntoIterator<Item = E>,
) -> HashMap<Category, f64> {
    let mut totals = HashMap::new();

    for expense in expenses {
        let expense = expense.borrow();
        *totals.entry(expense.category).or_insert(0.0) += expense.amount;
    }

    totals
}

/// The `limit` categories with the largest totals, largest first.
///
/// Categories with equal totals keep the order in which they first appear in `expenses`.
pub fn top_categories<E: Borrow<Expense>>(
    expenses: impl IntoIterator<Item = E>,
    limit: usize,
) -> Vec<(Category, f64)> {
    let mut totals: Vec<(Category, f64)> = Vec::new();
    let mut positions: HashMap<Category, usize> = HashMap::new();

    for expense in expenses {
        let expense = expense.borrow();

        match positions.get(&expense.category) {
            Some(&position) => totals[position].1 += expense.amount,
            None => {
                positions.insert(expense.category, totals.len());
                totals.push((expense.category, expense.amount));
            }
        }
    }

    // Stable sort, so ties stay in first-encountered order.
    totals.sort_by(|(_, a), (_, b)| b.total_cmp(a));
    totals.truncate(limit);
    totals
}

/// The figures shown on the dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// The total of all expenses.
    pub total: f64,
    /// The total of expenses dated in the current calendar month.
    pub this_month: f64,
    /// The total of expenses dated in the previous calendar month.
    pub last_month: f64,
    /// The change from last month to this month as a whole percentage.
    ///
    /// This is 100 when nothing was spent last month.
    pub percent_change: i64,
}

/// Summarise spending for the month containing `today` and the month before it.
///
/// Expenses with malformed dates count towards [MonthlySummary::total] only.
pub fn monthly_summary<E: Borrow<Expense>>(
    expenses: impl IntoIterator<Item = E>,
    today: Date,
) -> MonthlySummary {
    let this_month = (today.year(), today.month());
    let last_month = previous_month(today.year(), today.month());

    let mut summary = MonthlySummary {
        total: 0.0,
        this_month: 0.0,
        last_month: 0.0,
        percent_change: 0,
    };

    for expense in expenses {
        let expense = expense.borrow();
        summary.total += expense.amount;

        let Some(date) = expense.date.as_date() else {
            continue;
        };

        let month = (date.year(), date.month());

        if month == this_month {
            summary.this_month += expense.amount;
        } else if month == last_month {
            summary.last_month += expense.amount;
        }
    }

    summary.percent_change = percent_change(summary.last_month, summary.this_month);
    summary
}

fn previous_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::January => (year - 1, Month::December),
        month => (year, month.previous()),
    }
}

fn percent_change(previous: f64, current: f64) -> i64 {
    if previous == 0.0 {
        return 100;
    }

    (((current - previous) / previous) * 100.0).round() as i64
}
