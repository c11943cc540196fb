//! Everything the expense overview shows, computed in one pass over a snapshot.

use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    aggregation::{MonthlySummary, monthly_summary, top_categories, total_of},
    category::Category,
    expense::Expense,
    filter::{FilterCriteria, filter_expenses},
};

/// The filtered expense list with its totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseReport {
    /// The expenses that match the filters, in store order.
    pub visible: Vec<Expense>,
    /// The total of [ExpenseReport::visible].
    pub total: f64,
    /// The largest category totals of [ExpenseReport::visible], largest first.
    pub top_categories: Vec<(Category, f64)>,
    /// Month-over-month figures over all expenses, ignoring the filters.
    pub summary: MonthlySummary,
}

impl ExpenseReport {
    /// Filter `expenses` by `criteria` and total the result.
    ///
    /// The dashboard cards always summarise the whole collection, while the
    /// list, total and category breakdown follow the filters.
    pub fn build(
        expenses: &[Expense],
        criteria: &FilterCriteria,
        now: OffsetDateTime,
        top_limit: usize,
    ) -> Self {
        let visible = filter_expenses(expenses, criteria, now);

        Self {
            total: total_of(visible.iter().copied()),
            top_categories: top_categories(visible.iter().copied(), top_limit),
            summary: monthly_summary(expenses, now.date()),
            visible: visible.into_iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::{
        Duration, OffsetDateTime,
        macros::datetime,
    };

    use super::ExpenseReport;
    use crate::{
        category::Category,
        date_range::DateRangeToken,
        expense::{Expense, ExpenseId},
        filter::{CategoryFilter, FilterCriteria},
    };

    const NOW: OffsetDateTime = datetime!(2026-10-16 14:30 UTC);

    #[test]
    fn report_follows_filters_but_summary_does_not() {
        let today = NOW.date();
        let expenses = vec![
            Expense::build("Groceries", 20.0, Category::Food, today)
                .into_expense(ExpenseId::new("1"), NOW),
            Expense::build("Power", 50.0, Category::Bills, today - Duration::days(30))
                .into_expense(ExpenseId::new("2"), NOW - Duration::hours(1)),
        ];
        let criteria = FilterCriteria {
            category: CategoryFilter::All,
            date_range: DateRangeToken::Last7Days,
            search: String::new(),
        };

        let report = ExpenseReport::build(&expenses, &criteria, NOW, 5);

        assert_eq!(report.visible, vec![expenses[0].clone()]);
        assert_eq!(report.total, 20.0);
        assert_eq!(report.top_categories, vec![(Category::Food, 20.0)]);
        assert_eq!(report.summary.total, 70.0);
        assert_eq!(report.summary.this_month, 20.0);
        assert_eq!(report.summary.last_month, 50.0);
    }
}
