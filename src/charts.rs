//! Spending-by-category charts.
//!
//! Charts are built as ECharts configurations with charming. The caller
//! serializes them (`Chart` implements `Display` as JSON) and hands them to
//! whatever renders the page.

use std::borrow::Borrow;

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    datatype::DataPointItem,
    element::{AxisType, ItemStyle, Tooltip, Trigger},
    series::{Pie, bar::Bar},
};

use crate::{aggregation::top_categories, category::Category, expense::Expense};

/// The shape of the spending overview chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    /// A ring with one slice per category.
    #[default]
    Doughnut,
    /// One bar per category.
    Bar,
}

/// Build the spending overview chart for `expenses`.
///
/// Returns `None` when there are no expenses, the caller should show a hint
/// to add some instead of an empty chart.
pub fn spending_chart<E: Borrow<Expense>>(
    expenses: impl IntoIterator<Item = E>,
    kind: ChartKind,
) -> Option<Chart> {
    let totals = top_categories(expenses, Category::ALL.len());

    if totals.is_empty() {
        return None;
    }

    let chart = match kind {
        ChartKind::Doughnut => doughnut_chart(&totals),
        ChartKind::Bar => bar_chart(&totals),
    };

    Some(chart)
}

fn doughnut_chart(totals: &[(Category, f64)]) -> Chart {
    Chart::new()
        .title(Title::new().text("Spending Overview"))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().top("bottom"))
        .series(
            Pie::new()
                .name("Spending by Category")
                .radius(vec!["40%", "70%"])
                .data(category_points(totals)),
        )
}

fn bar_chart(totals: &[(Category, f64)]) -> Chart {
    let labels = totals
        .iter()
        .map(|(category, _)| category.chart_label())
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Spending Overview"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(
            Bar::new()
                .name("Spending by Category")
                .data(category_points(totals)),
        )
}

/// One data point per category, colored from the category palette.
fn category_points(totals: &[(Category, f64)]) -> Vec<DataPointItem> {
    totals
        .iter()
        .map(|(category, total)| {
            DataPointItem::new(*total)
                .name(category.chart_label())
                .item_style(ItemStyle::new().color(category.color()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::{ChartKind, spending_chart};
    use crate::{
        category::Category,
        expense::{Expense, ExpenseId},
    };

    fn create_test_expense(amount: f64, category: Category) -> Expense {
        Expense::build("Test", amount, category, date!(2026-10-16))
            .into_expense(ExpenseId::new_random(), datetime!(2026-10-16 9:00 UTC))
    }

    #[test]
    fn no_chart_without_expenses() {
        let expenses: Vec<Expense> = Vec::new();

        assert!(spending_chart(&expenses, ChartKind::Doughnut).is_none());
    }

    #[test]
    fn doughnut_uses_category_colors_and_labels() {
        let expenses = vec![
            create_test_expense(20.0, Category::Food),
            create_test_expense(50.0, Category::Bills),
        ];

        let options = spending_chart(&expenses, ChartKind::Doughnut)
            .unwrap()
            .to_string();

        assert!(options.contains("\"pie\""));
        assert!(options.contains("Food"));
        assert!(options.contains("Bills"));
        assert!(options.contains(Category::Food.color()));
        assert!(options.contains(Category::Bills.color()));
    }

    #[test]
    fn bar_chart_has_category_axis() {
        let expenses = vec![create_test_expense(12.0, Category::Health)];

        let options = spending_chart(&expenses, ChartKind::Bar).unwrap().to_string();

        assert!(options.contains("\"bar\""));
        assert!(options.contains("\"category\""));
        assert!(options.contains("Health"));
        assert!(options.contains(Category::Health.color()));
    }
}
