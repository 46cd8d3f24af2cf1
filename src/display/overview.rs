//! Month overview formatting
//!
//! Renders a [`MonthOverview`] as a fixed-width table for the terminal.

use crate::services::MonthOverview;

/// Format the month's buckets with allocation, activity and remaining
pub fn format_month_overview(overview: &MonthOverview) -> String {
    let mut output = String::new();
    output.push_str(&format!("Month: {}\n", overview.month));
    output.push_str(&"=".repeat(60));
    output.push('\n');

    if overview.buckets.is_empty() {
        output.push_str("No active buckets this month.\n");
    } else {
        let name_width = overview
            .buckets
            .iter()
            .map(|b| b.name.len())
            .max()
            .unwrap_or(6)
            .max(6);

        output.push_str(&format!(
            "{:<name_width$}  {:>12}  {:>12}  {:>12}\n",
            "Bucket",
            "Allocated",
            "Activity",
            "Remaining",
            name_width = name_width,
        ));
        output.push_str(&format!(
            "{:-<name_width$}  {:->12}  {:->12}  {:->12}\n",
            "",
            "",
            "",
            "",
            name_width = name_width,
        ));

        for bucket in &overview.buckets {
            let flag = if bucket.is_overspent() { "  overspent" } else { "" };
            output.push_str(&format!(
                "{:<name_width$}  {:>12}  {:>12}  {:>12}{}\n",
                bucket.name,
                bucket.allocated.to_string(),
                bucket.activity.to_string(),
                bucket.remaining.to_string(),
                flag,
                name_width = name_width,
            ));
        }
    }

    output.push('\n');
    output.push_str(&format!("Income received:  {:>12}\n", overview.income.to_string()));
    output.push_str(&format!(
        "Allocated:        {:>12}\n",
        overview.total_allocated.to_string()
    ));
    output.push_str(&format!(
        "Left to budget:   {:>12}\n",
        overview.left_to_budget.to_string()
    ));
    if !overview.unassigned.is_zero() {
        output.push_str(&format!(
            "Unassigned:       {:>12}\n",
            overview.unassigned.to_string()
        ));
    }

    output
}
