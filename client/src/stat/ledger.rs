use super::datatype::*;
use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}
impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month: month.clamp(1, 12),
        }
    }
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }
    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }
    pub fn shift(self, delta: i32) -> Self {
        let total = self.year * 12 + (self.month as i32 - 1) + delta;
        let total = total.max(0);
        Self::new(total / 12, (total % 12) as u32 + 1)
    }
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
    pub fn last_day(self) -> NaiveDate {
        self.shift(1)
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}
impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBreakdown {
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub color: String,
    pub total: Decimal,
    pub count: u32,
    pub percentage: f64,
}

/// Categories and transactions as last fetched from the server.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    pub category: Vec<Category>,
    pub transaction: Vec<TransactionWithCategory>,
}
impl Ledger {
    pub fn new(category: Vec<Category>, transaction: Vec<TransactionWithCategory>) -> Self {
        Self {
            category,
            transaction,
        }
    }

    pub fn transactions_in(&self, month: MonthKey) -> Vec<&TransactionWithCategory> {
        self.transaction
            .iter()
            .filter(|t| month.contains(t.transaction_date))
            .collect()
    }

    pub fn monthly_stats(&self, month: MonthKey) -> MonthlyStats {
        let mut stats = MonthlyStats::default();
        for t in self.transactions_in(month) {
            match t.kind() {
                CategoryType::Income => stats.income = stats.income.saturating_add(t.amount),
                CategoryType::Expense => stats.expense = stats.expense.saturating_add(t.amount),
            }
        }
        stats.total = stats.income.saturating_sub(stats.expense);
        stats
    }

    pub fn categories_of(&self, kind: CategoryType) -> Vec<&Category> {
        self.category
            .iter()
            .filter(|c| c.category_type == kind)
            .collect()
    }

    pub fn find_category(&self, id: &str) -> Option<&Category> {
        self.category.iter().find(|c| c.id == id)
    }

    pub fn category_breakdown(&self, month: MonthKey, kind: CategoryType) -> Vec<CategoryBreakdown> {
        let mut order: Vec<Option<CategoryId>> = Vec::new();
        let mut groups: HashMap<Option<CategoryId>, CategoryBreakdown> = HashMap::new();
        for t in self.transactions_in(month) {
            if t.kind() != kind {
                continue;
            }
            let key = t.category.as_ref().map(|c| c.id.clone());
            let row = groups.entry(key.clone()).or_insert_with(|| {
                order.push(key.clone());
                CategoryBreakdown {
                    category_id: key.clone(),
                    name: t.category_name().to_string(),
                    color: t
                        .category
                        .as_ref()
                        .map(|c| c.color.clone())
                        .unwrap_or_default(),
                    total: Decimal::ZERO,
                    count: 0,
                    percentage: 0.0,
                }
            });
            row.total = row.total.saturating_add(t.amount);
            row.count += 1;
        }
        let sum = groups
            .values()
            .fold(Decimal::ZERO, |acc, g| acc.saturating_add(g.total));
        let mut rows: Vec<CategoryBreakdown> = order
            .into_iter()
            .filter_map(|k| groups.remove(&k))
            .map(|mut g| {
                if !sum.is_zero() {
                    g.percentage = g
                        .total
                        .checked_div(sum)
                        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
                        .map(|p| p.round_dp(1).to_f64().unwrap_or(0.0))
                        .unwrap_or(0.0);
                }
                g
            })
            .collect();
        // stable: equal totals keep first-seen order
        rows.sort_by(|a, b| b.total.cmp(&a.total));
        rows
    }
}

/// Scales income/expense so the larger bar is `max_height` tall.
pub fn bar_heights(stats: &MonthlyStats, max_height: u64) -> (u64, u64) {
    let top = stats.income.max(stats.expense);
    if top <= Decimal::ZERO {
        return (0, 0);
    }
    let scale = |v: Decimal| {
        (v.max(Decimal::ZERO) / top * Decimal::from(max_height))
            .round()
            .to_u64()
            .unwrap_or(0)
    };
    (scale(stats.income), scale(stats.expense))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cat(id: &str, name: &str, kind: CategoryType) -> CategoryRef {
        CategoryRef {
            id: id.to_string(),
            name: name.to_string(),
            category_type: kind,
            color: "#3B82F6".to_string(),
        }
    }

    fn tx(id: &str, amount: i64, date: NaiveDate, category: Option<CategoryRef>) -> TransactionWithCategory {
        TransactionWithCategory {
            id: id.to_string(),
            user_id: None,
            amount: Decimal::from(amount),
            description: None,
            transaction_date: date,
            category,
        }
    }

    fn sample() -> Ledger {
        let salary = cat("1", "Salary", CategoryType::Income);
        let food = cat("2", "Food", CategoryType::Expense);
        let rent = cat("3", "Rent", CategoryType::Expense);
        Ledger::new(
            Vec::new(),
            vec![
                tx("a", 3_000_000, day(2025, 3, 1), Some(salary)),
                tx("b", 12_000, day(2025, 3, 2), Some(food.clone())),
                tx("c", 800_000, day(2025, 3, 5), Some(rent)),
                tx("d", 8_000, day(2025, 3, 9), Some(food.clone())),
                tx("e", 5_000, day(2025, 3, 20), None),
                tx("f", 99_000, day(2025, 4, 1), Some(food)),
            ],
        )
    }

    #[test]
    fn month_key_shift_wraps_years() {
        assert_eq!(MonthKey::new(2025, 12).shift(1), MonthKey::new(2026, 1));
        assert_eq!(MonthKey::new(2025, 1).shift(-1), MonthKey::new(2024, 12));
        assert_eq!(MonthKey::new(2024, 2).last_day(), day(2024, 2, 29));
        assert_eq!(MonthKey::new(2025, 12).last_day(), day(2025, 12, 31));
    }

    #[test]
    fn monthly_total_is_signed_sum_of_month() {
        let ledger = sample();
        let month = MonthKey::new(2025, 3);
        let stats = ledger.monthly_stats(month);
        assert_eq!(stats.income, Decimal::from(3_000_000));
        assert_eq!(stats.expense, Decimal::from(825_000));

        let signed: Decimal = ledger
            .transactions_in(month)
            .iter()
            .map(|t| t.signed_amount())
            .sum();
        assert_eq!(stats.total, signed);
    }

    #[test]
    fn empty_month_has_zero_stats_and_bars() {
        let stats = sample().monthly_stats(MonthKey::new(2024, 1));
        assert_eq!(stats, MonthlyStats::default());
        assert_eq!(bar_heights(&stats, 150), (0, 0));
    }

    #[test]
    fn bars_scale_to_larger_total() {
        let stats = MonthlyStats {
            income: Decimal::from(200),
            expense: Decimal::from(50),
            total: Decimal::from(150),
        };
        assert_eq!(bar_heights(&stats, 150), (150, 38));
    }

    #[test]
    fn breakdown_groups_by_category_with_percentages() {
        let rows = sample().category_breakdown(MonthKey::new(2025, 3), CategoryType::Expense);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Food", "Uncategorized"]);
        assert_eq!(rows[1].count, 2);
        assert_eq!(rows[1].total, Decimal::from(20_000));
        let pct: f64 = rows.iter().map(|r| r.percentage).sum();
        assert!((pct - 100.0).abs() < 0.2);
    }

    #[test]
    fn huge_amounts_saturate_instead_of_panicking() {
        let raw = r##"[
            {"id": 1, "amount": 5e28, "transaction_date": "2025-03-02",
             "category": {"id": 1, "name": "Lottery", "type": "income", "color": "#10B981"}},
            {"id": 2, "amount": 5e28, "transaction_date": "2025-03-03",
             "category": {"id": 1, "name": "Lottery", "type": "income", "color": "#10B981"}},
            {"id": 3, "amount": 5e28, "transaction_date": "2025-03-04"},
            {"id": 4, "amount": 5e28, "transaction_date": "2025-03-05"}
        ]"##;
        let transactions: Vec<TransactionWithCategory> = serde_json::from_str(raw).unwrap();
        let ledger = Ledger::new(Vec::new(), transactions);
        let month = MonthKey::new(2025, 3);

        let stats = ledger.monthly_stats(month);
        assert_eq!(stats.income, Decimal::MAX);
        assert_eq!(stats.expense, Decimal::MAX);
        assert_eq!(stats.total, Decimal::ZERO);
        assert_eq!(bar_heights(&stats, 150), (150, 150));

        let rows = ledger.category_breakdown(month, CategoryType::Income);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total, Decimal::MAX);
        assert_eq!(rows[0].count, 2);
        assert!((rows[0].percentage - 100.0).abs() < 1e-9);
    }
}
