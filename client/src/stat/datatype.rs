use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

pub type CategoryId = String;
pub type TransactionId = String;
pub type UserId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    Expense,
}
impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "income",
            CategoryType::Expense => "expense",
        }
    }
    pub fn label(&self) -> &'static str {
        match self {
            CategoryType::Income => "Income",
            CategoryType::Expense => "Expense",
        }
    }
    pub fn toggle(&self) -> Self {
        match self {
            CategoryType::Income => CategoryType::Expense,
            CategoryType::Expense => CategoryType::Income,
        }
    }
    /// income counts positive, everything else negative
    pub fn sign(&self) -> Decimal {
        match self {
            CategoryType::Income => Decimal::ONE,
            CategoryType::Expense => Decimal::NEGATIVE_ONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "de_id")]
    pub id: CategoryId,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub user_id: Option<UserId>,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Category as embedded in a transaction listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(deserialize_with = "de_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    #[serde(default)]
    pub color: String,
}

/// Read-only joined view returned by the transaction listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionWithCategory {
    #[serde(deserialize_with = "de_id")]
    pub id: TransactionId,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub user_id: Option<UserId>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "de_day")]
    pub transaction_date: NaiveDate,
    #[serde(default)]
    pub category: Option<CategoryRef>,
}
impl TransactionWithCategory {
    /// Uncategorized rows are shown and summed as expenses.
    pub fn kind(&self) -> CategoryType {
        self.category
            .as_ref()
            .map(|c| c.category_type)
            .unwrap_or(CategoryType::Expense)
    }
    pub fn signed_amount(&self) -> Decimal {
        self.amount * self.kind().sign()
    }
    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Uncategorized")
    }
    pub fn display_description(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => "Transaction",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthlyStats {
    pub income: Decimal,
    pub expense: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub category_color: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub descriptions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    #[serde(rename = "categoryStats", default)]
    pub category_stats: Vec<CategoryStat>,
    #[serde(rename = "totalAmount", default, with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}
impl From<RawId> for String {
    fn from(v: RawId) -> Self {
        match v {
            RawId::Text(s) => s,
            RawId::Int(i) => i.to_string(),
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(RawId::deserialize(d)?.into())
}

fn de_opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(d)?.map(String::from))
}

fn de_opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(d)?.filter(|s| !s.trim().is_empty()))
}

// accepts "2025-12-01" as well as "2025-12-01T00:00:00Z"
fn de_day<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(d)?;
    parse_day(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

pub fn parse_day(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%Y/%m/%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn transaction_accepts_numeric_ids_and_string_amounts() {
        let raw = r##"{
            "id": 7,
            "user_id": "u-1",
            "amount": "12500.50",
            "description": null,
            "transaction_date": "2025-03-04T00:00:00Z",
            "category": {"id": 3, "name": "Salary", "type": "income", "color": "#10B981"}
        }"##;
        let tx: TransactionWithCategory = serde_json::from_str(raw).unwrap();
        assert_eq!(tx.id, "7");
        assert_eq!(tx.amount, Decimal::from_str("12500.50").unwrap());
        assert_eq!(tx.transaction_date, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert_eq!(tx.kind(), CategoryType::Income);
        assert_eq!(tx.display_description(), "Transaction");
    }

    #[test]
    fn uncategorized_transaction_counts_as_expense() {
        let raw = r##"{"id":"a","amount":3000,"transaction_date":"2025-03-04"}"##;
        let tx: TransactionWithCategory = serde_json::from_str(raw).unwrap();
        assert_eq!(tx.kind(), CategoryType::Expense);
        assert_eq!(tx.signed_amount(), Decimal::from(-3000));
        assert_eq!(tx.category_name(), "Uncategorized");
    }

    #[test]
    fn statistics_report_uses_camel_case_keys() {
        let raw = r##"{
            "categoryStats": [
                {"category_id": 1, "category_name": "Food", "category_color": "#EF4444",
                 "total": 45000, "count": 3, "percentage": 75.0, "descriptions": ""}
            ],
            "totalAmount": 60000
        }"##;
        let report: StatisticsReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.total_amount, Decimal::from(60000));
        assert_eq!(report.category_stats[0].category_id.as_deref(), Some("1"));
        assert_eq!(report.category_stats[0].descriptions, None);
    }
}
