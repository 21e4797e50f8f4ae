use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::auth::ValidationError;
use crate::stat::datatype::{Category, CategoryType, parse_day};
use crate::stat::sync::{CreateCategoryReq, CreateTransactionReq, iso_day};

pub const COLORS: [&str; 7] = [
    "#EF4444", "#F59E0B", "#10B981", "#3B82F6", "#8B5CF6", "#EC4899", "#6B7280",
];

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Keeps digits only and inserts `,` every three places: "1234567" -> "1,234,567".
pub fn format_amount_input(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    group_thousands(&digits)
}

/// Parses user input with separators removed; only positive amounts pass.
pub fn parse_amount(text: &str) -> Result<Decimal, ValidationError> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(ValidationError::InvalidAmount);
    }
    match Decimal::from_str(&cleaned) {
        Ok(v) if v > Decimal::ZERO => Ok(v),
        _ => Err(ValidationError::InvalidAmount),
    }
}

pub fn format_currency(amount: Decimal, symbol: &str) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    let abs = amount.abs().round_dp(2).normalize();
    let text = abs.to_string();
    let (int_part, frac) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };
    let mut out = format!("{symbol}{sign}{}", group_thousands(&int_part));
    if let Some(f) = frac {
        out.push('.');
        out.push_str(&f);
    }
    out
}

/// Single-line editor
#[derive(Default, Clone, Debug)]
pub struct LineEdit {
    pub value: String,
    pub cursor: usize,
    pub password: bool,
}

impl LineEdit {
    pub fn masked() -> Self {
        Self {
            password: true,
            ..Self::default()
        }
    }
    pub fn set(&mut self, s: impl Into<String>) {
        self.value = s.into();
        self.cursor = self.value.chars().count();
    }
    fn byte_pos(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
    pub fn push(&mut self, ch: char) {
        let at = self.byte_pos();
        self.value.insert(at, ch);
        self.cursor += 1;
    }
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_pos();
            self.value.remove(at);
        }
    }
    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }
    pub fn right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
    pub fn rendered(&self) -> String {
        if self.password {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransactionForm {
    pub category: Option<Category>,
    pub amount: String,
    pub description: LineEdit,
    pub date: LineEdit,
}

impl TransactionForm {
    pub fn new(today: NaiveDate) -> Self {
        let mut date = LineEdit::default();
        date.set(iso_day(today));
        Self {
            category: None,
            amount: String::new(),
            description: LineEdit::default(),
            date,
        }
    }

    /// Re-formats the amount after each keystroke.
    pub fn type_amount(&mut self, ch: char) {
        let mut raw = self.amount.clone();
        raw.push(ch);
        self.amount = format_amount_input(&raw);
    }

    pub fn erase_amount(&mut self) {
        let mut raw: String = self.amount.chars().filter(|c| c.is_ascii_digit()).collect();
        raw.pop();
        self.amount = format_amount_input(&raw);
    }

    pub fn validate(&self) -> Result<CreateTransactionReq, ValidationError> {
        let category = self
            .category
            .as_ref()
            .ok_or(ValidationError::MissingCategory)?;
        let amount = parse_amount(&self.amount)?;
        let date = parse_day(&self.date.value).ok_or(ValidationError::InvalidDate)?;
        let description = self.description.value.trim();
        Ok(CreateTransactionReq {
            category_id: category.id.clone(),
            amount,
            transaction_date: iso_day(date),
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }

    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::new(today);
    }
}

#[derive(Debug, Clone)]
pub struct CategoryForm {
    pub name: LineEdit,
    pub category_type: CategoryType,
    pub color_idx: usize,
}

impl Default for CategoryForm {
    fn default() -> Self {
        Self {
            name: LineEdit::default(),
            category_type: CategoryType::Expense,
            color_idx: 0,
        }
    }
}

impl CategoryForm {
    pub fn color(&self) -> &'static str {
        COLORS[self.color_idx % COLORS.len()]
    }
    pub fn next_color(&mut self) {
        self.color_idx = (self.color_idx + 1) % COLORS.len();
    }
    pub fn prev_color(&mut self) {
        self.color_idx = (self.color_idx + COLORS.len() - 1) % COLORS.len();
    }
    pub fn validate(&self) -> Result<CreateCategoryReq, ValidationError> {
        let name = self.name.value.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        Ok(CreateCategoryReq {
            name: name.to_string(),
            category_type: self.category_type,
            color: self.color().to_string(),
        })
    }
}
