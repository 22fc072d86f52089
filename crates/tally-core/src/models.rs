//! Domain models for Tally

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum annual interest rate accepted on investment records (percent)
pub const MAX_ANNUAL_INTEREST_RATE: u32 = 100;

/// Kind of ledger entry
///
/// The well-known kinds drive validation and aggregation rules; anything
/// else round-trips through `Other` so user-defined kinds keep working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    Salary,
    Gold,
    Investment,
    Bonus,
    Other(String),
}

impl RecordType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Salary => "salary",
            Self::Gold => "gold",
            Self::Investment => "investment",
            Self::Bonus => "bonus",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for RecordType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "salary" => Self::Salary,
            "gold" => Self::Gold,
            "investment" => Self::Investment,
            "bonus" => Self::Bonus,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<RecordType> for String {
    fn from(t: RecordType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregation granularity: one user or the whole household
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    User(i64),
    All,
}

/// A single ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: i64,
    pub user_id: i64,
    pub record_type: RecordType,
    pub amount: Decimal,
    pub description: Option<String>,
    pub record_date: NaiveDate,
    /// Grams, required for gold entries
    pub gold_weight: Option<Decimal>,
    /// Percent in [0, 100], meaningful for investment entries
    pub annual_interest_rate: Option<Decimal>,
    /// Person responsible for the entry, independent of user_id
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or replacing a ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssetRecord {
    pub user_id: i64,
    pub record_type: RecordType,
    /// Absent amounts are coerced to 0 before validation and persistence
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    pub record_date: NaiveDate,
    #[serde(default)]
    pub gold_weight: Option<Decimal>,
    #[serde(default)]
    pub annual_interest_rate: Option<Decimal>,
    pub owner: String,
}

impl NewAssetRecord {
    /// Gate-keeping predicate for ledger writes
    ///
    /// Pure: never panics, never mutates. Callers that receive `false`
    /// must reject the write as invalid input.
    pub fn validate(&self) -> bool {
        if self.user_id <= 0 {
            return false;
        }

        if self.record_type.as_str().trim().is_empty() {
            return false;
        }

        // Amount may be absent (callers coerce to 0), but never negative
        if let Some(amount) = self.amount {
            if amount < Decimal::ZERO {
                return false;
            }
        }

        if self.owner.trim().is_empty() {
            return false;
        }

        // Gold entries must carry a positive weight
        if self.record_type == RecordType::Gold {
            match self.gold_weight {
                Some(weight) if weight > Decimal::ZERO => {}
                _ => return false,
            }
        }

        // Investment entries may omit the rate, but a present rate must be a
        // valid percentage
        if self.record_type == RecordType::Investment {
            if let Some(rate) = self.annual_interest_rate {
                if rate < Decimal::ZERO || rate > Decimal::from(MAX_ANNUAL_INTEREST_RATE) {
                    return false;
                }
            }
        }

        true
    }
}

/// A single spending entry, kept separate from the asset ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub amount: Decimal,
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub payer: String,
    pub is_public: bool,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or replacing a spending entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub amount: Decimal,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub payer: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl NewExpense {
    pub fn validate(&self) -> bool {
        self.amount >= Decimal::ZERO && !self.payer.trim().is_empty()
    }
}

/// Year-end asset forecast
///
/// Derived on every request from current store contents and the current
/// date; never persisted. Field order is part of the API contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetForecast {
    pub current_total_assets: Decimal,
    pub monthly_income: Decimal,
    pub daily_expense: Decimal,
    pub predicted_year_end_assets: Decimal,
    pub expected_income: Decimal,
    pub expected_expense: Decimal,
    pub interest_income: Decimal,
}

/// Spending totals for one expense category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category: String,
    pub amount: Decimal,
    pub count: i64,
}

/// Spending totals for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub count: i64,
}

/// Expense statistics over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseStatistics {
    pub total_amount: Decimal,
    pub total_count: i64,
    pub by_category: Vec<CategoryStat>,
    pub by_day: Vec<DailyStat>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_record() -> NewAssetRecord {
        NewAssetRecord {
            user_id: 1,
            record_type: RecordType::Salary,
            amount: Some(dec!(10000)),
            description: None,
            record_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            gold_weight: None,
            annual_interest_rate: None,
            owner: "alice".to_string(),
        }
    }

    #[test]
    fn test_record_type_round_trip() {
        assert_eq!(RecordType::from("salary"), RecordType::Salary);
        assert_eq!(RecordType::from("gold"), RecordType::Gold);
        assert_eq!(
            RecordType::from("house"),
            RecordType::Other("house".to_string())
        );
        assert_eq!(String::from(RecordType::Investment), "investment");
        assert_eq!(RecordType::from("house").as_str(), "house");
    }

    #[test]
    fn test_validate_accepts_base_record() {
        assert!(base_record().validate());
    }

    #[test]
    fn test_validate_rejects_non_positive_user() {
        let mut rec = base_record();
        rec.user_id = 0;
        assert!(!rec.validate());
        rec.user_id = -3;
        assert!(!rec.validate());
    }

    #[test]
    fn test_validate_rejects_blank_type_and_owner() {
        let mut rec = base_record();
        rec.record_type = RecordType::Other("   ".to_string());
        assert!(!rec.validate());

        let mut rec = base_record();
        rec.owner = "".to_string();
        assert!(!rec.validate());
    }

    #[test]
    fn test_validate_amount_rules() {
        let mut rec = base_record();
        rec.amount = None;
        assert!(rec.validate(), "absent amount is allowed, coerced later");

        rec.amount = Some(dec!(-0.01));
        assert!(!rec.validate());
    }

    #[test]
    fn test_validate_gold_weight_rules() {
        let mut rec = base_record();
        rec.record_type = RecordType::Gold;
        rec.gold_weight = None;
        assert!(!rec.validate());

        rec.gold_weight = Some(Decimal::ZERO);
        assert!(!rec.validate());

        rec.gold_weight = Some(dec!(1));
        assert!(rec.validate());
    }

    #[test]
    fn test_validate_interest_rate_rules() {
        let mut rec = base_record();
        rec.record_type = RecordType::Investment;
        rec.annual_interest_rate = None;
        assert!(rec.validate(), "rate is optional on investments");

        rec.annual_interest_rate = Some(dec!(100));
        assert!(rec.validate());

        rec.annual_interest_rate = Some(dec!(100.01));
        assert!(!rec.validate());

        rec.annual_interest_rate = Some(dec!(-1));
        assert!(!rec.validate());
    }
}
