//! Spending entry operations and expense statistics

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{date_param, parse_date, parse_datetime, parse_decimal, Database};
use crate::error::{Error, Result};
use crate::models::{CategoryStat, DailyStat, Expense, ExpenseStatistics, NewExpense, Scope};

const EXPENSE_COLUMNS: &str = "id, amount, category_name, description, expense_date, payer, \
     is_public, user_id, created_at, updated_at";

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let amount: String = row.get(1)?;
    let expense_date: String = row.get(4)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    Ok(Expense {
        id: row.get(0)?,
        amount: parse_decimal(&amount),
        category_name: row.get(2)?,
        description: row.get(3)?,
        expense_date: parse_date(&expense_date),
        payer: row.get(5)?,
        is_public: row.get(6)?,
        user_id: row.get(7)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

impl Database {
    /// Create a spending entry
    pub fn create_expense(&self, new_expense: &NewExpense) -> Result<Expense> {
        if !new_expense.validate() {
            return Err(Error::InvalidData("Invalid expense data".to_string()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO expenses \
             (amount, category_name, description, expense_date, payer, is_public, user_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                new_expense.amount.to_string(),
                new_expense.category_name,
                new_expense.description,
                date_param(new_expense.expense_date),
                new_expense.payer,
                new_expense.is_public,
                new_expense.user_id,
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_expense(id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {} not found after insert", id)))
    }

    /// Get a spending entry by ID
    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS),
                params![id],
                expense_from_row,
            )
            .optional()?;
        Ok(expense)
    }

    /// Replace a spending entry in full
    pub fn update_expense(&self, id: i64, new_expense: &NewExpense) -> Result<Expense> {
        if self.get_expense(id)?.is_none() {
            return Err(Error::NotFound(format!("Expense {} not found", id)));
        }

        if !new_expense.validate() {
            return Err(Error::InvalidData("Invalid expense data".to_string()));
        }

        let conn = self.conn()?;
        conn.execute(
            "UPDATE expenses SET amount = ?, category_name = ?, description = ?, \
             expense_date = ?, payer = ?, is_public = ?, user_id = ?, \
             updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![
                new_expense.amount.to_string(),
                new_expense.category_name,
                new_expense.description,
                date_param(new_expense.expense_date),
                new_expense.payer,
                new_expense.is_public,
                new_expense.user_id,
                id,
            ],
        )?;
        drop(conn);

        self.get_expense(id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {} not found after update", id)))
    }

    /// Delete a spending entry
    pub fn delete_expense(&self, id: i64) -> Result<()> {
        if self.get_expense(id)?.is_none() {
            return Err(Error::NotFound(format!("Expense {} not found", id)));
        }

        let conn = self.conn()?;
        conn.execute("DELETE FROM expenses WHERE id = ?", params![id])?;
        Ok(())
    }

    /// List all spending entries, newest first
    pub fn list_expenses(&self) -> Result<Vec<Expense>> {
        self.query_expenses(
            &format!(
                "SELECT {} FROM expenses ORDER BY expense_date DESC",
                EXPENSE_COLUMNS
            ),
            &[],
        )
    }

    /// List spending entries within a date range (inclusive)
    pub fn list_expenses_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Expense>> {
        self.list_expenses_filtered(Some((start, end)), None, None, None)
    }

    /// List spending entries matching the given filters, newest first
    ///
    /// Blank category and payer strings count as "no filter", so the HTTP
    /// layer can pass query parameters straight through.
    pub fn list_expenses_filtered(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
        category: Option<&str>,
        payer: Option<&str>,
        is_public: Option<bool>,
    ) -> Result<Vec<Expense>> {
        let mut sql = format!("SELECT {} FROM expenses WHERE 1=1", EXPENSE_COLUMNS);
        let mut bound: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some((start, end)) = range {
            sql.push_str(" AND expense_date BETWEEN ? AND ?");
            bound.push(Box::new(date_param(start)));
            bound.push(Box::new(date_param(end)));
        }
        if let Some(c) = category.filter(|s| !s.trim().is_empty()) {
            sql.push_str(" AND category_name = ?");
            bound.push(Box::new(c.to_string()));
        }
        if let Some(p) = payer.filter(|s| !s.trim().is_empty()) {
            sql.push_str(" AND payer = ?");
            bound.push(Box::new(p.to_string()));
        }
        if let Some(public) = is_public {
            sql.push_str(" AND is_public = ?");
            bound.push(Box::new(public));
        }
        sql.push_str(" ORDER BY expense_date DESC");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let expenses = stmt
            .query_map(rusqlite::params_from_iter(bound.iter()), expense_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(expenses)
    }

    /// The 10 most recently created spending entries
    pub fn recent_expenses(&self) -> Result<Vec<Expense>> {
        self.query_expenses(
            &format!(
                "SELECT {} FROM expenses ORDER BY created_at DESC, id DESC LIMIT 10",
                EXPENSE_COLUMNS
            ),
            &[],
        )
    }

    /// Count all spending entries
    pub fn count_expenses(&self) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?)
    }

    /// Total spend in a date range for the scope (0 when no entries match)
    pub fn expense_total_in_range(
        &self,
        scope: Scope,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Decimal> {
        let conn = self.conn()?;
        let amounts: Vec<String> = match scope {
            Scope::User(user_id) => {
                let mut stmt = conn.prepare(
                    "SELECT amount FROM expenses WHERE user_id = ? \
                     AND expense_date BETWEEN ? AND ?",
                )?;
                let rows = stmt.query_map(
                    params![user_id, date_param(start), date_param(end)],
                    |row| row.get(0),
                )?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            Scope::All => {
                let mut stmt = conn
                    .prepare("SELECT amount FROM expenses WHERE expense_date BETWEEN ? AND ?")?;
                let rows = stmt
                    .query_map(params![date_param(start), date_param(end)], |row| {
                        row.get(0)
                    })?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        Ok(amounts
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc + parse_decimal(s)))
    }

    /// Number of distinct calendar dates with at least one spending entry
    /// in the range, for the scope
    pub fn distinct_expense_days_in_range(
        &self,
        scope: Scope,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64> {
        let conn = self.conn()?;
        let count = match scope {
            Scope::User(user_id) => conn.query_row(
                "SELECT COUNT(DISTINCT expense_date) FROM expenses \
                 WHERE user_id = ? AND expense_date BETWEEN ? AND ?",
                params![user_id, date_param(start), date_param(end)],
                |row| row.get(0),
            )?,
            Scope::All => conn.query_row(
                "SELECT COUNT(DISTINCT expense_date) FROM expenses \
                 WHERE expense_date BETWEEN ? AND ?",
                params![date_param(start), date_param(end)],
                |row| row.get(0),
            )?,
        };
        Ok(count)
    }

    /// Spending statistics over a date range: totals plus per-category and
    /// per-day breakdowns, narrowed by the same optional filters as
    /// [`Database::list_expenses_filtered`]
    pub fn expense_statistics(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        category: Option<&str>,
        payer: Option<&str>,
        is_public: Option<bool>,
    ) -> Result<ExpenseStatistics> {
        let expenses =
            self.list_expenses_filtered(Some((start, end)), category, payer, is_public)?;

        let total_amount = expenses
            .iter()
            .fold(Decimal::ZERO, |acc, e| acc + e.amount);
        let total_count = expenses.len() as i64;

        // Group in insertion order, then sort the finished buckets
        let mut categories: Vec<CategoryStat> = Vec::new();
        let mut days: Vec<DailyStat> = Vec::new();

        for expense in &expenses {
            let category = expense
                .category_name
                .clone()
                .unwrap_or_else(|| "uncategorized".to_string());
            match categories.iter_mut().find(|c| c.category == category) {
                Some(stat) => {
                    stat.amount += expense.amount;
                    stat.count += 1;
                }
                None => categories.push(CategoryStat {
                    category,
                    amount: expense.amount,
                    count: 1,
                }),
            }

            match days.iter_mut().find(|d| d.date == expense.expense_date) {
                Some(stat) => {
                    stat.amount += expense.amount;
                    stat.count += 1;
                }
                None => days.push(DailyStat {
                    date: expense.expense_date,
                    amount: expense.amount,
                    count: 1,
                }),
            }
        }

        // Largest categories first, days in calendar order
        categories.sort_by(|a, b| b.amount.cmp(&a.amount));
        days.sort_by_key(|d| d.date);

        Ok(ExpenseStatistics {
            total_amount,
            total_count,
            by_category: categories,
            by_day: days,
        })
    }

    fn query_expenses(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let expenses = stmt
            .query_map(params, expense_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(expenses)
    }
}
