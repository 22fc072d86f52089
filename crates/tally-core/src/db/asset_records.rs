//! Asset ledger operations

use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{date_param, parse_date, parse_datetime, parse_decimal, Database};
use crate::error::{Error, Result};
use crate::models::{AssetRecord, NewAssetRecord, RecordType, Scope};

const RECORD_COLUMNS: &str = "id, user_id, record_type, amount, description, record_date, \
     gold_weight, annual_interest_rate, owner, created_at, updated_at";

/// Map a row selected with [`RECORD_COLUMNS`] into an [`AssetRecord`]
fn record_from_row(row: &Row<'_>) -> rusqlite::Result<AssetRecord> {
    let record_type: String = row.get(2)?;
    let amount: String = row.get(3)?;
    let record_date: String = row.get(5)?;
    let gold_weight: Option<String> = row.get(6)?;
    let annual_interest_rate: Option<String> = row.get(7)?;
    let created_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;

    Ok(AssetRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        record_type: RecordType::from(record_type),
        amount: parse_decimal(&amount),
        description: row.get(4)?,
        record_date: parse_date(&record_date),
        gold_weight: gold_weight.as_deref().map(parse_decimal),
        annual_interest_rate: annual_interest_rate.as_deref().map(parse_decimal),
        owner: row.get(8)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

impl Database {
    /// Create a ledger entry
    ///
    /// An absent amount is coerced to 0 before validation and persistence.
    /// Rejected writes leave the store untouched.
    pub fn create_asset_record(&self, new_record: &NewAssetRecord) -> Result<AssetRecord> {
        let mut record = new_record.clone();
        record.amount = Some(record.amount.unwrap_or(Decimal::ZERO));

        if !record.validate() {
            return Err(Error::InvalidData("Invalid asset record data".to_string()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO asset_records \
             (user_id, record_type, amount, description, record_date, gold_weight, \
              annual_interest_rate, owner) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.user_id,
                record.record_type.as_str(),
                record.amount.unwrap_or(Decimal::ZERO).to_string(),
                record.description,
                date_param(record.record_date),
                record.gold_weight.map(|w| w.to_string()),
                record.annual_interest_rate.map(|r| r.to_string()),
                record.owner,
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_asset_record(id)?
            .ok_or_else(|| Error::NotFound(format!("Asset record {} not found after insert", id)))
    }

    /// Get a ledger entry by ID
    pub fn get_asset_record(&self, id: i64) -> Result<Option<AssetRecord>> {
        let conn = self.conn()?;
        // .optional() keeps store failures distinct from a missing row
        let record = conn
            .query_row(
                &format!(
                    "SELECT {} FROM asset_records WHERE id = ?",
                    RECORD_COLUMNS
                ),
                params![id],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// Check whether a ledger entry exists
    pub fn asset_record_exists(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM asset_records WHERE id = ?",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Replace a ledger entry in full and revalidate it
    pub fn update_asset_record(&self, id: i64, new_record: &NewAssetRecord) -> Result<AssetRecord> {
        if !self.asset_record_exists(id)? {
            return Err(Error::NotFound(format!("Asset record {} not found", id)));
        }

        let mut record = new_record.clone();
        record.amount = Some(record.amount.unwrap_or(Decimal::ZERO));

        if !record.validate() {
            return Err(Error::InvalidData("Invalid asset record data".to_string()));
        }

        let conn = self.conn()?;
        conn.execute(
            "UPDATE asset_records SET user_id = ?, record_type = ?, amount = ?, \
             description = ?, record_date = ?, gold_weight = ?, annual_interest_rate = ?, \
             owner = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![
                record.user_id,
                record.record_type.as_str(),
                record.amount.unwrap_or(Decimal::ZERO).to_string(),
                record.description,
                date_param(record.record_date),
                record.gold_weight.map(|w| w.to_string()),
                record.annual_interest_rate.map(|r| r.to_string()),
                record.owner,
                id,
            ],
        )?;
        drop(conn);

        self.get_asset_record(id)?
            .ok_or_else(|| Error::NotFound(format!("Asset record {} not found after update", id)))
    }

    /// Delete a ledger entry
    pub fn delete_asset_record(&self, id: i64) -> Result<()> {
        if !self.asset_record_exists(id)? {
            return Err(Error::NotFound(format!("Asset record {} not found", id)));
        }

        let conn = self.conn()?;
        conn.execute("DELETE FROM asset_records WHERE id = ?", params![id])?;
        Ok(())
    }

    /// List all ledger entries, newest record date first
    pub fn list_asset_records(&self) -> Result<Vec<AssetRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM asset_records ORDER BY record_date DESC",
                RECORD_COLUMNS
            ),
            &[],
        )
    }

    /// List a user's ledger entries, newest record date first
    pub fn list_asset_records_by_user(&self, user_id: i64) -> Result<Vec<AssetRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM asset_records WHERE user_id = ? ORDER BY record_date DESC",
                RECORD_COLUMNS
            ),
            &[&user_id],
        )
    }

    /// List a user's ledger entries of one type
    pub fn list_asset_records_by_user_and_type(
        &self,
        user_id: i64,
        record_type: &RecordType,
    ) -> Result<Vec<AssetRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM asset_records WHERE user_id = ? AND record_type = ? \
                 ORDER BY record_date DESC",
                RECORD_COLUMNS
            ),
            &[&user_id, &record_type.as_str()],
        )
    }

    /// List a user's ledger entries within a date range (inclusive)
    pub fn list_asset_records_by_user_in_range(
        &self,
        user_id: i64,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Vec<AssetRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM asset_records WHERE user_id = ? \
                 AND record_date BETWEEN ? AND ? ORDER BY record_date DESC",
                RECORD_COLUMNS
            ),
            &[&user_id, &date_param(start), &date_param(end)],
        )
    }

    /// List ledger entries by responsible person
    pub fn list_asset_records_by_owner(&self, owner: &str) -> Result<Vec<AssetRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM asset_records WHERE owner = ? ORDER BY record_date DESC",
                RECORD_COLUMNS
            ),
            &[&owner],
        )
    }

    /// List an owner's ledger entries of one type
    pub fn list_asset_records_by_owner_and_type(
        &self,
        owner: &str,
        record_type: &RecordType,
    ) -> Result<Vec<AssetRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM asset_records WHERE owner = ? AND record_type = ? \
                 ORDER BY record_date DESC",
                RECORD_COLUMNS
            ),
            &[&owner, &record_type.as_str()],
        )
    }

    /// List an owner's ledger entries within a date range (inclusive)
    pub fn list_asset_records_by_owner_in_range(
        &self,
        owner: &str,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Vec<AssetRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM asset_records WHERE owner = ? \
                 AND record_date BETWEEN ? AND ? ORDER BY record_date DESC",
                RECORD_COLUMNS
            ),
            &[&owner, &date_param(start), &date_param(end)],
        )
    }

    /// Get a user's most recent ledger entries
    ///
    /// Limits up to 10 return the latest 10 by creation time. Larger limits
    /// return the user's full history ordered by record date instead; the
    /// switch is a compatibility quirk kept from the original API.
    pub fn recent_asset_records(&self, user_id: i64, limit: i64) -> Result<Vec<AssetRecord>> {
        if limit <= 10 {
            return self.query_records(
                &format!(
                    "SELECT {} FROM asset_records WHERE user_id = ? \
                     ORDER BY created_at DESC, id DESC LIMIT 10",
                    RECORD_COLUMNS
                ),
                &[&user_id],
            );
        }
        self.list_asset_records_by_user(user_id)
    }

    /// Count all ledger entries
    pub fn count_asset_records(&self) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM asset_records", [], |row| row.get(0))?)
    }

    /// Sum of all amounts in scope (0 when the ledger is empty)
    pub fn total_assets(&self, scope: Scope) -> Result<Decimal> {
        match scope {
            Scope::User(user_id) => self.sum_asset_amounts(
                "SELECT amount FROM asset_records WHERE user_id = ?",
                &[&user_id],
            ),
            Scope::All => self.sum_asset_amounts("SELECT amount FROM asset_records", &[]),
        }
    }

    /// Sum of a user's amounts for one record type
    pub fn assets_by_user_and_type(
        &self,
        user_id: i64,
        record_type: &RecordType,
    ) -> Result<Decimal> {
        self.sum_asset_amounts(
            "SELECT amount FROM asset_records WHERE user_id = ? AND record_type = ?",
            &[&user_id, &record_type.as_str()],
        )
    }

    /// Sum of salary-type amounts in scope
    ///
    /// A user is expected to carry a single salary entry; duplicates are
    /// summed as-is rather than rejected.
    pub fn salary_total(&self, scope: Scope) -> Result<Decimal> {
        match scope {
            Scope::User(user_id) => self.sum_asset_amounts(
                "SELECT amount FROM asset_records WHERE user_id = ? AND record_type = 'salary'",
                &[&user_id],
            ),
            Scope::All => self.sum_asset_amounts(
                "SELECT amount FROM asset_records WHERE record_type = 'salary'",
                &[],
            ),
        }
    }

    /// Sum of amounts matching the given filters
    ///
    /// Blank record type and owner strings count as "no filter", so the
    /// HTTP layer can pass query parameters straight through.
    pub fn sum_assets_filtered(
        &self,
        scope: Scope,
        record_type: Option<&str>,
        owner: Option<&str>,
        range: Option<(chrono::NaiveDate, chrono::NaiveDate)>,
    ) -> Result<Decimal> {
        let mut sql = "SELECT amount FROM asset_records WHERE 1=1".to_string();
        let mut bound: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Scope::User(user_id) = scope {
            sql.push_str(" AND user_id = ?");
            bound.push(Box::new(user_id));
        }
        if let Some(rt) = record_type.filter(|s| !s.trim().is_empty()) {
            sql.push_str(" AND record_type = ?");
            bound.push(Box::new(rt.to_string()));
        }
        if let Some(o) = owner.filter(|s| !s.trim().is_empty()) {
            sql.push_str(" AND owner = ?");
            bound.push(Box::new(o.to_string()));
        }
        if let Some((start, end)) = range {
            sql.push_str(" AND record_date BETWEEN ? AND ?");
            bound.push(Box::new(date_param(start)));
            bound.push(Box::new(date_param(end)));
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let total = stmt
            .query_map(rusqlite::params_from_iter(bound.iter()), |row| {
                row.get::<_, String>(0)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc + parse_decimal(s));

        Ok(total)
    }

    /// Investment-type entries carrying an interest rate, for the forecast
    pub fn investment_records(&self, scope: Scope) -> Result<Vec<AssetRecord>> {
        match scope {
            Scope::User(user_id) => self.query_records(
                &format!(
                    "SELECT {} FROM asset_records WHERE user_id = ? \
                     AND record_type = 'investment' AND annual_interest_rate IS NOT NULL",
                    RECORD_COLUMNS
                ),
                &[&user_id],
            ),
            Scope::All => self.query_records(
                &format!(
                    "SELECT {} FROM asset_records \
                     WHERE record_type = 'investment' AND annual_interest_rate IS NOT NULL",
                    RECORD_COLUMNS
                ),
                &[],
            ),
        }
    }

    fn query_records(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<AssetRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let records = stmt
            .query_map(params, record_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn sum_asset_amounts(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Decimal> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let total = stmt
            .query_map(params, |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc + parse_decimal(s));
        Ok(total)
    }
}
