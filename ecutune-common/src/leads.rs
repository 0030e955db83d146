//! Lead capture: quote requests tied to a catalog vehicle
//!
//! A lead is only accepted for a vehicle that exists in the catalog, so the
//! selector and the lead form can never disagree.

use crate::vehicles::{vehicle_exists, Vehicle};
use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::fmt;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

const NAME_MAX_LEN: usize = 200;
const EMAIL_MAX_LEN: usize = 254;
const MESSAGE_MAX_LEN: usize = 4000;
const PHONE_MIN_DIGITS: usize = 6;
const PHONE_MAX_DIGITS: usize = 20;

/// Follow-up state of a lead
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Closed,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "closed" => Ok(LeadStatus::Closed),
            other => Err(Error::InvalidInput(format!("unknown lead status '{}'", other))),
        }
    }
}

/// Quote request as submitted by a visitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub vehicle: Vehicle,
    #[serde(default)]
    pub consent: bool,
}

/// Stored lead
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lead {
    pub guid: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub vehicle: Vehicle,
    pub consent: bool,
    pub status: LeadStatus,
    /// Stored as fixed-width RFC 3339 (microseconds, `Z`) so text order is time order
    pub created_at: DateTime<Utc>,
}

fn optional_trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Loose email shape check: one `@`, non-empty local part, dotted domain
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > EMAIL_MAX_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// Digits plus `+`, `-`, `(`, `)` and spaces; 6 to 20 digits
pub fn is_valid_phone(phone: &str) -> bool {
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    allowed && (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
}

impl NewLead {
    /// Check every field and return a trimmed copy
    pub fn validate(&self) -> Result<NewLead> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("name is required".to_string()));
        }
        if name.chars().count() > NAME_MAX_LEN {
            return Err(Error::InvalidInput(format!(
                "name exceeds {} characters",
                NAME_MAX_LEN
            )));
        }

        let email = self.email.trim();
        if !is_valid_email(email) {
            return Err(Error::InvalidInput("email is not a valid address".to_string()));
        }

        let phone = optional_trimmed(&self.phone);
        if let Some(phone) = &phone {
            if !is_valid_phone(phone) {
                return Err(Error::InvalidInput("phone is not a valid number".to_string()));
            }
        }

        let message = optional_trimmed(&self.message);
        if let Some(message) = &message {
            if message.chars().count() > MESSAGE_MAX_LEN {
                return Err(Error::InvalidInput(format!(
                    "message exceeds {} characters",
                    MESSAGE_MAX_LEN
                )));
            }
        }

        if !self.consent {
            return Err(Error::InvalidInput(
                "consent to be contacted is required".to_string(),
            ));
        }

        let vehicle = Vehicle::new(
            &self.vehicle.fuel,
            &self.vehicle.brand,
            &self.vehicle.model,
            &self.vehicle.version,
        )?;

        Ok(NewLead {
            name: name.to_string(),
            email: email.to_string(),
            phone,
            message,
            vehicle,
            consent: true,
        })
    }
}

fn lead_from_row(row: &SqliteRow) -> Result<Lead> {
    let guid: String = row.try_get("guid")?;
    let status: String = row.try_get("status")?;

    Ok(Lead {
        guid: Uuid::parse_str(&guid)
            .map_err(|e| Error::Internal(format!("corrupt lead guid '{}': {}", guid, e)))?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        message: row.try_get("message")?,
        vehicle: Vehicle {
            fuel: row.try_get("fuel")?,
            brand: row.try_get("brand")?,
            model: row.try_get("model")?,
            version: row.try_get("version")?,
        },
        consent: row.try_get::<i64, _>("consent")? != 0,
        status: status.parse()?,
        created_at: row.try_get("created_at")?,
    })
}

const LEAD_COLUMNS: &str =
    "guid, name, email, phone, message, fuel, brand, model, version, consent, status, created_at";

/// Validate and store a lead
pub async fn create_lead(pool: &SqlitePool, new_lead: &NewLead) -> Result<Lead> {
    let lead = new_lead.validate()?;

    if !vehicle_exists(pool, &lead.vehicle).await? {
        return Err(Error::InvalidInput(format!(
            "vehicle '{}' is not in the catalog",
            lead.vehicle
        )));
    }

    let guid = Uuid::new_v4();
    let created_at = Utc::now().trunc_subsecs(6);

    sqlx::query(
        r#"
        INSERT INTO leads (guid, name, email, phone, message, fuel, brand, model, version, consent, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(guid.to_string())
    .bind(&lead.name)
    .bind(&lead.email)
    .bind(&lead.phone)
    .bind(&lead.message)
    .bind(&lead.vehicle.fuel)
    .bind(&lead.vehicle.brand)
    .bind(&lead.vehicle.model)
    .bind(&lead.vehicle.version)
    .bind(1i64)
    .bind(LeadStatus::New.as_str())
    .bind(created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
    .execute(pool)
    .await?;

    info!("New lead {} for {}", guid, lead.vehicle);

    Ok(Lead {
        guid,
        name: lead.name,
        email: lead.email,
        phone: lead.phone,
        message: lead.message,
        vehicle: lead.vehicle,
        consent: true,
        status: LeadStatus::New,
        created_at,
    })
}

pub async fn get_lead(pool: &SqlitePool, guid: Uuid) -> Result<Lead> {
    let sql = format!("SELECT {} FROM leads WHERE guid = ?", LEAD_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(guid.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("lead {}", guid)))?;

    lead_from_row(&row)
}

/// Leads newest first, optionally restricted to one status
pub async fn list_leads(
    pool: &SqlitePool,
    status: Option<LeadStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Lead>> {
    let mut sql = format!("SELECT {} FROM leads", LEAD_COLUMNS);
    if status.is_some() {
        sql.push_str(" WHERE status = ?");
    }
    sql.push_str(" ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?");

    let mut query = sqlx::query(&sql);
    if let Some(status) = status {
        query = query.bind(status.as_str());
    }
    let rows = query.bind(limit).bind(offset).fetch_all(pool).await?;

    rows.iter().map(lead_from_row).collect()
}

pub async fn count_leads(pool: &SqlitePool, status: Option<LeadStatus>) -> Result<i64> {
    let count: i64 = match status {
        Some(status) => {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads WHERE status = ?")
                .bind(status.as_str())
                .fetch_one(pool)
                .await?
        }
        None => {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads")
                .fetch_one(pool)
                .await?
        }
    };

    Ok(count)
}

pub async fn update_lead_status(pool: &SqlitePool, guid: Uuid, status: LeadStatus) -> Result<Lead> {
    let result = sqlx::query("UPDATE leads SET status = ? WHERE guid = ?")
        .bind(status.as_str())
        .bind(guid.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("lead {}", guid)));
    }

    info!("Lead {} marked {}", guid, status);
    get_lead(pool, guid).await
}
