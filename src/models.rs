use crate::error::MonoError;
use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fractional digits of the minor currency unit used by the API.
const MINOR_UNIT_SCALE: u32 = 2;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub client_id: Option<String>,
    pub name: Option<String>,
    pub web_hook_url: Option<String>,
    pub permissions: Option<String>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub jars: Vec<Jar>,
    /// Fields this crate does not model, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Option<String>,
    pub send_id: Option<String>,
    pub balance: Option<i64>,
    pub credit_limit: Option<i64>,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    pub currency_code: Option<u16>,
    pub cashback_type: Option<String>,
    #[serde(default)]
    pub masked_pan: Vec<String>,
    pub iban: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Account {
    pub fn balance_decimal(&self) -> Option<Decimal> {
        self.balance.map(minor_to_decimal)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jar {
    pub id: Option<String>,
    pub send_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub currency_code: Option<u16>,
    pub balance: Option<i64>,
    pub goal: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single movement on an account. Amounts are in minor currency units.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementItem {
    pub id: Option<String>,
    /// Epoch seconds.
    pub time: Option<i64>,
    pub description: Option<String>,
    pub mcc: Option<u32>,
    pub original_mcc: Option<u32>,
    pub hold: Option<bool>,
    pub amount: Option<i64>,
    pub operation_amount: Option<i64>,
    pub currency_code: Option<u16>,
    pub commission_rate: Option<i64>,
    pub cashback_amount: Option<i64>,
    pub balance: Option<i64>,
    pub comment: Option<String>,
    pub receipt_id: Option<String>,
    pub invoice_id: Option<String>,
    pub counter_edrpou: Option<String>,
    pub counter_iban: Option<String>,
    pub counter_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatementItem {
    pub fn time_utc(&self) -> Option<DateTime<Utc>> {
        self.time.and_then(|t| DateTime::from_timestamp(t, 0))
    }

    pub fn amount_decimal(&self) -> Option<Decimal> {
        self.amount.map(minor_to_decimal)
    }

    pub fn balance_decimal(&self) -> Option<Decimal> {
        self.balance.map(minor_to_decimal)
    }
}

/// Error payload returned with non-success responses.
///
/// The API sends `errorDescription`; `description` is accepted too. When a
/// body carries both, `errorDescription` wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawErrorBody")]
pub struct ApiErrorBody {
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct RawErrorBody {
    #[serde(rename = "errorDescription")]
    error_description: Option<String>,
    description: Option<String>,
}

impl TryFrom<RawErrorBody> for ApiErrorBody {
    type Error = &'static str;

    fn try_from(raw: RawErrorBody) -> Result<Self, Self::Error> {
        raw.error_description
            .or(raw.description)
            .map(|description| ApiErrorBody { description })
            .ok_or("missing field `errorDescription`")
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct WebhookRequest<'a> {
    #[serde(rename = "webHookUrl")]
    pub web_hook_url: &'a str,
}

fn minor_to_decimal(value: i64) -> Decimal {
    Decimal::new(value, MINOR_UNIT_SCALE)
}

pub fn parse_client_info(data: &str) -> Result<UserInfo, MonoError> {
    let info: UserInfo = serde_json::from_str(data)?;
    debug!("Parsed client info with {} accounts", info.accounts.len());
    Ok(info)
}

pub fn parse_statements(data: &str) -> Result<Vec<StatementItem>, MonoError> {
    let items: Vec<StatementItem> = serde_json::from_str(data)?;
    debug!("Parsed {} statement items", items.len());
    Ok(items)
}

pub fn parse_error(data: &str) -> Result<ApiErrorBody, MonoError> {
    serde_json::from_str(data).map_err(MonoError::from)
}
