//! Request parameter schemas.
//!
//! Raw query strings arrive as optional strings so that a malformed value
//! produces our own 400 envelope instead of an extractor rejection. Each
//! `parse` returns either a typed parameter object or the first failing
//! field as a [`ValidationError`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::risk::ProductStatus;

pub const SEARCH_MIN_LEN: usize = 3;
pub const SEARCH_MAX_LEN: usize = 100;
pub const DEFAULT_LIMIT: u64 = 20;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[<>"'`]"#).unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub const CODE: &'static str = "VALIDATION_ERROR";

    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    pub fn details(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(self.field.to_string(), self.message.clone())])
    }
}

/// Strips markup and quotes, then collapses whitespace.
pub fn sanitize_text(input: &str) -> String {
    let without_tags = HTML_TAG.replace_all(input, "");
    let without_unsafe = UNSAFE_CHARS.replace_all(&without_tags, "");
    WHITESPACE
        .replace_all(&without_unsafe, " ")
        .trim()
        .to_string()
}

/// Parses a positive integer path id.
pub fn parse_id(raw: &str, label: &str) -> Result<i32, ValidationError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::new("id", format!("Invalid {label} ID"))),
    }
}

/// Parses a `YYYY-MM-DD` date that must not lie after `today`.
pub fn parse_past_date(
    field: &'static str,
    raw: &str,
    today: NaiveDate,
) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if !ISO_DATE.is_match(raw) {
        return Err(ValidationError::new(field, "Date must use the YYYY-MM-DD format"));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::new(field, "Date is not a valid calendar date"))?;
    if date > today {
        return Err(ValidationError::new(field, "Date cannot be in the future"));
    }
    Ok(date)
}

fn clamp_limit(raw: Option<&str>, default: u64, max: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .map(|value| value.clamp(1, max as i64) as u64)
        .unwrap_or(default)
}

fn clamp_offset(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .map(|value| value.max(0) as u64)
        .unwrap_or(0)
}

fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSearchParams {
    pub query: Option<String>,
    pub status: Option<String>,
    pub since: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub status: Option<ProductStatus>,
    pub since: Option<NaiveDate>,
    pub limit: u64,
    pub offset: u64,
}

impl SearchParams {
    pub const MAX_LIMIT: u64 = 50;

    pub fn parse(raw: &RawSearchParams, today: NaiveDate) -> Result<Self, ValidationError> {
        let query = sanitize_text(raw.query.as_deref().unwrap_or_default());
        let length = query.chars().count();
        if length < SEARCH_MIN_LEN {
            return Err(ValidationError::new(
                "query",
                "Please enter at least 3 characters",
            ));
        }
        if length > SEARCH_MAX_LEN {
            return Err(ValidationError::new(
                "query",
                "Search query must be 100 characters or fewer",
            ));
        }

        let status = match non_empty(&raw.status) {
            Some(value) => Some(ProductStatus::parse(value).ok_or_else(|| {
                ValidationError::new(
                    "status",
                    "Status must be one of approved, cancelled, not_found, notified",
                )
            })?),
            None => None,
        };

        let since = match non_empty(&raw.since) {
            Some(value) => Some(parse_past_date("since", value, today)?),
            None => None,
        };

        Ok(Self {
            query,
            status,
            since,
            limit: clamp_limit(raw.limit.as_deref(), DEFAULT_LIMIT, Self::MAX_LIMIT),
            offset: clamp_offset(raw.offset.as_deref()),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// A per-endpoint allow-list of sortable columns.
pub trait SortKey: Copy + Default {
    fn from_key(key: &str) -> Option<Self>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompanySort {
    #[default]
    Name,
    TotalNotifications,
    ReputationScore,
    CancelledCount,
    FirstNotified,
}

impl SortKey for CompanySort {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(CompanySort::Name),
            "totalNotifications" | "total_notifications" => Some(CompanySort::TotalNotifications),
            "reputationScore" | "reputation_score" => Some(CompanySort::ReputationScore),
            "cancelledCount" | "cancelled_count" => Some(CompanySort::CancelledCount),
            "firstNotified" | "first_notified" => Some(CompanySort::FirstNotified),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IngredientSort {
    #[default]
    Name,
    OccurrenceCount,
    RiskScore,
    LastAppearance,
    EwgRating,
}

impl SortKey for IngredientSort {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(IngredientSort::Name),
            "occurrenceCount" | "occurrence_count" => Some(IngredientSort::OccurrenceCount),
            "riskScore" | "risk_score" => Some(IngredientSort::RiskScore),
            "lastAppearance" | "last_appearance" => Some(IngredientSort::LastAppearance),
            "ewgRating" | "ewg_rating" => Some(IngredientSort::EwgRating),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListParams {
    pub query: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListParams<S> {
    pub query: Option<String>,
    pub limit: u64,
    pub offset: u64,
    pub sort_by: S,
    pub sort_order: SortOrder,
}

impl<S: SortKey> ListParams<S> {
    pub const MAX_LIMIT: u64 = 100;

    /// Unknown sort keys and orders fall back to name ascending.
    pub fn parse(raw: &RawListParams) -> Result<Self, ValidationError> {
        let query = match raw.query.as_deref() {
            Some(value) => {
                let sanitized = sanitize_text(value);
                if sanitized.chars().count() > SEARCH_MAX_LEN {
                    return Err(ValidationError::new(
                        "query",
                        "Search query must be 100 characters or fewer",
                    ));
                }
                Some(sanitized).filter(|value| !value.is_empty())
            }
            None => None,
        };

        Ok(Self {
            query,
            limit: clamp_limit(raw.limit.as_deref(), DEFAULT_LIMIT, Self::MAX_LIMIT),
            offset: clamp_offset(raw.offset.as_deref()),
            sort_by: non_empty(&raw.sort_by)
                .and_then(S::from_key)
                .unwrap_or_default(),
            sort_order: non_empty(&raw.sort_order)
                .and_then(SortOrder::from_key)
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAlternativesParams {
    pub exclude_id: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlternativesParams {
    pub exclude_id: Option<i32>,
    pub limit: u64,
}

impl AlternativesParams {
    pub const DEFAULT_LIMIT: u64 = 10;
    pub const MAX_LIMIT: u64 = 50;

    pub fn parse(raw: &RawAlternativesParams) -> Result<Self, ValidationError> {
        let exclude_id = match non_empty(&raw.exclude_id) {
            Some(value) => Some(parse_id(value, "product").map_err(|_| {
                ValidationError::new("excludeId", "excludeId must be a positive integer")
            })?),
            None => None,
        };

        Ok(Self {
            exclude_id,
            limit: clamp_limit(raw.limit.as_deref(), Self::DEFAULT_LIMIT, Self::MAX_LIMIT),
        })
    }
}
