//! Parsing and validation of client requests for transactions.
//!
//! JSON bodies are deserialized into loosely typed payloads first so that a
//! wrong type (e.g. `"amount": "10"`) is reported with the same message as a
//! wrong value, instead of as a generic deserialization failure.

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{
    Error, ValidationError,
    database_id::TransactionId,
    transaction::{TransactionBuilder, TransactionFilter, TransactionPatch, TransactionType},
};

/// The JSON body of a create or update request.
///
/// Each field is `None` when the key is absent and `Some(Value::Null)` when the
/// key is present with a `null` value.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct TransactionPayload {
    #[serde(default, rename = "type", deserialize_with = "present")]
    pub transaction_type: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub amount: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Parse a raw request body as a [TransactionPayload].
///
/// # Errors
/// Returns [ValidationError::InvalidJson] if `body` is not a JSON object.
pub fn parse_payload(body: &[u8]) -> Result<TransactionPayload, ValidationError> {
    serde_json::from_slice(body).map_err(|error| {
        tracing::debug!("Could not parse request body: {error}");
        ValidationError::InvalidJson
    })
}

impl TransactionPayload {
    /// Check the payload of a create request and turn it into a builder.
    ///
    /// Checks run in a fixed order: required fields, then type, then amount,
    /// then the types of category and description. `null`, `false`, zero and
    /// the empty string count as missing for `type` and `category`. A `null` or empty
    /// description is stored as NULL.
    ///
    /// # Errors
    /// Returns the first [ValidationError] found.
    pub fn into_builder(self) -> Result<TransactionBuilder, ValidationError> {
        let (Some(transaction_type), Some(category), Some(amount)) =
            (self.transaction_type, self.category, self.amount)
        else {
            return Err(ValidationError::MissingRequiredFields);
        };

        if is_blank(&transaction_type) || is_blank(&category) {
            return Err(ValidationError::MissingRequiredFields);
        }

        let transaction_type = parse_type(&transaction_type)?;
        let amount = parse_amount(&amount)?;
        let Value::String(category) = category else {
            return Err(ValidationError::CategoryNotString);
        };
        let description = match self.description {
            None => None,
            Some(description) => parse_description(description)?.filter(|text| !text.is_empty()),
        };

        Ok(TransactionBuilder {
            transaction_type,
            category,
            amount,
            description,
        })
    }

    /// Check the payload of an update request and turn it into a patch.
    ///
    /// Only keys present in the payload end up in the patch. A present key
    /// must hold a valid value: `null` is only accepted for `description`,
    /// where it clears the description.
    ///
    /// # Errors
    /// Returns the first [ValidationError] found.
    pub fn into_patch(self) -> Result<TransactionPatch, ValidationError> {
        let transaction_type = self.transaction_type.as_ref().map(parse_type).transpose()?;
        let amount = self.amount.as_ref().map(parse_amount).transpose()?;
        let category = match self.category {
            None => None,
            Some(Value::String(category)) if !category.is_empty() => Some(category),
            Some(_) => return Err(ValidationError::EmptyCategory),
        };
        let description = self.description.map(parse_description).transpose()?;

        Ok(TransactionPatch {
            transaction_type,
            category,
            amount,
            description,
        })
    }
}

/// Whether `value` counts as not supplied: `null`, `false`, zero or `""`.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn parse_type(value: &Value) -> Result<TransactionType, ValidationError> {
    value
        .as_str()
        .ok_or(ValidationError::InvalidType)?
        .parse()
}

fn parse_amount(value: &Value) -> Result<f64, ValidationError> {
    match value.as_f64() {
        Some(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        _ => Err(ValidationError::InvalidAmount),
    }
}

fn parse_description(value: Value) -> Result<Option<String>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        _ => Err(ValidationError::InvalidDescription),
    }
}

/// Decode the query string of `parts` into key-value pairs.
///
/// Only the first value of a repeated key is kept, so `?id=1&id=2` targets
/// transaction 1.
fn first_query_values(parts: &Parts) -> Result<HashMap<String, String>, Response> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri).map_err(
        |rejection| {
            tracing::debug!("Could not decode query string: {rejection}");
            Error::from(ValidationError::InvalidQuery).into_response()
        },
    )?;

    let mut values = HashMap::new();
    for (key, value) in pairs {
        values.entry(key).or_insert(value);
    }

    Ok(values)
}

/// The query string of a request that targets a single transaction.
#[derive(Debug, Default)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl<S> FromRequestParts<S> for IdQuery
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        let mut values = first_query_values(parts)?;

        Ok(Self {
            id: values.remove("id"),
        })
    }
}

impl IdQuery {
    /// Get the transaction ID.
    ///
    /// # Errors
    /// Returns a:
    /// - [ValidationError::MissingId] if `id` is absent or empty,
    /// - or [ValidationError::InvalidId] if `id` is not an integer.
    pub fn transaction_id(&self) -> Result<TransactionId, ValidationError> {
        match self.id.as_deref().map(str::trim) {
            None | Some("") => Err(ValidationError::MissingId),
            Some(id) => id.parse().map_err(|_| ValidationError::InvalidId),
        }
    }
}

/// The query string of a list or summary request.
#[derive(Debug, Default)]
pub struct FilterQuery {
    pub transaction_type: Option<String>,
    pub category: Option<String>,
    pub limit: Option<String>,
}

impl<S> FromRequestParts<S> for FilterQuery
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        let mut values = first_query_values(parts)?;

        Ok(Self {
            transaction_type: values.remove("type"),
            category: values.remove("category"),
            limit: values.remove("limit"),
        })
    }
}

impl FilterQuery {
    /// Convert the query string into a [TransactionFilter].
    ///
    /// Empty values are ignored, so `?type=&limit=` matches everything.
    ///
    /// # Errors
    /// Returns a:
    /// - [ValidationError::InvalidType] if `type` is not "income" or "expense",
    /// - or [ValidationError::InvalidLimit] if `limit` is not a non-negative integer.
    pub fn into_filter(self) -> Result<TransactionFilter, ValidationError> {
        let transaction_type = non_empty(self.transaction_type)
            .map(|transaction_type| transaction_type.parse::<TransactionType>())
            .transpose()?;
        let limit = non_empty(self.limit)
            .map(|limit| limit.trim().parse::<u64>().map_err(|_| ValidationError::InvalidLimit))
            .transpose()?;

        Ok(TransactionFilter {
            transaction_type,
            category: non_empty(self.category),
            limit,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}
