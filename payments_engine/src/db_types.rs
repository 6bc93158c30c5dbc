//! Data types shared between the database backends and the public API.
//!
//! The payment types double as the wire format of the HTTP API, so field names follow the JSON documents that
//! clients submit. Optional sub-records are omitted from the serialized output when absent, which keeps a
//! submitted document and the stored copy structurally equal.
use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//--------------------------------------     Account       ---------------------------------------------------------
/// A registered account, as stored in the database.
///
/// `password_hash` is a PHC-formatted argon2 hash. It is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
}

impl NewAccount {
    pub fn new<S: Into<String>>(email: S, password_hash: S) -> Self {
        Self { email: email.into(), password_hash: password_hash.into() }
    }
}

//--------------------------------------     Payment       ---------------------------------------------------------
/// The payment aggregate. The parent record plus all of its sub-records are always read and written as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "type", default = "default_resource_type")]
    pub resource_type: String,
    pub id: Uuid,
    #[serde(default)]
    pub version: i64,
    pub organisation_id: Uuid,
    pub attributes: PaymentAttributes,
}

fn default_resource_type() -> String {
    "Payment".to_string()
}

impl Payment {
    /// The canonical resource location of this payment
    pub fn location(&self) -> String {
        payment_location(&self.id)
    }
}

pub fn payment_location(id: &Uuid) -> String {
    format!("/v1/payments/{id}")
}

impl Display for Payment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Payment {} ({} {})", self.id, self.attributes.amount, self.attributes.currency)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAttributes {
    pub amount: String,
    pub currency: String,
    #[serde(default)]
    pub end_to_end_reference: String,
    #[serde(default)]
    pub numeric_reference: String,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub payment_purpose: String,
    #[serde(default)]
    pub payment_scheme: String,
    #[serde(default)]
    pub payment_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_date: Option<NaiveDate>,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub scheme_payment_sub_type: String,
    #[serde(default)]
    pub scheme_payment_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beneficiary_party: Option<Party>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debtor_party: Option<Party>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor_party: Option<SponsorParty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charges_information: Option<ChargesInformation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx: Option<Fx>,
}

/// A debtor or beneficiary of a payment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub account_number_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<i64>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub bank_id: String,
    #[serde(default)]
    pub bank_id_code: String,
    #[serde(default)]
    pub name: String,
}

/// Which side of the payment a [`Party`] row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartyRole {
    Beneficiary,
    Debtor,
}

impl PartyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyRole::Beneficiary => "beneficiary",
            PartyRole::Debtor => "debtor",
        }
    }
}

impl Display for PartyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PartyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beneficiary" => Ok(Self::Beneficiary),
            "debtor" => Ok(Self::Debtor),
            other => Err(format!("Unknown party role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorParty {
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub bank_id: String,
    #[serde(default)]
    pub bank_id_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargesInformation {
    #[serde(default)]
    pub bearer_code: String,
    #[serde(default)]
    pub sender_charges: Vec<Charge>,
    #[serde(default)]
    pub receiver_charges_amount: String,
    #[serde(default)]
    pub receiver_charges_currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub amount: String,
    pub currency: String,
}

/// Foreign exchange details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fx {
    #[serde(default)]
    pub contract_reference: String,
    #[serde(default)]
    pub exchange_rate: String,
    #[serde(default)]
    pub original_amount: String,
    #[serde(default)]
    pub original_currency: String,
}
