//! Records fetched by the persistence collaborator
//!
//! The engine never loads or stores these itself; it receives them
//! already fetched and reads them.

use crate::types::{CustomerId, DocumentId, DocumentType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Postal address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street line
    pub line1: String,
    /// Second street line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    /// City
    pub city: String,
    /// State, province or region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Postal or ZIP code
    pub postal_code: String,
    /// Country
    pub country: String,
}

/// Customer (or supplier, for purchase orders) a document is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Record id
    pub id: CustomerId,
    /// Contact name
    pub name: String,
    /// Company name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Contact email; required for signature hand-off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// VAT / tax registration number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    /// Billing address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl Customer {
    /// Customer with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CustomerId::new(),
            name: name.into(),
            company: None,
            email: None,
            phone: None,
            tax_id: None,
            address: None,
        }
    }

    /// Set the company name
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Set the contact email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the billing address
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }
}

/// One priced line on a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// What is being sold or ordered
    pub description: String,
    /// Quantity, may be fractional (hours, kilograms)
    pub quantity: Decimal,
    /// Price per unit
    pub unit_price: Decimal,
}

impl LineItem {
    /// Create a line item
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// quantity × unit price, unrounded; `None` if it overflows
    pub fn amount(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }
}

/// Document level discount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the subtotal (10 = 10%)
    Percent(Decimal),
    /// Fixed amount in document currency
    Amount(Decimal),
}

/// Structured document data
///
/// The body section of a composed document is built from this directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentBody {
    /// Record id
    pub id: DocumentId,
    /// Document type
    pub document_type: DocumentType,
    /// Issued number; None until the document is first composed as new
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Optional heading ("Website redesign")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Issue date
    pub issue_date: NaiveDate,
    /// Payment due date (invoices)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Offer expiry (quotes, order forms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
    /// ISO 4217 currency code
    pub currency: String,
    /// Customer reference or PO number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Priced lines, in display order
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    /// Document level discount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    /// Tax rate in percent applied after discount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Decimal>,
    /// Shipping charge, untaxed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Decimal>,
    /// Free-text notes printed under the totals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DocumentBody {
    /// Unnumbered body with no lines
    pub fn new(document_type: DocumentType, issue_date: NaiveDate, currency: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(),
            document_type,
            number: None,
            title: None,
            issue_date,
            due_date: None,
            valid_until: None,
            currency: currency.into(),
            reference: None,
            line_items: Vec::new(),
            discount: None,
            tax_rate: None,
            shipping: None,
            notes: None,
        }
    }

    /// Append a line item
    pub fn with_line(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    /// Set the issued number
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }
}
