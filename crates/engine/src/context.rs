//! Variable context builder
//!
//! Flattens a document body, its customer and computed totals into the
//! namespaced key space templates resolve against:
//!
//! | Namespace    | Keys                                                          |
//! |--------------|---------------------------------------------------------------|
//! | `customer.*` | id, name, company, email, phone, tax_id, address.{line1, line2, city, region, postal_code, country} |
//! | `document.*` | type, number, title, issue_date, due_date, valid_until, currency, reference, notes |
//! | `totals.*`   | item_count, subtotal, discount, taxable, tax, shipping, total  |
//!
//! Optional fields that are not set produce no key at all.

use crate::totals::Totals;
use docket_core::{Customer, DocumentBody, VariableContext};
use rust_decimal::Decimal;

/// Build the variable context for a document
pub fn build_context(body: &DocumentBody, customer: &Customer, totals: &Totals) -> VariableContext {
    let mut ctx = VariableContext::new();

    ctx.insert("customer.id", customer.id.to_string());
    ctx.insert("customer.name", customer.name.as_str());
    ctx.insert_opt("customer.company", customer.company.as_deref());
    ctx.insert_opt("customer.email", customer.email.as_deref());
    ctx.insert_opt("customer.phone", customer.phone.as_deref());
    ctx.insert_opt("customer.tax_id", customer.tax_id.as_deref());
    if let Some(address) = &customer.address {
        ctx.insert("customer.address.line1", address.line1.as_str());
        ctx.insert_opt("customer.address.line2", address.line2.as_deref());
        ctx.insert("customer.address.city", address.city.as_str());
        ctx.insert_opt("customer.address.region", address.region.as_deref());
        ctx.insert("customer.address.postal_code", address.postal_code.as_str());
        ctx.insert("customer.address.country", address.country.as_str());
    }

    ctx.insert("document.type", body.document_type.label());
    ctx.insert_opt("document.number", body.number.as_deref());
    ctx.insert_opt("document.title", body.title.as_deref());
    ctx.insert("document.issue_date", body.issue_date);
    ctx.insert_opt("document.due_date", body.due_date);
    ctx.insert_opt("document.valid_until", body.valid_until);
    ctx.insert("document.currency", body.currency.as_str());
    ctx.insert_opt("document.reference", body.reference.as_deref());
    ctx.insert_opt("document.notes", body.notes.as_deref());

    ctx.insert("totals.item_count", Decimal::from(totals.item_count));
    ctx.insert("totals.subtotal", totals.subtotal);
    ctx.insert("totals.discount", totals.discount);
    ctx.insert("totals.taxable", totals.taxable);
    ctx.insert("totals.tax", totals.tax);
    ctx.insert("totals.shipping", totals.shipping);
    ctx.insert("totals.total", totals.total);

    ctx
}
