//! Body section
//!
//! The body is built straight from structured data into the markup tree.
//! It never goes through placeholder substitution, so record fields need no
//! escaping beyond what serialization does for every text node.

use crate::totals::{round_money, Totals};
use docket_core::{Customer, Discount, DocumentBody, DocumentType};
use docket_render::{Block, Cell, DateFormat, Document, Inline, Row, Table};
use rust_decimal::Decimal;

/// Build the body section for a numbered (or draft) document
pub fn build_body(
    body: &DocumentBody,
    customer: &Customer,
    totals: &Totals,
    number: &str,
    date_format: &DateFormat,
) -> Document {
    let mut blocks = vec![Block::heading(1, format!("{} {}", body.document_type.label(), number))];

    if let Some(title) = &body.title {
        blocks.push(Block::heading(2, title.as_str()));
    }
    blocks.push(dates(body, date_format));
    blocks.push(addressee(body.document_type, customer));
    blocks.push(Block::Table(line_items(body)));
    blocks.push(Block::Table(totals_table(body, totals)));

    if let Some(notes) = body.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        blocks.push(Block::heading(3, "Notes"));
        blocks.push(Block::Paragraph(lines(notes.lines().map(str::to_string))));
    }

    Document::new(blocks)
}

/// Text lines separated by line breaks
fn lines(lines: impl IntoIterator<Item = String>) -> Vec<Inline> {
    let mut out = Vec::new();
    for (i, line) in lines.into_iter().enumerate() {
        if i > 0 {
            out.push(Inline::Break);
        }
        out.push(Inline::Text(line));
    }
    out
}

fn dates(body: &DocumentBody, date_format: &DateFormat) -> Block {
    let mut rows = vec![format!("Issued: {}", date_format.format(body.issue_date))];
    if let Some(due) = body.due_date {
        rows.push(format!("Due: {}", date_format.format(due)));
    }
    if let Some(until) = body.valid_until {
        rows.push(format!("Valid until: {}", date_format.format(until)));
    }
    if let Some(reference) = &body.reference {
        rows.push(format!("Reference: {}", reference));
    }
    Block::Paragraph(lines(rows))
}

fn addressee(document_type: DocumentType, customer: &Customer) -> Block {
    let heading = match document_type {
        DocumentType::PurchaseOrder => "Supplier",
        _ => "Bill to",
    };

    let mut rows = vec![customer.name.clone()];
    rows.extend(customer.company.clone());
    if let Some(address) = &customer.address {
        rows.push(address.line1.clone());
        rows.extend(address.line2.clone());
        let locality = [Some(address.city.as_str()), address.region.as_deref(), Some(address.postal_code.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        rows.push(locality);
        rows.push(address.country.clone());
    }
    rows.extend(customer.email.clone());
    rows.extend(customer.tax_id.as_ref().map(|id| format!("Tax ID: {}", id)));

    let mut content = vec![Inline::Strong(vec![Inline::text(heading)]), Inline::Break];
    content.extend(lines(rows));
    Block::Paragraph(content)
}

fn line_items(body: &DocumentBody) -> Table {
    let head = Row::new(vec![
        Cell::header("Description"),
        Cell::header("Quantity"),
        Cell::header("Unit price"),
        Cell::header("Amount"),
    ]);
    let rows = body
        .line_items
        .iter()
        .map(|item| {
            Row::new(vec![
                Cell::data(item.description.as_str()),
                Cell::data(item.quantity.normalize().to_string()),
                Cell::data(item.unit_price.to_string()),
                Cell::data(item.amount().map(|a| round_money(a).to_string()).unwrap_or_default()),
            ])
        })
        .collect();
    Table {
        head: vec![head],
        body: rows,
    }
}

fn money(currency: &str, amount: Decimal) -> String {
    format!("{} {}", currency, amount)
}

fn totals_table(body: &DocumentBody, totals: &Totals) -> Table {
    let currency = body.currency.as_str();
    let mut rows = vec![Row::new(vec![
        Cell::header("Subtotal"),
        Cell::data(money(currency, totals.subtotal)),
    ])];

    if !totals.discount.is_zero() {
        let label = match body.discount {
            Some(Discount::Percent(pct)) => format!("Discount ({}%)", pct.normalize()),
            _ => "Discount".to_string(),
        };
        rows.push(Row::new(vec![
            Cell::header(label),
            Cell::data(money(currency, -totals.discount)),
        ]));
    }
    if let Some(rate) = body.tax_rate {
        rows.push(Row::new(vec![
            Cell::header(format!("Tax ({}%)", rate.normalize())),
            Cell::data(money(currency, totals.tax)),
        ]));
    }
    if body.shipping.is_some() {
        rows.push(Row::new(vec![
            Cell::header("Shipping"),
            Cell::data(money(currency, totals.shipping)),
        ]));
    }
    rows.push(Row::new(vec![
        Cell::header("Total"),
        Cell {
            header: false,
            content: vec![Inline::Strong(vec![Inline::text(money(currency, totals.total))])],
        },
    ]));

    Table {
        head: Vec::new(),
        body: rows,
    }
}
