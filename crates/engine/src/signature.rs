//! E-signature hand-off
//!
//! A `SignaturePacket` is what the external signature provider receives:
//! who signs, what they sign, and a SHA-256 digest of the exact HTML so a
//! modified document can be detected on return.

use crate::composer::ComposedDocument;
use crate::error::{EngineError, EngineResult};
use docket_core::{Customer, DocumentType};
use serde::{Deserialize, Serialize};

/// Document packaged for a signature provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePacket {
    /// Issued document number
    pub number: String,
    /// Document type
    pub document_type: DocumentType,
    /// Signer display name
    pub signer_name: String,
    /// Signer email
    pub signer_email: String,
    /// Composed HTML, sections joined in order
    pub html: String,
    /// Lowercase hex SHA-256 of `html`
    pub digest: String,
}

impl SignaturePacket {
    /// Package a composed document for `customer` to sign
    ///
    /// # Errors
    ///
    /// `NotSignable` if the document carries no issued number (a draft
    /// preview) or the customer has no email address.
    pub fn prepare(composed: &ComposedDocument, customer: &Customer) -> EngineResult<Self> {
        let number = composed.number();
        if composed.is_draft() || number.is_empty() {
            return Err(EngineError::NotSignable(
                "document has no issued number".to_string(),
            ));
        }
        let signer_email = customer
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| EngineError::NotSignable(format!("customer '{}' has no email", customer.name)))?;

        Ok(SignaturePacket {
            number: number.to_string(),
            document_type: composed.document_type(),
            signer_name: customer.name.clone(),
            signer_email: signer_email.to_string(),
            html: composed.to_html(),
            digest: composed.digest(),
        })
    }

    /// True if `html` still matches the digest
    pub fn verify(&self) -> bool {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(self.html.as_bytes());
        format!("{:x}", hasher.finalize()) == self.digest
    }
}
