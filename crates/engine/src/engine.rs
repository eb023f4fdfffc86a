//! Engine orchestration over collaborators
//!
//! ## New Document Sequence
//!
//! ```text
//! 1. fetch()            - body, customer, templates; a missing one fails here
//! 2. AlreadyNumbered    - a numbered body is never renumbered
//! 3. validate           - full composition with the draft label as number
//! 4. allocate()         - sequence service, compare-and-swap on the counter
//! 5. compose            - same inputs, issued number bound
//! ```
//!
//! Rendering is deterministic and every value is escaped before it reaches
//! the markup parser, so the number bound in step 5 cannot make a render
//! fail that passed in step 3. Render errors therefore never consume a
//! number. The engine does not persist the number; the caller stores it on
//! the document body.

use crate::composer::{ComposeMode, ComposedDocument, Composer};
use crate::config::DocketConfig;
use crate::error::{EngineError, EngineResult};
use crate::signature::SignaturePacket;
use docket_core::{
    ComposeError, CounterStore, Customer, CustomerId, DocumentBody, DocumentId, DocumentType,
    RecordSource, Template, TemplateId, TemplateStore,
};
use docket_numbering::{ReconciliationReport, SequenceService};
use std::sync::Arc;
use tracing::{debug, warn};

/// What to compose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeRequest {
    /// Expected type of the stored body
    pub document_type: DocumentType,
    /// Body to compose
    pub document_id: DocumentId,
    /// Addressee
    pub customer_id: CustomerId,
    /// Cover page template
    pub cover: Option<TemplateId>,
    /// Legal terms template
    pub legal: Option<TemplateId>,
}

impl ComposeRequest {
    /// Request with no cover page or legal section
    pub fn new(document_type: DocumentType, document_id: DocumentId, customer_id: CustomerId) -> Self {
        Self {
            document_type,
            document_id,
            customer_id,
            cover: None,
            legal: None,
        }
    }

    /// Add a cover page template
    pub fn with_cover(mut self, id: impl Into<String>) -> Self {
        self.cover = Some(TemplateId::new(id));
        self
    }

    /// Add a legal template
    pub fn with_legal(mut self, id: impl Into<String>) -> Self {
        self.legal = Some(TemplateId::new(id));
        self
    }
}

/// Everything a composition reads, fetched up front
struct Inputs {
    body: DocumentBody,
    customer: Customer,
    cover: Option<Template>,
    legal: Option<Template>,
}

/// Composes documents from collaborator data
pub struct DocumentEngine {
    templates: Arc<dyn TemplateStore>,
    records: Arc<dyn RecordSource>,
    numbering: SequenceService,
    composer: Composer,
    config: DocketConfig,
}

impl DocumentEngine {
    /// Engine over the given collaborators
    ///
    /// # Errors
    ///
    /// `Config` if the configuration does not validate.
    pub fn new(
        counters: Arc<dyn CounterStore>,
        templates: Arc<dyn TemplateStore>,
        records: Arc<dyn RecordSource>,
        config: DocketConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        let numbering = SequenceService::with_retry(counters, config.number_format()?, config.retry_config());
        let composer = Composer::new(config.render_options()?).with_draft_label(config.compose.draft_label.as_str());

        Ok(Self {
            templates,
            records,
            numbering,
            composer,
            config,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &DocketConfig {
        &self.config
    }

    /// Sequence service numbers are allocated from
    pub fn numbering(&self) -> &SequenceService {
        &self.numbering
    }

    /// Composer in use
    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    fn fetch(&self, request: &ComposeRequest) -> EngineResult<Inputs> {
        let body = self.records.fetch_document_body(&request.document_id)?;
        let customer = self.records.fetch_customer(&request.customer_id)?;
        let cover = request
            .cover
            .as_ref()
            .map(|id| self.templates.fetch_template(id))
            .transpose()?;
        let legal = request
            .legal
            .as_ref()
            .map(|id| self.templates.fetch_template(id))
            .transpose()?;

        Ok(Inputs {
            body,
            customer,
            cover,
            legal,
        })
    }

    /// Compose without allocating
    ///
    /// A numbered body shows its number, an unnumbered one the draft label.
    pub fn preview(&self, request: &ComposeRequest) -> EngineResult<ComposedDocument> {
        let inputs = self.fetch(request)?;
        let composed = self.composer.compose(
            ComposeMode::Preview,
            request.document_type,
            &inputs.body,
            &inputs.customer,
            inputs.cover.as_ref(),
            inputs.legal.as_ref(),
        )?;

        debug!(
            document_id = %request.document_id,
            number = composed.number(),
            sections = composed.sections().len(),
            "Composed preview"
        );
        Ok(composed)
    }

    /// Allocate a number and compose a new document
    ///
    /// # Errors
    ///
    /// Store, compose and render errors are all returned before a number
    /// is allocated. `Allocation` errors come from the sequence service.
    pub fn compose_new(&self, request: &ComposeRequest) -> EngineResult<ComposedDocument> {
        let inputs = self.fetch(request)?;
        if let Some(number) = &inputs.body.number {
            return Err(ComposeError::AlreadyNumbered(number.clone()).into());
        }

        let compose = |number: &str| {
            self.composer.compose_numbered(
                request.document_type,
                &inputs.body,
                &inputs.customer,
                inputs.cover.as_ref(),
                inputs.legal.as_ref(),
                number,
            )
        };

        if let Err(e) = compose(self.composer.draft_label()) {
            warn!(
                document_id = %request.document_id,
                document_type = %request.document_type,
                error = %e,
                "Composition failed before allocation"
            );
            return Err(e.into());
        }

        let allocated = self.numbering.allocate(request.document_type)?;
        let composed = compose(&allocated.number)?;

        debug!(
            document_id = %request.document_id,
            number = %allocated.number,
            sections = composed.sections().len(),
            "Composed new document"
        );
        Ok(composed)
    }

    /// Compose a new document and package it for signature
    ///
    /// The customer is checked for an email before a number is allocated.
    pub fn prepare_signature(&self, request: &ComposeRequest) -> EngineResult<SignaturePacket> {
        let customer = self.records.fetch_customer(&request.customer_id)?;
        if customer.email.as_deref().map_or(true, |e| e.trim().is_empty()) {
            return Err(EngineError::NotSignable(format!(
                "customer '{}' has no email",
                customer.name
            )));
        }

        let composed = self.compose_new(request)?;
        let packet = SignaturePacket::prepare(&composed, &customer)?;
        debug!(number = %packet.number, digest = %packet.digest, "Prepared signature packet");
        Ok(packet)
    }

    /// Check persisted numbers of a type against its counter
    pub fn reconcile<'a>(
        &self,
        document_type: DocumentType,
        existing: impl IntoIterator<Item = &'a str>,
    ) -> EngineResult<ReconciliationReport> {
        Ok(self.numbering.reconcile(document_type, existing)?)
    }
}
