//! In-memory collaborators
//!
//! DashMap-backed template store and record source for embedding and tests.
//! Lookups return clones; the engine never holds a reference into the map
//! across a render.

use dashmap::DashMap;
use docket_core::{
    Customer, CustomerId, DocumentBody, DocumentId, DocumentType, RecordSource, StoreError, StoreResult, Template,
    TemplateId, TemplateStore,
};

/// Templates held in memory, keyed by id
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: DashMap<TemplateId, Template>,
}

impl MemoryTemplateStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with templates
    pub fn with_templates(templates: impl IntoIterator<Item = Template>) -> Self {
        let store = Self::new();
        for template in templates {
            store.insert(template);
        }
        store
    }

    /// Insert or replace a template, returning the previous version
    pub fn insert(&self, template: Template) -> Option<Template> {
        self.templates.insert(template.id.clone(), template)
    }

    /// Remove a template
    pub fn remove(&self, id: &TemplateId) -> Option<Template> {
        self.templates.remove(id).map(|(_, t)| t)
    }

    /// Number of templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True if no templates are stored
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn fetch_template(&self, id: &TemplateId) -> StoreResult<Template> {
        self.templates
            .get(id)
            .map(|t| t.value().clone())
            .ok_or_else(|| StoreError::not_found("template", id))
    }
}

/// Customers and document bodies held in memory
#[derive(Debug, Default)]
pub struct MemoryRecordSource {
    customers: DashMap<CustomerId, Customer>,
    bodies: DashMap<DocumentId, DocumentBody>,
}

impl MemoryRecordSource {
    /// Empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a customer
    pub fn insert_customer(&self, customer: Customer) -> Option<Customer> {
        self.customers.insert(customer.id, customer)
    }

    /// Insert or replace a document body
    pub fn insert_body(&self, body: DocumentBody) -> Option<DocumentBody> {
        self.bodies.insert(body.id, body)
    }

    /// Persist an issued number on a stored body
    ///
    /// # Errors
    ///
    /// `NotFound` if the body is not stored.
    pub fn assign_number(&self, id: &DocumentId, number: impl Into<String>) -> StoreResult<()> {
        let mut body = self
            .bodies
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("document", id))?;
        body.number = Some(number.into());
        Ok(())
    }

    /// Numbers already persisted on bodies of one type
    pub fn numbers(&self, document_type: DocumentType) -> Vec<String> {
        let mut numbers: Vec<String> = self
            .bodies
            .iter()
            .filter(|b| b.document_type == document_type)
            .filter_map(|b| b.number.clone())
            .collect();
        numbers.sort();
        numbers
    }
}

impl RecordSource for MemoryRecordSource {
    fn fetch_customer(&self, id: &CustomerId) -> StoreResult<Customer> {
        self.customers
            .get(id)
            .map(|c| c.value().clone())
            .ok_or_else(|| StoreError::not_found("customer", id))
    }

    fn fetch_document_body(&self, id: &DocumentId) -> StoreResult<DocumentBody> {
        self.bodies
            .get(id)
            .map(|b| b.value().clone())
            .ok_or_else(|| StoreError::not_found("document", id))
    }
}
