//! Document type registry.
//!
//! A plain table from document type to the handles that parse and check its
//! embedded XML. Built once at start-up and shared read-only.

use crate::error::DocumentError;
use crate::forms::{Correspondence, Ep2pg, Lp1f, Lp1h, Lp2, Lpa115, Lpa116, Lpa120, Lpc};
use crate::sanitize::root_name;
use chrono::{DateTime, Utc};
use scanning_protocol::DocumentType;
use serde::de::IgnoredAny;
use std::collections::HashMap;

/// An embedded document bound to its form layout.
#[derive(Debug, Clone)]
pub enum TypedDocument {
    Lp1f(Lp1f),
    Lp1h(Lp1h),
    Lp2(Lp2),
    Lpc(Lpc),
    Ep2pg(Ep2pg),
    Lpa115(Lpa115),
    Lpa116(Lpa116),
    Lpa120(Lpa120),
    Correspondence(Correspondence),
    SupCorrespondence(Correspondence),
    /// Schema-checked only. Keeps the root element name.
    Generic { root: String },
}

impl TypedDocument {
    /// `SubType` of correspondence, forwarded to the case service.
    pub fn sub_type(&self) -> Option<&str> {
        match self {
            TypedDocument::Correspondence(c) | TypedDocument::SupCorrespondence(c)
                if !c.sub_type.is_empty() =>
            {
                Some(c.sub_type.as_str())
            }
            _ => None,
        }
    }
}

pub type Parser = fn(&str) -> Result<TypedDocument, quick_xml::DeError>;

/// Cross-field checks. Returns findings, never fails.
pub type SemanticValidator = fn(&TypedDocument, DateTime<Utc>) -> Vec<String>;

#[derive(Clone, Copy)]
pub struct Component {
    pub parser: Parser,
    pub validator: Option<SemanticValidator>,
    /// Typed parsers expect the root element to carry the type tag.
    pub typed: bool,
}

macro_rules! typed_parser {
    ($name:ident, $variant:ident) => {
        fn $name(xml: &str) -> Result<TypedDocument, quick_xml::DeError> {
            Ok(TypedDocument::$variant(quick_xml::de::from_str(xml)?))
        }
    };
}

typed_parser!(parse_lp1f, Lp1f);
typed_parser!(parse_lp1h, Lp1h);
typed_parser!(parse_lp2, Lp2);
typed_parser!(parse_lpc, Lpc);
typed_parser!(parse_ep2pg, Ep2pg);
typed_parser!(parse_lpa115, Lpa115);
typed_parser!(parse_lpa116, Lpa116);
typed_parser!(parse_lpa120, Lpa120);
typed_parser!(parse_correspondence, Correspondence);
typed_parser!(parse_sup_correspondence, SupCorrespondence);

fn parse_generic(xml: &str) -> Result<TypedDocument, quick_xml::DeError> {
    quick_xml::de::from_str::<IgnoredAny>(xml)?;
    Ok(TypedDocument::Generic {
        root: root_name(xml).unwrap_or_default(),
    })
}

fn check_form(doc: &TypedDocument, now: DateTime<Utc>) -> Vec<String> {
    match doc {
        TypedDocument::Lp1f(form) => form.validate(now),
        TypedDocument::Lp1h(form) => form.validate(now),
        TypedDocument::Lp2(form) => form.validate(now),
        TypedDocument::Lpc(form) => form.validate(now),
        TypedDocument::Ep2pg(form) => form.validate(now),
        TypedDocument::Lpa115(form) => form.validate(now),
        TypedDocument::Lpa116(form) => form.validate(now),
        _ => Vec::new(),
    }
}

fn component_for(doc_type: DocumentType) -> Component {
    let typed = |parser: Parser, checked: bool| Component {
        parser,
        validator: checked.then_some(check_form as SemanticValidator),
        typed: true,
    };
    match doc_type {
        DocumentType::Lp1f => typed(parse_lp1f, true),
        DocumentType::Lp1h => typed(parse_lp1h, true),
        DocumentType::Lp2 => typed(parse_lp2, true),
        DocumentType::Lpc => typed(parse_lpc, true),
        DocumentType::Ep2pg => typed(parse_ep2pg, true),
        DocumentType::Lpa115 => typed(parse_lpa115, true),
        DocumentType::Lpa116 => typed(parse_lpa116, true),
        DocumentType::Lpa120 => typed(parse_lpa120, false),
        DocumentType::Correspondence => typed(parse_correspondence, false),
        DocumentType::SupCorrespondence => typed(parse_sup_correspondence, false),
        _ => Component {
            parser: parse_generic,
            validator: None,
            typed: false,
        },
    }
}

pub struct Registry {
    components: HashMap<DocumentType, Component>,
}

impl Registry {
    /// Registry covering every supported document type.
    pub fn new() -> Self {
        Self {
            components: DocumentType::ALL
                .iter()
                .map(|&t| (t, component_for(t)))
                .collect(),
        }
    }

    pub fn component(&self, tag: &str) -> Result<(DocumentType, Component), DocumentError> {
        DocumentType::parse(tag)
            .and_then(|t| self.components.get(&t).map(|c| (t, *c)))
            .ok_or_else(|| DocumentError::UnsupportedType(tag.to_string()))
    }

    pub fn parser_for(&self, tag: &str) -> Result<Parser, DocumentError> {
        self.component(tag).map(|(_, c)| c.parser)
    }

    pub fn validator_for(&self, tag: &str) -> Result<Option<SemanticValidator>, DocumentError> {
        self.component(tag).map(|(_, c)| c.validator)
    }

    pub fn is_supported(&self, tag: &str) -> bool {
        self.component(tag).is_ok()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
