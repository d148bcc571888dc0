//! Schema object model and XSD parsing.

use crate::builtin::Builtin;
use crate::error::SchemaError;
use crate::pattern;
use regex::Regex;
use roxmltree::Node;
use std::collections::{HashMap, HashSet};

pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// `maxOccurs="unbounded"`.
pub const UNBOUNDED: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    pub min: u32,
    pub max: u32,
}

impl Occurs {
    pub const ONCE: Occurs = Occurs { min: 1, max: 1 };
}

#[derive(Debug, Clone)]
pub enum TypeRef {
    Builtin(Builtin),
    /// Named type declared at schema level, resolved at validation time.
    Named(String),
    Complex(Box<ComplexType>),
    Simple(Box<SimpleType>),
}

#[derive(Debug, Clone)]
pub struct ElementDecl {
    pub name: String,
    pub type_ref: TypeRef,
}

#[derive(Debug, Clone)]
pub enum ElementKind {
    Local(TypeRef),
    /// `ref="Name"` to a global element.
    Ref,
}

#[derive(Debug, Clone)]
pub struct ElementParticle {
    pub name: String,
    pub occurs: Occurs,
    pub kind: ElementKind,
}

#[derive(Debug, Clone)]
pub struct Group {
    pub occurs: Occurs,
    pub items: Vec<Particle>,
}

#[derive(Debug, Clone)]
pub enum Particle {
    Element(ElementParticle),
    Sequence(Group),
    Choice(Group),
    All(Group),
    /// `xs:any`: consumes elements without validating them.
    Any(Occurs),
}

#[derive(Debug, Clone)]
pub struct AttributeDecl {
    pub name: String,
    pub type_ref: TypeRef,
    pub required: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ComplexType {
    pub content: Option<Particle>,
    pub attributes: Vec<AttributeDecl>,
    pub any_attribute: bool,
    pub mixed: bool,
    /// Base type of `simpleContent`: the element carries text, not children.
    pub text: Option<TypeRef>,
    /// Named base type of a `complexContent` extension.
    pub extends: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Facets {
    pub enumeration: Vec<String>,
    pub patterns: Vec<(String, Regex)>,
    pub length: Option<usize>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_inclusive: Option<f64>,
    pub max_inclusive: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SimpleType {
    /// Declared name; `None` for anonymous types.
    pub name: Option<String>,
    pub base: Option<TypeRef>,
    pub facets: Facets,
}

/// A parsed schema document and everything it includes.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub elements: HashMap<String, ElementDecl>,
    pub complex_types: HashMap<String, ComplexType>,
    pub simple_types: HashMap<String, SimpleType>,
}

impl Schema {
    /// Parse a standalone schema. `xs:include` is rejected.
    pub fn parse(location: &str, text: &str) -> Result<Schema, SchemaError> {
        Self::parse_with_includes(location, text, &mut |included| {
            Err(SchemaError::parse(
                location,
                format!("xs:include of '{}' needs a catalogue", included),
            ))
        })
    }

    /// Parse a schema, resolving `xs:include` through `load`.
    pub fn parse_with_includes(
        location: &str,
        text: &str,
        load: &mut dyn FnMut(&str) -> Result<String, SchemaError>,
    ) -> Result<Schema, SchemaError> {
        let mut schema = Schema::default();
        let mut visited = HashSet::new();
        visited.insert(location.to_string());
        schema.merge_document(location, text, load, &mut visited)?;
        Ok(schema)
    }

    fn merge_document(
        &mut self,
        location: &str,
        text: &str,
        load: &mut dyn FnMut(&str) -> Result<String, SchemaError>,
        visited: &mut HashSet<String>,
    ) -> Result<(), SchemaError> {
        let doc = roxmltree::Document::parse(text)
            .map_err(|e| SchemaError::parse(location, e.to_string()))?;
        let root = doc.root_element();
        if !is_xs(root, "schema") {
            return Err(SchemaError::parse(location, "root element is not xs:schema"));
        }
        let parser = XsdParser { location };

        for child in xs_children(root) {
            match child.tag_name().name() {
                "element" => {
                    let decl = parser.global_element(child)?;
                    self.elements.insert(decl.name.clone(), decl);
                }
                "complexType" => {
                    let name = parser.required_attr(child, "name")?;
                    let ct = parser.complex_type(child)?;
                    self.complex_types.insert(name.to_string(), ct);
                }
                "simpleType" => {
                    let name = parser.required_attr(child, "name")?;
                    let mut st = parser.simple_type(child)?;
                    st.name = Some(name.to_string());
                    self.simple_types.insert(name.to_string(), st);
                }
                "include" => {
                    let included = parser.required_attr(child, "schemaLocation")?;
                    if visited.insert(included.to_string()) {
                        let text = load(included)?;
                        self.merge_document(included, &text, load, visited)?;
                    }
                }
                "import" => {
                    let namespace = child.attribute("namespace").unwrap_or_default();
                    return Err(SchemaError::parse(
                        location,
                        format!("xs:import of namespace '{}' is not supported", namespace),
                    ));
                }
                "annotation" | "notation" => {}
                other => {
                    return Err(SchemaError::parse(
                        location,
                        format!("unsupported top-level declaration xs:{}", other),
                    ))
                }
            }
        }
        Ok(())
    }
}

fn is_xs(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XS_NAMESPACE)
        && node.tag_name().name() == name
}

fn xs_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|c| c.is_element() && c.tag_name().namespace() == Some(XS_NAMESPACE))
}

fn local_part(qname: &str) -> &str {
    qname.rsplit_once(':').map(|(_, local)| local).unwrap_or(qname)
}

struct XsdParser<'l> {
    location: &'l str,
}

impl<'l> XsdParser<'l> {
    fn err(&self, message: impl Into<String>) -> SchemaError {
        SchemaError::parse(self.location, message)
    }

    fn required_attr<'a>(&self, node: Node<'a, '_>, name: &str) -> Result<&'a str, SchemaError> {
        node.attribute(name).ok_or_else(|| {
            self.err(format!(
                "xs:{} is missing its '{}' attribute",
                node.tag_name().name(),
                name
            ))
        })
    }

    /// Resolve a `type="..."`/`base="..."` QName to a built-in or named type.
    fn type_name(&self, node: Node<'_, '_>, qname: &str) -> TypeRef {
        let (prefix, local) = match qname.split_once(':') {
            Some((p, l)) => (Some(p), l),
            None => (None, qname),
        };
        if node.lookup_namespace_uri(prefix) == Some(XS_NAMESPACE) {
            TypeRef::Builtin(Builtin::from_name(local))
        } else {
            TypeRef::Named(local.to_string())
        }
    }

    fn occurs(&self, node: Node<'_, '_>) -> Result<Occurs, SchemaError> {
        let min = match node.attribute("minOccurs") {
            Some(v) => v
                .parse()
                .map_err(|_| self.err(format!("invalid minOccurs '{}'", v)))?,
            None => 1,
        };
        let max = match node.attribute("maxOccurs") {
            Some("unbounded") => UNBOUNDED,
            Some(v) => v
                .parse()
                .map_err(|_| self.err(format!("invalid maxOccurs '{}'", v)))?,
            None => 1,
        };
        if max < min {
            return Err(self.err(format!("maxOccurs {} is below minOccurs {}", max, min)));
        }
        Ok(Occurs { min, max })
    }

    /// Type of an element or attribute: `type` attribute, inline definition, or anyType.
    fn declared_type(&self, node: Node<'_, '_>) -> Result<TypeRef, SchemaError> {
        if let Some(t) = node.attribute("type") {
            return Ok(self.type_name(node, t));
        }
        for child in xs_children(node) {
            match child.tag_name().name() {
                "complexType" => return Ok(TypeRef::Complex(Box::new(self.complex_type(child)?))),
                "simpleType" => return Ok(TypeRef::Simple(Box::new(self.simple_type(child)?))),
                _ => {}
            }
        }
        Ok(TypeRef::Builtin(Builtin::AnyType))
    }

    fn global_element(&self, node: Node<'_, '_>) -> Result<ElementDecl, SchemaError> {
        let name = self.required_attr(node, "name")?;
        Ok(ElementDecl {
            name: name.to_string(),
            type_ref: self.declared_type(node)?,
        })
    }

    fn element_particle(&self, node: Node<'_, '_>) -> Result<ElementParticle, SchemaError> {
        let occurs = self.occurs(node)?;
        if let Some(target) = node.attribute("ref") {
            return Ok(ElementParticle {
                name: local_part(target).to_string(),
                occurs,
                kind: ElementKind::Ref,
            });
        }
        let name = self.required_attr(node, "name")?;
        Ok(ElementParticle {
            name: name.to_string(),
            occurs,
            kind: ElementKind::Local(self.declared_type(node)?),
        })
    }

    fn group(&self, node: Node<'_, '_>) -> Result<Particle, SchemaError> {
        let occurs = self.occurs(node)?;
        let mut items = Vec::new();
        for child in xs_children(node) {
            match child.tag_name().name() {
                "element" => items.push(Particle::Element(self.element_particle(child)?)),
                "sequence" | "choice" | "all" => items.push(self.group(child)?),
                "any" => items.push(Particle::Any(self.occurs(child)?)),
                "annotation" => {}
                other => return Err(self.err(format!("unsupported particle xs:{}", other))),
            }
        }
        let group = Group { occurs, items };
        Ok(match node.tag_name().name() {
            "sequence" => Particle::Sequence(group),
            "choice" => Particle::Choice(group),
            _ => Particle::All(group),
        })
    }

    fn attribute(&self, node: Node<'_, '_>) -> Result<AttributeDecl, SchemaError> {
        let name = match (node.attribute("name"), node.attribute("ref")) {
            (Some(n), _) => n,
            (None, Some(r)) => local_part(r),
            (None, None) => return Err(self.err("xs:attribute without name or ref")),
        };
        let type_ref = match self.declared_type(node)? {
            TypeRef::Builtin(Builtin::AnyType) => TypeRef::Builtin(Builtin::AnySimple),
            other => other,
        };
        Ok(AttributeDecl {
            name: name.to_string(),
            type_ref,
            required: node.attribute("use") == Some("required"),
        })
    }

    fn complex_type(&self, node: Node<'_, '_>) -> Result<ComplexType, SchemaError> {
        let mut ct = ComplexType {
            mixed: node.attribute("mixed") == Some("true"),
            ..ComplexType::default()
        };
        for child in xs_children(node) {
            match child.tag_name().name() {
                "sequence" | "choice" | "all" => ct.content = Some(self.group(child)?),
                "attribute" => ct.attributes.push(self.attribute(child)?),
                "anyAttribute" => ct.any_attribute = true,
                "simpleContent" => {
                    let derivation = self.derivation(child)?;
                    let base = self.required_attr(derivation, "base")?;
                    ct.text = Some(self.type_name(derivation, base));
                    self.derived_members(derivation, &mut ct)?;
                }
                "complexContent" => {
                    if child.attribute("mixed") == Some("true") {
                        ct.mixed = true;
                    }
                    let derivation = self.derivation(child)?;
                    if derivation.tag_name().name() == "extension" {
                        let base = self.required_attr(derivation, "base")?;
                        ct.extends = Some(local_part(base).to_string());
                    }
                    self.derived_members(derivation, &mut ct)?;
                }
                "annotation" => {}
                other => return Err(self.err(format!("unsupported xs:{} in complexType", other))),
            }
        }
        Ok(ct)
    }

    fn derivation<'a, 'input>(&self, node: Node<'a, 'input>) -> Result<Node<'a, 'input>, SchemaError> {
        xs_children(node)
            .find(|c| matches!(c.tag_name().name(), "extension" | "restriction"))
            .ok_or_else(|| self.err("content model without extension or restriction"))
    }

    fn derived_members(&self, derivation: Node<'_, '_>, ct: &mut ComplexType) -> Result<(), SchemaError> {
        for member in xs_children(derivation) {
            match member.tag_name().name() {
                "sequence" | "choice" | "all" => ct.content = Some(self.group(member)?),
                "attribute" => ct.attributes.push(self.attribute(member)?),
                "anyAttribute" => ct.any_attribute = true,
                _ => {}
            }
        }
        Ok(())
    }

    fn simple_type(&self, node: Node<'_, '_>) -> Result<SimpleType, SchemaError> {
        let mut st = SimpleType {
            name: None,
            base: None,
            facets: Facets::default(),
        };
        let Some(derivation) = xs_children(node).find(|c| c.tag_name().name() != "annotation") else {
            return Err(self.err("empty xs:simpleType"));
        };
        match derivation.tag_name().name() {
            "restriction" => {
                st.base = match derivation.attribute("base") {
                    Some(base) => Some(self.type_name(derivation, base)),
                    None => xs_children(derivation)
                        .find(|c| c.tag_name().name() == "simpleType")
                        .map(|inner| self.simple_type(inner).map(|t| TypeRef::Simple(Box::new(t))))
                        .transpose()?,
                };
                for facet in xs_children(derivation) {
                    self.facet(facet, &mut st.facets)?;
                }
            }
            // Lists and unions are accepted as plain strings.
            "list" | "union" => st.base = Some(TypeRef::Builtin(Builtin::AnySimple)),
            other => return Err(self.err(format!("unsupported xs:{} in simpleType", other))),
        }
        Ok(st)
    }

    fn facet(&self, node: Node<'_, '_>, facets: &mut Facets) -> Result<(), SchemaError> {
        let name = node.tag_name().name();
        if matches!(name, "simpleType" | "annotation") {
            return Ok(());
        }
        let value = self.required_attr(node, "value")?;
        let count = |v: &str| -> Result<usize, SchemaError> {
            v.parse()
                .map_err(|_| self.err(format!("invalid {} facet '{}'", name, v)))
        };
        let bound = |v: &str| -> Result<f64, SchemaError> {
            v.parse()
                .map_err(|_| self.err(format!("invalid {} facet '{}'", name, v)))
        };
        match name {
            "enumeration" => facets.enumeration.push(value.to_string()),
            "pattern" => {
                let regex = pattern::compile(value)
                    .map_err(|e| self.err(format!("invalid pattern '{}': {}", value, e)))?;
                facets.patterns.push((value.to_string(), regex));
            }
            "length" => facets.length = Some(count(value)?),
            "minLength" => facets.min_length = Some(count(value)?),
            "maxLength" => facets.max_length = Some(count(value)?),
            "minInclusive" => facets.min_inclusive = Some(bound(value)?),
            "maxInclusive" => facets.max_inclusive = Some(bound(value)?),
            // Accepted but not enforced.
            "whiteSpace" | "totalDigits" | "fractionDigits" | "minExclusive" | "maxExclusive" => {}
            other => return Err(self.err(format!("unsupported facet xs:{}", other))),
        }
        Ok(())
    }
}
