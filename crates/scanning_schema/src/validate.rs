//! Instance validation.
//!
//! Content models are matched greedily without backtracking, which is
//! enough for the deterministic models XSD requires (Unique Particle
//! Attribution). Messages follow libxml2's wording so they read the same
//! as the messages clients have always received.

use crate::builtin::Builtin;
use crate::error::SchemaError;
use crate::model::{
    ComplexType, ElementKind, ElementParticle, Facets, Group, Occurs, Particle, Schema,
    SimpleType, TypeRef,
};
use roxmltree::Node;

const MAX_DERIVATION_DEPTH: usize = 16;

impl Schema {
    /// Validate `xml` against this schema.
    ///
    /// Returns `SchemaError::Malformed` when the text is not XML and
    /// `SchemaError::Invalid` with every message found otherwise.
    pub fn validate(&self, xml: &str) -> Result<(), SchemaError> {
        let doc =
            roxmltree::Document::parse(xml).map_err(|e| SchemaError::Malformed(e.to_string()))?;
        let errors = self.validate_document(&doc);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Invalid(errors))
        }
    }

    pub fn validate_document(&self, doc: &roxmltree::Document<'_>) -> Vec<String> {
        let mut validator = Validator {
            schema: self,
            errors: Vec::new(),
        };
        let root = doc.root_element();
        match self.elements.get(root.tag_name().name()) {
            Some(decl) => validator.element(root, &decl.type_ref),
            None => validator.report(format!(
                "Element '{}': No matching global declaration available for the validation root.",
                root.tag_name().name()
            )),
        }
        validator.errors
    }
}

struct Validator<'s> {
    schema: &'s Schema,
    errors: Vec<String>,
}

impl<'s> Validator<'s> {
    fn report(&mut self, message: String) {
        self.errors.push(message);
    }

    fn element(&mut self, node: Node<'_, '_>, type_ref: &TypeRef) {
        let schema = self.schema;
        let name = node.tag_name().name();
        match type_ref {
            TypeRef::Builtin(Builtin::AnyType) => {}
            TypeRef::Builtin(builtin) => {
                if self.simple_content_only(node) {
                    self.builtin_value(&element_label(name), &text_of(node), *builtin);
                }
            }
            TypeRef::Simple(st) => {
                if self.simple_content_only(node) {
                    self.simple_value(&element_label(name), &text_of(node), st, true);
                }
            }
            TypeRef::Complex(ct) => self.complex_type(node, ct),
            TypeRef::Named(type_name) => {
                if let Some(ct) = schema.complex_types.get(type_name) {
                    self.complex_type(node, ct);
                } else if let Some(st) = schema.simple_types.get(type_name) {
                    if self.simple_content_only(node) {
                        self.simple_value(&element_label(name), &text_of(node), st, true);
                    }
                } else {
                    self.report(format!(
                        "Element '{}': The type '{}' is not defined.",
                        name, type_name
                    ));
                }
            }
        }
    }

    fn complex_type(&mut self, node: Node<'_, '_>, ct: &ComplexType) {
        if ct.extends.is_some() {
            let merged = self.merged(ct, 0);
            self.complex(node, &merged);
        } else {
            self.complex(node, ct);
        }
    }

    /// Fold a `complexContent` extension into one type: base content first.
    fn merged(&self, ct: &ComplexType, depth: usize) -> ComplexType {
        let mut merged = ct.clone();
        merged.extends = None;
        let Some(base) = ct
            .extends
            .as_ref()
            .and_then(|b| self.schema.complex_types.get(b))
        else {
            return merged;
        };
        let base = if base.extends.is_some() && depth < MAX_DERIVATION_DEPTH {
            self.merged(base, depth + 1)
        } else {
            base.clone()
        };
        merged.content = match (base.content, ct.content.clone()) {
            (Some(b), Some(c)) => Some(Particle::Sequence(Group {
                occurs: Occurs::ONCE,
                items: vec![b, c],
            })),
            (b, c) => b.or(c),
        };
        let mut attributes = base.attributes;
        attributes.extend(ct.attributes.iter().cloned());
        merged.attributes = attributes;
        merged.any_attribute |= base.any_attribute;
        if merged.text.is_none() {
            merged.text = base.text;
        }
        merged
    }

    fn simple_content_only(&mut self, node: Node<'_, '_>) -> bool {
        if node.children().any(|c| c.is_element()) {
            self.report(format!(
                "Element '{}': Element content is not allowed, because the content type is a simple type.",
                node.tag_name().name()
            ));
            return false;
        }
        true
    }

    fn complex(&mut self, node: Node<'_, '_>, ct: &ComplexType) {
        let name = node.tag_name().name();
        self.attributes(node, ct);

        if let Some(text_type) = &ct.text {
            if self.simple_content_only(node) {
                self.simple_text(&element_label(name), &text_of(node), text_type);
            }
            return;
        }

        let has_text = node
            .children()
            .any(|c| c.is_text() && !c.text().unwrap_or("").trim().is_empty());
        if !ct.mixed && has_text {
            if ct.content.is_none() {
                self.report(format!(
                    "Element '{}': Character content is not allowed, because the content type is empty.",
                    name
                ));
            } else {
                self.report(format!(
                    "Element '{}': Character content other than whitespace is not allowed because the content type is 'element-only'.",
                    name
                ));
            }
        }

        let children: Vec<Node<'_, '_>> = node.children().filter(|c| c.is_element()).collect();
        let names: Vec<&str> = children.iter().map(|c| c.tag_name().name()).collect();

        let mut matcher = Matcher {
            schema: self.schema,
            names: &names,
            pos: 0,
            expected: Vec::new(),
            bound: Vec::new(),
        };
        let satisfied = match &ct.content {
            Some(particle) => matcher.particle(particle).is_ok(),
            None => true,
        };
        let Matcher {
            pos,
            expected,
            bound,
            ..
        } = matcher;

        for (child, binding) in children.iter().zip(bound) {
            if let Some(type_ref) = binding {
                self.element(*child, type_ref);
            }
        }

        if pos < names.len() {
            self.report(format!(
                "Element '{}': This element is not expected.{}",
                names[pos],
                expected_suffix(&expected)
            ));
        } else if !satisfied {
            self.report(format!(
                "Element '{}': Missing child element(s).{}",
                name,
                expected_suffix(&expected)
            ));
        }
    }

    fn attributes(&mut self, node: Node<'_, '_>, ct: &ComplexType) {
        let element = node.tag_name().name();
        for attr in node.attributes() {
            // Qualified attributes (xsi:*) sit outside the content model.
            if attr.namespace().is_some() || ct.any_attribute {
                continue;
            }
            if ct.attributes.iter().any(|d| d.name == attr.name()) {
                continue;
            }
            self.report(format!(
                "Element '{}', attribute '{}': The attribute '{}' is not allowed.",
                element,
                attr.name(),
                attr.name()
            ));
        }

        for decl in &ct.attributes {
            match node.attribute(decl.name.as_str()) {
                Some(value) => {
                    let label = format!("Element '{}', attribute '{}'", element, decl.name);
                    self.simple_text(&label, value, &decl.type_ref);
                }
                None if decl.required => self.report(format!(
                    "Element '{}': The attribute '{}' is required but missing.",
                    element, decl.name
                )),
                None => {}
            }
        }
    }

    fn simple_text(&mut self, label: &str, value: &str, type_ref: &TypeRef) {
        let schema = self.schema;
        match type_ref {
            TypeRef::Builtin(b) => {
                self.builtin_value(label, value, *b);
            }
            TypeRef::Simple(st) => {
                self.simple_value(label, value, st, true);
            }
            TypeRef::Named(n) => {
                if let Some(st) = schema.simple_types.get(n) {
                    self.simple_value(label, value, st, true);
                }
            }
            TypeRef::Complex(_) => {}
        }
    }

    /// Returns false when a message was reported.
    fn builtin_value(&mut self, label: &str, raw: &str, builtin: Builtin) -> bool {
        let value = builtin.normalize(raw);
        if builtin.accepts(&value) {
            return true;
        }
        self.report(format!(
            "{}: '{}' is not a valid value of the atomic type '{}'.",
            label,
            value,
            builtin.xs_name()
        ));
        false
    }

    /// Check the base first, then this restriction's facets.
    fn simple_value(&mut self, label: &str, raw: &str, st: &SimpleType, outermost: bool) -> bool {
        let schema = self.schema;
        let builtin = self.base_builtin(st, 0);
        let value = builtin.normalize(raw);

        let base_ok = match &st.base {
            Some(TypeRef::Simple(inner)) => self.simple_value(label, raw, inner, false),
            Some(TypeRef::Named(n)) => match schema.simple_types.get(n) {
                Some(inner) => self.simple_value(label, raw, inner, false),
                None => true,
            },
            Some(TypeRef::Builtin(b)) => self.builtin_value(label, raw, *b),
            _ => true,
        };
        if !base_ok {
            return false;
        }

        if let Some(message) = facet_violation(&st.facets, &value, builtin) {
            self.report(format!("{}: {}", label, message));
            if outermost || st.name.is_some() {
                let kind = match &st.name {
                    Some(n) => format!("atomic type '{}'", n),
                    None => "local atomic type".to_string(),
                };
                self.report(format!(
                    "{}: '{}' is not a valid value of the {}.",
                    label, value, kind
                ));
            }
            return false;
        }
        true
    }

    fn base_builtin(&self, st: &SimpleType, depth: usize) -> Builtin {
        if depth >= MAX_DERIVATION_DEPTH {
            return Builtin::AnySimple;
        }
        match &st.base {
            Some(TypeRef::Builtin(b)) => *b,
            Some(TypeRef::Simple(inner)) => self.base_builtin(inner, depth + 1),
            Some(TypeRef::Named(n)) => self
                .schema
                .simple_types
                .get(n)
                .map(|inner| self.base_builtin(inner, depth + 1))
                .unwrap_or(Builtin::AnySimple),
            _ => Builtin::AnySimple,
        }
    }
}

fn element_label(name: &str) -> String {
    format!("Element '{}'", name)
}

fn facet_violation(facets: &Facets, value: &str, builtin: Builtin) -> Option<String> {
    if !facets.enumeration.is_empty() && !facets.enumeration.iter().any(|e| e == value) {
        let set = facets
            .enumeration
            .iter()
            .map(|e| format!("'{}'", e))
            .collect::<Vec<_>>()
            .join(", ");
        return Some(format!(
            "[facet 'enumeration'] The value '{}' is not an element of the set {{{}}}.",
            value, set
        ));
    }
    for (source, regex) in &facets.patterns {
        if !regex.is_match(value) {
            return Some(format!(
                "[facet 'pattern'] The value '{}' is not accepted by the pattern '{}'.",
                value, source
            ));
        }
    }
    let len = value.chars().count();
    if let Some(expected) = facets.length {
        if len != expected {
            return Some(format!(
                "[facet 'length'] The value has a length of '{}'; this differs from the allowed length of '{}'.",
                len, expected
            ));
        }
    }
    if let Some(min) = facets.min_length {
        if len < min {
            return Some(format!(
                "[facet 'minLength'] The value has a length of '{}'; this underruns the allowed minimum length of '{}'.",
                len, min
            ));
        }
    }
    if let Some(max) = facets.max_length {
        if len > max {
            return Some(format!(
                "[facet 'maxLength'] The value has a length of '{}'; this exceeds the allowed maximum length of '{}'.",
                len, max
            ));
        }
    }
    if builtin.is_numeric() {
        if let Ok(number) = value.parse::<f64>() {
            if let Some(min) = facets.min_inclusive.filter(|min| number < *min) {
                return Some(format!(
                    "[facet 'minInclusive'] The value '{}' is less than the minimum value allowed ('{}').",
                    value, min
                ));
            }
            if let Some(max) = facets.max_inclusive.filter(|max| number > *max) {
                return Some(format!(
                    "[facet 'maxInclusive'] The value '{}' is greater than the maximum value allowed ('{}').",
                    value, max
                ));
            }
        }
    }
    None
}

fn text_of(node: Node<'_, '_>) -> String {
    node.children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect()
}

fn expected_suffix(expected: &[String]) -> String {
    match expected {
        [] => String::new(),
        [only] => format!(" Expected is ( {} ).", only),
        many => format!(" Expected is one of ( {} ).", many.join(", ")),
    }
}

/// Greedy content-model matcher over the element children of one parent.
struct Matcher<'p, 'c> {
    schema: &'p Schema,
    names: &'c [&'c str],
    pos: usize,
    /// Names that would have been accepted at `pos`.
    expected: Vec<String>,
    /// Type of each consumed child; `None` for wildcard matches.
    bound: Vec<Option<&'p TypeRef>>,
}

impl<'p, 'c> Matcher<'p, 'c> {
    fn current(&self) -> Option<&'c str> {
        self.names.get(self.pos).copied()
    }

    fn expect(&mut self, name: &str) {
        if !self.expected.iter().any(|e| e == name) {
            self.expected.push(name.to_string());
        }
    }

    fn advance(&mut self, binding: Option<&'p TypeRef>) {
        self.bound.push(binding);
        self.pos += 1;
        self.expected.clear();
    }

    fn binding(&self, particle: &'p ElementParticle) -> Option<&'p TypeRef> {
        match &particle.kind {
            ElementKind::Local(t) => Some(t),
            ElementKind::Ref => self.schema.elements.get(&particle.name).map(|d| &d.type_ref),
        }
    }

    /// `Err` when the particle's minimum occurrence cannot be met at this point.
    fn particle(&mut self, particle: &'p Particle) -> Result<(), ()> {
        match particle {
            Particle::Element(e) => self.element(e),
            Particle::Any(occurs) => {
                let mut n = 0;
                while n < occurs.max && self.current().is_some() {
                    self.advance(None);
                    n += 1;
                }
                if n < occurs.min {
                    self.expect("##any");
                    return Err(());
                }
                Ok(())
            }
            Particle::Sequence(g) => self.repeat(g, Self::sequence_once),
            Particle::Choice(g) => self.repeat(g, Self::choice_once),
            Particle::All(g) => self.all(g),
        }
    }

    fn element(&mut self, particle: &'p ElementParticle) -> Result<(), ()> {
        let binding = self.binding(particle);
        let mut n = 0;
        while n < particle.occurs.max && self.current() == Some(particle.name.as_str()) {
            self.advance(binding);
            n += 1;
        }
        if n < particle.occurs.max {
            self.expect(&particle.name);
        }
        if n < particle.occurs.min {
            Err(())
        } else {
            Ok(())
        }
    }

    fn repeat(
        &mut self,
        group: &'p Group,
        once: fn(&mut Self, &'p Group) -> Result<(), ()>,
    ) -> Result<(), ()> {
        let mut count = 0;
        while count < group.occurs.max {
            let start = self.pos;
            match once(self, group) {
                // An iteration that matched nothing would match nothing forever.
                Ok(()) if self.pos == start => return Ok(()),
                Ok(()) => count += 1,
                Err(()) if self.pos == start && count >= group.occurs.min => return Ok(()),
                Err(()) => return Err(()),
            }
        }
        Ok(())
    }

    fn sequence_once(&mut self, group: &'p Group) -> Result<(), ()> {
        for item in &group.items {
            self.particle(item)?;
        }
        Ok(())
    }

    /// Commits to the first branch that consumes anything.
    fn choice_once(&mut self, group: &'p Group) -> Result<(), ()> {
        let start = self.pos;
        let mut empty_match = false;
        for item in &group.items {
            let result = self.particle(item);
            if self.pos != start {
                return result;
            }
            empty_match |= result.is_ok();
        }
        if empty_match {
            Ok(())
        } else {
            Err(())
        }
    }

    fn all(&mut self, group: &'p Group) -> Result<(), ()> {
        let mut seen = vec![false; group.items.len()];
        let start = self.pos;
        while let Some(name) = self.current() {
            let hit = group.items.iter().enumerate().find_map(|(i, p)| match p {
                Particle::Element(e) if !seen[i] && e.name == name => Some((i, e)),
                _ => None,
            });
            let Some((i, e)) = hit else {
                break;
            };
            seen[i] = true;
            let binding = self.binding(e);
            self.advance(binding);
        }
        let mut complete = true;
        for (i, item) in group.items.iter().enumerate() {
            if let Particle::Element(e) = item {
                if !seen[i] {
                    self.expect(&e.name);
                    complete &= e.occurs.min == 0;
                }
            }
        }
        if complete || (self.pos == start && group.occurs.min == 0) {
            Ok(())
        } else {
            Err(())
        }
    }
}
