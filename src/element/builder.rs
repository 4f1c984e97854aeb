use crate::binding::bind::BindingSet;
use crate::element::container::{Container, Template};
use crate::element::dynamic::{
    ActionElement, ConditionalElement, StringElement, TagElement, TextFieldElement,
};
use crate::element::memo::MemoizedFragment;
use crate::element::node::Element;
use crate::element::reference::ComponentReference;
use crate::element::repetition::Repetition;
use crate::foundation::error::{TrellisError, TrellisResult};
use crate::foundation::location::TemplateLocation;
use crate::foundation::value::Value;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::sync::Arc;

/// JSON form of a template node.
///
/// A string is literal text, an array is a sequence, an object is an element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeDef {
    Text(String),
    Seq(Vec<NodeDef>),
    Element(Box<ElementDef>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    String,
    Tag,
    Textfield,
    Action,
    If,
    Component,
    Repetition,
    Memo,
    Container,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementDef {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Tag name or referenced component name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub bindings: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<NodeDef>,
    #[serde(default, rename = "else", skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<NodeDef>,
    /// Source line, reported in error positions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Turns [`NodeDef`] trees into immutable element trees for one named template.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    template: Arc<str>,
}

impl TemplateBuilder {
    pub fn new(template: &str) -> Self {
        Self {
            template: Arc::from(template),
        }
    }

    pub fn build(&self, def: &NodeDef) -> TrellisResult<Element> {
        match def {
            NodeDef::Text(s) => Ok(Element::text(s.as_str())),
            NodeDef::Seq(items) => {
                let mut t = Template::new();
                for item in items {
                    t.add(self.build(item)?);
                }
                Ok(Element::Template(t))
            }
            NodeDef::Element(e) => self.build_element(e),
        }
    }

    /// Parse a JSON document and build it.
    pub fn build_json(&self, json: &str) -> TrellisResult<Element> {
        let def: NodeDef = serde_json::from_str(json)
            .map_err(|e| TrellisError::serde(format!("template '{}': {e}", self.template)))?;
        self.build(&def)
    }

    fn build_element(&self, def: &ElementDef) -> TrellisResult<Element> {
        let mut bindings = BindingSet::new();
        for (name, raw) in &def.bindings {
            bindings = bindings.with(name, raw.clone())?;
        }
        let element = match def.kind {
            ElementKind::String => Element::Str(StringElement::new(bindings)?),
            ElementKind::Tag => Element::Tag(TagElement::new(
                self.name(def)?,
                bindings,
                self.optional(def.content.as_ref())?,
            )?),
            ElementKind::Textfield => Element::TextField(TextFieldElement::new(bindings)?),
            ElementKind::Action => Element::Action(ActionElement::new(
                bindings,
                self.optional(def.content.as_ref())?,
            )?),
            ElementKind::If => Element::Conditional(ConditionalElement::new(
                bindings,
                self.content(def)?,
                self.optional(def.otherwise.as_ref())?,
            )?),
            ElementKind::Component => {
                Element::ComponentReference(ComponentReference::new(self.name(def)?, bindings))
            }
            ElementKind::Repetition => {
                Element::Repetition(Repetition::new(bindings, self.content(def)?)?)
            }
            ElementKind::Memo => {
                Element::Memoized(MemoizedFragment::new(bindings, self.content(def)?)?)
            }
            ElementKind::Container => {
                let mut c = Container::new();
                match &def.content {
                    Some(NodeDef::Seq(items)) => {
                        for item in items {
                            c.add(self.build(item)?);
                        }
                    }
                    Some(other) => c.add(self.build(other)?),
                    None => {}
                }
                Element::Container(c)
            }
        };
        Ok(match def.line {
            Some(line) => {
                element.with_location(TemplateLocation::new(Arc::clone(&self.template), line))
            }
            None => element,
        })
    }

    fn name<'d>(&self, def: &'d ElementDef) -> TrellisResult<&'d str> {
        def.name.as_deref().ok_or_else(|| {
            TrellisError::configuration(format!(
                "template '{}': {:?} element needs a 'name'",
                self.template, def.kind
            ))
        })
    }

    fn content(&self, def: &ElementDef) -> TrellisResult<Element> {
        match &def.content {
            Some(c) => self.build(c),
            None => Err(TrellisError::configuration(format!(
                "template '{}': {:?} element needs 'content'",
                self.template, def.kind
            ))),
        }
    }

    fn optional(&self, def: Option<&NodeDef>) -> TrellisResult<Option<Element>> {
        def.map(|d| self.build(d)).transpose()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/element/builder.rs"]
mod tests;
