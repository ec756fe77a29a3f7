//! Relation declarations.
//!
//! A [`RelationDescriptor`] names where the content relation fields of a
//! relation live inside a document's `data` ([`RelationShape`]) and which
//! model they resolve to ([`RelationTarget`]). Each field location is a
//! *slot*, addressed by a JSON pointer such as `/author` or
//! `/body/2/items/0/link`.

use std::{
    collections::BTreeMap,
    fmt::{self, Debug, Formatter},
};

use prismic_client::RawDocument;
use serde_json::{Map, Value};

use crate::{AnyModel, Model, ModelDocument};

/// Builds a type erased model from a fetched document.
pub type ModelFactory = fn(RawDocument) -> Box<dyn AnyModel>;

fn factory<M: Model>(raw: RawDocument) -> Box<dyn AnyModel> {
    Box::new(M::from_document(ModelDocument::new(raw)))
}

/// Content type name to model factory, for relations whose target type is
/// read from each reference.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    factories: BTreeMap<String, ModelFactory>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `M` under its content type.
    pub fn register<M: Model>(mut self) -> Self {
        self.factories.insert(M::TYPE.to_string(), factory::<M>);
        self
    }

    /// Register a factory under an explicit content type name.
    pub fn insert(&mut self, content_type: impl Into<String>, factory: ModelFactory) {
        self.factories.insert(content_type.into(), factory);
    }

    pub fn get(&self, content_type: &str) -> Option<ModelFactory> {
        self.factories.get(content_type).copied()
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.factories.contains_key(content_type)
    }

    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Debug for ModelRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

/// The model a relation resolves to.
#[derive(Clone)]
pub enum RelationTarget {
    /// Every slot becomes the same model type.
    Model {
        content_type: &'static str,
        factory: ModelFactory,
    },
    /// The model is picked per slot by the reference's `type`.
    ByType(ModelRegistry),
}

impl RelationTarget {
    pub fn model<M: Model>() -> Self {
        RelationTarget::Model {
            content_type: M::TYPE,
            factory: factory::<M>,
        }
    }

    pub fn by_type(registry: ModelRegistry) -> Self {
        RelationTarget::ByType(registry)
    }

    /// Factory for a slot whose reference declares `content_type`.
    pub fn factory_for(&self, content_type: Option<&str>) -> Option<ModelFactory> {
        match self {
            RelationTarget::Model { factory, .. } => Some(*factory),
            RelationTarget::ByType(registry) => registry.get(content_type?),
        }
    }

    pub fn is_polymorphic(&self) -> bool {
        matches!(self, RelationTarget::ByType(_))
    }
}

impl Debug for RelationTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RelationTarget::Model { content_type, .. } => {
                f.debug_tuple("Model").field(content_type).finish()
            }
            RelationTarget::ByType(registry) => f.debug_tuple("ByType").field(registry).finish(),
        }
    }
}

/// Where the relation fields sit inside `data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationShape {
    /// `data.<field>`
    One { field: String },
    /// `data.<field>[i]`, a list of references
    Many { field: String },
    /// `data.<group>[i].<field>`, one reference per repeatable group item
    ThroughGroup { group: String, field: String },
    /// `data.<zone>[i].primary.<field>` of slices with `slice_type`
    SlicePrimary {
        zone: String,
        slice_type: String,
        field: String,
    },
    /// `data.<zone>[i].items[j].<field>` of slices with `slice_type`
    SliceItems {
        zone: String,
        slice_type: String,
        field: String,
    },
}

/// A named relation of a model.
#[derive(Debug, Clone)]
pub struct RelationDescriptor {
    pub name: String,
    pub shape: RelationShape,
    pub target: RelationTarget,
}

impl RelationDescriptor {
    pub fn new(name: impl Into<String>, shape: RelationShape, target: RelationTarget) -> Self {
        Self {
            name: name.into(),
            shape,
            target,
        }
    }

    pub fn has_one(field: impl Into<String>, target: RelationTarget) -> Self {
        let field = field.into();
        Self::new(field.clone(), RelationShape::One { field }, target)
    }

    pub fn has_many(field: impl Into<String>, target: RelationTarget) -> Self {
        let field = field.into();
        Self::new(field.clone(), RelationShape::Many { field }, target)
    }

    /// Named after the group.
    pub fn through_group(
        group: impl Into<String>,
        field: impl Into<String>,
        target: RelationTarget,
    ) -> Self {
        let group = group.into();
        Self::new(
            group.clone(),
            RelationShape::ThroughGroup {
                group,
                field: field.into(),
            },
            target,
        )
    }

    /// Named after the field.
    pub fn in_slice_primary(
        zone: impl Into<String>,
        slice_type: impl Into<String>,
        field: impl Into<String>,
        target: RelationTarget,
    ) -> Self {
        let field = field.into();
        Self::new(
            field.clone(),
            RelationShape::SlicePrimary {
                zone: zone.into(),
                slice_type: slice_type.into(),
                field,
            },
            target,
        )
    }

    /// Named after the field.
    pub fn in_slice_items(
        zone: impl Into<String>,
        slice_type: impl Into<String>,
        field: impl Into<String>,
        target: RelationTarget,
    ) -> Self {
        let field = field.into();
        Self::new(
            field.clone(),
            RelationShape::SliceItems {
                zone: zone.into(),
                slice_type: slice_type.into(),
                field,
            },
            target,
        )
    }

    /// Rename the relation.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Slot paths of every relation field present in `data`, in document order.
    pub fn slots(&self, data: &Map<String, Value>) -> Vec<String> {
        match &self.shape {
            RelationShape::One { field } => data
                .get(field)
                .map(|_| vec![pointer(&[field.as_str()])])
                .unwrap_or_default(),
            RelationShape::Many { field } => items(data.get(field))
                .map(|(i, _)| pointer(&[field.as_str(), &i.to_string()]))
                .collect(),
            RelationShape::ThroughGroup { group, field } => items(data.get(group))
                .filter(|(_, item)| item.get(field).is_some())
                .map(|(i, _)| pointer(&[group.as_str(), &i.to_string(), field.as_str()]))
                .collect(),
            RelationShape::SlicePrimary {
                zone,
                slice_type,
                field,
            } => slices(data, zone, slice_type)
                .filter(|(_, slice)| {
                    slice
                        .get("primary")
                        .and_then(|primary| primary.get(field))
                        .is_some()
                })
                .map(|(i, _)| {
                    pointer(&[zone.as_str(), &i.to_string(), "primary", field.as_str()])
                })
                .collect(),
            RelationShape::SliceItems {
                zone,
                slice_type,
                field,
            } => slices(data, zone, slice_type)
                .flat_map(|(i, slice)| {
                    items(slice.get("items"))
                        .filter(|(_, item)| item.get(field).is_some())
                        .map(|(j, _)| {
                            pointer(&[
                                zone.as_str(),
                                &i.to_string(),
                                "items",
                                &j.to_string(),
                                field.as_str(),
                            ])
                        })
                        .collect::<Vec<_>>()
                })
                .collect(),
        }
    }
}

fn items(value: Option<&Value>) -> impl Iterator<Item = (usize, &Value)> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .enumerate()
}

fn slices<'a>(
    data: &'a Map<String, Value>,
    zone: &str,
    slice_type: &'a str,
) -> impl Iterator<Item = (usize, &'a Value)> + 'a {
    items(data.get(zone)).filter(move |(_, slice)| {
        slice.get("slice_type").and_then(Value::as_str) == Some(slice_type)
    })
}

fn pointer(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
        .collect()
}
