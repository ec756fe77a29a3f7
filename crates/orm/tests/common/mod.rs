//! Shared models and fixtures for ORM integration tests.

#![allow(dead_code)]

use prismic_client::testing::MockApi;
use prismic_orm::prelude::*;
use serde_json::{json, Value};

/// Declares a model without relations.
macro_rules! plain_model {
    ($name:ident, $type:literal) => {
        #[derive(Debug)]
        pub struct $name(pub ModelDocument);

        impl Model for $name {
            const TYPE: &'static str = $type;

            fn from_document(document: ModelDocument) -> Self {
                $name(document)
            }

            fn document(&self) -> &ModelDocument {
                &self.0
            }

            fn document_mut(&mut self) -> &mut ModelDocument {
                &mut self.0
            }
        }
    };
}

plain_model!(Author, "author");
plain_model!(Category, "category");
plain_model!(Homepage, "homepage");

/// An article with one of each relation shape.
#[derive(Debug)]
pub struct Article(pub ModelDocument);

impl Article {
    pub fn title(&self) -> Option<&str> {
        self.0.field_str("title")
    }

    pub fn author(&self) -> Option<&Author> {
        self.0.related("/author")
    }
}

impl Model for Article {
    const TYPE: &'static str = "article";

    fn from_document(document: ModelDocument) -> Self {
        Article(document)
    }

    fn document(&self) -> &ModelDocument {
        &self.0
    }

    fn document_mut(&mut self) -> &mut ModelDocument {
        &mut self.0
    }

    fn relation(name: &str) -> Option<RelationDescriptor> {
        match name {
            "author" => Some(RelationDescriptor::has_one(
                "author",
                RelationTarget::model::<Author>(),
            )),
            "categories" => Some(RelationDescriptor::through_group(
                "categories",
                "category",
                RelationTarget::model::<Category>(),
            )),
            "related" => Some(RelationDescriptor::has_many(
                "related",
                RelationTarget::by_type(
                    ModelRegistry::new()
                        .register::<Author>()
                        .register::<Category>(),
                ),
            )),
            "quote_authors" => Some(
                RelationDescriptor::in_slice_primary(
                    "body",
                    "quote",
                    "author",
                    RelationTarget::model::<Author>(),
                )
                .named("quote_authors"),
            ),
            "photographers" => Some(
                RelationDescriptor::in_slice_items(
                    "body",
                    "gallery",
                    "photographer",
                    RelationTarget::model::<Author>(),
                )
                .named("photographers"),
            ),
            _ => None,
        }
    }

    fn scope(name: &str, builder: QueryBuilder) -> OrmResult<QueryBuilder> {
        match name {
            "featured" => Ok(builder
                .where_tag("featured")
                .order_by_desc("first_publication_date")),
            "ranked" => Ok(builder.order_by("rank")),
            _ => Err(OrmError::InvalidArgument(format!("unknown article scope `{}`", name))),
        }
    }

    fn computed(&self, key: &str) -> Option<Value> {
        match key {
            "word_count" => self
                .title()
                .map(|title| json!(title.split_whitespace().count())),
            _ => None,
        }
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A resolvable document link.
pub fn link(id: &str, content_type: &str) -> Value {
    json!({ "id": id, "type": content_type, "isBroken": false, "link_type": "Document" })
}

pub fn broken_link(id: &str, content_type: &str) -> Value {
    json!({ "id": id, "type": content_type, "isBroken": true, "link_type": "Document" })
}

/// A link whose target the API already inlined.
pub fn eager_link(id: &str, content_type: &str, data: Value) -> Value {
    json!({
        "id": id, "type": content_type, "isBroken": false,
        "link_type": "Document", "data": data
    })
}

pub fn author(id: &str, name: &str) -> Value {
    json!({ "id": id, "type": "author", "lang": "en-us", "data": { "name": name } })
}

pub fn category(id: &str, label: &str) -> Value {
    json!({ "id": id, "type": "category", "lang": "en-us", "data": { "label": label } })
}

pub fn article(id: &str, data: Value) -> Value {
    json!({
        "id": id,
        "uid": id.to_lowercase(),
        "type": "article",
        "lang": "en-us",
        "tags": ["news"],
        "first_publication_date": "2019-05-17T09:12:44+0000",
        "data": data
    })
}

/// Authors A1-A3, categories C1-C2 and three articles linking to them.
pub fn library() -> MockApi {
    MockApi::from_json(vec![
        author("A1", "Jane"),
        author("A2", "Joe"),
        author("A3", "Ann"),
        category("C1", "Rust"),
        category("C2", "Web"),
        article(
            "R1",
            json!({
                "title": "Ownership in practice",
                "author": link("A1", "author"),
                "categories": [
                    { "category": link("C1", "category") },
                    { "category": link("C2", "category") }
                ],
                "related": [link("A2", "author"), link("C1", "category")],
                "body": [
                    { "slice_type": "quote", "primary": { "author": link("A3", "author") }, "items": [] },
                    {
                        "slice_type": "gallery",
                        "primary": {},
                        "items": [
                            { "photographer": link("A2", "author") },
                            { "photographer": link("A1", "author") }
                        ]
                    }
                ]
            }),
        ),
        article(
            "R2",
            json!({
                "title": "Borrowing",
                "author": link("A1", "author"),
                "categories": [{ "category": link("C1", "category") }]
            }),
        ),
        article(
            "R3",
            json!({
                "title": "Lifetimes",
                "author": link("A2", "author"),
                "categories": []
            }),
        ),
    ])
}

/// `count` articles with ids `N01`, `N02`, ... and ranks in id order.
pub fn numbered_articles(count: usize) -> MockApi {
    MockApi::from_json(
        (1..=count)
            .map(|n| article(&format!("N{:02}", n), json!({ "title": format!("Article {}", n), "rank": n })))
            .collect(),
    )
}

/// Article documents tagged `featured`, `F1` published before `F2`.
pub fn featured_articles() -> MockApi {
    let mut older = article("F1", json!({ "title": "Older" }));
    older["tags"] = json!(["featured"]);
    let mut newer = article("F2", json!({ "title": "Newer" }));
    newer["tags"] = json!(["featured"]);
    newer["first_publication_date"] = json!("2020-01-02T10:00:00+0000");
    MockApi::from_json(vec![older, newer, article("P1", json!({ "title": "Plain" }))])
}

pub fn ids<M: Model>(models: &[M]) -> Vec<String> {
    models
        .iter()
        .filter_map(|model| model.document().id().map(str::to_string))
        .collect()
}
