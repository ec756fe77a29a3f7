//! Document accessors of models.

mod common;

use chrono::Datelike;
use common::*;
use pretty_assertions::assert_eq;
use prismic_orm::prelude::*;
use serde_json::json;

fn ownership() -> Article {
    let raw = RawDocument::from_value(article(
        "R1",
        json!({
            "title": "Ownership in practice",
            "subTitle": "camel",
            "sub_title": "snake",
            "reading_time": 7,
            "summary": [],
            "featured": true
        }),
    ))
    .unwrap();
    Article::from_document(ModelDocument::new(raw))
}

#[test]
fn test_typed_attribute_getters() {
    let article = ownership();
    let doc = article.document();

    assert_eq!(doc.id(), Some("R1"));
    assert_eq!(doc.uid(), Some("r1"));
    assert_eq!(doc.content_type(), Some("article"));
    assert_eq!(doc.tags(), &["news".to_string()]);
    assert_eq!(doc.lang(), Some("en-us"));
    assert_eq!(doc.first_published_at().map(|d| d.year()), Some(2019));
    assert_eq!(doc.last_published_at(), None);
}

#[test]
fn test_field_presence_treats_empty_as_absent() {
    let article = ownership();
    let doc = article.document();

    assert!(doc.has_field("title"));
    assert!(!doc.has_field("summary"));
    assert_eq!(doc.field("summary"), Some(&json!([])));
    assert_eq!(doc.field_i64("reading_time"), Some(7));
    assert_eq!(doc.field_bool("featured"), Some(true));
    assert!(doc.has_attribute("tags"));
    assert!(!doc.has_attribute("href"));
}

#[test]
fn test_get_prefers_computed_then_field_then_attribute() {
    let article = ownership();

    assert_eq!(article.get("word_count"), Some(json!(3)));
    assert_eq!(article.get("title"), Some(json!("Ownership in practice")));
    assert_eq!(article.get("lang"), Some(json!("en-us")));
    assert_eq!(article.get("subTitle"), Some(json!("camel")));
    assert_eq!(article.get("readingTime"), Some(json!(7)));
    assert_eq!(article.get("firstPublicationDate"), Some(json!("2019-05-17T09:12:44+0000")));
    assert_eq!(article.get("unknown"), None);
}

#[test]
fn test_attach_document_after_construction() {
    let mut article = Article::from_document(ModelDocument::empty());
    assert!(!article.document().is_loaded());
    assert_eq!(article.get("title"), None);

    article
        .document_mut()
        .attach_document(RawDocument::from_value(article_json()).unwrap());
    assert_eq!(article.title(), Some("Late"));
}

fn article_json() -> serde_json::Value {
    article("L1", json!({ "title": "Late" }))
}

#[test]
fn test_registry_lists_types() {
    let registry = ModelRegistry::new()
        .register::<Author>()
        .register::<Category>();

    assert_eq!(registry.len(), 2);
    assert!(registry.contains("author"));
    assert!(!registry.contains("article"));
    assert_eq!(registry.content_types().collect::<Vec<_>>(), vec!["author", "category"]);
}
