//! Relation resolution: batching, idempotence and the slot state machine.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use prismic_client::testing::MockApi;
use prismic_orm::prelude::*;
use prismic_orm::{RelationShape, ResolveOutcome};
use serde_json::json;

fn article_model(id: &str, data: serde_json::Value) -> Article {
    Article::from_document(ModelDocument::new(
        RawDocument::from_value(article(id, data)).unwrap(),
    ))
}

fn descriptor(name: &str) -> RelationDescriptor {
    Article::relation(name).unwrap()
}

#[tokio::test]
async fn test_has_one_is_idempotent() {
    init_tracing();
    let api = library();
    let resolver = RelationResolver::new(&api);
    let mut article = article_model("X1", json!({ "author": link("A1", "author") }));

    let outcome = resolver
        .resolve_one(&mut article, &descriptor("author"))
        .await
        .unwrap();
    assert_eq!(outcome.fetched, 1);
    assert_eq!(api.call_count(), 1);

    let first: *const Author = article.author().unwrap();
    assert_eq!(article.author().unwrap().document().field_str("name"), Some("Jane"));

    let again = resolver
        .resolve_one(&mut article, &descriptor("author"))
        .await
        .unwrap();
    assert_eq!(again.already_resolved, 1);
    assert_eq!(again.bulk_fetches, 0);
    assert_eq!(api.call_count(), 1);
    assert!(std::ptr::eq(first, article.author().unwrap()));
}

#[tokio::test]
async fn test_broken_references_stay_raw() {
    let api = library();
    let mut articles = vec![
        article_model("X1", json!({ "author": broken_link("A1", "author") })),
        article_model("X2", json!({ "author": link("A2", "author") })),
        article_model("X3", json!({ "author": { "link_type": "Web", "url": "https://example.com" } })),
        article_model("X4", json!({ "author": null })),
    ];

    let outcome = RelationResolver::new(&api)
        .resolve(&mut articles, &descriptor("author"))
        .await
        .unwrap();

    assert_eq!(outcome.fetched, 1);
    assert_eq!(outcome.unresolvable, 3);
    assert_eq!(api.bulk_fetches(), vec![vec!["A2".to_string()]]);

    assert!(articles[0].author().is_none());
    assert_eq!(
        articles[0].document().value_at("/author"),
        Some(&broken_link("A1", "author"))
    );
    assert!(articles[1].author().is_some());
}

#[tokio::test]
async fn test_eager_loaded_reference_needs_no_call() {
    let api = MockApi::new(Vec::new());
    let mut article = article_model(
        "X1",
        json!({ "author": eager_link("A9", "author", json!({ "name": "Inline" })) }),
    );

    let outcome = RelationResolver::new(&api)
        .resolve_one(&mut article, &descriptor("author"))
        .await
        .unwrap();

    assert_eq!(outcome.eager, 1);
    assert_eq!(api.call_count(), 0);
    let author = article.author().unwrap();
    assert_eq!(author.document().id(), Some("A9"));
    assert_eq!(author.document().field_str("name"), Some("Inline"));
    assert!(article.document().resolved("/author").unwrap().is::<Author>());
}

#[tokio::test]
async fn test_polymorphic_has_many_keeps_order() {
    let api = library();
    let mut article = article_model(
        "X1",
        json!({ "related": [link("A2", "author"), link("C1", "category")] }),
    );
    let related = descriptor("related");

    RelationResolver::new(&api)
        .resolve_one(&mut article, &related)
        .await
        .unwrap();

    let models = article.document().related_slots(&related);
    assert_eq!(models.len(), 2);
    assert!(models[0].is::<Author>());
    assert!(models[1].is::<Category>());
    assert_eq!(
        models[1].downcast_ref::<Category>().unwrap().document().field_str("label"),
        Some("Rust")
    );
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn test_unregistered_polymorphic_type_is_skipped() {
    let api = library();
    let mut article = article_model(
        "X1",
        json!({ "related": [link("A1", "author"), link("V1", "video")] }),
    );

    let outcome = RelationResolver::new(&api)
        .resolve_one(&mut article, &descriptor("related"))
        .await
        .unwrap();

    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.fetched, 1);
    assert_eq!(api.bulk_fetches(), vec![vec!["A1".to_string()]]);
    assert!(article.document().resolved("/related/1").is_none());
}

#[tokio::test]
async fn test_one_bulk_fetch_across_result_set() {
    let api = library();
    let mut articles = vec![
        article_model("X1", json!({ "author": link("A1", "author") })),
        article_model("X2", json!({ "author": link("A2", "author") })),
        article_model("X3", json!({ "author": link("A1", "author") })),
    ];

    let outcome = RelationResolver::new(&api)
        .resolve(&mut articles, &descriptor("author"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ResolveOutcome {
            fetched: 3,
            bulk_fetches: 1,
            ..ResolveOutcome::default()
        }
    );
    assert_eq!(
        api.bulk_fetches(),
        vec![vec!["A1".to_string(), "A2".to_string()]]
    );
    assert_eq!(articles[2].author().unwrap().document().id(), Some("A1"));
}

#[tokio::test]
async fn test_missing_documents_leave_reference() {
    let api = library();
    let mut article = article_model("X1", json!({ "author": link("GONE", "author") }));

    let outcome = RelationResolver::new(&api)
        .resolve_one(&mut article, &descriptor("author"))
        .await
        .unwrap();

    assert_eq!(outcome.missing, 1);
    assert!(article.author().is_none());
    assert!(article.document().value_at("/author").is_some());
}

#[tokio::test]
async fn test_group_and_slice_shapes() {
    let api = library();
    let mut article = Article::query()
        .with_client(&api)
        .with(["categories", "quote_authors", "photographers"])
        .unwrap()
        .find("r1")
        .await
        .unwrap()
        .unwrap();

    let categories = article.document().related_all::<Category>(&descriptor("categories"));
    let labels: Vec<_> = categories
        .iter()
        .filter_map(|c| c.document().field_str("label"))
        .collect();
    assert_eq!(labels, vec!["Rust", "Web"]);

    let quoted = article.document().related::<Author>("/body/0/primary/author");
    assert_eq!(quoted.unwrap().document().id(), Some("A3"));

    let photographers = article
        .document()
        .related_all::<Author>(&descriptor("photographers"));
    assert_eq!(ids_of(&photographers), vec!["A2", "A1"]);

    // one lookup by uid plus one bulk fetch per requested relation
    assert_eq!(api.call_count(), 4);

    let again = RelationResolver::new(&api)
        .resolve_one(&mut article, &descriptor("photographers"))
        .await
        .unwrap();
    assert_eq!(again.already_resolved, 2);
    assert_eq!(api.call_count(), 4);
}

#[tokio::test]
async fn test_relations_resolved_for_whole_query() {
    let api = library();

    let articles = Article::query()
        .with_client(&api)
        .order_by("uid")
        .with(["author"])
        .unwrap()
        .all()
        .await
        .unwrap();

    let authors: Vec<Option<&str>> = articles
        .iter()
        .map(|a| a.author().and_then(|author| author.document().id()))
        .collect();
    assert_eq!(authors, vec![Some("A1"), Some("A1"), Some("A2")]);
    assert_eq!(api.call_count(), 2);
    assert_eq!(
        api.bulk_fetches(),
        vec![vec!["A1".to_string(), "A2".to_string()]]
    );
}

#[tokio::test]
async fn test_load_relation_on_access() {
    let api = library();
    let mut article = Article::query()
        .with_client(&api)
        .find("r3")
        .await
        .unwrap()
        .unwrap();
    assert!(article.author().is_none());

    load_relation(&mut article, "author", &api).await.unwrap();
    assert_eq!(article.author().unwrap().document().field_str("name"), Some("Joe"));

    load_relation(&mut article, "author", &api).await.unwrap();
    assert_eq!(api.call_count(), 2);

    let err = load_relation(&mut article, "editor", &api).await.err().unwrap();
    assert!(matches!(err, OrmError::InvalidArgument(_)));
}

#[test]
fn test_declared_shapes() {
    assert_eq!(
        descriptor("categories").shape,
        RelationShape::ThroughGroup {
            group: "categories".to_string(),
            field: "category".to_string()
        }
    );
    assert!(descriptor("related").target.is_polymorphic());
    assert!(Article::relation("editor").is_none());
}

fn ids_of(models: &[&Author]) -> Vec<String> {
    models
        .iter()
        .filter_map(|m| m.document().id().map(str::to_string))
        .collect()
}
