use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use mform_domain::{FieldValue, FormData};

use crate::engine::{EngineOptions, FormEngine};
use crate::migration::migrate_to_latest;
use crate::result::FormResult;
use crate::template::render_note_body;

fn legacy_book_form() -> serde_json::Value {
    json!({
        "title": "Book",
        "name": "book",
        "fields": [
            { "name": "title", "label": "Title", "description": "", "isRequired": true,
              "input": { "type": "text" } },
            { "name": "pages", "description": "", "input": { "type": "number" } },
            { "name": "finished", "description": "", "input": { "type": "toggle" } },
            { "name": "review", "description": "", "input": { "type": "textarea" },
              "condition": { "dependencyName": "finished", "type": "boolean", "value": true } }
        ],
        "template": {
            "createCommand": false,
            "parsedTemplate": [
                { "tag": "frontmatter-command", "pick": ["title", "pages"], "omit": [] },
                { "tag": "text", "value": "Review: " },
                { "tag": "variable", "value": "review" }
            ]
        }
    })
}

#[test]
fn legacy_form_fills_and_renders_a_note() {
    let form = migrate_to_latest(&legacy_book_form())
        .unwrap()
        .into_form()
        .unwrap();

    let submitted: Rc<RefCell<Option<FormData>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&submitted);
    let (engine, fields) = FormEngine::for_form(
        &form,
        EngineOptions::new().on_submit(move |data| *sink.borrow_mut() = Some(data)),
    );
    let [title, pages, finished, review] = fields.as_slice() else {
        panic!("expected four fields");
    };

    assert_eq!(review.is_visible.get(), Ok(false));
    assert!(!engine.trigger_submit());
    assert_eq!(title.errors.get(), vec!["'Title' is required".to_string()]);

    title.value.set("Dune");
    pages.value.set("412");
    finished.value.set(true);
    assert_eq!(review.is_visible.get(), Ok(true));
    review.value.set("Great");
    assert!(engine.trigger_submit());

    let data = submitted.borrow_mut().take().unwrap();
    assert_eq!(data.get("pages"), Some(&FieldValue::Number(412.0)));

    let body = render_note_body(&form, &data).unwrap();
    assert_eq!(body, "---\npages: 412\ntitle: Dune\n---\nReview: Great");

    let result = FormResult::ok(data);
    assert_eq!(
        result.as_dataview_properties(),
        "finished:: true\npages:: 412\nreview:: Great\ntitle:: Dune"
    );
}

#[test]
fn migration_error_round_trips_through_serialization() {
    let mut raw = legacy_book_form();
    raw["fields"][1]["input"] = json!({ "type": "slider", "min": 1 });
    let entry = migrate_to_latest(&raw).unwrap();
    assert!(!entry.is_form());
    let saved = serde_json::to_value(&entry).unwrap();
    assert_eq!(saved, raw);
    assert_eq!(migrate_to_latest(&saved).unwrap(), entry);
}

#[test]
fn arbitrary_non_forms_never_panic() {
    for raw in [
        json!(""),
        json!(true),
        json!({}),
        json!({ "title": 1, "name": 2, "fields": 3 }),
        json!([{ "title": "a", "name": "b", "fields": [] }]),
    ] {
        assert!(migrate_to_latest(&raw).is_err());
    }
}
