use pagesmith_mutator::{EditError, Mutator, StrategyKind};
use pagesmith_protocol::{
    EditInstruction, EditOp, ErrorKind, ModifyEdit, RawEditInstruction, RemoveEdit,
};
use pretty_assertions::assert_eq;

const HERO: &str = r#"---
const title = "Hero";
---
<section id="hero" class="py-20">
  <h1 class="text-5xl font-bold">Old Headline</h1>
  <p class="mt-4">We build <em>fast</em> websites.</p>
  <div class="actions">
    <a href="/start" class="btn">Get started</a>
  </div>
</section>
"#;

fn modify(content_match: &str, new_content: &str) -> EditOp {
    EditOp::Modify(ModifyEdit {
        content_match: Some(content_match.to_string()),
        new_content: new_content.to_string(),
        selector: None,
        hint: None,
    })
}

fn parse(json: &str) -> EditInstruction {
    let raw: RawEditInstruction = serde_json::from_str(json).unwrap();
    EditInstruction::try_from(raw).unwrap()
}

#[test]
fn exact_headline_replacement() {
    let mutator = Mutator::new();
    let mutation = mutator.apply(HERO, &modify("Old Headline", "New Headline")).unwrap();

    assert_eq!(mutation.transformations, 1);
    assert_eq!(mutation.matched.strategy, StrategyKind::ExactLiteral);
    assert_eq!(mutation.document.matches("New Headline").count(), 1);
    assert!(!mutation.document.contains("Old Headline"));

    let envelope = mutation.envelope("src/components/Hero.astro");
    assert!(envelope.success);
    assert_eq!(envelope.transformations_applied, 1);
}

#[test]
fn reapplying_an_applied_edit_fails() {
    let mutator = Mutator::new();
    let op = modify("Old Headline", "New Headline");
    let once = mutator.apply(HERO, &op).unwrap();

    let failure = mutator.apply(&once.document, &op).unwrap_err();
    assert_eq!(failure.original, once.document);
    assert_eq!(failure.error.kind(), ErrorKind::NoOpError);
    assert!(!failure.envelope("Hero.astro").success);
}

#[test]
fn replacement_containing_the_match_is_not_reapplied() {
    let mutator = Mutator::new();
    let op = modify("Sale", "Sale ends soon");
    let once = mutator.apply("<h1>Sale</h1>\n", &op).unwrap();
    assert_eq!(once.document, "<h1>Sale ends soon</h1>\n");

    let failure = mutator.apply(&once.document, &op).unwrap_err();
    assert_eq!(failure.error.kind(), ErrorKind::NoOpError);
    assert_eq!(failure.original, once.document);
    assert!(!failure.envelope("Banner.astro").success);
}

#[test]
fn ambiguous_selector_is_not_resolved_by_the_semantic_tier() {
    let source = "<section>\n  <p>First</p>\n  <p>Second</p>\n  <p>Third</p>\n</section>\n";
    let op = EditOp::Modify(ModifyEdit {
        content_match: None,
        new_content: "Replaced".to_string(),
        selector: Some("p".to_string()),
        hint: Some("paragraph text".to_string()),
    });

    let failure = Mutator::new().apply(source, &op).unwrap_err();
    assert!(matches!(failure.error, EditError::Ambiguous(_)));
    assert_eq!(failure.original, source);
    assert!(failure
        .attempts
        .iter()
        .all(|attempt| attempt.strategy != StrategyKind::SemanticHeuristic));
}

#[test]
fn fuzzy_prefix_stays_out_of_markup() {
    let source = "<section class=\"hero\">\n  <h1>Welcome</h1>\n</section>\n";
    let mutator = Mutator::new();

    let failure = mutator
        .apply(source, &modify("hero banner title", "Hello"))
        .unwrap_err();
    assert_eq!(failure.original, source);

    let mutation = mutator.apply(source, &modify("Welcome to Acme", "Hello")).unwrap();
    assert_eq!(mutation.matched.strategy, StrategyKind::FuzzyPrefix);
    assert_eq!(
        mutation.document,
        "<section class=\"hero\">\n  <h1>Hello</h1>\n</section>\n"
    );
}

#[test]
fn fragmented_text_falls_through_to_text_nodes() {
    let mutator = Mutator::new();
    let mutation = mutator
        .apply(HERO, &modify("We build fast websites.", "We ship reliable websites."))
        .unwrap();

    assert_eq!(mutation.matched.strategy, StrategyKind::TextNode);
    assert!(mutation
        .document
        .contains("<p class=\"mt-4\">We ship reliable websites.</p>"));
}

#[test]
fn ambiguous_selector_removal_fails_with_original_attached() {
    let source = "<div class=\"row\">\n  <div>One</div>\n  <div>Two</div>\n  <div>Three</div>\n</div>\n";
    let op = EditOp::Remove(RemoveEdit {
        selector: Some(".row > div".to_string()),
        content_match: None,
    });

    let failure = Mutator::new().apply(source, &op).unwrap_err();
    assert!(matches!(failure.error, EditError::Ambiguous(_)));

    let envelope = failure.envelope("Row.astro");
    assert!(!envelope.success);
    assert_eq!(envelope.error_kind, Some(ErrorKind::NoOpError));
    assert_eq!(envelope.details.as_deref(), Some(source));
}

#[test]
fn content_match_disambiguates_removal() {
    let source = "<div class=\"row\">\n  <div>One</div>\n  <div>Two</div>\n  <div>Three</div>\n</div>\n";
    let op = EditOp::Remove(RemoveEdit {
        selector: Some(".row > div".to_string()),
        content_match: Some("Two".to_string()),
    });

    let mutation = Mutator::new().apply(source, &op).unwrap();
    assert_eq!(
        mutation.document,
        "<div class=\"row\">\n  <div>One</div>\n  <div>Three</div>\n</div>\n"
    );
}

#[test]
fn missing_selector_target_is_not_found() {
    let op = EditOp::Remove(RemoveEdit {
        selector: Some("#pricing".to_string()),
        content_match: None,
    });
    let failure = Mutator::new().apply(HERO, &op).unwrap_err();
    assert_eq!(failure.error.kind(), ErrorKind::NotFoundError);
}

#[test]
fn wire_instruction_drives_the_semantic_fallback() {
    let instruction = parse(
        r#"{
            "operation": "update",
            "contentMatch": "Start your journey",
            "newContent": "Book a demo",
            "context": "the call to action button"
        }"#,
    );

    let mutation = Mutator::new().apply(HERO, &instruction.op).unwrap();
    assert_eq!(mutation.matched.strategy, StrategyKind::SemanticHeuristic);
    assert!(mutation.document.contains(">Book a demo</a>"));
}

#[test]
fn image_update_without_an_image_is_not_found() {
    let instruction = parse(
        r#"{"operation": "image-update", "elementSelector": "img", "properties": {"src": "/x.png"}}"#,
    );
    let failure = Mutator::new().apply(HERO, &instruction.op).unwrap_err();
    assert_eq!(failure.error.kind(), ErrorKind::NotFoundError);
}

#[test]
fn cache_is_bounded_and_resettable() {
    let mutator = Mutator::new();
    mutator
        .apply(HERO, &modify("Launch the rocket today", "Go"))
        .unwrap_err();
    assert!(!mutator.cache().is_empty());

    mutator.cache().reset();
    assert!(mutator.cache().is_empty());
}
