use pagesmith_intent::{IntentClassifier, Source};
use pagesmith_protocol::{Intent, OfflineCollaborator, ScriptedCollaborator};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[tokio::test]
async fn lexical_hits_never_reach_the_collaborator() {
    let collaborator = Arc::new(ScriptedCollaborator::new().reply("EDIT"));
    let classifier = IntentClassifier::new(collaborator.clone());

    let result = classifier
        .classify("what's our project scope for the pricing section")
        .await;
    assert_eq!(result.intent, Intent::Chat);
    assert_eq!(result.source, Source::Lexical);
    assert!(collaborator.prompts().is_empty());
}

#[tokio::test]
async fn undetermined_text_asks_for_one_label() {
    let collaborator = Arc::new(ScriptedCollaborator::new().reply(" edit.\n"));
    let classifier = IntentClassifier::new(collaborator.clone());

    let result = classifier.classify("the hero headline feels too long").await;
    assert_eq!(result.intent, Intent::Edit);
    assert_eq!(result.source, Source::Collaborator);

    let prompts = collaborator.prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].user, "the hero headline feels too long");
}

#[tokio::test]
async fn malformed_label_is_chat() {
    let collaborator = Arc::new(ScriptedCollaborator::new().reply("Probably EDIT, I think"));
    let result = IntentClassifier::new(collaborator)
        .classify("the hero headline feels too long")
        .await;
    assert_eq!(result.intent, Intent::Chat);
    assert_eq!(result.source, Source::Fallback);
}

#[tokio::test]
async fn unreachable_collaborator_is_chat() {
    let result = IntentClassifier::new(Arc::new(OfflineCollaborator))
        .classify("hmm")
        .await;
    assert_eq!(result.intent, Intent::Chat);
    assert_eq!(result.source, Source::Fallback);
}
