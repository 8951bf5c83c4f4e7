use crate::lexical::classify_lexical;
use pagesmith_protocol::{Collaborator, Intent, Prompt};
use serde::Serialize;
use std::sync::Arc;

const CLASSIFIER_INSTRUCTIONS: &str = "\
You route requests for a website builder. Reply with exactly one word:
CREATE - the user wants new sections or components added to the page;
EDIT - the user wants existing content, layout or styling changed;
DELETE - the user wants a whole section or component removed;
CHAT - anything else, including questions, planning and discussion.
No punctuation, no explanation.";

/// Where a classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Lexical,
    Collaborator,
    /// The collaborator failed or answered with something other than a label.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub intent: Intent,
    pub source: Source,
}

pub struct IntentClassifier {
    collaborator: Arc<dyn Collaborator>,
}

impl IntentClassifier {
    pub fn new(collaborator: Arc<dyn Collaborator>) -> Self {
        Self { collaborator }
    }

    /// Classify `text`, asking the collaborator only when the lexical pass is
    /// undetermined. Never fails: anything unresolved is `Chat`.
    pub async fn classify(&self, text: &str) -> Classification {
        if let Some(intent) = classify_lexical(text) {
            log::debug!("lexical intent {intent} for {text:?}");
            return Classification {
                intent,
                source: Source::Lexical,
            };
        }

        let prompt = Prompt::new(CLASSIFIER_INSTRUCTIONS, text);
        match self.collaborator.complete(&prompt).await {
            Ok(completion) => match Intent::from_label(&completion.text) {
                Some(intent) => {
                    log::debug!("collaborator intent {intent} for {text:?}");
                    Classification {
                        intent,
                        source: Source::Collaborator,
                    }
                }
                None => {
                    log::warn!("unusable intent label {:?}, treating as chat", completion.text);
                    Self::fallback()
                }
            },
            Err(err) => {
                log::warn!("intent fallback unavailable ({err}), treating as chat");
                Self::fallback()
            }
        }
    }

    fn fallback() -> Classification {
        Classification {
            intent: Intent::Chat,
            source: Source::Fallback,
        }
    }
}
