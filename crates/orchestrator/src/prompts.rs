//! Fixed prompt texts sent to the collaborator.

use pagesmith_protocol::{RawEditInstruction, ResultEnvelope};

pub const EDIT_SYSTEM: &str = r#"You edit one component of a website. Answer with JSON only: a single edit
instruction object or an array of them. Fields:
  "operation": "modify" | "remove" | "add" | "move" | "structure-update" | "image-update"
  "component": the component name
  "contentMatch": exact visible text of the element to change, copied from the document
  "newContent": replacement text or markup
  "elementSelector": optional CSS selector (tag, #id, .class, [attr=value], :contains(text))
  "properties": optional object; "position" (before|after|prepend|append), "anchor",
                "anchorSelector", "src", "alt"
  "context": short description of the element, used when nothing else matches
Copy contentMatch verbatim. Never return the whole file."#;

pub const CREATE_SYSTEM: &str = "You write a single website section as an Astro component \
using Tailwind CSS classes. Answer with the component source only: an optional `---` \
frontmatter block followed by markup. No explanations, no code fences.";

pub const CHAT_SYSTEM: &str = "You are a helpful assistant for a website builder. Answer \
the question conversationally. Do not produce edit instructions.";

pub fn edit_request(request: &str, component: &str, document: &str) -> String {
    format!(
        "Request: {request}\n\nComponent: {component}\n\nCurrent document:\n```\n{document}\n```"
    )
}

pub fn create_request(name: &str, request: &str, with_images: bool) -> String {
    let reference = if with_images {
        "\nRecreate the design shown in the attached image(s) as closely as possible."
    } else {
        ""
    };
    format!("Write the `{name}` section.\nUser request: {request}{reference}")
}

/// Failed instructions with their errors and the current document.
pub fn correction_request(
    request: &str,
    component: &str,
    failures: &[(RawEditInstruction, ResultEnvelope)],
    document: &str,
) -> String {
    let mut out = format!(
        "Some edit instructions for `{component}` could not be applied.\nOriginal request: {request}\n"
    );
    for (instruction, envelope) in failures {
        let json = serde_json::to_string(instruction).unwrap_or_default();
        let error = envelope.error.as_deref().unwrap_or("unknown error");
        out.push_str(&format!("\nInstruction: {json}\nError: {error}\n"));
    }
    out.push_str(&format!(
        "\nCurrent document:\n```\n{document}\n```\nReturn corrected instructions for the failed edits only."
    ));
    out
}

/// Asks for the rest of a completion that stopped on the output limit.
pub fn continuation_request(original: &str, partial: &str) -> String {
    let tail_start = partial
        .char_indices()
        .rev()
        .nth(400)
        .map_or(0, |(idx, _)| idx);
    format!(
        "{original}\n\nYour previous answer was cut off. It ended with:\n{}\nContinue exactly where it stopped, without repeating anything.",
        &partial[tail_start..]
    )
}
