use pagesmith_lifecycle::ProjectLayout;
use pagesmith_orchestrator::{EngineConfig, Orchestrator};
use pagesmith_protocol::{
    Collaborator, ErrorKind, Intent, OfflineCollaborator, ScriptedCollaborator,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

const PAGE: &str = r#"---
import Layout from '../layouts/Layout.astro';
import Hero from '../components/Hero.astro';
import Pricing from '../components/Pricing.astro';
---
<Layout title="Acme">
  <main>
    <div id="hero">
      <Hero />
    </div>
    <div id="pricing">
      <Pricing />
    </div>
  </main>
</Layout>
"#;

const HERO: &str = "<section>\n  <h1 class=\"text-5xl\">Old Headline</h1>\n  <p>Ship it.</p>\n</section>\n";

struct Project {
    _dir: TempDir,
    layout: ProjectLayout,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let layout = ProjectLayout::with_root(dir.path());
        std::fs::create_dir_all(layout.components_path()).unwrap();
        std::fs::create_dir_all(layout.manifest_path().parent().unwrap()).unwrap();
        std::fs::write(layout.manifest_path(), PAGE).unwrap();
        std::fs::write(layout.components_path().join("Hero.astro"), HERO).unwrap();
        std::fs::write(
            layout.components_path().join("Pricing.astro"),
            "<section>Pricing</section>\n",
        )
        .unwrap();
        Self { _dir: dir, layout }
    }

    fn engine(&self, collaborator: Arc<dyn Collaborator>) -> Orchestrator {
        let config = EngineConfig {
            project: self.layout.clone(),
            ..EngineConfig::default()
        };
        Orchestrator::new(config, collaborator)
    }

    fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.layout.root.join(relative)).unwrap()
    }

    fn exists(&self, relative: &str) -> bool {
        self.layout.root.join(relative).exists()
    }
}

#[tokio::test]
async fn create_below_anchor_uses_template_offline() {
    let project = Project::new();
    let engine = project.engine(Arc::new(OfflineCollaborator));

    let outcome = engine.handle("add a FAQ section below the Hero", &[]).await;

    assert!(outcome.success, "{outcome:?}");
    assert_eq!(outcome.intent, Intent::Create);
    assert_eq!(outcome.modified_files, vec!["src/components/Faq.astro"]);
    assert!(project
        .read("src/components/Faq.astro")
        .contains("Frequently asked questions"));

    let page = project.read("src/pages/index.astro");
    let hero = page.find("<div id=\"hero\">").unwrap();
    let faq = page.find("<div id=\"faq\">").unwrap();
    let pricing = page.find("<div id=\"pricing\">").unwrap();
    assert!(hero < faq && faq < pricing);
    assert!(page.contains("import Faq from '../components/Faq.astro';"));
}

#[tokio::test]
async fn enumerated_components_keep_their_order_after_the_anchor() {
    let project = Project::new();
    let engine = project.engine(Arc::new(OfflineCollaborator));

    let outcome = engine
        .handle("add sections including Team and Contact after Hero", &[])
        .await;

    assert!(outcome.success, "{outcome:?}");
    let page = project.read("src/pages/index.astro");
    let order: Vec<usize> = ["hero", "team", "contact", "pricing"]
        .iter()
        .map(|id| page.find(&format!("<div id=\"{id}\">")).unwrap())
        .collect();
    assert!(order.windows(2).all(|pair| pair[0] < pair[1]), "{page}");
}

#[tokio::test]
async fn delete_tears_down_file_and_manifest_entry() {
    let project = Project::new();
    let engine = project.engine(Arc::new(OfflineCollaborator));

    let outcome = engine.handle("delete the pricing section", &[]).await;

    assert!(outcome.success, "{outcome:?}");
    assert_eq!(
        outcome.modified_files,
        vec!["src/pages/index.astro", "src/components/Pricing.astro"]
    );
    assert!(!project.exists("src/components/Pricing.astro"));
    let page = project.read("src/pages/index.astro");
    assert!(!page.contains("Pricing"));
}

#[tokio::test]
async fn delete_without_a_name_changes_nothing() {
    let project = Project::new();
    let engine = project.engine(Arc::new(OfflineCollaborator));

    let outcome = engine.handle("delete the section", &[]).await;

    assert!(!outcome.success);
    assert_eq!(outcome.intent, Intent::Delete);
    assert!(outcome.modified_files.is_empty());
    assert_eq!(project.read("src/pages/index.astro"), PAGE);
}

#[tokio::test]
async fn edit_applies_collaborator_instruction() {
    let project = Project::new();
    let collaborator = Arc::new(ScriptedCollaborator::new().reply(
        "```json\n{\"operation\":\"modify\",\"contentMatch\":\"Old Headline\",\"newContent\":\"Build faster\"}\n```",
    ));
    let engine = project.engine(collaborator.clone());

    let outcome = engine
        .handle("Hero: change the headline to Build faster", &[])
        .await;

    assert!(outcome.success, "{outcome:?}");
    assert_eq!(outcome.modified_files, vec!["src/components/Hero.astro"]);
    assert_eq!(outcome.envelopes[0].transformations_applied, 1);
    assert!(project
        .read("src/components/Hero.astro")
        .contains("<h1 class=\"text-5xl\">Build faster</h1>"));

    let prompts = collaborator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].user.contains("Old Headline"));
    assert!(prompts[0].user.starts_with("Request: change the headline"));
}

#[tokio::test]
async fn failed_instruction_gets_one_correction_round() {
    let project = Project::new();
    let collaborator = Arc::new(
        ScriptedCollaborator::new()
            .reply(r#"{"operation":"modify","contentMatch":"Nonexistent words","newContent":"X"}"#)
            .reply(r#"{"operation":"modify","contentMatch":"Old Headline","newContent":"Fixed"}"#),
    );
    let engine = project.engine(collaborator.clone());

    let outcome = engine.handle("Hero: change the headline to Fixed", &[]).await;

    assert!(outcome.success, "{outcome:?}");
    assert_eq!(outcome.envelopes.len(), 1);
    assert!(project.read("src/components/Hero.astro").contains(">Fixed</h1>"));

    let prompts = collaborator.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].user.contains("could not be applied"));
    assert!(prompts[1].user.contains("Nonexistent words"));
}

#[tokio::test]
async fn headline_colour_request_bypasses_the_collaborator() {
    let project = Project::new();
    let collaborator = Arc::new(ScriptedCollaborator::new());
    let engine = project.engine(collaborator.clone());

    let outcome = engine.handle("make all headlines emerald", &[]).await;

    assert!(outcome.success, "{outcome:?}");
    assert_eq!(outcome.modified_files, vec!["src/components/Hero.astro"]);
    assert!(project
        .read("src/components/Hero.astro")
        .contains("class=\"text-5xl text-emerald-700 dark:text-emerald-300\""));
    assert_eq!(
        project.read("src/components/Pricing.astro"),
        "<section>Pricing</section>\n"
    );
    assert!(collaborator.prompts().is_empty());
}

#[tokio::test]
async fn direct_instructions_are_aggregated_independently() {
    let project = Project::new();
    let engine = project.engine(Arc::new(OfflineCollaborator));

    let outcome = engine
        .apply_instruction(
            r#"[
                {"operation":"modify","component":"Hero","contentMatch":"Ship it.","newContent":"Ship it today."},
                {"component":"Hero","contentMatch":"Old Headline"}
            ]"#,
        )
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.response.as_deref(), Some("Applied 1 edit(s)"));
    assert_eq!(outcome.modified_files, vec!["src/components/Hero.astro"]);
    assert_eq!(outcome.envelopes.len(), 2);
    assert!(outcome.envelopes[0].success);
    assert_eq!(outcome.envelopes[1].error_kind, Some(ErrorKind::ValidationError));
    assert!(project.read("src/components/Hero.astro").contains("<p>Ship it today.</p>"));
}

#[tokio::test]
async fn dark_value_turns_a_colour_modify_into_a_scoped_literal_rewrite() {
    let project = Project::new();
    std::fs::write(
        project.layout.components_path().join("Hero.astro"),
        "<section>\n  <h1 class=\"text-[#1a2b3c] dark:text-[#eeeeee]\">Hi</h1>\n</section>\n",
    )
    .unwrap();
    std::fs::write(
        project.layout.components_path().join("Pricing.astro"),
        "<section class=\"bg-[#1a2b3c]\">Pricing</section>\n",
    )
    .unwrap();
    let engine = project.engine(Arc::new(OfflineCollaborator));

    let outcome = engine
        .apply_instruction(
            r##"{"operation":"modify","component":"Hero","contentMatch":"#1A2B3C","newContent":"#ff0000","properties":{"darkValue":"#ffaaaa"}}"##,
        )
        .await;

    assert!(outcome.success, "{outcome:?}");
    assert_eq!(outcome.envelopes[0].transformations_applied, 2);
    assert_eq!(
        project.read("src/components/Hero.astro"),
        "<section>\n  <h1 class=\"text-[#ff0000] dark:text-[#ffaaaa]\">Hi</h1>\n</section>\n"
    );
    assert_eq!(
        project.read("src/components/Pricing.astro"),
        "<section class=\"bg-[#1a2b3c]\">Pricing</section>\n"
    );
}

#[tokio::test]
async fn unknown_component_is_not_found() {
    let project = Project::new();
    let engine = project.engine(Arc::new(ScriptedCollaborator::new()));

    let outcome = engine.handle("update the gallery captions", &[]).await;

    assert!(!outcome.success);
    assert_eq!(outcome.envelopes[0].error_kind, Some(ErrorKind::NotFoundError));
}

#[tokio::test]
async fn planning_question_is_chat_and_writes_nothing() {
    let project = Project::new();
    let collaborator = Arc::new(ScriptedCollaborator::new().reply("Let's pin the scope down first."));
    let engine = project.engine(collaborator);

    let outcome = engine
        .handle("what's our project scope for the pricing section", &[])
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.intent, Intent::Chat);
    assert_eq!(outcome.response.as_deref(), Some("Let's pin the scope down first."));
    assert!(outcome.modified_files.is_empty());
    assert_eq!(project.read("src/components/Pricing.astro"), "<section>Pricing</section>\n");
}

#[tokio::test]
async fn truncated_completion_is_continued_once() {
    let project = Project::new();
    let collaborator = Arc::new(
        ScriptedCollaborator::new()
            .reply_truncated("Part one, ")
            .reply_truncated("part two.")
            .reply("never requested"),
    );
    let engine = project.engine(collaborator.clone());

    let outcome = engine.dispatch(Intent::Chat, "tell me a story", &[]).await;

    assert_eq!(outcome.response.as_deref(), Some("Part one, part two."));
    assert_eq!(collaborator.remaining(), 1);
    assert!(collaborator.prompts()[1].user.contains("was cut off"));
}

#[tokio::test]
async fn chat_stream_forwards_to_the_channel() {
    let project = Project::new();
    let engine = project.engine(Arc::new(ScriptedCollaborator::new().reply("streamed answer")));
    let (tx, mut rx) = mpsc::channel(4);

    let outcome = engine.chat_stream("hello", tx).await;

    assert!(outcome.success);
    assert_eq!(rx.recv().await.as_deref(), Some("streamed answer"));
}
