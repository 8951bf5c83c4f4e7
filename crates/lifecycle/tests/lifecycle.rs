use pagesmith_lifecycle::{
    DeleteStep, LifecycleError, LifecycleManager, Placement, PositionHint, ProjectLayout,
    Relation, StepStatus,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

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

const FAQ_BODY: &str = "---\nconst items = [];\n---\n<section id=\"faq-section\">\n  <h2>Questions</h2>\n</section>\n";

fn project() -> (TempDir, LifecycleManager) {
    let dir = TempDir::new().unwrap();
    let layout = ProjectLayout::with_root(dir.path());
    std::fs::create_dir_all(layout.components_path()).unwrap();
    std::fs::create_dir_all(layout.manifest_path().parent().unwrap()).unwrap();
    std::fs::write(layout.manifest_path(), PAGE).unwrap();
    for name in ["Hero", "Pricing"] {
        std::fs::write(
            layout.components_path().join(format!("{name}.astro")),
            format!("<section>{name}</section>\n"),
        )
        .unwrap();
    }
    (dir, LifecycleManager::new(layout))
}

fn manifest(manager: &LifecycleManager) -> String {
    std::fs::read_to_string(manager.layout().manifest_path()).unwrap()
}

#[tokio::test]
async fn create_below_anchor_places_wrapper_after_it() {
    let (_dir, manager) = project();

    let created = manager
        .create("Faq", FAQ_BODY, Some(&PositionHint::new(Relation::After, "Hero")))
        .await
        .unwrap();

    assert_eq!(created.file_path, "src/components/Faq.astro");
    assert_eq!(created.placement, Placement::After("hero".to_string()));

    let page = manifest(&manager);
    let hero = page.find("<div id=\"hero\">").unwrap();
    let faq = page.find("<div id=\"faq\">").unwrap();
    let pricing = page.find("<div id=\"pricing\">").unwrap();
    assert!(hero < faq && faq < pricing);
    assert_eq!(page.matches("import Faq from '../components/Faq.astro';").count(), 1);
    assert_eq!(
        std::fs::read_to_string(manager.layout().components_path().join("Faq.astro")).unwrap(),
        FAQ_BODY
    );
}

#[tokio::test]
async fn create_then_delete_restores_the_manifest() {
    let (_dir, manager) = project();

    manager
        .create("faq", FAQ_BODY, Some(&PositionHint::new(Relation::Before, "Pricing")))
        .await
        .unwrap();
    let report = manager.delete("Faq").await.unwrap();

    assert!(report.success());
    assert!(report
        .steps
        .iter()
        .all(|step| step.status == StepStatus::Applied));
    assert_eq!(manifest(&manager), PAGE);
    assert!(!manager.layout().components_path().join("Faq.astro").exists());
}

#[tokio::test]
async fn repeated_delete_converges_with_absent_steps() {
    let (_dir, manager) = project();

    assert!(manager.delete("Pricing").await.unwrap().success());
    let again = manager.delete("pricing").await.unwrap();

    assert!(again.success());
    assert_eq!(
        again.steps.iter().map(|s| (s.step, s.status.clone())).collect::<Vec<_>>(),
        vec![
            (DeleteStep::ManifestWrapper, StepStatus::AlreadyAbsent),
            (DeleteStep::ManifestImport, StepStatus::AlreadyAbsent),
            (DeleteStep::ComponentFile, StepStatus::AlreadyAbsent),
        ]
    );
    assert!(again.envelope().success);
    assert!(!manifest(&manager).contains("Pricing"));
}

#[tokio::test]
async fn partial_state_is_cleaned_up() {
    let (_dir, manager) = project();
    std::fs::remove_file(manager.layout().components_path().join("Hero.astro")).unwrap();

    let report = manager.delete("Hero").await.unwrap();
    assert!(report.success());
    assert_eq!(report.steps[0].status, StepStatus::Applied);
    assert_eq!(report.steps[2].status, StepStatus::AlreadyAbsent);
}

#[tokio::test]
async fn creating_an_existing_component_is_refused() {
    let (_dir, manager) = project();
    let err = manager.create("Hero", "<section/>", None).await.unwrap_err();
    assert!(matches!(err, LifecycleError::AlreadyExists(_)));
    assert_eq!(manifest(&manager), PAGE);
}

#[tokio::test]
async fn listing_reports_dangling_entries() {
    let (_dir, manager) = project();
    std::fs::remove_file(manager.layout().components_path().join("Pricing.astro")).unwrap();
    std::fs::write(manager.layout().components_path().join("Draft.astro"), "<p/>").unwrap();

    let listing = manager.list().await.unwrap();
    let names: Vec<(&str, bool)> = listing
        .components
        .iter()
        .map(|c| (c.name.as_str(), c.in_manifest))
        .collect();
    assert_eq!(names, vec![("Draft", false), ("Hero", true)]);
    assert_eq!(listing.dangling.len(), 1);
    assert_eq!(listing.dangling[0].id, "pricing");
}

#[tokio::test]
async fn invalid_names_are_validation_errors() {
    let (_dir, manager) = project();
    let err = manager.delete("   ").await.unwrap_err();
    assert_eq!(err.kind(), pagesmith_protocol::ErrorKind::ValidationError);
}
