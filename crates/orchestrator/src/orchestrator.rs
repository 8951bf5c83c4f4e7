use crate::config::EngineConfig;
use crate::edit::EditHandler;
use crate::error::{OrchestratorError, Result};
use crate::instructions::{parse_instructions, strip_code_fence};
use crate::prompts;
use crate::request::{delete_name, named_prefix, parse_create, style_request, StyleRequest};
use crate::resolve::resolve_component;
use crate::templates::{generic_template, template_for};
use pagesmith_intent::{Classification, IntentClassifier};
use pagesmith_lifecycle::{
    ComponentFile, ComponentListing, ComponentName, DeleteStep, LifecycleManager, PositionHint,
    Relation, StepStatus, VersionedFile,
};
use pagesmith_mutator::{Mutator, SearchCache};
use pagesmith_protocol::{
    Collaborator, CollaboratorError, ErrorKind, ImageRef, Intent, Outcome, Prompt,
    RawEditInstruction, ResultEnvelope,
};
use pagesmith_styles::{StyleAxis, StyleReference, StyleReport, StyleResolver};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Routes classified requests to the lifecycle manager, the mutator or the style
/// resolver, and normalises every result into an [`Outcome`].
pub struct Orchestrator {
    config: EngineConfig,
    lifecycle: LifecycleManager,
    styles: StyleResolver,
    mutator: Mutator,
    classifier: IntentClassifier,
    collaborator: Arc<dyn Collaborator>,
}

impl Orchestrator {
    pub fn new(config: EngineConfig, collaborator: Arc<dyn Collaborator>) -> Self {
        let cache = SearchCache::new(config.engine.search_cache_capacity);
        Self {
            lifecycle: LifecycleManager::new(config.project.clone()),
            styles: StyleResolver::new(config.project.clone()),
            mutator: Mutator::with_cache(cache),
            classifier: IntentClassifier::new(collaborator.clone()),
            collaborator,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mutator(&self) -> &Mutator {
        &self.mutator
    }

    pub async fn classify(&self, text: &str) -> Classification {
        self.classifier.classify(text).await
    }

    /// Classify and dispatch one request.
    pub async fn handle(&self, text: &str, images: &[ImageRef]) -> Outcome {
        let classification = self.classify(text).await;
        log::info!(
            "request classified {} ({:?})",
            classification.intent,
            classification.source
        );
        self.dispatch(classification.intent, text, images).await
    }

    pub async fn dispatch(&self, intent: Intent, text: &str, images: &[ImageRef]) -> Outcome {
        match intent {
            Intent::Create => self.handle_create(text, images).await,
            Intent::Edit => self.handle_edit(text, images).await,
            Intent::Delete => self.handle_delete(text).await,
            Intent::Chat => self.handle_chat(text).await,
        }
    }

    /// Conversational answer streamed into `sink`. Dropping the receiver stops
    /// forwarding; nothing already sent is taken back.
    pub async fn chat_stream(&self, text: &str, sink: mpsc::Sender<String>) -> Outcome {
        let prompt = Prompt::new(prompts::CHAT_SYSTEM, text);
        match self.collaborator.stream(&prompt, sink).await {
            Ok(()) => Outcome::ok(Intent::Chat, "", Vec::new()),
            Err(err) => Outcome::err(Intent::Chat, err.to_string()),
        }
    }

    /// Apply instruction JSON (one object or an array) without a collaborator round.
    pub async fn apply_instruction(&self, json: &str) -> Outcome {
        let raws = match parse_instructions(json) {
            Ok(raws) => raws,
            Err(err) => return self.failure(Intent::Edit, &err),
        };
        let components = self.lifecycle.store().list();
        let handler = self.edit_handler();

        let mut envelopes = Vec::with_capacity(raws.len());
        for raw in &raws {
            envelopes.push(handler.apply_raw(raw, &components, None).await);
        }
        aggregate_edits(envelopes)
    }

    /// Create one component. Without a body, a built-in template is used when the
    /// name is well known, else the collaborator writes one, else a generic body.
    pub async fn create_component(
        &self,
        name: &str,
        body: Option<&str>,
        hint: Option<&PositionHint>,
    ) -> Outcome {
        let envelope = self.create_one(name, body, hint, "", &[]).await;
        aggregate_creates(vec![envelope])
    }

    pub async fn delete_component(&self, name: &str) -> Outcome {
        match self.lifecycle.delete(name).await {
            Ok(report) => {
                let envelope = report.envelope();
                let mut modified = Vec::new();
                for step in &report.steps {
                    if step.status != StepStatus::Applied {
                        continue;
                    }
                    let path = match step.step {
                        DeleteStep::ComponentFile => report.file_path.clone(),
                        _ => self.manifest_display(),
                    };
                    if !modified.contains(&path) {
                        modified.push(path);
                    }
                }

                let outcome = if report.success() {
                    if modified.is_empty() {
                        log::warn!("{} was already gone", report.component);
                    }
                    Outcome::ok(Intent::Delete, format!("Deleted {}", report.component), modified)
                } else {
                    let mut outcome = Outcome::err(Intent::Delete, report.summary());
                    outcome.modified_files = modified;
                    outcome
                };
                outcome.with_envelopes(vec![envelope])
            }
            Err(err) => Outcome::err(Intent::Delete, err.to_string()).with_envelopes(vec![
                ResultEnvelope::failed(name, err.kind(), err.to_string(), None),
            ]),
        }
    }

    pub async fn update_styles(&self, request: &StyleRequest) -> Outcome {
        let report = match request {
            StyleRequest::Literal { from, to, dark } => {
                self.styles.rewrite_literal(from, to, dark.as_deref()).await
            }
            StyleRequest::Slot { slot, family } => self.styles.sweep_slot(*slot, family).await,
        };
        match report {
            Ok(report) => style_outcome(report),
            Err(err) => self.failure(Intent::Edit, &OrchestratorError::from(err)),
        }
    }

    pub async fn scan_styles(&self, axis: StyleAxis) -> Result<Vec<StyleReference>> {
        Ok(self.styles.scan(axis).await?)
    }

    pub async fn list_components(&self) -> Result<ComponentListing> {
        Ok(self.lifecycle.list().await?)
    }

    async fn handle_create(&self, text: &str, images: &[ImageRef]) -> Outcome {
        let request = parse_create(text);
        log::info!("creating {:?} (hint {:?})", request.names, request.hint);

        let mut hint = request.hint;
        let mut envelopes = Vec::with_capacity(request.names.len());
        for name in &request.names {
            let envelope = self.create_one(name, None, hint.as_ref(), text, images).await;
            // Several new components placed after an anchor keep the requested order.
            if envelope.success {
                if let Some(current) = hint.as_mut().filter(|h| h.relation == Relation::After) {
                    current.anchor = name.clone();
                }
            }
            envelopes.push(envelope);
        }
        aggregate_creates(envelopes)
    }

    async fn create_one(
        &self,
        name: &str,
        body: Option<&str>,
        hint: Option<&PositionHint>,
        request: &str,
        images: &[ImageRef],
    ) -> ResultEnvelope {
        let parsed = match ComponentName::parse(name) {
            Ok(parsed) => parsed,
            Err(err) => return ResultEnvelope::failed(name, err.kind(), err.to_string(), None),
        };
        let body = match body {
            Some(body) => body.to_string(),
            None => self.component_body(&parsed, request, images).await,
        };

        match self.lifecycle.create(parsed.as_str(), &body, hint).await {
            Ok(created) => {
                ResultEnvelope::applied(created.file_path, vec![created.component], 1)
            }
            Err(err) => {
                log::error!("create {parsed} failed: {err}");
                ResultEnvelope::failed(
                    self.config.project.display_path(&self.config.project.component_path(&parsed)),
                    err.kind(),
                    err.to_string(),
                    None,
                )
            }
        }
    }

    async fn component_body(&self, name: &ComponentName, request: &str, images: &[ImageRef]) -> String {
        let visual = !images.is_empty();
        if !visual {
            if let Some(template) = template_for(name) {
                return template;
            }
        }

        let prompt = Prompt::new(
            prompts::CREATE_SYSTEM,
            prompts::create_request(name.as_str(), request, visual),
        )
        .with_images(images.to_vec());
        match self.complete(&prompt).await {
            Ok(reply) => {
                let body = strip_code_fence(&reply);
                if body.contains('<') {
                    return body.to_string();
                }
                log::warn!("generated body for {name} has no markup, using a template");
            }
            Err(err) => log::warn!("body generation for {name} failed ({err}), using a template"),
        }
        template_for(name).unwrap_or_else(|| generic_template(name))
    }

    async fn handle_delete(&self, text: &str) -> Outcome {
        match delete_name(text) {
            Some(name) => self.delete_component(&name).await,
            None => Outcome::err(
                Intent::Delete,
                "Could not tell which section to delete; name it, e.g. \"delete the Pricing section\"",
            ),
        }
    }

    async fn handle_chat(&self, text: &str) -> Outcome {
        let prompt = Prompt::new(prompts::CHAT_SYSTEM, text);
        match self.complete(&prompt).await {
            Ok(reply) => Outcome::ok(Intent::Chat, reply, Vec::new()),
            Err(err) => Outcome::err(Intent::Chat, err.to_string()),
        }
    }

    async fn handle_edit(&self, text: &str, images: &[ImageRef]) -> Outcome {
        if let Some(request) = style_request(text) {
            log::info!("style request {request:?}");
            return self.update_styles(&request).await;
        }

        let components = self.lifecycle.store().list();
        let Some(component) = resolve_component(text, &components) else {
            return self.failure(Intent::Edit, &OrchestratorError::UnresolvedComponent);
        };
        let request = named_prefix(text).map_or(text, |(_, rest)| rest);
        log::info!("editing {} for {request:?}", component.name);

        let document = match self.read_document(component).await {
            Ok(document) => document,
            Err(envelope) => return aggregate_edits(vec![envelope]),
        };
        let prompt = Prompt::new(
            prompts::EDIT_SYSTEM,
            prompts::edit_request(request, &component.name, &document),
        )
        .with_images(images.to_vec());
        let raws = match self.request_instructions(&prompt).await {
            Ok(raws) => raws,
            Err(err) => return self.failure(Intent::Edit, &err),
        };

        let handler = self.edit_handler();
        let mut results: Vec<(RawEditInstruction, ResultEnvelope)> = Vec::with_capacity(raws.len());
        for raw in raws {
            let envelope = handler.apply_raw(&raw, &components, Some(component)).await;
            results.push((raw, envelope));
        }

        for round in 1..=self.config.engine.max_correction_rounds {
            let failed: Vec<(RawEditInstruction, ResultEnvelope)> = results
                .iter()
                .filter(|(_, envelope)| !envelope.success)
                .cloned()
                .collect();
            if failed.is_empty() {
                break;
            }
            log::info!("correction round {round}: {} failed instruction(s)", failed.len());

            let current = match self.read_document(component).await {
                Ok(document) => document,
                Err(_) => break,
            };
            let prompt = Prompt::new(
                prompts::EDIT_SYSTEM,
                prompts::correction_request(request, &component.name, &failed, &current),
            );
            let corrections = match self.request_instructions(&prompt).await {
                Ok(corrections) => corrections,
                Err(err) => {
                    log::warn!("correction round {round} abandoned: {err}");
                    break;
                }
            };

            // Failed results are replaced by the outcome of their corrections.
            results.retain(|(_, envelope)| envelope.success);
            for raw in corrections {
                let envelope = handler.apply_raw(&raw, &components, Some(component)).await;
                results.push((raw, envelope));
            }
        }

        aggregate_edits(results.into_iter().map(|(_, envelope)| envelope).collect())
    }

    async fn request_instructions(&self, prompt: &Prompt) -> Result<Vec<RawEditInstruction>> {
        let reply = self.complete(prompt).await?;
        let raws = parse_instructions(&reply)?;
        if raws.is_empty() {
            return Err(OrchestratorError::MalformedInstructions(
                "empty instruction list".to_string(),
            ));
        }
        Ok(raws)
    }

    async fn read_document(&self, component: &ComponentFile) -> std::result::Result<String, ResultEnvelope> {
        let display = self.config.project.display_path(&component.path);
        match VersionedFile::read(&component.path).await {
            Ok(file) if file.exists() => Ok(file.content().to_string()),
            Ok(_) => Err(ResultEnvelope::failed(
                display,
                ErrorKind::NotFoundError,
                format!("{} does not exist", component.name),
                None,
            )),
            Err(err) => Err(ResultEnvelope::failed(display, err.kind(), err.to_string(), None)),
        }
    }

    /// One completion, continued while it reports truncation and attempts remain.
    async fn complete(&self, prompt: &Prompt) -> std::result::Result<String, CollaboratorError> {
        let first = self.collaborator.complete(prompt).await?;
        let mut text = first.text;
        let mut truncated = first.truncated;

        for attempt in 1..=self.config.engine.continuation_attempts {
            if !truncated {
                break;
            }
            log::warn!("completion truncated, continuing (attempt {attempt})");
            let follow_up = Prompt::new(
                prompt.system.clone(),
                prompts::continuation_request(&prompt.user, &text),
            )
            .with_images(prompt.images.clone());
            let next = self.collaborator.complete(&follow_up).await?;
            text.push_str(&next.text);
            truncated = next.truncated;
        }
        Ok(text)
    }

    fn edit_handler(&self) -> EditHandler<'_> {
        EditHandler::new(&self.config.project, &self.mutator, &self.styles)
    }

    fn manifest_display(&self) -> String {
        self.config
            .project
            .display_path(&self.config.project.manifest_path())
    }

    fn failure(&self, intent: Intent, err: &OrchestratorError) -> Outcome {
        log::error!("{intent} failed: {err}");
        Outcome::err(intent, err.to_string()).with_envelopes(vec![ResultEnvelope::failed(
            "",
            err.kind(),
            err.to_string(),
            None,
        )])
    }
}

fn distinct_files(envelopes: &[ResultEnvelope]) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    for envelope in envelopes.iter().filter(|envelope| envelope.success) {
        if !files.contains(&envelope.file_path) {
            files.push(envelope.file_path.clone());
        }
    }
    files
}

fn aggregate_edits(envelopes: Vec<ResultEnvelope>) -> Outcome {
    let applied = envelopes.iter().filter(|envelope| envelope.success).count();
    let failed = envelopes.len() - applied;
    let files = distinct_files(&envelopes);

    let mut outcome = if failed == 0 && applied > 0 {
        Outcome::ok(Intent::Edit, format!("Applied {applied} edit(s)"), files)
    } else {
        let first_error = envelopes
            .iter()
            .find_map(|envelope| envelope.error.clone())
            .unwrap_or_else(|| "no edits were applied".to_string());
        let mut outcome = Outcome::err(
            Intent::Edit,
            format!("{failed} of {} edit(s) failed: {first_error}", envelopes.len()),
        );
        outcome.modified_files = files;
        outcome
    };
    if applied > 0 && failed > 0 {
        outcome.response = Some(format!("Applied {applied} edit(s)"));
    }
    outcome.with_envelopes(envelopes)
}

fn aggregate_creates(envelopes: Vec<ResultEnvelope>) -> Outcome {
    let files = distinct_files(&envelopes);
    let created: Vec<String> = envelopes
        .iter()
        .filter(|envelope| envelope.success)
        .flat_map(|envelope| envelope.elements_modified.iter().cloned())
        .collect();

    let outcome = if envelopes.iter().all(|envelope| envelope.success) {
        Outcome::ok(Intent::Create, format!("Created {}", created.join(", ")), files)
    } else {
        let errors: Vec<String> = envelopes
            .iter()
            .filter_map(|envelope| envelope.error.clone())
            .collect();
        let mut outcome = Outcome::err(Intent::Create, errors.join("; "));
        outcome.modified_files = files;
        if !created.is_empty() {
            outcome.response = Some(format!("Created {}", created.join(", ")));
        }
        outcome
    };
    outcome.with_envelopes(envelopes)
}

fn style_outcome(report: StyleReport) -> Outcome {
    let mut envelopes: Vec<ResultEnvelope> = report
        .files_touched
        .iter()
        .map(|file| {
            let raws: Vec<String> = report
                .rewritten
                .iter()
                .filter(|reference| &reference.file == file)
                .map(|reference| reference.raw.clone())
                .collect();
            let count = raws.len();
            ResultEnvelope::applied(file, raws, count)
        })
        .collect();
    envelopes.extend(report.skipped.iter().map(|file| {
        ResultEnvelope::failed(file, ErrorKind::ConflictError, "file was left unchanged", None)
    }));

    let outcome = if report.is_empty() {
        Outcome::err(Intent::Edit, "no colour references needed changing")
    } else {
        Outcome::ok(
            Intent::Edit,
            format!(
                "Rewrote {} colour reference(s) in {} file(s)",
                report.rewritten.len(),
                report.files_touched.len()
            ),
            report.files_touched.clone(),
        )
    };
    outcome.with_envelopes(envelopes)
}
