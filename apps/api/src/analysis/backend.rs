//! Inference backends and backend selection.
//!
//! A backend is one model reachable with one credential. `select_backend`
//! walks an ordered candidate list: each non-final candidate must construct
//! and pass a real availability probe; the final candidate is accepted once
//! constructed, so the fallback happens at most once per candidate list and
//! never loops.
//!
//! `AppState` holds an `Arc<dyn BackendFactory>`, so tests swap in stubs
//! without touching the analyzer or handlers.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::intake::WorkspaceImage;
use crate::llm_client::{GeminiClient, ImagePart, LlmError};
use crate::session::Credential;

// ────────────────────────────────────────────────────────────────────────────
// Trait definitions
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Model identifier, e.g. `gemini-2.5-flash`.
    fn model(&self) -> &str;

    /// Cheap check that the model exists and accepts the credential.
    async fn probe(&self) -> Result<(), LlmError>;

    /// One blocking round trip: prompt + image in, free-form text out.
    async fn generate(&self, prompt: &str, image: &WorkspaceImage) -> Result<String, LlmError>;
}

pub trait BackendFactory: Send + Sync {
    fn build(
        &self,
        model: &str,
        credential: &Credential,
    ) -> Result<Box<dyn InferenceBackend>, LlmError>;
}

/// Outcome of backend selection.
pub struct SelectedBackend {
    pub backend: Box<dyn InferenceBackend>,
    /// User-visible notice, set when a fallback model was substituted.
    pub notice: Option<String>,
}

impl std::fmt::Debug for SelectedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedBackend")
            .field("model", &self.backend.model())
            .field("notice", &self.notice)
            .finish()
    }
}

/// Tries `candidates` in order. Returns `Err` with the last failure message
/// only when no candidate could be constructed.
pub async fn select_backend(
    factory: &dyn BackendFactory,
    candidates: &[String],
    credential: &Credential,
) -> Result<SelectedBackend, String> {
    let Some(primary) = candidates.first() else {
        return Err("no inference models configured".to_string());
    };

    let mut last_error = String::new();
    for (index, model) in candidates.iter().enumerate() {
        let is_final = index + 1 == candidates.len();

        let backend = match factory.build(model, credential) {
            Ok(backend) => backend,
            Err(e) => {
                warn!("Backend {model} could not be constructed: {e}");
                last_error = format!("{model}: {e}");
                continue;
            }
        };

        if !is_final {
            if let Err(e) = backend.probe().await {
                warn!("Backend {model} failed availability probe: {e}");
                last_error = format!("{model}: {e}");
                continue;
            }
        }

        let notice =
            (index > 0).then(|| format!("Primary model {primary} unavailable; using {model}."));
        info!("Selected inference backend {model}");
        return Ok(SelectedBackend { backend, notice });
    }

    Err(last_error)
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct GeminiBackend {
    client: GeminiClient,
    model: String,
    api_key: String,
}

#[async_trait]
impl InferenceBackend for GeminiBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn probe(&self) -> Result<(), LlmError> {
        let info = self.client.get_model(&self.model, &self.api_key).await?;
        debug!("Probe succeeded for {}", info.name);
        Ok(())
    }

    async fn generate(&self, prompt: &str, image: &WorkspaceImage) -> Result<String, LlmError> {
        let part = ImagePart {
            mime_type: image.mime_type(),
            bytes: &image.bytes,
        };
        self.client
            .generate_content(&self.model, &self.api_key, prompt, Some(part))
            .await
    }
}

/// Builds `GeminiBackend`s that share one HTTP client.
pub struct GeminiBackendFactory {
    client: GeminiClient,
}

impl GeminiBackendFactory {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

impl BackendFactory for GeminiBackendFactory {
    fn build(
        &self,
        model: &str,
        credential: &Credential,
    ) -> Result<Box<dyn InferenceBackend>, LlmError> {
        Ok(Box::new(GeminiBackend {
            client: self.client.clone(),
            model: model.to_string(),
            api_key: credential.expose().to_string(),
        }))
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use base64::{engine::general_purpose::STANDARD, Engine};

    use super::stub::{StubBehaviour, StubFactory};
    use super::*;
    use crate::intake::fixtures;
    use crate::llm_client::fake;
    use crate::session::CredentialSource;

    fn credential() -> Credential {
        Credential::new("key", CredentialSource::UserEntered)
    }

    fn candidates() -> Vec<String> {
        vec!["primary".to_string(), "fallback".to_string()]
    }

    #[tokio::test]
    async fn test_healthy_primary_is_selected_without_notice() {
        let factory = StubFactory::new(vec![("primary", StubBehaviour::default())]);
        let selected = select_backend(&factory, &candidates(), &credential()).await.unwrap();
        assert_eq!(selected.backend.model(), "primary");
        assert!(selected.notice.is_none());
        assert_eq!(factory.calls.builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_primary_construction_falls_back_once() {
        let factory = StubFactory::new(vec![(
            "primary",
            StubBehaviour {
                fail_build: true,
                ..Default::default()
            },
        )]);
        let selected = select_backend(&factory, &candidates(), &credential()).await.unwrap();
        assert_eq!(selected.backend.model(), "fallback");
        assert_eq!(
            selected.notice.as_deref(),
            Some("Primary model primary unavailable; using fallback.")
        );
        assert_eq!(factory.calls.builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_primary_probe_falls_back_and_final_is_not_probed() {
        let factory = StubFactory::new(vec![
            (
                "primary",
                StubBehaviour {
                    fail_probe: true,
                    ..Default::default()
                },
            ),
            (
                "fallback",
                StubBehaviour {
                    fail_probe: true,
                    ..Default::default()
                },
            ),
        ]);
        let selected = select_backend(&factory, &candidates(), &credential()).await.unwrap();
        assert_eq!(selected.backend.model(), "fallback");
        assert_eq!(factory.calls.probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_constructions_failing_is_error() {
        let broken = StubBehaviour {
            fail_build: true,
            ..Default::default()
        };
        let factory = StubFactory::new(vec![("primary", broken.clone()), ("fallback", broken)]);
        let err = select_backend(&factory, &candidates(), &credential()).await.unwrap_err();
        assert!(err.contains("fallback"));
    }

    #[tokio::test]
    async fn test_empty_candidate_list_is_error() {
        let factory = StubFactory::new(vec![]);
        assert!(select_backend(&factory, &[], &credential()).await.is_err());
    }

    #[tokio::test]
    async fn test_gemini_factory_carries_model_name() {
        let client = GeminiClient::new("http://127.0.0.1:9", None).unwrap();
        let factory = GeminiBackendFactory::new(client);
        let backend = factory.build("gemini-2.5-flash", &credential()).unwrap();
        assert_eq!(backend.model(), "gemini-2.5-flash");
    }

    async fn gemini_factory() -> (GeminiBackendFactory, fake::Recorded) {
        let (base, recorded) = fake::spawn().await;
        let client = GeminiClient::new(base, None).unwrap();
        (GeminiBackendFactory::new(client), recorded)
    }

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|m| m.to_string()).collect()
    }

    #[tokio::test]
    async fn test_gemini_primary_passing_lookup_is_kept() {
        let (factory, recorded) = gemini_factory().await;
        let credential = Credential::new(fake::GOOD_KEY, CredentialSource::HostSecret);
        let candidates = models(&["gemini-2.5-flash", "gemini-1.5-flash"]);

        let selected = select_backend(&factory, &candidates, &credential).await.unwrap();
        assert_eq!(selected.backend.model(), "gemini-2.5-flash");
        assert!(selected.notice.is_none());
        assert_eq!(*recorded.lookups.lock().unwrap(), models(&["gemini-2.5-flash"]));
    }

    #[tokio::test]
    async fn test_gemini_unknown_primary_falls_back_and_sends_inline_image() {
        let (factory, recorded) = gemini_factory().await;
        let credential = Credential::new(fake::GOOD_KEY, CredentialSource::UserEntered);
        let candidates = models(&["retired-model", "gemini-1.5-flash"]);

        let selected = select_backend(&factory, &candidates, &credential).await.unwrap();
        assert_eq!(selected.backend.model(), "gemini-1.5-flash");
        assert_eq!(
            selected.notice.as_deref(),
            Some("Primary model retired-model unavailable; using gemini-1.5-flash.")
        );
        // the final candidate is accepted without a lookup
        assert_eq!(*recorded.lookups.lock().unwrap(), models(&["retired-model"]));

        let data = fixtures::png(8, 8);
        let image = WorkspaceImage::from_upload("shop.png", data.clone().into()).unwrap();
        let text = selected.backend.generate("describe", &image).await.unwrap();
        assert_eq!(text, "```json\n{\"ok\": true}\n```");

        let generations = recorded.generations.lock().unwrap();
        assert_eq!(generations.len(), 1);
        let (model, body) = &generations[0];
        assert_eq!(model, "gemini-1.5-flash");
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "describe");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[1]["inline_data"]["data"], STANDARD.encode(&data));
    }

    #[tokio::test]
    async fn test_gemini_rejected_key_still_yields_unchecked_fallback() {
        let (factory, recorded) = gemini_factory().await;
        let credential = Credential::new("bad-key", CredentialSource::UserEntered);
        let candidates = models(&["gemini-2.5-flash", "gemini-1.5-flash"]);

        let selected = select_backend(&factory, &candidates, &credential).await.unwrap();
        assert_eq!(selected.backend.model(), "gemini-1.5-flash");
        assert_eq!(recorded.lookups.lock().unwrap().len(), 1);

        let image = WorkspaceImage::from_upload("a.png", fixtures::png(4, 4).into()).unwrap();
        let err = selected.backend.generate("describe", &image).await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 403, .. }));
        assert!(recorded.generations.lock().unwrap().is_empty());
    }
}
