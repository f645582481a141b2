//! The model client seam, its one-time construction, and the deadline and
//! cancellation race around each call.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use tokio::time::{timeout, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    config::Settings,
    contract::NormalizedResult,
    details::{parse_details, ProofreadDetails},
    error::{ProofreadError, Result},
    normalizer::ResponseNormalizer,
    prompt::{build_prompt, ProofreadRequest},
    provider::ProviderResponse,
};

/// Port for the remote generative model.
///
/// Implementations own the transport. Dropping the returned future must
/// abort the request and release its resources.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends `prompt` to `model` and returns the raw response envelope.
    async fn generate(&self, model: &str, prompt: &str) -> Result<ProviderResponse>;
}

/// A model client constructed at most once and shared afterwards.
///
/// Construction fails with [`ProofreadError::MissingApiKey`] when no key is
/// configured. A failed construction leaves the handle empty, so a later
/// call may try again.
///
/// # Examples
///
/// ```
/// use proofread::{client::ClientHandle, config::Settings, ProofreadError};
///
/// struct Dummy(String);
///
/// static CLIENT: ClientHandle<Dummy> = ClientHandle::new();
///
/// let err = CLIENT.get_or_init(&Settings::default(), |key| Ok(Dummy(key.into())));
/// assert!(matches!(err, Err(ProofreadError::MissingApiKey)));
///
/// let settings = Settings::default().with_api_key("k");
/// let client = CLIENT.get_or_init(&settings, |key| Ok(Dummy(key.into()))).unwrap();
/// assert_eq!(client.0, "k");
/// ```
#[derive(Debug)]
pub struct ClientHandle<C> {
    cell: OnceCell<Arc<C>>,
}

impl<C> Default for ClientHandle<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ClientHandle<C> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Returns the shared client, constructing it with `build` on first use.
    ///
    /// `build` receives the configured API key.
    pub fn get_or_init<F>(&self, settings: &Settings, build: F) -> Result<Arc<C>>
    where
        F: FnOnce(&str) -> Result<C>,
    {
        self.cell
            .get_or_try_init(|| {
                let key = settings.api_key().ok_or(ProofreadError::MissingApiKey)?;
                tracing::info!(model = %settings.model, "initializing model client");
                build(key).map(Arc::new)
            })
            .map(Arc::clone)
    }

    /// Returns the client if it has already been constructed.
    pub fn get(&self) -> Option<Arc<C>> {
        self.cell.get().cloned()
    }
}

/// Runs proofreading requests against a model client.
#[derive(Debug)]
pub struct Proofreader<C> {
    client: Arc<C>,
    settings: Settings,
    normalizer: ResponseNormalizer,
}

impl<C: ModelClient> Proofreader<C> {
    pub fn new(client: Arc<C>, settings: Settings) -> Self {
        Self {
            client,
            settings,
            normalizer: ResponseNormalizer::new(),
        }
    }

    /// Replaces the normalizer, e.g. to change field limits.
    pub fn with_normalizer(mut self, normalizer: ResponseNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validates the request, calls the model under the configured deadline,
    /// and normalizes the response.
    ///
    /// # Errors
    ///
    /// - [`ProofreadError::InvalidRequest`] before any call is made.
    /// - [`ProofreadError::Timeout`] if the deadline passes first.
    /// - [`ProofreadError::Cancelled`] if `cancel` fires first.
    /// - Any error from the client, and the hard normalization failures.
    pub async fn proofread(
        &self,
        request: &ProofreadRequest,
        cancel: &CancellationToken,
    ) -> Result<NormalizedResult> {
        request.validate()?;
        let prompt = build_prompt(request);

        let response = self.generate(&prompt, cancel).await?;
        if self.settings.debug_logs {
            tracing::debug!(?response, "raw provider response");
        }

        let result = self.normalizer.normalize(&response)?;
        if !result.warnings().is_empty() {
            tracing::warn!(
                warnings = result.warnings().len(),
                fallback = result.is_fallback(),
                "response needed recovery"
            );
        }
        Ok(result)
    }

    /// Like [`Proofreader::proofread`], also splitting the details into sections.
    pub async fn proofread_with_details(
        &self,
        request: &ProofreadRequest,
        cancel: &CancellationToken,
    ) -> Result<(NormalizedResult, ProofreadDetails)> {
        let result = self.proofread(request, cancel).await?;
        let details = parse_details(result.details());
        Ok((result, details))
    }

    async fn generate(&self, prompt: &str, cancel: &CancellationToken) -> Result<ProviderResponse> {
        let deadline = self.settings.timeout();
        let started = Instant::now();
        let call = timeout(deadline, self.client.generate(&self.settings.model, prompt));

        // The losing branch is dropped here, which aborts the call or the timer.
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ProofreadError::Cancelled),
            res = call => match res {
                Ok(response) => response,
                Err(_) => Err(ProofreadError::Timeout(deadline)),
            },
        };

        if self.settings.debug_logs {
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            tracing::debug!(
                elapsed_ms,
                ok = result.is_ok(),
                "generateContent finished"
            );
        }
        if let Err(err) = &result {
            tracing::warn!(error = %err, "model call failed");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Counting(usize);

    #[test]
    fn test_handle_constructs_once() {
        let handle: ClientHandle<Counting> = ClientHandle::new();
        let settings = Settings::default().with_api_key("key");
        let mut builds = 0;

        for _ in 0..3 {
            let client = handle
                .get_or_init(&settings, |_| {
                    builds += 1;
                    Ok(Counting(builds))
                })
                .unwrap();
            assert_eq!(client.0, 1);
        }
        assert_eq!(builds, 1);
    }

    #[test]
    fn test_missing_key_leaves_handle_empty() {
        let handle: ClientHandle<Counting> = ClientHandle::new();
        let err = handle
            .get_or_init(&Settings::default(), |_| Ok(Counting(0)))
            .unwrap_err();
        assert!(matches!(err, ProofreadError::MissingApiKey));
        assert!(handle.get().is_none());
    }

    #[test]
    fn test_build_error_propagates() {
        let handle: ClientHandle<Counting> = ClientHandle::new();
        let settings = Settings::default().with_api_key("key");
        let err = handle
            .get_or_init(&settings, |_| Err(ProofreadError::Client("refused".into())))
            .unwrap_err();
        assert!(matches!(err, ProofreadError::Client(_)));
        assert!(handle.get().is_none());
    }
}
