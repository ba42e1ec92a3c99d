//! Turns a free-text mailing question into a `Suggestion`, or into nothing.

use crate::api::Completion;
use crate::model::Suggestion;
use crate::{Config, Result};
use anyhow::{ensure, Context};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Asks a `Completion` backend for a postage suggestion.
///
/// Postage suggestions are advisory, so nothing that goes wrong here is returned as an error.
/// Transport failures, unusable payloads and timeouts are logged at `warn`, an empty answer at
/// `info`, and the caller only ever sees `Some(suggestion)` or `None`. Each call to `suggest`
/// makes at most one external request; there is no retry and no caching.
#[derive(Clone)]
pub struct SuggestionGateway {
    completion: Arc<dyn Completion>,
    region: String,
    currency: String,
    timeout: Option<Duration>,
}

impl SuggestionGateway {
    pub fn new(completion: Arc<dyn Completion>, config: &Config) -> Self {
        Self {
            completion,
            region: config.region().to_string(),
            currency: config.currency().to_string(),
            timeout: config.request_timeout(),
        }
    }

    /// Returns a suggestion for `query`, or `None`. A blank query returns `None` without calling
    /// the service.
    pub async fn suggest(&self, query: &str) -> Option<Suggestion> {
        let query = query.trim();
        if query.is_empty() {
            debug!("Not asking for a suggestion: the query is blank");
            return None;
        }
        match self.try_suggest(query).await {
            Ok(Some(suggestion)) => {
                debug!(
                    "Suggestion for '{query}': {} at {}",
                    suggestion.category,
                    suggestion.price.canonical()
                );
                Some(suggestion)
            }
            Ok(None) => {
                info!("The suggestion service returned nothing for '{query}'");
                None
            }
            Err(e) => {
                warn!("Unable to get a postage suggestion: {e:#}");
                None
            }
        }
    }

    async fn try_suggest(&self, query: &str) -> Result<Option<Suggestion>> {
        let prompt = self.prompt(query);
        let schema = response_schema()?;
        let call = self.completion.complete(&prompt, &schema);
        let text = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .with_context(|| format!("The suggestion request timed out after {limit:?}"))??,
            None => call.await?,
        };
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };
        parse_suggestion(&text).map(Some)
    }

    fn prompt(&self, query: &str) -> String {
        format!(
            "The user is asking about postage rates in {}: \"{query}\". Provide a structured \
            suggestion for the required postage, with the price in {}.",
            self.region, self.currency
        )
    }
}

/// The JSON schema the service is asked to conform to, generated from `Suggestion`.
pub(crate) fn response_schema() -> Result<serde_json::Value> {
    let mut schema = serde_json::to_value(schemars::schema_for!(Suggestion))
        .context("Unable to serialize the suggestion schema")?;
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
    }
    Ok(schema)
}

/// Parses and checks a payload. A partial or negative-priced suggestion is an error.
fn parse_suggestion(text: &str) -> Result<Suggestion> {
    let suggestion: Suggestion = serde_json::from_str(text.trim())
        .with_context(|| format!("The suggestion payload is not usable: {text}"))?;
    ensure!(
        !suggestion.price.is_negative(),
        "The suggested price is negative: {}",
        suggestion.price.canonical()
    );
    Ok(suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestCompletion;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const VALID: &str = r#"{
        "category": "Local Letter",
        "weight": "Up to 50g",
        "price": 12.5,
        "description": "Local letter rate",
        "tips": ["Use the right postcode", "Drop it before 5pm"]
    }"#;

    /// Returns a fixed answer and records every prompt it receives.
    struct Fake {
        answer: std::result::Result<Option<String>, String>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl Fake {
        fn new(answer: std::result::Result<Option<&str>, &str>) -> Arc<Self> {
            Arc::new(Self {
                answer: answer
                    .map(|o| o.map(str::to_string))
                    .map_err(str::to_string),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                delay: None,
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(Some(VALID.to_string())),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                delay: Some(delay),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Completion for Fake {
        async fn complete(
            &self,
            prompt: &str,
            _schema: &serde_json::Value,
        ) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.answer.clone().map_err(|e| anyhow!(e))
        }
    }

    fn gateway(fake: Arc<Fake>) -> SuggestionGateway {
        SuggestionGateway::new(fake, &Config::default())
    }

    #[tokio::test]
    async fn test_valid_payload() {
        let fake = Fake::new(Ok(Some(VALID)));
        let suggestion = gateway(fake.clone()).suggest("50g local letter").await.unwrap();
        assert_eq!(suggestion.price.canonical(), "12.5");
        assert_eq!(suggestion.tips.len(), 2);
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_prompt_contains_query_and_region() {
        let fake = Fake::new(Ok(Some(VALID)));
        let _ = gateway(fake.clone()).suggest("  airmail to the UK ").await;
        let prompts = fake.prompts.lock().unwrap();
        assert!(prompts[0].contains("\"airmail to the UK\""));
        assert!(prompts[0].contains("Hong Kong"));
        assert!(prompts[0].contains("HKD"));
    }

    #[tokio::test]
    async fn test_blank_query_makes_no_call() {
        let fake = Fake::new(Ok(Some(VALID)));
        assert!(gateway(fake.clone()).suggest(" \t ").await.is_none());
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_service_error_is_none() {
        let fake = Fake::new(Err("connection refused"));
        assert!(gateway(fake.clone()).suggest("letter").await.is_none());
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_answer_is_none() {
        assert!(gateway(Fake::new(Ok(None))).suggest("letter").await.is_none());
        assert!(gateway(Fake::new(Ok(Some("  "))))
            .suggest("letter")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_malformed_payload_is_none() {
        let fake = Fake::new(Ok(Some("this is not json")));
        assert!(gateway(fake).suggest("letter").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_field_is_none() {
        let fake = Fake::new(Ok(Some(
            r#"{"category": "Air Mail", "weight": "20g", "price": 3.7, "description": "x"}"#,
        )));
        assert!(gateway(fake).suggest("letter").await.is_none());
    }

    #[tokio::test]
    async fn test_negative_price_is_none() {
        let fake = Fake::new(Ok(Some(
            r#"{"category": "A", "weight": "B", "price": -1, "description": "C", "tips": []}"#,
        )));
        assert!(gateway(fake).suggest("letter").await.is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_none() {
        let fake = Fake::slow(Duration::from_secs(5));
        let mut gateway = gateway(fake.clone());
        gateway.timeout = Some(Duration::from_millis(10));
        assert!(gateway.suggest("letter").await.is_none());
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_with_test_completion() {
        let gateway = SuggestionGateway::new(Arc::new(TestCompletion::default()), &Config::default());
        let suggestion = gateway.suggest("airmail letter to London").await.unwrap();
        assert_eq!(suggestion.category, "Air Mail");
    }

    #[test]
    fn test_response_schema_has_no_meta_schema() {
        let schema = response_schema().unwrap();
        assert!(schema.get("$schema").is_none());
        assert!(schema.get("properties").is_some());
    }
}
