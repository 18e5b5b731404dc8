//! Recommendation Pipeline — job description in, validated records out.
//!
//! Flow: (URL? fetch page text) → build prompt → retrying model call → parse.
//!
//! Fetch and generation failures end the call with a `PipelineError`. Parsing
//! problems never do: they degrade to an empty result with a specific outcome.

use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::fetcher::{ContentFetcher, ContentSource, FetchError};
use crate::llm_client::retry::{InvokeError, RetryPolicy, RetryingInvoker};
use crate::llm_client::{GeminiClient, TextGenerator};
use crate::recommendation::model::RecommendationRecord;
use crate::recommendation::parser::extract;
use crate::recommendation::prompts::build_recommendation_prompt;

/// Where the job description comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecommendInput {
    Text { text: String },
    Url { url: String },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch job description: {0}")]
    FetchFailed(String),

    #[error("Recommendations unavailable: {0}")]
    RecommendationUnavailable(#[from] InvokeError),
}

impl From<FetchError> for PipelineError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::InvalidUrl(url) => PipelineError::InvalidUrl(url),
            FetchError::FetchFailed(reason) => PipelineError::FetchFailed(reason),
        }
    }
}

/// How a successful call ended. Every variant but `Recommended` has no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationOutcome {
    Recommended,
    /// Input text was empty; nothing was sent anywhere.
    EmptyInput,
    /// The model response contained no parseable JSON array.
    NoArrayFound,
    /// An array was found but every record failed validation.
    NoValidRecommendations,
}

impl RecommendationOutcome {
    /// Message suitable for showing to an end user.
    pub fn message(&self) -> &'static str {
        match self {
            RecommendationOutcome::Recommended => "Recommended assessments",
            RecommendationOutcome::EmptyInput => "No job description provided",
            RecommendationOutcome::NoArrayFound => {
                "Failed to parse recommendations. Try refining your input."
            }
            RecommendationOutcome::NoValidRecommendations => {
                "Invalid recommendation format. Please refine your input."
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub records: Vec<RecommendationRecord>,
    pub outcome: RecommendationOutcome,
    /// Unparsed model output, absent when no model call was made.
    pub raw_response: Option<String>,
}

impl Recommendations {
    fn empty_input() -> Self {
        Self {
            records: Vec::new(),
            outcome: RecommendationOutcome::EmptyInput,
            raw_response: None,
        }
    }
}

/// The recommendation pipeline. Holds no per-request state; share it via `Arc`.
pub struct RecommendationPipeline {
    source: Arc<dyn ContentSource>,
    generator: Arc<dyn TextGenerator>,
    invoker: RetryingInvoker,
}

impl RecommendationPipeline {
    pub fn new(
        source: Arc<dyn ContentSource>,
        generator: Arc<dyn TextGenerator>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            source,
            generator,
            invoker: RetryingInvoker::new(policy),
        }
    }

    /// Wires the given fetcher and a Gemini client built from explicit configuration.
    pub fn from_config(config: &Config, fetcher: ContentFetcher) -> anyhow::Result<Self> {
        let gemini = GeminiClient::new(config).context("Failed to build Gemini client")?;
        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(gemini),
            RetryPolicy::default(),
        ))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.invoker.policy()
    }

    pub async fn recommend(&self, input: RecommendInput) -> Result<Recommendations, PipelineError> {
        let jd_text = match input {
            RecommendInput::Text { text } => text,
            RecommendInput::Url { url } => {
                let url = url.trim();
                info!("Fetching job description from {url}");
                self.source.fetch(url).await?
            }
        };

        self.recommend_for_text(&jd_text).await
    }

    /// Runs the model half of the pipeline on already-available text.
    pub async fn recommend_for_text(&self, jd_text: &str) -> Result<Recommendations, PipelineError> {
        if jd_text.trim().is_empty() {
            return Ok(Recommendations::empty_input());
        }

        let prompt = build_recommendation_prompt(jd_text);
        let raw_response = self
            .invoker
            .invoke(self.generator.as_ref(), &prompt)
            .await?;

        let extraction = extract(&raw_response);
        if extraction.dropped() > 0 {
            warn!(
                "Dropped {} of {} incomplete recommendations: {:?}",
                extraction.dropped(),
                extraction.dropped() + extraction.records.len(),
                extraction.rejections
            );
        }

        let outcome = if !extraction.records.is_empty() {
            RecommendationOutcome::Recommended
        } else if extraction.array_found {
            RecommendationOutcome::NoValidRecommendations
        } else {
            warn!("Model response contained no JSON array");
            RecommendationOutcome::NoArrayFound
        };

        info!(
            "Recommendation finished: outcome={:?}, records={}",
            outcome,
            extraction.records.len()
        );

        Ok(Recommendations {
            records: extraction.records,
            outcome,
            raw_response: Some(raw_response),
        })
    }
}
