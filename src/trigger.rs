//! Routing of document-creation events to handlers.
//!
//! A subscription pairs a `DocumentPattern` such as
//! `announcements/{announcementId}` with a `DocumentHandler`. The
//! `TriggerRegistry` is built once at startup and shared across concurrent
//! dispatches; it holds no mutable state.

use crate::core::{DocumentData, DocumentHandler, Outcome, TriggerEvent};
use crate::internal_metrics::Metrics;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("document pattern is empty")]
    Empty,
    #[error("document pattern `{0}` contains an empty segment")]
    EmptySegment(String),
    #[error("segment `{0}` is not a valid wildcard")]
    MalformedWildcard(String),
    #[error("wildcard `{0}` appears more than once")]
    DuplicateWildcard(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Wildcard(String),
}

/// A document path pattern made of literal segments and `{name}` captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl FromStr for DocumentPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_matches('/');
        if trimmed.is_empty() {
            return Err(PatternError::Empty);
        }

        let mut seen = HashSet::new();
        let mut segments = Vec::new();
        for part in trimmed.split('/') {
            if part.is_empty() {
                return Err(PatternError::EmptySegment(s.to_string()));
            }
            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(name) => {
                    if name.is_empty() || name.contains(['{', '}']) {
                        return Err(PatternError::MalformedWildcard(part.to_string()));
                    }
                    if !seen.insert(name.to_string()) {
                        return Err(PatternError::DuplicateWildcard(name.to_string()));
                    }
                    Segment::Wildcard(name.to_string())
                }
                None if part.contains(['{', '}']) => {
                    return Err(PatternError::MalformedWildcard(part.to_string()));
                }
                None => Segment::Literal(part.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }
}

impl fmt::Display for DocumentPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl DocumentPattern {
    /// Matches `document` and returns the wildcard captures.
    pub fn captures(&self, document: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = document.trim_matches('/').split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Wildcard(_) if part.is_empty() => return None,
                Segment::Wildcard(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }
}

struct Subscription {
    pattern: DocumentPattern,
    handler: Arc<dyn DocumentHandler>,
}

/// The set of document-created subscriptions.
pub struct TriggerRegistry {
    subscriptions: Vec<Subscription>,
    metrics: Arc<Metrics>,
}

impl TriggerRegistry {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            subscriptions: Vec::new(),
            metrics,
        }
    }

    /// Registers `handler` for documents created under `pattern`.
    pub fn on_document_created(
        &mut self,
        pattern: &str,
        handler: Arc<dyn DocumentHandler>,
    ) -> Result<&mut Self, PatternError> {
        let pattern: DocumentPattern = pattern.parse()?;
        debug!(%pattern, handler = handler.name(), "Registered document trigger");
        self.subscriptions.push(Subscription { pattern, handler });
        Ok(self)
    }

    pub fn patterns(&self) -> impl Iterator<Item = &DocumentPattern> {
        self.subscriptions.iter().map(|s| &s.pattern)
    }

    /// Invokes the first handler whose pattern matches `document`.
    ///
    /// Returns the handler name and its outcome, or `None` when no
    /// subscription matches.
    #[instrument(skip(self, data))]
    pub async fn dispatch(
        &self,
        document: &str,
        data: Option<DocumentData>,
    ) -> Option<(String, Outcome)> {
        let matched = self
            .subscriptions
            .iter()
            .find_map(|s| s.pattern.captures(document).map(|params| (s, params)));

        let Some((subscription, params)) = matched else {
            warn!("No trigger registered for document");
            self.metrics.trigger_events_unmatched_total.increment(1);
            return None;
        };

        let event = match data {
            Some(data) => TriggerEvent::new(document, data),
            None => TriggerEvent::without_snapshot(document),
        }
        .with_params(params);

        let handler = subscription.handler.name().to_string();
        let outcome = subscription.handler.on_created(&event).await;
        self.metrics.record_outcome(&handler, outcome);
        debug!(%handler, %outcome, "Trigger dispatched");
        Some((handler, outcome))
    }
}
