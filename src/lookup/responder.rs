//! The email-request pipeline: filter, classify, extract, resolve, format
//!
//! `Responder` performs no chat I/O. It returns `None` when the message is
//! not a request, a [`Reply`] for every outcome the requester can act on,
//! and a [`LookupFailure`] when the directory could not be reached. The
//! caller decides how to log and deliver each.

use crate::config::LookupConfig;
use crate::directory::{Directory, LookupCache};
use crate::error::EmailBotError;
use crate::logging::Timer;
use crate::lookup::{
    Classifier, Extractor, Identifier, InboundMessage, MessageFilter, Reply, Resolver,
};
use std::sync::Arc;
use thiserror::Error;

/// A directory failure, tagged with the identifier being resolved
#[derive(Debug, Error)]
#[error("lookup of {identifier} failed: {source}")]
pub struct LookupFailure {
    pub identifier: Identifier,
    #[source]
    pub source: EmailBotError,
}

impl LookupFailure {
    /// What the requester is told
    pub fn reply(&self) -> Reply {
        Reply::Failure
    }
}

pub type Outcome = std::result::Result<Reply, LookupFailure>;

pub struct Responder {
    filter: MessageFilter,
    classifier: Box<dyn Classifier>,
    extractor: Extractor,
    resolver: Resolver,
}

impl Responder {
    pub fn new(
        filter: MessageFilter,
        classifier: Box<dyn Classifier>,
        extractor: Extractor,
        resolver: Resolver,
    ) -> Self {
        Self {
            filter,
            classifier,
            extractor,
            resolver,
        }
    }

    /// Wire the pipeline from configuration
    ///
    /// `cache` is ignored when caching is disabled.
    pub fn from_config(
        config: &LookupConfig,
        directory: Arc<dyn Directory>,
        cache: Arc<LookupCache>,
    ) -> Self {
        let mut resolver = Resolver::new(directory).with_timeout(config.directory_timeout);
        if config.cache_enabled {
            resolver = resolver.with_cache(cache);
        }

        tracing::info!(
            classifier = config.classifier.build().name(),
            ignore_subtypes = config.ignore_subtypes,
            name_fragments = config.name_fragments,
            cache_enabled = config.cache_enabled,
            "Email lookup pipeline configured"
        );

        Self::new(
            MessageFilter::new(config.ignore_subtypes),
            config.classifier.build(),
            Extractor::new(config.name_fragments),
            resolver,
        )
    }

    /// Answer a message, or `None` when it is not an email request
    pub async fn respond(&self, message: &InboundMessage) -> Option<Outcome> {
        if !self.filter.accepts(message) {
            tracing::trace!(subtype = ?message.subtype, "Message filtered out");
            return None;
        }

        if !self.classifier.is_email_request(&message.text) {
            return None;
        }

        let _timer = Timer::new("email_lookup");

        let Some(identifier) = self.extractor.extract(&message.text) else {
            tracing::info!("Email request without a recognizable user");
            return Some(Ok(Reply::Clarify));
        };

        tracing::info!(
            identifier = %identifier,
            classifier = self.classifier.name(),
            "Resolving email request"
        );

        let outcome = match self.resolver.resolve(&identifier).await {
            Ok(user) => Ok(Reply::for_user(user.as_ref(), &identifier)),
            Err(source) => Err(LookupFailure { identifier, source }),
        };

        Some(outcome)
    }
}
