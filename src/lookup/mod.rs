//! Email-request handling, independent of the chat transport

mod classifier;
mod extractor;
mod message;
mod reply;
mod resolver;
mod responder;

pub use classifier::{
    Classifier, ClassifierPolicy, ContextClassifier, KeywordClassifier, MessageFilter,
};
pub use extractor::{Extractor, Identifier};
pub use message::InboundMessage;
pub use reply::Reply;
pub use resolver::{DEFAULT_DIRECTORY_TIMEOUT, Resolver};
pub use responder::{LookupFailure, Outcome, Responder};
