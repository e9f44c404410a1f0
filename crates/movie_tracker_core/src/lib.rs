pub mod agents;
pub mod domain;
pub mod movie_cache;
pub mod ports;
pub mod reply;
pub mod session_id;
pub mod toolbox;

pub use domain::{
    ChatSession, ConversationMessage, KnowledgeSnapshot, MovieReference, MovieViewModel,
    RatingComparison, RatingResult, StructuredAssistantReply,
};
pub use ports::{ChatError, ChatResult};
