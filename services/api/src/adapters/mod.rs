pub mod cache;
pub mod chat_llm;
pub mod omdb;
pub mod session_store;
pub mod tmdb;
pub mod wikipedia;

pub use cache::RedisCacheAdapter;
pub use chat_llm::OpenAiChatAdapter;
pub use omdb::OmdbAdapter;
pub use session_store::PgSessionStore;
pub use tmdb::TmdbAdapter;
pub use wikipedia::WikipediaAdapter;
