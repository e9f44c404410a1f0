pub mod fact;
pub mod knowledge;
pub mod ratings;

pub use fact::FactGenerator;
pub use knowledge::KnowledgeAgent;
pub use ratings::RatingsAgent;
