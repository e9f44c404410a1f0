//! services/api/src/web/turn_task.rs
//!
//! The per-turn orchestration pipeline: fact generation, the tool-assisted
//! model exchange, history replay into client-visible entries with movie
//! enrichment, and the single persistence write at the end of the turn.

use crate::web::{protocol::ClientMessage, state::AppState};
use movie_tracker_core::{
    domain::{ChatSession, ConversationMessage},
    ports::{ChatError, ChatResult},
    reply::parse_assistant_reply,
    session_id::generate_session_id,
};
use tracing::{debug, info, warn};

/// Frozen at session start and persisted as the first history entry; turns
/// never restate it.
const CHAT_SYSTEM_PROMPT: &str = r#"You are a friendly movie-discovery assistant who likes to follow the rules. You will complete required steps and request approval before taking any consequential actions. If the user doesn't provide enough information for you to complete a task, you will keep asking questions until you have enough information to complete the task.

Always return a json object with the following properties:
message: A message to the user, relevant to their request. If no movies are found, return a message indicating that no movies were found, and give hints on how best to ask/search for movies.
movies: A list of movies with the following properties id and name, can be an empty list if no movies are found.
Example:
{
  "message": "Here is the list of movies",
  "movies": [
    {
      "id": "1",
      "name": "The Movie"
    }
  ]
}"#;

/// Shown in place of an assistant reply that did not honor the structured
/// contract.
const FALLBACK_MESSAGE: &str =
    "No movies were found. Try asking by movie title, actor, director, or genre.";

/// Everything the handler needs to answer one turn.
#[derive(Debug)]
pub struct TurnOutcome {
    pub funny_fact: Option<String>,
    pub messages: Vec<ClientMessage>,
}

/// Creates and persists a fresh session seeded with the system prompt,
/// returning its id.
pub async fn start_session(app_state: &AppState) -> ChatResult<String> {
    let session = ChatSession::new(generate_session_id(), CHAT_SYSTEM_PROMPT);
    let session = app_state.sessions.create(session).await?;
    info!(chat_id = %session.id, "chat session started");
    Ok(session.id)
}

/// Runs one full conversation turn against an existing session.
///
/// Failures before the final persistence write abort with the stored session
/// unmodified; fact generation and per-movie enrichment failures are
/// contained and never abort.
pub async fn process_turn(
    app_state: &AppState,
    chat_id: &str,
    input: &str,
) -> ChatResult<TurnOutcome> {
    if input.trim().is_empty() {
        return Err(ChatError::Validation("Input must not be empty".to_string()));
    }

    let session = app_state.sessions.get(chat_id).await?;

    // Soft step: the fact slot is overwritten every turn, so a failed
    // generation clears it and the turn carries on.
    let funny_fact = match app_state.fact_generator.funny_fact(input).await {
        Ok(fact) => fact,
        Err(e) => {
            warn!(chat_id, error = %e, "fact generation failed; continuing without");
            None
        }
    };

    let mut history = session.history.clone();
    history.push(ConversationMessage::user(input));

    let reply = app_state
        .chat_model
        .complete_with_tools(&history, &app_state.toolbox)
        .await?;
    history.push(ConversationMessage::assistant(reply));

    let messages = render_history(app_state, &history).await;

    app_state
        .sessions
        .replace(chat_id, &history, funny_fact.as_deref())
        .await?;
    info!(chat_id, entries = messages.len(), "turn complete");

    Ok(TurnOutcome {
        funny_fact,
        messages,
    })
}

/// Replays the history into client-visible entries. Assistant messages are
/// parsed against the structured contract and their movie references
/// resolved through the cache; unparseable ones degrade to the fallback
/// text. System and tool entries are suppressed.
async fn render_history(app_state: &AppState, history: &[ConversationMessage]) -> Vec<ClientMessage> {
    let mut messages = Vec::new();
    for entry in history {
        match entry {
            ConversationMessage::User { content } => {
                if !content.trim().is_empty() {
                    messages.push(ClientMessage::User {
                        text: content.clone(),
                    });
                }
            }
            ConversationMessage::Assistant { content } => match parse_assistant_reply(content) {
                Ok(reply) => {
                    let movie_list = app_state.movie_cache.resolve_all(&reply.movies).await;
                    messages.push(ClientMessage::Assistant {
                        text: reply.message,
                        movie_list,
                    });
                }
                Err(e) => {
                    debug!(error = %e, "assistant entry failed the structured contract");
                    messages.push(ClientMessage::Assistant {
                        text: FALLBACK_MESSAGE.to_string(),
                        movie_list: Vec::new(),
                    });
                }
            },
            ConversationMessage::System { .. } | ConversationMessage::Tool { .. } => {}
        }
    }
    messages
}
