//! services/api/src/web/protocol.rs
//!
//! The wire protocol for the chat endpoints. Envelope fields keep the
//! PascalCase casing existing clients depend on; individual conversation
//! entries use a lowercase `role` discriminator with camelCase fields.

use movie_tracker_core::domain::MovieViewModel;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response to starting a new chat: the opaque session id for all follow-ups.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatSessionIdResponse {
    #[serde(rename = "ChatId")]
    pub chat_id: String,
}

/// One user turn of input.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AskRequest {
    #[serde(rename = "Input")]
    pub input: String,
}

/// Full conversation view returned after each turn.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatTurnResponse {
    #[serde(rename = "FunnyFact")]
    pub funny_fact: Option<String>,
    #[serde(rename = "Messages")]
    pub messages: Vec<ClientMessage>,
}

/// A client-visible conversation entry. System and tool transcripts are
/// never surfaced; assistant entries carry their enriched movie list.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ClientMessage {
    User {
        text: String,
    },
    Assistant {
        text: String,
        #[serde(rename = "movieList")]
        #[schema(value_type = Vec<Object>)]
        movie_list: Vec<MovieViewModel>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_uses_pascal_case_and_entries_use_roles() {
        let response = ChatTurnResponse {
            funny_fact: Some("Tom Hanks owns over 250 typewriters!".to_string()),
            messages: vec![
                ClientMessage::User {
                    text: "find inception".to_string(),
                },
                ClientMessage::Assistant {
                    text: "Here you go".to_string(),
                    movie_list: vec![],
                },
            ],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("FunnyFact").is_some());
        assert_eq!(json["Messages"][0]["role"], "user");
        assert_eq!(json["Messages"][1]["role"], "assistant");
        assert!(json["Messages"][1].get("movieList").is_some());
        assert!(json["Messages"][0].get("movieList").is_none());
    }

    #[test]
    fn ask_request_reads_the_pascal_case_input_field() {
        let ask: AskRequest = serde_json::from_str(r#"{"Input":"find inception"}"#).unwrap();
        assert_eq!(ask.input, "find inception");
    }
}
