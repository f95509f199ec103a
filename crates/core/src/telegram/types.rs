use serde::Deserialize;

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
    #[serde(default)]
    pub channel_post: Option<IncomingMessage>,
}

impl Update {
    /// Commands arrive as group/private messages or as channel posts.
    pub fn incoming(&self) -> Option<&IncomingMessage> {
        self.message.as_ref().or(self.channel_post.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// The subset of `Message` needed to edit it later.
#[derive(Debug, Deserialize)]
pub(crate) struct SentMessageResult {
    pub message_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_updates() {
        let json = r#"{
            "ok": true,
            "result": [
                {"update_id": 10, "message": {"message_id": 1, "chat": {"id": -100123}, "text": "/check"}},
                {"update_id": 11, "channel_post": {"message_id": 2, "chat": {"id": -100456}, "text": "/start"}},
                {"update_id": 12, "edited_message": {"message_id": 3, "chat": {"id": 1}}}
            ]
        }"#;
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(response.ok);
        let updates = response.result.unwrap();
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].incoming().unwrap().chat.id, -100123);
        assert_eq!(
            updates[1].incoming().unwrap().text.as_deref(),
            Some("/start")
        );
        assert!(updates[2].incoming().is_none());
    }

    #[test]
    fn test_parse_error_envelope() {
        let json = r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#;
        let response: ApiResponse<SentMessageResult> = serde_json::from_str(json).unwrap();
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(
            response.description.as_deref(),
            Some("Bad Request: chat not found")
        );
    }
}
