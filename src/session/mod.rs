use chrono::{DateTime, Local};
use serde_json::Value;

pub const FALLBACK_REPLY: &str = "Sorry, I could not process your message.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl Message {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Local::now(),
        }
    }

    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

// Owns the transcript and the single-outstanding-dispatch rule. Network I/O
// stays outside; callers dispatch whatever begin_send hands back and feed the
// outcome into apply_reply or apply_error.
#[derive(Debug, Default)]
pub struct ChatSession {
    transcript: Vec<Message>,
    busy: bool,
}

impl ChatSession {
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn has_user_messages(&self) -> bool {
        self.transcript
            .iter()
            .any(|message| message.sender == Sender::User)
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    // Sends attempted while a dispatch is outstanding are dropped, not
    // queued. The user entry lands in the transcript before the request is
    // issued, so it always precedes the reply.
    pub fn begin_send(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() || self.busy {
            return None;
        }

        self.transcript.push(Message::new(Sender::User, text));
        self.busy = true;
        Some(text.to_string())
    }

    pub fn push_assistant_note(&mut self, text: impl Into<String>) {
        self.transcript.push(Message::new(Sender::Assistant, text));
    }

    pub fn apply_reply(&mut self, body: &str) {
        let mut reply = extract_reply_text(body);
        if reply.trim().is_empty() {
            reply = FALLBACK_REPLY.to_string();
        }
        self.transcript.push(Message::new(Sender::Assistant, reply));
        self.busy = false;
    }

    // Failures surface in the transcript rather than being dropped.
    pub fn apply_error(&mut self, message: &str) {
        self.transcript
            .push(Message::new(Sender::Assistant, format!("Error: {message}")));
        self.busy = false;
    }
}

// The assistant endpoint's reply shape is not contractually fixed. Each rule
// is a pure probe into the decoded payload; the first non-empty hit wins.
const REPLY_RULES: &[fn(&Value) -> Option<String>] = &[
    |value| field_text(value, "response"),
    |value| field_text(value, "message"),
    |value| field_text(value, "reply"),
    |value| field_text(value, "text"),
    |value| field_text(value, "output"),
    |value| nested_field_text(value, "data", "response"),
    |value| nested_field_text(value, "data", "message"),
    |value| nested_field_text(value, "data", "reply"),
];

pub fn extract_reply_text(body: &str) -> String {
    let decoded = match serde_json::from_str::<Value>(body) {
        Ok(decoded) => decoded,
        // Not JSON at all: the raw text is the reply.
        Err(_) => return body.to_string(),
    };

    for rule in REPLY_RULES {
        if let Some(text) = rule(&decoded) {
            return text;
        }
    }

    serde_json::to_string_pretty(&decoded).unwrap_or_else(|_| body.to_string())
}

fn field_text(value: &Value, key: &str) -> Option<String> {
    let text = value.get(key)?.as_str()?;
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn nested_field_text(value: &Value, outer: &str, key: &str) -> Option<String> {
    field_text(value.get(outer)?, key)
}

// Renders the structured request produced by the chat view's selection flow.
pub fn compose_selection_message(kind: &str, system: &str, action_names: &[String]) -> String {
    let actions = match action_names.len() {
        0 => String::new(),
        1 => action_names[0].clone(),
        len => format!(
            "{} and {}",
            action_names[..len - 1].join(", "),
            action_names[len - 1]
        ),
    };

    format!(
        "I would like to set up a {kind} on the platform to {actions} using {system}. Is that possible?"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_send_appends_user_entry_and_sets_busy() {
        let mut session = ChatSession::default();
        let dispatched = session.begin_send("hello").expect("send should dispatch");
        assert_eq!(dispatched, "hello");
        assert!(session.is_busy());
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].sender, Sender::User);
        assert_eq!(session.transcript()[0].text, "hello");
    }

    #[test]
    fn send_while_busy_is_a_no_op() {
        let mut session = ChatSession::default();
        session.begin_send("first").expect("first send dispatches");
        assert!(session.begin_send("second").is_none());
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn blank_text_is_not_sent() {
        let mut session = ChatSession::default();
        assert!(session.begin_send("   ").is_none());
        assert!(session.is_empty());
        assert!(!session.is_busy());
    }

    #[test]
    fn reply_lands_after_the_user_entry() {
        let mut session = ChatSession::default();
        session.begin_send("hello").expect("send dispatches");
        session.apply_reply(r#"{"response":"hi there"}"#);

        assert!(!session.is_busy());
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.transcript()[1].sender, Sender::Assistant);
        assert_eq!(session.transcript()[1].text, "hi there");
    }

    #[test]
    fn errors_become_visible_assistant_entries() {
        let mut session = ChatSession::default();
        session.begin_send("hello").expect("send dispatches");
        session.apply_error("HTTP error: status 502");

        assert!(!session.is_busy());
        assert_eq!(
            session.transcript()[1].text,
            "Error: HTTP error: status 502"
        );
    }

    #[test]
    fn reply_extraction_walks_the_field_fallback_chain() {
        assert_eq!(extract_reply_text(r#"{"response":"a"}"#), "a");
        assert_eq!(extract_reply_text(r#"{"message":"b"}"#), "b");
        assert_eq!(extract_reply_text(r#"{"output":"c"}"#), "c");
        assert_eq!(extract_reply_text(r#"{"data":{"reply":"d"}}"#), "d");
    }

    #[test]
    fn empty_string_fields_do_not_satisfy_a_rule() {
        assert_eq!(extract_reply_text(r#"{"response":"","message":"b"}"#), "b");
    }

    #[test]
    fn unmatched_json_is_pretty_printed() {
        let extracted = extract_reply_text(r#"{"status":"ok"}"#);
        assert!(extracted.contains("\"status\": \"ok\""));
    }

    #[test]
    fn non_json_body_is_used_verbatim() {
        assert_eq!(extract_reply_text("plain text answer"), "plain text answer");
    }

    #[test]
    fn empty_reply_falls_back_to_the_apology_line() {
        let mut session = ChatSession::default();
        session.begin_send("hello").expect("send dispatches");
        session.apply_reply("   ");
        assert_eq!(session.transcript()[1].text, FALLBACK_REPLY);
    }

    #[test]
    fn selection_message_joins_action_names() {
        let one =
            compose_selection_message("integration", "Pipedrive", &["Create deal".to_string()]);
        assert!(one.contains("to Create deal using Pipedrive"));

        let three = compose_selection_message(
            "AI agent",
            "Asaas",
            &[
                "Create charge".to_string(),
                "List charges".to_string(),
                "Find customer".to_string(),
            ],
        );
        assert!(three.contains("Create charge, List charges and Find customer"));
        assert!(three.starts_with("I would like to set up a AI agent"));
    }
}
