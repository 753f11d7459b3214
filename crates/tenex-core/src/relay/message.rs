//! NIP-01 wire messages
//!
//! - Client to relay: EVENT, REQ, CLOSE
//! - Relay to client: EVENT, OK, EOSE, CLOSED, NOTICE

use serde_json::Value;

use super::Filter;
use crate::error::{Result, TenexError};
use crate::event::Event;

/// Messages sent from client to relay.
#[derive(Debug, Clone)]
pub enum ClientMessage<'a> {
    /// `["EVENT", <event>]`
    Event(&'a Event),
    /// `["REQ", <subscription_id>, <filter>]`
    Req {
        subscription_id: &'a str,
        filter: &'a Filter,
    },
    /// `["CLOSE", <subscription_id>]`
    Close { subscription_id: &'a str },
}

impl ClientMessage<'_> {
    pub fn to_json(&self) -> Result<String> {
        let value = match self {
            ClientMessage::Event(event) => serde_json::json!(["EVENT", event]),
            ClientMessage::Req {
                subscription_id,
                filter,
            } => serde_json::json!(["REQ", subscription_id, filter]),
            ClientMessage::Close { subscription_id } => {
                serde_json::json!(["CLOSE", subscription_id])
            }
        };
        Ok(serde_json::to_string(&value)?)
    }
}

/// Messages sent from relay to client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    Event {
        subscription_id: String,
        event: Box<Event>,
    },
    Ok {
        event_id: String,
        accepted: bool,
        message: String,
    },
    Eose {
        subscription_id: String,
    },
    Closed {
        subscription_id: String,
        message: String,
    },
    Notice {
        message: String,
    },
    /// Anything this client does not handle (AUTH, COUNT, ...).
    Other(String),
}

impl RelayMessage {
    pub fn from_json(json: &str) -> Result<Self> {
        let arr: Vec<Value> = serde_json::from_str(json)?;
        let msg_type = arr
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| TenexError::relay(format!("malformed relay message: {}", json)))?;

        let text = |index: usize| -> Result<String> {
            arr.get(index)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    TenexError::relay(format!("{} message missing field {}", msg_type, index))
                })
        };
        let optional_text =
            |index: usize| arr.get(index).and_then(Value::as_str).unwrap_or("").to_string();

        match msg_type {
            "EVENT" => {
                let subscription_id = text(1)?;
                let event = arr
                    .get(2)
                    .cloned()
                    .ok_or_else(|| TenexError::relay("EVENT message missing event"))?;
                Ok(RelayMessage::Event {
                    subscription_id,
                    event: Box::new(serde_json::from_value(event)?),
                })
            }
            "OK" => Ok(RelayMessage::Ok {
                event_id: text(1)?,
                accepted: arr.get(2).and_then(Value::as_bool).unwrap_or(false),
                message: optional_text(3),
            }),
            "EOSE" => Ok(RelayMessage::Eose {
                subscription_id: text(1)?,
            }),
            "CLOSED" => Ok(RelayMessage::Closed {
                subscription_id: text(1)?,
                message: optional_text(2),
            }),
            "NOTICE" => Ok(RelayMessage::Notice {
                message: optional_text(1),
            }),
            other => Ok(RelayMessage::Other(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        Event {
            id: "ab".repeat(32),
            pubkey: "cd".repeat(32),
            created_at: 1,
            kind: 1,
            tags: vec![],
            content: "hi".into(),
            sig: "ef".repeat(64),
        }
    }

    #[test]
    fn test_client_messages() {
        let filter = Filter::new().kind(1).limit(2);
        let req = ClientMessage::Req {
            subscription_id: "sub1",
            filter: &filter,
        };
        assert_eq!(
            req.to_json().unwrap(),
            r#"["REQ","sub1",{"kinds":[1],"limit":2}]"#
        );
        let close = ClientMessage::Close {
            subscription_id: "sub1",
        };
        assert_eq!(close.to_json().unwrap(), r#"["CLOSE","sub1"]"#);

        let event = sample_event();
        let json = ClientMessage::Event(&event).to_json().unwrap();
        assert!(json.starts_with(r#"["EVENT",{"#));
    }

    #[test]
    fn test_parse_relay_messages() {
        let event = sample_event();
        let raw = serde_json::json!(["EVENT", "s", event]).to_string();
        assert_eq!(
            RelayMessage::from_json(&raw).unwrap(),
            RelayMessage::Event {
                subscription_id: "s".into(),
                event: Box::new(event),
            }
        );
        assert_eq!(
            RelayMessage::from_json(r#"["EOSE","s"]"#).unwrap(),
            RelayMessage::Eose {
                subscription_id: "s".into()
            }
        );
        assert_eq!(
            RelayMessage::from_json(r#"["OK","abc",true,""]"#).unwrap(),
            RelayMessage::Ok {
                event_id: "abc".into(),
                accepted: true,
                message: String::new()
            }
        );
        assert_eq!(
            RelayMessage::from_json(r#"["OK","abc",false,"blocked: spam"]"#).unwrap(),
            RelayMessage::Ok {
                event_id: "abc".into(),
                accepted: false,
                message: "blocked: spam".into()
            }
        );
        assert_eq!(
            RelayMessage::from_json(r#"["NOTICE","slow down"]"#).unwrap(),
            RelayMessage::Notice {
                message: "slow down".into()
            }
        );
        assert_eq!(
            RelayMessage::from_json(r#"["AUTH","challenge"]"#).unwrap(),
            RelayMessage::Other("AUTH".into())
        );
    }

    #[test]
    fn test_malformed_relay_messages() {
        assert!(RelayMessage::from_json("{}").is_err());
        assert!(RelayMessage::from_json("[]").is_err());
        assert!(RelayMessage::from_json(r#"["EOSE"]"#).is_err());
        assert!(RelayMessage::from_json(r#"["EVENT","s",{"id":1}]"#).is_err());
    }
}
