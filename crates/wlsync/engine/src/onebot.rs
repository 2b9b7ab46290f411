//! OneBot (CoolQ websocket API) frame codec
//!
//! Inbound frames are events discriminated by `post_type`, then by
//! `message_type` or `notice_type`. Frames without `post_type` are replies
//! to our own API calls and carry nothing for the engine.

use serde::Deserialize;
use serde_json::{json, Value};
use wlsync_types::{Account, ChatEvent, RoomId};

#[derive(Debug, Deserialize)]
#[serde(tag = "post_type", rename_all = "snake_case")]
enum Frame {
    Message {
        message_type: String,
        #[serde(default)]
        group_id: Option<u64>,
        user_id: u64,
        #[serde(default)]
        raw_message: String,
    },
    Notice {
        notice_type: String,
        #[serde(default)]
        group_id: Option<u64>,
        #[serde(default)]
        user_id: Option<u64>,
    },
    #[serde(other)]
    Other,
}

/// Decode one inbound text frame.
pub fn decode_event(frame: &str) -> Result<ChatEvent, serde_json::Error> {
    let value: Value = serde_json::from_str(frame)?;
    if value.get("post_type").is_none() {
        return Ok(ChatEvent::Ignored);
    }

    let event = match serde_json::from_value::<Frame>(value)? {
        Frame::Message {
            message_type,
            group_id: Some(group_id),
            user_id,
            raw_message,
        } if message_type == "group" => ChatEvent::Message {
            room: RoomId::new(group_id),
            sender: Account::new(user_id),
            text: raw_message,
        },
        Frame::Notice {
            notice_type,
            group_id: Some(group_id),
            user_id: Some(user_id),
        } if notice_type == "group_decrease" => ChatEvent::MembershipDecrease {
            room: RoomId::new(group_id),
            account: Account::new(user_id),
        },
        _ => ChatEvent::Ignored,
    };
    Ok(event)
}

/// Encode a `send_group_msg` action.
pub fn encode_group_message(room: RoomId, message: &str) -> String {
    json!({
        "action": "send_group_msg",
        "params": {
            "group_id": room.get(),
            "message": message,
            "auto_escape": false,
        }
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_message() {
        let frame = r#"{"post_type":"message","message_type":"group","sub_type":"normal",
            "group_id":609632487,"user_id":10001,"raw_message":"MyID=Steve","message":"MyID=Steve"}"#;
        assert_eq!(
            decode_event(frame).unwrap(),
            ChatEvent::Message {
                room: RoomId::new(609632487),
                sender: Account::new(10001),
                text: "MyID=Steve".to_string(),
            }
        );
    }

    #[test]
    fn test_private_message_is_ignored() {
        let frame = r#"{"post_type":"message","message_type":"private","user_id":10001,"raw_message":"MyID=Steve"}"#;
        assert_eq!(decode_event(frame).unwrap(), ChatEvent::Ignored);
    }

    #[test]
    fn test_group_decrease() {
        let frame = r#"{"post_type":"notice","notice_type":"group_decrease","sub_type":"leave",
            "group_id":1,"user_id":10001,"operator_id":10001}"#;
        assert_eq!(
            decode_event(frame).unwrap(),
            ChatEvent::MembershipDecrease {
                room: RoomId::new(1),
                account: Account::new(10001),
            }
        );
    }

    #[test]
    fn test_other_notices_and_meta_events_are_ignored() {
        let increase = r#"{"post_type":"notice","notice_type":"group_increase","group_id":1,"user_id":2}"#;
        let heartbeat = r#"{"post_type":"meta_event","meta_event_type":"heartbeat","interval":15000}"#;
        let reply = r#"{"status":"ok","retcode":0,"data":{"message_id":1}}"#;
        assert_eq!(decode_event(increase).unwrap(), ChatEvent::Ignored);
        assert_eq!(decode_event(heartbeat).unwrap(), ChatEvent::Ignored);
        assert_eq!(decode_event(reply).unwrap(), ChatEvent::Ignored);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(decode_event("not json").is_err());
        assert!(decode_event(r#"{"post_type":"message","message_type":"group"}"#).is_err());
    }

    #[test]
    fn test_encode_group_message() {
        let frame = encode_group_message(RoomId::new(5), "hello");
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["action"], "send_group_msg");
        assert_eq!(value["params"]["group_id"], 5);
        assert_eq!(value["params"]["message"], "hello");
        assert_eq!(value["params"]["auto_escape"], false);
    }
}
