use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::requests::repo::SkillRequest;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    pub recipient_id: Uuid,
    pub offered_skill: String,
    pub wanted_skill: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRequestResponse {
    pub request_id: Uuid,
}

/// The recipient's decision. Deserialization rejects anything but the two
/// terminal states, so "pending" can never be written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accepted,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accepted => "accepted",
            Decision::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondBody {
    pub status: Decision,
    #[serde(default)]
    pub response_message: Option<String>,
}

/// Display data frozen at creation time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySnapshot {
    pub name: String,
    pub profile_photo: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub offered_skill: String,
    pub wanted_skill: String,
    pub message: String,
    pub status: String,
    pub response_message: Option<String>,
    pub created_at: OffsetDateTime,
    pub responded_at: Option<OffsetDateTime>,
    pub sender: PartySnapshot,
    pub recipient: PartySnapshot,
}

impl From<SkillRequest> for RequestResponse {
    fn from(r: SkillRequest) -> Self {
        Self {
            id: r.id,
            sender_id: r.sender_id,
            recipient_id: r.recipient_id,
            offered_skill: r.offered_skill,
            wanted_skill: r.wanted_skill,
            message: r.message,
            status: r.status,
            response_message: r.response_message,
            created_at: r.created_at,
            responded_at: r.responded_at,
            sender: PartySnapshot {
                name: r.sender_name,
                profile_photo: r.sender_photo,
            },
            recipient: PartySnapshot {
                name: r.recipient_name,
                profile_photo: r.recipient_photo,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_deserializes_from_lowercase() {
        assert_eq!(
            serde_json::from_str::<Decision>("\"accepted\"").unwrap(),
            Decision::Accepted
        );
        assert_eq!(
            serde_json::from_str::<Decision>("\"rejected\"").unwrap(),
            Decision::Rejected
        );
    }

    #[test]
    fn decision_rejects_pending_and_garbage() {
        assert!(serde_json::from_str::<Decision>("\"pending\"").is_err());
        assert!(serde_json::from_str::<Decision>("\"Accepted\"").is_err());
        assert!(serde_json::from_str::<Decision>("\"cancelled\"").is_err());
    }

    #[test]
    fn respond_body_defaults_message_to_none() {
        let body: RespondBody = serde_json::from_str(r#"{"status":"accepted"}"#).unwrap();
        assert_eq!(body.status, Decision::Accepted);
        assert!(body.response_message.is_none());
    }

    #[test]
    fn request_response_carries_snapshots() {
        let row = SkillRequest {
            id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            offered_skill: "guitar".into(),
            wanted_skill: "spanish".into(),
            message: "hi".into(),
            status: "pending".into(),
            response_message: None,
            sender_name: "Alice".into(),
            sender_photo: Some("alice.png".into()),
            recipient_name: "Bob".into(),
            recipient_photo: None,
            created_at: OffsetDateTime::now_utc(),
            responded_at: None,
        };
        let res = RequestResponse::from(row);
        assert_eq!(res.sender.name, "Alice");
        assert_eq!(res.sender.profile_photo.as_deref(), Some("alice.png"));
        assert_eq!(res.recipient.name, "Bob");

        let json = serde_json::to_string(&res).unwrap();
        assert!(json.contains("offeredSkill"));
        assert!(json.contains("senderId"));
        assert!(json.contains("respondedAt"));
    }
}
