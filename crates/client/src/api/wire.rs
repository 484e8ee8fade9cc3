//! Upstream wire formats
//!
//! Field names here mirror the upstream JSON exactly (via serde renames)
//! and are mapped into the domain shapes at the fetch boundary. The portal
//! is inconsistent about numeric vs. string identifiers, so ids come in as
//! [`IdValue`].

use serde::Deserialize;

/// An identifier that upstream serializes sometimes as a number, sometimes
/// as a string.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum IdValue {
    Number(i64),
    Text(String),
}

impl IdValue {
    pub fn as_string(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Envelope around every versioned-API response
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status: Option<ApiStatus>,
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub code: i64,
}

/// `profiles.getProfilesByLogin` payload
#[derive(Debug, Deserialize)]
pub struct ProfilesPayload {
    #[serde(default)]
    pub profiles: Vec<RawProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawProfile {
    #[serde(default)]
    pub children: Vec<RawChild>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawChild {
    /// Institution-scoped profile id; what the data endpoints require
    pub id: IdValue,
    /// Login-level user id; what callers key on
    #[serde(rename = "userId")]
    pub user_id: IdValue,
    #[serde(default)]
    pub name: Option<String>,
}

/// One event from `Calendar/CalendarGetWeekplanEvents`. The endpoint
/// returns a bare JSON array mixing weekplan and homework items.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCalendarEvent {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub courses: String,
    #[serde(default)]
    pub activities: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "itemType", default)]
    pub item_type: i64,
}

/// One entry from `presence.getDailyOverview`
#[derive(Debug, Clone, Deserialize)]
pub struct RawPresenceEntry {
    #[serde(default)]
    pub status: i64,
    #[serde(rename = "checkInTime", default)]
    pub check_in_time: Option<String>,
    #[serde(rename = "checkOutTime", default)]
    pub check_out_time: Option<String>,
    #[serde(rename = "entryTime", default)]
    pub entry_time: Option<String>,
    #[serde(rename = "exitTime", default)]
    pub exit_time: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(rename = "exitWith", default)]
    pub exit_with: Option<String>,
    #[serde(rename = "institutionProfile")]
    pub institution_profile: RawInstitutionProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInstitutionProfile {
    pub id: IdValue,
    #[serde(default)]
    pub name: Option<String>,
}

/// `messaging.getThreads` payload
#[derive(Debug, Deserialize)]
pub struct ThreadsPayload {
    #[serde(default)]
    pub threads: Vec<RawThread>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawThread {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub read: Option<bool>,
    #[serde(rename = "latestMessage", default)]
    pub latest_message: Option<RawThreadMessage>,
    #[serde(default)]
    pub creator: Option<RawParticipant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawThreadMessage {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawParticipant {
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_value_accepts_numbers_and_strings() {
        let n: IdValue = serde_json::from_str("4874248").unwrap();
        let s: IdValue = serde_json::from_str("\"4874248\"").unwrap();
        assert_eq!(n.as_string(), "4874248");
        assert_eq!(s.as_string(), "4874248");
    }

    #[test]
    fn calendar_event_uses_upstream_field_names() {
        let json = r#"{
            "start": "2026/08/24 08:00",
            "end": "2026/08/24 08:45",
            "courses": "Dansk",
            "activities": "Læsning",
            "itemType": 9
        }"#;
        let event: RawCalendarEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.item_type, 9);
        assert_eq!(event.courses, "Dansk");
        assert_eq!(event.description, "");
    }

    #[test]
    fn presence_entry_parses_observed_payload() {
        let json = r#"{
            "id": 1568162,
            "institutionProfile": {"id": 4874248, "name": "Max"},
            "status": 8,
            "checkInTime": "07:59:31",
            "checkOutTime": "14:55:05",
            "entryTime": "07:30:00",
            "exitTime": "15:00:00",
            "comment": null,
            "exitWith": "Mormor"
        }"#;
        let entry: RawPresenceEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.status, 8);
        assert_eq!(entry.institution_profile.id.as_string(), "4874248");
        assert_eq!(entry.exit_with.as_deref(), Some("Mormor"));
        assert!(entry.comment.is_none());
    }

    #[test]
    fn profiles_envelope_round_trip() {
        let json = r#"{
            "status": {"code": 0},
            "data": {
                "profiles": [
                    {"children": [
                        {"id": 111, "userId": 1001, "name": "A"},
                        {"id": 222, "userId": 1002, "name": "B"}
                    ]}
                ]
            }
        }"#;
        let envelope: ApiEnvelope<ProfilesPayload> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.profiles[0].children.len(), 2);
    }
}
