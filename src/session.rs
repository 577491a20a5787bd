use crate::ids::{flexible_string, RoomId, SessionId};
use serde::{Deserialize, Serialize};

/// Platform codes reported by the telemetry backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Platform {
    #[strum(serialize = "iOS")]
    Ios,
    Android,
    Unknown,
}

impl From<i64> for Platform {
    fn from(code: i64) -> Self {
        match code {
            8 => Platform::Ios,
            11 => Platform::Android,
            _ => Platform::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum BuildType {
    Debug,
    Release,
}

impl From<i64> for BuildType {
    fn from(code: i64) -> Self {
        match code {
            0 => BuildType::Debug,
            _ => BuildType::Release,
        }
    }
}

/// One row of a search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    #[serde(deserialize_with = "flexible_string")]
    pub user_id: String,
    #[serde(deserialize_with = "flexible_string")]
    pub device_type: String,
    pub platform: i64,
    pub start_time: String,
    pub id: SessionId,
    pub room_def_id: RoomId,
    pub build_type: i64,
    #[serde(default, alias = "fps")]
    pub avg_fps: f64,
    #[serde(default, alias = "memory")]
    pub avg_mem: f64,
}

impl SessionSummary {
    pub fn platform(&self) -> Platform {
        Platform::from(self.platform)
    }

    pub fn build(&self) -> BuildType {
        BuildType::from(self.build_type)
    }
}

/// Display projection of a result slot for the sessions table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub user: String,
    pub device: String,
    pub platform: String,
    pub start_time: String,
    pub session: String,
    pub room: String,
    pub build: String,
}

impl TableRow {
    /// Row for a slot that has not been fetched yet
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_blank(&self) -> bool {
        *self == Self::blank()
    }
}

impl From<&SessionSummary> for TableRow {
    fn from(s: &SessionSummary) -> Self {
        Self {
            user: s.user_id.clone(),
            device: s.device_type.clone(),
            platform: s.platform().to_string(),
            start_time: s.start_time.clone(),
            session: s.id.to_string(),
            room: s.room_def_id.to_string(),
            build: s.build().to_string(),
        }
    }
}

impl From<Option<&SessionSummary>> for TableRow {
    fn from(slot: Option<&SessionSummary>) -> Self {
        slot.map(TableRow::from).unwrap_or_else(TableRow::blank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_labels() {
        assert_eq!(Platform::from(8).to_string(), "iOS");
        assert_eq!(Platform::from(11).to_string(), "Android");
        assert_eq!(Platform::from(3).to_string(), "Unknown");
    }

    #[test]
    fn build_labels() {
        assert_eq!(BuildType::from(0).to_string(), "Debug");
        assert_eq!(BuildType::from(1).to_string(), "Release");
        assert_eq!(BuildType::from(7).to_string(), "Release");
    }

    #[test]
    fn deserializes_search_row_with_numeric_ids() {
        let json = r#"{
            "userId": 1001,
            "deviceType": "iPhone8,1",
            "platform": 8,
            "startTime": "2016-03-01 12:00:00",
            "id": 555,
            "roomDefId": 12,
            "buildType": 0,
            "fps": 44.5,
            "memory": 290
        }"#;
        let s: SessionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(s.user_id, "1001");
        assert_eq!(s.id, SessionId::from("555"));
        assert_eq!(s.avg_fps, 44.5);
        assert_eq!(s.avg_mem, 290.0);

        let row = TableRow::from(&s);
        assert_eq!(row.platform, "iOS");
        assert_eq!(row.build, "Debug");
        assert_eq!(row.session, "555");
        assert!(!row.is_blank());
    }

    #[test]
    fn unfetched_slot_is_a_blank_row() {
        let row = TableRow::from(None::<&SessionSummary>);
        assert!(row.is_blank());
        assert_eq!(row.platform, "");
    }
}
