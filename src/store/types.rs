use serde::{Deserialize, Serialize};

use crate::timeline::UNBOUNDED_END;
use crate::video::MediaTime;

fn default_start() -> MediaTime {
    0.0
}

fn default_end() -> MediaTime {
    UNBOUNDED_END
}

/// One effect as the store keeps it
///
/// `end_time` is passed through verbatim, including negative sentinels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub effect_type: String,
    #[serde(default = "default_start")]
    pub start_time: MediaTime,
    #[serde(default = "default_end")]
    pub end_time: MediaTime,
}

/// A project and its ordered effect list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub effects: Vec<EffectRecord>,
}
