use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A face region in display coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One detection as the service reports it, in encoded-frame coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    #[serde(default)]
    pub id: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    #[serde(default)]
    pub label: Option<String>,
}

/// Body of a detection service reply
///
/// `detections` is optional: a reply without it means "nothing this round"
/// and must not clear the previous results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectionResponse {
    #[serde(default)]
    pub detections: Option<Vec<RawDetection>>,
}

/// Factors mapping encoded-frame coordinates onto the display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale {
    pub x: f32,
    pub y: f32,
}

impl DisplayScale {
    /// `display / frame` per axis; a zero-sized frame axis scales by 1
    pub fn new(frame: (u32, u32), display: (u32, u32)) -> Self {
        let axis = |d: u32, f: u32| if f == 0 { 1.0 } else { d as f32 / f as f32 };
        Self {
            x: axis(display.0, frame.0),
            y: axis(display.1, frame.1),
        }
    }
}

impl RawDetection {
    /// Scale into display coordinates, assigning `fallback_id` if the service sent none
    pub fn into_display(self, scale: DisplayScale, fallback_id: usize) -> DetectionResult {
        DetectionResult {
            id: self.id.unwrap_or_else(|| format!("face-{}", fallback_id)),
            x: self.x * scale.x,
            y: self.y * scale.y,
            width: self.width * scale.x,
            height: self.height * scale.y,
            confidence: self.confidence,
            label: self.label,
        }
    }
}

/// Summary of the latest result set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionStats {
    pub count: usize,
    pub average_confidence: f32,
    pub last_round_trip: Option<Duration>,
}

impl DetectionStats {
    pub fn from_results(results: &[DetectionResult], last_round_trip: Option<Duration>) -> Self {
        let average_confidence = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.confidence).sum::<f32>() / results.len() as f32
        };

        Self {
            count: results.len(),
            average_confidence,
            last_round_trip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxes_scale_to_display() {
        let raw = RawDetection {
            id: None,
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
            confidence: 0.9,
            label: Some("face".to_string()),
        };

        let scale = DisplayScale::new((640, 480), (1280, 240));
        let result = raw.into_display(scale, 3);

        assert_eq!(result.id, "face-3");
        assert_eq!((result.x, result.y), (20.0, 10.0));
        assert_eq!((result.width, result.height), (200.0, 25.0));
        assert_eq!(result.label.as_deref(), Some("face"));
    }

    #[test]
    fn test_missing_detections_field() {
        let missing: DetectionResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert!(missing.detections.is_none());

        let empty: DetectionResponse = serde_json::from_str(r#"{"detections":[]}"#).unwrap();
        assert_eq!(empty.detections, Some(vec![]));
    }

    #[test]
    fn test_stats_average() {
        let result = |confidence| DetectionResult {
            id: "a".to_string(),
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            confidence,
            label: None,
        };

        let stats = DetectionStats::from_results(&[result(0.5), result(1.0)], None);
        assert_eq!(stats.count, 2);
        assert!((stats.average_confidence - 0.75).abs() < 1e-6);

        assert_eq!(DetectionStats::from_results(&[], None).average_confidence, 0.0);
    }
}
