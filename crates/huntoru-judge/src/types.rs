//! Request, response and intermediate types of the judging pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Game difficulty. HARD themes also constrain color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Normal => "NORMAL",
            Self::Hard => "HARD",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EASY" => Ok(Self::Easy),
            "NORMAL" => Ok(Self::Normal),
            "HARD" => Ok(Self::Hard),
            other => Err(format!(
                "unknown difficulty '{other}' (expected EASY, NORMAL or HARD)"
            )),
        }
    }
}

/// A theme row from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub id: u32,
    pub difficulty: Difficulty,
    pub theme: String,
}

/// A detected label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub description: String,
    /// Confidence in [0.0, 1.0].
    pub score: f64,
}

/// A dominant color with its weight in the image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DominantColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub score: f64,
    pub pixel_fraction: f64,
}

/// Output of label/color extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult {
    /// Labels in provider order.
    pub labels: Vec<Label>,
    /// Dominant colors in provider order; empty when not reported.
    pub colors: Vec<DominantColor>,
}

impl DetectionResult {
    pub fn label_names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.description.clone()).collect()
    }
}

/// Input of the judgment stage.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgmentRequest {
    pub theme: String,
    pub difficulty: Difficulty,
    pub labels: Vec<String>,
    /// Only populated for [`Difficulty::Hard`].
    colors: Vec<DominantColor>,
}

impl JudgmentRequest {
    /// Build from a detection result. Colors are kept only for HARD.
    pub fn new(theme: impl Into<String>, difficulty: Difficulty, detection: &DetectionResult) -> Self {
        let colors = if difficulty == Difficulty::Hard {
            detection.colors.clone()
        } else {
            Vec::new()
        };
        Self {
            theme: theme.into(),
            difficulty,
            labels: detection.label_names(),
            colors,
        }
    }

    pub fn colors(&self) -> &[DominantColor] {
        &self.colors
    }
}

/// Score and reason returned by the text-generation provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentResult {
    /// Similarity in [0.0, 1.0].
    pub score: f64,
    pub reason: String,
}

/// Inbound `POST /judge` body. Every field is optional so that absence is
/// reported as an invalid request instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeRequestBody {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// Successful judgment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeSuccess {
    pub success: bool,
    pub theme: String,
    pub score: f64,
    pub reason: String,
    pub fatness_multiplier: f64,
    pub detected_labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_colors: Option<Vec<DominantColor>>,
}

impl JudgeSuccess {
    pub fn new(request: JudgmentRequest, result: JudgmentResult) -> Self {
        let dominant_colors = (request.difficulty == Difficulty::Hard).then(|| request.colors);
        Self {
            success: true,
            theme: request.theme,
            score: result.score,
            reason: result.reason,
            fatness_multiplier: 1.0 + result.score,
            detected_labels: request.labels,
            dominant_colors,
        }
    }
}

/// Failed judgment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgeFailure {
    pub success: bool,
    pub error: String,
}

impl JudgeFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection() -> DetectionResult {
        DetectionResult {
            labels: vec![
                Label {
                    description: "Cup".into(),
                    score: 0.97,
                },
                Label {
                    description: "Red".into(),
                    score: 0.91,
                },
            ],
            colors: vec![DominantColor {
                red: 200,
                green: 20,
                blue: 30,
                score: 0.6,
                pixel_fraction: 0.4,
            }],
        }
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("hard".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::default(), Difficulty::Normal);
    }

    #[test]
    fn test_judgment_request_drops_colors_below_hard() {
        let normal = JudgmentRequest::new("コップ", Difficulty::Normal, &detection());
        assert!(normal.colors().is_empty());
        assert_eq!(normal.labels, vec!["Cup", "Red"]);

        let hard = JudgmentRequest::new("赤いコップ", Difficulty::Hard, &detection());
        assert_eq!(hard.colors().len(), 1);
    }

    #[test]
    fn test_success_shape() {
        let request = JudgmentRequest::new("赤いコップ", Difficulty::Normal, &detection());
        let success = JudgeSuccess::new(
            request,
            JudgmentResult {
                score: 0.5,
                reason: "コップ、みーっけ！".into(),
            },
        );
        let json = serde_json::to_value(&success).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["fatnessMultiplier"], 1.5);
        assert_eq!(json["detectedLabels"], serde_json::json!(["Cup", "Red"]));
        assert!(json.get("dominantColors").is_none());
    }

    #[test]
    fn test_body_accepts_missing_fields() {
        let body: JudgeRequestBody = serde_json::from_str(r#"{"theme":"本"}"#).unwrap();
        assert_eq!(body.theme.as_deref(), Some("本"));
        assert!(body.image_data.is_none());
    }
}
