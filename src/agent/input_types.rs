use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};

/// Language the generated content should be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "ru")]
    Russian,
}

impl Language {
    /// Parse a language tag. Unknown tags fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "es" => Language::Spanish,
            "ru" => Language::Russian,
            _ => Language::English,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::Russian => "ru",
        }
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.map(|t| Language::from_tag(&t)).unwrap_or_default())
    }
}

/// The four task kinds an agent can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    SiteAudit,
    ImageAnalysis,
    CopyGeneration,
    UiGeneration,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [
        TaskKind::SiteAudit,
        TaskKind::ImageAnalysis,
        TaskKind::CopyGeneration,
        TaskKind::UiGeneration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::SiteAudit => "site_audit",
            TaskKind::ImageAnalysis => "image_analysis",
            TaskKind::CopyGeneration => "copy_generation",
            TaskKind::UiGeneration => "ui_generation",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded image uploaded by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw image bytes
    pub bytes: Vec<u8>,
    /// MIME type of the image (e.g., 'image/jpeg', 'image/png')
    pub mime_type: String,
}

impl ImageData {
    pub const DEFAULT_MIME: &'static str = "image/jpeg";

    /// Decode either a bare base64 string or a `data:<mime>;base64,<payload>` URL.
    pub fn from_base64(input: &str) -> Result<Self, base64::DecodeError> {
        let (mime_type, encoded) = match input.split_once(',') {
            Some((header, encoded)) => {
                let mime = header
                    .strip_prefix("data:")
                    .and_then(|h| h.split(';').next())
                    .filter(|m| !m.is_empty())
                    .unwrap_or(Self::DEFAULT_MIME);
                (mime.to_string(), encoded)
            }
            None => (Self::DEFAULT_MIME.to_string(), input),
        };

        let bytes = STANDARD.decode(encoded.trim())?;
        Ok(Self { bytes, mime_type })
    }

    /// Render as a data URL suitable for vision-capable chat APIs
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// What the page collaborator could read from an audited site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    pub description: String,
    pub excerpt: String,
}

/// Task-specific input handed to an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentRequest {
    SiteAudit {
        page: PageSnapshot,
        language: Language,
    },
    ImageAnalysis {
        image: ImageData,
        language: Language,
    },
    CopyGeneration {
        business_name: String,
        description: String,
        language: Language,
    },
    UiGeneration {
        prompt: String,
        language: Language,
    },
}

impl AgentRequest {
    pub fn kind(&self) -> TaskKind {
        match self {
            AgentRequest::SiteAudit { .. } => TaskKind::SiteAudit,
            AgentRequest::ImageAnalysis { .. } => TaskKind::ImageAnalysis,
            AgentRequest::CopyGeneration { .. } => TaskKind::CopyGeneration,
            AgentRequest::UiGeneration { .. } => TaskKind::UiGeneration,
        }
    }

    pub fn language(&self) -> Language {
        match self {
            AgentRequest::SiteAudit { language, .. }
            | AgentRequest::ImageAnalysis { language, .. }
            | AgentRequest::CopyGeneration { language, .. }
            | AgentRequest::UiGeneration { language, .. } => *language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_tags_fall_back_to_english() {
        assert_eq!(Language::from_tag("RU"), Language::Russian);
        assert_eq!(Language::from_tag(" es "), Language::Spanish);
        assert_eq!(Language::from_tag("de"), Language::English);
        assert_eq!(Language::from_tag(""), Language::English);
    }

    #[test]
    fn language_deserializes_leniently() {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default)]
            language: Language,
        }

        let body: Body = serde_json::from_str(r#"{"language":"ru"}"#).unwrap();
        assert_eq!(body.language, Language::Russian);
        let body: Body = serde_json::from_str(r#"{"language":"fr"}"#).unwrap();
        assert_eq!(body.language, Language::English);
        let body: Body = serde_json::from_str(r#"{"language":null}"#).unwrap();
        assert_eq!(body.language, Language::English);
        let body: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(body.language, Language::English);
    }

    #[test]
    fn image_from_data_url_keeps_mime() {
        let image = ImageData::from_base64("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, b"hello");
        assert_eq!(image.to_data_url(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn bare_base64_defaults_to_jpeg() {
        let image = ImageData::from_base64("aGVsbG8=").unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert!(ImageData::from_base64("not base64!").is_err());
    }
}
