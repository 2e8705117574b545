//! Generated documentation entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform id of a generated documentation record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentationId(pub String);

impl std::fmt::Display for DocumentationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of generated report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentationType {
    Roadmap,
    Testing,
    Timeline,
}

impl DocumentationType {
    /// Name of the endpoint that generates this report
    pub fn function_name(self) -> &'static str {
        match self {
            DocumentationType::Roadmap => "generateRoadmapDocumentation",
            DocumentationType::Testing => "generateTestingDocumentation",
            DocumentationType::Timeline => "generateTimelineDocumentation",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            DocumentationType::Roadmap => "Produkt-Roadmap",
            DocumentationType::Testing => "Teststrategie & Qualitätssicherung",
            DocumentationType::Timeline => "Projekt-Timeline",
        }
    }
}

impl std::fmt::Display for DocumentationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentationType::Roadmap => write!(f, "roadmap"),
            DocumentationType::Testing => write!(f, "testing"),
            DocumentationType::Timeline => write!(f, "timeline"),
        }
    }
}

impl std::str::FromStr for DocumentationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "roadmap" => Ok(DocumentationType::Roadmap),
            "testing" => Ok(DocumentationType::Testing),
            "timeline" => Ok(DocumentationType::Timeline),
            _ => Err(format!("Unknown documentation type: {}", s)),
        }
    }
}

/// A stored documentation report
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocumentation {
    pub id: DocumentationId,
    pub documentation_type: DocumentationType,
    pub title: String,
    pub description: Option<String>,
    pub content_markdown: String,
    pub file_size_bytes: u64,
    pub generation_duration_seconds: f64,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Data needed to store a new report
#[derive(Debug, Clone)]
pub struct NewDocumentation {
    pub documentation_type: DocumentationType,
    pub title: String,
    pub description: Option<String>,
    pub content_markdown: String,
    pub file_size_bytes: u64,
    pub generation_duration_seconds: f64,
    pub created_by: String,
}
