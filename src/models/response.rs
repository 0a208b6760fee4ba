use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct TotalPagesResponse {
    pub total_pages: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractPageResponse {
    pub page_number: i64,
    pub base64_content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub source_file_present: bool,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl CheckStatus {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckItem {
    pub text: String,
    pub status: CheckStatus,
    pub details: String,
    pub page_number: u32,
}

#[derive(Debug, Clone)]
pub struct CheckSection {
    pub name: String,
    pub items: Vec<CheckItem>,
}

/// Check results grouped by section. Serializes as a JSON object keyed by
/// section name, in section order.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub sections: Vec<CheckSection>,
}

impl CheckReport {
    pub fn section(&self, name: &str) -> Option<&CheckSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn items(&self) -> impl Iterator<Item = &CheckItem> {
        self.sections.iter().flat_map(|s| s.items.iter())
    }
}

impl Serialize for CheckReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for section in &self.sections {
            map.serialize_entry(&section.name, &section.items)?;
        }
        map.end()
    }
}
