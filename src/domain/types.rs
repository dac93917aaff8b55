// ==========================================
// Meat Production Analytics - domain types
// ==========================================
// Enums shared by importer, repository and alert layers.
// Serialized form matches the values stored in SQLite.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// Upload type
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadType {
    Slaughter,
    Production,
    Products,
}

impl UploadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadType::Slaughter => "slaughter",
            UploadType::Production => "production",
            UploadType::Products => "products",
        }
    }
}

impl fmt::Display for UploadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UploadType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "slaughter" => Ok(UploadType::Slaughter),
            "production" => Ok(UploadType::Production),
            "products" => Ok(UploadType::Products),
            other => Err(format!("unknown upload type: {}", other)),
        }
    }
}

// ==========================================
// Import status
// ==========================================
// processing -> success | partial | error, written once at the end of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Processing,
    Success,
    Partial,
    Error,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Processing => "processing",
            ImportStatus::Success => "success",
            ImportStatus::Partial => "partial",
            ImportStatus::Error => "error",
        }
    }

    /// Terminal status of an upload.
    ///
    /// - nothing inserted although the file had parseable rows: error
    /// - no errors and no unknown references: success
    /// - something inserted: partial
    /// - otherwise: error
    pub fn resolve(inserted: usize, parsed_rows: usize, errors: usize, unknown_refs: usize) -> Self {
        if inserted == 0 && parsed_rows > 0 {
            ImportStatus::Error
        } else if errors == 0 && unknown_refs == 0 {
            ImportStatus::Success
        } else if inserted > 0 {
            ImportStatus::Partial
        } else {
            ImportStatus::Error
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "processing" => Ok(ImportStatus::Processing),
            "success" => Ok(ImportStatus::Success),
            "partial" => Ok(ImportStatus::Partial),
            "error" => Ok(ImportStatus::Error),
            other => Err(format!("unknown import status: {}", other)),
        }
    }
}

// ==========================================
// Kosher family
// ==========================================
// Halak is the stricter classification; every other kosher product
// counts toward Muchshar for yield purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KosherFamily {
    Halak,
    Muchshar,
}

impl KosherFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            KosherFamily::Halak => "halak",
            KosherFamily::Muchshar => "muchshar",
        }
    }
}

impl fmt::Display for KosherFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Freshness
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Fresh,
    Frozen,
}

impl Freshness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Freshness::Fresh => "fresh",
            Freshness::Frozen => "frozen",
        }
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Alert severity / category
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Error,
    Warning,
    Info,
    Success,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Error => write!(f, "error"),
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Info => write!(f, "info"),
            AlertSeverity::Success => write!(f, "success"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Waste,
    Production,
    Slaughter,
    System,
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertCategory::Waste => write!(f, "waste"),
            AlertCategory::Production => write!(f, "production"),
            AlertCategory::Slaughter => write!(f, "slaughter"),
            AlertCategory::System => write!(f, "system"),
        }
    }
}
