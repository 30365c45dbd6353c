use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Business branch that issues reference numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub code: String,
    pub name: String,
}

impl Branch {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.trim().to_uppercase(),
            name: name.trim().to_string(),
        }
    }
}

/// Predefined equipment code, maintained by administrators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentMasterEntry {
    pub name: String,
    pub code: String,
}

/// Shipment plan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Draft,
    Booked,
    Shipped,
    Cancelled,
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanStatus::Draft => write!(f, "draft"),
            PlanStatus::Booked => write!(f, "booked"),
            PlanStatus::Shipped => write!(f, "shipped"),
            PlanStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for PlanStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" | "new" => Ok(PlanStatus::Draft),
            "booked" | "confirmed" => Ok(PlanStatus::Booked),
            "shipped" | "sailed" => Ok(PlanStatus::Shipped),
            "cancelled" | "canceled" => Ok(PlanStatus::Cancelled),
            _ => anyhow::bail!(
                "Invalid status: {}. Use: draft, booked, shipped, cancelled",
                s
            ),
        }
    }
}

/// One equipment line on a shipment plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub code: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// A shipment plan as stored in plans/<REFERENCE>.yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentPlan {
    pub reference: String,
    pub branch: String,
    pub year: i32,
    #[serde(default)]
    pub status: PlanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vessel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<Equipment>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl ShipmentPlan {
    pub fn new(reference: String, branch: String, year: i32) -> Self {
        Self {
            reference,
            branch,
            year,
            status: PlanStatus::Draft,
            carrier: None,
            vessel: None,
            origin: None,
            destination: None,
            created: Utc::now(),
            updated: None,
            equipment: vec![],
            notes: String::new(),
        }
    }

    /// Codes already taken on this plan; the collision scope for new equipment
    pub fn equipment_codes(&self) -> HashSet<String> {
        self.equipment.iter().map(|e| e.code.clone()).collect()
    }

    pub fn total_units(&self) -> u32 {
        self.equipment.iter().map(|e| e.quantity).sum()
    }

    /// "Origin -> Destination", "?" for an unknown leg
    pub fn route(&self) -> String {
        format!(
            "{} -> {}",
            self.origin.as_deref().unwrap_or("?"),
            self.destination.as_deref().unwrap_or("?")
        )
    }

    pub fn touch(&mut self) {
        self.updated = Some(Utc::now());
    }

    /// Append a timestamped line to the plan notes
    pub fn add_note(&mut self, content: &str) {
        self.add_note_at(Utc::now(), content);
    }

    fn add_note_at(&mut self, at: DateTime<Utc>, content: &str) {
        if !self.notes.is_empty() && !self.notes.ends_with('\n') {
            self.notes.push('\n');
        }
        self.notes
            .push_str(&format!("[{}] {}", at.format("%Y-%m-%d %H:%M"), content.trim()));
        self.touch();
    }
}
