//! Bulk CSV import/export of shipment plans.
//!
//! A plan is flattened to one row per equipment line with the plan columns
//! repeated; a plan without equipment still gets one row. Import groups the
//! rows back into plans.

use crate::types::{PlanStatus, ShipmentPlan};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};

#[derive(Debug, Default, Serialize, Deserialize)]
struct PlanRow {
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    branch: Option<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    carrier: Option<String>,
    #[serde(default)]
    vessel: Option<String>,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    created: Option<DateTime<Utc>>,
    #[serde(default)]
    equipment_code: Option<String>,
    #[serde(default)]
    equipment_type: Option<String>,
    #[serde(default)]
    quantity: Option<u32>,
}

/// A plan read from CSV, before it has a guaranteed reference and codes
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDraft {
    /// 1-based line of the first row for this plan (header is line 1)
    pub line: usize,
    pub reference: Option<String>,
    pub branch: String,
    pub year: Option<i32>,
    pub status: PlanStatus,
    pub carrier: Option<String>,
    pub vessel: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub equipment: Vec<EquipmentDraft>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentDraft {
    pub code: Option<String>,
    pub type_name: String,
    pub quantity: u32,
}

/// Write plans as CSV. Returns the number of data rows.
pub fn export_plans<W: Write>(plans: &[ShipmentPlan], writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut rows = 0;

    for plan in plans {
        let base = PlanRow {
            reference: Some(plan.reference.clone()),
            branch: Some(plan.branch.clone()),
            year: Some(plan.year),
            status: Some(plan.status.to_string()),
            carrier: plan.carrier.clone(),
            vessel: plan.vessel.clone(),
            origin: plan.origin.clone(),
            destination: plan.destination.clone(),
            created: Some(plan.created),
            ..PlanRow::default()
        };

        if plan.equipment.is_empty() {
            wtr.serialize(&base)?;
            rows += 1;
            continue;
        }

        for item in &plan.equipment {
            wtr.serialize(PlanRow {
                equipment_code: Some(item.code.clone()),
                equipment_type: Some(item.type_name.clone()),
                quantity: Some(item.quantity),
                ..clone_plan_columns(&base)
            })?;
            rows += 1;
        }
    }

    wtr.flush()?;
    Ok(rows)
}

fn clone_plan_columns(row: &PlanRow) -> PlanRow {
    PlanRow {
        reference: row.reference.clone(),
        branch: row.branch.clone(),
        year: row.year,
        status: row.status.clone(),
        carrier: row.carrier.clone(),
        vessel: row.vessel.clone(),
        origin: row.origin.clone(),
        destination: row.destination.clone(),
        created: row.created,
        ..PlanRow::default()
    }
}

/// Read CSV rows and group them into plan drafts, in order of first appearance.
///
/// Rows sharing a reference belong to one plan. Rows without a reference are
/// grouped by branch, year, carrier, vessel and route.
pub fn read_plans<R: Read>(reader: R) -> Result<Vec<PlanDraft>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut drafts: Vec<PlanDraft> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (row_idx, result) in rdr.deserialize::<PlanRow>().enumerate() {
        let line = row_idx + 2;
        let row = result.with_context(|| format!("Malformed CSV at line {}", line))?;

        let branch = match non_empty(row.branch.clone()) {
            Some(branch) => branch.to_uppercase(),
            None => bail!("Line {}: branch is required", line),
        };
        let reference = non_empty(row.reference.clone()).map(|r| r.to_uppercase());

        let key = match &reference {
            Some(reference) => reference.clone(),
            None => format!(
                "~{}|{:?}|{:?}|{:?}|{:?}|{:?}",
                branch, row.year, row.carrier, row.vessel, row.origin, row.destination
            ),
        };

        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                let status = match non_empty(row.status.clone()) {
                    Some(s) => s
                        .parse::<PlanStatus>()
                        .with_context(|| format!("Line {}", line))?,
                    None => PlanStatus::default(),
                };
                drafts.push(PlanDraft {
                    line,
                    reference,
                    branch,
                    year: row.year,
                    status,
                    carrier: non_empty(row.carrier.clone()),
                    vessel: non_empty(row.vessel.clone()),
                    origin: non_empty(row.origin.clone()),
                    destination: non_empty(row.destination.clone()),
                    created: row.created,
                    equipment: vec![],
                });
                index.insert(key, drafts.len() - 1);
                drafts.len() - 1
            }
        };

        let code = non_empty(row.equipment_code);
        match non_empty(row.equipment_type) {
            Some(type_name) => drafts[slot].equipment.push(EquipmentDraft {
                code,
                type_name,
                quantity: row.quantity.unwrap_or(1),
            }),
            None if code.is_some() => {
                bail!("Line {}: equipment_code given without equipment_type", line)
            }
            None => {}
        }
    }

    Ok(drafts)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
