use crate::config::Config;
use crate::error::CareError;
use crate::refno;
use crate::types::{Branch, EquipmentMasterEntry, ShipmentPlan};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const STORE_DIR: &str = ".cargo-care";
const PLANS_DIR: &str = "plans";
const BRANCHES_FILE: &str = "branches.yaml";
const MASTER_FILE: &str = "equipment.yaml";
const CONFIG_FILE: &str = "config.yaml";

pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new() -> Self {
        Self {
            root: Self::find_store_dir(),
        }
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find .cargo-care by searching current and parent directories.
    /// Falls back to ./.cargo-care if not found (for init).
    fn find_store_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("CARGO_CARE_DIR") {
            return PathBuf::from(dir);
        }

        if let Ok(mut current) = std::env::current_dir() {
            loop {
                let candidate = current.join(STORE_DIR);
                if candidate.is_dir() {
                    return candidate;
                }
                if !current.pop() {
                    break;
                }
            }
        }

        PathBuf::from(STORE_DIR)
    }

    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.plans_dir())
            .with_context(|| format!("Failed to create {}", self.root.display()))?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.plans_dir().is_dir()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn plans_dir(&self) -> PathBuf {
        self.root.join(PLANS_DIR)
    }

    pub fn plan_path(&self, reference: &str) -> PathBuf {
        self.plans_dir().join(format!("{}.yaml", reference))
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load(&self.root.join(CONFIG_FILE))
    }

    // Reference data

    pub fn load_branches(&self) -> Result<Vec<Branch>> {
        read_list(&self.root.join(BRANCHES_FILE))
    }

    pub fn save_branches(&self, branches: &[Branch]) -> Result<()> {
        write_list(&self.root.join(BRANCHES_FILE), branches)
    }

    pub fn find_branch(&self, code: &str) -> Result<Option<Branch>> {
        let code = code.trim().to_uppercase();
        Ok(self.load_branches()?.into_iter().find(|b| b.code == code))
    }

    pub fn load_master(&self) -> Result<Vec<EquipmentMasterEntry>> {
        read_list(&self.root.join(MASTER_FILE))
    }

    pub fn save_master(&self, entries: &[EquipmentMasterEntry]) -> Result<()> {
        write_list(&self.root.join(MASTER_FILE), entries)
    }

    // Shipment plans

    fn parse_plan(path: &Path) -> Result<ShipmentPlan> {
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content).context("Failed to parse shipment plan")
    }

    pub fn load(&self, reference: &str) -> Result<Option<ShipmentPlan>> {
        let path = self.plan_path(reference);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Self::parse_plan(&path)?))
    }

    /// Load all plans, skipping files that do not parse
    pub fn load_plans(&self) -> Result<Vec<ShipmentPlan>> {
        let mut plans = Vec::new();
        let dir = self.plans_dir();

        if !dir.exists() {
            return Ok(plans);
        }

        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "yaml") {
                match Self::parse_plan(&path) {
                    Ok(plan) => plans.push(plan),
                    Err(e) => warn!("Failed to parse {}: {:#}", path.display(), e),
                }
            }
        }

        plans.sort_by(|a, b| a.reference.cmp(&b.reference));
        Ok(plans)
    }

    /// References already issued under a prefix, read from file names only
    pub fn references_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = self.plans_dir();
        if !dir.exists() {
            return Ok(vec![]);
        }

        let mut references = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "yaml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if stem.starts_with(prefix) {
                        references.push(stem.to_string());
                    }
                }
            }
        }
        Ok(references)
    }

    /// Write a new plan. Fails with `CareError::Conflict` if the reference is taken.
    pub fn insert_plan(&self, plan: &ShipmentPlan) -> Result<()> {
        let path = self.plan_path(&plan.reference);
        let content = serde_yaml::to_string(plan)?;

        match create_exclusive(&path, |file| file.write_all(content.as_bytes())) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(CareError::Conflict(plan.reference.clone()).into())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to write {}", path.display())),
        }
    }

    /// Overwrite an existing plan
    pub fn save_plan(&self, plan: &ShipmentPlan) -> Result<()> {
        let path = self.plan_path(&plan.reference);
        let content = serde_yaml::to_string(plan)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Sequence the next reference for branch+year and insert the plan built for it.
    ///
    /// Another writer may take the same reference between the read and the
    /// insert; then the prefix is re-read and the plan rebuilt, up to
    /// `max_attempts` times. The last conflict is returned as is.
    pub fn create_plan<F>(
        &self,
        branch_code: &str,
        year: i32,
        max_attempts: u32,
        mut build: F,
    ) -> Result<ShipmentPlan>
    where
        F: FnMut(String) -> ShipmentPlan,
    {
        let prefix = refno::reference_prefix(branch_code, year);
        let mut attempt = 1;

        loop {
            let existing = self.references_with_prefix(&prefix)?;
            let reference = refno::next_reference_number(branch_code, year, &existing);
            let plan = build(reference);

            match self.insert_plan(&plan) {
                Ok(()) => return Ok(plan),
                Err(err) => {
                    let retryable = err
                        .downcast_ref::<CareError>()
                        .is_some_and(CareError::is_retryable);
                    if !retryable || attempt >= max_attempts {
                        return Err(err);
                    }
                    info!(reference = %plan.reference, attempt, "reference taken, retrying");
                    attempt += 1;
                }
            }
        }
    }

    pub fn delete_plan(&self, reference: &str) -> Result<()> {
        let path = self.plan_path(reference);
        fs::remove_file(&path).with_context(|| format!("Failed to delete {}", path.display()))
    }

    /// Find a plan by reference or unambiguous reference prefix
    pub fn find_plan(&self, prefix: &str) -> Result<Option<ShipmentPlan>> {
        let prefix = prefix.trim().to_uppercase();
        let plans = self.load_plans()?;

        if let Some(plan) = plans.iter().find(|p| p.reference == prefix) {
            return Ok(Some(plan.clone()));
        }

        let mut matches: Vec<_> = plans
            .into_iter()
            .filter(|p| p.reference.starts_with(&prefix))
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            count => Err(CareError::AmbiguousReference { prefix, count }.into()),
        }
    }
}

/// Create `path` only if it does not exist yet, then fill it.
/// A failed fill removes the file so the name is not left half-claimed.
fn create_exclusive<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    if let Err(e) = fill(&mut file) {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path) {
            warn!("Failed to remove {}: {}", path.display(), cleanup);
        }
        return Err(e);
    }
    Ok(())
}

fn read_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(vec![]);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(vec![]);
    }
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_list<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let content = serde_yaml::to_string(items)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
