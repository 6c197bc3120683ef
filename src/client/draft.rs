//! Job-post form state: the fields a user edits before submitting a job.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::dto::job_dto::{CreateJobPayload, JobTypeInput, Location, LocationInput};
use crate::models::job::{EmploymentType, SalaryType};

/// Checked employment types. `selected()` is recomputed from the set on every
/// call, so there is no second copy to keep in sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmploymentTypeSelection {
    selected: BTreeSet<EmploymentType>,
}

impl EmploymentTypeSelection {
    /// Flips `kind` and returns whether it is selected afterwards.
    pub fn toggle(&mut self, kind: EmploymentType) -> bool {
        if self.selected.remove(&kind) {
            false
        } else {
            self.selected.insert(kind);
            true
        }
    }

    pub fn is_selected(&self, kind: EmploymentType) -> bool {
        self.selected.contains(&kind)
    }

    /// Selected types in form order.
    pub fn selected(&self) -> Vec<EmploymentType> {
        EmploymentType::ALL
            .into_iter()
            .filter(|kind| self.selected.contains(kind))
            .collect()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.selected().into_iter().map(EmploymentType::label).collect()
    }

    /// Every type with its checkbox state, for rendering the form.
    pub fn checkboxes(&self) -> Vec<(EmploymentType, bool)> {
        EmploymentType::ALL
            .into_iter()
            .map(|kind| (kind, self.is_selected(kind)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobDraft {
    title: String,
    description: String,
    salary: Decimal,
    salary_type: SalaryType,
    negotiable: bool,
    tags: Vec<String>,
    skills: Vec<String>,
    location: Location,
    employment_types: EmploymentTypeSelection,
}

impl Default for JobDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            salary: Decimal::ZERO,
            salary_type: SalaryType::Year,
            negotiable: false,
            tags: Vec::new(),
            skills: Vec::new(),
            location: Location::default(),
            employment_types: EmploymentTypeSelection::default(),
        }
    }
}

impl JobDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, value: &str) {
        self.title = value.trim_start().to_string();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, value: &str) {
        self.description = value.trim_start().to_string();
    }

    pub fn salary(&self) -> Decimal {
        self.salary
    }

    pub fn set_salary(&mut self, value: Decimal) {
        self.salary = value;
    }

    pub fn salary_type(&self) -> SalaryType {
        self.salary_type
    }

    pub fn set_salary_type(&mut self, value: SalaryType) {
        self.salary_type = value;
    }

    pub fn negotiable(&self) -> bool {
        self.negotiable
    }

    pub fn set_negotiable(&mut self, value: bool) {
        self.negotiable = value;
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        add_label(&mut self.tags, tag)
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn add_skill(&mut self, skill: &str) -> bool {
        add_label(&mut self.skills, skill)
    }

    pub fn remove_skill(&mut self, skill: &str) {
        self.skills.retain(|s| s != skill);
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    pub fn employment_types(&self) -> &EmploymentTypeSelection {
        &self.employment_types
    }

    pub fn toggle_employment_type(&mut self, kind: EmploymentType) -> bool {
        self.employment_types.toggle(kind)
    }

    /// Assembles the create request. Validation is left to the server.
    pub fn to_payload(&self) -> CreateJobPayload {
        CreateJobPayload {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            location: Some(LocationInput::Structured(self.location.clone())),
            salary: Some(self.salary),
            job_type: Some(JobTypeInput::Many(self.employment_types.selected())),
            tags: Some(self.tags.clone()),
            skills: Some(self.skills.clone()),
            salary_type: Some(self.salary_type),
            negotiable: Some(self.negotiable),
        }
    }
}

fn add_label(list: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || list.iter().any(|existing| existing == value) {
        return false;
    }
    list.push(value.to_string());
    true
}
