//! Requirement form data model
//!
//! Mirrors the wire format of the remote draft API (camelCase JSON). Every
//! field is defaulted so a partially filled draft deserializes cleanly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Procurement category. A requirement may span several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Expert,
    Product,
    Service,
    Logistics,
}

/// Requirement priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// High and critical requests always go through an approval matrix
    pub fn needs_approval(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// Lifecycle status of a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementStatus {
    #[default]
    Draft,
    Rejected,
    Approved,
    Published,
    Archived,
}

/// Who can see a published requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
    Invited,
}

/// Fields used when the requirement includes [`Category::Product`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDetails {
    pub product_specifications: String,
    pub quantity: Option<f64>,
    pub unit_of_measure: String,
    pub technical_standards: Vec<String>,
}

/// Fields used when the requirement includes [`Category::Service`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceDetails {
    pub service_description: String,
    pub scope_of_work: String,
    pub performance_metrics: String,
    pub location: String,
    pub duration: String,
}

/// Fields used when the requirement includes [`Category::Logistics`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogisticsDetails {
    pub equipment_type: String,
    pub pickup_location: String,
    pub delivery_location: String,
    pub weight: Option<f64>,
    pub special_handling: String,
}

/// Fields used when the requirement includes [`Category::Expert`].
/// The expert description itself is the top-level `description`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpertDetails {
    pub specialization: BTreeSet<String>,
    pub years_of_experience: Option<u32>,
    pub certifications: Vec<String>,
}

/// The in-progress requirement being authored
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequirementFormData {
    // Identity and classification
    pub title: String,
    pub description: String,
    pub category: BTreeSet<Category>,
    pub priority: Option<Priority>,
    pub business_justification: String,
    pub department: String,
    pub cost_center: String,

    // Financial
    pub estimated_budget: Option<f64>,
    pub budget_approved: bool,
    pub compliance_required: bool,

    // Category payloads
    pub product: Option<ProductDetails>,
    pub service: Option<ServiceDetails>,
    pub logistics: Option<LogisticsDetails>,
    pub expert: Option<ExpertDetails>,

    pub documents: Vec<String>,

    // Workflow and publishing
    pub submission_deadline: Option<NaiveDate>,
    pub evaluation_criteria: Vec<String>,
    pub terms_accepted: bool,
    pub visibility: Visibility,

    // Process state
    pub status: RequirementStatus,
    pub is_sent_for_approval: bool,
    pub selected_approval_matrix_id: Option<String>,
}

impl RequirementFormData {
    pub fn has_category(&self, category: Category) -> bool {
        self.category.contains(&category)
    }

    /// True when none of the fields a user would recognise as "content"
    /// carries a non-blank value. Such a form is never persisted.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
            && self.description.trim().is_empty()
            && self.business_justification.trim().is_empty()
            && self.category.is_empty()
            && self.priority.is_none()
    }

    /// Budget as a plain number, treating an unset budget as zero
    pub fn budget(&self) -> f64 {
        self.estimated_budget.unwrap_or(0.0)
    }
}
