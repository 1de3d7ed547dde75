//! Per-step validation rules for the requirement form
//!
//! Each step only looks at the fields it owns, so editing a field on one
//! step never changes the verdict for another.

use super::form_data::{Category, RequirementFormData};
use std::collections::BTreeMap;
use std::fmt;

/// Field name to error message, keyed by the camelCase wire name
pub type StepErrors = BTreeMap<String, String>;

/// Budget above which an approval matrix must be chosen
pub const APPROVAL_BUDGET_THRESHOLD: f64 = 10_000.0;

/// Key used when validation itself could not run
pub const GENERAL_ERROR_KEY: &str = "general";

/// Message paired with [`GENERAL_ERROR_KEY`]
pub const GENERAL_ERROR_MESSAGE: &str = "Validation failed";

/// One page of the requirement authoring form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    BasicInfo = 1,
    Details = 2,
    Documents = 3,
    ApprovalWorkflow = 4,
    Preview = 5,
    Publish = 6,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::BasicInfo,
        Step::Details,
        Step::Documents,
        Step::ApprovalWorkflow,
        Step::Preview,
        Step::Publish,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic Info",
            Self::Details => "Details",
            Self::Documents => "Documents",
            Self::ApprovalWorkflow => "Approval Workflow",
            Self::Preview => "Preview",
            Self::Publish => "Publish",
        }
    }
}

/// Returned when a step number outside 1..=6 is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown form step {0}")]
pub struct UnknownStep(pub u8);

impl TryFrom<u8> for Step {
    type Error = UnknownStep;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Step::ALL
            .into_iter()
            .find(|s| s.number() == value)
            .ok_or(UnknownStep(value))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.label())
    }
}

/// Compute the errors for a step number. An unknown step yields the single
/// generic entry instead of failing.
pub fn validate_step_number(form: &RequirementFormData, step: u8) -> StepErrors {
    match Step::try_from(step) {
        Ok(step) => validate_step(form, step),
        Err(err) => {
            tracing::warn!("Validation error: {err}");
            general_error()
        }
    }
}

/// Compute the errors for a step. An empty map means the step is valid.
pub fn validate_step(form: &RequirementFormData, step: Step) -> StepErrors {
    let mut errors = StepErrors::new();
    match step {
        Step::BasicInfo => basic_info(form, &mut errors),
        Step::Details => details(form, &mut errors),
        Step::Documents | Step::Preview => {}
        Step::ApprovalWorkflow => approval_workflow(form, &mut errors),
        Step::Publish => publish(form, &mut errors),
    }
    errors
}

/// Whether the approval step requires a matrix selection
pub fn requires_approval_matrix(form: &RequirementFormData) -> bool {
    form.budget() > APPROVAL_BUDGET_THRESHOLD
        || form.priority.is_some_and(|p| p.needs_approval())
        || form.compliance_required
}

pub(crate) fn general_error() -> StepErrors {
    StepErrors::from([(
        GENERAL_ERROR_KEY.to_string(),
        GENERAL_ERROR_MESSAGE.to_string(),
    )])
}

/// A present, finite number above zero
fn is_positive(value: Option<f64>) -> bool {
    value.is_some_and(|v| v.is_finite() && v > 0.0)
}

fn require_text(errors: &mut StepErrors, key: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(key.to_string(), message.to_string());
    }
}

fn basic_info(form: &RequirementFormData, errors: &mut StepErrors) {
    require_text(errors, "title", &form.title, "Title is required");
    if form.category.is_empty() {
        errors.insert(
            "category".to_string(),
            "Select at least one category".to_string(),
        );
    }
    if form.priority.is_none() {
        errors.insert("priority".to_string(), "Priority is required".to_string());
    }
    require_text(
        errors,
        "businessJustification",
        &form.business_justification,
        "Business justification is required",
    );
    require_text(errors, "department", &form.department, "Department is required");
    require_text(errors, "costCenter", &form.cost_center, "Cost center is required");
    if !is_positive(form.estimated_budget) {
        errors.insert(
            "estimatedBudget".to_string(),
            "Estimated budget must be greater than 0".to_string(),
        );
    }
}

fn details(form: &RequirementFormData, errors: &mut StepErrors) {
    if form.has_category(Category::Expert) {
        let expert = form.expert.clone().unwrap_or_default();
        if expert.specialization.iter().all(|s| s.trim().is_empty()) {
            errors.insert(
                "specialization".to_string(),
                "Select at least one specialization".to_string(),
            );
        }
        require_text(errors, "description", &form.description, "Description is required");
    }

    if form.has_category(Category::Product) {
        let product = form.product.clone().unwrap_or_default();
        require_text(
            errors,
            "productSpecifications",
            &product.product_specifications,
            "Product specifications are required",
        );
        if !is_positive(product.quantity) {
            errors.insert(
                "quantity".to_string(),
                "Quantity must be greater than 0".to_string(),
            );
        }
    }

    if form.has_category(Category::Service) {
        let service = form.service.clone().unwrap_or_default();
        require_text(
            errors,
            "serviceDescription",
            &service.service_description,
            "Service description is required",
        );
        require_text(
            errors,
            "scopeOfWork",
            &service.scope_of_work,
            "Scope of work is required",
        );
        require_text(
            errors,
            "performanceMetrics",
            &service.performance_metrics,
            "Performance metrics are required",
        );
        require_text(errors, "location", &service.location, "Location is required");
    }

    if form.has_category(Category::Logistics) {
        let logistics = form.logistics.clone().unwrap_or_default();
        require_text(
            errors,
            "equipmentType",
            &logistics.equipment_type,
            "Equipment type is required",
        );
        require_text(
            errors,
            "pickupLocation",
            &logistics.pickup_location,
            "Pickup location is required",
        );
        require_text(
            errors,
            "deliveryLocation",
            &logistics.delivery_location,
            "Delivery location is required",
        );
    }
}

fn approval_workflow(form: &RequirementFormData, errors: &mut StepErrors) {
    let selected = form
        .selected_approval_matrix_id
        .as_deref()
        .is_some_and(|id| !id.trim().is_empty());
    if requires_approval_matrix(form) && !selected {
        errors.insert(
            "selectedApprovalMatrixId".to_string(),
            "Select an approval matrix for this requirement".to_string(),
        );
    }
}

fn publish(form: &RequirementFormData, errors: &mut StepErrors) {
    if form.submission_deadline.is_none() {
        errors.insert(
            "submissionDeadline".to_string(),
            "Submission deadline is required".to_string(),
        );
    }
    if form.evaluation_criteria.iter().all(|c| c.trim().is_empty()) {
        errors.insert(
            "evaluationCriteria".to_string(),
            "Add at least one evaluation criterion".to_string(),
        );
    }
    if !form.terms_accepted {
        errors.insert(
            "termsAccepted".to_string(),
            "You must accept the terms and conditions".to_string(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::form_data::{
        ExpertDetails, LogisticsDetails, Priority, ProductDetails, ServiceDetails,
    };
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn basic_form() -> RequirementFormData {
        RequirementFormData {
            title: "Pump procurement".to_string(),
            category: [Category::Product].into(),
            priority: Some(Priority::High),
            business_justification: "Line 3 pump failed".to_string(),
            department: "Maintenance".to_string(),
            cost_center: "CC-410".to_string(),
            estimated_budget: Some(50_000.0),
            ..Default::default()
        }
    }

    fn keys(errors: &StepErrors) -> Vec<&str> {
        errors.keys().map(String::as_str).collect()
    }

    mod step_numbers {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_try_from_valid_numbers() {
            for n in 1..=6u8 {
                assert_eq!(Step::try_from(n).unwrap().number(), n);
            }
        }

        #[test]
        fn test_try_from_out_of_range() {
            assert_eq!(Step::try_from(0), Err(UnknownStep(0)));
            assert_eq!(Step::try_from(7), Err(UnknownStep(7)));
        }

        #[test]
        fn test_unknown_step_reports_general_error() {
            let errors = validate_step_number(&basic_form(), 9);
            assert_eq!(keys(&errors), vec![GENERAL_ERROR_KEY]);
            assert_eq!(errors[GENERAL_ERROR_KEY], GENERAL_ERROR_MESSAGE);
        }

        #[test]
        fn test_display() {
            assert_eq!(Step::ApprovalWorkflow.to_string(), "4 (Approval Workflow)");
        }
    }

    mod basic_info {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_complete_basic_info_is_valid() {
            assert!(validate_step(&basic_form(), Step::BasicInfo).is_empty());
        }

        #[test]
        fn test_empty_form_reports_every_field() {
            let errors = validate_step(&RequirementFormData::default(), Step::BasicInfo);
            assert_eq!(
                keys(&errors),
                vec![
                    "businessJustification",
                    "category",
                    "costCenter",
                    "department",
                    "estimatedBudget",
                    "priority",
                    "title",
                ]
            );
        }

        #[test]
        fn test_whitespace_title_rejected() {
            let mut form = basic_form();
            form.title = "   ".to_string();
            assert_eq!(keys(&validate_step(&form, Step::BasicInfo)), vec!["title"]);
        }

        #[test]
        fn test_zero_and_negative_budget_rejected() {
            let mut form = basic_form();
            form.estimated_budget = Some(0.0);
            assert!(validate_step(&form, Step::BasicInfo).contains_key("estimatedBudget"));
            form.estimated_budget = Some(-5.0);
            assert!(validate_step(&form, Step::BasicInfo).contains_key("estimatedBudget"));
        }

        #[test]
        fn test_non_finite_budget_rejected() {
            let mut form = basic_form();
            for budget in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
                form.estimated_budget = Some(budget);
                assert_eq!(
                    keys(&validate_step(&form, Step::BasicInfo)),
                    vec!["estimatedBudget"],
                    "budget {budget} should be rejected"
                );
            }
        }
    }

    mod details {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_product_missing_quantity() {
            let mut form = basic_form();
            form.product = Some(ProductDetails {
                product_specifications: "Centrifugal pump".to_string(),
                quantity: None,
                ..Default::default()
            });
            assert_eq!(keys(&validate_step(&form, Step::Details)), vec!["quantity"]);
        }

        #[test]
        fn test_product_zero_quantity() {
            let mut form = basic_form();
            form.product = Some(ProductDetails {
                product_specifications: "Centrifugal pump".to_string(),
                quantity: Some(0.0),
                ..Default::default()
            });
            assert_eq!(keys(&validate_step(&form, Step::Details)), vec!["quantity"]);
        }

        #[test]
        fn test_negative_quantity_decodes_and_fails_details() {
            let form: RequirementFormData = serde_json::from_str(
                r#"{
                    "category": ["product"],
                    "product": { "productSpecifications": "Centrifugal pump", "quantity": -1 }
                }"#,
            )
            .unwrap();
            assert_eq!(form.product.as_ref().and_then(|p| p.quantity), Some(-1.0));
            assert_eq!(keys(&validate_step(&form, Step::Details)), vec!["quantity"]);
        }

        #[test]
        fn test_product_quantity_one_passes() {
            let mut form = basic_form();
            form.product = Some(ProductDetails {
                product_specifications: "Centrifugal pump".to_string(),
                quantity: Some(1.0),
                ..Default::default()
            });
            assert!(validate_step(&form, Step::Details).is_empty());
        }

        #[test]
        fn test_missing_product_payload_reports_both_fields() {
            let form = basic_form();
            assert_eq!(
                keys(&validate_step(&form, Step::Details)),
                vec!["productSpecifications", "quantity"]
            );
        }

        #[test]
        fn test_absent_categories_contribute_nothing() {
            let mut form = basic_form();
            form.category = [Category::Logistics].into();
            form.logistics = Some(LogisticsDetails {
                equipment_type: "Flatbed".to_string(),
                pickup_location: "Port A".to_string(),
                delivery_location: "Plant 2".to_string(),
                ..Default::default()
            });
            // product payload missing, but product is not selected
            assert!(validate_step(&form, Step::Details).is_empty());
        }

        #[test]
        fn test_no_category_is_valid_for_details() {
            let form = RequirementFormData::default();
            assert!(validate_step(&form, Step::Details).is_empty());
        }

        #[test]
        fn test_service_fields() {
            let mut form = basic_form();
            form.category = [Category::Service].into();
            form.service = Some(ServiceDetails {
                service_description: "Quarterly HVAC maintenance".to_string(),
                scope_of_work: "All rooftop units".to_string(),
                ..Default::default()
            });
            assert_eq!(
                keys(&validate_step(&form, Step::Details)),
                vec!["location", "performanceMetrics"]
            );
        }

        #[test]
        fn test_expert_requires_specialization_and_description() {
            let mut form = basic_form();
            form.category = [Category::Expert].into();
            assert_eq!(
                keys(&validate_step(&form, Step::Details)),
                vec!["description", "specialization"]
            );

            form.description = "Audit the cooling loop design".to_string();
            form.expert = Some(ExpertDetails {
                specialization: ["Thermal engineering".to_string()].into(),
                ..Default::default()
            });
            assert!(validate_step(&form, Step::Details).is_empty());
        }

        #[test]
        fn test_multiple_categories_combine_errors() {
            let mut form = basic_form();
            form.category = [Category::Product, Category::Logistics].into();
            form.product = Some(ProductDetails {
                product_specifications: "Pump".to_string(),
                quantity: Some(3.0),
                ..Default::default()
            });
            assert_eq!(
                keys(&validate_step(&form, Step::Details)),
                vec!["deliveryLocation", "equipmentType", "pickupLocation"]
            );
        }
    }

    mod approval_workflow {
        use super::*;
        use pretty_assertions::assert_eq;

        fn low_budget_form() -> RequirementFormData {
            RequirementFormData {
                estimated_budget: Some(5_000.0),
                priority: Some(Priority::Low),
                compliance_required: false,
                ..Default::default()
            }
        }

        #[test]
        fn test_small_low_priority_needs_no_matrix() {
            assert!(validate_step(&low_budget_form(), Step::ApprovalWorkflow).is_empty());
        }

        #[test]
        fn test_critical_priority_needs_matrix() {
            let mut form = low_budget_form();
            form.priority = Some(Priority::Critical);
            assert_eq!(
                keys(&validate_step(&form, Step::ApprovalWorkflow)),
                vec!["selectedApprovalMatrixId"]
            );
            form.selected_approval_matrix_id = Some("matrix-7".to_string());
            assert!(validate_step(&form, Step::ApprovalWorkflow).is_empty());
        }

        #[test]
        fn test_budget_threshold_is_exclusive() {
            let mut form = low_budget_form();
            form.estimated_budget = Some(APPROVAL_BUDGET_THRESHOLD);
            assert!(validate_step(&form, Step::ApprovalWorkflow).is_empty());
            form.estimated_budget = Some(APPROVAL_BUDGET_THRESHOLD + 0.01);
            assert!(!validate_step(&form, Step::ApprovalWorkflow).is_empty());
        }

        #[test]
        fn test_compliance_needs_matrix() {
            let mut form = low_budget_form();
            form.compliance_required = true;
            assert!(requires_approval_matrix(&form));
        }

        #[test]
        fn test_blank_matrix_id_counts_as_unselected() {
            let mut form = low_budget_form();
            form.compliance_required = true;
            form.selected_approval_matrix_id = Some("  ".to_string());
            assert!(!validate_step(&form, Step::ApprovalWorkflow).is_empty());
        }
    }

    mod publish {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_publish_requirements() {
            let mut form = RequirementFormData::default();
            assert_eq!(
                keys(&validate_step(&form, Step::Publish)),
                vec!["evaluationCriteria", "submissionDeadline", "termsAccepted"]
            );

            form.submission_deadline = NaiveDate::from_ymd_opt(2026, 11, 30);
            form.evaluation_criteria = vec!["Price".to_string()];
            form.terms_accepted = true;
            assert!(validate_step(&form, Step::Publish).is_empty());
        }

        #[test]
        fn test_documents_and_preview_always_valid() {
            let form = RequirementFormData::default();
            assert!(validate_step(&form, Step::Documents).is_empty());
            assert!(validate_step(&form, Step::Preview).is_empty());
        }
    }

    #[test]
    fn test_irrelevant_field_does_not_change_step_result() {
        let form = basic_form();
        let before = validate_step(&form, Step::BasicInfo);

        let mut changed = form.clone();
        changed.terms_accepted = true;
        changed.evaluation_criteria = vec!["Delivery time".to_string()];
        changed.selected_approval_matrix_id = Some("matrix-1".to_string());
        changed.documents = vec!["spec.pdf".to_string()];

        assert_eq!(validate_step(&changed, Step::BasicInfo), before);
    }

    #[test]
    fn test_details_ignore_fields_of_other_steps() {
        let mut form = basic_form();
        form.product = Some(ProductDetails {
            product_specifications: "Centrifugal pump".to_string(),
            ..Default::default()
        });
        let before = validate_step(&form, Step::Details);
        assert_eq!(keys(&before), vec!["quantity"]);

        let mut changed = form.clone();
        changed.title = String::new();
        changed.estimated_budget = None;
        changed.terms_accepted = true;
        changed.selected_approval_matrix_id = Some("matrix-1".to_string());
        // payloads of unselected categories are not looked at
        changed.logistics = Some(LogisticsDetails::default());

        assert_eq!(validate_step(&changed, Step::Details), before);
    }

    #[test]
    fn test_approval_ignores_fields_of_other_steps() {
        let mut form = basic_form();
        form.selected_approval_matrix_id = None;
        let before = validate_step(&form, Step::ApprovalWorkflow);
        assert_eq!(keys(&before), vec!["selectedApprovalMatrixId"]);

        let mut changed = form.clone();
        changed.title = String::new();
        changed.cost_center = String::new();
        changed.product = None;
        changed.evaluation_criteria = vec!["Price".to_string()];
        changed.terms_accepted = true;

        assert_eq!(validate_step(&changed, Step::ApprovalWorkflow), before);
    }

    #[test]
    fn test_publish_ignores_fields_of_other_steps() {
        let mut form = basic_form();
        form.terms_accepted = true;
        let before = validate_step(&form, Step::Publish);
        assert_eq!(
            keys(&before),
            vec!["evaluationCriteria", "submissionDeadline"]
        );

        let mut changed = form.clone();
        changed.title = String::new();
        changed.priority = None;
        changed.compliance_required = true;
        changed.product = Some(ProductDetails::default());
        changed.documents = vec!["drawing.dwg".to_string()];

        assert_eq!(validate_step(&changed, Step::Publish), before);
    }
}
