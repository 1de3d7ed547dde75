//! Requirement form domain layer
//!
//! The form data model and the step validation rules that gate moving
//! through the authoring wizard.

mod form_data;
mod validation;

pub use form_data::{
    Category, ExpertDetails, LogisticsDetails, Priority, ProductDetails, RequirementFormData,
    RequirementStatus, ServiceDetails, Visibility,
};
pub use validation::{
    requires_approval_matrix, validate_step, validate_step_number, Step, StepErrors, UnknownStep,
    APPROVAL_BUDGET_THRESHOLD, GENERAL_ERROR_KEY, GENERAL_ERROR_MESSAGE,
};
