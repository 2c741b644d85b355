use std::sync::Arc;

use serde_json::json;
use shared::{
    domain::{AdviceKind, ProductStep},
    error::ValidationError,
    protocol::ProductAdviceResponse,
};
use tracing::{info, warn};

use super::FormSubmitOutcome;
use crate::{
    form::{FormController, FormModel},
    render::{Render, RenderedSection},
    submission::{SubmissionPipeline, SubmissionState, SubmitOutcome},
    transport::{AdviceTransport, RequestBody},
};

pub const PRODUCT_REQUIRED_FIELDS: [&str; 3] = ["budget", "productType", "location"];

pub fn default_product_model() -> FormModel {
    FormModel::from_value(json!({
        "budget": "",
        "monthlyIncome": "",
        "productType": "",
        "productName": "",
        "location": "",
        "additionalDetails": "",
        "preferredBrands": []
    }))
}

/// Three-step wizard: financial details, product details, recommendations.
pub struct ProductAdvisorScreen {
    form: FormController<ProductStep>,
    pipeline: Arc<SubmissionPipeline<ProductAdviceResponse>>,
    validation_errors: Vec<ValidationError>,
}

impl ProductAdvisorScreen {
    pub fn new(transport: Arc<dyn AdviceTransport>) -> Self {
        Self {
            form: FormController::new(default_product_model()),
            pipeline: Arc::new(SubmissionPipeline::new(AdviceKind::ProductAdvice, transport)),
            validation_errors: Vec::new(),
        }
    }

    pub fn form(&self) -> &FormController<ProductStep> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController<ProductStep> {
        &mut self.form
    }

    pub fn pipeline(&self) -> Arc<SubmissionPipeline<ProductAdviceResponse>> {
        Arc::clone(&self.pipeline)
    }

    pub fn step(&self) -> ProductStep {
        self.form.active_section()
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        &self.validation_errors
    }

    pub fn continue_to_product_details(&mut self) {
        self.form.set_active_section(ProductStep::ProductDetails);
    }

    pub fn back(&mut self) {
        if self.step() == ProductStep::ProductDetails {
            self.form.set_active_section(ProductStep::FinancialDetails);
        }
    }

    pub async fn submit(&mut self) -> FormSubmitOutcome<ProductAdviceResponse> {
        let errors = self.form.validate_required(&PRODUCT_REQUIRED_FIELDS);
        if !errors.is_empty() {
            warn!(
                missing = ?errors.iter().map(|e| e.field.as_str()).collect::<Vec<_>>(),
                "product form is incomplete"
            );
            self.validation_errors = errors.clone();
            return FormSubmitOutcome::Invalid(errors);
        }
        self.validation_errors.clear();

        let body = RequestBody::Json(self.form.model().to_json());
        let outcome = self.pipeline.submit(body).await;
        if matches!(outcome, SubmitOutcome::Succeeded(_)) {
            self.form.set_active_section(ProductStep::Recommendations);
        }
        FormSubmitOutcome::Submitted(outcome)
    }

    pub async fn state(&self) -> SubmissionState<ProductAdviceResponse> {
        self.pipeline.state().await
    }

    pub async fn rendered_advice(&self) -> Vec<RenderedSection> {
        self.pipeline.response().await.sections()
    }

    /// Back to step one with an empty form and no advice.
    pub async fn start_new_search(&mut self) {
        info!("starting a new product search");
        self.form.reset();
        self.validation_errors.clear();
        self.pipeline.reset().await;
    }
}
