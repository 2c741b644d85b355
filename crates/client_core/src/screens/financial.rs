use std::sync::Arc;

use serde_json::json;
use shared::{
    domain::{AdviceKind, FinancialSection, PaymentCategory},
    protocol::FinancialStrategyResponse,
};
use tracing::warn;

use super::FormSubmitOutcome;
use crate::{
    form::{FormController, FormModel},
    render::{Render, RenderedSection},
    submission::{SubmissionPipeline, SubmissionState},
    transport::{AdviceTransport, RequestBody},
};

pub const FINANCIAL_REQUIRED_FIELDS: [&str; 2] = ["purchaseType", "totalBudget"];

pub fn default_financial_model() -> FormModel {
    FormModel::from_value(json!({
        "purchaseType": "electronics",
        "totalBudget": "",
        "location": "",
        "context": {
            "vehicleDetails": { "type": "", "brand": "", "preferredSegment": "" },
            "realEstateDetails": { "type": "", "propertyType": "", "preferredLocalities": [] },
            "productDetails": { "category": "", "specificRequirements": [] }
        },
        "paymentPreferences": {
            "creditCards": [],
            "debitCards": [],
            "upiOptions": [],
            "netBanking": [],
            "emiOptions": ""
        },
        "financialPreferences": { "creditScore": "", "monthlyIncome": "" },
        "history": [],
        "settings": { "notifications": true, "darkMode": false, "language": "en" }
    }))
}

/// Sectioned purchase/payment/financial form posting to the strategy endpoint.
pub struct FinancialAdvisorScreen {
    form: FormController<FinancialSection>,
    pipeline: Arc<SubmissionPipeline<FinancialStrategyResponse>>,
}

impl FinancialAdvisorScreen {
    pub fn new(transport: Arc<dyn AdviceTransport>) -> Self {
        Self {
            form: FormController::new(default_financial_model()),
            pipeline: Arc::new(SubmissionPipeline::new(
                AdviceKind::FinancialStrategy,
                transport,
            )),
        }
    }

    pub fn form(&self) -> &FormController<FinancialSection> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController<FinancialSection> {
        &mut self.form
    }

    pub fn pipeline(&self) -> Arc<SubmissionPipeline<FinancialStrategyResponse>> {
        Arc::clone(&self.pipeline)
    }

    pub fn payment_path(category: PaymentCategory) -> String {
        format!("paymentPreferences.{}", category.key())
    }

    /// Toggles a payment option. Ids outside the catalog are still recorded.
    pub fn toggle_payment_option(&mut self, category: PaymentCategory, id: &str) -> bool {
        if !category.contains_option(id) {
            warn!(category = category.key(), id, "payment option is not in the catalog");
        }
        self.form
            .toggle_set_member(&Self::payment_path(category), id)
    }

    pub fn selected_payment_options(&self, category: PaymentCategory) -> Vec<String> {
        self.form
            .model()
            .set_members(&Self::payment_path(category))
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// `None` clears the EMI preference.
    pub fn set_emi_duration(&mut self, months: Option<u8>) {
        let value = months.map(|m| m.to_string()).unwrap_or_default();
        self.form.update_field("paymentPreferences.emiOptions", value);
    }

    pub fn toggle_notifications(&mut self) -> bool {
        self.form.toggle_flag("settings.notifications")
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.form.toggle_flag("settings.darkMode")
    }

    pub async fn submit(&mut self) -> FormSubmitOutcome<FinancialStrategyResponse> {
        let errors = self.form.validate_required(&FINANCIAL_REQUIRED_FIELDS);
        if !errors.is_empty() {
            warn!(missing = errors.len(), "financial form is incomplete");
            return FormSubmitOutcome::Invalid(errors);
        }
        let body = RequestBody::Json(self.form.model().to_json());
        FormSubmitOutcome::Submitted(self.pipeline.submit(body).await)
    }

    pub async fn state(&self) -> SubmissionState<FinancialStrategyResponse> {
        self.pipeline.state().await
    }

    pub async fn rendered_advice(&self) -> Vec<RenderedSection> {
        self.pipeline.response().await.sections()
    }

    /// Leaving the screen discards the model and any advice.
    pub async fn reset(&mut self) {
        self.form.reset();
        self.pipeline.reset().await;
    }
}
