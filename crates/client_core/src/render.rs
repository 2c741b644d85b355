//! Projection of advice responses into display sections.
//!
//! A section is produced only when its root is present in the response;
//! inside a section, absent or empty lists produce no block. Nothing here
//! emits placeholders for missing data.

use std::fmt;

use shared::protocol::{
    FinancialAdvice, FinancialStrategyResponse, PaymentMethodAdvice, ProductAdvice,
    ProductAdviceResponse, ProductChoice, Scalar,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    OptimizationStrategy,
    PotentialSavings,
    ActionSteps,
    RiskAssessment,
    Suggestions,
    RecommendedProducts,
    Alternatives,
    FinancialAnalysis,
    MarketInsights,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::OptimizationStrategy => "Optimization Strategy",
            Self::PotentialSavings => "Potential Savings",
            Self::ActionSteps => "Action Steps",
            Self::RiskAssessment => "Risk Assessment",
            Self::Suggestions => "Suggestions",
            Self::RecommendedProducts => "Recommended Products",
            Self::Alternatives => "Alternatives",
            Self::FinancialAnalysis => "Financial Analysis",
            Self::MarketInsights => "Market & Financial Insights",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    Bulleted,
    Numbered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(String),
    Field {
        label: &'static str,
        value: String,
    },
    List {
        label: Option<&'static str>,
        style: ListStyle,
        items: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSection {
    pub kind: SectionKind,
    pub blocks: Vec<Block>,
}

impl RenderedSection {
    fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            blocks: Vec::new(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    fn heading(&mut self, value: Option<&Scalar>) {
        if let Some(value) = value {
            self.blocks.push(Block::Heading(value.to_string()));
        }
    }

    fn field(&mut self, label: &'static str, value: Option<String>) {
        if let Some(value) = value {
            self.blocks.push(Block::Field { label, value });
        }
    }

    fn list(&mut self, label: Option<&'static str>, style: ListStyle, items: Option<&Vec<Scalar>>) {
        let Some(items) = items.filter(|items| !items.is_empty()) else {
            return;
        };
        self.blocks.push(Block::List {
            label,
            style,
            items: items.iter().map(Scalar::to_string).collect(),
        });
    }
}

impl fmt::Display for RenderedSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title())?;
        for block in &self.blocks {
            match block {
                Block::Heading(text) => writeln!(f, "{text}")?,
                Block::Field { label, value } => writeln!(f, "{label}: {value}")?,
                Block::List {
                    label,
                    style,
                    items,
                } => {
                    if let Some(label) = label {
                        writeln!(f, "{label}:")?;
                    }
                    for (idx, item) in items.iter().enumerate() {
                        match style {
                            ListStyle::Bulleted => writeln!(f, "  - {item}")?,
                            ListStyle::Numbered => writeln!(f, "  {}. {item}", idx + 1)?,
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Something that can be shown as a sequence of advice sections.
pub trait Render {
    fn sections(&self) -> Vec<RenderedSection>;
}

impl<T: Render> Render for Option<T> {
    fn sections(&self) -> Vec<RenderedSection> {
        self.as_ref().map(Render::sections).unwrap_or_default()
    }
}

pub fn render_text(sections: &[RenderedSection]) -> String {
    sections
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_rupees(amount: &Scalar) -> String {
    format!("₹{amount}")
}

/// `0.254` becomes `25.4%`.
pub fn format_fraction_percent(fraction: &Scalar) -> Option<String> {
    fraction
        .as_f64()
        .map(|value| format!("{:.1}%", value * 100.0))
}

fn format_method(method: &PaymentMethodAdvice) -> Option<String> {
    match (&method.platform, &method.percentage) {
        (Some(platform), Some(percentage)) => Some(format!("{platform} ({percentage}%)")),
        (Some(platform), None) => Some(platform.to_string()),
        (None, Some(percentage)) => Some(format!("{percentage}%")),
        (None, None) => None,
    }
}

impl Render for FinancialStrategyResponse {
    fn sections(&self) -> Vec<RenderedSection> {
        self.advice.sections()
    }
}

impl Render for FinancialAdvice {
    fn sections(&self) -> Vec<RenderedSection> {
        let mut sections = Vec::new();

        if let Some(strategy) = &self.optimization_strategy {
            let mut section = RenderedSection::new(SectionKind::OptimizationStrategy);
            if let Some(primary) = &strategy.primary_method {
                section.field("Primary Method", format_method(primary));
                section.field(
                    "Bank Details",
                    primary.bank_details.as_ref().map(Scalar::to_string),
                );
            }
            if let Some(secondary) = &strategy.secondary_method {
                section.field("Secondary Method", format_method(secondary));
                section.list(
                    Some("Advantages"),
                    ListStyle::Bulleted,
                    secondary.advantages.as_ref(),
                );
            }
            sections.push(section);
        }

        if let Some(savings) = &self.potential_savings {
            let mut section = RenderedSection::new(SectionKind::PotentialSavings);
            section.field("Total", savings.total.as_ref().map(Scalar::to_string));
            section.list(
                Some("Breakdown"),
                ListStyle::Bulleted,
                savings.breakdown.as_ref(),
            );
            sections.push(section);
        }

        if self.action_steps.as_ref().is_some_and(|steps| !steps.is_empty()) {
            let mut section = RenderedSection::new(SectionKind::ActionSteps);
            section.list(None, ListStyle::Numbered, self.action_steps.as_ref());
            sections.push(section);
        }

        if let Some(risk) = &self.risk_assessment {
            let mut section = RenderedSection::new(SectionKind::RiskAssessment);
            section.field(
                "Credit Score Impact",
                risk.credit_score_impact.as_ref().map(Scalar::to_string),
            );
            section.list(
                Some("Financial Risks"),
                ListStyle::Bulleted,
                risk.financial_risks.as_ref(),
            );
            sections.push(section);
        }

        let specific = self
            .suggestions
            .as_ref()
            .and_then(|s| s.specific_scenario.as_ref());
        let contextual = self
            .contextual_recommendations
            .as_ref()
            .and_then(|s| s.specific_scenario.as_ref());
        if specific.is_some() || contextual.is_some() {
            let mut section = RenderedSection::new(SectionKind::Suggestions);
            section.list(Some("Specific Recommendations"), ListStyle::Bulleted, specific);
            section.list(
                Some("Additional Recommendations"),
                ListStyle::Bulleted,
                contextual,
            );
            sections.push(section);
        }

        sections
    }
}

impl Render for ProductAdviceResponse {
    fn sections(&self) -> Vec<RenderedSection> {
        self.advice.sections()
    }
}

fn push_choice(section: &mut RenderedSection, choice: &ProductChoice) {
    section.heading(choice.name.as_ref());
    section.field("Price", choice.price.as_ref().map(format_rupees));
}

impl Render for ProductAdvice {
    fn sections(&self) -> Vec<RenderedSection> {
        let mut sections = Vec::new();
        let recommendations = self.product_recommendations.as_ref();

        if let Some(primary) = recommendations.and_then(|r| r.primary_choice.as_ref()) {
            let mut section = RenderedSection::new(SectionKind::RecommendedProducts);
            push_choice(&mut section, primary);
            section.list(
                Some("Specifications"),
                ListStyle::Bulleted,
                primary.specifications.as_ref(),
            );
            section.list(
                Some("Reasons to Buy"),
                ListStyle::Bulleted,
                primary.reasons_to_buy.as_ref(),
            );
            sections.push(section);
        }

        if let Some(alternatives) = recommendations
            .and_then(|r| r.alternatives.as_ref())
            .filter(|alternatives| !alternatives.is_empty())
        {
            let mut section = RenderedSection::new(SectionKind::Alternatives);
            for alternative in alternatives {
                push_choice(&mut section, alternative);
                section.list(
                    Some("Key Differences"),
                    ListStyle::Bulleted,
                    alternative.key_differences.as_ref(),
                );
            }
            sections.push(section);
        }

        if let Some(analysis) = &self.financial_analysis {
            let mut section = RenderedSection::new(SectionKind::FinancialAnalysis);
            section.field(
                "Affordability Score",
                analysis.affordability_score.as_ref().map(Scalar::to_string),
            );
            if let Some(impact) = &analysis.monthly_impact {
                section.field(
                    "Monthly Impact",
                    impact.percentage.as_ref().and_then(format_fraction_percent),
                );
                section.field(
                    "Sustainable for",
                    impact.sustainability_period.as_ref().map(Scalar::to_string),
                );
            }
            section.list(
                Some("Savings Suggestions"),
                ListStyle::Bulleted,
                analysis.savings_suggestions.as_ref(),
            );
            section.list(
                Some("Budgeting Tips"),
                ListStyle::Bulleted,
                analysis.budgeting_tips.as_ref(),
            );
            sections.push(section);
        }

        if self.market_insights.is_some() || self.financial_advice.is_some() {
            let mut section = RenderedSection::new(SectionKind::MarketInsights);
            if let Some(insights) = &self.market_insights {
                if let Some(history) = &insights.price_history {
                    section.field("Price Trend", history.trend.as_ref().map(Scalar::to_string));
                    section.field(
                        "Best time to buy",
                        history.best_time_to_buy.as_ref().map(Scalar::to_string),
                    );
                }
                section.list(
                    Some("Future Considerations"),
                    ListStyle::Bulleted,
                    insights.future_considerations.as_ref(),
                );
            }
            if let Some(advice) = &self.financial_advice {
                section.list(
                    Some("Immediate Steps"),
                    ListStyle::Numbered,
                    advice.immediate_steps.as_ref(),
                );
                section.list(
                    Some("Risks to Consider"),
                    ListStyle::Bulleted,
                    advice.risks_to_consider.as_ref(),
                );
            }
            sections.push(section);
        }

        sections
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
