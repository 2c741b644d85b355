use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownNameError;

/// A mutually exclusive named view over a single form model.
pub trait Section: Copy + Eq + fmt::Debug + Default + Send + Sync + 'static {
    fn key(self) -> &'static str;
    fn title(self) -> &'static str;
    fn all() -> &'static [Self];
}

/// Declares a section enum; the first variant is the default.
macro_rules! section_enum {
    ($name:ident {
        $first:ident => ($first_key:literal, $first_title:literal)
        $(, $variant:ident => ($key:literal, $title:literal))* $(,)?
    }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            #[default]
            $first,
            $($variant,)*
        }

        impl Section for $name {
            fn key(self) -> &'static str {
                match self {
                    Self::$first => $first_key,
                    $(Self::$variant => $key,)*
                }
            }

            fn title(self) -> &'static str {
                match self {
                    Self::$first => $first_title,
                    $(Self::$variant => $title,)*
                }
            }

            fn all() -> &'static [Self] {
                &[Self::$first, $(Self::$variant,)*]
            }
        }

        impl FromStr for $name {
            type Err = UnknownNameError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Self::all()
                    .iter()
                    .copied()
                    .find(|section| section.key().eq_ignore_ascii_case(raw.trim()))
                    .ok_or_else(|| UnknownNameError::new(stringify!($name), raw))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.title())
            }
        }
    };
}

section_enum!(FinancialSection {
    Purchase => ("purchase", "Purchase Details"),
    Payment => ("payment", "Payment Preferences"),
    Financial => ("financial", "Financial Info"),
    History => ("history", "History"),
    Settings => ("settings", "Settings"),
});

section_enum!(ProductStep {
    FinancialDetails => ("financial", "Financial Details"),
    ProductDetails => ("product", "Product Details"),
    Recommendations => ("recommendations", "Recommendations"),
});

impl ProductStep {
    /// One-based position shown in the progress indicator.
    pub fn number(self) -> u8 {
        match self {
            Self::FinancialDetails => 1,
            Self::ProductDetails => 2,
            Self::Recommendations => 3,
        }
    }

    pub fn is_completed_before(self, current: ProductStep) -> bool {
        self.number() < current.number()
    }
}

/// The three advice flows offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceKind {
    FinancialStrategy,
    ProductAdvice,
    PdfAdvice,
}

impl AdviceKind {
    pub fn endpoint_path(self) -> &'static str {
        match self {
            Self::FinancialStrategy => "/api/advice/financial-strategy",
            Self::ProductAdvice => "/api/advice/product-advice",
            Self::PdfAdvice => "/api/advice/pdf-advice",
        }
    }
}

impl fmt::Display for AdviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FinancialStrategy => "financial strategy",
            Self::ProductAdvice => "product advice",
            Self::PdfAdvice => "document advice",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Route {
    #[default]
    FinancialAdvisor,
    SuggestionAdvisor,
    PdfAdvisor,
}

impl Route {
    pub const ALL: [Route; 3] = [
        Route::FinancialAdvisor,
        Route::SuggestionAdvisor,
        Route::PdfAdvisor,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::FinancialAdvisor => "/financial-advisor",
            Self::SuggestionAdvisor => "/suggestion-advisor",
            Self::PdfAdvisor => "/pdf-advisor",
        }
    }

    pub fn nav_label(self) -> &'static str {
        match self {
            Self::FinancialAdvisor => "Fintech Advisor",
            Self::SuggestionAdvisor => "Product Advisor",
            Self::PdfAdvisor => "PDF Advisor",
        }
    }

    /// Resolves a client-side path; `/` maps to the financial advisor.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Some(Route::default());
        }
        let normalized = trimmed.trim_end_matches('/');
        Self::ALL
            .into_iter()
            .find(|route| route.path() == normalized)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentOption {
    pub id: &'static str,
    pub name: &'static str,
}

const fn option(id: &'static str, name: &'static str) -> PaymentOption {
    PaymentOption { id, name }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentCategory {
    CreditCards,
    DebitCards,
    UpiOptions,
    NetBanking,
}

impl PaymentCategory {
    pub const ALL: [PaymentCategory; 4] = [
        PaymentCategory::CreditCards,
        PaymentCategory::DebitCards,
        PaymentCategory::UpiOptions,
        PaymentCategory::NetBanking,
    ];

    /// Key of the set inside `paymentPreferences`.
    pub fn key(self) -> &'static str {
        match self {
            Self::CreditCards => "creditCards",
            Self::DebitCards => "debitCards",
            Self::UpiOptions => "upiOptions",
            Self::NetBanking => "netBanking",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CreditCards => "Credit Cards",
            Self::DebitCards => "Debit Cards",
            Self::UpiOptions => "UPI Options",
            Self::NetBanking => "Net Banking",
        }
    }

    pub fn options(self) -> &'static [PaymentOption] {
        match self {
            Self::CreditCards => {
                const {
                    &[
                        option("hdfc_credit", "HDFC"),
                        option("sbi_credit", "SBI"),
                        option("icici_credit", "ICICI"),
                        option("axis_credit", "Axis"),
                        option("kotak_credit", "Kotak"),
                    ]
                }
            }
            Self::DebitCards => {
                const {
                    &[
                        option("hdfc_debit", "HDFC"),
                        option("sbi_debit", "SBI"),
                        option("icici_debit", "ICICI"),
                        option("axis_debit", "Axis"),
                        option("pnb_debit", "PNB"),
                    ]
                }
            }
            Self::UpiOptions => {
                const {
                    &[
                        option("gpay", "GPay"),
                        option("phonepe", "PhonePe"),
                        option("paytm", "Paytm"),
                        option("bhim", "BHIM"),
                        option("amazonpay", "Amazon Pay"),
                    ]
                }
            }
            Self::NetBanking => {
                const {
                    &[
                        option("hdfc_net", "HDFC"),
                        option("sbi_net", "SBI"),
                        option("icici_net", "ICICI"),
                        option("axis_net", "Axis"),
                        option("kotak_net", "Kotak"),
                    ]
                }
            }
        }
    }

    pub fn contains_option(self, id: &str) -> bool {
        self.options().iter().any(|option| option.id == id)
    }
}

impl FromStr for PaymentCategory {
    type Err = UnknownNameError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.key().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| UnknownNameError::new("PaymentCategory", raw))
    }
}

pub const EMI_DURATIONS_MONTHS: [u8; 6] = [3, 6, 9, 12, 18, 24];

pub const PURCHASE_TYPES: [(&str, &str); 4] = [
    ("electronics", "Electronics"),
    ("vehicle", "Vehicle"),
    ("realestate", "Real Estate"),
    ("other", "Other"),
];

pub const PRODUCT_TYPES: [(&str, &str); 7] = [
    ("smartphone", "Smartphone"),
    ("tablet", "Tablet"),
    ("laptop", "Laptop"),
    ("car", "Car"),
    ("motorcycle", "Motorcycle"),
    ("tv", "Television"),
    ("refrigerator", "Refrigerator"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_parse_by_key() {
        assert_eq!(
            "payment".parse::<FinancialSection>().expect("parse"),
            FinancialSection::Payment
        );
        assert_eq!(
            "Recommendations".parse::<ProductStep>().expect("parse"),
            ProductStep::Recommendations
        );
        assert!("nowhere".parse::<FinancialSection>().is_err());
    }

    #[test]
    fn default_sections_are_first() {
        assert_eq!(FinancialSection::default(), FinancialSection::Purchase);
        assert_eq!(FinancialSection::all()[0], FinancialSection::Purchase);
        assert_eq!(FinancialSection::all().len(), 5);
        assert_eq!(ProductStep::default().number(), 1);
        assert!(ProductStep::FinancialDetails.is_completed_before(ProductStep::Recommendations));
    }

    #[test]
    fn root_path_resolves_to_financial_advisor() {
        assert_eq!(Route::from_path("/"), Some(Route::FinancialAdvisor));
        assert_eq!(Route::from_path("/pdf-advisor/"), Some(Route::PdfAdvisor));
        assert_eq!(Route::from_path("/elsewhere"), None);
    }

    #[test]
    fn payment_catalog_ids_are_scoped_per_category() {
        assert!(PaymentCategory::UpiOptions.contains_option("gpay"));
        assert!(!PaymentCategory::CreditCards.contains_option("gpay"));
        assert_eq!(
            "netBanking".parse::<PaymentCategory>().expect("parse"),
            PaymentCategory::NetBanking
        );
    }
}
