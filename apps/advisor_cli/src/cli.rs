use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shared::domain::{FinancialSection, PaymentCategory};

#[derive(Parser, Debug)]
#[command(name = "finwise", about = "Purchase and payment advice from the FinWise backend")]
pub struct Cli {
    /// TOML settings file; defaults to ./finwise.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Overrides the advice backend base url.
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Payment strategy for a planned purchase.
    Financial(FinancialArgs),
    /// Product recommendations within a budget.
    Product(ProductArgs),
    /// Questions about a PDF document.
    Pdf(PdfArgs),
    /// Print the navigation bar.
    Routes,
    /// List payment options, EMI tenures and purchase/product types.
    Catalog,
}

#[derive(Args, Debug)]
pub struct FinancialArgs {
    /// Form field as `path=value`, e.g. `totalBudget=85000` or
    /// `financialPreferences.creditScore=760`.
    #[arg(long = "set", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,
    /// Payment option as `category=id`, e.g. `creditCards=hdfc_credit`.
    #[arg(long = "toggle", value_parser = parse_payment_toggle)]
    pub toggle: Vec<(PaymentCategory, String)>,
    /// EMI tenure in months.
    #[arg(long, value_parser = parse_emi_months)]
    pub emi_months: Option<u8>,
    #[arg(long, default_value = "purchase")]
    pub section: FinancialSection,
}

#[derive(Args, Debug)]
pub struct ProductArgs {
    #[arg(long)]
    pub budget: String,
    #[arg(long)]
    pub product_type: String,
    #[arg(long)]
    pub location: String,
    #[arg(long)]
    pub monthly_income: Option<String>,
    #[arg(long)]
    pub product_name: Option<String>,
    #[arg(long)]
    pub details: Option<String>,
    #[arg(long = "brand")]
    pub brands: Vec<String>,
}

#[derive(Args, Debug)]
pub struct PdfArgs {
    #[arg(long)]
    pub file: PathBuf,
    /// Question to ask; repeatable. Without it, questions are read from stdin.
    #[arg(long = "message")]
    pub messages: Vec<String>,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (path, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected path=value, got `{raw}`"))?;
    let path = path.trim();
    if path.is_empty() {
        return Err(format!("empty field path in `{raw}`"));
    }
    Ok((path.to_string(), value.to_string()))
}

fn parse_payment_toggle(raw: &str) -> Result<(PaymentCategory, String), String> {
    let (category, id) = parse_assignment(raw)?;
    let category = category
        .parse::<PaymentCategory>()
        .map_err(|err| err.to_string())?;
    Ok((category, id.trim().to_string()))
}

fn parse_emi_months(raw: &str) -> Result<u8, String> {
    let months: u8 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` is not a number of months"))?;
    if shared::domain::EMI_DURATIONS_MONTHS.contains(&months) {
        Ok(months)
    } else {
        Err(format!(
            "EMI tenure must be one of {:?} months",
            shared::domain::EMI_DURATIONS_MONTHS
        ))
    }
}
