mod cli;
mod config;
mod output;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    AdviceTransport, ChatOutcome, FinancialAdvisorScreen, FormSubmitOutcome, HttpTransport,
    PdfAdvisorScreen, ProductAdvisorScreen, Render, RouteStore, SubmitOutcome,
};
use serde_json::Value;
use shared::{
    domain::{Route, PRODUCT_TYPES, PURCHASE_TYPES},
    error::ErrorDetail,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Cli, Command, FinancialArgs, PdfArgs, ProductArgs},
    config::{load_settings, Settings},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref(), cli.base_url.as_deref())?;
    info!(base_url = %settings.base_url, "using advice backend");

    let transport: Arc<dyn AdviceTransport> = Arc::new(
        HttpTransport::with_timeout(&settings.base_url, settings.request_timeout)
            .context("failed to build http transport")?,
    );

    match cli.command {
        Command::Financial(args) => run_financial(transport, args).await,
        Command::Product(args) => run_product(transport, args).await,
        Command::Pdf(args) => run_pdf(transport, &settings, args).await,
        Command::Routes => {
            for route in Route::ALL {
                println!("{:<22} {}", route.path(), route.nav_label());
            }
            println!();
            output::print_nav_bar();
            Ok(())
        }
        Command::Catalog => {
            output::print_catalog();
            Ok(())
        }
    }
}

/// `"true"`/`"false"` become booleans so settings flags stay flags.
fn form_value(raw: &str) -> Value {
    match raw.trim() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

fn finish<R>(outcome: FormSubmitOutcome<R>) -> Result<Option<R>> {
    match outcome {
        FormSubmitOutcome::Invalid(errors) => {
            output::print_validation_errors(&errors);
            bail!("{}", ErrorDetail::validation(&errors).message)
        }
        FormSubmitOutcome::Submitted(SubmitOutcome::Succeeded(response)) => Ok(Some(response)),
        FormSubmitOutcome::Submitted(SubmitOutcome::Failed(detail)) => bail!("{}", detail.message),
        FormSubmitOutcome::Submitted(_) => {
            warn!("submission produced no advice");
            Ok(None)
        }
    }
}

async fn run_financial(transport: Arc<dyn AdviceTransport>, args: FinancialArgs) -> Result<()> {
    RouteStore::global().navigate(Route::FinancialAdvisor);
    output::print_nav_bar();

    let mut screen = FinancialAdvisorScreen::new(transport);
    screen.form_mut().set_active_section(args.section);
    println!("Section: {}", args.section);
    for (path, value) in &args.set {
        screen.form_mut().update_field(path, form_value(value));
    }
    for (category, id) in &args.toggle {
        screen.toggle_payment_option(*category, id);
    }
    if args.emi_months.is_some() {
        screen.set_emi_duration(args.emi_months);
    }

    let purchase_type = screen.form().model().get_str("purchaseType").unwrap_or_default();
    if !PURCHASE_TYPES.iter().any(|(id, _)| *id == purchase_type) {
        warn!(purchase_type, "purchase type is not one of the listed options");
    }

    if let Some(response) = finish(screen.submit().await)? {
        output::print_sections(&response.sections());
    }
    Ok(())
}

async fn run_product(transport: Arc<dyn AdviceTransport>, args: ProductArgs) -> Result<()> {
    RouteStore::global().navigate(Route::SuggestionAdvisor);
    output::print_nav_bar();

    if !PRODUCT_TYPES.iter().any(|(id, _)| *id == args.product_type) {
        warn!(product_type = %args.product_type, "product type is not one of the listed options");
    }

    let mut screen = ProductAdvisorScreen::new(transport);
    let form = screen.form_mut();
    form.update_field("budget", args.budget);
    if let Some(income) = args.monthly_income {
        form.update_field("monthlyIncome", income);
    }
    output::print_step_progress(screen.step());
    screen.continue_to_product_details();
    output::print_step_progress(screen.step());

    let form = screen.form_mut();
    form.update_field("productType", args.product_type);
    form.update_field("location", args.location);
    if let Some(name) = args.product_name {
        form.update_field("productName", name);
    }
    if let Some(details) = args.details {
        form.update_field("additionalDetails", details);
    }
    for brand in &args.brands {
        form.toggle_set_member("preferredBrands", brand);
    }

    if let Some(response) = finish(screen.submit().await)? {
        output::print_step_progress(screen.step());
        output::print_sections(&response.sections());
    }
    Ok(())
}

async fn run_pdf(
    transport: Arc<dyn AdviceTransport>,
    settings: &Settings,
    args: PdfArgs,
) -> Result<()> {
    RouteStore::global().navigate(Route::PdfAdvisor);
    output::print_nav_bar();

    let mut screen = PdfAdvisorScreen::new(transport).with_banner_ttl(settings.file_banner);
    screen.attach_path(&args.file).await?;
    if let (Some(doc), Some(size)) = (screen.document(), screen.document_size_label()) {
        println!("{} ({size})", doc.filename);
    }
    if let Some(greeting) = screen.transcript().last() {
        output::reveal("advisor> ", &greeting.content, settings.typing_delay).await?;
    }

    if args.messages.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
            ask(&mut screen, settings, line).await?;
        }
    } else {
        for message in args.messages {
            ask(&mut screen, settings, message).await?;
        }
    }
    Ok(())
}

async fn ask(screen: &mut PdfAdvisorScreen, settings: &Settings, question: String) -> Result<()> {
    screen.set_input(question);
    match screen.send().await {
        ChatOutcome::Replied(entry) => {
            output::reveal("advisor> ", &entry.content, settings.typing_delay).await?;
        }
        ChatOutcome::Failed(detail) => {
            if let Some(entry) = screen.transcript().last() {
                output::reveal("advisor> ", &entry.content, settings.typing_delay).await?;
            }
            warn!(message = %detail.message, "document question failed");
        }
        ChatOutcome::Ignored => {}
        ChatOutcome::NoDocument => bail!("no document attached"),
        ChatOutcome::Busy | ChatOutcome::Superseded => {
            warn!("question was not answered; try again");
        }
    }
    Ok(())
}
