use std::{
    io::{self, Write},
    time::Duration,
};

use client_core::{
    render_nav_bar, render_text, typing_reveal, RenderedSection, RouteStore,
};
use futures::StreamExt;
use shared::{
    domain::{
        PaymentCategory, ProductStep, Section, EMI_DURATIONS_MONTHS, PRODUCT_TYPES, PURCHASE_TYPES,
    },
    error::{ErrorDetail, ValidationError},
};

pub fn print_nav_bar() {
    println!("{}", render_nav_bar(RouteStore::global()));
    println!();
}

/// `[x] 1. Financial Details  [>] 2. Product Details  [ ] 3. Recommendations`
pub fn print_step_progress(current: ProductStep) {
    let steps = ProductStep::all()
        .iter()
        .map(|step| {
            let mark = if *step == current {
                ">"
            } else if step.is_completed_before(current) {
                "x"
            } else {
                " "
            };
            format!("[{mark}] {}. {}", step.number(), step.title())
        })
        .collect::<Vec<_>>()
        .join("  ");
    println!("{steps}");
}

pub fn print_catalog() {
    println!("Payment options (--toggle category=id):");
    for category in PaymentCategory::ALL {
        println!("  {} ({})", category.label(), category.key());
        for option in category.options() {
            println!("    {:<14} {}", option.id, option.name);
        }
    }
    println!();
    println!("EMI tenures (--emi-months): {EMI_DURATIONS_MONTHS:?}");
    println!();
    println!("Purchase types (--set purchaseType=...):");
    for (id, label) in PURCHASE_TYPES {
        println!("  {id:<14} {label}");
    }
    println!();
    println!("Product types (--product-type):");
    for (id, label) in PRODUCT_TYPES {
        println!("  {id:<14} {label}");
    }
}

pub fn print_sections(sections: &[RenderedSection]) {
    if sections.is_empty() {
        println!("The advisor returned no recommendations.");
    } else {
        print!("{}", render_text(sections));
    }
}

pub fn print_validation_errors(errors: &[ValidationError]) {
    eprintln!("{}", ErrorDetail::validation(errors).message);
    if errors.len() > 1 {
        for error in errors {
            eprintln!("  - {}", error.message);
        }
    }
}

/// Writes `text` a character at a time, then ends the line.
pub async fn reveal(prefix: &str, text: &str, delay: Duration) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{prefix}")?;
    let mut shown = 0;
    let mut frames = typing_reveal(text, delay);
    while let Some(frame) = frames.next().await {
        write!(stdout, "{}", &frame[shown..])?;
        stdout.flush()?;
        shown = frame.len();
    }
    writeln!(stdout)
}
