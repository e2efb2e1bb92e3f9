//! # Order Maintenance
//!
//! Offline repair of `item_order` / `category_order` in the items table.
//!
//! ## Why Drift Happens
//! - Deletes leave gaps inside a category, nothing renumbers on delete
//! - A reorder batch is applied row by row, a failure halfway leaves a category
//!   with two different `category_order` values
//! - Rows created before ordering existed have `null` orders
//!
//! ## Run
//! 1. Load every item, in display order.
//! 2. Audit the three invariants and print whatever is off.
//! 3. Renumber the whole list, categories and items keep their current relative order.
//! 4. Write only the rows whose orders actually change, one row at a time.
//!
//! ```sh
//! cargo run -p process -- --dry-run
//! cargo run -p process
//! ```
//!
//! ## QR Code
//! `process qr <url> [out.png]` renders the table card code for the public menu.
use std::path::Path;

use anyhow::Context;
use menu::ordering::{audit, changed_orders, renumber, sort_for_display};
use server::{config::Config, database::ItemStore, state::State};
use tracing::info;

pub mod models;
pub mod utils;

use models::Report;
use utils::{describe, menu_qr, progress_bar};

pub fn write_menu_qr(url: &str, out: &Path) -> anyhow::Result<()> {
    let image = menu_qr(url)?;
    image
        .save(out)
        .with_context(|| format!("writing {}", out.display()))?;

    println!("QR code for {url} written to {}", out.display());
    Ok(())
}

pub async fn normalize_orders(dry_run: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    if config.supabase.is_none() {
        anyhow::bail!("SUPABASE_URL is not set, there is no stored menu to normalize");
    }

    let state = State::new(config)?;
    let report = run(state.items.as_ref(), dry_run).await?;

    println!("Items: {}", report.items);
    println!("Violations: {}", report.violations.len());
    for violation in &report.violations {
        println!("  - {}", describe(violation));
    }

    if report.is_clean() {
        println!("Orders are already dense. Exiting.");
    } else if dry_run {
        println!("Rows to rewrite: {} (dry run, nothing written)", report.changed.len());
    } else {
        println!("Rows rewritten: {}", report.applied);
    }

    Ok(())
}

pub async fn run(store: &dyn ItemStore, dry_run: bool) -> anyhow::Result<Report> {
    let mut items = store.list_items().await.context("loading items")?;
    sort_for_display(&mut items);

    let violations = audit(&items);
    let changed = changed_orders(&items, &renumber(&items));
    info!(
        "{} items, {} violations, {} rows to rewrite",
        items.len(),
        violations.len(),
        changed.len()
    );

    let mut report = Report {
        items: items.len(),
        violations,
        changed,
        applied: 0,
    };

    if dry_run || report.changed.is_empty() {
        return Ok(report);
    }

    let pb = progress_bar(report.changed.len());

    for update in &report.changed {
        pb.set_message(format!("Item {}", update.id));

        report.applied += store
            .apply_orders(std::slice::from_ref(update))
            .await
            .with_context(|| format!("rewriting item {}", update.id))?;

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    Ok(report)
}
