//! evplan - Command Line Interface
//!
//! This is the main entry point for the EV training planner.
//! Run with `--help` to see all available options.

use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use evplan::{
    data::{embedded_catalog, load_catalog, load_inventory, load_sort_orders, save_inventory},
    display::{
        display_inventory_summary, display_results, format_plan_text, showdown_string, PlanExport,
    },
    models::{
        CalculationInput, Catalog, CurrencyPriority, ItemCategory, StatsTable, MAX_EV_PER_STAT,
        MAX_TOTAL_EVS,
    },
    optimizer::{apply_result, calculate},
    parser::{
        apply_parsed_targets, apply_quick_update, parse_currency, parse_ev_string,
        scan_inventory_text,
    },
};

/// Output formats for the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Boxed report on stdout
    Table,
    /// Plain-text plan
    Text,
    /// JSON export document
    Json,
    /// Showdown EV string of the targets
    Showdown,
}

/// Which currency pays first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Priority {
    /// League Points first
    Lp,
    /// Poké Dollars first
    Pd,
}

impl From<Priority> for CurrencyPriority {
    fn from(p: Priority) -> Self {
        match p {
            Priority::Lp => CurrencyPriority::Lp,
            Priority::Pd => CurrencyPriority::Pd,
        }
    }
}

/// Command-line arguments for evplan.
#[derive(Parser, Debug)]
#[command(name = "evplan")]
#[command(author, version, long_about = None)]
#[command(about = "Plan EV training with your items and currency")]
struct Args {
    /// JSON file holding a complete calculation input (other flags refine it)
    #[arg(short, long)]
    input: Option<PathBuf>,

    // ========== EVs ==========
    /// Target EVs as a Showdown line, e.g. "EVs: 252 Atk / 6 SpD / 252 Spe"
    #[arg(short, long)]
    target: Option<String>,

    /// Current EVs as a Showdown line
    #[arg(long)]
    current: Option<String>,

    // ========== Inventory ==========
    /// Inventory JSON file ({"protein": 12, ...})
    #[arg(long)]
    inventory: Option<PathBuf>,

    /// Set a single item quantity, e.g. --item protein=12 (repeatable)
    #[arg(long = "item", value_name = "ID=QTY")]
    items: Vec<String>,

    /// Vitamin quantities in category order, e.g. "5 3 0 10 0 2"
    #[arg(long)]
    vitamins: Option<String>,

    /// Mochi quantities in category order
    #[arg(long)]
    mochi: Option<String>,

    /// Feather quantities in category order
    #[arg(long)]
    feathers: Option<String>,

    /// Text file with recognised inventory screen text
    #[arg(long)]
    inventory_text: Option<PathBuf>,

    /// JSON file with per-category item order ({"Vitamin": ["zinc", ...]})
    #[arg(long)]
    sort_orders: Option<PathBuf>,

    /// Item catalog CSV (defaults to the built-in catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,

    // ========== Currency ==========
    /// League Points available (commas allowed)
    #[arg(long)]
    league_points: Option<String>,

    /// Poké Dollars available (commas allowed)
    #[arg(long)]
    poke_dollars: Option<String>,

    /// Currency spent first when buying Vitamins
    #[arg(long, value_enum)]
    priority: Option<Priority>,

    // ========== Output ==========
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Print the inventory and balances left after following the plan
    #[arg(long, default_value = "false")]
    apply: bool,

    /// Write the inventory left after following the plan to this file
    #[arg(long)]
    save_inventory: Option<PathBuf>,
}

/// Parses an `EVs:` line (the prefix is optional) into a capped table.
fn parse_stats_arg(value: &str) -> StatsTable {
    let line = if value.trim().to_lowercase().starts_with("evs:") {
        value.to_string()
    } else {
        format!("EVs: {}", value)
    };
    let parsed = parse_ev_string(&line);
    if let Some(message) = &parsed.message {
        warn!("{}", message);
    }
    let (table, warnings) = apply_parsed_targets(&parsed.evs);
    for warning in warnings {
        eprintln!("[WARNING] {}", warning);
    }
    table
}

/// Builds the calculation input from the input file and flags.
fn build_input(args: &Args, catalog: &Catalog) -> Result<CalculationInput, Box<dyn Error>> {
    let mut input = match &args.input {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => CalculationInput {
            target_evs: StatsTable::from_array([0, 252, 0, 0, 6, 252]),
            item_sort_orders: catalog.default_sort_orders(),
            ..Default::default()
        },
    };

    if let Some(target) = &args.target {
        input.target_evs = parse_stats_arg(target);
    }
    if let Some(current) = &args.current {
        input.current_evs = parse_stats_arg(current);
    }
    if let Some(path) = &args.sort_orders {
        input.item_sort_orders = load_sort_orders(path, catalog)?;
    }

    if let Some(path) = &args.inventory {
        input.inventory = load_inventory(path, catalog)?;
    }
    if let Some(path) = &args.inventory_text {
        let scan = scan_inventory_text(catalog, &fs::read_to_string(path)?);
        for warning in &scan.warnings {
            eprintln!("[WARNING] {}", warning);
        }
        info!("Scanned {} item type(s) from text", scan.quantities.len());
        input.inventory = scan.apply_to(&input.inventory);
    }

    let quick_updates = [
        (ItemCategory::Vitamin, &args.vitamins),
        (ItemCategory::Mochi, &args.mochi),
        (ItemCategory::Feather, &args.feathers),
    ];
    for (category, text) in quick_updates {
        let Some(text) = text else { continue };
        let update = apply_quick_update(
            catalog,
            &input.inventory,
            &input.item_sort_orders,
            category,
            text,
        )?;
        if update.skipped > 0 {
            eprintln!(
                "[WARNING] {} {} entr{} skipped.",
                update.skipped,
                category.plural(),
                if update.skipped == 1 { "y was" } else { "ies were" }
            );
        }
        input.inventory = update.inventory;
    }

    for entry in &args.items {
        let (id, qty) = entry
            .split_once('=')
            .ok_or_else(|| format!("Invalid --item '{}', expected ID=QTY", entry))?;
        let id = id.trim();
        if catalog.get(id).is_none() {
            return Err(format!("Unknown item id '{}'", id).into());
        }
        input.inventory.insert(id.to_string(), qty.trim().parse()?);
    }

    if let Some(lp) = &args.league_points {
        input.current_league_points = parse_currency(lp);
    }
    if let Some(pd) = &args.poke_dollars {
        input.current_poke_dollars = parse_currency(pd);
    }
    if let Some(priority) = args.priority {
        input.currency_priority = priority.into();
    }

    let capped = input.with_capped_evs();
    if capped != input {
        warn!(
            "EVs reduced to the caps ({} per stat, {} total)",
            MAX_EV_PER_STAT, MAX_TOTAL_EVS
        );
    }
    Ok(capped)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => load_catalog(path)?,
        None => embedded_catalog(),
    };
    if catalog.is_empty() {
        eprintln!("Error: the item catalog is empty.");
        std::process::exit(1);
    }

    let input = build_input(&args, &catalog)?;
    let result = calculate(&catalog, &input);

    match args.format {
        OutputFormat::Table => {
            println!("evplan - EV Training Planner");
            println!("================================================================");
            println!();
            println!("Configuration:");
            println!("  Target:          {}", showdown_string(&input.target_evs));
            println!("  Current:         {}", showdown_string(&input.current_evs));
            println!(
                "  Funds:           {} LP, {} $",
                input.current_league_points, input.current_poke_dollars
            );
            println!("  Priority:        {:?}", input.currency_priority);
            println!();
            display_inventory_summary(&catalog, &input.inventory);
            display_results(&catalog, &result, &input.current_evs, &input.target_evs);
        }
        OutputFormat::Text => {
            print!(
                "{}",
                format_plan_text(&catalog, &result, &input.current_evs, &input.target_evs)
            );
        }
        OutputFormat::Json => {
            let export = PlanExport::new(
                &catalog,
                &result,
                &input.current_evs,
                &input.target_evs,
                chrono::Utc::now().to_rfc3339(),
            );
            println!("{}", export.to_json()?);
        }
        OutputFormat::Showdown => {
            println!("EVs: {}", showdown_string(&input.target_evs));
        }
    }

    if args.apply || args.save_inventory.is_some() {
        let (inventory, funds) = apply_result(&catalog, &result, &input.inventory);
        if args.apply {
            println!();
            println!("[AFTER FOLLOWING THE PLAN]");
            println!("----------------------------------------------------------------");
            display_inventory_summary(&catalog, &inventory);
            println!(
                "  Funds:     {} LP, {} $",
                funds.league_points, funds.poke_dollars
            );
        }
        if let Some(path) = &args.save_inventory {
            save_inventory(path, &inventory)?;
            info!("Saved updated inventory to {}", path.display());
        }
    }

    Ok(())
}
