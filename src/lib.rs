//! # evplan
//!
//! A command-line tool and library for planning EV (Effort Value) training.
//!
//! Given a creature's current and target EVs, the player's item inventory and
//! their League Points / Poké Dollars, this crate works out:
//!
//! - Which owned Vitamins, Mochi and Feathers to use on each stat
//! - Which Vitamins still have to be bought, and how to pay for them
//! - What remains unmet when inventory or funds run out
//!
//! ## Modules
//!
//! - [`models`] - Stats, items, the catalog, inputs and the calculation result
//! - [`data`] - Catalog CSV loading and inventory / sort order JSON files
//! - [`optimizer`] - Inventory allocation and purchase planning
//! - [`parser`] - Showdown EV strings, currency fields and inventory text
//! - [`display`] - Plan text, Showdown export and terminal output
//!
//! ## Example Usage
//!
//! ```
//! use evplan::{
//!     data::embedded_catalog,
//!     models::{CalculationInput, CurrencyPriority, StatsTable},
//!     optimizer::calculate,
//! };
//!
//! let catalog = embedded_catalog();
//!
//! let input = CalculationInput {
//!     current_evs: StatsTable::default(),
//!     target_evs: StatsTable::from_array([0, 252, 0, 0, 6, 252]),
//!     inventory: [("protein".to_string(), 30), ("carbos".to_string(), 30)]
//!         .into_iter()
//!         .collect(),
//!     current_league_points: 50_000,
//!     currency_priority: CurrencyPriority::Lp,
//!     ..Default::default()
//! };
//!
//! let result = calculate(&catalog, &input);
//! assert!(result.all_goals_met());
//! println!("{}", result.overall_status_message);
//! ```
//!
//! ## Planning Rules
//!
//! 1. **Inventory first**: each stat consumes owned items, highest yield first,
//!    and never overshoots its target.
//! 2. **Then purchases**: any residual gap is closed with Vitamins bought at a
//!    fixed price, paid with the preferred currency first. If the player
//!    cannot afford all of them, nothing is bought and the shortfall is
//!    reported instead.

pub mod data;
pub mod display;
pub mod models;
pub mod optimizer;
pub mod parser;
pub mod wasm;
