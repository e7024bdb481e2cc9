//! Hotel Ledger
//!
//! Back-office accounting for a hotel: records sales, deposits, expenses and
//! purchases in a remote record store and assembles them into a unified
//! ledger, a profit-and-loss statement and a dashboard.

pub mod config;
pub mod core;
pub mod export;
pub mod store;
