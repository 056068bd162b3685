//! Reconciles a tabular vehicle inventory (`Book1.csv`) with the generated
//! `bike-data.js` literal file consumed by the inventory page.

pub mod cli;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod record;
pub mod render;
pub mod report;
pub mod source;

pub use error::{LedgerError, Result};
pub use record::{Record, RecordSet};
