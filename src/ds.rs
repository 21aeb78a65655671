//! Market data sources

pub mod yahoo;
