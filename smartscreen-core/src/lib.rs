//! SmartScreen Core: market data, indicators and the trend template.
//!
//! This crate contains everything a screen needs below orchestration:
//! - Domain types (bars, series windows)
//! - Market data sources (Yahoo Finance, synthetic) behind one trait
//! - Fixed-backoff retry and post-fetch row cleaning
//! - Ticker universe loading
//! - Indicator engine (relative strength, EMA pairs, 52-week high)
//! - The trend template pass rule
//! - Quarterly fundamentals growth

pub mod data;
pub mod domain;
pub mod fundamentals;
pub mod indicators;
pub mod rule;
