//! Weather classification and aggregation.
//!
//! This module labels cleaned observations by weather type, reduces the
//! dataset into descriptive statistics, daily series and correlations, and
//! optionally writes the full result as JSON.

pub mod aggregate;
pub mod analyzer;
pub mod classify;
pub mod types;
pub mod utility;
pub mod writejson;
