//! HTTP server for the order-grab task platform.
//!
//! Thin axum layer over the `order_grab` engine: JSON endpoints for task
//! grabbing and settlement, admin moderation of inject rules and the ledger,
//! and the usual operational surface (health, metrics, request ids).

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
