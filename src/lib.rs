//! CRM Cleanup Library
//!
//! Finds duplicate contacts and companies in HubSpot CRM data, scores missing
//! fields, and produces a cleanup report with a data-quality score, priority
//! actions, and a time estimate.
//!
//! # Modules
//!
//! - `api`: API-layer namespace (handlers, text rendering).
//! - `core`: Analysis namespace (clustering, gaps, report, recommendations).
//! - `integrations`: Record-source namespace (MCP client, circuit breaker).
//! - `circuit_breaker`: Circuit breaker for record-source calls.
//! - `clustering`: Exact-key and fuzzy-name duplicate detection.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `gaps`: Missing-field analysis.
//! - `handlers`: HTTP request handlers.
//! - `mcp_client`: JSON-RPC client for the HubSpot MCP server.
//! - `models`: Records, clusters, gaps, and the report.
//! - `normalize`: String normalization for name comparison.
//! - `recommendations`: Quick wins, long-term improvements, action plan.
//! - `render`: Plain-text report output.
//! - `report`: Report generation.
//! - `services`: Record sources and the cleanup service.
//! - `similarity`: Sequence-matching similarity ratio.

pub mod api;
pub mod core;
pub mod integrations;

pub mod circuit_breaker;
pub mod clustering;
pub mod config;
pub mod errors;
pub mod gaps;
pub mod handlers;
pub mod mcp_client;
pub mod models;
pub mod normalize;
pub mod recommendations;
pub mod render;
pub mod report;
pub mod services;
pub mod similarity;
