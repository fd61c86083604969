//! Quotation Webhook Library
//!
//! Receives quotation webhooks, validates their shape, keeps them in an
//! in-memory upsert-by-id store and exposes listing/search views. A
//! separate CRM sync deployment forwards flattened quotation summaries to
//! a Notion database.
//!
//! # Modules
//!
//! - `api`: HTTP handlers and routing.
//! - `domain`: Validation, storage and query logic.
//! - `integrations`: External CRM integration.
//! - `config`: Configuration management.
//! - `crm_handler`: CRM sync webhook handler.
//! - `crm_models`: CRM sync payload and field mapping.
//! - `errors`: Error handling types.
//! - `handlers`: Listing, health and documentation handlers.
//! - `models`: Quotation record and response types.
//! - `notion_client`: Notion API client.
//! - `query`: Filtering and ordering for the listing view.
//! - `routes`: Router assembly and OpenAPI document.
//! - `store`: In-memory quotation store.
//! - `validator`: Inbound payload validation.
//! - `webhook_handler`: Quotation ingest webhook handler.

pub mod api;
pub mod domain;
pub mod integrations;

pub mod config;
pub mod crm_handler;
pub mod crm_models;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod notion_client;
pub mod query;
pub mod routes;
pub mod store;
pub mod validator;
pub mod webhook_handler;
