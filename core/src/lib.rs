//! Blocking client for the Pushbullet v2 REST API.
//!
//! # Overview
//! `PushClient` wraps an API token, an immutable endpoint table and a
//! `Transport`. Each operation validates its parameters locally, sends one
//! authenticated request (two for file uploads), classifies the status and
//! decodes the JSON body into a typed record.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest` / `HttpResponse`);
//!   the `Transport` trait is the only I/O seam. `ReqwestTransport` is the
//!   default, tests plug in a recording fake.
//! - Any non-2xx status is an `ApiError::ServiceError`.
//! - No retries, no caching, no background work. Logging goes through
//!   `tracing` at debug level; installing a subscriber is up to the caller.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
mod resources;
pub mod transport;
pub mod types;
mod upload;

pub use client::PushClient;
pub use config::Endpoints;
pub use error::{ApiError, Result, ServiceErrorKind};
pub use http::{FilePart, HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartForm, Transport};
pub use params::{NewPush, Params};
pub use transport::ReqwestTransport;
pub use types::{
    Channel, Contact, Contacts, Device, Devices, ListItem, Onboarding, Preferences, Push,
    PushType, Pushes, Subscription, Subscriptions, UploadData, UploadTicket, User,
};
