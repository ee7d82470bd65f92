//! Confluence publishing for test reports.
//!
//! This crate provides the complete publishing workflow:
//! - [`ConfluenceClient`]: REST API client with basic authentication
//! - [`PageCreator`]: dated child page under a monthly parent page
//! - [`PageUpdater`]: content replacement plus attachments and release status macros
//! - [`AttachmentUploader`]: standalone file upload
//! - [`MockGateway`] for testing (behind `mock` feature flag)
//!
//! The workflows talk to Confluence through the [`PageGateway`] trait, so they
//! can run against [`MockGateway`] in tests.
//!
//! # API Client
//!
//! ```ignore
//! use cfl_config::Config;
//! use cfl_confluence::{ConfluenceClient, PageGateway};
//!
//! let config = Config::load(None)?;
//! let client = ConfluenceClient::from_config(&config.confluence);
//!
//! let page = PageGateway::get_page(&client, "123", true)?;
//! println!("Page title: {}", page.title);
//! ```

// API client
mod client;
pub use client::ConfluenceClient;

mod gateway;
pub use gateway::{PageGateway, PageUpdate};

// Body assembly
mod content;
pub mod macros;
pub mod report;
pub use content::BodySource;
pub use report::TestCounts;

// Types (exposed via result structs)
mod types;
pub use types::{Attachment, Page, Version};

// Workflows
pub mod creator;
pub mod updater;
mod uploader;
pub use creator::{CreateRequest, CreateResult, PageCreator};
pub use updater::{PageUpdater, SelfHeal, UpdateRequest, UpdateResult};
pub use uploader::{AttachmentRequest, AttachmentUploader, validate_file};

// Errors
pub mod error;
pub use error::{AttachmentError, ConfluenceError, PublishError};

#[cfg(any(test, feature = "mock"))]
mod mock;
#[cfg(any(test, feature = "mock"))]
pub use mock::{GatewayCall, MockGateway, Operation};
