//! Infrastructure layer: stores, external collaborators, configuration and the
//! async workflow services that compose the pure lifecycle crates.

pub mod clock;
pub mod collaborators;
pub mod config;
pub mod drafting;
pub mod error;
pub mod gemini;
pub mod services;
pub mod store;


pub use clock::{Clock, FixedClock, SystemClock};
pub use collaborators::{
    AccountDirectory, DirectoryError, FileStore, FileStoreError, ImageUpload,
    InMemoryAccountDirectory, InMemoryFileStore, InMemoryListingDirectory, ListingDirectory,
    ListingSnapshot,
};
pub use config::{ConfigError, GenerationConfig, WorkflowConfig};
pub use error::WorkflowError;
pub use gemini::GeminiClient;
pub use services::{
    AgreementService, InquiryRequest, ManualAgreement, PartnershipService, PromotionService,
    Workflow,
};
pub use store::{InMemoryWorkflowStore, StoreError, Tables, WorkflowStore};
