//! RGBridge onboarding API
//!
//! Wire models, endpoint constants, the `BridgeBackend` seam the wizard is
//! written against, and `BridgeClient`, its HTTP implementation.

pub mod backend;
pub mod client;
pub mod constants;
pub mod models;

pub use backend::{ApiError, BridgeBackend};
pub use client::BridgeClient;
pub use models::{
    AnalyzeRequest, AnalyzeResponse, FieldMap, GenerateRequest, GenerateResponse, MappingKind, MessageFormat,
    PmsRecord, PmsRegistration, SuggestRequest, SuggestResponse,
};
