//! wlsync engine - binding reconciliation
//!
//! The engine reacts to two chat facts:
//! - a member posts `MyID=<name>` (claim)
//! - a member leaves the room (membership loss)
//!
//! and keeps three unreliable systems in step: the binding store, the
//! server whitelist (over RCON) and the chat room itself.
//!
//! ## Layout
//!
//! - [`plan`]: pure decision functions turning looked-up facts into ordered effects
//! - [`executor`]: applies effects, store first, then the remote whitelist
//! - [`engine`]: gathers facts and drives planner and executor per trigger
//! - [`ingest`]: the single sequential event loop
//! - [`gateway`], [`resolver`], [`chat`], [`notify`]: collaborator seams
//! - [`retry`]: the retry combinator every reconnecting client goes through

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod chat;
pub mod engine;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod ingest;
pub mod notify;
pub mod onebot;
pub mod plan;
pub mod resolver;
pub mod retry;

pub use chat::{ChatClient, ChatPolicy, FrameChannel, FrameConnector, TransportError};
pub use engine::ReconciliationEngine;
pub use error::{EngineError, EngineResult};
pub use executor::Executor;
pub use gateway::{
    sanitize, AccessListGateway, GatewayError, GatewayPolicy, GatewayResult, RemoveBy,
    RetryingGateway, TcpRconConnector,
};
pub use ingest::{EventSource, IngestError, IngestLoop};
pub use notify::{Notice, Notifier};
pub use plan::{plan_claim, plan_release, ClaimFacts, Effect};
pub use resolver::{
    IdentityResolver, MojangResolver, ResolutionError, ResolvedIdentity, ResolverConfig,
};
pub use retry::{retry, Retryable};
