//! # Careflow: dialogue orchestration for a medical-appointment assistant
//!
//! Careflow drives a multi-turn conversation as a directed graph of
//! processing steps executed against durable per-session state. A turn runs
//! from an entry or resume point until the next interrupt point (a node that
//! produced a user-facing message) and is checkpointed there; the next
//! inbound message resumes exactly where the graph paused.
//!
//! ## Core concepts
//!
//! - **Nodes**: async units of work, `(state) -> state`, each consulting at
//!   most one external collaborator ([`node`])
//! - **Routes**: closed enums selecting conditional edges; an unmapped route
//!   fails loudly ([`types`], [`graph`])
//! - **State**: an explicit versioned struct per session that round-trips
//!   through serde unchanged ([`state`])
//! - **Interrupt/resume**: checkpoints record the nodes the graph is paused
//!   before ([`engine`], [`runtime`])
//! - **Verification**: progressive identity resolution and appointment
//!   matching with diagnostic output ([`verify`])
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use careflow::assistant::DialogueAssistant;
//! use careflow::runtime::RuntimeConfig;
//! # async fn example(
//! #     classifier: Arc<dyn careflow::collaborators::Classifier>,
//! #     repository: Arc<dyn careflow::collaborators::Repository>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let assistant =
//!     DialogueAssistant::connect(classifier, repository, RuntimeConfig::default()).await?;
//!
//! let session_id = DialogueAssistant::generate_session_id();
//! let state = assistant
//!     .handle_turn(&session_id, "req-1", "What are your opening hours?")
//!     .await?;
//! println!("{}", state.last_reply().unwrap_or_default());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module guide
//!
//! - [`types`] - node, route, and intent identifiers
//! - [`state`] - per-session dialogue state
//! - [`node`] - the node execution contract
//! - [`graph`] - graph definition, validation, and the canonical topology
//! - [`engine`] - sequential run-to-interrupt execution
//! - [`runtime`] - checkpoints, persistence, per-session locks, configuration
//! - [`collaborators`] - classifier and repository boundaries
//! - [`verify`] - identity verification and appointment matching
//! - [`nodes`] - the appointment-assistant node set
//! - [`observe`] - observability interface
//! - [`assistant`] - the `handle_turn` surface

pub mod assistant;
pub mod collaborators;
pub mod engine;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod observe;
pub mod runtime;
pub mod state;
pub mod types;
pub mod verify;
