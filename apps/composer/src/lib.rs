//! Document composition pipeline: wizard-driven collection, AI enhancement with
//! version history, WYSIWYG rendering, PDF export and debounced drafts.

pub mod config;
pub mod document;
pub mod draft;
pub mod enhance;
pub mod errors;
pub mod export;
pub mod ingest;
pub mod layout;
pub mod llm_client;
pub mod render;
pub mod session;
pub mod state;
pub mod store;
pub mod style;
pub mod templates;
pub mod wizard;

pub use errors::SessionError;
pub use session::{EditingSession, EnhancementOutcome, SessionTicket};
pub use state::AppState;
