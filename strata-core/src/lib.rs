//! # strata-core
//!
//! Document engine for a multi-track audio/MIDI arranger: application state,
//! action dispatch with coalescing undo, configuration, the JSON persistence
//! boundary and live controller routing.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strata_core::config::Config;
//! use strata_core::dispatch::dispatch_action;
//! use strata_core::state::AppState;
//! use strata_types::{Action, SongAction};
//!
//! // 1. Create state with defaults from config
//! let config = Config::load();
//! let mut state = AppState::new_with_config(&config);
//!
//! // 2. Dispatch actions (undo snapshots are recorded automatically)
//! let result = dispatch_action(&Action::Song(SongAction::Add { name: "Intro".into() }), &mut state);
//!
//! // 3. Hand a mapping snapshot to the controller thread
//! let snapshot = state.mapping_snapshot();
//! ```
//!
//! ## Module Overview
//!
//! - [`state`]: `AppState`, undo history, persistence (JSON save/load)
//! - [`dispatch`]: `dispatch_action()`, the single entry point for mutation
//! - [`config`]: TOML configuration (embedded defaults + user override)
//! - [`midi`]: controller event routing to parameter sinks

pub mod config;
pub mod dispatch;
pub mod midi;
pub mod state;

pub use strata_types as types;
