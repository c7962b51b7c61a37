//! # Core Navigation Logic
//!
//! This module contains the front panel's state machine.
//! It knows nothing about any specific display, keypad or backend.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Menu (items+cursor)  │
//!                    │  • Debouncer (edges)    │
//!                    │  • Engine (state)       │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No hardware. Pure.     │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │   Panel    │      │  Transfer  │      │   System   │
//!     │ (terminal, │      │  client    │      │  control   │
//!     │  LCD)      │      │            │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`menu`]: `Menu`, `MenuItem` and the `Command` each item carries
//! - [`debounce`]: `Button` and the level-to-edge `Debouncer`
//! - [`state`]: the `Engine`, all navigation state in one place
//! - [`action`]: the `Transition` enum and the `update()` reducer
//! - [`catalog`]: inventory sources and the content menu builder
//! - [`config`]: layered settings resolution

pub mod action;
pub mod catalog;
pub mod config;
pub mod debounce;
pub mod menu;
pub mod state;
