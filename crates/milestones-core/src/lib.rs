//! # Milestones Core Library
//!
//! Business logic for tracking milestones: named events with a target
//! moment, free-text notes and a live countdown. The `milestones` CLI is a
//! thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Storage**: SQLite record store (milestones, config singleton, display
//!   settings) with change notification, plus TOML application config
//! - **List engine**: search, day grouping and day labels
//! - **Countdown**: pure remaining-time formatting and a caller-driven ticker
//! - **Forms**: add/edit flows that validate and write through to the store
//!
//! ## Key Components
//!
//! - [`MilestoneDb`]: record and settings persistence
//! - [`countdown()`]: `DDd HHh MMm SSs` formatter
//! - [`CountdownTicker`]: shared refresh clock for visible rows
//! - [`view::build`]: filtered, grouped, toggle-aware list

pub mod countdown;
pub mod display;
pub mod error;
pub mod events;
pub mod forms;
pub mod list;
pub mod milestone;
pub mod storage;
pub mod ticker;
pub mod view;
pub mod when;

pub use countdown::{countdown, Countdown};
pub use display::{DisplayField, DisplaySettings};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::{StoreEvent, SubscriptionId};
pub use forms::{AddForm, EditForm, EditStatus, FormField};
pub use list::{filter, group, group_in, label_for_day, DayGroup};
pub use milestone::Milestone;
pub use storage::{Config, MilestoneDb};
pub use ticker::{CountdownTicker, RowHandle, RowTick};
pub use view::{ListView, LiveList, RowView, SectionView, ViewOptions};
pub use when::parse_target;
