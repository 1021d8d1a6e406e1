//! Front-panel and on-screen menu state for a simulated broadcast video monitor.
//!
//! This crate owns the logic behind the monitor's buttons: which of the three
//! inputs is lit, the on-screen menu and its edit sessions, picture geometry
//! on an 8-bit display scale, color temperature, per-input session defaults
//! written with a two-press ritual, and the degauss cooldown. Drawing, audio
//! and media loading are left to a [`PanelRenderer`] supplied by the host.
//!
//! # Example
//!
//! ```
//! use pvm_panel_core::{
//!     Command, Direction, FrontPanel, GeometryField, PanelConfig, RecordingRenderer,
//!     VirtualScheduler,
//! };
//!
//! let mut panel = FrontPanel::new(
//!     PanelConfig::default(),
//!     RecordingRenderer::new(),
//!     VirtualScheduler::new(),
//! );
//! panel.dispatch(Command::PowerOn)?;
//!
//! // MENU, down twice to GEOMETRY, ENTER, ENTER again to edit H STRETCH.
//! panel.dispatch(Command::Menu)?;
//! panel.dispatch(Command::MoveCursor(Direction::Down))?;
//! panel.dispatch(Command::MoveCursor(Direction::Down))?;
//! panel.dispatch(Command::Enter)?;
//! panel.dispatch(Command::Enter)?;
//!
//! panel.dispatch(Command::MoveCursor(Direction::Up))?;
//! assert_eq!(panel.geometry_display(GeometryField::HStretch), 129);
//! # Ok::<(), pvm_panel_core::PanelError>(())
//! ```
//!
//! # Timers
//!
//! The panel never sleeps. Timers go through a [`Scheduler`]; with the
//! [`VirtualScheduler`] tests move time with [`FrontPanel::advance`].
//!
//! # Testing
//!
//! Use [`RecordingRenderer`] to assert on the effects the panel emits:
//!
//! ```
//! use pvm_panel_core::{Command, Effect, FrontPanel, PanelConfig, RecordingRenderer, VirtualScheduler};
//!
//! let mut panel = FrontPanel::new(PanelConfig::default(), RecordingRenderer::new(), VirtualScheduler::new());
//! panel.dispatch(Command::PowerOn).unwrap();
//! panel.dispatch(Command::PressDegauss).unwrap();
//! panel.advance(10_000);
//! assert!(panel.renderer().contains(&Effect::RelayClick));
//! ```

#![warn(missing_docs)]

mod color_temp;
mod config;
mod controller;
mod defaults;
mod degauss;
mod error;
mod geometry;
mod input;
mod mock;
mod osd;
mod power;
mod repeat;
mod state;
mod store;
mod timer;
mod toggles;

// Re-export public API
pub use color_temp::{ColorTemp, ColorTempMode, FACTORY_KELVIN, KELVIN_MAX, KELVIN_MIN};
pub use config::PanelConfig;
pub use controller::{Command, FrontPanel, PanelRenderer};
pub use defaults::{FieldId, RitualOutcome, SessionDefaults, WriteRitual};
pub use degauss::{Degauss, DegaussPress, DegaussTier};
pub use error::PanelError;
pub use geometry::{
    Geometry, GeometryField, GeometryScope, GeometryStore, STRETCH_MAX, STRETCH_MIN,
    normalize_degrees,
};
pub use input::{InputKey, SourceSelector};
pub use mock::{Effect, RecordingRenderer};
pub use osd::{BackOutcome, Direction, MenuMode, OsdMenu, RootItem};
pub use power::{PowerSound, force_cold_start, power_on_sound, record_power_off};
pub use repeat::AutoRepeat;
pub use state::{GeometryReadout, PanelState};
pub use store::{
    KEY_FORCE_COLD_START, KEY_LAST_POWER_OFF, KEY_SESSION_DEFAULTS, KeyValueStore, MemoryStore,
};
pub use timer::{Scheduler, TimerHandle, TimerTag, VirtualScheduler};
pub use toggles::{PanelToggle, ShaderEffect, ShaderFlags, ToggleLights};
