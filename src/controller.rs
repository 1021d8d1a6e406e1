//! Front panel controller.

use log::{debug, info, trace, warn};

use crate::color_temp::{ColorTemp, ColorTempMode};
use crate::config::PanelConfig;
use crate::defaults::{FieldId, RitualOutcome, SessionDefaults, WriteRitual};
use crate::degauss::{Degauss, DegaussPress, DegaussTier};
use crate::error::PanelError;
use crate::geometry::{Geometry, GeometryField, GeometryScope, GeometryStore};
use crate::input::{InputKey, SourceSelector};
use crate::osd::{BackOutcome, Direction, MenuMode, OsdMenu, RootItem};
use crate::power::{self, PowerSound};
use crate::repeat::AutoRepeat;
use crate::state::{GeometryReadout, PanelState};
use crate::store::{KEY_SESSION_DEFAULTS, KeyValueStore, MemoryStore};
use crate::timer::{Scheduler, TimerHandle, VirtualScheduler};
use crate::toggles::{PanelToggle, ShaderEffect, ShaderFlags, ToggleLights};

// =============================================================================
// Renderer Trait
// =============================================================================

/// Receiver of every outward effect of the panel.
///
/// All methods default to doing nothing, so a host only implements what it
/// draws or plays. The panel calls these after its own state has changed;
/// read accessors on [`FrontPanel`] for anything else.
pub trait PanelRenderer {
    /// Ask the user for a media file.
    fn open_media_prompt(&mut self) {}

    /// A shader flag changed.
    fn shader_changed(&mut self, _effect: ShaderEffect, _on: bool) {}

    /// Apply geometry to the picture of `input`.
    fn apply_geometry(&mut self, _input: InputKey, _geometry: &Geometry) {}

    /// Apply a color temperature; see [`ColorTemp::bias`].
    fn apply_color_temp(&mut self, _color_temp: &ColorTemp) {}

    /// Play the degauss wobble at `strength` (0.5 or 1.0).
    fn degauss(&mut self, _strength: f64) {}

    /// Play the relay click that ends a degauss window.
    fn relay_click(&mut self) {}

    /// Play the source-switch glitch.
    fn glitch(&mut self) {}

    /// The lit source or LINE mode changed.
    fn source_changed(&mut self, _active: Option<InputKey>, _line: bool) {}

    /// A toggle light changed.
    fn toggle_changed(&mut self, _toggle: PanelToggle, _on: bool) {}

    /// Step the media channel: -1 previous, +1 next.
    fn change_channel(&mut self, _delta: i32) {}

    /// Play the power-on sound.
    fn power_sound(&mut self, _sound: PowerSound) {}

    /// Power turned on or off.
    fn power_changed(&mut self, _on: bool) {}

    /// Show or hide the menu.
    fn menu_visibility(&mut self, _visible: bool) {}

    /// Light or darken the degauss lamp.
    fn degauss_light(&mut self, _on: bool) {}
}

// =============================================================================
// Commands
// =============================================================================

/// Every input the panel accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// MENU button: open when closed, otherwise step back.
    Menu,
    /// Single directional press.
    MoveCursor(Direction),
    /// Directional key went down. `os_repeat` marks repeats generated by the
    /// host OS, which are ignored. While the menu is open the key repeats
    /// until released; any other `Hold` during that time is ignored.
    Hold {
        /// Key held.
        dir: Direction,
        /// Whether this is an OS key-repeat event.
        os_repeat: bool,
    },
    /// Directional key went up.
    Release(Direction),
    /// The panel lost input focus.
    FocusLost,
    /// ENTER button.
    Enter,
    /// Back one level.
    Back,
    /// A, B or C button.
    PressSource(InputKey),
    /// LINE button.
    PressLine,
    /// DEGAUSS button.
    PressDegauss,
    /// BLUE ONLY button.
    PressBlueOnly,
    /// Any toggle button. `BlueOnly` behaves as [`Command::PressBlueOnly`].
    PressToggle(PanelToggle),
    /// Power switch on.
    PowerOn,
    /// Power switch off.
    PowerOff,
    /// A scheduled timer fired.
    TimerFired(TimerHandle),
}

// =============================================================================
// Front Panel
// =============================================================================

/// The front panel: sources, toggles, menu, geometry, color temperature,
/// session defaults and degauss, driven by [`Command`]s.
///
/// The panel starts switched off. Sources and toggles can be changed while
/// off but nothing reaches the renderer until power-on.
pub struct FrontPanel<R, S = VirtualScheduler> {
    config: PanelConfig,
    renderer: R,
    scheduler: S,
    store: Box<dyn KeyValueStore>,
    powered: bool,
    sources: SourceSelector,
    toggles: ToggleLights,
    shaders: ShaderFlags,
    menu: OsdMenu,
    geometry: GeometryStore,
    color_temp: ColorTemp,
    defaults: SessionDefaults,
    ritual: WriteRitual,
    degauss: Degauss,
    repeat: AutoRepeat,
}

impl<R: PanelRenderer, S: Scheduler> FrontPanel<R, S> {
    /// Create a switched-off panel with an in-memory store.
    pub fn new(config: PanelConfig, renderer: R, scheduler: S) -> Self {
        Self {
            sources: SourceSelector::new(config.initial_source, config.initial_line_mode),
            geometry: GeometryStore::new(config.geometry_scope),
            degauss: Degauss::new(&config),
            config,
            renderer,
            scheduler,
            store: Box::new(MemoryStore::new()),
            powered: false,
            toggles: ToggleLights::default(),
            shaders: ShaderFlags::default(),
            menu: OsdMenu::new(),
            color_temp: ColorTemp::default(),
            defaults: SessionDefaults::new(),
            ritual: WriteRitual::new(),
            repeat: AutoRepeat::new(),
        }
    }

    /// Use `store` for power bookkeeping and session-default persistence.
    pub fn with_store<K: KeyValueStore + 'static>(mut self, store: K) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Handle one command.
    ///
    /// # Errors
    /// Only the power commands touch the store and can fail; the transition
    /// itself completes either way.
    pub fn dispatch(&mut self, command: Command) -> Result<(), PanelError> {
        trace!("dispatch {:?}", command);
        match command {
            Command::Menu => self.press_menu_button(),
            Command::MoveCursor(dir) => self.move_cursor(dir),
            Command::Hold { dir, os_repeat } => self.hold(dir, os_repeat),
            Command::Release(dir) => self.repeat.release(dir, &mut self.scheduler),
            Command::FocusLost => self.repeat.stop(&mut self.scheduler),
            Command::Enter => self.enter(),
            Command::Back => self.back(),
            Command::PressSource(key) => self.press_source_button(key),
            Command::PressLine => self.press_line_button(),
            Command::PressDegauss => self.press_degauss_button(),
            Command::PressBlueOnly => self.press_blue_only_button(),
            Command::PressToggle(toggle) => self.press_toggle_button(toggle),
            Command::PowerOn => return self.power_on(),
            Command::PowerOff => return self.power_off(),
            Command::TimerFired(handle) => self.timer_fired(handle),
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Open the menu when closed, otherwise [`back`](Self::back).
    pub fn press_menu_button(&mut self) {
        if !self.powered {
            return;
        }
        if self.menu.is_visible() {
            self.back();
        } else {
            self.menu.open();
            self.ritual.reset(&mut self.scheduler);
            self.renderer.menu_visibility(true);
        }
    }

    /// Directional press.
    ///
    /// With the menu closed this changes channel (only while a source is
    /// lit). While editing it adjusts the edited value; otherwise it moves
    /// the cursor.
    pub fn move_cursor(&mut self, dir: Direction) {
        if !self.powered {
            return;
        }
        if !self.menu.is_visible() {
            if self.sources.active_key().is_some() {
                self.renderer.change_channel(dir.cursor_delta() as i32);
            }
            return;
        }
        match self.menu.edit_field() {
            Some(field) => self.step_edit(field, dir),
            None => self.menu.move_cursor(dir),
        }
    }

    /// ENTER.
    pub fn enter(&mut self) {
        if !self.powered || !self.menu.is_visible() {
            return;
        }
        let cursor = self.menu.cursor();
        match self.menu.mode() {
            MenuMode::Root => match RootItem::from_index(cursor) {
                Some(RootItem::OpenMedia) => self.renderer.open_media_prompt(),
                Some(RootItem::Shaders) => self.change_mode(MenuMode::ShaderConfig),
                Some(RootItem::Geometry) => self.change_mode(MenuMode::Geometry),
                Some(RootItem::ColorTemp) => self.change_mode(MenuMode::ColorTemp),
                None => {}
            },
            MenuMode::ShaderConfig => {
                if let Some(effect) = ShaderEffect::from_index(cursor) {
                    let on = self.shaders.flip(effect);
                    debug!("shader {:?} {}", effect, if on { "on" } else { "off" });
                    self.renderer.shader_changed(effect, on);
                }
            }
            MenuMode::Geometry => {
                if !self.menu.is_editing() {
                    self.ritual.reset(&mut self.scheduler);
                    self.menu.start_edit();
                }
            }
            MenuMode::ColorTemp => {
                let Some(mode) = ColorTempMode::from_index(cursor) else {
                    return;
                };
                self.color_temp.set_mode(mode);
                if mode == ColorTempMode::User {
                    if !self.menu.is_editing() {
                        self.ritual.reset(&mut self.scheduler);
                        self.menu.start_edit();
                    }
                } else {
                    self.end_edit();
                }
                self.renderer.apply_color_temp(&self.color_temp);
            }
        }
    }

    /// Back one level: end the edit, leave the submenu, or close the menu.
    pub fn back(&mut self) {
        if !self.powered || !self.menu.is_visible() {
            return;
        }
        self.ritual.reset(&mut self.scheduler);
        self.repeat.stop(&mut self.scheduler);
        if self.menu.back() == BackOutcome::Closed {
            self.renderer.menu_visibility(false);
        }
    }

    fn hold(&mut self, dir: Direction, os_repeat: bool) {
        if os_repeat || !self.powered || self.repeat.held().is_some() {
            return;
        }
        self.move_cursor(dir);
        if self.menu.is_visible() {
            self.repeat
                .start(dir, &mut self.scheduler, self.config.repeat_delay_ms);
        }
    }

    fn change_mode(&mut self, mode: MenuMode) {
        self.ritual.reset(&mut self.scheduler);
        self.repeat.stop(&mut self.scheduler);
        self.menu.enter_mode(mode);
    }

    fn end_edit(&mut self) {
        self.ritual.reset(&mut self.scheduler);
        self.repeat.stop(&mut self.scheduler);
        self.menu.end_edit();
    }

    fn step_edit(&mut self, field: FieldId, dir: Direction) {
        match field {
            FieldId::Geometry(field) => {
                let input = self.sources.active_or_initial();
                let geometry = self.geometry.get_mut(input);
                geometry.nudge(field, dir.value_delta());
                trace!("{} -> {}", field, geometry.display(field));
                self.renderer.apply_geometry(input, geometry);
            }
            FieldId::Kelvin => {
                self.color_temp
                    .nudge(self.config.kelvin_step * f64::from(dir.value_delta()));
                self.renderer.apply_color_temp(&self.color_temp);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Panel buttons
    // -------------------------------------------------------------------------

    /// A, B or C.
    pub fn press_source_button(&mut self, key: InputKey) {
        if self.buttons_locked() {
            return;
        }
        let changed = self.sources.press(key);
        if self.powered && changed {
            self.announce_source(true);
        }
    }

    /// LINE.
    pub fn press_line_button(&mut self) {
        if self.buttons_locked() {
            return;
        }
        let before = self.sources.active_key();
        self.sources.toggle_line();
        if self.powered {
            self.announce_source(before != self.sources.active_key());
        }
    }

    /// A latching toggle. `BlueOnly` is routed to
    /// [`press_blue_only_button`](Self::press_blue_only_button).
    pub fn press_toggle_button(&mut self, toggle: PanelToggle) {
        if toggle == PanelToggle::BlueOnly {
            self.press_blue_only_button();
            return;
        }
        if self.buttons_locked() {
            return;
        }
        self.flip_toggle(toggle);
    }

    /// DEGAUSS.
    ///
    /// With the menu open this is the session-default write button while
    /// editing and does nothing otherwise.
    pub fn press_degauss_button(&mut self) {
        if !self.powered {
            return;
        }
        if self.menu.is_visible() {
            if let Some(field) = self.menu.edit_field() {
                self.write_session_default(field);
            }
            return;
        }

        match self.degauss.press(&mut self.scheduler) {
            DegaussPress::Triggered(tier) => {
                self.renderer.degauss_light(true);
                if tier != DegaussTier::Cooling {
                    self.renderer.degauss(tier.strength());
                }
            }
            DegaussPress::Aborted => self.renderer.degauss_light(false),
        }
    }

    /// BLUE ONLY.
    ///
    /// With the menu open this resets the edited field to its default while
    /// editing and does nothing otherwise.
    pub fn press_blue_only_button(&mut self) {
        if !self.powered {
            self.toggles.flip(PanelToggle::BlueOnly);
            return;
        }
        if !self.menu.is_visible() {
            self.flip_toggle(PanelToggle::BlueOnly);
            return;
        }

        let input = self.sources.active_or_initial();
        match self.menu.edit_field() {
            Some(FieldId::Geometry(field)) => {
                self.geometry.apply_default(input, field, &self.defaults);
                debug!("{} reset to default", field);
                self.renderer.apply_geometry(input, self.geometry.get(input));
            }
            Some(FieldId::Kelvin) => {
                let kelvin = self.defaults.value_or_factory(input, FieldId::Kelvin);
                self.color_temp.set_kelvin(kelvin);
                debug!("color temp reset to {}K", kelvin);
                self.renderer.apply_color_temp(&self.color_temp);
            }
            None => {}
        }
    }

    fn buttons_locked(&self) -> bool {
        self.powered && self.menu.is_visible()
    }

    fn flip_toggle(&mut self, toggle: PanelToggle) {
        let on = self.toggles.flip(toggle);
        debug!("{} {}", toggle.label(), if on { "on" } else { "off" });
        if self.powered {
            self.renderer.toggle_changed(toggle, on);
        }
    }

    fn announce_source(&mut self, changed: bool) {
        let active = self.sources.active_key();
        self.renderer.source_changed(active, self.sources.line_mode());
        if changed {
            self.renderer.glitch();
            if let Some(input) = active {
                self.renderer.apply_geometry(input, self.geometry.get(input));
            }
        }
    }

    fn write_session_default(&mut self, field: FieldId) {
        let input = self.sources.active_or_initial();
        let value = match field {
            FieldId::Geometry(geometry_field) => self.geometry.get(input).get(geometry_field),
            FieldId::Kelvin => self.color_temp.kelvin(),
        };
        let outcome = self.ritual.trigger(
            input,
            field,
            value,
            &mut self.defaults,
            &mut self.scheduler,
            self.config.write_flash_ms,
        );
        if matches!(outcome, RitualOutcome::Committed(_))
            && self.config.persist_session_defaults
            && let Err(err) = self.save_session_defaults()
        {
            warn!("could not persist session defaults: {}", err);
        }
    }

    // -------------------------------------------------------------------------
    // Power
    // -------------------------------------------------------------------------

    /// Switch on.
    ///
    /// Picks the power-on sound, treats the coil as freshly degaussed and
    /// resets geometry to the session defaults.
    ///
    /// # Errors
    /// Returns the store error, if any, after the panel is on.
    pub fn power_on(&mut self) -> Result<(), PanelError> {
        if self.powered {
            debug!("power on ignored, already on");
            return Ok(());
        }
        let now = self.scheduler.now_ms();
        let mut result = Ok(());

        let sound = match power::power_on_sound(&mut *self.store, now, &self.config) {
            Ok(sound) => sound,
            Err(err) => {
                warn!("power state unavailable: {}", err);
                result = Err(err);
                PowerSound::Warm
            }
        };
        if self.config.persist_session_defaults
            && let Err(err) = self.load_session_defaults()
        {
            warn!("could not load session defaults: {}", err);
            if result.is_ok() {
                result = Err(err);
            }
        }

        self.powered = true;
        self.degauss.power_on(now);
        self.apply_all_geometry_defaults();
        info!("power on at {} ({:?})", now, sound);

        self.renderer.power_changed(true);
        self.renderer.power_sound(sound);
        self.renderer
            .source_changed(self.sources.active_key(), self.sources.line_mode());
        let input = self.sources.active_or_initial();
        self.renderer.apply_geometry(input, self.geometry.get(input));
        self.renderer.apply_color_temp(&self.color_temp);
        result
    }

    /// Switch off.
    ///
    /// Cancels every pending timer, closes the menu and records the time.
    ///
    /// # Errors
    /// Returns the store error, if any, after the panel is off.
    pub fn power_off(&mut self) -> Result<(), PanelError> {
        if !self.powered {
            debug!("power off ignored, already off");
            return Ok(());
        }
        let now = self.scheduler.now_ms();
        let menu_was_visible = self.menu.is_visible();
        let light_was_on = self.degauss.light();

        self.repeat.stop(&mut self.scheduler);
        self.ritual.reset(&mut self.scheduler);
        self.degauss.shut_down(&mut self.scheduler);
        self.menu.close();
        self.powered = false;
        info!("power off at {}", now);

        if menu_was_visible {
            self.renderer.menu_visibility(false);
        }
        if light_was_on {
            self.renderer.degauss_light(false);
        }
        self.renderer.power_changed(false);

        power::record_power_off(&mut *self.store, now).map_err(|err| {
            warn!("could not record power-off: {}", err);
            err
        })
    }

    fn apply_all_geometry_defaults(&mut self) {
        match self.geometry.scope() {
            GeometryScope::Shared => {
                let input = self.sources.active_or_initial();
                self.geometry.apply_all_defaults(input, &self.defaults);
            }
            GeometryScope::PerInput => {
                for input in InputKey::ALL {
                    self.geometry.apply_all_defaults(input, &self.defaults);
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Timers
    // -------------------------------------------------------------------------

    fn timer_fired(&mut self, handle: TimerHandle) {
        if self.ritual.on_timer(handle) {
            return;
        }
        if self.degauss.on_timer(handle) {
            self.renderer.degauss_light(false);
            self.renderer.relay_click();
            return;
        }
        if let Some(dir) =
            self.repeat
                .on_timer(handle, &mut self.scheduler, self.config.repeat_interval_ms)
        {
            if self.powered && self.menu.is_visible() {
                self.move_cursor(dir);
            } else {
                self.repeat.stop(&mut self.scheduler);
            }
            return;
        }
        trace!("stale timer {:?}", handle);
    }

    // -------------------------------------------------------------------------
    // Session defaults persistence
    // -------------------------------------------------------------------------

    /// Write the session defaults to the store.
    pub fn save_session_defaults(&mut self) -> Result<(), PanelError> {
        let json = self.defaults.to_json()?;
        self.store.set(KEY_SESSION_DEFAULTS, &json)?;
        debug!("session defaults saved");
        Ok(())
    }

    /// Replace the session defaults with the stored ones.
    ///
    /// Returns `false` when nothing was stored.
    pub fn load_session_defaults(&mut self) -> Result<bool, PanelError> {
        let Some(json) = self.store.get(KEY_SESSION_DEFAULTS)? else {
            return Ok(false);
        };
        self.defaults = SessionDefaults::from_json(&json)?;
        debug!("session defaults loaded");
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Whether the set is on.
    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// The lit source.
    pub fn active_key(&self) -> Option<InputKey> {
        self.sources.active_key()
    }

    /// Source selection and memories.
    pub fn sources(&self) -> &SourceSelector {
        &self.sources
    }

    /// Whether `toggle` is lit.
    pub fn toggle_on(&self, toggle: PanelToggle) -> bool {
        self.toggles.is_on(toggle)
    }

    /// Whether `effect` is enabled.
    pub fn shader_on(&self, effect: ShaderEffect) -> bool {
        self.shaders.is_on(effect)
    }

    /// Whether the menu is on screen.
    pub fn is_menu_visible(&self) -> bool {
        self.menu.is_visible()
    }

    /// Current menu mode.
    pub fn menu_mode(&self) -> MenuMode {
        self.menu.mode()
    }

    /// Lines of the current menu list.
    pub fn current_items(&self) -> Vec<String> {
        self.menu.items(&self.shaders, self.geometry(), &self.color_temp)
    }

    /// Cursor position in the current menu list.
    pub fn cursor_index(&self) -> usize {
        self.menu.cursor()
    }

    /// Whether an edit session is active.
    pub fn is_editing(&self) -> bool {
        self.menu.edit_field().is_some()
    }

    /// Geometry of the active source.
    pub fn geometry(&self) -> &Geometry {
        self.geometry.get(self.sources.active_or_initial())
    }

    /// 0-255 display value of `field` for the active source.
    pub fn geometry_display(&self, field: GeometryField) -> u8 {
        self.geometry().display(field)
    }

    /// The geometry submenu readout, when that submenu is showing.
    pub fn geometry_readout(&self) -> Option<GeometryReadout> {
        if !self.menu.is_visible() || self.menu.mode() != MenuMode::Geometry {
            return None;
        }
        let input = self.sources.active_or_initial();
        let field = GeometryField::from_index(self.menu.cursor())?;
        let default = self.defaults.value_or_factory(input, FieldId::Geometry(field));
        Some(GeometryReadout {
            input_label: input.label(),
            field,
            value: self.geometry().display(field),
            default_value: field.to_display(default),
            index: field.index() + 1,
            star: self.ritual.star_flash(),
            write: self.ritual.is_armed(),
        })
    }

    /// Color temperature.
    pub fn color_temp(&self) -> &ColorTemp {
        &self.color_temp
    }

    /// Committed session defaults.
    pub fn session_defaults(&self) -> &SessionDefaults {
        &self.defaults
    }

    /// Whether the WRITE indicator is showing.
    pub fn write_armed(&self) -> bool {
        self.ritual.is_armed()
    }

    /// Whether the commit star is showing.
    pub fn star_flash(&self) -> bool {
        self.ritual.star_flash()
    }

    /// Degauss lamp and cooldown.
    pub fn degauss(&self) -> &Degauss {
        &self.degauss
    }

    /// Take a snapshot.
    pub fn state(&self) -> PanelState {
        PanelState {
            powered: self.powered,
            active_source: self.sources.active_key(),
            line_mode: self.sources.line_mode(),
            menu_visible: self.menu.is_visible(),
            menu_mode: self.menu.mode(),
            cursor: self.menu.cursor(),
            editing: self.is_editing(),
            geometry: *self.geometry(),
            color_temp: self.color_temp,
            degauss_light: self.degauss.light(),
            write_armed: self.ritual.is_armed(),
            star_flash: self.ritual.star_flash(),
        }
    }

    /// Panel configuration.
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// The renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the renderer.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// The scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutable access to the scheduler, e.g. to move a virtual clock.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// The key/value store.
    pub fn store(&self) -> &dyn KeyValueStore {
        &*self.store
    }
}

impl<R: PanelRenderer> FrontPanel<R, VirtualScheduler> {
    /// Advance the virtual clock by `ms`, firing due timers in order.
    pub fn advance(&mut self, ms: u64) {
        let until = self.scheduler.now_ms().saturating_add(ms);
        while let Some((handle, _)) = self.scheduler.next_due(until) {
            self.timer_fired(handle);
        }
        self.scheduler.set_now(until);
    }
}
