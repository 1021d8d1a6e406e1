//! On-screen menu navigation.
//!
//! The menu is a small tree: `Root` leads to three submenus that can only go
//! back to `Root`. Visibility is a separate flag; a closed menu is always
//! reset to `Root` with the cursor at the top.

use log::debug;

use crate::color_temp::{ColorTemp, ColorTempMode};
use crate::defaults::FieldId;
use crate::geometry::{Geometry, GeometryField};
use crate::toggles::{ShaderEffect, ShaderFlags};

// =============================================================================
// Modes and directions
// =============================================================================

/// Which list the menu is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuMode {
    /// Top-level list.
    #[default]
    Root,
    /// Shader on/off list.
    ShaderConfig,
    /// Geometry parameters.
    Geometry,
    /// Color temperature presets and USER.
    ColorTemp,
}

impl MenuMode {
    /// Number of items listed in this mode.
    pub fn item_count(self) -> usize {
        match self {
            MenuMode::Root => RootItem::ALL.len(),
            MenuMode::ShaderConfig => ShaderEffect::ALL.len(),
            MenuMode::Geometry => GeometryField::ALL.len(),
            MenuMode::ColorTemp => ColorTempMode::ALL.len(),
        }
    }
}

/// Entries of the top-level list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootItem {
    /// Ask the host for a media file.
    OpenMedia,
    /// Enter [`MenuMode::ShaderConfig`].
    Shaders,
    /// Enter [`MenuMode::Geometry`].
    Geometry,
    /// Enter [`MenuMode::ColorTemp`].
    ColorTemp,
}

impl RootItem {
    /// All items in menu order.
    pub const ALL: [RootItem; 4] = [
        RootItem::OpenMedia,
        RootItem::Shaders,
        RootItem::Geometry,
        RootItem::ColorTemp,
    ];

    /// Item at a root cursor position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            RootItem::OpenMedia => "OPEN MEDIA",
            RootItem::Shaders => "SHADERS",
            RootItem::Geometry => "GEOMETRY",
            RootItem::ColorTemp => "COLOR TEMP",
        }
    }
}

/// Up or down on the directional keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards the top of the list, or a larger value.
    Up,
    /// Towards the bottom of the list, or a smaller value.
    Down,
}

impl Direction {
    /// Cursor movement: up moves to the previous item.
    pub fn cursor_delta(self) -> isize {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }

    /// Value change while editing: up increases.
    pub fn value_delta(self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

/// What `back` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// Left the edit session, stayed in the submenu.
    EndedEdit,
    /// Returned from a submenu to `Root`.
    ToRoot,
    /// Closed the menu.
    Closed,
}

// =============================================================================
// Menu state
// =============================================================================

/// Menu visibility, mode, cursor and edit flag.
#[derive(Debug, Clone, Default)]
pub struct OsdMenu {
    visible: bool,
    mode: MenuMode,
    cursor: usize,
    editing: bool,
}

impl OsdMenu {
    /// A closed menu at `Root`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the menu is on screen.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current mode.
    pub fn mode(&self) -> MenuMode {
        self.mode
    }

    /// Cursor position within the current mode's list.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether an edit session is active.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// The field bound to the active edit session.
    pub fn edit_field(&self) -> Option<FieldId> {
        if !self.visible || !self.editing {
            return None;
        }
        match self.mode {
            MenuMode::Geometry => GeometryField::from_index(self.cursor).map(FieldId::Geometry),
            MenuMode::ColorTemp => Some(FieldId::Kelvin),
            MenuMode::Root | MenuMode::ShaderConfig => None,
        }
    }

    /// Show the menu at `Root`.
    pub fn open(&mut self) {
        self.visible = true;
        self.reset();
        debug!("menu opened");
    }

    /// Hide the menu and reset it to `Root`.
    pub fn close(&mut self) {
        self.visible = false;
        self.reset();
        debug!("menu closed");
    }

    /// Move the cursor with wrap-around.
    pub fn move_cursor(&mut self, dir: Direction) {
        let count = self.mode.item_count() as isize;
        self.cursor = (self.cursor as isize + dir.cursor_delta()).rem_euclid(count) as usize;
        debug!("menu cursor {:?}/{}", self.mode, self.cursor);
    }

    /// Switch to `mode` with the cursor at the top.
    pub fn enter_mode(&mut self, mode: MenuMode) {
        self.mode = mode;
        self.cursor = 0;
        self.editing = false;
        debug!("menu mode {:?}", mode);
    }

    /// Start editing the item under the cursor.
    pub fn start_edit(&mut self) {
        self.editing = true;
        debug!("edit started {:?}/{}", self.mode, self.cursor);
    }

    /// End the edit session, if any.
    pub fn end_edit(&mut self) {
        if self.editing {
            self.editing = false;
            debug!("edit ended {:?}/{}", self.mode, self.cursor);
        }
    }

    /// Step back one level.
    pub fn back(&mut self) -> BackOutcome {
        if self.editing {
            self.end_edit();
            BackOutcome::EndedEdit
        } else if self.mode != MenuMode::Root {
            self.enter_mode(MenuMode::Root);
            BackOutcome::ToRoot
        } else {
            self.close();
            BackOutcome::Closed
        }
    }

    /// Lines for the current mode.
    ///
    /// Shader items carry `[ON]`/`[OFF]`; the field being edited carries its
    /// formatted value.
    pub fn items(&self, shaders: &ShaderFlags, geometry: &Geometry, color_temp: &ColorTemp) -> Vec<String> {
        match self.mode {
            MenuMode::Root => RootItem::ALL.iter().map(|item| item.label().to_string()).collect(),
            MenuMode::ShaderConfig => ShaderEffect::ALL
                .iter()
                .map(|effect| shaders.item(*effect))
                .collect(),
            MenuMode::Geometry => GeometryField::ALL
                .iter()
                .map(|field| {
                    if self.editing && field.index() == self.cursor {
                        format!("{} {}", field.label(), field.format_value(geometry.get(*field)))
                    } else {
                        field.label().to_string()
                    }
                })
                .collect(),
            MenuMode::ColorTemp => ColorTempMode::ALL
                .iter()
                .map(|mode| {
                    if self.editing && *mode == ColorTempMode::User {
                        format!("{} {}K", mode.label(), color_temp.display_value())
                    } else {
                        mode.label().to_string()
                    }
                })
                .collect(),
        }
    }

    fn reset(&mut self) {
        self.mode = MenuMode::Root;
        self.cursor = 0;
        self.editing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(menu: &OsdMenu) -> Vec<String> {
        menu.items(&ShaderFlags::default(), &Geometry::default(), &ColorTemp::default())
    }

    #[test]
    fn test_cursor_wraps_per_mode() {
        let mut menu = OsdMenu::new();
        menu.open();
        menu.move_cursor(Direction::Up);
        assert_eq!(menu.cursor(), 3);

        menu.enter_mode(MenuMode::ColorTemp);
        menu.move_cursor(Direction::Up);
        assert_eq!(menu.cursor(), 2);
        menu.move_cursor(Direction::Down);
        assert_eq!(menu.cursor(), 0);

        menu.enter_mode(MenuMode::Geometry);
        for _ in 0..5 {
            menu.move_cursor(Direction::Down);
        }
        assert_eq!(menu.cursor(), 0);
    }

    #[test]
    fn test_back_unwinds_one_level_at_a_time() {
        let mut menu = OsdMenu::new();
        menu.open();
        menu.enter_mode(MenuMode::Geometry);
        menu.move_cursor(Direction::Down);
        menu.start_edit();

        assert_eq!(menu.back(), BackOutcome::EndedEdit);
        assert_eq!(menu.mode(), MenuMode::Geometry);
        assert_eq!(menu.cursor(), 1);

        assert_eq!(menu.back(), BackOutcome::ToRoot);
        assert_eq!(menu.cursor(), 0);

        assert_eq!(menu.back(), BackOutcome::Closed);
        assert!(!menu.is_visible());
    }

    #[test]
    fn test_edit_field_follows_cursor() {
        let mut menu = OsdMenu::new();
        menu.open();
        menu.enter_mode(MenuMode::Geometry);
        assert_eq!(menu.edit_field(), None);

        menu.move_cursor(Direction::Down);
        menu.move_cursor(Direction::Down);
        menu.start_edit();
        assert_eq!(menu.edit_field(), Some(FieldId::Geometry(GeometryField::Rotate)));

        menu.enter_mode(MenuMode::ColorTemp);
        menu.start_edit();
        assert_eq!(menu.edit_field(), Some(FieldId::Kelvin));
    }

    #[test]
    fn test_items_per_mode() {
        let mut menu = OsdMenu::new();
        menu.open();
        assert_eq!(items(&menu), ["OPEN MEDIA", "SHADERS", "GEOMETRY", "COLOR TEMP"]);

        menu.enter_mode(MenuMode::ShaderConfig);
        assert_eq!(items(&menu)[0], "SUNLIGHT [ON]");

        menu.enter_mode(MenuMode::Geometry);
        assert_eq!(items(&menu)[0], "H STRETCH");
        menu.start_edit();
        assert_eq!(items(&menu)[0], "H STRETCH 100%");

        menu.enter_mode(MenuMode::ColorTemp);
        menu.move_cursor(Direction::Up);
        menu.start_edit();
        assert_eq!(items(&menu), ["6500K", "5600K", "USER 6500K"]);
    }
}
