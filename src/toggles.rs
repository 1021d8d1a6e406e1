//! Front-panel toggle lights and shader flags.
//!
//! Both are plain sets of independent booleans. Toggles are driven by panel
//! buttons; shader flags by the SHADERS submenu.

// =============================================================================
// Panel toggles
// =============================================================================

/// A latching front-panel button with its own light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelToggle {
    /// 16:9 aspect.
    Widescreen,
    /// H/V DELAY (pulse cross).
    HvDelay,
    /// UNDERSCAN.
    Underscan,
    /// EXT SYNC.
    ExtSync,
    /// BLUE ONLY.
    BlueOnly,
}

impl PanelToggle {
    /// All toggles in panel order.
    pub const ALL: [PanelToggle; 5] = [
        PanelToggle::Widescreen,
        PanelToggle::HvDelay,
        PanelToggle::Underscan,
        PanelToggle::ExtSync,
        PanelToggle::BlueOnly,
    ];

    /// Silkscreen label.
    pub fn label(self) -> &'static str {
        match self {
            PanelToggle::Widescreen => "16:9",
            PanelToggle::HvDelay => "H/V DELAY",
            PanelToggle::Underscan => "UNDERSCAN",
            PanelToggle::ExtSync => "EXT SYNC",
            PanelToggle::BlueOnly => "BLUE ONLY",
        }
    }

    /// Whether the light is on at power-up.
    pub fn initial(self) -> bool {
        matches!(self, PanelToggle::ExtSync)
    }

    fn index(self) -> usize {
        match self {
            PanelToggle::Widescreen => 0,
            PanelToggle::HvDelay => 1,
            PanelToggle::Underscan => 2,
            PanelToggle::ExtSync => 3,
            PanelToggle::BlueOnly => 4,
        }
    }
}

/// Light state of every [`PanelToggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleLights([bool; 5]);

impl Default for ToggleLights {
    fn default() -> Self {
        Self(PanelToggle::ALL.map(PanelToggle::initial))
    }
}

impl ToggleLights {
    /// Whether `toggle` is lit.
    pub fn is_on(&self, toggle: PanelToggle) -> bool {
        self.0[toggle.index()]
    }

    /// Flip `toggle` and return its new state.
    pub fn flip(&mut self, toggle: PanelToggle) -> bool {
        let slot = &mut self.0[toggle.index()];
        *slot = !*slot;
        *slot
    }
}

// =============================================================================
// Shader flags
// =============================================================================

/// A picture effect listed in the SHADERS submenu, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderEffect {
    /// Ambient glare.
    Sunlight,
    /// Scanline mask.
    Scanlines,
    /// Bloom.
    Bloom,
    /// Corner vignette.
    Vignette,
    /// Phosphor persistence.
    Phosphor,
}

impl ShaderEffect {
    /// All effects in menu order.
    pub const ALL: [ShaderEffect; 5] = [
        ShaderEffect::Sunlight,
        ShaderEffect::Scanlines,
        ShaderEffect::Bloom,
        ShaderEffect::Vignette,
        ShaderEffect::Phosphor,
    ];

    /// Effect at a shader menu cursor position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Menu label without the on/off suffix.
    pub fn label(self) -> &'static str {
        match self {
            ShaderEffect::Sunlight => "SUNLIGHT",
            ShaderEffect::Scanlines => "SCANLINES",
            ShaderEffect::Bloom => "BLOOM",
            ShaderEffect::Vignette => "VIGNETTE",
            ShaderEffect::Phosphor => "PHOSPHOR",
        }
    }

    fn index(self) -> usize {
        match self {
            ShaderEffect::Sunlight => 0,
            ShaderEffect::Scanlines => 1,
            ShaderEffect::Bloom => 2,
            ShaderEffect::Vignette => 3,
            ShaderEffect::Phosphor => 4,
        }
    }
}

/// On/off state of every [`ShaderEffect`]. All start enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderFlags([bool; 5]);

impl Default for ShaderFlags {
    fn default() -> Self {
        Self([true; 5])
    }
}

impl ShaderFlags {
    /// Whether `effect` is enabled.
    pub fn is_on(&self, effect: ShaderEffect) -> bool {
        self.0[effect.index()]
    }

    /// Flip `effect` and return its new state.
    pub fn flip(&mut self, effect: ShaderEffect) -> bool {
        let slot = &mut self.0[effect.index()];
        *slot = !*slot;
        *slot
    }

    /// Menu line, e.g. `BLOOM [ON]`.
    pub fn item(&self, effect: ShaderEffect) -> String {
        let state = if self.is_on(effect) { "ON" } else { "OFF" };
        format!("{} [{}]", effect.label(), state)
    }
}
