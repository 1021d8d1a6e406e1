//! Example: Drive the front panel through a short session.
//!
//! Run with: `RUST_LOG=debug cargo run --example front_panel`

use pvm_panel_core::{
    Command, Direction, FrontPanel, GeometryField, InputKey, MemoryStore, PanelConfig,
    PanelError, RecordingRenderer, VirtualScheduler,
};

fn main() -> Result<(), PanelError> {
    // Initialize logging (optional)
    env_logger::init();

    let mut panel = FrontPanel::new(
        PanelConfig::default(),
        RecordingRenderer::new(),
        VirtualScheduler::new(),
    )
    .with_store(MemoryStore::new());

    panel.dispatch(Command::PowerOn)?;
    panel.dispatch(Command::PressSource(InputKey::B))?;

    // Geometry submenu, edit H STRETCH, nudge it and write it as the default.
    let script = [
        Command::Menu,
        Command::MoveCursor(Direction::Down),
        Command::MoveCursor(Direction::Down),
        Command::Enter,
        Command::Enter,
        Command::MoveCursor(Direction::Up),
        Command::MoveCursor(Direction::Up),
        Command::PressDegauss,
        Command::PressDegauss,
    ];
    for command in script {
        panel.dispatch(command)?;
    }

    if let Some(readout) = panel.geometry_readout() {
        println!(
            "{} {}: {} (default {}) #{}{}{}",
            readout.input_label,
            readout.param_label(),
            readout.value,
            readout.default_value,
            readout.index,
            if readout.star { " *" } else { "" },
            if readout.write { " WRITE" } else { "" },
        );
    }
    println!("Menu: {:?}", panel.current_items());

    panel.advance(1000);
    println!(
        "After flash: armed={} star={}",
        panel.write_armed(),
        panel.star_flash()
    );

    // Close the menu and degauss.
    for command in [Command::Back, Command::Back, Command::Back, Command::PressDegauss] {
        panel.dispatch(command)?;
    }
    panel.advance(10_000);

    panel.dispatch(Command::PowerOff)?;
    println!(
        "H STRETCH default for {}: {:?}",
        InputKey::B.label(),
        panel
            .session_defaults()
            .get(InputKey::B, GeometryField::HStretch.into())
    );

    for effect in panel.renderer().effects() {
        println!("  {:?}", effect);
    }

    Ok(())
}
