//! Input handling systems
//!
//! Keyboard shortcuts and button clicks for rolling, changing the side count
//! and browsing presets.

use bevy::prelude::*;

use crate::roller::types::*;

/// Space rolls, Up/Down change the side count.
pub fn handle_keyboard(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut session: ResMut<RollerSession>,
    mut rolls: MessageWriter<RollRequested>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        rolls.write(RollRequested);
    }
    if keyboard.just_pressed(KeyCode::ArrowUp) {
        change_sides(&mut session, 1);
    }
    if keyboard.just_pressed(KeyCode::ArrowDown) {
        change_sides(&mut session, -1);
    }
}

pub fn handle_roll_button(
    buttons: Query<&Interaction, (Changed<Interaction>, With<RollButton>)>,
    mut rolls: MessageWriter<RollRequested>,
) {
    for interaction in buttons.iter() {
        if *interaction == Interaction::Pressed {
            rolls.write(RollRequested);
        }
    }
}

pub fn handle_sides_buttons(
    buttons: Query<(&Interaction, &SidesButton), Changed<Interaction>>,
    mut session: ResMut<RollerSession>,
) {
    for (interaction, button) in buttons.iter() {
        if *interaction == Interaction::Pressed {
            change_sides(&mut session, button.0);
        }
    }
}

pub fn handle_preset_buttons(
    buttons: Query<(&Interaction, &PresetButton), Changed<Interaction>>,
    mut session: ResMut<RollerSession>,
) {
    for (interaction, button) in buttons.iter() {
        if *interaction == Interaction::Pressed {
            apply_preset_action(&mut session, *button);
        }
    }
}

/// Step the side count, clamp it and auto-save the configuration.
pub fn change_sides(session: &mut RollerSession, delta: i32) {
    let requested = i64::from(session.config.sides) + i64::from(delta);
    let before = session.config.sides;
    session
        .config
        .set_sides(requested.clamp(0, i64::from(MAX_SIDES)) as u32);
    if session.config.sides == before {
        return;
    }

    session.notice = None;
    if let Some(store) = &session.store {
        if let Err(e) = store.save(&session.config) {
            warn!("Failed to save dice configuration: {}", e);
            session.notice = Some("Could not save settings".to_string());
        }
    }
}

/// Re-read the preset list, keeping the cursor in range.
pub fn refresh_presets(session: &mut RollerSession) {
    let Some(store) = &session.store else {
        session.presets.clear();
        return;
    };
    match store.list_presets() {
        Ok(presets) => session.presets = presets,
        Err(e) => {
            warn!("Failed to list presets: {}", e);
            session.presets.clear();
        }
    }
    if session.preset_cursor >= session.presets.len() {
        session.preset_cursor = session.presets.len().saturating_sub(1);
    }
}

pub fn apply_preset_action(session: &mut RollerSession, action: PresetButton) {
    let count = session.presets.len();
    if count == 0 {
        session.notice = Some("No presets saved".to_string());
        return;
    }

    match action {
        PresetButton::Previous => {
            session.preset_cursor = (session.preset_cursor + count - 1) % count;
            session.notice = None;
        }
        PresetButton::Next => {
            session.preset_cursor = (session.preset_cursor + 1) % count;
            session.notice = None;
        }
        PresetButton::Load | PresetButton::Delete => {
            let Some(entry) = session.selected_preset().cloned() else {
                return;
            };
            let Some(store) = &session.store else {
                session.notice = Some("Storage unavailable".to_string());
                return;
            };

            if action == PresetButton::Load {
                match store.load_preset(entry.id) {
                    Ok(config) => {
                        info!("Loaded preset {}", entry.label());
                        session.config = config;
                        session.notice = Some(format!("Loaded {}", entry.name));
                    }
                    Err(e) => {
                        warn!("Failed to load preset {}: {}", entry.id, e);
                        session.notice = Some("Error loading preset".to_string());
                    }
                }
            } else {
                match store.delete_preset(entry.id) {
                    Ok(()) => {
                        info!("Deleted preset {}", entry.label());
                        session.notice = Some(format!("Deleted {}", entry.name));
                        refresh_presets(session);
                    }
                    Err(e) => {
                        warn!("Failed to delete preset {}: {}", entry.id, e);
                        session.notice = Some("Error deleting preset".to_string());
                    }
                }
            }
        }
    }
}
