//! Scene setup system
//!
//! Spawns the camera, lights, the cube and coin visuals and the overlay UI.

use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;
use std::f32::consts::{FRAC_PI_2, PI};

use crate::roller::meshes::{label_mesh, label_scale};
use crate::roller::types::*;

/// Edge length of the cube.
pub const CUBE_SIZE: f32 = 2.0;
/// Labels float just above the cube surface to avoid z-fighting.
pub const LABEL_OFFSET: f32 = CUBE_SIZE / 2.0 + 0.011;

const COIN_RADIUS: f32 = 1.3;
const COIN_THICKNESS: f32 = 0.15;

const BUTTON_BG: Color = Color::srgb(0.22, 0.24, 0.32);
const PANEL_BG: Color = Color::srgba(0.0, 0.0, 0.0, 0.5);

/// Main setup system - initializes the 3D scene and the overlay UI
pub fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    session: Res<RollerSession>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 0.0, 7.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(3.0, 5.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Fill light from the lower left so no face goes fully dark
    commands.spawn((
        DirectionalLight {
            illuminance: 2500.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(-4.0, -2.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let label_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.1, 0.1, 0.15),
        unlit: true,
        ..default()
    });

    // Cube: numbered 1..6 until the first roll fills in real values
    let cube_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.93, 0.93, 0.9),
        perceptual_roughness: 0.6,
        ..default()
    });
    let cube_visibility = if session.config.is_coin() {
        Visibility::Hidden
    } else {
        Visibility::Inherited
    };
    commands
        .spawn((
            CubeRoot,
            SpinAnimation::default(),
            Transform::default(),
            cube_visibility,
        ))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(meshes.add(Cuboid::new(CUBE_SIZE, CUBE_SIZE, CUBE_SIZE))),
                MeshMaterial3d(cube_material),
            ));
            for face in CubeFace::ALL {
                let text = face.index().to_string();
                parent.spawn((
                    FaceLabel { face },
                    Mesh3d(meshes.add(label_mesh(&text))),
                    MeshMaterial3d(label_material.clone()),
                    face_label_transform(face, LABEL_OFFSET, label_scale(text.len(), CUBE_SIZE)),
                ));
            }
        });

    // Coin: heads toward the camera at rest, tails on the back
    let coin_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.85, 0.68, 0.25),
        metallic: 0.8,
        perceptual_roughness: 0.35,
        ..default()
    });
    let coin_visibility = if session.config.is_coin() {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    let coin_label_offset = COIN_THICKNESS / 2.0 + 0.011;
    let coin_label_scale = label_scale(1, COIN_RADIUS * 1.4);
    commands
        .spawn((
            CoinRoot,
            SpinAnimation::default(),
            Transform::default(),
            coin_visibility,
        ))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(meshes.add(Cylinder::new(COIN_RADIUS, COIN_THICKNESS))),
                MeshMaterial3d(coin_material),
                Transform::from_rotation(Quat::from_rotation_x(FRAC_PI_2)),
            ));
            parent.spawn((
                Mesh3d(meshes.add(label_mesh("H"))),
                MeshMaterial3d(label_material.clone()),
                Transform::from_xyz(0.0, 0.0, coin_label_offset)
                    .with_scale(Vec3::splat(coin_label_scale)),
            ));
            parent.spawn((
                Mesh3d(meshes.add(label_mesh("T"))),
                MeshMaterial3d(label_material.clone()),
                Transform::from_xyz(0.0, 0.0, -coin_label_offset)
                    .with_rotation(Quat::from_rotation_y(PI))
                    .with_scale(Vec3::splat(coin_label_scale)),
            ));
        });

    spawn_overlay(&mut commands, &session);
}

fn spawn_overlay(commands: &mut Commands, session: &RollerSession) {
    // Title at the top
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            top: Val::Px(24.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("Press Space to roll"),
                TextFont {
                    font_size: 42.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                ResultTitleText,
            ));
        });

    // Controls along the bottom
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(0.0),
                width: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                padding: UiRect::all(Val::Px(12.0)),
                row_gap: Val::Px(8.0),
                ..default()
            },
            BackgroundColor(PANEL_BG),
        ))
        .with_children(|panel| {
            panel.spawn((
                Text::new(session.status_line()),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(0.85, 0.85, 0.9)),
                StatusText,
            ));

            panel
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    column_gap: Val::Px(6.0),
                    ..default()
                })
                .with_children(|row| {
                    spawn_button(row, "Sides -", SidesButton(-1));
                    spawn_button(row, "Roll", RollButton);
                    spawn_button(row, "Sides +", SidesButton(1));
                    spawn_button(row, "< Preset", PresetButton::Previous);
                    spawn_button(row, "Preset >", PresetButton::Next);
                    spawn_button(row, "Load", PresetButton::Load);
                    spawn_button(row, "Delete", PresetButton::Delete);
                });
        });
}

fn spawn_button(parent: &mut ChildSpawnerCommands, label: &str, marker: impl Component) {
    parent
        .spawn((
            Button,
            Node {
                padding: UiRect::axes(Val::Px(14.0), Val::Px(8.0)),
                ..default()
            },
            BackgroundColor(BUTTON_BG),
            marker,
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new(label),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}
