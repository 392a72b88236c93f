//! Roll animation systems
//!
//! Turns roll requests into spin tweens, refreshes face labels, and reveals
//! each roll's title once its delay has passed.

use bevy::prelude::*;

use super::setup::{CUBE_SIZE, LABEL_OFFSET};
use crate::roller::meshes::{label_mesh, label_scale};
use crate::roller::types::*;

/// Run the animator for every roll request received this frame.
pub fn start_rolls(
    mut requests: MessageReader<RollRequested>,
    mut session: ResMut<RollerSession>,
    mut rng: ResMut<RollRng>,
    mut reveals: ResMut<RevealQueue>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut cube: Query<&mut SpinAnimation, (With<CubeRoot>, Without<CoinRoot>)>,
    mut coin: Query<&mut SpinAnimation, (With<CoinRoot>, Without<CubeRoot>)>,
    mut labels: Query<(&FaceLabel, &mut Mesh3d, &mut Transform)>,
    mut title: Query<&mut Text, With<ResultTitleText>>,
) {
    for _ in requests.read() {
        let config = session.config.clone();
        let plan = match session.animator.roll(&config, &mut rng.0) {
            Ok(plan) => plan,
            Err(e) => {
                error!("Roll failed: {}", e);
                session.phase = RollPhase::Idle;
                for mut text in title.iter_mut() {
                    text.0 = ERROR_LABEL.to_string();
                }
                continue;
            }
        };

        match plan.visual {
            RollVisual::Coin { rotation_y, .. } => {
                for mut spin in coin.iter_mut() {
                    spin.retarget((0.0, rotation_y));
                }
            }
            RollVisual::Dice {
                faces,
                rotation_x,
                rotation_y,
                recovered,
                ..
            } => {
                for mut spin in cube.iter_mut() {
                    if recovered {
                        *spin = SpinAnimation::default();
                    }
                    spin.retarget((rotation_x, rotation_y));
                }
                for (label, mut mesh, mut transform) in labels.iter_mut() {
                    let text = faces[usize::from(label.face.index() - 1)].to_string();
                    mesh.0 = meshes.add(label_mesh(&text));
                    *transform = face_label_transform(
                        label.face,
                        LABEL_OFFSET,
                        label_scale(text.len(), CUBE_SIZE),
                    );
                }
            }
        }

        session.phase = RollPhase::Rolling;
        for mut text in title.iter_mut() {
            text.0 = ROLLING_LABEL.to_string();
        }
        reveals.schedule(plan.outcome, config);
    }
}

/// Advance the tweens and apply them to the cube and coin transforms.
pub fn animate_spins(
    time: Res<Time>,
    mut cube: Query<(&mut SpinAnimation, &mut Transform), (With<CubeRoot>, Without<CoinRoot>)>,
    mut coin: Query<(&mut SpinAnimation, &mut Transform), (With<CoinRoot>, Without<CubeRoot>)>,
) {
    let delta = time.delta_secs();
    for (mut spin, mut transform) in cube.iter_mut() {
        if spin.is_finished() {
            continue;
        }
        spin.advance(delta);
        let (x, y) = spin.current();
        transform.rotation = cube_rotation(x, y);
    }
    for (mut spin, mut transform) in coin.iter_mut() {
        if spin.is_finished() {
            continue;
        }
        spin.advance(delta);
        transform.rotation = coin_rotation(spin.current().1);
    }
}

/// Show titles whose delay has elapsed. Every reveal fires, even when a later
/// roll has already started. A settled roll goes back to idle one frame after
/// its title is shown.
pub fn reveal_titles(
    time: Res<Time>,
    mut reveals: ResMut<RevealQueue>,
    mut session: ResMut<RollerSession>,
    mut title: Query<&mut Text, With<ResultTitleText>>,
) {
    if reveals.pending.is_empty() {
        if session.phase == RollPhase::Settled {
            session.phase = RollPhase::Idle;
        }
        return;
    }
    for resolved in reveals.tick(time.delta_secs()) {
        info!("Result: {}", resolved);
        for mut text in title.iter_mut() {
            text.0 = resolved.clone();
        }
    }
    if reveals.pending.is_empty() && session.phase == RollPhase::Rolling {
        session.phase = RollPhase::Settled;
    }
}

/// Show the coin for two sides and the cube otherwise.
pub fn sync_visual_kind(
    session: Res<RollerSession>,
    mut cube: Query<&mut Visibility, (With<CubeRoot>, Without<CoinRoot>)>,
    mut coin: Query<&mut Visibility, (With<CoinRoot>, Without<CubeRoot>)>,
) {
    if !session.is_changed() {
        return;
    }
    let coin_mode = session.config.is_coin();
    for mut visibility in cube.iter_mut() {
        visibility.set_if_neq(if coin_mode {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        });
    }
    for mut visibility in coin.iter_mut() {
        visibility.set_if_neq(if coin_mode {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        });
    }
}

pub fn update_status_text(
    session: Res<RollerSession>,
    mut status: Query<&mut Text, With<StatusText>>,
) {
    if !session.is_changed() {
        return;
    }
    let line = session.status_line();
    for mut text in status.iter_mut() {
        if text.0 != line {
            text.0 = line.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roller::animator::RngSource;
    use bevy::ecs::message::Messages;
    use bevy::ecs::system::RunSystemOnce;
    use std::time::Duration;

    fn roller_world(sides: u32) -> World {
        let mut world = World::new();
        world.insert_resource(RollerSession::new(DiceConfig::new(sides), None));
        world.insert_resource(RollRng(RngSource::seeded(11)));
        world.insert_resource(RevealQueue::default());
        world.insert_resource(Assets::<Mesh>::default());
        world.insert_resource(Time::<()>::default());
        world.init_resource::<Messages<RollRequested>>();
        world.spawn((Text::new(""), ResultTitleText));
        world.spawn((CubeRoot, SpinAnimation::default()));
        world.spawn((CoinRoot, SpinAnimation::default()));
        world
    }

    fn advance(world: &mut World, millis: u64) {
        world
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(millis));
        world.run_system_once(reveal_titles).unwrap();
    }

    fn phase(world: &World) -> RollPhase {
        world.resource::<RollerSession>().phase
    }

    fn title(world: &mut World) -> String {
        let mut query = world.query_filtered::<&Text, With<ResultTitleText>>();
        query.single(world).unwrap().0.clone()
    }

    #[test]
    fn test_roll_phases_cycle_back_to_idle() {
        let mut world = roller_world(6);
        assert_eq!(phase(&world), RollPhase::Idle);

        world
            .resource_mut::<Messages<RollRequested>>()
            .write(RollRequested);
        world.run_system_once(start_rolls).unwrap();
        assert_eq!(phase(&world), RollPhase::Rolling);
        assert_eq!(title(&mut world), ROLLING_LABEL);

        advance(&mut world, 500);
        assert_eq!(phase(&world), RollPhase::Rolling);

        advance(&mut world, 600);
        assert_eq!(phase(&world), RollPhase::Settled);
        assert!(title(&mut world).starts_with("Side "));

        advance(&mut world, 16);
        assert_eq!(phase(&world), RollPhase::Idle);
    }

    #[test]
    fn test_coin_roll_reveals_heads_or_tails() {
        let mut world = roller_world(2);
        world
            .resource_mut::<Messages<RollRequested>>()
            .write(RollRequested);
        world.run_system_once(start_rolls).unwrap();
        advance(&mut world, 1100);

        let shown = title(&mut world);
        assert!(shown == "Heads" || shown == "Tails", "{}", shown);
        assert_eq!(phase(&world), RollPhase::Settled);
    }
}
