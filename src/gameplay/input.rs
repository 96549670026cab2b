//! Player input: click a sheep to toggle its selection, keys for group commands.
//!
//! | Key | Effect on the selected sheep |
//! |-----|------------------------------|
//! | B / S / C / N | become bomber / shielder / commando / standard |
//! | P | start pathing |
//! | G | go back to grazing |

use bevy::prelude::*;

use super::registry::WorldRegistry;
use super::selection::{AssignKind, Selectable, SelectionChanged};
use super::sheep::{Order, Sheep, SheepKind, SheepOrder};
use crate::{GameSet, gameplay_running};

/// A click picks the nearest sheep within this distance of the cursor (pixels).
pub const PICK_RADIUS: f32 = 16.0;

/// Systems that turn raw input into messages. Message consumers in
/// `GameSet::Input` run after it.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputCommands;

/// World position under the mouse, if the cursor is over the window.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct CursorWorld(pub Option<Vec2>);

/// Kind assigned by a key, if it is one of the kind keys.
#[must_use]
pub const fn kind_for_key(key: KeyCode) -> Option<SheepKind> {
    match key {
        KeyCode::KeyB => Some(SheepKind::Bomber),
        KeyCode::KeyS => Some(SheepKind::Shielder),
        KeyCode::KeyC => Some(SheepKind::Commando),
        KeyCode::KeyN => Some(SheepKind::Standard),
        _ => None,
    }
}

/// Group order sent to each selected sheep by a key.
#[must_use]
pub const fn order_for_key(key: KeyCode) -> Option<Order> {
    match key {
        KeyCode::KeyP => Some(Order::StartPathing),
        KeyCode::KeyG => Some(Order::Graze),
        _ => None,
    }
}

fn track_cursor(
    window: Single<&Window>,
    camera: Single<(&Camera, &GlobalTransform), With<Camera2d>>,
    mut cursor: ResMut<CursorWorld>,
) {
    let (camera, camera_global) = *camera;
    let world = window
        .cursor_position()
        .and_then(|screen_pos| camera.viewport_to_world_2d(camera_global, screen_pos).ok());
    cursor.set_if_neq(CursorWorld(world));
}

/// Toggles the selection of the sheep under the cursor.
fn click_to_select(
    mouse: Res<ButtonInput<MouseButton>>,
    cursor: Res<CursorWorld>,
    mut registry: ResMut<WorldRegistry>,
    mut flock: Query<(Entity, &Sheep, &Transform, &mut Selectable)>,
    mut changes: MessageWriter<SelectionChanged>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(point) = cursor.0 else {
        return;
    };

    let mut nearest: Option<(Entity, f32)> = None;
    for (entity, _, transform, _) in &flock {
        let dist = transform.translation.truncate().distance(point);
        if dist <= PICK_RADIUS && nearest.is_none_or(|(_, d)| dist < d) {
            nearest = Some((entity, dist));
        }
    }
    let Some((entity, _)) = nearest else {
        return;
    };
    let Ok((_, sheep, _, mut selectable)) = flock.get_mut(entity) else {
        return;
    };

    let selected = registry.toggle_selection(&sheep.name, &mut selectable);
    debug!("sheep {} selected: {selected}", sheep.name);
    changes.write(SelectionChanged {
        entity,
        name: sheep.name.clone(),
        selected,
    });
}

fn keyboard_commands(
    keys: Res<ButtonInput<KeyCode>>,
    registry: Res<WorldRegistry>,
    mut assign: MessageWriter<AssignKind>,
    mut orders: MessageWriter<SheepOrder>,
) {
    for &key in keys.get_just_pressed() {
        if let Some(kind) = kind_for_key(key) {
            assign.write(AssignKind(kind));
        }
        if let Some(order) = order_for_key(key) {
            for name in registry.selected() {
                orders.write(SheepOrder::new(name, order));
            }
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<CursorWorld>()
        .init_resource::<CursorWorld>();

    app.add_systems(
        Update,
        (track_cursor, click_to_select, keyboard_commands)
            .chain()
            .in_set(InputCommands)
            .in_set(GameSet::Input)
            .run_if(gameplay_running),
    );
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::gameplay::sheep::SheepOptions;
    use crate::testing::{Collected, create_world_test_app, spawn_sheep_in, track_messages};
    use pretty_assertions::assert_eq;

    fn create_input_test_app() -> App {
        let mut app = create_world_test_app();
        app.init_resource::<CursorWorld>()
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<ButtonInput<KeyCode>>()
            .add_message::<SelectionChanged>()
            .add_message::<AssignKind>()
            .add_message::<SheepOrder>();
        app.add_systems(Update, (click_to_select, keyboard_commands));
        track_messages::<SelectionChanged>(&mut app);
        track_messages::<AssignKind>(&mut app);
        track_messages::<SheepOrder>(&mut app);
        app
    }

    fn click_at(app: &mut App, point: Vec2) {
        app.insert_resource(CursorWorld(Some(point)));
        let mut mouse = app.world_mut().resource_mut::<ButtonInput<MouseButton>>();
        mouse.release(MouseButton::Left);
        mouse.press(MouseButton::Left);
        app.update();
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .clear();
    }

    fn press(app: &mut App, key: KeyCode) {
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.release_all();
        keys.press(key);
        app.update();
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().clear();
    }

    #[test]
    fn clicking_a_sheep_toggles_it() {
        let mut app = create_input_test_app();
        let dolly = spawn_sheep_in(&mut app, SheepOptions::new("dolly", Vec2::new(100.0, 0.0)))
            .unwrap();

        click_at(&mut app, Vec2::new(104.0, 3.0));
        assert!(app.world().get::<Selectable>(dolly).unwrap().is_selected());
        assert!(app.world().resource::<WorldRegistry>().is_selected("dolly"));

        click_at(&mut app, Vec2::new(100.0, 0.0));
        assert!(!app.world().get::<Selectable>(dolly).unwrap().is_selected());
        assert!(!app.world().resource::<WorldRegistry>().is_selected("dolly"));

        let changes: Vec<bool> = app
            .world()
            .resource::<Collected<SelectionChanged>>()
            .0
            .iter()
            .map(|change| change.selected)
            .collect();
        assert_eq!(changes, vec![true, false]);
    }

    #[test]
    fn clicking_empty_ground_does_nothing() {
        let mut app = create_input_test_app();
        spawn_sheep_in(&mut app, SheepOptions::new("dolly", Vec2::ZERO)).unwrap();

        click_at(&mut app, Vec2::new(200.0, 200.0));

        assert_eq!(app.world().resource::<WorldRegistry>().selected().count(), 0);
        assert!(app.world().resource::<Collected<SelectionChanged>>().0.is_empty());
    }

    #[test]
    fn kind_key_sends_assign_kind() {
        let mut app = create_input_test_app();

        press(&mut app, KeyCode::KeyS);

        assert_eq!(
            app.world().resource::<Collected<AssignKind>>().0,
            vec![AssignKind(SheepKind::Shielder)]
        );
    }

    #[test]
    fn path_key_orders_every_selected_sheep() {
        let mut app = create_input_test_app();
        spawn_sheep_in(&mut app, SheepOptions::new("a", Vec2::ZERO)).unwrap();
        spawn_sheep_in(&mut app, SheepOptions::new("b", Vec2::new(100.0, 0.0))).unwrap();
        spawn_sheep_in(&mut app, SheepOptions::new("c", Vec2::new(200.0, 0.0))).unwrap();
        click_at(&mut app, Vec2::ZERO);
        click_at(&mut app, Vec2::new(200.0, 0.0));

        press(&mut app, KeyCode::KeyP);

        assert_eq!(
            app.world().resource::<Collected<SheepOrder>>().0,
            vec![
                SheepOrder::new("a", Order::StartPathing),
                SheepOrder::new("c", Order::StartPathing),
            ]
        );
    }
}
