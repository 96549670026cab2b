//! Selection capability and group commands over the selected sheep.

use bevy::prelude::*;

use super::registry::WorldRegistry;
use super::sheep::{Sheep, SheepKind};
use crate::{GameSet, gameplay_running};

/// Optional capability: the agent can be picked by the player.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Selectable {
    selected: bool,
}

impl Selectable {
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    pub const fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Flips the flag and returns the new value.
    pub const fn toggle(&mut self) -> bool {
        self.selected = !self.selected;
        self.selected
    }
}

/// A sheep's selection flag changed.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct SelectionChanged {
    pub entity: Entity,
    pub name: String,
    pub selected: bool,
}

/// Give every selected sheep this kind, then clear the selection.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignKind(pub SheepKind);

/// Drains the selection set once per [`AssignKind`]. Names whose sheep is
/// gone are skipped.
fn assign_kind_to_selected(
    mut orders: MessageReader<AssignKind>,
    mut registry: ResMut<WorldRegistry>,
    mut flock: Query<(&mut Sheep, Option<&mut Selectable>)>,
    mut changes: MessageWriter<SelectionChanged>,
) {
    for AssignKind(kind) in orders.read() {
        let names = registry.take_selected();
        info!(
            "assigning {} to {} selected sheep",
            kind.display_name(),
            names.len()
        );

        for name in names {
            let Some(entity) = registry.sheep(&name) else {
                continue;
            };
            let Ok((mut sheep, selectable)) = flock.get_mut(entity) else {
                continue;
            };
            sheep.kind = *kind;
            if let Some(mut selectable) = selectable {
                selectable.set_selected(false);
            }
            changes.write(SelectionChanged {
                entity,
                name,
                selected: false,
            });
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Selectable>()
        .add_message::<SelectionChanged>()
        .add_message::<AssignKind>();

    app.add_systems(
        Update,
        assign_kind_to_selected
            .in_set(GameSet::Input)
            .after(super::input::InputCommands)
            .run_if(gameplay_running),
    );
}
