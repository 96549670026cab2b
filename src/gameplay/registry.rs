//! The world registry: name lookups for every agent, the selection set and the map.
//!
//! Agents refer to each other by name. Every use resolves the name here and
//! re-checks the entity, so a name whose agent is gone simply stops resolving.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use bevy::prelude::*;
use thiserror::Error;

use super::dog::Dog;
use super::map::TileMap;
use super::selection::Selectable;
use super::sheep::Sheep;
use crate::GameState;

/// Which table a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Sheep,
    Dog,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sheep => f.write_str("sheep"),
            Self::Dog => f.write_str("dog"),
        }
    }
}

/// Why an agent could not be created. The registry is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpawnError {
    #[error("{kind} needs a name")]
    MissingName { kind: AgentKind },
    #[error("{kind} named {name:?} already exists")]
    DuplicateName { kind: AgentKind, name: String },
    #[error("{kind} {name:?} needs a finite position")]
    InvalidPosition { kind: AgentKind, name: String },
}

/// Name tables for sheep and dogs, the selected sheep names and the current map.
///
/// Lives only while `GameState::InGame` is active.
#[derive(Resource, Debug, Default)]
pub struct WorldRegistry {
    sheep: HashMap<String, Entity>,
    dogs: HashMap<String, Entity>,
    selected: BTreeSet<String>,
    map: TileMap,
}

impl WorldRegistry {
    #[must_use]
    pub fn new(map: TileMap) -> Self {
        Self {
            map,
            ..default()
        }
    }

    #[must_use]
    pub const fn map(&self) -> &TileMap {
        &self.map
    }

    // --- sheep ---

    #[must_use]
    pub fn sheep(&self, name: &str) -> Option<Entity> {
        self.sheep.get(name).copied()
    }

    #[must_use]
    pub fn sheep_count(&self) -> usize {
        self.sheep.len()
    }

    /// Checks that a new sheep may take `name`.
    pub fn check_sheep_name(&self, name: &str) -> Result<(), SpawnError> {
        check_name(&self.sheep, AgentKind::Sheep, name)
    }

    pub fn register_sheep(&mut self, name: &str, entity: Entity) -> Result<(), SpawnError> {
        self.check_sheep_name(name)?;
        self.sheep.insert(name.to_owned(), entity);
        Ok(())
    }

    /// Forgets `name` if it still points at `entity`. Also drops it from the selection.
    pub fn unregister_sheep(&mut self, name: &str, entity: Entity) -> bool {
        if self.sheep.get(name) != Some(&entity) {
            return false;
        }
        self.sheep.remove(name);
        self.selected.remove(name);
        true
    }

    // --- dogs ---

    #[must_use]
    pub fn dog(&self, name: &str) -> Option<Entity> {
        self.dogs.get(name).copied()
    }

    #[must_use]
    pub fn dog_count(&self) -> usize {
        self.dogs.len()
    }

    pub fn check_dog_name(&self, name: &str) -> Result<(), SpawnError> {
        check_name(&self.dogs, AgentKind::Dog, name)
    }

    pub fn register_dog(&mut self, name: &str, entity: Entity) -> Result<(), SpawnError> {
        self.check_dog_name(name)?;
        self.dogs.insert(name.to_owned(), entity);
        Ok(())
    }

    pub fn unregister_dog(&mut self, name: &str, entity: Entity) -> bool {
        if self.dogs.get(name) != Some(&entity) {
            return false;
        }
        self.dogs.remove(name);
        true
    }

    // --- selection ---

    #[must_use]
    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    /// Selected names in sorted order.
    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Flips the selection of `name` in both the set and the component.
    /// Returns the new selection state.
    pub fn toggle_selection(&mut self, name: &str, selectable: &mut Selectable) -> bool {
        let selected = !self.selected.contains(name);
        if selected {
            self.selected.insert(name.to_owned());
        } else {
            self.selected.remove(name);
        }
        selectable.set_selected(selected);
        selected
    }

    /// Empties the selection set, returning what was in it.
    pub fn take_selected(&mut self) -> Vec<String> {
        std::mem::take(&mut self.selected).into_iter().collect()
    }
}

fn check_name(
    table: &HashMap<String, Entity>,
    kind: AgentKind,
    name: &str,
) -> Result<(), SpawnError> {
    if name.trim().is_empty() {
        return Err(SpawnError::MissingName { kind });
    }
    if table.contains_key(name) {
        return Err(SpawnError::DuplicateName {
            kind,
            name: name.to_owned(),
        });
    }
    Ok(())
}

// === Observers ===

fn unregister_removed_sheep(
    remove: On<Remove, Sheep>,
    flock: Query<&Sheep>,
    registry: Option<ResMut<WorldRegistry>>,
) {
    let Some(mut registry) = registry else {
        return;
    };
    let Ok(sheep) = flock.get(remove.entity) else {
        return;
    };
    if registry.unregister_sheep(&sheep.name, remove.entity) {
        debug!("sheep {} left the registry", sheep.name);
    }
}

fn unregister_removed_dog(
    remove: On<Remove, Dog>,
    dogs: Query<&Dog>,
    registry: Option<ResMut<WorldRegistry>>,
) {
    let Some(mut registry) = registry else {
        return;
    };
    let Ok(dog) = dogs.get(remove.entity) else {
        return;
    };
    if registry.unregister_dog(&dog.name, remove.entity) {
        debug!("dog {} left the registry", dog.name);
    }
}

fn drop_registry(mut commands: Commands) {
    commands.remove_resource::<WorldRegistry>();
    info!("world registry torn down");
}

pub(crate) fn add_registry_observers(app: &mut App) {
    app.add_observer(unregister_removed_sheep)
        .add_observer(unregister_removed_dog);
}

pub(super) fn plugin(app: &mut App) {
    add_registry_observers(app);
    app.add_systems(OnExit(GameState::InGame), drop_registry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// `N` distinct entity ids.
    fn entities<const N: usize>() -> [Entity; N] {
        let mut world = World::new();
        std::array::from_fn(|_| world.spawn_empty().id())
    }

    #[test]
    fn duplicate_sheep_name_is_rejected_without_mutation() {
        let [first, second] = entities();
        let mut registry = WorldRegistry::default();
        registry.register_sheep("a", first).unwrap();

        let result = registry.register_sheep("a", second);

        assert_eq!(
            result,
            Err(SpawnError::DuplicateName {
                kind: AgentKind::Sheep,
                name: "a".to_owned()
            })
        );
        assert_eq!(registry.sheep("a"), Some(first));
        assert_eq!(registry.sheep_count(), 1);
    }

    #[test]
    fn blank_names_are_rejected() {
        let [dog] = entities();
        let mut registry = WorldRegistry::default();
        assert_eq!(
            registry.register_dog("  ", dog),
            Err(SpawnError::MissingName {
                kind: AgentKind::Dog
            })
        );
        assert_eq!(registry.dog_count(), 0);
    }

    #[test]
    fn sheep_and_dogs_have_separate_tables() {
        let [sheep, dog] = entities();
        let mut registry = WorldRegistry::default();
        registry.register_sheep("rex", sheep).unwrap();
        registry.register_dog("rex", dog).unwrap();

        assert_eq!(registry.sheep("rex"), Some(sheep));
        assert_eq!(registry.dog("rex"), Some(dog));
    }

    #[test]
    fn toggling_twice_is_involutive() {
        let [a, b] = entities();
        let mut registry = WorldRegistry::default();
        registry.register_sheep("a", a).unwrap();
        registry.register_sheep("b", b).unwrap();
        let mut other = Selectable::default();
        registry.toggle_selection("b", &mut other);

        let mut selectable = Selectable::default();
        let before: Vec<String> = registry.selected().map(str::to_owned).collect();

        assert!(registry.toggle_selection("a", &mut selectable));
        assert!(selectable.is_selected());
        assert!(!registry.toggle_selection("a", &mut selectable));

        let after: Vec<String> = registry.selected().map(str::to_owned).collect();
        assert!(!selectable.is_selected());
        assert_eq!(before, after);
    }

    #[test]
    fn take_selected_drains_the_set() {
        let mut registry = WorldRegistry::default();
        let mut selectable = Selectable::default();
        registry.toggle_selection("b", &mut selectable);
        registry.toggle_selection("a", &mut Selectable::default());

        assert_eq!(registry.take_selected(), vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(registry.selected().count(), 0);
    }

    #[test]
    fn unregister_ignores_stale_entities() {
        let [live, stale] = entities();
        let mut registry = WorldRegistry::default();
        registry.register_sheep("a", live).unwrap();

        assert!(!registry.unregister_sheep("a", stale));
        assert_eq!(registry.sheep("a"), Some(live));

        registry.toggle_selection("a", &mut Selectable::default());
        assert!(registry.unregister_sheep("a", live));
        assert_eq!(registry.sheep("a"), None);
        assert!(!registry.is_selected("a"));
    }
}
