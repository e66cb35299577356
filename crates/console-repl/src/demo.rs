//! Demo world
//!
//! A handful of world objects and the commands a game would expose for
//! them. Plays the discovery role: everything is registered through
//! [`Registration`]s or the typed handler shortcuts.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

use console_core::{
    CommandRegistry, FnInvocable, OperationId, Receiver, Registration, SharedRegistry, Signature,
};
use parking_lot::Mutex;

/// Controllable character
#[derive(Debug)]
pub struct Player {
    name: String,
    health: AtomicI32,
    position: Mutex<(f32, f32)>,
}

impl Player {
    /// Player at the origin with full health
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            health: AtomicI32::new(100),
            position: Mutex::new((0.0, 0.0)),
        }
    }

    /// Current health
    pub fn health(&self) -> i32 {
        self.health.load(Ordering::SeqCst)
    }

    /// Current position
    pub fn position(&self) -> (f32, f32) {
        *self.position.lock()
    }
}

/// Door with a numeric lock
#[derive(Debug)]
pub struct Door {
    name: String,
    code: u32,
    open: AtomicBool,
    locked: AtomicBool,
}

impl Door {
    /// Closed door, locked when `code` is non-zero
    pub fn new(name: impl Into<String>, code: u32) -> Self {
        Self {
            name: name.into(),
            code,
            open: AtomicBool::new(false),
            locked: AtomicBool::new(code != 0),
        }
    }

    /// Whether the door is open
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Label world objects by name
pub fn world_labels(receiver: &Receiver) -> Option<String> {
    if let Some(player) = receiver.downcast_ref::<Player>() {
        return Some(player.name.clone());
    }
    receiver.downcast_ref::<Door>().map(|door| door.name.clone())
}

fn echo(text: String) -> String {
    text
}

fn add(a: i32, b: i32) -> i32 {
    a + b
}

fn set_health(player: &Player, amount: i32) -> String {
    player.health.store(amount, Ordering::SeqCst);
    format!("{} health set to {amount}", player.name)
}

fn damage(player: &Player, amount: i32) -> String {
    let left = player.health.fetch_sub(amount, Ordering::SeqCst) - amount;
    format!("{} took {amount} damage, {left} left", player.name)
}

fn teleport(player: &Player, x: f32, y: f32) {
    *player.position.lock() = (x, y);
}

fn where_am_i(player: &Player) -> String {
    let (x, y) = player.position();
    format!("{} is at ({x}, {y})", player.name)
}

fn open_door(door: &Door) -> Result<String, String> {
    if door.locked.load(Ordering::SeqCst) {
        return Err(format!("{} is locked", door.name));
    }
    door.open.store(true, Ordering::SeqCst);
    Ok(format!("{} opened", door.name))
}

fn close_door(door: &Door) {
    door.open.store(false, Ordering::SeqCst);
}

fn unlock(door: &Door, code: u32) -> Result<String, String> {
    if code != door.code {
        return Err(format!("wrong code for {}", door.name));
    }
    door.locked.store(false, Ordering::SeqCst);
    Ok(format!("{} unlocked", door.name))
}

/// The demo scene
#[derive(Debug, Clone)]
pub struct DemoWorld {
    player: Arc<Player>,
    doors: Vec<Arc<Door>>,
}

impl Default for DemoWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoWorld {
    /// A hero, an unlocked gate and a locked vault
    pub fn new() -> Self {
        Self {
            player: Arc::new(Player::new("Hero")),
            doors: vec![
                Arc::new(Door::new("Gate", 0)),
                Arc::new(Door::new("Vault", 1234)),
            ],
        }
    }

    /// The player
    pub fn player(&self) -> &Arc<Player> {
        &self.player
    }

    /// Door named `name`
    pub fn door(&self, name: &str) -> Option<&Arc<Door>> {
        self.doors.iter().find(|door| door.name == name)
    }

    /// Empty registry that labels this world's objects
    pub fn empty_registry() -> CommandRegistry {
        CommandRegistry::with_resolver(world_labels)
    }

    /// Registry holding every demo command
    pub fn registry(&self) -> console_core::Result<CommandRegistry> {
        let mut registry = Self::empty_registry();
        self.populate(&mut registry)?;
        Ok(registry)
    }

    /// Register every demo command into `registry`. Returns how many.
    pub fn populate(&self, registry: &mut CommandRegistry) -> console_core::Result<usize> {
        let before = registry.len();

        registry.register_fn("Echo", echo)?;
        registry.register_fn("Add", add)?;
        registry.register_fn("Shout", |text: String| text.to_uppercase())?;

        registry.register_declared(
            Registration::new(Arc::new(FnInvocable::function("Clear", || {})))
                .with_group("debug")
                .with_description("Clear the console output"),
        )?;

        let player = &self.player;
        registry.register_method("SetHealth", Arc::clone(player), set_health)?;
        registry.register_method("Damage", Arc::clone(player), damage)?;
        registry.register_method("Teleport", Arc::clone(player), teleport)?;
        registry.register_method("WhereAmI", Arc::clone(player), where_am_i)?;

        for door in &self.doors {
            registry.register_method("Open", Arc::clone(door), open_door)?;
            registry.register_method("Close", Arc::clone(door), close_door)?;
            registry.register_declared(
                Registration::new(Arc::new(FnInvocable::method("Unlock", unlock)))
                    .with_receiver(Receiver::new(Arc::clone(door)))
                    .with_group("doors"),
            )?;
        }

        // Takes a non-primitive parameter, so the registry refuses it
        let look_at = FnInvocable::new(
            OperationId::named("Player.LookAt"),
            Signature::new("LookAt")
                .with_owner("Player")
                .with_param("target", "Transform")
                .bound(),
            |_, _| Ok(None),
        );
        let refused = registry.register_declared(
            Registration::new(Arc::new(look_at)).with_receiver(Receiver::new(Arc::clone(player))),
        );
        if let Err(e) = refused {
            tracing::debug!(error = %e, "Demo command skipped");
        }

        Ok(registry.len() - before)
    }

    /// Rebuild `shared` from scratch in one swap. Returns the live count.
    pub fn reload(&self, shared: &SharedRegistry) -> console_core::Result<usize> {
        let mut staged = shared.begin_reload();
        self.populate(&mut staged)?;
        Ok(staged.commit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_registry() {
        let world = DemoWorld::new();
        let registry = world.registry().unwrap();

        // 4 free, 4 player, 3 per door
        assert_eq!(registry.len(), 14);
        assert!(registry.find_by_name("LookAt").is_none());
        assert_eq!(registry.find_by_name("Clear").unwrap().group(), "debug");
        assert_eq!(registry.find_by_name("Shout").unwrap().full_name(), "Lambda Expression");
    }

    #[test]
    fn test_world_labels() {
        let world = DemoWorld::new();
        let registry = world.registry().unwrap();

        let labels: Vec<_> = registry
            .iter()
            .filter(|c| c.name() == "Open")
            .map(|c| c.target_label().to_string())
            .collect();
        assert_eq!(labels, vec!["Gate", "Vault"]);
        assert_eq!(registry.find_by_name("Damage").unwrap().target_label(), "Hero");
        assert_eq!(registry.find_by_name("Echo").unwrap().target_label(), "");
    }

    #[test]
    fn test_methods_mutate_world() {
        let world = DemoWorld::new();
        let registry = world.registry().unwrap();

        registry
            .find_by_name("Teleport")
            .unwrap()
            .execute(&["3", "-1.5"])
            .unwrap();
        assert_eq!(world.player().position(), (3.0, -1.5));

        let out = registry
            .find_by_name("Damage")
            .unwrap()
            .execute(&["30"])
            .unwrap();
        assert_eq!(out.as_deref(), Some("Hero took 30 damage, 70 left"));
        assert_eq!(world.player().health(), 70);
    }

    #[test]
    fn test_reload_is_idempotent() {
        let world = DemoWorld::new();
        let shared = SharedRegistry::new(world.registry().unwrap());

        assert_eq!(world.reload(&shared).unwrap(), 14);
        assert_eq!(shared.snapshot().len(), 14);
    }
}
