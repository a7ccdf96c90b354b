use super::{ObjectId, SceneEnvironment};
use crate::{
    loader::{CameraLoader, ModelLoader},
    player::AnimationSequencePlayer,
};
use log::error;
use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

pub struct ComponentContext<'a> {
    pub object_id: ObjectId,
    pub environment: &'a mut SceneEnvironment,
    /// Wall seconds since the previous tick.
    pub delta: f64,
}

/// Engine lifecycle hooks. Every hook defaults to a no-op.
pub trait Component {
    fn awake(&mut self, _ctx: &mut ComponentContext) {}
    fn start(&mut self, _ctx: &mut ComponentContext) {}
    fn on_enable(&mut self, _ctx: &mut ComponentContext) {}
    fn on_disable(&mut self, _ctx: &mut ComponentContext) {}
    fn on_destroy(&mut self, _ctx: &mut ComponentContext) {}
    fn update(&mut self, _ctx: &mut ComponentContext) {}
}

impl<T> Component for Rc<RefCell<T>>
where
    T: Component,
{
    fn awake(&mut self, ctx: &mut ComponentContext) {
        self.borrow_mut().awake(ctx);
    }

    fn start(&mut self, ctx: &mut ComponentContext) {
        self.borrow_mut().start(ctx);
    }

    fn on_enable(&mut self, ctx: &mut ComponentContext) {
        self.borrow_mut().on_enable(ctx);
    }

    fn on_disable(&mut self, ctx: &mut ComponentContext) {
        self.borrow_mut().on_disable(ctx);
    }

    fn on_destroy(&mut self, ctx: &mut ComponentContext) {
        self.borrow_mut().on_destroy(ctx);
    }

    fn update(&mut self, ctx: &mut ComponentContext) {
        self.borrow_mut().update(ctx);
    }
}

impl Component for ModelLoader {
    fn on_disable(&mut self, _ctx: &mut ComponentContext) {
        self.disable();
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext) {
        self.destroy();
    }
}

impl Component for CameraLoader {
    fn on_disable(&mut self, _ctx: &mut ComponentContext) {
        self.disable();
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext) {
        self.destroy();
    }
}

impl Component for AnimationSequencePlayer {
    fn start(&mut self, _ctx: &mut ComponentContext) {
        if let Err(err) = AnimationSequencePlayer::start(self) {
            error!("failed to start animation sequence: {}", err);
        }
    }

    fn on_disable(&mut self, _ctx: &mut ComponentContext) {
        self.pause();
    }

    fn on_enable(&mut self, _ctx: &mut ComponentContext) {
        self.resume();
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext) {
        self.remove_all_mmd_players();
    }

    fn update(&mut self, ctx: &mut ComponentContext) {
        AnimationSequencePlayer::update(self, ctx.delta);
    }
}

/// Components attached to scene objects, driven through their lifecycle in id order.
#[derive(Default)]
pub struct ComponentStorage {
    components: BTreeMap<ObjectId, Box<dyn Component>>,
    enabled: BTreeSet<ObjectId>,
    started: BTreeSet<ObjectId>,
}

impl ComponentStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Replaces any component already attached to `id`, destroying it first.
    pub fn attach(
        &mut self,
        id: ObjectId,
        component: Box<dyn Component>,
        environment: &mut SceneEnvironment,
    ) {
        self.detach(id, environment);

        let component = self.components.entry(id).or_insert(component);
        let mut ctx = ComponentContext {
            object_id: id,
            environment,
            delta: 0.0,
        };

        component.awake(&mut ctx);
        component.on_enable(&mut ctx);
        self.enabled.insert(id);
    }

    pub fn detach(&mut self, id: ObjectId, environment: &mut SceneEnvironment) {
        let mut component = match self.components.remove(&id) {
            Some(component) => component,
            None => return,
        };
        let mut ctx = ComponentContext {
            object_id: id,
            environment,
            delta: 0.0,
        };

        if self.enabled.remove(&id) {
            component.on_disable(&mut ctx);
        }

        self.started.remove(&id);
        component.on_destroy(&mut ctx);
    }

    pub fn set_enabled(&mut self, id: ObjectId, enabled: bool, environment: &mut SceneEnvironment) {
        let component = match self.components.get_mut(&id) {
            Some(component) => component,
            None => return,
        };

        if enabled == self.enabled.contains(&id) {
            return;
        }

        let mut ctx = ComponentContext {
            object_id: id,
            environment,
            delta: 0.0,
        };

        if enabled {
            self.enabled.insert(id);
            component.on_enable(&mut ctx);
        } else {
            self.enabled.remove(&id);
            component.on_disable(&mut ctx);
        }
    }

    /// Updates every enabled component, starting it first if this is its first update.
    pub fn update(&mut self, environment: &mut SceneEnvironment, delta: f64) {
        for (id, component) in self.components.iter_mut() {
            if !self.enabled.contains(id) {
                continue;
            }

            let mut ctx = ComponentContext {
                object_id: *id,
                environment: &mut *environment,
                delta,
            };

            if self.started.insert(*id) {
                component.start(&mut ctx);
            }

            component.update(&mut ctx);
        }
    }

    pub fn destroy_all(&mut self, environment: &mut SceneEnvironment) {
        let ids: Vec<ObjectId> = self.components.keys().copied().collect();

        for id in ids {
            self.detach(id, environment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{EnvironmentConfig, SceneEntity, SceneEnvironmentFactory};

    struct Recorder(Rc<RefCell<Vec<&'static str>>>);

    impl Component for Recorder {
        fn awake(&mut self, _ctx: &mut ComponentContext) {
            self.0.borrow_mut().push("awake");
        }

        fn start(&mut self, _ctx: &mut ComponentContext) {
            self.0.borrow_mut().push("start");
        }

        fn on_enable(&mut self, _ctx: &mut ComponentContext) {
            self.0.borrow_mut().push("enable");
        }

        fn on_disable(&mut self, _ctx: &mut ComponentContext) {
            self.0.borrow_mut().push("disable");
        }

        fn on_destroy(&mut self, _ctx: &mut ComponentContext) {
            self.0.borrow_mut().push("destroy");
        }

        fn update(&mut self, _ctx: &mut ComponentContext) {
            self.0.borrow_mut().push("update");
        }
    }

    #[test]
    fn test_component_lifecycle_order() {
        let mut environment = SceneEnvironmentFactory::new()
            .create(EnvironmentConfig::default())
            .unwrap();
        let id = environment
            .entities_mut()
            .insert(SceneEntity::Other("recorder".to_owned()))
            .unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut storage = ComponentStorage::new();

        storage.attach(id, Box::new(Recorder(events.clone())), &mut environment);
        storage.update(&mut environment, 0.1);
        storage.update(&mut environment, 0.1);
        storage.set_enabled(id, false, &mut environment);
        storage.update(&mut environment, 0.1);
        storage.set_enabled(id, false, &mut environment);
        storage.destroy_all(&mut environment);

        assert_eq!(
            events.borrow().as_slice(),
            &["awake", "enable", "start", "update", "update", "disable", "destroy"]
        );
        assert!(storage.is_empty());
    }
}
