use glam::Vec3;
use scenekit_common::MeshHandle;
use serde::{Deserialize, Serialize};

pub use scenekit_common::Transform;

/// Desired linear velocity in world units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub Vec3);

impl Velocity {
    pub fn speed(&self) -> f32 {
        self.0.length()
    }
}

/// Shared reference to a mesh in the mesh table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshRef(pub MeshHandle);

/// Marks the player-driven entity and holds its last movement direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerController {
    pub direction: Vec3,
}

/// Reserved NPC behaviour flags. No system reads them yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcBehavior {
    pub can_trade: bool,
    pub can_repair: bool,
    pub hostile: bool,
}

/// Cyclic waypoint route for an NPC.
///
/// `current_waypoint` stays below `waypoints.len()` whenever the route is
/// non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcController {
    pub waypoints: Vec<Vec3>,
    pub current_waypoint: usize,
    pub speed: f32,
    pub behavior: NpcBehavior,
}

impl NpcController {
    pub fn new(waypoints: Vec<Vec3>, speed: f32) -> Self {
        Self {
            waypoints,
            current_waypoint: 0,
            speed,
            behavior: NpcBehavior::default(),
        }
    }

    pub fn target(&self) -> Option<Vec3> {
        self.waypoints.get(self.current_waypoint).copied()
    }

    /// Step to the next waypoint, wrapping at the end of the route.
    pub fn advance(&mut self) {
        if !self.waypoints.is_empty() {
            self.current_waypoint = (self.current_waypoint + 1) % self.waypoints.len();
        }
    }
}

/// Discrete locomotion state derived from speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locomotion {
    #[default]
    Idle,
    Walking,
    Running,
}

impl Locomotion {
    /// Highest speed still classified as walking (inclusive).
    pub const WALK_SPEED_LIMIT: f32 = 7.0;

    pub fn classify(speed: f32) -> Self {
        if speed == 0.0 {
            Self::Idle
        } else if speed <= Self::WALK_SPEED_LIMIT {
            Self::Walking
        } else {
            Self::Running
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Walking => "Walking",
            Self::Running => "Running",
        }
    }
}

/// Seconds over which a blend ramps from the previous clip to the current.
pub const BLEND_DURATION: f32 = 0.5;

/// Locomotion state machine with an optional active cross-fade.
///
/// `blend_from` is only ever set by a transition, so it always differs from
/// `state`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationState {
    state: Locomotion,
    blend_from: Option<Locomotion>,
    blend_elapsed: f32,
}

impl AnimationState {
    pub fn new(state: Locomotion) -> Self {
        Self {
            state,
            blend_from: None,
            blend_elapsed: 0.0,
        }
    }

    pub fn state(&self) -> Locomotion {
        self.state
    }

    pub fn blend_from(&self) -> Option<Locomotion> {
        self.blend_from
    }

    pub fn blend_elapsed(&self) -> f32 {
        self.blend_elapsed
    }

    /// Feed the freshly classified state. On a change the outgoing state
    /// becomes the blend source and the timer restarts. Returns whether a
    /// transition happened.
    pub fn observe(&mut self, next: Locomotion) -> bool {
        if next == self.state {
            return false;
        }
        self.blend_from = Some(self.state);
        self.state = next;
        self.blend_elapsed = 0.0;
        true
    }

    /// Linear ramp over [`BLEND_DURATION`], clamped to `[0, 1]`.
    pub fn blend_factor(&self) -> f32 {
        (self.blend_elapsed / BLEND_DURATION).clamp(0.0, 1.0)
    }

    pub fn advance(&mut self, dt: f32) {
        self.blend_elapsed += dt.max(0.0);
    }
}
