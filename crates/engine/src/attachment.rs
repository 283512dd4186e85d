use tracing::{debug, info};
use wristpanel_compositor::{CompositorError, CompositorRuntime};
use wristpanel_core::{ControllerRole, DeviceIndex, Tick};

/// What kind of device the panel is parented to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    /// A hand controller.
    Hand(ControllerRole),
    /// The headset, used when no anchor hand is available.
    Head,
}

/// Device the panel is currently parented to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorState {
    /// Device index.
    pub device: DeviceIndex,
    /// Hand or head.
    pub kind: AnchorKind,
    /// Tick of the last re-evaluation.
    pub checked_at: Tick,
}

impl AnchorState {
    /// Whether the panel is on the headset fallback.
    pub fn is_head(&self) -> bool {
        self.kind == AnchorKind::Head
    }
}

/// Decides which tracked device the panel is parented to.
///
/// Runs on its own cadence, independent of per-tick raycasting. The
/// configured hand is preferred; a hand that drops out of the role table
/// but stays connected is kept; otherwise the headset is used.
#[derive(Debug, Clone)]
pub struct AttachmentTracker {
    role: ControllerRole,
    recheck_ticks: u64,
    state: Option<AnchorState>,
}

impl AttachmentTracker {
    /// Tracker for `role`, re-evaluated every `recheck_ticks` ticks.
    pub fn new(role: ControllerRole, recheck_ticks: u64) -> Self {
        Self {
            role,
            recheck_ticks: recheck_ticks.max(1),
            state: None,
        }
    }

    /// Current anchor, if evaluated.
    pub fn state(&self) -> Option<AnchorState> {
        self.state
    }

    /// Whether a re-evaluation is due at `tick`.
    pub fn is_due(&self, tick: Tick) -> bool {
        match self.state {
            None => true,
            Some(state) => tick.since(state.checked_at) >= self.recheck_ticks,
        }
    }

    /// Re-evaluate. Returns the new anchor when the device changed.
    pub fn evaluate(
        &mut self,
        runtime: &mut dyn CompositorRuntime,
        tick: Tick,
    ) -> Result<Option<AnchorState>, CompositorError> {
        let (device, kind) = match runtime.device_for_role(self.role)? {
            Some(device) => (device, AnchorKind::Hand(self.role)),
            None => match self.state {
                Some(current) if !current.is_head() && runtime.is_device_connected(current.device)? => {
                    debug!(device = %current.device, "Anchor role unassigned; keeping connected hand");
                    (current.device, current.kind)
                }
                _ => (DeviceIndex::HMD, AnchorKind::Head),
            },
        };

        let changed = self.state.map_or(true, |current| current.device != device);
        self.state = Some(AnchorState {
            device,
            kind,
            checked_at: tick,
        });
        if !changed {
            return Ok(None);
        }
        match kind {
            AnchorKind::Hand(role) => info!(device = %device, ?role, "Panel anchored to hand"),
            AnchorKind::Head => info!(device = %device, "No anchor hand; panel anchored to headset"),
        }
        Ok(self.state)
    }
}
