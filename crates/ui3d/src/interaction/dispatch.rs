use wristpanel_core::PointerSample;
use wristpanel_input::{Edge, EdgeDetector};

use crate::components::{ElementId, PixelPoint};
use crate::surface::{PanelAction, PanelSurface, PointerEventKind};

/// Counters for dispatched edge events.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    /// Press events delivered.
    pub presses: u64,
    /// Release events delivered.
    pub releases: u64,
    /// Activations reported.
    pub activations: u64,
}

#[derive(Debug, Clone, Copy)]
struct PendingPress {
    target: Option<ElementId>,
}

/// Turns the worker's per-tick pointer samples into panel events.
///
/// Every sample over the panel moves the cursor and sends `Move`. Presses and
/// releases fire only on trigger edges; a release activates its element only
/// when it lands on the element the press started on.
#[derive(Debug, Default)]
pub struct PointerDispatcher {
    trigger: EdgeDetector,
    pending: Option<PendingPress>,
    last_point: Option<PixelPoint>,
    stats: DispatchStats,
}

impl PointerDispatcher {
    /// New dispatcher with the trigger up.
    pub fn new() -> Self {
        Self::default()
    }

    /// Event counters so far.
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Element the current press started on.
    pub fn pending_target(&self) -> Option<ElementId> {
        self.pending.and_then(|pending| pending.target)
    }

    /// Feed one sample.
    pub fn handle(
        &mut self,
        surface: &mut dyn PanelSurface,
        sample: PointerSample,
    ) -> Option<PanelAction> {
        let (width, height) = surface.size();
        let point = sample
            .hit
            .map(|uv| PixelPoint::from_uv(uv, width, height));

        surface.set_cursor(point);
        if let Some(point) = point {
            surface.dispatch(PointerEventKind::Move, point);
            self.last_point = Some(point);
        }

        match self.trigger.update(sample.trigger_down) {
            Edge::Pressed => {
                let point = point?;
                self.pending = Some(PendingPress {
                    target: surface.hit_test(point),
                });
                surface.dispatch(PointerEventKind::Press, point);
                self.stats.presses += 1;
                None
            }
            Edge::Released => {
                let pending = self.pending.take()?;
                let at = point.or(self.last_point)?;
                surface.dispatch(PointerEventKind::Release, at);
                self.stats.releases += 1;

                let point = point?;
                let target = pending.target?;
                if surface.hit_test(point) != Some(target) {
                    return None;
                }
                let action = surface.dispatch(PointerEventKind::Activate, point);
                if action.is_some() {
                    self.stats.activations += 1;
                }
                action
            }
            Edge::Held | Edge::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RegionLayout;
    use crate::manager::{PanelManager, SEND_CALLBACK};
    use wristpanel_core::Uv;

    fn panel() -> PanelManager {
        PanelManager::control_panel(800, 800, &RegionLayout::default())
    }

    fn send_uv(panel: &PanelManager) -> Uv {
        let handle = panel.button_with_callback(SEND_CALLBACK).unwrap();
        let rect = panel.element(handle).unwrap().rect;
        Uv::new(
            (rect.x + rect.width / 2) as f32 / 800.0,
            (rect.y + rect.height / 2) as f32 / 800.0,
        )
    }

    #[test]
    fn held_trigger_presses_once() {
        let mut panel = panel();
        let uv = send_uv(&panel);
        let mut dispatcher = PointerDispatcher::new();

        let mut actions = Vec::new();
        for down in [true, true, true, false] {
            actions.extend(dispatcher.handle(&mut panel, PointerSample::new(Some(uv), down)));
        }

        let stats = dispatcher.stats();
        assert_eq!(stats.presses, 1);
        assert_eq!(stats.releases, 1);
        assert_eq!(stats.activations, 1);
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn release_elsewhere_does_not_activate() {
        let mut panel = panel();
        let uv = send_uv(&panel);
        let mut dispatcher = PointerDispatcher::new();

        dispatcher.handle(&mut panel, PointerSample::new(Some(uv), true));
        let action = dispatcher.handle(&mut panel, PointerSample::new(Some(Uv::new(0.02, 0.5)), false));

        assert_eq!(action, None);
        assert_eq!(dispatcher.stats().releases, 1);
        assert_eq!(dispatcher.stats().activations, 0);
    }

    #[test]
    fn release_off_panel_releases_without_activation() {
        let mut panel = panel();
        let uv = send_uv(&panel);
        let mut dispatcher = PointerDispatcher::new();

        dispatcher.handle(&mut panel, PointerSample::new(Some(uv), true));
        assert!(dispatcher.pending_target().is_some());
        let action = dispatcher.handle(&mut panel, PointerSample::new(None, false));

        assert_eq!(action, None);
        assert_eq!(dispatcher.stats().releases, 1);
        assert_eq!(dispatcher.pending_target(), None);
        assert_eq!(panel.pressed(), None);
    }

    #[test]
    fn press_without_hit_is_ignored() {
        let mut panel = panel();
        let mut dispatcher = PointerDispatcher::new();
        dispatcher.handle(&mut panel, PointerSample::new(None, true));
        let uv = send_uv(&panel);
        dispatcher.handle(&mut panel, PointerSample::new(Some(uv), true));
        let uv = send_uv(&panel);
        dispatcher.handle(&mut panel, PointerSample::new(Some(uv), false));
        assert_eq!(dispatcher.stats(), DispatchStats::default());
    }

    #[test]
    fn suppressed_sample_hides_cursor() {
        let mut panel = panel();
        let mut dispatcher = PointerDispatcher::new();
        dispatcher.handle(&mut panel, PointerSample::new(Some(Uv::new(0.5, 0.5)), false));
        assert!(panel.cursor().is_some());
        dispatcher.handle(&mut panel, PointerSample::SUPPRESSED);
        assert!(panel.cursor().is_none());
    }
}
