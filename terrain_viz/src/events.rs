//! User interface events and the channel that carries them to [`crate::app::App`].

use crossbeam_channel::{Receiver, Sender};

use crate::controls::TerrainSource;
use crate::error::{Error, Result};
use crate::geometry::Point;

/// A change made on the terrain control panel.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlChange {
    Terrain(bool),
    TerrainSource(TerrainSource),
    Hillshade(bool),
    Contours(bool),
    Exaggeration(f64),
}

impl ControlChange {
    /// Maps a control element id and its string value to a change.
    /// Checkboxes take `true`/`false`, the slider a number.
    pub fn from_control(id: &str, value: &str) -> Result<Self> {
        let flag = || {
            value.parse::<bool>().map_err(|_| {
                Error::InvalidSettings(format!("control `{id}` expects true or false, got `{value}`"))
            })
        };
        match id {
            "terrain" => Ok(ControlChange::Terrain(flag()?)),
            "hillshade" => Ok(ControlChange::Hillshade(flag()?)),
            "contours" => Ok(ControlChange::Contours(flag()?)),
            "terrain-source" => Ok(ControlChange::TerrainSource(value.parse()?)),
            "exaggeration" => value
                .trim()
                .parse::<f64>()
                .map(ControlChange::Exaggeration)
                .map_err(|_| Error::InvalidSettings(format!("`{value}` is not a number"))),
            other => Err(Error::InvalidSettings(format!("unknown control `{other}`"))),
        }
    }
}

/// Input events sent from the page to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The map finished loading its style.
    Load,
    Click(Point),
    Control(ControlChange),
    Preset(String),
    Viewpoint(String),
    ResetView,
    MenuToggle,
    ClickOutsideMenu,
    ClosePanel,
    RefreshContours,
}

pub struct UiEventSender(pub Sender<UiEvent>);

pub struct UiEventReceiver(pub Receiver<UiEvent>);

impl UiEventSender {
    /// Queues an event. Returns `false` once the receiving side is gone.
    pub fn send(&self, event: UiEvent) -> bool {
        self.0.send(event).is_ok()
    }
}

impl UiEventReceiver {
    /// Events queued so far, without blocking.
    pub fn pending(&self) -> Vec<UiEvent> {
        self.0.try_iter().collect()
    }
}

/// Unbounded event queue between the page and the application.
pub fn event_channel() -> (UiEventSender, UiEventReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (UiEventSender(tx), UiEventReceiver(rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_ids_map_to_changes() {
        assert_eq!(
            ControlChange::from_control("terrain", "false").unwrap(),
            ControlChange::Terrain(false)
        );
        assert_eq!(
            ControlChange::from_control("terrain-source", "gel").unwrap(),
            ControlChange::TerrainSource(TerrainSource::Gel)
        );
        assert_eq!(
            ControlChange::from_control("exaggeration", " 2.5").unwrap(),
            ControlChange::Exaggeration(2.5)
        );
        assert!(ControlChange::from_control("contours", "maybe").is_err());
        assert!(ControlChange::from_control("sky", "true").is_err());
    }

    #[test]
    fn channel_preserves_order() {
        let (tx, rx) = event_channel();
        assert!(tx.send(UiEvent::Load));
        assert!(tx.send(UiEvent::MenuToggle));
        assert_eq!(rx.pending(), vec![UiEvent::Load, UiEvent::MenuToggle]);
        assert!(rx.pending().is_empty());
        drop(rx);
        assert!(!tx.send(UiEvent::ClosePanel));
    }
}
