//! Live controller routing.
//!
//! Inbound controller events are matched against an immutable snapshot of the
//! project's mappings and turned into parameter updates for the rendering side.
//! Nothing here mutates the document.

use crossbeam_channel::{Receiver, Sender, TrySendError};

use strata_types::{MappingTarget, MidiParameterMapping, Project};

/// Controller event delivered by the I/O layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    ControlChange { channel: u8, controller: u8, value: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
}

/// Scaled value for one project parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamUpdate {
    pub target: MappingTarget,
    pub value: f32,
}

/// Receives parameter updates for the live rendering subsystem.
pub trait ParamSink {
    fn push(&self, update: ParamUpdate);
}

/// Mapping table captured from a project. Cheap to share with the I/O thread.
#[derive(Debug, Clone, Default)]
pub struct MappingSnapshot {
    mappings: Vec<MidiParameterMapping>,
}

impl MappingSnapshot {
    pub fn from_project(project: &Project) -> Self {
        Self {
            mappings: project.midi_mappings.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Updates produced by `event`, one per matching mapping.
    pub fn route(&self, event: ControllerEvent) -> Vec<ParamUpdate> {
        let (channel, controller, raw) = match event {
            ControllerEvent::ControlChange {
                channel,
                controller,
                value,
            } => (channel, Some(controller), value),
            ControllerEvent::ChannelPressure { channel, pressure } => (channel, None, pressure),
        };
        self.mappings
            .iter()
            .filter(|m| m.trigger.matches(channel, controller))
            .map(|m| ParamUpdate {
                target: m.target,
                value: m.scaled_value(raw),
            })
            .collect()
    }
}

/// Forwards routed controller events to a sink.
pub struct MidiRouter<S: ParamSink> {
    snapshot: MappingSnapshot,
    sink: S,
}

impl<S: ParamSink> MidiRouter<S> {
    pub fn new(snapshot: MappingSnapshot, sink: S) -> Self {
        Self { snapshot, sink }
    }

    /// Swap in a fresh snapshot after mappings changed.
    pub fn update_snapshot(&mut self, snapshot: MappingSnapshot) {
        self.snapshot = snapshot;
    }

    /// Route one event. Returns the number of updates pushed.
    pub fn handle(&self, event: ControllerEvent) -> usize {
        let updates = self.snapshot.route(event);
        if updates.is_empty() {
            log::trace!(target: "midi", "unmapped controller event {:?}", event);
        }
        let count = updates.len();
        for update in updates {
            self.sink.push(update);
        }
        count
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// Bounded channel sink. Updates are dropped when the consumer falls behind.
pub struct ChannelSink {
    tx: Sender<ParamUpdate>,
}

impl ChannelSink {
    /// Create a sink and the receiver the rendering side drains.
    pub fn bounded(capacity: usize) -> (Self, Receiver<ParamUpdate>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl ParamSink for ChannelSink {
    fn push(&self, update: ParamUpdate) {
        match self.tx.try_send(update) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                log::warn!(target: "midi", "parameter queue full; dropping update for {:?}", dropped.target);
            }
            Err(TrySendError::Disconnected(_)) => {
                log::debug!(target: "midi", "parameter receiver gone");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_types::{
        EffectPath, EffectSlot, EffectType, MappingRanges, MidiTrigger, TimeSignature, TrackId,
        TrackKind,
    };

    fn project_with_pedal() -> (Project, TrackId) {
        let mut project = Project::new();
        let song = project.add_song("s", 120.0, TimeSignature::default());
        let track = project.add_track(song, "t", TrackKind::Audio).unwrap();
        project.assign_expression_pedal(track, 11, None, &MappingRanges::default());
        (project, track)
    }

    fn cc(controller: u8, value: u8) -> ControllerEvent {
        ControllerEvent::ControlChange {
            channel: 0,
            controller,
            value,
        }
    }

    #[test]
    fn snapshot_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MappingSnapshot>();
    }

    #[test]
    fn route_scales_into_mapping_range() {
        let (project, track) = project_with_pedal();
        let snapshot = MappingSnapshot::from_project(&project);
        let updates = snapshot.route(cc(11, 127));
        assert_eq!(
            updates,
            vec![ParamUpdate {
                target: MappingTarget::TrackVolume(track),
                value: 2.0
            }]
        );
        assert!(snapshot.route(cc(12, 127)).is_empty());
    }

    #[test]
    fn channel_pressure_routes_separately() {
        let (mut project, track) = project_with_pedal();
        let fx = project.ids.next();
        project
            .find_track_mut(track)
            .unwrap()
            .insert_effects
            .push(EffectSlot::new(fx, EffectType::Filter));
        let path = EffectPath::new(track, 0, 0);
        project.add_mapping(
            MidiTrigger::ChannelPressure { channel: None },
            MappingTarget::Effect(path),
            (0.0, 1.0),
        );
        let snapshot = MappingSnapshot::from_project(&project);
        let updates = snapshot.route(ControllerEvent::ChannelPressure {
            channel: 3,
            pressure: 0,
        });
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].target, MappingTarget::Effect(path));
        assert_eq!(updates[0].value, 0.0);
    }

    #[test]
    fn router_pushes_to_channel() {
        let (project, _) = project_with_pedal();
        let (sink, rx) = ChannelSink::bounded(4);
        let router = MidiRouter::new(MappingSnapshot::from_project(&project), sink);
        assert_eq!(router.handle(cc(11, 0)), 1);
        assert_eq!(rx.try_recv().unwrap().value, 0.0);
    }

    #[test]
    fn full_channel_drops_without_blocking() {
        let (project, _) = project_with_pedal();
        let (sink, rx) = ChannelSink::bounded(1);
        let router = MidiRouter::new(MappingSnapshot::from_project(&project), sink);
        router.handle(cc(11, 10));
        router.handle(cc(11, 20));
        assert_eq!(rx.len(), 1);
        let expected = 2.0 * 10.0 / 127.0;
        assert!((rx.recv().unwrap().value - expected).abs() < 1e-6);
    }
}
