//! Clone/override resolution.
//!
//! A clone's effective content is assembled field by field: overridden fields
//! come from the clone itself, everything else from the (resolved) parent.

use std::collections::HashSet;

use crate::state::container::{Container, ContainerField};
use crate::state::project::Project;
use crate::ContainerId;

/// Effective state of `clone` given its already-resolved parent.
///
/// Non-clones and orphans (`parent == None`) come back unchanged. Identity,
/// placement and the parent link always stay local.
pub fn resolve(clone: &Container, parent: Option<&Container>) -> Container {
    let mut resolved = clone.clone();
    let Some(parent) = parent else {
        return resolved;
    };
    if !clone.is_clone() {
        return resolved;
    }
    for field in ContainerField::ALL {
        if !clone.overridden_fields.contains(&field) {
            resolved.copy_field_from(parent, field);
        }
    }
    resolved
}

/// Resolve a container inside a project, following the parent chain to its
/// root. A missing ancestor ends the chain there (the orphan keeps its local
/// values). So does a cycle, which can only come from hand-edited documents:
/// the container where the chain repeats contributes its local values.
pub(crate) fn resolve_in_project(project: &Project, id: ContainerId) -> Option<Container> {
    let mut chain = vec![project.find_container(id)?];
    let mut visited = HashSet::from([id]);
    let mut resolved = None;
    while let Some(parent_id) = chain.last().and_then(|c| c.parent_container_id) {
        let Some(parent) = project.find_container(parent_id) else {
            break;
        };
        if !visited.insert(parent_id) {
            resolved = Some(parent.clone());
            break;
        }
        chain.push(parent);
    }
    // Root first, so each link sees its parent's effective state
    for container in chain.into_iter().rev() {
        resolved = Some(resolve(container, resolved.as_ref()));
    }
    resolved
}

/// Containers whose parent chain loops back onto itself.
pub fn clone_cycles(project: &Project) -> Vec<ContainerId> {
    let mut cyclic = Vec::new();
    for container in project
        .songs
        .iter()
        .flat_map(|s| s.tracks.iter())
        .flat_map(|t| t.containers.iter())
    {
        let mut seen = HashSet::new();
        let mut cursor = Some(container.id);
        while let Some(id) = cursor {
            if !seen.insert(id) {
                cyclic.push(container.id);
                break;
            }
            cursor = project
                .find_container(id)
                .and_then(|c| c.parent_container_id);
        }
    }
    cyclic
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::container::{Fade, FadeCurve, LoopSettings};
    use crate::state::effect::{EffectSlot, EffectType};
    use crate::state::song::TimeSignature;
    use crate::state::track::TrackKind;
    use crate::{EffectId, RecordingId, TrackId};

    fn parent() -> Container {
        let mut p = Container::new(ContainerId::from_raw(1), "Chorus", 0.0, 8.0);
        p.set_audio_source(Some(RecordingId::from_raw(9)), 0.5);
        p.set_fade_in(Some(Fade {
            duration_bars: 1.0,
            curve: FadeCurve::SCurve,
        }));
        p.edit_effects()
            .push(EffectSlot::new(EffectId::from_raw(20), EffectType::Reverb));
        p
    }

    fn clone_of(parent: &Container) -> Container {
        let mut c = Container::new(ContainerId::from_raw(2), "stale", 16.0, 8.0);
        c.parent_container_id = Some(parent.id);
        c
    }

    #[test]
    fn orphan_resolves_to_itself() {
        let mut c = clone_of(&parent());
        c.set_name("Local");
        assert_eq!(resolve(&c, None), c);
    }

    #[test]
    fn non_clone_ignores_parent() {
        let original = Container::new(ContainerId::from_raw(3), "Solo", 0.0, 1.0);
        assert_eq!(resolve(&original, Some(&parent())), original);
    }

    #[test]
    fn every_field_follows_the_override_law() {
        let p = parent();
        for overridden in ContainerField::ALL {
            let mut c = clone_of(&p);
            c.set_loop_settings(Some(LoopSettings {
                loop_start: 0.0,
                loop_length: 2.0,
                repeat_count: None,
            }));
            c.overridden_fields.clear();
            c.overridden_fields.insert(overridden);
            let r = resolve(&c, Some(&p));
            for field in ContainerField::ALL {
                let source = if field == overridden { &c } else { &p };
                let mut expected = r.clone();
                expected.copy_field_from(source, field);
                assert_eq!(r, expected, "{field:?} with {overridden:?} overridden");
            }
        }
    }

    #[test]
    fn placement_and_identity_stay_local() {
        let p = parent();
        let c = clone_of(&p);
        let r = resolve(&c, Some(&p));
        assert_eq!(r.id, c.id);
        assert_eq!(r.start_bar, 16.0);
        assert_eq!(r.parent_container_id, Some(p.id));
        assert_eq!(r.name, "Chorus");
        assert_eq!(r.source_recording_id, Some(RecordingId::from_raw(9)));
    }

    #[test]
    fn chains_resolve_through_grandparents() {
        let mut project = Project::new();
        let song = project.add_song("s", 120.0, TimeSignature::default());
        let track = project.add_track(song, "t", TrackKind::Audio).unwrap();
        let root = project.add_container(track, "Root", 0.0, 4.0).unwrap();
        let child = project.clone_container(root, None, None).unwrap();
        let grandchild = project.clone_container(child, None, None).unwrap();

        project.find_container_mut(root).unwrap().set_name("Renamed");
        assert_eq!(project.resolved_container(grandchild).unwrap().name, "Renamed");

        project.find_container_mut(child).unwrap().set_name("Middle");
        assert_eq!(project.resolved_container(grandchild).unwrap().name, "Middle");
    }

    #[test]
    fn cycles_degrade_to_local_values() {
        let mut project = Project::new();
        let song = project.add_song("s", 120.0, TimeSignature::default());
        let track: TrackId = project.add_track(song, "t", TrackKind::Audio).unwrap();
        let a = project.add_container(track, "A", 0.0, 4.0).unwrap();
        let b = project.clone_container(a, None, None).unwrap();
        project.find_container_mut(a).unwrap().parent_container_id = Some(b);

        assert!(project.resolved_container(a).is_some());
        assert_eq!(clone_cycles(&project).len(), 2);
    }

    #[test]
    fn deep_chains_resolve_without_recursion() {
        let mut project = Project::new();
        let song = project.add_song("s", 120.0, TimeSignature::default());
        let track = project.add_track(song, "t", TrackKind::Audio).unwrap();
        let root = project.add_container(track, "Root", 0.0, 1.0).unwrap();
        let mut leaf = root;
        for bar in 1..5_000 {
            let next = project.add_container(track, "link", bar as f64, 1.0).unwrap();
            project.find_container_mut(next).unwrap().parent_container_id = Some(leaf);
            leaf = next;
        }

        let resolved = project.resolved_container(leaf).unwrap();
        assert_eq!(resolved.name, "Root");
        assert_eq!(resolved.start_bar, 4_999.0);
    }
}
