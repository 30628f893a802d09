use std::cmp::Ordering;

use crate::{
    ContainerField, DispatchResult, EffectAction, EffectChain, EffectHost, EffectSlot, EntityRef,
    Project,
};

use super::edit_container;

pub(super) fn reduce(action: &EffectAction, project: &mut Project) -> DispatchResult {
    match action {
        EffectAction::Add {
            host,
            effect_type,
            index,
        } => {
            if effective_chain(project, *host).is_none() {
                return DispatchResult::none();
            }
            let id = project.ids.next();
            let slot = EffectSlot::new(id, effect_type.clone());
            let added = edit_chain(project, *host, |chain| {
                let at = index.unwrap_or(chain.len()).min(chain.len());
                chain.insert(at, slot);
                at
            });
            match added {
                Some(at) => {
                    remap_track_slots(project, *host, |i| Some(if i >= at { i + 1 } else { i }));
                    DispatchResult::applied(EntityRef::Effect(id))
                }
                None => DispatchResult::none(),
            }
        }
        EffectAction::Remove { host, effect_id } => {
            let known = effective_chain(project, *host).is_some_and(|c| c.effect(*effect_id).is_some());
            if !known {
                return DispatchResult::none();
            }
            let removed_at = edit_chain(project, *host, |chain| {
                let at = chain.position(*effect_id);
                chain.remove(*effect_id);
                at
            })
            .flatten();
            if let Some(at) = removed_at {
                remap_track_slots(project, *host, |i| match i.cmp(&at) {
                    Ordering::Less => Some(i),
                    Ordering::Equal => None,
                    Ordering::Greater => Some(i - 1),
                });
            }
            DispatchResult::applied(EntityRef::Effect(*effect_id))
        }
        EffectAction::Move { host, from, to } => {
            let Some(chain) = effective_chain(project, *host) else {
                return DispatchResult::none();
            };
            if *from >= chain.len() || *to >= chain.len() || from == to {
                return DispatchResult::none();
            }
            let Some(moved) = chain.get(*from).map(|s| s.id) else {
                return DispatchResult::none();
            };
            match edit_chain(project, *host, |chain| chain.move_slot(*from, *to)) {
                Some(true) => {
                    let (from, to) = (*from, *to);
                    remap_track_slots(project, *host, |i| Some(moved_index(i, from, to)));
                    DispatchResult::applied(EntityRef::Effect(moved))
                }
                _ => DispatchResult::none(),
            }
        }
        EffectAction::ToggleBypass { host, effect_id } => {
            let known = effective_chain(project, *host).is_some_and(|c| c.effect(*effect_id).is_some());
            if !known {
                return DispatchResult::none();
            }
            edit_chain(project, *host, |chain| {
                if let Some(slot) = chain.effect_mut(*effect_id) {
                    slot.bypassed = !slot.bypassed;
                }
            });
            DispatchResult::applied(EntityRef::Effect(*effect_id))
        }
        EffectAction::SetParam {
            host,
            effect_id,
            address,
            value,
        } => {
            let known = effective_chain(project, *host).is_some_and(|c| c.effect(*effect_id).is_some());
            if !known || !value.is_finite() {
                return DispatchResult::none();
            }
            edit_chain(project, *host, |chain| {
                if let Some(slot) = chain.effect_mut(*effect_id) {
                    slot.params.insert(*address, value.clamp(0.0, 1.0));
                }
            });
            DispatchResult::applied(EntityRef::Effect(*effect_id))
        }
        EffectAction::ToggleChainBypass(host) => {
            if effective_chain(project, *host).is_none() {
                return DispatchResult::none();
            }
            edit_chain(project, *host, |chain| chain.bypassed = !chain.bypassed);
            DispatchResult::applied(host_ref(*host))
        }
    }
}

/// The chain as playback sees it: resolved for containers.
fn effective_chain(project: &Project, host: EffectHost) -> Option<EffectChain> {
    match host {
        EffectHost::Track(id) => project.find_track(id).map(|t| t.insert_effects.clone()),
        EffectHost::Container(id) => project.resolved_container(id).map(|c| c.effects),
    }
}

fn edit_chain<R>(project: &mut Project, host: EffectHost, edit: impl FnOnce(&mut EffectChain) -> R) -> Option<R> {
    match host {
        EffectHost::Track(id) => project.find_track_mut(id).map(|t| edit(&mut t.insert_effects)),
        EffectHost::Container(id) => {
            edit_container(project, id, ContainerField::Effects, |c| edit(c.edit_effects()))
        }
    }
}

/// Keep index-addressed mappings on a track's insert chain pointing at the
/// same effects. Container chains are not addressed by mappings.
fn remap_track_slots(project: &mut Project, host: EffectHost, remap: impl Fn(usize) -> Option<usize>) {
    if let EffectHost::Track(track_id) = host {
        project.remap_effect_slots(track_id, remap);
    }
}

/// Where slot `i` ends up after the slot at `from` moved to `to`.
fn moved_index(i: usize, from: usize, to: usize) -> usize {
    if i == from {
        to
    } else if from < to && (from + 1..=to).contains(&i) {
        i - 1
    } else if to < from && (to..from).contains(&i) {
        i + 1
    } else {
        i
    }
}

fn host_ref(host: EffectHost) -> EntityRef {
    match host {
        EffectHost::Track(id) => EntityRef::Track(id),
        EffectHost::Container(id) => EntityRef::Container(id),
    }
}
