use crate::{DispatchResult, EntityRef, MappingAction, Project};

use super::ReduceContext;

pub(super) fn reduce(action: &MappingAction, project: &mut Project, ctx: &ReduceContext) -> DispatchResult {
    match action {
        MappingAction::AssignExpressionPedal {
            track_id,
            controller,
            target,
        } => match project.assign_expression_pedal(*track_id, *controller, *target, &ctx.mapping_ranges) {
            Some(id) => DispatchResult::applied(EntityRef::Mapping(id)),
            None => DispatchResult::none(),
        },
        MappingAction::RemoveExpressionPedal(track_id) => {
            if project.remove_expression_pedal(*track_id) {
                DispatchResult::applied(EntityRef::Track(*track_id))
            } else {
                DispatchResult::none()
            }
        }
        MappingAction::Add {
            trigger,
            target,
            range,
        } => {
            let range = range.unwrap_or_else(|| ctx.mapping_ranges.for_target(target));
            if !range.0.is_finite() || !range.1.is_finite() {
                return DispatchResult::none();
            }
            match project.add_mapping(*trigger, *target, range) {
                Some(id) => DispatchResult::applied(EntityRef::Mapping(id)),
                None => DispatchResult::none(),
            }
        }
        MappingAction::Remove(id) => match project.remove_mapping(*id) {
            Some(_) => DispatchResult::applied(EntityRef::Mapping(*id)),
            None => DispatchResult::none(),
        },
        MappingAction::SetRange(id, min, max) => {
            if !min.is_finite() || !max.is_finite() {
                return DispatchResult::none();
            }
            match project.mapping_mut(*id) {
                Some(mapping) => {
                    mapping.min_value = *min;
                    mapping.max_value = *max;
                    DispatchResult::applied(EntityRef::Mapping(*id))
                }
                None => DispatchResult::none(),
            }
        }
    }
}
