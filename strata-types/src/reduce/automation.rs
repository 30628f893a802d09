use crate::{
    AutomationAction, AutomationLane, ContainerField, ContainerId, DispatchResult, EntityRef,
    LaneId, Project,
};

use super::{edit_container, finite};

pub(super) fn reduce(action: &AutomationAction, project: &mut Project) -> DispatchResult {
    match action {
        AutomationAction::AddLane {
            container_id,
            target,
        } => {
            if project.find_container(*container_id).is_none() {
                return DispatchResult::none();
            }
            let id: LaneId = project.ids.next();
            edit_container(project, *container_id, ContainerField::Automation, |c| {
                c.edit_automation().push(AutomationLane::new(id, *target))
            });
            DispatchResult::applied(EntityRef::Lane(id))
        }
        AutomationAction::RemoveLane {
            container_id,
            lane_id,
        } => {
            if !has_lane(project, *container_id, *lane_id) {
                return DispatchResult::none();
            }
            edit_lanes(project, *container_id, |lanes| lanes.retain(|l| l.id != *lane_id));
            DispatchResult::applied(EntityRef::Lane(*lane_id))
        }
        AutomationAction::ToggleLane {
            container_id,
            lane_id,
        } => {
            if !has_lane(project, *container_id, *lane_id) {
                return DispatchResult::none();
            }
            edit_lane(project, *container_id, *lane_id, |lane| lane.enabled = !lane.enabled);
            DispatchResult::applied(EntityRef::Lane(*lane_id))
        }
        AutomationAction::AddBreakpoint {
            container_id,
            lane_id,
            point,
        } => {
            if !finite(&[point.position, point.value]) || !has_lane(project, *container_id, *lane_id) {
                return DispatchResult::none();
            }
            edit_lane(project, *container_id, *lane_id, |lane| lane.add_breakpoint(*point));
            DispatchResult::applied(EntityRef::Lane(*lane_id))
        }
        AutomationAction::RemoveBreakpoint {
            container_id,
            lane_id,
            position,
        } => {
            let present = project
                .resolved_container(*container_id)
                .and_then(|c| c.automation_lanes.into_iter().find(|l| l.id == *lane_id))
                .is_some_and(|mut lane| lane.remove_breakpoint(*position));
            if !present {
                return DispatchResult::none();
            }
            edit_lane(project, *container_id, *lane_id, |lane| lane.remove_breakpoint(*position));
            DispatchResult::applied(EntityRef::Lane(*lane_id))
        }
        AutomationAction::ApplyShape {
            container_id,
            lane_id,
            request,
        } => {
            let points = request.points();
            if points.is_empty() || !has_lane(project, *container_id, *lane_id) {
                return DispatchResult::none();
            }
            let end = request.end.max(request.start);
            edit_lane(project, *container_id, *lane_id, |lane| {
                lane.replace_range(request.start, end, &points)
            });
            DispatchResult::applied(EntityRef::Lane(*lane_id))
        }
    }
}

fn has_lane(project: &Project, container_id: ContainerId, lane_id: LaneId) -> bool {
    project
        .resolved_container(container_id)
        .is_some_and(|c| c.automation_lanes.iter().any(|l| l.id == lane_id))
}

fn edit_lanes(project: &mut Project, container_id: ContainerId, edit: impl FnOnce(&mut Vec<AutomationLane>)) {
    edit_container(project, container_id, ContainerField::Automation, |c| edit(c.edit_automation()));
}

fn edit_lane<R>(
    project: &mut Project,
    container_id: ContainerId,
    lane_id: LaneId,
    edit: impl FnOnce(&mut AutomationLane) -> R,
) -> Option<R> {
    edit_container(project, container_id, ContainerField::Automation, |c| {
        c.edit_automation().iter_mut().find(|l| l.id == lane_id).map(edit)
    })
    .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AutomationBreakpoint, AutomationTarget, ShapeRequest, ShapeTool, TimeSignature, TrackKind};

    fn setup() -> (Project, ContainerId, LaneId) {
        let mut project = Project::new();
        let song = project.add_song("s", 120.0, TimeSignature::default());
        let track = project.add_track(song, "t", TrackKind::Audio).unwrap();
        let c = project.add_container(track, "c", 0.0, 8.0).unwrap();
        let result = reduce(
            &AutomationAction::AddLane {
                container_id: c,
                target: AutomationTarget::Volume,
            },
            &mut project,
        );
        let Some(EntityRef::Lane(lane)) = result.affected else {
            panic!("expected lane id");
        };
        (project, c, lane)
    }

    fn lane(project: &Project, c: ContainerId) -> AutomationLane {
        project.resolved_container(c).unwrap().automation_lanes[0].clone()
    }

    #[test]
    fn apply_shape_replaces_range_only() {
        let (mut project, c, lane_id) = setup();
        for pos in [0.5, 6.0] {
            reduce(
                &AutomationAction::AddBreakpoint {
                    container_id: c,
                    lane_id,
                    point: AutomationBreakpoint::new(pos, 0.3),
                },
                &mut project,
            );
        }
        let request = ShapeRequest {
            tool: ShapeTool::Line,
            start: 0.0,
            end: 4.0,
            start_value: 0.0,
            end_value: 1.0,
            grid: 0.25,
        };
        let action = AutomationAction::ApplyShape {
            container_id: c,
            lane_id,
            request,
        };
        assert!(reduce(&action, &mut project).applied);
        let lane = lane(&project, c);
        // 17 generated points plus the untouched one at bar 6
        assert_eq!(lane.breakpoints.len(), 18);
        assert!(lane.breakpoints.iter().all(|p| p.position != 0.5));
    }

    #[test]
    fn degenerate_shape_is_a_noop() {
        let (mut project, c, lane_id) = setup();
        for grid in [0.0, 1e-15] {
            let request = ShapeRequest {
                tool: ShapeTool::Sine,
                start: 0.0,
                end: 4.0,
                start_value: 0.0,
                end_value: 1.0,
                grid,
            };
            let action = AutomationAction::ApplyShape {
                container_id: c,
                lane_id,
                request,
            };
            assert!(reduce(&action, &mut project).is_noop(), "grid {grid}");
        }
        assert!(lane(&project, c).breakpoints.is_empty());
    }

    #[test]
    fn remove_missing_breakpoint_is_a_noop() {
        let (mut project, c, lane_id) = setup();
        let action = AutomationAction::RemoveBreakpoint {
            container_id: c,
            lane_id,
            position: 3.0,
        };
        assert!(reduce(&action, &mut project).is_noop());
    }

    #[test]
    fn toggle_lane_disables_playback_value() {
        let (mut project, c, lane_id) = setup();
        reduce(
            &AutomationAction::AddBreakpoint {
                container_id: c,
                lane_id,
                point: AutomationBreakpoint::new(0.0, 0.8),
            },
            &mut project,
        );
        reduce(&AutomationAction::ToggleLane { container_id: c, lane_id }, &mut project);
        assert_eq!(lane(&project, c).value_at(0.0), None);
    }
}
