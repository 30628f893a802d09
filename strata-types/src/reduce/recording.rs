use crate::{DispatchResult, EntityRef, Project, RecordingAction, RecordingId, SourceRecording};

pub(super) fn reduce(action: &RecordingAction, project: &mut Project) -> DispatchResult {
    match action {
        RecordingAction::Add {
            name,
            location,
            sample_rate,
            channel_count,
            duration_seconds,
        } => {
            if *sample_rate == 0 || *channel_count == 0 || !duration_seconds.is_finite() || *duration_seconds < 0.0 {
                return DispatchResult::none();
            }
            let mut recording = SourceRecording::new(RecordingId::from_raw(0), name.clone(), location.clone());
            recording.sample_rate = *sample_rate;
            recording.channel_count = *channel_count;
            recording.duration_seconds = *duration_seconds;
            let id = project.add_recording(recording);
            DispatchResult::applied(EntityRef::Recording(id))
        }
        RecordingAction::Remove(id) => match project.remove_recording(*id) {
            Some(_) => DispatchResult::applied(EntityRef::Recording(*id)),
            None => DispatchResult::none(),
        },
    }
}
