// ─── Launch Events ───
// Progress and process output reported back to whoever drives a launch.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// Installer pass currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallStage {
    Runtime,
    Libraries,
    Natives,
    Assets,
    ClientJar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaunchEvent {
    /// A file is about to be fetched. `percent` is `index / total * 100`
    /// within the current stage.
    Progress {
        stage: InstallStage,
        file_name: String,
        index: usize,
        total: usize,
        percent: f64,
    },
    /// One line of the game's standard output.
    Stdout { session: String, line: String },
    /// Standard-error output; the session is considered failed.
    Failure { session: String, line: String },
    /// The game process ended with this raw exit code.
    Closed { session: String, code: Option<i32> },
}

/// Optional channel the core reports into.
pub type EventSink = Option<UnboundedSender<LaunchEvent>>;

pub(crate) fn emit(sink: &EventSink, event: LaunchEvent) {
    if let Some(tx) = sink {
        // A dropped receiver only means nobody is listening anymore.
        let _ = tx.send(event);
    }
}

pub(crate) fn progress(
    sink: &EventSink,
    stage: InstallStage,
    file_name: &str,
    index: usize,
    total: usize,
) {
    let percent = if total == 0 {
        100.0
    } else {
        index as f64 / total as f64 * 100.0
    };
    emit(
        sink,
        LaunchEvent::Progress {
            stage,
            file_name: file_name.to_string(),
            index,
            total,
            percent,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_percent_is_index_over_total() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = Some(tx);
        progress(&sink, InstallStage::Assets, "a", 0, 4);
        progress(&sink, InstallStage::Assets, "b", 1, 4);

        let percents: Vec<f64> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|event| match event {
                LaunchEvent::Progress { percent, .. } => percent,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(percents, vec![0.0, 25.0]);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let event = LaunchEvent::Closed {
            session: "s".into(),
            code: Some(1),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "closed");
        assert_eq!(json["code"], 1);
    }
}
