use serde::Serialize;
use tokio::sync::broadcast;

use super::types::{AgentTask, RunStatus};

/// A change to the agent run, pushed to subscribers as it happens.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum RunEvent {
    Log { line: String },
    StatusChanged { status: RunStatus },
    TaskUpdated { task: AgentTask },
    Cleared,
}

/// Send an event to all subscribers. Having no subscribers is not an error.
pub fn broadcast_event(tx: &broadcast::Sender<RunEvent>, event: RunEvent) {
    let _ = tx.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_without_subscribers_is_silent() {
        let (tx, _) = broadcast::channel(4);
        broadcast_event(&tx, RunEvent::Cleared);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscriber() {
        let (tx, mut rx) = broadcast::channel(4);
        broadcast_event(
            &tx,
            RunEvent::StatusChanged {
                status: RunStatus::Planning,
            },
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            RunEvent::StatusChanged {
                status: RunStatus::Planning
            }
        );
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(RunEvent::Log {
            line: "Plan generated: 3 tasks.".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "Log");
        assert_eq!(json["data"]["line"], "Plan generated: 3 tasks.");
    }
}
