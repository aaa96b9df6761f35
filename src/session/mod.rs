//! Capture sessions: the background worker and its notifications.
//!
//! A session runs on one named thread. It talks back to the UI only through
//! an unbounded queue of `CaptureEvent`s, and listens only to a
//! `CancelToken` that is checked once per page.

mod runner;
mod temp;

pub use runner::{Outcome, SessionRunner};
pub use temp::TempPages;

use crate::capture::{MonitorGrabber, Region};
use crate::config::{Settings, MAX_PAGES, MIN_PAGES};
use crate::error::SessionError;
use crate::input::KeyboardAdvancer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub type EventSender = UnboundedSender<CaptureEvent>;

/// What the user asked for when pressing Start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    pub region: Region,
    pub pages: u32,
    pub slow_loading: bool,
}

impl CaptureRequest {
    pub fn validate(&self) -> Result<(), SessionError> {
        if !(MIN_PAGES..=MAX_PAGES).contains(&self.pages) {
            return Err(SessionError::InvalidRequest(format!(
                "page count must be between {} and {}, got {}",
                MIN_PAGES, MAX_PAGES, self.pages
            )));
        }
        if self.region.is_empty() {
            return Err(SessionError::InvalidRequest(
                "selected region is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Notification from the worker to the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CaptureEvent {
    Status {
        message: String,
    },
    Progress {
        page: u32,
        total: u32,
        message: String,
    },
    Completed {
        output: Option<PathBuf>,
        pages: usize,
        cancelled: bool,
        warnings: Vec<String>,
    },
    Failed {
        message: String,
    },
}

impl CaptureEvent {
    /// True for the last event a session sends.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CaptureEvent::Completed { .. } | CaptureEvent::Failed { .. }
        )
    }
}

/// Cooperative cancel flag shared between the UI and the worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Blocking wait between capture steps.
pub trait Pause {
    fn pause(&mut self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Default)]
pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Starts a session on a dedicated `capture-worker` thread with the real
/// screen and keyboard.
///
/// The keyboard connection is opened on the worker thread itself; if that
/// fails the session ends with a `Failed` event.
pub fn spawn_worker(
    request: CaptureRequest,
    settings: Settings,
    cancel: CancelToken,
    events: EventSender,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("capture-worker".to_string())
        .spawn(move || {
            log::info!(
                "[SESSION] Starting: {} page(s) of {}{}",
                request.pages,
                request.region.describe(),
                if request.slow_loading { ", slow loading" } else { "" }
            );

            let advancer = match KeyboardAdvancer::new(settings.advance_key) {
                Ok(advancer) => advancer,
                Err(e) => {
                    log::error!("[SESSION] {}", e);
                    notify(
                        &events,
                        CaptureEvent::Failed {
                            message: e.to_string(),
                        },
                    );
                    return;
                }
            };

            let mut runner =
                SessionRunner::new(MonitorGrabber, advancer, ThreadPause, StdRng::from_entropy());
            runner.run(&request, &settings, &cancel, &events);
        })
}

/// Queues `event` for the UI. A closed queue only leaves a debug trace.
fn notify(events: &EventSender, event: CaptureEvent) {
    if let Err(e) = events.send(event) {
        log::debug!("[SESSION] Event dropped, relay is gone: {:?}", e.0);
    }
}

/// Drains the queue, handing each event to `deliver`, until every sender
/// has been dropped.
pub async fn forward_events(
    mut events: UnboundedReceiver<CaptureEvent>,
    mut deliver: impl FnMut(&CaptureEvent),
) {
    while let Some(event) = events.recv().await {
        deliver(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn request(pages: u32, region: Region) -> CaptureRequest {
        CaptureRequest {
            region,
            pages,
            slow_loading: false,
        }
    }

    fn some_region() -> Region {
        Region::from_drag((0, 0), (10, 10))
    }

    #[test]
    fn request_bounds_are_enforced() {
        assert!(request(1, some_region()).validate().is_ok());
        assert!(request(1000, some_region()).validate().is_ok());
        assert!(request(0, some_region()).validate().is_err());
        assert!(request(1001, some_region()).validate().is_err());
    }

    #[test]
    fn empty_region_is_rejected() {
        let empty = Region::from_drag((5, 5), (5, 40));
        assert!(matches!(
            request(3, empty).validate(),
            Err(SessionError::InvalidRequest(_))
        ));
    }

    #[test]
    fn request_deserializes_from_ui_payload() {
        let json = r#"{"region":{"left":1,"top":2,"width":3,"height":4},"pages":5,"slowLoading":true}"#;
        let req: CaptureRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.pages, 5);
        assert!(req.slow_loading);
        assert_eq!(req.region.width, 3);
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let worker_side = token.clone();
        assert!(!worker_side.is_cancelled());
        token.cancel();
        assert!(worker_side.is_cancelled());
    }

    #[test]
    fn events_serialize_with_kind_tag() {
        let event = CaptureEvent::Progress {
            page: 2,
            total: 5,
            message: "2/5 pages captured".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "progress");
        assert_eq!(json["page"], 2);
        assert_eq!(json["total"], 5);
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(!CaptureEvent::Status {
            message: String::new()
        }
        .is_terminal());
        assert!(CaptureEvent::Failed {
            message: String::new()
        }
        .is_terminal());
    }

    #[test]
    fn notify_tolerates_closed_queue() {
        let (tx, rx) = unbounded_channel();
        drop(rx);
        notify(
            &tx,
            CaptureEvent::Status {
                message: "nobody listening".to_string(),
            },
        );
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn forward_events_delivers_in_order_until_senders_drop() {
        let (tx, rx) = unbounded_channel();
        for page in 1..=3 {
            tx.send(CaptureEvent::Progress {
                page,
                total: 3,
                message: String::new(),
            })
            .unwrap();
        }
        drop(tx);

        let mut seen = Vec::new();
        forward_events(rx, |event| {
            if let CaptureEvent::Progress { page, .. } = event {
                seen.push(*page);
            }
        })
        .await;
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
