//! The capture loop.
//!
//! Turn the page, wait, grab the region, append it to the document,
//! report. Repeat until the requested page count is reached or the run is
//! cancelled. All OS access goes through the `ScreenGrabber`,
//! `PageAdvancer` and `Pause` seams.

use super::temp::TempPages;
use super::{notify, CancelToken, CaptureEvent, CaptureRequest, EventSender, Pause};
use crate::capture::ScreenGrabber;
use crate::config::Settings;
use crate::document::{encode_page_image, PageDocument};
use crate::error::SessionError;
use crate::input::PageAdvancer;
use rand::Rng;
use std::ops::Range;
use std::path::PathBuf;
use std::time::Duration;

/// Result of a run that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub output: Option<PathBuf>,
    pub pages: usize,
    pub cancelled: bool,
}

pub struct SessionRunner<G, A, P, R> {
    pub grabber: G,
    pub advancer: A,
    pub pause: P,
    pub rng: R,
}

impl<G, A, P, R> SessionRunner<G, A, P, R>
where
    G: ScreenGrabber,
    A: PageAdvancer,
    P: Pause,
    R: Rng,
{
    pub fn new(grabber: G, advancer: A, pause: P, rng: R) -> Self {
        Self {
            grabber,
            advancer,
            pause,
            rng,
        }
    }

    /// Runs one capture session to its end.
    ///
    /// Sends one `Progress` per captured page and exactly one terminal event
    /// (`Completed` or `Failed`). Temporary page images are removed in both
    /// cases.
    pub fn run(
        &mut self,
        request: &CaptureRequest,
        settings: &Settings,
        cancel: &CancelToken,
        events: &EventSender,
    ) {
        let mut temp = TempPages::new(&settings.output_dir);
        let result = self.execute(request, settings, cancel, &mut temp, events);
        let warnings = temp.cleanup();

        let terminal = match result {
            Ok(outcome) => {
                log::info!(
                    "[SESSION] Finished: {} page(s){}",
                    outcome.pages,
                    if outcome.cancelled { ", cancelled" } else { "" }
                );
                CaptureEvent::Completed {
                    output: outcome.output,
                    pages: outcome.pages,
                    cancelled: outcome.cancelled,
                    warnings,
                }
            }
            Err(e) => {
                log::error!("[SESSION] Capture failed: {}", e);
                CaptureEvent::Failed {
                    message: e.to_string(),
                }
            }
        };
        notify(events, terminal);
    }

    fn execute(
        &mut self,
        request: &CaptureRequest,
        settings: &Settings,
        cancel: &CancelToken,
        temp: &mut TempPages,
        events: &EventSender,
    ) -> Result<Outcome, SessionError> {
        request.validate()?;

        let timing = &settings.timing;
        let total = request.pages;

        if !timing.countdown.is_zero() {
            send_status(
                events,
                format!(
                    "Capture starts in {}s, focus the viewer",
                    timing.countdown.as_secs_f64().ceil()
                ),
            );
            self.pause.pause(timing.countdown);
        }
        send_status(events, "Preparing capture...".to_string());

        let title = settings
            .output_path()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let mut document = PageDocument::new(&title);
        let mut cancelled = false;

        for page in 1..=total {
            if cancel.is_cancelled() {
                log::info!("[SESSION] Cancelled before page {}/{}", page, total);
                cancelled = true;
                break;
            }

            if page > 1 {
                self.advancer.press()?;
                let hold = jitter(&mut self.rng, &timing.key_hold);
                self.pause.pause(hold);
                self.advancer.release()?;

                if request.slow_loading {
                    self.pause.pause(timing.slow_delay);
                }
            } else {
                let settle = jitter(&mut self.rng, &timing.first_page_settle);
                self.pause.pause(settle);
            }

            let image = self.grabber.grab(&request.region)?;
            let bytes = encode_page_image(&image, settings.jpeg_quality)?;
            let path = temp.write(page, &bytes)?;
            document.append_image_file(&path)?;

            log::debug!("[SESSION] Captured page {}/{}", page, total);
            notify(
                events,
                CaptureEvent::Progress {
                    page,
                    total,
                    message: format!("{}/{} pages captured", page, total),
                },
            );
        }

        let output = if document.page_count() > 0 {
            let path = settings.output_path();
            document.save(&path)?;
            send_status(events, format!("Saved {}", path.display()));
            Some(path)
        } else {
            None
        };

        Ok(Outcome {
            output,
            pages: document.page_count(),
            cancelled,
        })
    }
}

fn send_status(events: &EventSender, message: String) {
    notify(events, CaptureEvent::Status { message });
}

/// Picks a random duration in `range`; an empty range yields its start.
fn jitter(rng: &mut impl Rng, range: &Range<Duration>) -> Duration {
    if range.is_empty() {
        range.start
    } else {
        rng.gen_range(range.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn jitter_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = Duration::from_millis(100)..Duration::from_millis(500);
        for _ in 0..200 {
            let d = jitter(&mut rng, &range);
            assert!(range.contains(&d), "{:?} outside range", d);
        }
    }

    #[test]
    fn empty_jitter_range_yields_start() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = Duration::from_millis(300)..Duration::from_millis(300);
        assert_eq!(jitter(&mut rng, &range), Duration::from_millis(300));
    }
}
