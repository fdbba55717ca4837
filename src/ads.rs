//! Interstitial and rewarded ads
//!
//! Ad SDKs block while an ad is on screen, so the backend runs on a worker
//! thread. The game sends show requests and polls for outcomes once per
//! frame; the simulation never waits on an ad.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdKind {
    Interstitial,
    Rewarded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdError {
    #[error("no ad loaded")]
    NotLoaded,
    #[error("ad failed to show: {0}")]
    ShowFailed(String),
    #[error("a {0:?} ad is already showing")]
    Busy(AdKind),
    #[error("ad worker has stopped")]
    WorkerGone,
}

/// A blocking ad SDK
pub trait AdBackend: Send + 'static {
    fn show_interstitial(&mut self) -> Result<(), AdError>;
    /// Returns whether the player earned the reward
    fn show_rewarded(&mut self) -> Result<bool, AdError>;
}

/// What the game hears back after a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdOutcome {
    InterstitialClosed,
    Rewarded,
    RewardDenied,
}

enum AdCommand {
    Show(AdKind),
    Shutdown,
}

struct AdEvent {
    kind: AdKind,
    result: Result<bool, AdError>,
}

struct AdWorker {
    tx_cmd: Sender<AdCommand>,
    rx_evt: Receiver<AdEvent>,
    thread: Option<JoinHandle<()>>,
}

impl AdWorker {
    fn spawn<B: AdBackend>(backend: B) -> std::io::Result<Self> {
        let (tx_cmd, rx_cmd) = mpsc::channel::<AdCommand>();
        let (tx_evt, rx_evt) = mpsc::channel::<AdEvent>();

        let thread = thread::Builder::new()
            .name("ad-worker".to_string())
            .spawn(move || worker_loop(backend, rx_cmd, tx_evt))?;

        Ok(Self {
            tx_cmd,
            rx_evt,
            thread: Some(thread),
        })
    }
}

impl Drop for AdWorker {
    fn drop(&mut self) {
        let _ = self.tx_cmd.send(AdCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn worker_loop<B: AdBackend>(mut backend: B, rx_cmd: Receiver<AdCommand>, tx_evt: Sender<AdEvent>) {
    while let Ok(cmd) = rx_cmd.recv() {
        let (kind, result) = match cmd {
            AdCommand::Show(AdKind::Interstitial) => (
                AdKind::Interstitial,
                backend.show_interstitial().map(|()| false),
            ),
            AdCommand::Show(AdKind::Rewarded) => (AdKind::Rewarded, backend.show_rewarded()),
            AdCommand::Shutdown => break,
        };
        if tx_evt.send(AdEvent { kind, result }).is_err() {
            break;
        }
    }
}

/// Front end for the ad worker
///
/// Without a backend every rewarded request is granted immediately and
/// interstitials are skipped.
pub struct AdManager {
    worker: Option<AdWorker>,
    interstitial_in_flight: bool,
    rewarded_in_flight: bool,
    ready: VecDeque<AdOutcome>,
}

impl AdManager {
    pub fn unavailable() -> Self {
        Self {
            worker: None,
            interstitial_in_flight: false,
            rewarded_in_flight: false,
            ready: VecDeque::new(),
        }
    }

    /// Run `backend` on a worker thread; falls back to `unavailable` if the
    /// thread cannot be started
    pub fn spawn<B: AdBackend>(backend: B) -> Self {
        match AdWorker::spawn(backend) {
            Ok(worker) => Self {
                worker: Some(worker),
                ..Self::unavailable()
            },
            Err(e) => {
                log::warn!("Could not start ad worker, ads disabled: {e}");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.worker.is_some()
    }

    pub fn in_flight(&self, kind: AdKind) -> bool {
        match kind {
            AdKind::Interstitial => self.interstitial_in_flight,
            AdKind::Rewarded => self.rewarded_in_flight,
        }
    }

    pub fn request_interstitial(&mut self) -> Result<(), AdError> {
        if self.worker.is_none() {
            log::debug!("Ads unavailable, skipping interstitial");
            return Ok(());
        }
        self.send(AdKind::Interstitial)
    }

    /// Ask for a rewarded ad; the answer arrives through `poll`
    pub fn request_rewarded(&mut self) -> Result<(), AdError> {
        if self.worker.is_none() {
            log::info!("Ads unavailable, granting reward");
            self.ready.push_back(AdOutcome::Rewarded);
            return Ok(());
        }
        self.send(AdKind::Rewarded)
    }

    fn send(&mut self, kind: AdKind) -> Result<(), AdError> {
        if self.in_flight(kind) {
            return Err(AdError::Busy(kind));
        }
        let Some(worker) = self.worker.as_ref() else {
            return Err(AdError::WorkerGone);
        };
        if worker.tx_cmd.send(AdCommand::Show(kind)).is_err() {
            log::warn!("Ad worker stopped, ads disabled");
            self.worker = None;
            return Err(AdError::WorkerGone);
        }
        match kind {
            AdKind::Interstitial => self.interstitial_in_flight = true,
            AdKind::Rewarded => self.rewarded_in_flight = true,
        }
        Ok(())
    }

    /// Collect finished requests (non-blocking)
    pub fn poll(&mut self) -> Vec<AdOutcome> {
        let mut outcomes: Vec<AdOutcome> = self.ready.drain(..).collect();
        let Some(worker) = self.worker.as_ref() else {
            return outcomes;
        };

        while let Ok(AdEvent { kind, result }) = worker.rx_evt.try_recv() {
            let outcome = match (kind, result) {
                (AdKind::Interstitial, Ok(_)) => AdOutcome::InterstitialClosed,
                (AdKind::Interstitial, Err(e)) => {
                    log::warn!("Interstitial failed: {e}");
                    AdOutcome::InterstitialClosed
                }
                (AdKind::Rewarded, Ok(true)) => AdOutcome::Rewarded,
                (AdKind::Rewarded, Ok(false)) => AdOutcome::RewardDenied,
                (AdKind::Rewarded, Err(e)) => {
                    log::warn!("Rewarded ad failed: {e}");
                    AdOutcome::RewardDenied
                }
            };
            match kind {
                AdKind::Interstitial => self.interstitial_in_flight = false,
                AdKind::Rewarded => self.rewarded_in_flight = false,
            }
            outcomes.push(outcome);
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    struct ScriptedBackend {
        interstitial: Result<(), AdError>,
        rewarded: Result<bool, AdError>,
    }

    impl AdBackend for ScriptedBackend {
        fn show_interstitial(&mut self) -> Result<(), AdError> {
            self.interstitial.clone()
        }

        fn show_rewarded(&mut self) -> Result<bool, AdError> {
            self.rewarded.clone()
        }
    }

    /// Holds every ad on screen until the test releases it
    struct GatedBackend {
        gate: Receiver<()>,
    }

    impl AdBackend for GatedBackend {
        fn show_interstitial(&mut self) -> Result<(), AdError> {
            let _ = self.gate.recv();
            Ok(())
        }

        fn show_rewarded(&mut self) -> Result<bool, AdError> {
            let _ = self.gate.recv();
            Ok(true)
        }
    }

    fn poll_until(ads: &mut AdManager, count: usize) -> Vec<AdOutcome> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut outcomes = Vec::new();
        while outcomes.len() < count && Instant::now() < deadline {
            outcomes.extend(ads.poll());
            thread::sleep(Duration::from_millis(1));
        }
        outcomes
    }

    #[test]
    fn test_unavailable_grants_reward() {
        let mut ads = AdManager::unavailable();
        assert!(!ads.is_available());
        ads.request_interstitial().unwrap();
        ads.request_rewarded().unwrap();
        assert_eq!(ads.poll(), vec![AdOutcome::Rewarded]);
        assert!(ads.poll().is_empty());
    }

    #[test]
    fn test_worker_reports_outcomes() {
        let mut ads = AdManager::spawn(ScriptedBackend {
            interstitial: Ok(()),
            rewarded: Ok(true),
        });
        assert!(ads.is_available());
        ads.request_interstitial().unwrap();
        ads.request_rewarded().unwrap();

        let outcomes = poll_until(&mut ads, 2);
        assert_eq!(
            outcomes,
            vec![AdOutcome::InterstitialClosed, AdOutcome::Rewarded]
        );
        assert!(!ads.in_flight(AdKind::Rewarded));
    }

    #[test]
    fn test_failed_rewarded_denies_reward() {
        let mut ads = AdManager::spawn(ScriptedBackend {
            interstitial: Err(AdError::NotLoaded),
            rewarded: Err(AdError::ShowFailed("no fill".to_string())),
        });
        ads.request_rewarded().unwrap();
        ads.request_interstitial().unwrap();
        let outcomes = poll_until(&mut ads, 2);
        assert_eq!(
            outcomes,
            vec![AdOutcome::RewardDenied, AdOutcome::InterstitialClosed]
        );
    }

    #[test]
    fn test_one_request_in_flight_per_kind() {
        let (release, gate) = mpsc::channel();
        let mut ads = AdManager::spawn(GatedBackend { gate });

        ads.request_rewarded().unwrap();
        assert!(ads.in_flight(AdKind::Rewarded));
        assert_eq!(
            ads.request_rewarded(),
            Err(AdError::Busy(AdKind::Rewarded))
        );
        assert!(ads.poll().is_empty());

        release.send(()).unwrap();
        assert_eq!(poll_until(&mut ads, 1), vec![AdOutcome::Rewarded]);
        assert!(ads.request_rewarded().is_ok());
        release.send(()).unwrap();
    }
}
