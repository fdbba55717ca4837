//! Composition root
//!
//! `StackTower` owns the simulation, the progress store, the ad manager and
//! the fixed-step driver. Hosts (the native demo, the browser shell) feed it
//! input and elapsed time, then draw the frames it builds.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::ads::{AdManager, AdOutcome};
use crate::config::GameConfig;
use crate::persistence::{KeyValueStore, ProgressStore};
use crate::platform::FixedStepDriver;
use crate::progression::{PowerupKind, ProgressError, SkinId};
use crate::renderer::{Frame, Starfield, build_frame, hits_revive_button};
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

pub struct StackTower<S: KeyValueStore> {
    state: GameState,
    store: ProgressStore<S>,
    ads: AdManager,
    driver: FixedStepDriver,
    /// Latched until the next tick consumes it
    input: TickInput,
    revive_pending: bool,
    /// Shake jitter and stars only; kept apart from the simulation RNG
    frame_rng: Pcg32,
    stars: Starfield,
}

impl<S: KeyValueStore> StackTower<S> {
    pub fn new(seed: u64, config: GameConfig, store: S, ads: AdManager) -> Self {
        let store = ProgressStore::new(store);
        let progress = store.load();
        let mut frame_rng = Pcg32::seed_from_u64(seed.wrapping_add(1));
        let stars = Starfield::new(&mut frame_rng, config.canvas_width, config.canvas_height);
        Self {
            state: GameState::new(seed, config, progress),
            store,
            ads,
            driver: FixedStepDriver::default(),
            input: TickInput::default(),
            revive_pending: false,
            frame_rng,
            stars,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn store(&self) -> &ProgressStore<S> {
        &self.store
    }

    pub fn tap(&mut self) {
        self.input.tap = true;
    }

    /// Pointer press at a screen position (mouse or touch)
    ///
    /// On the game-over screen this hits the revive button or restarts;
    /// everywhere else it is a tap.
    pub fn press(&mut self, pos: Vec2) {
        if !self.state.game_over_ui_ready() {
            self.tap();
            return;
        }
        if self.state.can_revive && hits_revive_button(&self.state.config, pos) {
            self.request_revive();
        } else {
            self.restart();
        }
    }

    pub fn restart(&mut self) {
        self.input.restart = true;
        // A reward that lands later belongs to the abandoned session
        self.revive_pending = false;
    }

    /// Show a rewarded ad; the revive happens once the reward arrives
    pub fn request_revive(&mut self) -> bool {
        if self.state.phase != GamePhase::GameOver || !self.state.can_revive || self.revive_pending {
            return false;
        }
        match self.ads.request_rewarded() {
            Ok(()) => {
                self.revive_pending = true;
                true
            }
            Err(e) => {
                log::warn!("Revive ad request failed: {e}");
                false
            }
        }
    }

    pub fn arm_powerup(&mut self, kind: PowerupKind) -> Result<(), ProgressError> {
        self.state.arm_powerup(kind)?;
        self.persist();
        Ok(())
    }

    pub fn buy_powerup(&mut self, kind: PowerupKind) -> Result<(), ProgressError> {
        self.state.progress.buy_powerup(kind)?;
        self.persist();
        Ok(())
    }

    pub fn unlock_skin(&mut self, skin: SkinId) -> Result<(), ProgressError> {
        self.state.progress.unlock_skin(skin)?;
        self.persist();
        Ok(())
    }

    pub fn select_skin(&mut self, skin: SkinId) -> Result<(), ProgressError> {
        self.state.progress.select_skin(skin)?;
        self.persist();
        Ok(())
    }

    /// Claim the daily reward for day number `today`
    pub fn claim_daily(&mut self, today: u32) -> Result<u32, ProgressError> {
        let coins = self.state.progress.claim_daily(today)?;
        log::info!(
            "Daily reward: {coins} coins (streak {})",
            self.state.progress.daily_streak
        );
        self.persist();
        Ok(coins)
    }

    /// Canvas size changed; applies from the next game
    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.config.resize(width, height);
        self.stars = Starfield::new(&mut self.frame_rng, width, height);
    }

    /// Advance by wall-clock `elapsed` seconds
    pub fn update(&mut self, elapsed: f32) -> Vec<GameEvent> {
        for outcome in self.ads.poll() {
            match outcome {
                AdOutcome::Rewarded if self.revive_pending => {
                    self.revive_pending = false;
                    self.input.revive = true;
                }
                AdOutcome::RewardDenied => {
                    self.revive_pending = false;
                    log::info!("Reward denied, staying on game over");
                }
                AdOutcome::Rewarded | AdOutcome::InterstitialClosed => {}
            }
        }

        let ticks = self.driver.advance(elapsed);
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(self.step());
        }
        events
    }

    /// Run exactly one simulation tick
    pub fn step(&mut self) -> Vec<GameEvent> {
        let input = std::mem::take(&mut self.input);
        tick(&mut self.state, &input);

        let events = self.state.drain_events();
        for event in &events {
            if let GameEvent::GameOverUiReady {
                show_interstitial: true,
                ..
            } = event
                && let Err(e) = self.ads.request_interstitial()
            {
                log::warn!("Interstitial request failed: {e}");
            }
        }
        if self.state.take_progress_dirty() {
            self.persist();
        }
        events
    }

    pub fn frame(&mut self) -> Frame {
        self.stars.twinkle(&mut self.frame_rng);
        build_frame(&self.state, &self.stars, &mut self.frame_rng)
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.state.progress) {
            log::warn!("Failed to save progress: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ads::{AdBackend, AdError};
    use crate::consts::SIM_DT;
    use crate::persistence::MemoryStore;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::{Duration, Instant};

    fn game(ads: AdManager) -> StackTower<MemoryStore> {
        StackTower::new(7, GameConfig::default(), MemoryStore::new(), ads)
    }

    fn drop_at(game: &mut StackTower<MemoryStore>, x: f32) {
        game.state.tower.current.as_mut().expect("moving block").x = x;
        game.tap();
        game.step();
    }

    fn lose(game: &mut StackTower<MemoryStore>) {
        game.tap();
        game.step();
        drop_at(game, 1000.0);
        assert_eq!(game.state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_tap_latches_until_a_tick_runs() {
        let mut game = game(AdManager::unavailable());
        game.tap();
        // Too short for a tick: the tap waits
        assert!(game.update(SIM_DT / 4.0).is_empty());
        assert_eq!(game.state().phase, GamePhase::Start);

        let events = game.update(SIM_DT);
        assert_eq!(events, vec![GameEvent::Started]);
        assert_eq!(game.state().phase, GamePhase::Playing);
    }

    #[test]
    fn test_progress_saved_after_coins() {
        let mut game = game(AdManager::unavailable());
        game.tap();
        game.step();
        drop_at(&mut game, 100.0);

        let saved = game.store().load();
        assert_eq!(saved.coins, 1);
        assert_eq!(saved.total_perfects, 1);
    }

    #[test]
    fn test_revive_without_ads_is_granted() {
        let mut game = game(AdManager::unavailable());
        lose(&mut game);
        assert!(game.request_revive());
        assert!(!game.request_revive());

        game.update(SIM_DT * 1.5);
        assert_eq!(game.state().phase, GamePhase::Playing);
        assert!(!game.state().can_revive);
    }

    struct CountingBackend {
        interstitials: Arc<AtomicU32>,
    }

    impl AdBackend for CountingBackend {
        fn show_interstitial(&mut self) -> Result<(), AdError> {
            self.interstitials.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn show_rewarded(&mut self) -> Result<bool, AdError> {
            Ok(false)
        }
    }

    #[test]
    fn test_interstitial_on_third_game_and_denied_revive() {
        let shown = Arc::new(AtomicU32::new(0));
        let mut game = game(AdManager::spawn(CountingBackend {
            interstitials: shown.clone(),
        }));

        for _ in 0..3 {
            lose(&mut game);
            for _ in 0..60 {
                game.step();
            }
            if game.state.games_played < 3 {
                game.restart();
                game.step();
            }
        }

        let deadline = Instant::now() + Duration::from_secs(5);
        while shown.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(shown.load(Ordering::SeqCst), 1);

        // The backend never grants rewards
        assert!(game.request_revive());
        let deadline = Instant::now() + Duration::from_secs(5);
        while game.revive_pending && Instant::now() < deadline {
            game.update(0.0);
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(game.state().phase, GamePhase::GameOver);
        assert!(game.state().can_revive);
    }

    fn wait_for_game_over_screen(game: &mut StackTower<MemoryStore>) {
        for _ in 0..60 {
            game.step();
        }
        assert!(game.state().game_over_ui_ready());
    }

    #[test]
    fn test_press_restarts_from_game_over_screen() {
        let mut game = game(AdManager::unavailable());
        lose(&mut game);

        // Before the screen is up a press is an ignored tap
        game.press(Vec2::new(200.0, 100.0));
        game.step();
        assert_eq!(game.state().phase, GamePhase::GameOver);

        wait_for_game_over_screen(&mut game);
        game.press(Vec2::new(200.0, 100.0));
        game.step();
        assert_eq!(game.state().phase, GamePhase::Start);

        game.press(Vec2::new(200.0, 100.0));
        game.step();
        assert_eq!(game.state().phase, GamePhase::Playing);
    }

    #[test]
    fn test_press_on_revive_button() {
        let mut game = game(AdManager::unavailable());
        lose(&mut game);
        wait_for_game_over_screen(&mut game);

        let (center, _) = crate::renderer::revive_button(&game.state().config);
        game.press(center);
        game.update(SIM_DT * 1.5);
        assert_eq!(game.state().phase, GamePhase::Playing);
        assert!(!game.state().can_revive);
    }

    #[test]
    fn test_restart_drops_pending_reward() {
        let mut game = game(AdManager::unavailable());
        lose(&mut game);
        assert!(game.request_revive());
        game.restart();

        // The reward is polled after the restart was requested
        game.update(SIM_DT * 1.5);
        assert_eq!(game.state().phase, GamePhase::Start);

        lose(&mut game);
        assert!(game.state().can_revive);
        game.update(SIM_DT * 1.5);
        assert_eq!(game.state().phase, GamePhase::GameOver);
    }

    #[test]
    fn test_frame_has_stars() {
        let mut game = game(AdManager::unavailable());
        let frame = game.frame();
        assert_eq!(
            frame.commands.len(),
            crate::renderer::stars::STAR_COUNT
        );
    }

    #[test]
    fn test_shop_operations_persist() {
        let mut game = game(AdManager::unavailable());
        assert!(game.buy_powerup(PowerupKind::Shield).is_err());

        assert_eq!(game.claim_daily(10), Ok(10));
        assert_eq!(game.claim_daily(11), Ok(20));
        assert_eq!(game.claim_daily(12), Ok(30));
        game.buy_powerup(PowerupKind::Shield).unwrap();
        game.arm_powerup(PowerupKind::Shield).unwrap();
        assert!(game.unlock_skin(SkinId::Neon).is_err());

        let saved = game.store().load();
        assert_eq!(saved.coins, 10);
        assert_eq!(saved.daily_streak, 3);
        assert_eq!(saved.powerup_count(PowerupKind::Shield), 0);
    }

    #[test]
    fn test_progress_survives_restart_of_app() {
        let mut first = game(AdManager::unavailable());
        lose(&mut first);
        let backend = first.store.backend().clone();

        let second = StackTower::new(8, GameConfig::default(), backend, AdManager::unavailable());
        assert_eq!(second.state().progress.total_games, 1);
    }
}
