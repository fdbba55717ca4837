//! Tower state machine
//!
//! Start, drop, game over, revive and restart. Each operation leaves the
//! state consistent on return, so a tick never observes a half-resolved
//! drop.

use glam::Vec2;
use rand::Rng;

use super::combo::ComboTier;
use super::geometry::resolve_overlap;
use super::state::{Block, GameEvent, GamePhase, GameState};
use crate::config::GameConfig;
use crate::consts::{BASE_BOTTOM_MARGIN, GAME_OVER_SHAKE, GAME_OVER_UI_DELAY_TICKS, REVIVE_WIDTH_BONUS};
use crate::palette::Rgba;
use crate::progression::{PowerupKind, ProgressError, SessionSummary};

/// Speed (pixels per tick) for a block spawned at `score`
pub fn next_block_speed(config: &GameConfig, score: u64, slow_motion: bool) -> f32 {
    let (base, acceleration) = if slow_motion {
        (config.base_speed / 2.0, config.speed_acceleration / 2.0)
    } else {
        (config.base_speed, config.speed_acceleration)
    };
    base + (score as f32 * acceleration).min(config.speed_cap)
}

impl GameState {
    /// Reset the session and place the base block
    pub fn start_game(&mut self) {
        self.score = 0;
        self.session_coins = 0;
        self.combo = Default::default();
        self.can_revive = true;
        self.game_over_ticks = None;
        self.tower.clear();
        self.effects.clear();

        let width = self.config.base_block_width;
        let base = Block::new(
            (self.config.canvas_width - width) / 2.0,
            self.config.canvas_height - BASE_BOTTOM_MARGIN,
            width,
            self.config.block_height,
            self.progress.current_skin.colors(0),
        );
        self.tower.blocks.push(base);
        self.spawn_next_block();

        self.phase = GamePhase::Playing;
        self.emit(GameEvent::Started);
        log::info!(
            "Game started (seed {}, variant {})",
            self.seed,
            self.config.variant.as_str()
        );
    }

    /// Commit the moving block where it is
    ///
    /// Panics if there is no moving block or no base; callers check
    /// `phase` and `tower.current` first.
    pub fn drop_block(&mut self) {
        let mut block = self
            .tower
            .current
            .take()
            .expect("drop_block requires a moving block");
        let top = *self.tower.top().expect("tower has no base block");
        let overlap = resolve_overlap(&block, &top);

        if overlap.is_miss() {
            if !self.consume_shield() {
                log::debug!("Miss at x={:.1}", block.x);
                self.effects.spawn_miss_debris(&mut self.rng, &block);
                self.combo.reset();
                self.tower.current = Some(block);
                self.game_over();
                return;
            }
            block.x = top.x;
            block.width = top.width;
            self.combo.reset();
            let neutral = self.config.scorer.neutral().clone();
            self.apply_tier(&block, &neutral);
            self.shield_saved(&block);
        } else if overlap.offset <= self.config.perfect_tolerance {
            block.x = top.x;
            block.width = top.width;
            let streak = self.combo.register_perfect();
            self.progress.record_perfect();
            self.progress_dirty = true;

            let tier = self.config.scorer.tier_for(streak).clone();
            self.apply_tier(&block, &tier);
            self.effects.show_text(
                &tier.message,
                Some(format!("+{}", tier.score_bonus)),
                Vec2::new(block.center().x, block.y),
                tier.particle_color,
            );
            self.effects
                .spawn_perfect_burst(&mut self.rng, &block, streak, tier.particle_color);
            if self.config.variant.tracks_rewards() && tier.coin_bonus > 0 {
                self.effects.spawn_coin_flourish(&mut self.rng, block.center());
            }
            log::debug!("Perfect drop, streak {streak}");
            self.emit(GameEvent::Perfect {
                streak,
                score_bonus: tier.score_bonus,
            });
        } else {
            self.combo.reset();
            let cut_width = match overlap.cut_piece(&block) {
                Some((x, width)) => {
                    self.effects
                        .spawn_cut(&mut self.rng, &block, overlap.side, x, width);
                    width
                }
                None => 0.0,
            };
            block.x = overlap.start;
            block.width = overlap.width;

            let neutral = self.config.scorer.neutral().clone();
            self.apply_tier(&block, &neutral);
            log::debug!("Cut {cut_width:.1}px, {:.1}px left", block.width);
            self.emit(GameEvent::Cut {
                kept_width: block.width,
                cut_width,
            });

            if block.width < self.config.min_block_width {
                if !self.consume_shield() {
                    self.tower.current = Some(block);
                    self.game_over();
                    return;
                }
                let width = self.config.shield_rescue_width.min(top.width);
                block.x = (overlap.center() - width / 2.0).clamp(top.x, top.right() - width);
                block.width = width;
                self.shield_saved(&block);
            }
        }

        self.place_block(block);
    }

    /// Score, coins, shake and glow for one resolved drop
    fn apply_tier(&mut self, block: &Block, tier: &ComboTier) {
        self.score += tier.score_bonus as u64;
        self.effects.shake(tier.screen_shake);
        self.effects.glow = tier.glow_intensity;
        self.award_coins(tier.coin_bonus, block.center());
    }

    fn award_coins(&mut self, amount: u32, pos: Vec2) {
        if amount == 0 || !self.config.variant.tracks_rewards() {
            return;
        }
        self.progress.earn_coins(amount);
        self.session_coins += amount as u64;
        self.progress_dirty = true;
        self.effects.show_coins(amount, pos);
        self.emit(GameEvent::CoinsAwarded(amount));
    }

    fn consume_shield(&mut self) -> bool {
        std::mem::replace(&mut self.powerups.shield, false)
    }

    fn shield_saved(&mut self, block: &Block) {
        log::info!("Shield absorbed a failed drop");
        self.effects.show_text(
            "SHIELD!",
            None,
            Vec2::new(block.center().x, block.y),
            Rgba::SHIELD_BLUE,
        );
        self.award_coins(self.config.shield_save_coins, block.center());
        self.emit(GameEvent::ShieldSaved);
    }

    fn place_block(&mut self, mut block: Block) {
        assert!(block.width > 0.0, "placed block must have positive width");
        block.start_settle();
        self.tower.blocks.push(block);

        if block.y < self.config.canvas_height * 0.5 {
            self.effects.camera_target += self.config.block_height;
        }
        self.powerups.slow_motion_blocks = self.powerups.slow_motion_blocks.saturating_sub(1);
        self.spawn_next_block();
    }

    /// Spawn the next moving block off-canvas on a random side
    pub fn spawn_next_block(&mut self) {
        let top = *self.tower.top().expect("tower has no base block");
        let from_left = self.rng.random_bool(0.5);
        let x = if from_left {
            -top.width
        } else {
            self.config.canvas_width
        };

        self.tower.current = Some(Block::new(
            x,
            top.y - self.config.block_height,
            top.width,
            self.config.block_height,
            self.progress.current_skin.colors(self.tower.height()),
        ));
        self.tower.direction = if from_left { 1.0 } else { -1.0 };
        self.tower.speed = next_block_speed(
            &self.config,
            self.score,
            self.powerups.slow_motion_blocks > 0,
        );
    }

    /// End the session; the moving block (if any) tumbles away
    pub fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.games_played += 1;
        self.effects.shake(GAME_OVER_SHAKE);
        if let Some(block) = self.tower.current.take() {
            self.effects.spawn_falling_block(&block, self.tower.direction);
        }

        let new_record = self.progress.record_game(self.score);
        let unlocked = self.progress.check_achievements(&SessionSummary {
            score: self.score,
            max_streak: self.combo.max_streak,
        });
        self.progress_dirty = true;
        self.game_over_ticks = Some(GAME_OVER_UI_DELAY_TICKS);

        log::info!(
            "Game over: score {} (best {}), {} coins this session",
            self.score,
            self.progress.high_score,
            self.session_coins
        );
        self.emit(GameEvent::GameOver {
            score: self.score,
            high_score: self.progress.high_score,
            new_record,
        });
        for achievement in unlocked {
            log::info!("Achievement unlocked: {}", achievement.title());
            self.emit(GameEvent::AchievementUnlocked(achievement));
        }
    }

    /// Count down to the game-over screen
    pub(crate) fn update_game_over(&mut self) {
        let Some(ticks) = self.game_over_ticks else {
            return;
        };
        if ticks > 1 {
            self.game_over_ticks = Some(ticks - 1);
            return;
        }
        self.game_over_ticks = None;
        let every = self.config.interstitial_every;
        let show_interstitial = every > 0 && self.games_played % every == 0;
        self.emit(GameEvent::GameOverUiReady {
            can_revive: self.can_revive,
            show_interstitial,
        });
    }

    /// Continue a lost session once; returns false when not allowed
    pub fn revive(&mut self) -> bool {
        if self.phase != GamePhase::GameOver || !self.can_revive {
            return false;
        }
        let Some(base_width) = self.tower.base().map(|b| b.width) else {
            return false;
        };
        let Some(top) = self.tower.blocks.last_mut() else {
            return false;
        };
        top.width = (top.width + REVIVE_WIDTH_BONUS).min(base_width);

        self.can_revive = false;
        self.combo.reset();
        self.game_over_ticks = None;
        self.phase = GamePhase::Playing;
        self.spawn_next_block();

        log::info!("Revived at score {}", self.score);
        self.emit(GameEvent::Revived);
        true
    }

    /// Back to the start screen
    pub fn restart(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.tower.clear();
        self.effects.clear();
        self.game_over_ticks = None;
        self.phase = GamePhase::Start;
        self.emit(GameEvent::Restarted);
        true
    }

    /// Spend one owned powerup and arm it for this session
    pub fn arm_powerup(&mut self, kind: PowerupKind) -> Result<(), ProgressError> {
        let active = match kind {
            PowerupKind::Shield => self.powerups.shield,
            PowerupKind::SlowMotion => self.powerups.slow_motion_blocks > 0,
        };
        if active {
            return Err(ProgressError::PowerupActive(kind));
        }
        self.progress.consume_powerup(kind)?;
        self.progress_dirty = true;

        match kind {
            PowerupKind::Shield => self.powerups.shield = true,
            PowerupKind::SlowMotion => {
                self.powerups.slow_motion_blocks = self.config.slow_motion_blocks;
                if self.tower.current.is_some() {
                    self.tower.speed = next_block_speed(&self.config, self.score, true);
                }
            }
        }
        log::info!("Armed {}", kind.as_str());
        Ok(())
    }
}
