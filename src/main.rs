//! Stack Tower entry point
//!
//! Native: a headless autoplay demo that plays one game against the saved
//! progress. Web: a canvas-2D front end.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use stack_tower::ads::AdManager;
    use stack_tower::persistence::{KeyValueStore, MemoryStore};
    use stack_tower::platform::storage::LocalStorage;
    use stack_tower::renderer::{Align, DrawCommand, Fill, Frame};
    use stack_tower::sim::GameEvent;
    use stack_tower::{GameConfig, StackTower, Variant};

    type Game = StackTower<Box<dyn KeyValueStore>>;

    struct App {
        game: Game,
        ctx: CanvasRenderingContext2d,
        last_time: f64,
    }

    impl App {
        fn frame(&mut self, time: f64) {
            let elapsed = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = time;

            for event in self.game.update(elapsed) {
                match event {
                    GameEvent::GameOverUiReady { can_revive, .. } => {
                        log::info!(
                            "Game over - tap or press R to restart{}",
                            if can_revive { ", REVIVE button or V to revive" } else { "" }
                        );
                    }
                    GameEvent::AchievementUnlocked(id) => {
                        log::info!("Achievement: {}", id.title());
                    }
                    _ => {}
                }
            }

            let frame = self.game.frame();
            draw(&self.ctx, &frame);
        }
    }

    fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
        let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
        ctx.begin_path();
        ctx.move_to(x + r, y);
        let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
        let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
        let _ = ctx.arc_to(x, y + h, x, y, r);
        let _ = ctx.arc_to(x, y, x + w, y, r);
        ctx.close_path();
    }

    fn draw(ctx: &CanvasRenderingContext2d, frame: &Frame) {
        let (w, h) = (frame.width as f64, frame.height as f64);
        let background = ctx.create_linear_gradient(0.0, 0.0, 0.0, h);
        for (i, stop) in frame.background.iter().enumerate() {
            let _ = background.add_color_stop(i as f32 / 2.0, &stop.to_css());
        }
        ctx.set_fill_style_canvas_gradient(&background);
        ctx.fill_rect(0.0, 0.0, w, h);

        for command in &frame.commands {
            match command {
                DrawCommand::Rect {
                    anchor,
                    rotation,
                    offset,
                    size,
                    fill,
                    corner_radius,
                } => {
                    ctx.save();
                    let _ = ctx.translate(anchor.x as f64, anchor.y as f64);
                    let _ = ctx.rotate(*rotation as f64);
                    let (x, y) = (offset.x as f64, offset.y as f64);
                    let (rw, rh) = (size.x as f64, size.y as f64);
                    match fill {
                        Fill::Solid(color) => ctx.set_fill_style_str(&color.to_css()),
                        Fill::VerticalGradient { top, bottom } => {
                            let gradient = ctx.create_linear_gradient(x, y, x, y + rh);
                            let _ = gradient.add_color_stop(0.0, &top.to_css());
                            let _ = gradient.add_color_stop(1.0, &bottom.to_css());
                            ctx.set_fill_style_canvas_gradient(&gradient);
                        }
                    }
                    if *corner_radius > 0.0 {
                        rounded_rect(ctx, x, y, rw, rh, *corner_radius as f64);
                        ctx.fill();
                    } else {
                        ctx.fill_rect(x, y, rw, rh);
                    }
                    ctx.restore();
                }
                DrawCommand::Circle {
                    center,
                    radius,
                    color,
                    glow,
                } => {
                    if *glow {
                        ctx.set_shadow_blur(10.0);
                        ctx.set_shadow_color(&color.to_css());
                    }
                    ctx.set_fill_style_str(&color.to_css());
                    ctx.begin_path();
                    let _ = ctx.arc(center.x as f64, center.y as f64, *radius as f64, 0.0, TAU);
                    ctx.fill();
                    ctx.set_shadow_blur(0.0);
                }
                DrawCommand::Line {
                    from,
                    to,
                    color,
                    width,
                    dashed,
                } => {
                    ctx.set_stroke_style_str(&color.to_css());
                    ctx.set_line_width(*width as f64);
                    if *dashed {
                        let dash = js_sys::Array::of2(&5.0.into(), &5.0.into());
                        let _ = ctx.set_line_dash(&dash);
                    }
                    ctx.begin_path();
                    ctx.move_to(from.x as f64, from.y as f64);
                    ctx.line_to(to.x as f64, to.y as f64);
                    ctx.stroke();
                    let _ = ctx.set_line_dash(&js_sys::Array::new());
                }
                DrawCommand::Text {
                    text,
                    pos,
                    size,
                    scale,
                    color,
                    align,
                    shadow,
                } => {
                    ctx.save();
                    let _ = ctx.translate(pos.x as f64, pos.y as f64);
                    let _ = ctx.scale(*scale as f64, *scale as f64);
                    ctx.set_font(&format!("bold {size}px Arial"));
                    ctx.set_text_align(match align {
                        Align::Left => "left",
                        Align::Center => "center",
                    });
                    if let Some(shadow) = shadow {
                        ctx.set_shadow_blur(10.0);
                        ctx.set_shadow_color(&shadow.to_css());
                    }
                    ctx.set_fill_style_str(&color.to_css());
                    let _ = ctx.fill_text(text, 0.0, 0.0);
                    ctx.restore();
                }
                DrawCommand::Glow {
                    center,
                    radius,
                    color,
                } => {
                    let (cx, cy, r) = (center.x as f64, center.y as f64, *radius as f64);
                    if let Ok(gradient) = ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, r) {
                        let _ = gradient.add_color_stop(0.0, &color.to_css());
                        let _ = gradient.add_color_stop(1.0, &color.with_alpha(0.0).to_css());
                        ctx.set_fill_style_canvas_gradient(&gradient);
                        ctx.fill_rect(0.0, cy - r, w, 2.0 * r);
                    }
                }
            }
        }

        // HUD
        ctx.set_text_align("center");
        ctx.set_fill_style_str("#fff");
        ctx.set_font("bold 48px Arial");
        let _ = ctx.fill_text(&frame.hud.score.to_string(), w / 2.0, 60.0);
        ctx.set_font("16px Arial");
        ctx.set_text_align("left");
        let _ = ctx.fill_text(&format!("BEST {}", frame.hud.high_score), 16.0, 28.0);
        if let Some(coins) = frame.hud.coins {
            ctx.set_text_align("right");
            let _ = ctx.fill_text(&format!("{coins} coins"), w - 16.0, 28.0);
        }
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("{e}; progress will not be saved");
                Box::new(MemoryStore::new())
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Stack Tower starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game-canvas")
            .ok_or("missing #game-canvas")?
            .dyn_into()?;

        let width = window.inner_width()?.as_f64().unwrap_or(400.0);
        let height = window.inner_height()?.as_f64().unwrap_or(700.0);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let config = GameConfig::from_variant(Variant::Deluxe, width as f32, height as f32);
        let seed = js_sys::Date::now() as u64;
        let game = StackTower::new(seed, config, open_store(), AdManager::unavailable());
        let app = Rc::new(RefCell::new(App {
            game,
            ctx,
            last_time: 0.0,
        }));

        setup_input_handlers(&canvas, app.clone());
        request_animation_frame(app);

        log::info!("Stack Tower running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                app.borrow_mut().game.press(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let pos = Vec2::new(
                        touch.client_x() as f32 - rect.left() as f32,
                        touch.client_y() as f32 - rect.top() as f32,
                    );
                    app.borrow_mut().game.press(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut app = app.borrow_mut();
                match event.key().as_str() {
                    " " | "Enter" => app.game.tap(),
                    "r" | "R" => app.game.restart(),
                    "v" | "V" => {
                        app.game.request_revive();
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        web_sys::console::error_1(&e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use stack_tower::ads::AdManager;
    use stack_tower::consts::SIM_DT;
    use stack_tower::persistence::KeyValueStore;
    use stack_tower::platform::storage::FileStore;
    use stack_tower::progression::day_number;
    use stack_tower::sim::{GameEvent, GamePhase};
    use stack_tower::{GameConfig, StackTower};

    /// Give up after ten simulated minutes
    const MAX_TICKS: u32 = 60 * 60 * 10;

    /// Chance per tick that the bot taps without looking
    const SLIP_CHANCE: f64 = 0.002;

    /// Tap when the moving block is close enough to the top block
    fn should_tap<S: KeyValueStore>(game: &StackTower<S>, rng: &mut Pcg32) -> bool {
        let state = game.state();
        match state.phase {
            GamePhase::Start => true,
            GamePhase::GameOver => false,
            GamePhase::Playing => {
                let (Some(current), Some(top)) = (state.tower.current, state.tower.top()) else {
                    return false;
                };
                let aligned = (current.x - top.x).abs() <= state.tower.speed;
                aligned || rng.random_bool(SLIP_CHANCE)
            }
        }
    }

    pub fn run(seed: u64) {
        let store = FileStore::open_default();
        log::info!("Saving progress under {}", store.dir().display());

        let mut game = StackTower::new(seed, GameConfig::default(), store, AdManager::unavailable());
        let today = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| day_number(d.as_millis() as f64))
            .unwrap_or(0);
        match game.claim_daily(today) {
            Ok(coins) => println!("Daily reward: {coins} coins"),
            Err(e) => log::debug!("{e}"),
        }

        let mut bot = Pcg32::seed_from_u64(seed ^ 0x5eed);
        for _ in 0..MAX_TICKS {
            if should_tap(&game, &mut bot) {
                game.tap();
            }
            for event in game.update(SIM_DT) {
                match event {
                    GameEvent::Perfect { streak, .. } if streak >= 5 => {
                        println!("{streak}x combo!");
                    }
                    GameEvent::AchievementUnlocked(id) => {
                        println!("Achievement unlocked: {}", id.title());
                    }
                    GameEvent::GameOver {
                        score,
                        high_score,
                        new_record,
                    } => {
                        let record = if new_record { " (new record!)" } else { "" };
                        println!("Game over: {score} points, best {high_score}{record}");
                    }
                    GameEvent::GameOverUiReady { .. } => {
                        let commands = game.frame().commands.len();
                        let state = game.state();
                        println!(
                            "Tower of {} blocks, max combo {}, {} coins total, {} draw commands in the last frame",
                            state.tower.height(),
                            state.combo.max_streak,
                            state.progress.coins,
                            commands
                        );
                        return;
                    }
                    _ => {}
                }
            }
        }
        log::warn!("Demo stopped after {MAX_TICKS} ticks");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Stack Tower (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        });
    log::info!("Seed {seed}");
    demo::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
