//! Quiz Shooter entry point
//!
//! In the browser this wires the DOM, keyboard and canvas to [`App`] and runs
//! the fixed-step frame loop. Natively it plays a headless autopilot session
//! and logs the outcome.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlInputElement};

    use quiz_shooter::audio::AudioManager;
    use quiz_shooter::consts::*;
    use quiz_shooter::{App, Gender, GamePhase, HighScores, SessionConfig, Settings, Snapshot};

    /// Browser-side game instance
    struct Game {
        app: App,
        audio: AudioManager,
        ctx: CanvasRenderingContext2d,
        accumulator: f64,
        last_time: f64,
        /// Phase shown by the DOM on the previous frame
        last_phase: GamePhase,
        /// Gender picked on the home screen
        gender: Option<Gender>,
    }

    impl Game {
        fn new(seed: u64, ctx: CanvasRenderingContext2d) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_muted(!settings.sound_enabled);
            let gender = settings.gender;
            Self {
                app: App::new(seed, settings, HighScores::load()),
                audio,
                ctx,
                accumulator: 0.0,
                last_time: 0.0,
                last_phase: GamePhase::Home,
                gender,
            }
        }

        /// Run fixed simulation steps for `dt_ms` of wall time
        fn update(&mut self, dt_ms: f64) {
            // Long stalls (background tab) are not replayed
            self.accumulator += dt_ms.min(250.0);

            let mut substeps = 0;
            while self.accumulator >= FRAME_MS && substeps < MAX_SUBSTEPS {
                let events = self.app.frame(FRAME_MS);
                self.audio.play_events(&self.app.audible(&events));
                self.accumulator -= FRAME_MS;
                substeps += 1;
            }

            self.audio.set_music(self.app.music_track());
            self.audio.update_music();
        }

        /// Draw the playfield as flat rectangles
        fn render(&self, snapshot: &Snapshot) {
            let ctx = &self.ctx;
            ctx.clear_rect(0.0, 0.0, snapshot.width as f64, snapshot.height as f64);
            if snapshot.phase == GamePhase::Home {
                return;
            }

            if let Some(player) = &snapshot.player {
                ctx.set_fill_style_str("#4ade80");
                ctx.fill_rect(
                    player.x as f64,
                    player.y as f64,
                    player.width as f64,
                    player.height as f64,
                );
            }

            ctx.set_fill_style_str("#facc15");
            for bullet in &snapshot.bullets {
                ctx.fill_rect(
                    bullet.x as f64,
                    bullet.y as f64,
                    bullet.width as f64,
                    bullet.height as f64,
                );
            }

            for enemy in &snapshot.enemies {
                ctx.set_fill_style_str(if enemy.diving { "#f97316" } else { "#ef4444" });
                let r = &enemy.rect;
                ctx.fill_rect(r.x as f64, r.y as f64, r.width as f64, r.height as f64);
            }
        }

        /// Update HUD text and screen visibility
        fn update_hud(&mut self, game: &Rc<RefCell<Game>>, snapshot: &Snapshot) {
            let Some(document) = document() else { return };

            set_text(&document, "score", &format!("Score: {}", snapshot.score));
            set_text(
                &document,
                "dangerLevel",
                &format!("DANGER LEVEL: {}", snapshot.danger_level),
            );
            set_text(&document, "lives", &"❤️".repeat(snapshot.lives as usize));

            if snapshot.phase == self.last_phase {
                return;
            }

            let phase = snapshot.phase;
            set_hidden(&document, "homeScreen", phase != GamePhase::Home);
            set_hidden(
                &document,
                "gameUi",
                !matches!(
                    phase,
                    GamePhase::Playing | GamePhase::Paused | GamePhase::Question
                ),
            );
            set_hidden(&document, "pauseModal", phase != GamePhase::Paused);
            set_hidden(&document, "gameOverModal", phase != GamePhase::GameOver);
            set_hidden(&document, "codingQuestionModal", phase != GamePhase::Question);

            match phase {
                GamePhase::Question => show_question(&document, game, snapshot),
                GamePhase::GameOver => {
                    set_text(&document, "finalScore", &snapshot.score.to_string());
                }
                GamePhase::Home => {
                    let best = snapshot.high_score.unwrap_or(0);
                    set_text(&document, "highScoreDisplay", &format!("High Score: {}", best));
                }
                _ => {}
            }

            self.last_phase = phase;
        }

        /// Read the home screen inputs into a session config
        fn home_config(&self, document: &Document) -> SessionConfig {
            let name = input_value(document, "playerName").unwrap_or_default();
            let sensitivity = input_value(document, "sensitivity")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.app.settings().sensitivity);
            SessionConfig {
                name,
                gender: self.gender,
                sensitivity,
                ..Default::default()
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn input_value(document: &Document, id: &str) -> Option<String> {
        let input: HtmlInputElement = document.get_element_by_id(id)?.dyn_into().ok()?;
        Some(input.value())
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("Missing #{}", id);
            return;
        };
        listen(&el, "click", move |_event: web_sys::Event| handler());
    }

    fn listen<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
        target: &web_sys::EventTarget,
        event: &str,
        handler: impl FnMut(E) + 'static,
    ) {
        let closure = Closure::<dyn FnMut(E)>::new(handler);
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Fill the question modal with the current question and answer buttons
    fn show_question(document: &Document, game: &Rc<RefCell<Game>>, snapshot: &Snapshot) {
        let Some(active) = &snapshot.question else { return };
        set_text(document, "questionText", &active.question.text);
        set_text(document, "feedbackText", "");
        if let Some(feedback) = document.get_element_by_id("feedbackText") {
            feedback.set_class_name("");
        }

        let Some(container) = document.get_element_by_id("optionsContainer") else {
            return;
        };
        container.set_inner_html("");

        for option in &active.question.options {
            let Ok(button) = document.create_element("button") else {
                continue;
            };
            button.set_text_content(Some(option));

            let game = game.clone();
            let option = option.clone();
            let answer = active.question.answer.clone();
            listen(&button, "click", move |_event: web_sys::MouseEvent| {
                let verdict = game.borrow_mut().app.answer(&option);
                if let (Some(correct), Some(document)) = (verdict, document()) {
                    show_verdict(&document, correct, &answer);
                }
            });
            let _ = container.append_child(&button);
        }
    }

    fn show_verdict(document: &Document, correct: bool, answer: &str) {
        if let Some(container) = document.get_element_by_id("optionsContainer") {
            let buttons = container.children();
            for i in 0..buttons.length() {
                if let Some(button) = buttons.item(i) {
                    let _ = button.set_attribute("disabled", "");
                }
            }
        }
        if let Some(feedback) = document.get_element_by_id("feedbackText") {
            if correct {
                feedback.set_text_content(Some(&format!("Correct! +{} points!", ANSWER_BONUS)));
                feedback.set_class_name("correct");
            } else {
                feedback.set_text_content(Some(&format!("Wrong! The answer was: {}", answer)));
                feedback.set_class_name("wrong");
            }
        }
    }

    /// Enable the start button once a name and gender are given
    fn refresh_start_button(document: &Document, game: &Game) {
        let Some(btn) = document.get_element_by_id("startGameBtn") else {
            return;
        };
        if game.home_config(document).validate().is_ok() {
            let _ = btn.remove_attribute("disabled");
        } else {
            let _ = btn.set_attribute("disabled", "");
        }
    }

    fn select_gender(document: &Document, game: &Rc<RefCell<Game>>, gender: Gender) {
        let mut g = game.borrow_mut();
        g.gender = Some(gender);
        for (id, value) in [("maleBtn", Gender::Male), ("femaleBtn", Gender::Female)] {
            if let Some(el) = document.get_element_by_id(id) {
                let _ = el.class_list().toggle_with_force("selected", value == gender);
            }
        }
        refresh_start_button(document, &g);
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Quiz Shooter starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        canvas.set_width(PLAYFIELD_WIDTH as u32);
        canvas.set_height(PLAYFIELD_HEIGHT as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, ctx)));
        log::info!("Game initialized with seed: {}", seed);

        restore_home_screen(&document, &game.borrow());
        setup_home_screen(&document, game.clone());
        setup_game_buttons(&document, game.clone());
        setup_keyboard(&window, game.clone());

        request_animation_frame(game);

        log::info!("Quiz Shooter running!");
        Ok(())
    }

    /// Pre-fill the home screen from stored settings
    fn restore_home_screen(document: &Document, game: &Game) {
        let settings = game.app.settings();
        if let Some(input) = document
            .get_element_by_id("playerName")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(&settings.player_name);
        }
        if let Some(input) = document
            .get_element_by_id("sensitivity")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(&settings.sensitivity.to_string());
        }
        if let Some(gender) = game.gender {
            let id = match gender {
                Gender::Male => "maleBtn",
                Gender::Female => "femaleBtn",
            };
            if let Some(el) = document.get_element_by_id(id) {
                let _ = el.class_list().add_1("selected");
            }
        }
        set_text(document, "musicName", settings.music_name());
        set_text(document, "soundToggleBtn", sound_label(settings.sound_enabled));
        let best = game.app.high_scores().top_score().unwrap_or(0);
        set_text(document, "highScoreDisplay", &format!("High Score: {}", best));
        refresh_start_button(document, game);
    }

    fn sound_label(enabled: bool) -> &'static str {
        if enabled { "Sound: ON" } else { "Sound: OFF" }
    }

    fn setup_home_screen(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let doc = document.clone();
            on_click(document, "maleBtn", move || select_gender(&doc, &game, Gender::Male));
        }
        {
            let game = game.clone();
            let doc = document.clone();
            on_click(document, "femaleBtn", move || {
                select_gender(&doc, &game, Gender::Female)
            });
        }
        if let Some(input) = document.get_element_by_id("playerName") {
            let game = game.clone();
            let doc = document.clone();
            listen(&input, "input", move |_event: web_sys::Event| {
                refresh_start_button(&doc, &game.borrow());
            });
        }
        {
            let game = game.clone();
            let doc = document.clone();
            on_click(document, "startGameBtn", move || {
                let mut g = game.borrow_mut();
                let config = g.home_config(&doc);
                match g.app.start(&config) {
                    Ok(true) => g.accumulator = 0.0,
                    Ok(false) => {}
                    Err(e) => log::warn!("Cannot start: {}", e),
                }
            });
        }
        {
            let game = game.clone();
            let doc = document.clone();
            on_click(document, "soundToggleBtn", move || {
                let mut g = game.borrow_mut();
                let enabled = g.app.toggle_sound();
                g.audio.set_muted(!enabled);
                set_text(&doc, "soundToggleBtn", sound_label(enabled));
            });
        }
        for (id, direction) in [("prevMusicBtn", -1), ("nextMusicBtn", 1)] {
            let game = game.clone();
            let doc = document.clone();
            on_click(document, id, move || {
                let name = game.borrow_mut().app.cycle_music(direction);
                set_text(&doc, "musicName", name);
            });
        }
    }

    fn setup_game_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click(document, "pauseBtn", move || {
                game.borrow_mut().app.toggle_pause();
            });
        }
        {
            let game = game.clone();
            on_click(document, "quitBtn", move || game.borrow_mut().app.quit());
        }
        on_click(document, "restartBtn", move || game.borrow_mut().app.confirm());
    }

    fn setup_keyboard(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            listen(window, "keydown", move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                // Keep arrows and space from scrolling the page mid-game
                if g.app.phase() == GamePhase::Playing
                    && matches!(
                        key.as_str(),
                        " " | "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight"
                    )
                {
                    event.prevent_default();
                }
                let events = g.app.key_down(&key);
                g.audio.play_events(&g.app.audible(&events));
            });
        }
        listen(window, "keyup", move |event: web_sys::KeyboardEvent| {
            game.borrow_mut().app.key_up(&event.key());
        });
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt_ms = if g.last_time > 0.0 {
                time - g.last_time
            } else {
                FRAME_MS
            };
            g.last_time = time;

            g.update(dt_ms);
            let snapshot = g.app.snapshot();
            g.render(&snapshot);
            g.update_hud(&game, &snapshot);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    log::info!("Quiz Shooter (native) starting headless autopilot, seed {}", seed);
    log::info!("Run with `trunk serve` for the playable web version");

    let summary = autopilot::run(seed, 60 * 60 * 10);
    println!(
        "Autopilot finished after {} frames: score {}, danger level {}, lives {}, questions {}/{} correct",
        summary.frames,
        summary.score,
        summary.danger_level,
        summary.lives,
        summary.correct_answers,
        summary.questions,
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless play through the same input surface the browser uses
#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use quiz_shooter::consts::*;
    use quiz_shooter::sim::GameEvent;
    use quiz_shooter::{App, GamePhase, Gender, HighScores, SessionConfig, Settings};

    pub struct Summary {
        pub frames: u32,
        pub score: u64,
        pub danger_level: u32,
        pub lives: u8,
        pub questions: u32,
        pub correct_answers: u32,
    }

    pub fn run(seed: u64, max_frames: u32) -> Summary {
        let mut app = App::new(seed, Settings::default(), HighScores::new());
        let config = SessionConfig::new("Autopilot", Gender::Female, 5);
        match app.start(&config) {
            Ok(true) => {}
            Ok(false) => log::warn!("Autopilot session did not start"),
            Err(e) => log::error!("Autopilot config rejected: {}", e),
        }

        let mut summary = Summary {
            frames: 0,
            score: 0,
            danger_level: 1,
            lives: INITIAL_LIVES,
            questions: 0,
            correct_answers: 0,
        };
        let mut steering = "";

        while summary.frames < max_frames {
            summary.frames += 1;
            match app.phase() {
                GamePhase::Playing => steering = steer(&mut app, steering, summary.frames),
                GamePhase::Question => {
                    let answer = app
                        .question()
                        .filter(|q| q.verdict.is_none())
                        .map(|q| q.question.answer.clone());
                    if let Some(answer) = answer {
                        summary.questions += 1;
                        // Miss every third question so both outcomes show up in logs
                        let pick = if summary.questions % 3 == 0 { "?" } else { &answer };
                        if app.answer(pick) == Some(true) {
                            summary.correct_answers += 1;
                        }
                    }
                }
                _ => break,
            }

            let events = app.frame(FRAME_MS);
            for event in &events {
                match event {
                    GameEvent::LifeLost { lives } => log::info!("Life lost, {} left", lives),
                    GameEvent::SessionEnded { score } => log::info!("Session ended at {}", score),
                    _ => {}
                }
            }
            if let Some(session) = app.session() {
                summary.score = session.score;
                summary.danger_level = session.danger_level;
                summary.lives = session.lives;
            }
        }

        if let Some(best) = app.high_scores().top_score() {
            log::info!("Best score this run: {}", best);
        }
        summary
    }

    /// Chase the lowest enemy's column and fire on a cadence
    fn steer(app: &mut App, current: &'static str, frame: u32) -> &'static str {
        let Some(session) = app.session() else {
            return current;
        };
        let player_center = session.player.pos.x + PLAYER_SIZE / 2.0;
        let target = session
            .enemies
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|e| e.pos.x + ENEMY_SIZE / 2.0);

        let wanted = match target {
            Some(x) if x < player_center - 8.0 => "ArrowLeft",
            Some(x) if x > player_center + 8.0 => "ArrowRight",
            _ => "",
        };
        if wanted != current {
            if !current.is_empty() {
                app.key_up(current);
            }
            if !wanted.is_empty() {
                app.key_down(wanted);
            }
        }
        if frame % 12 == 0 {
            app.key_down(" ");
        }
        wanted
    }
}
