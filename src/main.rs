//! Balancerio entry point
//!
//! Browser: binds the page's DOM to the game core and runs it.
//! Native: plays every bundled level headless through the solver.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::fmt::Write as _;
    use std::rc::Rc;
    use std::sync::Arc;

    use glam::Vec2;
    use wasm_bindgen::closure::WasmClosure;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, DragEvent, Element, HtmlElement, MouseEvent, TouchEvent};

    use balancerio::input::{CellHitbox, DragState};
    use balancerio::settings::Settings;
    use balancerio::sim::{
        GameEvent, Intent, LevelSet, LevelStatus, Phase, Piece, Placement, Session, Shape,
        TemplateKey, TimerAction, cell_totals, classify, indicator_percent, rotation_angle,
        update,
    };
    use balancerio::{beam_percent, beam_positions};

    /// Game instance holding all state
    struct Game {
        session: Session,
        drag: DragState,
        settings: Settings,
        document: Document,
        /// Pending `setTimeout` handle that ends the celebration
        celebration_timer: Option<i32>,
    }

    impl Game {
        fn new(levels: Arc<LevelSet>, settings: Settings, document: Document) -> Self {
            Self {
                session: Session::new(levels),
                drag: DragState::default(),
                settings,
                document,
                celebration_timer: None,
            }
        }

        fn apply(&mut self, intent: &Intent) -> Vec<GameEvent> {
            let transition = update(self.session.clone(), intent);
            self.session = transition.session;
            transition.events
        }

        /// Inventory template for a `data-template` value, with its remaining count
        fn template_named(&self, name: &str) -> Option<(TemplateKey, u32)> {
            self.session
                .level()
                .inventory
                .iter()
                .find(|t| t.key().to_string() == name)
                .map(|t| (t.key(), self.session.remaining(t)))
        }

        /// Drop zones of every cell, in client coordinates
        fn hitboxes(&self) -> Vec<CellHitbox> {
            let mut boxes = Vec::new();
            let Ok(nodes) = self.document.query_selector_all("[data-cell]") else {
                return boxes;
            };
            for i in 0..nodes.length() {
                let Some(el) = nodes.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                    continue;
                };
                let Some(cell) = data_i32(&el, "data-cell") else {
                    continue;
                };
                let r = el.get_bounding_client_rect();
                boxes.push(CellHitbox::from_client_rect(
                    cell,
                    r.left() as f32,
                    r.top() as f32,
                    r.right() as f32,
                    r.bottom() as f32,
                ));
            }
            boxes
        }

        /// Redraw everything from the session
        fn render(&self) {
            let doc = &self.document;
            let session = &self.session;
            let level = session.level();
            let moments = session.moments();
            let class = classify(moments.difference);

            set_text(doc, "level-title", &level.title);
            set_text(doc, "level-description", &level.description);
            set_text(doc, "hint", &level.hint);
            set_hidden(doc, "hint", !session.ui().show_hint);

            // Progress dots
            let mut dots = String::new();
            for i in 0..session.levels().len() {
                let status = match session.level_status(i) {
                    LevelStatus::Completed => "done",
                    LevelStatus::Current => "current",
                    LevelStatus::Upcoming => "upcoming",
                };
                let _ = write!(dots, r#"<div class="dot {status}"></div>"#);
            }
            set_html(doc, "level-dots", &dots);

            // Balance indicator
            set_hidden(doc, "indicator", !self.settings.show_indicator);
            set_text(doc, "moment-left", &moments.left.to_string());
            set_text(doc, "moment-right", &moments.right.to_string());
            if let Some(knob) = html_element(doc, "indicator-knob") {
                let style = knob.style();
                let _ = style.set_property("left", &format!("{}%", indicator_percent(moments.difference)));
                let _ = style.set_property("background", class.color());
                let _ = style.set_property("box-shadow", &format!("0 0 12px {}", class.color()));
            }

            // Beam and cells
            if let Some(beam) = html_element(doc, "beam") {
                let style = beam.style();
                let _ = style.set_property(
                    "transform",
                    &format!("rotate({}deg)", rotation_angle(moments.difference)),
                );
                let _ = style.set_property("transition", self.settings.beam_transition());
                beam.set_inner_html(&self.cells_html());
            }

            // Inventory tray. Rebuilding it mid touch drag would detach the
            // element the finger started on and its later touch events with it.
            if !self.drag.holds_tray() {
                self.render_tray();
            }
            self.render_ghost();

            // Overlays
            let phase = session.phase();
            let solved = matches!(phase, Phase::Solved { .. });
            set_hidden(doc, "solved-overlay", !solved);
            set_text(
                doc,
                "solved-moments",
                &format!("{} = {}", moments.left, moments.right),
            );
            set_class(doc, "solved-overlay", "celebrate", session.ui().celebrating);
            set_hidden(doc, "next-btn", !solved || session.is_last_level());
            set_hidden(doc, "finish-btn", !solved || !session.is_last_level());
            set_hidden(doc, "complete-overlay", phase != Phase::AllComplete);
        }

        fn render_tray(&self) {
            let doc = &self.document;
            let session = &self.session;
            let level = session.level();
            let mut tray = String::new();
            for t in &level.inventory {
                let remaining = session.remaining(t);
                let _ = write!(
                    tray,
                    r#"<div class="tray-item{empty}" draggable="{draggable}" data-template="{key}">{svg}<div class="weight">weight: {weight}</div><div class="count">&times;{remaining}</div></div>"#,
                    empty = if remaining == 0 { " empty" } else { "" },
                    draggable = remaining > 0,
                    key = t.key(),
                    svg = shape_svg(&t.piece, 1.0),
                    weight = t.piece.weight_label(),
                );
            }
            set_html(doc, "inventory", &tray);
        }

        /// Move the touch ghost without touching the rest of the page
        fn render_ghost(&self) {
            let doc = &self.document;
            match (self.drag.ghost_position(), self.drag.payload()) {
                (Some(pos), Some(key)) => {
                    let svg = self
                        .session
                        .level()
                        .template(key)
                        .map(|t| shape_svg(&t.piece, self.settings.touch_ghost_scale))
                        .unwrap_or_default();
                    set_html(doc, "touch-ghost", &svg);
                    set_hidden(doc, "touch-ghost", false);
                    if let Some(ghost) = html_element(doc, "touch-ghost") {
                        let style = ghost.style();
                        let _ = style.set_property("left", &format!("{}px", pos.x));
                        let _ = style.set_property("top", &format!("{}px", pos.y));
                    }
                }
                _ => set_hidden(doc, "touch-ghost", true),
            }
        }

        fn cells_html(&self) -> String {
            let level = self.session.level();
            let board = self.session.board();
            let mut html = String::new();

            for pos in beam_positions() {
                let pct = beam_percent(pos);
                if pos == 0 {
                    let _ = write!(html, r#"<div class="pivot" style="left:{pct}%"></div>"#);
                    continue;
                }
                let zone = if level.is_available(pos) {
                    "available"
                } else {
                    "blocked"
                };
                let _ = write!(
                    html,
                    r#"<div class="cell" data-cell="{pos}" style="left:{pct}%"><div class="distance">{}</div><div class="drop-zone {zone}">"#,
                    pos.abs()
                );
                for (i, placement) in board.cell(pos).iter().enumerate() {
                    let (kind, title) = match placement {
                        Placement::Fixed(_) => ("fixed", ""),
                        Placement::Player { .. } => ("player", "Click to remove"),
                    };
                    let _ = write!(
                        html,
                        r#"<div class="piece {kind}" data-index="{i}" title="{title}">{}</div>"#,
                        shape_svg(placement.piece(), 0.7)
                    );
                }
                if self.settings.show_moment_labels {
                    if let Some(t) = cell_totals(board, pos) {
                        let _ = write!(
                            html,
                            r#"<div class="cell-moment">{}&times;{}={}</div>"#,
                            t.weight, t.distance, t.moment
                        );
                    }
                }
                html.push_str("</div></div>");
            }
            html
        }
    }

    /// Inline SVG for a piece
    fn shape_svg(piece: &Piece, scale: f32) -> String {
        let s = piece.size.base_px() * scale;
        let color = &piece.color;
        let body = match piece.shape {
            Shape::Circle => format!(
                r#"<circle cx="20" cy="20" r="16" fill="{color}" stroke="rgba(255,255,255,0.2)" stroke-width="2"/><ellipse cx="20" cy="16" rx="8" ry="4" fill="rgba(255,255,255,0.15)"/>"#
            ),
            Shape::Square => {
                let mark = if piece.unknown {
                    r#"<text x="20" y="25" text-anchor="middle" fill="rgba(255,255,255,0.6)" font-size="16" font-weight="bold">?</text>"#
                } else {
                    r#"<rect x="8" y="8" width="12" height="6" rx="2" fill="rgba(255,255,255,0.12)"/>"#
                };
                format!(
                    r#"<rect x="4" y="4" width="32" height="32" rx="4" fill="{color}" stroke="rgba(255,255,255,0.2)" stroke-width="2"/>{mark}"#
                )
            }
            Shape::Triangle => format!(
                r#"<polygon points="20,4 36,36 4,36" fill="{color}" stroke="rgba(255,255,255,0.2)" stroke-width="2"/>"#
            ),
        };
        format!(r#"<svg width="{s}" height="{s}" viewBox="0 0 40 40">{body}</svg>"#)
    }

    fn set_text(doc: &Document, id: &str, text: &str) {
        if let Some(el) = doc.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_html(doc: &Document, id: &str, html: &str) {
        if let Some(el) = doc.get_element_by_id(id) {
            el.set_inner_html(html);
        }
    }

    fn set_class(doc: &Document, id: &str, class: &str, on: bool) {
        if let Some(el) = doc.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force(class, on);
        }
    }

    fn set_hidden(doc: &Document, id: &str, hidden: bool) {
        set_class(doc, id, "hidden", hidden);
    }

    fn html_element(doc: &Document, id: &str) -> Option<HtmlElement> {
        doc.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok()
    }

    fn data_i32(el: &Element, attr: &str) -> Option<i32> {
        el.get_attribute(attr)?.parse().ok()
    }

    /// Nearest ancestor (or self) of the event target matching `selector`
    fn target_closest(event: &web_sys::Event, selector: &str) -> Option<Element> {
        let target: Element = event.target()?.dyn_into().ok()?;
        target.closest(selector).ok().flatten()
    }

    /// Apply an intent, redraw, and keep the celebration timer in step with the level
    fn dispatch(game: &Rc<RefCell<Game>>, intent: Intent) {
        let (action, celebration_ms) = {
            let mut g = game.borrow_mut();
            let events = g.apply(&intent);
            g.render();
            (TimerAction::after(&events), g.settings.effective_celebration_ms())
        };

        match action {
            TimerAction::Keep => {}
            TimerAction::Cancel => cancel_celebration_end(game),
            TimerAction::Restart => {
                cancel_celebration_end(game);
                let handle = schedule_celebration_end(game.clone(), celebration_ms);
                game.borrow_mut().celebration_timer = handle;
            }
        }
    }

    fn cancel_celebration_end(game: &Rc<RefCell<Game>>) {
        let handle = game.borrow_mut().celebration_timer.take();
        if let (Some(handle), Some(window)) = (handle, web_sys::window()) {
            window.clear_timeout_with_handle(handle);
        }
    }

    fn schedule_celebration_end(game: Rc<RefCell<Game>>, ms: u32) -> Option<i32> {
        let window = web_sys::window()?;
        let closure = Closure::once(move || {
            game.borrow_mut().celebration_timer = None;
            dispatch(&game, Intent::CelebrationElapsed);
        });
        let handle = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                ms as i32,
            )
            .ok();
        closure.forget();
        handle
    }

    fn listen<T>(el: &Element, event: &str, closure: Closure<T>)
    where
        T: ?Sized + WasmClosure,
    {
        let _ = el.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Balancerio starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let levels = match LevelSet::bundled() {
            Ok(levels) => Arc::new(levels),
            Err(e) => {
                log::error!("Bundled levels are invalid: {}", e);
                return;
            }
        };
        log::info!("Loaded {} levels", levels.len());

        let settings = Settings::load();
        let game = Rc::new(RefCell::new(Game::new(levels, settings, document.clone())));
        game.borrow().render();

        // Listeners go in only after the session exists
        setup_board_handlers(&document, game.clone());
        setup_tray_handlers(&document, game.clone());
        setup_buttons(&document, game.clone());

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        log::info!("Balancerio running!");
    }

    fn setup_board_handlers(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(beam) = document.get_element_by_id("beam") else {
            log::error!("#beam missing from page");
            return;
        };

        // Allow dropping on cells
        let closure = Closure::<dyn FnMut(_)>::new(|event: DragEvent| {
            if target_closest(&event, "[data-cell]").is_some() {
                event.prevent_default();
                if let Some(dt) = event.data_transfer() {
                    dt.set_drop_effect("move");
                }
            }
        });
        listen(&beam, "dragover", closure);

        // Drop
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: DragEvent| {
                event.prevent_default();
                let cell = target_closest(&event, "[data-cell]").and_then(|el| data_i32(&el, "data-cell"));
                let intent = match cell {
                    Some(cell) => game.borrow_mut().drag.drop_on(cell),
                    None => None,
                };
                if let Some(intent) = intent {
                    dispatch(&game, intent);
                }
            });
            listen(&beam, "drop", closure);
        }

        // Click a player piece to take it back
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(piece) = target_closest(&event, "[data-index]") else {
                return;
            };
            let index = piece
                .get_attribute("data-index")
                .and_then(|s| s.parse::<usize>().ok());
            let cell = piece
                .closest("[data-cell]")
                .ok()
                .flatten()
                .and_then(|el| data_i32(&el, "data-cell"));
            if let (Some(cell), Some(index)) = (cell, index) {
                dispatch(&game, Intent::Remove { cell, index });
            }
        });
        listen(&beam, "click", closure);
    }

    fn setup_tray_handlers(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(tray) = document.get_element_by_id("inventory") else {
            log::error!("#inventory missing from page");
            return;
        };

        // Mouse drag start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: DragEvent| {
                let Some(item) = target_closest(&event, "[data-template]") else {
                    return;
                };
                let name = item.get_attribute("data-template").unwrap_or_default();
                let mut g = game.borrow_mut();
                let started = match g.template_named(&name) {
                    Some((key, remaining)) => g.drag.begin_pointer(key, remaining),
                    None => false,
                };
                if started {
                    if let Some(dt) = event.data_transfer() {
                        dt.set_effect_allowed("move");
                        let _ = dt.set_data("text/plain", &name);
                    }
                } else {
                    event.prevent_default();
                }
            });
            listen(&tray, "dragstart", closure);
        }

        // Drag abandoned outside the board
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: DragEvent| {
                game.borrow_mut().drag.cancel();
            });
            listen(&tray, "dragend", closure);
        }

        // Touch drag start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let Some(item) = target_closest(&event, "[data-template]") else {
                    return;
                };
                let Some(touch) = event.touches().get(0) else {
                    return;
                };
                let name = item.get_attribute("data-template").unwrap_or_default();
                let pos = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
                let mut g = game.borrow_mut();
                let started = match g.template_named(&name) {
                    Some((key, remaining)) => g.drag.begin_touch(key, pos, remaining),
                    None => false,
                };
                if started {
                    g.render_ghost();
                }
            });
            listen(&tray, "touchstart", closure);
        }

        // Touch move / end are tracked on the whole app so the finger can leave the tray
        let Some(app) = document.get_element_by_id("app") else {
            log::error!("#app missing from page");
            return;
        };
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let Some(touch) = event.touches().get(0) else {
                    return;
                };
                let pos = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
                let mut g = game.borrow_mut();
                if g.drag.touch_move(pos) {
                    event.prevent_default();
                    g.render_ghost();
                }
            });
            listen(&app, "touchmove", closure);
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                let mut g = game.borrow_mut();
                if g.drag.ghost_position().is_some() {
                    g.drag.cancel();
                    g.render();
                }
            });
            listen(&app, "touchcancel", closure);
        }
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
            let intent = {
                let mut g = game.borrow_mut();
                if !g.drag.is_active() {
                    return;
                }
                let hitboxes = g.hitboxes();
                let intent = g.drag.touch_end(&hitboxes);
                g.render();
                intent
            };
            if let Some(intent) = intent {
                dispatch(&game, intent);
            }
        });
        listen(&app, "touchend", closure);
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let buttons = [
            ("hint-btn", Intent::ToggleHint),
            ("reset-btn", Intent::Reset),
            ("next-btn", Intent::NextLevel),
            ("finish-btn", Intent::Finish),
            ("restart-btn", Intent::Restart),
        ];
        for (id, intent) in buttons {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("#{} missing from page", id);
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                dispatch(&game, intent.clone());
            });
            listen(&btn, "click", closure);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Balancerio (native) starting...");
    log::info!("The playable game is the web build - run with `trunk serve`");

    if let Err(e) = play_headless() {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Solve every level in order through the real session, like a player would
#[cfg(not(target_arch = "wasm32"))]
fn play_headless() -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::Arc;

    use balancerio::Settings;
    use balancerio::sim::{Intent, LevelSet, Phase, Session, solve, update};

    let settings = Settings::load();
    log::debug!("Settings: {:?}", settings);

    let levels = Arc::new(LevelSet::bundled()?);
    let mut session = Session::new(Arc::clone(&levels));

    loop {
        let level = session.level().clone();
        let solution = solve(&level)
            .ok_or_else(|| format!("'{}' has no solution within the search bound", level.title))?;

        for intent in solution.intents() {
            session = update(session, &intent).session;
        }
        let moments = session.moments();
        if !session.is_solved() {
            return Err(format!("replaying the solution did not solve '{}'", level.title).into());
        }

        let moves: Vec<String> = solution
            .placements
            .iter()
            .map(|(cell, key)| format!("{} @ {}", key, cell))
            .collect();
        println!(
            "✓ {}: {} -> {} = {}",
            level.title,
            moves.join(", "),
            moments.left,
            moments.right
        );

        let next = if session.is_last_level() {
            Intent::Finish
        } else {
            Intent::NextLevel
        };
        session = update(session, &next).session;
        if session.phase() == Phase::AllComplete {
            break;
        }
    }

    println!("All {} levels balanced!", levels.len());
    Ok(())
}
