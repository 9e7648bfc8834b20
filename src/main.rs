mod actions;
mod click;
mod clock;
mod console;
mod economy;
mod logic;
mod presenter;
mod render;
mod save;
mod scheduler;
mod session;
mod state;
mod storage;

use std::{cell::RefCell, io, rc::Rc};

use actions::Intent;
use click::ClickMap;
use clock::BrowserClock;
use economy::EconomyConfig;
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use render::{Screen, ScreenPresenter};
use save::Persistence;
use session::Session;

/// Query the grid container's bounding rect and resolve a tap to the intent
/// drawn under it.
fn dom_tap_intent(mouse_x: u32, mouse_y: u32, cs: &ClickMap) -> Option<Intent> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_y = mouse_y as f64 - rect.top();
    let click_x = mouse_x as f64 - rect.left();

    if click_x < 0.0 {
        return None;
    }

    cs.intent_at_pixel(click_y, rect.height())
}

/// Route one intent to the notice modal or the session.
///
/// While a notice is open any input closes it; the input is not replayed.
fn handle_intent(intent: Intent, screen: &RefCell<Screen>, session: &RefCell<Session>) {
    if screen.borrow().has_notice() {
        screen.borrow_mut().dismiss_notice();
        return;
    }
    session.borrow_mut().dispatch(intent);
}

/// A key with no binding still closes an open notice.
fn handle_key(key: char, screen: &RefCell<Screen>, session: &RefCell<Session>) {
    match Intent::from_key(key) {
        Some(intent) => handle_intent(intent, screen, session),
        None => screen.borrow_mut().dismiss_notice(),
    }
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let screen = Rc::new(RefCell::new(Screen::new()));
    let session = Rc::new(RefCell::new(Session::start(
        EconomyConfig::default(),
        Persistence::new(storage::open_default()),
        Box::new(ScreenPresenter::new(screen.clone())),
        Box::new(BrowserClock),
    )));
    let click_state = Rc::new(RefCell::new(ClickMap::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let screen = screen.clone();
        let session = session.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            if !cs.is_ready() {
                return;
            }
            let tapped = dom_tap_intent(mouse_event.x, mouse_event.y, &cs);
            drop(cs);

            if let Some(intent) = tapped {
                handle_intent(intent, &screen, &session);
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let screen = screen.clone();
        let session = session.clone();
        move |key_event| match key_event.code {
            KeyCode::Esc | KeyCode::Enter => screen.borrow_mut().dismiss_notice(),
            KeyCode::Char(c) => handle_key(c, &screen, &session),
            _ => {}
        }
    });

    terminal.draw_web(move |f| {
        // Timers run on the frame loop; anything due fires before drawing.
        session.borrow_mut().advance();

        let size = f.area();
        let mut cs = click_state.borrow_mut();
        cs.reset(size);

        render::render(&screen.borrow(), f, size, &mut cs);
    });

    Ok(())
}
