use anyhow::{Context, Result};
use chromaspan_core::{MenuView, ReadingView};
use chromaspan_render::render::reading_columns;
use chromaspan_render::{FrameStats, Renderer, SkiaRenderer};
use chromaspan_session::{ConfigFile, GameKind, ReadingMode, Sequencer, SessionEvent, Step};
use chromaspan_timing::SystemClock;
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::input::{KeyAction, digit_entry, key_action};

type Session = Sequencer<SystemClock, ThreadRng>;

const MENU_TITLE: &str = "Chromaspan";
const INITIAL_SIZE: (u32, u32) = (1024, 768);

/// What the window shows first.
#[derive(Debug, Clone)]
pub enum Launch {
    Menu,
    Game(GameKind),
    Reading { mode: ReadingMode, text: String },
}

struct Reading {
    mode: ReadingMode,
    text: String,
    view: ReadingView,
}

impl Reading {
    fn new(mode: ReadingMode, text: String, width: u32) -> Self {
        let view = mode.transform(&text, reading_columns(width));
        Self { mode, text, view }
    }

    /// Re-wraps for a new width, keeping the scroll position in range.
    fn rewrap(&mut self, width: u32) {
        let scroll = self.view.scroll;
        self.view = self.mode.transform(&self.text, reading_columns(width));
        self.view.scroll = scroll.min(self.view.lines.len().saturating_sub(1));
    }

    fn scroll_by(&mut self, lines: isize) {
        let last = self.view.lines.len().saturating_sub(1);
        self.view.scroll = self.view.scroll.saturating_add_signed(lines).min(last);
    }
}

enum Screen {
    Menu { selected: usize },
    Session(Box<Session>),
    Reading(Reading),
}

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    font: Vec<u8>,
    config: ConfigFile,
    clock: SystemClock,
    screen: Screen,
    pending: Option<Launch>,
    cursor: Option<PhysicalPosition<f64>>,
    current_size: Option<PhysicalSize<u32>>,
    scale_factor: f64,
    should_exit: bool,
}

impl App {
    pub fn new(config: ConfigFile, font: Vec<u8>, launch: Launch) -> Result<Self> {
        Ok(Self {
            window: None,
            pixels: None,
            renderer: None,
            font,
            config,
            clock: SystemClock::new(),
            screen: Screen::Menu { selected: 0 },
            pending: Some(launch),
            cursor: None,
            current_size: None,
            scale_factor: 1.0,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "starting chromaspan"
        );
        event_loop.set_control_flow(ControlFlow::Wait);
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Chromaspan")
            .with_inner_size(PhysicalSize::new(INITIAL_SIZE.0, INITIAL_SIZE.1))
            .with_resizable(true);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        self.scale_factor = window.scale_factor();
        self.current_size = Some(physical_size);

        if let Some(monitor) = window.current_monitor() {
            let refresh_hz = monitor
                .refresh_rate_millihertz()
                .map(|rate| rate as f64 / 1000.0);
            info!(
                width = physical_size.width,
                height = physical_size.height,
                scale = self.scale_factor,
                refresh_hz,
                "display configured"
            );
        }

        let (width, height) = (physical_size.width.max(1), physical_size.height.max(1));
        let surface_texture = SurfaceTexture::new(width, height, window.clone());
        self.pixels = Some(Pixels::new(width, height, surface_texture)?);
        self.renderer = Some(
            SkiaRenderer::from_font_bytes(width, height, std::mem::take(&mut self.font))
                .context("failed to create renderer")?,
        );

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn width(&self) -> u32 {
        self.current_size.map_or(INITIAL_SIZE.0, |s| s.width)
    }

    fn launch(&mut self, launch: Launch) {
        self.screen = match launch {
            Launch::Menu => Screen::Menu { selected: 0 },
            Launch::Game(kind) => {
                let config = self.config.config_for(kind);
                info!(game = %kind, ?config, "opening game");
                Screen::Session(Box::new(Sequencer::for_kind(
                    kind,
                    config,
                    self.clock.clone(),
                    rand::rng(),
                )))
            }
            Launch::Reading { mode, text } => {
                info!(title = %mode.title(), "opening reading page");
                Screen::Reading(Reading::new(mode, text, self.width()))
            }
        };
        self.request_redraw();
    }

    fn back_to_menu(&mut self) {
        let selected = match &self.screen {
            Screen::Session(session) => GameKind::ALL
                .iter()
                .position(|k| *k == session.kind())
                .unwrap_or(0),
            _ => 0,
        };
        // Dropping the session cancels its pending transition.
        self.screen = Screen::Menu { selected };
        self.request_redraw();
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn menu_view(selected: usize) -> MenuView {
        MenuView {
            title: MENU_TITLE,
            entries: GameKind::ALL.iter().map(|k| k.name().to_string()).collect(),
            selected,
        }
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };
        let frame = pixels.frame_mut();
        let stats: FrameStats = match &self.screen {
            Screen::Menu { selected } => renderer.render_menu(&Self::menu_view(*selected), frame)?,
            Screen::Session(session) => renderer.render_session(&session.view(), frame)?,
            Screen::Reading(reading) => renderer.render_reading(&reading.view, frame)?,
        };
        pixels.render()?;

        debug!(
            draw_ms = stats.draw.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            total_ms = stats.total.as_secs_f64() * 1e3,
            "frame"
        );
        Ok(())
    }

    /// Fires due transitions and reports whether anything changed.
    fn update(&mut self) -> bool {
        let Screen::Session(session) = &mut self.screen else {
            return false;
        };
        let events = session.tick();
        log_events(&events);
        !events.is_empty()
    }

    fn handle_key(&mut self, action: KeyAction, event_loop: &ActiveEventLoop) {
        match &mut self.screen {
            Screen::Menu { selected } => {
                let count = GameKind::ALL.len();
                match action {
                    KeyAction::Up => *selected = (*selected + count - 1) % count,
                    KeyAction::Down => *selected = (*selected + 1) % count,
                    KeyAction::Digit(d) => {
                        if let Some(i) = digit_entry(d, count) {
                            *selected = i;
                        }
                    }
                    KeyAction::Confirm | KeyAction::Space => {
                        let kind = GameKind::ALL[*selected];
                        self.launch(Launch::Game(kind));
                        return;
                    }
                    KeyAction::Back => {
                        self.cleanup_and_exit(event_loop);
                        return;
                    }
                    _ => return,
                }
            }
            Screen::Session(session) => match action {
                KeyAction::Space => {
                    let events = if session.phase().can_start() {
                        session.start()
                    } else {
                        session.press_match()
                    };
                    log_events(&events);
                }
                KeyAction::Up => {
                    session.adjust(Step::Up);
                }
                KeyAction::Down => {
                    session.adjust(Step::Down);
                }
                KeyAction::Restart => session.restart(),
                KeyAction::Back => {
                    self.back_to_menu();
                    return;
                }
                _ => return,
            },
            Screen::Reading(reading) => match action {
                KeyAction::Up => reading.scroll_by(-1),
                KeyAction::Down => reading.scroll_by(1),
                KeyAction::PageUp => reading.scroll_by(-20),
                KeyAction::PageDown | KeyAction::Space => reading.scroll_by(20),
                KeyAction::Back => {
                    self.back_to_menu();
                    return;
                }
                _ => return,
            },
        }
        self.request_redraw();
    }

    fn handle_click(&mut self) {
        let (Some(pos), Some(renderer)) = (self.cursor, self.renderer.as_ref()) else {
            return;
        };
        let (x, y) = (pos.x as f32, pos.y as f32);
        match &mut self.screen {
            Screen::Menu { selected } => {
                if let Some(i) = renderer.hit_menu(x, y) {
                    *selected = i;
                    let kind = GameKind::ALL[i];
                    self.launch(Launch::Game(kind));
                }
            }
            Screen::Session(session) => {
                if let Some(option) = renderer.hit_option(x, y) {
                    let events = session.select(option);
                    log_events(&events);
                    self.request_redraw();
                }
            }
            Screen::Reading(_) => {}
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.current_size = Some(new_size);
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize buffer");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize renderer");
            }
        }
        if let Screen::Reading(reading) = &mut self.screen {
            reading.rewrap(new_size.width);
        }
        debug!(width = new_size.width, height = new_size.height, "display resized");
        self.request_redraw();
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(renderer) = &self.renderer {
            let stats = renderer.frame_time_stats();
            info!(
                average_ms = stats.average_ms,
                jitter_ms = stats.jitter_ms,
                max_ms = stats.max_ms,
                fps = stats.effective_fps,
                "frame times"
            );
        }
        self.should_exit = true;
        event_loop.exit();
    }
}

fn log_events(events: &[SessionEvent]) {
    for event in events {
        match event {
            SessionEvent::SessionComplete(summary) => info!(?summary, "session complete"),
            SessionEvent::TrialJudged {
                index,
                outcome,
                reaction_ms,
            } => info!(index, ?outcome, ?reaction_ms, "trial judged"),
            other => debug!(event = ?other, "session event"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!(error = %e, "failed to create window and surface");
                event_loop.exit();
                return;
            }
            if let Some(launch) = self.pending.take() {
                self.launch(launch);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    error!(error = %e, "render failed");
                    self.cleanup_and_exit(event_loop);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if let Some(action) = key_action(code) {
                        self.handle_key(action, event_loop);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => self.cursor = Some(position),
            WindowEvent::CursorLeft { .. } => self.cursor = None,
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.handle_click(),
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(window) = &self.window {
                    self.handle_resize(window.inner_size());
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
            return;
        }
        if self.update() {
            self.request_redraw();
        }
        let deadline = match &self.screen {
            Screen::Session(session) => session.next_deadline(),
            _ => None,
        };
        event_loop.set_control_flow(match deadline {
            Some(ms) => ControlFlow::WaitUntil(self.clock.instant_at(ms)),
            None => ControlFlow::Wait,
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        debug!("application resources released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromaspan_core::{PALETTE, TextCell};

    #[test]
    fn reading_scroll_stays_on_the_page() {
        let text = (0..30).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let mut reading = Reading::new(ReadingMode::Homework, text, 800);
        reading.scroll_by(-3);
        assert_eq!(reading.view.scroll, 0);
        reading.scroll_by(100);
        assert_eq!(reading.view.scroll, 29);
        reading.rewrap(400);
        assert_eq!(reading.view.scroll, 29);
    }

    #[test]
    fn rewrap_keeps_the_mode() {
        let mut reading = Reading::new(ReadingMode::advanced(14), "bed".into(), 800);
        reading.rewrap(300);
        assert_eq!(
            reading.view.lines[0][0],
            TextCell::Block {
                colour: PALETTE[0].rgb
            }
        );
    }

    #[test]
    fn menu_lists_every_game() {
        let view = App::menu_view(3);
        assert_eq!(view.entries.len(), GameKind::ALL.len());
        assert_eq!(view.entries[3], GameKind::Spelling.name());
    }
}
