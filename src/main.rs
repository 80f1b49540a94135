mod ui;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tui_globe::braille::BrailleSurface;
use tui_globe::data;
use tui_globe::plugins::{
    autorotate, drag, pings, zoom, Autorotate, AutorotateState, Drag, DragController, Earth,
    GestureHooks, Lakes, PingOptions, Pings, PingsState, WorldSource, Zoom, ZoomController,
};
use tui_globe::{Globe, GlobeState, Rgba, Rotation};

const OCEAN: Rgba = Rgba::new(0x2c, 0x3d, 0x7f);
const LAND: Rgba = Rgba::new(0xbd, 0xbd, 0xbd);

const PING_COLORS: [&str; 7] = ["red", "yellow", "white", "orange", "green", "cyan", "pink"];

fn main() -> Result<()> {
    init_logging();

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// The terminal runs in raw mode, so tracing output goes to a file instead
/// of stderr. Opt in with TUI_GLOBE_LOG=<path>.
fn init_logging() {
    if let Ok(path) = std::env::var("TUI_GLOBE_LOG") {
        if let Ok(file) = std::fs::File::create(path) {
            let _ = tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
    }
}

fn build_globe() -> Result<Globe> {
    let mut globe = Globe::new();
    globe
        .state
        .projection
        .set_rotation(Rotation::new(0.0, -10.0, 0.0));

    // Loaded first so the earth layers draw over nothing and the drag
    // gesture hooks below can find its state.
    globe.load_plugin(Autorotate::new(8.0))?;

    let source = if Path::new("data").exists() {
        WorldSource::Dir("data".into())
    } else {
        WorldSource::Memory(data::builtin_world())
    };
    let mut earth = Earth::new(source);
    earth.oceans.fill = OCEAN;
    earth.land.fill = Some(LAND);
    earth.borders.stroke = OCEAN;
    globe.load_plugin(earth)?;
    globe.load_plugin(Lakes { fill: OCEAN })?;

    globe.load_plugin(Pings::new())?;
    globe.load_plugin(Zoom::with_extent([12.0, 400.0]))?;

    // Dragging pauses the automatic rotation until the mouse is released.
    globe.load_plugin(Drag::with_hooks(GestureHooks {
        on_start: Box::new(|state: &mut GlobeState| {
            if let Some(auto) = state.plugins.get_mut::<AutorotateState>(autorotate::NAME) {
                auto.pause();
            }
        }),
        on_end: Box::new(|state: &mut GlobeState| {
            if let Some(auto) = state.plugins.get_mut::<AutorotateState>(autorotate::NAME) {
                auto.resume();
            }
        }),
        ..GestureHooks::default()
    }))?;

    Ok(globe)
}

fn run(terminal: &mut DefaultTerminal) -> Result<()> {
    let size = terminal.size()?;
    let mut globe = build_globe()?;

    let (mut cols, mut rows) = surface_size(size.width, size.height);
    // Starting radius: 40% of the smaller pixel dimension. The zoom plugin
    // adopts it as its initial scale on the first draw.
    globe
        .state
        .projection
        .set_scale(((cols * 2).min(rows * 4) as f64) * 0.4);

    let mut frame_count: u64 = 0;
    let mut dragging = false;
    let mut last_mouse: Option<(u16, u16)> = None;

    loop {
        let mut surface = BrailleSurface::new(cols, rows);
        globe.state.projection.set_translate((
            surface.pixel_width() as f64 / 2.0,
            surface.pixel_height() as f64 / 2.0,
        ));
        globe.draw(&mut surface)?;
        terminal.draw(|frame| ui::render(frame, &surface, &globe))?;

        // A fresh ping on a random coordinate every ~20 frames
        frame_count = frame_count.wrapping_add(1);
        if frame_count % 20 == 0 {
            spawn_ping(&mut globe, frame_count);
        }

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),

                    KeyCode::Char(' ') => {
                        globe.with_plugin::<AutorotateState, _>(autorotate::NAME, |auto, _| {
                            auto.toggle()
                        });
                    }

                    // Rotate with hjkl or arrow keys, through the drag mapping
                    KeyCode::Left | KeyCode::Char('h') => rotate_by(&mut globe, 10.0, 0.0),
                    KeyCode::Right | KeyCode::Char('l') => rotate_by(&mut globe, -10.0, 0.0),
                    KeyCode::Up | KeyCode::Char('k') => rotate_by(&mut globe, 0.0, 6.0),
                    KeyCode::Down | KeyCode::Char('j') => rotate_by(&mut globe, 0.0, -6.0),

                    // Zoom
                    KeyCode::Char('+') | KeyCode::Char('=') => zoom_by(&mut globe, 1.25),
                    KeyCode::Char('-') | KeyCode::Char('_') => zoom_by(&mut globe, 0.8),

                    _ => {}
                },
                Event::Mouse(mouse) => {
                    handle_mouse(&mut globe, mouse, &mut dragging, &mut last_mouse);
                }
                Event::Resize(width, height) => {
                    (cols, rows) = surface_size(width, height);
                }
                _ => {}
            }
        }
    }
}

/// Handle mouse events for rotating and zooming
fn handle_mouse(
    globe: &mut Globe,
    mouse: MouseEvent,
    dragging: &mut bool,
    last_mouse: &mut Option<(u16, u16)>,
) {
    match mouse.kind {
        // Scroll wheel for zooming
        MouseEventKind::ScrollUp => zoom_by(globe, 1.25),
        MouseEventKind::ScrollDown => zoom_by(globe, 0.8),
        // Click and drag to rotate
        MouseEventKind::Down(MouseButton::Left) => {
            *dragging = true;
            *last_mouse = Some((mouse.column, mouse.row));
            globe.with_plugin::<DragController, _>(drag::NAME, |drag, state| drag.begin(state));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if *dragging {
                if let Some((last_col, last_row)) = *last_mouse {
                    // Terminal cells are 2x4 braille pixels
                    let dx = (f64::from(mouse.column) - f64::from(last_col)) * 2.0;
                    let dy = (f64::from(mouse.row) - f64::from(last_row)) * 4.0;
                    rotate_by(globe, dx, dy);
                }
                *last_mouse = Some((mouse.column, mouse.row));
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if *dragging {
                globe.with_plugin::<DragController, _>(drag::NAME, |drag, state| drag.end(state));
            }
            *dragging = false;
            *last_mouse = None;
        }
        _ => {}
    }
}

fn rotate_by(globe: &mut Globe, dx: f64, dy: f64) {
    globe.with_plugin::<DragController, _>(drag::NAME, |drag, state| drag.update(state, dx, dy));
}

fn zoom_by(globe: &mut Globe, factor: f64) {
    globe.with_plugin::<ZoomController, _>(zoom::NAME, |zoom, state| zoom.zoom_by(state, factor));
}

fn spawn_ping(globe: &mut Globe, seed: u64) {
    let lon = rand_simple(seed.wrapping_mul(7919)) * 360.0 - 180.0;
    let lat = rand_simple(seed.wrapping_mul(6547)) * 170.0 - 85.0;
    let pick = (rand_simple(seed.wrapping_mul(31337)) * PING_COLORS.len() as f64) as usize;
    let color = Rgba::parse(PING_COLORS[pick % PING_COLORS.len()]).unwrap_or(Rgba::WHITE);
    let options = PingOptions::default()
        .color(color)
        .angle(4.0 + rand_simple(seed.wrapping_mul(104_729)) * 8.0)
        .ttl(Duration::from_millis(2500));

    let added = globe.with_plugin::<PingsState, _>(pings::NAME, |pings, state| {
        let now = state.now();
        pings.add(now, lon, lat, options)
    });
    if let Some(Err(err)) = added {
        tracing::warn!(error = %err, "ping rejected");
    }
}

/// Braille gives 2x4 resolution per character; account for the border
/// (2 chars each way) and the status bar.
fn surface_size(width: u16, height: u16) -> (usize, usize) {
    (
        (width as usize).saturating_sub(2),
        (height as usize).saturating_sub(3),
    )
}

/// Fast deterministic random using splitmix64 - handles small seeds properly
#[inline(always)]
fn rand_simple(seed: u64) -> f64 {
    let mut x = seed.wrapping_mul(0x9e3779b97f4a7c15);
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    (x >> 11) as f64 / 9007199254740992.0 // 2^53 for full f64 mantissa precision
}
