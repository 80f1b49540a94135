use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};
use tui_globe::braille::BrailleSurface;
use tui_globe::plugins::{autorotate, pings, AutorotateState, PingsState};
use tui_globe::Globe;

/// Render the UI
pub fn render(frame: &mut Frame, surface: &BrailleSurface, globe: &Globe) {
    let area = frame.area();

    // Split into globe area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Globe
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_globe(frame, surface, chunks[0]);
    render_status_bar(frame, globe, chunks[1]);
}

fn render_globe(frame: &mut Frame, surface: &BrailleSurface, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Globe ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(GlobeWidget { surface }, inner);
}

/// Blits the Braille surface cells with their colors.
struct GlobeWidget<'a> {
    surface: &'a BrailleSurface,
}

impl Widget for GlobeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for cy in 0..self.surface.height().min(area.height as usize) {
            for cx in 0..self.surface.width().min(area.width as usize) {
                if let Some((ch, color)) = self.surface.cell(cx, cy) {
                    let x = area.x + cx as u16;
                    let y = area.y + cy as u16;
                    buf[(x, y)]
                        .set_char(ch)
                        .set_fg(Color::Rgb(color.r, color.g, color.b));
                }
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, globe: &Globe, area: Rect) {
    // rotate([λ, φ]) centers the point (-λ, -φ)
    let rotation = globe.state.projection.rotation();
    let center = format!(
        "{:.1}°{}, {:.1}°{}",
        rotation.phi.abs(),
        if rotation.phi <= 0.0 { "N" } else { "S" },
        rotation.lambda.abs(),
        if rotation.lambda <= 0.0 { "E" } else { "W" }
    );

    let live_pings = globe
        .state
        .plugins
        .get::<PingsState>(pings::NAME)
        .map_or(0, |pings| pings.live().len());

    let spinning = globe
        .state
        .plugins
        .get::<AutorotateState>(autorotate::NAME)
        .is_some_and(|auto| !auto.is_paused());

    let mut spans = vec![
        Span::styled(" Scale: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{:.0}", globe.state.projection.scale()),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(center, Style::default().fg(Color::Cyan)),
        Span::styled(" | pings: ", Style::default().fg(Color::DarkGray)),
        Span::styled(live_pings.to_string(), Style::default().fg(Color::Green)),
        Span::styled(
            if spinning { " | spinning" } else { " | paused" },
            Style::default().fg(if spinning { Color::Green } else { Color::DarkGray }),
        ),
    ];

    let skipped = globe.diagnostics().len();
    if skipped > 0 {
        spans.push(Span::styled(
            format!(" | skipped hooks: {skipped}"),
            Style::default().fg(Color::Red),
        ));
    }

    spans.push(Span::styled(
        " | drag:rotate wheel:zoom space:spin q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(Line::from(spans));
    frame.render_widget(paragraph, area);
}
