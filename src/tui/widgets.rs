//! Custom TUI widgets

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// A badge showing how many SCIs a site or list holds
pub struct CountBadge {
    count: usize,
    color: Color,
}

impl CountBadge {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            color: Color::Cyan,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn to_span(&self) -> Span<'static> {
        Span::styled(
            format!(" {} SCIs ", self.count),
            Style::default()
                .fg(Color::Black)
                .bg(self.color)
                .add_modifier(Modifier::BOLD),
        )
    }
}

/// A spinning loading indicator with a label
pub struct Spinner<'a> {
    tick: usize,
    label: &'a str,
}

impl<'a> Spinner<'a> {
    const FRAMES: [&'static str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

    pub fn new(tick: usize, label: &'a str) -> Self {
        Self { tick, label }
    }

    fn frame(&self) -> &'static str {
        Self::FRAMES[self.tick % Self::FRAMES.len()]
    }
}

impl<'a> Widget for Spinner<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let line = Line::from(vec![
            Span::styled(self.frame(), Style::default().fg(Color::Cyan)),
            Span::raw(" "),
            Span::raw(self.label),
        ]);

        let y = area.y + area.height / 2;
        Paragraph::new(line)
            .centered()
            .render(Rect { y, height: 1, ..area }, buf);
    }
}

/// A key hint widget for showing keyboard shortcuts
pub struct KeyHints<'a> {
    hints: Vec<(&'a str, &'a str)>,
}

impl<'a> KeyHints<'a> {
    pub fn new(hints: Vec<(&'a str, &'a str)>) -> Self {
        Self { hints }
    }
}

impl<'a> Widget for KeyHints<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spans: Vec<Span> = self
            .hints
            .iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(
                        format!("[{}]", key),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!(" {} ", desc)),
                ]
            })
            .collect();

        let line = Line::from(spans);
        let paragraph = Paragraph::new(line).style(Style::default().fg(Color::DarkGray));

        paragraph.render(area, buf);
    }
}
