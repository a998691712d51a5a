//! TUI rendering

use super::app::{App, DocumentList, Screen};
use super::widgets::{CountBadge, KeyHints, Spinner};
use crate::model::Sci;
use crate::render::{hex_to_rgb, render_document, DocumentView, ViewMode};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Colours and borders of one presentation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub heading: Color,
    pub border: BorderType,
}

impl Palette {
    pub fn for_mode(mode: ViewMode) -> Self {
        match mode {
            ViewMode::Classic => Self {
                accent: Color::Blue,
                heading: Color::White,
                border: BorderType::Plain,
            },
            ViewMode::Elegant => Self {
                accent: Color::Cyan,
                heading: Color::LightCyan,
                border: BorderType::Rounded,
            },
            ViewMode::Opus => Self {
                accent: Color::Magenta,
                heading: Color::Yellow,
                border: BorderType::Double,
            },
        }
    }
}

/// Draw the UI
pub fn draw(f: &mut Frame, app: &App) {
    match app.screen {
        Screen::Loading => draw_loading(f, app),
        Screen::Sites { selected } => draw_sites(f, app, selected),
        Screen::Documents(ref list) => draw_documents(f, app, list),
        Screen::Detail {
            ref list,
            ref document,
            scroll,
            ..
        } => draw_detail(f, app, list, document, scroll),
    }

    if app.show_help {
        draw_help(f);
    }
}

/// Draw the initial loading screen
fn draw_loading(f: &mut Frame, app: &App) {
    f.render_widget(Spinner::new(app.tick, "Loading SCI Viewer..."), f.area());
}

/// Draw the site selection view
fn draw_sites(f: &mut Frame, app: &App, selected: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    // Title
    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "SCI Viewer",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from("Standard Cleaning Instructions"),
    ])
    .centered()
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    // Site cards
    let items: Vec<ListItem> = app
        .sites
        .iter()
        .enumerate()
        .map(|(i, site)| {
            let content = Line::from(vec![
                Span::styled(
                    site.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                CountBadge::new(site.count)
                    .color(if i == selected { Color::Yellow } else { Color::Cyan })
                    .to_span(),
            ]);

            ListItem::new(content).style(selection_style(i == selected))
        })
        .collect();

    let list = List::new(items).block(Block::default().title("Sites").borders(Borders::ALL));
    f.render_widget(list, chunks[1]);

    // Footer
    let footer = Paragraph::new("Powered by ACS Content Engine")
        .centered()
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, chunks[2]);

    f.render_widget(
        KeyHints::new(vec![("↑/↓", "Navigate"), ("Enter", "Open"), ("?", "Help"), ("q", "Quit")]),
        chunks[3],
    );
}

/// Draw the document list view
fn draw_documents(f: &mut Frame, app: &App, list: &DocumentList) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    // Header
    let header = Paragraph::new(Line::from(vec![
        Span::styled("← Sites  ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            list.site.name.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        CountBadge::new(list.total()).to_span(),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    // Search bar
    let search_style = if list.searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let search_text = if list.search.is_empty() && !list.searching {
        "Search cleaning instructions... (press /)".to_string()
    } else {
        list.search.clone()
    };
    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(Block::default().title("Search").borders(Borders::ALL));
    f.render_widget(search, chunks[1]);

    // Documents
    if list.is_loading() {
        let block = Block::default().title("SCIs").borders(Borders::ALL);
        let inner = block.inner(chunks[2]);
        f.render_widget(block, chunks[2]);
        f.render_widget(Spinner::new(app.tick, "Loading SCIs..."), inner);
    } else {
        let visible = list.visible();
        let items: Vec<ListItem> = visible
            .iter()
            .enumerate()
            .map(|(i, sci)| ListItem::new(document_card(sci)).style(selection_style(i == list.selected)))
            .collect();

        let title = format!("SCIs ({} of {})", visible.len(), list.total());
        let docs = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
        f.render_widget(docs, chunks[2]);
    }

    let hints = if list.searching {
        KeyHints::new(vec![("Enter/Esc", "Done")])
    } else {
        KeyHints::new(vec![("↑/↓", "Navigate"), ("Enter", "Open"), ("/", "Search"), ("Esc", "Sites")])
    };
    f.render_widget(hints, chunks[3]);
}

/// Two-line card for one document
fn document_card(sci: &Sci) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            sci.title().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                format!("  {}", sci.display_id()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("  {} steps", sci.step_count()),
                Style::default().fg(Color::Green),
            ),
        ]),
    ]
}

/// Draw the document detail view
fn draw_detail(f: &mut Frame, app: &App, list: &DocumentList, document: &Sci, scroll: u16) {
    let view = render_document(document, &list.site.name, app.mode);
    let palette = Palette::for_mode(view.mode);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(f.area());

    // Header with mode toggle
    let mut spans = vec![
        Span::styled("← Back  ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            view.content.title.clone(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
    ];
    for mode in ViewMode::ALL {
        let style = if mode == view.mode {
            Style::default()
                .fg(Color::Black)
                .bg(palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", mode.label()), style));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(palette.border)
            .border_style(Style::default().fg(palette.accent)),
    );
    f.render_widget(header, chunks[0]);

    // Document body
    let body = Paragraph::new(document_lines(&view))
        .block(
            Block::default()
                .title(view.style_class())
                .borders(Borders::ALL)
                .border_type(palette.border)
                .border_style(Style::default().fg(palette.accent)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(body, chunks[1]);

    f.render_widget(
        KeyHints::new(vec![("Tab/1-3", "Style"), ("↑/↓", "Scroll"), ("Esc", "Back")]),
        chunks[2],
    );
}

/// Lines of a rendered document, styled for its mode
pub fn document_lines(view: &DocumentView) -> Vec<Line<'static>> {
    let palette = Palette::for_mode(view.mode);
    let c = &view.content;

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let heading = |text: &str| {
        Line::from(Span::styled(
            text.to_string(),
            Style::default()
                .fg(palette.heading)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ))
    };
    let field = |label: &str, value: &str| {
        Line::from(vec![
            Span::styled(format!("{}: ", label), bold),
            Span::raw(value.to_string()),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            c.header.heading.clone(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(c.header.site_name.clone()),
        field("Document No", &c.header.document_no),
        field("Amendment", &c.header.amendment),
        field("Effective", &c.header.effective),
        Line::from(""),
        Line::from(Span::styled(c.title.clone(), bold.fg(palette.accent))),
        Line::from(c.description.clone()),
    ];

    if let Some(ref chemicals) = c.chemicals {
        lines.push(Line::from(""));
        lines.push(heading("Chemicals"));
        lines.push(Line::from(Span::styled(
            format!("  {:<30} {}", "Chemical", "Use Ratio"),
            bold,
        )));
        for row in chemicals {
            lines.push(Line::from(format!("  {:<30} {}", row.name, row.ratio)));
        }
    }

    lines.push(Line::from(""));
    lines.push(field("Frequency", &c.frequency));
    lines.push(field("Responsibility", &c.responsibility));

    if let Some(ref inspection) = c.inspection {
        lines.push(Line::from(""));
        lines.push(heading("Key Inspection Points"));
        for image in &inspection.images {
            lines.push(Line::from(vec![
                Span::styled(format!("  [{}] ", image.alt), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    image.url.clone(),
                    Style::default().add_modifier(Modifier::UNDERLINED),
                ),
            ]));
        }
        for point in &inspection.points {
            lines.push(Line::from(format!("  • {}", point)));
        }
    }

    lines.push(Line::from(""));
    lines.push(heading("PPE Requirements & Safety"));
    let ppe: Vec<String> = c
        .ppe
        .items
        .iter()
        .map(|item| format!("{} {}", item.icon, item.label))
        .collect();
    lines.push(Line::from(format!("  {}", ppe.join("  "))));
    lines.push(Line::from(Span::styled(
        format!("  {}", c.ppe.note),
        Style::default().add_modifier(Modifier::ITALIC),
    )));

    if let Some(ref codes) = c.colour_codes {
        lines.push(Line::from(""));
        lines.push(heading("Colour Code"));
        for code in codes {
            let color = hex_to_rgb(&code.hex)
                .map(|(r, g, b)| Color::Rgb(r, g, b))
                .unwrap_or(Color::Gray);
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(code.colour.clone(), bold.fg(color)),
                Span::styled(format!(" – {}", code.meaning), Style::default().fg(color)),
            ]));
        }
    }

    if let Some(ref equipment) = c.equipment {
        lines.push(Line::from(""));
        lines.push(heading("Application Equipment"));
        lines.push(Line::from(format!("  {}", equipment)));
    }

    lines.push(Line::from(""));
    lines.push(heading("Cleaning Instructions"));
    for group in &c.instructions {
        lines.push(Line::from(Span::styled(format!("  {}", group.heading), bold)));
        for (i, step) in group.steps.iter().enumerate() {
            lines.push(Line::from(format!("    {}. {}", i + 1, step)));
        }
    }

    lines.push(Line::from(""));
    lines.push(field("Issued By", &c.footer.issued_by));
    lines.push(field("Approved By", &c.footer.approved_by));

    lines
}

fn selection_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

/// Draw the help view
fn draw_help(f: &mut Frame) {
    let area = centered_rect(60, 80, f.area());

    f.render_widget(Clear, area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::UNDERLINED),
        ))
    };

    let help_text = vec![
        Line::from(Span::styled(
            "SCI Viewer Help",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Global"),
        Line::from("  Ctrl+C, Ctrl+Q  Quit"),
        Line::from("  ?               Show help"),
        Line::from(""),
        section("Sites"),
        Line::from("  ↑/k, ↓/j        Navigate"),
        Line::from("  Enter           Open site"),
        Line::from("  q, Esc          Quit"),
        Line::from(""),
        section("SCI List"),
        Line::from("  /               Search titles"),
        Line::from("  Enter           Open SCI"),
        Line::from("  Esc, Backspace  Back to sites"),
        Line::from(""),
        section("SCI Detail"),
        Line::from("  Tab, m          Next style"),
        Line::from("  1, 2, 3         Classic, Elegant, Opus"),
        Line::from("  ↑/↓, PgUp/PgDn  Scroll"),
        Line::from("  Esc, Backspace  Back to list"),
        Line::from(""),
        Line::from("Press any key to close"),
    ];

    let help = Paragraph::new(help_text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .wrap(Wrap { trim: false });

    f.render_widget(help, area);
}

/// Create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chemical, ColourCode, Site};
    use crate::tui::app::{Command, FetchResult};
    use ratatui::{backend::TestBackend, Terminal};

    fn plain_text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn sample() -> Sci {
        let mut sci = Sci::default();
        sci.section.title = Some("Slicer".to_string());
        sci.section.chemicals = vec![Chemical {
            name: "Foam".to_string(),
            use_ratio: Some("1:40".to_string()),
            hot_ratio: None,
        }];
        sci.section.colour_codes = vec![ColourCode {
            colour: "red".to_string(),
            meaning: "Raw".to_string(),
        }];
        sci
    }

    #[test]
    fn test_modes_share_text() {
        let sci = sample();
        let texts: Vec<_> = ViewMode::ALL
            .iter()
            .map(|mode| plain_text(&document_lines(&render_document(&sci, "Plant", *mode))))
            .collect();

        assert_eq!(texts[0], texts[1]);
        assert_eq!(texts[1], texts[2]);
        assert!(texts[0].iter().any(|l| l.contains("Foam") && l.contains("1:40")));
    }

    #[test]
    fn test_palettes_differ_by_mode() {
        let palettes: Vec<_> = ViewMode::ALL.iter().map(|m| Palette::for_mode(*m)).collect();
        assert_ne!(palettes[0], palettes[1]);
        assert_ne!(palettes[1], palettes[2]);
    }

    #[test]
    fn test_draw_every_screen() {
        let mut app = App::new(ViewMode::Elegant);
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();

        terminal.draw(|f| draw(f, &app)).unwrap();

        app.apply_fetch(FetchResult::Sites(Ok(vec![Site {
            id: "S1".to_string(),
            name: "Plant".to_string(),
            count: 1,
        }])));
        terminal.draw(|f| draw(f, &app)).unwrap();

        let command = app.select_site(0).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        if let Command::LoadDocuments { request, .. } = command {
            app.apply_fetch(FetchResult::Documents {
                request,
                result: Ok(vec![sample()]),
            });
        }
        terminal.draw(|f| draw(f, &app)).unwrap();

        app.open_document(0);
        app.show_help = true;
        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(matches!(app.screen, Screen::Detail { .. }));
    }
}
