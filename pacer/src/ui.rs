//! Presentation layer. Renders the session every frame and nothing else -
//! all intents flow back through `App`.

use crate::app::{App, Mode};
use crate::config::parse_hex;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let palette = app.display.palette(app.session.theme).clone();
    f.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.foreground)),
        f.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);
    draw_timer(f, chunks[1], app);
    draw_phases(f, chunks[2], app);
    draw_status_bar(f, chunks[3], app);

    match &app.mode {
        Mode::EditingTitle(_) => draw_input_overlay(f, app.pack().ui.name, app),
        Mode::EditingMinutes(_) => draw_input_overlay(f, app.pack().ui.minutes, app),
        Mode::EditingColor(_) => draw_input_overlay(f, app.pack().ui.color, app),
        Mode::EditingAlert(event) => draw_input_overlay(f, event.key(), app),
        Mode::ImportPath => draw_input_overlay(f, app.pack().ui.import_cfg, app),
        Mode::ExportPath => draw_input_overlay(f, app.pack().ui.export_cfg, app),
        Mode::SelectingAlert => draw_alert_overlay(f, app),
        Mode::ShowHelp => draw_help_overlay(f, app),
        Mode::Normal => {}
    }
}

fn primary(app: &App) -> Color {
    parse_hex(&app.session.primary)
        .unwrap_or(app.display.palette(app.session.theme).foreground)
}

fn accent(app: &App) -> Color {
    parse_hex(&app.session.accent).unwrap_or(app.display.palette(app.session.theme).muted)
}

fn format_time(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.display.palette(app.session.theme);
    let icons = &app.display.icons;
    let ui = &app.pack().ui;
    let clock = chrono::Local::now().format("%H:%M:%S").to_string();
    let text = Line::from(vec![
        Span::raw(icons.header_left.clone()),
        Span::styled(
            ui.app_title,
            Style::default().fg(primary(app)).add_modifier(Modifier::BOLD),
        ),
        Span::raw(icons.header_right.clone()),
        Span::styled(
            format!("  {}  ·  {}  ·  {clock}", ui.subtitle, app.pack().name),
            Style::default().fg(palette.muted),
        ),
    ]);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(palette.panel)),
        ),
        area,
    );
}

fn draw_timer(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.display.palette(app.session.theme);
    let icons = &app.display.icons;
    let ui = &app.pack().ui;
    let session = &app.session;

    let ring = session
        .current_phase()
        .and_then(|phase| parse_hex(&phase.color))
        .unwrap_or(palette.muted);
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", ui.current_phase),
            Style::default().fg(palette.muted),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ring));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner_area);

    let title = session
        .current_phase()
        .map(|phase| phase.title.as_str())
        .unwrap_or("-");
    let state_icon = if session.running {
        &icons.play
    } else {
        &icons.stop
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{state_icon} {title}"),
                Style::default().fg(accent(app)).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  {}: {}",
                    ui.voice_alerts,
                    if session.use_recording { ui.rec } else { ui.tts }
                ),
                Style::default().fg(palette.muted),
            ),
        ]))
        .alignment(Alignment::Center),
        v_chunks[0],
    );
    f.render_widget(
        Paragraph::new(format_time(session.remaining))
            .style(
                Style::default()
                    .fg(palette.foreground)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center),
        v_chunks[1],
    );
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(ring).bg(palette.panel))
            .percent((session.progress() * 100.0) as u16),
        v_chunks[2],
    );
}

fn draw_phases(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.display.palette(app.session.theme);
    let icons = &app.display.icons;
    let ui = &app.pack().ui;
    let session = &app.session;

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", ui.phases),
            Style::default().fg(palette.muted),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.panel));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    if session.phases.is_empty() {
        f.render_widget(
            Paragraph::new(ui.add_phase)
                .style(Style::default().fg(palette.muted))
                .alignment(Alignment::Center),
            inner_area,
        );
        return;
    }

    let constraints: Vec<Constraint> =
        session.phases.iter().map(|_| Constraint::Length(1)).collect();
    let rows = Layout::default().constraints(constraints).split(inner_area);
    for (i, phase) in session.phases.iter().enumerate() {
        let Some(row) = rows.get(i) else { break };
        let swatch = parse_hex(&phase.color).unwrap_or(palette.muted);
        if i == app.selected_phase {
            f.render_widget(
                Block::default().style(Style::default().bg(palette.panel)),
                *row,
            );
        }
        let mut left = vec![if i == app.selected_phase {
            Span::styled(icons.select.clone(), Style::default().fg(accent(app)))
        } else {
            Span::raw(" ")
        }];
        left.push(Span::styled(
            format!(" {} ", icons.swatch),
            Style::default().fg(swatch),
        ));
        left.push(Span::styled(
            phase.title.clone(),
            if i == session.idx {
                Style::default()
                    .fg(palette.foreground)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.foreground)
            },
        ));
        if i == session.idx {
            left.push(Span::styled(
                format!(" {}", icons.current),
                Style::default().fg(accent(app)),
            ));
        }
        let right = Span::styled(
            format!("{} {} ", phase.minutes, ui.minutes),
            Style::default().fg(palette.muted),
        );
        f.render_widget(Paragraph::new(Line::from(left)), *row);
        f.render_widget(
            Paragraph::new(Line::from(right)).alignment(Alignment::Right),
            *row,
        );
    }
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.display.palette(app.session.theme);
    let (mode_text, mode_color) = match app.mode {
        Mode::Normal => ("NORMAL", accent(app)),
        Mode::EditingTitle(_) | Mode::EditingColor(_) | Mode::EditingAlert(_) => {
            ("INSERT", primary(app))
        }
        Mode::EditingMinutes(_) => ("TIME", primary(app)),
        Mode::SelectingAlert => ("ALERT", primary(app)),
        Mode::ImportPath | Mode::ExportPath => ("FILE", primary(app)),
        Mode::ShowHelp => ("HELP", primary(app)),
    };
    let ui = &app.pack().ui;
    let help = match app.mode {
        Mode::Normal => format!(
            "space:{}/{} │ r:{} │ t:{} │ s:{} │ n:{} │ a:{} │ d:{} │ K/J:{}/{} │ v:{} │ l:{} │ T:{} │ i:{} │ x:{} │ S:{} │ ?:{} │ q:quit",
            ui.start,
            ui.pause,
            ui.reset,
            ui.add10,
            ui.skip,
            ui.switch_phase,
            ui.add_phase,
            ui.remove,
            ui.move_up,
            ui.move_down,
            ui.alerts_texts,
            ui.language,
            ui.theme,
            ui.import_cfg,
            ui.export_cfg,
            ui.share_cfg,
            ui.help,
        ),
        Mode::SelectingAlert => "1-7 │ esc".to_string(),
        Mode::ShowHelp => "esc".to_string(),
        _ => "enter │ esc".to_string(),
    };
    let mut spans = vec![
        Span::styled(
            format!(" {mode_text} "),
            Style::default()
                .bg(mode_color)
                .fg(palette.background)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(
            notice.text.clone(),
            Style::default().fg(accent(app)).add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::styled(help, Style::default().fg(palette.muted)));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans))
            .block(Block::default().style(Style::default().bg(palette.panel))),
        area,
    );
}

fn draw_input_overlay(f: &mut Frame, title: &str, app: &App) {
    let palette = app.display.palette(app.session.theme);
    let area = centered_rect(60, 20, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent(app)))
        .border_type(BorderType::Double)
        .style(Style::default().bg(palette.background));
    let inner_area = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("▸ ", Style::default().fg(palette.foreground)),
            Span::styled(
                app.input_buffer.clone(),
                Style::default().fg(palette.foreground),
            ),
            Span::styled(
                app.display.icons.input_cursor.clone(),
                Style::default()
                    .fg(palette.foreground)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
        ])),
        inner_area,
    );
}

fn draw_alert_overlay(f: &mut Frame, app: &App) {
    let palette = app.display.palette(app.session.theme);
    let area = centered_rect(60, 50, f.area());
    f.render_widget(Clear, area);
    let items: Vec<ListItem> = crate::alerts::AlertEvent::ALL
        .iter()
        .enumerate()
        .map(|(i, event)| {
            let text = app
                .session
                .alerts_text
                .get(event.key())
                .map(String::as_str)
                .unwrap_or("");
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}. ", i + 1), Style::default().fg(primary(app))),
                Span::raw(format!("{:<16}", event.key())),
                Span::styled(text.to_string(), Style::default().fg(palette.muted)),
            ]))
        })
        .collect();
    f.render_widget(
        List::new(items).block(
            Block::default()
                .title(format!(" {} ", app.pack().ui.alerts_texts))
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(accent(app)))
                .style(Style::default().bg(palette.background)),
        ),
        area,
    );
}

fn draw_help_overlay(f: &mut Frame, app: &App) {
    let palette = app.display.palette(app.session.theme);
    let area = centered_rect(70, 80, f.area());
    f.render_widget(Clear, area);
    let ui = &app.pack().ui;
    let mut lines: Vec<Line> = app.pack().help_text.lines().map(Line::from).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        ui.tip,
        Style::default().fg(palette.muted),
    )));
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .title(format!(" {} ", ui.help))
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(accent(app)))
                .style(Style::default().bg(palette.background)),
        ),
        area,
    );
}

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
