use crate::app::AppState;
use crate::theme;
use internet_tile::config;
use internet_tile::network::SignalLevel;
use internet_tile::tile::{ControllerSnapshot, TransportState, cellular_text};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap},
};

/// Keep the window parity equal to the terminal's so it centers exactly
fn parity_matched(target: u16, available: u16) -> u16 {
    if target % 2 == available % 2 {
        target
    } else {
        target + 1
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BACKGROUND).fg(theme::FOREGROUND)),
        area,
    );

    let height = parity_matched(config::MAIN_WINDOW_HEIGHT, area.height);
    let width = parity_matched(config::MAIN_WINDOW_WIDTH, area.width);

    let vertical_layout = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .split(area);

    let horizontal_layout = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width),
        Constraint::Fill(1),
    ])
    .split(vertical_layout[1]);

    let main_area = horizontal_layout[1];

    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::DIMMED))
        .title(format!(" INTERNET TILE v{} ", env!("CARGO_PKG_VERSION")))
        .title_alignment(Alignment::Center)
        .title_style(Style::default().fg(theme::LABEL).add_modifier(Modifier::BOLD));

    frame.render_widget(main_block, main_area);

    let inner_area = main_area.inner(Margin {
        vertical: 1,
        horizontal: 2,
    });

    let content_layout = Layout::vertical([
        Constraint::Length(config::TILE_HEIGHT), // Tile
        Constraint::Min(8),                      // Details
        Constraint::Length(2),                   // Bottom bar
    ])
    .split(inner_area);

    render_tile(frame, state, content_layout[0]);
    render_details(frame, state, content_layout[1]);
    render_help(frame, state, content_layout[2]);

    if let Some((notice, _)) = &state.ui.notice {
        let color = if notice.is_error() { theme::ERROR } else { theme::SWITCHING };
        let notice_area = Rect::new(
            main_area.x + 2,
            main_area.y + main_area.height.saturating_sub(6),
            main_area.width.saturating_sub(4),
            3,
        );
        let paragraph = Paragraph::new(notice.text())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(color))
                    .title(notice.title()),
            )
            .style(Style::default().fg(color).bg(theme::BACKGROUND))
            .wrap(Wrap { trim: true });
        frame.render_widget(Clear, notice_area);
        frame.render_widget(paragraph, notice_area);
    }

    if state.ui.show_key_logger
        && let Some((key, time)) = &state.ui.last_key_press
        && time.elapsed() < std::time::Duration::from_secs(2)
    {
        let key_text = format!(" {} ", key);
        let width = key_text.chars().count() as u16 + 2;

        // Right below the bottom right corner of the main window
        let key_area = Rect::new(
            main_area.x + main_area.width.saturating_sub(width),
            main_area.y + main_area.height,
            width,
            3,
        )
        .intersection(area);

        let paragraph = Paragraph::new(key_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(theme::KEY_LOGGER))
                    .style(Style::default().bg(theme::BACKGROUND)),
            )
            .style(
                Style::default()
                    .fg(theme::KEY_LOGGER)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center);

        frame.render_widget(Clear, key_area);
        frame.render_widget(paragraph, key_area);
    }
}

fn render_tile(frame: &mut Frame, state: &AppState, area: Rect) {
    let tile_area = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(30),
        Constraint::Fill(1),
    ])
    .split(area)[1];

    let Some(tile) = state.descriptor() else {
        let hidden = Paragraph::new("Tile hidden")
            .style(Style::default().fg(theme::DIMMED))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(theme::DIMMED)),
            );
        frame.render_widget(hidden, tile_area);
        return;
    };

    let (border, background) = theme::tile_colors(tile.icon);

    let mut title = vec![
        Span::styled(
            state.ui.icons.tile(tile.icon),
            Style::default().fg(border).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            state.ui.labels.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    if state.is_switching() {
        let spinner = config::LOADING_CHARS[state.ui.loading_frame % config::LOADING_CHARS.len()];
        title.push(Span::styled(format!(" {}", spinner), Style::default().fg(theme::SWITCHING)));
    }

    let subtitle = tile.label.unwrap_or_default();
    let paragraph = Paragraph::new(vec![
        Line::from(title),
        Line::from(Span::styled(subtitle, Style::default().fg(theme::FOREGROUND))),
    ])
    .alignment(Alignment::Center)
    .style(Style::default().bg(background))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(paragraph, tile_area);
}

fn transport_text(transport: TransportState) -> (&'static str, Color) {
    let text = match (transport.enabled, transport.pending_enable) {
        (_, true) => "turning on",
        (true, false) => "on",
        (false, false) => "off",
    };
    (text, theme::transport_color(transport))
}

fn detail_lines<'a>(state: &'a AppState, snapshot: &'a ControllerSnapshot) -> Vec<Line<'a>> {
    let label_style = Style::default().fg(theme::LABEL);
    let (wifi, wifi_color) = transport_text(snapshot.wifi);
    let (data, data_color) = transport_text(snapshot.cellular);

    let ssid = snapshot
        .wifi_identity
        .connected_ssid()
        .unwrap_or("not connected");
    let wifi_signal = snapshot
        .wifi_signal
        .map(|level| format!("{}/{}", level.get(), SignalLevel::MAX))
        .unwrap_or_else(|| "-".to_string());

    vec![
        Line::from(vec![
            Span::styled("Mode: ", label_style),
            Span::raw(snapshot.mode().to_string()),
            Span::styled(format!("  {}", snapshot.generation), Style::default().fg(theme::DIMMED)),
        ]),
        Line::from(vec![
            Span::styled("Wi-Fi: ", label_style),
            Span::styled(wifi, Style::default().fg(wifi_color)),
            Span::raw(format!(" • {} • signal {}", ssid, wifi_signal)),
        ]),
        Line::from(vec![
            Span::styled("Mobile data: ", label_style),
            Span::styled(data, Style::default().fg(data_color)),
            Span::raw(format!(
                " • {}",
                cellular_text(&snapshot.cellular_display, &state.ui.labels)
            )),
        ]),
    ]
}

fn render_details(frame: &mut Frame, state: &AppState, area: Rect) {
    let label_style = Style::default().fg(theme::LABEL);

    let mut info = match &state.snapshot {
        Some(snapshot) => detail_lines(state, snapshot),
        None => vec![Line::from(Span::styled(
            "Not listening",
            Style::default().fg(theme::DIMMED),
        ))],
    };

    info.push(Line::from(vec![
        Span::styled("Shell: ", label_style),
        Span::raw(state.backend.as_str()),
    ]));
    info.push(Line::from(vec![
        Span::styled(
            state.ui.icons.checkbox(state.require_unlock()),
            Style::default().fg(theme::FOREGROUND),
        ),
        Span::raw(" Require unlock to switch"),
    ]));

    if let Some(device) = &state.device {
        let device = device.state();
        let mut flags = Vec::new();
        if device.locked {
            flags.push(Span::styled(
                format!("{} locked ", state.ui.icons.locked()),
                Style::default().fg(theme::SWITCHING),
            ));
        }
        flags.push(Span::styled(
            if device.privileged { "privileged " } else { "no access " },
            Style::default().fg(if device.privileged { theme::ENABLED } else { theme::ERROR }),
        ));
        if !device.failing.is_empty() {
            flags.push(Span::styled("next enable fails", Style::default().fg(theme::ERROR)));
        }
        info.push(Line::from(
            [vec![Span::styled("Device: ", label_style)], flags].concat(),
        ));
    }

    let paragraph = Paragraph::new(info).block(
        Block::default()
            .title(" Details ")
            .title_style(Style::default().fg(theme::PANEL).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::PANEL))
            .padding(Padding::new(1, 1, 0, 0)),
    );
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame, state: &AppState, area: Rect) {
    let key = |text: &'static str| Span::styled(text, Style::default().fg(theme::FOREGROUND));
    let hint = |text: &'static str| Span::styled(text, Style::default().fg(theme::DIMMED));

    let mut help_text = vec![Line::from(vec![
        key("q"),
        hint(" quit • "),
        key(state.ui.icons.enter()),
        hint("/"),
        key(state.ui.icons.space()),
        hint(" cycle • "),
        key("l"),
        hint(" long press • "),
        key("v"),
        hint(" show/hide • "),
        key("u"),
        hint(" unlock pref"),
    ])];

    if state.device.is_some() {
        help_text.push(Line::from(vec![
            key("w"),
            hint(" wifi • "),
            key("d"),
            hint(" data • "),
            key("s"),
            hint(" signal • "),
            key("k"),
            hint(" lock • "),
            key("p"),
            hint(" access • "),
            key("f"),
            hint(" fail"),
        ]));
    }

    let help_paragraph = Paragraph::new(help_text)
        .style(Style::default().fg(theme::DIMMED))
        .alignment(Alignment::Center);

    frame.render_widget(help_paragraph, area);
}
