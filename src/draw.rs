use chrono::{DateTime, Local, Utc};
use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};

use crate::app::{App, MenuItem};
use crate::state::app_state::Listing;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use pandascore_api::{Match, PlayerProfile, Team, Tournament};

const HELP_LINES: &[(&str, &str)] = &[
    ("1 2 3 4", "Live / Upcoming / Tournaments / Players"),
    ("j k ↑ ↓", "move selection"),
    ("r", "reload the current tab"),
    ("/", "search the current list; Enter to finish, Esc to clear"),
    ("Enter", "on Players, 2+ characters also searches PandaScore"),
    ("f", "toggle full screen"),
    ("\"", "toggle log pane"),
    ("?  Esc", "open / close help"),
    ("q", "quit"),
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
            draw_search_bar(f, layout.search, app);
        }

        match app.state.active_tab {
            MenuItem::Live => draw_matches(f, layout.main, app, &app.state.live, "Live"),
            MenuItem::Upcoming => draw_matches(f, layout.main, app, &app.state.upcoming, "Upcoming"),
            MenuItem::Tournaments => draw_tournaments(f, layout.main, app),
            MenuItem::Players => draw_players(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if app.state.show_logs {
            draw_logs(f, layout.logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        error!("failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = MenuItem::TABS
        .iter()
        .position(|tab| *tab == app.state.active_tab)
        .unwrap_or_else(|| {
            MenuItem::TABS
                .iter()
                .position(|tab| *tab == app.state.previous_tab)
                .unwrap_or(0)
        });

    let titles: Vec<Line> = MenuItem::TABS.iter().map(|t| Line::from(t.title())).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_search_bar(f: &mut Frame, area: Rect, app: &App) {
    let search = &app.state.search;
    let line = if search.composing {
        Line::from(vec![
            Span::styled(" / ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled(format!("{}_", search.query), Style::default().fg(Color::Yellow)),
        ])
    } else if let Some(err) = app.state.last_error.as_deref() {
        Line::from(Span::styled(format!(" {err}"), Style::default().fg(Color::Red)))
    } else if !search.query.is_empty() {
        Line::from(vec![
            Span::styled(" filter: ", Style::default().fg(Color::DarkGray)),
            Span::styled(search.query.as_str(), Style::default().fg(Color::White)),
            Span::styled("  (Esc to clear)", Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(Span::styled(
            " / search  r reload  j/k move",
            Style::default().fg(Color::DarkGray),
        ))
    };
    f.render_widget(Paragraph::new(line), area);
}

fn pane_title<T>(name: &str, listing: &Listing<T>, shown: usize) -> String {
    match listing.updated_at.as_deref() {
        Some(at) => format!(" {name} ({shown}) · {at} "),
        None => format!(" {name} "),
    }
}

/// Message shown in place of an empty list.
fn empty_message<T>(app: &App, listing: &Listing<T>, what: &str) -> String {
    if !listing.loaded {
        return match app.state.last_error.as_deref() {
            Some(err) => format!("Load failed:\n{err}"),
            None => format!("Loading {what}..."),
        };
    }
    match app.state.query() {
        "" => format!("No {what} right now"),
        q => format!("No {what} matching \"{q}\""),
    }
}

/// First row to render so that `selected` stays inside a window of `height` rows.
fn scroll_start(selected: usize, height: usize) -> usize {
    if height == 0 { 0 } else { selected.saturating_sub(height - 1) }
}

fn list_lines(rows: Vec<String>, selected: usize, height: usize) -> Vec<Line<'static>> {
    let start = scroll_start(selected, height);
    rows.into_iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(idx, row)| {
            if idx == selected {
                Line::from(Span::styled(
                    format!("> {row}"),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  {row}"))
            }
        })
        .collect()
}

fn draw_list(f: &mut Frame, area: Rect, title: String, rows: Vec<String>, selected: usize) {
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let selected = selected.min(rows.len().saturating_sub(1));
    f.render_widget(Paragraph::new(list_lines(rows, selected, inner.height as usize)), inner);
}

fn draw_placeholder(f: &mut Frame, area: Rect, title: String, msg: &str) {
    let block = default_border(Color::DarkGray).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg.to_string())
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.with_timezone(&Local).format("%a %m/%d %H:%M").to_string())
        .unwrap_or_else(|| "TBD".to_string())
}

// ---------------------------------------------------------------------------
// Matches (Live and Upcoming)
// ---------------------------------------------------------------------------

fn draw_matches(f: &mut Frame, area: Rect, app: &App, listing: &Listing<Match>, name: &str) {
    let query = app.state.query();
    let visible = listing.visible(query);
    let title = pane_title(name, listing, visible.len());

    if visible.is_empty() {
        let what = format!("{} matches", name.to_lowercase());
        draw_placeholder(f, area, title, &empty_message(app, listing, &what));
        return;
    }

    let [list_area, detail_area] = LayoutAreas::list_and_detail(area);
    let rows = visible.iter().map(|m| match_row(m)).collect();
    draw_list(f, list_area, title, rows, listing.selected);

    if let Some(selected) = app.state.selected_match() {
        draw_match_detail(f, detail_area, selected);
    }
}

fn match_row(m: &Match) -> String {
    let league = m
        .league
        .as_ref()
        .map(|l| format!("[{}] ", l.name))
        .unwrap_or_default();
    let when = m.begin_at.or(m.scheduled_at).map(|t| t.with_timezone(&Local).format("%H:%M").to_string());
    match when {
        Some(when) => format!("{league}{}  {when}", m.matchup_label()),
        None => format!("{league}{}", m.matchup_label()),
    }
}

fn draw_match_detail(f: &mut Frame, area: Rect, m: &Match) {
    let block = default_border(Color::White).title(format!(" {} ", m.name));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![
        Line::from(Span::styled(
            m.matchup_label(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "{}  |  {}",
                m.league.as_ref().map(|l| l.name.as_str()).unwrap_or("Unknown league"),
                format_time(m.begin_at.or(m.scheduled_at)),
            ),
            Style::default().fg(Color::Gray),
        )),
    ];

    if m.opponents.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Teams TBD", Style::default().fg(Color::DarkGray))));
    }

    for entry in &m.opponents {
        lines.push(Line::from(""));
        match entry.opponent.as_ref() {
            Some(team) => lines.extend(team_lines(team)),
            None => lines.push(Line::from(Span::styled("TBD", Style::default().fg(Color::DarkGray)))),
        }
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn team_lines(team: &Team) -> Vec<Line<'static>> {
    let mut header = vec![Span::styled(
        team.name.clone(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    if !team.acronym.is_empty() {
        header.push(Span::raw(format!(" ({})", team.acronym)));
    }
    if !team.location.is_empty() {
        header.push(Span::styled(format!("  {}", team.location), Style::default().fg(Color::DarkGray)));
    }

    let mut lines = vec![Line::from(header)];
    let roster = team.roster_by_role();
    if roster.is_empty() {
        lines.push(Line::from(Span::styled(
            "  roster unavailable",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for player in roster {
        let role = if player.role.is_empty() { "-" } else { player.role.as_str() };
        let mut spans = vec![
            Span::styled(format!("  {role:<4} "), Style::default().fg(Color::Gray)),
            Span::raw(player.name.clone()),
        ];
        if let Some(full) = player.full_name() {
            spans.push(Span::styled(format!("  {full}"), Style::default().fg(Color::DarkGray)));
        }
        lines.push(Line::from(spans));
    }
    lines
}

// ---------------------------------------------------------------------------
// Tournaments
// ---------------------------------------------------------------------------

fn draw_tournaments(f: &mut Frame, area: Rect, app: &App) {
    let listing = &app.state.tournaments;
    let query = app.state.query();
    let visible = listing.visible(query);
    let title = pane_title("Tournaments", listing, visible.len());

    if visible.is_empty() {
        draw_placeholder(f, area, title, &empty_message(app, listing, "running tournaments"));
        return;
    }

    let [list_area, detail_area] = LayoutAreas::list_and_detail(area);
    let rows = visible.iter().map(|t| tournament_row(t)).collect();
    draw_list(f, list_area, title, rows, listing.selected);

    if let Some(selected) = listing.selected(query) {
        draw_tournament_detail(f, detail_area, selected);
    }
}

fn tournament_row(t: &Tournament) -> String {
    match t.league.as_ref() {
        Some(league) => format!("{}  {}", league.name, t.name),
        None => t.name.clone(),
    }
}

fn draw_tournament_detail(f: &mut Frame, area: Rect, t: &Tournament) {
    let block = default_border(Color::White).title(format!(" {} ", t.name));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let serie = if t.serie.full_name.is_empty() { &t.serie.name } else { &t.serie.full_name };
    let lines = vec![
        Line::from(vec![
            Span::styled("League  ", Style::default().fg(Color::Gray)),
            Span::raw(t.league.as_ref().map(|l| l.name.clone()).unwrap_or_default()),
        ]),
        Line::from(vec![
            Span::styled("Serie   ", Style::default().fg(Color::Gray)),
            Span::raw(serie.clone()),
        ]),
        Line::from(vec![
            Span::styled("Starts  ", Style::default().fg(Color::Gray)),
            Span::raw(format_time(t.begin_at)),
        ]),
        Line::from(vec![
            Span::styled("Ends    ", Style::default().fg(Color::Gray)),
            Span::raw(format_time(t.end_at)),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

fn draw_players(f: &mut Frame, area: Rect, app: &App) {
    let players = &app.state.players;
    let query = app.state.query();
    let visible = players.visible(query);
    let mut title = pane_title("Players", &players.popular, visible.len());
    if players.searching {
        title = format!(" Players · searching \"{query}\"... ");
    }

    if visible.is_empty() {
        draw_placeholder(f, area, title, &empty_message(app, &players.popular, "players"));
        return;
    }

    let [list_area, detail_area] = LayoutAreas::list_and_detail(area);
    let rows = visible.iter().map(|p| player_row(p)).collect();
    draw_list(f, list_area, title, rows, players.popular.selected);

    if let Some(selected) = players.selected(query) {
        draw_player_detail(f, detail_area, selected);
    }
}

fn player_row(p: &PlayerProfile) -> String {
    match p.current_team.as_ref() {
        Some(team) if !team.acronym.is_empty() => format!("{} ({})", p.player.name, team.acronym),
        Some(team) => format!("{} ({})", p.player.name, team.name),
        None => p.player.name.clone(),
    }
}

fn draw_player_detail(f: &mut Frame, area: Rect, p: &PlayerProfile) {
    let block = default_border(Color::White).title(format!(" {} ", p.player.name));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, Style::default().fg(Color::Gray)),
            Span::raw(if value.is_empty() { "-".to_string() } else { value }),
        ])
    };
    let lines = vec![
        field("Name      ", p.player.full_name().unwrap_or_default()),
        field("Role      ", p.player.role.clone()),
        field("Team      ", p.current_team.as_ref().map(|t| t.name.clone()).unwrap_or_default()),
        field("Hometown  ", p.hometown.clone()),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

// ---------------------------------------------------------------------------
// Help, logs, spinner
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = HELP_LINES
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{keys:>10}  "), Style::default().fg(Color::Yellow)),
                Span::raw(*what),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = tui_logger::TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;
    use crate::state::app_state::AppState;
    use pandascore_api::{OpponentEntry, Player};
    use tui::backend::TestBackend;

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        draw(&mut terminal, app, LoadingState::default());
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app() -> App {
        App { settings: AppSettings::default(), state: AppState::new() }
    }

    fn player(id: u64, name: &str, role: &str) -> Player {
        Player { id, name: name.into(), role: role.into(), ..Default::default() }
    }

    #[test]
    fn scroll_start_keeps_selection_visible() {
        assert_eq!(scroll_start(0, 5), 0);
        assert_eq!(scroll_start(4, 5), 0);
        assert_eq!(scroll_start(7, 5), 3);
        assert_eq!(scroll_start(3, 0), 0);
    }

    #[test]
    fn match_detail_lists_roster_in_role_order() {
        let mut app = app();
        let t1 = Team {
            id: Some(1),
            name: "T1".into(),
            players: vec![player(2, "Keria", "sup"), player(1, "Zeus", "top")],
            ..Default::default()
        };
        let gen_g = Team { id: Some(2), name: "Gen.G".into(), ..Default::default() };
        app.on_live_loaded(vec![Match {
            id: 9,
            name: "Final".into(),
            opponents: vec![
                OpponentEntry { opponent: Some(t1) },
                OpponentEntry { opponent: Some(gen_g) },
            ],
            ..Default::default()
        }]);

        let screen = render(&mut app);
        let zeus = screen.find("Zeus").expect("top laner rendered");
        let keria = screen.find("Keria").expect("support rendered");
        assert!(zeus < keria);
        assert!(screen.contains("roster unavailable"));
    }

    #[test]
    fn unloaded_tab_shows_error_in_place() {
        let mut app = app();
        app.update_tab(MenuItem::Tournaments);
        app.on_error("PandaScore API error 503".into());
        let screen = render(&mut app);
        assert!(screen.contains("Load failed"));
    }

    #[test]
    fn empty_filter_result_names_the_query() {
        let mut app = app();
        app.update_tab(MenuItem::Players);
        app.on_players_loaded(Vec::new());
        app.start_search();
        for c in "zz".chars() {
            app.push_search_char(c);
        }
        let screen = render(&mut app);
        assert!(screen.contains("No players matching \"zz\""));
    }
}
