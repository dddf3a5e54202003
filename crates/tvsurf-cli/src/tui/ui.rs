//! TUI rendering logic for the channel surfer.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Margin, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use super::state::NavigationController;

/// Width of the slide-out channel list.
const CHANNEL_LIST_WIDTH: u16 = 36;

/// Width of the slide-in EPG panel.
const EPG_PANEL_WIDTH: u16 = 42;

/// Terminal rows per channel row (name + program info).
const ROWS_PER_CHANNEL: u16 = 2;

/// Where the channel list was drawn, for pointer hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelListLayout {
    /// Outer area including borders.
    pub area: Rect,
    /// Index of the first visible channel.
    pub offset: usize,
}

impl ChannelListLayout {
    /// Whether the pointer is over the panel.
    #[must_use]
    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.area.contains(Position::new(column, row))
    }

    /// Channel index under the pointer, if it is over a row.
    ///
    /// The index may be past the last channel when the list does not fill the panel.
    #[must_use]
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let inner = self.area.inner(Margin::new(1, 1));
        if !inner.contains(Position::new(column, row)) {
            return None;
        }
        let line = row.saturating_sub(inner.y) / ROWS_PER_CHANNEL;
        Some(self.offset.saturating_add(usize::from(line)))
    }
}

/// Draws the surfer UI. Returns the channel list layout while the list is shown.
#[allow(clippy::indexing_slicing)]
pub fn draw<P>(frame: &mut Frame, controller: &NavigationController<P>) -> Option<ChannelListLayout> {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // player
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_player(frame, chunks[0], controller);
    draw_footer(frame, chunks[1]);

    let list_layout = controller
        .channel_list_visible()
        .then(|| draw_channel_list(frame, chunks[0], controller));

    if controller.epg_visible() {
        draw_epg(frame, chunks[0], controller);
    }

    list_layout
}

/// Draws the "now playing" backdrop.
fn draw_player<P>(frame: &mut Frame, area: Rect, controller: &NavigationController<P>) {
    let lines = controller.playing().map_or_else(
        || {
            vec![Line::from(Span::styled(
                "Nothing playing. Press Enter to pick a channel.",
                Style::default().fg(Color::DarkGray),
            ))]
        },
        |channel| {
            let mut lines = vec![
                Line::from(Span::styled(
                    channel.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    channel.src.clone(),
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            if !channel.program_info.is_empty() {
                lines.push(Line::from(format!("Now: {}", channel.program_info)));
            }
            lines
        },
    );

    let player = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" tvsurf "));
    frame.render_widget(player, area);
}

/// Draws the channel list sliding out from the left.
fn draw_channel_list<P>(
    frame: &mut Frame,
    area: Rect,
    controller: &NavigationController<P>,
) -> ChannelListLayout {
    let area = Rect {
        width: area.width.min(CHANNEL_LIST_WIDTH),
        ..area
    };

    let items: Vec<ListItem> = controller
        .channels()
        .iter()
        .enumerate()
        .map(|(i, channel)| {
            let selected = controller.is_selected(i);
            let marker = if selected { "\u{25b8} " } else { "  " };
            let name_style = if selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            ListItem::new(vec![
                Line::from(vec![
                    Span::raw(marker),
                    Span::styled(channel.name.clone(), name_style),
                ]),
                Line::from(Span::styled(
                    format!("  {}", channel.program_info),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Channels "),
    );

    let mut list_state = ListState::default().with_selected(Some(controller.current_index()));
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut list_state);

    ChannelListLayout {
        area,
        offset: list_state.offset(),
    }
}

/// Draws the EPG panel sliding in from the right.
fn draw_epg<P>(frame: &mut Frame, area: Rect, controller: &NavigationController<P>) {
    let width = area.width.min(EPG_PANEL_WIDTH);
    let area = Rect {
        x: area.right().saturating_sub(width),
        width,
        ..area
    };

    let title = controller
        .epg_channel()
        .map_or_else(|| String::from(" Guide "), |ch| format!(" Guide: {} ", ch.name));

    let lines: Vec<Line> = if controller.epg_lines().is_empty() {
        vec![Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        controller
            .epg_lines()
            .iter()
            .map(|line| Line::from(line.as_str()))
            .collect()
    };

    let epg = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(epg, area);
}

/// Draws the footer with key hints.
fn draw_footer(frame: &mut Frame, area: Rect) {
    let help_text = "Enter: channels / tune  \u{2191}\u{2193}: move  \u{2192}: guide  \u{2190}: close guide  q: quit";

    let footer = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
