//! Dashboard application
//!
//! Renders progress and open quests, and maps keys to tracker actions.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
};

use crate::progression::Rank;
use crate::quests::{Quest, QuestFilter, QuestType};
use crate::tracker::{ProgressSummary, Tracker};

/// XP granted by the manual award key
pub const MANUAL_AWARD_XP: i64 = 200;

/// Truncate a string to fit within max_len characters, adding "…" if truncated
fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        name.to_string()
    } else if max_len <= 1 {
        "…".to_string()
    } else {
        let truncated: String = name.chars().take(max_len - 1).collect();
        format!("{}…", truncated)
    }
}

/// Fraction of the current level completed, clamped to [0, 1]
pub fn progress_ratio(progress: &ProgressSummary) -> f64 {
    if progress.xp_for_next_level == 0 {
        return 0.0;
    }
    (progress.xp_into_level as f64 / progress.xp_for_next_level as f64).clamp(0.0, 1.0)
}

fn quest_color(quest_type: QuestType) -> Color {
    match quest_type {
        QuestType::Main => Color::Magenta,
        QuestType::Side => Color::Cyan,
        QuestType::Daily => Color::Yellow,
    }
}

/// Dashboard state
pub struct Dashboard {
    progress: Option<ProgressSummary>,
    /// Next rank to unlock, if any remain
    next_rank: Option<Rank>,
    quests: Vec<Quest>,
    /// Selected row in the quest list
    cursor: usize,
    /// Last action result shown in the footer
    status: String,
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            progress: None,
            next_rank: None,
            quests: Vec::new(),
            cursor: 0,
            status: "Ready".to_string(),
        }
    }

    pub fn progress(&self) -> Option<&ProgressSummary> {
        self.progress.as_ref()
    }

    pub fn next_rank(&self) -> Option<&Rank> {
        self.next_rank.as_ref()
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Reload progress and open quests from the tracker
    pub fn refresh(&mut self, tracker: &Tracker) -> Result<()> {
        let progress = tracker.progress()?;
        self.next_rank = tracker.config().ranks.next_rank(progress.level).cloned();
        self.progress = Some(progress);
        let filter = QuestFilter { completed: Some(false), ..Default::default() };
        self.quests = tracker.list_quests(&filter);
        if self.cursor >= self.quests.len() {
            self.cursor = self.quests.len().saturating_sub(1);
        }
        Ok(())
    }

    /// Handle a key press; returns true when the dashboard should quit
    pub fn handle_input(&mut self, key: KeyEvent, tracker: &Tracker) -> Result<bool> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(true);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char('j') | KeyCode::Down => {
                if self.cursor + 1 < self.quests.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Char('r') => {
                self.refresh(tracker)?;
                self.status = "Refreshed".to_string();
            }
            KeyCode::Char('a') => {
                tracker.award_xp(MANUAL_AWARD_XP, "Manual award", None, None)?;
                self.refresh(tracker)?;
                self.status = format!("+{} XP awarded", MANUAL_AWARD_XP);
            }
            KeyCode::Char('c') | KeyCode::Enter => self.complete_selected(tracker)?,
            _ => {}
        }
        Ok(false)
    }

    fn complete_selected(&mut self, tracker: &Tracker) -> Result<()> {
        let Some(quest) = self.quests.get(self.cursor) else {
            self.status = "No quest selected".to_string();
            return Ok(());
        };
        let title = quest.title.clone();

        match tracker.complete_quest(quest.id) {
            Ok(receipt) => {
                self.status = format!("Completed \"{}\" ({:+} XP)", title, receipt.xp_awarded);
            }
            Err(e) => {
                log::warn!("Could not complete quest: {}", e);
                self.status = e.to_string();
            }
        }
        self.refresh(tracker)
    }

    /// Draw the whole dashboard
    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);
        self.render_progress(frame, chunks[1]);
        self.render_quests(frame, chunks[2]);
        self.render_footer(frame, chunks[3]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let header = Paragraph::new(Line::from(vec![
            Span::styled("TITAN PROTOCOL", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled("  quest tracker", Style::default().fg(Color::DarkGray)),
        ]))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
        frame.render_widget(header, area);
    }

    fn render_progress(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Rank • Level ")
            .border_style(Style::default().fg(Color::DarkGray));

        let Some(progress) = &self.progress else {
            frame.render_widget(Paragraph::new("Loading…").block(block), area);
            return;
        };

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let mut summary = vec![
            Span::styled(progress.rank.clone(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" • "),
            Span::styled(format!("Lv.{}", progress.level), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled(format!("   {} XP total", progress.total_xp), Style::default().fg(Color::DarkGray)),
        ];
        if let Some(next) = &self.next_rank {
            summary.push(Span::styled(
                format!("   next: {} at Lv.{}", next.name, next.min_level),
                Style::default().fg(Color::DarkGray),
            ));
        }
        let summary = Line::from(summary);
        frame.render_widget(Paragraph::new(summary), rows[0]);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
            .ratio(progress_ratio(progress))
            .label(format!("{}/{}", progress.xp_into_level, progress.xp_for_next_level));
        frame.render_widget(gauge, rows[1]);
    }

    fn render_quests(&self, frame: &mut Frame, area: Rect) {
        let title_width = (area.width as usize).saturating_sub(24).max(8);

        let items: Vec<ListItem> = self
            .quests
            .iter()
            .map(|q| {
                let mut spans = vec![
                    Span::styled(format!("[{:<5}] ", q.quest_type.name()), Style::default().fg(quest_color(q.quest_type))),
                    Span::raw(truncate_name(&q.title, title_width)),
                ];
                if q.xp_reward != 0 {
                    let color = if q.xp_reward > 0 { Color::Green } else { Color::Red };
                    spans.push(Span::styled(format!("  {:+} XP", q.xp_reward), Style::default().fg(color)));
                }
                if let Some(due) = q.due_date {
                    spans.push(Span::styled(format!("  due {}", due), Style::default().fg(Color::DarkGray)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Quests ({}) ", self.quests.len()))
            .border_style(Style::default().fg(Color::DarkGray));

        if items.is_empty() {
            let empty = Paragraph::new(Span::styled("No open quests", Style::default().fg(Color::DarkGray)))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("▶ ");
        let mut state = ListState::default().with_selected(Some(self.cursor));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let footer = Paragraph::new(Line::from(vec![
            Span::styled("j/k", Style::default().fg(Color::Cyan)),
            Span::raw(" select  "),
            Span::styled("c", Style::default().fg(Color::Cyan)),
            Span::raw(" complete  "),
            Span::styled("a", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" +{} XP  ", MANUAL_AWARD_XP)),
            Span::styled("r", Style::default().fg(Color::Cyan)),
            Span::raw(" refresh  "),
            Span::styled("q", Style::default().fg(Color::Cyan)),
            Span::raw(" quit   "),
            Span::styled(self.status.clone(), Style::default().fg(Color::Yellow)),
        ]))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
        frame.render_widget(footer, area);
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}
