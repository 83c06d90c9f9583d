use crate::app::{App, DELETE_PROMPT};
use crate::event;
use crate::form::{Field, KworkForm};
use crate::task::{Kwork, Status};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;
        if !event::handle_events(app)? {
            return Ok(());
        }
    }
}

pub fn render(f: &mut Frame, app: &App) {
    let banner_height = if app.board.error.is_some() { 1 } else { 0 };
    let [header, banner, body, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(banner_height),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(f.area());

    render_header(f, app, header);
    if let Some(error) = &app.board.error {
        f.render_widget(
            Paragraph::new(format!("Ошибка: {}", error)).style(Style::default().fg(Color::Red)),
            banner,
        );
    }
    render_columns(f, app, body);
    render_footer(f, app, footer);

    if let Some(form) = &app.form {
        render_form(f, form);
    }
    if app.confirm_delete.is_some() {
        render_message(f, " Удаление ", DELETE_PROMPT, "y: да   n: нет", Color::Yellow);
    }
    if let Some(alert) = &app.alert {
        render_message(f, " Внимание ", alert, "любая клавиша", Color::Red);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        "FreelanceBoard",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(at) = app.board.loaded_at {
        spans.push(Span::styled(
            format!("  обновлено {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_columns(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    let groups = app.board.groups();
    for (i, status) in Status::ALL.iter().enumerate() {
        let mut tasks: Vec<&Kwork> = groups.get(*status).to_vec();
        let mut selected = app.board.selected_task;

        // show the grabbed card at its pending slot
        let grab = app.grab.filter(|g| g.group == *status);
        if let (Some(grab), Some(from)) = (grab, app.grab_source()) {
            let moved = tasks.remove(from);
            tasks.insert(grab.to.min(tasks.len()), moved);
            selected = grab.to;
        }

        let items: Vec<ListItem> = tasks.iter().map(|t| card(t)).collect();
        let is_active = app.board.selected_status == i;
        let highlight = if app.grab.is_some() && is_active {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().add_modifier(Modifier::REVERSED)
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!(" {} ({}) ", status.title(), tasks.len()))
                    .borders(Borders::ALL)
                    .border_style(if is_active {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(highlight);

        let mut state = ListState::default();
        if is_active && !tasks.is_empty() {
            state.select(Some(selected));
        }
        f.render_stateful_widget(list, chunks[i], &mut state);
    }
}

fn card(task: &Kwork) -> ListItem<'static> {
    let mut title = vec![Span::styled(
        task.title.clone(),
        Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED),
    )];
    if task.favorite {
        title.push(Span::styled(" ★", Style::default().fg(Color::Yellow)));
    }

    let mut lines = vec![
        Line::from(title),
        Line::from(Span::styled(
            task.link.clone(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(task.description.clone()),
    ];
    if task.status() == Status::Rejected {
        lines.push(Line::from(Span::styled(
            format!("Причина отказа: {}", task.reason),
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(
        Line::from(Span::styled(
            format!("{} ₽", task.price),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Right),
    );
    lines.push(Line::from(""));
    ListItem::new(Text::from(lines))
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let hint = if app.grab.is_some() {
        "↑/↓ место  Enter положить  Esc отмена"
    } else {
        "←/→ колонка  ↑/↓ карточка  n новая  e правка  d удалить  f избранное  Space перенести  r обновить  q выход"
    };
    f.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_form(f: &mut Frame, form: &KworkForm) {
    let area = centered(f.area(), 64, Field::ALL.len() as u16 + 6);
    f.render_widget(Clear, area);

    let mut lines = Vec::new();
    for field in Field::ALL {
        let focused = form.focus == field;
        let value = form.value(field);
        let mut spans = vec![Span::styled(
            format!("{:<28}", field.placeholder()),
            Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }),
        )];
        spans.push(Span::raw(value.to_string()));
        if focused {
            spans.push(Span::styled("█", Style::default().fg(Color::Cyan)));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Статус: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            form.status.title(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        "Tab поле  Enter сохранить  Esc закрыть",
        Style::default().fg(Color::DarkGray),
    )));

    let dialog = Paragraph::new(lines).block(
        Block::default()
            .title(format!(" {} ", form.title_text()))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(dialog, area);
}

fn render_message(f: &mut Frame, title: &str, message: &str, hint: &str, color: Color) {
    let area = centered(f.area(), 50, 6);
    f.render_widget(Clear, area);

    let body = Paragraph::new(vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(title.to_string())
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    f.render_widget(body, area);
}
