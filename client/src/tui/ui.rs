use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Paragraph, Row, Table, TableState},
};
use tokio::runtime::Runtime;

use super::app::{
    ADD_FIELDS, App, InputMode, LoginApp, LoginField, LoginStep, PendingAction, Screen,
};
use crate::auth::{AuthError, AuthFlow};
use crate::export;
use crate::form::{COLORS, format_currency};
use crate::stat::bar_heights;
use crate::stat::datatype::CategoryType;
use crate::stat::download_ledger_from_server;

pub fn run_tui(mut app: App) -> anyhow::Result<()> {
    let rt = Runtime::new()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        if app.needs_refresh {
            app.needs_refresh = false;
            refresh(&mut app, &rt);
        }

        terminal.draw(|f| ui(f, &app))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                handle_key_event(&mut app, key, &rt);
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

fn refresh(app: &mut App, rt: &Runtime) {
    if app.login.is_some() {
        return;
    }
    let token = app.token();
    match app.current_screen {
        Screen::Statistics => {
            match rt.block_on(app.api.statistics(&token, app.stats_type, app.stats_month)) {
                Ok(report) => app.stats = Some(report),
                Err(e) => {
                    app.stats = None;
                    app.alert_error("Failed to load statistics", e);
                }
            }
        }
        _ => match rt.block_on(download_ledger_from_server(&app.api, &token, app.selected_month)) {
            Ok(ledger) => app.ledger = ledger,
            Err(e) => app.alert_error("Failed to load data", e),
        },
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent, rt: &Runtime) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if app.login.is_some() {
        handle_key_login(app, key, rt);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_key_normal(app, key),
        InputMode::EditingTransaction => handle_key_add(app, key, rt),
        InputMode::ChoosingCategory => handle_key_choose_category(app, key),
        InputMode::CreatingCategory => handle_key_create_category(app, key, rt),
        InputMode::Confirming => handle_key_confirm(app, key, rt),
    }
}

fn handle_key_login(app: &mut App, key: KeyEvent, rt: &Runtime) {
    use KeyCode::*;
    match key.code {
        Esc => {
            app.should_quit = true;
            return;
        }
        Enter => {
            submit_login(app, rt);
            return;
        }
        _ => {}
    }
    let Some(login) = app.login.as_mut() else {
        return;
    };

    match key.code {
        Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => login.switch_step(),
        Tab | Down => login.next_field(),
        Backspace => login.focused().backspace(),
        Left => login.focused().left(),
        Right => login.focused().right(),
        Char(c) => login.focused().push(c),
        _ => {}
    }
}

fn submit_login(app: &mut App, rt: &Runtime) {
    let Some(login) = app.login.as_ref() else {
        return;
    };
    let step = login.step;
    let email = login.email.value.clone();
    let password = login.password.value.clone();
    let confirm = login.confirm.value.clone();

    let mut flow = AuthFlow::new(&app.api, &mut app.session);
    let result = match step {
        LoginStep::Login => rt.block_on(flow.sign_in(&email, &password)),
        LoginStep::Register => rt.block_on(flow.sign_up(&email, &password, &confirm)),
    };

    match (step, result) {
        (LoginStep::Login, Ok(())) => {
            app.login = None;
            app.current_screen = Screen::Home;
            app.needs_refresh = true;
            app.alert_success("Signed in");
        }
        (LoginStep::Register, Ok(())) => {
            if let Some(login) = app.login.as_mut() {
                login.switch_step();
                login.email.set(email);
                login.info_message = Some("Account created, please sign in".to_string());
            }
        }
        (step, Err(e)) => {
            tracing::error!(error = %e, "authentication failed");
            let msg = match (&e, step) {
                (AuthError::Invalid(v), _) => v.to_string(),
                (_, LoginStep::Login) => {
                    "Sign-in failed. Please check your email and password.".to_string()
                }
                (_, LoginStep::Register) => format!("Sign-up failed: {e}"),
            };
            if let Some(login) = app.login.as_mut() {
                login.info_message = None;
                login.error_message = Some(msg);
            }
        }
    }
}

fn handle_key_normal(app: &mut App, key: KeyEvent) {
    use KeyCode::*;

    match key.code {
        Char('q') => app.should_quit = true,

        Tab => app.next_screen(),
        BackTab => app.prev_screen(),

        Left => app.shift_month(-1),
        Right => app.shift_month(1),

        Up => app.move_selection(true),
        Down => app.move_selection(false),

        Char('r') => app.needs_refresh = true,
        Char('c') => app.clear_alerts(),

        Char('x') if app.current_screen == Screen::Home => {
            match export::export_month(&app.ledger, app.selected_month, &app.export_dir) {
                Ok(path) => app.alert_success(format!("Exported to {}", path.display())),
                Err(e) => app.alert_error("Export failed", e),
            }
        }

        Enter | Char('e') if app.current_screen == Screen::Add => {
            app.input_mode = InputMode::EditingTransaction;
        }

        Char('t') if app.current_screen == Screen::Statistics => app.toggle_stats_type(),
        Char('D') if app.current_screen == Screen::Statistics => {
            app.request_confirm(PendingAction::DeleteStatistics)
        }

        Char('a') if app.current_screen == Screen::Settings => {
            app.category_form = Default::default();
            app.category_form_field = 0;
            app.input_mode = InputMode::CreatingCategory;
        }
        Char('d') if app.current_screen == Screen::Settings => {
            let selected = app
                .settings_categories()
                .get(app.selected_category_idx)
                .map(|c| (c.id.clone(), c.name.clone()));
            if let Some((id, name)) = selected {
                app.request_confirm(PendingAction::DeleteCategory { id, name });
            }
        }
        Char('o') if app.current_screen == Screen::Settings => {
            app.request_confirm(PendingAction::SignOut)
        }

        _ => {}
    }
}

fn handle_key_add(app: &mut App, key: KeyEvent, rt: &Runtime) {
    use KeyCode::*;

    match key.code {
        Esc => app.input_mode = InputMode::Normal,
        Tab | Down => app.add_field_idx = (app.add_field_idx + 1) % ADD_FIELDS,
        BackTab | Up => app.add_field_idx = (app.add_field_idx + ADD_FIELDS - 1) % ADD_FIELDS,
        Enter if app.add_field_idx == 0 => {
            app.category_choice_idx = 0;
            app.input_mode = InputMode::ChoosingCategory;
        }
        Enter => submit_new_transaction(app, rt),
        Backspace => match app.add_field_idx {
            1 => app.tx_form.erase_amount(),
            2 => app.tx_form.description.backspace(),
            3 => app.tx_form.date.backspace(),
            _ => {}
        },
        Char(c) => match app.add_field_idx {
            1 => app.tx_form.type_amount(c),
            2 => app.tx_form.description.push(c),
            3 => app.tx_form.date.push(c),
            _ => {}
        },
        _ => {}
    }
}

fn submit_new_transaction(app: &mut App, rt: &Runtime) {
    let req = match app.tx_form.validate() {
        Ok(req) => req,
        Err(e) => {
            app.alert_error("Error", e);
            return;
        }
    };
    let token = app.token();
    match rt.block_on(app.api.create_transaction(&token, &req)) {
        Ok(()) => {
            app.tx_form.reset(Local::now().date_naive());
            app.add_field_idx = 0;
            app.input_mode = InputMode::Normal;
            app.needs_refresh = true;
            app.alert_success("Transaction saved");
        }
        Err(e) => app.alert_error("Failed to save transaction", e),
    }
}

fn handle_key_choose_category(app: &mut App, key: KeyEvent) {
    use KeyCode::*;
    let len = app.picker_categories().len();

    match key.code {
        Esc => app.input_mode = InputMode::EditingTransaction,
        Up => app.category_choice_idx = app.category_choice_idx.saturating_sub(1),
        Down => {
            if app.category_choice_idx + 1 < len {
                app.category_choice_idx += 1;
            }
        }
        Enter => {
            app.choose_category();
            app.add_field_idx = 1;
        }
        _ => {}
    }
}

fn handle_key_create_category(app: &mut App, key: KeyEvent, rt: &Runtime) {
    use KeyCode::*;
    let field = app.category_form_field;

    match key.code {
        Esc => app.input_mode = InputMode::Normal,
        Tab | Down => app.category_form_field = (field + 1) % 3,
        BackTab | Up => app.category_form_field = (field + 2) % 3,
        Enter => submit_new_category(app, rt),
        Left | Right | Char(' ') if field == 1 => {
            app.category_form.category_type = app.category_form.category_type.toggle();
        }
        Left if field == 2 => app.category_form.prev_color(),
        Right | Char(' ') if field == 2 => app.category_form.next_color(),
        Backspace if field == 0 => app.category_form.name.backspace(),
        Char(c) if field == 0 => app.category_form.name.push(c),
        _ => {}
    }
}

fn submit_new_category(app: &mut App, rt: &Runtime) {
    let req = match app.category_form.validate() {
        Ok(req) => req,
        Err(e) => {
            app.alert_error("Error", e);
            return;
        }
    };
    let token = app.token();
    match rt.block_on(app.api.create_category(&token, &req)) {
        Ok(()) => {
            app.category_form = Default::default();
            app.input_mode = InputMode::Normal;
            app.needs_refresh = true;
            app.alert_success("Category added");
        }
        Err(e) => app.alert_error("Failed to add category", e),
    }
}

fn handle_key_confirm(app: &mut App, key: KeyEvent, rt: &Runtime) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.input_mode = InputMode::Normal;
            if let Some(action) = app.pending.take() {
                perform_pending(app, action, rt);
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending = None;
            app.input_mode = InputMode::Normal;
        }
        _ => {}
    }
}

fn perform_pending(app: &mut App, action: PendingAction, rt: &Runtime) {
    let token = app.token();
    match action {
        PendingAction::DeleteCategory { id, name } => {
            match rt.block_on(app.api.delete_category(&token, &id)) {
                Ok(()) => {
                    app.ledger.category.retain(|c| c.id != id);
                    app.selected_category_idx = 0;
                    app.alert_success(format!("Category '{name}' deleted"));
                }
                Err(e) => app.alert_error("Failed to delete category", e),
            }
        }
        PendingAction::DeleteStatistics => {
            match rt.block_on(app.api.delete_statistics(&token, app.stats_type, app.stats_month)) {
                Ok(()) => {
                    app.needs_refresh = true;
                    app.alert_success("Statistics deleted");
                }
                Err(e) => app.alert_error("Failed to delete statistics", e),
            }
        }
        PendingAction::SignOut => {
            let mut flow = AuthFlow::new(&app.api, &mut app.session);
            if let Err(e) = flow.sign_out() {
                tracing::error!(error = %e, "sign-out failed");
            }
            app.reset_to_login();
        }
    }
}

fn selected_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

/// Selection clamped to the row count; ratatui scrolls the table to keep it visible.
fn table_state(selected: usize, len: usize) -> TableState {
    let selected = (len > 0).then(|| selected.min(len - 1));
    TableState::default().with_selected(selected)
}

fn hex_color(hex: &str) -> Color {
    hex.parse::<Color>().unwrap_or(Color::Gray)
}

fn money(app: &App, amount: rust_decimal::Decimal) -> String {
    format_currency(amount, &app.config.currency_symbol)
}

fn ui(f: &mut Frame<'_>, app: &App) {
    let area = f.area();
    if let Some(login) = &app.login {
        draw_login(f, area, login);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // main
            Constraint::Length(3), // footer
        ])
        .split(area);

    let screen_name = match app.current_screen {
        Screen::Home => "Home",
        Screen::Add => "Add",
        Screen::Statistics => "Statistics",
        Screen::Settings => "Settings",
    };
    let tabs: Vec<Span> = [Screen::Home, Screen::Add, Screen::Statistics, Screen::Settings]
        .iter()
        .zip(["Home", "Add", "Statistics", "Settings"])
        .flat_map(|(s, name)| {
            let style = if *s == app.current_screen {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            [Span::styled(format!(" {name} "), style), Span::raw(" ")]
        })
        .collect();
    let header = Paragraph::new(Line::from(tabs)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Household Ledger - {screen_name}")),
    );
    f.render_widget(header, chunks[0]);

    match app.current_screen {
        Screen::Home => draw_home(f, chunks[1], app),
        Screen::Add => draw_add(f, chunks[1], app),
        Screen::Statistics => draw_statistics(f, chunks[1], app),
        Screen::Settings => {
            if app.input_mode == InputMode::CreatingCategory {
                draw_create_category(f, chunks[1], app);
            } else {
                draw_settings(f, chunks[1], app);
            }
        }
    }

    let footer_text = if let Some(pending) = &app.pending {
        pending.prompt()
    } else if let Some(ref msg) = app.error_message {
        format!("ERROR: {} | Press 'c' to clear", msg)
    } else if let Some(ref msg) = app.success_message {
        format!("SUCCESS: {} | Press 'c' to clear", msg)
    } else {
        match (app.input_mode, app.current_screen) {
            (InputMode::EditingTransaction, _) => {
                "Tab/↑/↓: field  |  Enter on Category: choose  |  Enter: save  |  Esc: back".to_string()
            }
            (InputMode::ChoosingCategory, _) => "↑/↓: move  |  Enter: select  |  Esc: back".to_string(),
            (InputMode::CreatingCategory, _) => {
                "Tab: field  |  ←/→: change type/color  |  Enter: save  |  Esc: cancel".to_string()
            }
            (_, Screen::Home) => {
                "Tab: screen  |  ←/→: month  |  ↑/↓: move  |  r: refresh  |  x: export  |  q: quit".to_string()
            }
            (_, Screen::Add) => "Enter: edit form  |  Tab: screen  |  q: quit".to_string(),
            (_, Screen::Statistics) => {
                "←/→: month  |  t: income/expense  |  D: delete  |  r: refresh  |  q: quit".to_string()
            }
            (_, Screen::Settings) => {
                "a: add category  |  d: delete category  |  o: sign out  |  q: quit".to_string()
            }
        }
    };
    let footer = Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn draw_login(f: &mut Frame<'_>, area: Rect, login: &LoginApp) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(12),
            Constraint::Min(0),
        ])
        .split(area);
    let mid = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(outer[1]);

    let marker = |field: LoginField| if login.field == field { "> " } else { "  " };
    let mut lines = vec![
        Line::from(format!("{}Email:    {}", marker(LoginField::Email), login.email.rendered())),
        Line::from(format!(
            "{}Password: {}",
            marker(LoginField::Password),
            login.password.rendered()
        )),
    ];
    if login.step == LoginStep::Register {
        lines.push(Line::from(format!(
            "{}Confirm:  {}",
            marker(LoginField::Confirm),
            login.confirm.rendered()
        )));
    }
    lines.push(Line::from(""));
    if let Some(msg) = &login.error_message {
        lines.push(Line::styled(msg.clone(), Style::default().fg(Color::Red)));
    } else if let Some(msg) = &login.info_message {
        lines.push(Line::styled(msg.clone(), Style::default().fg(Color::Green)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(
        "Tab: next field  |  Enter: submit  |  Ctrl+N: switch sign-in/sign-up  |  Esc: quit",
    ));

    let title = match login.step {
        LoginStep::Login => "Household Ledger - Sign in",
        LoginStep::Register => "Household Ledger - Sign up",
    };
    let p = Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(p, mid[1]);
}

fn draw_home(f: &mut Frame<'_>, area: Rect, app: &App) {
    let month = app.selected_month;
    let stats = app.ledger.monthly_stats(month);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Min(0),
        ])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(chunks[0]);
    let card = |title: &str, value: String, color: Color| {
        Paragraph::new(Span::styled(value, Style::default().fg(color)))
            .block(Block::default().title(title.to_string()).borders(Borders::ALL))
    };
    f.render_widget(card("Income", money(app, stats.income), Color::Green), cards[0]);
    f.render_widget(card("Expense", money(app, stats.expense), Color::Red), cards[1]);
    f.render_widget(card("Total", money(app, stats.total), Color::Blue), cards[2]);

    let (income_h, expense_h) = bar_heights(&stats, 150);
    let data = vec![("Income", income_h), ("Expense", expense_h)];
    let chart = BarChart::default()
        .block(
            Block::default()
                .title(format!("Income vs Expense - {month}"))
                .borders(Borders::ALL),
        )
        .bar_width(9)
        .bar_gap(4)
        .max(150)
        .bar_style(Style::default().fg(Color::Cyan))
        .data(data.as_slice());
    f.render_widget(chart, chunks[1]);

    let visible = app.ledger.transactions_in(month);
    let rows = visible.iter().map(|t| {
        let sign = match t.kind() {
            CategoryType::Income => "+",
            CategoryType::Expense => "-",
        };
        let color = t
            .category
            .as_ref()
            .map(|c| hex_color(&c.color))
            .unwrap_or(Color::Gray);
        Row::new(vec![
            Span::raw(t.transaction_date.format("%m/%d").to_string()),
            Span::styled(t.category_name().to_string(), Style::default().fg(color)),
            Span::raw(t.display_description().to_string()),
            Span::raw(format!("{sign}{}", money(app, t.amount))),
        ])
    });
    let widths = [
        Constraint::Length(6),
        Constraint::Length(16),
        Constraint::Min(10),
        Constraint::Length(16),
    ];
    let title = if visible.is_empty() {
        "Recent transactions (none this month)".to_string()
    } else {
        format!("Recent transactions ({})", visible.len())
    };
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Date", "Category", "Description", "Amount"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().title(title).borders(Borders::ALL))
        .row_highlight_style(selected_style());
    let mut state = table_state(app.selected_transaction_idx, visible.len());
    f.render_stateful_widget(table, chunks[2], &mut state);
}

fn draw_add(f: &mut Frame<'_>, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let editing = app.input_mode != InputMode::Normal;
    let marker = |idx: usize| {
        if editing && idx == app.add_field_idx {
            "> "
        } else {
            "  "
        }
    };
    let category = app
        .tx_form
        .category
        .as_ref()
        .map(|c| format!("{} ({})", c.name, c.category_type.label()))
        .unwrap_or_else(|| "Choose a category (Enter)".to_string());
    let text = vec![
        Line::from(format!("{}Category:    {}", marker(0), category)),
        Line::from(format!(
            "{}Amount:      {}",
            marker(1),
            if app.tx_form.amount.is_empty() { "0" } else { &app.tx_form.amount }
        )),
        Line::from(format!(
            "{}Description: {}",
            marker(2),
            app.tx_form.description.rendered()
        )),
        Line::from(format!("{}Date:        {}", marker(3), app.tx_form.date.rendered())),
    ];
    let p = Paragraph::new(text).block(
        Block::default()
            .title("Add transaction (Enter to save, Esc to leave)")
            .borders(Borders::ALL),
    );
    f.render_widget(p, chunks[0]);

    let mut lines: Vec<Line> = Vec::new();
    let mut idx = 0usize;
    for kind in [CategoryType::Income, CategoryType::Expense] {
        let group = app.ledger.categories_of(kind);
        if group.is_empty() {
            continue;
        }
        lines.push(Line::styled(
            kind.label(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        for c in group {
            let mut style = Style::default().fg(hex_color(&c.color));
            if app.input_mode == InputMode::ChoosingCategory && idx == app.category_choice_idx {
                style = style.add_modifier(Modifier::REVERSED);
            }
            lines.push(Line::styled(format!("  ● {}", c.name), style));
            idx += 1;
        }
    }
    if lines.is_empty() {
        lines.push(Line::from("No categories yet. Add them in Settings."));
    }
    let list = Paragraph::new(lines).block(
        Block::default()
            .title("Categories")
            .borders(Borders::ALL),
    );
    f.render_widget(list, chunks[1]);
}

fn draw_statistics(f: &mut Frame<'_>, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let total = app
        .stats
        .as_ref()
        .map(|s| s.total_amount)
        .unwrap_or_default();
    let color = match app.stats_type {
        CategoryType::Income => Color::Green,
        CategoryType::Expense => Color::Red,
    };
    let summary = Paragraph::new(Line::from(vec![
        Span::raw(format!("{}  |  Total {}: ", app.stats_month, app.stats_type.label())),
        Span::styled(money(app, total), Style::default().fg(color)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(summary, chunks[0]);

    let stats = app
        .stats
        .as_ref()
        .map(|s| s.category_stats.as_slice())
        .unwrap_or_default();
    let rows = stats.iter().map(|s| {
        Row::new(vec![
            Span::styled(
                s.category_name.clone().unwrap_or_else(|| "Unknown".to_string()),
                Style::default().fg(hex_color(s.category_color.as_deref().unwrap_or("#000000"))),
            ),
            Span::raw(format!("{}", s.count)),
            Span::raw(format!("{:.1}%", s.percentage)),
            Span::raw(money(app, s.total)),
            Span::raw(s.descriptions.clone().unwrap_or_default()),
        ])
    });
    let widths = [
        Constraint::Length(16),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(16),
        Constraint::Min(10),
    ];
    let title = if stats.is_empty() {
        "By category (no transactions)".to_string()
    } else {
        "By category".to_string()
    };
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Category", "Count", "Share", "Total", "Descriptions"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().title(title).borders(Borders::ALL))
        .row_highlight_style(selected_style());
    let mut state = table_state(app.selected_stat_idx, stats.len());
    f.render_stateful_widget(table, chunks[1], &mut state);
}

fn draw_settings(f: &mut Frame<'_>, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(4)])
        .split(area);

    let categories = app.settings_categories();
    let count = categories.len();
    let rows = categories.into_iter().map(|c| {
        Row::new(vec![
            Span::raw(c.category_type.label()),
            Span::styled(format!("● {}", c.name), Style::default().fg(hex_color(&c.color))),
            Span::raw(c.color.clone()),
        ])
    });
    let widths = [
        Constraint::Length(8),
        Constraint::Min(16),
        Constraint::Length(9),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Type", "Name", "Color"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .title("Categories (a: add, d: delete)")
                .borders(Borders::ALL),
        )
        .row_highlight_style(selected_style());
    let mut state = table_state(app.selected_category_idx, count);
    f.render_stateful_widget(table, chunks[0], &mut state);

    let account = Paragraph::new(vec![
        Line::from(format!("Email:  {}", app.session.email().unwrap_or("-"))),
        Line::from(format!("Server: {}", app.api.base_url())),
    ])
    .block(
        Block::default()
            .title("Account (o: sign out)")
            .borders(Borders::ALL),
    );
    f.render_widget(account, chunks[1]);
}

fn draw_create_category(f: &mut Frame<'_>, area: Rect, app: &App) {
    let form = &app.category_form;
    let marker = |idx: usize| if idx == app.category_form_field { "> " } else { "  " };
    let swatches: Vec<Span> = COLORS
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let mut style = Style::default().fg(hex_color(c));
            if i == form.color_idx {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Span::styled(" ● ", style)
        })
        .collect();
    let mut color_line = vec![Span::raw(format!("{}Color: ", marker(2)))];
    color_line.extend(swatches);

    let text = vec![
        Line::from(format!("{}Name:  {}", marker(0), form.name.rendered())),
        Line::from(format!("{}Type:  {}", marker(1), form.category_type.label())),
        Line::from(color_line),
    ];
    let p = Paragraph::new(text).block(
        Block::default()
            .title("Add category (Enter to save, Esc to cancel)")
            .borders(Borders::ALL),
    );
    f.render_widget(p, area);
}
