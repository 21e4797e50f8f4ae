use crate::config::Config;
use crate::form::{CategoryForm, LineEdit, TransactionForm};
use crate::session::Session;
use crate::stat::datatype::{Category, CategoryType, StatisticsReport};
use crate::stat::{ApiClient, Ledger, MonthKey};
use chrono::Local;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Home,
    Add,
    Statistics,
    Settings,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    EditingTransaction,
    ChoosingCategory,
    CreatingCategory,
    Confirming,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoginStep {
    Login,
    Register,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
    Confirm,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingAction {
    DeleteCategory { id: String, name: String },
    DeleteStatistics,
    SignOut,
}
impl PendingAction {
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::DeleteCategory { name, .. } => format!(
                "Delete category '{name}'? Related transactions lose their category. (y/n)"
            ),
            PendingAction::DeleteStatistics => {
                "Delete every transaction in this statistics view? (y/n)".to_string()
            }
            PendingAction::SignOut => "Sign out? (y/n)".to_string(),
        }
    }
}

pub struct LoginApp {
    pub email: LineEdit,
    pub password: LineEdit,
    pub confirm: LineEdit,
    pub field: LoginField,
    pub step: LoginStep,
    pub error_message: Option<String>,
    pub info_message: Option<String>,
}
impl Default for LoginApp {
    fn default() -> Self {
        Self {
            email: LineEdit::default(),
            password: LineEdit::masked(),
            confirm: LineEdit::masked(),
            field: LoginField::Email,
            step: LoginStep::Login,
            error_message: None,
            info_message: None,
        }
    }
}
impl LoginApp {
    pub fn next_field(&mut self) {
        self.field = match (self.step, self.field) {
            (_, LoginField::Email) => LoginField::Password,
            (LoginStep::Register, LoginField::Password) => LoginField::Confirm,
            _ => LoginField::Email,
        };
    }
    pub fn switch_step(&mut self) {
        self.step = match self.step {
            LoginStep::Login => LoginStep::Register,
            LoginStep::Register => LoginStep::Login,
        };
        self.field = LoginField::Email;
        self.password.clear();
        self.confirm.clear();
        self.error_message = None;
    }
    pub fn focused(&mut self) -> &mut LineEdit {
        match self.field {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
            LoginField::Confirm => &mut self.confirm,
        }
    }
}

pub const ADD_FIELDS: usize = 4; // 0=category, 1=amount, 2=description, 3=date

pub struct App {
    pub api: ApiClient,
    pub session: Session,
    pub config: Config,
    pub export_dir: PathBuf,
    pub login: Option<LoginApp>,
    pub ledger: Ledger,
    pub current_screen: Screen,
    pub input_mode: InputMode,
    pub selected_month: MonthKey,
    pub selected_transaction_idx: usize,
    pub stats_month: MonthKey,
    pub stats_type: CategoryType,
    pub stats: Option<StatisticsReport>,
    pub selected_stat_idx: usize,
    pub tx_form: TransactionForm,
    pub add_field_idx: usize,
    pub category_choice_idx: usize,
    pub category_form: CategoryForm,
    pub category_form_field: usize, // 0=name, 1=type, 2=color
    pub selected_category_idx: usize,
    pub pending: Option<PendingAction>,
    pub needs_refresh: bool,
    pub should_quit: bool,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
}

impl App {
    pub fn new(api: ApiClient, session: Session, config: Config, export_dir: PathBuf) -> Self {
        let month = MonthKey::current();
        let login = if session.is_signed_in() {
            None
        } else {
            Some(LoginApp::default())
        };
        Self {
            api,
            session,
            config,
            export_dir,
            needs_refresh: login.is_none(),
            login,
            ledger: Ledger::default(),
            current_screen: Screen::Home,
            input_mode: InputMode::Normal,
            selected_month: month,
            selected_transaction_idx: 0,
            stats_month: month,
            stats_type: CategoryType::Expense,
            stats: None,
            selected_stat_idx: 0,
            tx_form: TransactionForm::new(Local::now().date_naive()),
            add_field_idx: 0,
            category_choice_idx: 0,
            category_form: CategoryForm::default(),
            category_form_field: 0,
            selected_category_idx: 0,
            pending: None,
            should_quit: false,
            error_message: None,
            success_message: None,
        }
    }

    pub fn token(&self) -> String {
        self.session.token().unwrap_or_default().to_string()
    }

    /// Screens reload whenever they gain focus.
    pub fn next_screen(&mut self) {
        self.current_screen = match self.current_screen {
            Screen::Home => Screen::Add,
            Screen::Add => Screen::Statistics,
            Screen::Statistics => Screen::Settings,
            Screen::Settings => Screen::Home,
        };
        self.needs_refresh = true;
    }

    pub fn prev_screen(&mut self) {
        self.current_screen = match self.current_screen {
            Screen::Home => Screen::Settings,
            Screen::Add => Screen::Home,
            Screen::Statistics => Screen::Add,
            Screen::Settings => Screen::Statistics,
        };
        self.needs_refresh = true;
    }

    pub fn shift_month(&mut self, delta: i32) {
        match self.current_screen {
            Screen::Statistics => {
                self.stats_month = self.stats_month.shift(delta);
                self.selected_stat_idx = 0;
            }
            _ => {
                self.selected_month = self.selected_month.shift(delta);
                self.selected_transaction_idx = 0;
            }
        }
        self.needs_refresh = true;
    }

    pub fn toggle_stats_type(&mut self) {
        self.stats_type = self.stats_type.toggle();
        self.selected_stat_idx = 0;
        self.needs_refresh = true;
    }

    /// Income categories first, then expense, as the picker lists them.
    pub fn picker_categories(&self) -> Vec<&Category> {
        let mut list = self.ledger.categories_of(CategoryType::Income);
        list.extend(self.ledger.categories_of(CategoryType::Expense));
        list
    }

    pub fn choose_category(&mut self) {
        let chosen = self
            .picker_categories()
            .get(self.category_choice_idx)
            .map(|c| (*c).clone());
        if let Some(c) = chosen {
            self.tx_form.category = Some(c);
        }
        self.input_mode = InputMode::EditingTransaction;
    }

    pub fn settings_categories(&self) -> Vec<&Category> {
        self.picker_categories()
    }

    pub fn move_selection(&mut self, up: bool) {
        let (idx, len) = match self.current_screen {
            Screen::Home => (
                &mut self.selected_transaction_idx,
                self.ledger.transactions_in(self.selected_month).len(),
            ),
            Screen::Statistics => (
                &mut self.selected_stat_idx,
                self.stats.as_ref().map(|s| s.category_stats.len()).unwrap_or(0),
            ),
            Screen::Settings => (
                &mut self.selected_category_idx,
                self.ledger.category.len(),
            ),
            Screen::Add => (&mut self.add_field_idx, ADD_FIELDS),
        };
        if up {
            *idx = idx.saturating_sub(1);
        } else if *idx + 1 < len {
            *idx += 1;
        }
    }

    pub fn request_confirm(&mut self, action: PendingAction) {
        self.pending = Some(action);
        self.input_mode = InputMode::Confirming;
    }

    pub fn alert_error(&mut self, context: &str, err: impl std::fmt::Display) {
        tracing::error!(error = %err, "{context}");
        self.success_message = None;
        self.error_message = Some(format!("{context}: {err}"));
    }

    pub fn alert_success(&mut self, msg: impl Into<String>) {
        self.error_message = None;
        self.success_message = Some(msg.into());
    }

    pub fn clear_alerts(&mut self) {
        self.error_message = None;
        self.success_message = None;
    }

    /// Drops all signed-in state and returns to the login screen.
    pub fn reset_to_login(&mut self) {
        self.ledger = Ledger::default();
        self.stats = None;
        self.current_screen = Screen::Home;
        self.input_mode = InputMode::Normal;
        self.pending = None;
        self.login = Some(LoginApp::default());
    }
}
