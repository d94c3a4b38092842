use crate::models::Expense;
use crate::tracker::{BudgetTracker, TrackerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Editing => write!(f, "ENTRY"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Field of the expense entry form that receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormField {
    Name,
    Amount,
    Description,
}

impl FormField {
    pub(crate) fn next(self) -> Self {
        match self {
            Self::Name => Self::Amount,
            Self::Amount => Self::Description,
            Self::Description => Self::Name,
        }
    }

    pub(crate) fn prev(self) -> Self {
        match self {
            Self::Name => Self::Description,
            Self::Amount => Self::Name,
            Self::Description => Self::Amount,
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    DeleteExpense { id: i64, name: String },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    pub(crate) tracker: BudgetTracker,

    // Entry form
    pub(crate) form_field: FormField,

    // Expense list
    pub(crate) expense_index: usize,
    pub(crate) expense_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(tracker: BudgetTracker) -> Self {
        Self {
            running: true,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,

            tracker,

            form_field: FormField::Name,

            expense_index: 0,
            expense_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 10,
        }
    }

    pub(crate) fn selected_expense(&self) -> Option<&Expense> {
        self.tracker.record().expenses.get(self.expense_index)
    }

    /// Apply finished loads and keep the list cursor in range.
    pub(crate) fn sync(&mut self) {
        if self.tracker.poll_loads() {
            self.expense_index = 0;
            self.expense_scroll = 0;
        }
        let len = self.tracker.record().expenses.len();
        super::util::clamp_cursor(&mut self.expense_index, &mut self.expense_scroll, len);
    }

    pub(crate) fn open_form(&mut self) {
        self.form_field = FormField::Name;
        self.input_mode = InputMode::Editing;
    }

    /// Turn a tracker result into a status line. `NotReady` is expected while a
    /// month is loading and is not treated as a failure.
    pub(crate) fn report<T>(
        &mut self,
        result: Result<T, TrackerError>,
    ) -> anyhow::Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(TrackerError::NotReady) => {
                self.set_status("Still loading, try again in a moment");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}
