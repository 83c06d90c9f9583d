//! Board controller: owns every piece of UI state and talks to the store.
//!
//! Requests run on short-lived background threads and report back through
//! an mpsc channel; results are applied on the UI thread in `poll_results`.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use crate::error::StoreError;
use crate::form::{KworkForm, Submission};
use crate::kanban_board::KanbanBoard;
use crate::store::{KworkPatch, KworkStore};
use crate::task::{Kwork, Status};

pub const DELETE_PROMPT: &str = "Вы уверены, что хотите удалить эту задачу?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    ToggleFavorite,
    Delete,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Load => "Ошибка при загрузке данных",
            Operation::Create => "Ошибка при сохранении",
            Operation::Update => "Ошибка при обновлении",
            Operation::ToggleFavorite => "Ошибка при обновлении статуса",
            Operation::Delete => "Ошибка при удалении задачи",
        }
    }
}

/// Outcome of a background request.
#[derive(Debug)]
pub enum BgResult {
    Loaded(Result<Vec<Kwork>, StoreError>),
    Created {
        form: u64,
        result: Result<Kwork, StoreError>,
    },
    Updated {
        op: Operation,
        id: u64,
        /// Dialog generation that submitted the edit, `None` for the toggle
        form: Option<u64>,
        result: Result<Kwork, StoreError>,
    },
    Deleted {
        id: u64,
        result: Result<(), StoreError>,
    },
}

/// A card picked up for reordering; `to` is the pending drop slot.
///
/// The card is tracked by id since results applied mid-grab can shift
/// its position in the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grab {
    pub group: Status,
    pub id: u64,
    pub to: usize,
}

pub struct App {
    pub board: KanbanBoard,
    pub form: Option<KworkForm>,
    /// Bumped on every dialog open
    form_generation: u64,
    /// Id awaiting delete confirmation
    pub confirm_delete: Option<u64>,
    /// Blocking alert, dismissed by any key
    pub alert: Option<String>,
    pub grab: Option<Grab>,
    pub should_quit: bool,
    store: Arc<dyn KworkStore>,
    bg_tx: mpsc::Sender<BgResult>,
    bg_rx: mpsc::Receiver<BgResult>,
}

impl App {
    pub fn new(store: Arc<dyn KworkStore>) -> Self {
        let (bg_tx, bg_rx) = mpsc::channel();
        Self {
            board: KanbanBoard::new(),
            form: None,
            form_generation: 0,
            confirm_delete: None,
            alert: None,
            grab: None,
            should_quit: false,
            store,
            bg_tx,
            bg_rx,
        }
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce(&dyn KworkStore) -> BgResult + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let tx = self.bg_tx.clone();
        thread::spawn(move || {
            // receiver gone means the app is shutting down
            let _ = tx.send(job(store.as_ref()));
        });
    }

    pub fn load(&self) {
        self.spawn(|store| BgResult::Loaded(store.list()));
    }

    pub fn open_create_dialog(&mut self) {
        self.form = Some(KworkForm::for_create());
        self.form_generation += 1;
    }

    pub fn open_edit_dialog(&mut self) {
        if let Some(kwork) = self.board.selected() {
            self.form = Some(KworkForm::for_edit(kwork));
            self.form_generation += 1;
        }
    }

    pub fn close_dialog(&mut self) {
        self.form = None;
    }

    pub fn submit_form(&mut self) {
        let Some(form) = &self.form else {
            return;
        };
        let generation = self.form_generation;
        match form.validate() {
            Err(err) => self.alert = Some(err.to_string()),
            Ok(Submission::Create(body)) => {
                self.spawn(move |store| BgResult::Created {
                    form: generation,
                    result: store.create(&body),
                });
            }
            Ok(Submission::Update { id, patch }) => {
                self.spawn(move |store| BgResult::Updated {
                    op: Operation::Update,
                    id,
                    form: Some(generation),
                    result: store.update(id, &patch),
                });
            }
        }
    }

    pub fn toggle_favorite(&mut self) {
        let Some(kwork) = self.board.selected() else {
            return;
        };
        let id = kwork.id;
        let status = if kwork.favorite {
            Status::derive(&kwork.reason, false)
        } else {
            Status::Favorite
        };
        let patch = KworkPatch::status(status);
        self.spawn(move |store| BgResult::Updated {
            op: Operation::ToggleFavorite,
            id,
            form: None,
            result: store.update(id, &patch),
        });
    }

    pub fn request_delete(&mut self) {
        self.confirm_delete = self.board.selected().map(|k| k.id);
    }

    pub fn answer_delete(&mut self, confirmed: bool) {
        let Some(id) = self.confirm_delete.take() else {
            return;
        };
        if confirmed {
            self.spawn(move |store| BgResult::Deleted {
                id,
                result: store.delete(id),
            });
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn start_grab(&mut self) {
        let Some(kwork) = self.board.selected() else {
            return;
        };
        self.grab = Some(Grab {
            group: self.board.selected_column(),
            id: kwork.id,
            to: self.board.selected_task,
        });
    }

    /// Current index of the grabbed card inside its group.
    pub fn grab_source(&self) -> Option<usize> {
        let grab = self.grab?;
        self.board
            .get_tasks_by_status(grab.group)
            .iter()
            .position(|k| k.id == grab.id)
    }

    /// Drops the grab once its card has left the group, otherwise keeps the
    /// drop slot inside the group.
    fn revalidate_grab(&mut self) {
        let Some(grab) = self.grab else {
            return;
        };
        if self.grab_source().is_none() {
            tracing::debug!(id = grab.id, "grabbed card left its column");
            self.grab = None;
            return;
        }
        let last = self.board.get_tasks_by_status(grab.group).len().saturating_sub(1);
        if let Some(grab) = self.grab.as_mut() {
            grab.to = grab.to.min(last);
        }
    }

    pub fn move_grab(&mut self, direction: isize) {
        let Some(grab) = self.grab.as_mut() else {
            return;
        };
        let last = self.board.get_tasks_by_status(grab.group).len().saturating_sub(1);
        grab.to = (grab.to as isize + direction).clamp(0, last as isize) as usize;
    }

    /// Drops the grabbed card. `None` as destination is a cancelled drag.
    pub fn drop_grab(&mut self, cancel: bool) {
        let from = self.grab_source();
        let Some(grab) = self.grab.take() else {
            return;
        };
        let Some(from) = from else {
            return;
        };
        let to = (!cancel).then_some(grab.to);
        if self.board.reorder(grab.group, from, to) {
            self.board.select(grab.group, grab.to);
        }
    }

    /// Applies every finished request without blocking.
    pub fn poll_results(&mut self) {
        while let Ok(result) = self.bg_rx.try_recv() {
            self.apply(result);
        }
    }

    fn apply(&mut self, result: BgResult) {
        self.apply_result(result);
        self.revalidate_grab();
    }

    fn is_current_form(&self, generation: u64) -> bool {
        self.form.is_some() && self.form_generation == generation
    }

    fn apply_result(&mut self, result: BgResult) {
        match result {
            BgResult::Loaded(Ok(tasks)) => self.board.replace(tasks),
            BgResult::Loaded(Err(err)) => {
                tracing::warn!(error = %err, "load failed");
                let message = match err {
                    StoreError::Status(_) => Operation::Load.failure_message().to_string(),
                    other => other.to_string(),
                };
                self.board.load_failed(message);
            }
            BgResult::Created {
                form,
                result: Ok(task),
            } => {
                self.board.apply_created(task);
                if self.is_current_form(form) {
                    self.form = None;
                }
            }
            BgResult::Created { result: Err(err), .. } => self.fail(Operation::Create, &err),
            BgResult::Updated {
                form,
                result: Ok(task),
                ..
            } => {
                self.board.apply_updated(task);
                if form.is_some_and(|generation| self.is_current_form(generation)) {
                    self.form = None;
                }
            }
            BgResult::Updated {
                op,
                result: Err(err),
                ..
            } => self.fail(op, &err),
            BgResult::Deleted { id, result: Ok(()) } => self.board.apply_removed(id),
            BgResult::Deleted { result: Err(err), .. } => self.fail(Operation::Delete, &err),
        }
    }

    fn fail(&mut self, op: Operation, err: &StoreError) {
        tracing::warn!(?op, error = %err, "request failed");
        self.alert = Some(op.failure_message().to_string());
    }

    /// Blocks until one background result arrives and applies it.
    #[cfg(test)]
    pub fn settle(&mut self) {
        let result = self
            .bg_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("background request did not finish");
        self.apply(result);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::NewKwork;
    use crate::task::sample;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory store that assigns ids like the real backend.
    #[derive(Default)]
    pub(crate) struct FakeStore {
        pub records: Mutex<Vec<Kwork>>,
        pub fail_with: Mutex<Option<u16>>,
        pub calls: AtomicUsize,
    }

    impl FakeStore {
        pub fn with(records: Vec<Kwork>) -> Arc<Self> {
            Arc::new(Self {
                records: Mutex::new(records),
                ..Self::default()
            })
        }

        fn check(&self) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match *self.fail_with.lock().unwrap() {
                Some(0) => Err(StoreError::Transport("connection refused".to_string())),
                Some(code) => Err(StoreError::Status(code)),
                None => Ok(()),
            }
        }

        pub fn fail(&self, code: u16) {
            *self.fail_with.lock().unwrap() = Some(code);
        }
    }

    impl KworkStore for FakeStore {
        fn list(&self) -> Result<Vec<Kwork>, StoreError> {
            self.check()?;
            Ok(self.records.lock().unwrap().clone())
        }

        fn create(&self, body: &NewKwork) -> Result<Kwork, StoreError> {
            self.check()?;
            let mut records = self.records.lock().unwrap();
            let id = records.iter().map(|k| k.id).max().unwrap_or(0) + 1;
            let kwork = Kwork {
                id,
                link: body.link.clone(),
                title: body.title.clone(),
                description: body.description.clone(),
                price: body.price,
                reason: body.reason.clone(),
                favorite: body.status == Status::Favorite,
            };
            records.push(kwork.clone());
            Ok(kwork)
        }

        fn update(&self, id: u64, patch: &KworkPatch) -> Result<Kwork, StoreError> {
            self.check()?;
            let mut records = self.records.lock().unwrap();
            let kwork = records
                .iter_mut()
                .find(|k| k.id == id)
                .ok_or(StoreError::Status(404))?;
            if let Some(title) = &patch.title {
                kwork.title = title.clone();
            }
            if let Some(description) = &patch.description {
                kwork.description = description.clone();
            }
            if let Some(price) = patch.price {
                kwork.price = price;
            }
            if let Some(link) = &patch.link {
                kwork.link = link.clone();
            }
            if let Some(reason) = &patch.reason {
                kwork.reason = reason.clone();
            }
            if let Some(status) = patch.status {
                kwork.favorite = status == Status::Favorite;
            }
            Ok(kwork.clone())
        }

        fn delete(&self, id: u64) -> Result<(), StoreError> {
            self.check()?;
            self.records.lock().unwrap().retain(|k| k.id != id);
            Ok(())
        }
    }

    fn loaded_app(records: Vec<Kwork>) -> (App, Arc<FakeStore>) {
        let store = FakeStore::with(records);
        let mut app = App::new(store.clone());
        app.load();
        app.settle();
        (app, store)
    }

    fn ids_in(app: &App, status: Status) -> Vec<u64> {
        app.board
            .get_tasks_by_status(status)
            .iter()
            .map(|k| k.id)
            .collect()
    }

    #[test]
    fn test_load_network_error_shows_banner() {
        let store = FakeStore::with(vec![]);
        store.fail(0);
        let mut app = App::new(store);
        app.load();
        app.settle();

        assert_eq!(app.board.error.as_deref(), Some("connection refused"));
        assert!(app.board.tasks.is_empty());
        assert!(app.alert.is_none());
    }

    #[test]
    fn test_load_status_error_uses_fixed_message() {
        let store = FakeStore::with(vec![sample(1, "", false)]);
        store.fail(500);
        let mut app = App::new(store.clone());
        app.load();
        app.settle();
        assert_eq!(app.board.error.as_deref(), Some("Ошибка при загрузке данных"));

        *store.fail_with.lock().unwrap() = None;
        app.load();
        app.settle();
        assert!(app.board.error.is_none());
        assert_eq!(app.board.tasks.len(), 1);
    }

    #[test]
    fn test_create_appends_server_record() {
        let (mut app, _) = loaded_app(vec![]);
        app.open_create_dialog();
        let form = app.form.as_mut().unwrap();
        form.title = "Logo design".to_string();
        form.description = "Vector logo".to_string();
        form.price = "5000".to_string();
        form.link = "http://x".to_string();

        app.submit_form();
        app.settle();

        assert!(app.form.is_none());
        assert_eq!(ids_in(&app, Status::New), vec![1]);
        let created = &app.board.tasks[0];
        assert_eq!(created.title, "Logo design");
        assert_eq!(created.status(), Status::New);
    }

    #[test]
    fn test_invalid_form_never_reaches_store() {
        let (mut app, store) = loaded_app(vec![]);
        let calls = store.calls.load(Ordering::SeqCst);

        app.open_create_dialog();
        app.form.as_mut().unwrap().title = "Only a title".to_string();
        app.submit_form();

        assert_eq!(app.alert.as_deref(), Some("Заполните все поля"));
        assert!(app.form.is_some());
        assert_eq!(store.calls.load(Ordering::SeqCst), calls);
    }

    #[test]
    fn test_edit_reason_moves_card_to_rejected() {
        let (mut app, _) = loaded_app(vec![sample(1, "", false)]);
        app.open_edit_dialog();
        app.form.as_mut().unwrap().set_reason("Client unresponsive");
        assert_eq!(app.form.as_ref().unwrap().status, Status::Rejected);

        app.submit_form();
        app.settle();

        assert!(app.form.is_none());
        assert!(ids_in(&app, Status::New).is_empty());
        assert_eq!(ids_in(&app, Status::Rejected), vec![1]);
    }

    #[test]
    fn test_failed_update_keeps_dialog_and_cache() {
        let (mut app, store) = loaded_app(vec![sample(1, "", false)]);
        app.open_edit_dialog();
        app.form.as_mut().unwrap().set_reason("nope");
        store.fail(500);

        app.submit_form();
        app.settle();

        assert_eq!(app.alert.as_deref(), Some("Ошибка при обновлении"));
        assert!(app.form.is_some());
        assert_eq!(app.board.tasks[0].reason, "");
    }

    #[test]
    fn test_failed_create_alert() {
        let (mut app, store) = loaded_app(vec![]);
        app.form = Some(KworkForm {
            title: "t".to_string(),
            description: "d".to_string(),
            price: "1".to_string(),
            link: "l".to_string(),
            ..KworkForm::for_create()
        });
        store.fail(400);
        app.submit_form();
        app.settle();

        assert_eq!(app.alert.as_deref(), Some("Ошибка при сохранении"));
        assert!(app.board.tasks.is_empty());
    }

    #[test]
    fn test_toggle_favorite_round_trip_keeps_reason() {
        let (mut app, _) = loaded_app(vec![sample(1, "too cheap", false)]);
        app.board.select(Status::Rejected, 0);

        app.toggle_favorite();
        app.settle();
        assert_eq!(ids_in(&app, Status::Favorite), vec![1]);

        app.board.select(Status::Favorite, 0);
        app.toggle_favorite();
        app.settle();
        assert_eq!(ids_in(&app, Status::Rejected), vec![1]);
        assert!(ids_in(&app, Status::New).is_empty());
    }

    #[test]
    fn test_toggle_favorite_failure_alert() {
        let (mut app, store) = loaded_app(vec![sample(1, "", false)]);
        store.fail(503);
        app.toggle_favorite();
        app.settle();

        assert_eq!(app.alert.as_deref(), Some("Ошибка при обновлении статуса"));
        assert!(!app.board.tasks[0].favorite);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let (mut app, store) = loaded_app(vec![sample(1, "", false), sample(2, "", false)]);

        app.request_delete();
        assert_eq!(app.confirm_delete, Some(1));
        app.answer_delete(false);
        assert!(app.confirm_delete.is_none());
        assert_eq!(store.records.lock().unwrap().len(), 2);

        app.request_delete();
        app.answer_delete(true);
        app.settle();

        let groups = app.board.groups();
        for status in Status::ALL {
            assert!(groups.get(status).iter().all(|k| k.id != 1));
        }
        assert_eq!(app.board.tasks.len(), 1);
    }

    #[test]
    fn test_failed_delete_keeps_record() {
        let (mut app, store) = loaded_app(vec![sample(1, "", false)]);
        store.fail(500);
        app.request_delete();
        app.answer_delete(true);
        app.settle();

        assert_eq!(app.alert.as_deref(), Some("Ошибка при удалении задачи"));
        assert_eq!(app.board.tasks.len(), 1);
    }

    #[test]
    fn test_grab_and_drop_reorders_locally() {
        let (mut app, store) = loaded_app(vec![
            sample(1, "", false),
            sample(2, "", false),
            sample(3, "", false),
        ]);
        let calls = store.calls.load(Ordering::SeqCst);

        app.start_grab();
        app.move_grab(1);
        app.move_grab(1);
        app.move_grab(1);
        app.drop_grab(false);

        assert_eq!(ids_in(&app, Status::New), vec![2, 3, 1]);
        assert_eq!(app.board.selected().map(|k| k.id), Some(1));
        assert_eq!(store.calls.load(Ordering::SeqCst), calls);

        // a reload throws the local order away
        app.load();
        app.settle();
        assert_eq!(ids_in(&app, Status::New), vec![1, 2, 3]);
    }

    #[test]
    fn test_grab_follows_card_when_group_shifts() {
        let (mut app, _) = loaded_app(vec![
            sample(1, "", false),
            sample(2, "", false),
            sample(3, "", false),
        ]);
        app.request_delete();
        app.answer_delete(true);

        app.board.select(Status::New, 2);
        app.start_grab();
        // delete of card 1 lands while card 3 is held
        app.settle();
        assert_eq!(app.grab_source(), Some(1));

        app.move_grab(-1);
        app.drop_grab(false);
        assert_eq!(ids_in(&app, Status::New), vec![3, 2]);
    }

    #[test]
    fn test_grab_dropped_when_card_leaves_group() {
        let (mut app, _) = loaded_app(vec![
            sample(1, "", false),
            sample(2, "", false),
            sample(3, "", false),
        ]);
        app.toggle_favorite();
        app.start_grab();
        app.settle();
        assert!(app.grab.is_none());

        app.move_grab(1);
        app.drop_grab(false);
        assert_eq!(ids_in(&app, Status::New), vec![2, 3]);
        assert_eq!(ids_in(&app, Status::Favorite), vec![1]);
    }

    #[test]
    fn test_create_response_keeps_newer_dialog() {
        let (mut app, _) = loaded_app(vec![]);
        app.open_create_dialog();
        app.form = Some(KworkForm {
            title: "Logo design".to_string(),
            description: "Vector logo".to_string(),
            price: "5000".to_string(),
            link: "http://x".to_string(),
            ..KworkForm::for_create()
        });
        app.submit_form();

        app.close_dialog();
        app.open_create_dialog();
        app.form.as_mut().unwrap().title = "Second".to_string();
        app.settle();

        assert_eq!(app.form.as_ref().map(|f| f.title.as_str()), Some("Second"));
        assert_eq!(ids_in(&app, Status::New), vec![1]);
    }

    #[test]
    fn test_edit_response_keeps_dialog_reopened_for_same_card() {
        let (mut app, _) = loaded_app(vec![sample(1, "", false)]);
        app.open_edit_dialog();
        app.submit_form();

        app.close_dialog();
        app.open_edit_dialog();
        app.settle();
        assert!(app.form.is_some());
    }

    #[test]
    fn test_cancelled_grab_is_noop() {
        let (mut app, _) = loaded_app(vec![sample(1, "", false), sample(2, "", false)]);
        app.start_grab();
        app.move_grab(1);
        app.drop_grab(true);

        assert!(app.grab.is_none());
        assert_eq!(ids_in(&app, Status::New), vec![1, 2]);
    }
}
