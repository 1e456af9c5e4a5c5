//! The controller that owns the workout collection and keeps the map, the
//! list and the stored copy in step with it.
//!
//! Hosts feed it UI events as [`Command`]s and read back an [`Outcome`].
//! The position request is split in two: [`App::start`] loads what is stored
//! and asks for a position, [`App::on_position`] delivers the answer.

use crate::config::AppConfig;
use crate::dlog;
use crate::error::{GeolocationError, INVALID_INPUT_ALERT, NO_LOCATION_ALERT, ValidationError};
use crate::form::{FormController, FormInput};
use crate::geo::Geolocation;
use crate::persist::Persistence;
use crate::storage::KeyValueStore;
use crate::types::{Coords, Workout, WorkoutId, WorkoutType};
use crate::view::{self, ListSurface, MapWidget, Notifier};
use crate::workout::IdGenerator;
use chrono::Utc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Initializing,
    AwaitingLocation,
    /// Map is up; the flag tracks form visibility.
    MapReady { form_visible: bool },
    /// No position: the list works, the map does not.
    LocationUnavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    MapClicked(Coords),
    TypeChanged(WorkoutType),
    Submit(FormInput),
    SelectWorkout(WorkoutId),
    RestoreFormDisplay,
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    FormShown(Coords),
    FieldsToggled(WorkoutType),
    /// The form hides now; its display comes back after `restore_after`.
    Created {
        id: WorkoutId,
        restore_after: Duration,
    },
    Rejected(ValidationError),
    Focused(WorkoutId),
    DisplayRestored,
    Reset,
    Ignored,
}

pub struct App<S, M, L, N> {
    config: AppConfig,
    persistence: Persistence,
    store: S,
    map: M,
    list: L,
    notifier: N,
    form: FormController,
    ids: IdGenerator,
    workouts: Vec<Workout>,
    state: State,
}

impl<S, M, L, N> App<S, M, L, N>
where
    S: KeyValueStore,
    M: MapWidget,
    L: ListSurface,
    N: Notifier,
{
    pub fn new(config: AppConfig, store: S, map: M, list: L, notifier: N) -> Self {
        let persistence = Persistence::new(config.storage_key.clone());
        let form = FormController::new(config.hide_delay, config.elevation_rule);
        Self {
            config,
            persistence,
            store,
            map,
            list,
            notifier,
            form,
            ids: IdGenerator::new(),
            workouts: Vec::new(),
            state: State::Initializing,
        }
    }

    pub const fn state(&self) -> State {
        self.state
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub const fn form(&self) -> &FormController {
        &self.form
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn map(&self) -> &M {
        &self.map
    }

    pub const fn list(&self) -> &L {
        &self.list
    }

    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Loads stored workouts into the list and waits for a position.
    pub fn start(&mut self) {
        if self.state != State::Initializing {
            dlog!("start ignored state={:?}", self.state);
            return;
        }

        let loaded = self.persistence.load(&self.store);
        for w in &loaded {
            self.ids.observe(&w.id);
            self.list.insert_after_form(view::render_list_item(w));
        }
        tracing::info!(workouts = loaded.len(), "loaded stored workouts");
        self.workouts = loaded;
        self.state = State::AwaitingLocation;
    }

    pub fn on_position(&mut self, position: Result<Coords, GeolocationError>) {
        if self.state != State::AwaitingLocation {
            dlog!("position ignored state={:?}", self.state);
            return;
        }

        match position {
            Ok(center) => {
                self.map.initialize(center, self.config.map_zoom);
                self.map
                    .add_tile_layer(&self.config.tile_url, &self.config.tile_attribution);
                for w in &self.workouts {
                    view::render_marker(&mut self.map, w);
                }
                tracing::info!(%center, markers = self.workouts.len(), "map ready");
                self.state = State::MapReady {
                    form_visible: false,
                };
            }
            Err(e) => {
                tracing::warn!(err = %e, "no position; map disabled");
                self.notifier.alert(NO_LOCATION_ALERT);
                self.state = State::LocationUnavailable;
            }
        }
    }

    /// `start` followed by a single position request.
    pub fn boot(&mut self, geolocation: &mut dyn Geolocation) {
        self.start();
        let position = geolocation.current_position();
        self.on_position(position);
    }

    pub fn dispatch(&mut self, command: Command) -> Outcome {
        dlog!("dispatch command={command:?} state={:?}", self.state);
        match command {
            Command::MapClicked(at) => self.show_form(at),
            Command::TypeChanged(kind) => {
                self.form.toggle_fields_for_type(kind);
                Outcome::FieldsToggled(kind)
            }
            Command::Submit(input) => self.submit(input),
            Command::SelectWorkout(id) => self.select(&id),
            Command::RestoreFormDisplay => {
                self.form.restore_display();
                Outcome::DisplayRestored
            }
            Command::Reset => {
                self.reset();
                Outcome::Reset
            }
        }
    }

    fn show_form(&mut self, at: Coords) -> Outcome {
        // No map yet, nothing to click.
        if !matches!(self.state, State::MapReady { .. }) {
            return Outcome::Ignored;
        }
        self.form.show(at);
        self.state = State::MapReady { form_visible: true };
        Outcome::FormShown(at)
    }

    fn submit(&mut self, input: FormInput) -> Outcome {
        if self.state != (State::MapReady { form_visible: true }) {
            return Outcome::Ignored;
        }

        let now = Utc::now();
        let mut ids = self.ids.clone();
        let id = ids.next_id(now);
        let workout = match self.form.submit(input, id, now) {
            Ok(w) => w,
            Err(e) => {
                tracing::info!(err = %e, "workout rejected");
                self.notifier.alert(INVALID_INPUT_ALERT);
                return Outcome::Rejected(e);
            }
        };
        self.ids = ids;

        view::render_marker(&mut self.map, &workout);
        self.list
            .insert_after_form(view::render_list_item(&workout));
        let restore_after = self.form.hide();
        self.state = State::MapReady {
            form_visible: false,
        };

        let id = workout.id.clone();
        tracing::info!(%id, kind = %workout.kind(), "workout created");
        self.workouts.push(workout);
        self.persist();

        Outcome::Created { id, restore_after }
    }

    fn persist(&mut self) {
        if let Err(e) = self.persistence.save(&mut self.store, &self.workouts) {
            tracing::warn!(err = %e, "could not save workouts");
            self.notifier
                .warn(&format!("Workouts could not be saved: {e}"));
        }
    }

    fn select(&mut self, id: &WorkoutId) -> Outcome {
        let Some(workout) = self.workouts.iter().find(|w| &w.id == id) else {
            dlog!("select_missing id={id}");
            return Outcome::Ignored;
        };
        if !matches!(self.state, State::MapReady { .. }) {
            return Outcome::Ignored;
        }
        view::focus_on(
            &mut self.map,
            workout,
            self.config.map_zoom,
            self.config.pan_duration,
        );
        Outcome::Focused(id.clone())
    }

    /// Drops every workout, stored and in memory, and returns to
    /// `Initializing` as a fresh page load would.
    pub fn reset(&mut self) {
        if let Err(e) = self.persistence.clear(&mut self.store) {
            tracing::warn!(err = %e, "could not clear stored workouts");
            self.notifier
                .warn(&format!("Stored workouts could not be cleared: {e}"));
        }
        self.workouts.clear();
        self.list.clear();
        self.map.remove();
        self.form = FormController::new(self.config.hide_delay, self.config.elevation_rule);
        self.ids = IdGenerator::new();
        self.state = State::Initializing;
        tracing::info!("workouts reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::FixedPosition;
    use crate::storage::MemoryStore;
    use crate::view::{HtmlList, RecordingMap};

    #[derive(Default)]
    struct Alerts {
        alerts: Vec<String>,
        warnings: Vec<String>,
    }

    impl Notifier for Alerts {
        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }

        fn warn(&mut self, message: &str) {
            self.warnings.push(message.to_string());
        }
    }

    type TestApp = App<MemoryStore, RecordingMap, HtmlList, Alerts>;

    fn app_with(store: MemoryStore) -> TestApp {
        let mut app = App::new(
            AppConfig::default(),
            store,
            RecordingMap::new(),
            HtmlList::new(),
            Alerts::default(),
        );
        app.boot(&mut FixedPosition(Some(Coords::new(40.0, -73.0))));
        app
    }

    fn running(d: &str, t: &str, c: &str) -> FormInput {
        FormInput {
            kind: WorkoutType::Running,
            distance: d.into(),
            duration: t.into(),
            cadence: c.into(),
            elevation: String::new(),
        }
    }

    fn stored_len(app: &TestApp) -> usize {
        app.store()
            .get_item("workouts")
            .unwrap()
            .map_or(0, |raw| serde_json::from_str::<Vec<serde_json::Value>>(&raw).unwrap().len())
    }

    #[test]
    fn boot_initializes_map_at_position() {
        let app = app_with(MemoryStore::new());
        assert_eq!(app.state(), State::MapReady { form_visible: false });
        let view = app.map().view.clone().unwrap();
        assert_eq!(view.center, Coords::new(40.0, -73.0));
        assert_eq!(view.zoom, 13);
        assert_eq!(app.map().tile_layers.len(), 1);
    }

    #[test]
    fn click_then_valid_submit_creates_workout_everywhere() {
        let mut app = app_with(MemoryStore::new());
        let at = Coords::new(40.0, -73.0);

        assert_eq!(app.dispatch(Command::MapClicked(at)), Outcome::FormShown(at));
        let outcome = app.dispatch(Command::Submit(running("5", "25", "180")));
        let Outcome::Created { id, .. } = outcome else {
            panic!("expected Created, got {outcome:?}");
        };

        assert_eq!(app.workouts().len(), 1);
        assert_eq!(app.workouts()[0].id, id);
        assert_eq!(app.map().markers.len(), 1);
        assert_eq!(app.list().len(), 1);
        assert_eq!(stored_len(&app), 1);
        assert!(!app.form().is_visible());
        assert_eq!(app.state(), State::MapReady { form_visible: false });
    }

    #[test]
    fn invalid_submit_alerts_and_changes_nothing() {
        let mut app = app_with(MemoryStore::new());
        app.dispatch(Command::MapClicked(Coords::new(1.0, 2.0)));

        let outcome = app.dispatch(Command::Submit(running("5", "25", "abc")));
        assert!(matches!(outcome, Outcome::Rejected(_)));
        assert_eq!(app.notifier().alerts, vec![INVALID_INPUT_ALERT.to_string()]);
        assert!(app.workouts().is_empty());
        assert!(app.list().is_empty());
        assert!(app.map().markers.is_empty());
        assert_eq!(stored_len(&app), 0);
        assert_eq!(app.state(), State::MapReady { form_visible: true });
        assert_eq!(app.form().input().cadence, "abc");
    }

    #[test]
    fn rapid_submissions_get_distinct_ids() {
        let mut app = app_with(MemoryStore::new());
        for _ in 0..10 {
            app.dispatch(Command::MapClicked(Coords::new(1.0, 2.0)));
            app.dispatch(Command::Submit(running("5", "25", "180")));
        }
        let mut ids: Vec<_> = app.workouts().iter().map(|w| w.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn submit_is_ignored_while_form_is_hidden() {
        let mut app = app_with(MemoryStore::new());
        assert_eq!(app.dispatch(Command::Submit(running("5", "25", "180"))), Outcome::Ignored);
        assert!(app.workouts().is_empty());
    }

    #[test]
    fn select_pans_to_workout_and_ignores_unknown_ids() {
        let mut app = app_with(MemoryStore::new());
        let at = Coords::new(48.85, 2.35);
        app.dispatch(Command::MapClicked(at));
        app.dispatch(Command::Submit(running("5", "25", "180")));
        let id = app.list().id_at(0).cloned().unwrap();

        assert_eq!(app.dispatch(Command::SelectWorkout(id.clone())), Outcome::Focused(id));
        let view = app.map().view.clone().unwrap();
        assert_eq!(view.center, at);
        assert!(view.animated);

        assert_eq!(app.dispatch(Command::SelectWorkout("nope".into())), Outcome::Ignored);
    }

    #[test]
    fn missing_position_alerts_but_still_lists_stored_workouts() {
        let mut store = MemoryStore::new();
        let now = Utc::now();
        let stored = vec![
            Workout::running("0000000001".into(), now, Coords::new(1.0, 1.0), 5.0, 25.0, 170.0)
                .unwrap(),
        ];
        Persistence::new("workouts").save(&mut store, &stored).unwrap();

        let mut app = App::new(
            AppConfig::default(),
            store,
            RecordingMap::new(),
            HtmlList::new(),
            Alerts::default(),
        );
        app.boot(&mut FixedPosition(None));

        assert_eq!(app.state(), State::LocationUnavailable);
        assert_eq!(app.notifier().alerts, vec![NO_LOCATION_ALERT.to_string()]);
        assert_eq!(app.list().len(), 1);
        assert!(!app.map().is_initialized());
        assert_eq!(
            app.dispatch(Command::MapClicked(Coords::new(0.0, 0.0))),
            Outcome::Ignored
        );
    }

    #[test]
    fn failed_save_warns_without_losing_the_workout() {
        let mut app = app_with(MemoryStore::with_quota(8));
        app.dispatch(Command::MapClicked(Coords::new(1.0, 2.0)));
        let outcome = app.dispatch(Command::Submit(running("5", "25", "180")));

        assert!(matches!(outcome, Outcome::Created { .. }));
        assert_eq!(app.workouts().len(), 1);
        assert_eq!(app.notifier().warnings.len(), 1);
        assert!(app.notifier().alerts.is_empty());
    }

    #[test]
    fn reset_clears_storage_and_views() {
        let mut app = app_with(MemoryStore::new());
        app.dispatch(Command::MapClicked(Coords::new(1.0, 2.0)));
        app.dispatch(Command::Submit(running("5", "25", "180")));

        assert_eq!(app.dispatch(Command::Reset), Outcome::Reset);
        assert_eq!(app.state(), State::Initializing);
        assert_eq!(app.store().get_item("workouts").unwrap(), None);
        assert!(app.workouts().is_empty());
        assert!(app.list().is_empty());
        assert!(!app.map().is_initialized());

        app.boot(&mut FixedPosition(Some(Coords::new(40.0, -73.0))));
        assert!(app.workouts().is_empty());
        assert_eq!(app.state(), State::MapReady { form_visible: false });
    }
}
