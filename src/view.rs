use crate::types::{Activity, Coords, Workout, WorkoutId, WorkoutType};
use crate::utils::{escape_html, to_fixed1};
use std::fmt::Write as _;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupOptions {
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
    pub class_name: String,
}

impl PopupOptions {
    /// Sticky popup styled after the workout type.
    pub fn for_type(kind: WorkoutType) -> Self {
        Self {
            max_width: 250,
            min_width: 100,
            auto_close: false,
            close_on_click: false,
            class_name: format!("{kind}-popup"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanOptions {
    pub animate: bool,
    pub duration: Duration,
}

/// Operations the app needs from an interactive map widget. Clicks on the
/// map are delivered back as `Command::MapClicked`.
pub trait MapWidget {
    fn initialize(&mut self, center: Coords, zoom: u8);
    fn add_tile_layer(&mut self, url: &str, attribution: &str);
    fn add_marker(&mut self, at: Coords) -> MarkerId;
    fn bind_popup(&mut self, marker: MarkerId, options: &PopupOptions, content: &str);
    fn open_popup(&mut self, marker: MarkerId);
    fn set_view(&mut self, center: Coords, zoom: u8, pan: PanOptions);
    /// Tears the map down; `initialize` may be called again afterwards.
    fn remove(&mut self);
}

pub fn popup_content(workout: &Workout) -> String {
    format!("{} {}", workout.kind().icon(), escape_html(&workout.description))
}

pub fn render_marker(map: &mut dyn MapWidget, workout: &Workout) -> MarkerId {
    let marker = map.add_marker(workout.coords);
    map.bind_popup(
        marker,
        &PopupOptions::for_type(workout.kind()),
        &popup_content(workout),
    );
    map.open_popup(marker);
    marker
}

pub fn focus_on(map: &mut dyn MapWidget, workout: &Workout, zoom: u8, pan_duration: Duration) {
    map.set_view(
        workout.coords,
        zoom,
        PanOptions {
            animate: true,
            duration: pan_duration,
        },
    );
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub at: Coords,
    pub popup: Option<(PopupOptions, String)>,
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapViewState {
    pub center: Coords,
    pub zoom: u8,
    pub animated: bool,
}

/// Map widget that only keeps state: markers, popups and the current view.
#[derive(Debug, Default, Clone)]
pub struct RecordingMap {
    pub view: Option<MapViewState>,
    pub tile_layers: Vec<(String, String)>,
    pub markers: Vec<Marker>,
}

impl RecordingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.view.is_some()
    }

    pub fn open_popups(&self) -> impl Iterator<Item = &str> {
        self.markers
            .iter()
            .filter(|m| m.open)
            .filter_map(|m| m.popup.as_ref().map(|(_, content)| content.as_str()))
    }
}

impl MapWidget for RecordingMap {
    fn initialize(&mut self, center: Coords, zoom: u8) {
        self.view = Some(MapViewState {
            center,
            zoom,
            animated: false,
        });
    }

    fn add_tile_layer(&mut self, url: &str, attribution: &str) {
        self.tile_layers
            .push((url.to_string(), attribution.to_string()));
    }

    fn add_marker(&mut self, at: Coords) -> MarkerId {
        self.markers.push(Marker {
            at,
            popup: None,
            open: false,
        });
        MarkerId(self.markers.len() - 1)
    }

    fn bind_popup(&mut self, marker: MarkerId, options: &PopupOptions, content: &str) {
        if let Some(m) = self.markers.get_mut(marker.0) {
            m.popup = Some((options.clone(), content.to_string()));
        }
    }

    fn open_popup(&mut self, marker: MarkerId) {
        // Sticky popups stay open; anything else closes when another opens.
        for (i, m) in self.markers.iter_mut().enumerate() {
            if i == marker.0 {
                m.open = m.popup.is_some();
            } else if m.popup.as_ref().is_some_and(|(o, _)| o.auto_close) {
                m.open = false;
            }
        }
    }

    fn set_view(&mut self, center: Coords, zoom: u8, pan: PanOptions) {
        self.view = Some(MapViewState {
            center,
            zoom,
            animated: pan.animate,
        });
    }

    fn remove(&mut self) {
        *self = Self::default();
    }
}

/// One rendered list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: WorkoutId,
    pub kind: WorkoutType,
    pub html: String,
}

fn push_detail(html: &mut String, icon: &str, value: &str, unit: &str) {
    let _ = write!(
        html,
        r#"
  <div class="workout__details">
    <span class="workout__icon">{icon}</span>
    <span class="workout__value">{value}</span>
    <span class="workout__unit">{unit}</span>
  </div>"#
    );
}

pub fn render_list_item(workout: &Workout) -> ListItem {
    let kind = workout.kind();
    let mut html = format!(
        r#"<li class="workout workout--{kind}" data-id="{id}">
  <h2 class="workout__title">{title}</h2>"#,
        id = escape_html(workout.id.as_str()),
        title = escape_html(&workout.description),
    );

    push_detail(&mut html, kind.icon(), &workout.distance.to_string(), "km");
    push_detail(&mut html, "⏱", &workout.duration.to_string(), "min");

    match workout.activity {
        Activity::Running { cadence, pace } => {
            push_detail(&mut html, "⚡️", &to_fixed1(pace), "min/km");
            push_detail(&mut html, "🦶🏼", &cadence.to_string(), "spm");
        }
        Activity::Cycling { elevation, speed } => {
            push_detail(&mut html, "⚡️", &to_fixed1(speed), "km/h");
            push_detail(&mut html, "⛰", &elevation.to_string(), "m");
        }
    }
    html.push_str("\n</li>");

    ListItem {
        id: workout.id.clone(),
        kind,
        html,
    }
}

/// The list region next to the form.
pub trait ListSurface {
    /// Inserts `item` directly after the form element, ahead of older entries.
    fn insert_after_form(&mut self, item: ListItem);
    fn clear(&mut self);
}

/// List region held as rendered markup, in document order.
#[derive(Debug, Default, Clone)]
pub struct HtmlList {
    items: Vec<ListItem>,
}

impl HtmlList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries as they appear on screen, newest first.
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `data-id` of the entry at `index`, mimicking a click on that entry.
    pub fn id_at(&self, index: usize) -> Option<&WorkoutId> {
        self.items.get(index).map(|i| &i.id)
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from(r#"<ul class="workouts">"#);
        for item in &self.items {
            out.push('\n');
            out.push_str(&item.html);
        }
        out.push_str("\n</ul>");
        out
    }
}

impl ListSurface for HtmlList {
    fn insert_after_form(&mut self, item: ListItem) {
        self.items.insert(0, item);
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

/// User-facing messages.
pub trait Notifier {
    /// Blocking alert; the user has to acknowledge it.
    fn alert(&mut self, message: &str);
    /// Non-blocking notice.
    fn warn(&mut self, message: &str);
}

/// Prints alerts on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn warn(&mut self, message: &str) {
        tracing::warn!("{message}");
    }
}
