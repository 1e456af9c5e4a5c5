use crate::error::{RecordError, ValidationError};
use crate::types::{Activity, Coords, Workout, WorkoutId, WorkoutRecord, WorkoutType};
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use std::collections::HashSet;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Ids keep the last 10 digits of the creation time in milliseconds.
const ID_MODULUS: u64 = 10_000_000_000;

/// Pace (min/km) for running, speed (km/h) for cycling.
pub fn derived_metric(kind: WorkoutType, distance: f64, duration: f64) -> f64 {
    match kind {
        WorkoutType::Running => duration / distance,
        WorkoutType::Cycling => distance / (duration / 60.0),
    }
}

/// `"Running on 7 March"`.
pub fn describe(kind: WorkoutType, date: NaiveDate) -> String {
    let name = kind.as_str();
    let mut chars = name.chars();
    let capitalized = chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect::<String>())
        .unwrap_or_default();
    let month = MONTHS[date.month0() as usize];
    format!("{capitalized} on {} {month}", date.day())
}

fn check_base(distance: f64, duration: f64) -> Result<(), ValidationError> {
    for (field, v) in [("distance", distance), ("duration", duration)] {
        if !v.is_finite() {
            return Err(ValidationError::NotANumber { field });
        }
        if v <= 0.0 {
            return Err(ValidationError::NotPositive { field });
        }
    }
    Ok(())
}

fn local_date(created: DateTime<Utc>) -> NaiveDate {
    created.with_timezone(&Local).date_naive()
}

impl Workout {
    pub fn running(
        id: WorkoutId,
        created: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        cadence: f64,
    ) -> Result<Self, ValidationError> {
        check_base(distance, duration)?;
        let kind = WorkoutType::Running;
        Ok(Self {
            id,
            date: created,
            coords,
            distance,
            duration,
            description: describe(kind, local_date(created)),
            activity: Activity::Running {
                cadence,
                pace: derived_metric(kind, distance, duration),
            },
        })
    }

    pub fn cycling(
        id: WorkoutId,
        created: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        elevation: f64,
    ) -> Result<Self, ValidationError> {
        check_base(distance, duration)?;
        let kind = WorkoutType::Cycling;
        Ok(Self {
            id,
            date: created,
            coords,
            distance,
            duration,
            description: describe(kind, local_date(created)),
            activity: Activity::Cycling {
                elevation,
                speed: derived_metric(kind, distance, duration),
            },
        })
    }
}

impl From<&Workout> for WorkoutRecord {
    fn from(w: &Workout) -> Self {
        let (cadence, elevation, pace, speed) = match w.activity {
            Activity::Running { cadence, pace } => (Some(cadence), None, Some(pace), None),
            Activity::Cycling { elevation, speed } => (None, Some(elevation), None, Some(speed)),
        };
        Self {
            kind: w.kind(),
            cords: w.coords,
            distance: w.distance,
            duration: w.duration,
            cadence,
            elevation,
            id: w.id.clone(),
            date: w.date,
            pace,
            speed,
            workout_description: w.description.clone(),
        }
    }
}

impl TryFrom<WorkoutRecord> for Workout {
    type Error = RecordError;

    /// Rebuilds the typed variant from the `type` tag. The derived metric is
    /// recomputed; the stored description is kept as written.
    fn try_from(r: WorkoutRecord) -> Result<Self, Self::Error> {
        check_base(r.distance, r.duration).map_err(|source| RecordError::Invalid {
            id: r.id.0.clone(),
            source,
        })?;

        let metric = derived_metric(r.kind, r.distance, r.duration);
        let activity = match r.kind {
            WorkoutType::Running => {
                let cadence = r
                    .cadence
                    .ok_or_else(|| RecordError::MissingCadence { id: r.id.0.clone() })?;
                Activity::Running {
                    cadence,
                    pace: metric,
                }
            }
            WorkoutType::Cycling => {
                let elevation = r
                    .elevation
                    .ok_or_else(|| RecordError::MissingElevation { id: r.id.0.clone() })?;
                Activity::Cycling {
                    elevation,
                    speed: metric,
                }
            }
        };

        Ok(Self {
            id: r.id,
            date: r.date,
            coords: r.cords,
            distance: r.distance,
            duration: r.duration,
            description: r.workout_description,
            activity,
        })
    }
}

/// Issues timestamp-shaped ids that never repeat within a session.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last: Option<u64>,
    taken: HashSet<u64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as taken and makes later ids sort after it where the
    /// 10-digit range allows. Non-numeric ids are ignored.
    pub fn observe(&mut self, id: &WorkoutId) {
        if let Ok(v) = id.as_str().parse::<u64>() {
            self.taken.insert(v);
            self.last = Some(self.last.map_or(v, |l| l.max(v)));
        }
    }

    pub fn next_id(&mut self, now: DateTime<Utc>) -> WorkoutId {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let candidate = millis % ID_MODULUS;
        let mut v = match self.last {
            Some(last) if candidate <= last => (last + 1) % ID_MODULUS,
            _ => candidate,
        };
        // Past the end of the range ids wrap around; skip any already in use.
        while self.taken.contains(&v) {
            v = (v + 1) % ID_MODULUS;
        }
        self.taken.insert(v);
        self.last = Some(v);
        WorkoutId(format!("{v:010}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> Coords {
        Coords::new(40.0, -73.0)
    }

    #[test]
    fn running_pace_is_duration_over_distance() {
        for (d, t) in [(5.0, 25.0), (3.3, 17.0), (0.4, 2.5), (42.195, 211.0)] {
            let w = Workout::running("1".into(), Utc::now(), at(), d, t, 170.0).unwrap();
            let Activity::Running { pace, .. } = w.activity else {
                panic!("expected running");
            };
            assert_eq!(pace, t / d);
        }
    }

    #[test]
    fn cycling_speed_is_km_per_hour() {
        for (d, t) in [(3.0, 20.0), (27.5, 61.0), (100.0, 240.0)] {
            let w = Workout::cycling("1".into(), Utc::now(), at(), d, t, 10.0).unwrap();
            let Activity::Cycling { speed, .. } = w.activity else {
                panic!("expected cycling");
            };
            assert_eq!(speed, d / (t / 60.0));
        }
        assert_eq!(derived_metric(WorkoutType::Cycling, 3.0, 20.0), 9.0);
    }

    #[test]
    fn description_uses_capitalized_type_and_month_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(describe(WorkoutType::Running, date), "Running on 7 March");
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(describe(WorkoutType::Cycling, date), "Cycling on 31 December");
    }

    #[test]
    fn constructors_reject_non_positive_base_fields() {
        let err = Workout::running("1".into(), Utc::now(), at(), 0.0, 10.0, 150.0).unwrap_err();
        assert_eq!(err, ValidationError::NotPositive { field: "distance" });

        let err = Workout::cycling("1".into(), Utc::now(), at(), 2.0, f64::NAN, 5.0).unwrap_err();
        assert_eq!(err, ValidationError::NotANumber { field: "duration" });
    }

    #[test]
    fn ids_are_unique_within_the_same_millisecond() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let mut ids = IdGenerator::new();
        let issued: Vec<WorkoutId> = (0..10).map(|_| ids.next_id(now)).collect();

        let mut sorted = issued.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 10);
        assert_eq!(issued[0].as_str(), "0000000123");
        assert_eq!(issued[9].as_str(), "0000000132");
    }

    #[test]
    fn observed_ids_push_the_generator_forward() {
        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        let mut ids = IdGenerator::new();
        ids.observe(&WorkoutId::from("5000000000"));
        ids.observe(&WorkoutId::from("not-a-number"));
        assert_eq!(ids.next_id(now).as_str(), "5000000001");
    }

    #[test]
    fn ids_wrap_at_the_top_of_the_range_without_reuse() {
        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        let mut ids = IdGenerator::new();
        ids.observe(&WorkoutId::from("9999999999"));
        ids.observe(&WorkoutId::from("0000000000"));
        ids.observe(&WorkoutId::from("0000000001"));

        let first = ids.next_id(now);
        assert_eq!(first.as_str().len(), 10);
        assert_eq!(first.as_str(), "0000000002");

        let second = ids.next_id(now);
        assert_eq!(second.as_str(), "0000001000");
    }

    #[test]
    fn record_round_trip_restores_typed_variant() {
        let w = Workout::cycling("42".into(), Utc::now(), at(), 3.0, 20.0, -5.0).unwrap();
        let record = WorkoutRecord::from(&w);
        assert_eq!(record.kind, WorkoutType::Cycling);
        assert_eq!(record.speed, Some(9.0));
        assert_eq!(record.pace, None);

        let back = Workout::try_from(record).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn record_without_variant_field_is_rejected() {
        let w = Workout::running("7".into(), Utc::now(), at(), 5.0, 25.0, 180.0).unwrap();
        let mut record = WorkoutRecord::from(&w);
        record.cadence = None;
        assert_eq!(
            Workout::try_from(record).unwrap_err(),
            RecordError::MissingCadence { id: "7".into() }
        );
    }
}
