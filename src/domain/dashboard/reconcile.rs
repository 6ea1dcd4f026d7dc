//! Folding push events into [`DashboardState`].
//!
//! Each fold touches only the keys the event names: alerts prepend to
//! their feeds, a location upsert replaces one subject's record, a stats
//! snapshot overwrites the counters it carries. Folds on independent keys
//! commute and every fold is idempotent per field.

use crate::domain::events::{AlertKind, TouristLocationRecord, TypedEvent};
use crate::domain::foundation::Timestamp;

use super::state::DashboardState;

/// What a fold did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldOutcome {
    Applied,
    /// Valid event with nothing to store (acknowledgements).
    Ignored,
    /// The state was already disposed.
    Discarded,
}

impl DashboardState {
    /// Folds one classified event, stamping location records with the
    /// current time.
    pub fn apply_event(&mut self, event: TypedEvent) -> FoldOutcome {
        self.apply_event_at(event, Timestamp::now())
    }

    pub fn apply_event_at(&mut self, event: TypedEvent, received_at: Timestamp) -> FoldOutcome {
        if self.disposed {
            return FoldOutcome::Discarded;
        }

        let outcome = match event {
            TypedEvent::Alert(alert) => {
                match alert.kind {
                    AlertKind::Sos => {
                        // Overwritten, not added to, by the next snapshot.
                        self.stats.data_mut().record_optimistic_sos();
                        self.sos_feed.push(alert.clone());
                    }
                    AlertKind::GeofenceBreach => {
                        self.geofence_feed.push(alert.clone());
                    }
                }
                self.alerts.push(alert);
                FoldOutcome::Applied
            }
            TypedEvent::LocationUpdate(update) => {
                let record = TouristLocationRecord::from_update(&update, received_at);
                self.locations.insert(update.subject_id, record);
                FoldOutcome::Applied
            }
            TypedEvent::StatsSnapshot(patch) => {
                self.stats.data_mut().apply_patch(&patch);
                FoldOutcome::Applied
            }
            TypedEvent::Ack { .. } => FoldOutcome::Ignored,
            TypedEvent::Unclassified(event) => {
                self.unclassified.push(event);
                FoldOutcome::Applied
            }
        };

        if outcome == FoldOutcome::Applied {
            self.events_applied += 1;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::cache::ResourceKind;
    use crate::domain::dashboard::resources::ResourcePayload;
    use crate::domain::events::{
        classify_at, DashboardStats, Envelope, LocationUpdate, StatsPatch, UnclassifiedEvent,
    };
    use crate::domain::foundation::{GeoPoint, SubjectId};
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};

    fn envelope(event_type: &str, data: Value) -> Envelope {
        Envelope::new(event_type, data.as_object().cloned().unwrap_or_default())
    }

    fn fold(state: &mut DashboardState, event_type: &str, data: Value) -> FoldOutcome {
        let now = Timestamp::now();
        state.apply_event_at(classify_at(&envelope(event_type, data), now), now)
    }

    #[test]
    fn sos_push_creates_one_alert_and_bumps_counter() {
        let mut state = DashboardState::default();
        state.begin_refresh(ResourceKind::DashboardStats);
        state.complete_refresh(
            ResourceKind::DashboardStats,
            Ok(ResourcePayload::DashboardStats(StatsPatch {
                sos_alerts: Some(3),
                ..Default::default()
            })),
        );

        fold(
            &mut state,
            "dashboard_update",
            json!({"type": "SOS", "aadhaar_number": "X", "latitude": 1, "longitude": 2}),
        );

        assert_eq!(state.alerts().len(), 1);
        assert_eq!(state.sos_feed().len(), 1);
        assert!(state.geofence_feed().is_empty());
        let alert = state.alerts().latest().unwrap();
        assert_eq!(alert.subject_id, SubjectId::new("X"));
        assert_eq!(alert.location, GeoPoint::new(1.0, 2.0));
        assert_eq!(state.stats().data().sos_alerts, 4);
    }

    #[test]
    fn snapshot_overwrites_optimistic_increment() {
        let mut state = DashboardState::default();
        fold(
            &mut state,
            "dashboard_update",
            json!({"type": "SOS", "aadhaar_number": "X", "latitude": 1, "longitude": 2}),
        );
        assert_eq!(state.stats().data().sos_alerts, 1);

        fold(&mut state, "dashboard_stats", json!({"sos_alerts": 7}));
        assert_eq!(state.stats().data().sos_alerts, 7);
    }

    #[test]
    fn rest_completion_overwrites_optimistic_increment() {
        let mut state = DashboardState::default();
        fold(
            &mut state,
            "dashboard_update",
            json!({"type": "SOS", "aadhaar_number": "X", "latitude": 1, "longitude": 2}),
        );
        state.begin_refresh(ResourceKind::DashboardStats);
        state.complete_refresh(
            ResourceKind::DashboardStats,
            Ok(ResourcePayload::DashboardStats(StatsPatch::from(&DashboardStats::default()))),
        );
        assert_eq!(state.stats().data().sos_alerts, 0);
    }

    #[test]
    fn rest_stats_keep_pushed_fields_they_omit() {
        let mut state = DashboardState::default();
        fold(
            &mut state,
            "dashboard_stats",
            json!({"broadcasts_sent": 4, "safety_index": 0.9}),
        );

        state.begin_refresh(ResourceKind::DashboardStats);
        let body: StatsPatch = serde_json::from_value(json!({"sos_alerts": 2})).unwrap();
        state.complete_refresh(
            ResourceKind::DashboardStats,
            Ok(ResourcePayload::DashboardStats(body)),
        );

        let stats = state.stats().data();
        assert_eq!(stats.sos_alerts, 2);
        assert_eq!(stats.broadcasts_sent, 4);
        assert_eq!(stats.extra.get("safety_index"), Some(&json!(0.9)));
    }

    #[test]
    fn breach_lands_in_geofence_feed_only() {
        let mut state = DashboardState::default();
        fold(
            &mut state,
            "dashboard_update",
            json!({"geofence_breached": true, "tourist_id": "T", "lat": 1, "lng": 2, "geofence_id": "z"}),
        );

        assert_eq!(state.alerts().len(), 1);
        assert_eq!(state.geofence_feed().len(), 1);
        assert!(state.sos_feed().is_empty());
        assert_eq!(state.stats().data().sos_alerts, 0);
    }

    #[test]
    fn feeds_stay_bounded() {
        let mut state = DashboardState::default();
        for i in 0..60 {
            fold(
                &mut state,
                "dashboard_update",
                json!({"type": "SOS", "aadhaar_number": format!("S{i}"), "latitude": 1, "longitude": 2}),
            );
        }
        assert_eq!(state.alerts().len(), 50);
        assert_eq!(state.sos_feed().len(), 20);
        assert_eq!(
            state.alerts().latest().map(|a| a.subject_id.as_str().to_string()),
            Some("S59".to_string())
        );
    }

    #[test]
    fn location_update_replaces_record() {
        let mut state = DashboardState::default();
        fold(&mut state, "dashboard_update", json!({"subjectId": "A", "lat": 1, "lng": 1}));
        fold(
            &mut state,
            "tourist_update",
            json!({"subjectId": "A", "lat": 2, "lng": 2, "location_name": "Fort"}),
        );

        let record = state.location_of(&SubjectId::new("A")).unwrap();
        assert_eq!(record.location, GeoPoint::new(2.0, 2.0));
        assert_eq!(record.location_name, "Fort");
        assert_eq!(state.locations().len(), 1);
    }

    #[test]
    fn ack_is_not_stored() {
        let mut state = DashboardState::default();
        let outcome = fold(&mut state, "connection_confirmed", json!({"message": "hi"}));
        assert_eq!(outcome, FoldOutcome::Ignored);
        assert_eq!(state.events_applied(), 0);
    }

    #[test]
    fn unknown_envelopes_go_to_rolling_log() {
        let mut state = DashboardState::default();
        fold(&mut state, "weather", json!({}));
        assert_eq!(state.unclassified().len(), 1);
        assert!(state.alerts().is_empty());
    }

    #[test]
    fn events_after_dispose_are_discarded() {
        let mut state = DashboardState::default();
        state.dispose();
        let outcome = fold(
            &mut state,
            "dashboard_update",
            json!({"type": "SOS", "aadhaar_number": "X", "latitude": 1, "longitude": 2}),
        );
        assert_eq!(outcome, FoldOutcome::Discarded);
        assert!(state.alerts().is_empty());
    }

    #[test]
    fn unclassified_log_keeps_reason() {
        let mut state = DashboardState::default();
        let now = Timestamp::now();
        state.apply_event_at(
            TypedEvent::Unclassified(UnclassifiedEvent {
                event_type: "x".into(),
                reason: "because".into(),
                data: Map::new(),
                received_at: now,
            }),
            now,
        );
        assert_eq!(state.unclassified().latest().map(|e| e.reason.as_str()), Some("because"));
    }

    fn patch_strategy() -> impl Strategy<Value = StatsPatch> {
        (
            proptest::option::of(0u64..1000),
            proptest::option::of(0u64..1000),
            proptest::option::of(0u64..1000),
            proptest::option::of(0u64..1000),
        )
            .prop_map(|(total, active, sos, violations)| StatsPatch {
                total_tourists: total,
                active_tourists: active,
                sos_alerts: sos,
                geofence_violations: violations,
                ..Default::default()
            })
    }

    fn location_strategy() -> impl Strategy<Value = Vec<LocationUpdate>> {
        proptest::collection::btree_map("[a-z]{1,6}", (-80.0f64..80.0, -170.0f64..170.0), 1..12)
            .prop_map(|subjects| {
                let at = Timestamp::now();
                subjects
                    .into_iter()
                    .map(|(id, (lat, lng))| LocationUpdate {
                        subject_id: SubjectId::new(id),
                        location: GeoPoint::new(lat, lng),
                        timestamp: at,
                        location_name: None,
                    })
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn stats_snapshot_is_idempotent(patch in patch_strategy()) {
            let at = Timestamp::now();
            let mut once = DashboardState::default();
            once.apply_event_at(TypedEvent::StatsSnapshot(patch.clone()), at);

            let mut twice = DashboardState::default();
            twice.apply_event_at(TypedEvent::StatsSnapshot(patch.clone()), at);
            twice.apply_event_at(TypedEvent::StatsSnapshot(patch), at);

            prop_assert_eq!(once.stats().data(), twice.stats().data());
        }

        #[test]
        fn location_updates_commute_across_subjects(updates in location_strategy()) {
            let at = Timestamp::now();
            let mut forward = DashboardState::default();
            for update in updates.iter().cloned() {
                forward.apply_event_at(TypedEvent::LocationUpdate(update), at);
            }

            let mut backward = DashboardState::default();
            for update in updates.iter().rev().cloned() {
                backward.apply_event_at(TypedEvent::LocationUpdate(update), at);
            }

            prop_assert_eq!(forward.locations(), backward.locations());
        }
    }
}
