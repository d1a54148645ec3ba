//! Rendimiento de conductores y puntuación de seguridad

use crate::models::analytics::{DriverPerformance, IncidentCounts, SafetyStats, ScoreBand, TripStats};
use crate::models::driver::{Driver, DriverMetrics};
use crate::models::safety_incident::{IncidentType, SafetyIncident};
use crate::models::snapshot::DriverSnapshot;
use crate::models::trip::{Trip, TripStatus};
use crate::utils::validation::round1;

const VIOLATION_PENALTY: f64 = 10.0;
const ACCIDENT_PENALTY: f64 = 20.0;
const COMPLAINT_PENALTY: f64 = 5.0;
const NEAR_MISS_PENALTY: f64 = 2.0;

/// Bonificación para conductores veteranos sin incidentes
const CLEAN_RECORD_BONUS: f64 = 5.0;
const CLEAN_RECORD_MIN_TRIPS: usize = 100;

pub fn count_incidents<'a>(incidents: impl IntoIterator<Item = &'a SafetyIncident>) -> IncidentCounts {
    let mut counts = IncidentCounts::default();
    for incident in incidents.into_iter().filter(|i| i.active.is_active()) {
        match incident.incident_type {
            IncidentType::Accident => counts.accident += 1,
            IncidentType::Violation => counts.violation += 1,
            IncidentType::NearMiss => counts.near_miss += 1,
            IncidentType::Complaint => counts.complaint += 1,
        }
        counts.total += 1;
    }
    counts
}

/// Puntuación 0-100 a partir de los incidentes activos
pub fn safety_score(counts: &IncidentCounts, completed_trips: usize) -> f64 {
    let mut score = 100.0
        - counts.violation as f64 * VIOLATION_PENALTY
        - counts.accident as f64 * ACCIDENT_PENALTY
        - counts.complaint as f64 * COMPLAINT_PENALTY
        - counts.near_miss as f64 * NEAR_MISS_PENALTY;

    if completed_trips >= CLEAN_RECORD_MIN_TRIPS && counts.total == 0 {
        score += CLEAN_RECORD_BONUS;
    }
    score.clamp(0.0, 100.0)
}

pub fn score_band(score: f64) -> ScoreBand {
    if score > 80.0 {
        ScoreBand::Green
    } else if score >= 60.0 {
        ScoreBand::Yellow
    } else {
        ScoreBand::Red
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round1(part as f64 / whole as f64 * 100.0)
    }
}

/// Estadísticas de viajes de un conductor (incluye viajes archivados)
pub fn trip_stats<'a>(trips: impl IntoIterator<Item = &'a Trip>) -> TripStats {
    let mut total = 0;
    let mut completed = 0;
    let mut cancelled = 0;
    let mut on_time = 0;

    for trip in trips {
        total += 1;
        match trip.status {
            TripStatus::Completed => {
                completed += 1;
                if let (Some(actual), Some(estimated)) =
                    (trip.schedule.actual_arrival, trip.schedule.estimated_arrival)
                {
                    if actual <= estimated {
                        on_time += 1;
                    }
                }
            }
            TripStatus::Cancelled => cancelled += 1,
            _ => {}
        }
    }

    TripStats {
        total,
        completed,
        cancelled,
        completion_rate: percentage(completed, total),
        on_time,
        on_time_rate: percentage(on_time, completed),
    }
}

/// Calcula el informe y devuelve las métricas a cachear si cambiaron
pub fn driver_performance(
    driver: &Driver,
    trips: &[Trip],
    incidents: &[SafetyIncident],
) -> (DriverPerformance, Option<DriverMetrics>) {
    let trips = trip_stats(trips.iter().filter(|t| t.driver.as_ref().map(|d| d.id) == Some(driver.id)));
    let counts = count_incidents(incidents.iter().filter(|i| i.driver.id == driver.id));
    let score = safety_score(&counts, trips.completed);

    let metrics = DriverMetrics {
        safety_score: score,
        trip_completion_rate: trips.completion_rate,
    };
    let changed = (metrics != driver.metrics).then_some(metrics);

    let report = DriverPerformance {
        driver: DriverSnapshot::from(driver),
        trips,
        safety: SafetyStats {
            score,
            color: score_band(score),
            incidents: counts,
        },
    };
    (report, changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::{Audit, Lifecycle};
    use crate::models::driver::tests::sample_driver;
    use crate::models::driver::DriverStatus;
    use crate::models::reference::LicenseCategory;
    use crate::models::safety_incident::Severity;
    use crate::models::snapshot::VehicleSnapshot;
    use crate::models::trip::tests::sample_trip;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn incident(driver: &Driver, kind: IncidentType) -> SafetyIncident {
        SafetyIncident {
            id: Uuid::new_v4(),
            driver: DriverSnapshot::from(driver),
            trip: None,
            incident_date: Utc::now(),
            incident_type: kind,
            description: "Reported by dispatcher".to_string(),
            severity: Severity::Minor,
            actions_taken: String::new(),
            active: Lifecycle::Active,
            audit: Audit::new(None, Utc::now()),
        }
    }

    fn vehicle() -> VehicleSnapshot {
        VehicleSnapshot {
            id: Uuid::new_v4(),
            license_plate: "TRK-0001".to_string(),
            name: "Volvo FH".to_string(),
            vehicle_type_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_score_penalties_and_clamp() {
        let counts = IncidentCounts {
            accident: 1,
            violation: 2,
            near_miss: 1,
            complaint: 1,
            total: 5,
        };
        assert_eq!(safety_score(&counts, 10), 53.0);

        let terrible = IncidentCounts {
            accident: 6,
            total: 6,
            ..Default::default()
        };
        assert_eq!(safety_score(&terrible, 0), 0.0);
    }

    #[test]
    fn test_clean_record_bonus_is_capped() {
        assert_eq!(safety_score(&IncidentCounts::default(), 150), 100.0);
        let one_near_miss = IncidentCounts {
            near_miss: 1,
            total: 1,
            ..Default::default()
        };
        assert_eq!(safety_score(&one_near_miss, 150), 98.0);
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(score_band(81.0), ScoreBand::Green);
        assert_eq!(score_band(80.0), ScoreBand::Yellow);
        assert_eq!(score_band(60.0), ScoreBand::Yellow);
        assert_eq!(score_band(59.9), ScoreBand::Red);
    }

    #[test]
    fn test_performance_reports_rates_and_changed_metrics() {
        let driver = sample_driver(LicenseCategory::C, DriverStatus::OnDuty);
        let now = Utc::now();
        let mut trips = Vec::new();
        for i in 0..3 {
            let mut trip = sample_trip(vehicle());
            trip.driver = Some(DriverSnapshot::from(&driver));
            trip.status = TripStatus::Completed;
            trip.schedule.estimated_arrival = Some(now);
            // El tercero llega tarde
            trip.schedule.actual_arrival = Some(now + Duration::hours(i - 1));
            trips.push(trip);
        }
        let mut cancelled = sample_trip(vehicle());
        cancelled.driver = Some(DriverSnapshot::from(&driver));
        cancelled.cancel("Weather");
        trips.push(cancelled);
        // Viaje de otro conductor
        trips.push(sample_trip(vehicle()));

        let mut archived = incident(&driver, IncidentType::Accident);
        archived.active = Lifecycle::Archived;
        let incidents = vec![incident(&driver, IncidentType::Violation), archived];

        let (report, metrics) = driver_performance(&driver, &trips, &incidents);
        assert_eq!(report.trips.total, 4);
        assert_eq!(report.trips.completed, 3);
        assert_eq!(report.trips.completion_rate, 75.0);
        assert_eq!(report.trips.on_time, 2);
        assert_eq!(report.trips.on_time_rate, 66.7);
        assert_eq!(report.safety.incidents.total, 1);
        assert_eq!(report.safety.score, 90.0);
        assert_eq!(report.safety.color, ScoreBand::Green);
        assert_eq!(
            metrics,
            Some(DriverMetrics {
                safety_score: 90.0,
                trip_completion_rate: 75.0
            })
        );
    }

    #[test]
    fn test_unchanged_metrics_are_not_rewritten() {
        let mut driver = sample_driver(LicenseCategory::B, DriverStatus::OffDuty);
        driver.metrics = DriverMetrics {
            safety_score: 100.0,
            trip_completion_rate: 0.0,
        };
        let (_, metrics) = driver_performance(&driver, &[], &[]);
        assert_eq!(metrics, None);
    }
}
