//! Agregaciones de sólo lectura
//!
//! Dashboard, costes operativos, burn rate mensual, eficiencia de combustible
//! y listado global de gastos. Las funciones trabajan sobre los registros ya
//! cargados por el controlador; ninguna escribe en el store.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::analytics::{
    AppliedFilters, BurnRateMonth, CategoryAmount, DailyTripCount, DashboardCharts, DashboardMeta,
    DashboardSummary, ExpenseRecord, FleetKpis, FuelEfficiencyPoint, FuelEfficiencyReport,
    MonthlyAmount, OperationalCost, Page, StatusCount, VehicleDistance,
};
use crate::models::maintenance::{MaintenanceLog, MaintenanceStatus};
use crate::models::trip::{ExpenseType, Trip, TripStatus};
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::utils::errors::{bad_request_error, AppResult};
use crate::utils::validation::{
    end_of_local_day, local_today, parse_csv, parse_datetime, parse_uuid, round1, round2,
    start_of_local_day,
};

const STATUS_FILTER_NOTE: &str = "KPI counts (activeFleet, maintenanceAlerts, utilizationRate) always reflect the full fleet scoped by region/type. The status filter applies to fleetStatusBreakdown only.";

pub const DEFAULT_BURN_RATE_MONTHS: u32 = 6;
pub const MAX_BURN_RATE_MONTHS: u32 = 24;

/// Rango de fechas inclusivo; cualquiera de los extremos puede faltar
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// `startDate`/`endDate` de la query. El fin se extiende hasta las
    /// 23:59:59.999 locales de su día.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> AppResult<Self> {
        let start = non_blank(start)
            .map(|s| parse_datetime(s, "startDate"))
            .transpose()?;
        let end = non_blank(end)
            .map(|s| parse_datetime(s, "endDate").map(end_of_local_day))
            .transpose()?;

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(bad_request_error("startDate must not be after endDate"));
            }
        }
        Ok(Self { start, end })
    }

    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| at >= s) && self.end.map_or(true, |e| at <= e)
    }

    /// Igual que `contains`, pero un instante ausente sólo pasa si el rango
    /// no tiene límites
    pub fn contains_opt(&self, at: Option<DateTime<Utc>>) -> bool {
        match at {
            Some(at) => self.contains(at),
            None => self.is_unbounded(),
        }
    }

    /// Intersección: ambos rangos deben cumplirse
    pub fn and(&self, other: &DateRange) -> DateRange {
        let end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        DateRange {
            start: self.start.max(other.start),
            end,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

fn money(amount: Decimal) -> f64 {
    round2(to_f64(amount))
}

fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// Primer día del mes local, `months_back` meses atrás
fn first_of_month(today: NaiveDate, months_back: u32) -> DateTime<Utc> {
    let first = today.with_day(1).unwrap_or(today);
    let date = first.checked_sub_months(Months::new(months_back)).unwrap_or(first);
    start_of_local_day(date)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Filtros del dashboard ya validados
#[derive(Debug, Clone, Default)]
pub struct DashboardFilters {
    pub region_id: Option<Uuid>,
    pub vehicle_type_id: Option<Uuid>,
    pub statuses: Option<Vec<VehicleStatus>>,
    pub range: DateRange,
}

impl DashboardFilters {
    pub fn parse(
        region_id: Option<&str>,
        vehicle_type_id: Option<&str>,
        status: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> AppResult<Self> {
        let statuses = match non_blank(status) {
            Some(raw) => {
                let parsed: Vec<VehicleStatus> = parse_csv(raw).map_err(|invalid| {
                    let allowed: Vec<&str> = VehicleStatus::ALL.iter().map(|s| s.as_str()).collect();
                    bad_request_error(format!(
                        "Invalid status value(s): {}. Allowed: {}",
                        invalid.join(", "),
                        allowed.join(", ")
                    ))
                })?;
                Some(parsed).filter(|s| !s.is_empty())
            }
            None => None,
        };

        Ok(Self {
            region_id: non_blank(region_id).map(|v| parse_uuid(v, "region_id")).transpose()?,
            vehicle_type_id: non_blank(vehicle_type_id)
                .map(|v| parse_uuid(v, "vehicle_type_id"))
                .transpose()?,
            statuses,
            range: DateRange::parse(start_date, end_date)?,
        })
    }

    fn vehicle_matches(&self, vehicle: &Vehicle, with_status: bool) -> bool {
        if !vehicle.is_active() {
            return false;
        }
        if let Some(region_id) = self.region_id {
            if vehicle.region.as_ref().map(|r| r.id) != Some(region_id) {
                return false;
            }
        }
        if let Some(type_id) = self.vehicle_type_id {
            if vehicle.vehicle_type.id != type_id {
                return false;
            }
        }
        match (&self.statuses, with_status) {
            (Some(statuses), true) => statuses.contains(&vehicle.status),
            _ => true,
        }
    }

    fn trip_matches(&self, trip: &Trip) -> bool {
        if !trip.active.is_active() {
            return false;
        }
        if let Some(region_id) = self.region_id {
            if trip.region.as_ref().map(|r| r.id) != Some(region_id) {
                return false;
            }
        }
        if let Some(type_id) = self.vehicle_type_id {
            if trip.vehicle.vehicle_type_id != type_id {
                return false;
            }
        }
        true
    }

    fn applied(&self) -> AppliedFilters {
        AppliedFilters {
            region_id: self.region_id,
            vehicle_type_id: self.vehicle_type_id,
            status: self.statuses.clone(),
            start_date: self.range.start,
            end_date: self.range.end,
        }
    }
}

/// Resumen del dashboard: KPIs y las cuatro series de gráficos
pub fn dashboard_summary(
    vehicles: &[Vehicle],
    trips: &[Trip],
    filters: &DashboardFilters,
    now: DateTime<Utc>,
) -> DashboardSummary {
    let today = local_today(now);
    let seven_days_ago = start_of_local_day(today - Duration::days(7));
    let six_months_ago = first_of_month(today, 6);
    let start_of_month = first_of_month(today, 0);

    // 1. KPIs: el filtro de estado nunca se aplica aquí
    let kpi_fleet: Vec<&Vehicle> = vehicles
        .iter()
        .filter(|v| filters.vehicle_matches(v, false))
        .collect();
    let count_status = |status: VehicleStatus| kpi_fleet.iter().filter(|v| v.status == status).count();
    let active_fleet = count_status(VehicleStatus::OnTrip);
    let total_active_vehicles = kpi_fleet
        .iter()
        .filter(|v| v.status != VehicleStatus::OutOfService)
        .count();
    let utilization_rate = if total_active_vehicles > 0 {
        round1(active_fleet as f64 / total_active_vehicles as f64 * 100.0)
    } else {
        0.0
    };

    // Los borradores no tienen llegada: sin filtro de fechas
    let pending_cargo = trips
        .iter()
        .filter(|t| filters.trip_matches(t) && t.status == TripStatus::Draft)
        .count();

    let kpis = FleetKpis {
        active_fleet,
        maintenance_alerts: count_status(VehicleStatus::InShop),
        pending_cargo,
        utilization_rate,
        total_active_vehicles,
    };

    // 2. Desglose por estado
    let mut breakdown: BTreeMap<&'static str, StatusCount> = BTreeMap::new();
    for vehicle in vehicles.iter().filter(|v| filters.vehicle_matches(v, true)) {
        breakdown
            .entry(vehicle.status.as_str())
            .or_insert(StatusCount {
                status: vehicle.status,
                count: 0,
            })
            .count += 1;
    }

    // 3. Viajes completados por día en la última semana
    let week = DateRange::since(seven_days_ago).and(&filters.range);
    let mut weekly: BTreeMap<String, usize> = BTreeMap::new();
    for trip in completed_trips_within(trips, filters, &week) {
        if let Some(arrival) = trip.schedule.actual_arrival {
            *weekly.entry(arrival.format("%Y-%m-%d").to_string()).or_default() += 1;
        }
    }

    // 4. Gasto de combustible mensual de los últimos seis meses
    let fuel_window = DateRange::since(six_months_ago).and(&filters.range);
    let mut fuel: BTreeMap<String, Decimal> = BTreeMap::new();
    for trip in trips.iter().filter(|t| filters.trip_matches(t)) {
        for expense in trip.active_expenses() {
            if expense.expense_type == ExpenseType::Fuel && fuel_window.contains(expense.expense_date) {
                *fuel.entry(month_key(expense.expense_date)).or_default() += expense.amount;
            }
        }
    }

    // 5. Top 5 de vehículos por distancia en el mes en curso
    let month = DateRange::since(start_of_month).and(&filters.range);
    let mut distances: BTreeMap<Uuid, VehicleDistance> = BTreeMap::new();
    for trip in completed_trips_within(trips, filters, &month) {
        let entry = distances.entry(trip.vehicle.id).or_insert_with(|| {
            let current = vehicles.iter().find(|v| v.id == trip.vehicle.id);
            VehicleDistance {
                vehicle_id: trip.vehicle.id,
                license_plate: current
                    .map(|v| v.license_plate.clone())
                    .unwrap_or_else(|| trip.vehicle.license_plate.clone()),
                name: current
                    .map(|v| v.name.clone())
                    .unwrap_or_else(|| trip.vehicle.name.clone()),
                total_distance: 0.0,
                trip_count: 0,
            }
        });
        entry.total_distance += trip.distance_km().unwrap_or_default();
        entry.trip_count += 1;
    }
    let mut top: Vec<VehicleDistance> = distances.into_values().collect();
    top.sort_by(|a, b| b.total_distance.total_cmp(&a.total_distance));
    top.truncate(5);

    DashboardSummary {
        kpis,
        charts: DashboardCharts {
            fleet_status_breakdown: breakdown.into_values().collect(),
            weekly_trip_volume: weekly
                .into_iter()
                .map(|(date, trips)| DailyTripCount { date, trips })
                .collect(),
            fuel_spend_trend: fuel
                .into_iter()
                .map(|(month, amount)| MonthlyAmount {
                    month,
                    amount: money(amount),
                })
                .collect(),
            top_vehicles_by_distance: top,
        },
        meta: DashboardMeta {
            generated_at: now,
            filters: filters.applied(),
            note: filters.statuses.as_ref().map(|_| STATUS_FILTER_NOTE.to_string()),
        },
    }
}

fn completed_trips_within<'a>(
    trips: &'a [Trip],
    filters: &'a DashboardFilters,
    window: &'a DateRange,
) -> impl Iterator<Item = &'a Trip> {
    trips.iter().filter(move |t| {
        filters.trip_matches(t)
            && t.status == TripStatus::Completed
            && window.contains_opt(t.schedule.actual_arrival)
    })
}

// ---------------------------------------------------------------------------
// Costes
// ---------------------------------------------------------------------------

/// Coste operativo de un vehículo.
///
/// Los gastos se filtran por `expense_date` y el mantenimiento por fecha de
/// finalización; la distancia siempre cubre todos los viajes completados.
pub fn operational_cost(
    vehicle_id: Uuid,
    trips: &[Trip],
    logs: &[MaintenanceLog],
    range: &DateRange,
) -> OperationalCost {
    let vehicle_trips = trips
        .iter()
        .filter(|t| t.vehicle.id == vehicle_id && t.active.is_active());

    let mut fuel_cost = Decimal::ZERO;
    let mut fuel_liters = 0.0;
    let mut other = Decimal::ZERO;
    let mut distance = 0.0;
    let mut completed_trips = 0;

    for trip in vehicle_trips {
        for expense in trip.active_expenses().filter(|e| range.contains(e.expense_date)) {
            match expense.expense_type {
                ExpenseType::Fuel => {
                    fuel_cost += expense.amount;
                    fuel_liters += expense.fuel_details.as_ref().map_or(0.0, |f| f.quantity);
                }
                _ => other += expense.amount,
            }
        }
        if trip.status == TripStatus::Completed {
            distance += trip.distance_km().unwrap_or_default();
            completed_trips += 1;
        }
    }

    let completed_logs: Vec<&MaintenanceLog> = logs
        .iter()
        .filter(|l| {
            l.vehicle.id == vehicle_id
                && l.is_active()
                && l.status == MaintenanceStatus::Completed
                && range.contains_opt(l.dates.completion)
        })
        .collect();
    let maintenance: Decimal = completed_logs.iter().map(|l| l.cost).sum();

    let total = fuel_cost + other + maintenance;
    OperationalCost {
        vehicle_id,
        fuel_cost: money(fuel_cost),
        fuel_liters: round2(fuel_liters),
        other_expenses: money(other),
        maintenance_cost: money(maintenance),
        maintenance_services: completed_logs.len(),
        total_operational_cost: money(total),
        total_distance_km: distance,
        completed_trips,
        cost_per_km: (distance > 0.0).then(|| round2(to_f64(total) / distance)),
        fuel_efficiency_km_per_liter: (fuel_liters > 0.0).then(|| round2(distance / fuel_liters)),
    }
}

/// Número de meses del burn rate: por defecto 6, acotado a 1..=24
pub fn parse_months(raw: Option<&str>) -> AppResult<u32> {
    match non_blank(raw) {
        None => Ok(DEFAULT_BURN_RATE_MONTHS),
        Some(value) => {
            let months: i64 = value
                .parse()
                .map_err(|_| bad_request_error("months must be a whole number"))?;
            Ok(months.clamp(1, MAX_BURN_RATE_MONTHS as i64) as u32)
        }
    }
}

/// Gasto mensual: gastos de viaje por categoría más mantenimiento completado
pub fn monthly_burn_rate(
    trips: &[Trip],
    logs: &[MaintenanceLog],
    vehicle_id: Option<Uuid>,
    months: u32,
    now: DateTime<Utc>,
) -> Vec<BurnRateMonth> {
    let since = first_of_month(local_today(now), months);
    let for_vehicle = |id: Uuid| vehicle_id.map_or(true, |v| v == id);

    let mut expenses: BTreeMap<String, BTreeMap<ExpenseType, Decimal>> = BTreeMap::new();
    for trip in trips
        .iter()
        .filter(|t| t.active.is_active() && for_vehicle(t.vehicle.id))
    {
        for expense in trip.active_expenses().filter(|e| e.expense_date >= since) {
            *expenses
                .entry(month_key(expense.expense_date))
                .or_default()
                .entry(expense.expense_type)
                .or_default() += expense.amount;
        }
    }

    let mut maintenance: BTreeMap<String, Decimal> = BTreeMap::new();
    for log in logs.iter().filter(|l| {
        l.is_active() && l.status == MaintenanceStatus::Completed && for_vehicle(l.vehicle.id)
    }) {
        if let Some(completion) = log.dates.completion.filter(|c| *c >= since) {
            *maintenance.entry(month_key(completion)).or_default() += log.cost;
        }
    }

    let mut months: BTreeMap<String, BurnRateMonth> = BTreeMap::new();
    for (month, by_type) in expenses {
        let trip_total: Decimal = by_type.values().copied().sum();
        months.insert(
            month.clone(),
            BurnRateMonth {
                month,
                trip_expenses: money(trip_total),
                maintenance: 0.0,
                total: money(trip_total),
                breakdown: by_type
                    .into_iter()
                    .map(|(expense_type, amount)| CategoryAmount {
                        expense_type,
                        amount: money(amount),
                    })
                    .collect(),
            },
        );
    }
    for (month, cost) in maintenance {
        let entry = months.entry(month.clone()).or_insert_with(|| BurnRateMonth {
            month,
            trip_expenses: 0.0,
            maintenance: 0.0,
            total: 0.0,
            breakdown: Vec::new(),
        });
        entry.maintenance = money(cost);
        entry.total = round2(entry.trip_expenses + to_f64(cost));
    }

    months.into_values().collect()
}

/// Eficiencia entre repostajes consecutivos, ordenados por odómetro
pub fn fuel_efficiency(vehicle_id: Uuid, trips: &[Trip]) -> FuelEfficiencyReport {
    let mut points: Vec<FuelEfficiencyPoint> = trips
        .iter()
        .filter(|t| t.vehicle.id == vehicle_id && t.active.is_active())
        .flat_map(|trip| {
            trip.active_expenses().filter_map(move |expense| {
                let details = expense.fuel_details.as_ref()?;
                if expense.expense_type != ExpenseType::Fuel || details.odometer_reading <= 0.0 {
                    return None;
                }
                Some(FuelEfficiencyPoint {
                    expense_id: expense.id,
                    trip_reference: trip.trip_reference.clone(),
                    date: expense.expense_date,
                    odometer_reading: details.odometer_reading,
                    quantity: details.quantity,
                    amount: money(expense.amount),
                    efficiency_km_per_liter: None,
                })
            })
        })
        .collect();
    points.sort_by(|a, b| a.odometer_reading.total_cmp(&b.odometer_reading));

    for idx in 1..points.len() {
        let distance = points[idx].odometer_reading - points[idx - 1].odometer_reading;
        let quantity = points[idx].quantity;
        points[idx].efficiency_km_per_liter = (quantity > 0.0).then(|| round2(distance / quantity));
    }

    let valid: Vec<f64> = points
        .iter()
        .filter_map(|p| p.efficiency_km_per_liter)
        .filter(|e| *e > 0.0)
        .collect();
    let average_km_per_liter =
        (!valid.is_empty()).then(|| round2(valid.iter().sum::<f64>() / valid.len() as f64));

    FuelEfficiencyReport {
        vehicle_id,
        points,
        average_km_per_liter,
    }
}

/// Filtro del listado global de gastos
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub vehicle_id: Option<Uuid>,
    pub expense_type: Option<ExpenseType>,
    pub range: DateRange,
}

impl ExpenseFilter {
    pub fn parse(
        vehicle_id: Option<&str>,
        expense_type: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> AppResult<Self> {
        Ok(Self {
            vehicle_id: non_blank(vehicle_id).map(|v| parse_uuid(v, "vehicle_id")).transpose()?,
            expense_type: non_blank(expense_type)
                .map(|v| v.to_lowercase().parse::<ExpenseType>().map_err(bad_request_error))
                .transpose()?,
            range: DateRange::parse(start_date, end_date)?,
        })
    }
}

/// Gastos activos de todos los viajes, del más reciente al más antiguo
pub fn list_expenses(
    trips: &[Trip],
    filter: &ExpenseFilter,
    page: usize,
    limit: usize,
) -> Page<ExpenseRecord> {
    let mut records: Vec<ExpenseRecord> = trips
        .iter()
        .filter(|t| t.active.is_active() && filter.vehicle_id.map_or(true, |v| v == t.vehicle.id))
        .flat_map(|trip| {
            trip.active_expenses()
                .filter(|e| filter.expense_type.map_or(true, |t| t == e.expense_type))
                .filter(|e| filter.range.contains(e.expense_date))
                .map(move |expense| ExpenseRecord {
                    trip_id: trip.id,
                    trip_reference: trip.trip_reference.clone(),
                    vehicle: trip.vehicle.clone(),
                    expense: expense.clone(),
                })
        })
        .collect();
    records.sort_by(|a, b| b.expense.expense_date.cmp(&a.expense.expense_date));
    Page::from_sorted(records, page, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::Lifecycle;
    use crate::models::maintenance::tests::sample_log;
    use crate::models::snapshot::VehicleSnapshot;
    use crate::models::trip::tests::sample_trip;
    use crate::models::trip::{Expense, FuelDetails, FuelType};
    use crate::models::vehicle::tests::sample_vehicle;

    fn expense(kind: ExpenseType, amount: i64, at: DateTime<Utc>) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            expense_type: kind,
            expense_date: at,
            amount: Decimal::new(amount, 0),
            fuel_details: None,
            notes: String::new(),
            active: Lifecycle::Active,
            created_by: None,
            created_at: at,
        }
    }

    fn fill_up(odometer: f64, liters: f64, at: DateTime<Utc>) -> Expense {
        let mut e = expense(ExpenseType::Fuel, 100, at);
        e.fuel_details = Some(FuelDetails {
            quantity: liters,
            unit_price: Decimal::new(2, 0),
            fuel_type: FuelType::Diesel,
            station_name: String::new(),
            odometer_reading: odometer,
        });
        e
    }

    fn completed_trip(vehicle: &Vehicle, distance: f64, arrival: DateTime<Utc>) -> Trip {
        let mut trip = sample_trip(VehicleSnapshot::from(vehicle));
        trip.status = TripStatus::Completed;
        trip.odometer.end = Some(trip.odometer.start + distance);
        trip.schedule.actual_arrival = Some(arrival);
        trip
    }

    #[test]
    fn test_date_range_rejects_inverted_and_malformed() {
        assert!(DateRange::parse(Some("2026-02-01"), Some("2026-01-01")).is_err());
        assert!(DateRange::parse(Some("yesterday"), None).is_err());
        let range = DateRange::parse(Some("2026-01-01"), Some("2026-01-01")).unwrap();
        assert!(range.start.unwrap() < range.end.unwrap());
        assert!(DateRange::parse(None, Some("  ")).unwrap().is_unbounded());
    }

    #[test]
    fn test_date_range_intersection_is_conjunctive() {
        let now = Utc::now();
        let user = DateRange {
            start: Some(now - Duration::days(30)),
            end: Some(now - Duration::days(10)),
        };
        let merged = DateRange::since(now - Duration::days(7)).and(&user);
        assert_eq!(merged.start, Some(now - Duration::days(7)));
        assert_eq!(merged.end, Some(now - Duration::days(10)));
        assert!(!merged.contains(now - Duration::days(8)));
    }

    #[test]
    fn test_dashboard_rejects_unknown_status() {
        let err = DashboardFilters::parse(None, None, Some("available,parked"), None, None).unwrap_err();
        match err {
            crate::utils::errors::AppError::BadRequest(msg) => assert_eq!(
                msg,
                "Invalid status value(s): parked. Allowed: available, on_trip, in_shop, out_of_service"
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_dashboard_kpis_ignore_status_filter() {
        let now = Utc::now();
        let mut on_trip = sample_vehicle();
        on_trip.status = VehicleStatus::OnTrip;
        let available = sample_vehicle();
        let mut retired = sample_vehicle();
        retired.status = VehicleStatus::OutOfService;
        let vehicles = vec![on_trip.clone(), available, retired];

        let draft = sample_trip(VehicleSnapshot::from(&on_trip));
        let done = completed_trip(&on_trip, 120.0, now);

        let filters = DashboardFilters {
            statuses: Some(vec![VehicleStatus::Available]),
            ..Default::default()
        };
        let summary = dashboard_summary(&vehicles, &[draft, done], &filters, now);

        assert_eq!(summary.kpis.active_fleet, 1);
        assert_eq!(summary.kpis.total_active_vehicles, 2);
        assert_eq!(summary.kpis.utilization_rate, 50.0);
        assert_eq!(summary.kpis.pending_cargo, 1);
        assert_eq!(summary.charts.fleet_status_breakdown.len(), 1);
        assert_eq!(summary.charts.fleet_status_breakdown[0].status, VehicleStatus::Available);
        assert!(summary.meta.note.is_some());

        assert_eq!(summary.charts.weekly_trip_volume.len(), 1);
        assert_eq!(summary.charts.top_vehicles_by_distance[0].total_distance, 120.0);
    }

    #[test]
    fn test_dashboard_user_range_narrows_charts() {
        let now = Utc::now();
        let vehicle = sample_vehicle();
        let trip = completed_trip(&vehicle, 80.0, now);
        let filters = DashboardFilters {
            range: DateRange {
                start: None,
                end: Some(now - Duration::days(20)),
            },
            ..Default::default()
        };
        let summary = dashboard_summary(&[vehicle], &[trip], &filters, now);
        assert!(summary.charts.weekly_trip_volume.is_empty());
        assert!(summary.charts.top_vehicles_by_distance.is_empty());
    }

    #[test]
    fn test_fuel_trend_filters_by_expense_date() {
        let now = Utc::now();
        let vehicle = sample_vehicle();
        // Llegada fuera del rango, pero un repostaje dentro
        let mut trip = completed_trip(&vehicle, 80.0, now);
        let inside = now - Duration::days(25);
        trip.expenses = vec![
            expense(ExpenseType::Fuel, 70, inside),
            expense(ExpenseType::Fuel, 40, now),
            expense(ExpenseType::Toll, 15, inside),
        ];
        let filters = DashboardFilters {
            range: DateRange {
                start: None,
                end: Some(now - Duration::days(20)),
            },
            ..Default::default()
        };

        let summary = dashboard_summary(&[vehicle], &[trip], &filters, now);
        assert_eq!(
            summary.charts.fuel_spend_trend,
            vec![MonthlyAmount {
                month: month_key(inside),
                amount: 70.0,
            }]
        );
    }

    #[test]
    fn test_operational_cost_splits_categories() {
        let now = Utc::now();
        let vehicle = sample_vehicle();
        let mut trip = completed_trip(&vehicle, 400.0, now);
        trip.expenses.push(fill_up(1100.0, 40.0, now));
        trip.expenses.push(expense(ExpenseType::Toll, 25, now));
        let mut archived = expense(ExpenseType::Fine, 500, now);
        archived.active = Lifecycle::Archived;
        trip.expenses.push(archived);

        let mut log = sample_log(VehicleSnapshot::from(&vehicle), MaintenanceStatus::Completed);
        log.cost = Decimal::new(275, 0);
        log.dates.completion = Some(now);

        let cost = operational_cost(vehicle.id, &[trip], &[log], &DateRange::default());
        assert_eq!(cost.fuel_cost, 100.0);
        assert_eq!(cost.fuel_liters, 40.0);
        assert_eq!(cost.other_expenses, 25.0);
        assert_eq!(cost.maintenance_cost, 275.0);
        assert_eq!(cost.total_operational_cost, 400.0);
        assert_eq!(cost.cost_per_km, Some(1.0));
        assert_eq!(cost.fuel_efficiency_km_per_liter, Some(10.0));
    }

    #[test]
    fn test_operational_cost_without_distance_has_null_ratios() {
        let vehicle = sample_vehicle();
        let cost = operational_cost(vehicle.id, &[], &[], &DateRange::default());
        assert_eq!(cost.cost_per_km, None);
        assert_eq!(cost.fuel_efficiency_km_per_liter, None);
        assert_eq!(cost.total_operational_cost, 0.0);
    }

    #[test]
    fn test_parse_months_clamps() {
        assert_eq!(parse_months(None).unwrap(), 6);
        assert_eq!(parse_months(Some("0")).unwrap(), 1);
        assert_eq!(parse_months(Some("60")).unwrap(), 24);
        assert!(parse_months(Some("six")).is_err());
    }

    #[test]
    fn test_burn_rate_merges_trip_and_maintenance_months() {
        let now = Utc::now();
        let vehicle = sample_vehicle();
        let mut trip = sample_trip(VehicleSnapshot::from(&vehicle));
        trip.expenses.push(expense(ExpenseType::Toll, 30, now));
        trip.expenses.push(expense(ExpenseType::Parking, 20, now));

        let mut log = sample_log(VehicleSnapshot::from(&vehicle), MaintenanceStatus::Completed);
        log.cost = Decimal::new(150, 0);
        log.dates.completion = Some(now);

        let months = monthly_burn_rate(&[trip], &[log], None, 6, now);
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].month, month_key(now));
        assert_eq!(months[0].trip_expenses, 50.0);
        assert_eq!(months[0].maintenance, 150.0);
        assert_eq!(months[0].total, 200.0);
        assert_eq!(months[0].breakdown.len(), 2);
    }

    #[test]
    fn test_fuel_efficiency_first_point_is_null() {
        let now = Utc::now();
        let vehicle = sample_vehicle();
        let mut trip = sample_trip(VehicleSnapshot::from(&vehicle));
        trip.expenses.push(fill_up(1500.0, 50.0, now));
        trip.expenses.push(fill_up(1000.0, 40.0, now));
        trip.expenses.push(fill_up(0.0, 10.0, now));

        let report = fuel_efficiency(vehicle.id, &[trip]);
        assert_eq!(report.points.len(), 2);
        assert_eq!(report.points[0].odometer_reading, 1000.0);
        assert_eq!(report.points[0].efficiency_km_per_liter, None);
        assert_eq!(report.points[1].efficiency_km_per_liter, Some(10.0));
        assert_eq!(report.average_km_per_liter, Some(10.0));
    }

    #[test]
    fn test_list_expenses_newest_first_and_filtered() {
        let now = Utc::now();
        let vehicle = sample_vehicle();
        let mut trip = sample_trip(VehicleSnapshot::from(&vehicle));
        trip.expenses.push(expense(ExpenseType::Toll, 10, now - Duration::days(2)));
        trip.expenses.push(expense(ExpenseType::Toll, 20, now));
        trip.expenses.push(expense(ExpenseType::Parking, 5, now));

        let filter = ExpenseFilter::parse(None, Some("toll"), None, None).unwrap();
        let page = list_expenses(&[trip], &filter, 1, 20);
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].expense.amount, Decimal::new(20, 0));
        assert!(ExpenseFilter::parse(None, Some("snacks"), None, None).is_err());
    }
}
