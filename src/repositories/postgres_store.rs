//! Almacén PostgreSQL
//!
//! Cada unidad de trabajo es una transacción de base de datos. Las lecturas
//! por id usan `SELECT ... FOR UPDATE`, de modo que dos despachos
//! concurrentes del mismo vehículo se serializan y el segundo ve `on_trip`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, Postgres};
use sqlx::types::Json;
use sqlx::{FromRow, QueryBuilder, Transaction};
use uuid::Uuid;

use super::{FleetStore, FleetTx};
use crate::models::common::Audit;
use crate::models::driver::{
    ComplianceFilter, Contact, Driver, DriverFilter, DriverMetrics, DriverStatus, TrainingRecord,
};
use crate::models::maintenance::{
    MaintenanceDates, MaintenanceFilter, MaintenanceLog, MaintenanceStatus, Part, ServiceType,
    UPCOMING_WINDOW_DAYS,
};
use crate::models::reference::{LicenseCategory, Region, VehicleType};
use crate::models::safety_incident::{
    IncidentFilter, IncidentType, SafetyIncident, Severity,
};
use crate::models::snapshot::{
    DriverSnapshot, RegionSnapshot, TripSnapshot, VehicleSnapshot, VehicleTypeSnapshot,
};
use crate::models::trip::{Cargo, Expense, Odometer, Schedule, Trip, TripFilter, TripPriority, TripStatus};
use crate::models::vehicle::{Vehicle, VehicleFilter, VehicleStatus};
use crate::utils::errors::{
    bad_request_error, not_found_error, unique_violation_as_conflict, AppError, AppResult,
};

const VEHICLE_COLUMNS: &str = "id, license_plate, name, vehicle_type, max_load_kg, \
    current_odometer, acquisition_date, acquisition_cost, status, region, notes, active, \
    created_by, updated_by, created_at, updated_at";

const DRIVER_COLUMNS: &str = "id, name, employee_id, license_number, license_category, \
    license_expiry, date_of_joining, status, region, medical_cert_expiry, contact, metrics, \
    training_records, active, created_by, updated_by, created_at, updated_at";

const TRIP_COLUMNS: &str = "id, trip_reference, origin, destination, cargo, schedule, priority, \
    vehicle, driver, status, odometer, cancellation_reason, expenses, region, active, \
    created_by, updated_by, created_at, updated_at";

const MAINTENANCE_COLUMNS: &str = "id, vehicle, service_type, description, dates, \
    odometer_at_service, cost, service_provider, previous_vehicle_status, status, \
    next_service_due_km, parts, active, created_by, updated_by, created_at, updated_at";

const INCIDENT_COLUMNS: &str = "id, driver, trip, incident_date, incident_type, description, \
    severity, actions_taken, active, created_by, updated_by, created_at, updated_at";

/// Pool de PostgreSQL envuelto como `FleetStore`
#[derive(Clone)]
pub struct PgFleetStore {
    pool: PgPool,
}

impl PgFleetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FleetStore for PgFleetStore {
    async fn begin(&self) -> AppResult<Box<dyn FleetTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgFleetTx { tx }))
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

struct PgFleetTx {
    tx: Transaction<'static, Postgres>,
}

fn audit(
    created_by: Option<Uuid>,
    updated_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Audit {
    Audit {
        created_by,
        updated_by,
        created_at,
        updated_at,
    }
}

fn ensure_updated(rows_affected: u64, entity: &str) -> AppResult<()> {
    if rows_affected == 0 {
        Err(not_found_error(entity))
    } else {
        Ok(())
    }
}

/// `status IN (...)`; una lista vacía no casa con nada
fn push_in<'a, T>(qb: &mut QueryBuilder<'a, Postgres>, column: &str, values: &'a [T])
where
    T: 'a + sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres> + Send + Copy,
{
    if values.is_empty() {
        qb.push(" AND FALSE");
        return;
    }
    qb.push(format!(" AND {} IN (", column));
    let mut separated = qb.separated(", ");
    for value in values {
        separated.push_bind(*value);
    }
    separated.push_unseparated(")");
}

#[derive(FromRow)]
struct VehicleRow {
    id: Uuid,
    license_plate: String,
    name: String,
    vehicle_type: Json<VehicleTypeSnapshot>,
    max_load_kg: f64,
    current_odometer: f64,
    acquisition_date: NaiveDate,
    acquisition_cost: Decimal,
    status: VehicleStatus,
    region: Option<Json<RegionSnapshot>>,
    notes: String,
    active: bool,
    created_by: Option<Uuid>,
    updated_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Self {
            id: row.id,
            license_plate: row.license_plate,
            name: row.name,
            vehicle_type: row.vehicle_type.0,
            max_load_kg: row.max_load_kg,
            current_odometer: row.current_odometer,
            acquisition_date: row.acquisition_date,
            acquisition_cost: row.acquisition_cost,
            status: row.status,
            region: row.region.map(|r| r.0),
            notes: row.notes,
            active: row.active.into(),
            audit: audit(row.created_by, row.updated_by, row.created_at, row.updated_at),
        }
    }
}

#[derive(FromRow)]
struct DriverRow {
    id: Uuid,
    name: String,
    employee_id: String,
    license_number: String,
    license_category: LicenseCategory,
    license_expiry: NaiveDate,
    date_of_joining: NaiveDate,
    status: DriverStatus,
    region: Option<Json<RegionSnapshot>>,
    medical_cert_expiry: Option<NaiveDate>,
    contact: Json<Contact>,
    metrics: Json<DriverMetrics>,
    training_records: Json<Vec<TrainingRecord>>,
    active: bool,
    created_by: Option<Uuid>,
    updated_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DriverRow> for Driver {
    fn from(row: DriverRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            employee_id: row.employee_id,
            license_number: row.license_number,
            license_category: row.license_category,
            license_expiry: row.license_expiry,
            date_of_joining: row.date_of_joining,
            status: row.status,
            region: row.region.map(|r| r.0),
            medical_cert_expiry: row.medical_cert_expiry,
            contact: row.contact.0,
            metrics: row.metrics.0,
            training_records: row.training_records.0,
            active: row.active.into(),
            audit: audit(row.created_by, row.updated_by, row.created_at, row.updated_at),
        }
    }
}

#[derive(FromRow)]
struct TripRow {
    id: Uuid,
    trip_reference: String,
    origin: String,
    destination: String,
    cargo: Json<Cargo>,
    schedule: Json<Schedule>,
    priority: TripPriority,
    vehicle: Json<VehicleSnapshot>,
    driver: Option<Json<DriverSnapshot>>,
    status: TripStatus,
    odometer: Json<Odometer>,
    cancellation_reason: String,
    expenses: Json<Vec<Expense>>,
    region: Option<Json<RegionSnapshot>>,
    active: bool,
    created_by: Option<Uuid>,
    updated_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        Self {
            id: row.id,
            trip_reference: row.trip_reference,
            origin: row.origin,
            destination: row.destination,
            cargo: row.cargo.0,
            schedule: row.schedule.0,
            priority: row.priority,
            vehicle: row.vehicle.0,
            driver: row.driver.map(|d| d.0),
            status: row.status,
            odometer: row.odometer.0,
            cancellation_reason: row.cancellation_reason,
            expenses: row.expenses.0,
            region: row.region.map(|r| r.0),
            active: row.active.into(),
            audit: audit(row.created_by, row.updated_by, row.created_at, row.updated_at),
        }
    }
}

#[derive(FromRow)]
struct MaintenanceRow {
    id: Uuid,
    vehicle: Json<VehicleSnapshot>,
    service_type: ServiceType,
    description: String,
    dates: Json<MaintenanceDates>,
    odometer_at_service: f64,
    cost: Decimal,
    service_provider: String,
    previous_vehicle_status: VehicleStatus,
    status: MaintenanceStatus,
    next_service_due_km: Option<f64>,
    parts: Json<Vec<Part>>,
    active: bool,
    created_by: Option<Uuid>,
    updated_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MaintenanceRow> for MaintenanceLog {
    fn from(row: MaintenanceRow) -> Self {
        Self {
            id: row.id,
            vehicle: row.vehicle.0,
            service_type: row.service_type,
            description: row.description,
            dates: row.dates.0,
            odometer_at_service: row.odometer_at_service,
            cost: row.cost,
            service_provider: row.service_provider,
            previous_vehicle_status: row.previous_vehicle_status,
            status: row.status,
            next_service_due_km: row.next_service_due_km,
            parts: row.parts.0,
            active: row.active.into(),
            audit: audit(row.created_by, row.updated_by, row.created_at, row.updated_at),
        }
    }
}

#[derive(FromRow)]
struct IncidentRow {
    id: Uuid,
    driver: Json<DriverSnapshot>,
    trip: Option<Json<TripSnapshot>>,
    incident_date: DateTime<Utc>,
    incident_type: IncidentType,
    description: String,
    severity: Severity,
    actions_taken: String,
    active: bool,
    created_by: Option<Uuid>,
    updated_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<IncidentRow> for SafetyIncident {
    fn from(row: IncidentRow) -> Self {
        Self {
            id: row.id,
            driver: row.driver.0,
            trip: row.trip.map(|t| t.0),
            incident_date: row.incident_date,
            incident_type: row.incident_type,
            description: row.description,
            severity: row.severity,
            actions_taken: row.actions_taken,
            active: row.active.into(),
            audit: audit(row.created_by, row.updated_by, row.created_at, row.updated_at),
        }
    }
}

#[derive(FromRow)]
struct VehicleTypeRow {
    id: Uuid,
    name: String,
    default_max_load: f64,
    required_license_category: LicenseCategory,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VehicleTypeRow> for VehicleType {
    fn from(row: VehicleTypeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            default_max_load: row.default_max_load,
            required_license_category: row.required_license_category,
            active: row.active.into(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct RegionRow {
    id: Uuid,
    name: String,
    code: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RegionRow> for Region {
    fn from(row: RegionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            code: row.code,
            active: row.active.into(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl FleetTx for PgFleetTx {
    async fn vehicle(&mut self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let sql = format!("SELECT {} FROM vehicles WHERE id = $1 FOR UPDATE", VEHICLE_COLUMNS);
        let row = sqlx::query_as::<_, VehicleRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Vehicle::from))
    }

    async fn read_vehicle(&mut self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let sql = format!("SELECT {} FROM vehicles WHERE id = $1", VEHICLE_COLUMNS);
        let row = sqlx::query_as::<_, VehicleRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Vehicle::from))
    }

    async fn vehicles(&mut self, filter: &VehicleFilter) -> AppResult<Vec<Vehicle>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM vehicles WHERE TRUE",
            VEHICLE_COLUMNS
        ));
        if !filter.include_archived {
            qb.push(" AND active");
        }
        if let Some(statuses) = &filter.statuses {
            push_in(&mut qb, "status", statuses);
        }
        if let Some(region_id) = filter.region_id {
            qb.push(" AND region_id = ").push_bind(region_id);
        }
        if let Some(type_id) = filter.vehicle_type_id {
            qb.push(" AND vehicle_type_id = ").push_bind(type_id);
        }
        qb.push(" ORDER BY created_at DESC");

        let rows = qb
            .build_query_as::<VehicleRow>()
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(Vehicle::from).collect())
    }

    async fn insert_vehicle(&mut self, vehicle: &Vehicle) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO vehicles (id, license_plate, name, vehicle_type, max_load_kg, \
             current_odometer, acquisition_date, acquisition_cost, status, region, notes, active, \
             created_by, updated_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(vehicle.id)
        .bind(&vehicle.license_plate)
        .bind(&vehicle.name)
        .bind(Json(&vehicle.vehicle_type))
        .bind(vehicle.max_load_kg)
        .bind(vehicle.current_odometer)
        .bind(vehicle.acquisition_date)
        .bind(vehicle.acquisition_cost)
        .bind(vehicle.status)
        .bind(vehicle.region.as_ref().map(Json))
        .bind(&vehicle.notes)
        .bind(vehicle.active.is_active())
        .bind(vehicle.audit.created_by)
        .bind(vehicle.audit.updated_by)
        .bind(vehicle.audit.created_at)
        .bind(vehicle.audit.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            unique_violation_as_conflict(
                e,
                format!("License plate '{}' is already registered", vehicle.license_plate),
            )
        })?;
        Ok(())
    }

    async fn update_vehicle(&mut self, vehicle: &Vehicle) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE vehicles SET license_plate = $2, name = $3, vehicle_type = $4, \
             max_load_kg = $5, current_odometer = $6, acquisition_date = $7, \
             acquisition_cost = $8, status = $9, region = $10, notes = $11, active = $12, \
             updated_by = $13, updated_at = $14 WHERE id = $1",
        )
        .bind(vehicle.id)
        .bind(&vehicle.license_plate)
        .bind(&vehicle.name)
        .bind(Json(&vehicle.vehicle_type))
        .bind(vehicle.max_load_kg)
        .bind(vehicle.current_odometer)
        .bind(vehicle.acquisition_date)
        .bind(vehicle.acquisition_cost)
        .bind(vehicle.status)
        .bind(vehicle.region.as_ref().map(Json))
        .bind(&vehicle.notes)
        .bind(vehicle.active.is_active())
        .bind(vehicle.audit.updated_by)
        .bind(vehicle.audit.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            unique_violation_as_conflict(
                e,
                format!("License plate '{}' is already registered", vehicle.license_plate),
            )
        })?;
        ensure_updated(result.rows_affected(), "Vehicle")
    }

    async fn license_plate_taken(&mut self, plate: &str, except: Option<Uuid>) -> AppResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM vehicles WHERE license_plate = $1 \
             AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(plate)
        .bind(except)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(taken)
    }

    async fn driver(&mut self, id: Uuid) -> AppResult<Option<Driver>> {
        let sql = format!("SELECT {} FROM drivers WHERE id = $1 FOR UPDATE", DRIVER_COLUMNS);
        let row = sqlx::query_as::<_, DriverRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Driver::from))
    }

    async fn drivers(&mut self, filter: &DriverFilter, today: NaiveDate) -> AppResult<Vec<Driver>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM drivers WHERE TRUE",
            DRIVER_COLUMNS
        ));
        if !filter.include_archived {
            qb.push(" AND active");
        }
        if let Some(statuses) = &filter.statuses {
            push_in(&mut qb, "status", statuses);
        }
        if let Some(region_id) = filter.region_id {
            qb.push(" AND region_id = ").push_bind(region_id);
        }
        if let Some(category) = filter.license_category {
            qb.push(" AND license_category = ").push_bind(category);
        }
        match filter.compliance {
            Some(ComplianceFilter::Expired) => {
                qb.push(" AND license_expiry < ").push_bind(today);
            }
            Some(ComplianceFilter::Valid) => {
                qb.push(" AND license_expiry >= ").push_bind(today);
            }
            None => {}
        }
        if let Some(days) = filter.expiring_within_days {
            qb.push(" AND license_expiry >= ").push_bind(today);
            qb.push(" AND license_expiry <= ")
                .push_bind(today + Duration::days(days));
        }
        qb.push(" ORDER BY name ASC");

        let rows = qb
            .build_query_as::<DriverRow>()
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(Driver::from).collect())
    }

    async fn insert_driver(&mut self, driver: &Driver) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO drivers (id, name, employee_id, license_number, license_category, \
             license_expiry, date_of_joining, status, region, medical_cert_expiry, contact, \
             metrics, training_records, active, created_by, updated_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        )
        .bind(driver.id)
        .bind(&driver.name)
        .bind(&driver.employee_id)
        .bind(&driver.license_number)
        .bind(driver.license_category)
        .bind(driver.license_expiry)
        .bind(driver.date_of_joining)
        .bind(driver.status)
        .bind(driver.region.as_ref().map(Json))
        .bind(driver.medical_cert_expiry)
        .bind(Json(&driver.contact))
        .bind(Json(&driver.metrics))
        .bind(Json(&driver.training_records))
        .bind(driver.active.is_active())
        .bind(driver.audit.created_by)
        .bind(driver.audit.updated_by)
        .bind(driver.audit.created_at)
        .bind(driver.audit.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            unique_violation_as_conflict(
                e,
                format!(
                    "Employee ID '{}' or license number '{}' is already in use",
                    driver.employee_id, driver.license_number
                ),
            )
        })?;
        Ok(())
    }

    async fn update_driver(&mut self, driver: &Driver) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE drivers SET name = $2, license_number = $3, license_category = $4, \
             license_expiry = $5, date_of_joining = $6, status = $7, region = $8, \
             medical_cert_expiry = $9, contact = $10, metrics = $11, training_records = $12, \
             active = $13, updated_by = $14, updated_at = $15 WHERE id = $1",
        )
        .bind(driver.id)
        .bind(&driver.name)
        .bind(&driver.license_number)
        .bind(driver.license_category)
        .bind(driver.license_expiry)
        .bind(driver.date_of_joining)
        .bind(driver.status)
        .bind(driver.region.as_ref().map(Json))
        .bind(driver.medical_cert_expiry)
        .bind(Json(&driver.contact))
        .bind(Json(&driver.metrics))
        .bind(Json(&driver.training_records))
        .bind(driver.active.is_active())
        .bind(driver.audit.updated_by)
        .bind(driver.audit.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            unique_violation_as_conflict(
                e,
                format!("License number '{}' is already in use", driver.license_number),
            )
        })?;
        ensure_updated(result.rows_affected(), "Driver")
    }

    async fn employee_id_taken(&mut self, employee_id: &str, except: Option<Uuid>) -> AppResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM drivers WHERE employee_id = $1 \
             AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(employee_id)
        .bind(except)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(taken)
    }

    async fn license_number_taken(&mut self, license_number: &str, except: Option<Uuid>) -> AppResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM drivers WHERE license_number = $1 \
             AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(license_number)
        .bind(except)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(taken)
    }

    async fn trip(&mut self, id: Uuid) -> AppResult<Option<Trip>> {
        let sql = format!("SELECT {} FROM trips WHERE id = $1 FOR UPDATE", TRIP_COLUMNS);
        let row = sqlx::query_as::<_, TripRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Trip::from))
    }

    async fn trips(&mut self, filter: &TripFilter) -> AppResult<Vec<Trip>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM trips WHERE TRUE",
            TRIP_COLUMNS
        ));
        if !filter.include_archived {
            qb.push(" AND active");
        }
        if let Some(statuses) = &filter.statuses {
            push_in(&mut qb, "status", statuses);
        }
        if let Some(vehicle_id) = filter.vehicle_id {
            qb.push(" AND vehicle_id = ").push_bind(vehicle_id);
        }
        if let Some(driver_id) = filter.driver_id {
            qb.push(" AND driver_id = ").push_bind(driver_id);
        }
        if let Some(region_id) = filter.region_id {
            qb.push(" AND region_id = ").push_bind(region_id);
        }
        if let Some(type_id) = filter.vehicle_type_id {
            qb.push(" AND vehicle_type_id = ").push_bind(type_id);
        }
        if let Some(priority) = filter.priority {
            qb.push(" AND priority = ").push_bind(priority);
        }
        qb.push(" ORDER BY created_at DESC");
        // Las cancelaciones en cascada modifican estas filas dentro de la misma transacción
        if filter.statuses.as_deref() == Some(&[TripStatus::Dispatched][..]) {
            qb.push(" FOR UPDATE");
        }

        let rows = qb
            .build_query_as::<TripRow>()
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(Trip::from).collect())
    }

    async fn insert_trip(&mut self, trip: &Trip) -> AppResult<()> {
        trip.check().map_err(bad_request_error)?;
        sqlx::query(
            "INSERT INTO trips (id, trip_reference, origin, destination, cargo, schedule, \
             priority, vehicle, driver, status, odometer, cancellation_reason, expenses, region, \
             active, created_by, updated_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)",
        )
        .bind(trip.id)
        .bind(&trip.trip_reference)
        .bind(&trip.origin)
        .bind(&trip.destination)
        .bind(Json(&trip.cargo))
        .bind(Json(&trip.schedule))
        .bind(trip.priority)
        .bind(Json(&trip.vehicle))
        .bind(trip.driver.as_ref().map(Json))
        .bind(trip.status)
        .bind(Json(&trip.odometer))
        .bind(&trip.cancellation_reason)
        .bind(Json(&trip.expenses))
        .bind(trip.region.as_ref().map(Json))
        .bind(trip.active.is_active())
        .bind(trip.audit.created_by)
        .bind(trip.audit.updated_by)
        .bind(trip.audit.created_at)
        .bind(trip.audit.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            unique_violation_as_conflict(
                e,
                format!("Trip reference '{}' already exists", trip.trip_reference),
            )
        })?;
        Ok(())
    }

    async fn update_trip(&mut self, trip: &Trip) -> AppResult<()> {
        trip.check().map_err(bad_request_error)?;
        let result = sqlx::query(
            "UPDATE trips SET origin = $2, destination = $3, cargo = $4, schedule = $5, \
             priority = $6, driver = $7, status = $8, odometer = $9, cancellation_reason = $10, \
             expenses = $11, active = $12, updated_by = $13, updated_at = $14 WHERE id = $1",
        )
        .bind(trip.id)
        .bind(&trip.origin)
        .bind(&trip.destination)
        .bind(Json(&trip.cargo))
        .bind(Json(&trip.schedule))
        .bind(trip.priority)
        .bind(trip.driver.as_ref().map(Json))
        .bind(trip.status)
        .bind(Json(&trip.odometer))
        .bind(&trip.cancellation_reason)
        .bind(Json(&trip.expenses))
        .bind(trip.active.is_active())
        .bind(trip.audit.updated_by)
        .bind(trip.audit.updated_at)
        .execute(&mut *self.tx)
        .await?;
        ensure_updated(result.rows_affected(), "Trip")
    }

    async fn maintenance_log(&mut self, id: Uuid) -> AppResult<Option<MaintenanceLog>> {
        let sql = format!(
            "SELECT {} FROM maintenance_logs WHERE id = $1 FOR UPDATE",
            MAINTENANCE_COLUMNS
        );
        let row = sqlx::query_as::<_, MaintenanceRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(MaintenanceLog::from))
    }

    async fn maintenance_logs(&mut self, filter: &MaintenanceFilter) -> AppResult<Vec<MaintenanceLog>> {
        let now = Utc::now();
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM maintenance_logs WHERE TRUE",
            MAINTENANCE_COLUMNS
        ));
        if !filter.include_archived {
            qb.push(" AND active");
        }
        if let Some(vehicle_id) = filter.vehicle_id {
            qb.push(" AND vehicle_id = ").push_bind(vehicle_id);
        }
        if let Some(statuses) = &filter.statuses {
            push_in(&mut qb, "status", statuses);
        }
        if filter.upcoming {
            qb.push(" AND status = ").push_bind(MaintenanceStatus::Scheduled);
            qb.push(" AND scheduled_date >= ").push_bind(now);
            qb.push(" AND scheduled_date <= ")
                .push_bind(now + Duration::days(UPCOMING_WINDOW_DAYS));
        }
        if filter.overdue {
            qb.push(" AND status = ").push_bind(MaintenanceStatus::Scheduled);
            qb.push(" AND scheduled_date < ").push_bind(now);
        }
        qb.push(" ORDER BY scheduled_date ASC");

        let rows = qb
            .build_query_as::<MaintenanceRow>()
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(MaintenanceLog::from).collect())
    }

    async fn insert_maintenance_log(&mut self, log: &MaintenanceLog) -> AppResult<()> {
        log.check().map_err(bad_request_error)?;
        let scheduled = log
            .dates
            .scheduled
            .ok_or_else(|| bad_request_error("Scheduled date is required"))?;
        sqlx::query(
            "INSERT INTO maintenance_logs (id, vehicle, service_type, description, dates, \
             scheduled_date, odometer_at_service, cost, service_provider, previous_vehicle_status, \
             status, next_service_due_km, parts, active, created_by, updated_by, created_at, \
             updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        )
        .bind(log.id)
        .bind(Json(&log.vehicle))
        .bind(log.service_type)
        .bind(&log.description)
        .bind(Json(&log.dates))
        .bind(scheduled)
        .bind(log.odometer_at_service)
        .bind(log.cost)
        .bind(&log.service_provider)
        .bind(log.previous_vehicle_status)
        .bind(log.status)
        .bind(log.next_service_due_km)
        .bind(Json(&log.parts))
        .bind(log.active.is_active())
        .bind(log.audit.created_by)
        .bind(log.audit.updated_by)
        .bind(log.audit.created_at)
        .bind(log.audit.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update_maintenance_log(&mut self, log: &MaintenanceLog) -> AppResult<()> {
        log.check().map_err(bad_request_error)?;
        let scheduled = log
            .dates
            .scheduled
            .ok_or_else(|| bad_request_error("Scheduled date is required"))?;
        let result = sqlx::query(
            "UPDATE maintenance_logs SET service_type = $2, description = $3, dates = $4, \
             scheduled_date = $5, odometer_at_service = $6, cost = $7, service_provider = $8, \
             status = $9, next_service_due_km = $10, parts = $11, active = $12, \
             updated_by = $13, updated_at = $14 WHERE id = $1",
        )
        .bind(log.id)
        .bind(log.service_type)
        .bind(&log.description)
        .bind(Json(&log.dates))
        .bind(scheduled)
        .bind(log.odometer_at_service)
        .bind(log.cost)
        .bind(&log.service_provider)
        .bind(log.status)
        .bind(log.next_service_due_km)
        .bind(Json(&log.parts))
        .bind(log.active.is_active())
        .bind(log.audit.updated_by)
        .bind(log.audit.updated_at)
        .execute(&mut *self.tx)
        .await?;
        ensure_updated(result.rows_affected(), "Maintenance log")
    }

    async fn safety_incident(&mut self, id: Uuid) -> AppResult<Option<SafetyIncident>> {
        let sql = format!(
            "SELECT {} FROM safety_incidents WHERE id = $1 FOR UPDATE",
            INCIDENT_COLUMNS
        );
        let row = sqlx::query_as::<_, IncidentRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(SafetyIncident::from))
    }

    async fn safety_incidents(&mut self, filter: &IncidentFilter) -> AppResult<Vec<SafetyIncident>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM safety_incidents WHERE TRUE",
            INCIDENT_COLUMNS
        ));
        if !filter.include_archived {
            qb.push(" AND active");
        }
        if let Some(driver_id) = filter.driver_id {
            qb.push(" AND driver_id = ").push_bind(driver_id);
        }
        qb.push(" ORDER BY incident_date DESC");

        let rows = qb
            .build_query_as::<IncidentRow>()
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(SafetyIncident::from).collect())
    }

    async fn insert_safety_incident(&mut self, incident: &SafetyIncident) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO safety_incidents (id, driver, trip, incident_date, incident_type, \
             description, severity, actions_taken, active, created_by, updated_by, created_at, \
             updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(incident.id)
        .bind(Json(&incident.driver))
        .bind(incident.trip.as_ref().map(Json))
        .bind(incident.incident_date)
        .bind(incident.incident_type)
        .bind(&incident.description)
        .bind(incident.severity)
        .bind(&incident.actions_taken)
        .bind(incident.active.is_active())
        .bind(incident.audit.created_by)
        .bind(incident.audit.updated_by)
        .bind(incident.audit.created_at)
        .bind(incident.audit.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update_safety_incident(&mut self, incident: &SafetyIncident) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE safety_incidents SET incident_type = $2, description = $3, severity = $4, \
             actions_taken = $5, active = $6, updated_by = $7, updated_at = $8 WHERE id = $1",
        )
        .bind(incident.id)
        .bind(incident.incident_type)
        .bind(&incident.description)
        .bind(incident.severity)
        .bind(&incident.actions_taken)
        .bind(incident.active.is_active())
        .bind(incident.audit.updated_by)
        .bind(incident.audit.updated_at)
        .execute(&mut *self.tx)
        .await?;
        ensure_updated(result.rows_affected(), "Safety incident")
    }

    async fn vehicle_type(&mut self, id: Uuid) -> AppResult<Option<VehicleType>> {
        let row = sqlx::query_as::<_, VehicleTypeRow>(
            "SELECT id, name, default_max_load, required_license_category, active, created_at, \
             updated_at FROM vehicle_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(VehicleType::from))
    }

    async fn vehicle_types(&mut self) -> AppResult<Vec<VehicleType>> {
        let rows = sqlx::query_as::<_, VehicleTypeRow>(
            "SELECT id, name, default_max_load, required_license_category, active, created_at, \
             updated_at FROM vehicle_types WHERE active ORDER BY name ASC",
        )
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows.into_iter().map(VehicleType::from).collect())
    }

    async fn insert_vehicle_type(&mut self, vehicle_type: &VehicleType) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO vehicle_types (id, name, default_max_load, required_license_category, \
             active, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(vehicle_type.id)
        .bind(&vehicle_type.name)
        .bind(vehicle_type.default_max_load)
        .bind(vehicle_type.required_license_category)
        .bind(vehicle_type.active.is_active())
        .bind(vehicle_type.created_at)
        .bind(vehicle_type.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            unique_violation_as_conflict(
                e,
                format!("Vehicle type '{}' already exists", vehicle_type.name),
            )
        })?;
        Ok(())
    }

    async fn region(&mut self, id: Uuid) -> AppResult<Option<Region>> {
        let row = sqlx::query_as::<_, RegionRow>(
            "SELECT id, name, code, active, created_at, updated_at FROM regions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(Region::from))
    }

    async fn regions(&mut self) -> AppResult<Vec<Region>> {
        let rows = sqlx::query_as::<_, RegionRow>(
            "SELECT id, name, code, active, created_at, updated_at FROM regions \
             WHERE active ORDER BY name ASC",
        )
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows.into_iter().map(Region::from).collect())
    }

    async fn insert_region(&mut self, region: &Region) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO regions (id, name, code, active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(region.id)
        .bind(&region.name)
        .bind(&region.code)
        .bind(region.active.is_active())
        .bind(region.created_at)
        .bind(region.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            unique_violation_as_conflict(
                e,
                format!("Region '{}' ({}) already exists", region.name, region.code),
            )
        })?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(AppError::from)
    }
}
