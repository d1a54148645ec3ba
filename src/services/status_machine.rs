//! Máquinas de estado
//!
//! Una tabla de transiciones por entidad. Toda mutación de `status` pasa por
//! aquí; los controladores nunca asignan un estado directamente.

use crate::models::driver::DriverStatus;
use crate::models::maintenance::MaintenanceStatus;
use crate::models::trip::TripStatus;
use crate::models::vehicle::VehicleStatus;
use crate::utils::errors::{transition_error, AppResult};

/// Eventos que mueven el estado de un vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleEvent {
    /// Un viaje lo reclama
    Dispatch,
    /// El viaje terminó o se canceló
    Release,
    /// Una orden de mantenimiento pasa a `in_progress`
    EnterShop,
    /// La orden se completa
    LeaveShop,
    /// La orden se cancela: vuelve al estado previo a la orden
    Restore(VehicleStatus),
    Retire,
    /// Edición manual que saca al vehículo de `out_of_service`
    Reinstate,
}

impl VehicleEvent {
    pub fn apply(self, from: VehicleStatus) -> AppResult<VehicleStatus> {
        use VehicleStatus::*;

        match (self, from) {
            (Self::Dispatch, Available) => Ok(OnTrip),
            (Self::Dispatch, _) => Err(transition_error(format!(
                "Vehicle is not available (current status: {})",
                from
            ))),
            (Self::Release, OnTrip) => Ok(Available),
            (Self::Release, _) => Err(transition_error(format!(
                "Vehicle is not on a trip (current status: {})",
                from
            ))),
            (Self::EnterShop, Available | OnTrip | InShop) => Ok(InShop),
            (Self::EnterShop, OutOfService) => Err(transition_error(
                "Cannot send an out of service vehicle to the shop",
            )),
            (Self::LeaveShop, InShop) => Ok(Available),
            (Self::Restore(previous), InShop) => Ok(previous),
            (Self::LeaveShop | Self::Restore(_), _) => Err(transition_error(format!(
                "Vehicle is not in the shop (current status: {})",
                from
            ))),
            (Self::Retire, _) => Ok(OutOfService),
            (Self::Reinstate, OutOfService) => Ok(Available),
            (Self::Reinstate, _) => Err(transition_error(format!(
                "Only out of service vehicles can be reinstated (current status: {})",
                from
            ))),
        }
    }
}

/// Eventos que mueven el estado de un conductor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEvent {
    GoOnDuty,
    GoOffDuty,
    Dispatch,
    Release,
    Suspend,
}

impl DriverEvent {
    pub fn apply(self, from: DriverStatus) -> AppResult<DriverStatus> {
        use DriverStatus::*;

        match (self, from) {
            (Self::GoOnDuty | Self::GoOffDuty, OnTrip) => Err(transition_error(
                "Cannot change status of a driver who is currently on a trip",
            )),
            (Self::GoOnDuty, OnDuty | OffDuty | Suspended) => Ok(OnDuty),
            (Self::GoOffDuty, OnDuty | OffDuty) => Ok(OffDuty),
            (Self::GoOffDuty, Suspended) => Err(transition_error(
                "A suspended driver can only be reinstated to on_duty",
            )),
            (Self::Dispatch, OnDuty | OffDuty) => Ok(OnTrip),
            (Self::Dispatch, OnTrip) => Err(transition_error("Driver is already on a trip")),
            (Self::Dispatch, Suspended) => Err(transition_error("Driver is suspended")),
            (Self::Release, OnTrip) => Ok(OnDuty),
            (Self::Release, _) => Err(transition_error(format!(
                "Driver is not on a trip (current status: {})",
                from
            ))),
            (Self::Suspend, Suspended) => Err(transition_error("Driver is already suspended")),
            (Self::Suspend, OnDuty | OffDuty | OnTrip) => Ok(Suspended),
        }
    }
}

/// Eventos del ciclo de vida de un viaje
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripEvent {
    Dispatch,
    Start,
    Complete,
    Cancel,
}

impl TripEvent {
    pub fn apply(self, from: TripStatus) -> AppResult<TripStatus> {
        use TripStatus::*;

        match (self, from) {
            (Self::Dispatch, Draft) => Ok(Dispatched),
            (Self::Dispatch, _) => Err(transition_error(format!(
                "Cannot dispatch trip with status: {}",
                from
            ))),
            (Self::Start, Dispatched) => Ok(InTransit),
            (Self::Start, _) => Err(transition_error(format!(
                "Cannot start trip with status: {}",
                from
            ))),
            (Self::Complete, Dispatched | InTransit) => Ok(Completed),
            (Self::Complete, _) => Err(transition_error(format!(
                "Cannot complete trip with status: {}",
                from
            ))),
            (Self::Cancel, Completed) => Err(transition_error("Cannot cancel a completed trip")),
            (Self::Cancel, Cancelled) => Err(transition_error("Trip is already cancelled")),
            (Self::Cancel, Draft | Dispatched | InTransit) => Ok(Cancelled),
        }
    }
}

/// Comprueba un cambio de estado de una orden de mantenimiento.
/// Devuelve `false` si no hay cambio (mismo estado), `true` si la transición
/// es válida.
pub fn check_maintenance_transition(
    from: MaintenanceStatus,
    to: MaintenanceStatus,
) -> AppResult<bool> {
    use MaintenanceStatus::*;

    match (from, to) {
        _ if from == to => Ok(false),
        (Scheduled, InProgress | Cancelled) | (InProgress, Completed | Cancelled) => Ok(true),
        _ => Err(transition_error(format!(
            "Cannot change maintenance status from {} to {}",
            from, to
        ))),
    }
}
