//! Blinds, doors, locks and the doorbell.

use sinric_capabilities::controllers::{
    DoorController, Doorbell, LockController, PowerStateController, RangeValueController,
};

define_device! {
    /// Window blinds; the range value is the position.
    Blinds => "BLINDS" {
        requests: [
            power_state: PowerStateController => PowerStateCapability::power_state_controller,
            range_value: RangeValueController => RangeValueCapability::range_value_controller,
        ],
        events: [],
    }
}

define_device! {
    GarageDoor => "GARAGE_DOOR" {
        requests: [door: DoorController => DoorCapability::door_controller],
        events: [],
    }
}

define_device! {
    SmartLock => "SMARTLOCK" {
        requests: [lock: LockController => LockCapability::lock_controller],
        events: [],
    }
}

define_device! {
    DoorbellDevice => "DOORBELL" {
        requests: [power_state: PowerStateController => PowerStateCapability::power_state_controller],
        events: [doorbell: Doorbell => DoorbellCapability::doorbell],
    }
}
