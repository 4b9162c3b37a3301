//! Touch pHAT driver: a CAP1166 capacitive controller on the Pi's I2C bus.
//!
//! The controller latches touch state in its sensor input status
//! register until the interrupt bit in the main control register is
//! cleared. A background thread polls the register and turns 1 -> 0 bit
//! transitions into release callbacks; presses are detected but not
//! reported, matching the panel contract.
//!
//! Probe failure is not an error for the daemon: the panel reports
//! `is_present() == false` and the run loop exits without touching the
//! bus again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;
use tracing::{debug, info, warn};

use touchd_core::Button;

use super::{ButtonPanel, ReleaseHandler};
use crate::error::PanelError;

/// I2C bus the Touch pHAT sits on.
pub const I2C_BUS: &str = "/dev/i2c-1";

/// Fixed CAP1166 slave address on the Touch pHAT.
pub const I2C_ADDR: u16 = 0x2c;

const REG_MAIN_CONTROL: u8 = 0x00;
const REG_INPUT_STATUS: u8 = 0x03;
const REG_PRODUCT_ID: u8 = 0xfd;

const PRODUCT_ID_CAP1166: u8 = 0x51;
const INT_BIT: u8 = 0x01;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

type HandlerMap = Arc<Mutex<HashMap<Button, ReleaseHandler>>>;

/// The physical Touch pHAT panel.
///
/// Constructed via [`Cap1166Panel::probe`]; when the hardware is absent
/// the panel still constructs, reports not-present, and swallows
/// handler registrations.
pub struct Cap1166Panel {
    handlers: Option<HandlerMap>,
}

impl Cap1166Panel {
    /// Probes the default bus for a Touch pHAT.
    ///
    /// Absent or unreadable hardware yields a not-present panel rather
    /// than an error; the daemon's no-hardware path is a graceful exit.
    pub fn probe() -> Self {
        match Self::open(I2C_BUS) {
            Ok(panel) => panel,
            Err(e) => {
                info!(error = %e, "Touch pHAT not found, disabling");
                Self { handlers: None }
            }
        }
    }

    /// Opens the panel on a specific bus and starts the polling thread.
    pub fn open(bus: &str) -> Result<Self, PanelError> {
        let mut device = LinuxI2CDevice::new(bus, I2C_ADDR)?;

        let product_id = device.smbus_read_byte_data(REG_PRODUCT_ID)?;
        if product_id != PRODUCT_ID_CAP1166 {
            return Err(PanelError::UnknownDevice {
                found: product_id,
                expected: PRODUCT_ID_CAP1166,
            });
        }

        let handlers: HandlerMap = Arc::new(Mutex::new(HashMap::new()));
        let poll_handlers = Arc::clone(&handlers);
        thread::Builder::new()
            .name("cap1166-poll".to_string())
            .spawn(move || poll_loop(device, poll_handlers))?;

        debug!(bus, addr = I2C_ADDR, "CAP1166 polling started");
        Ok(Self {
            handlers: Some(handlers),
        })
    }
}

impl ButtonPanel for Cap1166Panel {
    fn is_present(&self) -> bool {
        self.handlers.is_some()
    }

    fn on_release(&mut self, button: Button, handler: ReleaseHandler) {
        let Some(handlers) = &self.handlers else {
            return;
        };
        if let Ok(mut map) = handlers.lock() {
            map.insert(button, handler);
        }
    }
}

/// Polls touch state until the process exits.
///
/// Read errors are transient on a shared bus; they are logged and the
/// previous state kept, so a glitch never fabricates a release.
fn poll_loop(mut device: LinuxI2CDevice, handlers: HandlerMap) {
    let mut previous = 0u8;

    loop {
        match read_touch_state(&mut device) {
            Ok(status) => {
                let released = previous & !status;
                if released != 0 {
                    fire_releases(released, &handlers);
                }
                previous = status;
            }
            Err(e) => {
                warn!(error = %e, "CAP1166 read failed");
            }
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Reads the sensor input status and re-arms the status latch.
fn read_touch_state(device: &mut LinuxI2CDevice) -> Result<u8, PanelError> {
    let status = device.smbus_read_byte_data(REG_INPUT_STATUS)?;

    // Status bits stay latched until INT is cleared; without this the
    // register never reports a release.
    let control = device.smbus_read_byte_data(REG_MAIN_CONTROL)?;
    if control & INT_BIT != 0 {
        device.smbus_write_byte_data(REG_MAIN_CONTROL, control & !INT_BIT)?;
    }

    Ok(status)
}

fn fire_releases(released: u8, handlers: &HandlerMap) {
    let Ok(map) = handlers.lock() else {
        return;
    };
    for button in Button::ALL {
        if released & (1 << button.index()) != 0 {
            debug!(button = %button, "Pad released");
            if let Some(handler) = map.get(&button) {
                handler(button);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_bus_fails() {
        let result = Cap1166Panel::open("/dev/does-not-exist");
        assert!(matches!(result, Err(PanelError::Bus(_))));
    }

    #[test]
    fn test_absent_panel_swallows_registrations() {
        let mut panel = Cap1166Panel { handlers: None };
        assert!(!panel.is_present());
        // Must not panic or leak; the handler is simply dropped.
        panel.on_release(Button::A, Box::new(|_| {}));
    }

    #[test]
    fn test_release_bit_arithmetic() {
        // Pads A (bit 1) and D (bit 4) held, then A released.
        let previous = 0b0001_0010;
        let status = 0b0001_0000;
        let released = previous & !status;
        assert_eq!(released, 1 << Button::A.index());
    }
}
