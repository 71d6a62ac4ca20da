//! BLE GATT transport adapter.
//!
//! Implements [`TransportPort`] and feeds link and write events into a
//! [`GattHandler`] (the [`RelayController`] on device).
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid GATT server via `esp_idf_svc::sys`.
//! - **all other targets**: in-memory simulation for host-side tests.
//!
//! ## GATT Service Layout
//!
//! | Attribute        | UUID                                   | Perms                |
//! |------------------|----------------------------------------|----------------------|
//! | Relay service    | `12345678-1234-1234-1234-123456789abc` | —                    |
//! | Relay command    | `12345678-1234-1234-1234-123456789abc` | Read+Write+Notify    |
//! | CCCD             | `0x2902`                               | Read+Write           |
//!
//! The characteristic shares the service UUID, so writes are routed by
//! attribute handle, never by UUID. Acks are only notified once the peer
//! has enabled notifications in the CCCD.

use core::fmt;
use std::sync::Arc;

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::app::ports::{EventSink, TransportError, TransportPort};
use crate::app::service::RelayController;

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

pub const SERVICE_UUID: u128 = 0x12345678_1234_1234_1234_123456789abc;
pub const CHAR_RELAY: u128 = SERVICE_UUID;

/// Largest notification that fits the default ATT MTU.
pub const MAX_NOTIFY_BYTES: usize = 20;

// ───────────────────────────────────────────────────────────────
// Handler trait
// ───────────────────────────────────────────────────────────────

/// Receiver of inbound GATT activity.
///
/// Bluedroid calls back from its own task, so implementors must be
/// shareable and must not block for long.
pub trait GattHandler: Send + Sync {
    fn connected(&self);
    fn disconnected(&self);
    fn written(&self, data: &[u8]);
}

impl<P, T, S> GattHandler for RelayController<P, T, S>
where
    P: OutputPin + Send,
    T: TransportPort,
    S: EventSink,
{
    fn connected(&self) {
        self.on_connect();
    }

    fn disconnected(&self) {
        self.on_disconnect();
    }

    fn written(&self, data: &[u8]) {
        // Rejections are logged and emitted by the controller; the peer
        // gets no NACK.
        let _ = self.on_write(data);
    }
}

// ───────────────────────────────────────────────────────────────
// BLE state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleState {
    Idle,
    Advertising,
    Connected,
    Failed,
}

impl fmt::Display for BleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Advertising => write!(f, "advertising"),
            Self::Connected => write!(f, "connected"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Whether a CCCD value written by the peer enables notifications.
fn cccd_enables_notify(value: &[u8]) -> bool {
    matches!(value, [flags, _] if flags & 0x01 != 0)
}

fn check_payload(data: &[u8]) -> Result<(), TransportError> {
    if data.len() > MAX_NOTIFY_BYTES {
        return Err(TransportError::PayloadTooLong);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF Bluedroid glue
// ───────────────────────────────────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures. These statics bridge the callback context to the adapter and
// the registered handler.

#[cfg(target_os = "espidf")]
mod bluedroid {
    use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};
    use std::sync::{Arc, OnceLock};

    use esp_idf_svc::sys::*;

    use super::{CHAR_RELAY, GattHandler, MAX_NOTIFY_BYTES, SERVICE_UUID, cccd_enables_notify};

    pub(super) static HANDLER: OnceLock<Arc<dyn GattHandler>> = OnceLock::new();
    pub(super) static GATTS_IF: AtomicU32 = AtomicU32::new(0);
    pub(super) static CONN_ID: AtomicU32 = AtomicU32::new(0);
    pub(super) static CONNECTED: AtomicBool = AtomicBool::new(false);
    pub(super) static RELAY_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
    static CCCD_HANDLE: AtomicU32 = AtomicU32::new(0);
    pub(super) static NOTIFY_ENABLED: AtomicBool = AtomicBool::new(false);
    static SVC_HANDLE: AtomicU32 = AtomicU32::new(0);

    // Advertising starts once both the advert and the scan response are set.
    const ADV_DATA_PENDING: u8 = 0b01;
    const SCAN_RSP_PENDING: u8 = 0b10;
    static ADV_CONFIG_PENDING: AtomicU8 = AtomicU8::new(0);

    /// Service (1) + characteristic declaration and value (2) + CCCD (1).
    const NUM_HANDLES: u16 = 4;

    fn uuid128_to_esp(uuid: u128) -> esp_bt_uuid_t {
        // SAFETY: esp_bt_uuid_t is a plain C struct/union; all-zero is valid.
        let mut t: esp_bt_uuid_t = unsafe { core::mem::zeroed() };
        t.len = ESP_UUID_LEN_128 as u16;
        t.uuid.uuid128 = uuid.to_le_bytes();
        t
    }

    fn uuid16_to_esp(uuid: u16) -> esp_bt_uuid_t {
        // SAFETY: as above.
        let mut t: esp_bt_uuid_t = unsafe { core::mem::zeroed() };
        t.len = ESP_UUID_LEN_16 as u16;
        t.uuid.uuid16 = uuid;
        t
    }

    pub(super) fn start_advertising() -> esp_err_t {
        // SAFETY: the params struct is fully initialised and copied by the stack.
        unsafe {
            let mut adv_params = esp_ble_adv_params_t {
                adv_int_min: 0x20,
                adv_int_max: 0x40,
                adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
                own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
                channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
                adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
                ..core::mem::zeroed()
            };
            esp_ble_gap_start_advertising(&mut adv_params)
        }
    }

    /// Advert carries the service UUID; the device name goes in the scan
    /// response (both do not fit in 31 bytes).
    fn configure_advertising() {
        ADV_CONFIG_PENDING.store(ADV_DATA_PENDING | SCAN_RSP_PENDING, Ordering::SeqCst);

        let mut service_uuid = SERVICE_UUID.to_le_bytes();
        // SAFETY: the stack deep-copies both adv data structs and the UUID
        // buffer before returning.
        let (adv_rc, rsp_rc) = unsafe {
            let mut adv_data = esp_ble_adv_data_t {
                set_scan_rsp: false,
                include_name: false,
                include_txpower: false,
                service_uuid_len: service_uuid.len() as u16,
                p_service_uuid: service_uuid.as_mut_ptr(),
                flag: (ESP_BLE_ADV_FLAG_GEN_DISC | ESP_BLE_ADV_FLAG_BREDR_NOT_SPT) as u8,
                ..core::mem::zeroed()
            };
            let adv_rc = esp_ble_gap_config_adv_data(&mut adv_data);

            let mut scan_rsp = esp_ble_adv_data_t {
                set_scan_rsp: true,
                include_name: true,
                include_txpower: true,
                ..core::mem::zeroed()
            };
            (adv_rc, esp_ble_gap_config_adv_data(&mut scan_rsp))
        };
        if adv_rc != ESP_OK as esp_err_t {
            log::error!("BLE GAP: config_adv_data failed ({})", adv_rc);
        }
        if rsp_rc != ESP_OK as esp_err_t {
            log::error!("BLE GAP: config scan response failed ({})", rsp_rc);
        }
    }

    fn adv_config_done(bit: u8) {
        let before = ADV_CONFIG_PENDING.fetch_and(!bit, Ordering::SeqCst);
        if before & !bit == 0 {
            let rc = start_advertising();
            if rc != ESP_OK as esp_err_t {
                log::error!("BLE GAP: start_advertising failed ({})", rc);
            }
        }
    }

    pub(super) unsafe extern "C" fn gap_event_handler(
        event: esp_gap_ble_cb_event_t,
        param: *mut esp_ble_gap_cb_param_t,
    ) {
        match event {
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_DATA_SET_COMPLETE_EVT => {
                adv_config_done(ADV_DATA_PENDING);
            }
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_SCAN_RSP_DATA_SET_COMPLETE_EVT => {
                adv_config_done(SCAN_RSP_PENDING);
            }
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
                // SAFETY: param is valid for the duration of the callback.
                let status = unsafe { (*param).adv_start_cmpl.status };
                if status == esp_bt_status_t_ESP_BT_STATUS_SUCCESS {
                    log::info!("BLE GAP: advertising started");
                } else {
                    log::warn!("BLE GAP: advertising start failed (status={})", status);
                }
            }
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
                log::info!("BLE GAP: advertising stopped");
            }
            _ => {}
        }
    }

    pub(super) unsafe extern "C" fn gatts_event_handler(
        event: esp_gatts_cb_event_t,
        gatts_if: esp_gatt_if_t,
        param: *mut esp_ble_gatts_cb_param_t,
    ) {
        match event {
            esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
                GATTS_IF.store(u32::from(gatts_if), Ordering::SeqCst);
                log::info!("BLE GATTS: app registered (if={})", gatts_if);
                let mut svc_id = esp_gatt_srvc_id_t {
                    id: esp_gatt_id_t {
                        uuid: uuid128_to_esp(SERVICE_UUID),
                        inst_id: 0,
                    },
                    is_primary: true,
                };
                // SAFETY: FFI into Bluedroid with a stack-local id it copies.
                unsafe {
                    esp_ble_gatts_create_service(gatts_if, &mut svc_id, NUM_HANDLES);
                }
                configure_advertising();
            }
            esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
                // SAFETY: param is valid for the duration of the callback.
                let svc_handle = unsafe { (*param).create.service_handle };
                SVC_HANDLE.store(u32::from(svc_handle), Ordering::SeqCst);
                log::info!("BLE GATTS: service created (handle={})", svc_handle);

                let mut char_uuid = uuid128_to_esp(CHAR_RELAY);
                let mut initial = [0u8; MAX_NOTIFY_BYTES];
                let mut value = esp_attr_value_t {
                    attr_max_len: MAX_NOTIFY_BYTES as u16,
                    attr_len: 0,
                    attr_value: initial.as_mut_ptr(),
                };
                let mut control = esp_attr_control_t {
                    auto_rsp: ESP_GATT_AUTO_RSP as u8,
                };
                // SAFETY: all pointers reference live stack data that the
                // stack copies before returning.
                unsafe {
                    esp_ble_gatts_start_service(svc_handle);
                    esp_ble_gatts_add_char(
                        svc_handle,
                        &mut char_uuid,
                        (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
                        (ESP_GATT_CHAR_PROP_BIT_READ
                            | ESP_GATT_CHAR_PROP_BIT_WRITE
                            | ESP_GATT_CHAR_PROP_BIT_NOTIFY) as esp_gatt_char_prop_t,
                        &mut value,
                        &mut control,
                    );
                }
            }
            esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
                // SAFETY: param is valid for the duration of the callback.
                let handle = unsafe { (*param).add_char.attr_handle };
                RELAY_CHAR_HANDLE.store(u32::from(handle), Ordering::SeqCst);
                log::info!("BLE GATTS: relay characteristic (handle={})", handle);

                let svc_handle = SVC_HANDLE.load(Ordering::SeqCst) as u16;
                let mut cccd_uuid = uuid16_to_esp(ESP_GATT_UUID_CHAR_CLIENT_CONFIG as u16);
                let mut control = esp_attr_control_t {
                    auto_rsp: ESP_GATT_AUTO_RSP as u8,
                };
                // SAFETY: as above.
                unsafe {
                    esp_ble_gatts_add_char_descr(
                        svc_handle,
                        &mut cccd_uuid,
                        (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
                        core::ptr::null_mut(),
                        &mut control,
                    );
                }
            }
            esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_DESCR_EVT => {
                // SAFETY: param is valid for the duration of the callback.
                let handle = unsafe { (*param).add_char_descr.attr_handle };
                CCCD_HANDLE.store(u32::from(handle), Ordering::SeqCst);
                log::info!("BLE GATTS: service ready (cccd={})", handle);
            }
            esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
                // SAFETY: param is valid for the duration of the callback.
                let conn_id = unsafe { (*param).connect.conn_id };
                CONN_ID.store(u32::from(conn_id), Ordering::SeqCst);
                NOTIFY_ENABLED.store(false, Ordering::SeqCst);
                CONNECTED.store(true, Ordering::SeqCst);
                log::info!("BLE GATTS: client connected (conn_id={})", conn_id);
                if let Some(handler) = HANDLER.get() {
                    handler.connected();
                }
            }
            esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
                CONNECTED.store(false, Ordering::SeqCst);
                NOTIFY_ENABLED.store(false, Ordering::SeqCst);
                log::info!("BLE GATTS: client disconnected");
                // Advertising is restarted by the supervisory loop once the
                // stack has settled.
                if let Some(handler) = HANDLER.get() {
                    handler.disconnected();
                }
            }
            esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
                // SAFETY: param and the value buffer are valid for the
                // duration of the callback.
                let (handle, data) = unsafe {
                    let p = &(*param).write;
                    (p.handle, core::slice::from_raw_parts(p.value, usize::from(p.len)))
                };
                let handle = u32::from(handle);
                if handle == RELAY_CHAR_HANDLE.load(Ordering::SeqCst) {
                    if let Some(handler) = HANDLER.get() {
                        handler.written(data);
                    }
                } else if handle == CCCD_HANDLE.load(Ordering::SeqCst) {
                    let enabled = cccd_enables_notify(data);
                    NOTIFY_ENABLED.store(enabled, Ordering::SeqCst);
                    log::info!("BLE GATTS: notifications {}", if enabled { "on" } else { "off" });
                }
            }
            _ => {}
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation state
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
struct SimLink {
    handler: std::sync::OnceLock<std::sync::Weak<dyn GattHandler>>,
    connected: core::sync::atomic::AtomicBool,
    subscribed: core::sync::atomic::AtomicBool,
    adverts: core::sync::atomic::AtomicU32,
    notified: std::sync::Mutex<Vec<Vec<u8>>>,
}

// ───────────────────────────────────────────────────────────────
// BLE transport
// ───────────────────────────────────────────────────────────────

pub struct BleTransport {
    device_name: heapless::String<24>,
    state: std::sync::Mutex<BleState>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimLink,
}

impl BleTransport {
    pub fn new(device_name: heapless::String<24>) -> Self {
        Self {
            device_name,
            state: std::sync::Mutex::new(BleState::Idle),
            #[cfg(not(target_os = "espidf"))]
            sim: SimLink::default(),
        }
    }

    /// Current lifecycle state. A live link always reads as `Connected`.
    pub fn state(&self) -> BleState {
        if self.link_up() {
            return BleState::Connected;
        }
        *self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn set_state(&self, next: BleState) {
        *self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = next;
    }

    /// Register `handler` for inbound activity, create the GATT service
    /// and start advertising.
    ///
    /// On device the BT controller and Bluedroid must already be enabled,
    /// which `esp_idf_svc::bt::BtDriver` does; keep that driver alive for
    /// as long as the transport is in use.
    pub fn start(&self, handler: Arc<dyn GattHandler>) -> Result<(), TransportError> {
        info!("BLE: starting as '{}'", self.device_name);
        match self.platform_start(handler) {
            Ok(()) => {
                self.set_state(BleState::Advertising);
                Ok(())
            }
            Err(e) => {
                self.set_state(BleState::Failed);
                Err(e)
            }
        }
    }

    fn link_up(&self) -> bool {
        #[cfg(target_os = "espidf")]
        {
            bluedroid::CONNECTED.load(core::sync::atomic::Ordering::SeqCst)
        }
        #[cfg(not(target_os = "espidf"))]
        {
            self.sim.connected.load(core::sync::atomic::Ordering::SeqCst)
        }
    }

    fn notifications_enabled(&self) -> bool {
        #[cfg(target_os = "espidf")]
        {
            bluedroid::NOTIFY_ENABLED.load(core::sync::atomic::Ordering::SeqCst)
        }
        #[cfg(not(target_os = "espidf"))]
        {
            self.sim.subscribed.load(core::sync::atomic::Ordering::SeqCst)
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&self, handler: Arc<dyn GattHandler>) -> Result<(), TransportError> {
        use esp_idf_svc::sys::*;

        if bluedroid::HANDLER.set(handler).is_err() {
            warn!("BLE: handler already registered, keeping the first");
        }

        let name = std::ffi::CString::new(self.device_name.as_str())
            .map_err(|_| TransportError::Stack(ESP_ERR_INVALID_ARG as esp_err_t))?;

        let check = |rc: esp_err_t, what: &str| {
            if rc == ESP_OK as esp_err_t {
                Ok(())
            } else {
                log::error!("BLE: {} failed ({})", what, rc);
                Err(TransportError::Stack(rc))
            }
        };

        // SAFETY: the controller and Bluedroid are already enabled (see
        // `start`); callbacks are `extern "C"` fns with 'static lifetime.
        unsafe {
            check(
                esp_ble_gap_register_callback(Some(bluedroid::gap_event_handler)),
                "gap_register_callback",
            )?;
            check(
                esp_ble_gatts_register_callback(Some(bluedroid::gatts_event_handler)),
                "gatts_register_callback",
            )?;
            check(esp_ble_gap_set_device_name(name.as_ptr()), "set_device_name")?;
            // Service creation and advertising continue from REG_EVT.
            check(esp_ble_gatts_app_register(0), "gatts_app_register")?;
        }

        info!(
            "BLE(espidf): GATT app registered, service {:032x}",
            SERVICE_UUID
        );
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&self, handler: Arc<dyn GattHandler>) -> Result<(), TransportError> {
        if self.sim.handler.set(Arc::downgrade(&handler)).is_err() {
            warn!("BLE(sim): handler already registered, keeping the first");
        }
        info!(
            "BLE(sim): advertising '{}' (service {:032x})",
            self.device_name, SERVICE_UUID
        );
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_notify(&self, data: &[u8]) -> Result<(), TransportError> {
        use core::sync::atomic::Ordering;
        use esp_idf_svc::sys::*;

        let handle = bluedroid::RELAY_CHAR_HANDLE.load(Ordering::SeqCst);
        if handle == 0 {
            return Err(TransportError::NotConnected);
        }
        let mut buf = [0u8; MAX_NOTIFY_BYTES];
        buf[..data.len()].copy_from_slice(data);

        // SAFETY: `buf` outlives the call; the stack copies the payload.
        let rc = unsafe {
            esp_ble_gatts_send_indicate(
                bluedroid::GATTS_IF.load(Ordering::SeqCst) as esp_gatt_if_t,
                bluedroid::CONN_ID.load(Ordering::SeqCst) as u16,
                handle as u16,
                data.len() as u16,
                buf.as_mut_ptr(),
                false,
            )
        };
        if rc == ESP_OK as esp_err_t {
            Ok(())
        } else {
            Err(TransportError::Stack(rc))
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_notify(&self, data: &[u8]) -> Result<(), TransportError> {
        info!("BLE(sim): notify {:?}", String::from_utf8_lossy(data));
        self.sim
            .notified
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(data.to_vec());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_advertise(&self) -> Result<(), TransportError> {
        let rc = bluedroid::start_advertising();
        if rc == esp_idf_svc::sys::ESP_OK as esp_idf_svc::sys::esp_err_t {
            Ok(())
        } else {
            Err(TransportError::Stack(rc))
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_advertise(&self) -> Result<(), TransportError> {
        self.sim
            .adverts
            .fetch_add(1, core::sync::atomic::Ordering::SeqCst);
        info!("BLE(sim): advertising restarted");
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation hooks
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl BleTransport {
    fn sim_handler(&self) -> Option<Arc<dyn GattHandler>> {
        self.sim.handler.get().and_then(std::sync::Weak::upgrade)
    }

    /// Simulate a central connecting.
    pub fn sim_connect(&self) {
        self.sim
            .subscribed
            .store(false, core::sync::atomic::Ordering::SeqCst);
        self.sim
            .connected
            .store(true, core::sync::atomic::Ordering::SeqCst);
        self.set_state(BleState::Connected);
        if let Some(h) = self.sim_handler() {
            h.connected();
        }
    }

    /// Simulate the central going away.
    pub fn sim_disconnect(&self) {
        self.sim
            .connected
            .store(false, core::sync::atomic::Ordering::SeqCst);
        self.sim
            .subscribed
            .store(false, core::sync::atomic::Ordering::SeqCst);
        self.set_state(BleState::Idle);
        if let Some(h) = self.sim_handler() {
            h.disconnected();
        }
    }

    /// Simulate the peer writing `value` to the CCCD.
    pub fn sim_write_cccd(&self, value: &[u8]) {
        self.sim
            .subscribed
            .store(cccd_enables_notify(value), core::sync::atomic::Ordering::SeqCst);
    }

    /// Simulate a write to the relay characteristic.
    pub fn sim_write(&self, data: &[u8]) {
        if let Some(h) = self.sim_handler() {
            h.written(data);
        }
    }

    /// Notifications sent so far, oldest first.
    pub fn sim_notifications(&self) -> Vec<Vec<u8>> {
        self.sim
            .notified
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn sim_advert_count(&self) -> u32 {
        self.sim.adverts.load(core::sync::atomic::Ordering::SeqCst)
    }
}

// ───────────────────────────────────────────────────────────────
// TransportPort implementation
// ───────────────────────────────────────────────────────────────

impl TransportPort for BleTransport {
    fn notify(&self, data: &[u8]) -> Result<(), TransportError> {
        check_payload(data)?;
        if !self.link_up() {
            return Err(TransportError::NotConnected);
        }
        if !self.notifications_enabled() {
            return Err(TransportError::NotSubscribed);
        }
        self.platform_notify(data)
    }

    fn restart_advertising(&self) -> Result<(), TransportError> {
        self.platform_advertise()?;
        self.set_state(BleState::Advertising);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
