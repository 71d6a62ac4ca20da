//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements          | Connects to               |
//! |------------------|---------------------|---------------------------|
//! | `ble`            | TransportPort       | Bluedroid GATT server     |
//! | `log_sink`       | EventSink           | Serial log output         |
//! | `system_metrics` | SystemMetricsPort   | ESP-IDF heap / FreeRTOS   |
//! | `time`           | ClockPort           | ESP32 system timer        |

pub mod ble;
pub mod log_sink;
pub mod system_metrics;
pub mod time;
