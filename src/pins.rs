//! GPIO / peripheral pin assignments for the gateway board.
//!
//! Single source of truth; `main` references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// UART link to the host calculator (UART1)
// ---------------------------------------------------------------------------

/// ESP32 TX → calculator RX.
pub const LINK_UART_TX_GPIO: i32 = 17;
/// Calculator TX → ESP32 RX.
pub const LINK_UART_RX_GPIO: i32 = 18;
