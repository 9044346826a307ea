//! Cursor position query and warp, used to save/restore the pointer around
//! keyboard-driven navigation and to read the point that determines the
//! active screen.

use core_graphics::event::{CGEvent, CGEventSource, CGEventSourceStateID};

use crate::Error;
use crate::Result;

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGWarpMouseCursorPosition(point: CGPointFfi) -> i32;
    fn CGAssociateMouseAndMouseCursorPosition(connected: bool) -> i32;
}

#[repr(C)]
struct CGPointFfi {
    x: f64,
    y: f64,
}

/// Current cursor position in global (bottom-left origin) coordinates.
pub fn cursor_position() -> Result<(f64, f64)> {
    let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|_| Error::System("CGEventSourceCreate failed"))?;
    let event = CGEvent::new(source).map_err(|_| Error::System("CGEventCreate failed"))?;
    let p = event.location();
    Ok((p.x, p.y))
}

/// Move the cursor to `(x, y)` without generating a mouse-moved event that
/// would desync the OS's notion of cursor position from the hardware.
pub fn warp_cursor(x: f64, y: f64) -> Result<()> {
    let rc = unsafe { CGWarpMouseCursorPosition(CGPointFfi { x, y }) };
    if rc != 0 {
        return Err(Error::System("CGWarpMouseCursorPosition failed"));
    }
    // Re-associate so subsequent physical mouse movement tracks correctly;
    // CGWarpMouseCursorPosition disassociates them as a side effect.
    let _ = unsafe { CGAssociateMouseAndMouseCursorPosition(true) };
    Ok(())
}
