//! Timing natives: `sleep` and `timeMillis`.

use crate::args;
use crate::registry::NativeRegistry;
use core_types::{LinkError, Operand, ValueType};
use std::thread;
use std::time::{Duration, Instant};

/// Milliseconds elapsed since `epoch`, wrapped into the int range
pub fn millis_since(epoch: Instant) -> i32 {
    epoch.elapsed().as_millis() as u32 as i32
}

/// Link the timing natives. `timeMillis` counts from `epoch`.
pub fn link(registry: &mut NativeRegistry, epoch: Instant) -> Result<(), LinkError> {
    registry.register("sleep", &[ValueType::Int], ValueType::Void, |_, a| {
        let millis = args::int(a, 0)?;
        if millis > 0 {
            thread::sleep(Duration::from_millis(millis as u64));
        }
        Ok(Operand::Void)
    })?;
    registry.register("timeMillis", &[], ValueType::Int, move |_, _| {
        Ok(Operand::Int(millis_since(epoch)))
    })?;
    Ok(())
}
