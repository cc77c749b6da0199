//! Everything the runtime touches that it does not own.

use gbt_ir::{InstrumentTable, WaveformTable};

use crate::apu::Apu;

/// The synthesis target plus the lookup tables rows refer to.
///
/// Built by the caller for each call into the runtime; holding `&mut` to the
/// context and the runtime is what serializes control and rendering.
pub struct RuntimeContext<'a> {
    pub apu: &'a mut dyn Apu,
    pub instruments: &'a InstrumentTable,
    pub waveforms: &'a WaveformTable,
}

impl<'a> RuntimeContext<'a> {
    pub fn new(
        apu: &'a mut dyn Apu,
        instruments: &'a InstrumentTable,
        waveforms: &'a WaveformTable,
    ) -> Self {
        Self {
            apu,
            instruments,
            waveforms,
        }
    }
}
