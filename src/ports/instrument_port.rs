//! Instrument list port trait.

use crate::domain::error::StockpickError;
use crate::domain::instrument::Instrument;

pub trait InstrumentPort {
    /// Every listed instrument, eligible or not, in source order.
    fn load_instruments(&self) -> Result<Vec<Instrument>, StockpickError>;
}
