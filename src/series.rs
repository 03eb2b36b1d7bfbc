use crate::schema::{amount_of, MoneyEvent, RestockEvent, SaleEvent};
use crate::temporal::{Dated, ReportingWindow};

/// One entry of an embedded event series. Every parent record stores its
/// history as a different sub-record shape (payments carry `amount`, restocks
/// carry `quantity`, sales carry `quantitySold`); this trait is the single
/// seam through which all of them are reduced.
pub trait SeriesEvent: Dated {
    fn magnitude(&self) -> f64;
}

impl SeriesEvent for MoneyEvent {
    fn magnitude(&self) -> f64 {
        amount_of(&self.amount)
    }
}

impl SeriesEvent for SaleEvent {
    fn magnitude(&self) -> f64 {
        amount_of(&self.quantity_sold)
    }
}

impl SeriesEvent for RestockEvent {
    fn magnitude(&self) -> f64 {
        amount_of(&self.quantity)
    }
}

/// Sums an embedded event series, window-filtered by each event's own
/// resolved date. Malformed magnitudes contribute 0; an empty series sums to
/// 0. This is the only reduction path over event series in the crate.
pub fn reduce_series<E: SeriesEvent>(series: &[E], window: &ReportingWindow) -> f64 {
    series
        .iter()
        .filter(|event| window.contains(event.recorded_at()))
        .map(SeriesEvent::magnitude)
        .sum()
}
