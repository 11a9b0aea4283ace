//! Core domain types for the volmm option market maker.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - `Price`: precision-safe price with tick rounding
//! - `InstrumentId`, `Instrument`, `OptionSeries`: static reference data
//! - `TopOfBook`: best bid/ask snapshot with mid and spread
//! - `Side`, `OrderType`, order and trade records

pub mod book;
pub mod decimal;
pub mod error;
pub mod instrument;
pub mod order;

pub use book::TopOfBook;
pub use decimal::Price;
pub use error::{CoreError, Result};
pub use instrument::{Instrument, InstrumentId, InstrumentKind, OptionKind, OptionSeries};
pub use order::{OrderId, OrderRequest, OrderType, RestingOrder, Side, Trade};
