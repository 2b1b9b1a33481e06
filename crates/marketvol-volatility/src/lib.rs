#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/marketvol/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod returns;
pub mod window;

pub use engine::{
    DEFAULT_TRADING_DAYS, SymbolVolatility, VolatilityConfig, VolatilityEngine, VolatilityError,
    VolatilityFigures, annualized_volatility,
};
pub use returns::{forward_fill, last_price, log_return_frame, log_returns};
pub use window::VolatilityWindow;
