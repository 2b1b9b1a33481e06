//! Result assembly: one record per requested symbol.

use crate::universe::Universe;
use marketvol_output::ResultRecord;
use marketvol_volatility::SymbolVolatility;
use std::collections::HashMap;

/// Build records for `batch`, in batch order.
///
/// Figures are looked up by symbol, so the order of `computed` does not
/// matter. A symbol with no computed entry gets an all-missing record.
pub fn assemble_batch<U: Universe>(
    universe: &U,
    batch: &[String],
    computed: &[SymbolVolatility],
) -> Vec<ResultRecord> {
    let by_symbol: HashMap<&str, &SymbolVolatility> =
        computed.iter().map(|v| (v.symbol.as_str(), v)).collect();

    batch
        .iter()
        .map(|symbol| {
            let name = universe.name_or_symbol(symbol);
            by_symbol.get(symbol.as_str()).map_or_else(
                || ResultRecord::missing(symbol.as_str(), name),
                |v| ResultRecord::new(symbol.as_str(), name, v.last_price, v.figures),
            )
        })
        .collect()
}

/// All-missing records for a batch that could not be fetched.
pub fn missing_batch<U: Universe>(universe: &U, batch: &[String]) -> Vec<ResultRecord> {
    batch
        .iter()
        .map(|symbol| ResultRecord::missing(symbol.as_str(), universe.name_or_symbol(symbol)))
        .collect()
}
