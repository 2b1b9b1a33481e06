//! B3 (Brasil Bolsa Balcão) equity universe.

use std::collections::HashMap;

/// Registered ticker with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constituent {
    /// Yahoo Finance symbol (e.g. "PETR4.SA").
    pub symbol: String,
    /// Display name.
    pub name: String,
}

impl Constituent {
    /// Create a new constituent.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

/// Ordered registry of B3 tickers.
#[derive(Debug, Clone)]
pub struct B3Universe {
    constituents: Vec<Constituent>,
    symbol_to_index: HashMap<String, usize>,
}

impl B3Universe {
    /// Create the universe with the default constituents.
    pub fn new() -> Self {
        Self::from_constituents(Self::default_constituents())
    }

    /// Create a universe from an explicit list.
    ///
    /// Order is preserved; a repeated symbol keeps its first entry.
    pub fn from_constituents(constituents: impl IntoIterator<Item = Constituent>) -> Self {
        let mut kept = Vec::new();
        let mut symbol_to_index = HashMap::new();
        for constituent in constituents {
            if symbol_to_index.contains_key(&constituent.symbol) {
                continue;
            }
            symbol_to_index.insert(constituent.symbol.clone(), kept.len());
            kept.push(constituent);
        }

        Self {
            constituents: kept,
            symbol_to_index,
        }
    }

    /// Get all constituents.
    pub fn constituents(&self) -> &[Constituent] {
        &self.constituents
    }

    /// Get all symbols.
    pub fn symbols(&self) -> Vec<String> {
        self.constituents.iter().map(|c| c.symbol.clone()).collect()
    }

    /// Get the display name for a symbol.
    pub fn name(&self, symbol: &str) -> Option<&str> {
        self.symbol_to_index
            .get(symbol)
            .map(|&idx| self.constituents[idx].name.as_str())
    }

    /// Default constituents: liquid B3 names, mostly Ibovespa members.
    fn default_constituents() -> Vec<Constituent> {
        vec![
            Constituent::new("ABEV3.SA", "Ambev"),
            Constituent::new("ALOS3.SA", "Allos"),
            Constituent::new("ASAI3.SA", "Assaí"),
            Constituent::new("AURE3.SA", "Auren Energia"),
            Constituent::new("AXIA3.SA", "Axia (Verificar Ticker)"),
            Constituent::new("AXIA6.SA", "Axia (Verificar Ticker)"),
            Constituent::new("AXIA7.SA", "Axia (Verificar Ticker)"),
            Constituent::new("AZZA3.SA", "Azzas 2154 (Arezzo+Soma)"),
            Constituent::new("B3SA3.SA", "B3"),
            Constituent::new("BBAS3.SA", "Banco do Brasil"),
            Constituent::new("BBDC3.SA", "Bradesco (ON)"),
            Constituent::new("BBDC4.SA", "Bradesco (PN)"),
            Constituent::new("BBSE3.SA", "BB Seguridade"),
            Constituent::new("BEEF3.SA", "Minerva"),
            Constituent::new("BPAC11.SA", "BTG Pactual"),
            Constituent::new("BRAP4.SA", "Bradespar"),
            Constituent::new("BRAV3.SA", "Brava Energia (3R + Enauta)"),
            Constituent::new("BRKM5.SA", "Braskem"),
            Constituent::new("CEAB3.SA", "C&A"),
            Constituent::new("CMIG4.SA", "Cemig"),
            Constituent::new("CMIN3.SA", "CSN Mineração"),
            Constituent::new("COGN3.SA", "Cogna"),
            Constituent::new("CPFE3.SA", "CPFL Energia"),
            Constituent::new("CPLE3.SA", "Copel"),
            Constituent::new("CSAN3.SA", "Cosan"),
            Constituent::new("CSMG3.SA", "Copasa"),
            Constituent::new("CSNA3.SA", "CSN Siderúrgica"),
            Constituent::new("CURY3.SA", "Cury Construtora"),
            Constituent::new("CXSE3.SA", "Caixa Seguridade"),
            Constituent::new("CYRE3.SA", "Cyrela"),
            Constituent::new("CYRE4.SA", "Cyrela (PN)"),
            Constituent::new("DIRR3.SA", "Direcional"),
            Constituent::new("EGIE3.SA", "Engie Brasil"),
            Constituent::new("EMBJ3.SA", "Embraer (Verificar: EMBR3)"),
            Constituent::new("ENEV3.SA", "Eneva"),
            Constituent::new("ENGI11.SA", "Energisa"),
            Constituent::new("EQTL3.SA", "Equatorial"),
            Constituent::new("FLRY3.SA", "Fleury"),
            Constituent::new("GGBR4.SA", "Gerdau"),
            Constituent::new("GOAU4.SA", "Metalúrgica Gerdau"),
            Constituent::new("HAPV3.SA", "Hapvida"),
            Constituent::new("HYPE3.SA", "Hypera Pharma"),
            Constituent::new("IGTI11.SA", "Iguatemi"),
            Constituent::new("IRBR3.SA", "IRB Re"),
            Constituent::new("ISAE4.SA", "ISA CTEEP (TRPL4)"),
            Constituent::new("ITSA4.SA", "Itaúsa"),
            Constituent::new("ITUB4.SA", "Itaú Unibanco"),
            Constituent::new("KLBN11.SA", "Klabin"),
            Constituent::new("LREN3.SA", "Lojas Renner"),
            Constituent::new("MBRF3.SA", "Marfrig (Verificar: MRFG3)"),
            Constituent::new("MGLU3.SA", "Magazine Luiza"),
            Constituent::new("MOTV3.SA", "Movida (Verificar: MOVI3)"),
            Constituent::new("MRVE3.SA", "MRV"),
            Constituent::new("MULT3.SA", "Multiplan"),
            Constituent::new("NATU3.SA", "Natura"),
            Constituent::new("PCAR3.SA", "Pão de Açúcar"),
            Constituent::new("PETR3.SA", "Petrobras (ON)"),
            Constituent::new("PETR4.SA", "Petrobras (PN)"),
            Constituent::new("POMO4.SA", "Marcopolo"),
            Constituent::new("PRIO3.SA", "Prio (PetroRio)"),
            Constituent::new("PSSA3.SA", "Porto Seguro"),
            Constituent::new("RADL3.SA", "Raia Drogasil"),
            Constituent::new("RAIL3.SA", "Rumo"),
            Constituent::new("RAIZ4.SA", "Raízen"),
            Constituent::new("RDOR3.SA", "Rede D'Or"),
            Constituent::new("RECV3.SA", "PetroReconcavo"),
            Constituent::new("RENT3.SA", "Localiza"),
            Constituent::new("RENT4.SA", "Localiza (PN - Antiga)"),
            Constituent::new("SANB11.SA", "Santander Brasil"),
            Constituent::new("SBSP3.SA", "Sabesp"),
            Constituent::new("SLCE3.SA", "SLC Agrícola"),
            Constituent::new("SMFT3.SA", "Smart Fit"),
            Constituent::new("SUZB3.SA", "Suzano"),
            Constituent::new("TAEE11.SA", "Taesa"),
            Constituent::new("TIMS3.SA", "TIM"),
            Constituent::new("TOTS3.SA", "Totvs"),
            Constituent::new("UGPA3.SA", "Ultrapar"),
            Constituent::new("USIM5.SA", "Usiminas"),
            Constituent::new("VALE3.SA", "Vale"),
            Constituent::new("VAMO3.SA", "Vamos"),
            Constituent::new("VBBR3.SA", "Vibra (BR Distribuidora)"),
            Constituent::new("VIVA3.SA", "Vivara"),
            Constituent::new("VIVT3.SA", "Vivo"),
            Constituent::new("WEGE3.SA", "WEG"),
            Constituent::new("YDUQ3.SA", "Yduqs (Estácio)"),
        ]
    }
}

impl Default for B3Universe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_universe_creation() {
        let universe = B3Universe::new();
        assert!(universe.constituents().len() >= 80);
        assert_eq!(universe.symbols().len(), universe.constituents().len());
    }

    #[test]
    fn test_symbols_are_unique_and_suffixed() {
        let universe = B3Universe::new();
        let symbols = universe.symbols();
        for symbol in &symbols {
            assert!(symbol.ends_with(".SA"), "{symbol} lacks the .SA suffix");
            assert_eq!(symbols.iter().filter(|s| *s == symbol).count(), 1);
        }
    }

    #[test]
    fn test_order_is_declaration_order() {
        let symbols = B3Universe::new().symbols();
        assert_eq!(symbols.first().map(String::as_str), Some("ABEV3.SA"));
        assert_eq!(symbols.last().map(String::as_str), Some("YDUQ3.SA"));
    }

    #[test]
    fn test_name_lookup() {
        let universe = B3Universe::new();

        assert_eq!(universe.name("PETR4.SA"), Some("Petrobras (PN)"));
        assert_eq!(universe.name("ITUB4.SA"), Some("Itaú Unibanco"));
        assert_eq!(universe.name("INVALID"), None);
    }

    #[rstest]
    #[case("EMBJ3.SA", "Embraer (Verificar: EMBR3)")]
    #[case("MBRF3.SA", "Marfrig (Verificar: MRFG3)")]
    #[case("MOTV3.SA", "Movida (Verificar: MOVI3)")]
    #[case("AXIA6.SA", "Axia (Verificar Ticker)")]
    fn test_annotated_names_kept_verbatim(#[case] symbol: &str, #[case] name: &str) {
        assert_eq!(B3Universe::new().name(symbol), Some(name));
    }

    #[test]
    fn test_duplicate_symbol_keeps_first() {
        let universe = B3Universe::from_constituents([
            Constituent::new("PETR4.SA", "Petrobras"),
            Constituent::new("VALE3.SA", "Vale"),
            Constituent::new("PETR4.SA", "Duplicate"),
        ]);

        assert_eq!(universe.symbols(), vec!["PETR4.SA", "VALE3.SA"]);
        assert_eq!(universe.name("PETR4.SA"), Some("Petrobras"));
    }
}
